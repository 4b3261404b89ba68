use anyhow::{Context, Result};
use clap::Parser;
use mineopoly_core::{
    BoardView, GreedyMiner, HarnessSettings, ItemType, Position, Round, RoundOutcome,
    RoundSettings, TileType,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "mineopoly", version, about = "Watch the greedy miner play a practice round", long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/field01.txt")]
    map: PathBuf,

    /// Maximum number of turns before the round is called
    #[arg(short, long, default_value_t = HarnessSettings::default().turn_limit)]
    turns: u32,

    /// Seed handed to the strategy's random number generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Items the robot can carry at once
    #[arg(long, default_value_t = RoundSettings::default().max_inventory_size)]
    inventory: usize,

    /// Charge the robot starts with
    #[arg(long, default_value_t = RoundSettings::default().max_charge)]
    charge: u32,

    /// Score that ends the round
    #[arg(long, default_value_t = RoundSettings::default().winning_score)]
    winning_score: u32,

    /// Run without the terminal UI and log every turn
    #[arg(long)]
    headless: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_round(&self) -> Result<Round> {
        let map_string = std::fs::read_to_string(&self.map)
            .with_context(|| format!("failed to read map file {}", self.map.display()))?;
        let board = BoardView::from_map_str(&map_string).context("failed to parse map")?;

        let settings = RoundSettings {
            board_size: board.size(),
            max_inventory_size: self.inventory,
            max_charge: self.charge,
            winning_score: self.winning_score,
        };
        let harness = HarnessSettings {
            turn_limit: self.turns,
            seed: self.seed,
            ..HarnessSettings::default()
        };
        Round::new(board, settings, harness, Box::new(GreedyMiner::new()))
            .context("failed to start round")
    }
}

struct App {
    /// The practice round being played.
    round: Round,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Last strategy failure, shown in the status bar.
    error: Option<String>,
}

impl App {
    fn new(round: Round) -> Self {
        App {
            round,
            should_quit: false,
            error: None,
        }
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        if self.round.is_over() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.round.process_turn() {
            self.error = Some(err.to_string());
        }
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.map.exists() {
        return Err(anyhow::anyhow!(
            "Map file does not exist: {}",
            args.map.display()
        ));
    }

    if args.headless {
        // The TUI owns the terminal, so logs are only written in headless mode.
        let filter = if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };
        fmt().with_env_filter(filter).with_target(false).init();
        return run_headless(&args);
    }

    // Create the application state before taking over the terminal
    let mut app = App::new(args.load_round()?);

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Plays the whole round without a UI.
fn run_headless(args: &Args) -> Result<()> {
    let mut round = args.load_round()?;
    let outcome = round.run().context("round aborted")?;
    match outcome {
        RoundOutcome::Won { turns } => tracing::info!(turns, score = round.robot.score, "won"),
        RoundOutcome::TurnLimit => {
            tracing::info!(score = round.robot.score, "turn limit reached")
        }
        // run() surfaces strategy failures as errors before this point
        RoundOutcome::Aborted => tracing::warn!("round aborted"),
    }
    println!(
        "{}: {} points in {} turns",
        round.strategy_name(),
        round.robot.score,
        round.turn
    );
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?; // Use alternate screen and enable mouse capture
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into) // Map io::Error to anyhow::Error
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(150); // Update rate
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        // Calculate timeout for event polling
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // Poll for events (keyboard, mouse, etc.)
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    _ => {}
                }
            }
        }

        // Advance the round if enough time has passed
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70), // Area for the board
            Constraint::Percentage(20), // Area for the robot
            Constraint::Percentage(10), // Area for status/help
        ])
        .split(frame.area());

    // Render the board
    render_board(frame, main_layout[0], &app.round);

    // Render the robot's state
    render_robot(frame, main_layout[1], &app.round);

    // Render status/help text
    let status = match (&app.error, app.round.outcome()) {
        (Some(err), _) => format!("Error: {err}. Press 'q' or 'Esc' to quit."),
        (None, Some(RoundOutcome::Won { turns })) => {
            format!("Won in {turns} turns. Press 'q' or 'Esc' to quit.")
        }
        (None, Some(RoundOutcome::TurnLimit)) => {
            "Turn limit reached. Press 'q' or 'Esc' to quit.".to_string()
        }
        (None, Some(RoundOutcome::Aborted)) => {
            "Round aborted. Press 'q' or 'Esc' to quit.".to_string()
        }
        (None, None) => "Press 'q' or 'Esc' to quit.".to_string(),
    };
    let help_text = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

fn item_color(item_type: ItemType) -> Color {
    match item_type {
        ItemType::Diamond => Color::Cyan,
        ItemType::Emerald => Color::Green,
        ItemType::Ruby => Color::Red,
    }
}

/// Renders the robot's charge, inventory and score.
fn render_robot(frame: &mut Frame, area: Rect, round: &Round) {
    let robot = &round.robot;
    let mut held: Vec<Span> = vec![Span::raw("Inventory: ")];
    held.extend(
        robot
            .inventory
            .iter()
            .map(|item| Span::styled("*", Style::default().fg(item_color(item.item_type)))),
    );
    let lines = vec![
        ListItem::from(Line::from(format!(
            "{} at ({}, {})  Turn: {}",
            round.strategy_name(),
            robot.position.x,
            robot.position.y,
            round.turn
        ))),
        ListItem::from(Line::from(format!(
            "Charge: {}  Score: {}",
            robot.charge, robot.score
        ))),
        ListItem::from(Line::from(held)),
    ];
    let widget = List::new(lines).block(Block::default().borders(Borders::ALL).title("Robot"));
    frame.render_widget(widget, area);
}

/// Renders the board onto the frame, top row first.
fn render_board(frame: &mut Frame, area: Rect, round: &Round) {
    let board = &round.board;
    let size = board.size();
    let mut lines: Vec<Line> = Vec::with_capacity(size);

    for y in (0..size).rev() {
        let mut spans: Vec<Span> = Vec::with_capacity(size * 2);
        for x in 0..size {
            let position = Position { x, y };
            let span = if position == round.robot.position {
                Span::styled("@", Style::default().fg(Color::Yellow).bold())
            } else if let Some(item) = board.items_at(position).last() {
                Span::styled("*", Style::default().fg(item_color(item.item_type)))
            } else {
                match board.tile_at(position) {
                    TileType::Empty => Span::raw("."),
                    TileType::ResourceDiamond => {
                        Span::styled("D", Style::default().fg(item_color(ItemType::Diamond)))
                    }
                    TileType::ResourceEmerald => {
                        Span::styled("E", Style::default().fg(item_color(ItemType::Emerald)))
                    }
                    TileType::ResourceRuby => {
                        Span::styled("R", Style::default().fg(item_color(ItemType::Ruby)))
                    }
                    TileType::RedMarket => Span::styled("M", Style::default().fg(Color::Red)),
                    TileType::BlueMarket => Span::styled("M", Style::default().fg(Color::Blue)),
                    TileType::Recharge => Span::styled("+", Style::default().fg(Color::Magenta)),
                }
            };
            spans.push(span);
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let board_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Mineopoly").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(board_paragraph, area);
}
