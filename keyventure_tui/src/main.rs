mod input;

use anyhow::{Context, Result};
use clap::Parser;
use input::{Command, HELP_TEXT, INVALID};
use keyventure_core::{
    Direction, Position,
    agent::{Agent, PlanningAgent},
    entity::{EntityKind, PLAYER_SYMBOL},
    game::{Game, Outcome, Snapshot},
    level::Level,
    registry::LevelRegistry,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

const WIN_TEXT: &str = "You have won the game with your strength and honour!";
const LOSE_TEXT: &str = "You have lost all your strength and honour.";

#[derive(Parser, Debug)]
#[command(version, about = "Find the key and escape the dungeon", long_about = None)]
struct Args {
    /// Level to play, as named in the registry
    #[arg(short, long, default_value = "game1.txt")]
    level: String,

    /// Directory holding the level files
    #[arg(long, value_name = "DIR", default_value = "levels")]
    levels_dir: PathBuf,

    /// JSON file mapping level names to move budgets
    #[arg(short, long, value_name = "FILE")]
    registry: Option<PathBuf>,

    /// Let the planning agent play
    #[arg(long)]
    autoplay: bool,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// The core game session.
    game: Game,
    level_name: String,
    /// Drives autoplay and hints.
    agent: PlanningAgent,
    autoplay: bool,
    /// Next direction key investigates instead of moving.
    investigating: bool,
    show_help: bool,
    /// Last line of feedback for the status bar.
    message: String,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(level_name: String, game: Game, autoplay: bool) -> Self {
        App {
            game,
            level_name,
            agent: PlanningAgent::new(),
            autoplay,
            investigating: false,
            show_help: false,
            message: "Find the key, then the door. Press 'h' for help.".to_string(),
            should_quit: false,
        }
    }

    /// Handles one typed character.
    fn handle_char(&mut self, c: char) {
        match Command::from_char(c) {
            Some(command) => self.apply(command),
            None => {
                self.investigating = false;
                self.message = INVALID.to_string();
            }
        }
    }

    fn apply(&mut self, command: Command) {
        if !matches!(command, Command::Move(_) | Command::Investigate) {
            self.investigating = false;
        }
        match command {
            Command::Move(direction) if self.investigating => {
                self.investigating = false;
                self.investigate(direction);
            }
            Command::Move(direction) => self.take_turn(direction),
            Command::Investigate => {
                self.investigating = true;
                self.message = "Investigate which direction?".to_string();
            }
            Command::Hint => {
                self.message = match PlanningAgent::plan_route(&self.game.snapshot()) {
                    Some(route) if !route.is_empty() => format!(
                        "Try {} ({} moves to escape).",
                        route[0].token(),
                        route.len()
                    ),
                    _ => "No way out from here.".to_string(),
                };
            }
            Command::ToggleAutoplay => {
                self.autoplay = !self.autoplay;
                log::info!("Autoplay {}", if self.autoplay { "on" } else { "off" });
            }
            Command::Help => self.show_help = !self.show_help,
            Command::Quit => self.quit(),
        }
    }

    fn take_turn(&mut self, direction: Direction) {
        let report = self.game.take_turn(direction);
        self.message = report.movement.message().unwrap_or_default().to_string();
    }

    fn investigate(&mut self, direction: Direction) {
        if self.game.is_terminal() {
            return;
        }
        self.message = match self.game.investigate(direction) {
            Some(kind) => format!("You see {} to the {:?}.", kind, direction),
            None => format!("Nothing to the {:?}.", direction),
        };
    }

    /// Handles one step of autoplay.
    fn tick(&mut self) {
        if !self.autoplay || self.game.is_terminal() {
            return;
        }
        match self.agent.next_move(&self.game.snapshot()) {
            Some(direction) => self.take_turn(direction),
            None => {
                self.autoplay = false;
                self.message = "The agent is stuck.".to_string();
            }
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let registry = match &args.registry {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read registry {}", path.display()))?;
            LevelRegistry::from_json(&json)?
        }
        None => LevelRegistry::default(),
    };
    let moves = registry.budget(&args.level)?;

    let level_path = args.levels_dir.join(&args.level);
    let text = std::fs::read_to_string(&level_path)
        .with_context(|| format!("Failed to read level {}", level_path.display()))?;
    let level = Level::parse(&text)
        .with_context(|| format!("Failed to load level {}", level_path.display()))?;
    log::info!("Starting {} with {} moves", args.level, moves);

    // Create the application state
    let mut app = App::new(args.level, Game::new(&level, moves), args.autoplay);

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop, restoring the terminal even on failure
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;

    match app.game.outcome() {
        Outcome::Won => println!("{WIN_TEXT}"),
        Outcome::Lost => println!("{LOSE_TEXT}"),
        Outcome::InProgress => println!("Bye."),
    }
    Ok(())
}

/// Sends log output to `path`; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250); // Autoplay speed
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => app.quit(),
                        KeyCode::Char(c) => app.handle_char(c),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let snapshot = app.game.snapshot();
    let main_layout = Layout::vertical([
        Constraint::Percentage(65), // Map or help
        Constraint::Percentage(20), // Moves and inventory
        Constraint::Percentage(15), // Status line
    ])
    .split(frame.area());

    if app.show_help {
        let help =
            Paragraph::new(HELP_TEXT).block(Block::default().title("Help").borders(Borders::ALL));
        frame.render_widget(help, main_layout[0]);
    } else {
        render_map(frame, main_layout[0], &snapshot, &app.level_name);
    }
    render_inventory(frame, main_layout[1], &snapshot, app.autoplay);

    let status = match snapshot.outcome {
        Outcome::Won => Line::styled(WIN_TEXT, Style::default().fg(Color::Green).bold()),
        Outcome::Lost => Line::styled(LOSE_TEXT, Style::default().fg(Color::Red).bold()),
        Outcome::InProgress => Line::from(app.message.as_str()),
    };
    let status_widget = Paragraph::new(vec![
        status,
        Line::from("Press 'h' for help, 'q' or 'Esc' to quit."),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, main_layout[2]);
}

fn entity_span(kind: EntityKind, has_key: bool) -> Span<'static> {
    let style = match kind {
        EntityKind::Wall => Style::default().fg(Color::DarkGray),
        EntityKind::Door if has_key => Style::default().fg(Color::Green).bold(),
        EntityKind::Door => Style::default().fg(Color::Magenta),
        EntityKind::Key => Style::default().fg(Color::Yellow).bold(),
        EntityKind::MoveBooster => Style::default().fg(Color::Cyan),
    };
    Span::styled(format!("{} ", kind.symbol()), style)
}

/// Renders the dungeon onto the frame.
fn render_map(frame: &mut Frame, area: Rect, snapshot: &Snapshot, level_name: &str) {
    let has_key = snapshot.inventory.contains(&EntityKind::Key);
    let mut lines: Vec<Line> = Vec::with_capacity(snapshot.height);
    let mut entities = snapshot.entities.iter().peekable();

    for row in 0..snapshot.height {
        let mut spans: Vec<Span> = Vec::with_capacity(snapshot.width);
        for col in 0..snapshot.width {
            let position = Position { row, col };
            // Entities are row-major, so the next one is either here or later.
            let entity = entities
                .next_if(|(at, _)| *at == position)
                .map(|&(_, kind)| kind);
            if position == snapshot.player {
                spans.push(Span::styled(
                    format!("{PLAYER_SYMBOL} "),
                    Style::default().fg(Color::Red).bold(),
                ));
            } else if let Some(kind) = entity {
                spans.push(entity_span(kind, has_key));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!("Key-Venture: {level_name}"))
                .borders(Borders::ALL),
        )
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

/// Renders moves left and collected items.
fn render_inventory(frame: &mut Frame, area: Rect, snapshot: &Snapshot, autoplay: bool) {
    let moves_style = if snapshot.moves_remaining <= 2 {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let items: Vec<Span> = if snapshot.inventory.is_empty() {
        vec![Span::raw("nothing")]
    } else {
        snapshot
            .inventory
            .iter()
            .map(|item| Span::styled(format!("{item} "), Style::default().fg(Color::Yellow)))
            .collect()
    };

    let mut inventory_line = vec![Span::raw("Inventory: ")];
    inventory_line.extend(items);
    let lines = vec![
        Line::from(vec![
            Span::raw("Moves left: "),
            Span::styled(snapshot.moves_remaining.to_string(), moves_style),
        ]),
        Line::from(inventory_line),
        Line::from(if autoplay { "Autoplay: on" } else { "Autoplay: off" }),
    ];

    let inventory_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Player"));
    frame.render_widget(inventory_widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(text: &str, moves: i32) -> App {
        App::new("test".to_string(), Game::from_text(text, moves).unwrap(), false)
    }

    #[test]
    fn invalid_keys_cost_nothing() {
        let mut app = app("O KD", 3);
        app.handle_char('x');
        assert_eq!(app.message, INVALID);
        assert_eq!(app.game.player().moves_remaining(), 3);
    }

    #[test]
    fn help_and_quit_never_reach_the_game() {
        let mut app = app("O KD", 3);
        app.handle_char('h');
        assert!(app.show_help);
        app.handle_char('q');
        assert!(app.should_quit);
        assert_eq!(app.game.player().moves_remaining(), 3);
    }

    #[test]
    fn investigate_waits_for_a_direction() {
        let mut app = app("OKD", 3);
        app.handle_char('i');
        assert!(app.investigating);
        app.handle_char('d');
        assert!(!app.investigating);
        assert_eq!(app.message, "You see Key('K') to the Right.");
        assert_eq!(app.game.player().position(), Position::new(0, 0));
        assert_eq!(app.game.player().moves_remaining(), 2);
    }

    #[test]
    fn other_commands_cancel_a_pending_investigation() {
        for key in ['n', 'p', 'h'] {
            let mut app = app("O KD", 5);
            app.handle_char('i');
            app.handle_char(key);
            assert!(!app.investigating, "'{key}' left investigate pending");
            app.autoplay = false;
            app.handle_char('d');
            assert_eq!(app.game.player().position(), Position::new(0, 1));
            assert_eq!(app.game.player().moves_remaining(), 4);
        }
    }

    #[test]
    fn blocked_moves_report_the_wall() {
        let mut app = app("#O D", 3);
        app.handle_char('a');
        assert_eq!(app.message, "You bumped into a wall.");
        assert_eq!(app.game.player().moves_remaining(), 2);
    }

    #[test]
    fn hint_names_the_next_step() {
        let mut app = app("O KD", 3);
        app.handle_char('n');
        assert_eq!(app.message, "Try D (3 moves to escape).");
    }

    #[test]
    fn autoplay_finishes_the_level() {
        let mut app = app("O KD", 3);
        app.handle_char('p');
        for _ in 0..5 {
            app.tick();
        }
        assert_eq!(app.game.outcome(), Outcome::Won);
    }
}
