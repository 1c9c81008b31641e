//! Terminal host for the arcade hub.
//!
//! Reads one command per line, applies it to the running game, and prints the
//! resulting snapshot. Delayed transitions are awaited in real time after each
//! command, so a mismatched pair stays visible for the configured delay.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    str::FromStr,
    thread,
    time::Duration,
};

use arcade_core::{CardId, GridError, GridPosition};
use arcade_game::{FlipOutcome, MemoryEvent, MoveOutcome, PuzzleEvent, ShufflePacing};
use arcade_generator::GameSeed;
use clap::{Parser, Subcommand};

use crate::{
    catalog::{CategoryCatalog, JsonFileProvider, load_catalog},
    memory_session::MemorySession,
    owner::SessionOwner,
    puzzle_session::PuzzleSession,
    score::{GameKind, JsonLinesScoreReporter, LogScoreReporter, ScoreReporter},
    settings::ArcadeSettings,
};

/// Command-line arguments of the `arcade` binary.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Game to play. Lists the available games when omitted.
    #[command(subcommand)]
    pub game: Option<GameCommand>,

    /// Seed of the first game, as 64 hex digits.
    #[arg(long, global = true, value_name = "SEED")]
    pub seed: Option<GameSeed>,

    /// JSON category catalog for the memory game.
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Signed-in player as `ID[:USERNAME[:EMAIL]]`. Scores are reported only
    /// for a signed-in player.
    #[arg(long, global = true, value_name = "OWNER")]
    pub owner: Option<SessionOwner>,

    /// Append score reports to this file as JSON lines instead of logging them.
    #[arg(long, global = true, value_name = "PATH")]
    pub score_log: Option<PathBuf>,

    /// Skip every delay: pairs resolve and scrambles appear immediately.
    #[arg(long, global = true)]
    pub instant: bool,
}

/// The game to launch.
#[derive(Debug, Clone, Subcommand)]
pub enum GameCommand {
    /// Play the memory-match game.
    Memory {
        /// Pairs per board.
        #[arg(long, value_name = "COUNT")]
        pairs: Option<usize>,
        /// Category to start with.
        #[arg(long, value_name = "KEY")]
        category: Option<String>,
    },
    /// Play the sliding puzzle.
    Puzzle {
        /// Tiles per row and column.
        #[arg(long, value_name = "N")]
        size: Option<usize>,
        /// Random-walk steps per scramble.
        #[arg(long, value_name = "STEPS")]
        walk: Option<usize>,
    },
}

impl Args {
    /// Returns the default settings with the command-line overrides applied.
    #[must_use]
    pub fn settings(&self) -> ArcadeSettings {
        let mut settings = ArcadeSettings::default();
        match &self.game {
            Some(GameCommand::Memory { pairs, .. }) => {
                if let Some(pairs) = *pairs {
                    settings.memory.pair_count = pairs;
                }
            }
            Some(GameCommand::Puzzle { size, walk }) => {
                if let Some(size) = *size {
                    settings.puzzle.dimension = size;
                }
                if let Some(walk) = *walk {
                    settings.puzzle.walk_length = walk;
                }
            }
            None => {}
        }
        if self.instant {
            settings.memory.match_delay = Duration::ZERO;
            settings.memory.mismatch_delay = Duration::ZERO;
            settings.puzzle.pacing = ShufflePacing::Immediate;
        }
        settings
    }
}

/// Errors that end a command-line session.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CliError {
    /// Reading commands or writing output failed.
    #[display("terminal I/O failed: {_0}")]
    Io(#[from] io::Error),
    /// The puzzle settings are invalid.
    #[display("invalid puzzle settings: {_0}")]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Flip(CardId),
    Move(MoveTarget),
    New,
    Category(Option<String>),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveTarget {
    Index(usize),
    Cell { row: usize, col: usize },
}

impl MoveTarget {
    fn resolve(self, dimension: usize) -> Option<GridPosition> {
        match self {
            Self::Index(index) => Some(GridPosition::new(index)),
            Self::Cell { row, col } if row < dimension && col < dimension => {
                Some(GridPosition::from_row_col(row, col, dimension))
            }
            Self::Cell { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
enum CommandParseError {
    #[display("unknown command `{name}`, try `help`")]
    Unknown { name: String },
    #[display("`{command}` needs a number")]
    MissingNumber { command: String },
    #[display("`{value}` is not a valid number")]
    InvalidNumber { value: String },
    #[display("unexpected argument `{value}`")]
    TrailingArgument { value: String },
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default();
        let command = match name {
            "flip" | "f" => Self::Flip(CardId::new(number(name, words.next())?)),
            "move" | "m" => {
                let first = number(name, words.next())?;
                match words.next() {
                    Some(col) => Self::Move(MoveTarget::Cell {
                        row: first,
                        col: number(name, Some(col))?,
                    }),
                    None => Self::Move(MoveTarget::Index(first)),
                }
            }
            "new" | "n" => Self::New,
            "category" | "c" => Self::Category(words.next().map(str::to_owned)),
            "show" | "s" => Self::Show,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => {
                return Err(CommandParseError::Unknown {
                    name: name.to_owned(),
                });
            }
        };
        if let Some(extra) = words.next() {
            return Err(CommandParseError::TrailingArgument {
                value: extra.to_owned(),
            });
        }
        Ok(command)
    }
}

fn number<T>(command: &str, word: Option<&str>) -> Result<T, CommandParseError>
where
    T: FromStr,
{
    let word = word.ok_or_else(|| CommandParseError::MissingNumber {
        command: command.to_owned(),
    })?;
    word.parse().map_err(|_| CommandParseError::InvalidNumber {
        value: word.to_owned(),
    })
}

trait Host {
    const HELP: &'static str;

    fn start(&mut self, out: &mut dyn Write) -> io::Result<()>;
    fn execute(&mut self, command: Command, out: &mut dyn Write) -> io::Result<()>;
}

const MEMORY_HELP: &str = "\
commands:
  flip <id>        turn a card face up
  category [key]   switch category, or list categories
  new              deal a new board
  show             print the board
  quit             leave the game";

const PUZZLE_HELP: &str = "\
commands:
  move <pos>       slide the tile at a position (row-major, from 0)
  move <row> <col> slide the tile at a row and column (from 0)
  new              scramble a new puzzle
  show             print the grid
  quit             leave the game";

impl Host for MemorySession {
    const HELP: &'static str = MEMORY_HELP;

    fn start(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "category: {}", self.category())?;
        writeln!(out, "{}", self.snapshot())
    }

    fn execute(&mut self, command: Command, out: &mut dyn Write) -> io::Result<()> {
        match command {
            Command::Flip(id) => match self.flip(id) {
                FlipOutcome::Rejected(reason) => writeln!(out, "ignored: {reason}"),
                FlipOutcome::Revealed => writeln!(out, "{}", self.snapshot()),
                FlipOutcome::PairRevealed(_) => {
                    writeln!(out, "{}", self.snapshot())?;
                    settle_memory(self, out)
                }
            },
            Command::Category(None) => {
                for key in self.catalog().keys() {
                    let marker = if key == self.category() { "*" } else { " " };
                    writeln!(out, "{marker} {key}")?;
                }
                Ok(())
            }
            Command::Category(Some(key)) => {
                if self.select_category(&key) {
                    self.start(out)
                } else {
                    writeln!(out, "ignored: no category `{key}`")
                }
            }
            Command::New => {
                self.reset_board();
                self.start(out)
            }
            Command::Show => writeln!(out, "{}", self.snapshot()),
            Command::Move(_) => writeln!(out, "ignored: `move` is a puzzle command"),
            Command::Help | Command::Quit => Ok(()),
        }
    }
}

fn settle_memory(session: &mut MemorySession, out: &mut dyn Write) -> io::Result<()> {
    while let Some(wait) = session.time_until_next_transition() {
        thread::sleep(wait);
        for event in session.advance(wait) {
            match event {
                MemoryEvent::PairResolved {
                    first,
                    second,
                    outcome,
                } => writeln!(out, "cards {first} and {second}: {outcome}")?,
                MemoryEvent::Won { moves } => writeln!(out, "all pairs found in {moves} moves!")?,
            }
        }
    }
    writeln!(out, "{}", session.snapshot())
}

impl Host for PuzzleSession {
    const HELP: &'static str = PUZZLE_HELP;

    fn start(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.snapshot().state.is_shuffling() {
            writeln!(out, "shuffling...")?;
        }
        while let Some(wait) = self.time_until_next_transition() {
            thread::sleep(wait);
            for event in self.advance(wait) {
                if let PuzzleEvent::ShuffleFrame { revealed, total } = event {
                    log::trace!("shuffle frame {revealed}/{total}");
                }
            }
        }
        writeln!(out, "{}", self.snapshot())
    }

    fn execute(&mut self, command: Command, out: &mut dyn Write) -> io::Result<()> {
        match command {
            Command::Move(target) => {
                let dimension = self.snapshot().grid.dimension();
                let Some(target) = target.resolve(dimension) else {
                    return writeln!(out, "ignored: no such cell on a {dimension}x{dimension} grid");
                };
                apply_move(self, target, out)
            }
            Command::New => {
                self.new_game();
                self.start(out)
            }
            Command::Show => writeln!(out, "{}", self.snapshot()),
            Command::Flip(_) | Command::Category(_) => {
                writeln!(out, "ignored: not a puzzle command")
            }
            Command::Help | Command::Quit => Ok(()),
        }
    }
}

fn apply_move(
    session: &mut PuzzleSession,
    target: GridPosition,
    out: &mut dyn Write,
) -> io::Result<()> {
    match session.request_move(target) {
        MoveOutcome::Rejected(reason) => writeln!(out, "ignored: {reason}"),
        MoveOutcome::Moved => writeln!(out, "{}", session.snapshot()),
        MoveOutcome::Solved { moves } => {
            writeln!(out, "{}", session.snapshot())?;
            writeln!(out, "solved in {moves} moves!")?;
            if let Some(report) = session.last_report() {
                writeln!(out, "score reported for user {}", report.user_id)?;
            }
            Ok(())
        }
    }
}

/// Runs the hub with commands from `input`, writing everything to `output`.
///
/// Without a game subcommand, lists the games and returns.
///
/// # Errors
///
/// Returns an error if terminal I/O fails or the puzzle settings are invalid.
pub fn run<R, W>(args: &Args, input: R, mut output: W) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
{
    let settings = args.settings();
    let seed = args.seed.unwrap_or_else(GameSeed::random);
    if args.game.is_some() {
        writeln!(output, "seed: {seed}")?;
    }

    match &args.game {
        None => {
            writeln!(output, "games:")?;
            for game in GameKind::ALL {
                let name = game.to_string();
                writeln!(output, "  {:<8} {name:<16} {}", game.key(), game.description())?;
            }
        }
        Some(GameCommand::Memory { category, .. }) => {
            let catalog = args.catalog.as_ref().map_or_else(CategoryCatalog::fallback, |path| {
                load_catalog(&JsonFileProvider::new(path))
            });
            let seed = seed.derive(GameKind::Memory.key());
            let mut session = MemorySession::with_seed(catalog, &settings.memory, seed);
            if let Some(key) = category {
                if session.select_category(key) {
                    session.reset_board_with_seed(seed);
                } else {
                    writeln!(output, "unknown category `{key}`, keeping `{}`", session.category())?;
                }
            }
            repl(&mut session, input, &mut output)?;
        }
        Some(GameCommand::Puzzle { .. }) => {
            let reporter: Box<dyn ScoreReporter> = match &args.score_log {
                Some(path) => Box::new(JsonLinesScoreReporter::new(path)),
                None => Box::new(LogScoreReporter),
            };
            let mut session = PuzzleSession::with_seed(
                &settings.puzzle,
                args.owner.clone(),
                reporter,
                seed.derive(GameKind::Puzzle.key()),
            )?;
            repl(&mut session, input, &mut output)?;
        }
    }
    Ok(())
}

fn repl<H, R, W>(host: &mut H, input: R, output: &mut W) -> io::Result<()>
where
    H: Host,
    R: BufRead,
    W: Write,
{
    host.start(output)?;
    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            writeln!(output)?;
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Help) => writeln!(output, "{}", H::HELP)?,
            Ok(command) => host.execute(command, output)?,
            Err(err) => writeln!(output, "error: {err}")?,
        }
    }
}
