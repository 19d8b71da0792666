// Polyglot opening book command line

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use polybook::book::{BookMove, BookPosition, PolyglotBook};
use polybook::shell::{setup_board, BookShell};
use polybook::types::Board;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Polyglot book file (.bin); repeat to merge several books
    #[arg(short, long = "book", required = true)]
    books: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the smallest and largest weight in the book
    Bounds {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the book moves for a position, heaviest first
    Lookup {
        #[command(flatten)]
        position: PositionArgs,
        /// Print as a JSON object of move -> weight
        #[arg(long)]
        json: bool,
    },
    /// Print the heaviest book move
    Best {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Print a weighted random book move
    Pick {
        #[command(flatten)]
        position: PositionArgs,
        /// Seed for reproducible picks
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Read commands from stdin
    Shell,
}

#[derive(ClapArgs, Debug)]
struct PositionArgs {
    /// Position in FEN (defaults to the start position)
    #[arg(long)]
    fen: Option<String>,

    /// Moves in UCI notation played from the position
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,
}

impl PositionArgs {
    fn board(&self) -> Result<Board> {
        Ok(setup_board(self.fen.as_deref(), &self.moves)?)
    }
}

#[derive(Serialize)]
struct BoundsReport {
    min: u32,
    max: u32,
    entries: usize,
    keys: usize,
}

fn main() {
    let args = Args::parse();

    init_logging(args.debug);

    if let Err(e) = run(args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );

    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr);

    builder.init();
}

/// Ingest every book into one index, in command line order
fn load_books(paths: &[PathBuf]) -> Result<PolyglotBook> {
    let mut book = PolyglotBook::new();
    for path in paths {
        let count = book
            .ingest_file(path)
            .with_context(|| format!("failed to load book {}", path.display()))?;
        log::info!("loaded {} entries from {}", count, path.display());
    }
    Ok(book)
}

fn run(args: Args) -> Result<()> {
    let book = load_books(&args.books)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Bounds { json } => {
            let (min, max) = book.bounds();
            if json {
                let report = BoundsReport {
                    min,
                    max,
                    entries: book.len(),
                    keys: book.key_count(),
                };
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else {
                writeln!(out, "{} {}", min, max)?;
            }
        }
        Command::Lookup { position, json } => {
            let board = position.board()?;
            if json {
                writeln!(out, "{}", serde_json::to_string(&book.lookup_map(&board))?)?;
            } else {
                for wm in book.lookup_moves(&board) {
                    writeln!(out, "{} {}", wm.mv.notation(), wm.weight)?;
                }
            }
        }
        Command::Best { position } => {
            let board = position.board()?;
            match book.best_move(&board) {
                Some(m) => writeln!(out, "{}", m.notation())?,
                None => log::info!("position {} is not in the book", key_string(&board)),
            }
        }
        Command::Pick { position, seed } => {
            let board = position.board()?;
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_os_rng(),
            };
            match book.pick_move(&board, &mut rng) {
                Some(m) => writeln!(out, "{}", m.notation())?,
                None => log::info!("position {} is not in the book", key_string(&board)),
            }
        }
        Command::Shell => {
            drop(out);
            let stdin = io::stdin();
            BookShell::stdout(&book).run(stdin.lock())?;
            return Ok(());
        }
    }

    out.flush()?;
    Ok(())
}

fn key_string(board: &Board) -> String {
    board
        .polyglot_key()
        .map_or_else(|| "(no key)".to_string(), |k| format!("{:016x}", k))
}
