//! Shell command handler and main loop.

use super::parser::{parse_command, ShellCommand};
use super::{setup_board, ShellError};
use crate::book::{BookMove, BookPosition, PolyglotBook};
use crate::types::Board;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};

/// Shell over a loaded, read-only book
pub struct BookShell<'a, W: Write> {
    /// Book answering the lookups
    book: &'a PolyglotBook,
    /// Current board position
    board: Board,
    /// Reply stream
    out: W,
    /// Random source for "pick"
    rng: StdRng,
    /// Debug mode enabled
    debug: bool,
    /// Should the shell quit
    quit: bool,
}

impl<'a> BookShell<'a, io::Stdout> {
    /// Shell replying on stdout
    pub fn stdout(book: &'a PolyglotBook) -> Self {
        Self::new(book, io::stdout(), StdRng::from_os_rng())
    }
}

impl<'a, W: Write> BookShell<'a, W> {
    pub fn new(book: &'a PolyglotBook, out: W, rng: StdRng) -> Self {
        Self {
            book,
            board: Board::default(),
            out,
            rng,
            debug: false,
            quit: false,
        }
    }

    /// Run the main loop until "quit" or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if self.debug {
                log::debug!("< {}", line);
            }
            self.handle_input(&line)?;
            if self.quit {
                break;
            }
        }
        self.out.flush()
    }

    /// Handle a single command line
    pub fn handle_input(&mut self, input: &str) -> io::Result<()> {
        let cmd = parse_command(input);
        self.handle_command(cmd)
    }

    /// Current board position
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Consume the shell and return its output stream
    pub fn into_output(self) -> W {
        self.out
    }

    fn handle_command(&mut self, cmd: ShellCommand) -> io::Result<()> {
        match cmd {
            ShellCommand::Bounds => self.cmd_bounds(),
            ShellCommand::Info => self.cmd_info(),
            ShellCommand::IsReady => self.send("readyok"),
            ShellCommand::Debug(on) => {
                self.debug = on;
                Ok(())
            }
            ShellCommand::Position { fen, moves } => self.cmd_position(fen.as_deref(), &moves),
            ShellCommand::Lookup => self.cmd_lookup(),
            ShellCommand::Best => self.cmd_best(),
            ShellCommand::Pick => self.cmd_pick(),
            ShellCommand::Key => self.cmd_key(),
            ShellCommand::Display => self.cmd_display(),
            ShellCommand::Quit => {
                self.quit = true;
                Ok(())
            }
            ShellCommand::Empty => Ok(()),
            ShellCommand::Unknown(s) => {
                let err = ShellError::InvalidArgument(format!("unknown command '{}'", s));
                self.send_error(&err)
            }
        }
    }

    /// Send a reply line
    fn send(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg)?;
        self.out.flush()
    }

    fn send_error(&mut self, err: &ShellError) -> io::Result<()> {
        log::debug!("shell error: {}", err);
        self.send(&format!("error {}", err))
    }

    // === Commands ===

    fn cmd_bounds(&mut self) -> io::Result<()> {
        let (min, max) = self.book.bounds();
        self.send(&format!("bounds {} {}", min, max))
    }

    fn cmd_info(&mut self) -> io::Result<()> {
        let (min, max) = self.book.bounds();
        let msg = format!(
            "info entries {} keys {} min {} max {}",
            self.book.len(),
            self.book.key_count(),
            min,
            max
        );
        self.send(&msg)
    }

    fn cmd_position(&mut self, fen: Option<&str>, moves: &[String]) -> io::Result<()> {
        match setup_board(fen, moves) {
            Ok(board) => {
                self.board = board;
                Ok(())
            }
            // Board is left unchanged
            Err(e) => self.send_error(&e),
        }
    }

    fn cmd_lookup(&mut self) -> io::Result<()> {
        let moves = self.book.lookup_moves(&self.board);
        for wm in &moves {
            self.send(&format!("move {} weight {}", wm.mv.notation(), wm.weight))?;
        }
        self.send("end")
    }

    fn cmd_best(&mut self) -> io::Result<()> {
        match self.book.best_move(&self.board) {
            Some(m) => self.send(&format!("bestmove {}", m.notation())),
            None => self.send("bestmove 0000"),
        }
    }

    fn cmd_pick(&mut self) -> io::Result<()> {
        match self.book.pick_move(&self.board, &mut self.rng) {
            Some(m) => self.send(&format!("bestmove {}", m.notation())),
            None => self.send("bestmove 0000"),
        }
    }

    fn cmd_key(&mut self) -> io::Result<()> {
        match self.board.polyglot_key() {
            Some(key) => self.send(&format!("key {:016x}", key)),
            None => self.send("key none"),
        }
    }

    fn cmd_display(&mut self) -> io::Result<()> {
        // Diagnostics go to stderr, replies stay on the output stream
        eprintln!("FEN: {}", self.board);
        eprintln!("Side to move: {:?}", self.board.side_to_move());
        Ok(())
    }
}
