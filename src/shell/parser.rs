//! Shell command parser.

/// Parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// "bounds" - Global min/max weight
    Bounds,
    /// "info" - Book statistics
    Info,
    /// "isready" - Synchronization
    IsReady,
    /// "debug on/off"
    Debug(bool),
    /// "position startpos/fen [moves ...]"
    Position { fen: Option<String>, moves: Vec<String> },
    /// "lookup" - All book moves for the current position
    Lookup,
    /// "best" - Heaviest book move
    Best,
    /// "pick" - Weighted random book move
    Pick,
    /// "key" - Polyglot key of the current position
    Key,
    /// "d" - Display the current position
    Display,
    /// "quit" - Leave the shell
    Quit,
    /// Blank line
    Empty,
    /// Unknown command
    Unknown(String),
}

/// Parse a command line into a ShellCommand
pub fn parse_command(input: &str) -> ShellCommand {
    let input = input.trim();
    let mut parts = input.split_whitespace();

    match parts.next() {
        None => ShellCommand::Empty,
        Some("bounds") => ShellCommand::Bounds,
        Some("info") => ShellCommand::Info,
        Some("isready") => ShellCommand::IsReady,
        Some("debug") => {
            let on = parts.next() == Some("on");
            ShellCommand::Debug(on)
        }
        Some("position") => parse_position(&mut parts),
        Some("lookup") => ShellCommand::Lookup,
        Some("best") => ShellCommand::Best,
        Some("pick") => ShellCommand::Pick,
        Some("key") => ShellCommand::Key,
        Some("d") => ShellCommand::Display,
        Some("quit") | Some("exit") => ShellCommand::Quit,
        _ => ShellCommand::Unknown(input.to_string()),
    }
}

fn parse_position<'a>(parts: &mut impl Iterator<Item = &'a str>) -> ShellCommand {
    let mut fen = None;
    let mut moves = Vec::new();
    let mut parsing_moves = false;

    while let Some(token) = parts.next() {
        match token {
            "startpos" => {
                fen = None;
            }
            "fen" => {
                // Collect FEN string (up to 6 fields)
                let mut fen_parts = Vec::new();
                for _ in 0..6 {
                    match parts.next() {
                        Some("moves") => {
                            parsing_moves = true;
                            break;
                        }
                        Some(part) => fen_parts.push(part),
                        None => break,
                    }
                }
                if !fen_parts.is_empty() {
                    fen = Some(fen_parts.join(" "));
                }
            }
            "moves" => {
                parsing_moves = true;
            }
            _ if parsing_moves => {
                moves.push(token.to_string());
            }
            _ => {}
        }
    }

    ShellCommand::Position { fen, moves }
}
