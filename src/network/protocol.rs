//! Wire Protocol
//!
//! Line-oriented UTF-8 text protocol: one command per line from the
//! client, one or more response lines from the server. The grammar is
//! exact — tokens are separated by single spaces and coordinates are
//! signed integers. Anything else is answered with the help text, never
//! with a disconnect.

use std::fmt;

// =============================================================================
// CLIENT -> SERVER COMMANDS
// =============================================================================

/// A well-formed client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the current board snapshot.
    Look,
    /// Request the help text.
    Help,
    /// Disconnect.
    Bye,
    /// Reveal the cell at `(x, y)`.
    Dig {
        /// Column, 0-indexed from the left.
        x: i32,
        /// Row, 0-indexed from the top.
        y: i32,
    },
    /// Flag the cell at `(x, y)`.
    Flag {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },
    /// Remove the flag at `(x, y)`.
    Deflag {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },
}

impl Command {
    /// Parse one input line against the exact grammar:
    ///
    /// ```text
    /// (look) | (help) | (bye) | (dig X Y) | (flag X Y) | (deflag X Y)
    /// X, Y ::= -?[0-9]+
    /// ```
    ///
    /// Returns `None` for anything that does not match, including extra
    /// tokens, repeated spaces, or non-numeric coordinates.
    pub fn parse(line: &str) -> Option<Command> {
        let mut tokens = line.split(' ');
        let keyword = tokens.next()?;

        let command = match keyword {
            "look" => Command::Look,
            "help" => Command::Help,
            "bye" => Command::Bye,
            "dig" | "flag" | "deflag" => {
                let x = parse_coordinate(tokens.next()?)?;
                let y = parse_coordinate(tokens.next()?)?;
                match keyword {
                    "dig" => Command::Dig { x, y },
                    "flag" => Command::Flag { x, y },
                    _ => Command::Deflag { x, y },
                }
            }
            _ => return None,
        };

        if tokens.next().is_some() {
            return None;
        }
        Some(command)
    }
}

/// Parse a signed decimal coordinate: an optional leading `-` followed by
/// ASCII digits only. Values outside `i32` range are rejected like any
/// other malformed token.
fn parse_coordinate(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Reply to a `dig` that hit a bomb.
pub const BOOM_MESSAGE: &str = "BOOM!";

/// Reply to `bye`; the connection closes right after it is sent.
pub const DISCONNECT_MESSAGE: &str = "Bye";

/// Usage string, also the reply to any malformed input line.
pub const HELP_MESSAGE: &str = "Command syntax: [look], [dig x y], [flag x y], \
[deflag x y], [help], [bye] where x y are board size.";

/// Greeting sent once per connection. `players` counts open sessions
/// including the one being greeted.
pub fn greeting(players: usize, width: usize, height: usize) -> String {
    format!(
        "Welcome to Minesweeper. Players: {players} including you. \
Board: {width} columns by {height} rows. Type 'help' for help."
    )
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Look => write!(f, "look"),
            Command::Help => write!(f, "help"),
            Command::Bye => write!(f, "bye"),
            Command::Dig { x, y } => write!(f, "dig {x} {y}"),
            Command::Flag { x, y } => write!(f, "flag {x} {y}"),
            Command::Deflag { x, y } => write!(f, "deflag {x} {y}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("look"), Some(Command::Look));
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("bye"), Some(Command::Bye));
    }

    #[test]
    fn test_parse_coordinate_commands() {
        assert_eq!(Command::parse("dig 3 4"), Some(Command::Dig { x: 3, y: 4 }));
        assert_eq!(Command::parse("flag 0 0"), Some(Command::Flag { x: 0, y: 0 }));
        assert_eq!(
            Command::parse("deflag 12 7"),
            Some(Command::Deflag { x: 12, y: 7 })
        );
    }

    #[test]
    fn test_parse_negative_coordinates() {
        // Negative coordinates are grammatically valid; the board treats
        // them as out of bounds.
        assert_eq!(Command::parse("dig -1 5"), Some(Command::Dig { x: -1, y: 5 }));
        assert_eq!(Command::parse("dig 5 -1"), Some(Command::Dig { x: 5, y: -1 }));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        for line in [
            "",
            "LOOK",
            "look ",
            " look",
            "looky",
            "dig",
            "dig 3",
            "dig 3 4 5",
            "dig  3 4",
            "dig x y",
            "dig 3.5 4",
            "dig +3 4",
            "dig - 4",
            "bye now",
            "unflag 1 1",
        ] {
            assert_eq!(Command::parse(line), None, "line {line:?} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_coordinates() {
        assert_eq!(Command::parse("dig 99999999999 0"), None);
    }

    #[test]
    fn test_greeting_text() {
        assert_eq!(
            greeting(3, 12, 9),
            "Welcome to Minesweeper. Players: 3 including you. \
Board: 12 columns by 9 rows. Type 'help' for help."
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for command in [
            Command::Look,
            Command::Help,
            Command::Bye,
            Command::Dig { x: 2, y: -3 },
            Command::Flag { x: 0, y: 8 },
            Command::Deflag { x: 4, y: 4 },
        ] {
            assert_eq!(Command::parse(&command.to_string()), Some(command));
        }
    }
}
