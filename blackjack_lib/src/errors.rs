use std::error::Error;
use std::fmt::Display;

/// Error type for the recoverable failures of a blackjack game. In practice
/// the only recoverable failure is a rejected bet; malformed seat indexes and
/// out of phase calls are treated as contract violations and panic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackjackGameError {
    pub message: String,
}

impl BlackjackGameError {
    pub fn new(message: String) -> BlackjackGameError {
        BlackjackGameError { message }
    }
}

impl Display for BlackjackGameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for BlackjackGameError {}
