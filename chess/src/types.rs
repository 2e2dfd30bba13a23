pub use tapchess_base::types::*;

use std::fmt;

/// Status of the game
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The game is running
    #[default]
    Playing,
    /// The side to move is checkmated, and the other side wins
    Checkmate(Color),
    /// The side to move has no legal moves but is not in check
    Stalemate,
}

impl GameStatus {
    /// Returns `true` if the game is over
    #[inline]
    pub fn is_finished(&self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    /// Returns the winner, if any
    #[inline]
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Playing => write!(f, "playing"),
            GameStatus::Checkmate(c) => write!(f, "{} wins by checkmate", c),
            GameStatus::Stalemate => write!(f, "draw by stalemate"),
        }
    }
}
