//! # Tapchess
//!
//! Tapchess is a chess rules engine for tap-driven two-player games. It keeps the board, computes legal
//! moves for every piece (including castling and promotion), detects check, checkmate and stalemate, and
//! advances the game turn by turn. It doesn't draw anything: the presentation layer forwards taps as
//! squares and renders what [`Game`] reports back.
//!
//! En passant, draws by repetition or by the fifty-move rule, and move notations are not supported.
//!
//! # Example
//!
//! ```
//! use tapchess::{Game, GameStatus, Color};
//!
//! let mut game = Game::new();
//! for (src, dst) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
//!     game.select(src.parse().unwrap());
//!     let report = game.move_to(dst.parse().unwrap()).unwrap();
//!     assert_eq!(report.mv.to_string(), format!("{}{}", src, dst));
//! }
//!
//! assert_eq!(game.status(), GameStatus::Checkmate(Color::Black));
//! assert!(game.is_check());
//! ```

pub mod attack;
pub mod board;
pub mod game;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod types;

pub use tapchess_base::bitboard;
pub(crate) use tapchess_base::geometry;

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use game::{Game, MoveReport, PendingMove};
pub use movegen::MoveList;
pub use moves::{Move, MoveKind};
pub use types::{CastlingSide, Cell, Color, Coord, File, GameStatus, Piece, Rank};
