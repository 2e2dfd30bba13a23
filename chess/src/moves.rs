//! Moves and making them on the board

use crate::board::Board;
use crate::geometry;
use crate::legal;
use crate::types::{CastlingSide, Cell, Color, Coord, File, Piece};

use std::fmt;

use thiserror::Error;

/// Move kind
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Any move or capture except castling and promotion
    #[default]
    Simple = 0,
    /// Kingside castling
    CastlingKingside = 1,
    /// Queenside castling
    CastlingQueenside = 2,
    /// Pawn reaches the last rank and becomes a queen (either non-capture or capture)
    PromoteQueen = 3,
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl MoveKind {
    /// Returns the castling side if this move kind represents castling
    #[inline]
    pub fn castling_side(self) -> Option<CastlingSide> {
        match self {
            MoveKind::CastlingKingside => Some(CastlingSide::King),
            MoveKind::CastlingQueenside => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Returns the piece after promote if this move kind represents a promote
    #[inline]
    pub fn promote_to(self) -> Option<Piece> {
        match self {
            MoveKind::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }
}

/// Error creating move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CreateError {
    /// There is no piece to move
    #[error("no piece on source square {0}")]
    EmptySrc(Coord),
    /// Source and destination are the same square
    #[error("source and destination are the same square {0}")]
    SameSquare(Coord),
}

/// Chess move
///
/// A move is a pair of squares together with the side making it and its [`MoveKind`]. The kind is
/// not chosen by the player: it follows from the position, see [`Move::from_coords()`].
///
/// Creating a move doesn't mean it can be made. Use [`legal::is_legal()`] or
/// [`legal::destinations()`] to check that.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Coord,
    dst: Coord,
    side: Color,
}

impl Move {
    /// Creates a move of the piece standing on `src` to `dst` in position `b`
    ///
    /// A king going two files sideways is castling, and a pawn reaching the last rank is promoted.
    /// Everything else is a simple move.
    pub fn from_coords(b: &Board, src: Coord, dst: Coord) -> Result<Move, CreateError> {
        if src == dst {
            return Err(CreateError::SameSquare(src));
        }
        let cell = b.get(src);
        let (side, piece) = match (cell.color(), cell.piece()) {
            (Some(side), Some(piece)) => (side, piece),
            _ => return Err(CreateError::EmptySrc(src)),
        };
        let kind = match piece {
            Piece::King if src.row() == dst.row() && src.col().abs_diff(dst.col()) == 2 => {
                if dst.col() > src.col() {
                    MoveKind::CastlingKingside
                } else {
                    MoveKind::CastlingQueenside
                }
            }
            Piece::Pawn if dst.rank() == geometry::promote_dst_rank(side) => MoveKind::PromoteQueen,
            _ => MoveKind::Simple,
        };
        Ok(Move {
            kind,
            src,
            dst,
            side,
        })
    }

    /// Creates a castling move made by `color` with side `side`
    #[inline]
    pub fn from_castling(color: Color, side: CastlingSide) -> Move {
        let rank = geometry::castling_rank(color);
        Move {
            kind: MoveKind::from(side),
            src: Coord::from_parts(File::E, rank),
            dst: Coord::from_parts(geometry::castling_king_dst(side), rank),
            side: color,
        }
    }

    /// Returns `true` if the move is legal in position `b`
    #[inline]
    pub fn is_legal(&self, b: &Board) -> bool {
        legal::is_legal(b, *self)
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn side(&self) -> Color {
        self.side
    }
}

/// Formats the move as a pair of squares, like `e2e4`
///
/// Promotions get a trailing piece letter, like `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(piece) = self.kind.promote_to() {
            let cell = Cell::from_parts(Color::Black, piece);
            write!(f, "{}", cell.as_char())?;
        }
        Ok(())
    }
}

/// Makes the move `mv` on the board `b` and returns the captured piece
///
/// The moving piece gets its moved flag. Castling also relocates the rook, and promotion replaces
/// the pawn with a queen. If nothing is captured, [`Cell::EMPTY`] is returned.
///
/// The move is not checked for legality, but the source square must hold a piece of `mv.side()`.
pub fn make_move(b: &mut Board, mv: Move) -> Cell {
    let moving = b.get(mv.src);
    debug_assert_eq!(moving.color(), Some(mv.side));
    let captured = b.get(mv.dst);

    let placed = match mv.kind.promote_to() {
        Some(piece) => Cell::from_parts(mv.side, piece).moved(),
        None => moving.moved(),
    };
    b.r.put(mv.src, Cell::EMPTY);
    b.r.put(mv.dst, placed);

    if let Some(side) = mv.kind.castling_side() {
        let rank = geometry::castling_rank(mv.side);
        let rook_src = Coord::from_parts(geometry::castling_rook_src(side), rank);
        let rook_dst = Coord::from_parts(geometry::castling_rook_dst(side), rank);
        let rook = b.get(rook_src);
        debug_assert!(rook.same_piece(Cell::from_parts(mv.side, Piece::Rook)));
        b.r.put(rook_src, Cell::EMPTY);
        b.r.put(rook_dst, rook.moved());
    }

    captured
}
