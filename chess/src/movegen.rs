use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::geometry;
use crate::moves::Move;
use crate::types::{CastlingSide, Cell, Color, Coord, File, Piece};

use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

fn diag_pieces(b: &Board, c: Color) -> Bitboard {
    b.piece2(c, Piece::Bishop) | b.piece2(c, Piece::Queen)
}

fn line_pieces(b: &Board, c: Color) -> Bitboard {
    b.piece2(c, Piece::Rook) | b.piece2(c, Piece::Queen)
}

/// Returns `true` if any piece of color `color` attacks the square `coord`
///
/// Pawns attack only diagonally forward, and castling is never considered an attack.
pub fn is_cell_attacked(b: &Board, coord: Coord, color: Color) -> bool {
    // Here, we use black attack map for white, as we need to trace the attack from destination piece,
    // not from the source one
    let pawn_attacks = attack::pawn(color.inv(), coord);

    // Near attacks
    if (b.piece2(color, Piece::Pawn) & pawn_attacks).is_nonempty()
        || (b.piece2(color, Piece::King) & attack::king(coord)).is_nonempty()
        || (b.piece2(color, Piece::Knight) & attack::knight(coord)).is_nonempty()
    {
        return true;
    }

    // Far attacks
    (attack::bishop(b, coord) & diag_pieces(b, color)).is_nonempty()
        || (attack::rook(b, coord) & line_pieces(b, color)).is_nonempty()
}

/// Returns all the pieces of color `color` which attack the square `coord`
pub fn cell_attackers(b: &Board, coord: Coord, color: Color) -> Bitboard {
    let pawn_attacks = attack::pawn(color.inv(), coord);
    (b.piece2(color, Piece::Pawn) & pawn_attacks)
        | (b.piece2(color, Piece::King) & attack::king(coord))
        | (b.piece2(color, Piece::Knight) & attack::knight(coord))
        | (attack::bishop(b, coord) & diag_pieces(b, color))
        | (attack::rook(b, coord) & line_pieces(b, color))
}

/// Returns the squares the piece on `src` may move to, ignoring the safety of its own king
///
/// Squares with pieces of the mover's color are never included, squares with opponent's pieces are.
/// If `src` is empty, the result is empty.
pub fn destinations(b: &Board, src: Coord) -> Bitboard {
    let cell = b.get(src);
    let (color, piece) = match (cell.color(), cell.piece()) {
        (Some(color), Some(piece)) => (color, piece),
        _ => return Bitboard::EMPTY,
    };
    let own = b.color(color);
    match piece {
        Piece::Pawn => pawn_destinations(b, src, color),
        Piece::Knight => attack::knight(src) & !own,
        Piece::Bishop => attack::bishop(b, src) & !own,
        Piece::Rook => attack::rook(b, src) & !own,
        Piece::Queen => attack::queen(b, src) & !own,
        Piece::King => (attack::king(src) & !own) | castling_destinations(b, src, cell),
    }
}

fn pawn_destinations(b: &Board, src: Coord, color: Color) -> Bitboard {
    let delta = geometry::pawn_forward_delta(color);
    let mut res = Bitboard::EMPTY;
    if let Some(single) = src.shift(0, delta) {
        if b.get(single).is_empty() {
            res.set(single);
            if src.rank() == geometry::double_move_src_rank(color) {
                if let Some(double) = single.shift(0, delta) {
                    if b.get(double).is_empty() {
                        res.set(double);
                    }
                }
            }
        }
    }
    res | (attack::pawn(color, src) & b.color(color.inv()))
}

fn castling_destinations(b: &Board, src: Coord, king: Cell) -> Bitboard {
    let color = match king.color() {
        Some(color) => color,
        None => return Bitboard::EMPTY,
    };
    let rank = geometry::castling_rank(color);
    if king.has_moved() || src != Coord::from_parts(File::E, rank) {
        return Bitboard::EMPTY;
    }
    let mut res = Bitboard::EMPTY;
    for side in [CastlingSide::King, CastlingSide::Queen] {
        if can_castle(b, color, side) {
            res.set(Move::from_castling(color, side).dst());
        }
    }
    res
}

/// Checks castling for color `c` on side `s`, assuming the king stands unmoved on its home square
fn can_castle(b: &Board, c: Color, s: CastlingSide) -> bool {
    let rank = geometry::castling_rank(c);
    let rook = b.get2(geometry::castling_rook_src(s), rank);
    if !rook.same_piece(Cell::from_parts(c, Piece::Rook)) || rook.has_moved() {
        return false;
    }

    // Squares that must be empty, and squares the king passes through
    let (between, pass): (&[File], [File; 2]) = match s {
        CastlingSide::King => (&[File::F, File::G], [File::F, File::G]),
        CastlingSide::Queen => (&[File::B, File::C, File::D], [File::D, File::C]),
    };
    if between
        .iter()
        .any(|&file| b.get2(file, rank).is_occupied())
    {
        return false;
    }

    let enemy = c.inv();
    if is_cell_attacked(b, Coord::from_parts(File::E, rank), enemy) {
        return false;
    }
    pass.iter()
        .all(|&file| !is_cell_attacked(b, Coord::from_parts(file, rank), enemy))
}

/// List of moves
///
/// Its capacity is enough to hold all the moves of one side in any valid position.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

pub mod semilegal {
    use super::*;

    /// Generates all the moves of color `c` allowed by piece movement rules, including the ones
    /// which leave the king under attack
    pub fn gen_all(b: &Board, c: Color) -> MoveList {
        let mut res = MoveList::new();
        for src in b.color(c) {
            for dst in destinations(b, src) {
                if let Ok(mv) = Move::from_coords(b, src, dst) {
                    res.push(mv);
                }
            }
        }
        res
    }
}
