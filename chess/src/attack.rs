use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::types::{Color, Coord};

#[inline]
const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/near_attacks.rs"));

pub const DIAG_DIRS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const LINE_DIRS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[inline]
pub fn king(coord: Coord) -> Bitboard {
    KING_ATTACKS[coord.index()]
}

#[inline]
pub fn knight(coord: Coord) -> Bitboard {
    KNIGHT_ATTACKS[coord.index()]
}

/// Squares a pawn of color `color` standing on `coord` captures onto
#[inline]
pub fn pawn(color: Color, coord: Coord) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[coord.index()],
        Color::Black => BLACK_PAWN_ATTACKS[coord.index()],
    }
}

/// Casts rays from `coord` one square at a time
///
/// Each ray includes every empty square it crosses and the first occupied square it meets,
/// whatever its color. The caller is expected to mask out its own pieces.
pub fn rays(b: &Board, coord: Coord, dirs: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(delta_file, delta_rank) in dirs {
        let mut p = coord;
        while let Some(next) = p.shift(delta_file, delta_rank) {
            res.set(next);
            if b.get(next).is_occupied() {
                break;
            }
            p = next;
        }
    }
    res
}

#[inline]
pub fn bishop(b: &Board, coord: Coord) -> Bitboard {
    rays(b, coord, &DIAG_DIRS)
}

#[inline]
pub fn rook(b: &Board, coord: Coord) -> Bitboard {
    rays(b, coord, &LINE_DIRS)
}

#[inline]
pub fn queen(b: &Board, coord: Coord) -> Bitboard {
    bishop(b, coord) | rook(b, coord)
}
