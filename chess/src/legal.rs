//! Legal move filtering
//!
//! A move is legal if it's allowed by piece movement rules and doesn't leave the mover's king under
//! attack. The latter is checked by making the move on a copy of the board (with castling and
//! promotion applied exactly as on commit) and looking for attacks on the king afterwards.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen::{self, MoveList};
use crate::moves::Move;
use crate::types::{Color, Coord};

/// Returns `true` if the move `mv` doesn't leave the king of `mv.side()` under attack
///
/// The move itself must be allowed by piece movement rules, see [`movegen::destinations()`].
#[inline]
pub fn is_legal(b: &Board, mv: Move) -> bool {
    !b.make_move(mv).is_check(mv.side())
}

/// Returns the squares the piece on `src` may legally move to
///
/// If `src` is empty, the result is empty.
pub fn destinations(b: &Board, src: Coord) -> Bitboard {
    movegen::destinations(b, src)
        .into_iter()
        .filter(|&dst| Move::from_coords(b, src, dst).map_or(false, |mv| mv.is_legal(b)))
        .collect()
}

/// Generates all the legal moves of color `c`
pub fn gen_all(b: &Board, c: Color) -> MoveList {
    let mut res = MoveList::new();
    for mv in movegen::semilegal::gen_all(b, c).iter() {
        if is_legal(b, *mv) {
            res.push(*mv);
        }
    }
    res
}

/// Returns `true` if color `c` has at least one legal move
///
/// Stops at the first legal move found.
pub fn has_legal_moves(b: &Board, c: Color) -> bool {
    b.color(c).into_iter().any(|src| {
        movegen::destinations(b, src)
            .into_iter()
            .any(|dst| Move::from_coords(b, src, dst).map_or(false, |mv| mv.is_legal(b)))
    })
}
