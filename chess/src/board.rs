//! Board and related things

use crate::bitboard::Bitboard;
use crate::movegen;
use crate::moves::{self, Move};
use crate::types::{Cell, Color, Coord, File, Piece, Rank};

use std::fmt::{self, Display};

use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0}")]
    TooManyKings(Color),
    /// There is a pawn on the 1th or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The side that just moved has its king under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Raw chess board
///
/// Raw board is just 64 cells. Unlike [`Board`], it is not validated and may contain an invalid
/// position, so it is used to build positions programmatically. After putting the pieces, convert it
/// into [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use tapchess::{RawBoard, Board, File, Rank, Color, Piece, Cell};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put2(File::B, Rank::R2, Cell::from_parts(Color::White, Piece::King));
/// raw.put2(File::D, Rank::R5, Cell::from_parts(Color::Black, Piece::King));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.king_pos(Color::Black).to_string(), "d5");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the board
    ///
    /// The indices in this array are the indices of coordinates, i.e. `row * 8 + col`.
    pub cells: [Cell; 64],
}

impl RawBoard {
    /// Returns an empty `RawBoard`
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; 64],
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
        let mut res = RawBoard::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, Piece::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, Piece::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            res.put2(File::A, rank, Cell::from_parts(color, Piece::Rook));
            res.put2(File::B, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::C, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::D, rank, Cell::from_parts(color, Piece::Queen));
            res.put2(File::E, rank, Cell::from_parts(color, Piece::King));
            res.put2(File::F, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::G, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::H, rank, Cell::from_parts(color, Piece::Rook));
        }
        res
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use tapchess::{RawBoard, board::PrettyStyle};
    /// #
    /// let r = RawBoard::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    ///  |abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    ///
    /// let res = r#"
    /// 8│♜♞♝♛♚♝♞♜
    /// 7│♟♟♟♟♟♟♟♟
    /// 6│........
    /// 5│........
    /// 4│........
    /// 3│........
    /// 2│♙♙♙♙♙♙♙♙
    /// 1│♖♘♗♕♔♗♘♖
    /// ─┼────────
    ///  │abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Utf8).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Board that contains a valid position
///
/// This board always has exactly one king of each color, at most 16 pieces of each color and
/// no pawns on the back ranks. It is a plain array of 64 cells, so copying it is cheap: move
/// legality is checked by making the move on a copy and looking at the result.
///
/// The board doesn't know whose turn it is. The side to move is tracked by
/// [`Game`](crate::game::Game).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub(crate) r: RawBoard,
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board {
            r: RawBoard::initial(),
        }
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.r.get(c)
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.r.get2(file, rank)
    }

    /// Returns the piece on the square with coordinate `c`, or `None` if it's empty
    #[inline]
    pub fn piece_at(&self, c: Coord) -> Option<Cell> {
        let cell = self.get(c);
        cell.is_occupied().then_some(cell)
    }

    /// Returns the set of squares occupied by pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        Coord::iter()
            .filter(|&p| self.get(p).color() == Some(c))
            .collect()
    }

    /// Returns the set of all occupied squares
    pub fn occupied(&self) -> Bitboard {
        Coord::iter().filter(|&p| self.get(p).is_occupied()).collect()
    }

    /// Returns the set of squares occupied by pieces of color `c` and kind `p`
    pub fn piece2(&self, c: Color, p: Piece) -> Bitboard {
        let cell = Cell::from_parts(c, p);
        Coord::iter()
            .filter(|&coord| self.get(coord).same_piece(cell))
            .collect()
    }

    /// Returns the position of the king of color `c`
    ///
    /// # Panics
    ///
    /// Panics if there is no such king, which cannot happen on a valid board.
    #[inline]
    pub fn king_pos(&self, c: Color) -> Coord {
        let king = Cell::from_parts(c, Piece::King);
        Coord::iter()
            .find(|&p| self.get(p).same_piece(king))
            .expect("board must contain a king of each color")
    }

    /// Returns `true` if the king of color `c` is under attack
    #[inline]
    pub fn is_check(&self, c: Color) -> bool {
        movegen::is_cell_attacked(self, self.king_pos(c), c.inv())
    }

    /// Returns the pieces that give check to the king of color `c`
    #[inline]
    pub fn checkers(&self, c: Color) -> Bitboard {
        movegen::cell_attackers(self, self.king_pos(c), c.inv())
    }

    /// Returns a new board with the piece on `src` relocated to `dst`
    ///
    /// The piece is marked as moved and whatever stood on `dst` is removed. Unlike
    /// [`Board::make_move()`], this doesn't move the castling rook and doesn't promote pawns.
    pub fn with_move_applied(&self, src: Coord, dst: Coord) -> Board {
        debug_assert!(self.get(src).is_occupied(), "no piece on {}", src);
        let mut res = *self;
        let cell = res.get(src);
        res.r.put(src, Cell::EMPTY);
        res.r.put(dst, cell.moved());
        res
    }

    /// Returns a new board with the move `mv` made, exactly as the game would commit it
    ///
    /// The move is not checked for legality.
    pub fn make_move(&self, mv: Move) -> Board {
        let mut res = *self;
        moves::make_move(&mut res, mv);
        res
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// See docs for [`RawBoard::pretty()`] for more usage details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::initial()
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: RawBoard) -> Result<Board, ValidateError> {
        for color in [Color::White, Color::Black] {
            let mut pieces = 0;
            let mut kings = 0;
            for cell in raw.cells {
                if cell.color() != Some(color) {
                    continue;
                }
                pieces += 1;
                if cell.piece() == Some(Piece::King) {
                    kings += 1;
                }
            }
            if pieces > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            if kings == 0 {
                return Err(ValidateError::NoKing(color));
            }
            if kings > 1 {
                return Err(ValidateError::TooManyKings(color));
            }
        }

        for rank in [Rank::R1, Rank::R8] {
            for file in File::iter() {
                if raw.get2(file, rank).piece() == Some(Piece::Pawn) {
                    return Err(ValidateError::InvalidPawn(Coord::from_parts(file, rank)));
                }
            }
        }

        Ok(Board { r: raw })
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

impl From<Board> for RawBoard {
    #[inline]
    fn from(b: Board) -> RawBoard {
        b.r
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawBoard,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;

    fn cell(c: Cell) -> char;

    fn fmt(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(r.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, " {}", Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::mem;

    /// Builds a board from eight rows of piece chars, row 0 first
    ///
    /// All the pieces are considered unmoved.
    pub(crate) fn diagram(rows: [&str; 8]) -> Board {
        raw_diagram(rows).try_into().unwrap()
    }

    pub(crate) fn raw_diagram(rows: [&str; 8]) -> RawBoard {
        let mut raw = RawBoard::empty();
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), 8, "bad diagram row {:?}", line);
            for (col, ch) in line.chars().enumerate() {
                raw.put(Coord::new(row, col), Cell::from_char(ch).unwrap());
            }
        }
        raw
    }

    fn count(b: &Board, p: Piece) -> u32 {
        b.piece2(Color::White, p).len() + b.piece2(Color::Black, p).len()
    }

    #[test]
    fn test_size() {
        assert_eq!(mem::size_of::<RawBoard>(), 64);
        assert_eq!(mem::size_of::<Board>(), 64);
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(count(&b, Piece::Pawn), 16);
        assert_eq!(count(&b, Piece::Rook), 4);
        assert_eq!(count(&b, Piece::Knight), 4);
        assert_eq!(count(&b, Piece::Bishop), 4);
        assert_eq!(count(&b, Piece::Queen), 2);
        assert_eq!(count(&b, Piece::King), 2);
        assert_eq!(b.occupied().len(), 32);

        let order = "rnbqkbnr";
        for (col, ch) in order.chars().enumerate() {
            assert_eq!(b.get(Coord::new(0, col)).as_char(), ch);
            assert_eq!(
                b.get(Coord::new(7, col)).as_char(),
                ch.to_ascii_uppercase()
            );
            assert_eq!(b.get(Coord::new(1, col)).as_char(), 'p');
            assert_eq!(b.get(Coord::new(6, col)).as_char(), 'P');
        }
        assert!(Coord::iter().all(|c| !b.get(c).has_moved()));

        assert_eq!(b, Board::try_from(RawBoard::initial()).unwrap());
        assert_eq!(
            b.king_pos(Color::White),
            Coord::from_parts(File::E, Rank::R1)
        );
        assert_eq!(
            b.king_pos(Color::Black),
            Coord::from_parts(File::E, Rank::R8)
        );
        assert!(!b.is_check(Color::White));
        assert!(!b.is_check(Color::Black));
    }

    #[test]
    fn test_piece_at() {
        let b = Board::initial();
        assert_eq!(b.piece_at("e4".parse().unwrap()), None);
        assert_eq!(
            b.piece_at("d8".parse().unwrap()),
            Some(Cell::from_parts(Color::Black, Piece::Queen))
        );
    }

    #[test]
    fn test_with_move_applied() {
        let b = Board::initial();
        let e2 = "e2".parse().unwrap();
        let e4 = "e4".parse().unwrap();
        let moved = b.with_move_applied(e2, e4);
        assert_eq!(moved.get(e2), Cell::EMPTY);
        assert_eq!(
            moved.get(e4),
            Cell::from_parts(Color::White, Piece::Pawn).moved()
        );
        assert!(moved.get(e4).has_moved());
        // The source board stays untouched
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_validate() {
        let mut raw = RawBoard::empty();
        raw.put2(File::E, Rank::R1, Cell::from_parts(Color::White, Piece::King));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::NoKing(Color::Black))
        );

        raw.put2(File::E, Rank::R8, Cell::from_parts(Color::Black, Piece::King));
        raw.put2(File::A, Rank::R8, Cell::from_parts(Color::Black, Piece::King));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::TooManyKings(Color::Black))
        );

        raw.put2(File::A, Rank::R8, Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::InvalidPawn(Coord::from_parts(File::A, Rank::R8)))
        );

        raw.put2(File::A, Rank::R8, Cell::EMPTY);
        assert!(Board::try_from(raw).is_ok());

        let mut raw = RawBoard::initial();
        raw.put2(File::E, Rank::R4, Cell::from_parts(Color::White, Piece::Knight));
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::TooManyPieces(Color::White))
        );
    }

    #[test]
    fn test_checkers() {
        let b = diagram([
            "....k...",
            "........",
            "........",
            "........",
            "B.......",
            "........",
            "........",
            "....R.K.",
        ]);
        assert!(b.is_check(Color::Black));
        assert!(!b.is_check(Color::White));
        assert_eq!(
            b.checkers(Color::Black),
            Bitboard::EMPTY
                .with("a4".parse().unwrap())
                .with("e1".parse().unwrap())
        );
    }

    #[test]
    fn test_pretty() {
        let b = diagram([
            "....k...",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....P...",
            "....K...",
        ]);
        let expected = "8|....k...\n7|........\n6|........\n5|........\n4|........\n3|........\n2|....P...\n1|....K...\n-+--------\n |abcdefgh\n";
        assert_eq!(b.pretty(PrettyStyle::Ascii).to_string(), expected);
    }
}
