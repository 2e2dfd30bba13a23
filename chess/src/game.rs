//! Game state machine
//!
//! [`Game`] owns the board and everything around it: whose turn it is, the selected piece with its
//! legal destinations, captured pieces and the game status. Every input is total: an input that
//! doesn't make sense in the current state is ignored (or just clears the selection), so the
//! presentation layer may forward any tap without checking it first.

use crate::bitboard::Bitboard;
use crate::board::{Board, ValidateError};
use crate::legal;
use crate::movegen::MoveList;
use crate::moves::{self, Move, MoveKind};
use crate::types::{Cell, Color, Coord, GameStatus};

use arrayvec::ArrayVec;
use tracing::{debug, info, trace};

/// Pieces captured by one side, in capture order
pub type Captured = ArrayVec<Cell, 16>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    src: Coord,
    dsts: Bitboard,
}

/// Move which has been accepted but not committed yet
///
/// Holds both the position before the move and the position after it, so the presentation layer
/// may animate the piece between them. See [`Game::begin_move()`] and [`Game::commit()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    mv: Move,
    before: Board,
    after: Board,
    captured: Cell,
}

impl PendingMove {
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[inline]
    pub fn before(&self) -> &Board {
        &self.before
    }

    #[inline]
    pub fn after(&self) -> &Board {
        &self.after
    }

    /// Returns the piece which is going to be captured
    #[inline]
    pub fn captured(&self) -> Option<Cell> {
        self.captured.is_occupied().then_some(self.captured)
    }
}

/// Result of a committed move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// Move that was made
    pub mv: Move,
    /// Captured piece, if any
    pub captured: Option<Cell>,
    /// Whether the side to move after this move is in check
    pub check: bool,
    /// Game status after this move
    pub status: GameStatus,
}

impl MoveReport {
    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.mv.kind()
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// Chess game
///
/// # Example
///
/// ```
/// # use tapchess::{Game, Color, Coord};
/// #
/// let mut game = Game::new();
/// let e2: Coord = "e2".parse().unwrap();
/// let e4: Coord = "e4".parse().unwrap();
///
/// game.tap(e2);
/// assert_eq!(game.selected(), Some(e2));
/// assert_eq!(game.legal_destinations().len(), 2);
///
/// let report = game.tap(e4).unwrap();
/// assert!(!report.is_capture());
/// assert_eq!(game.side(), Color::Black);
/// assert_eq!(game.selected(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    side: Color,
    status: GameStatus,
    check: bool,
    selection: Option<Selection>,
    pending: Option<PendingMove>,
    captured: [Captured; 2],
}

impl Game {
    /// Creates a game from the initial position, with White to move
    pub fn new() -> Game {
        Game {
            board: Board::initial(),
            side: Color::White,
            status: GameStatus::Playing,
            check: false,
            selection: None,
            pending: None,
            captured: [Captured::new(), Captured::new()],
        }
    }

    /// Creates a game from the position `board` with `side` to move
    ///
    /// The status is evaluated right away, so the game may be already finished.
    pub fn from_position(board: Board, side: Color) -> Result<Game, ValidateError> {
        if board.is_check(side.inv()) {
            return Err(ValidateError::OpponentKingAttacked);
        }
        let mut game = Game {
            board,
            side,
            ..Game::new()
        };
        game.update_status();
        Ok(game)
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns `true` if the side to move is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        self.check
    }

    #[inline]
    pub fn selected(&self) -> Option<Coord> {
        self.selection.as_ref().map(|s| s.src)
    }

    /// Returns the legal destinations of the selected piece
    ///
    /// If nothing is selected, the result is empty.
    #[inline]
    pub fn legal_destinations(&self) -> Bitboard {
        self.selection
            .as_ref()
            .map_or(Bitboard::EMPTY, |s| s.dsts)
    }

    /// Returns the pieces captured by color `c`, in capture order
    #[inline]
    pub fn captured(&self, c: Color) -> &[Cell] {
        &self.captured[c.index()]
    }

    #[inline]
    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    /// Returns all the legal moves for the side to move
    pub fn legal_moves(&self) -> MoveList {
        if self.status.is_finished() {
            return MoveList::new();
        }
        legal::gen_all(&self.board, self.side)
    }

    fn accepts_input(&self) -> bool {
        self.status == GameStatus::Playing && self.pending.is_none()
    }

    /// Selects the piece on `coord`
    ///
    /// Only pieces of the side to move can be selected. Selecting the already selected piece clears
    /// the selection, and selecting a square without own piece does nothing.
    pub fn select(&mut self, coord: Coord) {
        if !self.accepts_input() {
            trace!(%coord, "select ignored, game doesn't accept input");
            return;
        }
        if self.board.get(coord).color() != Some(self.side) {
            trace!(%coord, "select ignored, no own piece");
            return;
        }
        if self.selected() == Some(coord) {
            debug!(%coord, "selection cleared");
            self.selection = None;
            return;
        }
        let dsts = legal::destinations(&self.board, coord);
        debug!(%coord, destinations = dsts.len(), "piece selected");
        self.selection = Some(Selection { src: coord, dsts });
    }

    /// Moves the selected piece to `coord`
    ///
    /// If `coord` is not a legal destination of the selected piece, the selection is cleared and
    /// `None` is returned. Otherwise, the move is made as if by [`Game::begin_move()`] followed by
    /// [`Game::commit()`].
    pub fn move_to(&mut self, coord: Coord) -> Option<MoveReport> {
        if !self.accepts_input() {
            trace!(%coord, "move ignored, game doesn't accept input");
            return None;
        }
        let selection = self.selection.take()?;
        if !selection.dsts.has(coord) {
            trace!(src = %selection.src, dst = %coord, "not a legal destination, selection cleared");
            return None;
        }
        self.begin_move(selection.src, coord)?;
        self.commit()
    }

    /// Handles a tap on `coord`
    ///
    /// A tap on a piece of the side to move selects it (or clears the selection, if it's already
    /// selected). Any other tap is a move attempt for the selected piece.
    pub fn tap(&mut self, coord: Coord) -> Option<MoveReport> {
        if self.board.get(coord).color() == Some(self.side) {
            self.select(coord);
            return None;
        }
        self.move_to(coord)
    }

    /// Starts a move from `src` to `dst`
    ///
    /// The move must be legal for the side to move. The selection is cleared, and the move is kept
    /// as pending until [`Game::commit()`] or [`Game::cancel()`]. Returns `None` if the move is
    /// rejected.
    pub fn begin_move(&mut self, src: Coord, dst: Coord) -> Option<&PendingMove> {
        if !self.accepts_input() {
            trace!(%src, %dst, "move ignored, game doesn't accept input");
            return None;
        }
        self.selection = None;
        if self.board.get(src).color() != Some(self.side) {
            trace!(%src, %dst, "move rejected, no own piece");
            return None;
        }
        let mv = match Move::from_coords(&self.board, src, dst) {
            Ok(mv) => mv,
            Err(e) => {
                trace!(%src, %dst, error = %e, "move rejected");
                return None;
            }
        };
        if !legal::destinations(&self.board, src).has(dst) {
            trace!(%mv, "move rejected, not legal");
            return None;
        }
        let mut after = self.board;
        let captured = moves::make_move(&mut after, mv);
        self.pending = Some(PendingMove {
            mv,
            before: self.board,
            after,
            captured,
        });
        self.pending.as_ref()
    }

    /// Commits the pending move
    ///
    /// Returns `None` if there is no pending move.
    pub fn commit(&mut self) -> Option<MoveReport> {
        let PendingMove {
            mv,
            after,
            captured,
            ..
        } = self.pending.take()?;
        if captured.is_occupied() {
            self.captured[mv.side().index()].push(captured);
        }
        self.board = after;
        self.side = self.side.inv();
        self.update_status();

        #[cfg(feature = "selftest")]
        self.selftest();

        let report = MoveReport {
            mv,
            captured: captured.is_occupied().then_some(captured),
            check: self.check,
            status: self.status,
        };
        debug!(
            %mv,
            kind = ?mv.kind(),
            captured = ?report.captured,
            check = report.check,
            "move committed"
        );
        if self.status.is_finished() {
            info!(status = %self.status, "game over");
        }
        Some(report)
    }

    /// Drops the pending move, leaving the position untouched
    ///
    /// Returns `true` if there was a pending move.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(p) => {
                debug!(mv = %p.mv, "pending move cancelled");
                true
            }
            None => false,
        }
    }

    /// Starts a new game from the initial position
    pub fn reset(&mut self) {
        *self = Game::new();
        info!("new game");
    }

    fn update_status(&mut self) {
        self.check = self.board.is_check(self.side);
        self.status = if legal::has_legal_moves(&self.board, self.side) {
            GameStatus::Playing
        } else if self.check {
            GameStatus::Checkmate(self.side.inv())
        } else {
            GameStatus::Stalemate
        };
    }

    #[cfg(feature = "selftest")]
    fn selftest(&self) {
        if let Err(e) = Board::try_from(*self.board.raw()) {
            panic!("board became invalid after commit: {}", e);
        }
        assert!(
            !self.board.is_check(self.side.inv()),
            "side that just moved is in check"
        );
    }
}

impl Default for Game {
    #[inline]
    fn default() -> Game {
        Game::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::diagram;
    use crate::types::Piece;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, src: &str, dst: &str) -> MoveReport {
        game.select(coord(src));
        assert_eq!(game.selected(), Some(coord(src)));
        game.move_to(coord(dst)).unwrap()
    }

    #[test]
    fn test_initial() {
        let game = Game::new();
        assert_eq!(*game.board(), Board::initial());
        assert_eq!(game.side(), Color::White);
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(!game.is_check());
        assert_eq!(game.selected(), None);
        assert_eq!(game.legal_destinations(), Bitboard::EMPTY);
        assert!(game.captured(Color::White).is_empty());
        assert!(game.captured(Color::Black).is_empty());
        assert!(game.pending().is_none());
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn test_select() {
        let mut game = Game::new();
        game.select(coord("e2"));
        assert_eq!(game.selected(), Some(coord("e2")));
        assert_eq!(
            game.legal_destinations(),
            Bitboard::EMPTY.with(coord("e3")).with(coord("e4"))
        );

        // Opponent's pieces and empty squares don't change the selection
        game.select(coord("e7"));
        assert_eq!(game.selected(), Some(coord("e2")));
        game.select(coord("e4"));
        assert_eq!(game.selected(), Some(coord("e2")));

        // Another own piece replaces the selection
        game.select(coord("g1"));
        assert_eq!(game.selected(), Some(coord("g1")));
        assert_eq!(game.legal_destinations().len(), 2);

        // Selecting the same square twice clears it
        game.select(coord("g1"));
        assert_eq!(game.selected(), None);
        assert_eq!(game.legal_destinations(), Bitboard::EMPTY);

        // A piece without moves still can be selected
        game.select(coord("a1"));
        assert_eq!(game.selected(), Some(coord("a1")));
        assert_eq!(game.legal_destinations(), Bitboard::EMPTY);
    }

    #[test]
    fn test_invalid_move_to() {
        let mut game = Game::new();
        assert_eq!(game.move_to(coord("e4")), None);

        game.select(coord("e2"));
        assert_eq!(game.move_to(coord("e5")), None);
        assert_eq!(game.selected(), None);
        assert_eq!(*game.board(), Board::initial());
        assert_eq!(game.side(), Color::White);

        // Begin move doesn't trust the caller either
        assert!(game.begin_move(coord("e2"), coord("e5")).is_none());
        assert!(game.begin_move(coord("e7"), coord("e5")).is_none());
        assert!(game.begin_move(coord("e4"), coord("e5")).is_none());
        assert!(game.pending().is_none());
    }

    #[test]
    fn test_tap() {
        let mut game = Game::new();
        assert_eq!(game.tap(coord("e7")), None);
        assert_eq!(game.selected(), None);

        assert_eq!(game.tap(coord("e2")), None);
        assert_eq!(game.selected(), Some(coord("e2")));
        assert_eq!(game.tap(coord("e2")), None);
        assert_eq!(game.selected(), None);

        game.tap(coord("g1"));
        game.tap(coord("e2"));
        assert_eq!(game.selected(), Some(coord("e2")));
        assert_eq!(game.tap(coord("e5")), None);
        assert_eq!(game.selected(), None);

        game.tap(coord("e2"));
        let report = game.tap(coord("e4")).unwrap();
        assert_eq!(report.mv.to_string(), "e2e4");
        assert_eq!(report.kind(), MoveKind::Simple);
        assert_eq!(report.status, GameStatus::Playing);
        assert_eq!(game.side(), Color::Black);
        assert!(game.board().get(coord("e4")).has_moved());
    }

    #[test]
    fn test_captures() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        let report = play(&mut game, "e4", "d5");
        assert!(report.is_capture());
        assert!(report
            .captured
            .unwrap()
            .same_piece(Cell::from_parts(Color::Black, Piece::Pawn)));
        let report = play(&mut game, "d8", "d5");
        assert!(report
            .captured
            .unwrap()
            .same_piece(Cell::from_parts(Color::White, Piece::Pawn)));

        assert_eq!(game.captured(Color::White).len(), 1);
        assert_eq!(game.captured(Color::Black).len(), 1);
        assert!(game.captured(Color::White)[0].same_piece(Cell::from_parts(Color::Black, Piece::Pawn)));
        assert!(game.captured(Color::Black)[0].same_piece(Cell::from_parts(Color::White, Piece::Pawn)));
    }

    #[test]
    fn test_back_rank_mate() {
        let b = diagram([
            "......k.",
            ".....ppp",
            "........",
            "........",
            "........",
            "........",
            "........",
            "R.....K.",
        ]);
        let mut game = Game::from_position(b, Color::White).unwrap();
        let report = play(&mut game, "a1", "a8");
        assert!(report.check);
        assert_eq!(report.status, GameStatus::Checkmate(Color::White));
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
        assert!(game.is_check());
        assert!(game.legal_moves().is_empty());
        for src in game.board().color(Color::Black) {
            assert_eq!(legal::destinations(game.board(), src), Bitboard::EMPTY);
        }

        // Finished game ignores everything except reset
        game.select(coord("g8"));
        assert_eq!(game.selected(), None);
        assert!(game.begin_move(coord("g8"), coord("h8")).is_none());
        game.reset();
        assert_eq!(game, Game::new());
    }

    #[test]
    fn test_stalemate() {
        let b = diagram([
            "k.......",
            "...Q....",
            ".K......",
            "........",
            "........",
            "........",
            "........",
            "........",
        ]);
        let mut game = Game::from_position(b, Color::White).unwrap();
        let report = play(&mut game, "d7", "c7");
        assert!(!report.check);
        assert_eq!(report.status, GameStatus::Stalemate);
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.status().winner(), None);
        assert!(!game.is_check());
    }

    #[test]
    fn test_from_position() {
        let b = diagram([
            "....k...",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....K..R",
        ]);
        assert!(Game::from_position(b, Color::White).is_ok());

        let b = diagram([
            "....k..R",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....K...",
        ]);
        assert_eq!(
            Game::from_position(b, Color::White),
            Err(ValidateError::OpponentKingAttacked)
        );
        let game = Game::from_position(b, Color::Black).unwrap();
        assert!(game.is_check());
        assert_eq!(game.status(), GameStatus::Playing);

        // Already finished
        let b = diagram([
            "R.....k.",
            ".....ppp",
            "........",
            "........",
            "........",
            "........",
            "........",
            "......K.",
        ]);
        let game = Game::from_position(b, Color::Black).unwrap();
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
    }

    #[test]
    fn test_castling() {
        let b = diagram([
            "r...k..r",
            "pppppppp",
            "........",
            "........",
            "........",
            "........",
            "PPPPPPPP",
            "R...K..R",
        ]);
        let mut game = Game::from_position(b, Color::White).unwrap();
        game.select(coord("e1"));
        assert!(game.legal_destinations().has(coord("g1")));
        assert!(game.legal_destinations().has(coord("c1")));
        let report = game.move_to(coord("g1")).unwrap();
        assert_eq!(report.kind(), MoveKind::CastlingKingside);
        assert!(game.board().get(coord("f1")).same_piece(Cell::from_parts(Color::White, Piece::Rook)));
        assert!(game.board().get(coord("g1")).same_piece(Cell::from_parts(Color::White, Piece::King)));
        assert!(game.board().get(coord("h1")).is_empty());
        assert!(game.board().get(coord("e1")).is_empty());

        let report = play(&mut game, "e8", "c8");
        assert_eq!(report.kind(), MoveKind::CastlingQueenside);
        assert!(game.board().get(coord("d8")).same_piece(Cell::from_parts(Color::Black, Piece::Rook)));
        assert!(game.board().get(coord("a8")).is_empty());
    }

    #[test]
    fn test_castling_lost() {
        let b = diagram([
            "r...k..r",
            "pppppppp",
            "........",
            "........",
            "........",
            "........",
            "PPPPPPPP",
            "R...K..R",
        ]);
        let mut game = Game::from_position(b, Color::White).unwrap();
        play(&mut game, "e1", "f1");
        play(&mut game, "a8", "b8");
        play(&mut game, "f1", "e1");
        play(&mut game, "b8", "a8");

        // The king went back home, but castling is gone for good
        game.select(coord("e1"));
        assert!(!game.legal_destinations().has(coord("g1")));
        assert!(!game.legal_destinations().has(coord("c1")));
        play(&mut game, "a2", "a3");

        // The rook went back home too, so only kingside remains
        game.select(coord("e8"));
        assert!(game.legal_destinations().has(coord("g8")));
        assert!(!game.legal_destinations().has(coord("c8")));
    }

    #[test]
    fn test_promotion() {
        let b = diagram([
            "........",
            ".P......",
            ".......k",
            "........",
            "........",
            "........",
            "........",
            "K.......",
        ]);
        let mut game = Game::from_position(b, Color::White).unwrap();
        let report = play(&mut game, "b7", "b8");
        assert_eq!(report.kind(), MoveKind::PromoteQueen);
        assert_eq!(report.mv.to_string(), "b7b8q");
        assert_eq!(
            game.board().get(coord("b8")),
            Cell::from_parts(Color::White, Piece::Queen).moved()
        );
        assert!(game.board().get(coord("b7")).is_empty());
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_pending() {
        let mut game = Game::new();
        assert_eq!(game.commit(), None);
        assert!(!game.cancel());

        game.select(coord("g1"));
        let pending = game.begin_move(coord("e2"), coord("e4")).unwrap();
        assert_eq!(pending.mv().to_string(), "e2e4");
        assert_eq!(*pending.before(), Board::initial());
        assert!(pending.after().get(coord("e4")).same_piece(Cell::from_parts(Color::White, Piece::Pawn)));
        assert_eq!(pending.captured(), None);
        assert_eq!(game.selected(), None);

        // Nothing changes until the move is committed, and inputs are ignored meanwhile
        assert_eq!(*game.board(), Board::initial());
        assert_eq!(game.side(), Color::White);
        game.select(coord("g1"));
        assert_eq!(game.selected(), None);
        assert!(game.begin_move(coord("d2"), coord("d4")).is_none());
        assert_eq!(game.pending().unwrap().mv().to_string(), "e2e4");

        assert!(game.cancel());
        assert!(game.pending().is_none());
        assert_eq!(*game.board(), Board::initial());
        assert_eq!(game.side(), Color::White);

        game.begin_move(coord("d2"), coord("d4")).unwrap();
        let report = game.commit().unwrap();
        assert_eq!(report.mv.to_string(), "d2d4");
        assert_eq!(game.side(), Color::Black);
        assert!(game.pending().is_none());
        assert_eq!(game.commit(), None);
    }

    #[test]
    fn test_reset() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        play(&mut game, "e4", "d5");
        game.select(coord("d8"));
        game.reset();
        assert_eq!(game, Game::new());

        game.begin_move(coord("e2"), coord("e4")).unwrap();
        game.reset();
        assert!(game.pending().is_none());
        assert_eq!(*game.board(), Board::initial());
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x7a9c_4e55);
        for _ in 0..20 {
            let mut game = Game::new();
            for _ in 0..200 {
                if game.status().is_finished() {
                    assert!(game.legal_moves().is_empty());
                    break;
                }
                let moves = game.legal_moves();
                assert!(!moves.is_empty());
                for mv in &moves {
                    assert!(!game.board().make_move(*mv).is_check(mv.side()));
                }

                // Selection offers exactly the generated moves
                for src in game.board().color(game.side()) {
                    game.select(src);
                    let expected: Bitboard = moves
                        .iter()
                        .filter(|mv| mv.src() == src)
                        .map(|mv| mv.dst())
                        .collect();
                    assert_eq!(game.legal_destinations(), expected);
                    game.select(src);
                    assert_eq!(game.selected(), None);
                }

                let mv = moves[rng.gen_range(0..moves.len())];
                game.select(mv.src());
                let report = game.move_to(mv.dst()).unwrap();
                assert_eq!(report.mv, mv);
                assert!(!game.board().is_check(mv.side()));
                assert_eq!(report.check, game.board().is_check(game.side()));
                assert!(Board::try_from(*game.board().raw()).is_ok());
            }
        }
    }
}
