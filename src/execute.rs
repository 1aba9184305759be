// This file is part of the chesslaw library.
// Copyright (C) 2026 The chesslaw developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Committing moves to the live board.
//!
//! The [`Executor`] owns the board, the side to move and the move history
//! behind a single lock. A commit validates, applies, records SAN, appends
//! to history and flips the turn without releasing that lock, so no other
//! thread observes a half-applied move.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex, MutexGuard, PoisonError,
};

use tracing::{debug, info, warn};

use crate::{
    board::Board,
    color::Color,
    m::{CandidateMove, ExecutedMove},
    san::{San, SanPlus, Suffix},
    validate::{Classified, IllegalMove, Kind, Validator},
};

/// Where a move came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Origin {
    /// Played on this side of the session. Subscribers are notified.
    Local,
    /// Received from a peer. Applied the same way, but not broadcast back.
    Remote,
}

/// Notification sent to subscribers after a locally originated commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveEvent {
    pub executed: ExecutedMove,
    pub san: SanPlus,
    /// Side to move after the commit.
    pub turn: Color,
}

/// Identifies one state of an [`Executor`].
///
/// The version grows with every commit, take-back, reset and history clear,
/// so two equal stamps always describe the same position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Stamp {
    pub version: u64,
    pub turn: Color,
}

/// A consistent copy of the executor state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
    pub last_move: Option<ExecutedMove>,
    pub version: u64,
}

impl Snapshot {
    pub fn stamp(&self) -> Stamp {
        Stamp {
            version: self.version,
            turn: self.turn,
        }
    }
}

#[derive(Clone, Debug)]
struct HistoryEntry {
    executed: ExecutedMove,
    san: SanPlus,
    plan: Classified,
}

#[derive(Clone, Debug)]
struct State {
    board: Board,
    turn: Color,
    history: Vec<HistoryEntry>,
    /// Double step played before the history began, as given by a FEN
    /// en passant field.
    preceding: Option<ExecutedMove>,
    version: u64,
}

impl State {
    fn last_move(&self) -> Option<ExecutedMove> {
        self.history
            .last()
            .map(|entry| entry.executed)
            .or(self.preceding)
    }

    fn classify(&self, m: CandidateMove, side: Option<Color>) -> Result<Classified, IllegalMove> {
        if side.is_some_and(|side| side != self.turn) {
            return Err(IllegalMove::WrongSide);
        }
        let last = self.last_move();
        Validator::new(&self.board, last.as_ref()).classify(m, self.turn)
    }

    fn commit(&mut self, plan: Classified) -> MoveEvent {
        let executed = plan.record();
        let last = self.last_move();
        let san = San::from_move(&self.board, last.as_ref(), &executed);

        plan.apply(&mut self.board);
        self.turn = !self.turn;
        self.version += 1;
        debug_assert_eq!(self.board.color_at(executed.to()), Some(executed.color()));

        let san = SanPlus {
            san,
            suffix: Suffix::from_position(&self.board, &executed, self.turn),
        };
        self.history.push(HistoryEntry {
            executed,
            san: san.clone(),
            plan,
        });

        MoveEvent {
            executed,
            san,
            turn: self.turn,
        }
    }
}

/// Applies validated moves to the live board and keeps the history.
///
/// # Examples
///
/// ```
/// use chesslaw::{execute::{Executor, Origin}, CandidateMove, Color, Square};
///
/// let executor = Executor::new();
/// let executed = executor.execute_move(CandidateMove::new(Square::E2, Square::E4), Origin::Local)?;
/// assert!(executed.is_double_step());
/// assert_eq!(executor.turn(), Color::Black);
///
/// executor.remove_last_move();
/// assert_eq!(executor.turn(), Color::White);
/// # Ok::<_, chesslaw::validate::IllegalMove>(())
/// ```
#[derive(Debug)]
pub struct Executor {
    state: Mutex<State>,
    subscribers: Mutex<Vec<Sender<MoveEvent>>>,
}

impl Default for Executor {
    fn default() -> Executor {
        Executor::new()
    }
}

impl Executor {
    /// Creates an executor for the standard starting position, white to
    /// move.
    pub fn new() -> Executor {
        Executor::from_board(Board::new(), Color::White)
    }

    pub fn from_board(board: Board, turn: Color) -> Executor {
        Executor::from_position(board, turn, None)
    }

    /// Creates an executor whose position was reached by `last_move`, so
    /// an en passant capture of that double step is still available. Any
    /// other kind of move, or one that does not match the board, is
    /// ignored.
    pub fn from_position(board: Board, turn: Color, last_move: Option<ExecutedMove>) -> Executor {
        let preceding = last_move.filter(|last| {
            last.is_double_step()
                && last.color() != turn
                && board.piece_at(last.to()).is_some_and(|p| p.is(last.color().pawn()))
        });
        Executor {
            state: Mutex::new(State {
                board,
                turn,
                history: Vec::new(),
                preceding,
                version: 0,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resets to the standard starting position with an empty history.
    pub fn initialize(&self) {
        let mut state = self.lock();
        state.board.initialize();
        state.turn = Color::White;
        state.history.clear();
        state.preceding = None;
        state.version += 1;
        info!("board initialized");
    }

    pub fn turn(&self) -> Color {
        self.lock().turn
    }

    /// A copy of the live board.
    pub fn board(&self) -> Board {
        self.lock().board.clone()
    }

    /// Version and side to move of the current state.
    pub fn stamp(&self) -> Stamp {
        let state = self.lock();
        Stamp {
            version: state.version,
            turn: state.turn,
        }
    }

    /// Board, turn and last move, taken under one lock.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            board: state.board.clone(),
            turn: state.turn,
            last_move: state.last_move(),
            version: state.version,
        }
    }

    /// Validates and commits a move for the side to move.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] and leaves the board unchanged if the move is
    /// not legal.
    pub fn execute_move(&self, m: CandidateMove, origin: Origin) -> Result<ExecutedMove, IllegalMove> {
        self.execute_as(m, None, origin, |_| true, IllegalMove::Unreachable)
    }

    /// Commits a castling move: `m` moves the king two files towards an
    /// unmoved rook.
    ///
    /// # Errors
    ///
    /// Any castling precondition that fails, or [`IllegalMove::Unreachable`]
    /// for a legal move that is not castling.
    pub fn execute_castling_move(&self, m: CandidateMove) -> Result<ExecutedMove, IllegalMove> {
        self.execute_as(
            m,
            None,
            Origin::Local,
            |kind| matches!(kind, Kind::Castling(_)),
            IllegalMove::Unreachable,
        )
    }

    /// Commits an en passant capture by `side`.
    ///
    /// # Errors
    ///
    /// [`IllegalMove::WrongSide`] if `side` is not to move,
    /// [`IllegalMove::NoEnPassant`] if the last move was not a double step
    /// of an enemy pawn beside the capturing pawn.
    pub fn execute_en_passant_move(&self, m: CandidateMove, side: Color) -> Result<ExecutedMove, IllegalMove> {
        self.execute_as(
            m,
            Some(side),
            Origin::Local,
            |kind| kind == Kind::EnPassant,
            IllegalMove::NoEnPassant,
        )
    }

    /// Commits a pawn move to the last rank by `side`. The pawn is replaced
    /// by `m.promotion`, a queen if none is given.
    ///
    /// # Errors
    ///
    /// [`IllegalMove::WrongSide`] if `side` is not to move,
    /// [`IllegalMove::InvalidPromotion`] for a pawn or king as promotion
    /// role or a move that does not reach the last rank.
    pub fn execute_pawn_promotion(&self, m: CandidateMove, side: Color) -> Result<ExecutedMove, IllegalMove> {
        self.execute_as(
            m,
            Some(side),
            Origin::Local,
            |kind| matches!(kind, Kind::Promotion(_)),
            IllegalMove::InvalidPromotion,
        )
    }

    /// Validates and commits under a single lock. `side`, when given, must
    /// be the side to move.
    fn execute_as<F>(
        &self,
        m: CandidateMove,
        side: Option<Color>,
        origin: Origin,
        expected: F,
        mismatch: IllegalMove,
    ) -> Result<ExecutedMove, IllegalMove>
    where
        F: FnOnce(Kind) -> bool,
    {
        let event = {
            let mut state = self.lock();
            let plan = state
                .classify(m, side)
                .and_then(|plan| if expected(plan.kind) { Ok(plan) } else { Err(mismatch) });
            let plan = match plan {
                Ok(plan) => plan,
                Err(err) => {
                    match origin {
                        Origin::Remote => warn!(%m, %err, "rejected remote move"),
                        Origin::Local => debug!(%m, %err, "rejected move"),
                    }
                    return Err(err);
                }
            };
            state.commit(plan)
        };

        debug!(san = %event.san, ?origin, "committed move");
        let executed = event.executed;
        if origin == Origin::Local {
            self.broadcast(event);
        }
        Ok(executed)
    }

    fn broadcast(&self, event: MoveEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Registers a new subscriber for locally originated moves. Dropping
    /// the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<MoveEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn last_move(&self) -> Option<ExecutedMove> {
        self.lock().last_move()
    }

    /// Takes back the last move, restoring occupancy, move counts, the king
    /// squares and the side to move.
    pub fn remove_last_move(&self) -> Option<ExecutedMove> {
        let mut state = self.lock();
        let entry = state.history.pop()?;
        entry.plan.undo(&mut state.board);
        state.turn = entry.executed.color();
        state.version += 1;
        debug!(san = %entry.san, "took back move");
        Some(entry.executed)
    }

    /// Forgets the history. The board stays as it is, so en passant is no
    /// longer available.
    pub fn clear_move_history(&self) {
        let mut state = self.lock();
        state.history.clear();
        state.preceding = None;
        state.version += 1;
        debug!("move history cleared");
    }

    /// All executed moves in play order.
    pub fn history(&self) -> Vec<ExecutedMove> {
        self.lock().history.iter().map(|entry| entry.executed).collect()
    }

    /// SAN of all executed moves in play order.
    pub fn sans(&self) -> Vec<SanPlus> {
        self.lock().history.iter().map(|entry| entry.san.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{m::MoveFlags, role::Role, square::Square};

    fn mv(from: Square, to: Square) -> CandidateMove {
        CandidateMove::new(from, to)
    }

    fn board(fen: &str) -> Board {
        Board::from_board_fen(fen.as_bytes()).expect("valid board fen")
    }

    #[test]
    fn test_execute_and_undo() {
        let executor = Executor::new();
        let before = executor.board();
        let executed = executor
            .execute_move(mv(Square::G1, Square::F3), Origin::Local)
            .expect("legal");
        assert_eq!(executed.role(), Role::Knight);
        assert_eq!(executor.board().piece_at(Square::F3), Some(Color::White.knight().with_move_count(1)));
        assert_eq!(executor.turn(), Color::Black);

        assert_eq!(executor.remove_last_move(), Some(executed));
        assert_eq!(executor.board(), before);
        assert_eq!(executor.turn(), Color::White);
        assert_eq!(executor.remove_last_move(), None);
    }

    #[test]
    fn test_rejection_leaves_state() {
        let executor = Executor::new();
        assert_eq!(
            executor.execute_move(mv(Square::E7, Square::E5), Origin::Remote),
            Err(IllegalMove::WrongSide)
        );
        assert_eq!(executor.board(), Board::new());
        assert!(executor.history().is_empty());
    }

    #[test]
    fn test_special_entry_points() {
        let executor = Executor::from_board(board("r3k2r/8/8/8/8/8/8/R3K2R"), Color::White);
        assert_eq!(
            executor.execute_castling_move(mv(Square::E1, Square::F1)),
            Err(IllegalMove::Unreachable)
        );
        let castled = executor
            .execute_castling_move(mv(Square::E1, Square::C1))
            .expect("castling");
        assert_eq!(castled.to_string(), "O-O-O");
        assert_eq!(executor.board().role_at(Square::D1), Some(Role::Rook));
        assert_eq!(executor.sans()[0].to_string(), "O-O-O");

        assert_eq!(
            executor.execute_pawn_promotion(mv(Square::H8, Square::H1), Color::White),
            Err(IllegalMove::WrongSide)
        );
    }

    #[test]
    fn test_en_passant_only_immediately() {
        let executor = Executor::from_board(board("4k3/3p4/8/4P3/8/8/8/4K3"), Color::Black);
        executor
            .execute_move(mv(Square::D7, Square::D5), Origin::Local)
            .expect("double step");
        let captured = executor
            .execute_en_passant_move(mv(Square::E5, Square::D6), Color::White)
            .expect("en passant");
        assert!(captured.is_en_passant());
        assert!(executor.board().is_empty(Square::D5));

        executor.remove_last_move();
        executor.execute_move(mv(Square::E1, Square::E2), Origin::Local).expect("king move");
        executor.execute_move(mv(Square::E8, Square::E7), Origin::Local).expect("king move");
        assert_eq!(
            executor.execute_move(mv(Square::E5, Square::D6), Origin::Local),
            Err(IllegalMove::NoEnPassant)
        );
    }

    #[test]
    fn test_subscribers() {
        let executor = Executor::new();
        let rx = executor.subscribe();
        let dropped = executor.subscribe();
        drop(dropped);

        executor.execute_move(mv(Square::E2, Square::E4), Origin::Local).expect("legal");
        executor.execute_move(mv(Square::E7, Square::E5), Origin::Remote).expect("legal");

        let event = rx.try_recv().expect("local event");
        assert_eq!(event.san.to_string(), "e4");
        assert_eq!(event.turn, Color::Black);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_initialize_and_clear() {
        let executor = Executor::new();
        executor.execute_move(mv(Square::E2, Square::E4), Origin::Local).expect("legal");
        executor.clear_move_history();
        assert_eq!(executor.last_move(), None);
        assert_eq!(executor.turn(), Color::Black);

        executor.initialize();
        assert_eq!(executor.snapshot(), Snapshot {
            board: Board::new(),
            turn: Color::White,
            last_move: None,
            version: 3,
        });
    }

    #[test]
    fn test_stamp_changes_with_state() {
        let executor = Executor::new();
        let start = executor.stamp();
        assert_eq!(start, Stamp { version: 0, turn: Color::White });

        executor.execute_move(mv(Square::E2, Square::E4), Origin::Local).expect("legal");
        let after = executor.stamp();
        assert_eq!(after.turn, Color::Black);
        assert!(after.version > start.version);
        assert_eq!(executor.snapshot().stamp(), after);

        assert_eq!(
            executor.execute_move(mv(Square::E2, Square::E4), Origin::Local),
            Err(IllegalMove::WrongSide)
        );
        assert_eq!(executor.stamp(), after);

        executor.remove_last_move();
        let undone = executor.stamp();
        assert_eq!(undone.turn, Color::White);
        assert_ne!(undone, start);
    }

    #[test]
    fn test_special_entry_points_check_side() {
        let executor = Executor::from_board(board("4k3/P7/8/8/8/8/8/4K3"), Color::White);
        assert_eq!(
            executor.execute_pawn_promotion(mv(Square::A7, Square::A8), Color::Black),
            Err(IllegalMove::WrongSide)
        );
        assert_eq!(
            executor.execute_en_passant_move(mv(Square::A7, Square::B8), Color::Black),
            Err(IllegalMove::WrongSide)
        );
        assert_eq!(executor.stamp().version, 0);

        let promoted = executor
            .execute_pawn_promotion(mv(Square::A7, Square::A8).with_promotion(Role::Knight), Color::White)
            .expect("promotion");
        assert_eq!(promoted.promotion(), Some(Role::Knight));
    }

    #[test]
    fn test_preceding_double_step() {
        let white_pawn_d4 = ExecutedMove::new(
            Color::White,
            Role::Pawn,
            Square::D2,
            Square::D4,
            None,
            None,
            MoveFlags::DOUBLE_STEP,
        );
        let executor = Executor::from_position(board("4k3/8/8/8/3Pp3/8/8/4K3"), Color::Black, Some(white_pawn_d4));
        assert_eq!(executor.last_move(), Some(white_pawn_d4));
        assert!(executor.history().is_empty());

        let captured = executor
            .execute_en_passant_move(mv(Square::E4, Square::D3), Color::Black)
            .expect("en passant");
        assert_eq!(captured.capture(), Some(Role::Pawn));
        assert!(executor.board().is_empty(Square::D4));

        executor.remove_last_move();
        assert_eq!(executor.last_move(), Some(white_pawn_d4));
        executor.clear_move_history();
        assert_eq!(executor.last_move(), None);

        // a double step of the side to move is not a preceding move
        let executor = Executor::from_position(board("4k3/8/8/8/3Pp3/8/8/4K3"), Color::White, Some(white_pawn_d4));
        assert_eq!(executor.last_move(), None);
    }
}
