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

//! A game session: executor and move cache behind one handle.
//!
//! # Examples
//!
//! ```
//! use chesslaw::{Game, Outcome, Color};
//!
//! let game = Game::new();
//! for san in ["f3", "e5", "g4", "Qh4"] {
//!     game.execute_san(san)?;
//! }
//!
//! assert!(game.is_checkmate());
//! assert_eq!(game.outcome(), Some(Outcome::Checkmate { winner: Color::Black }));
//! assert_eq!(game.sans().last().map(ToString::to_string), Some("Qh4#".to_owned()));
//! # Ok::<_, chesslaw::game::PlaySanError>(())
//! ```

use std::{error::Error, fmt, sync::mpsc::Receiver};

use crate::{
    board::Board,
    color::Color,
    execute::{Executor, MoveEvent, Origin},
    fen::Fen,
    m::{CandidateMove, ExecutedMove, MoveList, SquareMoves},
    movegen::{legal_moves, MoveGenerator},
    role::Role,
    san::{ParseSanError, San, SanError, SanPlus},
    square::Square,
    validate::{IllegalMove, Validator},
};

/// Outcome of a finished game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Outcome::Checkmate { winner: Color::White } => "1-0",
            Outcome::Checkmate { winner: Color::Black } => "0-1",
            Outcome::Stalemate => "1/2-1/2",
        })
    }
}

/// Reason a board cannot start a game.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PositionError {
    MissingKing { color: Color },
    TooManyKings { color: Color },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PositionError::MissingKing { color } => write!(f, "{color} has no king"),
            PositionError::TooManyKings { color } => write!(f, "{color} has more than one king"),
        }
    }
}

impl Error for PositionError {}

/// Error when playing a move given in SAN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlaySanError {
    Parse,
    San(SanError),
    Illegal(IllegalMove),
}

impl fmt::Display for PlaySanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaySanError::Parse => fmt::Display::fmt(&ParseSanError, f),
            PlaySanError::San(err) => fmt::Display::fmt(err, f),
            PlaySanError::Illegal(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for PlaySanError {}

impl From<ParseSanError> for PlaySanError {
    fn from(_: ParseSanError) -> PlaySanError {
        PlaySanError::Parse
    }
}

impl From<SanError> for PlaySanError {
    fn from(err: SanError) -> PlaySanError {
        PlaySanError::San(err)
    }
}

impl From<IllegalMove> for PlaySanError {
    fn from(err: IllegalMove) -> PlaySanError {
        PlaySanError::Illegal(err)
    }
}

/// A game between two sides on one board.
///
/// `Game` is `Send + Sync`: share it behind an `Arc` between the session
/// and the network layer.
#[derive(Debug, Default)]
pub struct Game {
    executor: Executor,
    generator: MoveGenerator,
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Game {
        Game::default()
    }

    /// A game from an arbitrary position. An en passant square in the FEN
    /// keeps the capture available for the first move.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] unless each side has exactly one king.
    pub fn from_fen(fen: &Fen) -> Result<Game, PositionError> {
        for color in Color::ALL {
            match fen.board.by_color(color).filter(|(_, p)| p.role == Role::King).count() {
                0 => return Err(PositionError::MissingKing { color }),
                1 => (),
                _ => return Err(PositionError::TooManyKings { color }),
            }
        }
        Ok(Game {
            executor: Executor::from_position(fen.board.clone(), fen.turn, fen.last_move()),
            generator: MoveGenerator::new(),
        })
    }

    pub fn initialize(&self) {
        self.executor.initialize();
        self.invalidate_moves();
    }

    fn invalidate_moves(&self) {
        self.generator.invalidate(self.executor.stamp().version);
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn turn(&self) -> Color {
        self.executor.turn()
    }

    pub fn board(&self) -> Board {
        self.executor.board()
    }

    pub fn fen(&self) -> Fen {
        let snapshot = self.executor.snapshot();
        let mut fen = Fen::from_board(snapshot.board, snapshot.turn);
        fen.en_passant = snapshot
            .last_move
            .filter(ExecutedMove::is_double_step)
            .and_then(|last| last.to().offset(0, -last.color().forward()));
        fen
    }

    /// Fills the move cache for the side to move. Returns whether it has
    /// any legal move.
    pub fn calculate_all_legal_basic_moves(&self) -> bool {
        self.generator.calculate_for_turn(&self.executor)
    }

    /// Cached legal moves from `sq`. Empty until the cache is computed for
    /// the current position.
    pub fn moves_for(&self, sq: Square) -> SquareMoves {
        self.generator.moves_for_current(&self.executor, sq)
    }

    /// The side the move cache holds moves for, if it matches the current
    /// position.
    pub fn cached_side(&self) -> Option<Color> {
        let current = self.executor.stamp();
        self.generator
            .cached_stamp()
            .filter(|stamp| *stamp == current)
            .map(|stamp| stamp.turn)
    }

    /// Legal moves of the side to move, computed without the cache.
    pub fn legal_moves(&self) -> MoveList {
        let snapshot = self.executor.snapshot();
        legal_moves(&snapshot.board, snapshot.last_move.as_ref(), snapshot.turn)
    }

    /// Validates and commits a move of the side to move.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] and leaves the game unchanged if the move is
    /// not legal.
    pub fn execute_move(&self, m: CandidateMove, origin: Origin) -> Result<ExecutedMove, IllegalMove> {
        let executed = self.executor.execute_move(m, origin)?;
        self.invalidate_moves();
        Ok(executed)
    }

    /// Parses a SAN and commits the matching legal move as a local move.
    ///
    /// # Errors
    ///
    /// Returns [`PlaySanError`] if the SAN is invalid, illegal or
    /// ambiguous.
    pub fn execute_san(&self, san: &str) -> Result<ExecutedMove, PlaySanError> {
        let san: San = san.parse()?;
        let snapshot = self.executor.snapshot();
        let m = san.to_move(&snapshot.board, snapshot.last_move.as_ref(), snapshot.turn)?;
        Ok(self.execute_move(m, Origin::Local)?)
    }

    fn validate_snapshot<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Validator<'_>, Color) -> T,
    {
        let snapshot = self.executor.snapshot();
        let validator = Validator::new(&snapshot.board, snapshot.last_move.as_ref());
        f(&validator, snapshot.turn)
    }

    /// Tests if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.validate_snapshot(|v, turn| v.is_check(turn))
    }

    pub fn is_checkmate(&self) -> bool {
        self.validate_snapshot(|v, turn| v.is_checkmate(turn))
    }

    pub fn is_stalemate(&self) -> bool {
        self.validate_snapshot(|v, turn| v.is_stalemate(turn))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.validate_snapshot(|v, turn| {
            if v.has_legal_move(turn) {
                None
            } else if v.is_check(turn) {
                Some(Outcome::Checkmate { winner: !turn })
            } else {
                Some(Outcome::Stalemate)
            }
        })
    }

    pub fn last_move(&self) -> Option<ExecutedMove> {
        self.executor.last_move()
    }

    pub fn remove_last_move(&self) -> Option<ExecutedMove> {
        let undone = self.executor.remove_last_move();
        self.invalidate_moves();
        undone
    }

    pub fn clear_move_history(&self) {
        self.executor.clear_move_history();
        self.invalidate_moves();
    }

    pub fn history(&self) -> Vec<ExecutedMove> {
        self.executor.history()
    }

    pub fn sans(&self) -> Vec<SanPlus> {
        self.executor.sans()
    }

    pub fn subscribe(&self) -> Receiver<MoveEvent> {
        self.executor.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_send_sync() {
        assert_send_sync::<Game>();
        assert_send_sync::<Executor>();
        assert_send_sync::<MoveGenerator>();
    }

    #[test]
    fn test_from_fen_kings() {
        let fen: Fen = "8/8/8/8/8/8/8/4K3 w -".parse().expect("valid fen");
        assert_eq!(
            Game::from_fen(&fen).err(),
            Some(PositionError::MissingKing { color: Color::Black })
        );

        let fen: Fen = "4k3/8/8/8/8/8/8/3KK3 w -".parse().expect("valid fen");
        assert_eq!(
            Game::from_fen(&fen).err(),
            Some(PositionError::TooManyKings { color: Color::White })
        );
    }

    #[test]
    fn test_cache_invalidated_by_moves() {
        let game = Game::new();
        assert!(game.calculate_all_legal_basic_moves());
        assert_eq!(game.moves_for(Square::E2).len(), 2);

        assert_eq!(game.cached_side(), Some(Color::White));

        game.execute_san("e4").expect("legal");
        assert!(game.moves_for(Square::E2).is_empty());
        assert_eq!(game.cached_side(), None);
        assert!(game.calculate_all_legal_basic_moves());
        assert_eq!(game.cached_side(), Some(Color::Black));
        assert_eq!(game.moves_for(Square::E7).len(), 2);

        game.remove_last_move();
        assert!(game.moves_for(Square::E7).is_empty());
        assert_eq!(game.cached_side(), None);
    }

    #[test]
    fn test_fen_en_passant() {
        let fen: Fen = "4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1".parse().expect("valid fen");
        let game = Game::from_fen(&fen).expect("valid position");
        assert_eq!(game.fen(), fen);
        assert!(game.legal_moves().contains(&CandidateMove::new(Square::E4, Square::D3)));

        let captured = game.execute_san("exd3").expect("en passant");
        assert!(captured.is_en_passant());
        assert_eq!(game.fen().en_passant, None);
        assert_eq!(game.fen().to_string(), "4k3/8/8/8/8/3p4/8/4K3 w -");

        let game = Game::new();
        game.execute_san("e4").expect("legal");
        assert_eq!(game.fen().to_string(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3");
    }

    #[test]
    fn test_execute_san_errors() {
        let game = Game::new();
        assert_eq!(game.execute_san("Zz9"), Err(PlaySanError::Parse));
        assert_eq!(game.execute_san("Nf6"), Err(PlaySanError::San(SanError::IllegalSan)));
        assert_eq!(game.fen(), Fen::default());
    }

    #[test]
    fn test_outcomes() {
        let fen: Fen = "7k/5Q2/6K1/8/8/8/8/8 b -".parse().expect("valid fen");
        let game = Game::from_fen(&fen).expect("valid position");
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert_eq!(Outcome::Stalemate.to_string(), "1/2-1/2");
        assert_eq!(Game::new().outcome(), None);
    }
}
