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

//! Legal move generation and the per-square move cache.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::{
    attacks,
    board::Board,
    color::Color,
    execute::{Executor, Snapshot, Stamp},
    m::{CandidateMove, ExecutedMove, MoveList, SquareMoves},
    square::Square,
    validate::Validator,
};

/// Generates all legal moves of `side`, castling and en passant included,
/// ordered by origin square.
///
/// # Examples
///
/// ```
/// use chesslaw::{movegen::legal_moves, Board, Color};
///
/// let board = Board::new();
/// assert_eq!(legal_moves(&board, None, Color::White).len(), 20);
/// ```
pub fn legal_moves(board: &Board, last_move: Option<&ExecutedMove>, side: Color) -> MoveList {
    let mut moves = MoveList::new();
    for (from, _) in board.by_color(side) {
        moves.extend(legal_moves_from(board, last_move, from, side));
    }
    moves
}

fn legal_moves_from(
    board: &Board,
    last_move: Option<&ExecutedMove>,
    from: Square,
    side: Color,
) -> SquareMoves {
    let validator = Validator::new(board, last_move);
    let mut candidates = SquareMoves::new();
    attacks::candidates_from(board, last_move, from, &mut candidates);
    candidates.retain(|m| validator.is_legal(*m, side));
    candidates
}

#[derive(Clone, Debug)]
struct MoveCache {
    /// Executor version the moves were computed from. An empty cache keeps
    /// the oldest version it still accepts.
    version: u64,
    side: Option<Color>,
    by_square: [SquareMoves; 64],
}

impl MoveCache {
    fn empty(version: u64) -> MoveCache {
        MoveCache {
            version,
            side: None,
            by_square: std::array::from_fn(|_| SquareMoves::new()),
        }
    }

    fn stamp(&self) -> Option<Stamp> {
        self.side.map(|turn| Stamp {
            version: self.version,
            turn,
        })
    }
}

/// Caches the legal moves of one side, per origin square.
///
/// The cache is filled from a snapshot of an [`Executor`] and swapped in
/// as a whole, so readers see either the old or the new set of moves. It is
/// tagged with the executor version of that snapshot: a result computed
/// from an older state than the cache already holds, or than the last
/// [`invalidate`](MoveGenerator::invalidate), is dropped.
///
/// # Examples
///
/// ```
/// use chesslaw::{execute::Executor, movegen::MoveGenerator, Color, Square};
///
/// let executor = Executor::new();
/// let generator = MoveGenerator::new();
/// assert!(generator.calculate_all_legal_basic_moves(&executor, Color::White));
///
/// let targets: Vec<Square> = generator.moves_for(Square::E2).iter().map(|m| m.to).collect();
/// assert_eq!(targets, [Square::E3, Square::E4]);
/// assert!(generator.moves_for(Square::E7).is_empty());
/// ```
#[derive(Debug)]
pub struct MoveGenerator {
    cache: Mutex<MoveCache>,
}

impl Default for MoveGenerator {
    fn default() -> MoveGenerator {
        MoveGenerator::new()
    }
}

impl MoveGenerator {
    pub fn new() -> MoveGenerator {
        MoveGenerator {
            cache: Mutex::new(MoveCache::empty(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MoveCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recomputes the cache for `side` from the executor's current
    /// position. Returns whether `side` has any legal move.
    pub fn calculate_all_legal_basic_moves(&self, executor: &Executor, side: Color) -> bool {
        self.fill(&executor.snapshot(), side)
    }

    /// Recomputes the cache for the side to move, taken from the same
    /// snapshot as the position. Returns whether it has any legal move.
    pub fn calculate_for_turn(&self, executor: &Executor) -> bool {
        let snapshot = executor.snapshot();
        self.fill(&snapshot, snapshot.turn)
    }

    fn fill(&self, snapshot: &Snapshot, side: Color) -> bool {
        let mut fresh = MoveCache::empty(snapshot.version);
        fresh.side = Some(side);

        let mut total = 0;
        for (from, _) in snapshot.board.by_color(side) {
            let moves = legal_moves_from(&snapshot.board, snapshot.last_move.as_ref(), from, side);
            total += moves.len();
            fresh.by_square[from.index()] = moves;
        }

        let mut cache = self.lock();
        if fresh.version >= cache.version {
            trace!(?side, version = fresh.version, moves = total, "generated legal moves");
            *cache = fresh;
        } else {
            trace!(?side, version = fresh.version, current = cache.version, "dropped outdated moves");
        }
        total > 0
    }

    /// Cached legal moves starting on `sq`. Empty for empty squares and
    /// squares of the side that was not generated.
    pub fn moves_for(&self, sq: Square) -> SquareMoves {
        self.lock().by_square[sq.index()].clone()
    }

    /// Cached legal moves starting on `sq`, provided the cache was computed
    /// for the executor's current position and side to move. Empty
    /// otherwise.
    pub fn moves_for_current(&self, executor: &Executor, sq: Square) -> SquareMoves {
        let cache = self.lock();
        if cache.stamp() == Some(executor.stamp()) {
            cache.by_square[sq.index()].clone()
        } else {
            SquareMoves::new()
        }
    }

    /// All cached legal moves, ordered by origin square.
    pub fn all_moves(&self) -> MoveList {
        let cache = self.lock();
        cache.by_square.iter().flatten().copied().collect()
    }

    /// The side the cache was last computed for.
    pub fn cached_side(&self) -> Option<Color> {
        self.lock().side
    }

    /// Version and side the cache was computed for, `None` when empty.
    pub fn cached_stamp(&self) -> Option<Stamp> {
        self.lock().stamp()
    }

    pub fn clear(&self) {
        let mut cache = self.lock();
        *cache = MoveCache::empty(cache.version);
    }

    /// Empties the cache and refuses results computed from executor
    /// versions older than `version`.
    pub fn invalidate(&self, version: u64) {
        let mut cache = self.lock();
        *cache = MoveCache::empty(cache.version.max(version));
    }

    /// Tests if `m` is among the cached moves.
    pub fn contains(&self, m: &CandidateMove) -> bool {
        self.lock().by_square[m.from.index()].contains(m)
    }
}
