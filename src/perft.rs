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

//! Count legal move paths.
//!
//! # Examples
//!
//! ```
//! use chesslaw::{perft::perft, Board, Color};
//!
//! let board = Board::new();
//! assert_eq!(perft(&board, None, Color::White, 1), 20);
//! assert_eq!(perft(&board, None, Color::White, 2), 400);
//! ```

use crate::{
    attacks,
    board::Board,
    color::Color,
    m::{CandidateMove, ExecutedMove, SquareMoves},
    validate::Validator,
};

fn for_each_legal<F>(board: &Board, last_move: Option<&ExecutedMove>, side: Color, mut f: F)
where
    F: FnMut(CandidateMove, Board, ExecutedMove),
{
    let validator = Validator::new(board, last_move);
    for (from, _) in board.by_color(side) {
        let mut candidates = SquareMoves::new();
        attacks::candidates_from(board, last_move, from, &mut candidates);
        for m in candidates {
            if let Ok(plan) = validator.classify(m, side) {
                let mut child = board.clone();
                plan.apply(&mut child);
                f(m, child, plan.record());
            }
        }
    }
}

/// Counts legal move paths of a given length.
///
/// Paths with mate or stalemate are not counted unless it occurs in the final
/// position. Useful for comparing, testing and debugging move generation
/// correctness.
pub fn perft(board: &Board, last_move: Option<&ExecutedMove>, side: Color, depth: u32) -> u64 {
    if depth < 1 {
        return 1;
    }

    let mut nodes = 0;
    for_each_legal(board, last_move, side, |_, child, record| {
        nodes += if depth == 1 {
            1
        } else {
            perft(&child, Some(&record), !side, depth - 1)
        };
    });
    nodes
}

/// Like [`perft()`], but lists the node count below each legal move.
pub fn perft_divide(
    board: &Board,
    last_move: Option<&ExecutedMove>,
    side: Color,
    depth: u32,
) -> Vec<(CandidateMove, u64)> {
    let mut divided = Vec::new();
    if depth < 1 {
        return divided;
    }
    for_each_legal(board, last_move, side, |m, child, record| {
        divided.push((m, perft(&child, Some(&record), !side, depth - 1)));
    });
    divided
}
