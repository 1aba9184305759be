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

//! Movement patterns of the pieces.
//!
//! Each [`Role`] maps to a pure function in [`PATTERNS`] that lists the
//! destinations of a piece from a square, given the occupancy of a board
//! snapshot. Patterns are pseudo-legal: they do not care whether the move
//! leaves the mover's king in check.
//!
//! In *attack-only* mode a pattern lists every square the piece controls,
//! including squares held by pieces of its own color, and pawns only list
//! their diagonals.
//!
//! # Examples
//!
//! ```
//! use chesslaw::{attacks, Board, Square};
//!
//! let board = Board::new();
//! let knight = board.piece_at(Square::B1).expect("knight");
//! let targets = attacks::destinations(&board, Square::B1, knight, false);
//! assert_eq!(&targets[..], &[Square::C3, Square::A3]);
//! ```

use arrayvec::ArrayVec;

use crate::{
    board::Board,
    castling_side::CastlingSide,
    m::{CandidateMove, ExecutedMove},
    role::{ByRole, Role},
    square::Square,
    types::Piece,
};

/// Destinations of a single piece. A queen in the center reaches 27.
pub type Destinations = ArrayVec<Square, 28>;

/// Signature shared by all movement patterns:
/// `(board, from, piece, attack_only)`.
pub type Pattern = fn(&Board, Square, Piece, bool) -> Destinations;

/// Movement pattern of each piece type.
pub const PATTERNS: ByRole<Pattern> = ByRole {
    pawn: pawn_destinations,
    knight: knight_destinations,
    bishop: bishop_destinations,
    rook: rook_destinations,
    queen: queen_destinations,
    king: king_destinations,
};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Looks up the pattern of `piece` and applies it.
#[inline]
pub fn destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    (PATTERNS.get(piece.role))(board, from, piece, attack_only)
}

/// Squares controlled by `piece` standing on `from`.
#[inline]
pub fn attacks(board: &Board, from: Square, piece: Piece) -> Destinations {
    destinations(board, from, piece, true)
}

fn pawn_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    let mut targets = Destinations::new();
    let forward = piece.color.forward();

    if !attack_only {
        if let Some(single) = from.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
            targets.push(single);
            if !piece.has_moved() {
                if let Some(double) = single.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
                    targets.push(double);
                }
            }
        }
    }

    for df in [-1, 1] {
        if let Some(to) = from.offset(df, forward) {
            if attack_only || board.color_at(to) == Some(!piece.color) {
                targets.push(to);
            }
        }
    }

    targets
}

fn knight_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    steps(board, from, piece, &KNIGHT_DELTAS, attack_only)
}

fn bishop_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    let mut targets = Destinations::new();
    rays(board, from, piece, &BISHOP_DIRECTIONS, attack_only, &mut targets);
    targets
}

fn rook_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    let mut targets = Destinations::new();
    rays(board, from, piece, &ROOK_DIRECTIONS, attack_only, &mut targets);
    targets
}

fn queen_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    let mut targets = Destinations::new();
    rays(board, from, piece, &ROOK_DIRECTIONS, attack_only, &mut targets);
    rays(board, from, piece, &BISHOP_DIRECTIONS, attack_only, &mut targets);
    targets
}

fn king_destinations(board: &Board, from: Square, piece: Piece, attack_only: bool) -> Destinations {
    steps(board, from, piece, &KING_DELTAS, attack_only)
}

fn steps(
    board: &Board,
    from: Square,
    piece: Piece,
    deltas: &[(i8, i8)],
    attack_only: bool,
) -> Destinations {
    deltas
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| attack_only || board.color_at(to) != Some(piece.color))
        .collect()
}

fn rays(
    board: &Board,
    from: Square,
    piece: Piece,
    directions: &[(i8, i8)],
    attack_only: bool,
    targets: &mut Destinations,
) {
    for &(df, dr) in directions {
        let mut sq = from;
        while let Some(to) = sq.offset(df, dr) {
            match board.color_at(to) {
                None => targets.push(to),
                Some(color) => {
                    if attack_only || color != piece.color {
                        targets.push(to);
                    }
                    break;
                }
            }
            sq = to;
        }
    }
}

/// Castling candidates of an unmoved king on its home square that still
/// has an unmoved rook in the corresponding corner.
///
/// Only the move counts are checked here. Empty squares and attacks are
/// left to validation.
pub fn castling_candidates(board: &Board, from: Square, piece: Piece) -> ArrayVec<CandidateMove, 2> {
    let mut candidates = ArrayVec::new();
    let backrank = piece.color.backrank();
    if piece.role != Role::King || piece.has_moved() || from != Square::from_coords(4, backrank) {
        return candidates;
    }

    for side in CastlingSide::ALL {
        let unmoved_rook = board
            .piece_at(side.rook_from(piece.color))
            .is_some_and(|rook| rook.is(piece.color.rook()) && !rook.has_moved());
        if unmoved_rook {
            candidates.push(CandidateMove::new(from, side.king_to(piece.color)));
        }
    }

    candidates
}

/// The en passant candidate of a pawn, if the last move was a double step
/// of an enemy pawn that landed beside it.
pub fn en_passant_candidate(
    last_move: Option<&ExecutedMove>,
    from: Square,
    piece: Piece,
) -> Option<CandidateMove> {
    let last = last_move?;
    let passed = last.to();
    if piece.role != Role::Pawn
        || last.role() != Role::Pawn
        || !last.is_double_step()
        || last.color() == piece.color
        || passed.rank() != from.rank()
        || passed.file().abs_diff(from.file()) != 1
    {
        return None;
    }
    let to = passed.offset(0, piece.color.forward())?;
    Some(CandidateMove::new(from, to))
}

/// All pseudo-legal candidates of the piece on `from`: pattern
/// destinations (one candidate per promotion role on the last rank),
/// castling and en passant.
pub fn candidates_from<const N: usize>(
    board: &Board,
    last_move: Option<&ExecutedMove>,
    from: Square,
    moves: &mut ArrayVec<CandidateMove, N>,
) {
    let Some(piece) = board.piece_at(from) else {
        return;
    };

    for to in destinations(board, from, piece, false) {
        if piece.role == Role::Pawn && to.rank() == piece.color.promotion_rank() {
            for role in Role::PROMOTIONS {
                moves.push(CandidateMove::new(from, to).with_promotion(role));
            }
        } else {
            moves.push(CandidateMove::new(from, to));
        }
    }

    match piece.role {
        Role::King => moves.extend(castling_candidates(board, from, piece)),
        Role::Pawn => moves.extend(en_passant_candidate(last_move, from, piece)),
        _ => (),
    }
}
