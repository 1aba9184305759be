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

//! Move legality.
//!
//! A [`Validator`] borrows a board snapshot together with the last executed
//! move (for en passant) and decides whether a [`CandidateMove`] is legal
//! for a side. It never mutates the borrowed board: self-check simulation
//! happens on a private copy that is dropped before returning.

use std::{error::Error, fmt};

use arrayvec::ArrayVec;

use crate::{
    attacks,
    board::Board,
    castling_side::CastlingSide,
    color::Color,
    m::{CandidateMove, ExecutedMove, MoveFlags, SquareMoves},
    role::Role,
    square::Square,
    types::Piece,
};

/// Reason a candidate move was rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IllegalMove {
    /// There is no piece on the origin square.
    EmptySource,
    /// The piece on the origin square belongs to the other side.
    WrongSide,
    /// The destination is held by a piece of the mover.
    OwnPieceAtDestination,
    /// The destination is not in the movement pattern of the piece.
    Unreachable,
    /// Missing, superfluous or forbidden promotion role.
    InvalidPromotion,
    /// The king or the castling rook has already moved.
    CastlingPieceMoved,
    /// A square between king and rook is occupied.
    CastlingBlocked,
    /// The king would castle out of, through or into check.
    CastlingThroughCheck,
    /// The diagonal pawn move is not an en passant capture of a pawn that
    /// just made a double step.
    NoEnPassant,
    /// The move would leave the mover's king in check.
    KingInCheck,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IllegalMove::EmptySource => "no piece on origin square",
            IllegalMove::WrongSide => "piece belongs to the other side",
            IllegalMove::OwnPieceAtDestination => "destination occupied by own piece",
            IllegalMove::Unreachable => "destination not reachable by piece",
            IllegalMove::InvalidPromotion => "invalid promotion",
            IllegalMove::CastlingPieceMoved => "king or rook already moved",
            IllegalMove::CastlingBlocked => "castling path is blocked",
            IllegalMove::CastlingThroughCheck => "king castles out of, through or into check",
            IllegalMove::NoEnPassant => "en passant not possible",
            IllegalMove::KingInCheck => "move leaves king in check",
        })
    }
}

impl Error for IllegalMove {}

/// Tests if any piece of `attacker` controls `sq`.
///
/// # Examples
///
/// ```
/// use chesslaw::{validate::is_square_attacked, Board, Color, Square};
///
/// let board = Board::new();
/// assert!(is_square_attacked(&board, Square::F3, Color::White));
/// assert!(!is_square_attacked(&board, Square::E4, Color::White));
/// ```
pub fn is_square_attacked(board: &Board, sq: Square, attacker: Color) -> bool {
    board
        .by_color(attacker)
        .any(|(from, piece)| attacks::attacks(board, from, piece).contains(&sq))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Kind {
    Normal,
    DoubleStep,
    Castling(CastlingSide),
    EnPassant,
    Promotion(Role),
}

/// A pseudo-legal move resolved against a board, with everything needed
/// to apply it and to take it back.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Classified {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub capture: Option<(Square, Piece)>,
    pub kind: Kind,
}

impl Classified {
    fn rook_squares(&self) -> Option<(Square, Square)> {
        match self.kind {
            Kind::Castling(side) => Some((side.rook_from(self.piece.color), side.rook_to(self.piece.color))),
            _ => None,
        }
    }

    /// Applies the move, including the rook of a castling move and the
    /// pawn taken en passant. Moved pieces have their move count
    /// incremented.
    pub fn apply(&self, board: &mut Board) {
        if let Some((sq, _)) = self.capture {
            board.remove(sq);
        }
        board.relocate(self.from, self.to);
        match self.kind {
            Kind::Promotion(role) => {
                board.place(self.to, role.of(self.piece.color).with_move_count(self.piece.move_count + 1));
            }
            Kind::Castling(_) => {
                if let Some((rook_from, rook_to)) = self.rook_squares() {
                    board.relocate(rook_from, rook_to);
                    board.increment_move_count(rook_to);
                }
                board.increment_move_count(self.to);
            }
            Kind::Normal | Kind::DoubleStep | Kind::EnPassant => board.increment_move_count(self.to),
        }
    }

    /// Reverts [`Classified::apply`] on the board it was applied to.
    pub fn undo(&self, board: &mut Board) {
        if let Some((rook_from, rook_to)) = self.rook_squares() {
            if let Some(rook) = board.remove(rook_to) {
                board.place(rook_from, rook.with_move_count(rook.move_count.saturating_sub(1)));
            }
        }
        board.remove(self.to);
        board.place(self.from, self.piece);
        if let Some((sq, captured)) = self.capture {
            board.place(sq, captured);
        }
    }

    /// The record of this move.
    pub fn record(&self) -> ExecutedMove {
        let (promotion, flags) = match self.kind {
            Kind::Normal => (None, MoveFlags::empty()),
            Kind::DoubleStep => (None, MoveFlags::DOUBLE_STEP),
            Kind::Castling(_) => (None, MoveFlags::CASTLING),
            Kind::EnPassant => (None, MoveFlags::EN_PASSANT),
            Kind::Promotion(role) => (Some(role), MoveFlags::empty()),
        };
        ExecutedMove::new(
            self.piece.color,
            self.piece.role,
            self.from,
            self.to,
            self.capture.map(|(_, piece)| piece.role),
            promotion,
            flags,
        )
    }
}

/// Decides legality of moves against a borrowed board snapshot.
///
/// # Examples
///
/// ```
/// use chesslaw::{validate::{IllegalMove, Validator}, Board, CandidateMove, Color, Square};
///
/// let board = Board::new();
/// let validator = Validator::new(&board, None);
///
/// assert!(validator.is_legal(CandidateMove::new(Square::E2, Square::E4), Color::White));
/// assert_eq!(
///     validator.validate_move(CandidateMove::new(Square::E2, Square::E5), Color::White),
///     Err(IllegalMove::Unreachable)
/// );
/// assert_eq!(
///     validator.validate_move(CandidateMove::new(Square::E7, Square::E5), Color::White),
///     Err(IllegalMove::WrongSide)
/// );
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Validator<'a> {
    board: &'a Board,
    last_move: Option<&'a ExecutedMove>,
}

impl<'a> Validator<'a> {
    pub fn new(board: &'a Board, last_move: Option<&'a ExecutedMove>) -> Validator<'a> {
        Validator { board, last_move }
    }

    pub fn board(&self) -> &'a Board {
        self.board
    }

    pub fn last_move(&self) -> Option<&'a ExecutedMove> {
        self.last_move
    }

    /// Validates a move for `side`.
    ///
    /// # Errors
    ///
    /// Returns the first [`IllegalMove`] reason found. Checks run in order:
    /// origin, castling preconditions, destination, pattern, en passant,
    /// promotion, own king safety.
    pub fn validate_move(&self, m: CandidateMove, side: Color) -> Result<(), IllegalMove> {
        self.classify(m, side).map(drop)
    }

    pub fn is_legal(&self, m: CandidateMove, side: Color) -> bool {
        self.classify(m, side).is_ok()
    }

    /// Tests if `side`'s king, standing on `king_sq`, is attacked by the
    /// opposing side.
    pub fn is_king_in_check(&self, king_sq: Square, side: Color) -> bool {
        is_square_attacked(self.board, king_sq, !side)
    }

    /// Tests if `side` is in check. A side without a king is never in
    /// check.
    pub fn is_check(&self, side: Color) -> bool {
        self.board
            .king(side)
            .is_some_and(|king| self.is_king_in_check(king, side))
    }

    /// Simulates the move on a scratch copy of the board and tests if the
    /// mover's king would be attacked afterwards.
    ///
    /// Moves that are not pseudo-legal are simulated as a plain relocation.
    pub fn would_king_be_in_check_after_move(&self, m: CandidateMove, side: Color) -> bool {
        match self.pseudo_legal(m, side) {
            Ok(plan) => self.exposes_king(&plan, side),
            Err(_) => {
                let mut scratch = self.board.clone();
                scratch.relocate(m.from, m.to);
                king_attacked(&scratch, side)
            }
        }
    }

    /// Tests if `side` has at least one legal move.
    pub fn has_legal_move(&self, side: Color) -> bool {
        self.board.by_color(side).any(|(from, _)| {
            let mut candidates = SquareMoves::new();
            attacks::candidates_from(self.board, self.last_move, from, &mut candidates);
            candidates.into_iter().any(|m| self.is_legal(m, side))
        })
    }

    pub fn is_checkmate(&self, side: Color) -> bool {
        self.is_check(side) && !self.has_legal_move(side)
    }

    pub fn is_stalemate(&self, side: Color) -> bool {
        !self.is_check(side) && !self.has_legal_move(side)
    }

    /// Resolves a legal move into an applicable plan.
    pub(crate) fn classify(&self, m: CandidateMove, side: Color) -> Result<Classified, IllegalMove> {
        let plan = self.pseudo_legal(m, side)?;
        if self.exposes_king(&plan, side) {
            return Err(IllegalMove::KingInCheck);
        }
        Ok(plan)
    }

    fn exposes_king(&self, plan: &Classified, side: Color) -> bool {
        let mut scratch = self.board.clone();
        plan.apply(&mut scratch);
        king_attacked(&scratch, side)
    }

    fn pseudo_legal(&self, m: CandidateMove, side: Color) -> Result<Classified, IllegalMove> {
        let piece = self.board.piece_at(m.from).ok_or(IllegalMove::EmptySource)?;
        if piece.color != side {
            return Err(IllegalMove::WrongSide);
        }

        if piece.role == Role::King
            && m.from.rank() == m.to.rank()
            && m.from.file().abs_diff(m.to.file()) == 2
        {
            return self.castling(m, piece);
        }

        if self.board.color_at(m.to) == Some(side) {
            return Err(IllegalMove::OwnPieceAtDestination);
        }

        let kind = if attacks::destinations(self.board, m.from, piece, false).contains(&m.to) {
            if piece.role == Role::Pawn && m.from.rank().abs_diff(m.to.rank()) == 2 {
                Kind::DoubleStep
            } else {
                Kind::Normal
            }
        } else if piece.role == Role::Pawn && attacks::attacks(self.board, m.from, piece).contains(&m.to) {
            if attacks::en_passant_candidate(self.last_move, m.from, piece)
                != Some(CandidateMove::new(m.from, m.to))
            {
                return Err(IllegalMove::NoEnPassant);
            }
            Kind::EnPassant
        } else {
            return Err(IllegalMove::Unreachable);
        };

        let capture = if kind == Kind::EnPassant {
            let sq = Square::from_coords(m.to.file(), m.from.rank());
            let passed = self
                .board
                .piece_at(sq)
                .filter(|p| p.is((!piece.color).pawn()))
                .ok_or(IllegalMove::NoEnPassant)?;
            Some((sq, passed))
        } else {
            self.board.piece_at(m.to).map(|captured| (m.to, captured))
        };

        let kind = if piece.role == Role::Pawn && m.to.rank() == side.promotion_rank() {
            let role = m.promotion.unwrap_or(Role::Queen);
            if !role.is_promotion_target() {
                return Err(IllegalMove::InvalidPromotion);
            }
            Kind::Promotion(role)
        } else if m.promotion.is_some() {
            return Err(IllegalMove::InvalidPromotion);
        } else {
            kind
        };

        Ok(Classified {
            piece,
            from: m.from,
            to: m.to,
            capture,
            kind,
        })
    }

    fn castling(&self, m: CandidateMove, king: Piece) -> Result<Classified, IllegalMove> {
        let color = king.color;
        if m.promotion.is_some() {
            return Err(IllegalMove::InvalidPromotion);
        }

        let side = CastlingSide::from_king_move(m.from.file(), m.to.file());
        if king.has_moved() || m.from != Square::from_coords(4, color.backrank()) {
            return Err(IllegalMove::CastlingPieceMoved);
        }
        let rook_from = side.rook_from(color);
        match self.board.piece_at(rook_from) {
            Some(rook) if rook.is(color.rook()) && !rook.has_moved() => (),
            _ => return Err(IllegalMove::CastlingPieceMoved),
        }

        let (low, high) = if m.from < rook_from {
            (m.from.file() + 1, rook_from.file())
        } else {
            (rook_from.file() + 1, m.from.file())
        };
        if (low..high).any(|file| !self.board.is_empty(Square::from_coords(file, m.from.rank()))) {
            return Err(IllegalMove::CastlingBlocked);
        }

        let passed = Square::from_coords((m.from.file() + m.to.file()) / 2, m.from.rank());
        let king_path: ArrayVec<Square, 3> = [m.from, passed, m.to].into_iter().collect();
        if king_path.iter().any(|&sq| is_square_attacked(self.board, sq, !color)) {
            return Err(IllegalMove::CastlingThroughCheck);
        }

        Ok(Classified {
            piece: king,
            from: m.from,
            to: m.to,
            capture: None,
            kind: Kind::Castling(side),
        })
    }
}

fn king_attacked(board: &Board, side: Color) -> bool {
    board
        .king(side)
        .is_some_and(|king| is_square_attacked(board, king, !side))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_board_fen(fen.as_bytes()).expect("valid board fen")
    }

    fn mv(from: Square, to: Square) -> CandidateMove {
        CandidateMove::new(from, to)
    }

    #[test]
    fn test_basic_rejections() {
        let board = Board::new();
        let v = Validator::new(&board, None);
        assert_eq!(v.validate_move(mv(Square::E4, Square::E5), Color::White), Err(IllegalMove::EmptySource));
        assert_eq!(v.validate_move(mv(Square::D1, Square::D2), Color::White), Err(IllegalMove::OwnPieceAtDestination));
        assert_eq!(v.validate_move(mv(Square::C1, Square::E3), Color::White), Err(IllegalMove::Unreachable));
        assert_eq!(
            v.validate_move(mv(Square::E2, Square::E4).with_promotion(Role::Queen), Color::White),
            Err(IllegalMove::InvalidPromotion)
        );
        assert_eq!(v.validate_move(mv(Square::G8, Square::F6), Color::Black), Ok(()));
    }

    #[test]
    fn test_pinned_piece() {
        let board = board("4r1k1/8/8/8/8/8/4N3/4K3");
        let v = Validator::new(&board, None);
        assert_eq!(v.validate_move(mv(Square::E2, Square::C3), Color::White), Err(IllegalMove::KingInCheck));
        assert!(v.would_king_be_in_check_after_move(mv(Square::E2, Square::C3), Color::White));
        assert!(!v.would_king_be_in_check_after_move(mv(Square::E1, Square::D1), Color::White));
        assert!(v.is_legal(mv(Square::E1, Square::D1), Color::White));
    }

    #[test]
    fn test_check_detection() {
        let board = board("4k3/8/8/8/8/8/8/4K2r");
        let v = Validator::new(&board, None);
        assert!(v.is_check(Color::White));
        assert!(v.is_king_in_check(Square::E1, Color::White));
        assert!(!v.is_check(Color::Black));
        assert!(!v.is_legal(mv(Square::E1, Square::F1), Color::White));
        assert!(v.is_legal(mv(Square::E1, Square::E2), Color::White));
    }

    #[test]
    fn test_no_king_is_not_check() {
        let board = board("8/8/8/8/8/8/8/7r");
        let v = Validator::new(&board, None);
        assert!(!v.is_check(Color::White));
        assert!(!v.is_checkmate(Color::White));
    }

    #[test]
    fn test_castling_conditions() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R");
        let v = Validator::new(&board, None);
        assert!(v.is_legal(mv(Square::E1, Square::G1), Color::White));
        assert!(v.is_legal(mv(Square::E1, Square::C1), Color::White));
        assert!(v.is_legal(mv(Square::E8, Square::C8), Color::Black));

        let blocked = self::board("r3k2r/8/8/8/8/8/8/RN2K2R");
        let v = Validator::new(&blocked, None);
        assert_eq!(v.validate_move(mv(Square::E1, Square::C1), Color::White), Err(IllegalMove::CastlingBlocked));
        assert!(v.is_legal(mv(Square::E1, Square::G1), Color::White));

        let attacked = self::board("r3k2r/8/8/8/8/8/5r2/R3K2R");
        let v = Validator::new(&attacked, None);
        assert_eq!(
            v.validate_move(mv(Square::E1, Square::G1), Color::White),
            Err(IllegalMove::CastlingThroughCheck)
        );

        let mut moved = board.clone();
        moved.increment_move_count(Square::H1);
        let v = Validator::new(&moved, None);
        assert_eq!(
            v.validate_move(mv(Square::E1, Square::G1), Color::White),
            Err(IllegalMove::CastlingPieceMoved)
        );
    }

    #[test]
    fn test_castling_applies_rook() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R");
        let v = Validator::new(&board, None);
        let plan = v.classify(mv(Square::E8, Square::C8), Color::Black).expect("legal");
        let mut after = board.clone();
        plan.apply(&mut after);
        assert_eq!(after.piece_at(Square::C8), Some(Color::Black.king().with_move_count(1)));
        assert_eq!(after.piece_at(Square::D8), Some(Color::Black.rook().with_move_count(1)));
        assert_eq!(after.king(Color::Black), Some(Square::C8));
        assert!(plan.record().is_castling());

        plan.undo(&mut after);
        assert_eq!(after, board);
    }

    #[test]
    fn test_en_passant() {
        let board = board("4k3/8/8/3pP3/8/8/8/4K3");
        let double_step = ExecutedMove::new(
            Color::Black,
            Role::Pawn,
            Square::D7,
            Square::D5,
            None,
            None,
            MoveFlags::DOUBLE_STEP,
        );
        let v = Validator::new(&board, Some(&double_step));
        let plan = v.classify(mv(Square::E5, Square::D6), Color::White).expect("en passant");
        assert_eq!(plan.capture, Some((Square::D5, Color::Black.pawn().with_move_count(1))));
        assert!(plan.record().is_en_passant());

        let mut after = board.clone();
        plan.apply(&mut after);
        assert!(after.is_empty(Square::D5));
        plan.undo(&mut after);
        assert_eq!(after, board);

        let v = Validator::new(&board, None);
        assert_eq!(v.validate_move(mv(Square::E5, Square::D6), Color::White), Err(IllegalMove::NoEnPassant));
    }

    #[test]
    fn test_promotion() {
        let board = board("4k3/P7/8/8/8/8/8/4K3");
        let v = Validator::new(&board, None);
        let plan = v.classify(mv(Square::A7, Square::A8), Color::White).expect("promotion");
        assert_eq!(plan.kind, Kind::Promotion(Role::Queen));
        assert!(v.is_legal(mv(Square::A7, Square::A8).with_promotion(Role::Knight), Color::White));
        assert_eq!(
            v.validate_move(mv(Square::A7, Square::A8).with_promotion(Role::King), Color::White),
            Err(IllegalMove::InvalidPromotion)
        );
        assert_eq!(
            v.validate_move(mv(Square::A7, Square::A8).with_promotion(Role::Pawn), Color::White),
            Err(IllegalMove::InvalidPromotion)
        );

        let mut after = board.clone();
        plan.apply(&mut after);
        assert_eq!(after.role_at(Square::A8), Some(Role::Queen));
        plan.undo(&mut after);
        assert_eq!(after, board);
    }

    #[test]
    fn test_mate_and_stalemate() {
        let mate = board("R5k1/5ppp/8/8/8/8/8/6K1");
        let v = Validator::new(&mate, None);
        assert!(v.is_checkmate(Color::Black));
        assert!(!v.is_stalemate(Color::Black));

        let stalemate = self::board("7k/5Q2/8/8/8/8/8/6K1");
        let v = Validator::new(&stalemate, None);
        assert!(v.is_stalemate(Color::Black));
        assert!(!v.is_checkmate(Color::Black));
        assert!(v.has_legal_move(Color::White));
    }
}
