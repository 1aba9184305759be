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

//! Parse and write Forsyth-Edwards Notation.
//!
//! Placement, side to move, castling and en passant fields carry
//! information for this engine. Move counts are not part of FEN, so they
//! are inferred: pieces off their home squares count as moved, and missing
//! castling rights mark the rook (or the king, when a side has no rights
//! left) as moved. The en passant square stands for the double step that
//! preceded the position. Clocks are accepted and ignored.
//!
//! # Examples
//!
//! ```
//! use chesslaw::{fen::Fen, Color, Square};
//!
//! let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 0 1".parse()?;
//! assert_eq!(fen.turn, Color::Black);
//!
//! let h8 = fen.board.piece_at(Square::H8).expect("rook");
//! assert!(h8.has_moved());
//!
//! assert_eq!(fen.to_string(), "r3k2r/8/8/8/8/8/8/R3K2R b Kq");
//! # Ok::<_, chesslaw::fen::ParseFenError>(())
//! ```

use std::{error::Error, fmt, str::FromStr};

use crate::{
    board::Board,
    castling_side::CastlingSide,
    color::{ByColor, Color},
    m::{ExecutedMove, MoveFlags},
    role::Role,
    square::Square,
};

/// Errors that can occur when parsing a FEN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseFenError {
    InvalidBoard,
    InvalidTurn,
    InvalidCastling,
    InvalidEnPassant,
}

impl fmt::Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            ParseFenError::InvalidBoard => "invalid board part in fen",
            ParseFenError::InvalidTurn => "invalid turn part in fen",
            ParseFenError::InvalidCastling => "invalid castling part in fen",
            ParseFenError::InvalidEnPassant => "invalid en passant part in fen",
        })
    }
}

impl Error for ParseFenError {}

#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
struct Rights {
    king_side: bool,
    queen_side: bool,
}

impl Rights {
    fn get(self, side: CastlingSide) -> bool {
        match side {
            CastlingSide::KingSide => self.king_side,
            CastlingSide::QueenSide => self.queen_side,
        }
    }

    fn set(&mut self, side: CastlingSide) -> Result<(), ParseFenError> {
        let right = match side {
            CastlingSide::KingSide => &mut self.king_side,
            CastlingSide::QueenSide => &mut self.queen_side,
        };
        if *right {
            return Err(ParseFenError::InvalidCastling);
        }
        *right = true;
        Ok(())
    }
}

/// A parsed FEN: board with inferred move counts, side to move and en
/// passant square.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fen {
    pub board: Board,
    pub turn: Color,
    /// Square skipped by the double step that led to this position.
    pub en_passant: Option<Square>,
}

impl Default for Fen {
    fn default() -> Fen {
        Fen {
            board: Board::new(),
            turn: Color::White,
            en_passant: None,
        }
    }
}

impl Fen {
    pub fn empty() -> Fen {
        Fen {
            board: Board::empty(),
            ..Fen::default()
        }
    }

    pub fn from_board(board: Board, turn: Color) -> Fen {
        Fen {
            board,
            turn,
            en_passant: None,
        }
    }

    /// Parses a FEN.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] if `fen` is not syntactically valid.
    pub fn from_ascii(fen: &[u8]) -> Result<Fen, ParseFenError> {
        let mut parts = fen.split(|ch| *ch == b' ').filter(|part| !part.is_empty());

        let board_part = parts.next().ok_or(ParseFenError::InvalidBoard)?;
        let mut board = Board::from_board_fen(board_part).map_err(|_| ParseFenError::InvalidBoard)?;

        let turn = match parts.next() {
            Some(b"w") | None => Color::White,
            Some(b"b") => Color::Black,
            Some(_) => return Err(ParseFenError::InvalidTurn),
        };

        if let Some(castling_part) = parts.next() {
            let rights = parse_castling(castling_part)?;
            for color in Color::ALL {
                apply_rights(&mut board, color, *rights.get(color));
            }
        }

        let en_passant = match parts.next() {
            Some(b"-") | None => None,
            Some(part) => {
                let sq = Square::from_ascii(part).map_err(|_| ParseFenError::InvalidEnPassant)?;
                if sq.rank() != turn.fold(5, 2) {
                    return Err(ParseFenError::InvalidEnPassant);
                }
                Some(sq)
            }
        };

        Ok(Fen {
            board,
            turn,
            en_passant,
        })
    }

    /// The double step implied by the en passant square, if the board
    /// agrees with it: the enemy pawn stands in front of the square, and
    /// the square and the pawn's origin are empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chesslaw::{fen::Fen, Square};
    ///
    /// let fen: Fen = "4k3/8/8/8/3Pp3/8/8/4K3 b - d3".parse()?;
    /// let last = fen.last_move().expect("double step");
    /// assert_eq!((last.from(), last.to()), (Square::D2, Square::D4));
    /// # Ok::<_, chesslaw::fen::ParseFenError>(())
    /// ```
    pub fn last_move(&self) -> Option<ExecutedMove> {
        let skipped = self.en_passant?;
        let mover = !self.turn;
        let to = skipped.offset(0, mover.forward())?;
        let from = skipped.offset(0, -mover.forward())?;
        let pawn_in_place = self
            .board
            .piece_at(to)
            .is_some_and(|pawn| pawn.is(mover.pawn()));
        if !pawn_in_place || !self.board.is_empty(skipped) || !self.board.is_empty(from) {
            return None;
        }
        Some(ExecutedMove::new(
            mover,
            Role::Pawn,
            from,
            to,
            None,
            None,
            MoveFlags::DOUBLE_STEP,
        ))
    }

    /// Castling rights implied by the move counts of kings and corner
    /// rooks.
    fn rights(&self) -> ByColor<Rights> {
        ByColor::new_with(|color| {
            let home = Square::from_coords(4, color.backrank());
            let unmoved_king = self
                .board
                .piece_at(home)
                .is_some_and(|king| king.is(color.king()) && !king.has_moved());
            let unmoved_rook = |side: CastlingSide| {
                unmoved_king
                    && self
                        .board
                        .piece_at(side.rook_from(color))
                        .is_some_and(|rook| rook.is(color.rook()) && !rook.has_moved())
            };
            Rights {
                king_side: unmoved_rook(CastlingSide::KingSide),
                queen_side: unmoved_rook(CastlingSide::QueenSide),
            }
        })
    }
}

fn parse_castling(castling_part: &[u8]) -> Result<ByColor<Rights>, ParseFenError> {
    let mut rights = ByColor::<Rights>::default();
    if castling_part == b"-" {
        return Ok(rights);
    }
    for &ch in castling_part {
        let color = Color::from_white(ch.is_ascii_uppercase());
        let side = match ch.to_ascii_lowercase() {
            b'k' => CastlingSide::KingSide,
            b'q' => CastlingSide::QueenSide,
            _ => return Err(ParseFenError::InvalidCastling),
        };
        rights.get_mut(color).set(side)?;
    }
    Ok(rights)
}

fn apply_rights(board: &mut Board, color: Color, rights: Rights) {
    for side in CastlingSide::ALL {
        let corner = side.rook_from(color);
        let unmoved_rook = board
            .piece_at(corner)
            .is_some_and(|rook| rook.is(color.rook()) && !rook.has_moved());
        if !rights.get(side) && unmoved_rook {
            board.increment_move_count(corner);
        }
    }

    if rights == Rights::default() {
        let home = Square::from_coords(4, color.backrank());
        let unmoved_king = board
            .piece_at(home)
            .is_some_and(|king| king.is(color.king()) && !king.has_moved());
        if unmoved_king {
            board.increment_move_count(home);
        }
    }
}

impl FromStr for Fen {
    type Err = ParseFenError;

    fn from_str(fen: &str) -> Result<Fen, ParseFenError> {
        Fen::from_ascii(fen.as_bytes())
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.board.board_fen(), self.turn.char())?;

        let rights = self.rights();
        let mut any = false;
        for color in Color::ALL {
            let r = rights.get(color);
            for (right, ch) in [(r.king_side, 'k'), (r.queen_side, 'q')] {
                if right {
                    write!(f, "{}", color.fold(ch.to_ascii_uppercase(), ch))?;
                    any = true;
                }
            }
        }
        if !any {
            f.write_str("-")?;
        }
        if let Some(sq) = self.en_passant {
            write!(f, " {sq}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let fen: Fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .expect("valid fen");
        assert_eq!(fen, Fen::default());
        assert_eq!(fen.to_string(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq");
    }

    #[test]
    fn test_placement_only() {
        let fen: Fen = "8/8/8/8/8/8/8/8".parse().expect("valid fen");
        assert_eq!(fen, Fen::empty());
        assert_eq!(fen.to_string(), "8/8/8/8/8/8/8/8 w -");
    }

    #[test]
    fn test_castling_rights_mark_pieces() {
        let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R w Qk -".parse().expect("valid fen");
        assert!(fen.board.piece_at(Square::H1).expect("rook").has_moved());
        assert!(!fen.board.piece_at(Square::A1).expect("rook").has_moved());
        assert!(fen.board.piece_at(Square::A8).expect("rook").has_moved());
        assert!(!fen.board.piece_at(Square::E1).expect("king").has_moved());

        let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R w K -".parse().expect("valid fen");
        assert!(fen.board.piece_at(Square::E8).expect("king").has_moved());
        assert_eq!(fen.to_string(), "r3k2r/8/8/8/8/8/8/R3K2R w K");
    }

    #[test]
    fn test_invalid() {
        assert_eq!("".parse::<Fen>(), Err(ParseFenError::InvalidBoard));
        assert_eq!("8/8/8 w".parse::<Fen>(), Err(ParseFenError::InvalidBoard));
        assert_eq!("8/8/8/8/8/8/8/8 x".parse::<Fen>(), Err(ParseFenError::InvalidTurn));
        assert_eq!("8/8/8/8/8/8/8/8 w KK".parse::<Fen>(), Err(ParseFenError::InvalidCastling));
        assert_eq!("8/8/8/8/8/8/8/8 w A".parse::<Fen>(), Err(ParseFenError::InvalidCastling));
        assert_eq!("8/8/8/8/8/8/8/8 w - z9".parse::<Fen>(), Err(ParseFenError::InvalidEnPassant));
        assert_eq!("8/8/8/8/8/8/8/8 w - d3".parse::<Fen>(), Err(ParseFenError::InvalidEnPassant));
    }

    #[test]
    fn test_en_passant() {
        let fen: Fen = "4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1".parse().expect("valid fen");
        assert_eq!(fen.en_passant, Some(Square::D3));
        assert_eq!(fen.to_string(), "4k3/8/8/8/3Pp3/8/8/4K3 b - d3");
        let last = fen.last_move().expect("double step");
        assert!(last.is_double_step());
        assert_eq!(last.color(), Color::White);

        // no pawn that could have made the double step
        let fen: Fen = "4k3/8/8/8/4p3/8/8/4K3 b - d3".parse().expect("valid fen");
        assert_eq!(fen.last_move(), None);

        let fen: Fen = "4k3/8/8/8/8/8/8/4K3 w - -".parse().expect("valid fen");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.last_move(), None);
    }
}
