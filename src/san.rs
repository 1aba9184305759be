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

//! Read and write Standard Algebraic Notation.
//!
//! # Examples
//!
//! Parse and write SANs:
//!
//! ```
//! use chesslaw::san::San;
//!
//! let san: San = "Nf3".parse()?;
//! assert_eq!(san.to_string(), "Nf3");
//! # Ok::<_, chesslaw::san::ParseSanError>(())
//! ```
//!
//! Converting to a move:
//!
//! ```
//! # use chesslaw::san::{ParseSanError, San, SanError};
//! use chesslaw::{Board, CandidateMove, Color, Square};
//! #
//! # let san: San = "Nf3".parse()?;
//! let board = Board::new();
//! let m = san.to_move(&board, None, Color::White)?;
//!
//! assert_eq!(m, CandidateMove::new(Square::G1, Square::F3));
//!
//! # #[derive(Debug)] struct CommonError;
//! # impl From<ParseSanError> for CommonError { fn from(_: ParseSanError) -> Self { Self } }
//! # impl From<SanError> for CommonError { fn from(_: SanError) -> Self { Self } }
//! # Ok::<_, CommonError>(())
//! ```

use std::{error::Error, fmt, str::FromStr};

use crate::{
    attacks,
    board::Board,
    castling_side::CastlingSide,
    color::Color,
    m::{CandidateMove, ExecutedMove, MoveList, SquareMoves},
    role::Role,
    square::Square,
    validate::Validator,
};

/// Error when parsing a syntactially invalid SAN.
#[derive(Clone, Debug)]
pub struct ParseSanError;

impl fmt::Display for ParseSanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid san")
    }
}

impl Error for ParseSanError {}

/// `IllegalSan` or `AmbiguousSan`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SanError {
    /// Standard algebraic notation does not match a legal move.
    IllegalSan,
    /// Standard algebraic notation matches multiple legal moves.
    AmbiguousSan,
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            SanError::IllegalSan => "illegal san",
            SanError::AmbiguousSan => "ambiguous san",
        })
    }
}

impl Error for SanError {}

fn file_from_ascii(ch: u8) -> Option<u8> {
    (b'a'..=b'h').contains(&ch).then(|| ch - b'a')
}

fn rank_from_ascii(ch: u8) -> Option<u8> {
    (b'1'..=b'8').contains(&ch).then(|| ch - b'1')
}

/// Legal moves of `side`'s pieces of type `role` that reach `to`.
fn san_candidates(
    board: &Board,
    last_move: Option<&ExecutedMove>,
    side: Color,
    role: Role,
    to: Square,
) -> MoveList {
    let validator = Validator::new(board, last_move);
    let mut legals = MoveList::new();
    for (from, _) in board.by_color(side).filter(|(_, piece)| piece.role == role) {
        let mut candidates = SquareMoves::new();
        attacks::candidates_from(board, last_move, from, &mut candidates);
        legals.extend(
            candidates
                .into_iter()
                .filter(|c| c.to == to && validator.is_legal(*c, side)),
        );
    }
    legals
}

fn is_capture(board: &Board, role: Role, m: &CandidateMove) -> bool {
    board.piece_at(m.to).is_some() || (role == Role::Pawn && m.from.file() != m.to.file())
}

/// A move in Standard Algebraic Notation.
///
/// Files and ranks used for disambiguation are zero based, like the
/// coordinates of a [`Square`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum San {
    Normal {
        role: Role,
        file: Option<u8>,
        rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    Castle(CastlingSide),
}

impl San {
    /// Parses a SAN. Ignores a possible check or checkmate suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(mut san: &[u8]) -> Result<San, ParseSanError> {
        if san.ends_with(b"#") || san.ends_with(b"+") {
            san = &san[0..(san.len() - 1)];
        }

        if san == b"O-O" {
            return Ok(San::Castle(CastlingSide::KingSide));
        } else if san == b"O-O-O" {
            return Ok(San::Castle(CastlingSide::QueenSide));
        }

        let mut chars = san.iter().copied();

        let ch = chars.next().ok_or(ParseSanError)?;
        let (role, next) = if ch.is_ascii_uppercase() {
            (
                Role::from_char(char::from(ch)).ok_or(ParseSanError)?,
                chars.next().ok_or(ParseSanError)?,
            )
        } else {
            (Role::Pawn, ch)
        };

        let (file, next) = if let Some(file) = file_from_ascii(next) {
            (Some(file), chars.next().ok_or(ParseSanError)?)
        } else {
            (None, next)
        };

        let (rank, next) = if let Some(rank) = rank_from_ascii(next) {
            (Some(rank), chars.next())
        } else {
            (None, Some(next))
        };

        let (capture, file, rank, to, next) = if let Some(next) = next {
            if next == b'x' {
                let to_file = chars.next().and_then(file_from_ascii).ok_or(ParseSanError)?;
                let to_rank = chars.next().and_then(rank_from_ascii).ok_or(ParseSanError)?;
                (true, file, rank, Square::from_coords(to_file, to_rank), chars.next())
            } else if next == b'=' {
                let square = Square::from_coords(file.ok_or(ParseSanError)?, rank.ok_or(ParseSanError)?);
                (false, None, None, square, Some(b'='))
            } else {
                let to_file = file_from_ascii(next).ok_or(ParseSanError)?;
                let to_rank = chars.next().and_then(rank_from_ascii).ok_or(ParseSanError)?;
                (false, file, rank, Square::from_coords(to_file, to_rank), chars.next())
            }
        } else {
            let square = Square::from_coords(file.ok_or(ParseSanError)?, rank.ok_or(ParseSanError)?);
            (false, None, None, square, None)
        };

        let promotion = match next {
            Some(b'=') => Some(
                chars
                    .next()
                    .and_then(|r| Role::from_char(char::from(r)))
                    .ok_or(ParseSanError)?,
            ),
            Some(_) => return Err(ParseSanError),
            None => None,
        };

        if chars.next().is_some() {
            return Err(ParseSanError);
        }

        Ok(San::Normal {
            role,
            file,
            rank,
            capture,
            to,
            promotion,
        })
    }

    /// Converts an executed move to Standard Algebraic Notation.
    ///
    /// `board` and `last_move` describe the position *before* the move.
    /// Pieces are disambiguated by file, then by rank, then by both, if
    /// several pieces of the same type can legally reach the target.
    pub fn from_move(board: &Board, last_move: Option<&ExecutedMove>, m: &ExecutedMove) -> San {
        let legals = match m.role() {
            Role::Pawn | Role::King => MoveList::new(),
            role => san_candidates(board, last_move, m.color(), role, m.to()),
        };
        San::disambiguate(m, &legals)
    }

    /// Builds the SAN of `m` given all legal moves of the same piece type
    /// to the same target.
    pub fn disambiguate(m: &ExecutedMove, moves: &[CandidateMove]) -> San {
        if let Some(side) = m.castling_side() {
            return San::Castle(side);
        }

        if m.role() == Role::Pawn {
            return San::Normal {
                role: Role::Pawn,
                file: m.is_capture().then(|| m.from().file()),
                rank: None,
                capture: m.is_capture(),
                to: m.to(),
                promotion: m.promotion(),
            };
        }

        let from = m.from();
        let (rank, file) = moves
            .iter()
            .filter(|c| c.to == m.to() && c.promotion == m.promotion())
            .fold((false, false), |(rank, file), c| {
                if from == c.from {
                    (rank, file)
                } else if from.rank() == c.from.rank() || from.file() != c.from.file() {
                    (rank, true)
                } else {
                    (true, file)
                }
            });

        San::Normal {
            role: m.role(),
            file: file.then(|| from.file()),
            rank: rank.then(|| from.rank()),
            capture: m.is_capture(),
            to: m.to(),
            promotion: m.promotion(),
        }
    }

    /// Tries to convert the `San` to a legal move of `side` on `board`.
    ///
    /// # Errors
    ///
    /// Returns [`SanError`] if there is no unique matching legal move.
    pub fn to_move(
        &self,
        board: &Board,
        last_move: Option<&ExecutedMove>,
        side: Color,
    ) -> Result<CandidateMove, SanError> {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                let mut legals = san_candidates(board, last_move, side, role, to);
                legals.retain(|m| {
                    file.is_none_or(|f| f == m.from.file())
                        && rank.is_none_or(|r| r == m.from.rank())
                        && capture == is_capture(board, role, m)
                        && promotion == m.promotion
                });
                legals
                    .split_first()
                    .map_or(Err(SanError::IllegalSan), |(m, others)| {
                        if others.is_empty() {
                            Ok(*m)
                        } else {
                            Err(SanError::AmbiguousSan)
                        }
                    })
            }
            San::Castle(castling_side) => {
                let king = board.king(side).ok_or(SanError::IllegalSan)?;
                let m = CandidateMove::new(king, castling_side.king_to(side));
                let is_castling = king.file().abs_diff(m.to.file()) == 2;
                if is_castling && Validator::new(board, last_move).is_legal(m, side) {
                    Ok(m)
                } else {
                    Err(SanError::IllegalSan)
                }
            }
        }
    }

    /// Test if the `San` can match the executed move (in any position).
    ///
    /// # Examples
    ///
    /// ```
    /// use chesslaw::{san::San, Game, Square};
    ///
    /// let game = Game::new();
    /// game.execute_san("Nf3")?;
    /// let m = game.last_move().expect("move");
    ///
    /// assert!(San::from_ascii(b"Nf3")?.matches(&m));
    /// assert!(San::from_ascii(b"Ng1f3")?.matches(&m));
    ///
    /// // capture does not match
    /// assert!(!San::from_ascii(b"Nxf3")?.matches(&m));
    ///
    /// // other file does not match
    /// assert!(!San::from_ascii(b"Nef3")?.matches(&m));
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn matches(&self, m: &ExecutedMove) -> bool {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                !m.is_castling()
                    && role == m.role()
                    && file.is_none_or(|f| f == m.from().file())
                    && rank.is_none_or(|r| r == m.from().rank())
                    && capture == m.is_capture()
                    && to == m.to()
                    && promotion == m.promotion()
            }
            San::Castle(side) => m.castling_side() == Some(side),
        }
    }
}

impl FromStr for San {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<San, ParseSanError> {
        San::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    write!(f, "{}", role.upper_char())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", char::from(b'a' + file))?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", char::from(b'1' + rank))?;
                }
                if capture {
                    write!(f, "x")?;
                }
                write!(f, "{to}")?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::Castle(CastlingSide::KingSide) => write!(f, "O-O"),
            San::Castle(CastlingSide::QueenSide) => write!(f, "O-O-O"),
        }
    }
}

/// Check (`+`) or checkmate (`#`) suffix.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Suffix {
    Check,
    Checkmate,
}

impl Suffix {
    pub const fn char(self) -> char {
        match self {
            Suffix::Check => '+',
            Suffix::Checkmate => '#',
        }
    }

    pub const fn from_char(ch: char) -> Option<Suffix> {
        match ch {
            '+' => Some(Suffix::Check),
            '#' => Some(Suffix::Checkmate),
            _ => None,
        }
    }

    /// Computes the suffix on the board after `last_move`, with `turn` to
    /// move.
    pub fn from_position(board: &Board, last_move: &ExecutedMove, turn: Color) -> Option<Suffix> {
        let validator = Validator::new(board, Some(last_move));
        if !validator.is_check(turn) {
            None
        } else if validator.has_legal_move(turn) {
            Some(Suffix::Check)
        } else {
            Some(Suffix::Checkmate)
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A [`San`] and possible check and checkmate suffixes.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SanPlus {
    pub san: San,
    pub suffix: Option<Suffix>,
}

impl SanPlus {
    /// Parses a SAN and possible check and checkmate suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(san: &[u8]) -> Result<SanPlus, ParseSanError> {
        San::from_ascii(san).map(|result| SanPlus {
            san: result,
            suffix: san
                .last()
                .copied()
                .and_then(|ch| Suffix::from_char(char::from(ch))),
        })
    }

    /// Converts a move to Standard Algebraic Notation including possible
    /// check and checkmate suffixes.
    ///
    /// `board` and `last_move` describe the position before the move. The
    /// suffix is only computed for moves that are legal there.
    pub fn from_move(board: &Board, last_move: Option<&ExecutedMove>, m: &ExecutedMove) -> SanPlus {
        let san = San::from_move(board, last_move, m);
        let suffix = Validator::new(board, last_move)
            .classify(m.candidate(), m.color())
            .ok()
            .and_then(|plan| {
                let mut after = board.clone();
                plan.apply(&mut after);
                Suffix::from_position(&after, m, !m.color())
            });
        SanPlus { san, suffix }
    }
}

impl FromStr for SanPlus {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<SanPlus, ParseSanError> {
        SanPlus::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for SanPlus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)?;
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for San {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for San {
    fn deserialize<D>(deserializer: D) -> Result<San, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SanVisitor;

        impl serde::de::Visitor<'_> for SanVisitor {
            type Value = San;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("san")
            }

            fn visit_str<E>(self, value: &str) -> Result<San, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SanVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    fn position(fen: &str) -> (Board, Color) {
        let fen: Fen = fen.parse().expect("valid fen");
        (fen.board, fen.turn)
    }

    #[test]
    fn test_read_write() {
        for san in &[
            "a1", "a8", "h1", "h8", "e4", "b6", "e4=Q", "f1=N#", "hxg7", "bxc1", "axe4", "bxc1+",
            "bxa8=R+", "Nf3", "Ba5", "Qh8", "Kh1", "Bba5", "N2c4", "Red3", "d1=N", "Ra1a8", "O-O",
            "O-O-O+",
        ] {
            let result = san.parse::<SanPlus>().expect("valid san").to_string();
            assert_eq!(*san, result, "read {} write {}", san, result);
        }
    }

    #[test]
    fn test_invalid() {
        for san in &["", "x", "Nf", "Zf3", "e9", "i4", "e4=", "Nf3f", "O-O-O-O"] {
            assert!(san.parse::<San>().is_err(), "{san} should not parse");
        }
    }

    #[test]
    fn test_pawn_capture_without_file() {
        let san = "f6".parse::<San>().expect("valid san");
        let (board, turn) = position("4k3/8/5p2/4P3/8/8/8/4K3 w -");
        assert_eq!(san.to_move(&board, None, turn), Err(SanError::IllegalSan));
    }

    #[test]
    fn test_disambiguation() {
        let (board, turn) = position("4k3/8/8/8/8/8/8/R1N1K1NR w -");
        let m = San::from_ascii(b"Ne2").expect("valid san").to_move(&board, None, turn);
        assert_eq!(m, Err(SanError::AmbiguousSan));

        let m = "Nge2".parse::<San>().expect("valid san").to_move(&board, None, turn);
        assert_eq!(m, Ok(CandidateMove::new(Square::G1, Square::E2)));

        let (board, turn) = position("4k3/8/8/8/8/5N2/8/1N2K3 w -");
        let plan = Validator::new(&board, None)
            .classify(CandidateMove::new(Square::B1, Square::D2), turn)
            .expect("legal");
        assert_eq!(San::from_move(&board, None, &plan.record()).to_string(), "Nbd2");

        let (board, turn) = position("4k3/8/8/8/R7/8/8/R3K3 w -");
        let plan = Validator::new(&board, None)
            .classify(CandidateMove::new(Square::A1, Square::A2), turn)
            .expect("legal");
        assert_eq!(San::from_move(&board, None, &plan.record()).to_string(), "R1a2");
    }

    #[test]
    fn test_suffix() {
        let (board, turn) = position("6k1/5ppp/8/8/8/8/8/R5K1 w -");
        let plan = Validator::new(&board, None)
            .classify(CandidateMove::new(Square::A1, Square::A8), turn)
            .expect("legal");
        assert_eq!(SanPlus::from_move(&board, None, &plan.record()).to_string(), "Ra8#");

        let (board, turn) = position("6k1/8/8/8/8/8/8/R5K1 w -");
        let plan = Validator::new(&board, None)
            .classify(CandidateMove::new(Square::A1, Square::A8), turn)
            .expect("legal");
        assert_eq!(SanPlus::from_move(&board, None, &plan.record()).to_string(), "Ra8+");
    }

    #[test]
    fn test_castling_and_promotion() {
        let (board, turn) = position("4k3/1P6/8/8/8/8/8/R3K2R w KQ");
        let castle = "O-O-O".parse::<San>().expect("valid san").to_move(&board, None, turn);
        assert_eq!(castle, Ok(CandidateMove::new(Square::E1, Square::C1)));

        let promote = "b8=N".parse::<San>().expect("valid san").to_move(&board, None, turn);
        assert_eq!(
            promote,
            Ok(CandidateMove::new(Square::B7, Square::B8).with_promotion(Role::Knight))
        );
        assert_eq!(
            "b8".parse::<San>().expect("valid san").to_move(&board, None, turn),
            Err(SanError::IllegalSan)
        );
    }
}
