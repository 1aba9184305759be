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

use std::{error::Error, fmt, fmt::Write as _, str::FromStr};

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::{castling_side::CastlingSide, color::Color, role::Role, square::Square};

/// A proposed move: not validated, not executed.
///
/// Castling is proposed as the king moving two files towards the rook,
/// en passant as the pawn moving diagonally onto the empty square behind
/// the passed pawn.
///
/// # Display
///
/// `CandidateMove` implements [`Display`](fmt::Display) and
/// [`FromStr`] using coordinate notation, e.g. `e2e4` or `e7e8q`.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl CandidateMove {
    #[inline]
    pub const fn new(from: Square, to: Square) -> CandidateMove {
        CandidateMove {
            from,
            to,
            promotion: None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn with_promotion(self, promotion: Role) -> CandidateMove {
        CandidateMove {
            promotion: Some(promotion),
            ..self
        }
    }

    /// Parses coordinate notation like `g1f3` or `a7a8n`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseMoveError`] if `s` is not syntactically valid.
    pub fn from_ascii(s: &[u8]) -> Result<CandidateMove, ParseMoveError> {
        if s.len() != 4 && s.len() != 5 {
            return Err(ParseMoveError);
        }
        let from = Square::from_ascii(&s[0..2]).map_err(|_| ParseMoveError)?;
        let to = Square::from_ascii(&s[2..4]).map_err(|_| ParseMoveError)?;
        let promotion = match s.get(4) {
            Some(&ch) => Some(
                Role::from_char(char::from(ch))
                    .filter(|role| role.is_promotion_target())
                    .ok_or(ParseMoveError)?,
            ),
            None => None,
        };
        Ok(CandidateMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for CandidateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            f.write_char(promotion.char())?;
        }
        Ok(())
    }
}

impl FromStr for CandidateMove {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<CandidateMove, ParseMoveError> {
        CandidateMove::from_ascii(s.as_bytes())
    }
}

/// Error when parsing invalid coordinate notation.
#[derive(Clone, Debug)]
pub struct ParseMoveError;

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid move notation")
    }
}

impl Error for ParseMoveError {}

bitflags! {
    /// Properties of an executed move.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct MoveFlags: u8 {
        /// An enemy piece was removed.
        const CAPTURE = 1;
        /// King and rook moved together.
        const CASTLING = 2;
        /// A pawn captured the pawn that passed it.
        const EN_PASSANT = 4;
        /// A pawn was replaced on the last rank.
        const PROMOTION = 8;
        /// A pawn advanced two squares.
        const DOUBLE_STEP = 16;
    }
}

/// Immutable record of a committed move.
///
/// # Display
///
/// `ExecutedMove` implements [`Display`](fmt::Display) using long algebraic
/// notation, e.g. `Nb1-c3`, `e5xd6` or `O-O`. Use [SAN](crate::san) for
/// the standard short form.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExecutedMove {
    color: Color,
    role: Role,
    from: Square,
    to: Square,
    capture: Option<Role>,
    promotion: Option<Role>,
    flags: MoveFlags,
}

impl ExecutedMove {
    pub(crate) fn new(
        color: Color,
        role: Role,
        from: Square,
        to: Square,
        capture: Option<Role>,
        promotion: Option<Role>,
        mut flags: MoveFlags,
    ) -> ExecutedMove {
        flags.set(MoveFlags::CAPTURE, capture.is_some());
        flags.set(MoveFlags::PROMOTION, promotion.is_some());
        ExecutedMove {
            color,
            role,
            from,
            to,
            capture,
            promotion,
            flags,
        }
    }

    /// Gets the color of the moved piece.
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Gets the role of the moved piece, `Pawn` for promotions.
    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn from(&self) -> Square {
        self.from
    }

    /// Gets the target square. For castling moves this is the king's
    /// destination.
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Gets the role of the captured piece or `None`.
    pub const fn capture(&self) -> Option<Role> {
        self.capture
    }

    /// Gets the promotion role or `None`.
    pub const fn promotion(&self) -> Option<Role> {
        self.promotion
    }

    pub const fn flags(&self) -> MoveFlags {
        self.flags
    }

    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    pub const fn is_castling(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLING)
    }

    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    pub const fn is_promotion(&self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }

    pub const fn is_double_step(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_STEP)
    }

    /// Gets the castling side.
    pub fn castling_side(&self) -> Option<CastlingSide> {
        self.is_castling()
            .then(|| CastlingSide::from_king_move(self.from.file(), self.to.file()))
    }

    /// Gets the square of the captured piece. Differs from the target square
    /// only for en passant.
    pub fn capture_square(&self) -> Option<Square> {
        if self.is_en_passant() {
            Some(Square::from_coords(self.to.file(), self.from.rank()))
        } else if self.is_capture() {
            Some(self.to)
        } else {
            None
        }
    }

    /// Gets the candidate that produced this move.
    pub const fn candidate(&self) -> CandidateMove {
        CandidateMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for ExecutedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(side) = self.castling_side() {
            return f.write_str(if side.is_king_side() { "O-O" } else { "O-O-O" });
        }

        if self.role != Role::Pawn {
            f.write_char(self.role.upper_char())?;
        }

        write!(
            f,
            "{}{}{}",
            self.from,
            if self.is_capture() { 'x' } else { '-' },
            self.to
        )?;

        if let Some(p) = self.promotion {
            write!(f, "={}", p.upper_char())?;
        }

        Ok(())
    }
}

/// A container for moves that can be stored inline on the stack.
///
/// There is enough space to hold the legal moves of any chess position.
pub type MoveList = ArrayVec<CandidateMove, 256>;

/// The legal moves of a single piece: at most 27 for a queen, 12 for a
/// pawn with three promoting targets.
pub type SquareMoves = ArrayVec<CandidateMove, 32>;
