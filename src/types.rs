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

use std::fmt;

use crate::{color::Color, role::Role};

/// A piece with [`Color`], [`Role`] and the number of moves it has made.
///
/// `move_count == 0` is the only record of whether a piece has ever moved.
/// Castling and pawn double steps depend on it.
#[allow(missing_docs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
    pub move_count: u32,
}

impl Piece {
    pub fn char(self) -> char {
        self.color.fold(self.role.upper_char(), self.role.char())
    }

    /// Gets an unmoved piece from its FEN letter.
    pub fn from_char(ch: char) -> Option<Piece> {
        Role::from_char(ch).map(|role| role.of(Color::from_white(ch.is_ascii_uppercase())))
    }

    #[inline]
    pub fn has_moved(self) -> bool {
        self.move_count > 0
    }

    #[must_use]
    pub fn with_move_count(self, move_count: u32) -> Piece {
        Piece { move_count, ..self }
    }

    /// Checks if both pieces have the same color and role, regardless of
    /// their move counts.
    #[inline]
    pub fn is(self, other: Piece) -> bool {
        self.color == other.color && self.role == other.role
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}
