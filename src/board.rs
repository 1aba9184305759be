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

use std::{error::Error, fmt, fmt::Write as _};

use crate::{
    color::{ByColor, Color},
    role::Role,
    square::{InvalidPosition, Square},
    types::Piece,
};

/// Piece positions on a board.
///
/// A flat array of 64 slots, each empty or holding one [`Piece`], plus the
/// cached square of each king. Every method is rule-blind: the board never
/// checks whether a change is a legal chess move.
///
/// # Examples
///
/// ```
/// use chesslaw::{Board, Color, Square};
///
/// let board = Board::new();
/// // r n b q k b n r
/// // p p p p p p p p
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . .
/// // P P P P P P P P
/// // R N B Q K B N R
///
/// assert_eq!(board.piece_at(Square::E8), Some(Color::Black.king()));
/// assert_eq!(board.king(Color::White), Some(Square::E1));
/// ```
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
    kings: ByColor<Option<Square>>,
}

const BACKRANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

impl Board {
    /// Standard starting position.
    pub fn new() -> Board {
        let mut board = Board::empty();
        board.initialize();
        board
    }

    pub const fn empty() -> Board {
        Board {
            squares: [None; 64],
            kings: ByColor {
                white: None,
                black: None,
            },
        }
    }

    /// Resets the board to the standard starting position.
    pub fn initialize(&mut self) {
        *self = Board::empty();
        for color in Color::ALL {
            for (file, role) in (0u8..).zip(BACKRANK) {
                self.place(Square::from_coords(file, color.backrank()), role.of(color));
                self.place(Square::from_coords(file, color.pawn_rank()), color.pawn());
            }
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Gets the piece at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPosition`] if the coordinates are not on the board.
    pub fn get(&self, file: i32, rank: i32) -> Result<Option<Piece>, InvalidPosition> {
        Square::new(file, rank).map(|sq| self.piece_at(sq))
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|piece| piece.color)
    }

    #[inline]
    pub fn role_at(&self, sq: Square) -> Option<Role> {
        self.piece_at(sq).map(|piece| piece.role)
    }

    /// Gets the cached square of the king of the given color.
    #[inline]
    pub fn king(&self, color: Color) -> Option<Square> {
        *self.kings.get(color)
    }

    /// Puts a piece on a square, replacing any previous occupant.
    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.forget_king(sq);
        if piece.role == Role::King {
            *self.kings.get_mut(piece.color) = Some(sq);
        }
        self.squares[sq.index()] = Some(piece);
    }

    /// Takes the piece off a square.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.forget_king(sq);
        self.squares[sq.index()].take()
    }

    /// Moves the piece on `from` to `to` and returns the displaced occupant
    /// of `to`. Does nothing if `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.remove(from)?;
        let displaced = self.remove(to);
        self.place(to, piece);
        displaced
    }

    pub(crate) fn increment_move_count(&mut self, sq: Square) {
        if let Some(piece) = &mut self.squares[sq.index()] {
            piece.move_count += 1;
        }
    }

    fn forget_king(&mut self, sq: Square) {
        if let Some(piece) = self.squares[sq.index()] {
            if piece.role == Role::King && self.king(piece.color) == Some(sq) {
                *self.kings.get_mut(piece.color) = None;
            }
        }
    }

    /// Iterates over all occupied squares, `a1` first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Iterates over the squares occupied by one color.
    pub fn by_color(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Parses the piece placement field of a FEN.
    ///
    /// Pawns off their second rank, kings off their home square and rooks
    /// off the corners are marked as having moved once. All other pieces
    /// are unmoved.
    ///
    /// # Errors
    ///
    /// Returns [`ParseBoardError`] if the placement is malformed.
    pub fn from_board_fen(board_fen: &[u8]) -> Result<Board, ParseBoardError> {
        let mut board = Board::empty();

        let mut rank = 7i8;
        let mut file = 0u8;

        for &ch in board_fen {
            if ch == b'/' && file == 8 && rank > 0 {
                file = 0;
                rank -= 1;
            } else if (b'1'..=b'8').contains(&ch) {
                file += ch - b'0';
                if file > 8 {
                    return Err(ParseBoardError);
                }
            } else if let Some(piece) = Piece::from_char(char::from(ch)) {
                if file >= 8 {
                    return Err(ParseBoardError);
                }
                let sq = Square::from_coords(file, rank as u8);
                let moved = u32::from(!is_home_square(sq, piece));
                board.place(sq, piece.with_move_count(moved));
                file += 1;
            } else {
                return Err(ParseBoardError);
            }
        }

        if rank == 0 && file == 8 {
            Ok(board)
        } else {
            Err(ParseBoardError)
        }
    }

    /// Writes the piece placement field of a FEN, such as
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    pub fn board_fen(&self) -> String {
        let mut fen = String::with_capacity(15);

        for rank in (0..8).rev() {
            let mut empty = 0u8;

            for file in 0..8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }

            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }
}

/// Whether an unmoved piece of this kind may stand on `sq`.
fn is_home_square(sq: Square, piece: Piece) -> bool {
    let backrank = piece.color.backrank();
    match piece.role {
        Role::Pawn => sq.rank() == piece.color.pawn_rank(),
        Role::King => sq == Square::from_coords(4, backrank),
        Role::Rook => sq.rank() == backrank && (sq.file() == 0 || sq.file() == 7),
        Role::Knight | Role::Bishop | Role::Queen => true,
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                if file > 0 {
                    f.write_char(' ')?;
                }
                f.write_char(
                    self.piece_at(Square::from_coords(file, rank))
                        .map_or('.', Piece::char),
                )?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Error when parsing an invalid piece placement.
#[derive(Clone, Debug)]
pub struct ParseBoardError;

impl fmt::Display for ParseBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid board fen")
    }
}

impl Error for ParseBoardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize() {
        let mut board = Board::empty();
        board.initialize();
        assert_eq!(board, Board::new());
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.by_color(Color::Black).count(), 16);
        assert_eq!(board.piece_at(Square::D1), Some(Color::White.queen()));
        assert_eq!(board.piece_at(Square::G8), Some(Color::Black.knight()));
        assert_eq!(board.king(Color::White), Some(Square::E1));
        assert_eq!(board.king(Color::Black), Some(Square::E8));
        assert!(board.is_empty(Square::E4));
    }

    #[test]
    fn test_get_out_of_range() {
        let board = Board::new();
        assert_eq!(board.get(4, 0), Ok(Some(Color::White.king())));
        assert_eq!(board.get(4, 4), Ok(None));
        assert_eq!(board.get(8, 0), Err(InvalidPosition { file: 8, rank: 0 }));
        assert!(board.get(0, -1).is_err());
    }

    #[test]
    fn test_king_cache() {
        let mut board = Board::new();
        board.relocate(Square::E1, Square::E2);
        assert_eq!(board.king(Color::White), Some(Square::E2));

        board.remove(Square::E2);
        assert_eq!(board.king(Color::White), None);

        board.place(Square::H4, Color::White.king());
        assert_eq!(board.king(Color::White), Some(Square::H4));

        // Capturing a king through relocation clears its cache.
        board.relocate(Square::D8, Square::H4);
        assert_eq!(board.king(Color::White), None);
        assert_eq!(board.piece_at(Square::H4), Some(Color::Black.queen()));
    }

    #[test]
    fn test_relocate() {
        let mut board = Board::new();
        assert_eq!(board.relocate(Square::E4, Square::E5), None);
        assert!(board.is_empty(Square::E5));

        let displaced = board.relocate(Square::A1, Square::A7);
        assert_eq!(displaced, Some(Color::Black.pawn()));
        assert_eq!(board.piece_at(Square::A7), Some(Color::White.rook()));
        assert!(board.is_empty(Square::A1));
    }

    #[test]
    fn test_increment_move_count() {
        let mut board = Board::new();
        board.increment_move_count(Square::B1);
        board.increment_move_count(Square::B1);
        assert_eq!(board.piece_at(Square::B1).map(|p| p.move_count), Some(2));
        board.increment_move_count(Square::E4);
        assert!(board.is_empty(Square::E4));
    }

    #[test]
    fn test_board_fen() {
        let board = Board::new();
        assert_eq!(board.board_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        let parsed = Board::from_board_fen(board.board_fen().as_bytes()).expect("valid fen");
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_board_fen_move_counts() {
        let board = Board::from_board_fen(b"4k3/8/8/8/3P4/8/4P3/R3K1R1").expect("valid fen");
        assert_eq!(board.piece_at(Square::D4).map(|p| p.move_count), Some(1));
        assert_eq!(board.piece_at(Square::E2).map(|p| p.move_count), Some(0));
        assert_eq!(board.piece_at(Square::A1).map(|p| p.move_count), Some(0));
        assert_eq!(board.piece_at(Square::G1).map(|p| p.move_count), Some(1));
        assert_eq!(board.piece_at(Square::E8).map(|p| p.move_count), Some(0));
        assert_eq!(board.king(Color::Black), Some(Square::E8));
    }

    #[test]
    fn test_invalid_board_fen() {
        for fen in [
            &b""[..],
            b"8/8/8/8/8/8/8",
            b"8/8/8/8/8/8/8/8/8",
            b"9/8/8/8/8/8/8/8",
            b"ppppppppp/8/8/8/8/8/8/8",
            b"8/8/8/8/8/8/8/7x",
            b"44/8/8/8/8/8/8/7",
        ] {
            assert!(Board::from_board_fen(fen).is_err(), "{:?}", fen);
        }
    }

    #[test]
    fn test_display() {
        let board = Board::new();
        let diagram = board.to_string();
        assert!(diagram.starts_with("r n b q k b n r\n"));
        assert!(diagram.ends_with("R N B Q K B N R\n"));
    }
}
