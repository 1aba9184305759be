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

//! A library for the rules of chess: board state, legal move generation,
//! move execution with history and Standard Algebraic Notation.
//!
//! # Examples
//!
//! Generate legal moves in the starting position:
//!
//! ```
//! use chesslaw::{Color, Game, Square};
//!
//! let game = Game::new();
//! assert!(game.calculate_all_legal_basic_moves());
//!
//! let targets: Vec<Square> = game.moves_for(Square::E2).iter().map(|m| m.to).collect();
//! assert_eq!(targets, [Square::E3, Square::E4]);
//! assert_eq!(game.turn(), Color::White);
//! ```
//!
//! Play moves, locally or received from a peer:
//!
//! ```
//! # use chesslaw::Game;
//! use chesslaw::{execute::Origin, CandidateMove, Square};
//! #
//! # let game = Game::new();
//!
//! // 1. e4
//! let executed = game.execute_move(CandidateMove::new(Square::E2, Square::E4), Origin::Local)?;
//! assert!(executed.is_double_step());
//!
//! // 1... e5, from the network
//! game.execute_move(CandidateMove::new(Square::E7, Square::E5), Origin::Remote)?;
//!
//! assert_eq!(game.sans().len(), 2);
//! # Ok::<_, chesslaw::IllegalMove>(())
//! ```
//!
//! Detect game end conditions:
//!
//! ```
//! # use chesslaw::Game;
//! # let game = Game::new();
//! assert!(!game.is_checkmate());
//! assert!(!game.is_stalemate());
//! assert_eq!(game.outcome(), None); // no winner yet
//! ```
//!
//! Also supports [FEN](fen) and [SAN](san) for positions and moves.
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   squares, pieces, moves and SAN, so that moves can travel over the wire.
//! * `arbitrary`: Implements
//!   [`arbitrary::Arbitrary`](https://docs.rs/arbitrary/1/arbitrary/trait.Arbitrary.html)
//!   for squares, colors, roles and candidate moves.
//! * `nohash-hasher`: Implements
//!   [`nohash_hasher::IsEnabled`](https://docs.rs/nohash-hasher/0.2/nohash_hasher/trait.IsEnabled.html)
//!   for sensible types.
//!
//! # Logging
//!
//! Commits, take-backs and rejected remote moves are reported through
//! [`tracing`](https://docs.rs/tracing/0.1/tracing/). The library installs
//! no subscriber.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]
#![allow(clippy::too_many_arguments)]

mod castling_side;
mod color;
mod m;
mod role;
mod square;
mod types;
mod util;

pub mod attacks;
pub mod board;
pub mod execute;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod validate;

pub use board::Board;
pub use castling_side::CastlingSide;
pub use color::{ByColor, Color, ParseColorError};
pub use execute::{Executor, MoveEvent, Origin, Stamp};
pub use game::{Game, Outcome, PositionError};
pub use m::{CandidateMove, ExecutedMove, MoveFlags, MoveList, ParseMoveError, SquareMoves};
pub use movegen::MoveGenerator;
pub use perft::perft;
pub use role::{ByRole, Role};
pub use square::{InvalidPosition, ParseSquareError, Square};
pub use types::Piece;
pub use validate::{IllegalMove, Validator};

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Square {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Role {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Color {}
