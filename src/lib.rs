//! A checkers engine for boards of any size.
//!
//! The board is square with `2 * rows_per_player` columns, so the familiar
//! 8x8 game is `rows_per_player = 4`. The [`Board`] owns all game state and
//! rule enforcement: move generation with mandatory capture, capture chains,
//! kinging, the no-capture draw clock, resignation, and draw offers. Turns
//! are applied one atomic [`Move`] at a time through
//! [`Board::complete_move`], which returns the mandatory continuation jumps
//! until the turn is over.
//!
//! Two bots are provided behind the [`MoveSelector`] trait: [`RandomBot`]
//! plays uniformly random turns, and [`HeuristicBot`] scores every available
//! turn against a weighted strategy set chosen by [`SkillLevel`].

pub mod board;
pub mod moves;
pub mod pieces;
pub mod search;
pub mod sequence;

pub use board::{Board, GameStatus, MoveError, Position};
pub use moves::Move;
pub use pieces::{Piece, PieceColor};
pub use search::{HeuristicBot, MoveSelector, RandomBot, SkillLevel};
pub use sequence::MoveSequence;
