use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::moves::Move;
use crate::pieces::Piece;

/// One complete turn: a non-empty chain of atomic moves by a single piece
/// (one step, or one or more jumps), plus the priority the bot has assigned
/// to it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSequence {
    moves: Vec<Move>,
    priority: f64,
}

impl MoveSequence {
    pub fn new(moves: Vec<Move>) -> Self {
        debug_assert!(!moves.is_empty(), "a move sequence holds at least one move");
        MoveSequence {
            moves,
            priority: 0.0,
        }
    }

    /// Where the moving piece started the turn.
    pub fn original_position(&self) -> Position {
        self.moves[0].from
    }

    /// Where the moving piece ends the turn.
    pub fn end_position(&self) -> Position {
        self.moves[self.moves.len() - 1].to
    }

    /// Pre-turn snapshot of the moving piece.
    pub fn target_piece(&self) -> Piece {
        self.moves[0].piece
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Accumulates a weighted strategy score onto this sequence.
    pub fn add_priority(&mut self, delta: f64) {
        self.priority += delta;
    }
}
