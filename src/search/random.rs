use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::board::Board;
use crate::moves::Move;
use crate::pieces::PieceColor;

use super::MoveSelector;

/// A bot that plays a uniformly random legal turn: it picks a random first
/// move, then random continuation jumps until the turn ends. Useful as a
/// baseline opponent and for exercising the rules engine.
pub struct RandomBot {
    color: PieceColor,
    scratch: Board,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(color: PieceColor, board: &Board) -> Self {
        RandomBot {
            color,
            scratch: board.clone(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded variant for reproducible play.
    pub fn with_seed(color: PieceColor, board: &Board, seed: u64) -> Self {
        RandomBot {
            color,
            scratch: board.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for RandomBot {
    fn choose_move_sequence(&mut self) -> Vec<Move> {
        let mut options = self.scratch.get_player_moves(self.color);
        let mut taken: Vec<Move> = Vec::new();

        while let Some(mv) = options.choose(&mut self.rng).copied() {
            taken.push(mv);
            options = self.scratch.complete_move(&mv).to_vec();
        }
        for mv in taken.iter().rev() {
            self.scratch.undo_move(mv);
        }

        taken
    }
}
