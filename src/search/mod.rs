//! Turn selection for bot players.
//!
//! Both bots work on a private scratch copy of the game board. Full turns are
//! enumerated depth-first with strict apply/undo pairing, so a single board
//! serves the whole search and the one-ply opponent forecast without any
//! cloning on the hot path.

pub mod random;
pub mod strategy;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::board::{Board, Position};
use crate::moves::Move;
use crate::pieces::PieceColor;
use crate::sequence::MoveSequence;

pub use random::RandomBot;
pub use strategy::SkillLevel;

/// A player that produces one full turn at a time. The returned moves are the
/// atomic steps of a single turn, in order; an empty list means the player has
/// no legal turn.
pub trait MoveSelector {
    fn choose_move_sequence(&mut self) -> Vec<Move>;
}

/// Enumerates every complete turn available to `color`: each sequence is one
/// step, or a capture chain followed to a position with no further mandatory
/// jump. The board is returned to its entry state before this returns.
pub(crate) fn enumerate_sequences(board: &mut Board, color: PieceColor) -> Vec<MoveSequence> {
    let first = board.get_player_moves(color);
    let mut sequences = Vec::new();
    let mut path = Vec::new();
    explore(board, &first, &mut path, &mut sequences);
    sequences
}

fn explore(board: &mut Board, continuations: &[Move], path: &mut Vec<Move>, out: &mut Vec<MoveSequence>) {
    if continuations.is_empty() {
        if !path.is_empty() {
            out.push(MoveSequence::new(path.clone()));
        }
        return;
    }
    for mv in continuations {
        path.push(*mv);
        let follow = board.complete_move(mv);
        explore(board, &follow, path, out);
        board.undo_move(mv);
        path.pop();
    }
}

/// Plays out a full turn on the scratch board.
pub(crate) fn apply_sequence(board: &mut Board, seq: &MoveSequence) {
    for mv in seq.moves() {
        board.complete_move(mv);
    }
}

/// Reverses [`apply_sequence`].
pub(crate) fn unapply_sequence(board: &mut Board, seq: &MoveSequence) {
    for mv in seq.moves().iter().rev() {
        board.undo_move(mv);
    }
}

/// One-ply look at the opponent's replies to a candidate turn. Computed with
/// the candidate already applied to the board.
pub(crate) struct OpponentForecast {
    /// Whether some opponent reply leaves us without a legal turn.
    pub has_winning_reply: bool,
    /// Replies whose first move jumps the piece we just moved. Under
    /// mandatory capture these are the replies the candidate turn provokes.
    pub induced: Vec<MoveSequence>,
}

/// Enumerates the opponent's full replies and classifies them. `end_pos` is
/// where the candidate turn left the moved piece. The board is unchanged on
/// return.
pub(crate) fn forecast_opponent(
    board: &mut Board,
    own_color: PieceColor,
    end_pos: Position,
) -> OpponentForecast {
    let replies = enumerate_sequences(board, own_color.opponent());
    let mut has_winning_reply = false;
    let mut induced = Vec::new();

    for reply in replies {
        apply_sequence(board, &reply);
        if board.get_player_moves(own_color).is_empty() {
            has_winning_reply = true;
        }
        unapply_sequence(board, &reply);

        if let Some(captured) = reply.moves()[0].captured {
            if captured.position == end_pos {
                induced.push(reply);
            }
        }
    }

    OpponentForecast {
        has_winning_reply,
        induced,
    }
}

/// A bot that scores every available turn against the weighted strategy set
/// for its skill level and plays a random turn of maximum priority. The
/// random tie-break keeps it from settling into repetition loops.
pub struct HeuristicBot {
    color: PieceColor,
    level: SkillLevel,
    scratch: Board,
    rng: StdRng,
}

impl HeuristicBot {
    /// Builds a bot for `color` from a snapshot of the current board. The bot
    /// is intended to be constructed when it is this player's turn.
    pub fn new(color: PieceColor, board: &Board, level: SkillLevel) -> Self {
        HeuristicBot {
            color,
            level,
            scratch: board.clone(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Like [`HeuristicBot::new`] but with a fixed seed for the tie-break,
    /// giving reproducible play.
    pub fn with_seed(color: PieceColor, board: &Board, level: SkillLevel, seed: u64) -> Self {
        HeuristicBot {
            color,
            level,
            scratch: board.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for HeuristicBot {
    fn choose_move_sequence(&mut self) -> Vec<Move> {
        let mut candidates = enumerate_sequences(&mut self.scratch, self.color);
        if candidates.is_empty() {
            log::debug!("{:?} has no legal turn", self.color);
            return Vec::new();
        }
        log::trace!(
            "{:?} scoring {} candidate turns at {:?} level",
            self.color,
            candidates.len(),
            self.level
        );

        let entries = strategy::for_level(self.level);
        for seq in candidates.iter_mut() {
            apply_sequence(&mut self.scratch, seq);
            // The forecast is shared across the strategies that need it and
            // computed at most once per candidate.
            let mut forecast = None;
            for entry in entries {
                if seq.priority().is_infinite() {
                    break;
                }
                let delta =
                    strategy::score(entry, &mut self.scratch, self.color, seq, &mut forecast);
                seq.add_priority(delta);
            }
            unapply_sequence(&mut self.scratch, seq);
        }

        let best = candidates
            .iter()
            .map(|seq| seq.priority())
            .fold(f64::NEG_INFINITY, f64::max);
        let top: Vec<&MoveSequence> = candidates
            .iter()
            .filter(|seq| seq.priority() == best)
            .collect();

        match top.choose(&mut self.rng) {
            Some(chosen) => {
                log::debug!(
                    "{:?} plays {:?} -> {:?} (priority {best}, {} tied)",
                    self.color,
                    chosen.original_position(),
                    chosen.end_position(),
                    top.len()
                );
                chosen.moves().to_vec()
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::Piece;

    #[test]
    fn enumeration_restores_the_board() {
        let mut board = Board::new(4);
        let before = board.pieces.clone();
        let sequences = enumerate_sequences(&mut board, PieceColor::Black);
        assert_eq!(sequences.len(), 7);
        assert_eq!(board.pieces, before);
    }

    #[test]
    fn capture_chains_are_followed_to_the_end() {
        let mut board = Board::empty(4);
        let black = Piece::new(PieceColor::Black, Position::new(1, 2));
        board.set_piece(black);
        board.set_piece(Piece::new(PieceColor::Red, Position::new(2, 3)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 5)));

        let sequences = enumerate_sequences(&mut board, PieceColor::Black);
        assert_eq!(sequences.len(), 1);
        let seq = &sequences[0];
        assert_eq!(seq.moves().len(), 2);
        assert_eq!(seq.original_position(), Position::new(1, 2));
        assert_eq!(seq.end_position(), Position::new(5, 6));
    }

    #[test]
    fn forecast_flags_an_opponent_win() {
        // After Black's turn, Red's king can jump Black's last piece and
        // leave Black with nothing to move.
        let mut board = Board::empty(4);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(1, 2)));
        board.set_piece(Piece::king_at(PieceColor::Red, Position::new(2, 3)));

        let forecast = forecast_opponent(&mut board, PieceColor::Black, Position::new(1, 2));
        assert!(forecast.has_winning_reply);
    }

    #[test]
    fn forecast_collects_only_induced_jumps() {
        // Red must jump the black piece at (3, 4); a second black piece far
        // away is not what provoked the reply.
        let mut board = Board::empty(4);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(3, 4)));
        board.set_piece(Piece::new(PieceColor::Black, Position::new(7, 0)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 5)));

        let forecast = forecast_opponent(&mut board, PieceColor::Black, Position::new(3, 4));
        assert!(!forecast.has_winning_reply);
        assert_eq!(forecast.induced.len(), 1);
        assert_eq!(forecast.induced[0].original_position(), Position::new(4, 5));
    }
}
