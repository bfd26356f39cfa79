//! The weighted strategy set behind [`HeuristicBot`](super::HeuristicBot).
//!
//! Every scoring function is called with the candidate turn already applied
//! to the board, so "the board" always means the position the candidate turn
//! produces. Win and loss detection are unweighted and saturate the priority
//! to an infinity; the remaining strategies each contribute a finite weighted
//! score.

use std::collections::HashMap;

use arrayvec::ArrayVec;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Position};
use crate::pieces::PieceColor;
use crate::sequence::MoveSequence;

use super::{OpponentForecast, enumerate_sequences, forecast_opponent};

/// How many strategies the bot weighs when picking a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    /// Takes a winning turn and avoids a losing one; otherwise plays like the
    /// random bot.
    Simple,
    /// Adds capture maximization and sacrifice avoidance.
    Medium,
    /// Weighs the full strategy set.
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Win,
    Lose,
    Chase,
    Stick,
    Baseline,
    Push,
    Center,
    Sacrifice,
    Capture,
    Corner,
    King,
    Force,
}

/// A strategy with its influence on the final priority. Win and Lose carry no
/// weight; their verdict is absolute.
#[derive(Debug, Clone, Copy)]
pub struct StrategyEntry {
    pub strategy: Strategy,
    pub weight: Option<f64>,
}

const fn weighted(strategy: Strategy, weight: f64) -> StrategyEntry {
    StrategyEntry {
        strategy,
        weight: Some(weight),
    }
}

/// The full strategy set in evaluation order. Win and Lose run first so that
/// a decided candidate skips the finite strategies entirely. The weights are
/// tuning parameters; Baseline is deliberately heavy so anchor pieces move
/// only when something else is clearly better.
const FULL: [StrategyEntry; 12] = [
    StrategyEntry {
        strategy: Strategy::Win,
        weight: None,
    },
    StrategyEntry {
        strategy: Strategy::Lose,
        weight: None,
    },
    weighted(Strategy::Chase, 0.7),
    weighted(Strategy::Stick, 1.0),
    weighted(Strategy::Baseline, 4.0),
    weighted(Strategy::Push, 1.0),
    weighted(Strategy::Center, 1.0),
    weighted(Strategy::Sacrifice, 0.05),
    weighted(Strategy::Capture, 1.0),
    weighted(Strategy::Corner, 0.7),
    weighted(Strategy::King, 1.0),
    weighted(Strategy::Force, 1.0),
];

fn subset(keep: &[Strategy]) -> Vec<StrategyEntry> {
    FULL.iter()
        .filter(|entry| keep.contains(&entry.strategy))
        .copied()
        .collect()
}

static LEVEL_TABLE: Lazy<HashMap<SkillLevel, Vec<StrategyEntry>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(SkillLevel::Simple, subset(&[Strategy::Win, Strategy::Lose]));
    table.insert(
        SkillLevel::Medium,
        subset(&[
            Strategy::Win,
            Strategy::Lose,
            Strategy::Sacrifice,
            Strategy::Capture,
        ]),
    );
    table.insert(SkillLevel::Hard, FULL.to_vec());
    table
});

/// The ordered strategy entries evaluated at `level`.
pub fn for_level(level: SkillLevel) -> &'static [StrategyEntry] {
    &LEVEL_TABLE[&level]
}

/// Scores one strategy for a candidate turn. `board` holds the position after
/// the candidate turn; `forecast` caches the one-ply opponent forecast across
/// the strategies of a single candidate.
pub(crate) fn score(
    entry: &StrategyEntry,
    board: &mut Board,
    color: PieceColor,
    seq: &MoveSequence,
    forecast: &mut Option<OpponentForecast>,
) -> f64 {
    let weight = entry.weight.unwrap_or(1.0);
    match entry.strategy {
        Strategy::Win => win_score(board, color),
        Strategy::Lose => lose_score(board, color, seq, forecast),
        Strategy::Chase => weight * chase_score(board, color, seq),
        Strategy::Stick => weight * stick_score(board, color, seq),
        Strategy::Baseline => weight * baseline_score(board, color, seq),
        Strategy::Push => weight * push_score(color, seq),
        Strategy::Center => weight * center_score(board, seq),
        Strategy::Sacrifice => weight * sacrifice_score(board, color, seq, forecast),
        Strategy::Capture => weight * capture_score(seq),
        Strategy::Corner => weight * corner_score(board, color, seq),
        Strategy::King => weight * king_score(board, color, seq),
        Strategy::Force => weight * force_score(board, color, seq, forecast),
    }
}

fn distance(a: Position, b: Position) -> f64 {
    let dc = (a.col - b.col) as f64;
    let dr = (a.row - b.row) as f64;
    (dc * dc + dr * dr).sqrt()
}

fn cached_forecast<'a>(
    board: &mut Board,
    color: PieceColor,
    seq: &MoveSequence,
    forecast: &'a mut Option<OpponentForecast>,
) -> &'a OpponentForecast {
    forecast.get_or_insert_with(|| forecast_opponent(board, color, seq.end_position()))
}

/// +inf when the opponent has no reply at all: this turn wins on the spot.
fn win_score(board: &Board, color: PieceColor) -> f64 {
    if board.get_player_moves(color.opponent()).is_empty() {
        f64::INFINITY
    } else {
        0.0
    }
}

/// -inf when some opponent reply leaves us with no turn. Only checked once we
/// are down to four pieces; with more material a one-reply loss is not a
/// realistic threat and the forecast is not worth its cost.
fn lose_score(
    board: &mut Board,
    color: PieceColor,
    seq: &MoveSequence,
    forecast: &mut Option<OpponentForecast>,
) -> f64 {
    if board.get_color_avail_pieces(color).len() > 4 {
        return 0.0;
    }
    if cached_forecast(board, color, seq, forecast).has_winning_reply {
        f64::NEG_INFINITY
    } else {
        0.0
    }
}

/// Endgame pursuit: when well ahead on a board of width 8 or more, reward
/// turns that close the distance to the opponent piece nearest the moved
/// piece's starting square.
fn chase_score(board: &Board, color: PieceColor, seq: &MoveSequence) -> f64 {
    let width = board.get_board_width();
    if width < 8 {
        return 0.0;
    }

    let opponents = board.get_color_avail_pieces(color.opponent());
    let own_count = board.get_color_avail_pieces(color).len();
    let starting_count = (width as f64 / 2.0) * (width as f64 / 2.0 - 1.0);

    // Chase only in the endgame, and only when leading by enough that the
    // pursuit cannot backfire.
    if opponents.is_empty()
        || opponents.len() as f64 > starting_count / 4.0
        || own_count as f64 <= 1.5 * opponents.len() as f64
    {
        return 0.0;
    }

    let origin = seq.original_position();
    let mut target = origin;
    let mut target_dist = f64::INFINITY;
    for piece in &opponents {
        let dist = distance(piece.position, origin);
        if dist < target_dist {
            target_dist = dist;
            target = piece.position;
        }
    }
    target_dist - distance(target, seq.end_position())
}

fn diagonal_neighbors(pos: Position) -> ArrayVec<Position, 4> {
    let mut region = ArrayVec::new();
    for (dc, dr) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
        region.push(Position::new(pos.col + dc, pos.row + dr));
    }
    region
}

/// Penalizes a turn that detaches the moved piece from its neighbors: it had
/// a friendly piece diagonally adjacent before the turn and has none after.
/// A piece that started detached is not penalized for staying so.
fn stick_score(board: &Board, color: PieceColor, seq: &MoveSequence) -> f64 {
    let origin_region = diagonal_neighbors(seq.original_position());
    let end_region = diagonal_neighbors(seq.end_position());

    let mut past_stick = false;
    let mut now_stick = false;
    for piece in board.get_color_avail_pieces(color) {
        if piece.position == seq.end_position() {
            continue;
        }
        if origin_region.contains(&piece.position) {
            past_stick = true;
        }
        if end_region.contains(&piece.position) {
            now_stick = true;
        }
        if past_stick && now_stick {
            return 0.0;
        }
    }

    if past_stick && !now_stick { -1.0 } else { 0.0 }
}

/// The defensive anchor squares on a player's back row: every other dark
/// square counted from the player's double corner.
fn is_anchor_square(color: PieceColor, width: i32, pos: Position) -> bool {
    match color {
        PieceColor::Red => {
            pos.row == width - 1 && pos.col <= width - 2 && (width - 2 - pos.col) % 4 == 0
        }
        PieceColor::Black => pos.row == 0 && pos.col % 4 == 1,
    }
}

/// Penalizes moving a piece off an anchor square.
fn baseline_score(board: &Board, color: PieceColor, seq: &MoveSequence) -> f64 {
    if is_anchor_square(color, board.get_board_width(), seq.original_position()) {
        -1.0
    } else {
        0.0
    }
}

/// Net forward progress of the turn. Kings gain nothing from advancing; the
/// point of pushing is to make kings.
fn push_score(color: PieceColor, seq: &MoveSequence) -> f64 {
    if seq.target_piece().is_king() {
        return 0.0;
    }
    ((seq.end_position().row - seq.original_position().row) * color.forward()) as f64
}

/// Rewards a turn that brings a piece from outside the central region into
/// it. The center is the two initially empty rows, away from the side
/// columns.
fn center_score(board: &Board, seq: &MoveSequence) -> f64 {
    let width = board.get_board_width();
    let in_center = |pos: Position| {
        pos.col >= 2 && pos.col < width - 2 && pos.row >= width / 2 - 1 && pos.row <= width / 2
    };

    if !in_center(seq.original_position()) && in_center(seq.end_position()) {
        1.0
    } else {
        0.0
    }
}

/// Material cost of the opponent replies this turn provokes, scaled so that
/// sacrifices sting less the further ahead we are. Zero when the turn
/// provokes nothing.
fn sacrifice_score(
    board: &mut Board,
    color: PieceColor,
    seq: &MoveSequence,
    forecast: &mut Option<OpponentForecast>,
) -> f64 {
    let fc = cached_forecast(board, color, seq, forecast);
    if fc.induced.is_empty() {
        return 0.0;
    }

    let width = board.get_board_width() as f64;
    let starting_count = (width / 2.0 - 1.0) * (width / 2.0);
    let own_count = board.get_color_avail_pieces(color).len() as f64;
    let opponent_count = board.get_color_avail_pieces(color.opponent()).len() as f64;
    // Always positive; shrinks as our material lead grows.
    let difference_factor = starting_count - (own_count - opponent_count);

    let worst = fc
        .induced
        .iter()
        .map(|reply| capture_score(reply) * difference_factor)
        .fold(f64::NEG_INFINITY, f64::max);
    -worst
}

/// Total capture value of the turn: two per captured king, one per captured
/// piece.
fn capture_score(seq: &MoveSequence) -> f64 {
    seq.moves()
        .iter()
        .filter_map(|mv| mv.captured)
        .map(|captured| if captured.is_king() { 2.0 } else { 1.0 })
        .sum()
}

/// Attacks the opponent's double corner while it is still defended: rewards
/// net movement toward it whenever an opponent piece sits within two steps of
/// it.
fn corner_score(board: &Board, color: PieceColor, seq: &MoveSequence) -> f64 {
    let width = board.get_board_width();
    let corner = match color {
        PieceColor::Red => Position::new(0, 0),
        PieceColor::Black => Position::new(width - 1, width - 1),
    };
    let defended_radius = (5.0_f64).sqrt();

    let mut attack = 0.0;
    for piece in board.get_color_avail_pieces(color.opponent()) {
        if distance(piece.position, corner) <= defended_radius {
            attack = distance(corner, seq.original_position())
                - distance(corner, seq.end_position());
        }
    }
    attack
}

/// Rewards a turn that promotes the moved piece.
fn king_score(board: &Board, color: PieceColor, seq: &MoveSequence) -> f64 {
    if !seq.target_piece().is_king()
        && seq.end_position().row == color.promotion_row(board.get_board_height())
    {
        1.0
    } else {
        0.0
    }
}

/// Forcing: when the turn provokes exactly one opponent reply, play that
/// reply out and reward the best capture we can land on the opponent piece it
/// moved. The provoked reply must be unique; with a choice of replies the
/// exchange is no longer forced.
fn force_score(
    board: &mut Board,
    color: PieceColor,
    seq: &MoveSequence,
    forecast: &mut Option<OpponentForecast>,
) -> f64 {
    let (reply_moves, reply_end) = {
        let induced = &cached_forecast(board, color, seq, forecast).induced;
        if induced.len() != 1 {
            return 0.0;
        }
        (induced[0].moves().to_vec(), induced[0].end_position())
    };

    for mv in &reply_moves {
        board.complete_move(mv);
    }
    let mut best_response = 0.0_f64;
    for response in enumerate_sequences(board, color) {
        if let Some(captured) = response.moves()[0].captured {
            if captured.position == reply_end {
                best_response = best_response.max(capture_score(&response));
            }
        }
    }
    for mv in reply_moves.iter().rev() {
        board.undo_move(mv);
    }

    best_response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::pieces::Piece;

    fn step_seq(piece: Piece, to: Position) -> MoveSequence {
        MoveSequence::new(vec![Move::step(piece, to)])
    }

    #[test]
    fn level_tables_grow_with_skill() {
        assert_eq!(for_level(SkillLevel::Simple).len(), 2);
        assert_eq!(for_level(SkillLevel::Medium).len(), 4);
        assert_eq!(for_level(SkillLevel::Hard).len(), 12);
        // every level starts with the unweighted win and loss checks
        for level in [SkillLevel::Simple, SkillLevel::Medium, SkillLevel::Hard] {
            let entries = for_level(level);
            assert_eq!(entries[0].strategy, Strategy::Win);
            assert_eq!(entries[1].strategy, Strategy::Lose);
        }
    }

    #[test]
    fn captured_kings_count_double() {
        let black = Piece::new(PieceColor::Black, Position::new(1, 2));
        let first = Move::jump(
            black,
            Position::new(3, 4),
            Piece::new(PieceColor::Red, Position::new(2, 3)),
        );
        let mut landed = black;
        landed.position = first.to;
        let second = Move::jump(
            landed,
            Position::new(5, 6),
            Piece::king_at(PieceColor::Red, Position::new(4, 5)),
        );
        let seq = MoveSequence::new(vec![first, second]);
        assert_eq!(capture_score(&seq), 3.0);
    }

    #[test]
    fn anchor_squares_sit_on_each_back_row() {
        // 8-wide board: Red anchors at (6, 7) and (2, 7), Black at (1, 0)
        // and (5, 0)
        assert!(is_anchor_square(PieceColor::Red, 8, Position::new(6, 7)));
        assert!(is_anchor_square(PieceColor::Red, 8, Position::new(2, 7)));
        assert!(!is_anchor_square(PieceColor::Red, 8, Position::new(4, 7)));
        assert!(!is_anchor_square(PieceColor::Red, 8, Position::new(6, 6)));
        assert!(is_anchor_square(PieceColor::Black, 8, Position::new(1, 0)));
        assert!(is_anchor_square(PieceColor::Black, 8, Position::new(5, 0)));
        assert!(!is_anchor_square(PieceColor::Black, 8, Position::new(3, 0)));
    }

    #[test]
    fn moving_an_anchor_is_penalized() {
        let board = Board::empty(4);
        let anchored = Piece::new(PieceColor::Black, Position::new(1, 0));
        let seq = step_seq(anchored, Position::new(2, 1));
        assert_eq!(baseline_score(&board, PieceColor::Black, &seq), -1.0);

        let free = Piece::new(PieceColor::Black, Position::new(3, 0));
        let seq = step_seq(free, Position::new(4, 1));
        assert_eq!(baseline_score(&board, PieceColor::Black, &seq), 0.0);
    }

    #[test]
    fn push_measures_net_forward_progress() {
        let black = Piece::new(PieceColor::Black, Position::new(1, 2));
        assert_eq!(push_score(PieceColor::Black, &step_seq(black, Position::new(2, 3))), 1.0);

        let red = Piece::new(PieceColor::Red, Position::new(2, 5));
        assert_eq!(push_score(PieceColor::Red, &step_seq(red, Position::new(1, 4))), 1.0);

        let king = Piece::king_at(PieceColor::Black, Position::new(1, 2));
        assert_eq!(push_score(PieceColor::Black, &step_seq(king, Position::new(2, 3))), 0.0);
    }

    #[test]
    fn entering_the_center_scores_once() {
        let board = Board::empty(4);
        let black = Piece::new(PieceColor::Black, Position::new(1, 2));
        // (2, 3) is inside the 8-wide center (cols 2..=5, rows 3..=4)
        assert_eq!(center_score(&board, &step_seq(black, Position::new(2, 3))), 1.0);

        // moving within the center earns nothing
        let centered = Piece::new(PieceColor::Black, Position::new(2, 3));
        assert_eq!(center_score(&board, &step_seq(centered, Position::new(3, 4))), 0.0);

        // moving to the side column earns nothing
        let side = Piece::new(PieceColor::Black, Position::new(1, 2));
        assert_eq!(center_score(&board, &step_seq(side, Position::new(0, 3))), 0.0);
    }

    #[test]
    fn kinging_turn_scores_for_non_kings_only() {
        let board = Board::empty(4);
        let runner = Piece::new(PieceColor::Black, Position::new(2, 6));
        assert_eq!(king_score(&board, PieceColor::Black, &step_seq(runner, Position::new(1, 7))), 1.0);
        assert_eq!(king_score(&board, PieceColor::Black, &step_seq(runner, Position::new(1, 5))), 0.0);

        let king = Piece::king_at(PieceColor::Black, Position::new(2, 6));
        assert_eq!(king_score(&board, PieceColor::Black, &step_seq(king, Position::new(1, 7))), 0.0);
    }

    #[test]
    fn detaching_a_piece_is_penalized() {
        let mut board = Board::empty(4);
        let mover = Piece::new(PieceColor::Black, Position::new(3, 2));
        let friend = Piece::new(PieceColor::Black, Position::new(2, 1));
        // board state is post-turn: the mover already sits on its end square
        board.set_piece(Piece::new(PieceColor::Black, Position::new(4, 3)));
        board.set_piece(friend);

        let detach = step_seq(mover, Position::new(4, 3));
        assert_eq!(stick_score(&board, PieceColor::Black, &detach), -1.0);

        // with the friend adjacent to the end square too, no penalty
        board.set_piece(Piece::new(PieceColor::Black, Position::new(3, 4)));
        assert_eq!(stick_score(&board, PieceColor::Black, &detach), 0.0);
    }

    #[test]
    fn corner_attack_rewards_closing_in_while_defended() {
        let mut board = Board::empty(4);
        // Red piece near its own double corner (board is 8 wide, Black
        // attacks (7, 7))
        board.set_piece(Piece::new(PieceColor::Red, Position::new(6, 7)));
        let black = Piece::new(PieceColor::Black, Position::new(3, 4));

        let closing = corner_score(&board, PieceColor::Black, &step_seq(black, Position::new(4, 5)));
        assert!(closing > 0.0);
        let retreating = corner_score(&board, PieceColor::Black, &step_seq(black, Position::new(2, 3)));
        assert!(retreating < 0.0);

        // corner vacated: nothing to attack
        let mut empty_corner = Board::empty(4);
        empty_corner.set_piece(Piece::new(PieceColor::Red, Position::new(0, 7)));
        assert_eq!(
            corner_score(&empty_corner, PieceColor::Black, &step_seq(black, Position::new(4, 5))),
            0.0
        );
    }

    #[test]
    fn chase_requires_endgame_and_a_big_lead() {
        let mut board = Board::empty(4);
        // 5 black vs 2 red: endgame (2 < 12/4) and leading (5 > 3)
        for col in [1, 3, 5, 7] {
            board.set_piece(Piece::new(PieceColor::Black, Position::new(col, 0)));
        }
        board.set_piece(Piece::new(PieceColor::Black, Position::new(1, 2)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 5)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(6, 7)));

        let mover = Piece::new(PieceColor::Black, Position::new(1, 2));
        let closing = chase_score(&board, PieceColor::Black, &step_seq(mover, Position::new(2, 3)));
        assert!(closing > 0.0);

        // with near-equal material the chase is off
        board.set_piece(Piece::new(PieceColor::Red, Position::new(2, 7)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 7)));
        let off = chase_score(&board, PieceColor::Black, &step_seq(mover, Position::new(2, 3)));
        assert_eq!(off, 0.0);
    }

    #[test]
    fn winning_and_losing_saturate() {
        // Red has nothing left: any black turn wins
        let mut board = Board::empty(4);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(1, 2)));
        assert_eq!(win_score(&board, PieceColor::Black), f64::INFINITY);

        // Black's lone piece can be jumped by the red king next turn
        let mut board = Board::empty(4);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(1, 2)));
        board.set_piece(Piece::king_at(PieceColor::Red, Position::new(2, 3)));
        let seq = step_seq(Piece::new(PieceColor::Black, Position::new(0, 1)), Position::new(1, 2));
        let mut forecast = None;
        assert_eq!(
            lose_score(&mut board, PieceColor::Black, &seq, &mut forecast),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn sacrifice_charges_for_provoked_captures() {
        // Black just stepped to (3, 4); Red at (4, 5) is forced to jump it.
        let mut board = Board::empty(4);
        let moved = Piece::new(PieceColor::Black, Position::new(3, 4));
        board.set_piece(moved);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(7, 0)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 5)));

        let seq = step_seq(Piece::new(PieceColor::Black, Position::new(2, 3)), Position::new(3, 4));
        let mut forecast = None;
        let score = sacrifice_score(&mut board, PieceColor::Black, &seq, &mut forecast);
        // one provoked capture of a normal piece, scaled by the material
        // difference factor 12 - (2 - 1)
        assert_eq!(score, -11.0);
    }

    #[test]
    fn force_rewards_a_capturable_forced_reply() {
        // Black steps into (3, 4); Red's only reply jumps it to (2, 3), and
        // Black's king at (1, 4) then captures the jumper.
        let mut board = Board::empty(4);
        board.set_piece(Piece::new(PieceColor::Black, Position::new(3, 4)));
        board.set_piece(Piece::king_at(PieceColor::Black, Position::new(1, 4)));
        board.set_piece(Piece::new(PieceColor::Black, Position::new(7, 0)));
        board.set_piece(Piece::new(PieceColor::Red, Position::new(4, 5)));

        let seq = step_seq(Piece::new(PieceColor::Black, Position::new(2, 3)), Position::new(3, 4));
        let mut forecast = None;
        let score = force_score(&mut board, PieceColor::Black, &seq, &mut forecast);
        assert_eq!(score, 1.0);

        // the board is left untouched by the playout
        assert!(board.piece_at(&Position::new(3, 4)).is_some());
        assert!(board.piece_at(&Position::new(4, 5)).is_some());
    }
}
