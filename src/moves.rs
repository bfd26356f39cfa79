//! Atomic move descriptors and move generation.
//!
//! A turn in checkers is either one diagonal step or a chain of jumps; this
//! module generates the single-step moves and enforces mandatory capture at
//! both the piece level ([`piece_moves`]) and the player level
//! ([`player_moves`]). Chain continuation is handled by
//! `Board::complete_move`, which re-queries jumps from the landing square.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{Board, Position};
use crate::pieces::{Piece, PieceColor};

/// One atomic move: a single diagonal step, or a jump when `captured` is set.
/// `piece` is a snapshot of the moving piece's pre-move state, so a move
/// remains self-describing after it has been applied or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
    pub captured: Option<Piece>,
}

impl Move {
    /// A non-capturing single-square diagonal step.
    pub fn step(piece: Piece, to: Position) -> Self {
        Move {
            piece,
            from: piece.position,
            to,
            captured: None,
        }
    }

    /// A jump two diagonal squares over `captured`.
    pub fn jump(piece: Piece, to: Position, captured: Piece) -> Self {
        Move {
            piece,
            from: piece.position,
            to,
            captured: Some(captured),
        }
    }

    #[inline]
    pub fn is_jump(&self) -> bool {
        self.captured.is_some()
    }

    /// Whether applying this move promotes the piece to king.
    pub fn is_kinging(&self, board_height: i32) -> bool {
        !self.piece.king && self.to.row == self.piece.color.promotion_row(board_height)
    }

    /// The square jumped over, for jumps.
    pub fn jumped_square(&self) -> Option<Position> {
        self.captured.as_ref().map(|_| {
            Position::new(
                (self.from.col + self.to.col) / 2,
                (self.from.row + self.to.row) / 2,
            )
        })
    }
}

/// Diagonal directions available to a piece: kings move on all four
/// diagonals, non-kings only toward the opponent's edge.
fn directions(piece: &Piece) -> ArrayVec<(i32, i32), 4> {
    let mut dirs = ArrayVec::new();
    if piece.king {
        dirs.push((1, 1));
        dirs.push((-1, 1));
        dirs.push((-1, -1));
        dirs.push((1, -1));
    } else {
        let forward = piece.color.forward();
        dirs.push((1, forward));
        dirs.push((-1, forward));
    }
    dirs
}

/// All single-step legal moves for `piece`. If any jump exists, only jumps
/// are returned; simple steps are offered only when no jump is available.
/// With `jumps_only`, simple steps are never returned (used for capture-chain
/// continuation).
pub fn piece_moves(board: &Board, piece: &Piece, jumps_only: bool) -> SmallVec<[Move; 4]> {
    let mut steps: SmallVec<[Move; 4]> = SmallVec::new();
    let mut jumps: SmallVec<[Move; 4]> = SmallVec::new();
    let origin = piece.position;

    for (dc, dr) in directions(piece) {
        let adjacent = Position::new(origin.col + dc, origin.row + dr);
        if !board.in_bounds(adjacent) {
            continue;
        }
        match board.piece_at(&adjacent) {
            None => {
                if !jumps_only {
                    steps.push(Move::step(*piece, adjacent));
                }
            }
            Some(blocker) => {
                if blocker.color == piece.color {
                    continue;
                }
                let landing = Position::new(origin.col + 2 * dc, origin.row + 2 * dr);
                if board.in_bounds(landing) && board.piece_at(&landing).is_none() {
                    jumps.push(Move::jump(*piece, landing, *blocker));
                }
            }
        }
    }

    if !jumps.is_empty() { jumps } else { steps }
}

/// All legal first moves for a player. If any piece of `color` has a jump,
/// only jumps are returned across the whole player (mandatory capture is a
/// player-level rule, not just per piece). Empty means `color` cannot move.
pub fn player_moves(board: &Board, color: PieceColor) -> Vec<Move> {
    let mut steps: Vec<Move> = Vec::new();
    let mut jumps: Vec<Move> = Vec::new();

    for piece in board.get_color_avail_pieces(color) {
        let available = piece_moves(board, &piece, false);
        if available.is_empty() {
            continue;
        }
        // piece_moves returns jumps exclusively when any exist
        if available[0].is_jump() {
            jumps.extend(available);
        } else {
            steps.extend(available);
        }
    }

    if !jumps.is_empty() { jumps } else { steps }
}

/// True iff `mv` is geometrically consistent with the rules and currently
/// legal for its piece: correct diagonal geometry, unoccupied in-bounds
/// destination, an enemy piece on the jumped square for jumps, a legal
/// direction for non-kings, and membership in the player's current move set
/// (which enforces mandatory capture).
pub fn validate_move(board: &Board, mv: &Move) -> bool {
    match board.piece_at(&mv.from) {
        Some(piece) if *piece == mv.piece => {}
        _ => return false,
    }
    if !board.in_bounds(mv.to) || board.piece_at(&mv.to).is_some() {
        return false;
    }

    let dc = mv.to.col - mv.from.col;
    let dr = mv.to.row - mv.from.row;
    if dc.abs() != dr.abs() {
        return false;
    }
    match mv.captured {
        None => {
            if dc.abs() != 1 {
                return false;
            }
        }
        Some(captured) => {
            if dc.abs() != 2 {
                return false;
            }
            let mid = mv.jumped_square().expect("jump without a jumped square");
            match board.piece_at(&mid) {
                Some(piece) if piece.color != mv.piece.color && *piece == captured => {}
                _ => return false,
            }
        }
    }
    if !mv.piece.king && dr.signum() != mv.piece.color.forward() {
        return false;
    }

    // Membership in the player's move set catches a simple step attempted
    // while a jump is available somewhere else on the board.
    player_moves(board, mv.piece.color).contains(mv)
}
