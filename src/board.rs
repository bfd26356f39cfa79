use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::moves::{self, Move};
use crate::pieces::{Piece, PieceColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub fn new(col: i32, row: i32) -> Self {
        Position { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    BlackWins,
    RedWins,
    Draw,
}

/// Error returned by [`Board::try_complete_move`] when a driver submits a move
/// that is not legal in the current position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("move from ({}, {}) to ({}, {}) is not legal in the current position", from.col, from.row, to.col, to.row)]
    Illegal { from: Position, to: Position },
}

/// A checkers board of arbitrary size.
///
/// The square grid starts at (0, 0) in the top left corner, columns increasing
/// to the right and rows increasing downward. Black pieces fill the top rows
/// and advance toward increasing rows; Red fills the bottom rows and advances
/// toward row 0. Pieces live on the dark squares only (odd col+row parity).
///
/// All state mutation goes through [`Board::complete_move`] and
/// [`Board::undo_move`], which form strictly paired apply/undo operations so
/// that search code can backtrack without copying the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    pub pieces: FxHashMap<Position, Piece>,
    captured_black: Vec<Piece>,
    captured_red: Vec<Piece>,
    /// Stack of applied moves; used to enforce undo ordering in debug builds.
    #[serde(skip)]
    history: Vec<Move>,
    /// Capture clock values saved per applied move so undo can restore them.
    #[serde(skip)]
    clock_stack: Vec<u32>,
    moves_since_capture: u32,
    draw_timeout: u32,
    /// Set by resignation or an accepted draw; takes precedence over the
    /// derived game state.
    state_override: Option<GameStatus>,
    draw_offer_black: bool,
    draw_offer_red: bool,
}

impl Board {
    /// Creates a board with the initial piece layout. The board is square with
    /// `width == height == 2 * rows_per_player`; each player fills
    /// `rows_per_player - 1` rows of dark squares, leaving two empty rows in
    /// the middle. `rows_per_player` is expected in `[2, 9]`; values outside
    /// that range are a caller-enforced constraint.
    pub fn new(rows_per_player: i32) -> Self {
        let mut board = Board::empty(rows_per_player);
        let piece_rows = rows_per_player - 1;

        for row in 0..piece_rows {
            for col in 0..board.width {
                if (col + row) % 2 == 1 {
                    let pos = Position::new(col, row);
                    board.pieces.insert(pos, Piece::new(PieceColor::Black, pos));
                }
            }
        }
        for row in (board.height - piece_rows)..board.height {
            for col in 0..board.width {
                if (col + row) % 2 == 1 {
                    let pos = Position::new(col, row);
                    board.pieces.insert(pos, Piece::new(PieceColor::Red, pos));
                }
            }
        }

        board
    }

    /// Creates a board of the same dimensions as [`Board::new`] but with no
    /// pieces. Positions are then built up with [`Board::set_piece`].
    pub fn empty(rows_per_player: i32) -> Self {
        let size = 2 * rows_per_player;
        Board {
            width: size,
            height: size,
            pieces: FxHashMap::default(),
            captured_black: Vec::new(),
            captured_red: Vec::new(),
            history: Vec::new(),
            clock_stack: Vec::new(),
            moves_since_capture: 0,
            draw_timeout: draw_timeout(rows_per_player - 1),
            state_override: None,
            draw_offer_black: false,
            draw_offer_red: false,
        }
    }

    pub fn get_board_width(&self) -> i32 {
        self.width
    }

    pub fn get_board_height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col >= 0 && pos.col < self.width && pos.row >= 0 && pos.row < self.height
    }

    #[inline]
    pub fn piece_at(&self, pos: &Position) -> Option<&Piece> {
        self.pieces.get(pos)
    }

    /// Places a piece directly on the board. Intended for setting up custom
    /// positions; does not touch the move history.
    pub fn set_piece(&mut self, piece: Piece) {
        debug_assert!(self.in_bounds(piece.position));
        self.pieces.insert(piece.position, piece);
    }

    pub fn remove_piece(&mut self, pos: &Position) -> Option<Piece> {
        self.pieces.remove(pos)
    }

    /// Living pieces of one color, ordered by (row, col) so that move
    /// enumeration is deterministic.
    pub fn get_color_avail_pieces(&self, color: PieceColor) -> Vec<Piece> {
        let mut pieces: Vec<Piece> = self
            .pieces
            .values()
            .filter(|piece| piece.color == color)
            .copied()
            .collect();
        pieces.sort_by_key(|piece| (piece.position.row, piece.position.col));
        pieces
    }

    /// Pieces of `color` that have been captured by the other player.
    pub fn get_color_captured_pieces(&self, color: PieceColor) -> &[Piece] {
        match color {
            PieceColor::Black => &self.captured_black,
            PieceColor::Red => &self.captured_red,
        }
    }

    pub fn get_captured_pieces(&self) -> Vec<Piece> {
        let mut all = self.captured_black.clone();
        all.extend_from_slice(&self.captured_red);
        all
    }

    /// All single-step legal moves for one piece. If the piece has any jump,
    /// only jumps are returned (capture is mandatory).
    pub fn get_piece_moves(&self, piece: &Piece) -> SmallVec<[Move; 4]> {
        moves::piece_moves(self, piece, false)
    }

    /// All legal first moves for a player. If any piece of `color` can jump,
    /// only jumps are returned (mandatory capture applies at the player
    /// level). An empty result means the player has no legal turn.
    ///
    /// Recomputed on every call; the board changes under every atomic move,
    /// so caching player moves is never sound mid-turn.
    pub fn get_player_moves(&self, color: PieceColor) -> Vec<Move> {
        moves::player_moves(self, color)
    }

    /// True iff `mv` is geometrically consistent and currently legal for its
    /// piece, including the mandatory-capture rule.
    pub fn validate_move(&self, mv: &Move) -> bool {
        moves::validate_move(self, mv)
    }

    /// Atomically applies a pre-validated move: relocates the piece, removes
    /// the captured piece for a jump, promotes on the far row, and records the
    /// move for undo. Returns the further mandatory jumps available to the
    /// same piece from its landing square; an empty list means the turn is
    /// over. Kinging ends the turn even if further jumps would exist.
    ///
    /// The move must have been validated (or produced by this board's own
    /// move generation); passing an invalid move is a contract violation.
    pub fn complete_move(&mut self, mv: &Move) -> SmallVec<[Move; 4]> {
        debug_assert!(
            self.validate_move(mv),
            "complete_move called with an invalid move: {mv:?}"
        );

        let mut piece = self
            .pieces
            .remove(&mv.from)
            .expect("no piece on the move's origin square");
        let was_kinging = mv.is_kinging(self.height);
        piece.position = mv.to;
        if was_kinging {
            piece.king = true;
        }
        self.pieces.insert(mv.to, piece);

        // Playing a regular move rejects any outstanding draw offer.
        self.draw_offer_black = false;
        self.draw_offer_red = false;

        self.history.push(*mv);
        self.clock_stack.push(self.moves_since_capture);

        if let Some(captured) = mv.captured {
            let removed = self
                .pieces
                .remove(&captured.position)
                .expect("captured piece missing from the board");
            match removed.color {
                PieceColor::Black => self.captured_black.push(removed),
                PieceColor::Red => self.captured_red.push(removed),
            }
            self.moves_since_capture = 0;

            if was_kinging {
                return SmallVec::new();
            }
            let moved = self.pieces[&mv.to];
            return moves::piece_moves(self, &moved, true);
        }

        self.moves_since_capture += 1;
        SmallVec::new()
    }

    /// Validating wrapper around [`Board::complete_move`] for external
    /// drivers.
    pub fn try_complete_move(&mut self, mv: &Move) -> Result<SmallVec<[Move; 4]>, MoveError> {
        if !self.validate_move(mv) {
            return Err(MoveError::Illegal {
                from: mv.from,
                to: mv.to,
            });
        }
        Ok(self.complete_move(mv))
    }

    /// Reverses the most recent [`Board::complete_move`]. Moves must be undone
    /// in exact reverse order of application; undoing out of order is a
    /// precondition violation (checked in debug builds).
    pub fn undo_move(&mut self, mv: &Move) {
        let last = self.history.pop();
        debug_assert_eq!(
            last.as_ref(),
            Some(mv),
            "undo_move must reverse the most recent complete_move"
        );
        self.moves_since_capture = self
            .clock_stack
            .pop()
            .expect("undo_move called with no applied move");

        let mut piece = self
            .pieces
            .remove(&mv.to)
            .expect("no piece on the move's destination square");
        piece.position = mv.from;
        if mv.is_kinging(self.height) {
            piece.king = false;
        }
        self.pieces.insert(mv.from, piece);

        if let Some(captured) = mv.captured {
            let restored = match captured.color {
                PieceColor::Black => self.captured_black.pop(),
                PieceColor::Red => self.captured_red.pop(),
            }
            .expect("capture history out of sync with move history");
            debug_assert_eq!(restored.position, captured.position);
            self.pieces.insert(captured.position, restored);
        }
    }

    /// Derives the current game state. A resignation or accepted draw takes
    /// precedence; then the no-capture draw clock; then mobility: a color with
    /// no legal move loses, and if neither color can move the game is drawn.
    pub fn get_game_state(&self) -> GameStatus {
        if let Some(status) = self.state_override {
            return status;
        }
        if self.moves_since_capture > self.draw_timeout {
            return GameStatus::Draw;
        }

        let black_can_move = !moves::player_moves(self, PieceColor::Black).is_empty();
        let red_can_move = !moves::player_moves(self, PieceColor::Red).is_empty();
        match (black_can_move, red_can_move) {
            (true, true) => GameStatus::InProgress,
            (true, false) => GameStatus::BlackWins,
            (false, true) => GameStatus::RedWins,
            (false, false) => GameStatus::Draw,
        }
    }

    /// Records a resignation by `color`; the opponent wins immediately.
    pub fn resign(&mut self, color: PieceColor) {
        log::debug!("{color:?} resigns");
        self.state_override = Some(match color {
            PieceColor::Black => GameStatus::RedWins,
            PieceColor::Red => GameStatus::BlackWins,
        });
    }

    /// Records a draw offer by `color`. When both colors have an outstanding
    /// offer the game is drawn. An offer is withdrawn by any completed move.
    pub fn offer_draw(&mut self, color: PieceColor) {
        match color {
            PieceColor::Black => self.draw_offer_black = true,
            PieceColor::Red => self.draw_offer_red = true,
        }
        if self.draw_offer_black && self.draw_offer_red {
            log::debug!("draw agreed");
            self.state_override = Some(GameStatus::Draw);
        }
    }

    /// Moves played since the last capture; the game is drawn when this
    /// exceeds [`Board::draw_timeout`].
    pub fn moves_since_last_capture(&self) -> u32 {
        self.moves_since_capture
    }

    /// The no-capture move limit for this board size.
    pub fn draw_timeout(&self) -> u32 {
        self.draw_timeout
    }

    /// Whether `color` has an outstanding draw offer.
    pub fn has_draw_offer(&self, color: PieceColor) -> bool {
        match color {
            PieceColor::Black => self.draw_offer_black,
            PieceColor::Red => self.draw_offer_red,
        }
    }
}

/// Maximum number of moves between captures before the game is declared
/// drawn. Set slightly above the average capture interval observed in play,
/// as a power function of the number of filled piece rows.
fn draw_timeout(piece_rows: i32) -> u32 {
    (2.2 * (piece_rows as f64).powf(2.2)).round() as u32 + 10
}
