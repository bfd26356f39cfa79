use serde::{Deserialize, Serialize};

use crate::board::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    Black,
    Red,
}

impl PieceColor {
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::Black => PieceColor::Red,
            PieceColor::Red => PieceColor::Black,
        }
    }

    /// Row direction a non-king of this color advances in. Black starts on the
    /// low rows and pushes toward increasing rows; Red pushes toward row 0.
    #[inline]
    pub fn forward(self) -> i32 {
        match self {
            PieceColor::Black => 1,
            PieceColor::Red => -1,
        }
    }

    /// The row on which a piece of this color is promoted to king.
    #[inline]
    pub fn promotion_row(self, board_height: i32) -> i32 {
        match self {
            PieceColor::Black => board_height - 1,
            PieceColor::Red => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub color: PieceColor,
    pub king: bool,
    pub position: Position,
}

impl Piece {
    pub fn new(color: PieceColor, position: Position) -> Self {
        Piece {
            color,
            king: false,
            position,
        }
    }

    pub fn king_at(color: PieceColor, position: Position) -> Self {
        Piece {
            color,
            king: true,
            position,
        }
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.king
    }
}
