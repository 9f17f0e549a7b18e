use thiserror::Error;

use crate::board::{Color, Square};

/// Why a move attempt was refused. The game state is untouched whenever one
/// of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("the game is already over")]
    GameOver,

    #[error("there is no piece on {0}")]
    EmptySquare(Square),

    #[error("the piece on {square} belongs to {color}, who is not on move")]
    WrongSide { square: Square, color: Color },

    #[error("{from}{to} is not a legal move")]
    Illegal { from: Square, to: Square },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error(transparent)]
    Rejected(#[from] MoveRejected),

    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),

    /// The position breaks a board invariant (for example a side without a
    /// king). Only raised while building a state, never by a legal move.
    #[error("invalid position: {0}")]
    Invariant(String),
}
