//! Error types for the rules engine.
//!
//! Every failure is recoverable and structured; callers render their own
//! messages from these values.

use thiserror::Error;

use crate::board::CastleSide;
use crate::piece::{Color, PieceType};

/// Why a king may not castle right now.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingError {
    #[error("cannot castle: the king has already moved")]
    KingMoved,

    #[error("cannot castle while in check")]
    InCheck,

    #[error("cannot castle {0}: the king or rook has already moved")]
    RightsLost(CastleSide),

    #[error("cannot castle {0}: the rook is not in position")]
    RookMissing(CastleSide),

    #[error("cannot castle {0}: pieces are blocking the path")]
    PathBlocked(CastleSide),

    #[error("cannot castle {0}: the king would pass through or land on an attacked square")]
    SquareAttacked(CastleSide),
}

/// Why a `(from, to)` request is not a legal move.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("that square is off the board")]
    OffBoard,

    #[error("there is no piece on that square")]
    NoPiece,

    #[error("it is not that piece's turn")]
    NotYourTurn,

    #[error("you cannot capture your own piece")]
    OwnPiece,

    #[error("{0} cannot move there")]
    InvalidPattern(PieceType),

    #[error(transparent)]
    Castling(#[from] CastlingError),

    /// `in_check` tells "must move out of check" apart from "would walk into check".
    #[error("{}", exposes_king_message(.in_check))]
    ExposesKing { in_check: bool },
}

fn exposes_king_message(in_check: &bool) -> &'static str {
    if *in_check {
        "your king is in check and must move out of check"
    } else {
        "that move would put your king in check"
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty move")]
    Empty,

    #[error("invalid destination square in {0:?}")]
    InvalidDestination(String),

    #[error("unknown piece letter {0:?}")]
    UnknownPiece(char),

    #[error("invalid promotion piece {0:?}")]
    InvalidPromotion(String),

    #[error("invalid disambiguation {0:?}")]
    InvalidDisambiguation(String),

    #[error("no {piece} can legally reach {square}")]
    NoCandidate { piece: PieceType, square: String },

    #[error("{piece} to {square} is ambiguous ({candidates} candidates)")]
    Ambiguous {
        piece: PieceType,
        square: String,
        candidates: usize,
    },
}

/// Top-level error returned by [`crate::game::Game`].
#[derive(Error, Debug)]
pub enum ChessError {
    #[error("illegal move: {0}")]
    Illegal(#[from] IllegalMove),

    #[error("invalid notation: {0}")]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Import(#[from] Box<ImportError>),

    #[error("the game is already over")]
    GameOver,

    #[error("a promotion choice is pending")]
    PromotionPending,

    #[error("no promotion is pending")]
    NoPendingPromotion,

    #[error("this move promotes a pawn and needs a promotion piece")]
    PromotionRequired,

    #[error("a pawn cannot promote to a {0}")]
    InvalidPromotionPiece(PieceType),

    #[error("no moves to undo")]
    NothingToUndo,

    #[error("invalid game state: {0}")]
    InvalidState(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// An import stopped at the first token that failed to parse or apply.
#[derive(Error, Debug)]
#[error("failed to apply move {move_number}. {token} ({color}): {source}")]
pub struct ImportError {
    pub move_number: usize,
    pub color: Color,
    pub token: String,
    pub source: ChessError,
}

/// Result type alias for engine operations
pub type ChessResult<T> = Result<T, ChessError>;
