use serde::{Deserialize, Serialize};

use crate::board::{CastleSide, Square};
use crate::piece::{Color, Piece, PieceType};

/// A move request: origin, destination and an optional promotion choice.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to, promotion: None }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Move { from, to, promotion: Some(promotion) }
    }

    /// Convert to coordinate notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        let fc = (b'a' + self.from.1 as u8) as char;
        let fr = (b'8' - self.from.0 as u8) as char;
        let tc = (b'a' + self.to.1 as u8) as char;
        let tr = (b'8' - self.to.0 as u8) as char;
        let promo = match self.promotion {
            Some(PieceType::Queen) => "q",
            Some(PieceType::Rook) => "r",
            Some(PieceType::Bishop) => "b",
            Some(PieceType::Knight) => "n",
            _ => "",
        };
        format!("{fc}{fr}{tc}{tr}{promo}")
    }

    /// Parse from coordinate notation. Returns `None` for anything off the board.
    pub fn from_uci(s: &str) -> Option<Move> {
        let bytes = s.trim().as_bytes();
        if bytes.len() < 4 || bytes.len() > 5 {
            return None;
        }
        let square = |file: u8, rank: u8| -> Option<Square> {
            if (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank) {
                Some(((b'8' - rank) as usize, (file - b'a') as usize))
            } else {
                None
            }
        };
        let from = square(bytes[0], bytes[1])?;
        let to = square(bytes[2], bytes[3])?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(PieceType::Queen),
            Some(b'r') => Some(PieceType::Rook),
            Some(b'b') => Some(PieceType::Bishop),
            Some(b'n') => Some(PieceType::Knight),
            Some(_) => return None,
        };
        Some(Move { from, to, promotion })
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RookMove {
    pub side: CastleSide,
    pub from: Square,
    pub to: Square,
}

impl RookMove {
    pub fn for_castle(color: Color, side: CastleSide) -> Self {
        let row = color.back_rank();
        RookMove {
            side,
            from: (row, side.rook_col()),
            to: (row, side.rook_target_col()),
        }
    }
}

/// One applied move. Records never change once they are in the history and
/// carry everything undo needs.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    /// Includes a pawn taken en passant.
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub castling: Option<RookMove>,
    pub en_passant: bool,
    pub notation: String,
    pub player: Color,
}

impl MoveRecord {
    pub fn is_double_pawn_push(&self) -> bool {
        self.piece.piece_type == PieceType::Pawn && self.from.0.abs_diff(self.to.0) == 2
    }
}

/// Square of the pawn removed by an en-passant capture from `from` to `to`:
/// the capturer's rank, the destination's file.
pub fn en_passant_victim(from: Square, to: Square) -> Square {
    (from.0, to.1)
}
