use serde::{Deserialize, Serialize};

use crate::board::{Board, CastleSide, CastlingRights, Square, KING_HOME_COL};
use crate::executor;
use crate::moves::MoveRecord;
use crate::piece::{Color, PieceType};

/// Ordered log of applied moves.
///
/// Castling rights and the en-passant target are not stored per record; after
/// an undo they are derived again from what the remaining records say, starting
/// from the values the game began with.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct History {
    records: Vec<MoveRecord>,
    initial_castling_rights: CastlingRights,
    initial_en_passant: Option<Square>,
}

impl Default for History {
    fn default() -> Self {
        Self::starting_from(&Board::new())
    }
}

impl History {
    pub fn starting_from(board: &Board) -> Self {
        History {
            records: Vec::new(),
            initial_castling_rights: board.castling_rights,
            initial_en_passant: board.en_passant_target,
        }
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Pop the last record and put the board back the way it was before it.
    pub fn undo(&mut self, board: &mut Board) -> Option<MoveRecord> {
        let record = self.records.pop()?;
        executor::revert_placement(
            board,
            record.from,
            record.to,
            record.piece,
            record.captured,
            record.en_passant,
            record.castling,
        );
        board.current_turn = record.player;
        board.en_passant_target = self.restore_en_passant_target();
        board.castling_rights = self.recalculate_castling_rights(board);
        Some(record)
    }

    /// Target left by the most recent record, if it was a double pawn push.
    pub fn restore_en_passant_target(&self) -> Option<Square> {
        match self.records.last() {
            Some(last) if last.is_double_pawn_push() => Some(((last.from.0 + last.to.0) / 2, last.from.1)),
            Some(_) => None,
            None => self.initial_en_passant,
        }
    }

    /// A right survives only if the game started with it, no record moved
    /// that king, no record started or ended on that rook's home square, and
    /// the rook is still standing there.
    pub fn recalculate_castling_rights(&self, board: &Board) -> CastlingRights {
        let mut rights = self.initial_castling_rights;
        for color in [Color::White, Color::Black] {
            let king_moved = self
                .records
                .iter()
                .any(|m| m.piece.is(PieceType::King, color));
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                let home = (color.back_rank(), side.rook_col());
                let rook_disturbed = self.records.iter().any(|m| m.from == home || m.to == home);
                let rook_present = board
                    .piece_at(home)
                    .is_some_and(|p| p.is(PieceType::Rook, color));
                if king_moved || rook_disturbed || !rook_present {
                    rights.revoke(color, side);
                }
            }
            let king_home = (color.back_rank(), KING_HOME_COL);
            if !board.piece_at(king_home).is_some_and(|p| p.is(PieceType::King, color)) {
                rights.revoke_all(color);
            }
        }
        rights
    }
}
