// =============================================================================
// Move execution
//
// Applying a move is split in two so a promotion choice can be awaited
// between the halves:
//
//   stage     – moves the piece (plus the castling rook or the pawn taken en
//               passant) and updates castling rights and the en-passant
//               target. The side to move does not change yet.
//   finalize  – places the promoted piece, hands the move to the other side,
//               classifies the new position and renders the notation.
//
// Neither half validates legality; callers gate on `rules::check_move`.
// =============================================================================

use crate::board::{Board, CastleSide, CastlingRights, Square};
use crate::config::GameConfig;
use crate::error::{ChessError, ChessResult, IllegalMove};
use crate::moves::{self, Move, MoveRecord, RookMove};
use crate::notation;
use crate::piece::{Piece, PieceType};
use crate::rules::{self, GameStatus};

/// First half of a move, waiting to be finalized or cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub castling: Option<RookMove>,
    pub en_passant: bool,
    /// SAN without promotion or check suffix, rendered before the board changed.
    base_notation: String,
    prev_castling_rights: CastlingRights,
    prev_en_passant: Option<Square>,
}

impl StagedMove {
    pub fn needs_promotion(&self) -> bool {
        self.piece.piece_type == PieceType::Pawn && self.to.0 == self.piece.color.promotion_row()
    }
}

pub fn stage(board: &mut Board, from: Square, to: Square) -> Result<StagedMove, IllegalMove> {
    let piece = board.piece_at(from).ok_or(IllegalMove::NoPiece)?;
    let base_notation = notation::encode(board, &Move::new(from, to));
    let en_passant = rules::is_en_passant(board, from, to);
    let prev_castling_rights = board.castling_rights;
    let prev_en_passant = board.en_passant_target;

    let captured = if en_passant {
        board.take(moves::en_passant_victim(from, to))
    } else {
        board.take(to)
    };

    let castling = (piece.piece_type == PieceType::King && from.1.abs_diff(to.1) == 2).then(|| {
        let rook_move = RookMove::for_castle(piece.color, CastleSide::from_king_move(from.1, to.1));
        let rook = board.take(rook_move.from);
        board.set(rook_move.to, rook);
        rook_move
    });

    board.set(to, Some(piece));
    board.set(from, None);

    board.en_passant_target = None;
    if piece.piece_type == PieceType::Pawn && from.0.abs_diff(to.0) == 2 {
        board.en_passant_target = Some(((from.0 + to.0) / 2, from.1));
    }

    update_castling_rights(&mut board.castling_rights, piece, from, captured, to);

    Ok(StagedMove {
        from,
        to,
        piece,
        captured,
        castling,
        en_passant,
        base_notation,
        prev_castling_rights,
        prev_en_passant,
    })
}

fn update_castling_rights(
    rights: &mut CastlingRights,
    piece: Piece,
    from: Square,
    captured: Option<Piece>,
    to: Square,
) {
    match piece.piece_type {
        PieceType::King => rights.revoke_all(piece.color),
        PieceType::Rook => {
            if let Some(side) = CastleSide::for_rook_origin(piece.color, from) {
                rights.revoke(piece.color, side);
            }
        }
        _ => {}
    }
    if let Some(victim) = captured.filter(|p| p.piece_type == PieceType::Rook) {
        if let Some(side) = CastleSide::for_rook_origin(victim.color, to) {
            rights.revoke(victim.color, side);
        }
    }
}

/// Puts pieces back where they stood before a staged or recorded move.
/// Rights, en-passant target and side to move are the caller's business.
pub(crate) fn revert_placement(
    board: &mut Board,
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
    en_passant: bool,
    castling: Option<RookMove>,
) {
    board.set(from, Some(piece));
    if en_passant {
        board.set(to, None);
        board.set(moves::en_passant_victim(from, to), captured);
    } else {
        board.set(to, captured);
    }
    if let Some(rook_move) = castling {
        let rook = board.take(rook_move.to);
        board.set(rook_move.from, rook);
    }
}

/// Undo the first half of a move exactly.
pub fn cancel(board: &mut Board, staged: StagedMove) {
    revert_placement(
        board,
        staged.from,
        staged.to,
        staged.piece,
        staged.captured,
        staged.en_passant,
        staged.castling,
    );
    board.castling_rights = staged.prev_castling_rights;
    board.en_passant_target = staged.prev_en_passant;
}

/// Reject a missing or impossible promotion choice before anything moves.
pub fn validate_promotion(needs_promotion: bool, promotion: Option<PieceType>) -> ChessResult<Option<PieceType>> {
    match (needs_promotion, promotion) {
        (true, None) => Err(ChessError::PromotionRequired),
        (true, Some(pt)) if !pt.is_promotion_choice() => Err(ChessError::InvalidPromotionPiece(pt)),
        (true, Some(pt)) => Ok(Some(pt)),
        (false, _) => Ok(None),
    }
}

/// Second half of a move. On error the board is left exactly as staged.
pub fn finalize(
    board: &mut Board,
    staged: StagedMove,
    promotion: Option<PieceType>,
    config: &GameConfig,
) -> ChessResult<(MoveRecord, GameStatus)> {
    let promotion = validate_promotion(staged.needs_promotion(), promotion)?;
    if let Some(pt) = promotion {
        board.set(staged.to, Some(Piece::new(pt, staged.piece.color)));
    }

    let player = staged.piece.color;
    board.current_turn = player.opposite();
    let status = rules::classify(board, config);

    let mut notation = staged.base_notation;
    if let Some(letter) = promotion.and_then(PieceType::letter) {
        notation.push('=');
        notation.push(letter);
    }
    notation.push_str(notation::check_suffix(&status));

    let record = MoveRecord {
        from: staged.from,
        to: staged.to,
        piece: staged.piece,
        captured: staged.captured,
        promotion,
        castling: staged.castling,
        en_passant: staged.en_passant,
        notation,
        player,
    };
    Ok((record, status))
}

/// Stage and finalize in one go. The promotion choice is checked first, so
/// an error leaves the board untouched.
pub fn apply(board: &mut Board, mv: &Move, config: &GameConfig) -> ChessResult<(MoveRecord, GameStatus)> {
    validate_promotion(rules::is_promotion(board, mv.from, mv.to), mv.promotion)?;
    let staged = stage(board, mv.from, mv.to)?;
    finalize(board, staged, mv.promotion, config)
}
