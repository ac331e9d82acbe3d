// =============================================================================
// Move legality
//
// A move is legal when it passes two gates: the moving piece's geometry
// (dispatched on its kind) and check-safety, which replays the move on a
// scratch copy of the board and asks whether the mover's king is attacked.
// The live board is never touched here.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::{Board, CastleSide, Square, KING_HOME_COL};
use crate::config::GameConfig;
use crate::error::{CastlingError, IllegalMove};
use crate::moves::{self, Move};
use crate::piece::{Color, Piece, PieceType};

/// Derived position status for the side to move.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameStatus {
    pub to_move: Color,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    /// Advisory; only ends the game when the config asks for it.
    pub insufficient_material: bool,
    pub game_over: bool,
}

impl GameStatus {
    /// PGN-style result token once the game has ended.
    pub fn result_token(&self) -> Option<&'static str> {
        if self.checkmate {
            Some(match self.to_move {
                Color::White => "0-1",
                Color::Black => "1-0",
            })
        } else if self.game_over {
            Some("1/2-1/2")
        } else {
            None
        }
    }

    /// Winner by checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        self.checkmate.then_some(self.to_move.opposite())
    }
}

/// Full legality check with the reason for any rejection.
pub fn check_move(board: &Board, from: Square, to: Square) -> Result<(), IllegalMove> {
    if [from, to].iter().any(|&(r, c)| r >= 8 || c >= 8) {
        return Err(IllegalMove::OffBoard);
    }
    let piece = board.piece_at(from).ok_or(IllegalMove::NoPiece)?;
    if piece.color != board.current_turn {
        return Err(IllegalMove::NotYourTurn);
    }
    if let Some(target) = board.piece_at(to) {
        if target.color == piece.color {
            return Err(IllegalMove::OwnPiece);
        }
    }
    check_geometry(board, piece, from, to)?;
    if leaves_king_in_check(board, from, to) {
        return Err(IllegalMove::ExposesKing {
            in_check: board.is_in_check(piece.color),
        });
    }
    Ok(())
}

pub fn is_legal(board: &Board, from: Square, to: Square) -> bool {
    check_move(board, from, to).is_ok()
}

fn deltas(from: Square, to: Square) -> (i32, i32) {
    (
        to.0 as i32 - from.0 as i32,
        to.1 as i32 - from.1 as i32,
    )
}

fn check_geometry(board: &Board, piece: Piece, from: Square, to: Square) -> Result<(), IllegalMove> {
    let ok = match piece.piece_type {
        PieceType::Pawn => pawn_pattern(board, piece.color, from, to),
        PieceType::Knight => knight_pattern(from, to),
        PieceType::Bishop => bishop_pattern(board, from, to),
        PieceType::Rook => rook_pattern(board, from, to),
        PieceType::Queen => bishop_pattern(board, from, to) || rook_pattern(board, from, to),
        PieceType::King => {
            let (dr, dc) = deltas(from, to);
            if dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0) {
                true
            } else if dr == 0 && dc.abs() == 2 {
                return can_castle(board, from, to).map(|_| ()).map_err(IllegalMove::from);
            } else {
                false
            }
        }
    };
    if ok {
        Ok(())
    } else {
        Err(IllegalMove::InvalidPattern(piece.piece_type))
    }
}

fn pawn_pattern(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    let dir = color.forward();

    if dc == 0 && board.piece_at(to).is_none() {
        if dr == dir {
            return true;
        }
        if from.0 == color.pawn_start_row() && dr == 2 * dir {
            let mid = ((from.0 as i32 + dir) as usize, from.1);
            return board.piece_at(mid).is_none();
        }
        return false;
    }

    dc.abs() == 1
        && dr == dir
        && (board.piece_at(to).is_some() || board.en_passant_target == Some(to))
}

fn knight_pattern(from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1))
}

fn bishop_pattern(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    dr != 0 && dr.abs() == dc.abs() && is_path_clear(board, from, to)
}

fn rook_pattern(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    ((dr == 0) != (dc == 0)) && is_path_clear(board, from, to)
}

/// Every square strictly between `from` and `to` on a straight or diagonal line is empty.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    let (sr, sc) = (dr.signum(), dc.signum());
    let (mut r, mut c) = (from.0 as i32 + sr, from.1 as i32 + sc);
    while (r, c) != (to.0 as i32, to.1 as i32) {
        if !Board::in_bounds(r, c) || board.squares[r as usize][c as usize].is_some() {
            return false;
        }
        r += sr;
        c += sc;
    }
    true
}

/// Castling precondition for a two-column king move. Each failing
/// sub-condition has its own reason.
pub fn can_castle(board: &Board, from: Square, to: Square) -> Result<CastleSide, CastlingError> {
    let color = match board.piece_at(from) {
        Some(p) if p.piece_type == PieceType::King => p.color,
        _ => return Err(CastlingError::KingMoved),
    };
    let row = color.back_rank();
    if from != (row, KING_HOME_COL) || to.0 != row {
        return Err(CastlingError::KingMoved);
    }
    if board.is_in_check(color) {
        return Err(CastlingError::InCheck);
    }

    let side = CastleSide::from_king_move(from.1, to.1);
    if !board.castling_rights.get(color, side) {
        return Err(CastlingError::RightsLost(side));
    }
    let rook_sq = (row, side.rook_col());
    if !board.piece_at(rook_sq).is_some_and(|p| p.is(PieceType::Rook, color)) {
        return Err(CastlingError::RookMissing(side));
    }
    if !is_path_clear(board, from, rook_sq) {
        return Err(CastlingError::PathBlocked(side));
    }

    let (lo, hi) = if from.1 < to.1 { (from.1, to.1) } else { (to.1, from.1) };
    if (lo..=hi).any(|col| board.is_square_attacked_by(row, col, color.opposite())) {
        return Err(CastlingError::SquareAttacked(side));
    }
    Ok(side)
}

/// A diagonal pawn step onto the en-passant target with nothing on it.
pub fn is_en_passant(board: &Board, from: Square, to: Square) -> bool {
    board.piece_at(from).is_some_and(|p| p.piece_type == PieceType::Pawn)
        && from.1 != to.1
        && board.piece_at(to).is_none()
        && board.en_passant_target == Some(to)
}

pub fn is_promotion(board: &Board, from: Square, to: Square) -> bool {
    board
        .piece_at(from)
        .is_some_and(|p| p.piece_type == PieceType::Pawn && to.0 == p.color.promotion_row())
}

/// Replays the bare move on a scratch copy and reports whether the mover's
/// king ends up attacked.
fn leaves_king_in_check(board: &Board, from: Square, to: Square) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    let mut scratch = board.clone();
    if is_en_passant(board, from, to) {
        scratch.set(moves::en_passant_victim(from, to), None);
    }
    scratch.set(to, Some(piece));
    scratch.set(from, None);
    if piece.piece_type == PieceType::King && from.1.abs_diff(to.1) == 2 {
        let side = CastleSide::from_king_move(from.1, to.1);
        let rook = scratch.take((from.0, side.rook_col()));
        scratch.set((from.0, side.rook_target_col()), rook);
    }
    scratch.is_in_check(piece.color)
}

/// Legal destinations for the piece on `from`, by brute force over the board.
pub fn legal_destinations(board: &Board, from: Square) -> Vec<Square> {
    let mut out = Vec::new();
    for r in 0..8 {
        for c in 0..8 {
            if is_legal(board, from, (r, c)) {
                out.push((r, c));
            }
        }
    }
    out
}

/// All legal moves for the side to move. Promotions expand to one move per choice.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    let own: Vec<Square> = board
        .pieces()
        .filter(|(_, p)| p.color == board.current_turn)
        .map(|(sq, _)| sq)
        .collect();
    for from in own {
        for to in legal_destinations(board, from) {
            if is_promotion(board, from, to) {
                moves.extend(
                    PieceType::PROMOTIONS
                        .iter()
                        .map(|&pt| Move::with_promotion(from, to, pt)),
                );
            } else {
                moves.push(Move::new(from, to));
            }
        }
    }
    moves
}

pub fn has_legal_move(board: &Board) -> bool {
    board
        .pieces()
        .filter(|(_, p)| p.color == board.current_turn)
        .any(|(from, _)| {
            (0..8).any(|r| (0..8).any(|c| is_legal(board, from, (r, c))))
        })
}

/// Check, checkmate, stalemate and insufficient material for the side to move.
pub fn classify(board: &Board, config: &GameConfig) -> GameStatus {
    let to_move = board.current_turn;
    let in_check = board.is_in_check(to_move);
    let can_move = has_legal_move(board);
    let insufficient_material = board.has_insufficient_material();
    let checkmate = in_check && !can_move;
    let stalemate = !in_check && !can_move;
    let game_over = checkmate
        || stalemate
        || (config.auto_draw_insufficient_material && insufficient_material);
    GameStatus {
        to_move,
        in_check,
        checkmate,
        stalemate,
        insufficient_material,
        game_over,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CastlingRights;
    use crate::notation::parse_square;

    fn sq(name: &str) -> Square {
        parse_square(name).expect("valid square")
    }

    fn place(board: &mut Board, name: &str, pt: PieceType, color: Color) {
        board.set(sq(name), Some(Piece::new(pt, color)));
    }

    /// Kings on e1/e8, rooks on their corners, full rights.
    fn castling_board() -> Board {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceType::King, Color::White);
        place(&mut board, "e8", PieceType::King, Color::Black);
        for corner in ["a1", "h1"] {
            place(&mut board, corner, PieceType::Rook, Color::White);
        }
        for corner in ["a8", "h8"] {
            place(&mut board, corner, PieceType::Rook, Color::Black);
        }
        board.castling_rights = CastlingRights::all();
        board
    }

    #[test]
    fn twenty_legal_first_moves() {
        let board = Board::new();
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn pawn_geometry() {
        let board = Board::new();
        assert!(is_legal(&board, sq("e2"), sq("e3")));
        assert!(is_legal(&board, sq("e2"), sq("e4")));
        assert_eq!(
            check_move(&board, sq("e2"), sq("e5")),
            Err(IllegalMove::InvalidPattern(PieceType::Pawn))
        );
        assert_eq!(
            check_move(&board, sq("e2"), sq("d3")),
            Err(IllegalMove::InvalidPattern(PieceType::Pawn))
        );
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let mut board = Board::new();
        place(&mut board, "e3", PieceType::Knight, Color::Black);
        assert!(!is_legal(&board, sq("e2"), sq("e4")));
        assert!(!is_legal(&board, sq("e2"), sq("e3")));
    }

    #[test]
    fn reasons_for_rejection() {
        let board = Board::new();
        assert_eq!(check_move(&board, sq("e4"), sq("e5")), Err(IllegalMove::NoPiece));
        assert_eq!(check_move(&board, sq("e2"), (8, 4)), Err(IllegalMove::OffBoard));
        assert_eq!(check_move(&board, sq("e7"), sq("e5")), Err(IllegalMove::NotYourTurn));
        assert_eq!(check_move(&board, sq("a1"), sq("a2")), Err(IllegalMove::OwnPiece));
        assert_eq!(
            check_move(&board, sq("a1"), sq("a4")),
            Err(IllegalMove::InvalidPattern(PieceType::Rook))
        );
        assert!(is_legal(&board, sq("g1"), sq("f3")));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceType::King, Color::White);
        place(&mut board, "e2", PieceType::Bishop, Color::White);
        place(&mut board, "e8", PieceType::Rook, Color::Black);
        place(&mut board, "a8", PieceType::King, Color::Black);
        assert_eq!(
            check_move(&board, sq("e2"), sq("d3")),
            Err(IllegalMove::ExposesKing { in_check: false })
        );
    }

    #[test]
    fn must_answer_check() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceType::King, Color::White);
        place(&mut board, "a2", PieceType::Pawn, Color::White);
        place(&mut board, "e8", PieceType::Rook, Color::Black);
        place(&mut board, "a8", PieceType::King, Color::Black);
        assert_eq!(
            check_move(&board, sq("a2"), sq("a3")),
            Err(IllegalMove::ExposesKing { in_check: true })
        );
        assert!(is_legal(&board, sq("e1"), sq("d1")));
    }

    #[test]
    fn castling_allowed_when_clear() {
        let mut board = castling_board();
        assert_eq!(can_castle(&board, sq("e1"), sq("g1")), Ok(CastleSide::KingSide));
        assert_eq!(can_castle(&board, sq("e1"), sq("c1")), Ok(CastleSide::QueenSide));
        board.current_turn = Color::Black;
        assert!(is_legal(&board, sq("e8"), sq("g8")));
        assert!(is_legal(&board, sq("e8"), sq("c8")));
    }

    #[test]
    fn castling_reason_codes() {
        let mut board = castling_board();
        board.castling_rights.revoke(Color::White, CastleSide::KingSide);
        assert_eq!(
            check_move(&board, sq("e1"), sq("g1")),
            Err(IllegalMove::Castling(CastlingError::RightsLost(CastleSide::KingSide)))
        );

        let mut board = castling_board();
        place(&mut board, "b1", PieceType::Knight, Color::White);
        assert_eq!(
            can_castle(&board, sq("e1"), sq("c1")),
            Err(CastlingError::PathBlocked(CastleSide::QueenSide))
        );

        let mut board = castling_board();
        place(&mut board, "f8", PieceType::Rook, Color::Black);
        assert_eq!(
            can_castle(&board, sq("e1"), sq("g1")),
            Err(CastlingError::SquareAttacked(CastleSide::KingSide))
        );

        let mut board = castling_board();
        place(&mut board, "e5", PieceType::Rook, Color::Black);
        assert_eq!(can_castle(&board, sq("e1"), sq("g1")), Err(CastlingError::InCheck));

        let mut board = castling_board();
        board.set(sq("h1"), None);
        assert_eq!(
            can_castle(&board, sq("e1"), sq("g1")),
            Err(CastlingError::RookMissing(CastleSide::KingSide))
        );

        let mut board = castling_board();
        board.set(sq("e1"), None);
        place(&mut board, "d1", PieceType::King, Color::White);
        assert_eq!(
            check_move(&board, sq("d1"), sq("f1")),
            Err(IllegalMove::Castling(CastlingError::KingMoved))
        );
    }

    #[test]
    fn queenside_b_file_attack_does_not_block() {
        // Only the king's transit squares matter; b1 may be attacked.
        let mut board = castling_board();
        place(&mut board, "b8", PieceType::Rook, Color::Black);
        board.set(sq("a8"), None);
        assert_eq!(can_castle(&board, sq("e1"), sq("c1")), Ok(CastleSide::QueenSide));
    }

    #[test]
    fn en_passant_pin_is_detected() {
        // Taking en passant would clear the fifth rank between king and rook.
        let mut board = Board::empty();
        place(&mut board, "a5", PieceType::King, Color::White);
        place(&mut board, "e5", PieceType::Pawn, Color::White);
        place(&mut board, "d5", PieceType::Pawn, Color::Black);
        place(&mut board, "h5", PieceType::Rook, Color::Black);
        place(&mut board, "h8", PieceType::King, Color::Black);
        board.en_passant_target = Some(sq("d6"));
        assert!(is_en_passant(&board, sq("e5"), sq("d6")));
        assert_eq!(
            check_move(&board, sq("e5"), sq("d6")),
            Err(IllegalMove::ExposesKing { in_check: false })
        );
        assert!(is_legal(&board, sq("e5"), sq("e6")));
    }

    #[test]
    fn checkmate_and_stalemate() {
        let config = GameConfig::default();

        // Back-rank mate: Ra8 vs Kg8 boxed in by its own pawns.
        let mut board = Board::empty();
        place(&mut board, "g1", PieceType::King, Color::White);
        place(&mut board, "a8", PieceType::Rook, Color::White);
        place(&mut board, "g8", PieceType::King, Color::Black);
        for p in ["f7", "g7", "h7"] {
            place(&mut board, p, PieceType::Pawn, Color::Black);
        }
        board.current_turn = Color::Black;
        let status = classify(&board, &config);
        assert!(status.in_check && status.checkmate && status.game_over);
        assert!(!status.stalemate);
        assert_eq!(status.winner(), Some(Color::White));
        assert_eq!(status.result_token(), Some("1-0"));

        // Ka8 against Qb6: a7, b7 and b8 are all covered.
        let mut board = Board::empty();
        place(&mut board, "a8", PieceType::King, Color::Black);
        place(&mut board, "b6", PieceType::Queen, Color::White);
        place(&mut board, "h1", PieceType::King, Color::White);
        board.current_turn = Color::Black;
        let status = classify(&board, &config);
        assert!(!status.in_check);
        assert!(status.stalemate && status.game_over && !status.checkmate);
        assert_eq!(status.result_token(), Some("1/2-1/2"));
    }

    #[test]
    fn insufficient_material_is_advisory_by_default() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceType::King, Color::White);
        place(&mut board, "e8", PieceType::King, Color::Black);
        let status = classify(&board, &GameConfig::default());
        assert!(status.insufficient_material);
        assert!(!status.game_over);

        let strict = GameConfig {
            auto_draw_insufficient_material: true,
            ..GameConfig::default()
        };
        let status = classify(&board, &strict);
        assert!(status.game_over);
        assert_eq!(status.result_token(), Some("1/2-1/2"));
    }

    #[test]
    fn classification_leaves_board_untouched() {
        let board = Board::new();
        let before = board.clone();
        let _ = classify(&board, &GameConfig::default());
        let _ = legal_moves(&board);
        assert_eq!(board, before);
    }
}
