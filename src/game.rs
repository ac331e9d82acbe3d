use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{Board, CastleSide, Square, KING_HOME_COL};
use crate::config::GameConfig;
use crate::error::{ChessError, ChessResult, IllegalMove};
use crate::executor::{self, StagedMove};
use crate::history::History;
use crate::moves::{Move, MoveRecord};
use crate::notation;
use crate::piece::{Color, PieceType};
use crate::rules::{self, GameStatus};
use crate::transcript;

/// A pawn is waiting on the last rank for the caller to pick its new kind.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PromotionRequest {
    pub square: Square,
    pub color: Color,
    pub choices: [PieceType; 4],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(MoveRecord),
    PromotionPending(PromotionRequest),
}

/// Everything needed to resume a game exactly.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub history: History,
}

/// One game: a board, its move history and the derived status.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    history: History,
    status: GameStatus,
    pending: Option<StagedMove>,
    config: GameConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let board = Board::new();
        let status = rules::classify(&board, &config);
        Game {
            history: History::starting_from(&board),
            board,
            status,
            pending: None,
            config,
        }
    }

    /// Start from an arbitrary position. Castling rights that the piece
    /// placement cannot support are dropped.
    pub fn from_board(mut board: Board, config: GameConfig) -> ChessResult<Self> {
        validate_position(&board)?;
        board.castling_rights = supported_rights(&board);
        let status = rules::classify(&board, &config);
        Ok(Game {
            history: History::starting_from(&board),
            board,
            status,
            pending: None,
            config,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
        self.status = rules::classify(&self.board, &self.config);
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn pending_promotion(&self) -> Option<PromotionRequest> {
        self.pending.as_ref().map(|staged| PromotionRequest {
            square: staged.to,
            color: staged.piece.color,
            choices: PieceType::PROMOTIONS,
        })
    }

    /// Why `from -> to` is illegal, or `Ok` if it is legal.
    pub fn check_move(&self, from: Square, to: Square) -> Result<(), IllegalMove> {
        rules::check_move(&self.board, from, to)
    }

    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        if self.pending.is_some() || self.status.game_over {
            return Vec::new();
        }
        rules::legal_destinations(&self.board, from)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.pending.is_some() || self.status.game_over {
            return Vec::new();
        }
        rules::legal_moves(&self.board)
    }

    fn ensure_playable(&self) -> ChessResult<()> {
        if self.pending.is_some() {
            return Err(ChessError::PromotionPending);
        }
        if self.status.game_over {
            return Err(ChessError::GameOver);
        }
        Ok(())
    }

    /// Interactive move request. A pawn reaching the last rank stops halfway
    /// and waits for [`Game::promote`].
    pub fn request_move(&mut self, from: Square, to: Square) -> ChessResult<MoveOutcome> {
        self.ensure_playable()?;
        rules::check_move(&self.board, from, to)?;
        let staged = executor::stage(&mut self.board, from, to)?;
        if staged.needs_promotion() {
            debug!(from = %notation::square_name(from), to = %notation::square_name(to), "awaiting promotion choice");
            let request = PromotionRequest {
                square: staged.to,
                color: staged.piece.color,
                choices: PieceType::PROMOTIONS,
            };
            self.pending = Some(staged);
            return Ok(MoveOutcome::PromotionPending(request));
        }
        self.finish(staged, None).map(MoveOutcome::Applied)
    }

    /// Complete a pending promotion.
    pub fn promote(&mut self, piece_type: PieceType) -> ChessResult<MoveRecord> {
        if !piece_type.is_promotion_choice() {
            return Err(ChessError::InvalidPromotionPiece(piece_type));
        }
        let staged = self.pending.take().ok_or(ChessError::NoPendingPromotion)?;
        self.finish(staged, Some(piece_type))
    }

    /// Abandon a pending promotion and put the pawn back.
    pub fn cancel_promotion(&mut self) -> ChessResult<()> {
        let staged = self.pending.take().ok_or(ChessError::NoPendingPromotion)?;
        executor::cancel(&mut self.board, staged);
        debug!("promotion cancelled");
        Ok(())
    }

    /// Apply a fully specified move. Promotions must carry their choice.
    pub fn play(&mut self, mv: Move) -> ChessResult<MoveRecord> {
        self.ensure_playable()?;
        rules::check_move(&self.board, mv.from, mv.to)?;
        let promotion = executor::validate_promotion(
            rules::is_promotion(&self.board, mv.from, mv.to),
            mv.promotion,
        )?;
        let staged = executor::stage(&mut self.board, mv.from, mv.to)?;
        self.finish(staged, promotion)
    }

    /// Decode one algebraic token for the side to move and play it.
    pub fn play_notation(&mut self, text: &str) -> ChessResult<MoveRecord> {
        self.ensure_playable()?;
        let mv = notation::parse_move(text, &self.board)?;
        self.play(mv)
    }

    fn finish(&mut self, staged: StagedMove, promotion: Option<PieceType>) -> ChessResult<MoveRecord> {
        let (record, status) = match executor::finalize(&mut self.board, staged.clone(), promotion, &self.config) {
            Ok(done) => done,
            Err(err) => {
                executor::cancel(&mut self.board, staged);
                return Err(err);
            }
        };
        debug!(notation = %record.notation, player = %record.player, "move applied");
        self.status = status;
        self.report_status();
        self.history.push(record.clone());
        Ok(record)
    }

    fn report_status(&self) {
        let status = &self.status;
        if let Some(winner) = status.winner() {
            info!(%winner, "checkmate");
        } else if status.stalemate {
            info!("stalemate");
        } else if status.insufficient_material {
            if status.game_over {
                info!("draw by insufficient material");
            } else {
                warn!("insufficient material; play may continue");
            }
        }
    }

    pub fn undo(&mut self) -> ChessResult<MoveRecord> {
        if self.pending.is_some() {
            return Err(ChessError::PromotionPending);
        }
        let record = self
            .history
            .undo(&mut self.board)
            .ok_or(ChessError::NothingToUndo)?;
        self.status = rules::classify(&self.board, &self.config);
        debug!(notation = %record.notation, "move undone");
        Ok(record)
    }

    /// Back to the initial position. Discards any pending promotion.
    pub fn reset(&mut self) {
        *self = Game::with_config(self.config.clone());
        info!("game reset");
    }

    pub fn export_moves(&self) -> String {
        transcript::export(&self.history, &self.status, &self.config)
    }

    /// Replace this game with the one described by `text`. On failure the
    /// current game is left as it was.
    pub fn import_moves(&mut self, text: &str) -> ChessResult<usize> {
        if self.pending.is_some() {
            return Err(ChessError::PromotionPending);
        }
        let game = transcript::import(text, self.config.clone()).map_err(|err| {
            warn!(%err, "import rejected");
            err
        })?;
        *self = game;
        info!(moves = self.history.len(), "game imported");
        Ok(self.history.len())
    }

    pub fn state(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            history: self.history.clone(),
        }
    }

    /// Resume from an exported state. Status is recomputed from the board.
    pub fn from_state(state: GameState, config: GameConfig) -> ChessResult<Self> {
        validate_position(&state.board)?;
        if let Some(last) = state.history.last() {
            if last.player == state.board.current_turn {
                return Err(ChessError::InvalidState(
                    "side to move does not follow the last recorded move".to_string(),
                ));
            }
        }
        if state.board.castling_rights != supported_rights(&state.board) {
            return Err(ChessError::InvalidState(
                "castling rights do not match the piece placement".to_string(),
            ));
        }
        let status = rules::classify(&state.board, &config);
        Ok(Game {
            board: state.board,
            history: state.history,
            status,
            pending: None,
            config,
        })
    }

    pub fn save_json(&self) -> ChessResult<String> {
        Ok(serde_json::to_string(&self.state())?)
    }

    pub fn load_json(json: &str, config: GameConfig) -> ChessResult<Self> {
        let state: GameState = serde_json::from_str(json)?;
        Self::from_state(state, config).map_err(|err| {
            warn!(%err, "saved game rejected");
            err
        })
    }
}

/// Exactly one king per side, and the side that just moved is not in check.
fn validate_position(board: &Board) -> ChessResult<()> {
    for color in [Color::White, Color::Black] {
        let kings = board.count(PieceType::King, color);
        if kings != 1 {
            return Err(ChessError::InvalidState(format!("{color} has {kings} kings")));
        }
    }
    if board.is_in_check(board.current_turn.opposite()) {
        return Err(ChessError::InvalidState(format!(
            "{} is in check but it is {} to move",
            board.current_turn.opposite(),
            board.current_turn
        )));
    }
    Ok(())
}

/// The board's rights, minus any whose king or rook is not on its home square.
fn supported_rights(board: &Board) -> crate::board::CastlingRights {
    let mut rights = board.castling_rights;
    for color in [Color::White, Color::Black] {
        let row = color.back_rank();
        if !board.piece_at((row, KING_HOME_COL)).is_some_and(|p| p.is(PieceType::King, color)) {
            rights.revoke_all(color);
        }
        for side in [CastleSide::KingSide, CastleSide::QueenSide] {
            if !board.piece_at((row, side.rook_col())).is_some_and(|p| p.is(PieceType::Rook, color)) {
                rights.revoke(color, side);
            }
        }
    }
    rights
}
