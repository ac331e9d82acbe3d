use crate::config::GameConfig;
use crate::error::ChessError;
use crate::game::{Game, PromotionRequest};
use crate::piece::{Color, PieceType};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct MoveJson {
    from: [usize; 2],
    to: [usize; 2],
    promotion: Option<String>,
}

#[derive(Serialize)]
struct PromotionJson {
    square: [usize; 2],
    color: String,
    choices: Vec<String>,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    game_over: bool,
    result: Option<String>,
    is_in_check: bool,
    checkmate: bool,
    stalemate: bool,
    insufficient_material: bool,
    legal_moves: Vec<MoveJson>,
    captured_white: Vec<String>,
    captured_black: Vec<String>,
    last_move: Option<[[usize; 2]; 2]>,
    last_notation: Option<String>,
    move_list: Vec<String>,
    pending_promotion: Option<PromotionJson>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn string_to_piece_type(s: &str) -> Option<PieceType> {
    match s {
        "Queen" => Some(PieceType::Queen),
        "Rook" => Some(PieceType::Rook),
        "Bishop" => Some(PieceType::Bishop),
        "Knight" => Some(PieceType::Knight),
        _ => None,
    }
}

fn promotion_json(request: PromotionRequest) -> PromotionJson {
    PromotionJson {
        square: [request.square.0, request.square.1],
        color: request.color.to_string(),
        choices: request.choices.iter().map(ToString::to_string).collect(),
    }
}

fn build_board_state(game: &Game) -> BoardState {
    let board = game.board();
    let status = game.status();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    board.squares[r][c].map(|p| SquarePiece {
                        piece_type: p.piece_type.to_string(),
                        color: p.color.to_string(),
                    })
                })
                .collect()
        })
        .collect();

    let legal_moves: Vec<MoveJson> = game
        .legal_moves()
        .iter()
        .map(|m| MoveJson {
            from: [m.from.0, m.from.1],
            to: [m.to.0, m.to.1],
            promotion: m.promotion.map(|pt| pt.to_string()),
        })
        .collect();

    let captured_of = |color: Color| -> Vec<String> {
        game.history()
            .records()
            .iter()
            .filter_map(|r| r.captured)
            .filter(|p| p.color == color)
            .map(|p| p.piece_type.to_string())
            .collect()
    };

    BoardState {
        squares,
        current_turn: board.current_turn.to_string(),
        game_over: status.game_over,
        result: status.result_token().map(str::to_string),
        is_in_check: status.in_check,
        checkmate: status.checkmate,
        stalemate: status.stalemate,
        insufficient_material: status.insufficient_material,
        legal_moves,
        captured_white: captured_of(Color::White),
        captured_black: captured_of(Color::Black),
        last_move: game.last_move().map(|m| [[m.from.0, m.from.1], [m.to.0, m.to.1]]),
        last_notation: game.last_move().map(|m| m.notation.clone()),
        move_list: game.history().records().iter().map(|m| m.notation.clone()).collect(),
        pending_promotion: game.pending_promotion().map(promotion_json),
    }
}

#[wasm_bindgen]
pub struct ChessGame {
    game: Game,
}

impl ChessGame {
    fn state_value(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&build_board_state(&self.game)).unwrap_or(JsValue::NULL)
    }

    fn respond(&self, outcome: Result<(), ChessError>) -> JsValue {
        let result = match outcome {
            Ok(()) => MoveResult {
                board_state: Some(build_board_state(&self.game)),
                error: None,
            },
            Err(err) => MoveResult {
                board_state: None,
                error: Some(err.to_string()),
            },
        };
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }
}

#[wasm_bindgen]
impl ChessGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ChessGame {
        ChessGame { game: Game::new() }
    }

    pub fn build_timestamp() -> String {
        crate::BUILD_TIMESTAMP.to_string()
    }

    pub fn set_auto_draw(&mut self, enabled: bool) {
        let config = GameConfig {
            auto_draw_insufficient_material: enabled,
            ..self.game.config().clone()
        };
        self.game.set_config(config);
    }

    pub fn get_board_state(&self) -> JsValue {
        self.state_value()
    }

    /// Move from a square to a square. A pawn reaching the last rank without
    /// a promotion name leaves a pending promotion in the returned state.
    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        promotion: Option<String>,
    ) -> JsValue {
        let from = (from_row, from_col);
        let to = (to_row, to_col);
        let outcome = match promotion.as_deref().and_then(string_to_piece_type) {
            Some(pt) => self
                .game
                .play(crate::moves::Move::with_promotion(from, to, pt))
                .map(|_| ()),
            None => self.game.request_move(from, to).map(|_| ()),
        };
        self.respond(outcome)
    }

    pub fn choose_promotion(&mut self, piece: &str) -> JsValue {
        let outcome = match string_to_piece_type(piece) {
            Some(pt) => self.game.promote(pt).map(|_| ()),
            None => Err(ChessError::InvalidState(format!("unknown promotion piece {piece}"))),
        };
        self.respond(outcome)
    }

    pub fn cancel_promotion(&mut self) -> JsValue {
        let outcome = self.game.cancel_promotion();
        self.respond(outcome)
    }

    /// Apply the opponent's move given in algebraic notation.
    pub fn opponent_move(&mut self, text: &str) -> JsValue {
        let outcome = self.game.play_notation(text).map(|_| ());
        self.respond(outcome)
    }

    pub fn undo(&mut self) -> JsValue {
        let outcome = self.game.undo().map(|_| ());
        self.respond(outcome)
    }

    pub fn reset(&mut self) -> JsValue {
        self.game.reset();
        self.state_value()
    }

    /// Why a move is illegal, or `None` when it is legal.
    pub fn explain_move(&self, from_row: usize, from_col: usize, to_row: usize, to_col: usize) -> Option<String> {
        self.game
            .check_move((from_row, from_col), (to_row, to_col))
            .err()
            .map(|reason| reason.to_string())
    }

    pub fn get_legal_moves_for_square(&self, row: usize, col: usize) -> JsValue {
        let targets: Vec<[usize; 2]> = self
            .game
            .legal_destinations((row, col))
            .into_iter()
            .map(|(r, c)| [r, c])
            .collect();
        serde_wasm_bindgen::to_value(&targets).unwrap_or(JsValue::NULL)
    }

    pub fn export_moves(&self) -> String {
        self.game.export_moves()
    }

    pub fn import_moves(&mut self, text: &str) -> JsValue {
        let outcome = self.game.import_moves(text).map(|_| ());
        self.respond(outcome)
    }

    pub fn save(&self) -> Option<String> {
        self.game.save_json().ok()
    }

    pub fn load(&mut self, json: &str) -> JsValue {
        let outcome = Game::load_json(json, self.game.config().clone()).map(|game| {
            self.game = game;
        });
        self.respond(outcome)
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}
