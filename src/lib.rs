pub mod board;
pub mod config;
pub mod error;
pub mod executor;
pub mod game;
pub mod history;
pub mod moves;
pub mod notation;
pub mod piece;
pub mod rules;
pub mod transcript;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{Board, CastleSide, CastlingRights, Square};
pub use config::GameConfig;
pub use error::{CastlingError, ChessError, ChessResult, IllegalMove, ImportError, NotationError};
pub use game::{Game, GameState, MoveOutcome, PromotionRequest};
pub use history::History;
pub use moves::{Move, MoveRecord};
pub use piece::{Color, Piece, PieceType};
pub use rules::GameStatus;

/// When this library was built, stamped by the build script.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
