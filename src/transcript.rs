// =============================================================================
// Move-list transcripts
//
// Export renders the history as numbered pairs ("1. e4 e5"), one move number
// per line, followed by the result once the game is decided. Import reads the
// same format back by replaying every token on a fresh game.
// =============================================================================

use std::fs;
use std::path::Path;

use chrono::Local;

use crate::config::GameConfig;
use crate::error::{ChessResult, ImportError};
use crate::game::Game;
use crate::history::History;
use crate::moves::MoveRecord;
use crate::piece::Color;
use crate::rules::GameStatus;

const TITLE: &str = "Chess Game Moves";
const RESULT_PREFIX: &str = "Result:";
const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];
const EN_PASSANT_MARK: &str = "e.p.";

fn token(record: &MoveRecord, config: &GameConfig) -> String {
    if record.en_passant && config.annotate_en_passant {
        format!("{} {EN_PASSANT_MARK}", record.notation)
    } else {
        record.notation.clone()
    }
}

pub fn export(history: &History, status: &GameStatus, config: &GameConfig) -> String {
    let mut lines = Vec::new();
    if config.export_header {
        lines.push(TITLE.to_string());
        lines.push("=".repeat(TITLE.len() + 2));
        lines.push(format!("Date: {}", Local::now().format("%Y-%m-%d")));
        lines.push(format!("Total Moves: {}", history.len()));
        lines.push(String::new());
    }

    let mut records = history.records().iter().peekable();
    let mut number = 1;
    if let Some(first) = records.next_if(|r| r.player == Color::Black) {
        lines.push(format!("{number}... {}", token(first, config)));
        number += 1;
    }
    while let Some(white) = records.next() {
        let mut line = format!("{number}. {}", token(white, config));
        if let Some(black) = records.next() {
            line.push(' ');
            line.push_str(&token(black, config));
        }
        lines.push(line);
        number += 1;
    }

    if let Some(result) = status.result_token() {
        if config.export_header {
            lines.push(String::new());
            lines.push(format!("{RESULT_PREFIX} {result}"));
        } else {
            lines.push(result.to_string());
        }
    }
    lines.join("\n")
}

fn is_header_line(line: &str) -> bool {
    line.starts_with("Chess")
        || line.starts_with('=')
        || line.starts_with("Date:")
        || line.starts_with("Total")
        || line.starts_with(RESULT_PREFIX)
}

/// Strip a leading move number: `12.`, `12...` or the glued form `12.Nf3`.
fn strip_move_number(word: &str) -> &str {
    let digits = word.len() - word.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !word[digits..].starts_with('.') {
        return word;
    }
    word[digits..].trim_start_matches('.')
}

/// The move tokens of a transcript, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_header_line(line))
        .flat_map(str::split_whitespace)
        .filter(|word| *word != EN_PASSANT_MARK && !RESULT_TOKENS.contains(word))
        .map(strip_move_number)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replay a transcript from the initial position. Stops at the first token
/// that does not decode or is not legal and reports where it was.
pub fn import(text: &str, config: GameConfig) -> Result<Game, Box<ImportError>> {
    let mut game = Game::with_config(config);
    for (index, token) in tokenize(text).into_iter().enumerate() {
        let color = game.board().current_turn;
        if let Err(source) = game.play_notation(&token) {
            return Err(Box::new(ImportError {
                move_number: index / 2 + 1,
                color,
                token,
                source,
            }));
        }
    }
    Ok(game)
}

/// Read a transcript from disk and replay it.
pub fn import_file(path: &Path, config: GameConfig) -> ChessResult<Game> {
    let text = fs::read_to_string(path)?;
    Ok(import(&text, config)?)
}
