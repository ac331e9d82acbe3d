//! Standard algebraic notation.
//!
//! Encoding works on the position *before* the move is made, so capture,
//! castling and disambiguation can be read off the board. Decoding resolves a
//! token against the current position by asking the rules engine which
//! pieces of the named kind can legally reach the destination.

use crate::board::{Board, CastleSide, Square, KING_HOME_COL};
use crate::error::NotationError;
use crate::moves::Move;
use crate::piece::PieceType;
use crate::rules::{self, GameStatus};

const FILES: &[u8; 8] = b"abcdefgh";

pub fn file_char(col: usize) -> char {
    FILES[col] as char
}

pub fn rank_char(row: usize) -> char {
    (b'8' - row as u8) as char
}

pub fn square_name((row, col): Square) -> String {
    format!("{}{}", file_char(col), rank_char(row))
}

fn file_index(c: char) -> Option<usize> {
    ('a'..='h').contains(&c).then(|| c as usize - 'a' as usize)
}

fn rank_index(c: char) -> Option<usize> {
    ('1'..='8').contains(&c).then(|| '8' as usize - c as usize)
}

pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = file_index(chars.next()?)?;
    let rank = rank_index(chars.next()?)?;
    chars.next().is_none().then_some((rank, file))
}

/// `+` for check, `#` for mate, nothing otherwise.
pub fn check_suffix(status: &GameStatus) -> &'static str {
    if status.checkmate {
        "#"
    } else if status.in_check {
        "+"
    } else {
        ""
    }
}

/// Origin hint needed to tell `from` apart from other same-kind pieces that
/// could also reach `to`: the file if that is enough, else the rank, else
/// the whole square.
fn disambiguator(board: &Board, from: Square, to: Square, piece_type: PieceType) -> String {
    let color = board.current_turn;
    let rivals: Vec<Square> = board
        .pieces()
        .filter(|(sq, p)| *sq != from && p.is(piece_type, color))
        .map(|(sq, _)| sq)
        .filter(|&sq| rules::is_legal(board, sq, to))
        .collect();
    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.1 != from.1) {
        file_char(from.1).to_string()
    } else if rivals.iter().all(|sq| sq.0 != from.0) {
        rank_char(from.0).to_string()
    } else {
        square_name(from)
    }
}

/// Encode `mv` as played from `board`, without a check suffix.
pub fn encode(board: &Board, mv: &Move) -> String {
    let Some(piece) = board.piece_at(mv.from) else {
        return String::new();
    };
    if piece.piece_type == PieceType::King && mv.from.1.abs_diff(mv.to.1) == 2 {
        return match CastleSide::from_king_move(mv.from.1, mv.to.1) {
            CastleSide::KingSide => "O-O".to_string(),
            CastleSide::QueenSide => "O-O-O".to_string(),
        };
    }

    let capture = board.piece_at(mv.to).is_some() || rules::is_en_passant(board, mv.from, mv.to);
    let mut out = String::new();
    match piece.piece_type.letter() {
        Some(letter) => {
            out.push(letter);
            if piece.piece_type != PieceType::King {
                out.push_str(&disambiguator(board, mv.from, mv.to, piece.piece_type));
            }
        }
        None if capture => out.push(file_char(mv.from.1)),
        None => {}
    }
    if capture {
        out.push('x');
    }
    out.push_str(&square_name(mv.to));
    if let Some(letter) = mv.promotion.and_then(PieceType::letter) {
        out.push('=');
        out.push(letter);
    }
    out
}

enum Disambiguation {
    None,
    File(usize),
    Rank(usize),
    Square(Square),
}

impl Disambiguation {
    fn parse(s: &str) -> Result<Self, NotationError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (None, _, _) => Ok(Disambiguation::None),
            (Some(c), None, _) => file_index(c)
                .map(Disambiguation::File)
                .or_else(|| rank_index(c).map(Disambiguation::Rank))
                .ok_or_else(|| NotationError::InvalidDisambiguation(s.to_string())),
            (Some(_), Some(_), None) => parse_square(s)
                .map(Disambiguation::Square)
                .ok_or_else(|| NotationError::InvalidDisambiguation(s.to_string())),
            _ => Err(NotationError::InvalidDisambiguation(s.to_string())),
        }
    }

    fn matches(&self, sq: Square) -> bool {
        match *self {
            Disambiguation::None => true,
            Disambiguation::File(col) => sq.1 == col,
            Disambiguation::Rank(row) => sq.0 == row,
            Disambiguation::Square(s) => sq == s,
        }
    }
}

fn castle_move(board: &Board, side: CastleSide) -> Move {
    let row = board.current_turn.back_rank();
    Move::new((row, KING_HOME_COL), (row, side.king_target_col()))
}

/// Strip check/mate marks and an optional ` e.p.` annotation.
fn clean(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_suffix("e.p.").map(str::trim_end).unwrap_or(text);
    text.trim_end_matches(['+', '#'])
}

/// Decode one token for the side to move on `board`.
///
/// The result names a unique origin square whose piece can legally reach
/// the destination. Castling literals are returned without a legality check;
/// pawn moves to the last rank may come back without a promotion choice.
pub fn parse_move(text: &str, board: &Board) -> Result<Move, NotationError> {
    let working = clean(text);
    if working.is_empty() {
        return Err(NotationError::Empty);
    }
    match working {
        "O-O" | "0-0" => return Ok(castle_move(board, CastleSide::KingSide)),
        "O-O-O" | "0-0-0" => return Ok(castle_move(board, CastleSide::QueenSide)),
        _ => {}
    }

    let (body, promotion) = match working.split_once('=') {
        Some((body, promo)) => {
            let mut chars = promo.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(c), None) => PieceType::from_letter(c).filter(|pt| pt.is_promotion_choice()),
                _ => None,
            };
            match kind {
                Some(kind) => (body, Some(kind)),
                None => return Err(NotationError::InvalidPromotion(promo.to_string())),
            }
        }
        None => (working, None),
    };

    let split = body
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .ok_or_else(|| NotationError::InvalidDestination(text.to_string()))?;
    let to = parse_square(&body[split..])
        .ok_or_else(|| NotationError::InvalidDestination(text.to_string()))?;

    let prefix = &body[..split];
    let (piece_type, rest) = match prefix.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {
            let pt = PieceType::from_letter(c).ok_or(NotationError::UnknownPiece(c))?;
            (pt, &prefix[c.len_utf8()..])
        }
        _ => (PieceType::Pawn, prefix),
    };
    let hint = rest.replacen('x', "", 1);
    let hint = Disambiguation::parse(&hint)?;

    if promotion.is_some() && piece_type != PieceType::Pawn {
        return Err(NotationError::InvalidPromotion(working.to_string()));
    }

    let color = board.current_turn;
    let candidates: Vec<Square> = board
        .pieces()
        .filter(|(_, p)| p.is(piece_type, color))
        .map(|(sq, _)| sq)
        .filter(|&sq| rules::is_legal(board, sq, to))
        .filter(|&sq| hint.matches(sq))
        .collect();

    match candidates.as_slice() {
        [from] => {
            if promotion.is_some() && !rules::is_promotion(board, *from, to) {
                return Err(NotationError::InvalidPromotion(working.to_string()));
            }
            Ok(Move { from: *from, to, promotion })
        }
        [] => Err(NotationError::NoCandidate {
            piece: piece_type,
            square: square_name(to),
        }),
        many => Err(NotationError::Ambiguous {
            piece: piece_type,
            square: square_name(to),
            candidates: many.len(),
        }),
    }
}
