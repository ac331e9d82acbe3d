use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceType};

/// `(row, col)`; row 0 is rank 8, col 0 is file a.
pub type Square = (usize, usize);

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub fn rook_col(self) -> usize {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    pub fn king_target_col(self) -> usize {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    pub fn rook_target_col(self) -> usize {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }

    /// Side implied by a two-column king move.
    pub fn from_king_move(from_col: usize, to_col: usize) -> CastleSide {
        if to_col > from_col {
            CastleSide::KingSide
        } else {
            CastleSide::QueenSide
        }
    }

    /// The side whose rook starts on `square`, if any, for `color`.
    pub fn for_rook_origin(color: Color, square: Square) -> Option<CastleSide> {
        match square {
            (r, 7) if r == color.back_rank() => Some(CastleSide::KingSide),
            (r, 0) if r == color.back_rank() => Some(CastleSide::QueenSide),
            _ => None,
        }
    }
}

impl fmt::Display for CastleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastleSide::KingSide => write!(f, "kingside"),
            CastleSide::QueenSide => write!(f, "queenside"),
        }
    }
}

pub const KING_HOME_COL: usize = 4;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn get(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside,
            (Color::White, CastleSide::QueenSide) => self.white_queenside,
            (Color::Black, CastleSide::KingSide) => self.black_kingside,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside,
        }
    }

    /// Rights only ever go from true to false; there is no setter.
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside = false,
            (Color::White, CastleSide::QueenSide) => self.white_queenside = false,
            (Color::Black, CastleSide::KingSide) => self.black_kingside = false,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside = false,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
    pub current_turn: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            current_turn: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant_target: None,
        }
    }

    pub fn new() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            let back = color.back_rank();
            for (col, pt) in BACK_RANK.iter().enumerate() {
                board.squares[back][col] = Some(Piece::new(*pt, color));
            }
            for sq in &mut board.squares[color.pawn_start_row()] {
                *sq = Some(Piece::new(PieceType::Pawn, color));
            }
        }
        board.castling_rights = CastlingRights::all();
        board
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn piece_at(&self, (row, col): Square) -> Option<Piece> {
        self.squares[row][col]
    }

    pub fn set(&mut self, (row, col): Square, piece: Option<Piece>) {
        self.squares[row][col] = piece;
    }

    pub fn take(&mut self, (row, col): Square) -> Option<Piece> {
        self.squares[row][col].take()
    }

    /// Every occupied square, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..8).flat_map(move |r| (0..8).filter_map(move |c| self.squares[r][c].map(|p| ((r, c), p))))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is(PieceType::King, color))
            .map(|(sq, _)| sq)
    }

    pub fn count(&self, piece_type: PieceType, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.is(piece_type, color)).count()
    }

    pub fn is_square_attacked_by(&self, row: usize, col: usize, attacker: Color) -> bool {
        // Check knight attacks
        let knight_offsets: [(i32, i32); 8] = [
            (-2, -1), (-2, 1), (-1, -2), (-1, 2),
            (1, -2), (1, 2), (2, -1), (2, 1),
        ];
        for (dr, dc) in &knight_offsets {
            let r = row as i32 + dr;
            let c = col as i32 + dc;
            if Self::in_bounds(r, c) {
                if let Some(p) = self.squares[r as usize][c as usize] {
                    if p.is(PieceType::Knight, attacker) {
                        return true;
                    }
                }
            }
        }

        // King attacks are the one-square pattern only; castling never attacks.
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = row as i32 + dr;
                let c = col as i32 + dc;
                if Self::in_bounds(r, c) {
                    if let Some(p) = self.squares[r as usize][c as usize] {
                        if p.is(PieceType::King, attacker) {
                            return true;
                        }
                    }
                }
            }
        }

        // A pawn on (row - forward, col ± 1) attacks (row, col), occupied or not
        let pawn_row = row as i32 - attacker.forward();
        for dc in &[-1i32, 1] {
            let pc = col as i32 + dc;
            if Self::in_bounds(pawn_row, pc) {
                if let Some(p) = self.squares[pawn_row as usize][pc as usize] {
                    if p.is(PieceType::Pawn, attacker) {
                        return true;
                    }
                }
            }
        }

        // Sliding pieces (rook/queen on straights, bishop/queen on diagonals)
        let straight_dirs: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
        let diag_dirs: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        let rays = straight_dirs
            .iter()
            .map(|d| (d, PieceType::Rook))
            .chain(diag_dirs.iter().map(|d| (d, PieceType::Bishop)));
        for ((dr, dc), slider) in rays {
            let mut r = row as i32 + dr;
            let mut c = col as i32 + dc;
            while Self::in_bounds(r, c) {
                if let Some(p) = self.squares[r as usize][c as usize] {
                    if p.color == attacker
                        && (p.piece_type == slider || p.piece_type == PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                r += dr;
                c += dc;
            }
        }

        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        if let Some((kr, kc)) = self.find_king(color) {
            self.is_square_attacked_by(kr, kc, color.opposite())
        } else {
            false
        }
    }

    /// Bare kings, kings plus one minor piece, or kings plus two bishops on
    /// the same square colour.
    pub fn has_insufficient_material(&self) -> bool {
        let others: Vec<(Square, Piece)> = self
            .pieces()
            .filter(|(_, p)| p.piece_type != PieceType::King)
            .collect();
        match others.as_slice() {
            [] => true,
            [(_, p)] => p.piece_type.is_minor(),
            [((r1, c1), a), ((r2, c2), b)] => {
                a.piece_type == PieceType::Bishop
                    && b.piece_type == PieceType::Bishop
                    && (r1 + c1) % 2 == (r2 + c2) % 2
            }
            _ => false,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for sq in rank {
                let ch = match sq {
                    Some(p) => {
                        let letter = p.piece_type.letter().unwrap_or('P');
                        match p.color {
                            Color::White => letter,
                            Color::Black => letter.to_ascii_lowercase(),
                        }
                    }
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
