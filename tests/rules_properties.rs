use chess_rules::board::{Board, Square};
use chess_rules::config::GameConfig;
use chess_rules::game::Game;
use chess_rules::moves::Move;
use chess_rules::notation::{self, parse_square};
use chess_rules::piece::{Color, Piece, PieceType};
use chess_rules::rules;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn sq(name: &str) -> Square {
    parse_square(name).expect("valid square")
}

fn neighbour_file(col: usize) -> usize {
    if col < 7 {
        col + 1
    } else {
        col - 1
    }
}

/// Standard start, except one enemy pawn already stands next to where the
/// mover's pawn on `col` will land after a double push.
fn lurking_pawn_game(mover: Color, col: usize) -> Game {
    let enemy = mover.opposite();
    let adj = neighbour_file(col);
    let landing_row = (mover.pawn_start_row() as i32 + 2 * mover.forward()) as usize;
    let mut board = Board::new();
    board.set((enemy.pawn_start_row(), adj), None);
    board.set((landing_row, adj), Some(Piece::new(PieceType::Pawn, enemy)));
    board.current_turn = mover;
    Game::from_board(board, GameConfig::default()).expect("valid position")
}

/// A knight development that stays clear of the files next to `col`, so it
/// never lands on an en-passant square.
fn quiet_knight_move(color: Color, col: usize) -> (Square, Square) {
    match (color, col >= 5) {
        (Color::White, true) => (sq("b1"), sq("c3")),
        (Color::White, false) => (sq("g1"), sq("h3")),
        (Color::Black, true) => (sq("b8"), sq("c6")),
        (Color::Black, false) => (sq("g8"), sq("h6")),
    }
}

#[test]
fn double_pushes_open_en_passant_for_one_ply() {
    for mover in [Color::White, Color::Black] {
        for col in 0..8 {
            let mut game = lurking_pawn_game(mover, col);
            let start = mover.pawn_start_row();
            let landing = (start as i32 + 2 * mover.forward()) as usize;
            let midpoint = (start as i32 + mover.forward()) as usize;
            game.play(Move::new((start, col), (landing, col))).expect("double push");
            assert_eq!(game.board().en_passant_target, Some((midpoint, col)));

            let capturer = (landing, neighbour_file(col));
            assert!(game.check_move(capturer, (midpoint, col)).is_ok(), "{mover} file {col}");

            // Enemy answers with a knight, mover replies with a knight.
            let (from, to) = quiet_knight_move(mover.opposite(), col);
            game.play(Move::new(from, to)).expect("knight move");
            let (from, to) = quiet_knight_move(mover, col);
            game.play(Move::new(from, to)).expect("knight move");
            assert_eq!(game.board().en_passant_target, None);
            assert!(game.board().piece_at((midpoint, col)).is_none(), "{mover} file {col}");
            assert!(game.check_move(capturer, (midpoint, col)).is_err(), "{mover} file {col}");
        }
    }
}

fn open_back_ranks() -> Game {
    let mut board = Board::new();
    for name in ["b1", "c1", "d1", "f1", "g1", "b8", "c8", "d8", "f8", "g8"] {
        board.set(sq(name), None);
    }
    Game::from_board(board, GameConfig::default()).expect("valid position")
}

#[test]
fn castling_both_sides_for_both_colors() {
    let game = open_back_ranks();
    assert!(game.check_move(sq("e1"), sq("g1")).is_ok());
    assert!(game.check_move(sq("e1"), sq("c1")).is_ok());

    for (white, black, white_rook, black_rook) in [
        ("O-O", "O-O", sq("f1"), sq("f8")),
        ("O-O-O", "O-O-O", sq("d1"), sq("d8")),
        ("0-0", "0-0-0", sq("f1"), sq("d8")),
    ] {
        let mut game = open_back_ranks();
        game.play_notation(white).expect("white castles");
        game.play_notation(black).expect("black castles");
        let board = game.board();
        assert_eq!(board.piece_at(white_rook), Some(Piece::new(PieceType::Rook, Color::White)));
        assert_eq!(board.piece_at(black_rook), Some(Piece::new(PieceType::Rook, Color::Black)));
        assert_eq!(board.castling_rights, chess_rules::CastlingRights::none());
    }
}

#[test]
fn castling_rights_never_resurrect() {
    let mut game = open_back_ranks();
    let start = game.board().clone();
    for token in ["Kf1", "Kf8", "Ke1", "Ke8"] {
        game.play_notation(token).expect("king shuffle");
    }
    assert!(!game.board().castling_rights.white_kingside);
    assert!(game.check_move(sq("e1"), sq("g1")).is_err());

    game.play_notation("a3").expect("pawn move");
    game.undo().expect("undo pawn");
    let rights = game.board().castling_rights;
    assert!(!rights.white_kingside && !rights.white_queenside);
    assert!(!rights.black_kingside && !rights.black_queenside);

    for _ in 0..3 {
        game.undo().expect("undo king move");
        assert!(!game.board().castling_rights.white_kingside);
    }
    game.undo().expect("undo first king move");
    assert_eq!(game.board(), &start);
}

#[test]
fn scholars_mate_is_checkmate() {
    let mut game = Game::new();
    for token in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"] {
        game.play_notation(token).expect("legal");
    }
    let status = game.status();
    assert!(status.checkmate);
    assert!(!status.stalemate);
    assert_eq!(status.winner(), Some(Color::White));
    assert!(!rules::has_legal_move(game.board()));
}

#[test]
fn stalemate_is_not_checkmate() {
    let mut board = Board::empty();
    board.set(sq("a8"), Some(Piece::new(PieceType::King, Color::Black)));
    board.set(sq("c7"), Some(Piece::new(PieceType::Queen, Color::White)));
    board.set(sq("c6"), Some(Piece::new(PieceType::King, Color::White)));
    board.current_turn = Color::Black;
    let game = Game::from_board(board, GameConfig::default()).expect("valid position");
    let status = game.status();
    assert!(status.stalemate);
    assert!(!status.checkmate);
    assert!(!status.in_check);
    assert!(status.game_over);
    assert_eq!(status.result_token(), Some("1/2-1/2"));
}

#[test]
fn every_first_move_round_trips_through_notation() {
    let board = Board::new();
    let moves = rules::legal_moves(&board);
    assert_eq!(moves.len(), 20);
    for mv in moves {
        let text = notation::encode(&board, &mv);
        let decoded = notation::parse_move(&text, &board).expect("decodes");
        assert_eq!(decoded, mv, "{text}");
    }
}

#[test]
fn undo_is_a_strict_inverse() {
    for seed in 0..12u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        let mut snapshots = vec![game.board().clone()];
        for _ in 0..80 {
            let moves = game.legal_moves();
            let Some(mv) = moves.choose(&mut rng).copied() else {
                break;
            };
            game.play(mv).expect("generated moves are legal");
            snapshots.push(game.board().clone());
        }
        snapshots.pop();
        while let Some(expected) = snapshots.pop() {
            game.undo().expect("history not empty");
            assert_eq!(game.board(), &expected, "seed {seed}");
        }
        assert!(game.history().is_empty());
        assert_eq!(game.board(), &Board::new());
    }
}

#[test]
fn insufficient_material_cases() {
    let kings = || {
        let mut board = Board::empty();
        board.set(sq("e1"), Some(Piece::new(PieceType::King, Color::White)));
        board.set(sq("e8"), Some(Piece::new(PieceType::King, Color::Black)));
        board
    };
    assert!(kings().has_insufficient_material());

    let mut knight = kings();
    knight.set(sq("b1"), Some(Piece::new(PieceType::Knight, Color::White)));
    assert!(knight.has_insufficient_material());

    // c1 is dark, f1 is light.
    let mut bishops = kings();
    bishops.set(sq("c1"), Some(Piece::new(PieceType::Bishop, Color::White)));
    bishops.set(sq("f1"), Some(Piece::new(PieceType::Bishop, Color::White)));
    assert!(!bishops.has_insufficient_material());
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut game = Game::new();
    for token in ["e4", "a6", "e5", "d5"] {
        game.play_notation(token).expect("legal");
    }
    let record = game.play_notation("exd6 e.p.").expect("en passant");
    assert!(record.en_passant);
    assert_eq!(record.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
    let board = game.board();
    assert_eq!(board.piece_at(sq("d5")), None);
    assert_eq!(board.piece_at(sq("d6")), Some(Piece::new(PieceType::Pawn, Color::White)));
    assert_eq!(board.piece_at(sq("e5")), None);
}

#[test]
fn import_replays_a_full_game() {
    let text = "1. e4 e5\n2. Nf3 Nc6\n3. Bb5 a6\n4. Ba4 Nf6\n5. O-O Be7\n6. Re1 b5\n7. Bb3 d6\n8. c3 O-O";
    let mut game = Game::new();
    assert_eq!(game.import_moves(text).expect("imports"), 16);
    assert_eq!(game.export_moves(), text);
    assert_eq!(game.board().piece_at(sq("g8")), Some(Piece::new(PieceType::King, Color::Black)));
}
