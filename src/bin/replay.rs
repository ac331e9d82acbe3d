use std::path::PathBuf;
use std::process::ExitCode;

use chess_rules::config::GameConfig;
use chess_rules::error::{ChessError, ChessResult};
use chess_rules::game::Game;
use chess_rules::moves::Move;
use chess_rules::transcript;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Replays a move list and prints the resulting position.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Move list in "1. e4 e5" form.
    file: PathBuf,

    /// Further moves to play after the file, in SAN or coordinate form (e7e8q).
    #[arg(short, long)]
    moves: Vec<String>,

    /// Print the saved game state as JSON instead of the board.
    #[arg(long)]
    json: bool,

    /// Print the move list back out, with a header.
    #[arg(long)]
    export: bool,

    /// Treat insufficient material as a draw.
    #[arg(long)]
    auto_draw: bool,
}

fn play_extra(game: &mut Game, token: &str) -> ChessResult<()> {
    match Move::from_uci(token) {
        Some(mv) => game.play(mv).map(|_| ()),
        None => game.play_notation(token).map(|_| ()),
    }
}

fn run(args: &Args) -> ChessResult<()> {
    let config = GameConfig {
        auto_draw_insufficient_material: args.auto_draw,
        export_header: true,
        ..GameConfig::default()
    };
    let mut game = transcript::import_file(&args.file, config).inspect_err(|err| {
        if let ChessError::Io(_) = err {
            error!(file = %args.file.display(), "cannot read move list");
        }
    })?;
    for token in &args.moves {
        play_extra(&mut game, token).inspect_err(|_| error!(%token, "extra move rejected"))?;
    }

    if args.json {
        println!("{}", game.save_json()?);
        return Ok(());
    }

    println!("{}", game.board());
    let status = game.status();
    println!("{} to move, {} plies played", status.to_move, game.history().len());
    if let Some(winner) = status.winner() {
        println!("Checkmate, {winner} wins");
    } else if status.stalemate {
        println!("Stalemate");
    } else if status.in_check {
        println!("{} is in check", status.to_move);
    }
    if status.insufficient_material {
        println!("Insufficient material");
    }
    if args.export {
        println!();
        println!("{}", game.export_moves());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
