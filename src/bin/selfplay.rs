use chess_rules::board::Board;
use chess_rules::config::GameConfig;
use chess_rules::game::Game;
use chess_rules::piece::Color;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Plays random legal games, then undoes every move and checks that the
/// board returns to each earlier position exactly.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 20)]
    games: usize,

    #[arg(short, long, default_value_t = 200)]
    max_plies: usize,

    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// End games on insufficient material instead of playing on.
    #[arg(long)]
    auto_draw: bool,
}

#[derive(Debug, Default)]
struct Tally {
    white_wins: u32,
    black_wins: u32,
    draws: u32,
    unfinished: u32,
    undo_failures: u32,
}

fn play_game(rng: &mut StdRng, args: &Args) -> (Game, bool) {
    let config = GameConfig {
        auto_draw_insufficient_material: args.auto_draw,
        ..GameConfig::default()
    };
    let mut game = Game::with_config(config);
    let mut snapshots: Vec<Board> = vec![game.board().clone()];

    for _ in 0..args.max_plies {
        if game.status().game_over {
            break;
        }
        let moves = game.legal_moves();
        let Some(mv) = moves.choose(rng).copied() else {
            break;
        };
        if let Err(err) = game.play(mv) {
            error!(%err, mv = %mv.to_uci(), "legal move was rejected");
            return (game, false);
        }
        snapshots.push(game.board().clone());
    }
    debug!(plies = game.history().len(), "game finished");

    let mut replay = game.clone();
    snapshots.pop();
    while let Some(expected) = snapshots.pop() {
        if replay.undo().is_err() || replay.board() != &expected {
            error!(ply = snapshots.len() + 1, "undo did not restore the earlier position");
            return (game, false);
        }
    }
    (game, true)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut tally = Tally::default();
    info!(games = args.games, seed = args.seed, build = chess_rules::BUILD_TIMESTAMP, "starting self-play");

    for index in 0..args.games {
        let (game, undo_ok) = play_game(&mut rng, &args);
        if !undo_ok {
            tally.undo_failures += 1;
        }
        let status = game.status();
        match status.winner() {
            Some(Color::White) => tally.white_wins += 1,
            Some(Color::Black) => tally.black_wins += 1,
            None if status.game_over => tally.draws += 1,
            None => tally.unfinished += 1,
        }
        info!(
            game = index + 1,
            plies = game.history().len(),
            result = status.result_token().unwrap_or("*"),
            "game over"
        );
    }

    eprintln!(
        "White {} / Black {} / Draw {} / Unfinished {} ({} undo failures)",
        tally.white_wins, tally.black_wins, tally.draws, tally.unfinished, tally.undo_failures
    );
    if tally.undo_failures > 0 {
        std::process::exit(1);
    }
}
