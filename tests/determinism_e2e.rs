//! End-to-end determinism tests
//!
//! Games with the same seed must produce identical logs, both in-process
//! and through the `azoth` binary's stdout.

use azoth_engine::game::{
    DecisionEngine, GameConfig, GameEndReason, GameLoop, GameResult, GameState, PlayStyle,
    VerbosityLevel,
};
use azoth_engine::loader::{CardCatalog, DeckLoader, GameInitializer};
use similar_asserts::assert_eq;
use std::path::PathBuf;
use std::process::Command;

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn new_game(seed: u64) -> GameState {
    let catalog = CardCatalog::load(&root().join("data/cards.json")).unwrap();
    let deck1 = DeckLoader::load_from_file(&root().join("decks/cinder_rush.deck")).unwrap();
    let deck2 = DeckLoader::load_from_file(&root().join("decks/tide_fortress.deck")).unwrap();
    let mut game = GameInitializer::new(&catalog)
        .init_game(
            "Alice".to_string(),
            &deck1,
            "Bob".to_string(),
            &deck2,
            GameConfig::default(),
        )
        .unwrap();
    game.seed_rng(seed);
    game
}

fn play(game: &mut GameState, p1_style: PlayStyle, p2_style: PlayStyle) -> GameResult {
    let p1 = DecisionEngine::new(game.players[0].id, p1_style);
    let p2 = DecisionEngine::new(game.players[1].id, p2_style);
    GameLoop::new(game)
        .with_verbosity(VerbosityLevel::Silent)
        .run_game(&p1, &p2)
        .unwrap()
}

fn log_of(game: &GameState) -> Vec<String> {
    game.game_log().map(str::to_string).collect()
}

/// Helper to run the azoth binary and capture stdout
fn run_binary_with_seed(seed: u64, verbosity: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_azoth"))
        .current_dir(root())
        .args([
            "--cards",
            "data/cards.json",
            "play",
            "decks/cinder_rush.deck",
            "decks/tide_fortress.deck",
            "--seed",
            &seed.to_string(),
            "--p1-style=aggressive",
            "--p2-style=defensive",
            &format!("--verbosity={verbosity}"),
        ])
        .output()
        .expect("Failed to run azoth binary");

    assert!(
        output.status.success(),
        "azoth exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in stdout")
}

#[test]
fn test_same_seed_same_game() {
    for seed in [1u64, 42, 9001] {
        let mut first = new_game(seed);
        let mut second = new_game(seed);
        let result1 = play(&mut first, PlayStyle::Balanced, PlayStyle::Balanced);
        let result2 = play(&mut second, PlayStyle::Balanced, PlayStyle::Balanced);

        assert_eq!(result1, result2, "seed {seed} produced different results");
        assert_eq!(log_of(&first), log_of(&second), "seed {seed} produced different logs");
    }
}

#[test]
fn test_games_end_with_a_consistent_result() {
    for seed in 0..6u64 {
        let mut game = new_game(seed);
        let result = play(&mut game, PlayStyle::Aggressive, PlayStyle::Control);

        assert!(result.turns_played <= game.config.max_turns);
        match result.winner {
            Some(winner) => {
                assert!(game.game_over);
                assert_eq!(game.winner, Some(winner));
                assert_ne!(result.end_reason, GameEndReason::TurnLimit);
                let loser = game.opponent_of(winner).unwrap();
                let expected = format!("{} wins the game", game.player_name(winner));
                assert!(log_of(&game).contains(&expected));
                assert!(matches!(
                    result.end_reason,
                    GameEndReason::LifeCardsExhausted(p) | GameEndReason::DeckedOut(p) if p == loser
                ));
            }
            None => assert_eq!(result.end_reason, GameEndReason::TurnLimit),
        }
    }
}

#[test]
fn test_snapshot_continues_identically() {
    let mut game = new_game(42);
    let p1 = DecisionEngine::new(game.players[0].id, PlayStyle::Balanced);
    let p2 = DecisionEngine::new(game.players[1].id, PlayStyle::Balanced);

    // Play into the first few turns, then fork
    while game.turn.turn_number < 3 && !game.game_over {
        let engine = if game.active_player() == p1.player { p1 } else { p2 };
        engine.take_turn_step(&mut game).unwrap();
        if game.pending.is_some() {
            let chooser = if game.pending.as_ref().unwrap().player == p1.player { p1 } else { p2 };
            chooser.act(&mut game).unwrap();
        }
    }
    let mut fork = game.snapshot();

    let result1 = play(&mut game, PlayStyle::Balanced, PlayStyle::Balanced);
    let result2 = play(&mut fork, PlayStyle::Balanced, PlayStyle::Balanced);
    assert_eq!(result1, result2);
    assert_eq!(log_of(&game), log_of(&fork));
}

#[test]
fn test_binary_output_is_deterministic() {
    let run1 = run_binary_with_seed(42, "verbose");
    let run2 = run_binary_with_seed(42, "verbose");

    assert!(!run1.is_empty(), "azoth produced empty output");
    assert!(run1.contains("=== azoth - seed 42 ==="));
    assert!(run1.contains("=== Game Over ==="));
    assert_eq!(run1, run2, "same seed produced different output");
}

#[test]
fn test_binary_different_seeds_each_consistent() {
    for seed in [7u64, 8] {
        let run1 = run_binary_with_seed(seed, "normal");
        let run2 = run_binary_with_seed(seed, "normal");
        assert_eq!(run1, run2, "seed {seed} produced different output");
    }
}
