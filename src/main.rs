//! azoth - command line front end for the KONIVRER rules engine
//!
//! Plays single AI-vs-AI games with a readable log, or runs tournaments.

use anyhow::Context;
use azoth_engine::{
    game::{DecisionEngine, GameConfig, GameLoop, OutputMode, PlayStyle, VerbosityLevel},
    loader::{CardCatalog, DeckList, DeckLoader, GameInitializer},
    tournament::{run_tournament, Entrant, TournamentSettings},
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "azoth")]
#[command(about = "azoth - KONIVRER rules engine", long_about = None)]
struct Cli {
    /// Card data file (JSON array of card records)
    #[arg(long, global = true, default_value = "data/cards.json")]
    cards: PathBuf,

    /// Rule overrides (JSON GameConfig)
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one AI-vs-AI game and print its log
    Play {
        /// Deck file (.deck) for player 1
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        /// Deck file (.deck) for player 2
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: PathBuf,

        /// Player 1 play style (balanced, aggressive, defensive, control)
        #[arg(long, default_value = "balanced")]
        p1_style: PlayStyle,

        /// Player 2 play style
        #[arg(long, default_value = "balanced")]
        p2_style: PlayStyle,

        /// Player 1 name
        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        /// Player 2 name
        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Set random seed for deterministic games
        #[arg(long)]
        seed: Option<u64>,

        /// Turn cap before the game is declared a draw
        #[arg(long)]
        max_turns: Option<u32>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Run many silent games in parallel and report win rates
    Simulate {
        /// Deck files (.deck) entered in the tournament
        #[arg(value_name = "DECKS", required = true)]
        decks: Vec<PathBuf>,

        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 100)]
        games: usize,

        /// Tournament seed; each game derives its own seed from it
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Play style for the first seat
        #[arg(long, default_value = "balanced")]
        p1_style: PlayStyle,

        /// Play style for the second seat
        #[arg(long, default_value = "balanced")]
        p2_style: PlayStyle,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let catalog = CardCatalog::load(&cli.cards)
        .with_context(|| format!("loading card data from {}", cli.cards.display()))?;
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading game config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            p1_style,
            p2_style,
            p1_name,
            p2_name,
            seed,
            max_turns,
            verbosity,
        } => {
            let deck1 = load_deck(&deck1)?;
            let deck2 = load_deck(&deck2)?;
            let seed = seed.unwrap_or_else(rand::random);
            let mut game = GameInitializer::new(&catalog).init_game(
                p1_name, &deck1, p2_name, &deck2, config,
            )?;
            game.seed_rng(seed);
            game.logger.set_output_mode(OutputMode::Both);

            let p1 = DecisionEngine::new(game.players[0].id, p1_style);
            let p2 = DecisionEngine::new(game.players[1].id, p2_style);

            println!("=== azoth - seed {seed} ===\n");
            let mut game_loop = GameLoop::new(&mut game).with_verbosity(verbosity.into());
            if let Some(max_turns) = max_turns {
                game_loop = game_loop.with_max_turns(max_turns);
            }
            let result = game_loop.run_game(&p1, &p2)?;

            println!("\n=== Game Over ===");
            match result.winner {
                Some(winner) => println!("Winner: {}", game.player_name(winner)),
                None => println!("Result: draw"),
            }
            println!("Turns played: {}", result.turns_played);
            println!("End reason: {:?}", result.end_reason);
        }
        Commands::Simulate {
            decks,
            games,
            seed,
            p1_style,
            p2_style,
        } => {
            let entrants = decks
                .iter()
                .map(|path| {
                    let deck = load_deck(path)?;
                    let name = deck
                        .name
                        .clone()
                        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
                        .unwrap_or_else(|| path.display().to_string());
                    println!("  {}: {} cards", name, deck.total_cards());
                    Ok(Entrant { name, deck })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let settings = TournamentSettings {
                games,
                seed,
                p1_style,
                p2_style,
                game_config: config,
            };
            println!(
                "\nRunning {games} games with {} decks (seed {seed}, P1={p1_style}, P2={p2_style})",
                entrants.len()
            );
            let report = run_tournament(&catalog, &entrants, &settings)?;
            report.print_summary();
        }
    }

    Ok(())
}

fn load_deck(path: &Path) -> anyhow::Result<DeckList> {
    DeckLoader::load_from_file(path).with_context(|| format!("loading deck {}", path.display()))
}
