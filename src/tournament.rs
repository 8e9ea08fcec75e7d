//! Tournament mode for running many AI-vs-AI games in parallel
//!
//! Games are independent: each one gets its own `GameState`, seeded from
//! the tournament seed and its index, so a tournament's results do not
//! depend on how rayon schedules the work.

use crate::{
    game::{DecisionEngine, GameConfig, GameEndReason, GameLoop, PlayStyle, VerbosityLevel},
    loader::{CardCatalog, DeckList, GameInitializer},
    EngineError, Result,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Spread per-game seeds across the u64 range
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A deck entered in the tournament, with the name used in reports
#[derive(Debug, Clone)]
pub struct Entrant {
    pub name: String,
    pub deck: DeckList,
}

#[derive(Debug, Clone)]
pub struct TournamentSettings {
    pub games: usize,
    pub seed: u64,
    pub p1_style: PlayStyle,
    pub p2_style: PlayStyle,
    pub game_config: GameConfig,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        TournamentSettings {
            games: 100,
            seed: 42,
            p1_style: PlayStyle::Balanced,
            p2_style: PlayStyle::Balanced,
            game_config: GameConfig::default(),
        }
    }
}

/// Outcome of one tournament game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub game_idx: usize,
    pub deck1: String,
    pub deck2: String,
    /// 0 for player 1, 1 for player 2, None for a draw
    pub winner_seat: Option<usize>,
    pub turns: u32,
    pub end_reason: GameEndReason,
}

/// Win/loss/draw tally for one pairing, keyed with the names sorted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchupTally {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

impl MatchupTally {
    pub fn total(&self) -> usize {
        self.first_wins + self.second_wins + self.draws
    }
}

#[derive(Debug, Clone)]
pub struct TournamentReport {
    pub matches: Vec<MatchRecord>,
    /// Games that ended in an engine error, with the message
    pub failures: Vec<(usize, String)>,
    pub elapsed: Duration,
}

impl TournamentReport {
    pub fn p1_wins(&self) -> usize {
        self.matches.iter().filter(|m| m.winner_seat == Some(0)).count()
    }

    pub fn p2_wins(&self) -> usize {
        self.matches.iter().filter(|m| m.winner_seat == Some(1)).count()
    }

    pub fn draws(&self) -> usize {
        self.matches.iter().filter(|m| m.winner_seat.is_none()).count()
    }

    /// (wins, games played) per deck
    pub fn deck_records(&self) -> BTreeMap<String, (usize, usize)> {
        let mut records: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for m in &self.matches {
            records.entry(m.deck1.clone()).or_default().1 += 1;
            records.entry(m.deck2.clone()).or_default().1 += 1;
            match m.winner_seat {
                Some(0) => records.entry(m.deck1.clone()).or_default().0 += 1,
                Some(_) => records.entry(m.deck2.clone()).or_default().0 += 1,
                None => {}
            }
        }
        records
    }

    pub fn matchups(&self) -> BTreeMap<(String, String), MatchupTally> {
        let mut matchups: BTreeMap<(String, String), MatchupTally> = BTreeMap::new();
        for m in &self.matches {
            let swapped = m.deck1 > m.deck2;
            let key = if swapped {
                (m.deck2.clone(), m.deck1.clone())
            } else {
                (m.deck1.clone(), m.deck2.clone())
            };
            let tally = matchups.entry(key).or_default();
            match (m.winner_seat, swapped) {
                (Some(0), false) | (Some(1), true) => tally.first_wins += 1,
                (Some(_), _) => tally.second_wins += 1,
                (None, _) => tally.draws += 1,
            }
        }
        matchups
    }

    pub fn print_summary(&self) {
        let played = self.matches.len();
        println!("\n=== Tournament Complete ===");
        println!("Total games played: {played}");
        println!("Elapsed time: {:.2}s", self.elapsed.as_secs_f64());
        if self.elapsed.as_secs_f64() > 0.0 {
            println!(
                "Games per second: {:.2}",
                played as f64 / self.elapsed.as_secs_f64()
            );
        }
        for (idx, err) in &self.failures {
            eprintln!("Warning: Game {idx} failed: {err}");
        }

        println!("\n=== Player Position Statistics ===");
        if played > 0 {
            for (label, count) in [
                ("P1 wins", self.p1_wins()),
                ("P2 wins", self.p2_wins()),
                ("Draws", self.draws()),
            ] {
                println!("{label}: {count} ({:.1}%)", percent(count, played));
            }
        }

        println!("\n=== Deck Win Rates ===");
        for (deck, (wins, games)) in self.deck_records() {
            println!("  {deck}: {wins}/{games} ({:.1}%)", percent(wins, games));
        }

        println!("\n=== Matchup Results ===");
        for ((first, second), tally) in self.matchups() {
            let total = tally.total();
            if first == second {
                println!("  {first} (mirror): {total} games");
            } else {
                println!("  {first} vs {second}: {total} games");
            }
            println!(
                "    {first}: {} ({:.1}%)",
                tally.first_wins,
                percent(tally.first_wins, total)
            );
            println!(
                "    {second}: {} ({:.1}%)",
                tally.second_wins,
                percent(tally.second_wins, total)
            );
            if tally.draws > 0 {
                println!("    Draws: {} ({:.1}%)", tally.draws, percent(tally.draws, total));
            }
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Seed for game `game_idx` of a tournament seeded with `seed`
pub fn game_seed(seed: u64, game_idx: usize) -> u64 {
    seed.wrapping_add((game_idx as u64).wrapping_mul(SEED_STRIDE))
}

/// Play one silent game between two entrants
pub fn play_match(
    catalog: &CardCatalog,
    deck1: &Entrant,
    deck2: &Entrant,
    settings: &TournamentSettings,
    seed: u64,
) -> Result<(Option<usize>, u32, GameEndReason)> {
    let mut game = GameInitializer::new(catalog).init_game(
        "Player 1".to_string(),
        &deck1.deck,
        "Player 2".to_string(),
        &deck2.deck,
        settings.game_config.clone(),
    )?;
    game.seed_rng(seed);

    let p1_id = game.players[0].id;
    let p2_id = game.players[1].id;
    let engine1 = DecisionEngine::new(p1_id, settings.p1_style);
    let engine2 = DecisionEngine::new(p2_id, settings.p2_style);

    let result = GameLoop::new(&mut game)
        .with_verbosity(VerbosityLevel::Silent)
        .run_game(&engine1, &engine2)?;

    let winner_seat = result.winner.map(|w| usize::from(w != p1_id));
    Ok((winner_seat, result.turns_played, result.end_reason))
}

/// Run `settings.games` games on the rayon pool
///
/// Each game pairs two entrants drawn with a per-game RNG, so the pairing
/// and the game seed are both fixed by `(settings.seed, game_idx)`.
pub fn run_tournament(
    catalog: &CardCatalog,
    entrants: &[Entrant],
    settings: &TournamentSettings,
) -> Result<TournamentReport> {
    if entrants.is_empty() {
        return Err(EngineError::InvalidDeckFormat(
            "a tournament needs at least one deck".to_string(),
        ));
    }

    let start = Instant::now();
    let outcomes: Vec<(usize, String, String, Result<(Option<usize>, u32, GameEndReason)>)> =
        (0..settings.games)
            .into_par_iter()
            .map(|game_idx| {
                let seed = game_seed(settings.seed, game_idx);
                let mut pick_rng = ChaCha12Rng::seed_from_u64(seed);
                let deck1 = &entrants[pick_rng.gen_range(0..entrants.len())];
                let deck2 = &entrants[pick_rng.gen_range(0..entrants.len())];
                let outcome = play_match(catalog, deck1, deck2, settings, seed);
                (game_idx, deck1.name.clone(), deck2.name.clone(), outcome)
            })
            .collect();

    let mut matches = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (game_idx, deck1, deck2, outcome) in outcomes {
        match outcome {
            Ok((winner_seat, turns, end_reason)) => matches.push(MatchRecord {
                game_idx,
                deck1,
                deck2,
                winner_seat,
                turns,
                end_reason,
            }),
            Err(e) => failures.push((game_idx, e.to_string())),
        }
    }

    Ok(TournamentReport {
        matches,
        failures,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DeckLoader;

    const CARDS: &str = r#"[
        { "name": "Ember Hound", "type": "familiar", "cost": ["fire", "1"], "strength": 2, "health": 2 },
        { "name": "Tide Warden", "type": "familiar", "cost": ["water", "1"], "strength": 1, "health": 3 },
        { "name": "Ember Lance", "type": "spell", "cost": ["fire"],
          "abilities": [{ "effect": "Deal 1 damage to opponent" }] }
    ]"#;

    fn entrants() -> Vec<Entrant> {
        vec![
            Entrant {
                name: "cinder".to_string(),
                deck: DeckLoader::parse("28 Ember Hound\n12 Ember Lance\n").unwrap(),
            },
            Entrant {
                name: "tide".to_string(),
                deck: DeckLoader::parse("40 Tide Warden\n").unwrap(),
            },
        ]
    }

    #[test]
    fn test_tournament_is_reproducible() {
        let catalog = CardCatalog::from_json(CARDS).unwrap();
        let settings = TournamentSettings {
            games: 8,
            seed: 7,
            ..TournamentSettings::default()
        };

        let first = run_tournament(&catalog, &entrants(), &settings).unwrap();
        let second = run_tournament(&catalog, &entrants(), &settings).unwrap();

        assert_eq!(first.matches.len() + first.failures.len(), 8);
        assert_eq!(first.matches, second.matches);
        assert_eq!(
            first.p1_wins() + first.p2_wins() + first.draws(),
            first.matches.len()
        );
    }

    #[test]
    fn test_empty_field_rejected() {
        let catalog = CardCatalog::new();
        assert!(run_tournament(&catalog, &[], &TournamentSettings::default()).is_err());
    }

    #[test]
    fn test_matchup_keys_are_sorted() {
        let report = TournamentReport {
            matches: vec![MatchRecord {
                game_idx: 0,
                deck1: "tide".to_string(),
                deck2: "cinder".to_string(),
                winner_seat: Some(0),
                turns: 5,
                end_reason: GameEndReason::TurnLimit,
            }],
            failures: vec![],
            elapsed: Duration::ZERO,
        };
        let matchups = report.matchups();
        let tally = matchups[&("cinder".to_string(), "tide".to_string())];
        assert_eq!(tally.second_wins, 1);
        assert_eq!(report.deck_records()["tide"], (1, 1));
    }
}
