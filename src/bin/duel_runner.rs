//! Headless Duel Runner
//!
//! Drives a full match tick by tick with a scripted AI on both sides and
//! prints a JSON (or text) summary. Used for soak runs and balance checks.

use std::path::PathBuf;
use std::sync::Arc;

use arena_clash::ability::AbilityCatalog;
use arena_clash::character::CharacterProfile;
use arena_clash::combat::CombatEventKind;
use arena_clash::core::{CombatConfig, CombatError, Side};
use arena_clash::MatchSession;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Headless Duel Runner - scripted AI vs AI matches
#[derive(Parser, Debug)]
#[command(name = "duel_runner")]
#[command(about = "Run a scripted AI vs AI match and print the result")]
struct Args {
    /// Fighter on side one (roster name)
    #[arg(long, default_value = "Blaze")]
    one: String,

    /// Fighter on side two (roster name)
    #[arg(long, default_value = "Aqua")]
    two: String,

    /// Rounds in the match (overrides the config file)
    #[arg(long)]
    rounds: Option<u32>,

    /// Maximum ticks before the run is cut off
    #[arg(long, default_value_t = 50_000)]
    max_ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Combat config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ability catalog TOML (defaults to the standard catalog)
    #[arg(long)]
    abilities: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every combat event to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct DuelResult {
    winner: Option<String>,
    fighters: [String; 2],
    wins: [u32; 2],
    rounds_played: u32,
    ticks: u64,
    sim_time_ms: u64,
    final_health: [i32; 2],
    damage_dealt: [i64; 2],
    abilities_used: [u32; 2],
    projectiles_fired: [u32; 2],
    seed: u64,
}

/// Per-side scripted behaviour state
struct Pilot {
    side: Side,
    charge_release_at: Option<u64>,
}

impl Pilot {
    fn new(side: Side) -> Self {
        Self {
            side,
            charge_release_at: None,
        }
    }

    /// One decision per tick: special first, then close in and swing,
    /// otherwise charge a shot from range
    fn act(&mut self, session: &mut MatchSession, rng: &mut ChaCha8Rng) {
        let me = session.character(self.side);
        if me.is_disabled() || me.is_stunned() {
            self.charge_release_at = None;
            return;
        }

        let now = session.now();
        let them = session.character(self.side.opponent());
        let offset = them.center() - me.center();
        let distance = offset.length();
        let melee_range = session.config().melee_range;
        let can_special = me.can_use_special_ability(now);
        let shield_up = me.is_shield_active();
        let shield_level = me.shield_level();
        let charging = me.is_charging();

        if can_special && rng.gen_bool(0.05) {
            attempt(session.perform_special_ability(self.side));
        }

        if shield_up {
            if shield_level < 0.3 || rng.gen_bool(0.05) {
                attempt(session.release_shield(self.side));
            }
            return;
        }
        if !session.projectiles().is_empty() && rng.gen_bool(0.02) {
            attempt(session.activate_shield(self.side));
            return;
        }

        if let Some(release_at) = self.charge_release_at {
            if now >= release_at || !charging {
                self.charge_release_at = None;
                attempt(session.release_charge(self.side));
            }
            return;
        }

        if distance > melee_range * 0.8 {
            let direction = offset.normalize();
            attempt(session.move_character(self.side, direction.x, direction.y));
            if distance > 200.0 && rng.gen_bool(0.01) {
                attempt(session.start_charging(self.side));
                self.charge_release_at = Some(now + rng.gen_range(200..3000));
            }
        } else {
            attempt(session.perform_attack(self.side));
        }
    }
}

/// Recoverable rejections are part of normal play
fn attempt<T>(result: Result<T, CombatError>) {
    if let Err(err) = result {
        if err.kind().is_recoverable() {
            tracing::trace!(%err, "command rejected");
        } else {
            tracing::error!(%err, "unrecoverable command failure");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut config = match &args.config {
        Some(path) => CombatConfig::load_from_toml(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config '{}': {}", path.display(), e);
            std::process::exit(2);
        }),
        None => CombatConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.total_rounds = rounds;
    }

    let catalog = match &args.abilities {
        Some(path) => AbilityCatalog::load_from_toml(path).unwrap_or_else(|e| {
            eprintln!("Failed to load abilities '{}': {}", path.display(), e);
            std::process::exit(2);
        }),
        None => AbilityCatalog::standard(),
    };

    let fighters: Vec<CharacterProfile> = [&args.one, &args.two]
        .iter()
        .map(|name| {
            CharacterProfile::by_name(name).unwrap_or_else(|| {
                eprintln!("Unknown fighter '{}'", name);
                std::process::exit(2);
            })
        })
        .collect();
    let names = [fighters[0].name.clone(), fighters[1].name.clone()];

    let mut session = MatchSession::new(config, Arc::new(catalog), fighters, seed)
        .unwrap_or_else(|e| {
            eprintln!("Failed to start match: {}", e);
            std::process::exit(2);
        });

    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut pilots = [Pilot::new(Side::One), Pilot::new(Side::Two)];
    let mut damage_dealt = [0i64; 2];
    let mut abilities_used = [0u32; 2];
    let mut projectiles_fired = [0u32; 2];
    let mut rounds_played = 0;
    let mut ticks = 0;

    while !session.is_finished() && ticks < args.max_ticks {
        for pilot in &mut pilots {
            pilot.act(&mut session, &mut rng);
        }
        session.tick();
        ticks += 1;

        for event in session.drain_events() {
            if args.verbose {
                eprintln!("  [{}] {:?}", event.at, event.kind);
            }
            match event.kind {
                CombatEventKind::DamageApplied { target, amount, .. } => {
                    if let Some(side) = session.side_of(target) {
                        damage_dealt[side.opponent().index()] += i64::from(amount);
                    }
                }
                CombatEventKind::AbilityUsed { user, .. } => {
                    if let Some(side) = session.side_of(user) {
                        abilities_used[side.index()] += 1;
                    }
                }
                CombatEventKind::ProjectileSpawned { owner, .. } => {
                    if let Some(side) = session.side_of(owner) {
                        projectiles_fired[side.index()] += 1;
                    }
                }
                CombatEventKind::RoundEnded { .. } => rounds_played += 1,
                _ => {}
            }
        }
    }

    let state = session.round_state();
    let result = DuelResult {
        winner: session.match_winner().map(|side| names[side.index()].clone()),
        fighters: names.clone(),
        wins: state.wins,
        rounds_played,
        ticks,
        sim_time_ms: session.now(),
        final_health: [
            session.character(Side::One).health(),
            session.character(Side::Two).health(),
        ],
        damage_dealt,
        abilities_used,
        projectiles_fired,
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("Duel Result");
            println!("===========");
            println!("{} vs {}", result.fighters[0], result.fighters[1]);
            println!(
                "Winner: {}",
                result.winner.as_deref().unwrap_or("draw / unfinished")
            );
            println!("Wins: {} - {}", result.wins[0], result.wins[1]);
            println!("Rounds played: {}", result.rounds_played);
            println!("Ticks: {} ({} ms)", result.ticks, result.sim_time_ms);
            println!(
                "Damage dealt: {} - {}",
                result.damage_dealt[0], result.damage_dealt[1]
            );
            println!("Seed: {}", result.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize result: {}", e),
            }
        }
    }
}
