//! Command-line driver: resolves auto battles between two rosters.
//!
//! ```text
//! xianzhan-duel --allies sword_disciple,herb_maiden --enemies stone_golem:1 --battles 100
//! RUST_LOG=xianzhan_core=debug xianzhan-duel --allies tide_monk --enemies fox_spirit --log
//! ```

use std::fs;
use std::ops::Range;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use xianzhan_authority::BattleAuthority;
use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
use xianzhan_core::{BattleConfig, BattlePhase, Side};

/// Resolve auto battles between two rosters
#[derive(Parser)]
#[command(name = "xianzhan-duel")]
#[command(about = "Resolve Xianzhan auto battles", long_about = None)]
#[command(version)]
struct Cli {
    /// Ally roster as comma-separated `template[:level_offset]` entries
    #[arg(long, value_delimiter = ',', required = true)]
    allies: Vec<String>,

    /// Enemy roster as comma-separated `template[:level_offset]` entries
    #[arg(long, value_delimiter = ',', required = true)]
    enemies: Vec<String>,

    /// Seed of the first battle; later battles use the following seeds
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of battles to resolve
    #[arg(long, default_value_t = 1)]
    battles: u64,

    /// Content catalog JSON file (defaults to the builtin catalog)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Battle config JSON file (defaults to the standard tuning)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each battle log as JSON
    #[arg(long)]
    log: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let seeds = seed_range(cli.seed, cli.battles)?;

    let catalog = match &cli.content {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading content from {}", path.display()))?;
            ContentCatalog::from_json(&json)
                .with_context(|| format!("loading content from {}", path.display()))?
        }
        None => ContentCatalog::builtin(),
    };
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            BattleConfig::from_json(&json)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => BattleConfig::default(),
    };

    let encounter = EncounterDef::new(parse_roster(&cli.allies)?, parse_roster(&cli.enemies)?);
    let mut authority = BattleAuthority::new(catalog, config);
    for seed in seeds.clone() {
        authority
            .open_auto(&encounter, seed)
            .with_context(|| format!("opening battle with seed {seed}"))?;
    }
    authority.run_auto()?;

    let mut victories = 0;
    for (id, seed) in authority.ids().collect::<Vec<_>>().into_iter().zip(seeds) {
        let snapshot = authority.snapshot(id)?;
        let state = &snapshot.state;
        if snapshot.phase == BattlePhase::Victory {
            victories += 1;
        }
        let standing = |side| {
            state
                .side(side)
                .filter(|u| u.is_alive())
                .map(|u| format!("{} ({}/{})", u.name(), u.hp(), u.max_hp()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "battle {id} seed {seed}: {:?} after {} rounds, digest {:016x}",
            snapshot.phase, snapshot.round, snapshot.digest
        );
        println!("  allies standing:  {}", standing(Side::Allies));
        println!("  enemies standing: {}", standing(Side::Enemies));
        if cli.log {
            println!("{}", serde_json::to_string_pretty(state.log())?);
        }
    }
    println!("{victories}/{} victories", cli.battles);

    Ok(())
}

/// Seeds of `battles` consecutive battles starting at `seed`.
fn seed_range(seed: u64, battles: u64) -> Result<Range<u64>> {
    if battles == 0 {
        bail!("--battles must be at least 1");
    }
    let Some(end) = seed.checked_add(battles) else {
        bail!("--seed {seed} plus --battles {battles} overflows the seed range");
    };
    Ok(seed..end)
}

/// Parses `template[:level_offset]` entries.
fn parse_roster(entries: &[String]) -> Result<Vec<RosterEntry>> {
    entries
        .iter()
        .map(|entry| {
            let (template, offset) = match entry.split_once(':') {
                Some((template, offset)) => (
                    template,
                    offset
                        .parse()
                        .with_context(|| format!("bad level offset in '{entry}'"))?,
                ),
                None => (entry.as_str(), 0),
            };
            if template.is_empty() {
                bail!("empty template name in '{entry}'");
            }
            Ok(RosterEntry::new(template, offset))
        })
        .collect()
}
