//! classifier-worker: archetype rule engine host process.
//!
//! `watch` keeps rule snapshots in step with the rule repository until
//! Ctrl-C. `classify` and `stats` load the repository once and print JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use metagame_core::config::{load_dotenv, Config};
use metagame_core::{Deck, DeckList};
use metagame_rules::classifier::StaticCardColors;
use metagame_rules::model::Format;
use metagame_rules::sync::GitSync;
use metagame_rules::{Classifier, ReloadManager, ReloadOptions, RuleLoader, RuleStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Decklist archetype classifier with hot-reloaded rules.
#[derive(Parser, Debug)]
#[command(name = "classifier-worker", version, about)]
struct Cli {
    /// Config profile; keys are looked up as `{PROFILE}_{KEY}` first.
    #[arg(long, env = "METAGAME_PROFILE", default_value = "")]
    profile: String,

    /// Rule repository root (one directory per format). Overrides RULES_DIR.
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Debounce window for filesystem events, in milliseconds.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Run `git pull` in the rule repository before each reload.
    #[arg(long)]
    sync: bool,

    /// Upper bound on a single sync, in seconds.
    #[arg(long)]
    sync_timeout_secs: Option<u64>,

    /// Minimum fallback similarity, in percent.
    #[arg(long)]
    min_fallback_score: Option<f64>,

    /// JSON table of card colors (`{"Lightning Bolt": "R"}`) used to prefix
    /// names of rules with `IncludeColorInName`.
    #[arg(long, env = "CARD_COLORS_FILE")]
    card_colors: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the rule repository and hot-reload changed formats.
    Watch,
    /// Classify one decklist and print the result.
    Classify {
        /// Format whose rules to apply.
        #[arg(long)]
        format: String,
        /// JSON decklist: {"Mainboard":[{"Name":..,"Count":..}],"Sideboard":[..]}
        #[arg(long)]
        deck: PathBuf,
    },
    /// Print per-format rule statistics.
    Stats,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.rules_dir {
            config.rules.rules_dir = dir.clone();
        }
        if let Some(ms) = self.debounce_ms {
            config.rules.debounce_ms = ms;
        }
        if self.sync {
            config.sync.enabled = true;
        }
        if let Some(secs) = self.sync_timeout_secs {
            config.sync.timeout_secs = secs;
        }
        if let Some(score) = self.min_fallback_score {
            config.classifier.min_fallback_score = score;
        }
    }
}

// ── Wiring ──────────────────────────────────────────────────────────

fn build_manager(config: &Config) -> ReloadManager {
    let store = Arc::new(RuleStore::new());
    for name in &config.rules.known_formats {
        store.register_format(Format::from(name.as_str()));
    }

    let options = ReloadOptions::from_config(&config.rules, &config.sync);
    let manager = ReloadManager::new(store, RuleLoader::new(&config.rules.rules_dir), options);
    if config.sync.enabled {
        manager.with_sync(Arc::new(GitSync::new(
            config.sync.remote.clone(),
            config.sync.branch.clone(),
        )))
    } else {
        manager
    }
}

fn build_classifier(
    manager: &ReloadManager,
    config: &Config,
    card_colors: Option<&Path>,
) -> anyhow::Result<Classifier> {
    let classifier = Classifier::new(Arc::clone(manager.store()))
        .with_min_fallback_score(config.classifier.min_fallback_score);
    let Some(path) = card_colors else {
        return Ok(classifier);
    };
    let table = StaticCardColors::from_path(path)
        .with_context(|| format!("failed to load card colors from {}", path.display()))?;
    info!(path = %path.display(), cards = table.len(), "loaded card colors");
    Ok(classifier.with_card_colors(Arc::new(table)))
}

async fn watch(manager: ReloadManager) -> anyhow::Result<()> {
    let store = Arc::clone(manager.store());
    manager.subscribe(move |formats| {
        for format in formats {
            if let Some(stats) = store.stats(format) {
                info!(
                    format = %stats.format,
                    archetypes = stats.archetypes,
                    fallbacks = stats.fallbacks,
                    version = stats.version,
                    "rules reloaded"
                );
            }
        }
    });

    let (handle, reports) = manager
        .start_with_initial_load()
        .await
        .context("failed to start rule watcher")?;
    let failed: usize = reports.iter().map(|r| r.failed()).sum();
    info!(formats = reports.len(), failed, "initial rule load complete");
    info!("classifier-worker running, Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
    }
    info!("shutting down");
    handle.shutdown().await;
    Ok(())
}

fn classify(
    manager: &ReloadManager,
    classifier: &Classifier,
    format: &str,
    deck: &Path,
) -> anyhow::Result<()> {
    let list = DeckList::from_path(deck)
        .with_context(|| format!("failed to read deck {}", deck.display()))?;

    let format = Format::from(format);
    let report = manager.reload_format(&format);
    if report.failed() > 0 {
        warn!(format = %format, failed = report.failed(), "some rule files failed to load");
    }

    let result = classifier.classify(&format, &Deck::from(&list));
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn stats(manager: &ReloadManager) -> anyhow::Result<()> {
    manager.force_reload_all();
    println!("{}", serde_json::to_string_pretty(&manager.store().all_stats())?);
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Logs go to stderr so `classify`/`stats` output stays clean JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::for_profile(&cli.profile);
    cli.apply(&mut config);
    config.log_summary();

    let manager = build_manager(&config);
    match &cli.command {
        Command::Watch => watch(manager).await?,
        Command::Classify { format, deck } => {
            let classifier = build_classifier(&manager, &config, cli.card_colors.as_deref())?;
            classify(&manager, &classifier, format, deck)?
        }
        Command::Stats => stats(&manager)?,
    }

    info!("classifier-worker exited cleanly");
    Ok(())
}
