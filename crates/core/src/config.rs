use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub rules: RulesConfig,
    pub sync: SyncConfig,
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `METAGAME_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("METAGAME_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            rules: RulesConfig::from_env_profiled(p),
            sync: SyncConfig::from_env_profiled(p),
            classifier: ClassifierConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  rules:       dir={}, debounce={}ms, known_formats=[{}]",
            self.rules.rules_dir.display(),
            self.rules.debounce_ms,
            self.rules.known_formats.join(", ")
        );
        tracing::info!(
            "  sync:        enabled={}, remote={}, branch={}, timeout={}s",
            self.sync.enabled,
            self.sync.remote,
            self.sync.branch.as_deref().unwrap_or("(tracking)"),
            self.sync.timeout_secs
        );
        tracing::info!("  classifier:  min_fallback_score={}", self.classifier.min_fallback_score);
    }
}

// ── Rules repository ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Root of the rule repository: one directory per format.
    pub rules_dir: PathBuf,
    /// Formats registered even before their directory exists.
    pub known_formats: Vec<String>,
    /// Window in which bursts of filesystem events collapse into one reload.
    pub debounce_ms: u64,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        let known_formats = profiled_env_opt(p, "RULES_KNOWN_FORMATS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            rules_dir: PathBuf::from(profiled_env_or(p, "RULES_DIR", "data/archetypes")),
            known_formats,
            debounce_ms: profiled_env_u64(p, "RULES_DEBOUNCE_MS", 500),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("data/archetypes"),
            known_formats: Vec::new(),
            debounce_ms: 500,
        }
    }
}

// ── Remote sync ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub enabled: bool,
    pub remote: String,
    /// Branch to pull; `None` pulls the checked-out branch's upstream.
    pub branch: Option<String>,
    pub timeout_secs: u64,
}

impl SyncConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "RULES_SYNC_ENABLED", false),
            remote: profiled_env_or(p, "RULES_SYNC_REMOTE", "origin"),
            branch: profiled_env_opt(p, "RULES_SYNC_BRANCH"),
            timeout_secs: profiled_env_u64(p, "RULES_SYNC_TIMEOUT_SECS", 30),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote: "origin".to_string(),
            branch: None,
            timeout_secs: 30,
        }
    }
}

// ── Classifier ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum fallback similarity, as a percentage, for a fallback to count.
    pub min_fallback_score: f64,
}

impl ClassifierConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            min_fallback_score: profiled_env_f64(p, "FALLBACK_MIN_SCORE", 10.0),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { min_fallback_score: 10.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_prefixed_key_wins() {
        env::set_var("CFGTEST_RULES_DEBOUNCE_MS", "1250");
        env::set_var("CFGTEST_RULES_KNOWN_FORMATS", "Modern, Legacy,,Pauper");
        let config = Config::for_profile("cfgtest");
        assert_eq!(config.profile, "CFGTEST");
        assert_eq!(config.rules.debounce_ms, 1250);
        assert_eq!(config.rules.known_formats, vec!["Modern", "Legacy", "Pauper"]);
        env::remove_var("CFGTEST_RULES_DEBOUNCE_MS");
        env::remove_var("CFGTEST_RULES_KNOWN_FORMATS");
    }

    #[test]
    fn defaults_are_sane() {
        let rules = RulesConfig::default();
        assert_eq!(rules.debounce(), Duration::from_millis(500));
        assert_eq!(SyncConfig::default().timeout(), Duration::from_secs(30));
        assert_eq!(ClassifierConfig::default().min_fallback_score, 10.0);
    }
}
