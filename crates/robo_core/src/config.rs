use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoboConfig {
    pub engagement: EngagementConfig,
    pub conversation: ConversationConfig,
    pub storage: StorageConfig,
    pub humanizer: HumanizerConfig,
    pub animation: AnimationConfig,
}

impl RoboConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: RoboConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ROBO_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ROBO_NAMESPACE") {
            self.storage.namespace = v;
        }
        if let Ok(v) = std::env::var("ROBO_THINKING_DELAY_MS") {
            if let Ok(n) = v.parse() {
                self.humanizer.thinking_delay_ms = n;
            }
        }
        if let Ok(v) = std::env::var("ROBO_HISTORY_CAPACITY") {
            if let Ok(n) = v.parse() {
                self.conversation.capacity = n;
            }
        }
        if let Ok(v) = std::env::var("ROBO_IDLE_SECS") {
            if let Ok(n) = v.parse() {
                self.engagement.idle_after_secs = n;
            }
        }
        if let Ok(v) = std::env::var("ROBO_BORED_SECS") {
            if let Ok(n) = v.parse() {
                self.engagement.bored_after_secs = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub idle_after_secs: u64,
    pub bored_after_secs: u64,
    /// Period of the external tick that re-evaluates engagement.
    pub tick_interval_ms: u64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            idle_after_secs: 10,
            bored_after_secs: 20,
            tick_interval_ms: 1000,
        }
    }
}

impl EngagementConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Most records kept; older ones are evicted first.
    pub capacity: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Prefix shared by every key this companion writes.
    pub namespace: String,
    /// Optional byte quota, counted at two bytes per character.
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("robo_data"),
            namespace: "robo_".to_string(),
            quota_bytes: None,
        }
    }
}

impl StorageConfig {
    pub fn catalog_key(&self) -> String {
        format!("{}responses", self.namespace)
    }

    pub fn conversation_key(&self) -> String {
        format!("{}conversations", self.namespace)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HumanizerConfig {
    /// Pause before a reply appears. Zero disables it.
    pub thinking_delay_ms: u64,
    /// How long the talking face stays up after a reply.
    pub talking_duration_ms: u64,
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: 500,
            talking_duration_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub blink_min_ms: u64,
    pub blink_max_ms: u64,
    pub blink_duration_ms: u64,
    pub look_min_ms: u64,
    pub look_max_ms: u64,
    pub look_hold_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            blink_min_ms: 3000,
            blink_max_ms: 6000,
            blink_duration_ms: 300,
            look_min_ms: 3000,
            look_max_ms: 7000,
            look_hold_ms: 1000,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
