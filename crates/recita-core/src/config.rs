use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::transcode::PcmFormat;

/// Default CDN serving one recording per global verse number.
pub const DEFAULT_BASE_URL: &str = "https://cdn.islamic.network/quran/audio/64/ar.alafasy";

/// Configuration that cannot be used to start a run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workers must be at least 1")]
    NoWorkers,
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("channel count must be positive")]
    ZeroChannels,
    #[error("unsupported sample width: {0} bytes (expected 1, 2 or 4)")]
    SampleWidth(u16),
    #[error("invalid source base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("retry.max_attempts must be at least 1")]
    NoAttempts,
    #[error("retry.{0} must be a non-negative number of seconds that fits a duration")]
    RetryDelay(&'static str),
}

/// Where recordings come from (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL; the global verse number and extension are appended.
    pub base_url: String,
    /// Extension of the fetched recordings (also used for kept intermediates).
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            extension: "mp3".to_string(),
        }
    }
}

/// Naming of the on-disk artifact tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub group_prefix: String,
    pub item_prefix: String,
    /// Extension of final artifacts.
    pub extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group_prefix: "group_".to_string(),
            item_prefix: "item_".to_string(),
            extension: "pcm".to_string(),
        }
    }
}

/// Retry policy parameters for source downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per item (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Linear jitter added per attempt, in seconds.
    pub jitter_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.75,
            jitter_secs: 0.05,
            max_delay_secs: 30,
        }
    }
}

/// External transcoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Program name or path of the ffmpeg binary.
    pub program: PathBuf,
    /// Wall-clock limit for a single decode probe.
    pub probe_timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            probe_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Filename prefix written by older layouts.
    pub legacy_prefix: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            legacy_prefix: "ayah_".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/recita/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitaConfig {
    /// Root of the artifact tree.
    pub root: PathBuf,
    /// Worker threads for fetch/convert.
    pub workers: usize,
    /// Delay between work item submissions, in milliseconds (0 = none).
    pub sleep_ms: u64,
    /// Keep fetched recordings next to the converted artifacts.
    pub keep_source: bool,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub format: PcmFormat,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
}

impl Default for RecitaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets/audio"),
            workers: 4,
            sleep_ms: 0,
            keep_source: false,
            source: SourceConfig::default(),
            format: PcmFormat::default(),
            layout: LayoutConfig::default(),
            retry: None,
            transcoder: TranscoderConfig::default(),
            migrate: MigrateConfig::default(),
        }
    }
}

impl RecitaConfig {
    /// Checks everything a run depends on before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        self.format.validate()?;
        url::Url::parse(&self.source.base_url).map_err(|e| ConfigError::BaseUrl {
            url: self.source.base_url.clone(),
            reason: e.to_string(),
        })?;
        for (name, value) in [
            ("source.extension", &self.source.extension),
            ("layout.group_prefix", &self.layout.group_prefix),
            ("layout.item_prefix", &self.layout.item_prefix),
            ("layout.extension", &self.layout.extension),
            ("migrate.legacy_prefix", &self.migrate.legacy_prefix),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        if let Some(r) = &self.retry {
            if r.max_attempts == 0 {
                return Err(ConfigError::NoAttempts);
            }
            for (name, secs) in [("base_delay_secs", r.base_delay_secs), ("jitter_secs", r.jitter_secs)] {
                if Duration::try_from_secs_f64(secs).is_err() {
                    return Err(ConfigError::RetryDelay(name));
                }
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(|r| RetryPolicy {
                max_attempts: r.max_attempts,
                base_delay: secs_or_zero(r.base_delay_secs),
                jitter: secs_or_zero(r.jitter_secs),
                max_delay: Duration::from_secs(r.max_delay_secs),
            })
            .unwrap_or_default()
    }
}

/// Out-of-range values are rejected by `validate()`; unvalidated ones fall back to zero.
fn secs_or_zero(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("recita")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RecitaConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RecitaConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RecitaConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RecitaConfig::default();
        assert_eq!(cfg.root, PathBuf::from("assets/audio"));
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.sleep_ms, 0);
        assert!(!cfg.keep_source);
        assert_eq!(cfg.format.sample_rate, 16_000);
        assert_eq!(cfg.format.channels, 1);
        assert_eq!(cfg.format.bytes_per_sample, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RecitaConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RecitaConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.root, cfg.root);
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.source.base_url, cfg.source.base_url);
        assert_eq!(parsed.layout.item_prefix, cfg.layout.item_prefix);
        assert_eq!(parsed.format, cfg.format);
    }

    #[test]
    fn config_toml_minimal_uses_section_defaults() {
        let toml = r#"
            root = "/srv/audio"
            workers = 8
            sleep_ms = 250
            keep_source = true
        "#;
        let cfg: RecitaConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.root, PathBuf::from("/srv/audio"));
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.sleep_ms, 250);
        assert!(cfg.keep_source);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.layout.extension, "pcm");
        assert_eq!(cfg.transcoder.program, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.migrate.legacy_prefix, "ayah_");
    }

    #[test]
    fn config_toml_retry_and_format() {
        let toml = r#"
            root = "out"
            workers = 2
            sleep_ms = 0
            keep_source = false

            [format]
            sample_rate = 22050
            channels = 1
            bytes_per_sample = 2

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            jitter_secs = 0.0
            max_delay_secs = 15
        "#;
        let cfg: RecitaConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.format.sample_rate, 22_050);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.jitter, Duration::ZERO);
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn missing_retry_section_uses_builtin_policy() {
        let cfg = RecitaConfig::default();
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(750));
        assert_eq!(policy.jitter, Duration::from_millis(50));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = RecitaConfig::default();
        cfg.workers = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoWorkers));

        let mut cfg = RecitaConfig::default();
        cfg.format.bytes_per_sample = 3;
        assert_eq!(cfg.validate(), Err(ConfigError::SampleWidth(3)));

        let mut cfg = RecitaConfig::default();
        cfg.source.base_url = "not a url".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::BaseUrl { .. })));

        let mut cfg = RecitaConfig::default();
        cfg.layout.item_prefix.clear();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Empty("layout.item_prefix"))
        );

        let mut cfg = RecitaConfig::default();
        cfg.retry = Some(RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        });
        assert_eq!(cfg.validate(), Err(ConfigError::NoAttempts));

        let mut cfg = RecitaConfig::default();
        cfg.retry = Some(RetryConfig {
            jitter_secs: -0.1,
            ..RetryConfig::default()
        });
        assert_eq!(cfg.validate(), Err(ConfigError::RetryDelay("jitter_secs")));
    }

    #[test]
    fn huge_retry_delay_is_rejected_without_panicking() {
        let mut cfg = RecitaConfig::default();
        cfg.retry = Some(RetryConfig {
            base_delay_secs: 1e20,
            ..RetryConfig::default()
        });
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RetryDelay("base_delay_secs"))
        );
        // Building the policy from an unvalidated config must not panic either.
        assert_eq!(cfg.retry_policy().base_delay, Duration::ZERO);

        let mut cfg = RecitaConfig::default();
        cfg.retry = Some(RetryConfig {
            jitter_secs: f64::NAN,
            ..RetryConfig::default()
        });
        assert_eq!(cfg.validate(), Err(ConfigError::RetryDelay("jitter_secs")));
    }
}
