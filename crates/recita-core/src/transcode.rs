//! External transcoder (ffmpeg) invocation and the raw PCM format contract.
//!
//! Final artifacts are headerless PCM; nothing in the bytes says how they were
//! encoded, so every consumer works from a [`PcmFormat`] supplied by config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::{ConfigError, TranscoderConfig};

/// Layout of raw PCM artifacts: little-endian signed (or unsigned 8-bit) samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bytes_per_sample: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            bytes_per_sample: 2,
        }
    }
}

impl PcmFormat {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.sample_format().is_none() {
            return Err(ConfigError::SampleWidth(self.bytes_per_sample));
        }
        Ok(())
    }

    /// ffmpeg raw sample format name (`-f`), e.g. `s16le`.
    pub fn sample_format(&self) -> Option<&'static str> {
        match self.bytes_per_sample {
            1 => Some("u8"),
            2 => Some("s16le"),
            4 => Some("s32le"),
            _ => None,
        }
    }

    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bytes_per_sample)
    }

    /// Playback length implied by a byte count under this format.
    pub fn duration_secs(&self, bytes: u64) -> f64 {
        let rate = self.bytes_per_second();
        if rate == 0 {
            return 0.0;
        }
        bytes as f64 / rate as f64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}{detail}")]
    Failed {
        program: String,
        status: String,
        detail: String,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("unsupported sample width: {0} bytes")]
    Format(u16),
}

/// Conversion to and probing of raw PCM artifacts.
pub trait Transcode: Send + Sync {
    /// Converts `input` into a raw PCM file at `output` (overwriting it).
    fn convert(&self, input: &Path, output: &Path, format: &PcmFormat) -> Result<(), TranscodeError>;

    /// Attempts to decode `path` as raw PCM in `format`, discarding the output.
    fn probe(&self, path: &Path, format: &PcmFormat) -> Result<(), TranscodeError>;
}

/// The ffmpeg command-line tool.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    pub program: PathBuf,
    pub probe_timeout: Duration,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            probe_timeout: Duration::from_secs(15),
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl Ffmpeg {
    pub fn from_config(cfg: &TranscoderConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            probe_timeout: Duration::from_secs(cfg.probe_timeout_secs),
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// `-y -loglevel error -nostdin -i <in> -f s16le -acodec pcm_s16le -ac <ch> -ar <rate> <out>`
    pub fn convert_command(&self, input: &Path, output: &Path, format: &PcmFormat) -> Result<Command, TranscodeError> {
        let fmt = format
            .sample_format()
            .ok_or(TranscodeError::Format(format.bytes_per_sample))?;
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .args(["-loglevel", "error", "-nostdin"])
            .arg("-i")
            .arg(input)
            .args(["-f", fmt])
            .args(["-acodec", &format!("pcm_{fmt}")])
            .args(["-ac", &format.channels.to_string()])
            .args(["-ar", &format.sample_rate.to_string()])
            .arg(output);
        Ok(cmd)
    }

    /// `-loglevel error -nostdin -f s16le -ar <rate> -ac <ch> -i <file> -f wav -`
    pub fn probe_command(&self, path: &Path, format: &PcmFormat) -> Result<Command, TranscodeError> {
        let fmt = format
            .sample_format()
            .ok_or(TranscodeError::Format(format.bytes_per_sample))?;
        let mut cmd = Command::new(&self.program);
        cmd.args(["-loglevel", "error", "-nostdin"])
            .args(["-f", fmt])
            .args(["-ar", &format.sample_rate.to_string()])
            .args(["-ac", &format.channels.to_string()])
            .arg("-i")
            .arg(path)
            .args(["-f", "wav", "-"]);
        Ok(cmd)
    }
}

impl Transcode for Ffmpeg {
    fn convert(&self, input: &Path, output: &Path, format: &PcmFormat) -> Result<(), TranscodeError> {
        let mut cmd = self.convert_command(input, output, format)?;
        tracing::debug!(command = ?cmd, "running transcoder");
        let out = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| TranscodeError::Spawn {
                program: self.program_name(),
                source,
            })?;
        if out.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        let detail = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| format!(": {}", l.trim()))
            .unwrap_or_default();
        Err(TranscodeError::Failed {
            program: self.program_name(),
            status: out.status.to_string(),
            detail,
        })
    }

    fn probe(&self, path: &Path, format: &PcmFormat) -> Result<(), TranscodeError> {
        let mut cmd = self.probe_command(path, format)?;
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TranscodeError::Spawn {
                program: self.program_name(),
                source,
            })?;

        // A timeout too large to represent means no deadline.
        let deadline = Instant::now().checked_add(self.probe_timeout);
        loop {
            let polled = child.try_wait().map_err(|source| TranscodeError::Spawn {
                program: self.program_name(),
                source,
            })?;
            if let Some(status) = polled {
                if status.success() {
                    return Ok(());
                }
                return Err(TranscodeError::Failed {
                    program: self.program_name(),
                    status: status.to_string(),
                    detail: String::new(),
                });
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TranscodeError::Timeout {
                    program: self.program_name(),
                    timeout: self.probe_timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}
