//! Naming of source URLs and of the on-disk artifact tree.
//!
//! ```text
//! <root>/group_001/item_001.pcm       final artifact
//! <root>/group_001/item_001.mp3       kept source (keep_source)
//! <root>/group_001/._tmp_1.mp3        scratch download, one per global index
//! ```

use std::path::{Path, PathBuf};

use url::Url;

use crate::catalog::Position;
use crate::config::{ConfigError, RecitaConfig};

#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
    base_url: Url,
    group_prefix: String,
    item_prefix: String,
    extension: String,
    source_extension: String,
}

impl ArtifactLayout {
    pub fn from_config(cfg: &RecitaConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&cfg.source.base_url).map_err(|e| ConfigError::BaseUrl {
            url: cfg.source.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::BaseUrl {
                url: cfg.source.base_url.clone(),
                reason: "cannot be a base URL".to_string(),
            });
        }
        Ok(Self {
            root: cfg.root.clone(),
            base_url,
            group_prefix: cfg.layout.group_prefix.clone(),
            item_prefix: cfg.layout.item_prefix.clone(),
            extension: cfg.layout.extension.clone(),
            source_extension: cfg.source.extension.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension of final artifacts.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn group_dir(&self, group: u32) -> PathBuf {
        self.root.join(format!("{}{:03}", self.group_prefix, group))
    }

    fn item_stem(&self, pos: Position) -> String {
        format!("{}{:03}", self.item_prefix, pos.offset)
    }

    pub fn final_path(&self, pos: Position) -> PathBuf {
        self.group_dir(pos.group)
            .join(format!("{}.{}", self.item_stem(pos), self.extension))
    }

    /// Retained source next to its final artifact.
    pub fn kept_source_path(&self, pos: Position) -> PathBuf {
        self.group_dir(pos.group)
            .join(format!("{}.{}", self.item_stem(pos), self.source_extension))
    }

    /// Scratch download path, unique per global index so workers never share one.
    pub fn scratch_path(&self, global: u32, pos: Position) -> PathBuf {
        self.group_dir(pos.group)
            .join(format!("._tmp_{}.{}", global, self.source_extension))
    }

    /// `<base-url>/<global>.<source-ext>`
    pub fn source_url(&self, global: u32) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&format!("{}.{}", global, self.source_extension));
        }
        url.into()
    }
}
