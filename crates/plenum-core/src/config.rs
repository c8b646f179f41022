//! Settings shared by the store and the CLI.
//!
//! Loaded from an optional TOML file; the CLI layers flags and `PLENUM_*`
//! environment variables on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// What the segmenter does with a speech node that has no speaker line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSpeakerPolicy {
    /// Skip the node entirely.
    #[default]
    Drop,
    /// Emit one utterance with empty speaker and affiliation.
    EmitEmpty,
}

/// On-disk format of the per-date match tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Raw floor-session XML documents.
    pub protocol_dir: PathBuf,
    /// Segmented utterances, one JSON file per date.
    pub utterance_dir: PathBuf,
    /// Diarized transcript CSVs, one per recording.
    pub transcript_dir: PathBuf,
    /// Per-date match tables.
    pub matched_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub missing_speaker: MissingSpeakerPolicy,
    pub match_format: TableFormat,
}

impl Default for Settings {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            protocol_dir: data.join("protocols"),
            utterance_dir: data.join("utterances"),
            transcript_dir: data.join("transcripts"),
            matched_dir: data.join("matched"),
            ledger_path: data.join("matched").join("ledger.csv"),
            missing_speaker: MissingSpeakerPolicy::default(),
            match_format: TableFormat::default(),
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Defaults, or the file's contents when a path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
