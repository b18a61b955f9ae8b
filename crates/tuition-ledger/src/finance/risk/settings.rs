use super::classifier::{RiskBand, RiskClassifier};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Validated site-specific risk bands.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSettings {
    bands: Vec<RiskBand>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RiskSettingsDocument {
    Bands(Vec<RiskBand>),
    Wrapped { bands: Vec<RiskBand> },
}

impl RiskSettings {
    pub fn from_bands(bands: Vec<RiskBand>) -> Result<Self, RiskSettingsError> {
        for band in &bands {
            if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
                return Err(RiskSettingsError::InvalidBounds {
                    name: band.name.clone(),
                    min: band.min,
                    max: band.max,
                });
            }
        }
        Ok(Self { bands })
    }

    /// Accepts either a bare band array or `{ "bands": [...] }`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RiskSettingsError> {
        let document: RiskSettingsDocument = serde_json::from_reader(reader)?;
        let bands = match document {
            RiskSettingsDocument::Bands(bands) | RiskSettingsDocument::Wrapped { bands } => bands,
        };
        Self::from_bands(bands)
    }

    pub fn from_path(path: &Path) -> Result<Self, RiskSettingsError> {
        let file = File::open(path).map_err(|source| RiskSettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn bands(&self) -> &[RiskBand] {
        &self.bands
    }

    pub fn classifier(&self) -> RiskClassifier {
        RiskClassifier::select(Some(self.bands.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RiskSettingsError {
    #[error("unable to read risk settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("risk settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("risk band '{name}' has invalid bounds [{min}, {max})")]
    InvalidBounds { name: String, min: f64, max: f64 },
}
