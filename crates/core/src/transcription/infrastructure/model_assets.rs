use std::path::{Path, PathBuf};

use crate::shared::constants::{
    COMPUTE_TYPE_ENV_VAR, DEFAULT_COMPUTE_TYPE, DEFAULT_DEVICE, DEVICE_ENV_VAR,
    MODEL_CONFIG_FILENAME, MODEL_WEIGHTS_FILENAME,
};
use crate::transcription::domain::error::StartupError;

/// Resolved model asset locations.
///
/// The startup contract: the model directory must already contain the
/// weights and configuration artifacts. Nothing is downloaded here —
/// provisioning is the deployment's job, and an incomplete directory is a
/// fatal startup error, not a per-request one.
#[derive(Clone, Debug)]
pub struct ModelAssets {
    dir: PathBuf,
    weights: PathBuf,
}

impl ModelAssets {
    pub fn resolve(dir: &Path) -> Result<Self, StartupError> {
        if !dir.is_dir() {
            return Err(StartupError::MissingModelDir(dir.to_path_buf()));
        }
        for name in [MODEL_WEIGHTS_FILENAME, MODEL_CONFIG_FILENAME] {
            if !dir.join(name).is_file() {
                return Err(StartupError::MissingAsset {
                    name,
                    dir: dir.to_path_buf(),
                });
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            weights: dir.join(MODEL_WEIGHTS_FILENAME),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn weights(&self) -> &Path {
        &self.weights
    }
}

/// Engine execution mode, read from the environment at startup.
///
/// Not part of the protocol payload: requests cannot change the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub device: String,
    pub compute_type: String,
}

impl DeviceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            device: get(DEVICE_ENV_VAR).unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            compute_type: get(COMPUTE_TYPE_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_COMPUTE_TYPE.to_string()),
        }
    }

    pub fn use_gpu(&self) -> bool {
        self.device != "cpu"
    }
}
