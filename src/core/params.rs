//! Run configuration loaded from a JSON file, covering the synthetic
//! distribution parameters, training options, and artifact filenames the
//! external applications consume.
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::BioVariable;

/// Parameters suitable for config files and batch presets. Artifact
/// filenames are relative; they are placed under the output directory and
/// prefixed by the product name at pipeline time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub vrt_name: String,
    pub nb_samples: Option<u64>,
    pub bv_filename: String,
    pub minlai: Option<f64>,
    pub maxlai: Option<f64>,
    pub modlai: Option<f64>,
    pub stdlai: Option<f64>,
    pub distlai: Option<String>,
    #[serde(rename = "useVI")]
    pub use_vi: Option<String>,
    pub training_file: String,
    pub invert_bv: Option<BioVariable>,
    pub rsr_file: Option<String>,
    pub output_file: String,
    pub noisestd: Option<f64>,
    pub bestof: Option<u32>,
    pub regressor: Option<String>,
    pub model_file: String,
    pub simulate: bool,
    pub add_angles: bool,
    pub red_index: u32,
    pub nir_index: u32,
    pub nthreads: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            vrt_name: "_output_VRT.tif".to_string(),
            nb_samples: None,
            bv_filename: "bv-input-vars.txt".to_string(),
            minlai: None,
            maxlai: None,
            modlai: None,
            stdlai: None,
            distlai: None,
            use_vi: None,
            training_file: "training.txt".to_string(),
            invert_bv: None,
            rsr_file: None,
            output_file: "simus.txt".to_string(),
            noisestd: None,
            bestof: None,
            regressor: None,
            model_file: "model.txt".to_string(),
            simulate: true,
            add_angles: false,
            red_index: 0,
            nir_index: 0,
            nthreads: 2,
        }
    }
}

const KNOWN_KEYS: [&str; 22] = [
    "vrt_name",
    "nb_samples",
    "bv_filename",
    "minlai",
    "maxlai",
    "modlai",
    "stdlai",
    "distlai",
    "useVI",
    "training_file",
    "invert_bv",
    "rsr_file",
    "output_file",
    "noisestd",
    "bestof",
    "regressor",
    "model_file",
    "simulate",
    "add_angles",
    "red_index",
    "nir_index",
    "nthreads",
];

/// Load a JSON configuration file. Unknown keys are reported and ignored;
/// missing values fall back to the defaults and are validated where they
/// are actually needed, at pipeline time.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        return Err(crate::error::Error::InvalidConfigPath(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    if let Some(map) = value.as_object() {
        let known: HashSet<&str> = KNOWN_KEYS.iter().copied().collect();
        for key in map.keys() {
            if !known.contains(key.as_str()) {
                info!("Attribute {} is not used in the run configuration", key);
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}
