//! Model-generation driver: wires the product geometry, the filtered RSR
//! file, and the run configuration into the external toolkit applications.
//!
//! All numeric work (radiative transfer simulation, regression learning,
//! image inversion) happens inside those applications; this module only
//! assembles named parameters, runs each stage in order, and checks that
//! everything a stage needs was actually configured.
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use super::params::RunConfig;
use crate::error::{Error, Result};
use crate::io::product::Product;

/// One named parameter passed to a toolkit application.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Ordered named parameters for one application invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppParams {
    entries: Vec<(String, ParamValue)>,
}

impl AppParams {
    pub fn new() -> Self {
        AppParams::default()
    }

    pub fn str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.push((key.to_string(), ParamValue::Str(value.into())));
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.entries.push((key.to_string(), ParamValue::Int(value)));
        self
    }

    pub fn float(mut self, key: &str, value: f64) -> Self {
        self.entries.push((key.to_string(), ParamValue::Float(value)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Synchronous invocation of one black-box toolkit application: set named
/// parameters, execute, let the application write its output artifact.
pub trait Toolkit {
    fn run(&self, application: &str, params: &AppParams) -> Result<()>;
}

/// Default toolkit: spawns `otbcli_<Application>` with `-key value`
/// arguments, optionally from a configured binary directory.
#[derive(Debug, Clone, Default)]
pub struct OtbCliToolkit {
    pub bin_dir: Option<PathBuf>,
}

impl Toolkit for OtbCliToolkit {
    fn run(&self, application: &str, params: &AppParams) -> Result<()> {
        let binary = format!("otbcli_{}", application);
        let program = match &self.bin_dir {
            Some(dir) => dir.join(&binary),
            None => PathBuf::from(&binary),
        };

        let mut command = Command::new(&program);
        for (key, value) in params.iter() {
            command.arg(format!("-{}", key));
            command.arg(value.to_string());
        }

        info!("Executing {:?}", command);
        let status = command.status().map_err(|e| Error::Toolkit {
            application: application.to_string(),
            reason: e.to_string(),
        })?;
        if !status.success() {
            return Err(Error::Toolkit {
                application: application.to_string(),
                reason: format!("exit status {}", status),
            });
        }
        Ok(())
    }
}

/// Normalize a configured artifact filename: a path already under the
/// output directory is used as-is, anything else is placed there prefixed
/// with the product name.
pub fn check_path(file: &str, output_dir: &Path, product_name: &str) -> PathBuf {
    let candidate = Path::new(file);
    if candidate.starts_with(output_dir) {
        candidate.to_path_buf()
    } else {
        output_dir.join(format!("{}_{}", product_name, file))
    }
}

/// Files produced by model generation and consumed by the inversion.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub model_file: PathBuf,
    pub norm_file: PathBuf,
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(Error::MissingParameter { name })
}

/// Run the three model-generation applications in sequence:
/// input-variable generation, training-data simulation, model learning.
pub fn generate_model(
    toolkit: &dyn Toolkit,
    product: &Product,
    config: &RunConfig,
    output_dir: &Path,
) -> Result<ModelArtifacts> {
    let nb_samples = require(config.nb_samples, "nb_samples")?;
    let minlai = require(config.minlai, "minlai")?;
    let maxlai = require(config.maxlai, "maxlai")?;
    let modlai = require(config.modlai, "modlai")?;
    let stdlai = require(config.stdlai, "stdlai")?;
    let distlai = require(config.distlai.as_deref(), "distlai")?;
    let noisestd = require(config.noisestd, "noisestd")?;
    let invert_bv = require(config.invert_bv, "invert_bv")?;
    let bestof = require(config.bestof, "bestof")?;
    let regressor = require(config.regressor.as_deref(), "regressor")?;

    let bv_file = check_path(&config.bv_filename, output_dir, &product.name);
    let training_file = check_path(&config.training_file, output_dir, &product.name);
    let model_file = check_path(&config.model_file, output_dir, &product.name);
    let simus_file = check_path(&config.output_file, output_dir, &product.name);
    let norm_file = output_dir.join(format!("{}_normalization.txt", product.name));

    info!(
        "Generating Input BV distribution file ({} samples) with parameters:",
        nb_samples
    );
    info!("minlai = {}", minlai);
    info!("maxlai = {}", maxlai);
    info!("modlai = {}", modlai);
    info!("stdlai = {}", stdlai);
    toolkit.run(
        "BVInputVariableGeneration",
        &AppParams::new()
            .int("samples", nb_samples as i64)
            .float("minlai", minlai)
            .float("maxlai", maxlai)
            .float("modlai", modlai)
            .float("stdlai", stdlai)
            .str("distlai", distlai)
            .str("out", bv_file.to_string_lossy()),
    )?;
    info!("--------------------------------");
    info!("--- BV Input File generated  ---");
    info!("--------------------------------");

    info!("Generating TrainingData with parameters:");
    info!("solarZenithAngle = {}", product.solar_zenith_angle);
    info!("sensorZenithAngle = {}", product.sensor_zenith_angle);
    info!("solarSensorAzimuth = {}", product.solar_sensor_azimuth_angle);
    toolkit.run(
        "ProSailSimulator",
        &AppParams::new()
            .str("bvfile", bv_file.to_string_lossy())
            .str("rsrfile", product.rsr_file.to_string_lossy())
            .str("out", simus_file.to_string_lossy())
            .float("solarzenith", product.solar_zenith_angle as f64)
            .float("sensorzenith", product.sensor_zenith_angle as f64)
            .float("azimuth", product.solar_sensor_azimuth_angle as f64)
            .float("noisestd", noisestd)
            .int("bvindex", invert_bv.index() as i64)
            .str("trainingfile", training_file.to_string_lossy())
            .int("threads", config.nthreads as i64),
    )?;
    info!("--------------------------------");
    info!("--- Training Data generated  ---");
    info!("--------------------------------");

    info!("Learning BV Model using:");
    info!("training file = {:?}", training_file);
    info!("model file = {:?}", model_file);
    info!("regression type = {}", regressor);
    info!("norm file = {:?}", norm_file);
    toolkit.run(
        "InverseModelLearning",
        &AppParams::new()
            .str("training", training_file.to_string_lossy())
            .str("out", model_file.to_string_lossy())
            .str("regression", regressor)
            .str("normalization", norm_file.to_string_lossy())
            .int("bestof", bestof as i64),
    )?;
    info!("--------------------------------");
    info!("---     BV Model learned     ---");
    info!("--------------------------------");

    Ok(ModelArtifacts {
        model_file,
        norm_file,
    })
}

/// Invert a mosaicked reflectance image through a learned model.
pub fn invert_image(
    toolkit: &dyn Toolkit,
    input_image: &Path,
    model: &ModelArtifacts,
    output_image: &Path,
) -> Result<()> {
    if !input_image.is_file() {
        return Err(Error::InvalidInputPath(input_image.to_path_buf()));
    }
    if !model.model_file.is_file() {
        return Err(Error::InvalidInputPath(model.model_file.clone()));
    }

    toolkit.run(
        "BVImageInversion",
        &AppParams::new()
            .str("in", input_image.to_string_lossy())
            .str("model", model.model_file.to_string_lossy())
            .str("normalization", model.norm_file.to_string_lossy())
            .str("out", output_image.to_string_lossy()),
    )?;
    info!("--------------------------------");
    info!("---  Image inversion done    ---");
    info!("--------------------------------");
    Ok(())
}
