use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use bvpro::core::params::{RunConfig, load_config};
use bvpro::core::pipeline::{
    AppParams, ModelArtifacts, ParamValue, Toolkit, check_path, generate_model, invert_image,
};
use bvpro::io::product::Product;
use bvpro::{BioVariable, Dialect, Error};

/// Records every application invocation instead of spawning processes.
struct RecordingToolkit {
    calls: RefCell<Vec<(String, AppParams)>>,
}

impl RecordingToolkit {
    fn new() -> Self {
        RecordingToolkit {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Toolkit for RecordingToolkit {
    fn run(&self, application: &str, params: &AppParams) -> bvpro::Result<()> {
        self.calls
            .borrow_mut()
            .push((application.to_string(), params.clone()));
        Ok(())
    }
}

fn full_config() -> RunConfig {
    RunConfig {
        nb_samples: Some(1000),
        minlai: Some(0.0),
        maxlai: Some(8.0),
        modlai: Some(2.0),
        stdlai: Some(1.5),
        distlai: Some("lognormal".to_string()),
        invert_bv: Some(BioVariable::Mlai),
        noisestd: Some(0.01),
        bestof: Some(3),
        regressor: Some("nn".to_string()),
        ..RunConfig::default()
    }
}

fn product(output_dir: &Path) -> Product {
    let mut product = Product::new(Path::new("/data/MTD_MSIL2A.xml"), Dialect::Sen2cor);
    product.name = "S2A_TEST".to_string();
    product.solar_zenith_angle = 25;
    product.sensor_zenith_angle = 7;
    product.solar_sensor_azimuth_angle = -145;
    product.rsr_file = output_dir.join("S2A_TEST_rsrFileFiltered.rsr");
    product
}

#[test]
fn test_generate_model_runs_applications_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = RecordingToolkit::new();
    let product = product(dir.path());

    let artifacts = generate_model(&toolkit, &product, &full_config(), dir.path()).unwrap();

    let calls = toolkit.calls.borrow();
    let names: Vec<&str> = calls.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "BVInputVariableGeneration",
            "ProSailSimulator",
            "InverseModelLearning",
        ]
    );

    let (_, generation) = &calls[0];
    assert_eq!(generation.get("samples"), Some(&ParamValue::Int(1000)));
    assert_eq!(
        generation.get("out"),
        Some(&ParamValue::Str(
            dir.path()
                .join("S2A_TEST_bv-input-vars.txt")
                .to_string_lossy()
                .into_owned()
        ))
    );

    let (_, simulator) = &calls[1];
    assert_eq!(
        simulator.get("rsrfile"),
        Some(&ParamValue::Str(
            product.rsr_file.to_string_lossy().into_owned()
        ))
    );
    assert_eq!(simulator.get("solarzenith"), Some(&ParamValue::Float(25.0)));
    assert_eq!(simulator.get("azimuth"), Some(&ParamValue::Float(-145.0)));
    assert_eq!(simulator.get("bvindex"), Some(&ParamValue::Int(0)));

    let (_, learning) = &calls[2];
    assert_eq!(
        learning.get("regression"),
        Some(&ParamValue::Str("nn".to_string()))
    );
    assert_eq!(learning.get("bestof"), Some(&ParamValue::Int(3)));

    assert!(artifacts.model_file.ends_with("S2A_TEST_model.txt"));
    assert!(artifacts.norm_file.ends_with("S2A_TEST_normalization.txt"));
}

#[test]
fn test_generate_model_requires_configured_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = RecordingToolkit::new();
    let product = product(dir.path());

    let mut config = full_config();
    config.nb_samples = None;
    let result = generate_model(&toolkit, &product, &config, dir.path());
    assert!(matches!(
        result,
        Err(Error::MissingParameter { name: "nb_samples" })
    ));
    assert!(toolkit.calls.borrow().is_empty());
}

#[test]
fn test_check_path_prefixes_outside_output_dir() {
    let output_dir = PathBuf::from("/results");
    assert_eq!(
        check_path("training.txt", &output_dir, "S2A_TEST"),
        PathBuf::from("/results/S2A_TEST_training.txt")
    );
    // Already under the output directory: used as-is.
    assert_eq!(
        check_path("/results/custom.txt", &output_dir, "S2A_TEST"),
        PathBuf::from("/results/custom.txt")
    );
}

#[test]
fn test_invert_image_validates_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = RecordingToolkit::new();

    let model = ModelArtifacts {
        model_file: dir.path().join("model.txt"),
        norm_file: dir.path().join("norm.txt"),
    };
    let missing = dir.path().join("mosaic.tif");
    let result = invert_image(&toolkit, &missing, &model, &dir.path().join("lai.tif"));
    assert!(matches!(result, Err(Error::InvalidInputPath(_))));

    // With both inputs present the inversion application is invoked.
    fs::write(&missing, b"raster").unwrap();
    fs::write(&model.model_file, b"model").unwrap();
    invert_image(&toolkit, &missing, &model, &dir.path().join("lai.tif")).unwrap();
    let calls = toolkit.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "BVImageInversion");
}

#[test]
fn test_load_config_reads_values_and_ignores_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{
            "nb_samples": 5000,
            "minlai": 0.0,
            "maxlai": 6.0,
            "invert_bv": "FAPAR",
            "regressor": "svr",
            "useVI": "ndvi",
            "plot_output": "unused.png"
        }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.nb_samples, Some(5000));
    assert_eq!(config.maxlai, Some(6.0));
    assert_eq!(config.invert_bv, Some(BioVariable::Fapar));
    assert_eq!(config.use_vi.as_deref(), Some("ndvi"));
    // Defaults survive for everything the file leaves out.
    assert_eq!(config.training_file, "training.txt");
    assert_eq!(config.nthreads, 2);
    assert!(config.simulate);
}

#[test]
fn test_load_config_missing_file() {
    let result = load_config(Path::new("/definitely/not/here.json"));
    assert!(matches!(result, Err(Error::InvalidConfigPath(_))));
}

#[test]
fn test_bio_variable_indices() {
    assert_eq!(BioVariable::Mlai.index(), 0);
    assert_eq!(BioVariable::Fapar.index(), 11);
    assert_eq!(BioVariable::Fcover.index(), 12);
}
