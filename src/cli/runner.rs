use std::path::PathBuf;

use tracing::info;

use bvpro::api::{self, OtbCliToolkit, ProductOptions};
use bvpro::core::params::load_config;
use bvpro::core::pipeline::generate_model;
use bvpro::io::product::RsrSource;

use super::args::CliArgs;
use super::errors::AppError;

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    if !args.xml.is_file() {
        return Err(AppError::InvalidXmlPath(args.xml.clone()).into());
    }

    let output_dir: PathBuf = match args.output_dir {
        Some(dir) => dir,
        None => std::env::var_os("BVPRO_RESULT_DIR")
            .map(PathBuf::from)
            .ok_or(AppError::MissingArgument {
                arg: "--output-dir (or $BVPRO_RESULT_DIR)".to_string(),
            })?,
    };
    std::fs::create_dir_all(&output_dir)?;

    let config = load_config(&args.config)?;

    let rsr = if args.extract_rsr {
        RsrSource::Extract
    } else {
        let path = args.rsr_path.ok_or(AppError::MissingArgument {
            arg: "--rsr-path".to_string(),
        })?;
        RsrSource::External(path)
    };

    let options = ProductOptions {
        output_dir: output_dir.clone(),
        nan_policy: args.nan_policy,
        rsr,
    };
    let mut product = api::open_product(&args.xml, &options)?;
    info!("Product {} ({})", product.name, product.platform);
    info!(
        "Angles: solar zenith {}, sensor zenith {}, relative azimuth {}",
        product.solar_zenith_angle,
        product.sensor_zenith_angle,
        product.solar_sensor_azimuth_angle
    );

    api::select_bands(&mut product, &args.bands)?;
    info!("Filtered RSR file: {:?}", product.rsr_file);

    let (resolution, stack) = api::resolve_band_stack(&product, args.nature, args.resolution)?;
    info!("Band stack at {}m:", resolution);
    for (band, path) in product.selected_band_list.iter().zip(&stack) {
        info!("  {} -> {:?}", band, path);
    }

    if args.generate_model {
        let toolkit = OtbCliToolkit::default();
        let model = generate_model(&toolkit, &product, &config, &output_dir)?;
        info!("Model file: {:?}", model.model_file);
        info!("Normalization file: {:?}", model.norm_file);
    }

    Ok(())
}
