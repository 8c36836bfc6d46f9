use clap::Parser;
use std::path::PathBuf;

use bvpro::{NanPolicy, ReflectanceNature};

#[derive(Parser)]
#[command(name = "bvpro", version, about = "BVPRO CLI")]
pub struct CliArgs {
    /// Product metadata XML file (Muscate or Sen2Cor)
    #[arg(short, long)]
    pub xml: PathBuf,

    /// JSON file with user config info
    #[arg(short, long)]
    pub config: PathBuf,

    /// Band list for image stack creation - bands to integrate
    #[arg(long, num_args = 1.., required = true)]
    pub bands: Vec<String>,

    /// Extract spectral responses from the XML file instead of reading an
    /// external RSR file
    #[arg(long, default_value_t = false)]
    pub extract_rsr: bool,

    /// Path to external RSR file if no RSR extraction from the XML file
    #[arg(long, required_unless_present = "extract_rsr")]
    pub rsr_path: Option<PathBuf>,

    /// Choice for image band selection - reflectance with or without slope
    /// correction (fre/sre) - only for Muscate products
    #[arg(long, value_enum, default_value_t = ReflectanceNature::Fre)]
    pub nature: ReflectanceNature,

    /// Fix the stack resolution in metres. Default configuration takes the
    /// coarsest native resolution among the selected bands.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Output directory for derived artifacts (falls back to
    /// $BVPRO_RESULT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Viewing-angle NaN handling (reset = historical, skip = strict);
    /// default depends on the dialect
    #[arg(long, value_enum)]
    pub nan_policy: Option<NanPolicy>,

    /// Generate the inversion model by invoking the external toolkit
    /// applications
    #[arg(long, default_value_t = false)]
    pub generate_model: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Set the logging output level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
