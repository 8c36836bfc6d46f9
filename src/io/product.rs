//! Normalized, sensor-agnostic product model and the extraction interface
//! both metadata dialects implement.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::MetadataError;
use crate::core::rsr::RsrTable;
use crate::types::{Dialect, ReflectanceNature};

/// Band-to-image-file organisation, variant by dialect.
///
/// Muscate products ship two parallel per-band file lists split by
/// reflectance nature; Sen2Cor products ship one `(band, resolution, path)`
/// list with every native tier stored separately, pre-resampled bands
/// included.
#[derive(Debug, Clone)]
pub enum BandFiles {
    Muscate {
        fre: Vec<(String, PathBuf)>,
        sre: Vec<(String, PathBuf)>,
    },
    Sen2cor {
        entries: Vec<(String, u32, PathBuf)>,
    },
}

impl BandFiles {
    /// Band ids present in the organisation, for the given nature when the
    /// dialect distinguishes one.
    pub fn band_ids(&self, nature: ReflectanceNature) -> impl Iterator<Item = &str> {
        let pairs: Vec<&str> = match self {
            BandFiles::Muscate { .. } => self
                .muscate_list(nature)
                .iter()
                .map(|(id, _)| id.as_str())
                .collect(),
            BandFiles::Sen2cor { entries } => {
                entries.iter().map(|(id, _, _)| id.as_str()).collect()
            }
        };
        pairs.into_iter()
    }

    /// The Muscate per-band list for the given reflectance nature.
    /// Empty for Sen2Cor products.
    pub fn muscate_list(&self, nature: ReflectanceNature) -> &[(String, PathBuf)] {
        match self {
            BandFiles::Muscate { fre, sre } => match nature {
                ReflectanceNature::Fre => fre,
                ReflectanceNature::Sre => sre,
            },
            BandFiles::Sen2cor { .. } => &[],
        }
    }
}

/// Where the product's spectral responses come from.
#[derive(Debug, Clone)]
pub enum RsrSource {
    /// Extract from the metadata document itself.
    Extract,
    /// Load an externally supplied RSR file.
    External(PathBuf),
}

/// Normalized in-memory representation of one satellite product, populated
/// by the sequential extractor stages.
#[derive(Debug, Clone)]
pub struct Product {
    pub xml_path: PathBuf,
    pub dialect: Dialect,

    /// Unique product identifier, namespace prefix for derived artifacts.
    pub name: String,
    pub platform: String,
    pub authority: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    /// Band ids declared by the product characteristics, dialect-spelled.
    pub band_list: Vec<String>,

    /// Floored degrees.
    pub solar_zenith_angle: i64,
    pub sensor_zenith_angle: i64,
    /// Signed difference of the floored solar and sensor azimuths.
    pub solar_sensor_azimuth_angle: i64,

    /// Native resolution in metres per band id.
    pub resolutions: HashMap<String, u32>,
    pub band_files: BandFiles,

    pub rsr: Option<RsrTable>,
    /// Full generated (or externally supplied) RSR table.
    pub ref_rsr_file: PathBuf,
    /// Band-filtered RSR table consumed by the simulator.
    pub rsr_file: PathBuf,

    pub selected_band_list: Vec<String>,
}

impl Product {
    pub fn new(xml_path: &Path, dialect: Dialect) -> Self {
        Product {
            xml_path: xml_path.to_path_buf(),
            dialect,
            name: String::new(),
            platform: String::new(),
            authority: None,
            acquisition_date: None,
            band_list: Vec::new(),
            solar_zenith_angle: 0,
            sensor_zenith_angle: 0,
            solar_sensor_azimuth_angle: 0,
            resolutions: HashMap::new(),
            band_files: match dialect {
                Dialect::Muscate => BandFiles::Muscate {
                    fre: Vec::new(),
                    sre: Vec::new(),
                },
                Dialect::Sen2cor => BandFiles::Sen2cor { entries: Vec::new() },
            },
            rsr: None,
            ref_rsr_file: PathBuf::new(),
            rsr_file: PathBuf::new(),
            selected_band_list: Vec::new(),
        }
    }

    /// Derived artifact paths, `<output_dir>/<name>` plus suffix.
    pub fn rsr_paths(output_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
        (
            output_dir.join(format!("{}_rsrFile.rsr", name)),
            output_dir.join(format!("{}_rsrFileFiltered.rsr", name)),
        )
    }
}

/// The extraction stages every dialect provides, run in sequence:
/// identification, characteristics, geometry, organisation, resolutions,
/// then spectral responses.
pub trait MetadataExtractor {
    fn identify(&mut self) -> Result<(), MetadataError>;
    fn characteristics(&mut self) -> Result<(), MetadataError>;
    fn geometry(&mut self) -> Result<(), MetadataError>;
    fn organisation(&mut self) -> Result<(), MetadataError>;
    fn resolutions(&mut self) -> Result<(), MetadataError>;
    fn rsr(&mut self, source: &RsrSource) -> Result<(), MetadataError>;
    fn finish(self: Box<Self>) -> Product;
}
