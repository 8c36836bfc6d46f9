//! High-level, ergonomic library API: open a metadata document into a
//! normalized product, derive its RSR files, and resolve the per-band image
//! stack. Prefer these entrypoints over the low-level extractor types when
//! embedding BVPRO.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::bands::{check_resolution, select_band, verify_band_list};
use crate::core::rsr::filter_rsr_file;
use crate::error::Result;
use crate::io::product::{MetadataExtractor, Product, RsrSource};
use crate::io::{MuscateExtractor, Sen2corExtractor, xml};
use crate::types::{Dialect, NanPolicy, ReflectanceNature};

pub use crate::core::pipeline::{
    AppParams, ModelArtifacts, OtbCliToolkit, ParamValue, Toolkit, check_path, generate_model,
    invert_image,
};

/// Options for opening a product from its metadata document.
#[derive(Debug, Clone)]
pub struct ProductOptions {
    /// Directory derived artifacts are written to.
    pub output_dir: PathBuf,
    /// Override the dialect's default viewing-angle NaN handling.
    pub nan_policy: Option<NanPolicy>,
    pub rsr: RsrSource,
}

/// Parse a metadata document into a fully populated [`Product`].
///
/// The dialect is detected from the root tag, then the extraction stages
/// run in their required order: identification, characteristics, geometry,
/// organisation, resolutions, spectral responses. When the responses are
/// extracted from the document the full RSR table is written to
/// `<output_dir>/<name>_rsrFile.rsr`.
pub fn open_product(xml_path: &Path, options: &ProductOptions) -> Result<Product> {
    let text = xml::load_document_text(xml_path)?;
    let dialect = xml::detect_dialect(&text)?;
    info!("Choice for Parser --- {}", dialect);

    let mut extractor: Box<dyn MetadataExtractor> = match dialect {
        Dialect::Muscate => Box::new(MuscateExtractor::new(
            xml_path,
            &options.output_dir,
            options.nan_policy,
        )?),
        Dialect::Sen2cor => Box::new(Sen2corExtractor::new(
            xml_path,
            &options.output_dir,
            options.nan_policy,
        )?),
    };

    extractor.identify()?;
    extractor.characteristics()?;
    extractor.geometry()?;
    extractor.organisation()?;
    extractor.resolutions()?;
    extractor.rsr(&options.rsr)?;

    let product = extractor.finish();
    if matches!(options.rsr, RsrSource::Extract) {
        if let Some(table) = &product.rsr {
            table.write(&product.ref_rsr_file)?;
        }
    }
    Ok(product)
}

/// Record the user's band selection on the product and write the filtered
/// RSR file containing only those bands.
pub fn select_bands(product: &mut Product, bands: &[String]) -> Result<()> {
    product.selected_band_list = bands.to_vec();
    filter_rsr_file(&product.ref_rsr_file, &product.rsr_file, bands)?;
    Ok(())
}

/// Resolve the selected bands to concrete image files.
///
/// Without an explicit resolution the coarsest native resolution among the
/// selected bands is used. Returns the resolution actually applied together
/// with one path per selected band, in selection order.
pub fn resolve_band_stack(
    product: &Product,
    nature: ReflectanceNature,
    resolution: Option<u32>,
) -> Result<(u32, Vec<PathBuf>)> {
    verify_band_list(&product.band_files, nature, &product.selected_band_list)?;

    let resolution = match resolution {
        Some(res) => res,
        None => check_resolution(&product.resolutions, &product.selected_band_list)?,
    };
    info!("----- Use resolution of {}m -----", resolution);

    let paths = select_band(
        &product.band_files,
        nature,
        &product.selected_band_list,
        resolution,
    )?;
    Ok((resolution, paths))
}
