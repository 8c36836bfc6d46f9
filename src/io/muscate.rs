//! Metadata extractor for the Muscate (Theia) dialect.
//!
//! One document carries everything: identification, product
//! characteristics, geometry, image organisation, resolutions, and the
//! per-band spectral responses with their quantification values.
use std::path::{Path, PathBuf};

use chrono::DateTime;
use roxmltree::Document;
use tracing::{debug, info, warn};

use super::product::{BandFiles, MetadataExtractor, Product, RsrSource};
use super::{MetadataError, xml};
use crate::core::geometry::{
    self, ViewingAngle, collect_viewing_angles, solar_mean_angles, viewing_mean_angles,
};
use crate::core::rsr::{Quantification, RsrTable, SpectralBand, build_rsr_table};
use crate::types::{Dialect, NanPolicy};

pub struct MuscateExtractor {
    text: String,
    output_dir: PathBuf,
    nan_policy: NanPolicy,
    product: Product,
}

impl MuscateExtractor {
    /// Muscate products were historically averaged with the
    /// denominator-reset NaN handling; that stays the default.
    pub const DEFAULT_NAN_POLICY: NanPolicy = NanPolicy::Reset;

    pub fn new(
        xml_path: &Path,
        output_dir: &Path,
        nan_policy: Option<NanPolicy>,
    ) -> Result<Self, MetadataError> {
        let text = xml::load_document_text(xml_path)?;
        Document::parse(&text)?;
        Ok(MuscateExtractor {
            text,
            output_dir: output_dir.to_path_buf(),
            nan_policy: nan_policy.unwrap_or(Self::DEFAULT_NAN_POLICY),
            product: Product::new(xml_path, Dialect::Muscate),
        })
    }
}

impl MetadataExtractor for MuscateExtractor {
    fn identify(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        let info = xml::require(root, "Dataset_Identification")?;

        self.product.name = xml::require_text(info, "IDENTIFIER")?.to_string();
        self.product.authority = xml::find(info, "AUTHORITY").map(|n| xml::text(n).to_string());
        Ok(())
    }

    fn characteristics(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        let info = xml::require(root, "Product_Characteristics")?;

        self.product.platform = xml::require_text(info, "PLATFORM")?.to_string();

        if let Some(node) = xml::find(info, "ACQUISITION_DATE") {
            match DateTime::parse_from_rfc3339(xml::text(node)) {
                Ok(dt) => self.product.acquisition_date = Some(dt.date_naive()),
                Err(e) => debug!("acquisition date not parseable: {}", e),
            }
        }

        let band_list: Vec<String> = xml::find_all(info, "Band_Global_List/BAND_ID")
            .iter()
            .map(|n| xml::text(*n).to_string())
            .collect();
        if band_list.is_empty() {
            info!("No band id list found - Product characteristics");
        }
        self.product.band_list = band_list;
        Ok(())
    }

    fn geometry(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        let geom = xml::require(root, "Geometric_Informations")?;

        let solar = solar_mean_angles(xml::find(geom, "Mean_Value_List/Sun_Angles"));

        let platform = xml::require_text(root, "Product_Characteristics/PLATFORM")?;
        let entries: Vec<ViewingAngle> = if platform.contains("SENTINEL2A") {
            xml::find(geom, "Mean_Value_List/Mean_Viewing_Incidence_Angle_List")
                .map(|l| collect_viewing_angles(l, "band_id"))
                .unwrap_or_default()
        } else if platform.contains("LANDSAT8") {
            // LANDSAT8 products carry no usable per-band incidence angles;
            // the organisation lists one zeroed entry per angle block.
            xml::find(geom, "Mean_Value_List/Incidence_Angles")
                .map(|l| {
                    xml::element_children(l)
                        .map(|_| ViewingAngle {
                            band_id: Some("B1".to_string()),
                            zenith: 0.0,
                            azimuth: 0.0,
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else if platform.contains("VENUS") {
            xml::find(geom, "Mean_Value_List/Mean_Viewing_Incidence_Angle_List")
                .map(|l| collect_viewing_angles(l, "detector_id"))
                .unwrap_or_default()
        } else {
            warn!("XML file does not contain sensor angles information");
            Vec::new()
        };

        let (sensor_zenith, sensor_azimuth) = viewing_mean_angles(&entries, self.nan_policy);

        self.product.solar_zenith_angle = solar.zenith;
        self.product.sensor_zenith_angle = sensor_zenith;
        self.product.solar_sensor_azimuth_angle =
            geometry::relative_azimuth(solar.azimuth, sensor_azimuth);
        Ok(())
    }

    fn organisation(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        let image_list = xml::require(root, "Product_Organisation/Muscate_Product/Image_List")?;
        let image_dir = self
            .product
            .xml_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut fre = Vec::new();
        let mut sre = Vec::new();
        for image in xml::element_children(image_list).filter(|n| n.has_tag_name("Image")) {
            let Some(nature) = xml::find(image, "Image_Properties/NATURE") else {
                continue;
            };
            let files = xml::find_all(image, "Image_File_List/IMAGE_FILE");
            let mut pairs = Vec::with_capacity(files.len());
            for file in files {
                pairs.push((
                    xml::attr_string(file, "band_id")?,
                    image_dir.join(xml::text(file)),
                ));
            }
            match xml::text(nature) {
                "Flat_Reflectance" => fre = pairs,
                "Surface_Reflectance" => sre = pairs,
                other => debug!("ignoring image list of nature `{}`", other),
            }
        }
        self.product.band_files = BandFiles::Muscate { fre, sre };
        Ok(())
    }

    fn resolutions(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        for band in xml::find_all(
            root,
            "Radiometric_Informations/Spectral_Band_Informations_List/Spectral_Band_Informations",
        ) {
            let id = xml::attr_string(band, "band_id")?;
            let res = xml::parse_u32(
                "SPATIAL_RESOLUTION",
                xml::require_text(band, "SPATIAL_RESOLUTION")?,
            )?;
            self.product.resolutions.insert(id, res);
        }
        Ok(())
    }

    fn rsr(&mut self, source: &RsrSource) -> Result<(), MetadataError> {
        let (ref_rsr, filtered_rsr) = Product::rsr_paths(&self.output_dir, &self.product.name);
        match source {
            RsrSource::External(path) => {
                self.product.rsr = Some(RsrTable::read(path)?);
                self.product.ref_rsr_file = path.clone();
                self.product.rsr_file = filtered_rsr;
                return Ok(());
            }
            RsrSource::Extract => {}
        }

        let doc = Document::parse(&self.text)?;
        let root = doc.root_element();
        let radio = xml::require(root, "Radiometric_Informations")?;

        let quantification = Quantification {
            reflectance: xml::parse_f64(
                "REFLECTANCE_QUANTIFICATION_VALUE",
                xml::require_text(radio, "REFLECTANCE_QUANTIFICATION_VALUE")?,
            )?,
            water_vapor: xml::parse_f64(
                "WATER_VAPOR_CONTENT_QUANTIFICATION_VALUE",
                xml::require_text(radio, "WATER_VAPOR_CONTENT_QUANTIFICATION_VALUE")?,
            )?,
            aerosol: xml::parse_f64(
                "AEROSOL_OPTICAL_THICKNESS_QUANTIFICATION_VALUE",
                xml::require_text(radio, "AEROSOL_OPTICAL_THICKNESS_QUANTIFICATION_VALUE")?,
            )?,
        };

        let mut spectral_bands = Vec::new();
        for band in xml::find_all(
            radio,
            "Spectral_Band_Informations_List/Spectral_Band_Informations",
        ) {
            let band_id = xml::attr_string(band, "band_id")?;
            let mut response = Vec::new();
            for value in xml::require_text(band, "Spectral_Response/VALUES")?.split_whitespace() {
                response.push(xml::parse_f64("Spectral_Response/VALUES", value)?);
            }
            spectral_bands.push(SpectralBand {
                band_id,
                min_nm: xml::parse_u32("Wavelength/MIN", xml::require_text(band, "Wavelength/MIN")?)?,
                max_nm: xml::parse_u32("Wavelength/MAX", xml::require_text(band, "Wavelength/MAX")?)?,
                step_nm: xml::parse_u32(
                    "Spectral_Response/STEP",
                    xml::require_text(band, "Spectral_Response/STEP")?,
                )?,
                response,
                solar_irradiance: xml::parse_f64(
                    "SOLAR_IRRADIANCE",
                    xml::require_text(band, "SOLAR_IRRADIANCE")?,
                )?,
            });
        }

        self.product.rsr = Some(build_rsr_table(&spectral_bands, &quantification)?);
        self.product.ref_rsr_file = ref_rsr;
        self.product.rsr_file = filtered_rsr;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Product {
        self.product
    }
}
