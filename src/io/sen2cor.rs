//! Metadata extractor for the Sen2Cor (ESA Level-2A) dialect.
//!
//! Identification, characteristics, organisation, and spectral responses
//! live in the product-level document; the acquisition angles live in a
//! granule-level document located by splitting the first image path at
//! `IMG_DATA` and appending `MTD_TL.xml`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use roxmltree::{Document, Node};
use tracing::{debug, info};

use super::product::{BandFiles, MetadataExtractor, Product, RsrSource};
use super::{MetadataError, xml};
use crate::core::geometry::{self, collect_viewing_angles, solar_mean_angles, viewing_mean_angles};
use crate::core::rsr::{Quantification, RsrTable, SpectralBand, build_rsr_table};
use crate::types::{Dialect, NanPolicy};

fn band_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_B(.+?)_").expect("band token pattern is valid"))
}

pub struct Sen2corExtractor {
    text: String,
    output_dir: PathBuf,
    nan_policy: NanPolicy,
    product: Product,
}

impl Sen2corExtractor {
    /// The Sen2Cor path has always skipped NaN viewing-angle entries.
    pub const DEFAULT_NAN_POLICY: NanPolicy = NanPolicy::Skip;

    pub fn new(
        xml_path: &Path,
        output_dir: &Path,
        nan_policy: Option<NanPolicy>,
    ) -> Result<Self, MetadataError> {
        let text = xml::load_document_text(xml_path)?;
        Document::parse(&text)?;
        Ok(Sen2corExtractor {
            text,
            output_dir: output_dir.to_path_buf(),
            nan_policy: nan_policy.unwrap_or(Self::DEFAULT_NAN_POLICY),
            product: Product::new(xml_path, Dialect::Sen2cor),
        })
    }

    fn xml_dir(&self) -> PathBuf {
        self.product
            .xml_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// First element child of the root, `General_Info` in conforming documents.
fn general_info<'a, 'd>(root: Node<'a, 'd>) -> Result<Node<'a, 'd>, MetadataError> {
    xml::element_children(root)
        .next()
        .ok_or(MetadataError::MissingElement("General_Info"))
}

/// `B02` → `B2`, `8A` → `B8A`: numeric part loses its padding, a trailing
/// detector letter is kept.
fn normalize_band_token(token: &str, file: &str) -> Result<String, MetadataError> {
    let parse = |digits: &str| {
        digits
            .parse::<u32>()
            .map_err(|_| MetadataError::BandParse(file.to_string()))
    };
    if token.contains('A') {
        let digits = &token[..token.len() - 1];
        Ok(format!("B{}A", parse(digits)?))
    } else {
        Ok(format!("B{}", parse(token)?))
    }
}

impl MetadataExtractor for Sen2corExtractor {
    fn identify(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let info = general_info(doc.root_element())?;

        self.product.name = xml::require_text(info, "Product_Info/PRODUCT_URI")?.to_string();
        self.product.authority = None;
        Ok(())
    }

    fn characteristics(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let info = general_info(doc.root_element())?;

        self.product.platform =
            xml::require_text(info, "Product_Info/Datatake/SPACECRAFT_NAME")?.to_string();

        if let Some(node) = xml::find(info, "Product_Info/PRODUCT_START_TIME") {
            match DateTime::parse_from_rfc3339(xml::text(node)) {
                Ok(dt) => self.product.acquisition_date = Some(dt.date_naive()),
                Err(e) => debug!("acquisition date not parseable: {}", e),
            }
        }

        let band_list: Vec<String> = xml::find_all(
            info,
            "Product_Image_Characteristics/Spectral_Information_List/Spectral_Information",
        )
        .iter()
        .filter_map(|n| n.attribute("physicalBand").map(String::from))
        .collect();
        if band_list.is_empty() {
            info!("No band id list found - Product characteristics");
        }
        self.product.band_list = band_list;
        Ok(())
    }

    fn geometry(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let info = general_info(doc.root_element())?;

        let img_store = xml::require_text(
            info,
            "Product_Info/Product_Organisation/Granule_List/Granule/IMAGE_FILE",
        )?;
        let prefix = img_store.split("IMG_DATA").next().unwrap_or("");
        let granule_path = self.xml_dir().join(format!("{}MTD_TL.xml", prefix));
        if !granule_path.is_file() {
            return Err(MetadataError::MissingGranuleMetadata(granule_path));
        }

        let granule_text = xml::load_document_text(&granule_path)?;
        let granule_doc = Document::parse(&granule_text)?;
        // Second child of the granule root, `Geometric_Info` in conforming
        // documents.
        let geometric = xml::element_children(granule_doc.root_element())
            .nth(1)
            .ok_or(MetadataError::MissingElement("Geometric_Info"))?;

        let solar = solar_mean_angles(xml::find(geometric, "Tile_Angles/Mean_Sun_Angle"));

        let entries = xml::find(geometric, "Tile_Angles/Mean_Viewing_Incidence_Angle_List")
            .map(|l| collect_viewing_angles(l, "band_id"))
            .unwrap_or_default();
        let (sensor_zenith, sensor_azimuth) = viewing_mean_angles(&entries, self.nan_policy);

        self.product.solar_zenith_angle = solar.zenith;
        self.product.sensor_zenith_angle = sensor_zenith;
        self.product.solar_sensor_azimuth_angle =
            geometry::relative_azimuth(solar.azimuth, sensor_azimuth);
        Ok(())
    }

    fn organisation(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let info = general_info(doc.root_element())?;
        let granule = xml::require(
            info,
            "Product_Info/Product_Organisation/Granule_List/Granule",
        )?;

        let image_format = xml::attr_string(granule, "imageFormat")?;
        if image_format != "JPEG2000" {
            return Err(MetadataError::UnsupportedImageFormat(image_format));
        }

        let xml_dir = self.xml_dir();
        let mut entries = Vec::new();
        for file in xml::element_children(granule).filter(|n| n.has_tag_name("IMAGE_FILE")) {
            let name = xml::text(file);
            if !name.contains("_B") {
                // TCI, SCL and the other non-spectral rasters.
                debug!("ignoring non-band image entry `{}`", name);
                continue;
            }

            let token = band_token_regex()
                .captures(name)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| MetadataError::BandParse(name.to_string()))?;
            let band = normalize_band_token(token, name)?;

            let tail = name.split('_').next_back().unwrap_or("");
            if tail.len() < 2 {
                return Err(MetadataError::BandParse(name.to_string()));
            }
            let resolution = tail[..tail.len() - 1]
                .parse::<u32>()
                .map_err(|_| MetadataError::BandParse(name.to_string()))?;

            entries.push((band, resolution, xml_dir.join(format!("{}.jp2", name))));
        }
        self.product.band_files = BandFiles::Sen2cor { entries };
        Ok(())
    }

    fn resolutions(&mut self) -> Result<(), MetadataError> {
        let doc = Document::parse(&self.text)?;
        let info = general_info(doc.root_element())?;
        for band in xml::find_all(
            info,
            "Product_Image_Characteristics/Spectral_Information_List/Spectral_Information",
        ) {
            let id = xml::attr_string(band, "physicalBand")?;
            let res = xml::parse_u32("RESOLUTION", xml::require_text(band, "RESOLUTION")?)?;
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
        let info = general_info(doc.root_element())?;

        let quant_list = xml::require(
            info,
            "Product_Image_Characteristics/QUANTIFICATION_VALUES_LIST",
        )?;
        let quantification = Quantification {
            reflectance: xml::parse_f64(
                "BOA_QUANTIFICATION_VALUE",
                xml::require_text(quant_list, "BOA_QUANTIFICATION_VALUE")?,
            )?,
            water_vapor: xml::parse_f64(
                "WVP_QUANTIFICATION_VALUE",
                xml::require_text(quant_list, "WVP_QUANTIFICATION_VALUE")?,
            )?,
            aerosol: xml::parse_f64(
                "AOT_QUANTIFICATION_VALUE",
                xml::require_text(quant_list, "AOT_QUANTIFICATION_VALUE")?,
            )?,
        };

        // One irradiance per band, in spectral-information order.
        let mut solar_list = Vec::new();
        for node in xml::find_all(
            info,
            "Product_Image_Characteristics/Reflectance_Conversion/Solar_Irradiance_List/SOLAR_IRRADIANCE",
        ) {
            solar_list.push(xml::parse_f64("SOLAR_IRRADIANCE", xml::text(node))?);
        }

        let mut spectral_bands = Vec::new();
        for (r, band) in xml::find_all(
            info,
            "Product_Image_Characteristics/Spectral_Information_List/Spectral_Information",
        )
        .iter()
        .enumerate()
        {
            let band = *band;
            let band_id = xml::attr_string(band, "physicalBand")?;
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
                solar_irradiance: *solar_list
                    .get(r)
                    .ok_or(MetadataError::MissingElement("SOLAR_IRRADIANCE"))?,
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
