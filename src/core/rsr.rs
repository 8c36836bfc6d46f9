//! Relative Spectral Response table construction and file handling.
//!
//! Raw per-band spectral curves sampled on different wavelength grids are
//! merged onto one shared axis (the union of all per-band grids, in
//! first-seen order), radiometrically un-scaled, and serialized as a
//! whitespace-delimited text table. Wavelengths are kept as integer
//! nanometres internally and only converted to micrometres at the file
//! boundary, so per-band insertion is an integer lookup rather than a
//! floating-point equality test.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Band carrying the water-vapor content product rather than reflectance.
pub const WATER_VAPOR_BAND: &str = "B1";
/// Band carrying the aerosol optical thickness product.
pub const AEROSOL_BAND: &str = "B2";

#[derive(Debug, Error)]
pub enum RsrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RSR File path is invalid: {0}")]
    InvalidPath(PathBuf),

    #[error("band `{band}`: {expected} wavelength samples but {actual} response values")]
    Malformed {
        band: String,
        expected: usize,
        actual: usize,
    },

    #[error("RSR file couldn't be generated: {0} is empty")]
    EmptyOutput(PathBuf),

    #[error("column `{0}` not present in RSR header")]
    MissingColumn(String),

    #[error("band index {index} outside the {columns} spectral columns")]
    InvalidBandIndex { index: usize, columns: usize },

    #[error("line {line}: expected {expected} fields, found {actual}")]
    RowLength {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid number `{value}` in RSR data")]
    Number { value: String },

    #[error("wavelength step must be a positive number of nanometres")]
    ZeroStep,
}

/// Raw spectral response of one band as read from the product metadata.
#[derive(Debug, Clone)]
pub struct SpectralBand {
    pub band_id: String,
    pub min_nm: u32,
    pub max_nm: u32,
    pub step_nm: u32,
    pub response: Vec<f64>,
    pub solar_irradiance: f64,
}

/// Digital-number scale factors declared by the product.
#[derive(Debug, Clone, Copy)]
pub struct Quantification {
    pub reflectance: f64,
    pub water_vapor: f64,
    pub aerosol: f64,
}

/// Wavelength samples of one band: `min, min+step, …` up to and including
/// the last value below `max + step`. May overshoot `max` when the range is
/// not step-divisible; the per-band response lists are sampled the same way.
pub fn band_axis_nm(min_nm: u32, max_nm: u32, step_nm: u32) -> Result<Vec<u32>, RsrError> {
    if step_nm == 0 {
        return Err(RsrError::ZeroStep);
    }
    Ok((min_nm..max_nm + step_nm)
        .step_by(step_nm as usize)
        .collect())
}

/// Unified RSR table: shared wavelength axis, solar irradiance, one
/// reflectance column per band.
#[derive(Debug, Clone, PartialEq)]
pub struct RsrTable {
    /// Column names: `Wavelength`, `SolarIrradiance`, then one per band.
    pub columns: Vec<String>,
    /// Union wavelength axis in nanometres, first-seen order.
    pub wavelengths_nm: Vec<u32>,
    pub solar_irradiance: Vec<f64>,
    /// One column per band, parallel to `columns[2..]`.
    pub bands: Vec<Vec<f64>>,
}

impl RsrTable {
    /// Wavelength axis in micrometres, as serialized.
    pub fn wavelengths_um(&self) -> Vec<f64> {
        self.wavelengths_nm.iter().map(|&w| w as f64 / 1000.0).collect()
    }

    pub fn band_column(&self, band_id: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .skip(2)
            .position(|c| c == band_id)
            .map(|i| self.bands[i].as_slice())
    }

    /// Serialize as a whitespace-delimited table: one header row of column
    /// names, one row per wavelength sample.
    pub fn write(&self, path: &Path) -> Result<(), RsrError> {
        let mut out = fs::File::create(path)?;
        writeln!(out, "{}", self.columns.join(" "))?;
        for (i, &wl) in self.wavelengths_nm.iter().enumerate() {
            let mut row = format!("{} {}", wl as f64 / 1000.0, self.solar_irradiance[i]);
            for band in &self.bands {
                row.push(' ');
                row.push_str(&band[i].to_string());
            }
            writeln!(out, "{}", row)?;
        }
        out.flush()?;

        if fs::metadata(path)?.len() == 0 {
            return Err(RsrError::EmptyOutput(path.to_path_buf()));
        }
        debug!("wrote RSR table with {} samples to {:?}", self.wavelengths_nm.len(), path);
        Ok(())
    }

    /// Load a table previously written by [`RsrTable::write`] or supplied
    /// externally in the same format.
    pub fn read(path: &Path) -> Result<Self, RsrError> {
        if !path.is_file() {
            return Err(RsrError::InvalidPath(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines();
        let header = lines.next().ok_or_else(|| RsrError::InvalidPath(path.to_path_buf()))?;
        let columns: Vec<String> = header.split_whitespace().map(String::from).collect();
        if columns.len() < 2 {
            return Err(RsrError::RowLength {
                line: 1,
                expected: 2,
                actual: columns.len(),
            });
        }

        let band_count = columns.len() - 2;
        let mut wavelengths_nm = Vec::new();
        let mut solar_irradiance = Vec::new();
        let mut bands = vec![Vec::new(); band_count];
        for (i, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != columns.len() {
                return Err(RsrError::RowLength {
                    line: i + 2,
                    expected: columns.len(),
                    actual: fields.len(),
                });
            }
            let um = parse_value(fields[0])?;
            wavelengths_nm.push((um * 1000.0).round() as u32);
            solar_irradiance.push(parse_value(fields[1])?);
            for (b, field) in fields[2..].iter().enumerate() {
                bands[b].push(parse_value(field)?);
            }
        }

        Ok(RsrTable {
            columns,
            wavelengths_nm,
            solar_irradiance,
            bands,
        })
    }
}

fn parse_value(value: &str) -> Result<f64, RsrError> {
    value.parse().map_err(|_| RsrError::Number {
        value: value.to_string(),
    })
}

/// Merge the raw per-band spectral curves into one table.
///
/// The shared axis is the union of the per-band grids in first-seen order
/// (not numerically sorted). Response values are un-scaled per band: the
/// water-vapor band by the water-vapor and reflectance quantifications, the
/// aerosol band by the aerosol and reflectance quantifications, every other
/// band by the reflectance quantification alone. The solar irradiance at a
/// shared sample is set by the first contributing band, then averaged
/// two-point with each later contributor.
pub fn build_rsr_table(
    spectral_bands: &[SpectralBand],
    quantification: &Quantification,
) -> Result<RsrTable, RsrError> {
    let mut wavelengths_nm: Vec<u32> = Vec::new();
    for band in spectral_bands {
        for w in band_axis_nm(band.min_nm, band.max_nm, band.step_nm)? {
            if !wavelengths_nm.contains(&w) {
                wavelengths_nm.push(w);
            }
        }
    }

    let samples = wavelengths_nm.len();
    let mut solar_irradiance = vec![0.0; samples];
    let mut bands = vec![vec![0.0; samples]; spectral_bands.len()];

    for (b, band) in spectral_bands.iter().enumerate() {
        let axis = band_axis_nm(band.min_nm, band.max_nm, band.step_nm)?;
        if band.response.len() != axis.len() {
            return Err(RsrError::Malformed {
                band: band.band_id.clone(),
                expected: axis.len(),
                actual: band.response.len(),
            });
        }

        let scale = if band.band_id == WATER_VAPOR_BAND {
            quantification.water_vapor * quantification.reflectance
        } else if band.band_id == AEROSOL_BAND {
            quantification.aerosol * quantification.reflectance
        } else {
            quantification.reflectance
        };

        for (n, &w) in axis.iter().enumerate() {
            let ind = wavelengths_nm
                .iter()
                .position(|&x| x == w)
                .expect("band axis values are inserted into the union axis above");
            bands[b][ind] = band.response[n] / scale;

            if solar_irradiance[ind] == 0.0 {
                solar_irradiance[ind] = band.solar_irradiance;
            } else {
                solar_irradiance[ind] = (solar_irradiance[ind] + band.solar_irradiance) / 2.0;
            }
        }
    }

    let mut columns = vec!["Wavelength".to_string(), "SolarIrradiance".to_string()];
    columns.extend(spectral_bands.iter().map(|b| b.band_id.clone()));

    Ok(RsrTable {
        columns,
        wavelengths_nm,
        solar_irradiance,
        bands,
    })
}

/// Project an RSR file down to the wavelength and irradiance columns plus
/// the selected bands, in that fixed order (selected bands keep the caller's
/// order). Rows are copied verbatim field-by-field, so filtering an already
/// filtered file by the same selection is byte-identical.
pub fn filter_rsr_file(src: &Path, dst: &Path, selected: &[String]) -> Result<(), RsrError> {
    if !src.is_file() {
        return Err(RsrError::InvalidPath(src.to_path_buf()));
    }
    let content = fs::read_to_string(src)?;
    let mut lines = content.lines();
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| RsrError::InvalidPath(src.to_path_buf()))?
        .split_whitespace()
        .collect();
    if header.len() < 2 {
        return Err(RsrError::RowLength {
            line: 1,
            expected: 2,
            actual: header.len(),
        });
    }

    let mut indices = vec![0usize, 1usize];
    for band in selected {
        let idx = header
            .iter()
            .position(|c| c == band)
            .ok_or_else(|| RsrError::MissingColumn(band.clone()))?;
        indices.push(idx);
    }

    let mut out = fs::File::create(dst)?;
    let header_row: Vec<&str> = indices.iter().map(|&i| header[i]).collect();
    writeln!(out, "{}", header_row.join(" "))?;
    for (i, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let mut row = Vec::with_capacity(indices.len());
        for &idx in &indices {
            let field = fields.get(idx).ok_or(RsrError::RowLength {
                line: i + 2,
                expected: header.len(),
                actual: fields.len(),
            })?;
            row.push(*field);
        }
        writeln!(out, "{}", row.join(" "))?;
    }
    out.flush()?;
    Ok(())
}
