//! Solar-irradiance interpolation and standalone RSR file utilities.
//!
//! `generate_rsr_file` merges an external per-sensor spectral response table
//! with solar irradiances interpolated from a reference table;
//! `rsr_select_bands` projects an RSR file down to a subset of its spectral
//! columns.
use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::rsr::RsrError;

/// Sentinel returned for queries outside the reference table's domain.
pub const OUT_OF_RANGE: f64 = -1.0;

/// Two-point linear interpolation of `(wavelength, irradiance)` samples.
/// The table is scanned pairwise; the first bracketing pair wins. Queries
/// outside the table yield [`OUT_OF_RANGE`].
pub fn linear_interpolate(wavelength: f64, table: &[(f64, f64)]) -> f64 {
    for pair in table.windows(2) {
        let (prev, prev_value) = pair[0];
        let (next, next_value) = pair[1];
        if prev <= wavelength && next >= wavelength {
            return (next_value - prev_value) / (next - prev) * (wavelength - prev) + prev_value;
        }
    }
    OUT_OF_RANGE
}

/// Read the first two columns of a reference RSR file as
/// `(wavelength, solar irradiance)` pairs. A leading header row is skipped.
pub fn read_solar_reference(path: &Path) -> Result<Vec<(f64, f64)>, RsrError> {
    if !path.is_file() {
        return Err(RsrError::InvalidPath(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let mut table = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (Some(wl), Some(solar)) = (fields.next(), fields.next()) else {
            continue;
        };
        match (wl.parse::<f64>(), solar.parse::<f64>()) {
            (Ok(wl), Ok(solar)) => table.push((wl, solar)),
            _ if i == 0 => continue,
            _ => {
                return Err(RsrError::Number {
                    value: format!("{} {}", wl, solar),
                });
            }
        }
    }
    Ok(table)
}

/// Build an RSR file from a per-sensor spectral response table that lacks
/// solar irradiance. Each input row keeps its wavelength sampling; the
/// second output column is the reference table's irradiance interpolated at
/// that exact wavelength, followed by the input's band columns.
pub fn generate_rsr_file(input: &Path, reference: &Path, output: &Path) -> Result<(), RsrError> {
    let reference_solar = read_solar_reference(reference)?;

    if !input.is_file() {
        return Err(RsrError::InvalidPath(input.to_path_buf()));
    }
    let content = fs::read_to_string(input)?;
    let mut out = fs::File::create(output)?;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(wl_field) = fields.first() else {
            continue;
        };
        let wl: f64 = wl_field.parse().map_err(|_| RsrError::Number {
            value: wl_field.to_string(),
        })?;
        let solar = linear_interpolate(wl, &reference_solar);
        writeln!(out, "{} {} {}", wl_field, solar, fields[1..].join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Project an RSR file down to a subset of its spectral columns.
///
/// Band indices are 1-based positions among the columns following the
/// wavelength and solar-irradiance columns, and are sorted ascending before
/// projection regardless of input order. Every line, header included, is
/// projected uniformly.
pub fn rsr_select_bands(input: &Path, output: &Path, bands: &[usize]) -> Result<(), RsrError> {
    let mut bands: Vec<usize> = bands.to_vec();
    bands.sort_unstable();
    info!(
        "Selecting bands {}",
        bands.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(", ")
    );

    if !input.is_file() {
        return Err(RsrError::InvalidPath(input.to_path_buf()));
    }
    let content = fs::read_to_string(input)?;
    let mut out = fs::File::create(output)?;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        let mut row = format!("{} {}", fields[0], fields[1]);
        for &b in &bands {
            let field = fields.get(b + 1).ok_or(RsrError::InvalidBandIndex {
                index: b,
                columns: fields.len().saturating_sub(2),
            })?;
            row.push(' ');
            row.push_str(field);
        }
        writeln!(out, "{}", row)?;
    }
    out.flush()?;
    Ok(())
}
