//! Band selection against the product's image organisation: existence
//! checks, resolution reconciliation, and per-band image file resolution
//! with the Sen2Cor tier-fallback rules.
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::io::product::BandFiles;
use crate::types::ReflectanceNature;

/// Native Sen2Cor resolution tiers, metres.
pub const FINE_TIER: u32 = 10;
pub const MID_TIER: u32 = 20;
pub const COARSE_TIER: u32 = 60;

/// Bands distributed at a single native tier: B1 and B9 only at 60 m,
/// B8 only at 10 m.
const EXCLUSIVE_BANDS: [&str; 3] = ["B1", "B9", "B8"];

#[derive(Debug, Error)]
pub enum BandError {
    #[error("Band {0} couldn't be found")]
    NotFound(String),

    #[error("Selected band number ({requested}) differs from image path selection ({resolved})")]
    SelectionMismatch { requested: usize, resolved: usize },
}

/// Every requested band must appear at least once among the product's
/// band-path entries.
pub fn verify_band_list(
    bands: &BandFiles,
    nature: ReflectanceNature,
    selection: &[String],
) -> Result<(), BandError> {
    for band in selection {
        let exists = bands.band_ids(nature).any(|id| id == band);
        if !exists {
            return Err(BandError::NotFound(band.clone()));
        }
    }
    Ok(())
}

/// Pick the resolution to mosaic at when the caller did not fix one: the
/// coarsest (numerically largest) native resolution among the selected
/// bands. Bands spanning more than one native resolution are reported.
pub fn check_resolution(
    resolutions: &HashMap<String, u32>,
    selection: &[String],
) -> Result<u32, BandError> {
    let mut native: Vec<(&str, u32)> = Vec::with_capacity(selection.len());
    for band in selection {
        let res = resolutions
            .get(band)
            .ok_or_else(|| BandError::NotFound(band.clone()))?;
        native.push((band.as_str(), *res));
    }

    let coarsest = native
        .iter()
        .map(|(_, r)| *r)
        .max()
        .ok_or_else(|| BandError::NotFound("<empty selection>".to_string()))?;

    let distinct: BTreeSet<u32> = native.iter().map(|(_, r)| *r).collect();
    if distinct.len() > 1 {
        info!(
            "All bands do not share one native resolution: {:?}. The coarsest will be used: {}m",
            native, coarsest
        );
    } else {
        info!("Single resolution found in selected bands: {}m", coarsest);
    }
    Ok(coarsest)
}

/// Resolve one image file path per selected band at the requested
/// resolution, in selection order.
///
/// Muscate products carry one resolution-homogenized file per band and
/// nature, so the lookup is direct. Sen2Cor products store every tier
/// separately: an exact `(band, resolution)` match wins; a tier-exclusive
/// band falls back to its sole native tier; otherwise 10 m requests fall
/// back to 20 m and 20 m requests to 60 m. A band that still resolves to
/// nothing is an error, as is any final count mismatch.
pub fn select_band(
    bands: &BandFiles,
    nature: ReflectanceNature,
    selection: &[String],
    resolution: u32,
) -> Result<Vec<PathBuf>, BandError> {
    let mut paths: Vec<PathBuf> = Vec::with_capacity(selection.len());

    match bands {
        BandFiles::Muscate { .. } => {
            // One image per band at a product-wide resolution; selection by id.
            let list = bands.muscate_list(nature);
            for band in selection {
                for (id, path) in list {
                    if id == band {
                        paths.push(path.clone());
                    }
                }
            }
        }
        BandFiles::Sen2cor { entries } => {
            for band in selection {
                let mut found = false;
                for (id, res, path) in entries {
                    if id == band && *res == resolution {
                        paths.push(path.clone());
                        found = true;
                    }
                }

                if !found && EXCLUSIVE_BANDS.contains(&band.as_str()) {
                    for (id, _, path) in entries {
                        if id == band {
                            paths.push(path.clone());
                            found = true;
                        }
                    }
                }

                if !found {
                    let fallback = match resolution {
                        FINE_TIER => Some(MID_TIER),
                        MID_TIER => Some(COARSE_TIER),
                        _ => None,
                    };
                    if let Some(tier) = fallback {
                        for (id, res, path) in entries {
                            if id == band && *res == tier {
                                paths.push(path.clone());
                                found = true;
                            }
                        }
                    }
                }

                if !found {
                    return Err(BandError::NotFound(band.clone()));
                }
            }
        }
    }

    if paths.len() != selection.len() {
        return Err(BandError::SelectionMismatch {
            requested: selection.len(),
            resolved: paths.len(),
        });
    }
    Ok(paths)
}
