//! Acquisition-geometry extraction shared by both metadata dialects.
//! Angles are floored to whole degrees; the relative azimuth is the signed
//! difference between the floored solar and sensor azimuths.
use roxmltree::Node;
use tracing::warn;

use crate::io::xml;
use crate::types::NanPolicy;

/// Mean zenith/azimuth pair for one band or detector.
#[derive(Debug, Clone)]
pub struct ViewingAngle {
    pub band_id: Option<String>,
    pub zenith: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarAngles {
    pub zenith: i64,
    pub azimuth: i64,
}

/// Read the mean solar angles from a `Sun_Angles`/`Mean_Sun_Angle` node.
///
/// The node must carry exactly two element children, `ZENITH_ANGLE` then
/// `AZIMUTH_ANGLE`, in that order. Any other shape degrades to zero angles
/// with a warning so slightly nonconforming products keep flowing.
pub fn solar_mean_angles(sun_angles: Option<Node>) -> SolarAngles {
    if let Some(node) = sun_angles {
        let children: Vec<Node> = xml::element_children(node).collect();
        if children.len() == 2
            && children[0].has_tag_name("ZENITH_ANGLE")
            && children[1].has_tag_name("AZIMUTH_ANGLE")
        {
            let zenith: f64 = xml::text(children[0]).parse().unwrap_or(f64::NAN);
            let azimuth: f64 = xml::text(children[1]).parse().unwrap_or(f64::NAN);
            if !zenith.is_nan() && !azimuth.is_nan() {
                return SolarAngles {
                    zenith: zenith.floor() as i64,
                    azimuth: azimuth.floor() as i64,
                };
            }
        }
    }
    warn!("XML file has a different structure: solar angles initialized to 0");
    SolarAngles { zenith: 0, azimuth: 0 }
}

/// Running mean of the per-band viewing angles, floored.
///
/// With `NanPolicy::Reset`, a NaN entry resets the denominator to 1.0 while
/// the accumulated sum is left untouched, which is the behavior Muscate
/// products have always been processed with. `NanPolicy::Skip` ignores the
/// entry.
pub fn viewing_mean_angles(entries: &[ViewingAngle], policy: NanPolicy) -> (i64, i64) {
    if entries.is_empty() {
        warn!("no viewing incidence angles available: sensor angles initialized to 0");
        return (0, 0);
    }

    let mut nb_zenith = 0.0;
    let mut nb_azimuth = 0.0;
    let mut sum_zenith = 0.0;
    let mut sum_azimuth = 0.0;
    for angle in entries {
        if !angle.zenith.is_nan() {
            nb_zenith += 1.0;
            sum_zenith += angle.zenith;
        } else if policy == NanPolicy::Reset {
            nb_zenith = 1.0;
        }

        if !angle.azimuth.is_nan() {
            nb_azimuth += 1.0;
            sum_azimuth += angle.azimuth;
        } else if policy == NanPolicy::Reset {
            nb_azimuth = 1.0;
        }
    }

    if nb_zenith == 0.0 || nb_azimuth == 0.0 {
        warn!("every viewing incidence angle was NaN: sensor angles initialized to 0");
        return (0, 0);
    }

    (
        (sum_zenith / nb_zenith).floor() as i64,
        (sum_azimuth / nb_azimuth).floor() as i64,
    )
}

/// Signed relative azimuth between the floored solar and sensor azimuths.
pub fn relative_azimuth(solar_azimuth: i64, sensor_azimuth: i64) -> i64 {
    solar_azimuth - sensor_azimuth
}

/// Collect zenith/azimuth pairs from the children of an incidence-angle list
/// node, tagging each entry with the given id attribute (`band_id` or
/// `detector_id`). Values that fail to parse become NaN and are handled by
/// the averaging policy.
pub fn collect_viewing_angles(list: Node, id_attribute: &str) -> Vec<ViewingAngle> {
    xml::element_children(list)
        .map(|entry| {
            let zenith = xml::find(entry, "ZENITH_ANGLE")
                .map(|n| xml::text(n).parse().unwrap_or(f64::NAN))
                .unwrap_or(f64::NAN);
            let azimuth = xml::find(entry, "AZIMUTH_ANGLE")
                .map(|n| xml::text(n).parse().unwrap_or(f64::NAN))
                .unwrap_or(f64::NAN);
            ViewingAngle {
                band_id: entry.attribute(id_attribute).map(String::from),
                zenith,
                azimuth,
            }
        })
        .collect()
}
