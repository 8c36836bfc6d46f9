//! Shared types and enums used across BVPRO.
//! Includes `Dialect`, `ReflectanceNature`, `NanPolicy`, and the
//! `BioVariable` index table consumed by the inversion applications.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Metadata dialect of a product, detected from the XML root tag.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Dialect {
    Muscate,
    Sen2cor,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Muscate => write!(f, "Muscate_Metadata"),
            Dialect::Sen2cor => write!(f, "Sen2Cor_Metadata"),
        }
    }
}

/// Reflectance nature for Muscate image selection: flat (slope-corrected)
/// or plain surface reflectance.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ReflectanceNature {
    Fre,
    Sre,
}

impl std::fmt::Display for ReflectanceNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReflectanceNature::Fre => write!(f, "FRE"),
            ReflectanceNature::Sre => write!(f, "SRE"),
        }
    }
}

/// Handling of NaN entries while averaging per-band viewing angles.
///
/// `Reset` reproduces the historical Muscate behavior: a NaN entry resets the
/// running denominator to 1.0 instead of leaving it untouched. `Skip` ignores
/// the NaN entry entirely, which is what the Sen2Cor path has always done.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Serialize, Deserialize)]
pub enum NanPolicy {
    Reset,
    Skip,
}

impl std::fmt::Display for NanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NanPolicy::Reset => write!(f, "reset"),
            NanPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Biophysical variables the inversion applications can be trained against,
/// with their column index in the generated training files.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BioVariable {
    #[serde(rename = "MLAI")]
    Mlai,
    #[serde(rename = "ALA")]
    Ala,
    CrownCover,
    HsD,
    N,
    Cab,
    Car,
    Cdm,
    CwRel,
    Cbp,
    Bs,
    #[serde(rename = "FAPAR")]
    Fapar,
    #[serde(rename = "FCOVER")]
    Fcover,
}

impl BioVariable {
    /// Column index in the training data, as produced upstream.
    /// CwRel shares index 4 with N upstream.
    pub fn index(self) -> usize {
        match self {
            BioVariable::Mlai => 0,
            BioVariable::Ala => 1,
            BioVariable::CrownCover => 2,
            BioVariable::HsD => 3,
            BioVariable::N => 4,
            BioVariable::Cab => 5,
            BioVariable::Car => 6,
            BioVariable::Cdm => 7,
            BioVariable::CwRel => 4,
            BioVariable::Cbp => 9,
            BioVariable::Bs => 10,
            BioVariable::Fapar => 11,
            BioVariable::Fcover => 12,
        }
    }
}

impl std::fmt::Display for BioVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BioVariable::Mlai => "MLAI",
            BioVariable::Ala => "ALA",
            BioVariable::CrownCover => "CrownCover",
            BioVariable::HsD => "HsD",
            BioVariable::N => "N",
            BioVariable::Cab => "Cab",
            BioVariable::Car => "Car",
            BioVariable::Cdm => "Cdm",
            BioVariable::CwRel => "CwRel",
            BioVariable::Cbp => "Cbp",
            BioVariable::Bs => "Bs",
            BioVariable::Fapar => "FAPAR",
            BioVariable::Fcover => "FCOVER",
        };
        write!(f, "{}", s)
    }
}
