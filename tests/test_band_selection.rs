use std::collections::HashMap;
use std::path::PathBuf;

use bvpro::core::bands::{BandError, check_resolution, select_band, verify_band_list};
use bvpro::io::product::BandFiles;
use bvpro::ReflectanceNature;

fn muscate_files() -> BandFiles {
    BandFiles::Muscate {
        fre: vec![
            ("B2".to_string(), PathBuf::from("/img/FRE_B2.tif")),
            ("B3".to_string(), PathBuf::from("/img/FRE_B3.tif")),
            ("B4".to_string(), PathBuf::from("/img/FRE_B4.tif")),
        ],
        sre: vec![
            ("B2".to_string(), PathBuf::from("/img/SRE_B2.tif")),
            ("B3".to_string(), PathBuf::from("/img/SRE_B3.tif")),
        ],
    }
}

/// The typical Level-2A layout: native 10 m bands resampled into the 20 m
/// tier, tier-exclusive bands present only at their native resolution.
fn sen2cor_files() -> BandFiles {
    let mut entries = Vec::new();
    for b in ["B2", "B3", "B4", "B8"] {
        entries.push((b.to_string(), 10, PathBuf::from(format!("/img/R10m/{}_10m.jp2", b))));
    }
    for b in ["B2", "B3", "B4", "B5", "B6", "B7", "B8A", "B11", "B12"] {
        entries.push((b.to_string(), 20, PathBuf::from(format!("/img/R20m/{}_20m.jp2", b))));
    }
    for b in ["B1", "B9"] {
        entries.push((b.to_string(), 60, PathBuf::from(format!("/img/R60m/{}_60m.jp2", b))));
    }
    BandFiles::Sen2cor { entries }
}

fn native_resolutions() -> HashMap<String, u32> {
    let mut map = HashMap::new();
    for (band, res) in [
        ("B1", 60),
        ("B2", 10),
        ("B3", 10),
        ("B4", 10),
        ("B5", 20),
        ("B6", 20),
        ("B7", 20),
        ("B8", 10),
        ("B8A", 20),
        ("B9", 60),
        ("B11", 20),
        ("B12", 20),
    ] {
        map.insert(band.to_string(), res);
    }
    map
}

fn selection(bands: &[&str]) -> Vec<String> {
    bands.iter().map(|b| b.to_string()).collect()
}

#[test]
fn test_verify_band_list() {
    let files = muscate_files();
    assert!(verify_band_list(&files, ReflectanceNature::Fre, &selection(&["B2", "B4"])).is_ok());

    // B4 exists only in the FRE list.
    let result = verify_band_list(&files, ReflectanceNature::Sre, &selection(&["B2", "B4"]));
    match result {
        Err(BandError::NotFound(band)) => assert_eq!(band, "B4"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_check_resolution_single_tier() {
    let resolutions = native_resolutions();
    assert_eq!(
        check_resolution(&resolutions, &selection(&["B2", "B3", "B4"])).unwrap(),
        10
    );
}

#[test]
fn test_check_resolution_returns_coarsest() {
    let resolutions = native_resolutions();
    assert_eq!(
        check_resolution(&resolutions, &selection(&["B2", "B4", "B8A"])).unwrap(),
        20
    );
    assert_eq!(
        check_resolution(&resolutions, &selection(&["B2", "B9"])).unwrap(),
        60
    );
}

#[test]
fn test_check_resolution_unknown_band() {
    let resolutions = native_resolutions();
    assert!(matches!(
        check_resolution(&resolutions, &selection(&["B42"])),
        Err(BandError::NotFound(_))
    ));
}

#[test]
fn test_select_band_muscate_direct_lookup() {
    let files = muscate_files();
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B4", "B2"]), 10).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/FRE_B4.tif"), PathBuf::from("/img/FRE_B2.tif")]);
}

#[test]
fn test_select_band_muscate_duplicate_entries_mismatch() {
    let files = BandFiles::Muscate {
        fre: vec![
            ("B2".to_string(), PathBuf::from("/img/FRE_B2_a.tif")),
            ("B2".to_string(), PathBuf::from("/img/FRE_B2_b.tif")),
        ],
        sre: vec![],
    };
    let result = select_band(&files, ReflectanceNature::Fre, &selection(&["B2"]), 10);
    assert!(matches!(
        result,
        Err(BandError::SelectionMismatch {
            requested: 1,
            resolved: 2,
        })
    ));
}

#[test]
fn test_select_band_sen2cor_exact_match() {
    let files = sen2cor_files();
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B3"]), 10).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/R10m/B3_10m.jp2")]);
}

#[test]
fn test_select_band_sen2cor_exclusive_band_keeps_native_tier() {
    let files = sen2cor_files();

    // B1 exists only at 60 m: a 10 m request still returns the 60 m file.
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B1"]), 10).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/R60m/B1_60m.jp2")]);

    // B8 exists only at 10 m: a 60 m request returns the 10 m file.
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B8"]), 60).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/R10m/B8_10m.jp2")]);
}

#[test]
fn test_select_band_sen2cor_tier_fallbacks() {
    let files = sen2cor_files();

    // B5 has no 10 m file: 10 m requests fall back to the 20 m tier.
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B5"]), 10).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/R20m/B5_20m.jp2")]);

    // A band present only at 60 m, requested at 20 m, falls through to 60.
    let files = BandFiles::Sen2cor {
        entries: vec![("B11".to_string(), 60, PathBuf::from("/img/R60m/B11_60m.jp2"))],
    };
    let paths = select_band(&files, ReflectanceNature::Fre, &selection(&["B11"]), 20).unwrap();
    assert_eq!(paths, vec![PathBuf::from("/img/R60m/B11_60m.jp2")]);
}

#[test]
fn test_select_band_sen2cor_no_fallback_from_coarsest() {
    // B5 exists at 20 m only; there is no fallback path below a 60 m
    // request, so the band cannot be resolved.
    let files = BandFiles::Sen2cor {
        entries: vec![("B5".to_string(), 20, PathBuf::from("/img/R20m/B5_20m.jp2"))],
    };
    let result = select_band(&files, ReflectanceNature::Fre, &selection(&["B5"]), 60);
    match result {
        Err(BandError::NotFound(band)) => assert_eq!(band, "B5"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_selection_scenario_coarsest_tier_wins() {
    // Selecting B2, B4 (native 10 m) and B8A (native 20 m) without a fixed
    // resolution mosaics at 20 m with exactly three files.
    let files = sen2cor_files();
    let resolutions = native_resolutions();
    let bands = selection(&["B2", "B4", "B8A"]);

    verify_band_list(&files, ReflectanceNature::Fre, &bands).unwrap();
    let res = check_resolution(&resolutions, &bands).unwrap();
    assert_eq!(res, 20);

    let paths = select_band(&files, ReflectanceNature::Fre, &bands, res).unwrap();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/img/R20m/B2_20m.jp2"),
            PathBuf::from("/img/R20m/B4_20m.jp2"),
            PathBuf::from("/img/R20m/B8A_20m.jp2"),
        ]
    );
}
