#![doc = r#"
BVPRO — a biophysical variable retrieval pipeline frontend.

This crate turns Muscate (Theia) and Sen2Cor (ESA Level-2A) optical
product metadata into everything the external inversion toolkit needs:
acquisition geometry, a unified Relative Spectral Response (RSR) table,
and a resolved per-band image stack at a reconciled resolution. The
numeric machinery — PROSAIL simulation, regression learning, raster
inversion — stays in the external toolkit, invoked as black-box
applications through a narrow parameter/execute contract.

Quick start: open a product and resolve its band stack
------------------------------------------------------
```rust,no_run
use std::path::{Path, PathBuf};
use bvpro::{
    api::{self, ProductOptions},
    io::product::RsrSource,
    ReflectanceNature,
};

fn main() -> bvpro::Result<()> {
    let options = ProductOptions {
        output_dir: PathBuf::from("/out"),
        nan_policy: None,
        rsr: RsrSource::Extract,
    };

    let mut product = api::open_product(Path::new("/data/MTD_MSIL2A.xml"), &options)?;
    api::select_bands(&mut product, &["B3".into(), "B4".into(), "B8A".into()])?;

    let (resolution, stack) = api::resolve_band_stack(&product, ReflectanceNature::Fre, None)?;
    println!("stack at {}m: {:?}", resolution, stack);
    Ok(())
}
```

Model generation through the external toolkit
---------------------------------------------
```rust,no_run
use std::path::Path;
use bvpro::api::{self, OtbCliToolkit};
use bvpro::core::params::load_config;

fn generate(product: &bvpro::Product) -> bvpro::Result<()> {
    let config = load_config(Path::new("/cfg/run.json"))?;
    let toolkit = OtbCliToolkit::default();
    let model = api::generate_model(&toolkit, product, &config, Path::new("/out"))?;
    println!("model: {:?}", model.model_file);
    Ok(())
}
```

Error handling
--------------
All public functions return `bvpro::Result<T>`; match on `bvpro::Error`
to handle specific cases, e.g. metadata or band-selection errors.

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`io`] — metadata extractors and the normalized product model.
- [`core`] — geometry, RSR tables, band selection, pipeline driver.
- [`types`] — shared enums (`Dialect`, `ReflectanceNature`, `NanPolicy`).
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::RunConfig;
pub use error::{Error, Result};
pub use types::{BioVariable, Dialect, NanPolicy, ReflectanceNature};

// Metadata layer
pub use io::MetadataError;
pub use io::product::{BandFiles, MetadataExtractor, Product, RsrSource};
pub use io::{MuscateExtractor, Sen2corExtractor};

// Core building blocks
pub use core::bands::{BandError, check_resolution, select_band, verify_band_list};
pub use core::interpolate::{generate_rsr_file, linear_interpolate, rsr_select_bands};
pub use core::rsr::{RsrError, RsrTable, build_rsr_table, filter_rsr_file};

// High-level API re-exports
pub use api::{
    AppParams, ModelArtifacts, OtbCliToolkit, ParamValue, ProductOptions, Toolkit,
    generate_model, invert_image, open_product, resolve_band_stack, select_bands,
};
