//! Generates `carrot.h` into `OUT_DIR`.
//!
//! Hosts that want a checked-in header can run the same generation by hand:
//!
//! ```text
//! cbindgen --crate carrot-ffi --lang c --output include/carrot.h
//! ```

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=skipping carrot.h generation: cargo build environment not set");
        return;
    };
    let header = PathBuf::from(out_dir).join("carrot.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CARROT_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
        }
        Err(err) => println!("cargo:warning=skipping carrot.h generation: {err}"),
    }
}
