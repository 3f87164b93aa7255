//! Fingerprints the storefront's static assets.
//!
//! `static/css/main.css` and `static/js/app.js` are copied to
//! `static/derived/` under a name carrying the first 8 hex chars of their
//! SHA-256, and the hashes are exported as `CSS_HASH` and `JS_HASH`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// (source under `static/`, env var, derived file stem, extension)
const ASSETS: [(&str, &str, &str, &str); 2] = [
    ("css/main.css", "CSS_HASH", "main", "css"),
    ("js/app.js", "JS_HASH", "app", "js"),
];

fn main() {
    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"));
    let static_dir = manifest_dir.join("static");
    let derived_dir = static_dir.join("derived");

    for (source, var, stem, ext) in ASSETS {
        let hash = fingerprint(&static_dir.join(source), &derived_dir, stem, ext);
        println!("cargo:rustc-env={var}={hash}");
    }
}

/// Copy `source` into `derived_dir` with its hash in the name.
///
/// Returns an empty hash when the source is missing; templates then link the
/// unhashed file.
fn fingerprint(source: &Path, derived_dir: &Path, stem: &str, ext: &str) -> String {
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            return String::new();
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short = digest[..8].to_owned();

    fs::create_dir_all(derived_dir).expect("Failed to create derived asset directory");
    fs::copy(source, derived_dir.join(format!("{stem}.{short}.{ext}")))
        .expect("Failed to copy asset to derived directory");

    short
}
