//! Build script for the web client.
//!
//! Hashes `static/css/main.css` so the stylesheet URL changes whenever its
//! content does (`/static/css/main.css?v={hash}`).

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest.
const SHORT_HASH_LEN: usize = 8;

fn main() {
    hash_css();
    println!("cargo:rerun-if-changed=templates");
}

/// Sets `CSS_HASH` for use with `env!("CSS_HASH")`.
fn hash_css() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=dev");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash: String = digest.chars().take(SHORT_HASH_LEN).collect();

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
