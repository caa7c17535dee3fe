//! Build script for the spotdwn CLI.
//!
//! Copies the `.env.example` and `credentials.example` templates from the crate
//! root into the user's local data directory, so a fresh install has examples
//! sitting next to the files the application actually reads.

use std::{env, fs, path::PathBuf};

/// Copies configuration templates into the local data directory.
///
/// # Destination
///
/// - Linux: `~/.local/share/spotdwn/`
/// - macOS: `~/Library/Application Support/spotdwn/`
/// - Windows: `%LOCALAPPDATA%/spotdwn/`
///
/// Missing templates and an unwritable data directory only produce
/// `cargo:warning` lines; neither fails the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");
    println!("cargo:rerun-if-changed=credentials.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotdwn");
    if let Err(e) = fs::create_dir_all(&out_dir) {
        println!(
            "cargo:warning=cannot create {}: {}",
            out_dir.display(),
            e
        );
        return Ok(());
    }

    for template in [".env.example", "credentials.example"] {
        let source = manifest_dir.join(template);
        if !source.is_file() {
            println!("cargo:warning={} not found at {}", template, source.display());
            continue;
        }

        let contents = fs::read_to_string(&source)?;
        if let Err(e) = fs::write(out_dir.join(template), contents) {
            println!("cargo:warning=cannot copy {}: {}", template, e);
        }
    }

    Ok(())
}
