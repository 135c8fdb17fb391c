//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `devotion_core` linkage.
//! - Optionally validate a content directory given by `DEVOTION_CONTENT_DIR`.
//! - Write rolling logs as configured by `DEVOTION_LOG_LEVEL`/`DEVOTION_LOG_DIR`.
//! - Keep stdout deterministic for quick local sanity checks.

use devotion_core::{curriculum, ContentLibrary};
use std::process::ExitCode;

const CONTENT_DIR_ENV: &str = "DEVOTION_CONTENT_DIR";

fn main() -> ExitCode {
    if let Err(err) = devotion_core::init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    println!("devotion_core ping={}", devotion_core::ping());
    println!("devotion_core version={}", devotion_core::core_version());
    println!("devotion_core sections={}", curriculum().len());

    let Some(content_dir) = std::env::var(CONTENT_DIR_ENV)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
    else {
        return ExitCode::SUCCESS;
    };

    match ContentLibrary::load_dir(content_dir.trim()) {
        Ok(library) => {
            for section in curriculum() {
                let days = library
                    .exercises(section.key)
                    .map_or(0, |exercises| exercises.daily_exercises.len());
                println!("content section={} days={days}", section.key);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("content load failed: {err}");
            ExitCode::FAILURE
        }
    }
}
