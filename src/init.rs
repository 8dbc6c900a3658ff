use crate::config::Settings;
use crate::logi;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Creates the output and staging directories if they are missing.
pub async fn ensure_directories(settings: &Settings) -> Result<()> {
    for dir in [&settings.output_dir, &settings.temp_dir] {
        if !Path::new(dir).exists() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            logi(format!("Created directory: {}", dir.display()));
        }
    }
    Ok(())
}

pub fn os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "Windows"
    } else if cfg!(target_os = "macos") {
        "macOS"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else {
        "Unknown"
    }
}
