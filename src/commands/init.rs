use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory with a default `config.json` and an exports directory. An existing
/// `config.json` is kept.
///
/// # Errors
/// - Returns an error if any file operations fail or an existing config file is invalid.
pub async fn init(recon_home: &Path) -> Result<Out<()>> {
    let config = Config::create(recon_home)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "tsrecon home is ready at {}, config is {}",
        config.root().display(),
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("config.json"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("exports").is_dir());
        init(&home).await.unwrap();
    }
}
