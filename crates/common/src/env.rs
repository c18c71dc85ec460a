//! Environment/runtime helpers
//!
//! Sanity checks on files the process needs before it can talk to anything remote.

use std::path::Path;

use tracing::debug;

/// Ensure a required file exists and is a regular file.
pub async fn ensure_file(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
    if !meta.is_file() {
        return Err(anyhow::anyhow!("{} is not a regular file", path.display()));
    }
    debug!(path = %path.display(), "required file present");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_file_accepts_files_and_rejects_dirs() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        let file = dir.join("credentials.json");
        tokio::fs::write(&file, b"{}").await?;

        ensure_file(&file).await?;
        assert!(ensure_file(&dir).await.is_err());
        assert!(ensure_file(dir.join("missing.json")).await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
