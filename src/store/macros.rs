#[macro_export]
macro_rules! impl_store {
    ($($name:ty),+ $(,)?) => ($(
        #[async_trait::async_trait]
        impl $crate::store::Store for $name {
            async fn new() -> Result<Self> {
                use anyhow::{Context as _};

                let path = Self::path()?;

                if fs::metadata(path.clone()).await.is_err() {
                    log::debug!("No store found at {}, using defaults", path.display());

                    return Ok(Self::default());
                }

                let mut file = File::open(path.clone())
                    .await
                    .context("Error opening file")?;

                let mut buffer = String::new();
                file.read_to_string(&mut buffer).await?;

                serde_json::from_str(&buffer)
                    .with_context(|| format!("Failed to deserialize {}", path.display()))
            }

            async fn save(&self) -> Result<Self> {
                use anyhow::{Context as _};

                let path = Self::path()?;

                fs::create_dir_all(path.parent().context("Failed to get store directory")?)
                    .await
                    .context("Failed to create store directory")?;

                let mut file = File::create(path.clone())
                    .await
                    .context("Error opening file")?;

                file.write_all(
                    serde_json::to_string_pretty(&self)
                        .context("Failed to serialize")?
                        .as_bytes(),
                )
                .await
                .context("Failed to write store")?;

                log::debug!("Saved store to {}", path.display());

                Ok(self.clone())
            }
        }
    )+)
}
