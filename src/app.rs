//! Application orchestration: acquire an image, normalize it, generate a poem.

use crate::ai::{GeminiPoemClient, PoemService};
use crate::models::{Config, LocalFile, PoemRequest};
use crate::normalize::{mime_type_for_extension, normalize_local_file, RemoteImageFetcher};
use crate::track::ResultSlot;
use crate::{Error, Result};
use std::path::Path;
use tracing::info;

/// Coordinates the two pipeline stages. The normalizer never calls the
/// generator; the app triggers each stage explicitly.
pub struct App {
    fetcher: RemoteImageFetcher,
    poem: Box<dyn PoemService>,
    latest: ResultSlot<String>,
}

impl App {
    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;

        info!("Poem model: {}", config.poem_model);

        Ok(Self::with_services(
            RemoteImageFetcher::new(config.fetch_timeout),
            Box::new(GeminiPoemClient::new(
                config.gemini_api_key,
                config.poem_model,
                config.generation_timeout,
            )),
        ))
    }

    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and harnesses that need
    /// to inject mocks.
    pub fn with_services(fetcher: RemoteImageFetcher, poem: Box<dyn PoemService>) -> Self {
        Self {
            fetcher,
            poem,
            latest: ResultSlot::new(),
        }
    }

    /// Read a local image file and generate a poem for it.
    pub async fn poem_from_file(&self, path: &Path) -> Result<String> {
        let declared_mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_type_for_extension)
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let source = LocalFile {
            byte_size: bytes.len() as u64,
            bytes,
            declared_mime_type,
        };

        let image = normalize_local_file(&source).into_result()?;
        info!("Normalized local file {} as {}", path.display(), image.mime_type);

        self.generate(image.data_uri()).await
    }

    /// Fetch a remote image URL and generate a poem for it.
    pub async fn poem_from_url(&self, url: &str) -> Result<String> {
        let conversion = self.fetcher.normalize_remote_url(url).await;
        let image = match conversion.into_result() {
            Ok(image) => image,
            // Remote failures belong to the fetch taxonomy even though the
            // boundary result only carries a message.
            Err(Error::Validation(message)) => return Err(Error::Fetch(message)),
            Err(e) => return Err(e),
        };
        info!("Normalized remote image as {}", image.mime_type);

        self.generate(image.data_uri()).await
    }

    /// Most recently completed poem that was still the latest-initiated
    /// request when it finished.
    pub fn latest_poem(&self) -> Option<String> {
        self.latest.current()
    }

    async fn generate(&self, photo_data_uri: String) -> Result<String> {
        let tag = self.latest.begin();

        let response = self
            .poem
            .generate_poem(&PoemRequest { photo_data_uri })
            .await?;

        if !self.latest.complete(tag, response.poem.clone()) {
            info!("A newer request superseded this poem");
        }

        Ok(response.poem)
    }
}
