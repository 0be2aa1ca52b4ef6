use crate::cdp::{CdpClient, LaunchOptions};
use crate::extract;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use pecha_common::metadata::{TEXT_PREVIEW_CHARS, preview};
use pecha_common::{Artifacts, FetchError, FetchOutcome, ImageSource, PageId};
use pecha_engine::backend::PageFetcher;
use pecha_engine::config::{ImageFormat, PechaConfig};
use pecha_engine::retry::{RetryPolicy, Retryable, with_retry};
use pecha_engine::store::ArtifactStore;
use tracing::{info, warn};
use url::Url;

/// Everything captured by one attempt at a page.
#[derive(Debug, Default)]
struct Capture {
    artifacts: Artifacts,
}

impl Retryable for Capture {
    /// A missing image or a full-page screenshot usually means the viewer
    /// had not rendered yet.
    fn should_retry(&self) -> bool {
        self.artifacts.image_file.is_none()
            || self.artifacts.image_source == Some(ImageSource::Screenshot)
    }
}

enum FoundImage {
    DataUrl(String, ImageSource),
    Remote(String),
    Screenshot(Vec<u8>),
}

/// Page fetcher backed by a local Chromium driven over CDP.
pub struct HeadlessFetcher {
    client: Option<CdpClient>,
    http: Option<reqwest::Client>,
    config: PechaConfig,
    store: ArtifactStore,
    visible: bool,
}

impl HeadlessFetcher {
    pub fn new(config: PechaConfig, store: ArtifactStore) -> Self {
        Self {
            client: None,
            http: None,
            config,
            store,
            visible: false,
        }
    }

    pub fn new_with_visibility(config: PechaConfig, store: ArtifactStore, visible: bool) -> Self {
        Self {
            visible,
            ..Self::new(config, store)
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            visible: self.visible,
            viewport_width: self.config.browser.viewport_width,
            viewport_height: self.config.browser.viewport_height,
            user_agent: Some(self.config.browser.user_agent.clone()),
        }
    }

    /// One attempt: load the viewer, then save markup, image and text.
    async fn capture(&self, page_id: &PageId, url: &str, attempt: u32) -> Result<Capture, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::NotReady)?;
        let page = &client.page;
        let browser = &self.config.browser;

        info!("Navigating to: {} (attempt {})", url, attempt);
        tokio::time::timeout(browser.navigation_timeout(), page.goto(url))
            .await
            .map_err(|_| FetchError::Timeout(format!("navigation to {}", url)))?
            .map_err(|e| FetchError::Navigation(e.to_string()))?;

        extract::wait_for_content(
            page,
            browser.content_timeout(),
            browser.settle(),
            browser.eval_timeout(),
        )
        .await;

        let mut capture = Capture::default();
        capture.artifacts.url = Some(url.to_string());
        capture.artifacts.attempts = attempt;

        match page.content().await {
            Ok(html) => match self.store.save_html(page_id, &html).await {
                Ok(name) => capture.artifacts.html_file = Some(name),
                Err(e) => warn!("Failed to save HTML for {}: {}", page_id, e),
            },
            Err(e) => warn!("Failed to read page markup for {}: {}", page_id, e),
        }

        match self.find_image(page_id).await {
            Some(found) => {
                let source = match &found {
                    FoundImage::DataUrl(_, source) => *source,
                    FoundImage::Remote(_) => ImageSource::Img,
                    FoundImage::Screenshot(_) => ImageSource::Screenshot,
                };
                info!("Image source: {}", source.as_str());
                if source == ImageSource::Screenshot {
                    warn!("Fell back to a page screenshot for {}; the viewer may not have loaded", page_id);
                }
                match self.save_image(page_id, found).await {
                    Ok(name) => {
                        capture.artifacts.image_file = Some(name);
                        capture.artifacts.image_source = Some(source);
                    }
                    Err(e) => warn!("Failed to save image for {}: {}", page_id, e),
                }
            }
            None => warn!("No image found for {}", page_id),
        }

        match extract::extract_text(page, page_id, browser.eval_timeout()).await {
            Ok(Some(found)) => match self.store.save_text(page_id, &found.text).await {
                Ok(name) => {
                    capture.artifacts.text_file = Some(name);
                    capture.artifacts.text_length = found.text.chars().count();
                    capture.artifacts.text_preview = Some(preview(&found.text, TEXT_PREVIEW_CHARS));
                }
                Err(e) => warn!("Failed to save text for {}: {}", page_id, e),
            },
            Ok(None) => warn!("No Tibetan text found for {}", page_id),
            Err(e) => warn!("Text extraction failed for {}: {}", page_id, e),
        }

        Ok(capture)
    }

    /// Canvas first, then a matching `<img>`, then a screenshot of the page.
    async fn find_image(&self, page_id: &PageId) -> Option<FoundImage> {
        let client = self.client.as_ref()?;
        let page = &client.page;
        let eval_timeout = self.config.browser.eval_timeout();
        let output = &self.config.output;

        match extract::canvas_data_url(page, output.image_format, output.jpeg_quality, eval_timeout)
            .await
        {
            Ok(Some(data)) => return Some(FoundImage::DataUrl(data, ImageSource::Canvas)),
            Ok(None) => {}
            Err(e) => warn!("Canvas extraction failed: {}", e),
        }

        match extract::page_image_src(page, page_id, eval_timeout).await {
            Ok(Some(src)) if src.starts_with("data:") => {
                return Some(FoundImage::DataUrl(src, ImageSource::Img));
            }
            Ok(Some(src)) => return Some(FoundImage::Remote(src)),
            Ok(None) => {}
            Err(e) => warn!("Image lookup failed: {}", e),
        }

        let format = match output.image_format {
            ImageFormat::Png => CaptureScreenshotFormat::Png,
            ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        };
        let mut params = ScreenshotParams::builder().format(format).full_page(true);
        if output.image_format == ImageFormat::Jpeg {
            params = params.quality(i64::from(output.jpeg_quality));
        }
        match page.screenshot(params.build()).await {
            Ok(bytes) => Some(FoundImage::Screenshot(bytes)),
            Err(e) => {
                warn!("Screenshot failed: {}", e);
                None
            }
        }
    }

    async fn save_image(&self, page_id: &PageId, found: FoundImage) -> Result<String, FetchError> {
        let format = self.config.output.image_format;
        match found {
            FoundImage::DataUrl(data, _) => self
                .store
                .save_image_data_url(page_id, format, &data)
                .await
                .map_err(|e| FetchError::Other(e.to_string())),
            FoundImage::Remote(src) => {
                let url = resolve_asset_url(&self.config.site.base_url, &src)?;
                let bytes = self.download(&url).await?;
                self.store
                    .save_image(page_id, format, &bytes)
                    .await
                    .map_err(|e| FetchError::Other(e.to_string()))
            }
            FoundImage::Screenshot(bytes) => self
                .store
                .save_image(page_id, format, &bytes)
                .await
                .map_err(|e| FetchError::Other(e.to_string())),
        }
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let http = self.http.as_ref().ok_or(FetchError::NotReady)?;
        info!("Downloading image: {}", url);
        let response = http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Resolve an image `src` against the site base URL.
pub fn resolve_asset_url(base_url: &str, src: &str) -> Result<Url, FetchError> {
    let base = Url::parse(base_url)
        .map_err(|e| FetchError::Other(format!("Invalid base URL {}: {}", base_url, e)))?;
    base.join(src)
        .map_err(|e| FetchError::Other(format!("Invalid image URL {}: {}", src, e)))
}

#[async_trait]
impl PageFetcher for HeadlessFetcher {
    async fn launch(&mut self) -> Result<(), FetchError> {
        info!("Launching Headless Fetcher (Chromium)...");
        let http = reqwest::Client::builder()
            .user_agent(self.config.browser.user_agent.clone())
            .timeout(self.config.browser.download_timeout())
            .build()
            .map_err(|e| FetchError::Launch(e.to_string()))?;
        let client = CdpClient::launch(&self.launch_options())
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;
        self.http = Some(http);
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.http = None;
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| FetchError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn fetch(&mut self, page: &PageId) -> Result<FetchOutcome, FetchError> {
        if self.client.is_none() {
            return Err(FetchError::NotReady);
        }

        let url = self.config.site.page_url(page);
        let policy = RetryPolicy::from(&self.config.retry);
        let label = format!("Page {}", page);

        let this = &*self;
        let url_ref = url.as_str();
        let result = with_retry(&policy, &label, move |attempt| {
            this.capture(page, url_ref, attempt)
        })
        .await;

        Ok(match result {
            Ok(capture) => FetchOutcome::from_artifacts(page.clone(), capture.artifacts),
            Err(e) => FetchOutcome::failed(page.clone(), e.to_string()).with_artifacts(Artifacts {
                url: Some(url),
                attempts: policy.max_attempts,
                ..Artifacts::default()
            }),
        })
    }
}
