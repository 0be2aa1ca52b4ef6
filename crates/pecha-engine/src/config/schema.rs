use pecha_common::PageId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PechaConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Catalog, e.g. `degekangyur` or `degetengyur`.
    #[serde(default = "default_kdb")]
    pub kdb: String,
    /// Text within the catalog, e.g. `d1` or `D1109`.
    #[serde(default = "default_sutra")]
    pub sutra: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            kdb: default_kdb(),
            sutra: default_sutra(),
        }
    }
}

impl SiteConfig {
    /// Viewer URL that opens `page` of the configured text.
    pub fn page_url(&self, page: &PageId) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!(
            "{}/index.html?kdb={}&sutra={}&page={}",
            base, self.kdb, self.sutra, page
        )
    }
}

fn default_base_url() -> String {
    "https://online.adarshah.org/".to_string()
}

fn default_kdb() -> String {
    "degekangyur".to_string()
}

fn default_sutra() -> String {
    "d1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
    /// How long to wait for a canvas or page image to appear.
    #[serde(default = "default_content_timeout_ms")]
    pub content_timeout_ms: u64,
    /// Extra rendering time after the content appeared.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_eval_timeout_ms")]
    pub eval_timeout_ms: u64,
    #[serde(default = "default_download_timeout_ms")]
    pub download_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            user_agent: default_user_agent(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            content_timeout_ms: default_content_timeout_ms(),
            settle_ms: default_settle_ms(),
            eval_timeout_ms: default_eval_timeout_ms(),
            download_timeout_ms: default_download_timeout_ms(),
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_millis(self.content_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn eval_timeout(&self) -> Duration {
        Duration::from_millis(self.eval_timeout_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    60000
}

fn default_content_timeout_ms() -> u64 {
    15000
}

fn default_settle_ms() -> u64 {
    5000
}

fn default_eval_timeout_ms() -> u64 {
    10000
}

fn default_download_timeout_ms() -> u64 {
    30000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub image_format: ImageFormat,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            image_format: ImageFormat::default(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("tibetan_data")
}

fn default_jpeg_quality() -> u8 {
    95
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Pause between two consecutive pages.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl RunConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

fn default_page_delay_ms() -> u64 {
    2000
}
