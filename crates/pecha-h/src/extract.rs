//! In-page extraction: scripts evaluated in the viewer page and the Rust
//! side that interprets their results.

use chromiumoxide::Page;
use pecha_common::PageId;
use pecha_engine::config::ImageFormat;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

/// Maximum retries for context errors while the viewer is still navigating.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Poll interval while waiting for the page image to appear.
const CONTENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Images smaller than this in both dimensions are never the page scan.
const MIN_SCAN_SIDE: u32 = 300;

const CONTENT_READY_JS: &str = r#"
() => {
    const el = document.querySelector('canvas, img[src*="jpg"], img[src*="png"]');
    if (!el) return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}
"#;

const CANVAS_JS: &str = r#"
({ mimeType, quality }) => {
    const canvas = document.querySelector('canvas');
    if (!canvas) return '';
    try {
        return mimeType === 'image/png'
            ? canvas.toDataURL(mimeType)
            : canvas.toDataURL(mimeType, quality);
    } catch (e) {
        return '';
    }
}
"#;

const IMAGE_SRC_JS: &str = r#"
({ pageId, minSide }) => {
    const images = Array.from(document.querySelectorAll('img'));
    const compact = pageId.replace('-', '');
    for (const img of images) {
        const src = img.src || img.dataset.src || '';
        if (src && (src.includes(pageId) || src.includes(compact) || img.alt === pageId || img.id === pageId)) {
            return img.src || src;
        }
    }
    for (const img of images) {
        if (img.width > minSide && img.height > minSide && img.src) {
            return img.src;
        }
    }
    return '';
}
"#;

const TEXT_JS: &str = r#"
({ pageId, jpId }) => {
    let byMarker = '';
    const start = document.querySelector(`jp[id="${jpId}"]`);
    if (start) {
        let node = start.nextSibling;
        while (node && node.nodeName !== 'JP') {
            byMarker += node.textContent || '';
            node = node.nextSibling;
        }
    }
    const spans = document.querySelectorAll(`span.text-pb[data-pbname="${pageId}"]`);
    let byAttribute = '';
    spans.forEach(el => { byAttribute += el.textContent || ''; });
    return { by_marker: byMarker, by_attribute: byAttribute, elements_found: spans.length };
}
"#;

static PAGE_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+-\d+[ab]").expect("page mark pattern is valid"));

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("evaluation timed out")]
    Timeout,
    #[error("execution context unavailable: {0}")]
    Context(String),
    #[error("{0}")]
    Other(String),
}

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

async fn evaluate_once<T: DeserializeOwned>(
    page: &Page,
    expression: &str,
    timeout: Duration,
) -> Result<T, EvalError> {
    match tokio::time::timeout(timeout, page.evaluate(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(result)) => result
            .into_value::<T>()
            .map_err(|e| EvalError::Other(format!("Failed to read result: {}", e))),
    }
}

/// Call a script function with JSON-encoded arguments, retrying while the
/// execution context is being replaced.
pub async fn call_function<T: DeserializeOwned>(
    page: &Page,
    function: &str,
    args: &serde_json::Value,
    timeout: Duration,
) -> Result<T, EvalError> {
    let expression = format!("({})({})", function.trim(), args);
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_once(page, &expression, timeout).await {
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during evaluation (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            other => return other,
        }
    }

    Err(EvalError::Context(
        last_error.unwrap_or_else(|| "evaluation failed after retries".to_string()),
    ))
}

/// Wait until a canvas or scan image is visible, then give the viewer time
/// to finish rendering. Returns whether the content appeared in time.
pub async fn wait_for_content(
    page: &Page,
    timeout: Duration,
    settle: Duration,
    eval_timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ready = false;

    while tokio::time::Instant::now() < deadline {
        match call_function::<bool>(page, CONTENT_READY_JS, &serde_json::Value::Null, eval_timeout)
            .await
        {
            Ok(true) => {
                ready = true;
                break;
            }
            Ok(false) => {}
            Err(e) => tracing::debug!("Content check failed: {}", e),
        }
        tokio::time::sleep(CONTENT_POLL_INTERVAL).await;
    }

    if ready {
        tracing::info!("Page content loaded");
    } else {
        tracing::warn!("Canvas/image did not appear within {:?}", timeout);
    }
    tokio::time::sleep(settle).await;
    ready
}

/// Read the viewer canvas as a data URL in the requested format.
pub async fn canvas_data_url(
    page: &Page,
    format: ImageFormat,
    jpeg_quality: u8,
    eval_timeout: Duration,
) -> Result<Option<String>, EvalError> {
    let quality = match format {
        ImageFormat::Png => 1.0,
        ImageFormat::Jpeg => f64::from(jpeg_quality) / 100.0,
    };
    let args = serde_json::json!({ "mimeType": format.mime_type(), "quality": quality });
    let data: String = call_function(page, CANVAS_JS, &args, eval_timeout).await?;
    Ok(Some(data).filter(|d| is_image_data_url(d)))
}

/// A blank canvas serializes to `data:,`, which carries no image.
pub fn is_image_data_url(data: &str) -> bool {
    data.starts_with("data:image/")
        && data
            .split_once(',')
            .is_some_and(|(_, payload)| !payload.is_empty())
}

/// Source URL of the `<img>` showing `page`, or of the first large image.
pub async fn page_image_src(
    page: &Page,
    page_id: &PageId,
    eval_timeout: Duration,
) -> Result<Option<String>, EvalError> {
    let args = serde_json::json!({ "pageId": page_id.to_string(), "minSide": MIN_SCAN_SIDE });
    let src: String = call_function(page, IMAGE_SRC_JS, &args, eval_timeout).await?;
    Ok(Some(src).filter(|s| !s.is_empty()))
}

/// Raw text candidates gathered by the page script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextCandidates {
    pub by_marker: String,
    pub by_attribute: String,
    pub elements_found: usize,
}

/// Which markup the accepted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMethod {
    JpMarkers,
    DataPbname,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub method: TextMethod,
}

/// Id of the `<jp>` marker that opens `page`: `1-1b` becomes `1-1-1b`.
pub fn jp_marker_id(page: &PageId) -> String {
    format!("{}-{}-{}", page.volume(), page.folio(), page)
}

pub fn contains_tibetan(text: &str) -> bool {
    text.chars().any(|c| ('\u{0F00}'..='\u{0FFF}').contains(&c))
}

/// Strip page marks such as `1-2a` and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let stripped = PAGE_MARK_RE.replace_all(raw, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Marker text wins over attribute text; either must contain Tibetan.
pub fn choose_text(candidates: &TextCandidates) -> Option<ExtractedText> {
    let (raw, method) = if contains_tibetan(&candidates.by_marker) {
        (&candidates.by_marker, TextMethod::JpMarkers)
    } else if contains_tibetan(&candidates.by_attribute) {
        (&candidates.by_attribute, TextMethod::DataPbname)
    } else {
        return None;
    };

    let text = clean_text(raw);
    if text.is_empty() {
        return None;
    }
    Some(ExtractedText { text, method })
}

pub async fn extract_text(
    page: &Page,
    page_id: &PageId,
    eval_timeout: Duration,
) -> Result<Option<ExtractedText>, EvalError> {
    let args = serde_json::json!({
        "pageId": page_id.to_string(),
        "jpId": jp_marker_id(page_id),
    });
    let candidates: TextCandidates = call_function(page, TEXT_JS, &args, eval_timeout).await?;
    tracing::debug!(
        "Text candidates for {}: marker={} chars, attribute={} chars in {} elements",
        page_id,
        candidates.by_marker.chars().count(),
        candidates.by_attribute.chars().count(),
        candidates.elements_found
    );

    let extracted = choose_text(&candidates);
    if let Some(found) = &extracted {
        tracing::info!("Text extracted via {:?}", found.method);
    }
    Ok(extracted)
}
