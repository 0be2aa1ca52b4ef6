//! Dataset analysis.
//!
//! Reads the `metadata.json` of an output directory and the files next to
//! it, and summarizes how complete the dataset is.

use crate::store::{IMAGES_DIR, METADATA_FILE, TEXTS_DIR};
use pecha_common::metadata::PageRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const EXAMPLE_COUNT: usize = 5;
const PROBLEM_LIST_LIMIT: usize = 10;
const EXAMPLE_PREVIEW_CHARS: usize = 80;
const GOOD_COMPLETION_RATIO: f64 = 0.9;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("Metadata file not found: {0}")]
    MissingMetadata(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub mean: f64,
    pub min: usize,
    pub max: usize,
    pub sum: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPage {
    pub page_id: String,
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every page has both image and text.
    Complete,
    /// More than 90% of pages are complete.
    Good,
    NeedsRerun,
}

#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub root: PathBuf,
    pub total_pages: usize,
    pub pages_with_images: usize,
    pub pages_with_text: usize,
    pub fully_complete: usize,
    pub text_stats: Option<TextStats>,
    pub image_sources: BTreeMap<String, usize>,
    pub volumes: BTreeMap<u32, usize>,
    pub examples: Vec<PageRecord>,
    pub images_on_disk: usize,
    pub texts_on_disk: usize,
    pub total_bytes: u64,
    pub problems: Vec<ProblemPage>,
}

impl DatasetReport {
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        count as f64 / self.total_pages as f64 * 100.0
    }

    pub fn verdict(&self) -> Verdict {
        if self.total_pages > 0 && self.fully_complete == self.total_pages {
            Verdict::Complete
        } else if self.total_pages > 0
            && self.fully_complete as f64 / self.total_pages as f64 > GOOD_COMPLETION_RATIO
        {
            Verdict::Good
        } else {
            Verdict::NeedsRerun
        }
    }

    pub fn size_mib(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Analyze the dataset stored under `dir`.
pub fn analyze_dataset(dir: &Path) -> Result<DatasetReport, AnalyzeError> {
    if !dir.is_dir() {
        return Err(AnalyzeError::MissingDirectory(dir.to_path_buf()));
    }
    let metadata_file = dir.join(METADATA_FILE);
    if !metadata_file.is_file() {
        return Err(AnalyzeError::MissingMetadata(metadata_file));
    }

    let content = std::fs::read_to_string(&metadata_file)?;
    let records: Vec<PageRecord> = serde_json::from_str(&content)?;

    let mut report = summarize_records(dir, &records);
    report.images_on_disk = count_files(&dir.join(IMAGES_DIR), &["png", "jpg", "jpeg"]);
    report.texts_on_disk = count_files(&dir.join(TEXTS_DIR), &["txt"]);
    report.total_bytes = directory_size(dir);
    Ok(report)
}

/// Statistics derived from the metadata records alone.
pub fn summarize_records(root: &Path, records: &[PageRecord]) -> DatasetReport {
    let is_complete = |r: &PageRecord| r.image_file.is_some() && r.text_file.is_some();

    let text_lengths: Vec<usize> = records
        .iter()
        .map(|r| r.text_length)
        .filter(|&len| len > 0)
        .collect();
    let text_stats = text_stats(&text_lengths);

    let mut image_sources = BTreeMap::new();
    for source in records.iter().filter_map(|r| r.image_source.as_ref()) {
        *image_sources.entry(source.clone()).or_insert(0) += 1;
    }

    let mut volumes = BTreeMap::new();
    for volume in records.iter().filter_map(PageRecord::volume) {
        *volumes.entry(volume).or_insert(0) += 1;
    }

    let problems = records
        .iter()
        .filter(|r| !r.success)
        .map(|r| {
            let mut missing = Vec::new();
            if r.image_file.is_none() {
                missing.push("no image");
            }
            if r.text_file.is_none() {
                missing.push("no text");
            }
            if missing.is_empty() {
                missing.push("incomplete");
            }
            ProblemPage {
                page_id: r.page_id.clone(),
                missing,
            }
        })
        .collect();

    DatasetReport {
        root: root.to_path_buf(),
        total_pages: records.len(),
        pages_with_images: records.iter().filter(|r| r.image_file.is_some()).count(),
        pages_with_text: records.iter().filter(|r| r.text_file.is_some()).count(),
        fully_complete: records.iter().filter(|r| is_complete(r)).count(),
        text_stats,
        image_sources,
        volumes,
        examples: records.iter().take(EXAMPLE_COUNT).cloned().collect(),
        images_on_disk: 0,
        texts_on_disk: 0,
        total_bytes: 0,
        problems,
    }
}

fn text_stats(lengths: &[usize]) -> Option<TextStats> {
    let min = *lengths.iter().min()?;
    let max = *lengths.iter().max()?;
    let sum: usize = lengths.iter().sum();
    Some(TextStats {
        mean: sum as f64 / lengths.len() as f64,
        min,
        max,
        sum,
    })
}

fn count_files(dir: &Path, extensions: &[&str]) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .count()
}

fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() > EXAMPLE_PREVIEW_CHARS {
        let head: String = text.chars().take(EXAMPLE_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn mark(present: bool) -> &'static str {
    if present { "yes" } else { "no" }
}

/// Render the analysis the way `pecha analyze` prints it.
pub fn format_dataset_report(report: &DatasetReport) -> String {
    let rule = "=".repeat(70);
    let mut out = format!(
        "{}\nDATASET ANALYSIS: {}\n{}\n\n",
        rule,
        report.root.display(),
        rule
    );

    out.push_str("OVERVIEW\n");
    out.push_str(&format!("  Total pages: {}\n", report.total_pages));
    for (label, count) in [
        ("Pages with images", report.pages_with_images),
        ("Pages with text", report.pages_with_text),
        ("Fully complete", report.fully_complete),
    ] {
        out.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            label,
            count,
            report.percent(count)
        ));
    }

    if let Some(stats) = &report.text_stats {
        out.push_str("\nTEXT\n");
        out.push_str(&format!("  Mean length: {:.0} characters\n", stats.mean));
        out.push_str(&format!("  Shortest: {} characters\n", stats.min));
        out.push_str(&format!("  Longest: {} characters\n", stats.max));
        out.push_str(&format!("  Total: {} characters\n", stats.sum));
    }

    if !report.image_sources.is_empty() {
        out.push_str("\nIMAGE SOURCES\n");
        for (source, count) in &report.image_sources {
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                source,
                count,
                report.percent(*count)
            ));
        }
    }

    if !report.volumes.is_empty() {
        out.push_str("\nVOLUMES\n");
        for (volume, count) in &report.volumes {
            out.push_str(&format!("  Volume {}: {} pages\n", volume, count));
        }
    }

    if !report.examples.is_empty() {
        out.push_str("\nSAMPLE PAGES\n");
        for (i, record) in report.examples.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, record.page_id));
            out.push_str(&format!("     Image: {}\n", mark(record.image_file.is_some())));
            out.push_str(&format!(
                "     Text: {} ({} characters)\n",
                mark(record.text_file.is_some()),
                record.text_length
            ));
            if let Some(preview) = &record.text_preview {
                out.push_str(&format!("     Preview: {}\n", truncate_preview(preview)));
            }
        }
    }

    out.push_str("\nFILES\n");
    out.push_str(&format!("  Images on disk: {}\n", report.images_on_disk));
    out.push_str(&format!("  Text files: {}\n", report.texts_on_disk));
    out.push_str(&format!("  Total size: {:.2} MiB\n", report.size_mib()));

    if !report.problems.is_empty() {
        out.push_str(&format!("\nPROBLEM PAGES ({})\n", report.problems.len()));
        for problem in report.problems.iter().take(PROBLEM_LIST_LIMIT) {
            out.push_str(&format!(
                "  - {}: {}\n",
                problem.page_id,
                problem.missing.join(", ")
            ));
        }
        if report.problems.len() > PROBLEM_LIST_LIMIT {
            out.push_str(&format!(
                "  ... and {} more\n",
                report.problems.len() - PROBLEM_LIST_LIMIT
            ));
        }
    }

    out.push_str(&format!("\n{}\n\n", rule));
    out.push_str(match report.verdict() {
        Verdict::Complete => "Dataset complete: every page has both image and text.",
        Verdict::Good => "Dataset in good shape: most pages were captured.",
        Verdict::NeedsRerun => "Dataset has gaps: consider re-running the scraper.",
    });
    out.push('\n');
    out
}
