//! Page Range Resolution
//!
//! Turns the range-selection options of a run into the ordered,
//! duplicate-free list of pages to fetch.

use pecha_common::{PageId, ResolveError, Side};
use std::collections::HashSet;

/// Range-selection options of one run.
///
/// When `pages` is set it replaces the generated range entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pub pages: Option<Vec<String>>,
    pub start_vol: u32,
    pub end_vol: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub max_pages: Option<usize>,
}

impl Default for PageSelection {
    fn default() -> Self {
        Self {
            pages: None,
            start_vol: 1,
            end_vol: 1,
            start_page: 1,
            end_page: 5,
            max_pages: None,
        }
    }
}

impl PageSelection {
    pub fn explicit<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: Some(pages.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn range(start_vol: u32, end_vol: u32, start_page: u32, end_page: u32) -> Self {
        Self {
            pages: None,
            start_vol,
            end_vol,
            start_page,
            end_page,
            max_pages: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Resolves a selection into the pages to fetch.
///
/// Explicit identifiers are validated before anything else, so a single
/// malformed entry fails the whole selection. Swapped bounds are not an
/// error by themselves; they simply produce nothing, which then fails as
/// [`ResolveError::EmptyRange`].
pub fn resolve(selection: &PageSelection) -> Result<Vec<PageId>, ResolveError> {
    let limit = selection.max_pages.unwrap_or(usize::MAX);
    let resolved = match &selection.pages {
        Some(pages) => first_unique(parse_explicit(pages)?, limit),
        None => first_unique(
            range_iter(
                selection.start_vol,
                selection.end_vol,
                selection.start_page,
                selection.end_page,
            ),
            limit,
        ),
    };

    if resolved.is_empty() {
        return Err(ResolveError::EmptyRange);
    }
    Ok(resolved)
}

fn parse_explicit(pages: &[String]) -> Result<Vec<PageId>, ResolveError> {
    pages
        .iter()
        .map(|raw| raw.parse::<PageId>().map_err(ResolveError::from))
        .collect()
}

/// Lazily enumerates a range: volumes outer, folios inner, side `a` before
/// `b`. Both bounds are inclusive and a zero lower bound counts as 1.
pub fn range_iter(
    start_vol: u32,
    end_vol: u32,
    start_page: u32,
    end_page: u32,
) -> impl Iterator<Item = PageId> {
    (start_vol.max(1)..=end_vol).flat_map(move |volume| {
        (start_page.max(1)..=end_page).flat_map(move |folio| {
            Side::BOTH
                .into_iter()
                .filter_map(move |side| PageId::new(volume, folio, side))
        })
    })
}

/// Eagerly collected [`range_iter`].
pub fn expand_range(start_vol: u32, end_vol: u32, start_page: u32, end_page: u32) -> Vec<PageId> {
    range_iter(start_vol, end_vol, start_page, end_page).collect()
}

/// Drops repeated pages, keeping each at its first position.
pub fn dedup_stable(pages: Vec<PageId>) -> Vec<PageId> {
    first_unique(pages, usize::MAX)
}

/// The first `limit` distinct pages; stops consuming `pages` once reached.
fn first_unique<I>(pages: I, limit: usize) -> Vec<PageId>
where
    I: IntoIterator<Item = PageId>,
{
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .filter(|page| seen.insert(page.clone()))
        .take(limit)
        .collect()
}
