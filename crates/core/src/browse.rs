//! Filtering, ordering and pagination of the catalog (the "browse engine").
//!
//! All functions here are pure: they take the full record list plus the
//! current [`ViewControls`] and compute what is visible. Nothing here can
//! fail; an out-of-range page simply shows nothing.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::record::Workflow;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of entries kept in the tag frequency index.
pub const TAG_INDEX_LIMIT: usize = 20;

/// Page size used until the user picks another one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the page-size selector (plus "all").
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

// ---------------------------------------------------------------------------
// Control types
// ---------------------------------------------------------------------------

/// How many records a page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Paged(NonZeroUsize),
    /// Everything on one page.
    Unbounded,
}

impl PageSize {
    /// Parse `"all"` or a positive integer.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::Unbounded);
        }
        s.parse::<NonZeroUsize>().map(Self::Paged).map_err(|_| {
            CoreError::Validation(format!(
                "Invalid page size '{s}'. Must be a positive integer or 'all'"
            ))
        })
    }

    /// Number of records per page, `None` when unbounded.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Paged(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        match NonZeroUsize::new(DEFAULT_PAGE_SIZE) {
            Some(n) => Self::Paged(n),
            None => Self::Unbounded,
        }
    }
}

/// Order of the filtered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Reverse of fetch order: the last sheet row comes first.
    #[default]
    NewestFirst,
    /// Fetch order.
    OldestFirst,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }
}

/// Grid or list rendering of the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// User-controlled browse state.
///
/// The page number goes back to 1 whenever the search text, the tag
/// selection or the page size changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewControls {
    search: String,
    selected_tags: Vec<String>,
    page: usize,
    page_size: PageSize,
    sort: SortDirection,
    view_mode: ViewMode,
    dark_mode: bool,
}

impl Default for ViewControls {
    fn default() -> Self {
        Self {
            search: String::new(),
            selected_tags: Vec::new(),
            page: 1,
            page_size: PageSize::default(),
            sort: SortDirection::default(),
            view_mode: ViewMode::default(),
            dark_mode: false,
        }
    }
}

impl ViewControls {
    pub fn with_dark_mode(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..Self::default()
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.selected_tags
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn sort(&self) -> SortDirection {
        self.sort
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Add the tag if it is not selected, remove it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(pos);
        } else {
            self.selected_tags.push(tag.to_string());
        }
        self.page = 1;
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggled();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// `true` if the record passes both the text search and the tag filter.
///
/// Search is a case-insensitive substring match against the title or the
/// description. Tags use AND semantics: every selected tag must be present.
pub fn matches(workflow: &Workflow, search: &str, selected_tags: &[String]) -> bool {
    let text_ok = search.is_empty() || {
        let needle = search.to_lowercase();
        workflow.title.to_lowercase().contains(&needle)
            || workflow.description.to_lowercase().contains(&needle)
    };
    text_ok && selected_tags.iter().all(|tag| workflow.has_tag(tag))
}

/// Records that pass [`matches`], in their original order.
pub fn filter<'a>(
    records: &'a [Workflow],
    search: &str,
    selected_tags: &[String],
) -> Vec<&'a Workflow> {
    records
        .iter()
        .filter(|w| matches(w, search, selected_tags))
        .collect()
}

/// Order a filtered list. Reversal is the whole algorithm; there is no
/// secondary key.
pub fn sort<T>(mut items: Vec<T>, direction: SortDirection) -> Vec<T> {
    if direction == SortDirection::NewestFirst {
        items.reverse();
    }
    items
}

/// Number of pages for `total` items. Unbounded is always one page.
pub fn page_count(total: usize, page_size: PageSize) -> usize {
    match page_size.limit() {
        Some(size) => total.div_ceil(size),
        None => 1,
    }
}

/// The slice of `items` visible on `page` (1-based).
///
/// Page 0 and pages past the end yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: PageSize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let Some(size) = page_size.limit() else {
        return if page == 1 { items } else { &[] };
    };
    let start = (page - 1).saturating_mul(size).min(items.len());
    let end = page.saturating_mul(size).min(items.len());
    &items[start..end]
}

/// The visible page plus the numbers a pagination control needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowsePage {
    pub items: Vec<Workflow>,
    /// Records matching the filter, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: PageSize,
    /// 1-based index of the first visible record, 0 when none are visible.
    pub showing_from: usize,
    /// 1-based index of the last visible record, 0 when none are visible.
    pub showing_to: usize,
}

/// Filter, sort and slice `records` according to `controls`.
pub fn browse(records: &[Workflow], controls: &ViewControls) -> BrowsePage {
    let filtered = filter(records, controls.search(), controls.selected_tags());
    let sorted = sort(filtered, controls.sort());
    let total = sorted.len();
    let visible = paginate(&sorted, controls.page(), controls.page_size());

    let (showing_from, showing_to) = if visible.is_empty() {
        (0, 0)
    } else {
        let offset = match controls.page_size().limit() {
            Some(size) => (controls.page() - 1) * size,
            None => 0,
        };
        (offset + 1, offset + visible.len())
    };

    BrowsePage {
        items: visible.iter().map(|w| (*w).clone()).collect(),
        total,
        page: controls.page(),
        page_count: page_count(total, controls.page_size()),
        page_size: controls.page_size(),
        showing_from,
        showing_to,
    }
}

// ---------------------------------------------------------------------------
// Tag index
// ---------------------------------------------------------------------------

/// A tag and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// The [`TAG_INDEX_LIMIT`] most frequent tags across `records`.
///
/// Sorted by descending count; ties keep first-encountered order.
pub fn tag_index(records: &[Workflow]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for tag in records.iter().flat_map(|w| w.tags.iter()) {
        match positions.get(tag.as_str()) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                positions.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TAG_INDEX_LIMIT);
    counts
}

/// Every distinct tag, alphabetically.
pub fn all_tags(records: &[Workflow]) -> Vec<String> {
    let mut tags: Vec<String> = records
        .iter()
        .flat_map(|w| w.tags.iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
