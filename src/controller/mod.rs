//! Listing logic that sits between the store and whatever renders it:
//! category derivation and filtering over the loaded page, page navigation
//! and the pagination window.
//!
//! Category filtering only re-slices the page that is currently loaded; it
//! never asks the server for a filtered query.

use tracing::debug;

use crate::api::ProjectApi;
use crate::models::Project;
use crate::store::{ProjectStore, StoreError, StoreState};

/// Pseudo-category meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All";

/// Page sizes offered in the listing.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [4, 6, 8, 12];

/// Pages on each side of the current one that are always shown.
const PAGE_NEIGHBORHOOD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

/// `"All"` followed by the distinct categories of `projects` in first-seen order.
///
/// Categories that differ only in case are folded into the first spelling seen.
pub fn derive_categories(projects: &[Project]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for project in projects {
        let label = project.category_label();
        if !categories[1..].iter().any(|seen| same_category(seen, label)) {
            categories.push(label.to_string());
        }
    }
    categories
}

/// Projects of the loaded page that belong to `category`, compared case-insensitively.
pub fn filter_by_category<'a>(projects: &'a [Project], category: &str) -> Vec<&'a Project> {
    if category == ALL_CATEGORIES {
        return projects.iter().collect();
    }
    let wanted = category.to_lowercase();
    projects
        .iter()
        .filter(|project| project.category_label().to_lowercase() == wanted)
        .collect()
}

/// Case-insensitive comparison over the full Unicode lowercase mapping.
fn same_category(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Offset of the first record on `page` (1-based).
pub fn page_offset(page: u32, page_size: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: i64, total_pages: u32) -> u32 {
    let last = i64::from(total_pages.max(1));
    // Bounded by `last`, which came from a u32.
    page.clamp(1, last) as u32
}

/// Page numbers to display: the first and last page plus everything within
/// two pages of `current`, with one ellipsis for each collapsed gap.
pub fn pagination_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    let mut items = Vec::new();
    for page in 1..=total_pages {
        if page == 1 || page == total_pages || page.abs_diff(current) <= PAGE_NEIGHBORHOOD {
            items.push(PageItem::Page(page));
        } else if items.last() != Some(&PageItem::Ellipsis) {
            items.push(PageItem::Ellipsis);
        }
    }
    items
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestKey {
    page: u32,
    page_size: u32,
    category: String,
}

/// Listing state owned by the view: selected category and page size, and
/// the key of the last page requested from the store.
pub struct ListController {
    selected_category: String,
    page_size: u32,
    last_request: Option<RequestKey>,
    scroll_to_top: bool,
}

impl ListController {
    pub fn new(page_size: u32) -> Self {
        Self {
            selected_category: ALL_CATEGORIES.to_string(),
            page_size: page_size.max(1),
            last_request: None,
            scroll_to_top: false,
        }
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn categories(&self, state: &StoreState) -> Vec<String> {
        derive_categories(&state.projects)
    }

    pub fn visible<'a>(&self, state: &'a StoreState) -> Vec<&'a Project> {
        filter_by_category(&state.projects, &self.selected_category)
    }

    pub fn pagination(&self, state: &StoreState) -> Vec<PageItem> {
        pagination_window(state.current_page, state.total_pages)
    }

    pub fn select_category<A: ProjectApi>(&mut self, store: &ProjectStore<A>, category: &str) {
        self.selected_category = category.to_string();
        store.set_current_page(1);
    }

    /// Select the category after (or before) the current one, wrapping around.
    pub fn cycle_category<A: ProjectApi>(&mut self, store: &ProjectStore<A>, forward: bool) {
        let categories = self.categories(&store.state());
        let position = categories
            .iter()
            .position(|category| *category == self.selected_category)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % categories.len()
        } else {
            (position + categories.len() - 1) % categories.len()
        };
        self.select_category(store, &categories[next]);
    }

    pub fn set_page_size<A: ProjectApi>(&mut self, store: &ProjectStore<A>, page_size: u32) {
        self.page_size = page_size.max(1);
        store.set_current_page(1);
    }

    /// Switch to the next entry of [`PAGE_SIZE_OPTIONS`].
    pub fn cycle_page_size<A: ProjectApi>(&mut self, store: &ProjectStore<A>) {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .position(|size| *size == self.page_size)
            .map(|i| PAGE_SIZE_OPTIONS[(i + 1) % PAGE_SIZE_OPTIONS.len()])
            .unwrap_or(PAGE_SIZE_OPTIONS[0]);
        self.set_page_size(store, next);
    }

    /// Move to `page`, clamped to the known page range, and ask the view to scroll to the top.
    pub fn go_to_page<A: ProjectApi>(&mut self, store: &ProjectStore<A>, page: i64) -> u32 {
        let target = clamp_page(page, store.state().total_pages);
        store.set_current_page(target);
        self.scroll_to_top = true;
        target
    }

    /// Pull the current page back into range after the page count shrank.
    ///
    /// Returns `true` when the store's current page was changed.
    pub fn correct_page_bounds<A: ProjectApi>(&self, store: &ProjectStore<A>) -> bool {
        let state = store.state();
        let last = state.total_pages.max(1);
        if state.current_page > last {
            debug!(
                from = state.current_page,
                to = last,
                "current page out of range, correcting"
            );
            store.set_current_page(last);
            return true;
        }
        false
    }

    /// The page to request when page, page size or category changed since the last request.
    pub fn next_request(&mut self, state: &StoreState) -> Option<PageRequest> {
        let key = RequestKey {
            page: state.current_page,
            page_size: self.page_size,
            category: self.selected_category.clone(),
        };
        if self.last_request.as_ref() == Some(&key) {
            return None;
        }

        let request = PageRequest {
            limit: self.page_size,
            offset: page_offset(key.page, self.page_size),
        };
        self.last_request = Some(key);
        Some(request)
    }

    /// Force the next [`refresh`](Self::refresh) to re-fetch the current page.
    pub fn invalidate(&mut self) {
        self.last_request = None;
    }

    /// Fetch until the request key is stable, correcting the current page
    /// whenever the server reports fewer pages than the one being shown.
    pub async fn refresh<A: ProjectApi>(
        &mut self,
        store: &ProjectStore<A>,
    ) -> Result<(), StoreError> {
        self.correct_page_bounds(store);
        while let Some(request) = self.next_request(&store.state()) {
            store.fetch_page(request.limit, request.offset).await?;
            self.correct_page_bounds(store);
        }
        Ok(())
    }

    /// Returns whether a scroll-to-top was requested since the last call.
    pub fn take_scroll_to_top(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    /// Footer line such as `Page 2 of 5 (3 projects)`.
    pub fn summary(&self, state: &StoreState) -> String {
        format!(
            "Page {} of {} ({} projects)",
            state.current_page,
            state.total_pages,
            self.visible(state).len()
        )
    }
}
