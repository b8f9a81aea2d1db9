//! Page arithmetic shared by the client and the dashboard.

/// Articles requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Largest page the backend will serve; larger requests are reset by it.
pub const MAX_PER_PAGE: u32 = 100;

/// Number of page buttons shown at once.
pub const WINDOW: u32 = 5;

pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total.div_ceil(per_page as u64);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Sliding window of page numbers around `current`.
///
/// Small result sets show every page. Otherwise the window sticks to the
/// first or last five pages near either end and centres on `current` in
/// between.
pub fn page_window(current: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let start = if total_pages <= WINDOW || current <= 3 {
        1
    } else if current >= total_pages.saturating_sub(2) {
        total_pages - (WINDOW - 1)
    } else {
        current - 2
    };
    let end = (start + WINDOW - 1).min(total_pages);
    (start..=end).collect()
}

pub fn has_next(current: u32, total_pages: u32) -> bool {
    current < total_pages
}

pub fn has_prev(current: u32) -> bool {
    current > 1
}

/// Clamp request parameters to what the backend accepts.
pub fn normalize(page: u32, per_page: u32) -> (u32, u32) {
    (page.max(1), per_page.clamp(1, MAX_PER_PAGE))
}
