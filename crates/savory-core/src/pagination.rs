//! Page-window arithmetic for board navigation.

use std::ops::RangeInclusive;

/// Posts shown on one board page.
pub const PAGE_SIZE: u64 = 4;

/// Page numbers shown in the navigation bar.
pub const WINDOW_SIZE: u64 = 5;

/// Number of the last page holding data, never less than 1.
pub fn last_page(total_count: u64, page_size: u64) -> u64 {
  total_count.div_ceil(page_size.max(1)).max(1)
}

/// The contiguous page numbers to show around `current_page`.
///
/// Up to page 3 the window starts at 1; after that `current_page` sits third
/// in the window. The window is cut at the last page, and when `current_page`
/// lies past the data the window collapses onto the last page, so it is never
/// empty. An empty directory yields `1..=1`.
pub fn page_window(
  current_page: u64,
  total_count: u64,
  page_size: u64,
  window_size: u64,
) -> RangeInclusive<u64> {
  let last = last_page(total_count, page_size);
  let anchored = if current_page <= 3 { 1 } else { current_page - 2 };
  let start = anchored.min(last);
  let end = last.min(start.saturating_add(window_size.max(1) - 1));
  start..=end
}

/// [`page_window`] with the board's fixed page and window sizes.
pub fn board_window(current_page: u64, total_count: u64) -> Vec<u64> {
  page_window(current_page, total_count, PAGE_SIZE, WINDOW_SIZE).collect()
}
