use serde::{Deserialize, Serialize};

/// Pagination metadata for one loaded page
///
/// Recomputed wholesale on every fetch; never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationState {
    pub total_count: i32,
    pub page_size: i32,
    pub current_offset: i32,
    pub has_more: bool,
    pub total_pages: i32,
}

impl PaginationState {
    /// Derive the full state from a total count and the requested window
    pub fn compute(total_count: i32, page_size: i32, current_offset: i32) -> Self {
        let total_pages = if page_size <= 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        };
        Self {
            total_count,
            page_size,
            current_offset,
            has_more: current_offset + page_size < total_count,
            total_pages,
        }
    }

    /// State before the first load and after a failed one
    pub fn zeroed(page_size: i32) -> Self {
        Self {
            total_count: 0,
            page_size,
            current_offset: 0,
            has_more: false,
            total_pages: 0,
        }
    }
}
