//! Paging for the read path.

use crate::model::OrderStatus;

/// 1-based page request. `limit` defaults to 20 and is capped at [`Page::MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Page 0 reads as page 1; limit 0 reads as the default.
    pub fn normalized(self) -> Self {
        let limit = match self.limit {
            0 => Self::DEFAULT_LIMIT,
            n => n.min(Self::MAX_LIMIT),
        };
        Self {
            page: self.page.max(1),
            limit,
        }
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    /// Matches across all pages.
    pub total: usize,
}

impl<T> Paged<T> {
    /// Cuts one page out of an already sorted list.
    pub fn slice(items: Vec<T>, page: Page) -> Self {
        let page = page.normalized();
        let total = items.len();
        let items = items
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .collect();
        Self {
            items,
            page: page.page,
            limit: page.limit,
            total,
        }
    }
}

/// Filters for [`list_orders`](super::FulfillmentService::list_orders). Who the caller is
/// decides whose orders are visible; this only narrows further.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub page: Page,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_defaulted_and_capped() {
        assert_eq!(Page::new(0, 0).normalized(), Page::new(1, 20));
        assert_eq!(Page::new(3, 500).normalized(), Page::new(3, 100));
    }

    #[test]
    fn slice_reports_total_and_window() {
        let paged = Paged::slice((1..=45).collect::<Vec<_>>(), Page::new(3, 20));
        assert_eq!(paged.total, 45);
        assert_eq!(paged.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(paged.page, 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let paged = Paged::slice(vec![1, 2, 3], Page::new(5, 2));
        assert!(paged.items.is_empty());
        assert_eq!(paged.total, 3);
    }
}
