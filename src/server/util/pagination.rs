use serde::Deserialize;
use utoipa::IntoParams;

use crate::model::api::PageDto;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Query parameters accepted by every paginated endpoint.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Zero-based page index (default: 0)
    #[serde(default)]
    pub page: u64,
    /// Items per page (default: 10, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_per_page() -> u64 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Returns the params with `per_page` clamped to `1..=MAX_PER_PAGE`.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page,
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

/// Number of pages needed to show `total` items.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page > 0 {
        (total as f64 / per_page as f64).ceil() as u64
    } else {
        0
    }
}

/// One page of domain items with the request's paging parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    pub fn into_dto<D>(self, convert: impl FnMut(T) -> D) -> PageDto<D> {
        PageDto {
            total_pages: total_pages(self.total, self.per_page),
            items: self.items.into_iter().map(convert).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn clamps_page_size() {
        let params = PaginationParams {
            page: 2,
            per_page: 500,
        }
        .clamped();
        assert_eq!(params.per_page, MAX_PER_PAGE);
        assert_eq!(params.page, 2);

        let params = PaginationParams {
            page: 0,
            per_page: 0,
        }
        .clamped();
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn converts_page_to_dto() {
        let page = Page::new(
            vec![1, 2, 3],
            23,
            PaginationParams {
                page: 1,
                per_page: 3,
            },
        );
        let dto = page.into_dto(|n| n * 10);
        assert_eq!(dto.items, vec![10, 20, 30]);
        assert_eq!(dto.total_pages, 8);
        assert_eq!(dto.page, 1);
    }
}
