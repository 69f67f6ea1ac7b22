use serde::Serialize;

use crate::scorecards::common::ScorecardError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page selection for the search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, ScorecardError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(ScorecardError::Validation(
                "page must be 1 or greater".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ScorecardError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(self) -> u32 {
        self.page
    }

    pub fn page_size(self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of an already filtered and ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn of(rows: Vec<T>, request: PageRequest) -> Self {
        let total = rows.len() as u64;
        let page_size = u64::from(request.page_size);
        let total_pages = u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX);
        let start = usize::try_from(u64::from(request.page - 1) * page_size).unwrap_or(usize::MAX);

        let data = rows
            .into_iter()
            .skip(start)
            .take(request.page_size as usize)
            .collect();

        Self {
            data,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }
}
