//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{
    DEFAULT_ADMIN_ORDER_PAGE_SIZE, DEFAULT_ORDER_PAGE_SIZE, DEFAULT_PAGE_NUMBER,
    DEFAULT_PAGE_SIZE, MAX_ORDER_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE,
};
use crate::domain::{AdminOrderSummary, OrderSummary, Product};

/// Raw pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub limit: Option<u64>,
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(DEFAULT_PAGE_NUMBER, MAX_PAGE_NUMBER),
            limit: limit.max(1),
        }
    }
}

impl PaginationParams {
    fn page(&self) -> u64 {
        self.page
            .filter(|page| *page >= DEFAULT_PAGE_NUMBER)
            .map_or(DEFAULT_PAGE_NUMBER, |page| page.min(MAX_PAGE_NUMBER))
    }

    /// Product listing: oversized or zero limits fall back to the default.
    pub fn for_products(&self) -> PageRequest {
        let limit = self
            .limit
            .filter(|limit| (1..=MAX_PAGE_SIZE).contains(limit))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        PageRequest::new(self.page(), limit)
    }

    /// Customer order history: limit clamped to the maximum.
    pub fn for_orders(&self) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_ORDER_PAGE_SIZE)
            .clamp(1, MAX_ORDER_PAGE_SIZE);
        PageRequest::new(self.page(), limit)
    }

    /// Admin order list
    pub fn for_admin_orders(&self) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_ADMIN_ORDER_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        PageRequest::new(self.page(), limit)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[aliases(
    ProductPage = Page<Product>,
    OrderPage = Page<OrderSummary>,
    AdminOrderPage = Page<AdminOrderSummary>
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            pages: total.div_ceil(request.limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u64>, limit: Option<u64>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_product_limit_falls_back_when_too_large() {
        assert_eq!(params(None, None).for_products(), PageRequest::new(1, 20));
        assert_eq!(params(Some(3), Some(100)).for_products(), PageRequest::new(3, 100));
        assert_eq!(params(Some(3), Some(101)).for_products().limit, 20);
        assert_eq!(params(Some(0), Some(0)).for_products(), PageRequest::new(1, 20));
    }

    #[test]
    fn test_huge_page_number_clamped() {
        assert_eq!(params(Some(u64::MAX), None).for_products().page, MAX_PAGE_NUMBER);
        assert_eq!(params(Some(u64::MAX), None).for_admin_orders().page, MAX_PAGE_NUMBER);
        assert_eq!(PageRequest::new(u64::MAX, 20).page, MAX_PAGE_NUMBER);
        assert_eq!(params(Some(MAX_PAGE_NUMBER), None).for_orders().page, MAX_PAGE_NUMBER);
    }

    #[test]
    fn test_order_limits_clamped() {
        assert_eq!(params(None, None).for_orders().limit, 20);
        assert_eq!(params(None, Some(80)).for_orders().limit, 50);
        assert_eq!(params(None, None).for_admin_orders().limit, 50);
    }

    #[test]
    fn test_page_count() {
        let request = PageRequest::new(3, 20);

        let page = Page::new(vec![1, 2], request, 41);
        assert_eq!(page.pages, 3);
        assert_eq!(Page::<i32>::new(vec![], request, 0).pages, 0);
    }
}
