//! Catalog service - product browsing, the category tree and product admin.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ADMIN_PRODUCT_LIST_LIMIT;
use crate::domain::{build_category_tree, CategoryNode, NewProduct, Product, ProductChanges, ProductFilter};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PageRequest};

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active products matching `filter`, ordered by name
    async fn list_products(&self, filter: ProductFilter, page: PageRequest) -> AppResult<Page<Product>>;

    async fn get_product(&self, slug: &str) -> AppResult<Product>;

    /// Active categories as a tree
    async fn category_tree(&self) -> AppResult<Vec<CategoryNode>>;

    /// Back-office listing, unpaginated
    async fn admin_list_products(&self, include_inactive: bool) -> AppResult<Vec<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    /// Soft delete
    async fn delete_product(&self, id: Uuid) -> AppResult<Product>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_products(&self, filter: ProductFilter, page: PageRequest) -> AppResult<Page<Product>> {
        let filter = ProductFilter {
            include_inactive: false,
            search: filter.search.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
            ..filter
        };
        let (items, total) = self.uow.catalog().list_products(filter, page).await?;
        Ok(Page::new(items, page, total))
    }

    async fn get_product(&self, slug: &str) -> AppResult<Product> {
        self.uow
            .catalog()
            .find_active_by_slug(slug)
            .await?
            .ok_or_not_found("Product")
    }

    async fn category_tree(&self) -> AppResult<Vec<CategoryNode>> {
        let categories = self.uow.catalog().list_active_categories().await?;
        let forest = build_category_tree(categories);

        if !forest.unreachable.is_empty() {
            tracing::warn!(
                category_ids = ?forest.unreachable,
                "Categories with a broken parent chain left out of the tree"
            );
        }

        Ok(forest.roots)
    }

    async fn admin_list_products(&self, include_inactive: bool) -> AppResult<Vec<Product>> {
        let filter = ProductFilter {
            include_inactive,
            ..ProductFilter::default()
        };
        let (items, _) = self
            .uow
            .catalog()
            .list_products(filter, PageRequest::new(1, ADMIN_PRODUCT_LIST_LIMIT))
            .await?;
        Ok(items)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        product.check_amounts()?;
        let created = self.uow.catalog().create_product(product).await?;
        tracing::info!(product_id = %created.id, sku = %created.sku, "Product created");
        Ok(created)
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        changes.check_amounts()?;
        self.uow
            .catalog()
            .find_product(id)
            .await?
            .ok_or_not_found("Product")?;
        self.uow.catalog().update_product(id, changes).await
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<Product> {
        self.uow
            .catalog()
            .find_product(id)
            .await?
            .ok_or_not_found("Product")?;
        let product = self.uow.catalog().deactivate_product(id).await?;
        tracing::info!(product_id = %id, "Product deactivated");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::errors::AppError;
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn service(repos: MockRepositories) -> CatalogManager<TestUnitOfWork> {
        CatalogManager::new(Arc::new(TestUnitOfWork::new(repos)))
    }

    fn product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            sku: format!("SKU-{}", name),
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            price: Decimal::new(1995, 2),
            unit: "stk".into(),
            unit_quantity: Decimal::ONE,
            image_url: None,
            category_id: Some(1),
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn category(id: i32, parent_id: Option<i32>, sort_order: i32) -> Category {
        Category {
            id,
            name: format!("Category {}", id),
            slug: format!("category-{}", id),
            parent_id,
            sort_order,
            is_active: true,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_list_products_forces_active_only_and_pages() {
        let mut repos = MockRepositories::default();
        repos
            .catalog
            .expect_list_products()
            .withf(|filter, page| {
                !filter.include_inactive
                    && filter.search.as_deref() == Some("mælk")
                    && page.page == 2
                    && page.limit == 20
            })
            .returning(|_, _| Ok((vec![product("Letmælk")], 21)));

        let page = service(repos)
            .list_products(
                ProductFilter {
                    search: Some("  mælk ".into()),
                    include_inactive: true,
                    ..ProductFilter::default()
                },
                PageRequest::new(2, 20),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 21);
        assert_eq!(page.pages, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let mut repos = MockRepositories::default();
        repos.catalog.expect_find_active_by_slug().returning(|_| Ok(None));

        let result = service(repos).get_product("ukendt").await;
        assert!(matches!(result, Err(AppError::NotFound("Product"))));
    }

    #[tokio::test]
    async fn test_category_tree_nests_children() {
        let mut repos = MockRepositories::default();
        repos.catalog.expect_list_active_categories().returning(|| {
            Ok(vec![
                category(2, Some(1), 1),
                category(1, None, 0),
                category(3, Some(1), 0),
                category(9, Some(42), 0),
            ])
        });

        let roots = service(repos).category_tree().await.unwrap();
        assert_eq!(roots.len(), 1);
        let children: Vec<i32> = roots[0].children.iter().map(|c| c.id).collect();
        assert_eq!(children, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_create_product_rejects_non_positive_price() {
        let mut repos = MockRepositories::default();
        repos.catalog.expect_create_product().never();

        let result = service(repos)
            .create_product(NewProduct {
                sku: "X-1".into(),
                slug: "x".into(),
                name: "X".into(),
                description: None,
                price: Decimal::ZERO,
                unit: "stk".into(),
                unit_quantity: Decimal::ONE,
                image_url: None,
                category_id: None,
                is_active: true,
                is_featured: false,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_product_is_not_found() {
        let mut repos = MockRepositories::default();
        repos.catalog.expect_find_product().returning(|_| Ok(None));
        repos.catalog.expect_deactivate_product().never();

        let result = service(repos).delete_product(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound("Product"))));
    }

    #[tokio::test]
    async fn test_delete_product_deactivates() {
        let mut repos = MockRepositories::default();
        repos
            .catalog
            .expect_find_product()
            .returning(|_| Ok(Some(product("Rugbrød"))));
        repos.catalog.expect_deactivate_product().returning(|_| {
            let mut p = product("Rugbrød");
            p.is_active = false;
            Ok(p)
        });

        let product = service(repos).delete_product(Uuid::new_v4()).await.unwrap();
        assert!(!product.is_active);
    }
}
