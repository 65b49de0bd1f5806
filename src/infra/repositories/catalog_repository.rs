//! Catalog repository: products and categories.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::JoinType;
use uuid::Uuid;

use super::entities::category::{self, Entity as CategoryEntity};
use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::{Category, NewProduct, Product, ProductChanges, ProductFilter};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Filtered product page ordered by name, plus the total match count
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Product>, u64)>;

    /// Active product by slug
    async fn find_active_by_slug(&self, slug: &str) -> AppResult<Option<Product>>;

    /// Product by id, active or not
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    /// Soft delete: clear `is_active`
    async fn deactivate_product(&self, id: Uuid) -> AppResult<Product>;

    /// All active categories, unordered
    async fn list_active_categories(&self) -> AppResult<Vec<Category>>;
}

/// Concrete implementation of CatalogRepository
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<product::Model> {
        ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Product")
    }
}

/// Case-insensitive substring match on name, description or sku.
fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    [
        product::Column::Name,
        product::Column::Description,
        product::Column::Sku,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col((product::Entity, column)))).like(pattern.as_str()),
        )
    })
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Product>, u64)> {
        let mut query = ProductEntity::find();

        if !filter.include_inactive {
            query = query.filter(product::Column::IsActive.eq(true));
        }
        if let Some(slug) = filter.category_slug.as_deref() {
            query = query
                .join(JoinType::InnerJoin, product::Relation::Category.def())
                .filter(category::Column::Slug.eq(slug));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(product::Column::IsFeatured.eq(featured));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(search_condition(term));
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(&self.db, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    async fn find_active_by_slug(&self, slug: &str) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::Slug.eq(slug))
            .filter(product::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(product.sku),
            name: Set(product.name),
            slug: Set(product.slug),
            description: Set(product.description),
            price: Set(product.price),
            unit: Set(product.unit),
            unit_quantity: Set(product.unit_quantity),
            image_url: Set(product.image_url),
            category_id: Set(product.category_id),
            is_active: Set(product.is_active),
            is_featured: Set(product.is_featured),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Product"))?;

        Ok(Product::from(model))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(unit) = changes.unit {
            active.unit = Set(unit);
        }
        if let Some(unit_quantity) = changes.unit_quantity {
            active.unit_quantity = Set(unit_quantity);
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_featured) = changes.is_featured {
            active.is_featured = Set(is_featured);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn deactivate_product(&self, id: Uuid) -> AppResult<Product> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn list_active_categories(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .filter(category::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Category::from).collect())
    }
}
