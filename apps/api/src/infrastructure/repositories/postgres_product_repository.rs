use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::catalog::{LocalizedText, Page, Product, ProductFilter, Slug};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::{ProductRepository, StockLines};

const PRODUCT_COLUMNS: &str = "id, sku, slug, name_es, name_en, description_es, description_en, \
     price, compare_at_price, category_id, image_url, stock, reserved, is_active, is_featured, \
     created_at, updated_at";

/// PostgreSQL implementation of ProductRepository
///
/// Inventory changes are single conditional UPDATEs inside one transaction,
/// lines locked in id order.
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    slug: String,
    name_es: String,
    name_en: Option<String>,
    description_es: String,
    description_en: Option<String>,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    category_id: Option<Uuid>,
    image_url: Option<String>,
    stock: i32,
    reserved: i32,
    is_active: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product::from_persistence(
            r.id,
            r.sku,
            Slug::parse(&r.slug).map_err(DomainError::Storage)?,
            LocalizedText::new(r.name_es, r.name_en),
            LocalizedText::new(r.description_es, r.description_en),
            r.price,
            r.compare_at_price,
            r.category_id,
            r.image_url,
            r.stock,
            r.reserved,
            r.is_active,
            r.is_featured,
            r.created_at,
            r.updated_at,
        ))
    }
}

fn into_products(rows: Vec<ProductRow>) -> DomainResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter, category_id: Option<Uuid>) {
    qb.push(" WHERE TRUE");
    if !filter.include_inactive {
        qb.push(" AND is_active");
    }
    if let Some(category_id) = category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND is_featured = ").push_bind(featured);
    }
    if let Some(search) = &filter.search {
        let pattern = format!(
            "%{}%",
            search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        qb.push(" AND (name_es ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name_en ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn sorted_lines(lines: &StockLines) -> Vec<(Uuid, i32)> {
    let mut sorted = lines.to_vec();
    sorted.sort_by_key(|(id, _)| *id);
    sorted
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &Product) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, slug, name_es, name_en, description_es, description_en,
                price, compare_at_price, category_id, image_url, stock, reserved,
                is_active, is_featured, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(product.id())
        .bind(product.sku())
        .bind(product.slug().as_str())
        .bind(&product.name().es)
        .bind(&product.name().en)
        .bind(&product.description().es)
        .bind(&product.description().en)
        .bind(product.price())
        .bind(product.compare_at_price())
        .bind(product.category_id())
        .bind(product.image_url())
        .bind(product.stock())
        .bind(product.reserved())
        .bind(product.is_active())
        .bind(product.is_featured())
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = $2, slug = $3, name_es = $4, name_en = $5, description_es = $6,
                description_en = $7, price = $8, compare_at_price = $9, category_id = $10,
                image_url = $11, is_active = $12, is_featured = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id())
        .bind(product.sku())
        .bind(product.slug().as_str())
        .bind(&product.name().es)
        .bind(&product.name().en)
        .bind(&product.description().es)
        .bind(&product.description().en)
        .bind(product.price())
        .bind(product.compare_at_price())
        .bind(product.category_id())
        .bind(product.image_url())
        .bind(product.is_active())
        .bind(product.is_featured())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Product", product.id()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Product>> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Product>> {
        let query = format!("SELECT {} FROM products WHERE slug = $1", PRODUCT_COLUMNS);
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        into_products(rows)
    }

    async fn list(&self, filter: &ProductFilter, category_id: Option<Uuid>) -> DomainResult<Page<Product>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_qb, filter, category_id);
        let (total,) = count_qb
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
        push_filters(&mut qb, filter, category_id);
        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(i64::from(filter.per_page))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset()));
        let rows = qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;

        Ok(Page {
            items: into_products(rows)?,
            total: total as u64,
            page: filter.page,
            per_page: filter.per_page,
        })
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_in_category(&self, category_id: Uuid) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn low_stock(&self, threshold: i32) -> DomainResult<Vec<Product>> {
        let query = format!(
            "SELECT {} FROM products WHERE is_active AND stock - reserved <= $1 \
             ORDER BY stock - reserved, sku",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;
        into_products(rows)
    }

    async fn set_stock(&self, id: Uuid, stock: i32) -> DomainResult<Product> {
        if stock < 0 {
            return Err(DomainError::validation("Stock cannot be negative"));
        }
        let query = format!(
            "UPDATE products SET stock = $2, updated_at = NOW() \
             WHERE id = $1 AND reserved <= $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(stock)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Product::try_from(row),
            None => match self.find_by_id(id).await? {
                Some(product) => Err(DomainError::conflict(format!(
                    "Stock {} is below reserved quantity {}",
                    stock,
                    product.reserved()
                ))),
                None => Err(DomainError::not_found("Product", id)),
            },
        }
    }

    async fn reserve(&self, lines: &StockLines) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        for (product_id, quantity) in sorted_lines(lines) {
            let reserved = sqlx::query(
                r#"
                UPDATE products
                SET reserved = reserved + $2, updated_at = NOW()
                WHERE id = $1 AND is_active AND stock - reserved >= $2
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            if reserved.rows_affected() == 0 {
                let current: Option<(String, i32)> =
                    sqlx::query_as("SELECT sku, stock - reserved FROM products WHERE id = $1")
                        .bind(product_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tx.rollback().await?;

                return Err(match current {
                    Some((sku, available)) => DomainError::InsufficientStock {
                        sku,
                        requested: quantity,
                        available,
                    },
                    None => DomainError::not_found("Product", product_id),
                });
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn release(&self, lines: &StockLines) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in sorted_lines(lines) {
            sqlx::query(
                "UPDATE products SET reserved = GREATEST(reserved - $2, 0), updated_at = NOW() WHERE id = $1",
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn commit(&self, lines: &StockLines) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in sorted_lines(lines) {
            sqlx::query(
                r#"
                UPDATE products
                SET stock = GREATEST(stock - $2, 0),
                    reserved = GREATEST(reserved - $2, 0),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn restock(&self, lines: &StockLines) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in sorted_lines(lines) {
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
                .bind(product_id)
                .bind(quantity.max(0))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
