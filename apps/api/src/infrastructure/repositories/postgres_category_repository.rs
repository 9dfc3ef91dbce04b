use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{Category, LocalizedText, Slug};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::CategoryRepository;

const CATEGORY_COLUMNS: &str =
    "id, slug, name_es, name_en, description_es, description_en, created_at";

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    slug: String,
    name_es: String,
    name_en: Option<String>,
    description_es: Option<String>,
    description_en: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = DomainError;

    fn try_from(r: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: r.id,
            slug: Slug::parse(&r.slug).map_err(DomainError::Storage)?,
            name: LocalizedText::new(r.name_es, r.name_en),
            description: r
                .description_es
                .map(|es| LocalizedText::new(es, r.description_en)),
            created_at: r.created_at,
        })
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> DomainResult<Vec<Category>> {
        let query = format!("SELECT {} FROM categories ORDER BY name_es", CATEGORY_COLUMNS);
        sqlx::query_as::<_, CategoryRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Category>> {
        let query = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Category>> {
        let query = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    async fn create(&self, category: &Category) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, slug, name_es, name_en, description_es, description_en, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(category.id)
        .bind(category.slug.as_str())
        .bind(&category.name.es)
        .bind(&category.name.en)
        .bind(category.description.as_ref().map(|d| &d.es))
        .bind(category.description.as_ref().and_then(|d| d.en.as_ref()))
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET slug = $2, name_es = $3, name_en = $4, description_es = $5, description_en = $6
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(category.slug.as_str())
        .bind(&category.name.es)
        .bind(&category.name.en)
        .bind(category.description.as_ref().map(|d| &d.es))
        .bind(category.description.as_ref().and_then(|d| d.en.as_ref()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Category", category.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Category", id));
        }
        Ok(())
    }
}
