use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::{LocalizedText, Slug};
use crate::domain::errors::{DomainError, DomainResult};

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub slug: Slug,
    pub name: LocalizedText,
    pub description: Option<LocalizedText>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Creates a category, deriving the slug from the Spanish name if none is given
    pub fn new(
        name: LocalizedText,
        description: Option<LocalizedText>,
        slug: Option<&str>,
    ) -> DomainResult<Self> {
        if name.is_blank() {
            return Err(DomainError::validation("Category name cannot be empty"));
        }
        let slug = Slug::from_name(slug.unwrap_or(&name.es)).map_err(DomainError::Validation)?;

        Ok(Self {
            id: Uuid::new_v4(),
            slug,
            name,
            description: description.filter(|d| !d.is_blank()),
            created_at: Utc::now(),
        })
    }

    /// Applies new values while keeping identity and creation time
    pub fn update(
        &mut self,
        name: LocalizedText,
        description: Option<LocalizedText>,
        slug: Option<&str>,
    ) -> DomainResult<()> {
        let updated = Self::new(name, description, slug)?;
        self.slug = updated.slug;
        self.name = updated.name;
        self.description = updated.description;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_derived_from_spanish_name() {
        let category = Category::new(
            LocalizedText::new("Hogar y Decoración", Some("Home".to_string())),
            None,
            None,
        )
        .unwrap();
        assert_eq!(category.slug.as_str(), "hogar-y-decoracion");
    }

    #[test]
    fn explicit_slug_wins() {
        let category = Category::new(LocalizedText::new("Ropa", None), None, Some("moda")).unwrap();
        assert_eq!(category.slug.as_str(), "moda");
    }

    #[test]
    fn empty_name_rejected() {
        assert!(Category::new(LocalizedText::new("  ", None), None, None).is_err());
    }

    #[test]
    fn update_keeps_identity() {
        let mut category = Category::new(LocalizedText::new("Ropa", None), None, None).unwrap();
        let id = category.id;
        category
            .update(LocalizedText::new("Calzado", None), None, None)
            .unwrap();
        assert_eq!(category.id, id);
        assert_eq!(category.slug.as_str(), "calzado");
    }
}
