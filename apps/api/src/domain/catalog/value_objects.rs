use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Parses a language tag such as `en`, `en-US` or `es-CO`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Picks the first supported language in an `Accept-Language` header
    ///
    /// Quality weights are ignored; the header order is taken as preference.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(Self::from_tag)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Text stored in both storefront languages
///
/// Spanish is mandatory; English falls back to Spanish when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub es: String,
    #[serde(default)]
    pub en: Option<String>,
}

impl LocalizedText {
    pub fn new(es: impl Into<String>, en: Option<String>) -> Self {
        Self {
            es: es.into().trim().to_string(),
            en: en.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match (locale, self.en.as_deref()) {
            (Locale::En, Some(en)) => en,
            _ => &self.es,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.es.is_empty()
    }

    /// Case-insensitive match against either language
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.es.to_lowercase().contains(&needle)
            || self
                .en
                .as_deref()
                .map(|en| en.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// URL-safe identifier derived from a name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Builds a slug from free text, folding Spanish accents
    ///
    /// # Example
    /// ```
    /// use tienda_api::domain::catalog::value_objects::Slug;
    ///
    /// let slug = Slug::from_name("Café de Origen Huila").unwrap();
    /// assert_eq!(slug.as_str(), "cafe-de-origen-huila");
    /// ```
    pub fn from_name(name: &str) -> Result<Self, String> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.chars().flat_map(char::to_lowercase).map(fold_accent) {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            Err(format!("Cannot build slug from '{}'", name))
        } else {
            Ok(Slug(slug))
        }
    }

    /// Accepts an already formed slug, normalizing it
    pub fn parse(value: &str) -> Result<Self, String> {
        Self::from_name(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}
