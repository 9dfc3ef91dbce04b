use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use serde::Deserialize;
use std::convert::Infallible;

use crate::domain::catalog::Locale;

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Response language: `?lang=` first, then `Accept-Language`, else Spanish
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang)
            .and_then(|tag| Locale::from_tag(&tag));

        let locale = from_query
            .or_else(|| {
                parts
                    .headers
                    .get(ACCEPT_LANGUAGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(Locale::from_accept_language)
            })
            .unwrap_or_default();

        Ok(RequestLocale(locale))
    }
}
