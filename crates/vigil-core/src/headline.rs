use crate::error::{Result, VigilError};
use serde::Deserialize;

/// One article as returned by the news collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawHeadline {
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RawHeadline {
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// `Date: <publishedAt>; Title: <title>; Description: <description>`
    pub fn formatted(&self) -> String {
        format!(
            "Date: {}; Title: {}; Description: {}",
            self.published_at.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    articles: Option<Vec<RawHeadline>>,
}

/// Decode a raw listing payload. A payload without `articles` yields an
/// empty listing; a payload that is not JSON is malformed.
pub fn parse_listing(payload: &[u8]) -> Result<Vec<RawHeadline>> {
    let listing: Listing = serde_json::from_slice(payload)
        .map_err(|e| VigilError::MalformedResponse(format!("news listing: {e}")))?;
    Ok(listing.articles.unwrap_or_default())
}

/// Drop untitled entries and render the rest in listing order.
pub fn format_listing(headlines: &[RawHeadline]) -> Vec<String> {
    headlines
        .iter()
        .filter(|h| h.has_title())
        .map(RawHeadline::formatted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_listing_and_drops_untitled() {
        let payload = br#"{
            "status": "ok",
            "articles": [
                {"publishedAt": "2025-01-10T08:00:00Z", "title": "X", "description": "Y"},
                {"publishedAt": "2025-01-10T09:00:00Z", "title": "", "description": "skip"},
                {"publishedAt": "2025-01-10T10:00:00Z", "description": "no title"},
                {"publishedAt": "2025-01-10T11:00:00Z", "title": "Z", "description": null}
            ]
        }"#;
        let formatted = format_listing(&parse_listing(payload).unwrap());
        assert_eq!(
            formatted,
            vec![
                "Date: 2025-01-10T08:00:00Z; Title: X; Description: Y",
                "Date: 2025-01-10T11:00:00Z; Title: Z; Description: ",
            ]
        );
    }

    #[test]
    fn missing_articles_is_empty() {
        let payload = br#"{"status": "error", "code": "rateLimited"}"#;
        assert!(parse_listing(payload).unwrap().is_empty());
        assert!(parse_listing(br#"{"articles": null}"#).unwrap().is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_listing(b"<html>502</html>").unwrap_err();
        assert!(matches!(err, VigilError::MalformedResponse(_)));
    }
}
