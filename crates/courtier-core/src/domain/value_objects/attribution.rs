//! Attribution parameters
//!
//! Campaign-tracking key/value pairs captured when a landing page loads and
//! carried through to the project and the submission.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

pub const UTM_SOURCE: &str = "utm_source";
pub const UTM_MEDIUM: &str = "utm_medium";
pub const UTM_CAMPAIGN: &str = "utm_campaign";
pub const UTM_CONTENT: &str = "utm_content";
pub const UTM_TERM: &str = "utm_term";

const UTM_ORDER: [&str; 5] = [UTM_SOURCE, UTM_MEDIUM, UTM_CAMPAIGN, UTM_CONTENT, UTM_TERM];

/// Attribution parameters (utm_* plus any extra ad identifiers)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributionParams(BTreeMap<String, String>);

impl AttributionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a landing-page query string, with or without the leading `?`.
    /// Empty values are dropped.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let params = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self(params)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn source(&self) -> Option<&str> { self.get(UTM_SOURCE) }
    pub fn medium(&self) -> Option<&str> { self.get(UTM_MEDIUM) }
    pub fn campaign(&self) -> Option<&str> { self.get(UTM_CAMPAIGN) }
    pub fn content(&self) -> Option<&str> { self.get(UTM_CONTENT) }
    pub fn term(&self) -> Option<&str> { self.get(UTM_TERM) }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a tagged campaign link. Source, medium and campaign are mandatory;
    /// utm_* keys come first in canonical order, extra keys follow.
    pub fn tagged_url(&self, base: &str) -> Result<Url, AttributionError> {
        for key in [UTM_SOURCE, UTM_MEDIUM, UTM_CAMPAIGN] {
            if self.get(key).is_none() {
                return Err(AttributionError::MissingParameter(key));
            }
        }

        let mut url = Url::parse(base)?;
        {
            let mut pairs = url.query_pairs_mut();
            for key in UTM_ORDER {
                if let Some(value) = self.get(key) {
                    pairs.append_pair(key, value);
                }
            }
            for (key, value) in self.iter() {
                if !UTM_ORDER.contains(&key) && !value.is_empty() {
                    pairs.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }
}

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("missing attribution parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query() {
        let params = AttributionParams::from_query(
            "?utm_source=facebook&utm_medium=cpc&utm_campaign=mutuelle_senior_q1_2024&utm_term=mutuelle%2Bsenior&ad_id=fb_123456&utm_content=",
        );
        assert_eq!(params.source(), Some("facebook"));
        assert_eq!(params.campaign(), Some("mutuelle_senior_q1_2024"));
        assert_eq!(params.term(), Some("mutuelle+senior"));
        assert_eq!(params.get("ad_id"), Some("fb_123456"));
        assert_eq!(params.content(), None);
    }

    #[test]
    fn test_tagged_url_orders_utm_first() {
        let params = AttributionParams::new()
            .with("ad_id", "fb_1")
            .with(UTM_CAMPAIGN, "relance_injoignables_j3")
            .with(UTM_MEDIUM, "newsletter")
            .with(UTM_SOURCE, "email");

        let url = params.tagged_url("https://premunia.com/rappel-devis").unwrap();
        assert_eq!(
            url.as_str(),
            "https://premunia.com/rappel-devis?utm_source=email&utm_medium=newsletter&utm_campaign=relance_injoignables_j3&ad_id=fb_1"
        );
    }

    #[test]
    fn test_tagged_url_requires_campaign() {
        let params = AttributionParams::new().with(UTM_SOURCE, "email").with(UTM_MEDIUM, "cpc");
        assert!(matches!(
            params.tagged_url("https://premunia.com/"),
            Err(AttributionError::MissingParameter(UTM_CAMPAIGN))
        ));
    }
}
