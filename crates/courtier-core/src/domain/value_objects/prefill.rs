//! Prefill claims supplied by an authenticated referrer

use serde::{Deserialize, Serialize};

use super::field_ids;

/// Identity claims used to prefill the first step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefillClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl PrefillClaims {
    /// Non-empty claims keyed by the form field they fill
    pub fn field_values(&self) -> Vec<(&'static str, String)> {
        [
            (field_ids::EMAIL, &self.email),
            (field_ids::PHONE, &self.phone),
            (field_ids::FIRST_NAME, &self.first_name),
            (field_ids::LAST_NAME, &self.last_name),
        ]
        .into_iter()
        .filter_map(|(field, claim)| {
            claim
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| (field, v.clone()))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.field_values().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping() {
        let claims = PrefillClaims {
            email: Some("a@b.fr".into()),
            phone: Some("0612345678".into()),
            first_name: Some(String::new()),
            last_name: None,
        };
        let values = claims.field_values();
        assert_eq!(
            values,
            vec![("email", "a@b.fr".to_string()), ("telephone", "0612345678".to_string())]
        );
        assert!(PrefillClaims::default().is_empty());
    }
}
