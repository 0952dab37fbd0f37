//! Submission aggregate and the records written when a wizard completes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    field_ids, AttributionParams, ContactId, FieldValue, FieldValues, PrefillClaims, ProjectId,
};

/// Durable result of a completed wizard
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub form_id: String,
    pub contact_id: Option<ContactId>,
    pub project_id: Option<ProjectId>,
    pub payload: FieldValues,
    pub status: SubmissionStatus,
    pub utm: AttributionParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill_claims: Option<PrefillClaims>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Partial,
    #[default]
    Submitted,
    Qualified,
}

/// Defaults stamped on contacts and projects created from landing pages
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadDefaults {
    pub civility: String,
    pub origin: String,
    pub provenance: String,
    pub attribution: String,
    pub project_status: String,
    pub product_type: String,
    pub commercial: String,
}

impl Default for LeadDefaults {
    fn default() -> Self {
        Self {
            civility: "M.".into(),
            origin: "landing-page".into(),
            provenance: "unknown".into(),
            attribution: "default".into(),
            project_status: "nouveau".into(),
            product_type: "mutuelle_sante".into(),
            commercial: "Auto-Lead".into(),
        }
    }
}

/// Row written to the `contact` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub civilite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_postal: Option<String>,
}

impl NewContact {
    /// Personal fields of a collected form
    pub fn from_values(values: &FieldValues, defaults: &LeadDefaults) -> Self {
        let text = |id: &str| {
            values
                .get(id)
                .and_then(FieldValue::as_text)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            civilite: text(field_ids::CIVILITY).unwrap_or_else(|| defaults.civility.clone()),
            prenom: text(field_ids::FIRST_NAME),
            nom: text(field_ids::LAST_NAME),
            email: text(field_ids::EMAIL),
            telephone: text(field_ids::PHONE),
            code_postal: text(field_ids::POSTAL_CODE),
        }
    }
}

/// Row written to the `projets` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub contact_id: ContactId,
    pub origine: String,
    pub provenance: String,
    pub statut: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub attribution: String,
    pub date_creation: DateTime<Utc>,
    pub commercial: String,
}

impl NewProject {
    pub fn for_contact(
        contact_id: ContactId,
        attribution: &AttributionParams,
        page_slug: Option<&str>,
        defaults: &LeadDefaults,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            contact_id,
            origine: attribution.source().unwrap_or(&defaults.origin).to_string(),
            provenance: page_slug
                .filter(|s| !s.is_empty())
                .unwrap_or(&defaults.provenance)
                .to_string(),
            statut: defaults.project_status.clone(),
            product_type: defaults.product_type.clone(),
            attribution: attribution.campaign().unwrap_or(&defaults.attribution).to_string(),
            date_creation: created_at,
            commercial: defaults.commercial.clone(),
        }
    }
}
