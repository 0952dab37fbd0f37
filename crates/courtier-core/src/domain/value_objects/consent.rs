//! Consent flags and the records they produce
//!
//! Processing for the quote itself rests on contract execution and is always
//! granted; every other purpose/channel is an explicit opt-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContactId;

/// Opt-in flags collected on the final step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentFlags {
    pub marketing: bool,
    pub phone: bool,
    pub email: bool,
    pub sms: bool,
    pub partners: bool,
}

impl Default for ConsentFlags {
    fn default() -> Self {
        Self {
            marketing: false,
            phone: false,
            email: true,
            sms: false,
            partners: false,
        }
    }
}

/// One editable consent flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentOption {
    Marketing,
    Phone,
    Email,
    Sms,
    Partners,
}

impl ConsentOption {
    pub const ALL: [Self; 5] = [Self::Marketing, Self::Phone, Self::Email, Self::Sms, Self::Partners];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marketing => "marketing",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Partners => "partners",
        }
    }
}

impl ConsentFlags {
    /// Contract-execution processing; not editable
    pub const fn contract_processing(&self) -> bool {
        true
    }

    pub fn is_granted(&self, option: ConsentOption) -> bool {
        match option {
            ConsentOption::Marketing => self.marketing,
            ConsentOption::Phone => self.phone,
            ConsentOption::Email => self.email,
            ConsentOption::Sms => self.sms,
            ConsentOption::Partners => self.partners,
        }
    }

    pub fn set(&mut self, option: ConsentOption, granted: bool) {
        match option {
            ConsentOption::Marketing => self.marketing = granted,
            ConsentOption::Phone => self.phone = granted,
            ConsentOption::Email => self.email = granted,
            ConsentOption::Sms => self.sms = granted,
            ConsentOption::Partners => self.partners = granted,
        }
    }

    /// Granted flags, in declaration order
    pub fn granted(&self) -> Vec<ConsentOption> {
        ConsentOption::ALL
            .into_iter()
            .filter(|o| self.is_granted(*o))
            .collect()
    }

    /// One record per granted opt-in. The default-on `email` flag yields none.
    pub fn records(
        &self,
        contact_id: ContactId,
        user_agent: Option<&str>,
        granted_at: DateTime<Utc>,
    ) -> Vec<ConsentRecord> {
        self.granted()
            .into_iter()
            .filter_map(|option| {
                let (purpose, channel, text) = match option {
                    ConsentOption::Marketing => (
                        ConsentPurpose::Marketing,
                        ConsentChannel::Email,
                        "J'accepte de recevoir des offres commerciales par email",
                    ),
                    ConsentOption::Phone => (
                        ConsentPurpose::Marketing,
                        ConsentChannel::Phone,
                        "J'accepte d'être contacté par téléphone",
                    ),
                    ConsentOption::Sms => (
                        ConsentPurpose::Marketing,
                        ConsentChannel::Sms,
                        "J'accepte de recevoir des offres commerciales par SMS",
                    ),
                    ConsentOption::Partners => (
                        ConsentPurpose::PartnerSharing,
                        ConsentChannel::All,
                        "J'accepte que mes données soient partagées avec nos partenaires assureurs",
                    ),
                    ConsentOption::Email => return None,
                };
                Some(ConsentRecord {
                    contact_id,
                    purpose,
                    channel,
                    lawful_basis: LawfulBasis::Consent,
                    text: text.to_string(),
                    granted: true,
                    ip: None,
                    user_agent: user_agent.map(str::to_string),
                    granted_at,
                })
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentPurpose {
    Marketing,
    PartnerSharing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentChannel {
    Email,
    Phone,
    Sms,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawfulBasis {
    Consent,
    Contract,
}

/// Row written to the `consents` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub contact_id: ContactId,
    pub purpose: ConsentPurpose,
    pub channel: ConsentChannel,
    pub lawful_basis: LawfulBasis,
    pub text: String,
    pub granted: bool,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub granted_at: DateTime<Utc>,
}
