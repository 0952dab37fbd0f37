//! In-memory store (development mode and tests)

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::aggregates::{Interaction, NewContact, NewProject};
use crate::domain::value_objects::{ConsentRecord, ContactId, ProjectId};
use crate::ports::outbound::{DataStore, StoreError};

/// Store operation, as recorded in the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    CreateContact,
    FindContact,
    RecordConsents,
    CreateProject,
    InsertInteraction,
}

#[derive(Default)]
struct Tables {
    contacts: Vec<(ContactId, NewContact)>,
    projects: Vec<(ProjectId, NewProject)>,
    consents: Vec<ConsentRecord>,
    interactions: Vec<Interaction>,
    next_contact: i64,
    next_project: i64,
}

#[derive(Default, Clone)]
struct Failures {
    contacts: Option<String>,
    lookups: Option<String>,
    consents: Option<String>,
    projects: Option<String>,
    interactions: Option<String>,
}

/// Volatile store with failure injection
#[derive(Default)]
pub struct InMemoryDataStore {
    tables: RwLock<Tables>,
    failures: RwLock<Failures>,
    calls: RwLock<Vec<StoreCall>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an existing contact
    pub fn seed_contact(&self, email: &str) -> ContactId {
        let mut tables = self.tables.write();
        tables.next_contact += 1;
        let id = ContactId::new(tables.next_contact);
        tables.contacts.push((
            id,
            NewContact {
                civilite: "M.".into(),
                prenom: None,
                nom: None,
                email: Some(email.to_string()),
                telephone: None,
                code_postal: None,
            },
        ));
        id
    }

    pub fn fail_contact_creation(&self, reason: impl Into<String>) {
        self.failures.write().contacts = Some(reason.into());
    }

    pub fn fail_lookups(&self, reason: impl Into<String>) {
        self.failures.write().lookups = Some(reason.into());
    }

    pub fn fail_consents(&self, reason: impl Into<String>) {
        self.failures.write().consents = Some(reason.into());
    }

    pub fn fail_project_creation(&self, reason: impl Into<String>) {
        self.failures.write().projects = Some(reason.into());
    }

    pub fn fail_interactions(&self, reason: impl Into<String>) {
        self.failures.write().interactions = Some(reason.into());
    }

    pub fn contacts(&self) -> Vec<(ContactId, NewContact)> {
        self.tables.read().contacts.clone()
    }

    pub fn projects(&self) -> Vec<(ProjectId, NewProject)> {
        self.tables.read().projects.clone()
    }

    pub fn consents(&self) -> Vec<ConsentRecord> {
        self.tables.read().consents.clone()
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.tables.read().interactions.clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().clone()
    }

    pub fn call_count(&self, call: StoreCall) -> usize {
        self.calls.read().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.write().push(call);
    }

    fn injected(&self, pick: impl Fn(&Failures) -> &Option<String>) -> Result<(), StoreError> {
        match pick(&self.failures.read()) {
            Some(reason) => Err(StoreError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn create_contact(&self, contact: &NewContact) -> Result<ContactId, StoreError> {
        self.record(StoreCall::CreateContact);
        self.injected(|f| &f.contacts)?;

        let mut tables = self.tables.write();
        tables.next_contact += 1;
        let id = ContactId::new(tables.next_contact);
        tables.contacts.push((id, contact.clone()));
        Ok(id)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, StoreError> {
        self.record(StoreCall::FindContact);
        self.injected(|f| &f.lookups)?;

        let tables = self.tables.read();
        let mut matches = tables
            .contacts
            .iter()
            .filter(|(_, c)| c.email.as_deref() == Some(email))
            .map(|(id, _)| *id);

        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => Err(StoreError::Ambiguous(format!("several contacts for {email}"))),
            (first, _) => Ok(first),
        }
    }

    async fn record_consents(&self, consents: &[ConsentRecord]) -> Result<(), StoreError> {
        self.record(StoreCall::RecordConsents);
        self.injected(|f| &f.consents)?;

        self.tables.write().consents.extend_from_slice(consents);
        Ok(())
    }

    async fn create_project(&self, project: &NewProject) -> Result<ProjectId, StoreError> {
        self.record(StoreCall::CreateProject);
        self.injected(|f| &f.projects)?;

        let mut tables = self.tables.write();
        tables.next_project += 1;
        let id = ProjectId::new(tables.next_project);
        tables.projects.push((id, project.clone()));
        Ok(id)
    }

    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        self.record(StoreCall::InsertInteraction);
        self.injected(|f| &f.interactions)?;

        self.tables.write().interactions.push(interaction.clone());
        Ok(())
    }
}
