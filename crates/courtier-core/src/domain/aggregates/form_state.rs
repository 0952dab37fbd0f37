//! Per-session wizard state

use serde::Serialize;

use crate::domain::value_objects::{ConsentFlags, ErrorMap, FieldValue, FieldValues, PrefillClaims};

/// State of one wizard session
#[derive(Clone, Debug, Default, Serialize)]
pub struct FormState {
    current_step: usize,
    values: FieldValues,
    errors: ErrorMap,
    submitting: bool,
    consents: ConsentFlags,
}

impl FormState {
    pub fn new(values: FieldValues) -> Self {
        Self { values, ..Self::default() }
    }

    pub fn current_step(&self) -> usize { self.current_step }
    pub fn values(&self) -> &FieldValues { &self.values }
    pub fn value(&self, field_id: &str) -> Option<&FieldValue> { self.values.get(field_id) }
    pub fn errors(&self) -> &ErrorMap { &self.errors }
    pub fn error(&self, field_id: &str) -> Option<&str> { self.errors.get(field_id).map(String::as_str) }
    pub fn is_submitting(&self) -> bool { self.submitting }
    pub fn consents(&self) -> &ConsentFlags { &self.consents }

    /// Fill claims into fields the user has not touched
    pub fn merge_prefill(&mut self, claims: &PrefillClaims) {
        for (field, value) in claims.field_values() {
            self.values
                .entry(field.to_string())
                .or_insert(FieldValue::Text(value));
        }
    }

    pub(crate) fn set_value(&mut self, field_id: &str, value: FieldValue) {
        self.values.insert(field_id.to_string(), value);
    }

    pub(crate) fn clear_error(&mut self, field_id: &str) {
        self.errors.remove(field_id);
    }

    pub(crate) fn replace_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    pub(crate) fn go_to(&mut self, step: usize) {
        self.current_step = step;
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub(crate) fn consents_mut(&mut self) -> &mut ConsentFlags {
        &mut self.consents
    }
}
