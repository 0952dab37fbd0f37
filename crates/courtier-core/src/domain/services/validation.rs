//! Field and step validation
//!
//! Pure functions of (definition, values). Messages are the ones shown
//! inline next to the offending field.

use thiserror::Error;

use crate::domain::aggregates::{FormDefinition, FormField, FormStep};
use crate::domain::value_objects::{ErrorMap, FieldValue, FieldValues};

/// Why a single field value was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{label} est requis")]
    Required { label: String },

    #[error("{message}")]
    Pattern { message: String },

    #[error("{label} doit contenir au moins {min} caractères")]
    TooShort { label: String, min: usize },

    #[error("{label} doit contenir au maximum {max} caractères")]
    TooLong { label: String, max: usize },
}

/// Check one value against its field's constraints
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Result<(), FieldError> {
    let value = match value.filter(|v| !v.is_empty()) {
        Some(value) => value,
        None if field.required => {
            return Err(FieldError::Required { label: field.label.clone() });
        }
        None => return Ok(()),
    };

    let Some(rule) = field.kind.validation() else {
        return Ok(());
    };

    if let Some(pattern) = &rule.pattern {
        if !pattern.is_match(&value.match_text()) {
            let message = rule
                .message
                .clone()
                .unwrap_or_else(|| format!("Format incorrect pour {}", field.label));
            return Err(FieldError::Pattern { message });
        }
    }

    let length = value.len();
    if let Some(min) = rule.min {
        if length < min {
            return Err(FieldError::TooShort { label: field.label.clone(), min });
        }
    }
    if let Some(max) = rule.max {
        if length > max {
            return Err(FieldError::TooLong { label: field.label.clone(), max });
        }
    }

    Ok(())
}

/// Outcome of validating every field of one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepValidation {
    pub errors: ErrorMap,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate all fields of a step, in declared order
pub fn validate_step(step: &FormStep, values: &FieldValues) -> StepValidation {
    let errors = step
        .fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.id))
                .err()
                .map(|e| (field.id.clone(), e.to_string()))
        })
        .collect();

    StepValidation { errors }
}

/// Index and errors of the first step, in form order, that fails validation
pub fn first_invalid_step(
    definition: &FormDefinition,
    values: &FieldValues,
) -> Option<(usize, StepValidation)> {
    definition
        .steps()
        .iter()
        .map(|step| validate_step(step, values))
        .enumerate()
        .find(|(_, validation)| !validation.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ValidationRule;
    use proptest::prelude::*;

    fn email_field() -> FormField {
        FormField::email("email", "Email").required().validation(
            ValidationRule::pattern(r"^[^@]+@[^@]+\.[^@]+$")
                .unwrap()
                .with_message("Veuillez saisir un email valide"),
        )
    }

    #[test]
    fn test_required_text() {
        let field = FormField::text("prenom", "Prénom").required();
        assert_eq!(
            validate_field(&field, None).unwrap_err().to_string(),
            "Prénom est requis"
        );
        assert!(validate_field(&field, Some(&FieldValue::from(""))).is_err());
        assert!(validate_field(&field, Some(&FieldValue::from("Jeanne"))).is_ok());
    }

    #[test]
    fn test_required_checkbox_group() {
        let field = FormField::checkbox("garanties", "Garanties", &["Optique", "Dentaire"]).required();
        assert!(validate_field(&field, Some(&FieldValue::Multi(vec![]))).is_err());
        assert!(validate_field(&field, Some(&FieldValue::from(vec!["Optique"]))).is_ok());
    }

    #[test]
    fn test_optional_empty_skips_rules() {
        let field = FormField::text("cp", "Code postal")
            .validation(ValidationRule::pattern(r"\d{5}").unwrap());
        assert!(validate_field(&field, None).is_ok());
        assert!(validate_field(&field, Some(&FieldValue::from(""))).is_ok());
    }

    #[test]
    fn test_pattern_configured_message() {
        let err = validate_field(&email_field(), Some(&FieldValue::from("not-an-email"))).unwrap_err();
        assert_eq!(err.to_string(), "Veuillez saisir un email valide");
    }

    #[test]
    fn test_pattern_fallback_message() {
        let field = FormField::text("cp", "Code postal")
            .validation(ValidationRule::pattern(r"\d{5}").unwrap());
        let err = validate_field(&field, Some(&FieldValue::from("7500"))).unwrap_err();
        assert_eq!(err.to_string(), "Format incorrect pour Code postal");
    }

    #[test]
    fn test_length_bounds_inclusive() {
        let field = FormField::text("nom", "Nom").validation(ValidationRule::length(Some(2), Some(4)));
        assert!(validate_field(&field, Some(&FieldValue::from("ab"))).is_ok());
        assert!(validate_field(&field, Some(&FieldValue::from("abcd"))).is_ok());
        assert_eq!(
            validate_field(&field, Some(&FieldValue::from("a"))).unwrap_err().to_string(),
            "Nom doit contenir au moins 2 caractères"
        );
        assert_eq!(
            validate_field(&field, Some(&FieldValue::from("abcde"))).unwrap_err(),
            FieldError::TooLong { label: "Nom".into(), max: 4 }
        );
    }

    #[test]
    fn test_step_collects_every_error() {
        let step = FormStep::new(
            "s1",
            "Vos informations",
            vec![FormField::text("prenom", "Prénom").required(), email_field(), FormField::text("ville", "Ville")],
        );
        let mut values = FieldValues::new();
        values.insert("email".into(), FieldValue::from("nope"));

        let result = validate_step(&step, &values);
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors["prenom"], "Prénom est requis");
        assert_eq!(result.errors["email"], "Veuillez saisir un email valide");
    }

    #[test]
    fn test_first_invalid_step_in_form_order() {
        let definition = FormDefinition::new(
            "devis",
            None,
            vec![
                FormStep::new("s1", "Identité", vec![email_field()]),
                FormStep::new("s2", "Situation", vec![FormField::text("ville", "Ville").required()]),
                FormStep::new("s3", "Besoins", vec![FormField::text("budget", "Budget").required()]),
            ],
        )
        .unwrap();
        let mut values = FieldValues::new();
        values.insert("email".into(), FieldValue::from("a@b.fr"));

        let (index, validation) = first_invalid_step(&definition, &values).unwrap();
        assert_eq!(index, 1);
        assert_eq!(validation.errors["ville"], "Ville est requis");

        values.insert("ville".into(), FieldValue::from("Lyon"));
        values.insert("budget".into(), FieldValue::from("80"));
        assert!(first_invalid_step(&definition, &values).is_none());
    }

    proptest! {
        #[test]
        fn prop_required_empty_mentions_label(label in "[A-Za-zéè ]{1,20}") {
            let field = FormField::text("f", label.clone()).required();
            let message = validate_field(&field, None).unwrap_err().to_string();
            prop_assert!(message.contains(&label));
        }

        #[test]
        fn prop_matching_value_passes(local in "[a-z0-9.]{1,12}", domain in "[a-z]{1,10}", tld in "[a-z]{2,4}") {
            let value = FieldValue::from(format!("{local}@{domain}.{tld}"));
            prop_assert!(validate_field(&email_field(), Some(&value)).is_ok());
        }

        #[test]
        fn prop_non_matching_value_uses_message(value in "[a-z0-9.]{1,20}") {
            let err = validate_field(&email_field(), Some(&FieldValue::from(value))).unwrap_err();
            prop_assert_eq!(err.to_string(), "Veuillez saisir un email valide");
        }
    }
}
