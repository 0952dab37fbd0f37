//! Built-in mutual health insurance quote form

use super::form::{FormDefinition, FormField, FormStep, ValidationRule};
use crate::domain::value_objects::field_ids;
use crate::domain::DefinitionError;

/// Identifier landing pages use when they do not name a form
pub const DEFAULT_FORM_ID: &str = "default-form";

const EMAIL_PATTERN: &str = r"^[^@]+@[^@]+\.[^@]+$";
const FRENCH_PHONE_PATTERN: &str = r"^(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}$";
const POSTAL_CODE_PATTERN: &str = r"^\d{5}$";

fn rule(pattern: &'static str, message: &str, field: &str) -> Result<ValidationRule, DefinitionError> {
    ValidationRule::pattern(pattern)
        .map(|r| r.with_message(message))
        .map_err(|source| DefinitionError::InvalidPattern { field: field.to_string(), source })
}

/// Three-step quote form: identity, situation, needs
pub fn health_quote_form() -> Result<FormDefinition, DefinitionError> {
    let identity = FormStep::new(
        "step-1",
        "Vos informations",
        vec![
            FormField::text(field_ids::FIRST_NAME, "Prénom")
                .placeholder("Votre prénom")
                .required(),
            FormField::text(field_ids::LAST_NAME, "Nom")
                .placeholder("Votre nom")
                .required(),
            FormField::email(field_ids::EMAIL, "Email")
                .placeholder("votre.email@exemple.fr")
                .required()
                .validation(rule(EMAIL_PATTERN, "Veuillez saisir un email valide", field_ids::EMAIL)?),
            FormField::tel(field_ids::PHONE, "Téléphone")
                .placeholder("06 12 34 56 78")
                .required()
                .validation(rule(
                    FRENCH_PHONE_PATTERN,
                    "Veuillez saisir un numéro français valide",
                    field_ids::PHONE,
                )?),
        ],
    )
    .with_description("Quelques détails pour personnaliser votre devis");

    let situation = FormStep::new(
        "step-2",
        "Votre situation",
        vec![
            FormField::select(
                "age",
                "Votre âge",
                &["18-25 ans", "26-35 ans", "36-45 ans", "46-55 ans", "56-65 ans", "Plus de 65 ans"],
            )
            .required(),
            FormField::text(field_ids::POSTAL_CODE, "Code postal")
                .placeholder("75001")
                .required()
                .validation(rule(
                    POSTAL_CODE_PATTERN,
                    "Code postal invalide (5 chiffres)",
                    field_ids::POSTAL_CODE,
                )?),
            FormField::select(
                "situation",
                "Situation professionnelle",
                &[
                    "Salarié(e)",
                    "Indépendant(e)",
                    "Fonctionnaire",
                    "Demandeur d'emploi",
                    "Retraité(e)",
                    "Étudiant(e)",
                ],
            )
            .required(),
            FormField::select(
                "mutuelle_actuelle",
                "Avez-vous une mutuelle actuellement ?",
                &["Oui, j'ai une mutuelle", "Non, aucune mutuelle", "Je ne sais pas"],
            )
            .required(),
        ],
    )
    .with_description("Pour vous proposer les meilleures garanties");

    let needs = FormStep::new(
        "step-3",
        "Vos besoins",
        vec![
            FormField::checkbox(
                "garanties",
                "Garanties importantes pour vous",
                &[
                    "Optique (lunettes, lentilles)",
                    "Dentaire (soins, prothèses)",
                    "Hospitalisation",
                    "Médecines douces",
                    "Maternité",
                ],
            )
            .required(),
            FormField::select(
                "budget",
                "Budget mensuel souhaité",
                &["Moins de 30€", "30€ - 50€", "50€ - 80€", "80€ - 120€", "Plus de 120€"],
            )
            .required(),
            FormField::select(
                "delai",
                "Quand souhaitez-vous souscrire ?",
                &["Immédiatement", "Dans le mois", "Dans les 3 mois", "Je réfléchis encore"],
            )
            .required(),
        ],
    )
    .with_description("Dernière étape pour votre devis personnalisé");

    FormDefinition::new(
        DEFAULT_FORM_ID,
        Some("Devis mutuelle santé".to_string()),
        vec![identity, situation, needs],
    )
}
