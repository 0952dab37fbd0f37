//! Form definition aggregate
//!
//! An ordered sequence of steps, each an ordered group of typed fields.
//! Definitions are checked once when loaded and are immutable afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::DefinitionError;

/// Complete form definition
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawDefinition")]
pub struct FormDefinition {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    steps: Vec<FormStep>,
}

#[derive(Deserialize)]
struct RawDefinition {
    id: String,
    #[serde(default)]
    title: Option<String>,
    steps: Vec<FormStep>,
}

impl TryFrom<RawDefinition> for FormDefinition {
    type Error = DefinitionError;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.title, raw.steps)
    }
}

impl FormDefinition {
    /// Build a definition, rejecting empty forms, empty steps, duplicate
    /// field ids and choice fields without options.
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        steps: Vec<FormStep>,
    ) -> Result<Self, DefinitionError> {
        if steps.is_empty() {
            return Err(DefinitionError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if step.fields.is_empty() {
                return Err(DefinitionError::EmptyStep(step.id.clone()));
            }
            for field in &step.fields {
                if !seen.insert(field.id.as_str()) {
                    return Err(DefinitionError::DuplicateField(field.id.clone()));
                }
                if matches!(field.kind.options(), Some(options) if options.is_empty()) {
                    return Err(DefinitionError::MissingOptions(field.id.clone()));
                }
            }
        }

        Ok(Self { id: id.into(), title, steps })
    }

    /// Parse and check a JSON definition
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let raw: RawDefinition = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn title(&self) -> Option<&str> { self.title.as_deref() }
    pub fn steps(&self) -> &[FormStep] { &self.steps }
    pub fn step(&self, index: usize) -> Option<&FormStep> { self.steps.get(index) }
    pub fn step_count(&self) -> usize { self.steps.len() }

    /// Index of the final step; definitions always have at least one
    pub fn last_step_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields().find(|f| f.id == id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }
}

/// Named group of fields shown together
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormStep {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormStep {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self { id: id.into(), title: title.into(), description: None, fields }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One input of a step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Input kind, carrying only the attributes that kind uses
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text(TextInput),
    Email(TextInput),
    Tel(TextInput),
    Date(TextInput),
    Select(ChoiceInput),
    Checkbox(ChoiceInput),
    Radio(ChoiceInput),
}

impl FieldKind {
    pub fn validation(&self) -> Option<&ValidationRule> {
        match self {
            Self::Text(i) | Self::Email(i) | Self::Tel(i) | Self::Date(i) => i.validation.as_ref(),
            Self::Select(_) | Self::Checkbox(_) | Self::Radio(_) => None,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Select(c) | Self::Checkbox(c) | Self::Radio(c) => Some(&c.options),
            Self::Text(_) | Self::Email(_) | Self::Tel(_) | Self::Date(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Email(_) => "email",
            Self::Tel(_) => "tel",
            Self::Date(_) => "date",
            Self::Select(_) => "select",
            Self::Checkbox(_) => "checkbox",
            Self::Radio(_) => "radio",
        }
    }
}

/// Free-text input attributes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TextInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
}

/// Choice input attributes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChoiceInput {
    #[serde(default)]
    pub options: Vec<String>,
}

impl FormField {
    fn with_kind(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self { id: id.into(), label: label.into(), required: false, kind }
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, FieldKind::Text(TextInput::default()))
    }

    pub fn email(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, FieldKind::Email(TextInput::default()))
    }

    pub fn tel(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, FieldKind::Tel(TextInput::default()))
    }

    pub fn date(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, FieldKind::Date(TextInput::default()))
    }

    pub fn select(id: impl Into<String>, label: impl Into<String>, options: &[&str]) -> Self {
        Self::with_kind(id, label, FieldKind::Select(ChoiceInput::from_options(options)))
    }

    pub fn checkbox(id: impl Into<String>, label: impl Into<String>, options: &[&str]) -> Self {
        Self::with_kind(id, label, FieldKind::Checkbox(ChoiceInput::from_options(options)))
    }

    pub fn radio(id: impl Into<String>, label: impl Into<String>, options: &[&str]) -> Self {
        Self::with_kind(id, label, FieldKind::Radio(ChoiceInput::from_options(options)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Ignored on choice kinds
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        if let Some(input) = self.text_input_mut() {
            input.placeholder = Some(placeholder.into());
        }
        self
    }

    /// Ignored on choice kinds
    pub fn validation(mut self, rule: ValidationRule) -> Self {
        if let Some(input) = self.text_input_mut() {
            input.validation = Some(rule);
        }
        self
    }

    fn text_input_mut(&mut self) -> Option<&mut TextInput> {
        match &mut self.kind {
            FieldKind::Text(i) | FieldKind::Email(i) | FieldKind::Tel(i) | FieldKind::Date(i) => Some(i),
            _ => None,
        }
    }
}

impl ChoiceInput {
    fn from_options(options: &[&str]) -> Self {
        Self { options: options.iter().map(|o| o.to_string()).collect() }
    }
}

/// Constraints on a free-text value
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { pattern: Some(Pattern::new(pattern)?), ..Self::default() })
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max, ..Self::default() }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Regular expression that must match a whole value
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source: source.to_string(), regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}
