//! Domain services

pub mod validation;

pub use validation::{
    first_invalid_step, validate_field, validate_step, FieldError, StepValidation,
};
