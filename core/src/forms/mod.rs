//! Create/edit forms, one per entity.
//!
//! # Design
//! A form holds what the user typed. [`Form::set`] applies the field's input
//! mask on every keystroke-equivalent, [`Form::seed`] fills the form from an
//! existing record for editing, and [`Form::validate`] either yields the exact
//! API payload or the field errors that block submission. Conditional fields
//! ("which allergies", "parent account") live inside enums, so a detail can
//! only be set while its controlling flag is on.

mod account;
mod clinical;
mod finance;

use crate::resource::Resource;
use crate::validation::ValidationErrors;

pub use account::{LoginForm, ProfileForm};
pub use clinical::{Flagged, MedicationForm, PatientForm, PatientNoteForm, VitalSignsForm};
pub use finance::{
    AccountKindInput, ChartAccountForm, DocumentTypeForm, EntryTypeForm, LedgerEntryForm, NamedForm,
    PaymentMethodForm, SupplierForm,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("campo desconhecido: {0}")]
    UnknownField(String),

    #[error("valor inválido para {field}: {value}")]
    InvalidChoice { field: String, value: String },

    /// The field is only shown when another field enables it.
    #[error("campo {field} indisponível: habilite {depends_on} primeiro")]
    HiddenField {
        field: &'static str,
        depends_on: &'static str,
    },
}

pub trait Form: Default + Clone {
    type Resource: Resource;

    /// Field names accepted by [`Form::set`], in display order.
    const FIELDS: &'static [&'static str];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError>;

    /// Form pre-filled from `record`, for the edit drawer.
    fn seed(record: &Self::Resource) -> Self;

    fn validate(&self) -> Result<<Self::Resource as Resource>::Payload, ValidationErrors>;
}

/// Checkbox input: `sim`/`não`, `true`/`false`, `1`/`0`.
pub(crate) fn parse_flag(field: &str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_lowercase().as_str() {
        "sim" | "s" | "true" | "1" | "yes" | "y" | "on" => Ok(true),
        "não" | "nao" | "n" | "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(FormError::InvalidChoice {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

pub(crate) fn unknown(field: &str) -> FormError {
    FormError::UnknownField(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_portuguese_and_english() {
        assert_eq!(parse_flag("x", "Sim"), Ok(true));
        assert_eq!(parse_flag("x", "não"), Ok(false));
        assert_eq!(parse_flag("x", ""), Ok(false));
        assert!(matches!(parse_flag("x", "talvez"), Err(FormError::InvalidChoice { .. })));
    }
}
