//! Wire DTOs for the clinic API.
//!
//! # Design
//! Records mirror the backend's JSON (Portuguese keys, integer ids, decimal
//! strings for money) and carry no invariants of their own; the forms in
//! `crate::forms` are where input is checked. Payload structs are the exact
//! bodies sent on create/update, built only by form validation.

mod account;
mod clinical;
mod finance;

use serde::{Deserialize, Serialize};

pub use account::{Credentials, LoginResponse, ProfilePayload, User};
pub use clinical::{
    Medication, MedicationPayload, Mobility, Patient, PatientNote, PatientNotePayload, PatientPayload, Sex,
    VitalSigns, VitalSignsPayload,
};
pub use finance::{
    AccountType, ChartAccount, ChartAccountPayload, DocumentType, EntryType, LedgerEntry, LedgerEntryPayload,
    LedgerStatus, NamedPayload, PaymentMethod, Supplier, SupplierPayload,
};

/// Envelope returned by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
        }
    }
}
