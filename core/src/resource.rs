//! The per-entity request contract.
//!
//! Each API entity implements [`Resource`] once, and `ApiClient` derives the
//! whole list/get/create/update/delete surface from it.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait Resource: DeserializeOwned + Clone + Debug + Send {
    /// Collection path segment, e.g. `fornecedores`.
    const COLLECTION: &'static str;
    /// Detail path segment, e.g. `fornecedor`.
    const DETAIL: &'static str;
    /// Human label used in notices and fallback names.
    const LABEL: &'static str;

    /// Body sent on create and update.
    type Payload: Serialize;

    fn id(&self) -> i64;

    /// Name shown when another record references this one.
    fn display_name(&self) -> String;

    /// Placeholder used when a referenced record cannot be fetched.
    fn fallback_name(id: i64) -> String {
        format!("{} #{id}", Self::LABEL)
    }
}
