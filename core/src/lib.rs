//! Synchronous client core for the clinic and bookkeeping admin API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A [`Session`] runs those
//! requests through a host-supplied [`Transport`] and keeps the signed-in
//! user; the screen-level state (list pages, forms, ledger view, intake
//! wizard, navigation) is plain data driven by the host.
//!
//! # Design
//! - `ApiClient` holds only the base URL and bearer token.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Entities implement [`Resource`] once and get the whole CRUD surface.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod forms;
pub mod http;
pub mod intake;
pub mod ledger;
pub mod nav;
pub mod page;
pub mod resource;
pub mod session;
pub mod table;
#[cfg(feature = "http-client")]
pub mod transport;
pub mod types;
pub mod validation;

pub use auth::{AuthState, AuthStore, AuthStoreError};
pub use client::ApiClient;
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use forms::{Form, FormError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
pub use intake::{IntakeStep, IntakeWizard};
pub use ledger::{fetch_ledger_view, LedgerRow, LedgerView};
pub use nav::{Layout, Route, Screen, Sidebar};
pub use page::{CrudPage, Drawer, Notice, NoticeLevel};
pub use resource::Resource;
pub use session::Session;
pub use table::{render_table, TableRow};
#[cfg(feature = "http-client")]
pub use transport::UreqTransport;
pub use validation::{FieldError, ValidationErrors};
