//! Domain models for soldiers and base-visit requests.
//!
//! This module contains the record types, the message templater that turns a
//! request draft into text, and the filters used to build request listings.

/// Soldier records and the add-soldier draft.
pub mod soldier;
pub use soldier::{Gender, NewSoldier, RequiredText, ServiceType, Soldier, SoldierId};

/// Request records, variants and drafts.
pub mod request;
pub use request::{
    ReplacedSoldier, Request, RequestDraft, RequestId, RequestKind, RequestStatus,
};

pub mod message;
pub use message::{generate_message, render_message};

pub mod filter;
pub use filter::{DepartmentFilter, RequestFilter, StatusFilter, filter_requests};

mod request_view;
pub use request_view::RequestView;

mod config;
pub use config::Config;

/// A required field was missing when a record was submitted.
///
/// The operation that returned this error has not changed any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The soldier's full name is empty.
    #[error("full name is required")]
    MissingFullName,
    /// The soldier's personal number is empty.
    #[error("personal number is required")]
    MissingPersonalNumber,
    /// The soldier's ID number is empty.
    #[error("ID number is required")]
    MissingIdNumber,
    /// The requesting commander's name is empty.
    #[error("commander name is required")]
    MissingCommander,
    /// The referenced soldier does not exist.
    #[error("soldier {0} not found")]
    UnknownSoldier(SoldierId),
    /// A request cannot be saved without a generated message.
    #[error("a message must be generated before the request is saved")]
    MissingMessage,
}
