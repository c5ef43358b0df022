//! Error taxonomy for the routing core
//!
//! Only two conditions are allowed to surface past the dispatch layer:
//! - `ValidationError`: the inbound envelope is unusable. The HTTP layer
//!   owning the webhook endpoint turns this into a 4xx response.
//! - `RegistryFrozenError`: a binding was registered after `seal()`. This is
//!   a startup-sequencing defect and should abort initialization.
//!
//! Everything else (predicate failures, handler failures, unparseable
//! message bodies) is recovered inside the component that observed it.

use thiserror::Error;

/// Envelope validation failure, raised by [`crate::envelope::NotificationEnvelope::normalize`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The raw envelope is not a JSON object
    #[error("envelope is not a JSON object")]
    NotAnObject,
    /// A required field is absent or has the wrong type
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// `kind` is present but not one of the three enumerated values
    #[error("unrecognized envelope kind `{0}`")]
    InvalidKind(String),
}

/// Registration attempted after the registry was sealed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("pattern registry is sealed; cannot register binding `{binding}`")]
pub struct RegistryFrozenError {
    /// Name of the binding that was rejected
    pub binding: String,
}
