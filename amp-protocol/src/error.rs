use thiserror::Error;

/// Validation errors for wire-protocol inputs
///
/// Both variants are detected before any device I/O: a request carrying an
/// invalid zone id or attribute name is rejected at the API boundary and
/// never reaches the serial line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Zone id does not have the `CZ` shape (controller 1-9, zone 1-6)
    #[error("'{0}' is not a valid zone")]
    InvalidZone(String),

    /// Attribute name is neither a canonical code nor a known alias
    #[error("'{0}' is not a valid zone control attribute")]
    InvalidAttribute(String),
}

/// Type alias for results that can return a ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
