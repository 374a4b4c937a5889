use medi_hl7::Hl7Error;
use thiserror::Error;

/// Failure of a whole bind operation.
#[derive(Debug, Error)]
pub enum BindError {
    /// Binding reads the segment index, which only exists after `parse`.
    #[error("cannot bind from a message that has not been parsed")]
    NotParsed,
}

/// Why a single schema field was left unchanged.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The field's location string did not parse
    #[error("invalid location: {0}")]
    InvalidLocation(#[source] Hl7Error),

    /// The message has no segment with the location's tag
    #[error("segment {0} not present")]
    SegmentNotFound(String),

    /// The segment exists but the addressed value does not
    #[error("{0}")]
    Unresolved(#[source] Hl7Error),

    /// The value resolved to empty text after trimming
    #[error("value is empty")]
    Empty,
}
