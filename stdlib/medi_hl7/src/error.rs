//! Error types for HL7 message construction, tokenizing and addressing.

use thiserror::Error;

/// Number of header bytes needed to resolve all five delimiters.
pub const MIN_HEADER_LEN: usize = 8;

/// Errors produced while reading or addressing an HL7 message.
///
/// End-of-stream is not represented here: the tokenizer reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum Hl7Error {
    /// The buffer is too short to hold the header tag and the five delimiters.
    #[error("message header too short: need 8 bytes, got {got}")]
    HeaderTooShort {
        /// Bytes actually available
        got: usize,
    },

    /// The field index is beyond the fields present in the segment.
    #[error("field {field} out of range for {segment} segment with {count} fields")]
    FieldOutOfRange {
        /// Tag of the segment addressed
        segment: String,
        /// Requested field index
        field: usize,
        /// Fields present after the tag
        count: usize,
    },

    /// The field exists but has no such repetition.
    #[error("repetition {repetition} out of range for field {field} ({count} repetitions)")]
    RepetitionOutOfRange {
        /// Field index
        field: usize,
        /// Requested repetition index
        repetition: usize,
        /// Repetitions present
        count: usize,
    },

    /// The repetition exists but has no such component.
    #[error("component {component} out of range for field {field} ({count} components)")]
    ComponentOutOfRange {
        /// Field index
        field: usize,
        /// Requested component index
        component: usize,
        /// Components present
        count: usize,
    },

    /// The component exists but has no such subcomponent.
    #[error(
        "subcomponent {subcomponent} out of range for field {field} component {component} ({count} subcomponents)"
    )]
    SubcomponentOutOfRange {
        /// Field index
        field: usize,
        /// Component index
        component: usize,
        /// Requested subcomponent index
        subcomponent: usize,
        /// Subcomponents present
        count: usize,
    },

    /// No segment with the requested tag exists in the parsed message.
    #[error("no {tag} segment in message")]
    SegmentNotFound {
        /// The missing tag
        tag: String,
    },

    /// A dotted location string could not be parsed.
    #[error("invalid location {input:?}: {reason}")]
    InvalidLocation {
        /// The rejected location string
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// `parse` was called on a message whose byte source is already drained.
    #[error("message has already been parsed")]
    AlreadyParsed,

    /// A lookup needed the segment index but `parse` has not run yet.
    #[error("message has not been parsed; call parse() first")]
    NotParsed,

    /// The underlying byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reader lock was poisoned by a panic in another thread.
    #[error("segment reader lock poisoned")]
    LockPoisoned,
}

impl Hl7Error {
    /// True for any of the per-level out-of-range addressing errors.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Hl7Error::FieldOutOfRange { .. }
                | Hl7Error::RepetitionOutOfRange { .. }
                | Hl7Error::ComponentOutOfRange { .. }
                | Hl7Error::SubcomponentOutOfRange { .. }
        )
    }

    /// True when the addressed segment tag is absent from the message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Hl7Error::SegmentNotFound { .. })
    }
}

/// Convenience `Result` alias using [`Hl7Error`].
pub type Result<T> = std::result::Result<T, Hl7Error>;
