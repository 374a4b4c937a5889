//! HL7 v2 message parsing for the Medi standard library.
//!
//! Messages are pipe-delimited text whose header declares its own delimiter
//! characters. This crate resolves those delimiters, tokenizes the message
//! into line-bounded segments, and resolves dotted locations such as
//! `PID.5.1` down to field, component and subcomponent values.
//!
//! ```
//! use medi_hl7::Message;
//!
//! let mut msg = Message::new("MSH|^~\\&|CERNER\rPID|||001677980||SMITH^CURTIS\r")?;
//! msg.parse()?;
//! assert_eq!(msg.find("PID.5.1")?, "CURTIS");
//! assert_eq!(msg.find("MSH.2")?, "CERNER");
//! # Ok::<(), medi_hl7::Hl7Error>(())
//! ```

#![warn(missing_docs)]

pub mod delimiters;
pub mod error;
pub mod escape;
pub mod index;
pub mod location;
pub mod message;
pub mod reader;
pub mod segment;

// Re-export the main types for convenience
pub use delimiters::Delimiters;
pub use error::{Hl7Error, Result};
pub use index::SegmentIndex;
pub use location::Location;
pub use message::{Message, Segments};
pub use reader::{ReaderConfig, SegmentReader};
pub use segment::{Segment, Split};
