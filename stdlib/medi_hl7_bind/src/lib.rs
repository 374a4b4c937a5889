//! Schema-driven binding of HL7 message values into records.
//!
//! A record describes which location feeds each of its fields, either by
//! implementing [`Bindable`] or by passing an explicit [`Schema`]. Binding
//! is best-effort: each field takes the first matching segment and first
//! repetition, and fields whose values are missing keep their defaults.
//!
//! ```
//! use medi_hl7::Message;
//! use medi_hl7_bind::{Bindable, MessageExt, Schema};
//!
//! #[derive(Default)]
//! struct Patient {
//!     family_name: String,
//!     given_name: Option<String>,
//! }
//!
//! impl Bindable for Patient {
//!     fn schema() -> Schema<Self> {
//!         Schema::new()
//!             .field("family_name", "PID.5.0", |p: &mut Patient| &mut p.family_name)
//!             .field("given_name", "PID.5.1", |p: &mut Patient| &mut p.given_name)
//!     }
//! }
//!
//! let mut msg = Message::new("MSH|^~\\&\rPID|||001677980||SMITH^CURTIS\r")?;
//! msg.parse()?;
//! let mut patient = Patient::default();
//! msg.bind_into(&mut patient)?;
//! assert_eq!(patient.family_name, "SMITH");
//! assert_eq!(patient.given_name.as_deref(), Some("CURTIS"));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

pub mod binder;
pub mod error;
pub mod schema;

pub use binder::{BindOptions, BindReport, Binder, MessageExt};
pub use error::{BindError, SkipReason};
pub use schema::{Bindable, Binding, Schema, StringSlot};
