use log::debug;
use medi_hl7::{Location, Message};

use crate::error::{BindError, SkipReason};
use crate::schema::{Bindable, Schema};

/// Options controlling how resolved values are written.
#[derive(Debug, Clone, Copy)]
pub struct BindOptions {
    /// Trim leading and trailing whitespace before writing
    pub trim_whitespace: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
        }
    }
}

/// Outcome of binding one record.
#[derive(Debug, Default)]
pub struct BindReport {
    /// Fields that received a value, in schema order
    pub bound: Vec<&'static str>,
    /// Fields left unchanged, with the reason
    pub skipped: Vec<(&'static str, SkipReason)>,
}

impl BindReport {
    /// Whether `name` received a value.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.iter().any(|bound| *bound == name)
    }

    /// The reason `name` was skipped, if it was.
    pub fn skip_reason(&self, name: &str) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|(skipped, _)| *skipped == name)
            .map(|(_, reason)| reason)
    }
}

/// Fills records from a parsed message.
///
/// Every field takes the first segment with its tag and the first
/// repetition of its field. A field whose value cannot be found is left
/// as it was and recorded in the [`BindReport`]; the rest still bind.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'m> {
    message: &'m Message,
    options: BindOptions,
}

impl<'m> Binder<'m> {
    /// A binder with default options.
    pub fn new(message: &'m Message) -> Self {
        Self::with_options(message, BindOptions::default())
    }

    /// A binder with explicit options.
    pub fn with_options(message: &'m Message, options: BindOptions) -> Self {
        Self { message, options }
    }

    /// Fill `target` using its own schema.
    pub fn bind_record<T: Bindable>(&self, target: &mut T) -> Result<BindReport, BindError> {
        self.bind(target, &T::schema())
    }

    /// Fill `target` according to `schema`.
    ///
    /// Fails only if the message has not been parsed.
    pub fn bind<T>(&self, target: &mut T, schema: &Schema<T>) -> Result<BindReport, BindError> {
        if !self.message.is_parsed() {
            return Err(BindError::NotParsed);
        }

        let mut report = BindReport::default();
        for binding in schema.bindings() {
            match self.resolve(binding.location()) {
                Ok(value) => {
                    binding.apply(target, value);
                    report.bound.push(binding.name());
                }
                Err(reason) => {
                    debug!(
                        "skipping {} ({}): {}",
                        binding.name(),
                        binding.location(),
                        reason
                    );
                    report.skipped.push((binding.name(), reason));
                }
            }
        }
        debug!(
            "bound {} of {} fields",
            report.bound.len(),
            schema.len()
        );
        Ok(report)
    }

    fn resolve(&self, location: &str) -> Result<String, SkipReason> {
        let location = Location::parse(location).map_err(SkipReason::InvalidLocation)?;
        let value = match self.message.get(&location) {
            Ok(value) => value,
            Err(e) if e.is_not_found() => return Err(SkipReason::SegmentNotFound(location.segment)),
            Err(e) => return Err(SkipReason::Unresolved(e)),
        };
        let value = if self.options.trim_whitespace {
            value.trim().to_string()
        } else {
            value
        };
        if value.is_empty() {
            return Err(SkipReason::Empty);
        }
        Ok(value)
    }
}

/// Extension trait binding records straight from a [`Message`].
pub trait MessageExt {
    /// Fill `target` from this message using `T`'s schema and default options.
    fn bind_into<T: Bindable>(&self, target: &mut T) -> Result<BindReport, BindError>;
}

impl MessageExt for Message {
    fn bind_into<T: Bindable>(&self, target: &mut T) -> Result<BindReport, BindError> {
        Binder::new(self).bind_record(target)
    }
}
