//! Declarative descriptions of which message locations feed which record
//! fields.

use std::fmt;

/// A record slot that can take a string value.
pub trait StringSlot {
    /// Store `value` in the slot.
    fn set_string(&mut self, value: String);
}

impl StringSlot for String {
    fn set_string(&mut self, value: String) {
        *self = value;
    }
}

impl StringSlot for Option<String> {
    fn set_string(&mut self, value: String) {
        *self = Some(value);
    }
}

impl StringSlot for Box<str> {
    fn set_string(&mut self, value: String) {
        *self = value.into_boxed_str();
    }
}

type Setter<T> = Box<dyn Fn(&mut T, String) + Send + Sync>;

/// One (field name, location, setter) entry of a [`Schema`].
pub struct Binding<T> {
    name: &'static str,
    location: String,
    setter: Setter<T>,
}

impl<T> Binding<T> {
    /// The record field this binding writes.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The unparsed location string, e.g. `PID.5.1`.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub(crate) fn apply(&self, target: &mut T, value: String) {
        (self.setter)(target, value)
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// The bindable fields of a record type `T`, in declaration order.
///
/// Locations are kept as strings and parsed when binding, so one bad
/// location only affects its own field.
///
/// ```
/// use medi_hl7_bind::Schema;
///
/// #[derive(Default)]
/// struct Patient {
///     family_name: String,
///     given_name: Option<String>,
/// }
///
/// let schema = Schema::new()
///     .field("family_name", "PID.5.0", |p: &mut Patient| &mut p.family_name)
///     .field("given_name", "PID.5.1", |p: &mut Patient| &mut p.given_name);
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.bindings()[1].location(), "PID.5.1");
/// ```
pub struct Schema<T> {
    bindings: Vec<Binding<T>>,
}

impl<T: 'static> Schema<T> {
    /// An empty schema.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind the slot returned by `slot` to `location`.
    pub fn field<S>(
        self,
        name: &'static str,
        location: impl Into<String>,
        slot: fn(&mut T) -> &mut S,
    ) -> Self
    where
        S: StringSlot + 'static,
    {
        self.with_setter(name, location, move |target, value| {
            slot(target).set_string(value)
        })
    }

    /// Bind `location` through an arbitrary setter, for fields that need
    /// conversion before storing.
    pub fn with_setter<F>(mut self, name: &'static str, location: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut T, String) + Send + Sync + 'static,
    {
        self.bindings.push(Binding {
            name,
            location: location.into(),
            setter: Box::new(setter),
        });
        self
    }
}

impl<T> Schema<T> {
    /// The entries in declaration order.
    pub fn bindings(&self) -> &[Binding<T>] {
        &self.bindings
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.bindings).finish()
    }
}

/// A record type that declares its own binding schema.
pub trait Bindable: Sized + 'static {
    /// The schema used to fill `Self` from a message.
    fn schema() -> Schema<Self>;
}
