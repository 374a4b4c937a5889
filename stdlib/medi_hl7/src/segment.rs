//! A single message segment and navigation of its field hierarchy.
//!
//! Values are addressed as field → repetition → component → subcomponent.
//! Field 0 is the segment tag. In header segments (`MSH`, `FHS`, `BHS`) the
//! byte after the tag is the field separator and field 1 holds the encoding
//! characters verbatim, so `MSH|^~\&|CERNER` has `CERNER` at field 2.

use std::borrow::Cow;
use std::fmt;

use crate::delimiters::Delimiters;
use crate::error::{Hl7Error, Result};
use crate::escape::unescape;
use crate::location::Location;

/// Tags whose fourth byte declares the delimiters.
const HEADER_TAGS: [&[u8]; 3] = [b"MSH", b"FHS", b"BHS"];

/// Result of splitting text on one delimiter level.
///
/// Text without the delimiter is `Unsplit`, and index 0 of it is the whole
/// text, so "no components" and "component 0" read the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split<'a> {
    /// The delimiter does not occur in the text
    Unsplit(&'a [u8]),
    /// The text split into two or more parts
    Parts(Vec<&'a [u8]>),
}

impl<'a> Split<'a> {
    /// Split `text` on `sep`.
    pub fn new(text: &'a [u8], sep: u8) -> Self {
        if text.contains(&sep) {
            Split::Parts(text.split(|&b| b == sep).collect())
        } else {
            Split::Unsplit(text)
        }
    }

    /// The part at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        match self {
            Split::Unsplit(text) if index == 0 => Some(*text),
            Split::Unsplit(_) => None,
            Split::Parts(parts) => parts.get(index).copied(),
        }
    }

    /// Number of addressable parts.
    pub fn len(&self) -> usize {
        match self {
            Split::Unsplit(_) => 1,
            Split::Parts(parts) => parts.len(),
        }
    }

    /// Always false: even empty text has one (empty) part.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// One line of a message, kept as raw bytes with the message's delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    raw: Vec<u8>,
    delims: Delimiters,
}

impl Segment {
    /// Wrap raw segment bytes (without the line terminator).
    pub fn new(raw: impl Into<Vec<u8>>, delims: Delimiters) -> Self {
        Self {
            raw: raw.into(),
            delims,
        }
    }

    /// The raw bytes of the segment.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The delimiters this segment is tokenized with.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    /// The segment tag: everything before the first field separator.
    pub fn segment_type(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.tag_bytes())
    }

    /// Number of fields after the tag.
    pub fn field_count(&self) -> usize {
        self.fields().len() - 1
    }

    /// Whether this is a header segment carrying the delimiter declaration.
    pub fn is_header(&self) -> bool {
        self.raw.len() > 3
            && self.raw[3] == self.delims.field
            && HEADER_TAGS.contains(&&self.raw[..3])
    }

    /// Number of repetitions in a field.
    pub fn repetition_count(&self, field: usize) -> Result<usize> {
        if field == 0 || self.is_encoding_field(field) {
            return Ok(1);
        }
        let text = self.field_bytes(field)?;
        Ok(Split::new(text, self.delims.repetition).len())
    }

    /// Resolve a coordinate to its decoded text value.
    ///
    /// Field 0 returns the tag and ignores the other indices. The header's
    /// encoding-characters field is returned without unescaping.
    pub fn get(
        &self,
        field: usize,
        repetition: usize,
        component: usize,
        subcomponent: usize,
    ) -> Result<String> {
        let raw = self.get_raw(field, repetition, component, subcomponent)?;
        if field == 0 || self.is_encoding_field(field) {
            return Ok(String::from_utf8_lossy(raw).into_owned());
        }
        Ok(unescape(raw, &self.delims))
    }

    /// Resolve a location against this segment using the first repetition.
    ///
    /// The location's segment tag is not compared with this segment's.
    pub fn get_location(&self, loc: &Location) -> Result<String> {
        self.get(loc.field, 0, loc.component, loc.subcomponent)
    }

    /// Resolve a coordinate to the raw bytes it covers, escapes untouched.
    pub fn get_raw(
        &self,
        field: usize,
        repetition: usize,
        component: usize,
        subcomponent: usize,
    ) -> Result<&[u8]> {
        if field == 0 {
            return Ok(self.tag_bytes());
        }
        let text = self.field_bytes(field)?;
        if self.is_encoding_field(field) {
            return single_part(text, field, repetition, component, subcomponent);
        }

        let reps = Split::new(text, self.delims.repetition);
        let rep = reps.get(repetition).ok_or(Hl7Error::RepetitionOutOfRange {
            field,
            repetition,
            count: reps.len(),
        })?;

        let comps = Split::new(rep, self.delims.component);
        let comp = comps.get(component).ok_or(Hl7Error::ComponentOutOfRange {
            field,
            component,
            count: comps.len(),
        })?;

        let subs = Split::new(comp, self.delims.subcomponent);
        subs.get(subcomponent)
            .ok_or(Hl7Error::SubcomponentOutOfRange {
                field,
                component,
                subcomponent,
                count: subs.len(),
            })
    }

    fn tag_bytes(&self) -> &[u8] {
        if self.is_header() {
            return &self.raw[..3];
        }
        let end = self
            .raw
            .iter()
            .position(|&b| b == self.delims.field)
            .unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    fn is_encoding_field(&self, field: usize) -> bool {
        field == 1 && self.is_header()
    }

    fn field_bytes(&self, field: usize) -> Result<&[u8]> {
        let fields = self.fields();
        fields
            .get(field)
            .copied()
            .ok_or_else(|| Hl7Error::FieldOutOfRange {
                segment: self.segment_type().into_owned(),
                field,
                count: fields.len() - 1,
            })
    }

    /// All fields, element 0 being the tag.
    fn fields(&self) -> Vec<&[u8]> {
        let sep = self.delims.field;
        if !self.is_header() {
            return self.raw.split(|&b| b == sep).collect();
        }

        // Header: the encoding characters run from offset 4 to the next field
        // separator at or after offset 8, whatever bytes they contain.
        let raw = &self.raw[..];
        let enc_end = match raw.get(8..) {
            Some(rest) => 8 + rest.iter().position(|&b| b == sep).unwrap_or(rest.len()),
            None => raw.len(),
        };
        let mut fields = vec![&raw[..3], &raw[4..enc_end]];
        if enc_end < raw.len() {
            fields.extend(raw[enc_end + 1..].split(|&b| b == sep));
        }
        fields
    }
}

/// Address a value that is never split: only index 0 exists at each level.
fn single_part(
    text: &[u8],
    field: usize,
    repetition: usize,
    component: usize,
    subcomponent: usize,
) -> Result<&[u8]> {
    if repetition != 0 {
        return Err(Hl7Error::RepetitionOutOfRange {
            field,
            repetition,
            count: 1,
        });
    }
    if component != 0 {
        return Err(Hl7Error::ComponentOutOfRange {
            field,
            component,
            count: 1,
        });
    }
    if subcomponent != 0 {
        return Err(Hl7Error::SubcomponentOutOfRange {
            field,
            component,
            subcomponent,
            count: 1,
        });
    }
    Ok(text)
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.raw))
    }
}
