//! Resolution of the five per-message control characters from the header.

use std::fmt;

use crate::error::{Hl7Error, Result, MIN_HEADER_LEN};

/// The separator and escape characters declared in a message header.
///
/// Characters are not required to be distinct; a degenerate message may use
/// one byte for every role and each level still splits on its own byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delimiters {
    /// Separates fields (header offset 3)
    pub field: u8,
    /// Separates components (header offset 4)
    pub component: u8,
    /// Separates repetitions (header offset 5)
    pub repetition: u8,
    /// Brackets escape sequences (header offset 6)
    pub escape: u8,
    /// Separates subcomponents (header offset 7)
    pub subcomponent: u8,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: b'|',
            component: b'^',
            repetition: b'~',
            escape: b'\\',
            subcomponent: b'&',
        }
    }
}

impl Delimiters {
    /// Read the delimiters from header offsets 3 through 7.
    ///
    /// The first three bytes are taken to be the header tag and are not checked.
    pub fn from_header(header: &[u8]) -> Result<Self> {
        if header.len() < MIN_HEADER_LEN {
            return Err(Hl7Error::HeaderTooShort { got: header.len() });
        }
        Ok(Self {
            field: header[3],
            component: header[4],
            repetition: header[5],
            escape: header[6],
            subcomponent: header[7],
        })
    }

    /// The four encoding characters in header order (component, repetition,
    /// escape, subcomponent), as they appear in the header's second field.
    pub fn encoding_characters(&self) -> [u8; 4] {
        [self.component, self.repetition, self.escape, self.subcomponent]
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c, r, e, s] = self.encoding_characters();
        write!(
            f,
            "{}{}{}{}{}",
            self.field as char, c as char, r as char, e as char, s as char
        )
    }
}
