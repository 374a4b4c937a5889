//! Dotted-path addressing of values inside a message.
//!
//! A location has the form `TAG.field[.component[.subcomponent]]`, for
//! example `PID.5.1` (second component of the patient name) or `MSH.0`
//! (the header tag itself). Omitted component and subcomponent indices
//! default to 0. Repetitions are not addressable; lookups always use the
//! first repetition.

use std::fmt;
use std::str::FromStr;

use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;

use crate::error::{Hl7Error, Result};

/// A parsed (segment, field, component, subcomponent) coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Segment tag, e.g. `PID`
    pub segment: String,
    /// Field index; 0 addresses the tag itself
    pub field: usize,
    /// Component index within the first repetition
    pub component: usize,
    /// Subcomponent index within the component
    pub subcomponent: usize,
}

impl Location {
    /// Build a location from its parts.
    pub fn new(
        segment: impl Into<String>,
        field: usize,
        component: usize,
        subcomponent: usize,
    ) -> Self {
        Self {
            segment: segment.into(),
            field,
            component,
            subcomponent,
        }
    }

    /// Parse a dotted location string.
    pub fn parse(input: &str) -> Result<Self> {
        match all_consuming(location)(input) {
            Ok((_, loc)) => Ok(loc),
            Err(err) => Err(Hl7Error::InvalidLocation {
                input: input.to_string(),
                reason: describe_failure(input, &err),
            }),
        }
    }
}

impl FromStr for Location {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        Location::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.segment, self.field, self.component, self.subcomponent
        )
    }
}

fn tag(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '.')(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn location(input: &str) -> IResult<&str, Location> {
    let (rest, (segment, field, tail)) = tuple((
        tag,
        preceded(char('.'), index),
        opt(pair(
            preceded(char('.'), index),
            opt(preceded(char('.'), index)),
        )),
    ))(input)?;
    let (component, subcomponent) = match tail {
        Some((component, subcomponent)) => (component, subcomponent.unwrap_or(0)),
        None => (0, 0),
    };
    Ok((
        rest,
        Location {
            segment: segment.to_string(),
            field,
            component,
            subcomponent,
        },
    ))
}

/// Turn a nom failure into a short reason naming the offending token.
fn describe_failure(input: &str, err: &nom::Err<nom::error::Error<&str>>) -> String {
    let mut tokens = input.split('.');
    let tag = tokens.next().unwrap_or_default();
    if tag.is_empty() {
        return "missing segment tag".to_string();
    }
    let Some(field) = tokens.next() else {
        return "missing field index".to_string();
    };
    let indices = [
        ("field", Some(field)),
        ("component", tokens.next()),
        ("subcomponent", tokens.next()),
    ];
    for (name, token) in indices {
        if let Some(token) = token {
            if token.parse::<usize>().is_err() {
                return format!("{name} index {token:?} is not a non-negative integer");
            }
        }
    }
    if tokens.next().is_some() {
        return "too many path elements".to_string();
    }
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => format!("unexpected input at {:?}", e.input),
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_and_short_forms() {
        assert_eq!(Location::parse("PID.5.1").unwrap(), Location::new("PID", 5, 1, 0));
        assert_eq!(Location::parse("MSH.0").unwrap(), Location::new("MSH", 0, 0, 0));
        assert_eq!(Location::parse("OBX.5.2.3").unwrap(), Location::new("OBX", 5, 2, 3));
    }

    #[test]
    fn reports_reason_for_bad_input() {
        let reason = |s: &str| match Location::parse(s) {
            Err(Hl7Error::InvalidLocation { reason, .. }) => reason,
            other => panic!("expected InvalidLocation for {s:?}, got {other:?}"),
        };
        assert_eq!(reason(""), "missing segment tag");
        assert_eq!(reason(".5"), "missing segment tag");
        assert_eq!(reason("PID"), "missing field index");
        assert_eq!(reason("PID.x"), "field index \"x\" is not a non-negative integer");
        assert_eq!(reason("PID.-1"), "field index \"-1\" is not a non-negative integer");
        assert_eq!(reason("PID.5.a"), "component index \"a\" is not a non-negative integer");
        assert_eq!(reason("PID.5.1."), "subcomponent index \"\" is not a non-negative integer");
        assert_eq!(reason("PID.5.1.2.3"), "too many path elements");
    }

    #[test]
    fn display_is_canonical() {
        let loc: Location = "PID.5".parse().unwrap();
        assert_eq!(loc.to_string(), "PID.5.0.0");
        assert_eq!(loc.to_string().parse::<Location>().unwrap(), loc);
    }
}
