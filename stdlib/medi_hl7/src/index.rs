//! Segments grouped by tag for repeated random-access lookups.

use std::collections::HashMap;

use crate::segment::Segment;

/// Read-only grouping of a message's segments by tag.
///
/// Segments under a tag keep message order. Once built the index is never
/// mutated, so a shared reference may be used from many threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentIndex {
    by_tag: HashMap<String, Vec<Segment>>,
    tags: Vec<String>,
    len: usize,
}

impl SegmentIndex {
    /// Build an index from segments in message order.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut index = Self::default();
        for segment in segments {
            index.insert(segment);
        }
        index
    }

    pub(crate) fn insert(&mut self, segment: Segment) {
        let tag = segment.segment_type().into_owned();
        match self.by_tag.get_mut(&tag) {
            Some(group) => group.push(segment),
            None => {
                self.tags.push(tag.clone());
                self.by_tag.insert(tag, vec![segment]);
            }
        }
        self.len += 1;
    }

    /// All segments with `tag`, in message order; empty if there are none.
    pub fn lookup(&self, tag: &str) -> &[Segment] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first segment with `tag`.
    pub fn first(&self, tag: &str) -> Option<&Segment> {
        self.lookup(tag).first()
    }

    /// True when no segment with `tag` was seen.
    pub fn is_absent(&self, tag: &str) -> bool {
        !self.by_tag.contains_key(tag)
    }

    /// Distinct tags in order of first appearance.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Total number of segments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the message contained no segments.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
