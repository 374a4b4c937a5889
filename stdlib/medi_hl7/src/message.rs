//! A whole HL7 message: lazy segment reads or a parsed segment index.
//!
//! A [`Message`] can be consumed in two ways:
//!
//! - segment at a time with [`Message::read_segment`] or
//!   [`Message::segments`], which hold the reader lock for one segment so
//!   concurrent callers see a clean sequence;
//! - all at once with [`Message::parse`], which drains the input into a
//!   [`SegmentIndex`] for [`Message::find`]/[`Message::get`] lookups.
//!
//! The input can only be read once, so segments already taken with
//! `read_segment` will be missing from a later `parse`.

use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::sync::Mutex;

use log::debug;

use crate::delimiters::Delimiters;
use crate::error::{Hl7Error, Result, MIN_HEADER_LEN};
use crate::index::SegmentIndex;
use crate::location::Location;
use crate::reader::{ReaderConfig, SegmentReader};
use crate::segment::Segment;

type Source = Box<dyn BufRead + Send>;

/// A parsed or partially read HL7 message.
pub struct Message {
    delims: Delimiters,
    config: ReaderConfig,
    reader: Mutex<SegmentReader<Source>>,
    index: Option<SegmentIndex>,
}

impl Message {
    /// Create a message from an in-memory buffer with default configuration.
    ///
    /// Fails with [`Hl7Error::HeaderTooShort`] if fewer than 8 bytes are given.
    pub fn new(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::with_config(data, ReaderConfig::default())
    }

    /// Create a message from an in-memory buffer.
    pub fn with_config(data: impl Into<Vec<u8>>, config: ReaderConfig) -> Result<Self> {
        let data = data.into();
        let delims = Delimiters::from_header(&data)?;
        Ok(Self::from_parts(delims, config, Box::new(Cursor::new(data))))
    }

    /// Create a message from a streaming source with default configuration.
    ///
    /// The 8 header bytes are read eagerly to resolve the delimiters; the
    /// rest of the source is read as segments are requested.
    pub fn from_reader<R>(source: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::from_reader_with_config(source, ReaderConfig::default())
    }

    /// Create a message from a streaming source.
    pub fn from_reader_with_config<R>(mut source: R, config: ReaderConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let mut header = [0u8; MIN_HEADER_LEN];
        let got = read_header(&mut source, &mut header)?;
        let delims = Delimiters::from_header(&header[..got])?;
        let replay = Cursor::new(header).chain(source);
        // a zero-capacity BufReader reports end of input on every fill
        let buffered = BufReader::with_capacity(config.buffer_capacity.max(1), replay);
        Ok(Self::from_parts(delims, config, Box::new(buffered)))
    }

    fn from_parts(delims: Delimiters, config: ReaderConfig, source: Source) -> Self {
        debug!("message delimiters resolved: {delims}");
        Self {
            delims,
            config,
            reader: Mutex::new(SegmentReader::new(source, delims)),
            index: None,
        }
    }

    /// The delimiters declared in the header.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    /// The configuration this message was created with.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read the next segment, or `Ok(None)` at end of input.
    ///
    /// Safe to call from several threads through a shared reference; each
    /// call reads one whole segment under the reader lock.
    pub fn read_segment(&self) -> Result<Option<Segment>> {
        let mut reader = self.reader.lock().map_err(|_| Hl7Error::LockPoisoned)?;
        reader.next_segment()
    }

    /// Iterate over the remaining segments.
    pub fn segments(&self) -> Segments<'_> {
        Segments { message: self }
    }

    /// Drain the input and group every segment by tag.
    ///
    /// May be called once; a second call fails with
    /// [`Hl7Error::AlreadyParsed`].
    pub fn parse(&mut self) -> Result<&SegmentIndex> {
        if self.index.is_some() {
            return Err(Hl7Error::AlreadyParsed);
        }
        let reader = self.reader.get_mut().map_err(|_| Hl7Error::LockPoisoned)?;
        let mut index = SegmentIndex::default();
        while let Some(segment) = reader.next_segment()? {
            index.insert(segment);
        }
        debug!(
            "parsed {} segments under {} tags",
            index.len(),
            index.tags().count()
        );
        Ok(self.index.insert(index))
    }

    /// Whether [`Message::parse`] has run.
    pub fn is_parsed(&self) -> bool {
        self.index.is_some()
    }

    /// The segment index built by [`Message::parse`].
    pub fn index(&self) -> Option<&SegmentIndex> {
        self.index.as_ref()
    }

    /// All segments with `tag`, in message order.
    ///
    /// Never fails: an unknown tag, or a message that has not been parsed,
    /// gives an empty slice. Use [`Message::is_absent`] to test for a tag.
    pub fn segment(&self, tag: &str) -> &[Segment] {
        match &self.index {
            Some(index) => index.lookup(tag),
            None => &[],
        }
    }

    /// True when the parsed message has no segment with `tag`.
    ///
    /// Before [`Message::parse`] every tag reads as absent; check
    /// [`Message::is_parsed`] to tell the two apart. [`Message::get`]
    /// reports [`Hl7Error::NotParsed`] instead.
    pub fn is_absent(&self, tag: &str) -> bool {
        self.segment(tag).is_empty()
    }

    /// Look up a value by dotted location string, e.g. `"PID.5.1"`.
    ///
    /// Uses the first segment with the tag and the first repetition.
    pub fn find(&self, location: &str) -> Result<String> {
        self.get(&Location::parse(location)?)
    }

    /// Look up the value at `location` in the first matching segment.
    pub fn get(&self, location: &Location) -> Result<String> {
        let index = self.index.as_ref().ok_or(Hl7Error::NotParsed)?;
        let segment = index
            .first(&location.segment)
            .ok_or_else(|| Hl7Error::SegmentNotFound {
                tag: location.segment.clone(),
            })?;
        if self.config.decode_escapes {
            return segment.get_location(location);
        }
        let raw = segment.get_raw(location.field, 0, location.component, location.subcomponent)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("delims", &self.delims)
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Iterator over a message's unread segments; see [`Message::segments`].
pub struct Segments<'m> {
    message: &'m Message,
}

impl Iterator for Segments<'_> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.message.read_segment().transpose()
    }
}

/// Fill `header` from `source`, returning how many bytes were available.
fn read_header<R: Read>(source: &mut R, header: &mut [u8]) -> Result<usize> {
    let mut got = 0;
    while got < header.len() {
        match source.read(&mut header[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(got)
}
