//! Single-pass, line-oriented parser for DataStream XES documents.
//!
//! The parser is a state machine advanced one line at a time with
//! [`XesParser::feed_line`]. It keeps one cursor per open element kind, a
//! stack of open data contexts and a stack of open nested attribute lists.
//! Each line is handed to the log handler, which delegates to the deepest
//! open element; a handler that reads its own closing line hands the
//! finished element back to its parent.
//!
//! ```
//! use xes_stream::parser::parse_str;
//!
//! let log = parse_str(concat!(
//!     "<log xes.version=\"1.0\" xes.features=\"nested-attributes\">\n",
//!     "<trace>\n",
//!     "<string key=\"concept:name\" value=\"case-1\" />\n",
//!     "</trace>\n",
//!     "</log>\n",
//! ))?;
//! assert_eq!(log.len(), 1);
//! # Ok::<(), xes_stream::XesError>(())
//! ```

mod attributes;
mod line;
mod machine;

use std::fmt;
use std::io::BufRead;

use tracing::debug;

use crate::constants::TAG_LOG;
use crate::error::{Expectation, Result, XesError};
use crate::model::{DataContext, DataStream, Event, Log, MultiPoint, Point, Scope, Trace};
use crate::timestamp::Rfc3339TimestampParser;
use crate::traits::TimestampParser;

use attributes::AttributeStack;
use line::Line;

/// The element a line is being interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// Outside the log element.
    Document,
    /// Directly inside the log.
    Log,
    /// Inside a `<global>` declaration.
    GlobalScope,
    /// Inside a trace.
    Trace,
    /// Inside an event.
    Event,
    /// Inside a data context.
    DataContext,
    /// Inside a data stream.
    DataStream,
    /// Inside a multipoint.
    MultiPoint,
    /// Inside a point.
    Point,
    /// Inside a nested attribute list.
    Attribute,
}

impl ParseState {
    /// Returns the lowercase name of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Log => "log",
            Self::GlobalScope => "global",
            Self::Trace => "trace",
            Self::Event => "event",
            Self::DataContext => "datacontext",
            Self::DataStream => "datastream",
            Self::MultiPoint => "multipoint",
            Self::Point => "point",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streaming parser producing one [`Log`].
#[derive(Debug)]
pub struct XesParser<P = Rfc3339TimestampParser> {
    timestamps: P,
    line_number: usize,
    log: Option<Log>,
    log_closed: bool,
    global_scope: Option<Scope>,
    trace: Option<Trace>,
    event: Option<Event>,
    datacontexts: Vec<DataContext>,
    datastream: Option<DataStream>,
    multipoint: Option<MultiPoint>,
    point: Option<Point>,
    stream_data_key: Option<String>,
    nested: AttributeStack,
}

impl XesParser {
    /// Creates a parser using [`Rfc3339TimestampParser`] for dates.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timestamp_parser(Rfc3339TimestampParser)
    }
}

impl Default for XesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TimestampParser> XesParser<P> {
    /// Creates a parser using a custom date parser.
    pub fn with_timestamp_parser(timestamps: P) -> Self {
        Self {
            timestamps,
            line_number: 0,
            log: None,
            log_closed: false,
            global_scope: None,
            trace: None,
            event: None,
            datacontexts: Vec::new(),
            datastream: None,
            multipoint: None,
            point: None,
            stream_data_key: None,
            nested: AttributeStack::default(),
        }
    }

    /// Returns the number of lines consumed so far.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Returns the state the next line will be interpreted in.
    #[must_use]
    pub fn state(&self) -> ParseState {
        if self.log.is_none() || self.log_closed {
            ParseState::Document
        } else if !self.nested.is_empty() {
            ParseState::Attribute
        } else if self.point.is_some() {
            ParseState::Point
        } else if self.multipoint.is_some() {
            ParseState::MultiPoint
        } else if self.datastream.is_some() {
            ParseState::DataStream
        } else if !self.datacontexts.is_empty() {
            ParseState::DataContext
        } else if self.event.is_some() {
            ParseState::Event
        } else if self.trace.is_some() {
            ParseState::Trace
        } else if self.global_scope.is_some() {
            ParseState::GlobalScope
        } else {
            ParseState::Log
        }
    }

    /// Consumes one line, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns the grammar violation, annotated with the line number.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line_number += 1;
        let line = Line::new(raw.trim_end_matches(['\r', '\n']));
        if line.is_blank() {
            return Ok(());
        }
        self.step(&line).map_err(|err| err.at_line(self.line_number))
    }

    fn step(&mut self, line: &Line<'_>) -> Result<()> {
        if self.log_closed {
            if line.opens(TAG_LOG) {
                return Err(XesError::MultipleRootDocuments);
            }
            return Err(XesError::UnexpectedState {
                state: ParseState::Document,
                content: line.text().to_string(),
            });
        }

        if self.log.is_some() {
            if self.process_log(line)? {
                debug!(line = self.line_number, "log closed");
                self.log_closed = true;
            }
        } else if line.opens(TAG_LOG) {
            self.log = Some(machine::open_log(line));
            debug!(line = self.line_number, "log opened");
        }
        Ok(())
    }

    /// Returns the parsed log once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Fails if no log was found or the log was never closed.
    pub fn finish(self) -> Result<Log> {
        let Some(log) = self.log else {
            return Err(XesError::PreconditionViolated {
                subject: "log",
                expectation: Expectation::ShouldBeSet,
            }
            .at_line(self.line_number));
        };
        if !self.log_closed {
            return Err(XesError::UnexpectedState {
                state: ParseState::Log,
                content: "end of input".to_string(),
            }
            .at_line(self.line_number));
        }
        Ok(log)
    }
}

/// Parses a whole document held in memory.
///
/// # Errors
///
/// Returns the first grammar violation.
pub fn parse_str(text: &str) -> Result<Log> {
    let mut parser = XesParser::new();
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parses a UTF-8 document from a buffered reader.
///
/// # Errors
///
/// Returns the first grammar violation or I/O error.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Log> {
    let mut parser = XesParser::new();
    for line in reader.lines() {
        parser.feed_line(&line?)?;
    }
    parser.finish()
}
