//! # xes-stream
//!
//! Reader, object model and writer for XES event logs enriched with the
//! DataStream extension, which attaches sensor readings to traces and events.
//!
//! This crate provides:
//!
//! - [`Log`], [`Trace`], [`Event`] — the process side of a log
//! - [`DataContext`], [`DataStream`], [`MultiPoint`], [`Point`] — sensor readings
//! - [`SensorContainer`] — merge, removal and lookup of readings
//! - [`FilterSet`] — patterns over reading fields
//! - [`XesParser`] — single-pass line parser, plus [`import_file`]
//! - [`export_file`] — the inverse writer
//! - [`verify`] — structural checks shared by import and export
//! - [`query`] — analysis helpers over a parsed log
//!
//! ## Example
//!
//! ```rust
//! use xes_stream::{DataStream, Event, FilterSet, Point, SensorContainer};
//!
//! let mut event = Event::new();
//! event.push(DataStream::new().with_name("temperature"));
//!
//! let reading = Point::new().with_id("t1").with_value(21.5);
//! assert_eq!(event.add_sensor_value(&reading), 1);
//! assert_eq!(event.add_sensor_value(&reading), 0);
//!
//! let values = event.fetch_sensor_values(&FilterSet::new().with_id("t1"));
//! assert_eq!(values.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod importer;
pub mod io;
pub mod model;
pub mod parser;
pub mod query;
pub mod timestamp;
pub mod traits;
pub mod verifier;

// Re-export main types
pub use config::XesConfig;
pub use error::{Expectation, Result, XesError};
pub use exporter::{export_file, export_to_bytes, export_to_string, export_to_writer};
pub use filter::{FilterSet, SourceMatching};
pub use importer::{import_file, import_reader, import_reader_with};
pub use model::{
    Attribute, AttributeType, AttributeValue, Attributes, Classifier, DataContext, DataStream,
    Element, ElementKind, Event, Extension, GlobalScope, Log, MultiPoint, Point, Scope, Trace,
};
pub use parser::{parse_reader, parse_str, ParseState, XesParser};
pub use timestamp::Rfc3339TimestampParser;
pub use traits::{SensorContainer, TimestampParser};
pub use verifier::{verify, verify_element, VerificationReport};
