//! In-memory object model of a DataStream-extended XES log.
//!
//! This module provides:
//! - [`Log`] — the whole document with its extensions, globals and classifiers
//! - [`Trace`], [`Event`], [`DataContext`] — the process-side containers
//! - [`DataStream`], [`MultiPoint`], [`Point`] — sensor timelines and readings
//! - [`Element`] — the closed set of child kinds every container stores
//! - [`AttributeValue`], [`Attributes`] — typed attribute values and maps
//!
//! Equality is structural everywhere and doubles as the identity key of the
//! merge operations in [`crate::traits::SensorContainer`].

mod attribute;
mod log;
mod stream;
mod trace;

use serde::{Deserialize, Serialize};

pub use attribute::{Attribute, AttributeType, AttributeValue, Attributes};
pub use log::{Classifier, Extension, GlobalScope, Log, Scope};
pub use stream::{DataStream, MultiPoint, Point};
pub use trace::{DataContext, Event, Trace};

/// Discriminant of an [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A [`Trace`].
    Trace,
    /// An [`Event`].
    Event,
    /// A [`DataContext`].
    DataContext,
    /// A [`DataStream`].
    DataStream,
    /// A [`MultiPoint`].
    MultiPoint,
    /// A [`Point`].
    Point,
}

impl ElementKind {
    /// Returns the lowercase name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Event => "event",
            Self::DataContext => "datacontext",
            Self::DataStream => "datastream",
            Self::MultiPoint => "multipoint",
            Self::Point => "point",
        }
    }
}

/// A child of a log, trace, event, data context or data stream.
///
/// Which kinds a parent may hold is checked by [`crate::verifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// An execution instance.
    Trace(Trace),
    /// An occurrence.
    Event(Event),
    /// A grouping of streams.
    DataContext(DataContext),
    /// A sensor timeline.
    DataStream(DataStream),
    /// A compressed group of readings.
    MultiPoint(MultiPoint),
    /// A single reading.
    Point(Point),
}

impl Element {
    /// Returns the kind of this element.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Trace(_) => ElementKind::Trace,
            Self::Event(_) => ElementKind::Event,
            Self::DataContext(_) => ElementKind::DataContext,
            Self::DataStream(_) => ElementKind::DataStream,
            Self::MultiPoint(_) => ElementKind::MultiPoint,
            Self::Point(_) => ElementKind::Point,
        }
    }

    /// Returns the data stream if this element is one.
    #[must_use]
    pub const fn as_datastream(&self) -> Option<&DataStream> {
        match self {
            Self::DataStream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Returns the event if this element is one.
    #[must_use]
    pub const fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }

    /// Returns the trace if this element is one.
    #[must_use]
    pub const fn as_trace(&self) -> Option<&Trace> {
        match self {
            Self::Trace(trace) => Some(trace),
            _ => None,
        }
    }
}

impl From<Trace> for Element {
    fn from(value: Trace) -> Self {
        Self::Trace(value)
    }
}

impl From<Event> for Element {
    fn from(value: Event) -> Self {
        Self::Event(value)
    }
}

impl From<DataContext> for Element {
    fn from(value: DataContext) -> Self {
        Self::DataContext(value)
    }
}

impl From<DataStream> for Element {
    fn from(value: DataStream) -> Self {
        Self::DataStream(value)
    }
}

impl From<MultiPoint> for Element {
    fn from(value: MultiPoint) -> Self {
        Self::MultiPoint(value)
    }
}

impl From<Point> for Element {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}
