//! Process-side containers: traces, events and data contexts.

use serde::{Deserialize, Serialize};

use super::{Attributes, DataStream, Element};
use crate::filter::{sorted_unique, FilterSet, SourceMatching};
use crate::model::{AttributeValue, Point};
use crate::traits::SensorContainer;

/// One execution instance of a process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Trace attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Events, data contexts and data streams of the trace.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Trace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the trace has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the children.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// Returns true if a data stream is a direct child.
    #[must_use]
    pub fn contains_datastream(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Element::DataStream(_)))
    }

    /// Counts data streams reachable through the trace's data contexts.
    #[must_use]
    pub fn count_distinct_datacontext_groups(&self) -> usize {
        self.children
            .iter()
            .filter_map(|child| match child {
                Element::DataContext(context) => Some(context.count_distinct_groups()),
                _ => None,
            })
            .sum()
    }

    /// Counts the events of the trace that carry at least one data stream.
    #[must_use]
    pub fn count_events_with_streams(&self) -> usize {
        self.children
            .iter()
            .filter(|child| matches!(child, Element::Event(event) if event.contains_datastream()))
            .count()
    }
}

/// A single occurrence within a trace, or directly within a log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Data streams attached to the event.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Event {
    /// Creates an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the event has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if the event holds any child.
    ///
    /// Events only hold data streams, so any child counts.
    #[must_use]
    pub fn contains_datastream(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterates over the data streams attached directly to the event.
    pub fn datastreams(&self) -> impl Iterator<Item = &DataStream> {
        self.children.iter().filter_map(Element::as_datastream)
    }

    fn datastreams_mut(&mut self) -> impl Iterator<Item = &mut DataStream> {
        self.children.iter_mut().filter_map(|child| match child {
            Element::DataStream(stream) => Some(stream),
            _ => None,
        })
    }
}

impl SensorContainer for Event {
    fn add_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        self.datastreams_mut()
            .map(|stream| stream.add_sensor_value_with(point, matching))
            .sum()
    }

    fn remove_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        self.datastreams_mut()
            .map(|stream| stream.remove_sensor_value_with(point, matching))
            .sum()
    }

    fn fetch_sensor_values(&self, filter: &FilterSet) -> Vec<AttributeValue> {
        sorted_unique(
            self.datastreams()
                .flat_map(|stream| stream.fetch_sensor_values(filter)),
        )
    }
}

/// A grouping of data streams sharing a context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataContext {
    /// Nested data contexts and data streams.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl DataContext {
    /// Creates an empty data context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the context has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Counts data streams in this context and its nested contexts.
    #[must_use]
    pub fn count_distinct_groups(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Element::DataStream(_) => 1,
                Element::DataContext(nested) => nested.count_distinct_groups(),
                _ => 0,
            })
            .sum()
    }

    /// Returns true if a data stream is reachable through nested contexts.
    #[must_use]
    pub fn contains_datastream(&self) -> bool {
        self.children.iter().any(|child| match child {
            Element::DataStream(_) => true,
            Element::DataContext(nested) => nested.contains_datastream(),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MultiPoint;

    #[test]
    fn trace_detects_direct_datastreams_only() {
        let mut trace = Trace::new();
        let mut event = Event::new();
        event.push(DataStream::new());
        trace.push(event);
        assert!(!trace.contains_datastream());

        trace.push(DataStream::new());
        assert!(trace.contains_datastream());
    }

    #[test]
    fn datacontext_groups_are_counted_recursively() {
        let mut inner = DataContext::new();
        inner.push(DataStream::new());
        inner.push(DataStream::new());
        let mut outer = DataContext::new();
        outer.push(DataStream::new());
        outer.push(inner);

        let mut trace = Trace::new();
        trace.push(outer);
        trace.push(DataStream::new());
        assert_eq!(trace.count_distinct_datacontext_groups(), 3);
    }

    #[test]
    fn datacontext_contains_datastream_transitively() {
        let mut inner = DataContext::new();
        inner.push(DataStream::new());
        let mut outer = DataContext::new();
        outer.push(inner);
        assert!(outer.contains_datastream());

        let mut hollow = DataContext::new();
        hollow.push(DataContext::new());
        assert!(!hollow.contains_datastream());
    }

    #[test]
    fn events_with_streams_are_counted() {
        let mut trace = Trace::new();
        trace.push(Event::new());
        let mut event = Event::new();
        event.push(DataStream::new());
        trace.push(event.clone());
        trace.push(event);
        assert_eq!(trace.count_events_with_streams(), 2);
    }

    #[test]
    fn event_add_applies_to_every_stream() {
        let mut event = Event::new();
        event.push(DataStream::new().with_name("a"));
        event.push(DataStream::new().with_name("b"));
        let point = Point::new().with_id("sensor").with_value(1.5);

        assert_eq!(event.add_sensor_value(&point), 2);
        assert!(event.datastreams().all(|stream| stream.len() == 1));
        assert_eq!(event.add_sensor_value(&point), 0);

        assert_eq!(event.fetch_sensor_values(&FilterSet::new()), vec![AttributeValue::Float(1.5)]);
        assert_eq!(event.remove_sensor_value(&point), 2);
        assert!(event.datastreams().all(DataStream::is_empty));
    }

    #[test]
    fn event_fetch_reads_through_multipoints() {
        let mut group = MultiPoint::new().with_id("sensor");
        group.push(Point::new().with_value(2_i64));
        let mut stream = DataStream::new();
        stream.push(group);
        stream.push(Point::new().with_id("sensor").with_value(1_i64));
        let mut event = Event::new();
        event.push(stream);

        let values = event.fetch_sensor_values(&FilterSet::new().with_id("sensor"));
        assert_eq!(values, vec![AttributeValue::Int(1), AttributeValue::Int(2)]);
    }
}
