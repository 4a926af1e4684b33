//! Convenience queries over a parsed log.
//!
//! These are thin wrappers over the model methods, named after the questions
//! analyses usually ask of a sensor-enriched log.

use crate::config::XesConfig;
use crate::filter::FilterSet;
use crate::model::{AttributeValue, DataStream, Event, Log, MultiPoint, Point, Trace};
use crate::traits::SensorContainer;

/// Stores `point` in `container`, returning how many copies were stored.
pub fn add_sensor_value<C: SensorContainer + ?Sized>(container: &mut C, point: &Point) -> usize {
    container.add_sensor_value(point)
}

/// Like [`add_sensor_value`], with the source rule taken from `config`.
pub fn add_sensor_value_with<C: SensorContainer + ?Sized>(
    container: &mut C,
    point: &Point,
    config: &XesConfig,
) -> usize {
    container.add_sensor_value_with(point, config.source_matching)
}

/// Removes every reading equal to `point`, returning how many were removed.
pub fn remove_sensor_value<C: SensorContainer + ?Sized>(container: &mut C, point: &Point) -> usize {
    container.remove_sensor_value(point)
}

/// Like [`remove_sensor_value`], with the source rule taken from `config`.
pub fn remove_sensor_value_with<C: SensorContainer + ?Sized>(
    container: &mut C,
    point: &Point,
    config: &XesConfig,
) -> usize {
    container.remove_sensor_value_with(point, config.source_matching)
}

/// Returns the sorted, de-duplicated values of readings matching `filter`.
#[must_use]
pub fn sensor_values_of_specific_type<C: SensorContainer + ?Sized>(
    container: &C,
    filter: &FilterSet,
) -> Vec<AttributeValue> {
    container.fetch_sensor_values(filter)
}

/// Returns the traces that hold a data stream directly, in log order.
#[must_use]
pub fn traces_containing_sensor_data(log: &Log) -> Vec<&Trace> {
    log.traces().filter(|trace| trace.contains_datastream()).collect()
}

/// Counts the data streams reachable through the trace's data contexts.
#[must_use]
pub fn count_distinct_data_context_groups(trace: &Trace) -> usize {
    trace.count_distinct_datacontext_groups()
}

/// Returns the number of entries of each data stream of `event`.
///
/// A multipoint counts as one entry.
#[must_use]
pub fn count_points_per_stream(event: &Event) -> Vec<usize> {
    event.datastreams().map(DataStream::count_points).collect()
}

/// Returns the data streams of `event` that were introduced by a
/// `stream/data` lifecycle attribute.
#[must_use]
pub fn streams_carrying_raw_data(event: &Event) -> Vec<&DataStream> {
    event.datastreams().filter(|stream| stream.is_stream_data()).collect()
}

/// Counts the events of `trace` that carry at least one data stream.
#[must_use]
pub fn count_events_with_streams(trace: &Trace) -> usize {
    trace.count_events_with_streams()
}

/// Returns the number of readings grouped in `group`.
#[must_use]
pub fn count_points_in_multipoint(group: &MultiPoint) -> usize {
    group.count_points()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SourceMatching;
    use crate::model::Attribute;

    fn event_with_streams() -> Event {
        let mut raw = DataStream::new().with_name("raw").with_origin_key("lifecycle:transition");
        raw.push(Point::new().with_value(1_i64));
        raw.push(Point::new().with_value(2_i64));
        let mut event = Event::new();
        event.push(raw);
        event.push(DataStream::new().with_name("derived"));
        event
    }

    #[test]
    fn points_per_stream_in_order() {
        assert_eq!(count_points_per_stream(&event_with_streams()), vec![2, 0]);
    }

    #[test]
    fn raw_data_streams_have_an_origin() {
        let event = event_with_streams();
        let raw = streams_carrying_raw_data(&event);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].name.as_deref(), Some("raw"));
    }

    #[test]
    fn traces_with_streams_are_selected() {
        let mut with_stream = Trace::new();
        with_stream.attributes.set("concept:name", "a");
        with_stream.push(DataStream::new());
        let mut without = Trace::new();
        without.push(event_with_streams());

        let mut log = Log::new();
        log.push(without);
        log.push(Event::new());
        log.push(with_stream.clone());
        assert_eq!(traces_containing_sensor_data(&log), vec![&with_stream]);
    }

    #[test]
    fn values_are_fetched_through_the_facade() {
        let mut event = event_with_streams();
        assert_eq!(add_sensor_value(&mut event, &Point::new().with_value(3_i64)), 2);
        assert_eq!(
            sensor_values_of_specific_type(&event, &FilterSet::new()),
            vec![AttributeValue::Int(1), AttributeValue::Int(2), AttributeValue::Int(3)]
        );
        assert_eq!(remove_sensor_value(&mut event, &Point::new().with_value(3_i64)), 2);
        assert_eq!(count_points_per_stream(&event), vec![2, 0]);
    }

    #[test]
    fn config_selects_source_matching() {
        let meta = vec![Attribute::new("unit", "C")];
        let mut stream = DataStream::new();
        stream.push(MultiPoint::new().with_source(meta.clone()));
        let point = Point::new().with_meta(meta).with_value(4_i64);

        let mut same_field = stream.clone();
        assert_eq!(add_sensor_value_with(&mut same_field, &point, &XesConfig::new()), 1);
        assert_eq!(same_field.len(), 2);
        assert_eq!(remove_sensor_value_with(&mut same_field, &point, &XesConfig::new()), 1);
        assert_eq!(same_field, stream);

        let legacy = XesConfig::new().with_source_matching(SourceMatching::Legacy);
        assert_eq!(add_sensor_value_with(&mut stream, &point, &legacy), 1);
        assert_eq!(stream.len(), 1);
        let Some(crate::model::Element::MultiPoint(group)) = stream.children.first() else {
            unreachable!("the group is kept in place");
        };
        assert_eq!(count_points_in_multipoint(group), 1);
    }
}
