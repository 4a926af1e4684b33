//! Query and merge scenarios over parsed logs.
//!
//! Covers:
//! 1. Counting helpers over traces, events and multipoints
//! 2. Adding, removing and fetching readings on a parsed event

use std::path::PathBuf;

use chrono::DateTime;
use xes_stream::query::{
    add_sensor_value, count_distinct_data_context_groups, count_events_with_streams,
    count_points_in_multipoint, count_points_per_stream, remove_sensor_value,
    sensor_values_of_specific_type, streams_carrying_raw_data, traces_containing_sensor_data,
};
use xes_stream::{
    Attribute, AttributeValue, DataStream, Element, Event, FilterSet, Log, MultiPoint, Point,
    XesConfig, import_file,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn load(name: &str) -> Log {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    import_file(path, &XesConfig::new()).expect("import fixture")
}

fn first_event(log: &Log) -> Event {
    let trace = log.traces().next().expect("trace");
    match trace.children.iter().find_map(Element::as_event) {
        Some(event) => event.clone(),
        None => unreachable!("fixture trace has an event"),
    }
}

fn ts(text: &str) -> AttributeValue {
    AttributeValue::Date(DateTime::parse_from_rfc3339(text).expect("valid timestamp"))
}

fn stream_at(event: &Event, index: usize) -> &DataStream {
    event.datastreams().nth(index).expect("stream index")
}

// ============================================================================
// Counting
// ============================================================================

#[test]
fn points_per_stream_and_raw_streams() {
    let event = first_event(&load("multipoint.xes"));
    assert_eq!(count_points_per_stream(&event), vec![2, 0]);

    let raw = streams_carrying_raw_data(&event);
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].name.as_deref(), Some("oven"));
    assert_eq!(raw[0].origin_key.as_deref(), Some("cpee:lifecycle:transition"));
}

#[test]
fn multipoint_sizes() {
    let event = first_event(&load("multipoint.xes"));
    let sizes: Vec<_> = stream_at(&event, 0)
        .iter()
        .filter_map(|child| match child {
            Element::MultiPoint(group) => Some(count_points_in_multipoint(group)),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![2]);
}

#[test]
fn trace_level_counts() {
    let log = load("datacontext.xes");
    let counts: Vec<_> = log.traces().map(count_distinct_data_context_groups).collect();
    assert_eq!(counts, vec![3, 0]);

    let with_data = traces_containing_sensor_data(&log);
    assert_eq!(with_data.len(), 1);
    assert_eq!(
        with_data[0].attributes.get("concept:name").and_then(AttributeValue::as_str),
        Some("with contexts")
    );
}

#[test]
fn events_with_streams_per_trace() {
    let log = load("multipoint.xes");
    let counts: Vec<_> = log.traces().map(count_events_with_streams).collect();
    assert_eq!(counts, vec![1]);

    let log = load("event_in_log.xes");
    let counts: Vec<_> = log.traces().map(count_events_with_streams).collect();
    assert_eq!(counts, vec![0]);
}

// ============================================================================
// Merge and Lookup
// ============================================================================

#[test]
fn fetch_reads_points_and_completed_multipoints() {
    let event = first_event(&load("multipoint.xes"));

    let temperature = sensor_values_of_specific_type(&event, &FilterSet::new().with_id("temperature"));
    assert_eq!(temperature, vec![AttributeValue::Float(182.5), AttributeValue::Float(183.0)]);

    let grouped = sensor_values_of_specific_type(
        &event,
        &FilterSet::new().with_timestamp(ts("2023-04-28T17:18:22+02:00")),
    );
    assert_eq!(grouped, vec![AttributeValue::Int(41), AttributeValue::Float(183.0)]);

    let none = sensor_values_of_specific_type(&event, &FilterSet::new().with_source("elsewhere"));
    assert!(none.is_empty());
}

#[test]
fn matching_reading_joins_the_multipoint() {
    let mut event = first_event(&load("multipoint.xes"));
    let reading = Point::new()
        .with_id("pressure")
        .with_timestamp(ts("2023-04-28T17:18:22+02:00"))
        .with_value(1.2)
        .with_source("thermocouple")
        .with_meta(vec![Attribute::new("unit", "C")]);

    // Joins the group in the first stream, appended directly to the second.
    assert_eq!(add_sensor_value(&mut event, &reading), 2);
    assert_eq!(count_points_per_stream(&event), vec![2, 1]);
    assert_eq!(add_sensor_value(&mut event, &reading), 0);

    let Some(Element::MultiPoint(group)) = stream_at(&event, 0).children.get(1) else {
        unreachable!("second entry is the group");
    };
    assert_eq!(count_points_in_multipoint(group), 3);
    assert_eq!(group.points[2], Point::new().with_id("pressure").with_value(1.2));
    assert_eq!(group.complete(2), Some(reading.clone()));

    assert_eq!(remove_sensor_value(&mut event, &reading), 2);
    assert_eq!(event, first_event(&load("multipoint.xes")));
}

#[test]
fn non_matching_reading_is_appended() {
    let mut event = first_event(&load("multipoint.xes"));
    let reading = Point::new()
        .with_id("temperature")
        .with_timestamp(ts("2023-04-28T17:18:30+02:00"))
        .with_value(185.0);

    assert_eq!(add_sensor_value(&mut event, &reading), 2);
    assert_eq!(count_points_per_stream(&event), vec![3, 1]);
    assert!(matches!(stream_at(&event, 0).children.last(), Some(Element::Point(p)) if *p == reading));
}

#[test]
fn removing_a_grouped_reading_keeps_the_group() {
    let mut event = first_event(&load("multipoint.xes"));
    let stored = Point::new()
        .with_id("humidity")
        .with_timestamp(ts("2023-04-28T17:18:22+02:00"))
        .with_value(41_i64)
        .with_source("thermocouple")
        .with_meta(vec![Attribute::new("unit", "C")]);

    assert_eq!(remove_sensor_value(&mut event, &stored), 1);
    assert_eq!(count_points_per_stream(&event), vec![2, 0]);
    let Some(Element::MultiPoint(group)) = stream_at(&event, 0).children.get(1) else {
        unreachable!("group survives");
    };
    assert_eq!(group.len(), 1);
    assert_eq!(remove_sensor_value(&mut event, &stored), 0);
}

#[test]
fn empty_multipoint_accepts_readings() {
    let mut stream = DataStream::new();
    stream.push(MultiPoint::new().with_id("group"));
    let reading = Point::new().with_id("group").with_value(true);

    assert_eq!(add_sensor_value(&mut stream, &reading), 1);
    assert_eq!(stream.len(), 1);
    assert_eq!(
        sensor_values_of_specific_type(&stream, &FilterSet::new().with_id("group")),
        vec![AttributeValue::Boolean(true)]
    );
}
