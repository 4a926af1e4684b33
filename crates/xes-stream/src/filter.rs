//! Reading patterns and multipoint matching.
//!
//! Two matching rules exist:
//! - [`MultiPoint::matches_with`] decides whether a reading belongs to a
//!   group: every field the group fixes must be equal on the reading.
//! - [`FilterSet`] selects readings for [`crate::traits::SensorContainer::fetch_sensor_values`]:
//!   every field the pattern sets must be equal on the reading.

use serde::{Deserialize, Serialize};

use crate::model::{Attribute, AttributeValue, MultiPoint, Point};

/// How a multipoint's fixed `source` is compared against a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMatching {
    /// Compare the group's source with the reading's source.
    #[default]
    SameField,
    /// Compare the group's source with the reading's meta entries.
    ///
    /// Only a list source can ever equal a reading's meta.
    Legacy,
}

/// A pattern over reading fields; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Required identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AttributeValue>,
    /// Required timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<AttributeValue>,
    /// Required value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
    /// Required source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AttributeValue>,
    /// Required metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<Attribute>>,
}

impl FilterSet {
    /// Creates a pattern that matches every reading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires an identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AttributeValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Requires a timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<AttributeValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Requires a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Requires a source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<AttributeValue>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Requires metadata entries.
    #[must_use]
    pub fn with_meta(mut self, meta: Vec<Attribute>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Returns true if every field set on the pattern equals the reading's.
    #[must_use]
    pub fn matches_point(&self, point: &Point) -> bool {
        required(self.id.as_ref(), point.id.as_ref())
            && required(self.timestamp.as_ref(), point.timestamp.as_ref())
            && required(self.value.as_ref(), point.value.as_ref())
            && required(self.source.as_ref(), point.source.as_ref())
            && required(self.meta.as_ref(), point.meta.as_ref())
    }

    /// Returns false only if a field set on both sides differs.
    ///
    /// Used to skip whole groups before completing their readings.
    #[must_use]
    pub fn matches_multipoint(&self, group: &MultiPoint) -> bool {
        compatible(self.id.as_ref(), group.id.as_ref())
            && compatible(self.timestamp.as_ref(), group.timestamp.as_ref())
            && compatible(self.source.as_ref(), group.source.as_ref())
            && compatible(self.meta.as_ref(), group.meta.as_ref())
    }
}

fn required<T: PartialEq>(pattern: Option<&T>, actual: Option<&T>) -> bool {
    pattern.is_none_or(|wanted| actual == Some(wanted))
}

fn compatible<T: PartialEq>(left: Option<&T>, right: Option<&T>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left == right,
        _ => true,
    }
}

impl MultiPoint {
    /// Returns true if `point` agrees with every field this group fixes.
    #[must_use]
    pub fn matches(&self, point: &Point) -> bool {
        self.matches_with(point, SourceMatching::default())
    }

    /// Like [`MultiPoint::matches`] with an explicit source rule.
    #[must_use]
    pub fn matches_with(&self, point: &Point, matching: SourceMatching) -> bool {
        let source_ok = match (&self.source, matching) {
            (None, _) => true,
            (Some(source), SourceMatching::SameField) => point.source.as_ref() == Some(source),
            (Some(AttributeValue::List(items)), SourceMatching::Legacy) => {
                point.meta.as_deref() == Some(items.as_slice())
            }
            (Some(_), SourceMatching::Legacy) => false,
        };

        source_ok
            && required(self.id.as_ref(), point.id.as_ref())
            && required(self.timestamp.as_ref(), point.timestamp.as_ref())
            && required(self.meta.as_ref(), point.meta.as_ref())
    }

    /// Returns the indices of stored readings that complete to `point`.
    #[must_use]
    pub fn fetch_keys(&self, point: &Point) -> Vec<usize> {
        self.fetch_keys_with(point, SourceMatching::default())
    }

    /// Returns true if a stored reading completes to `point`.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_with(point, SourceMatching::default())
    }
}

/// Sorts values by [`AttributeValue::total_cmp`] and drops duplicates.
pub(crate) fn sorted_unique(values: impl IntoIterator<Item = AttributeValue>) -> Vec<AttributeValue> {
    let mut values: Vec<_> = values.into_iter().collect();
    values.sort_by(AttributeValue::total_cmp);
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SensorContainer;
    use test_case::test_case;

    fn meta(kind: &str) -> Vec<Attribute> {
        vec![Attribute::new("type", kind)]
    }

    fn reading() -> Point {
        Point::new()
            .with_id("sensor/1")
            .with_timestamp("2023-04-28T17:18:20+02:00")
            .with_value(21.5)
            .with_source("plc")
            .with_meta(meta("System.Double"))
    }

    #[test]
    fn empty_group_matches_everything() {
        assert!(MultiPoint::new().matches(&reading()));
        assert!(MultiPoint::new().matches(&Point::new()));
    }

    #[test_case(MultiPoint::new().with_id("sensor/1"), true ; "same id")]
    #[test_case(MultiPoint::new().with_id("sensor/2"), false ; "other id")]
    #[test_case(MultiPoint::new().with_source("plc"), true ; "same source")]
    #[test_case(MultiPoint::new().with_source("mes"), false ; "other source")]
    #[test_case(MultiPoint::new().with_meta(meta("System.Double")), true ; "same meta")]
    #[test_case(MultiPoint::new().with_meta(meta("System.Int32")), false ; "other meta")]
    #[test_case(
        MultiPoint::new().with_timestamp("2023-04-28T17:18:20+02:00").with_id("sensor/1"),
        true ; "two fixed fields"
    )]
    fn group_matches_fixed_fields(group: MultiPoint, expected: bool) {
        assert_eq!(group.matches(&reading()), expected);
    }

    #[test]
    fn fixed_field_requires_reading_field() {
        let group = MultiPoint::new().with_meta(meta("System.Double"));
        assert!(!group.matches(&Point::new().with_id("sensor/1")));
    }

    #[test]
    fn legacy_compares_source_with_meta() {
        let group = MultiPoint::new().with_source(AttributeValue::List(meta("System.Double")));
        let point = reading();
        assert!(group.matches_with(&point, SourceMatching::Legacy));
        assert!(!group.matches_with(&point, SourceMatching::SameField));

        let scalar = MultiPoint::new().with_source("plc");
        assert!(!scalar.matches_with(&point, SourceMatching::Legacy));
        assert!(scalar.matches_with(&point, SourceMatching::SameField));
    }

    #[test]
    fn filter_wildcards_are_pattern_side() {
        let point = reading();
        assert!(FilterSet::new().matches_point(&point));
        assert!(FilterSet::new().with_id("sensor/1").matches_point(&point));
        assert!(FilterSet::new().with_value(21.5).matches_point(&point));
        assert!(!FilterSet::new().with_value(1.0).matches_point(&point));
        assert!(!FilterSet::new().with_id("sensor/1").matches_point(&Point::new()));
    }

    #[test]
    fn filter_on_group_prunes_conflicts_only() {
        let group = MultiPoint::new().with_id("sensor/1");
        assert!(FilterSet::new().matches_multipoint(&group));
        assert!(FilterSet::new().with_source("plc").matches_multipoint(&group));
        assert!(!FilterSet::new().with_id("sensor/2").matches_multipoint(&group));
    }

    #[test]
    fn group_fetch_equals_filtering_completed_readings() {
        let mut group = MultiPoint::new().with_id("sensor/1");
        group.push(Point::new().with_source("plc").with_value(1_i64));
        group.push(Point::new().with_source("mes").with_value(2_i64));

        let filter = FilterSet::new().with_source("plc");
        let expected: Vec<_> = group
            .completed()
            .filter(|p| filter.matches_point(p))
            .filter_map(|p| p.value)
            .collect();
        assert_eq!(expected, vec![AttributeValue::Int(1)]);
        assert_eq!(group.fetch_sensor_values(&filter), expected);
    }

    #[test]
    fn sorted_unique_dedups() {
        let values = sorted_unique([
            AttributeValue::from("b"),
            AttributeValue::from("a"),
            AttributeValue::from("b"),
        ]);
        assert_eq!(values, vec![AttributeValue::from("a"), AttributeValue::from("b")]);
    }

    #[test]
    fn source_matching_serde_names() {
        let json = serde_json::to_string(&SourceMatching::SameField).expect("serialize");
        assert_eq!(json, "\"same_field\"");
        let legacy: SourceMatching = serde_json::from_str("\"legacy\"").expect("deserialize");
        assert_eq!(legacy, SourceMatching::Legacy);
    }

    mod proptest_tests {
        use super::*;
        use crate::model::DataStream;
        use proptest::prelude::*;

        fn field() -> impl Strategy<Value = Option<AttributeValue>> {
            proptest::option::of("[a-c]{1,2}".prop_map(AttributeValue::from))
        }

        prop_compose! {
            fn arb_point()(
                id in field(),
                timestamp in field(),
                value in field(),
                source in field(),
            ) -> Point {
                Point { id, timestamp, value, source, meta: None }
            }
        }

        prop_compose! {
            fn arb_group()(
                id in field(),
                timestamp in field(),
                source in field(),
            ) -> MultiPoint {
                MultiPoint { id, timestamp, source, meta: None, points: Vec::new() }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                max_global_rejects: 8192,
                ..ProptestConfig::default()
            })]

            #[test]
            fn reduce_then_complete_restores_matching_reading(
                group in arb_group(),
                point in arb_point(),
            ) {
                prop_assume!(group.matches(&point));
                let mut group = group;
                group.push(group.reduce(&point));
                prop_assert_eq!(group.complete(0), Some(point));
            }

            #[test]
            fn add_is_idempotent(
                groups in proptest::collection::vec(arb_group(), 0..3),
                points in proptest::collection::vec(arb_point(), 1..5),
            ) {
                let mut stream = DataStream::new();
                for group in groups {
                    stream.push(group);
                }
                for point in &points {
                    stream.add_sensor_value(point);
                }
                let snapshot = stream.clone();
                for point in &points {
                    prop_assert_eq!(stream.add_sensor_value(point), 0);
                }
                prop_assert_eq!(stream, snapshot);
            }

            #[test]
            fn added_reading_is_fetchable(point in arb_point()) {
                prop_assume!(point.value.is_some());
                let mut stream = DataStream::new();
                stream.push(MultiPoint::new().with_id("a"));
                stream.add_sensor_value(&point);
                let values = stream.fetch_sensor_values(&FilterSet::new());
                prop_assert_eq!(values, point.value.into_iter().collect::<Vec<_>>());
            }
        }
    }
}
