//! Sensor timelines and readings.
//!
//! A [`MultiPoint`] stores readings that share some of `id`, `timestamp`,
//! `source` and `meta` once; each stored [`Point`] keeps only the fields the
//! group does not fix. [`MultiPoint::complete`] restores the full reading.

use serde::{Deserialize, Serialize};

use super::{Attribute, AttributeValue, Element};
use crate::filter::{sorted_unique, FilterSet, SourceMatching};
use crate::traits::SensorContainer;

/// One atomic sensor reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Reading identifier, usually the sensor path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AttributeValue>,
    /// When the reading was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<AttributeValue>,
    /// The measured value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
    /// Where the reading came from; a scalar or a nested list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AttributeValue>,
    /// Tag entries describing the reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<Attribute>>,
}

impl Point {
    /// Creates a reading with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AttributeValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<AttributeValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<AttributeValue>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the metadata entries.
    #[must_use]
    pub fn with_meta(mut self, meta: Vec<Attribute>) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A compressed group of readings sharing the fields set on the group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    /// Identifier shared by every reading, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AttributeValue>,
    /// Timestamp shared by every reading, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<AttributeValue>,
    /// Source shared by every reading, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AttributeValue>,
    /// Metadata shared by every reading, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<Attribute>>,
    /// Stored readings, reduced to the fields not fixed above.
    #[serde(default)]
    pub points: Vec<Point>,
}

impl MultiPoint {
    /// Creates a group that fixes no field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AttributeValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Fixes the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<AttributeValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Fixes the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<AttributeValue>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Fixes the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Vec<Attribute>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Appends a stored reading as is.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Returns the number of stored readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no reading is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of stored readings.
    #[must_use]
    pub fn count_points(&self) -> usize {
        self.len()
    }

    /// Materializes stored reading `index` with the group's fixed fields.
    #[must_use]
    pub fn complete(&self, index: usize) -> Option<Point> {
        self.points.get(index).map(|stored| self.complete_point(stored))
    }

    fn complete_point(&self, stored: &Point) -> Point {
        Point {
            id: self.id.clone().or_else(|| stored.id.clone()),
            timestamp: self.timestamp.clone().or_else(|| stored.timestamp.clone()),
            value: stored.value.clone(),
            source: self.source.clone().or_else(|| stored.source.clone()),
            meta: self.meta.clone().or_else(|| stored.meta.clone()),
        }
    }

    /// Strips the fields this group fixes from a reading.
    #[must_use]
    pub fn reduce(&self, point: &Point) -> Point {
        let mut reduced = point.clone();
        if self.id.is_some() {
            reduced.id = None;
        }
        if self.timestamp.is_some() {
            reduced.timestamp = None;
        }
        if self.source.is_some() {
            reduced.source = None;
        }
        if self.meta.is_some() {
            reduced.meta = None;
        }
        reduced
    }

    /// Returns the indices of stored readings whose completion equals `point`.
    #[must_use]
    pub fn fetch_keys_with(&self, point: &Point, matching: SourceMatching) -> Vec<usize> {
        if !self.matches_with(point, matching) {
            return Vec::new();
        }
        self.points
            .iter()
            .enumerate()
            .filter(|(_, stored)| self.complete_point(stored) == *point)
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns true if a stored reading completes to `point`.
    #[must_use]
    pub fn contains_with(&self, point: &Point, matching: SourceMatching) -> bool {
        self.matches_with(point, matching)
            && self
                .points
                .iter()
                .any(|stored| self.complete_point(stored) == *point)
    }

    /// Iterates over every stored reading in completed form.
    pub fn completed(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(|stored| self.complete_point(stored))
    }
}

impl SensorContainer for MultiPoint {
    fn add_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        if self.contains_with(point, matching) || !self.matches_with(point, matching) {
            return 0;
        }
        let reduced = self.reduce(point);
        self.points.push(reduced);
        1
    }

    fn remove_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        let keys = self.fetch_keys_with(point, matching);
        if keys.is_empty() {
            return 0;
        }
        let mut index = 0;
        self.points.retain(|_| {
            let keep = !keys.contains(&index);
            index += 1;
            keep
        });
        keys.len()
    }

    fn fetch_sensor_values(&self, filter: &FilterSet) -> Vec<AttributeValue> {
        if !filter.matches_multipoint(self) {
            return Vec::new();
        }
        sorted_unique(
            self.completed()
                .filter(|point| filter.matches_point(point))
                .filter_map(|point| point.value),
        )
    }
}

/// One sensor's timeline of readings.
///
/// `name`, `id` and `source` are kept as plain text whatever tag they were
/// read from, and are always written back as `string` attributes. A
/// `__NOTSPECIFIED__` value stays the literal text rather than
/// [`AttributeValue::NotSpecified`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStream {
    /// Human readable stream name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stream identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Stream source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Key of the lifecycle attribute this stream was materialized from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_key: Option<String>,
    /// Readings, as [`Element::Point`] or [`Element::MultiPoint`].
    #[serde(default)]
    pub children: Vec<Element>,
}

impl DataStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Marks the stream as materialized from the lifecycle attribute `key`.
    #[must_use]
    pub fn with_origin_key(mut self, key: impl Into<String>) -> Self {
        self.origin_key = Some(key.into());
        self
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the stream has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// Returns true if the stream carries an origin key.
    #[must_use]
    pub const fn is_stream_data(&self) -> bool {
        self.origin_key.is_some()
    }

    /// Returns the number of entries; a multipoint counts as one.
    #[must_use]
    pub fn count_points(&self) -> usize {
        self.len()
    }
}

impl SensorContainer for DataStream {
    fn add_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        let mut first_match = None;
        for (index, child) in self.children.iter().enumerate() {
            match child {
                Element::Point(existing) if existing == point => return 0,
                Element::MultiPoint(group) if group.matches_with(point, matching) => {
                    if group.contains_with(point, matching) {
                        return 0;
                    }
                    first_match.get_or_insert(index);
                }
                _ => {}
            }
        }

        if let Some(index) = first_match {
            if let Some(Element::MultiPoint(group)) = self.children.get_mut(index) {
                return group.add_sensor_value_with(point, matching);
            }
        }
        self.children.push(Element::Point(point.clone()));
        1
    }

    fn remove_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize {
        let mut removed = 0;
        self.children.retain_mut(|child| match child {
            Element::Point(existing) if existing == point => {
                removed += 1;
                false
            }
            Element::MultiPoint(group) => {
                removed += group.remove_sensor_value_with(point, matching);
                true
            }
            _ => true,
        });
        removed
    }

    fn fetch_sensor_values(&self, filter: &FilterSet) -> Vec<AttributeValue> {
        let mut values = Vec::new();
        for child in &self.children {
            match child {
                Element::Point(point) if filter.matches_point(point) => {
                    values.extend(point.value.clone());
                }
                Element::MultiPoint(group) => {
                    values.extend(group.fetch_sensor_values(filter));
                }
                _ => {}
            }
        }
        sorted_unique(values)
    }
}
