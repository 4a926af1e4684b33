//! Traits at the seams of the model and the parser.
//!
//! - [`SensorContainer`] is implemented by every entity that stores readings
//!   ([`crate::model::Event`], [`crate::model::DataStream`],
//!   [`crate::model::MultiPoint`]).
//! - [`TimestampParser`] turns the text of a `<date>` attribute into an instant.

use chrono::{DateTime, FixedOffset};

use crate::filter::{FilterSet, SourceMatching};
use crate::model::{AttributeValue, Point};

/// An entity that stores sensor readings.
///
/// Structural equality of [`Point`] is the identity of a reading: adding a
/// reading that is already stored, directly or inside a multipoint, is a no-op.
pub trait SensorContainer {
    /// Stores `point` unless an equal reading is already present.
    ///
    /// A reading that matches a multipoint is stored there in reduced form;
    /// otherwise it is appended directly. Returns how many copies were stored.
    fn add_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize;

    /// Removes every stored reading equal to `point`.
    ///
    /// Returns the number of readings removed.
    fn remove_sensor_value_with(&mut self, point: &Point, matching: SourceMatching) -> usize;

    /// Returns the sorted, de-duplicated values of every reading matching `filter`.
    ///
    /// Readings without a value contribute nothing.
    fn fetch_sensor_values(&self, filter: &FilterSet) -> Vec<AttributeValue>;

    /// Stores `point` using the default source rule.
    fn add_sensor_value(&mut self, point: &Point) -> usize {
        self.add_sensor_value_with(point, SourceMatching::default())
    }

    /// Removes `point` using the default source rule.
    fn remove_sensor_value(&mut self, point: &Point) -> usize {
        self.remove_sensor_value_with(point, SourceMatching::default())
    }
}

/// Parses the text of a date attribute.
///
/// Returning `None` rejects the attribute with
/// [`crate::error::XesError::InvalidAttribute`].
pub trait TimestampParser {
    /// Parses `text` into an instant with its UTC offset.
    fn parse_timestamp(&self, text: &str) -> Option<DateTime<FixedOffset>>;
}

impl<F> TimestampParser for F
where
    F: Fn(&str) -> Option<DateTime<FixedOffset>>,
{
    fn parse_timestamp(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        self(text)
    }
}
