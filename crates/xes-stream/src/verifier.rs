//! Structural checks on a parsed or hand-built log.
//!
//! | Parent       | Allowed children                  |
//! |--------------|-----------------------------------|
//! | log          | trace, event                      |
//! | trace        | event, datastream, datacontext    |
//! | event        | datastream                        |
//! | datacontext  | datastream, datacontext           |
//! | datastream   | point, multipoint                 |
//!
//! A data context must also reach at least one data stream. Points without a
//! value are counted, not rejected.

use tracing::warn;

use crate::constants::FEATURES_NESTED_ATTRIBUTES;
use crate::error::{Result, XesError};
use crate::model::{Element, ElementKind, Log, Point};

/// Diagnostics gathered while verifying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Number of points whose `value` is unset.
    pub points_without_value: usize,
}

impl VerificationReport {
    fn count(&mut self, point: &Point) {
        if point.value.is_none() {
            self.points_without_value += 1;
        }
    }
}

fn failed(entity: &'static str, reason: impl Into<String>) -> XesError {
    XesError::VerificationFailed {
        entity,
        reason: reason.into(),
    }
}

fn check_children(entity: &'static str, children: &[Element], allowed: &[ElementKind]) -> Result<()> {
    match children.iter().find(|child| !allowed.contains(&child.kind())) {
        Some(child) => Err(failed(
            entity,
            format!("should not contain {}", child.kind().as_str()),
        )),
        None => Ok(()),
    }
}

/// Verifies a whole log.
///
/// # Errors
///
/// Returns [`XesError::VerificationFailed`] on the first violated invariant.
pub fn verify(log: &Log) -> Result<VerificationReport> {
    if log.version.is_none() {
        return Err(failed("log", "should have version"));
    }
    if log.features.as_deref() != Some(FEATURES_NESTED_ATTRIBUTES) {
        return Err(failed(
            "log",
            format!("should have features={FEATURES_NESTED_ATTRIBUTES}"),
        ));
    }
    if log.is_empty() {
        return Err(failed("log", "should not be empty"));
    }
    check_children("log", &log.children, &[ElementKind::Trace, ElementKind::Event])?;

    let report = walk(log.children.iter())?;
    if report.points_without_value > 0 {
        warn!(
            points = report.points_without_value,
            "log contains points without a value"
        );
    }
    Ok(report)
}

/// Verifies one element and everything below it.
///
/// # Errors
///
/// Returns [`XesError::VerificationFailed`] on the first violated invariant.
pub fn verify_element(element: &Element) -> Result<VerificationReport> {
    walk(std::iter::once(element))
}

fn walk<'a>(roots: impl Iterator<Item = &'a Element>) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();
    let mut pending: Vec<&Element> = roots.collect();
    pending.reverse();

    while let Some(element) = pending.pop() {
        let children: &[Element] = match element {
            Element::Trace(trace) => {
                check_children(
                    "trace",
                    &trace.children,
                    &[ElementKind::Event, ElementKind::DataContext, ElementKind::DataStream],
                )?;
                &trace.children
            }
            Element::Event(event) => {
                check_children("event", &event.children, &[ElementKind::DataStream])?;
                &event.children
            }
            Element::DataContext(context) => {
                check_children(
                    "datacontext",
                    &context.children,
                    &[ElementKind::DataContext, ElementKind::DataStream],
                )?;
                if !context.contains_datastream() {
                    return Err(failed("datacontext", "should contain datastream"));
                }
                &context.children
            }
            Element::DataStream(stream) => {
                check_children(
                    "datastream",
                    &stream.children,
                    &[ElementKind::MultiPoint, ElementKind::Point],
                )?;
                &stream.children
            }
            Element::MultiPoint(group) => {
                group.points.iter().for_each(|point| report.count(point));
                &[]
            }
            Element::Point(point) => {
                report.count(point);
                &[]
            }
        };
        pending.extend(children.iter().rev());
    }

    Ok(report)
}
