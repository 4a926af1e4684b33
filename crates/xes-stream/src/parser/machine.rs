//! Per-state line handlers.
//!
//! Every handler first forwards the line to the deepest open child, then to
//! the open nested attribute list, and only then interprets the line itself.
//! A handler that reads its own closing line takes its cursor and returns the
//! finished element.

use tracing::{debug, trace};

use super::attributes::read_attribute;
use super::line::Line;
use super::{ParseState, XesParser};
use crate::constants::{
    ATTR_FEATURES, ATTR_VERSION, LIFECYCLE_TRANSITION, STREAM_DATA, STREAM_DATACONTEXT,
    STREAM_DATASTREAM, STREAM_ID, STREAM_META, STREAM_MULTIPOINT, STREAM_NAME, STREAM_POINT,
    STREAM_SOURCE, STREAM_TIMESTAMP, STREAM_VALUE, TAG_CLASSIFIER, TAG_EVENT, TAG_EXTENSION,
    TAG_GLOBAL, TAG_LOG, TAG_TRACE,
};
use crate::error::{Expectation, Result, XesError};
use crate::model::{
    Attribute, AttributeValue, Classifier, DataContext, DataStream, Event, Extension, Log,
    MultiPoint, Point, Scope, Trace,
};
use crate::traits::TimestampParser;

fn require<'a, T>(slot: &'a mut Option<T>, subject: &'static str) -> Result<&'a mut T> {
    slot.as_mut().ok_or(XesError::PreconditionViolated {
        subject,
        expectation: Expectation::ShouldBeSet,
    })
}

fn unexpected(state: ParseState, line: &Line<'_>) -> XesError {
    XesError::UnexpectedState {
        state,
        content: line.text().to_string(),
    }
}

fn empty_list(key: &str) -> Attribute {
    Attribute::new(key, AttributeValue::List(Vec::new()))
}

/// Builds a log from its opening line.
pub(super) fn open_log(line: &Line<'_>) -> Log {
    let mut log = Log::new();
    for pair in line.slices().chunks_exact(2) {
        let [name, value] = pair else { continue };
        let name = name
            .trim_end()
            .trim_end_matches('=')
            .split_whitespace()
            .last()
            .unwrap_or_default();
        match name {
            ATTR_VERSION => log.version = Some((*value).to_string()),
            ATTR_FEATURES => log.features = Some((*value).to_string()),
            _ => {}
        }
    }
    log
}

/// Finds the value following the attribute name `name` on a line.
fn named_value<'a>(line: &Line<'a>, name: &str) -> Option<&'a str> {
    line.slices()
        .chunks_exact(2)
        .find(|pair| {
            pair.first().is_some_and(|attr| {
                attr.trim_end()
                    .trim_end_matches('=')
                    .split_whitespace()
                    .last()
                    == Some(name)
            })
        })
        .and_then(|pair| pair.get(1).copied())
}

fn parse_extension(line: &Line<'_>) -> Result<Extension> {
    let invalid = || XesError::InvalidAttribute {
        context: "extension",
        key: TAG_EXTENSION.to_string(),
        value: line.text().to_string(),
    };
    if line.slices().len() != 7 {
        return Err(invalid());
    }
    match (
        named_value(line, "name"),
        named_value(line, "prefix"),
        named_value(line, "uri"),
    ) {
        (Some(name), Some(prefix), Some(uri)) => Ok(Extension::new(name, prefix, uri)),
        _ => Err(invalid()),
    }
}

fn parse_classifier(line: &Line<'_>) -> Result<Classifier> {
    let invalid = |key: &str, value: &str| XesError::InvalidAttribute {
        context: "classifier",
        key: key.to_string(),
        value: value.to_string(),
    };
    let scope = named_value(line, "scope")
        .map(|text| Scope::parse(text).ok_or_else(|| invalid("scope", text)))
        .transpose()?;
    match (named_value(line, "name"), named_value(line, "keys")) {
        (Some(name), Some(keys)) => Ok(Classifier {
            name: name.to_string(),
            keys: keys.split_whitespace().map(str::to_string).collect(),
            scope,
        }),
        _ => Err(invalid(TAG_CLASSIFIER, line.text())),
    }
}

fn assign_point(point: &mut Point, attribute: Attribute) -> Result<()> {
    let Attribute { key, value } = attribute;
    match key.as_str() {
        STREAM_ID => point.id = Some(value),
        STREAM_TIMESTAMP => point.timestamp = Some(value),
        STREAM_VALUE => point.value = Some(value),
        STREAM_SOURCE => point.source = Some(value),
        STREAM_META => point.meta = Some(value.into_list("point")?),
        _ => {
            return Err(XesError::InvalidAttribute {
                context: "point",
                key,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn assign_multipoint(group: &mut MultiPoint, attribute: Attribute) -> Result<()> {
    let Attribute { key, value } = attribute;
    match key.as_str() {
        STREAM_ID => group.id = Some(value),
        STREAM_TIMESTAMP => group.timestamp = Some(value),
        STREAM_SOURCE => group.source = Some(value),
        STREAM_META => group.meta = Some(value.into_list("multipoint")?),
        _ => {
            return Err(XesError::InvalidAttribute {
                context: "multipoint",
                key,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

impl<P: TimestampParser> XesParser<P> {
    /// Returns true once `</log>` is read.
    pub(super) fn process_log(&mut self, line: &Line<'_>) -> Result<bool> {
        if self.global_scope.is_some() {
            if self.process_global_scope(line)? {
                self.global_scope = None;
            }
            return Ok(false);
        }
        if self.trace.is_some() {
            if let Some(finished) = self.process_trace(line)? {
                debug!(line = self.line_number, children = finished.len(), "trace parsed");
                require(&mut self.log, "log")?.push(finished);
            }
            return Ok(false);
        }
        if self.event.is_some() {
            if let Some(finished) = self.process_event(line)? {
                debug!(line = self.line_number, "top-level event parsed");
                require(&mut self.log, "log")?.push(finished);
            }
            return Ok(false);
        }
        if !self.nested.is_empty() {
            if let Some(attribute) = self.nested.feed(line, &self.timestamps)? {
                require(&mut self.log, "log")?
                    .attributes
                    .insert("log", attribute.key, attribute.value)?;
            }
            return Ok(false);
        }

        let log = require(&mut self.log, "log")?;
        if line.opens(TAG_EXTENSION) {
            log.set_extension(parse_extension(line)?);
        } else if line.opens(TAG_CLASSIFIER) {
            log.classifiers.push(parse_classifier(line)?);
        } else if line.opens(TAG_GLOBAL) {
            let scope = Scope::parse(line.key()).ok_or_else(|| XesError::InvalidAttribute {
                context: "global",
                key: "scope".to_string(),
                value: line.key().to_string(),
            })?;
            log.global_scope_mut(scope);
            if !line.is_self_closing() {
                self.global_scope = Some(scope);
            }
        } else if line.opens(TAG_TRACE) {
            if line.is_empty_element() {
                log.push(Trace::new());
            } else {
                self.trace = Some(Trace::new());
            }
        } else if line.opens(TAG_EVENT) {
            if line.is_empty_element() {
                log.push(Event::new());
            } else {
                self.event = Some(Event::new());
            }
        } else if line.is_leaf() {
            let attribute = read_attribute(line, &self.timestamps, "log")?;
            log.attributes.insert("log", attribute.key, attribute.value)?;
        } else if line.opens_list() {
            if line.is_self_closing() {
                let attribute = empty_list(line.key());
                log.attributes.insert("log", attribute.key, attribute.value)?;
            } else {
                self.nested.open_root(line.key())?;
            }
        } else if line.closes(TAG_LOG) {
            return Ok(true);
        } else {
            return Err(unexpected(ParseState::Log, line));
        }
        Ok(false)
    }

    fn process_global_scope(&mut self, line: &Line<'_>) -> Result<bool> {
        let Some(scope) = self.global_scope else {
            return Err(XesError::PreconditionViolated {
                subject: "global scope",
                expectation: Expectation::ShouldBeSet,
            });
        };
        if line.closes(TAG_GLOBAL) {
            return Ok(true);
        }
        if !line.is_leaf() {
            return Err(unexpected(ParseState::GlobalScope, line));
        }
        let attribute = read_attribute(line, &self.timestamps, "global")?;
        require(&mut self.log, "log")?
            .global_scope_mut(scope)
            .insert("global", attribute.key, attribute.value)?;
        Ok(false)
    }

    fn process_trace(&mut self, line: &Line<'_>) -> Result<Option<Trace>> {
        if !self.datacontexts.is_empty() {
            if let Some(finished) = self.process_datacontext(line)? {
                require(&mut self.trace, "trace")?.push(finished);
            }
            return Ok(None);
        }
        if self.event.is_some() {
            if let Some(finished) = self.process_event(line)? {
                require(&mut self.trace, "trace")?.push(finished);
            }
            return Ok(None);
        }
        if self.datastream.is_some() {
            if let Some(finished) = self.process_datastream(line)? {
                require(&mut self.trace, "trace")?.push(finished);
            }
            return Ok(None);
        }
        if !self.nested.is_empty() {
            if let Some(attribute) = self.nested.feed(line, &self.timestamps)? {
                require(&mut self.trace, "trace")?
                    .attributes
                    .insert("trace", attribute.key, attribute.value)?;
            }
            return Ok(None);
        }

        let current = require(&mut self.trace, "trace")?;
        if line.opens(TAG_EVENT) {
            if line.is_empty_element() {
                current.push(Event::new());
            } else {
                self.event = Some(Event::new());
            }
        } else if line.is_leaf() {
            let attribute = read_attribute(line, &self.timestamps, "trace")?;
            current.attributes.insert("trace", attribute.key, attribute.value)?;
        } else if line.opens_list_with_key(STREAM_DATACONTEXT) {
            trace!(line = self.line_number, "datacontext opened");
            if line.is_self_closing() {
                current.push(DataContext::new());
            } else {
                self.datacontexts.push(DataContext::new());
            }
        } else if line.opens_list_with_key(STREAM_DATASTREAM) {
            if line.is_self_closing() {
                current.push(DataStream::new());
            } else {
                self.datastream = Some(DataStream::new());
            }
        } else if line.opens_list() {
            if line.is_self_closing() {
                let attribute = empty_list(line.key());
                current.attributes.insert("trace", attribute.key, attribute.value)?;
            } else {
                self.nested.open_root(line.key())?;
            }
        } else if line.closes(TAG_TRACE) {
            return Ok(self.trace.take());
        } else {
            return Err(unexpected(ParseState::Trace, line));
        }
        Ok(None)
    }

    fn process_event(&mut self, line: &Line<'_>) -> Result<Option<Event>> {
        if self.datastream.is_some() {
            if let Some(finished) = self.process_datastream(line)? {
                require(&mut self.event, "event")?.push(finished);
            }
            return Ok(None);
        }
        if !self.nested.is_empty() {
            if let Some(attribute) = self.nested.feed(line, &self.timestamps)? {
                require(&mut self.event, "event")?
                    .attributes
                    .insert("event", attribute.key, attribute.value)?;
            }
            return Ok(None);
        }

        let current = require(&mut self.event, "event")?;
        if line.opens_list_with_key(STREAM_DATASTREAM) {
            let mut stream = DataStream::new();
            stream.origin_key = self.stream_data_key.take();
            if line.is_self_closing() {
                current.push(stream);
            } else {
                self.datastream = Some(stream);
            }
        } else if line.is_leaf()
            && line.key().ends_with(LIFECYCLE_TRANSITION)
            && line.value() == STREAM_DATA
        {
            if self.stream_data_key.is_some() {
                return Err(XesError::PreconditionViolated {
                    subject: "stream data key",
                    expectation: Expectation::ShouldNotBeSet,
                });
            }
            self.stream_data_key = Some(line.key().to_string());
        } else if line.is_leaf() {
            let attribute = read_attribute(line, &self.timestamps, "event")?;
            current.attributes.insert("event", attribute.key, attribute.value)?;
        } else if line.opens_list() {
            if line.is_self_closing() {
                let attribute = empty_list(line.key());
                current.attributes.insert("event", attribute.key, attribute.value)?;
            } else {
                self.nested.open_root(line.key())?;
            }
        } else if line.closes(TAG_EVENT) {
            if let Some(key) = self.stream_data_key.take() {
                current.attributes.insert("event", key, STREAM_DATA)?;
            }
            return Ok(self.event.take());
        } else {
            return Err(unexpected(ParseState::Event, line));
        }
        Ok(None)
    }

    fn innermost_context(&mut self) -> Result<&mut DataContext> {
        self.datacontexts
            .last_mut()
            .ok_or(XesError::PreconditionViolated {
                subject: "datacontext stack",
                expectation: Expectation::ShouldNotBeEmpty,
            })
    }

    fn process_datacontext(&mut self, line: &Line<'_>) -> Result<Option<DataContext>> {
        if self.datastream.is_some() {
            if let Some(finished) = self.process_datastream(line)? {
                self.innermost_context()?.push(finished);
            }
            return Ok(None);
        }

        if line.opens_list_with_key(STREAM_DATASTREAM) {
            if line.is_self_closing() {
                self.innermost_context()?.push(DataStream::new());
            } else {
                self.datastream = Some(DataStream::new());
            }
        } else if line.opens_list_with_key(STREAM_DATACONTEXT) {
            if line.is_self_closing() {
                self.innermost_context()?.push(DataContext::new());
            } else {
                self.datacontexts.push(DataContext::new());
            }
        } else if line.closes_list() {
            let closed = self
                .datacontexts
                .pop()
                .ok_or(XesError::PreconditionViolated {
                    subject: "datacontext stack",
                    expectation: Expectation::ShouldNotBeEmpty,
                })?;
            match self.datacontexts.last_mut() {
                Some(parent) => parent.push(closed),
                None => return Ok(Some(closed)),
            }
        } else {
            return Err(unexpected(ParseState::DataContext, line));
        }
        Ok(None)
    }

    fn process_datastream(&mut self, line: &Line<'_>) -> Result<Option<DataStream>> {
        if self.multipoint.is_some() {
            if let Some(finished) = self.process_multipoint(line)? {
                require(&mut self.datastream, "datastream")?.push(finished);
            }
            return Ok(None);
        }
        if self.point.is_some() {
            if let Some(finished) = self.process_point(line)? {
                require(&mut self.datastream, "datastream")?.push(finished);
            }
            return Ok(None);
        }

        let current = require(&mut self.datastream, "datastream")?;
        if line.is_leaf() {
            let text = Some(line.value().to_string());
            match line.key() {
                STREAM_NAME => current.name = text,
                STREAM_ID => current.id = text,
                STREAM_SOURCE => current.source = text,
                key => {
                    return Err(XesError::InvalidAttribute {
                        context: "datastream",
                        key: key.to_string(),
                        value: line.value().to_string(),
                    });
                }
            }
        } else if line.opens_list_with_key(STREAM_POINT) {
            if line.is_self_closing() {
                current.push(Point::new());
            } else {
                self.point = Some(Point::new());
            }
        } else if line.opens_list_with_key(STREAM_MULTIPOINT) {
            if line.is_self_closing() {
                current.push(MultiPoint::new());
            } else {
                self.multipoint = Some(MultiPoint::new());
            }
        } else if line.closes_list() {
            return Ok(self.datastream.take());
        } else {
            return Err(unexpected(ParseState::DataStream, line));
        }
        Ok(None)
    }

    fn process_multipoint(&mut self, line: &Line<'_>) -> Result<Option<MultiPoint>> {
        if self.point.is_some() {
            if let Some(finished) = self.process_point(line)? {
                require(&mut self.multipoint, "multipoint")?.push(finished);
            }
            return Ok(None);
        }
        if !self.nested.is_empty() {
            if let Some(attribute) = self.nested.feed(line, &self.timestamps)? {
                assign_multipoint(require(&mut self.multipoint, "multipoint")?, attribute)?;
            }
            return Ok(None);
        }

        let current = require(&mut self.multipoint, "multipoint")?;
        if line.is_leaf() {
            assign_multipoint(current, read_attribute(line, &self.timestamps, "multipoint")?)?;
        } else if line.opens_list_with_key(STREAM_META) || line.opens_list_with_key(STREAM_SOURCE) {
            if line.is_self_closing() {
                assign_multipoint(current, empty_list(line.key()))?;
            } else {
                self.nested.open_root(line.key())?;
            }
        } else if line.opens_list_with_key(STREAM_POINT) {
            if line.is_self_closing() {
                current.push(Point::new());
            } else {
                self.point = Some(Point::new());
            }
        } else if line.closes_list() {
            return Ok(self.multipoint.take());
        } else {
            return Err(unexpected(ParseState::MultiPoint, line));
        }
        Ok(None)
    }

    fn process_point(&mut self, line: &Line<'_>) -> Result<Option<Point>> {
        if !self.nested.is_empty() {
            if let Some(attribute) = self.nested.feed(line, &self.timestamps)? {
                assign_point(require(&mut self.point, "point")?, attribute)?;
            }
            return Ok(None);
        }

        let current = require(&mut self.point, "point")?;
        if line.is_leaf() {
            assign_point(current, read_attribute(line, &self.timestamps, "point")?)?;
        } else if line.opens_list_with_key(STREAM_META) || line.opens_list_with_key(STREAM_SOURCE) {
            if line.is_self_closing() {
                assign_point(current, empty_list(line.key()))?;
            } else {
                self.nested.open_root(line.key())?;
            }
        } else if line.closes_list() {
            return Ok(self.point.take());
        } else {
            return Err(unexpected(ParseState::Point, line));
        }
        Ok(None)
    }
}
