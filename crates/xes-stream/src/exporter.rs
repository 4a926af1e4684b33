//! Line-by-line writer, the inverse of [`crate::parser`].
//!
//! Every element and attribute is written on its own line, indented with one
//! tab per nesting level, in the shape the parser reads back. Attribute text
//! is quoted but never escaped, so values containing `"` or line breaks are
//! rejected instead of written.

use std::io::Write;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::info;

use crate::config::XesConfig;
use crate::constants::{
    ATTR_FEATURES, ATTR_VERSION, LIFECYCLE_TRANSITION, STREAM_DATA, STREAM_DATACONTEXT, STREAM_DATASTREAM, STREAM_ID,
    STREAM_META, STREAM_MULTIPOINT, STREAM_NAME, STREAM_POINT, STREAM_SOURCE, STREAM_TIMESTAMP,
    STREAM_VALUE, TAG_CLASSIFIER, TAG_EVENT, TAG_EXTENSION, TAG_GLOBAL, TAG_LIST, TAG_LOG, TAG_STRING,
    TAG_TRACE, XES_NAMESPACE,
};
use crate::error::{Result, XesError};
use crate::io::Output;
use crate::model::{
    Attribute, AttributeValue, DataContext, DataStream, Element, Event, Log, MultiPoint, Point,
    Trace,
};
use crate::verifier;

/// Checks that `text` can sit between double quotes on a single line.
fn quoted(context: &'static str, key: &str, text: &str) -> Result<String> {
    if text.contains(['"', '\n', '\r']) {
        return Err(XesError::InvalidAttribute {
            context,
            key: key.to_string(),
            value: text.to_string(),
        });
    }
    Ok(format!("\"{text}\""))
}

fn is_stream_data_marker(attribute: &Attribute) -> bool {
    attribute.key.ends_with(LIFECYCLE_TRANSITION) && attribute.value.as_str() == Some(STREAM_DATA)
}

fn unsupported(element: &Element, context: &'static str) -> XesError {
    XesError::UnsupportedEntityType {
        kind: element.kind().as_str(),
        context,
    }
}

/// Writes one log as encoded lines.
struct LineWriter<'c, W> {
    out: W,
    encoding: &'static Encoding,
    config: &'c XesConfig,
    indent: usize,
    lines: usize,
}

impl<W: Write> LineWriter<'_, W> {
    fn line(&mut self, text: &str) -> Result<()> {
        let mut full = "\t".repeat(self.indent);
        full.push_str(text);
        full.push('\n');
        let (bytes, _, unmappable) = self.encoding.encode(&full);
        if unmappable {
            return Err(XesError::InvalidAttribute {
                context: "encoding",
                key: self.encoding.name().to_string(),
                value: text.to_string(),
            });
        }
        self.out.write_all(&bytes)?;
        self.lines += 1;
        Ok(())
    }

    fn open(&mut self, text: &str) -> Result<()> {
        self.line(text)?;
        self.indent += 1;
        Ok(())
    }

    fn close(&mut self, text: &str) -> Result<()> {
        self.indent = self.indent.saturating_sub(1);
        self.line(text)
    }

    fn attribute(&mut self, context: &'static str, key: &str, value: &AttributeValue) -> Result<()> {
        let quoted_key = quoted(context, key, key)?;
        match value {
            AttributeValue::List(items) if items.is_empty() => {
                self.line(&format!("<{TAG_LIST} key={quoted_key} />"))
            }
            AttributeValue::List(items) => {
                self.open(&format!("<{TAG_LIST} key={quoted_key}>"))?;
                for Attribute { key, value } in items {
                    self.attribute(context, key, value)?;
                }
                self.close(&format!("</{TAG_LIST}>"))
            }
            scalar => {
                let text = scalar.to_xes_text().unwrap_or_default();
                let tag = scalar.attribute_type().tag();
                let quoted_value = quoted(context, key, &text)?;
                self.line(&format!("<{tag} key={quoted_key} value={quoted_value} />"))
            }
        }
    }

    fn attributes<'a>(
        &mut self,
        context: &'static str,
        attributes: impl IntoIterator<Item = &'a Attribute>,
    ) -> Result<()> {
        for Attribute { key, value } in attributes {
            self.attribute(context, key, value)?;
        }
        Ok(())
    }

    fn string(&mut self, context: &'static str, key: &str, text: &str) -> Result<()> {
        let quoted_value = quoted(context, key, text)?;
        self.line(&format!("<{TAG_STRING} key=\"{key}\" value={quoted_value} />"))
    }

    fn log(&mut self, log: &Log) -> Result<()> {
        let mut header = format!("<{TAG_LOG}");
        if let Some(version) = &log.version {
            header.push_str(&format!(" {ATTR_VERSION}={}", quoted("log", ATTR_VERSION, version)?));
        }
        if let Some(features) = &log.features {
            header.push_str(&format!(
                " {ATTR_FEATURES}={}",
                quoted("log", ATTR_FEATURES, features)?
            ));
        }
        header.push_str(&format!(" xmlns=\"{XES_NAMESPACE}\">"));
        self.open(&header)?;

        for extension in &log.extensions {
            self.line(&format!(
                "<{TAG_EXTENSION} name={} prefix={} uri={} />",
                quoted("extension", "name", &extension.name)?,
                quoted("extension", "prefix", &extension.prefix)?,
                quoted("extension", "uri", &extension.uri)?,
            ))?;
        }
        for classifier in &log.classifiers {
            let scope = classifier
                .scope
                .map(|scope| format!(" scope=\"{scope}\""))
                .unwrap_or_default();
            self.line(&format!(
                "<{TAG_CLASSIFIER} name={}{scope} keys={} />",
                quoted("classifier", "name", &classifier.name)?,
                quoted("classifier", "keys", &classifier.keys.join(" "))?,
            ))?;
        }
        self.attributes("log", &log.attributes)?;
        for global in &log.globals {
            self.open(&format!("<{TAG_GLOBAL} scope=\"{}\">", global.scope))?;
            self.attributes("global", &global.attributes)?;
            self.close(&format!("</{TAG_GLOBAL}>"))?;
        }

        let total = log.len();
        for (index, child) in log.iter().enumerate() {
            match child {
                Element::Trace(trace) => self.trace(trace)?,
                Element::Event(event) => self.event(event)?,
                other => return Err(unsupported(other, "log")),
            }
            if self.config.show_progress {
                info!(exported = index + 1, total, "exporting log");
            }
        }
        self.close(&format!("</{TAG_LOG}>"))
    }

    fn trace(&mut self, trace: &Trace) -> Result<()> {
        self.open(&format!("<{TAG_TRACE}>"))?;
        self.attributes("trace", &trace.attributes)?;
        for child in &trace.children {
            match child {
                Element::Event(event) => self.event(event)?,
                Element::DataStream(stream) => self.datastream(stream)?,
                Element::DataContext(context) => self.datacontext(context)?,
                other => return Err(unsupported(other, "trace")),
            }
        }
        self.close(&format!("</{TAG_TRACE}>"))
    }

    fn event(&mut self, event: &Event) -> Result<()> {
        self.open(&format!("<{TAG_EVENT}>"))?;
        // A stream/data marker left on the event followed its last stream.
        let (trailing, leading): (Vec<&Attribute>, Vec<&Attribute>) =
            event.attributes.iter().partition(|attribute| is_stream_data_marker(attribute));
        self.attributes("event", leading)?;
        for child in &event.children {
            match child {
                Element::DataStream(stream) => self.datastream(stream)?,
                other => return Err(unsupported(other, "event")),
            }
        }
        self.attributes("event", trailing)?;
        self.close(&format!("</{TAG_EVENT}>"))
    }

    fn datacontext(&mut self, context: &DataContext) -> Result<()> {
        self.open(&format!("<{TAG_LIST} key=\"{STREAM_DATACONTEXT}\">"))?;
        for child in &context.children {
            match child {
                Element::DataStream(stream) => self.datastream(stream)?,
                Element::DataContext(nested) => self.datacontext(nested)?,
                other => return Err(unsupported(other, "datacontext")),
            }
        }
        self.close(&format!("</{TAG_LIST}>"))
    }

    fn datastream(&mut self, stream: &DataStream) -> Result<()> {
        if let Some(key) = &stream.origin_key {
            let quoted_key = quoted("datastream", key, key)?;
            self.line(&format!(
                "<{TAG_STRING} key={quoted_key} value=\"{STREAM_DATA}\" />"
            ))?;
        }
        self.open(&format!("<{TAG_LIST} key=\"{STREAM_DATASTREAM}\">"))?;
        if let Some(name) = &stream.name {
            self.string("datastream", STREAM_NAME, name)?;
        }
        if let Some(id) = &stream.id {
            self.string("datastream", STREAM_ID, id)?;
        }
        if let Some(source) = &stream.source {
            self.string("datastream", STREAM_SOURCE, source)?;
        }
        for child in &stream.children {
            match child {
                Element::Point(point) => self.point(point)?,
                Element::MultiPoint(group) => self.multipoint(group)?,
                other => return Err(unsupported(other, "datastream")),
            }
        }
        self.close(&format!("</{TAG_LIST}>"))
    }

    fn optional(&mut self, context: &'static str, key: &str, value: Option<&AttributeValue>) -> Result<()> {
        match value {
            Some(value) => self.attribute(context, key, value),
            None => Ok(()),
        }
    }

    fn meta(&mut self, context: &'static str, meta: Option<&[Attribute]>) -> Result<()> {
        let Some(items) = meta else { return Ok(()) };
        if items.is_empty() {
            return self.line(&format!("<{TAG_LIST} key=\"{STREAM_META}\" />"));
        }
        self.open(&format!("<{TAG_LIST} key=\"{STREAM_META}\">"))?;
        self.attributes(context, items)?;
        self.close(&format!("</{TAG_LIST}>"))
    }

    fn point(&mut self, point: &Point) -> Result<()> {
        self.open(&format!("<{TAG_LIST} key=\"{STREAM_POINT}\">"))?;
        self.optional("point", STREAM_ID, point.id.as_ref())?;
        self.optional("point", STREAM_TIMESTAMP, point.timestamp.as_ref())?;
        self.optional("point", STREAM_VALUE, point.value.as_ref())?;
        self.optional("point", STREAM_SOURCE, point.source.as_ref())?;
        self.meta("point", point.meta.as_deref())?;
        self.close(&format!("</{TAG_LIST}>"))
    }

    fn multipoint(&mut self, group: &MultiPoint) -> Result<()> {
        self.open(&format!("<{TAG_LIST} key=\"{STREAM_MULTIPOINT}\">"))?;
        self.optional("multipoint", STREAM_ID, group.id.as_ref())?;
        self.optional("multipoint", STREAM_TIMESTAMP, group.timestamp.as_ref())?;
        self.optional("multipoint", STREAM_SOURCE, group.source.as_ref())?;
        self.meta("multipoint", group.meta.as_deref())?;
        for point in &group.points {
            self.point(point)?;
        }
        self.close(&format!("</{TAG_LIST}>"))
    }
}

/// Writes `log` to `out` and returns the number of lines written.
///
/// The log is verified first unless `config.apply_verifier` is false.
///
/// # Errors
///
/// Fails on verification errors, unrepresentable values, elements in
/// positions that have no written form, and I/O errors.
pub fn export_to_writer<W: Write>(log: &Log, out: W, config: &XesConfig) -> Result<usize> {
    let encoding = config.resolve_encoding()?;
    if config.apply_verifier {
        verifier::verify(log)?;
    }

    let mut writer = LineWriter {
        out,
        encoding,
        config,
        indent: 0,
        lines: 0,
    };
    writer.line(&format!(
        "<?xml version=\"1.0\" encoding=\"{}\"?>",
        config.encoding.trim()
    ))?;
    writer.log(log)?;
    writer.out.flush()?;
    Ok(writer.lines)
}

/// Serializes `log` into encoded bytes.
///
/// # Errors
///
/// See [`export_to_writer`].
pub fn export_to_bytes(log: &Log, config: &XesConfig) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    export_to_writer(log, &mut bytes, config)?;
    Ok(bytes)
}

/// Serializes `log` into a string.
///
/// # Errors
///
/// See [`export_to_writer`].
pub fn export_to_string(log: &Log, config: &XesConfig) -> Result<String> {
    let encoding = config.resolve_encoding()?;
    let bytes = export_to_bytes(log, config)?;
    let (text, _) = encoding.decode_without_bom_handling(&bytes);
    Ok(text.into_owned())
}

/// Writes `log` to `path`, gzip-compressed when the path ends in `.gz`.
///
/// # Errors
///
/// See [`export_to_writer`].
pub fn export_file(log: &Log, path: impl AsRef<Path>, config: &XesConfig) -> Result<usize> {
    let path = path.as_ref();
    let mut output = Output::create(path)?;
    let lines = export_to_writer(log, &mut output, config)?;
    output.finish()?;
    info!(path = %path.display(), lines, "exported log");
    Ok(lines)
}
