//! Tag names, keys and sentinel values of the XES DataStream extension.

/// Key of a data context list.
pub const STREAM_DATACONTEXT: &str = "stream:datacontext";
/// Key of a data stream list.
pub const STREAM_DATASTREAM: &str = "stream:datastream";
/// Key of a multipoint list.
pub const STREAM_MULTIPOINT: &str = "stream:multipoint";
/// Key of a point list.
pub const STREAM_POINT: &str = "stream:point";
/// Key of reading metadata.
pub const STREAM_META: &str = "stream:meta";
/// Key of a reading or stream source.
pub const STREAM_SOURCE: &str = "stream:source";
/// Key of a reading or stream identifier.
pub const STREAM_ID: &str = "stream:id";
/// Key of a data stream name.
pub const STREAM_NAME: &str = "stream:name";
/// Key of a reading timestamp.
pub const STREAM_TIMESTAMP: &str = "stream:timestamp";
/// Key of a reading value.
pub const STREAM_VALUE: &str = "stream:value";

/// Value marking a lifecycle attribute as the origin of the next data stream.
pub const STREAM_DATA: &str = "stream/data";
/// Key suffix of lifecycle transition attributes.
pub const LIFECYCLE_TRANSITION: &str = "lifecycle:transition";

/// Value written for attributes that carry no value.
pub const NOT_SPECIFIED: &str = "__NOTSPECIFIED__";

/// Features a log must declare.
pub const FEATURES_NESTED_ATTRIBUTES: &str = "nested-attributes";
/// Namespace written on the log element.
pub const XES_NAMESPACE: &str = "http://www.xes-standard.org/";
/// Encoding used when none is configured.
pub const DEFAULT_ENCODING: &str = "utf-8";

// Element names.
pub(crate) const TAG_LOG: &str = "log";
pub(crate) const TAG_TRACE: &str = "trace";
pub(crate) const TAG_EVENT: &str = "event";
pub(crate) const TAG_GLOBAL: &str = "global";
pub(crate) const TAG_EXTENSION: &str = "extension";
pub(crate) const TAG_CLASSIFIER: &str = "classifier";
pub(crate) const TAG_LIST: &str = "list";

// Typed attribute tags.
pub(crate) const TAG_STRING: &str = "string";
pub(crate) const TAG_DATE: &str = "date";
pub(crate) const TAG_INT: &str = "int";
pub(crate) const TAG_FLOAT: &str = "float";
pub(crate) const TAG_BOOLEAN: &str = "boolean";

// Log element attributes.
pub(crate) const ATTR_VERSION: &str = "xes.version";
pub(crate) const ATTR_FEATURES: &str = "xes.features";
