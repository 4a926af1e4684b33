//! Reading whole documents from files and readers.

use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::config::XesConfig;
use crate::error::{Result, XesError};
use crate::io::{open_input, DecodedLines};
use crate::model::Log;
use crate::parser::XesParser;
use crate::timestamp::Rfc3339TimestampParser;
use crate::traits::TimestampParser;
use crate::verifier;

/// Reads a log from `reader` using the default date parser.
///
/// # Errors
///
/// Fails on undecodable input, grammar violations and, when
/// `config.apply_verifier` is set, on verification failures.
pub fn import_reader<R: BufRead>(reader: R, config: &XesConfig) -> Result<Log> {
    import_reader_with(reader, config, Rfc3339TimestampParser)
}

/// Reads a log from `reader` using a custom date parser.
///
/// # Errors
///
/// See [`import_reader`].
pub fn import_reader_with<R, P>(reader: R, config: &XesConfig, timestamps: P) -> Result<Log>
where
    R: BufRead,
    P: TimestampParser,
{
    let encoding = config.resolve_encoding()?;
    let mut parser = XesParser::with_timestamp_parser(timestamps);
    for line in DecodedLines::new(reader, encoding) {
        let line = line.map_err(|err| XesError::from(err).at_line(parser.lines_read() + 1))?;
        parser.feed_line(&line)?;
    }
    let lines = parser.lines_read();
    let log = parser.finish()?;

    if config.apply_verifier {
        let report = verifier::verify(&log)?;
        info!(
            lines,
            children = log.len(),
            points_without_value = report.points_without_value,
            "imported log"
        );
    } else {
        info!(lines, children = log.len(), "imported log");
    }
    Ok(log)
}

/// Reads a log from `path`, decompressing `.gz` files.
///
/// # Errors
///
/// See [`import_reader`].
pub fn import_file(path: impl AsRef<Path>, config: &XesConfig) -> Result<Log> {
    let path = path.as_ref();
    info!(path = %path.display(), encoding = %config.encoding, "importing log");
    import_reader(open_input(path)?, config)
}
