//! Rendering of API responses.
//!
//! JSON output is indented with four spaces and escapes every non-ASCII
//! character, so the same bytes end up on the terminal and in `--json` files
//! whatever the locale.

use crate::normalize::normalize;
use crate::transport::ResponseEnvelope;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Error types that can occur while rendering or saving output
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("failed to write output file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What to print for the responses of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// The normalized JSON body.
    #[default]
    Body,
    /// Request line, response headers and body of every response.
    Headers,
    /// Only the status code of every response.
    StatusCode,
    /// Nothing.
    Quiet,
}

/// Pretty printer writing `\uXXXX` escapes for anything outside printable ASCII.
struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> AsciiPrettyFormatter<'a> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\x7f' {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize a value as indented, ASCII-only JSON.
pub fn to_ascii_json(value: &Value) -> Result<String, FormattingError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, AsciiPrettyFormatter::new());
    value.serialize(&mut serializer)?;
    // the formatter never emits anything but ASCII
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Print the responses of one command according to `mode`.
pub fn display_responses<W: Write>(
    responses: &[ResponseEnvelope],
    mode: DisplayMode,
    out: &mut W,
) -> Result<(), FormattingError> {
    match mode {
        DisplayMode::Quiet => {}
        DisplayMode::StatusCode => {
            for response in responses {
                writeln!(out, "{}", response.status)?;
            }
        }
        DisplayMode::Headers => {
            for response in responses {
                writeln!(out)?;
                writeln!(
                    out,
                    "{} {} {}",
                    response.method, response.path_url, response.status
                )?;
                for (name, value) in &response.headers {
                    writeln!(out, "{}: {}", name, value)?;
                }
                writeln!(out)?;
                let data = normalize(std::slice::from_ref(response));
                writeln!(out, "{}", to_ascii_json(&data)?)?;
            }
        }
        DisplayMode::Body => {
            writeln!(out, "{}", to_ascii_json(&normalize(responses))?)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Write the normalized output of `responses` to `path`, replacing the file.
pub fn save_output(responses: &[ResponseEnvelope], path: &Path) -> Result<(), FormattingError> {
    let content = to_ascii_json(&normalize(responses))?;
    let file_error = |source| FormattingError::File {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(file_error)?;
    file.write_all(content.as_bytes()).map_err(file_error)?;
    Ok(())
}
