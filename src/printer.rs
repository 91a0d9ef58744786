//! Output of diff records.

use clap::ValueEnum;
use diff_core::{DiffKind, DiffRecord, FieldDelta};
use es_source::{Document, DocumentKey};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

/// Receives diff records one at a time, in emission order.
pub trait Printer: Send {
    fn print(&mut self, record: &DiffRecord) -> io::Result<()>;

    /// Flush any buffered output. Called once when the run ends.
    fn finish(&mut self) -> io::Result<()>;
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Create the printer for `format` writing to `out`.
pub fn printer_for<W>(format: OutputFormat, out: W) -> Box<dyn Printer>
where
    W: Write + Send + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextPrinter::new(out)),
        OutputFormat::Json => Box::new(JsonPrinter::new(out)),
    }
}

/// Writes `Kind<TAB>key`, followed by one indented line per changed field.
pub struct TextPrinter<W: Write> {
    out: W,
}

impl<W: Write> TextPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<missing>".to_string(),
    }
}

impl<W: Write + Send> Printer for TextPrinter<W> {
    fn print(&mut self, record: &DiffRecord) -> io::Result<()> {
        writeln!(self.out, "{}\t{}", record.kind, record.key)?;
        for delta in &record.deltas {
            writeln!(
                self.out,
                "  {}: {} => {}",
                delta.field,
                display_value(delta.source.as_ref()),
                display_value(delta.destination.as_ref())
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    mode: DiffKind,
    key: &'a DocumentKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'a Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dst: Option<&'a Document>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deltas: &'a Vec<FieldDelta>,
}

/// Writes each record as a single-line JSON object.
pub struct JsonPrinter<W: Write> {
    out: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Printer for JsonPrinter<W> {
    fn print(&mut self, record: &DiffRecord) -> io::Result<()> {
        let line = JsonLine {
            mode: record.kind,
            key: &record.key,
            src: record.source.as_ref(),
            dst: record.destination.as_ref(),
            deltas: &record.deltas,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
