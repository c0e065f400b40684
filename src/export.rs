//! CSV and JSON export of the accumulated records

use std::fmt;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::ExportError;
use crate::record::ProductRecord;
use crate::session::{sanitize_keyword, ExportSession, DEFAULT_KEYWORD};
use crate::store::RecordStore;

pub const DEFAULT_EXPORT_PREFIX: &str = "제품추출";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered export ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ExportFormat,
}

/// Renders records and names the resulting file
#[derive(Debug, Clone)]
pub struct Exporter {
    prefix: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_PREFIX)
    }
}

impl Exporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// `<prefix>_<keyword>_<counter>.<ext>`
    pub fn filename(&self, session: &ExportSession, format: ExportFormat) -> String {
        let keyword = sanitize_keyword(&session.keyword);
        let keyword = if keyword.is_empty() {
            DEFAULT_KEYWORD
        } else {
            keyword.as_str()
        };
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            keyword,
            session.counter,
            format.extension()
        )
    }

    pub fn export_csv(
        &self,
        records: &[ProductRecord],
        session: &ExportSession,
    ) -> Result<ExportArtifact, ExportError> {
        self.export(records, session, ExportFormat::Csv)
    }

    pub fn export_json(
        &self,
        records: &[ProductRecord],
        session: &ExportSession,
    ) -> Result<ExportArtifact, ExportError> {
        self.export(records, session, ExportFormat::Json)
    }

    pub fn export(
        &self,
        records: &[ProductRecord],
        session: &ExportSession,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        Ok(ExportArtifact {
            bytes: render(records, format)?,
            filename: self.filename(session, format),
            format,
        })
    }
}

pub fn render(records: &[ProductRecord], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => render_csv(records),
        ExportFormat::Json => render_json(records),
    }
}

/// Plain header line, then one row per record with every field quoted
pub fn render_csv(records: &[ProductRecord]) -> Result<Vec<u8>, ExportError> {
    let mut buf = ProductRecord::CSV_HEADER.join(",").into_bytes();
    buf.push(b'\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    for record in records {
        writer.write_record(record.csv_row())?;
    }

    writer.into_inner().map_err(|e| ExportError::CsvFlush(e.into_error()))
}

/// Pretty-printed JSON array in store order
pub fn render_json(records: &[ProductRecord]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Export everything in `store` and advance the session.
///
/// The keyword is resolved from `page_url` (see
/// [`ExportSession::resolve_keyword`]) and saved. The counter is claimed
/// through [`RecordStore::advance_session`] only once rendering succeeded,
/// so concurrent exports each get their own number.
///
/// # Errors
///
/// [`ExportError::NothingToExport`] when the store is empty, or any store
/// or encoding failure.
pub fn export_from_store<S: RecordStore + ?Sized>(
    store: &S,
    exporter: &Exporter,
    format: ExportFormat,
    page_url: Option<&str>,
) -> Result<ExportArtifact, ExportError> {
    let records = store.get_all()?;
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let bytes = render(&records, format)?;
    let session = store.advance_session(page_url)?;
    let artifact = ExportArtifact {
        bytes,
        filename: exporter.filename(&session, format),
        format,
    };

    info!(
        filename = %artifact.filename,
        records = records.len(),
        bytes = artifact.bytes.len(),
        "export rendered"
    );
    Ok(artifact)
}
