//! Delimited table reading with ordered format strategies.
//!
//! Homology tables arrive as TSV, CSV, or whitespace-aligned text, often
//! gzip-compressed and with `#` comment lines. [`read_table`] tries each
//! candidate format in order and returns the first parse that yields a
//! plausible table (at least two columns).

use std::fs::File;
use std::io::{
    Cursor,
    Read,
};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;
use polars::prelude::*;

use crate::error::{
    Error,
    Result,
};

/// A candidate on-disk layout for a homology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Tsv,
    Csv,
    /// Columns separated by arbitrary runs of spaces or tabs.
    Whitespace,
}

/// The default sniffing order.
pub const DEFAULT_FORMATS: [TableFormat; 3] =
    [TableFormat::Tsv, TableFormat::Csv, TableFormat::Whitespace];

impl TableFormat {
    /// Parses raw (already decompressed) bytes under this format. The first
    /// non-comment line is the header.
    pub fn parse(
        &self,
        bytes: &[u8],
    ) -> Result<DataFrame> {
        let text = String::from_utf8_lossy(bytes);
        let normalized: Vec<String>;
        let mut lines: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Err(Error::Configuration(
                "table contains no data lines".into(),
            ));
        }

        let separator = match self {
            TableFormat::Tsv => b'\t',
            TableFormat::Csv => b',',
            TableFormat::Whitespace => {
                normalized = lines
                    .iter()
                    .map(|line| {
                        line.split_whitespace().collect::<Vec<_>>().join("\t")
                    })
                    .collect::<Vec<_>>();
                lines = normalized.iter().map(String::as_str).collect();
                b'\t'
            },
        };
        let buffer = lines.join("\n").into_bytes();

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(separator)
                    .with_try_parse_dates(false),
            )
            .into_reader_with_file_handle(Cursor::new(buffer))
            .finish()?;

        if df.width() < 2 {
            return Err(Error::Configuration(format!(
                "parse as {:?} produced {} column(s), expected at least 2",
                self,
                df.width()
            )));
        }
        Ok(df)
    }
}

/// Reads a table file, transparently decompressing `.gz` input, trying
/// `formats` in order. Returns the first successful parse or the last
/// failure.
pub fn read_table<P: AsRef<Path>>(
    path: P,
    formats: &[TableFormat],
) -> Result<DataFrame> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        MultiGzDecoder::new(file).read_to_end(&mut bytes)?;
    }
    else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }
    read_table_bytes(&bytes, formats)
}

/// As [`read_table`], over an in-memory buffer.
pub fn read_table_bytes(
    bytes: &[u8],
    formats: &[TableFormat],
) -> Result<DataFrame> {
    let formats = if formats.is_empty() {
        &DEFAULT_FORMATS[..]
    }
    else {
        formats
    };
    let mut last_err = None;
    for format in formats {
        match format.parse(bytes) {
            Ok(df) => {
                debug!(
                    "parsed table as {:?}: {} rows x {} columns",
                    format,
                    df.height(),
                    df.width()
                );
                return Ok(df);
            },
            Err(err) => {
                debug!("parse as {:?} rejected: {}", format, err);
                last_err = Some(err);
            },
        }
    }
    Err(last_err.unwrap_or_else(|| {
        Error::Configuration("no table formats to try".into())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "# produced by blastp\n\
                       Query\tMatch\tScore\n\
                       g1\th1\t100.5\n\
                       g2\th2\t90.0\n";

    #[test]
    fn tsv_parses_and_skips_comments() {
        let df = read_table_bytes(TSV.as_bytes(), &DEFAULT_FORMATS).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(
            df.column("Query").unwrap().str().unwrap().get(0),
            Some("g1")
        );
    }

    #[test]
    fn csv_falls_through_after_tsv_rejection() {
        let csv = "Query,Match,Score\ng1,h1,100.5\n";
        let df = read_table_bytes(csv.as_bytes(), &DEFAULT_FORMATS).unwrap();
        assert_eq!(df.shape(), (1, 3));
        assert_eq!(
            df.column("Match").unwrap().str().unwrap().get(0),
            Some("h1")
        );
    }

    #[test]
    fn whitespace_runs_collapse_to_columns() {
        let ws = "Query   Match\tScore\ng1    h1   12.5\n";
        let df = TableFormat::Whitespace.parse(ws.as_bytes()).unwrap();
        assert_eq!(df.shape(), (1, 3));
    }

    #[test]
    fn single_column_parse_is_rejected() {
        let text = "Query\ng1\ng2\n";
        assert!(read_table_bytes(text.as_bytes(), &DEFAULT_FORMATS).is_err());
    }

    #[test]
    fn gzip_input_is_decompressed() {
        use std::io::Write;

        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(TSV.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        std::fs::write(&path, gz).unwrap();

        let df = read_table(&path, &DEFAULT_FORMATS).unwrap();
        assert_eq!(df.shape(), (2, 3));
    }
}
