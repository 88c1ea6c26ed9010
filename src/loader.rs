// CSV ingestion: turns a headered CSV file into `Row`s for the KPI engine.
//
// Nothing here interprets numbers; cells are handed over as text and the
// engine's coercion decides what they mean.
use crate::aliases::AliasTable;
use crate::error::Result;
use crate::types::{Row, Scalar};
use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Headers that no alias in the table recognises.
    pub unmatched_headers: Vec<String>,
}

pub fn load_rows(path: impl AsRef<Path>, aliases: &AliasTable) -> Result<(Vec<Row>, LoadReport)> {
    let path = path.as_ref();
    let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let (rows, report) = read_rows(rdr, aliases)?;
    info!(
        path = %path.display(),
        total = report.total_rows,
        loaded = report.loaded_rows,
        errors = report.parse_errors,
        "loaded rows"
    );
    Ok((rows, report))
}

pub fn load_rows_from_reader<R: Read>(reader: R, aliases: &AliasTable) -> Result<(Vec<Row>, LoadReport)> {
    let rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    read_rows(rdr, aliases)
}

fn read_rows<R: Read>(mut rdr: Reader<R>, aliases: &AliasTable) -> Result<(Vec<Row>, LoadReport)> {
    let headers = rdr.headers()?.clone();
    let unmatched_headers: Vec<String> = headers
        .iter()
        .filter(|h| !h.trim().is_empty() && aliases.metric_for_header(h).is_none())
        .map(str::to_string)
        .collect();
    if !unmatched_headers.is_empty() {
        warn!(headers = ?unmatched_headers, "headers not recognised by any alias");
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut rows = Vec::new();

    for result in rdr.records() {
        total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = total_rows, error = %e, "skipping unreadable record");
                parse_errors += 1;
                continue;
            }
        };
        // Short records simply lack the trailing headers.
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| {
                let value = if cell.is_empty() {
                    Scalar::Null
                } else {
                    Scalar::from(cell)
                };
                (h, value)
            })
            .collect();
        rows.push(row);
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: rows.len(),
        parse_errors,
        unmatched_headers,
    };
    Ok((rows, report))
}
