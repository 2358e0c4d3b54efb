//! CSV input/output for [`Frame`].
//!
//! A header row is required. Column types are inferred: a column is
//! numeric when every non-empty field parses as a number, otherwise it is
//! categorical. Output files are published atomically (temp file + rename)
//! so a failed write never leaves a partial table behind.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::{Column, DataError, Frame};
use crate::io::write_atomic;

/// Read a CSV file into a frame.
pub fn read_csv(path: &Path) -> Result<Frame, DataError> {
    let file = File::open(path)?;
    read_csv_from_reader(BufReader::new(file))
}

/// Read CSV data from any reader into a frame.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Frame, DataError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(DataError::MissingHeader);
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record: StringRecord = record?;
        for (i, field) in record.iter().enumerate() {
            cells[i].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();

    Frame::new(columns)
}

/// Write a frame to a CSV file, creating parent directories as needed.
pub fn write_csv(frame: &Frame, path: &Path) -> Result<(), DataError> {
    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new().from_writer(&mut buf);
        wtr.write_record(frame.column_names())?;

        let mut record = StringRecord::new();
        for row in 0..frame.n_rows() {
            record.clear();
            for col in frame.columns() {
                match col {
                    Column::Numeric { values, .. } => {
                        let v = values[row];
                        if v.is_nan() {
                            record.push_field("");
                        } else {
                            record.push_field(&v.to_string());
                        }
                    }
                    Column::Categorical { values, .. } => record.push_field(&values[row]),
                }
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
    }

    write_atomic(path, &buf)?;
    Ok(())
}

/// Decide a column's type from its raw fields.
///
/// Empty fields are missing values; they parse as NaN in a numeric column
/// and stay empty strings in a categorical one.
fn infer_column(name: String, raw: Vec<String>) -> Column {
    let mut numeric = Vec::with_capacity(raw.len());
    for field in &raw {
        if field.is_empty() {
            numeric.push(f32::NAN);
            continue;
        }
        match field.parse::<f32>() {
            Ok(v) => numeric.push(v),
            Err(_) => {
                return Column::Categorical { name, values: raw };
            }
        }
    }
    Column::Numeric {
        name,
        values: numeric,
    }
}
