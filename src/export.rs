use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::ExportError;

/// Write records as an indented JSON array. An empty slice writes `[]`.
pub fn export_json<T: Serialize>(records: &[T], path: &Path) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.flush()?;
    info!("exported {} records to JSON: {}", records.len(), path.display());
    Ok(())
}

/// Write records as CSV with a header built from every key seen, in
/// first-seen order. An empty slice writes nothing.
pub fn export_csv<T: Serialize>(records: &[T], path: &Path) -> Result<(), ExportError> {
    if records.is_empty() {
        warn!("no records to export to CSV");
        return Ok(());
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, r)| -> Result<Map<String, Value>, ExportError> {
            match serde_json::to_value(r)? {
                Value::Object(map) => Ok(map),
                _ => Err(ExportError::NotAnObject { index }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let header = header_union(&rows);

    ensure_parent_dir(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?;
    wtr.write_record(&header)?;
    for row in &rows {
        wtr.write_record(header.iter().map(|key| row.get(key).map(cell).unwrap_or_default()))?;
    }
    wtr.flush()?;

    info!("exported {} records to CSV: {}", rows.len(), path.display());
    Ok(())
}

fn header_union(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }
    header
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_render_lists_and_booleans() {
        assert_eq!(cell(&json!(["a", "b"])), "a, b");
        assert_eq!(cell(&json!(true)), "true");
        assert_eq!(cell(&json!(false)), "false");
        assert_eq!(cell(&Value::Null), "");
        assert_eq!(cell(&json!(4.5)), "4.5");
    }

    #[test]
    fn header_is_union_in_first_seen_order() {
        let rows: Vec<Map<String, Value>> = vec![
            json!({"b": 1, "a": 2}).as_object().unwrap().clone(),
            json!({"a": 3, "c": 4}).as_object().unwrap().clone(),
        ];
        assert_eq!(header_union(&rows), vec!["b", "a", "c"]);
    }
}
