//! Dump command implementation.

use super::{read_store_file, CliResult, StoreLine};
use mobiledb_codec::decode_each;
use serde::Serialize;
use std::path::Path;

/// One dumped line.
#[derive(Debug, Serialize)]
pub struct DumpEntry {
    /// 1-based line number in the file.
    pub line: usize,
    /// The decoded envelope, or `None` if the line is malformed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StoreLine>,
    /// Parse error for malformed lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the dump command.
pub fn run(path: &Path, limit: Option<usize>, offset: usize, format: &str) -> CliResult<()> {
    let bytes = read_store_file(path)?;
    let entries = collect(&bytes, limit, offset);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            for entry in &entries {
                print_entry(entry)?;
            }
            println!();
            println!("{} entries", entries.len());
        }
    }

    Ok(())
}

/// Decodes the selected window of lines, keeping malformed ones as errors.
pub fn collect(bytes: &[u8], limit: Option<usize>, offset: usize) -> Vec<DumpEntry> {
    decode_each::<StoreLine>(bytes)
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .map(|decoded| match decoded {
            Ok((line, record)) => DumpEntry {
                line,
                record: Some(record),
                error: None,
            },
            Err(e) => DumpEntry {
                line: e.line().unwrap_or(0),
                record: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

fn print_entry(entry: &DumpEntry) -> CliResult<()> {
    match (&entry.record, &entry.error) {
        (Some(record), _) => {
            println!(
                "[{}] {} ({}) created {} modified {}",
                entry.line,
                record.identity,
                record.entity_type,
                record.created_at.to_rfc3339(),
                record.last_modified_at.to_rfc3339()
            );
            println!("    {}", serde_json::to_string(&record.entity)?);
        }
        (None, Some(error)) => println!("[{}] <malformed> {error}", entry.line),
        (None, None) => {}
    }
    Ok(())
}
