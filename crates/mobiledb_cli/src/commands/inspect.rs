//! Inspect command implementation.

use super::{read_store_file, CliResult, StoreLine};
use chrono::{DateTime, Utc};
use mobiledb_codec::decode_each;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Store file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store file path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of readable records.
    pub record_count: usize,
    /// Number of lines that could not be parsed.
    pub malformed_lines: usize,
    /// Record count per entity type tag.
    pub type_tags: BTreeMap<String, usize>,
    /// Oldest creation stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_created_at: Option<DateTime<Utc>>,
    /// Newest modification stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_modified_at: Option<DateTime<Utc>>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> CliResult<()> {
    let bytes = read_store_file(path)?;
    let result = analyze(&path.display().to_string(), &bytes);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Summarizes store file contents.
pub fn analyze(path: &str, bytes: &[u8]) -> InspectResult {
    let mut result = InspectResult {
        path: path.to_string(),
        file_size: bytes.len() as u64,
        record_count: 0,
        malformed_lines: 0,
        type_tags: BTreeMap::new(),
        earliest_created_at: None,
        latest_modified_at: None,
    };

    for decoded in decode_each::<StoreLine>(bytes) {
        let Ok((_, envelope)) = decoded else {
            result.malformed_lines += 1;
            continue;
        };

        result.record_count += 1;
        *result.type_tags.entry(envelope.entity_type).or_insert(0) += 1;
        result.earliest_created_at = Some(match result.earliest_created_at {
            Some(t) => t.min(envelope.created_at),
            None => envelope.created_at,
        });
        result.latest_modified_at = Some(match result.latest_modified_at {
            Some(t) => t.max(envelope.last_modified_at),
            None => envelope.last_modified_at,
        });
    }

    result
}

fn print_text_output(result: &InspectResult) {
    println!("MobileDB Store Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_size(result.file_size));
    println!();
    println!("Records:");
    println!("  Readable:  {}", result.record_count);
    println!("  Malformed: {}", result.malformed_lines);

    if let Some(earliest) = result.earliest_created_at {
        println!();
        println!("Timeline:");
        println!("  Earliest created:  {}", earliest.to_rfc3339());
    }
    if let Some(latest) = result.latest_modified_at {
        println!("  Latest modified:   {}", latest.to_rfc3339());
    }

    if !result.type_tags.is_empty() {
        println!();
        println!("Types:");
        for (tag, count) in &result.type_tags {
            println!("  {tag}: {count}");
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
