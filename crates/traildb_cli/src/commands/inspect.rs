//! Inspect command implementation.

use serde::Serialize;
use traildb_core::{FieldId, TrailDatabase};

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Base name the database was opened with.
    pub name: String,
    /// Number of trails.
    pub num_trails: usize,
    /// Total number of events.
    pub num_events: u64,
    /// Number of declared fields (not counting time).
    pub num_fields: usize,
    /// Smallest event timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_timestamp: Option<u64>,
    /// Largest event timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timestamp: Option<u64>,
    /// Per-field statistics.
    pub fields: Vec<FieldStats>,
}

/// Statistics for a single declared field.
#[derive(Debug, Serialize)]
pub struct FieldStats {
    /// Field name.
    pub name: String,
    /// Lexicon size, counting the reserved empty value.
    pub lexicon_size: u64,
}

/// Runs the inspect command.
pub fn run(name: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = TrailDatabase::open(name)?;

    let fields = db
        .field_names()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let size = db.lexicon_size(FieldId::new(i as u32 + 1))?;
            Ok(FieldStats {
                name: field.clone(),
                lexicon_size: size,
            })
        })
        .collect::<Result<Vec<_>, Box<dyn std::error::Error>>>()?;

    let result = InspectResult {
        name: name.to_string(),
        num_trails: db.num_trails(),
        num_events: db.num_events(),
        num_fields: db.num_fields(),
        min_timestamp: db.min_timestamp(),
        max_timestamp: db.max_timestamp(),
        fields,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("Database: {}", result.name);
    println!("  Trails: {}", result.num_trails);
    println!("  Events: {}", result.num_events);
    println!("  Fields: {}", result.num_fields);
    match (result.min_timestamp, result.max_timestamp) {
        (Some(min), Some(max)) => println!("  Time range: {min} .. {max}"),
        _ => println!("  Time range: (no events)"),
    }
    for field in &result.fields {
        println!(
            "  Field {:<20} lexicon size {}",
            field.name, field.lexicon_size
        );
    }
}
