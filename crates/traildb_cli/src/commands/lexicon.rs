//! Lexicon command implementation.

use traildb_core::TrailDatabase;

/// Runs the lexicon command.
pub fn run(
    name: &str,
    field: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = TrailDatabase::open(name)?;
    let field_id = db.field_id(field)?;
    let size = db.lexicon_size(field_id)?;

    println!("Field {field}: {} distinct values", size - 1);

    let limit = limit.unwrap_or(usize::MAX);
    for (id, value) in db.lexicon(field_id)?.take(limit) {
        println!("  {:>8} {}", id.as_u64(), String::from_utf8_lossy(value));
    }
    if (size - 1) as usize > limit {
        println!("  ... truncated at {limit}");
    }

    Ok(())
}
