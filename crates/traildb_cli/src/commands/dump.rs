//! Dump command implementation.

use traildb_core::{TrailDatabase, TrailId};

/// Runs the dump command.
pub fn run(
    name: &str,
    trail: Option<u32>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = TrailDatabase::open(name)?;

    match trail {
        Some(id) => {
            let id = TrailId::new(id);
            let key = db.key_of(id)?;
            dump_trail(&db, key, id, limit)?;
        }
        None => {
            for id in 0..db.num_trails() as u32 {
                let id = TrailId::new(id);
                let key = db.key_of(id)?;
                dump_trail(&db, key, id, limit)?;
            }
        }
    }

    Ok(())
}

fn dump_trail(
    db: &TrailDatabase,
    key: &traildb_core::TrailKey,
    id: TrailId,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{id} key={key}");

    let limit = limit.unwrap_or(usize::MAX);
    let mut shown = 0usize;
    let mut total = 0usize;
    for event in db.trail(id)? {
        total += 1;
        if shown >= limit {
            continue;
        }
        shown += 1;

        let values: Vec<String> = event
            .values()
            .unwrap_or_default()
            .iter()
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .collect();
        println!("  {} {}", event.time, values.join(" "));
    }

    if shown < total {
        println!("  ... {} more events", total - shown);
    }
    Ok(())
}
