use anyhow::{Context, Result};
use nadyn_dynamics::output::StepRecord;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write the averages of all steps as a JSON array
pub fn write_records(path: &Path, records: &[StepRecord]) -> Result<()> {
    let file: File =
        File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .with_context(|| format!("unable to write {}", path.display()))
}
