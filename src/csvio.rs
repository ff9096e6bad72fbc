//! CSV ingestion and egress helpers for the `dedup` binary.

use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineOutput;
use crate::row::Row;
use std::path::Path;

pub fn read_roster(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize().enumerate() {
        let row: Row = record.map_err(|source| match source.kind() {
            csv::ErrorKind::Deserialize { .. } => PipelineError::MalformedInput {
                row: idx,
                field: "roster row",
            },
            _ => PipelineError::RosterRead(source),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn write_dup_pairs(out_dir: &Path, output: &PipelineOutput) -> Result<()> {
    let mut writer = csv::Writer::from_path(out_dir.join("dup_pairs.csv"))?;
    for record in &output.dup_pairs {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_clusters(out_dir: &Path, output: &PipelineOutput) -> Result<()> {
    let file = std::fs::File::create(out_dir.join("clusters.json"))?;
    serde_json::to_writer_pretty(file, &output.clusters)?;
    Ok(())
}

pub fn write_summary(out_dir: &Path, output: &PipelineOutput) -> Result<()> {
    let file = std::fs::File::create(out_dir.join("summary.json"))?;
    serde_json::to_writer_pretty(file, &output.summary.0)?;
    Ok(())
}

pub fn write_merged(out_dir: &Path, output: &PipelineOutput) -> Result<()> {
    let mut writer = csv::Writer::from_path(out_dir.join("merged.csv"))?;
    for row in &output.merged {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_roster_and_coerces_empty_cells_to_none() {
        let dir = std::env::temp_dir().join("provider_roster_csvio_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roster.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "provider_id,first_name,last_name,npi").unwrap();
        writeln!(f, "1,Ada,Lovelace,1234567890").unwrap();
        writeln!(f, "2,,Jones,").unwrap();
        drop(f);

        let rows = read_roster(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(rows[1].first_name, None);
        assert_eq!(rows[1].npi, None);
    }
}
