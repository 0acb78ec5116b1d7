//! Trajectories and agent memories on disk.
//!
//! A run labelled `run_3_0.4_0.4` leaves `data/run_3_0.4_0.4.jsonl` (the
//! column names, then one round per line) and `agents/{LA1,PA1,LA2,PA2}_run_3_0.4_0.4.json` under
//! the output directory.

use crate::error::SimError;
use crate::process::memory::Snapshot;
use crate::process::report::{RoundRecord, RECORD_HEADER};
use crate::process::simulator::Firm;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";
pub const AGENTS_DIR: &str = "agents";

pub fn write_trajectory(path: &Path, records: &[RoundRecord]) -> Result<(), SimError> {
    let io = |e| SimError::io(path, e);
    let mut output = BufWriter::new(File::create(path).map_err(io)?);
    serde_json::to_writer(&mut output, &RECORD_HEADER)?;
    output.write_all(b"\n").map_err(io)?;
    for record in records {
        serde_json::to_writer(&mut output, record)?;
        output.write_all(b"\n").map_err(io)?;
    }
    output.flush().map_err(io)
}

pub fn read_trajectory(path: &Path) -> Result<Vec<RoundRecord>, SimError> {
    let input = BufReader::new(File::open(path).map_err(|e| SimError::io(path, e))?);
    let header = serde_json::to_string(&RECORD_HEADER)?;
    let mut records = Vec::new();
    for line in input.lines() {
        let line = line.map_err(|e| SimError::io(path, e))?;
        if !line.is_empty() && line != header {
            records.push(serde_json::from_str(&line)?);
        }
    }
    Ok(records)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SimError> {
    let mut output = BufWriter::new(File::create(path).map_err(|e| SimError::io(path, e))?);
    serde_json::to_writer(&mut output, snapshot)?;
    output.flush().map_err(|e| SimError::io(path, e))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SimError> {
    let input = BufReader::new(File::open(path).map_err(|e| SimError::io(path, e))?);
    Ok(serde_json::from_reader(input)?)
}

/// Snapshot files of both firms, in `[LA1, PA1, LA2, PA2]` order.
pub fn agent_paths(out_dir: &Path, label: &str) -> [PathBuf; 4] {
    let dir = out_dir.join(AGENTS_DIR);
    ["LA1", "PA1", "LA2", "PA2"].map(|name| dir.join(format!("{}_{}.json", name, label)))
}

pub fn trajectory_path(out_dir: &Path, label: &str) -> PathBuf {
    out_dir.join(DATA_DIR).join(format!("{}.jsonl", label))
}

pub fn prepare_output(out_dir: &Path) -> Result<(), SimError> {
    for dir in [out_dir.join(DATA_DIR), out_dir.join(AGENTS_DIR)] {
        fs::create_dir_all(&dir).map_err(|e| SimError::io(&dir, e))?;
    }
    Ok(())
}

/// Stores the trajectory and the memory of all four agents of a run.
pub fn export_run(
    out_dir: &Path,
    label: &str,
    records: &[RoundRecord],
    firms: &[Firm; 2],
) -> Result<(), SimError> {
    write_trajectory(&trajectory_path(out_dir, label), records)?;
    let agents = [
        &firms[0].mover,
        &firms[0].pricer,
        &firms[1].mover,
        &firms[1].pricer,
    ];
    for (path, agent) in agent_paths(out_dir, label).iter().zip(agents) {
        save_snapshot(path, &agent.snapshot())?;
    }
    Ok(())
}
