//! Per-episode training records.
//!
//! Each resolved purchase decision becomes one JSON line in
//! `purchase<episode>_dataset.jsonl`. When the episode ends the file is
//! compressed into `purchase<episode>winner<winner>_dataset.zip` and removed.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tripmind_core::{Phase, StateEncoding};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// One purchase decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Round token as last announced by the engine (`"0"` before the first).
    pub round: String,
    pub player: String,
    pub delegate: Phase,
    pub pu_before_move: i64,
    pub pu_after_move: i64,
    pub state: StateEncoding,
    /// Move-dictionary ids of every legal purchase at decision time.
    pub legal_moves: Vec<u32>,
    pub chosen_move: u32,
}

/// Appends records and archives finished episodes under one directory.
#[derive(Debug, Clone)]
pub struct DatasetRecorder {
    dir: PathBuf,
}

impl DatasetRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dataset_path(&self, episode: u32) -> PathBuf {
        self.dir.join(format!("purchase{}_dataset.jsonl", episode))
    }

    /// Winner characters outside `[A-Za-z0-9_]` become `_`.
    pub fn archive_path(&self, episode: u32, winner: &str) -> PathBuf {
        let winner: String = winner
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        self.dir
            .join(format!("purchase{}winner{}_dataset.zip", episode, winner))
    }

    /// Append one record to the episode's JSONL file, creating it if needed.
    pub fn append(&self, episode: u32, record: &PurchaseRecord) -> Result<(), DatasetError> {
        let path = self.dataset_path(episode);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        log::debug!("Recorded {} purchase for round {}", record.player, record.round);
        Ok(())
    }

    /// Zip the episode's dataset and delete the JSONL.
    ///
    /// Returns the archive path, or `None` if the episode recorded nothing.
    pub fn archive(&self, episode: u32, winner: &str) -> Result<Option<PathBuf>, DatasetError> {
        let source = self.dataset_path(episode);
        if !source.exists() {
            return Ok(None);
        }

        let target = self.archive_path(episode, winner);
        let mut zip = zip::ZipWriter::new(File::create(&target)?);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("purchase{}_dataset.jsonl", episode));
        zip.start_file(name, options)?;
        std::io::copy(&mut File::open(&source)?, &mut zip)?;
        zip.finish()?;

        std::fs::remove_file(&source)?;
        log::info!("Archived episode {} to {}", episode, target.display());
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use tripmind_core::testing::sample_graph;

    fn record(round: &str) -> PurchaseRecord {
        PurchaseRecord {
            round: round.to_string(),
            player: "Russians".to_string(),
            delegate: Phase::Purchase,
            pu_before_move: 10,
            pu_after_move: 4,
            state: tripmind_core::encode(&sample_graph(), Phase::Purchase),
            legal_moves: vec![0, 1, 2],
            chosen_move: 1,
        }
    }

    #[test]
    fn test_append_lines() {
        let dir = tempdir().unwrap();
        let recorder = DatasetRecorder::new(dir.path());
        recorder.append(1, &record("1")).unwrap();
        recorder.append(1, &record("2")).unwrap();

        let text = std::fs::read_to_string(recorder.dataset_path(1)).unwrap();
        let rows: Vec<PurchaseRecord> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].round, "2");
        assert_eq!(rows[0].chosen_move, 1);
    }

    #[test]
    fn test_archive_zips_and_removes() {
        let dir = tempdir().unwrap();
        let recorder = DatasetRecorder::new(dir.path());
        recorder.append(3, &record("5")).unwrap();

        let archive = recorder.archive(3, "Germans").unwrap().unwrap();
        assert_eq!(
            archive.file_name().unwrap().to_str().unwrap(),
            "purchase3winnerGermans_dataset.zip"
        );
        assert!(!recorder.dataset_path(3).exists());

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut entry = zip.by_name("purchase3_dataset.jsonl").unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_archive_name_stays_in_dir() {
        let dir = tempdir().unwrap();
        let recorder = DatasetRecorder::new(dir.path());
        let path = recorder.archive_path(2, "../../etc/Germans x");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "purchase2winner______etc_Germans_x_dataset.zip"
        );

        recorder.append(2, &record("1")).unwrap();
        let archive = recorder.archive(2, "a/b").unwrap().unwrap();
        assert_eq!(archive.parent(), Some(dir.path()));
        assert!(archive.exists());
    }

    #[test]
    fn test_archive_without_dataset() {
        let dir = tempdir().unwrap();
        let recorder = DatasetRecorder::new(dir.path());
        assert!(recorder.archive(1, "Russians").unwrap().is_none());
    }
}
