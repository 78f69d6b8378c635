use crate::error::Result;
use dose_core::{Ecosystem, GenerationLogger, GenerationRecord, Population};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of a `.jsonl` generation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedGeneration {
    pub timestamp: String,
    #[serde(flatten)]
    pub record: GenerationRecord,
}

/// Appends a [`GenerationRecord`] per logged generation to
/// `{dir}/{run}_generations.jsonl`.
pub struct JsonlLogger {
    file: BufWriter<File>,
    path: PathBuf,
    fingerprint: String,
}

impl JsonlLogger {
    pub fn new_at(dir: &Path, run: &str, fingerprint: &str) -> Result<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join(format!("{run}_generations.jsonl"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: BufWriter::new(file),
            path,
            fingerprint: fingerprint.to_string(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, record: GenerationRecord) -> Result<()> {
        let line = LoggedGeneration {
            timestamp: chrono::Utc::now().to_rfc3339(),
            record,
        };
        let json = serde_json::to_string(&line)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()?;
        Ok(())
    }
}

impl GenerationLogger for JsonlLogger {
    fn log(
        &mut self,
        generation: u64,
        populations: &[Population],
        ecosystem: &Ecosystem,
    ) -> anyhow::Result<()> {
        let record = GenerationRecord::capture(generation, &self.fingerprint, populations, ecosystem);
        self.write(record)?;
        Ok(())
    }
}

/// Reads every well-formed line of a generation log, skipping the rest.
pub fn read_log(path: &Path) -> Result<Vec<LoggedGeneration>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(vec![]),
    };
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for l in reader.lines().map_while(std::result::Result::ok) {
        if let Ok(record) = serde_json::from_str::<LoggedGeneration>(&l) {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dose_core::Dimensions;

    #[test]
    fn test_log_appends_lines() {
        let dir = std::env::temp_dir().join(format!("dose_log_{}", uuid::Uuid::new_v4().simple()));
        let eco = Ecosystem::new(Dimensions::new(2, 1, 1)).unwrap();
        let populations = vec![Population::new("p", vec![], 1.0, 5)];

        let mut logger = JsonlLogger::new_at(&dir, "run", "fp").unwrap();
        logger.log(1, &populations, &eco).unwrap();
        logger.log(2, &populations, &eco).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(logger.path())
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();

        let records = read_log(logger.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].record.generation, 2);
        assert_eq!(records[0].record.fingerprint, "fp");
        assert_eq!(records[0].record.cells.len(), 2);
        assert!(!records[0].timestamp.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_log_reads_empty() {
        assert!(read_log(Path::new("/no/such/log.jsonl")).unwrap().is_empty());
    }
}
