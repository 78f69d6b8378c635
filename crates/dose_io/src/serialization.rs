//! Text and file encodings for checkpoints and genome exports.
//!
//! Checkpoint files are gzip-compressed JSON; uncompressed JSON files are
//! read as well so hand-edited checkpoints load. Genomes travel as HexDNA,
//! the Base16 form of their JSON.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| IoError::encode(e.to_string()))
}

pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let text = text.trim();
    if text.is_empty() {
        return Err(IoError::invalid("document is empty"));
    }
    Ok(serde_json::from_str(text)?)
}

pub fn to_hex_dna<T: Serialize>(value: &T) -> Result<String> {
    to_json(value).map(hex::encode)
}

pub fn from_hex_dna<T: DeserializeOwned>(dna: &str) -> Result<T> {
    let bytes = hex::decode(dna.trim()).map_err(|e| IoError::encode(format!("HexDNA: {e}")))?;
    let text = String::from_utf8(bytes).map_err(|e| IoError::encode(format!("HexDNA: {e}")))?;
    from_json(&text)
}

pub fn write_gz_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {}", path.display())))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, value)?;
    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .map_err(|e| IoError::gzip(path, e))
}

/// Reads a checkpoint, accepting gzip-compressed or plain JSON.
pub fn read_gz_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(IoError::missing(path));
    }
    let mut raw = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut raw)?;

    let mut decoded = Vec::new();
    let gzipped = GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded).is_ok();
    let text = if gzipped { decoded } else { raw };
    serde_json::from_slice(&text)
        .map_err(|e| IoError::Json(e).with_context(format!("decoding {}", path.display())))
}
