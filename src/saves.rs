//! Save slots: one directory per slot holding a readable summary and the
//! compressed world state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use wildgrove_world::World;

/// Magic number for state files ("WGSV").
const STATE_MAGIC: u32 = 0x5647_5357;

/// Current state file format version.
const STATE_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;
const SUMMARY_FILE: &str = "summary.json";
const STATE_FILE: &str = "state.dat";
const TMP_EXTENSION: &str = "tmp";

/// Quick-look metadata written next to each saved state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSummary {
    pub slot: String,
    pub seed: u32,
    pub tick: u64,
    pub season: String,
    pub chunks: usize,
    pub plants: usize,
    pub saved_at: DateTime<Utc>,
}

impl SaveSummary {
    fn describe(slot: &str, world: &World) -> Self {
        Self {
            slot: slot.to_string(),
            seed: world.seed().get(),
            tick: world.clock.tick.0,
            season: world.clock.season().to_string(),
            chunks: world.chunks.len(),
            plants: world.plant_count(),
            saved_at: Utc::now(),
        }
    }
}

/// Storage of complete simulation states by slot name.
pub trait SaveRepository {
    fn save(&self, slot: &str, world: &World) -> Result<SaveSummary>;
    fn load(&self, slot: &str) -> Result<World>;
    fn delete(&self, slot: &str) -> Result<()>;
    /// Summaries of every slot, most recently saved first.
    fn list_save_summaries(&self) -> Result<Vec<SaveSummary>>;
}

#[derive(Debug, Clone)]
struct StateHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl StateHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: STATE_MAGIC,
            version: STATE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            anyhow::bail!("State header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != STATE_MAGIC {
            anyhow::bail!(
                "Invalid state magic: expected 0x{:08X}, got 0x{:08X}",
                STATE_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != STATE_VERSION {
            anyhow::bail!("Unsupported state version {version}");
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Serialize, compress and frame a world state.
pub fn encode_state(world: &World) -> Result<Vec<u8>> {
    let serialized = serde_json::to_vec(world).context("Failed to serialize world state")?;
    let compressed =
        zstd::encode_all(&serialized[..], 3).context("Failed to compress world state")?;
    let payload_len =
        u32::try_from(compressed.len()).context("Compressed world state exceeds 4 GiB")?;

    let mut bytes = StateHeader::new(checksum(&compressed), payload_len).to_bytes();
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Validate, decompress and deserialize a framed world state.
pub fn decode_state(bytes: &[u8]) -> Result<World> {
    let header = StateHeader::from_bytes(bytes)?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() != header.payload_len as usize {
        anyhow::bail!(
            "State payload length mismatch: header says {}, found {}",
            header.payload_len,
            payload.len()
        );
    }

    let computed_crc = checksum(payload);
    if computed_crc != header.crc32 {
        anyhow::bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32,
            computed_crc
        );
    }

    let decompressed = zstd::decode_all(payload).context("Failed to decompress world state")?;
    serde_json::from_slice(&decompressed).context("Failed to deserialize world state")
}

/// Stage both slot files, then move them into place summary first.
fn write_slot(dir: &Path, world: &World, summary: &SaveSummary) -> Result<()> {
    let state_tmp = dir.join(STATE_FILE).with_extension(TMP_EXTENSION);
    let summary_tmp = dir.join(SUMMARY_FILE).with_extension(TMP_EXTENSION);

    let state = encode_state(world)?;
    fs::write(&state_tmp, state).context("Failed to write world state file")?;
    let summary_json =
        serde_json::to_string_pretty(summary).context("Failed to serialize save summary")?;
    fs::write(&summary_tmp, summary_json).context("Failed to write save summary file")?;

    fs::rename(&summary_tmp, dir.join(SUMMARY_FILE)).context("Failed to commit save summary")?;
    fs::rename(&state_tmp, dir.join(STATE_FILE)).context("Failed to commit world state")?;
    Ok(())
}

/// Saves under `<root>/<slot>/`.
#[derive(Debug, Clone)]
pub struct DirectorySaveRepository {
    root: PathBuf,
}

impl DirectorySaveRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_dir(&self, slot: &str) -> Result<PathBuf> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("Invalid save slot name '{slot}'");
        }
        Ok(self.root.join(slot))
    }
}

impl SaveRepository for DirectorySaveRepository {
    fn save(&self, slot: &str, world: &World) -> Result<SaveSummary> {
        let dir = self.slot_dir(slot)?;
        let fresh = !dir.exists();
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let summary = SaveSummary::describe(slot, world);
        if let Err(err) = write_slot(&dir, world, &summary) {
            for name in [STATE_FILE, SUMMARY_FILE] {
                let _ = fs::remove_file(dir.join(name).with_extension(TMP_EXTENSION));
            }
            if fresh {
                let _ = fs::remove_dir_all(&dir);
            }
            return Err(err).with_context(|| format!("Failed to save slot '{slot}'"));
        }

        info!(
            slot,
            tick = summary.tick,
            plants = summary.plants,
            "saved world"
        );
        Ok(summary)
    }

    fn load(&self, slot: &str) -> Result<World> {
        let dir = self.slot_dir(slot)?;
        if !dir.exists() {
            anyhow::bail!("Save slot '{}' does not exist", slot);
        }

        let bytes = fs::read(dir.join(STATE_FILE)).context("Failed to read world state file")?;
        let world = decode_state(&bytes).with_context(|| format!("Save slot '{slot}' is corrupt"))?;

        info!(slot, tick = world.clock.tick.0, "loaded world");
        Ok(world)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let dir = self.slot_dir(slot)?;
        if !dir.exists() {
            anyhow::bail!("Save slot '{}' does not exist", slot);
        }

        fs::remove_dir_all(&dir).context("Failed to delete save slot")?;
        info!(slot, "deleted save slot");
        Ok(())
    }

    fn list_save_summaries(&self) -> Result<Vec<SaveSummary>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root).context("Failed to read saves directory")? {
            let entry = entry?;
            let summary_path = entry.path().join(SUMMARY_FILE);
            if !summary_path.exists() {
                continue;
            }
            let json = fs::read_to_string(&summary_path)
                .with_context(|| format!("Failed to read {}", summary_path.display()))?;
            let summary: SaveSummary = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse {}", summary_path.display()))?;
            summaries.push(summary);
        }

        summaries.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| a.slot.cmp(&b.slot))
        });
        Ok(summaries)
    }
}
