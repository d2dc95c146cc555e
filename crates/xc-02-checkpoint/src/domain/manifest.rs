//! # Checkpoint Manifest
//!
//! Two-line text file at the root of every checkpoint: the decimal network
//! magic, then the address of the account that created it.

use super::errors::CheckpointError;
use shared_types::ScriptHash;
use std::fs;
use std::path::Path;

/// Reserved file name of the manifest inside a checkpoint.
pub const MANIFEST_FILE_NAME: &str = ".express-checkpoint";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointManifest {
    pub magic: u32,
    pub account: ScriptHash,
}

impl CheckpointManifest {
    pub fn new(magic: u32, account: ScriptHash) -> Self {
        Self { magic, account }
    }

    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.magic, self.account.to_address())
    }

    pub fn parse(text: &str) -> Result<Self, CheckpointError> {
        let mut lines = text.lines().map(str::trim);
        let magic_line = lines.next().unwrap_or_default();
        let account_line = lines.next().unwrap_or_default();

        let magic = magic_line.parse::<u32>().map_err(|_| {
            CheckpointError::InvalidCheckpoint(format!("bad magic line {:?}", magic_line))
        })?;
        let account = ScriptHash::parse(account_line).map_err(|e| {
            CheckpointError::InvalidCheckpoint(format!("bad account line: {}", e))
        })?;
        Ok(Self { magic, account })
    }

    pub fn write_to(&self, dir: &Path) -> Result<(), CheckpointError> {
        fs::write(dir.join(MANIFEST_FILE_NAME), self.render())?;
        Ok(())
    }

    /// Read the manifest of an extracted checkpoint directory.
    pub fn read_from(dir: &Path) -> Result<Self, CheckpointError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Err(CheckpointError::InvalidCheckpoint(format!(
                "{} has no {} file",
                dir.display(),
                MANIFEST_FILE_NAME
            )));
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Fails unless both recorded fields match.
    pub fn check(&self, magic: u32, account: &ScriptHash) -> Result<(), CheckpointError> {
        if self.magic != magic {
            return Err(CheckpointError::InvalidCheckpoint(format!(
                "network magic mismatch: checkpoint {}, chain {}",
                self.magic, magic
            )));
        }
        if &self.account != account {
            return Err(CheckpointError::InvalidCheckpoint(format!(
                "account mismatch: checkpoint {}, chain {}",
                self.account.to_address(),
                account.to_address()
            )));
        }
        Ok(())
    }
}
