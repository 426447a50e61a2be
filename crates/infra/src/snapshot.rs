//! Raw response and grouped inventory dumps, for inspecting a run afterwards.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::debug;

use pokecull_inventory::RawSpeciesRecords;

use crate::client::Responses;

pub const INVENTORY_FILE: &str = "inventory.json";
pub const GROUPS_FILE: &str = "pokemons.json";
pub const FORT_SEARCH_FILE: &str = "result.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot write snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode snapshot {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes snapshot files into one directory, overwriting previous runs.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full response of the profile + inventory call.
    pub fn write_inventory(&self, responses: &Responses) -> Result<PathBuf, SnapshotError> {
        self.write(INVENTORY_FILE, responses.raw())
    }

    /// Untouched creature records grouped by species id, species in numeric order.
    pub fn write_groups(&self, groups: &RawSpeciesRecords) -> Result<PathBuf, SnapshotError> {
        self.write(GROUPS_FILE, groups)
    }

    pub fn write_fort_search(&self, responses: &Responses) -> Result<PathBuf, SnapshotError> {
        self.write(FORT_SEARCH_FILE, responses.raw())
    }

    /// Pretty JSON with 4-space indentation.
    ///
    /// Object keys come out sorted: `Value` objects are ordered maps, and species
    /// groups are a `BTreeMap` over the numeric id.
    fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, SnapshotError> {
        let path = self.dir.join(name);
        let io_err = |source| SnapshotError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut out = BufWriter::new(File::create(&path).map_err(io_err)?);
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser).map_err(|source| SnapshotError::Encode {
            path: path.clone(),
            source,
        })?;
        out.write_all(b"\n").map_err(io_err)?;
        out.flush().map_err(io_err)?;

        debug!(path = %path.display(), "snapshot written");
        Ok(path)
    }
}
