//! Map index: the list of selectable maps and the mesh file each one uses.
//!
//! The index is a plain text file with one `map_id,name,file_id,spawn_x,spawn_y`
//! record per line. Ids accept decimal or `0x`-prefixed hex. Blank lines are
//! skipped; anything else that fails to parse is an error naming the line.

#[cfg(test)]
#[path = "map_index_test.rs"]
mod map_index_test;

use std::path::Path;

use serde::Serialize;

use crate::camera::WorldPoint;

/// One selectable map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRecord {
    pub map_id: u32,
    pub name: String,
    /// Id of the mesh file to hand to a [`crate::mesh::MeshProvider`].
    pub file_id: u32,
    pub spawn: WorldPoint,
}

#[derive(Debug, thiserror::Error)]
pub enum MapIndexError {
    #[error("map index could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("map index line {line}: expected 5 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("map index line {line}: invalid {field} `{value}`")]
    InvalidField { line: usize, field: &'static str, value: String },
}

/// Parsed map index, in file order.
#[derive(Debug, Clone, Default)]
pub struct MapIndex {
    records: Vec<MapRecord>,
}

impl MapIndex {
    /// Read and parse an index file.
    ///
    /// # Errors
    ///
    /// Returns [`MapIndexError`] if the file is unreadable or any line is malformed.
    pub fn load(path: &Path) -> Result<Self, MapIndexError> {
        let text = std::fs::read_to_string(path)?;
        let index = Self::parse(&text)?;
        tracing::info!(path = %path.display(), maps = index.len(), "map index loaded");
        Ok(index)
    }

    /// Parse index text.
    ///
    /// # Errors
    ///
    /// Returns [`MapIndexError`] for the first malformed line.
    pub fn parse(text: &str) -> Result<Self, MapIndexError> {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| parse_line(i + 1, l))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    #[must_use]
    pub fn records(&self) -> &[MapRecord] {
        &self.records
    }

    /// Record for map `map_id`.
    #[must_use]
    pub fn by_map_id(&self, map_id: u32) -> Option<&MapRecord> {
        self.records.iter().find(|r| r.map_id == map_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_line(line: usize, text: &str) -> Result<MapRecord, MapIndexError> {
    let fields: Vec<&str> = text.trim_end_matches('\r').split(',').map(str::trim).collect();
    let [map_id, name, file_id, spawn_x, spawn_y] = fields.as_slice() else {
        return Err(MapIndexError::FieldCount { line, found: fields.len() });
    };
    Ok(MapRecord {
        map_id: parse_id(line, "map id", map_id)?,
        name: (*name).to_owned(),
        file_id: parse_id(line, "file id", file_id)?,
        spawn: WorldPoint::new(parse_coord(line, "spawn x", spawn_x)?, parse_coord(line, "spawn y", spawn_y)?),
    })
}

fn parse_id(line: usize, field: &'static str, value: &str) -> Result<u32, MapIndexError> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| MapIndexError::InvalidField { line, field, value: value.to_owned() })
}

fn parse_coord(line: usize, field: &'static str, value: &str) -> Result<f64, MapIndexError> {
    value
        .parse()
        .map_err(|_| MapIndexError::InvalidField { line, field, value: value.to_owned() })
}
