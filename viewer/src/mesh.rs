//! Mesh model: trapezoid regions, the loaded mesh view, and mesh providers.
//!
//! A map's pathing data is a flat list of trapezoids, each tagged with the
//! vertical plane it lives on. `MeshView` owns the list for the currently
//! selected map and is replaced wholesale when another map is chosen.
//!
//! Loading is delegated to a [`MeshProvider`]. The provider distinguishes
//! "could not load" ([`MeshLoadError`]) from "loaded zero regions" (`Ok(vec![])`);
//! the engine renders an empty scene in both cases but reports the former.

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::camera::WorldPoint;
use crate::consts::MIN_MAX_PLANE;

/// On-disk trapezoid record. The top edge shares `yt`, the bottom edge `yb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidRecord {
    pub xtl: f64,
    pub xtr: f64,
    pub yt: f64,
    pub xbl: f64,
    pub xbr: f64,
    pub yb: f64,
    pub plane: i32,
}

/// A quadrilateral navigable region in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    pub top_left: WorldPoint,
    pub top_right: WorldPoint,
    pub bottom_right: WorldPoint,
    pub bottom_left: WorldPoint,
    /// Vertical layer; 0 is ground level.
    pub plane: i32,
}

impl Trapezoid {
    /// Corners in winding order: top-left, top-right, bottom-right, bottom-left.
    #[must_use]
    pub fn corners(&self) -> [WorldPoint; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}

impl From<TrapezoidRecord> for Trapezoid {
    fn from(r: TrapezoidRecord) -> Self {
        Self {
            top_left: WorldPoint::new(r.xtl, r.yt),
            top_right: WorldPoint::new(r.xtr, r.yt),
            bottom_right: WorldPoint::new(r.xbr, r.yb),
            bottom_left: WorldPoint::new(r.xbl, r.yb),
            plane: r.plane,
        }
    }
}

/// The regions of the currently selected map.
#[derive(Debug, Clone)]
pub struct MeshView {
    regions: Vec<Trapezoid>,
    max_plane: i32,
}

impl Default for MeshView {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshView {
    /// An empty view.
    #[must_use]
    pub fn new() -> Self {
        Self { regions: Vec::new(), max_plane: MIN_MAX_PLANE }
    }

    /// Replace every region and recompute `max_plane`.
    pub fn load(&mut self, regions: Vec<Trapezoid>) {
        self.max_plane = regions
            .iter()
            .map(|t| t.plane)
            .fold(MIN_MAX_PLANE, i32::max);
        self.regions = regions;
    }

    #[must_use]
    pub fn regions(&self) -> &[Trapezoid] {
        &self.regions
    }

    /// Highest plane index present, never below 1.
    #[must_use]
    pub fn max_plane(&self) -> i32 {
        self.max_plane
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Errors from loading a map's pathing data.
#[derive(Debug, thiserror::Error)]
pub enum MeshLoadError {
    #[error("mesh file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mesh file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("mesh data for map file {file_id} is corrupt: {source}")]
    Invalid {
        file_id: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("no mesh available for map file {0}")]
    NotFound(u32),
}

/// Parse a JSON array of [`TrapezoidRecord`]s.
///
/// # Errors
///
/// Returns the `serde_json` error for malformed input.
pub fn parse_regions(json: &str) -> Result<Vec<Trapezoid>, serde_json::Error> {
    let records: Vec<TrapezoidRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Trapezoid::from).collect())
}

/// Supplies the trapezoids for a map file id.
pub trait MeshProvider {
    /// Load every region for `file_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshLoadError`] when the data is missing or unreadable. An
    /// existing map with no regions is `Ok(vec![])`, not an error.
    fn load(&self, file_id: u32) -> Result<Vec<Trapezoid>, MeshLoadError>;
}

/// Reads `MAP <file_id:010>.json` files holding an array of [`TrapezoidRecord`]s.
#[derive(Debug, Clone)]
pub struct JsonMeshProvider {
    dir: PathBuf,
}

impl JsonMeshProvider {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the mesh file for `file_id`.
    #[must_use]
    pub fn path_for(&self, file_id: u32) -> PathBuf {
        self.dir.join(format!("MAP {file_id:010}.json"))
    }
}

impl MeshProvider for JsonMeshProvider {
    fn load(&self, file_id: u32) -> Result<Vec<Trapezoid>, MeshLoadError> {
        let path = self.path_for(file_id);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(MeshLoadError::NotFound(file_id)),
            Err(source) => return Err(MeshLoadError::Io { path, source }),
        };
        parse_regions(&text).map_err(|source| MeshLoadError::Corrupt { path, source })
    }
}

/// One map's records already held in memory, e.g. fetched by a browser host.
#[derive(Debug, Clone, Copy)]
pub struct InlineMeshProvider<'a> {
    file_id: u32,
    json: &'a str,
}

impl<'a> InlineMeshProvider<'a> {
    #[must_use]
    pub fn new(file_id: u32, json: &'a str) -> Self {
        Self { file_id, json }
    }
}

impl MeshProvider for InlineMeshProvider<'_> {
    fn load(&self, file_id: u32) -> Result<Vec<Trapezoid>, MeshLoadError> {
        if file_id != self.file_id {
            return Err(MeshLoadError::NotFound(file_id));
        }
        parse_regions(self.json).map_err(|source| MeshLoadError::Invalid { file_id, source })
    }
}
