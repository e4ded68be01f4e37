//! Schnittstelle zum Voxel-Gitter und eine In-Memory-Implementierung.
//!
//! Das Gitter ist die einzige geteilte, veränderliche Ressource. Zugriffe
//! können fehlschlagen, solange eine Region nicht geladen ist; der Aufrufer
//! fordert dann per `ensure_region_loaded` das Laden an und versucht es erneut.

use glam::IVec3;
use std::collections::{HashMap, HashSet};

use super::template::BlockState;

/// Kantenlänge eines Chunks in Voxeln (XZ).
pub const CHUNK_SIZE: i32 = 16;

/// Horizontaler Chunk-Schlüssel `(cx, cz)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkKey {
    /// Chunk, der `pos` enthält, bei gegebener Kachelgröße.
    pub fn containing(pos: IVec3, tile: i32) -> Self {
        Self {
            cx: pos.x.div_euclid(tile),
            cz: pos.z.div_euclid(tile),
        }
    }

    /// Mittelpunkt des Chunks auf Höhe `y`.
    pub fn center(&self, tile: i32, y: i32) -> IVec3 {
        IVec3::new(self.cx * tile + tile / 2, y, self.cz * tile + tile / 2)
    }
}

/// Transienter Zugriffsfehler (z.B. Region nicht geladen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorldAccessError {
    /// Zelle ist momentan nicht erreichbar
    #[error("Voxel {0} nicht verfügbar (Region nicht geladen)")]
    Unavailable(IVec3),
}

/// Kollaborateur-Schnittstelle für Lese-/Schreibzugriffe auf das Voxel-Gitter.
pub trait VoxelWorld {
    /// Liest den Inhalt einer Zelle.
    fn read_cell(&self, pos: IVec3) -> Result<BlockState, WorldAccessError>;

    /// Schreibt eine Zelle. Idempotent, wenn der Inhalt bereits gleich ist.
    fn write_cell(&mut self, pos: IVec3, block: &BlockState) -> Result<(), WorldAccessError>;

    /// Fordert an, dass die Region um `center` (Radius in Voxeln) geladen wird.
    fn ensure_region_loaded(&mut self, center: IVec3, radius: i32);
}

/// Sparse In-Memory-Gitter (nicht gesetzte Zellen sind Luft).
///
/// Chunks können als "entladen" markiert werden; sie werden erreichbar,
/// sobald eine Lade-Anforderung sie abdeckt. "Unerreichbare" Chunks bleiben
/// dauerhaft gesperrt.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    cells: HashMap<IVec3, BlockState>,
    unloaded: HashSet<ChunkKey>,
    unreachable: HashSet<ChunkKey>,
    write_count: usize,
    load_requests: usize,
}

impl VoxelGrid {
    /// Leeres Gitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Direktes Lesen ohne Lade-Semantik (Luft, wenn nicht gesetzt).
    pub fn get(&self, pos: IVec3) -> BlockState {
        self.cells.get(&pos).cloned().unwrap_or_default()
    }

    /// Direktes Setzen ohne Zähler (für Testaufbau).
    pub fn set(&mut self, pos: IVec3, block: BlockState) {
        if block.is_air() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, block);
        }
    }

    /// Markiert einen Chunk als entladen, bis eine Lade-Anforderung ihn abdeckt.
    pub fn mark_unloaded(&mut self, chunk: ChunkKey) {
        self.unloaded.insert(chunk);
    }

    /// Markiert einen Chunk als dauerhaft unerreichbar.
    pub fn mark_unreachable(&mut self, chunk: ChunkKey) {
        self.unreachable.insert(chunk);
    }

    /// Anzahl erfolgreicher `write_cell`-Aufrufe, die den Inhalt geändert haben.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Anzahl der Lade-Anforderungen.
    pub fn load_request_count(&self) -> usize {
        self.load_requests
    }

    /// Anzahl nicht-leerer Zellen.
    pub fn filled_count(&self) -> usize {
        self.cells.len()
    }

    /// Alle nicht-leeren Zellen.
    pub fn iter(&self) -> impl Iterator<Item = (&IVec3, &BlockState)> {
        self.cells.iter()
    }

    fn check_access(&self, pos: IVec3) -> Result<(), WorldAccessError> {
        let chunk = ChunkKey::containing(pos, CHUNK_SIZE);
        if self.unreachable.contains(&chunk) || self.unloaded.contains(&chunk) {
            return Err(WorldAccessError::Unavailable(pos));
        }
        Ok(())
    }
}

impl VoxelWorld for VoxelGrid {
    fn read_cell(&self, pos: IVec3) -> Result<BlockState, WorldAccessError> {
        self.check_access(pos)?;
        Ok(self.get(pos))
    }

    fn write_cell(&mut self, pos: IVec3, block: &BlockState) -> Result<(), WorldAccessError> {
        self.check_access(pos)?;
        if self.get(pos) != *block {
            self.set(pos, block.clone());
            self.write_count += 1;
        }
        Ok(())
    }

    fn ensure_region_loaded(&mut self, center: IVec3, radius: i32) {
        self.load_requests += 1;
        let reach = radius + CHUNK_SIZE;
        self.unloaded.retain(|chunk| {
            let c = chunk.center(CHUNK_SIZE, center.y);
            let dx = (c.x - center.x) as i64;
            let dz = (c.z - center.z) as i64;
            dx * dx + dz * dz > (reach as i64) * (reach as i64)
        });
    }
}
