//! Begrenztes Undo-Protokoll einer Rasterung.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::CellAccess;
use crate::core::{BlockState, VoxelWorld};

/// Ein geänderter Voxel: vorheriger und neuer Inhalt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub pos: IVec3,
    pub previous: BlockState,
    pub placed: BlockState,
}

/// Protokoll aller Änderungen bis zur Kapazitätsgrenze.
///
/// Ist die Grenze erreicht, wird nichts mehr aufgezeichnet; die Rasterung
/// selbst läuft weiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
    capacity: usize,
    limit_reached: bool,
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            limit_reached: false,
        }
    }

    /// Zeichnet einen Eintrag auf; `false`, wenn die Kapazität erschöpft ist.
    pub fn record(&mut self, entry: UndoEntry) -> bool {
        if self.entries.len() >= self.capacity {
            self.limit_reached = true;
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mindestens eine Änderung wurde nicht mehr aufgezeichnet.
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    /// Schreibt die vorherigen Inhalte in umgekehrter Reihenfolge zurück.
    ///
    /// Gibt die Anzahl erfolgreicher Schreibzugriffe zurück.
    pub fn revert<W: VoxelWorld>(&self, world: &mut W, access: &mut CellAccess) -> usize {
        let written = self
            .entries
            .iter()
            .rev()
            .filter(|e| access.write(world, e.pos, &e.previous))
            .count();
        log::info!("Undo: {written}/{} Voxel zurückgesetzt", self.entries.len());
        written
    }

    /// Wendet die aufgezeichneten Inhalte erneut in Original-Reihenfolge an.
    pub fn reapply<W: VoxelWorld>(&self, world: &mut W, access: &mut CellAccess) -> usize {
        let written = self
            .entries
            .iter()
            .filter(|e| access.write(world, e.pos, &e.placed))
            .count();
        log::info!("Redo: {written}/{} Voxel erneut gesetzt", self.entries.len());
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VoxelGrid;
    use crate::raster::RasterSettings;

    fn entry(x: i32, previous: &str, placed: &str) -> UndoEntry {
        UndoEntry {
            pos: IVec3::new(x, 0, 0),
            previous: BlockState::new(previous),
            placed: BlockState::new(placed),
        }
    }

    #[test]
    fn capacity_stops_recording() {
        let mut log = UndoLog::new(2);
        assert!(log.record(entry(0, "a", "b")));
        assert!(log.record(entry(1, "a", "b")));
        assert!(!log.limit_reached());
        assert!(!log.record(entry(2, "a", "b")));
        assert!(log.limit_reached());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn revert_uses_reverse_order() {
        // Zweimal dieselbe Zelle: rückwärts angewendet bleibt der älteste Inhalt
        let mut log = UndoLog::new(10);
        log.record(entry(0, "minecraft:dirt", "minecraft:stone"));
        log.record(entry(0, "minecraft:stone", "minecraft:glass"));

        let mut grid = VoxelGrid::new();
        grid.set(IVec3::ZERO, BlockState::new("minecraft:glass"));
        let mut access = CellAccess::new(&RasterSettings::default());

        assert_eq!(log.revert(&mut grid, &mut access), 2);
        assert_eq!(grid.get(IVec3::ZERO).id, "minecraft:dirt");
        assert_eq!(log.reapply(&mut grid, &mut access), 2);
        assert_eq!(grid.get(IVec3::ZERO).id, "minecraft:glass");
    }
}
