//! Schreib-Batch, gruppiert nach Chunks, und die Platzierungs-Regeln.

use glam::IVec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{BlockState, ChunkKey};

/// Regel, welche Gewinner tatsächlich geschrieben werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Jeder Gewinner wird geschrieben (auch Luft)
    #[default]
    OverwriteAll,
    /// Luft-Gewinner werden übersprungen
    SkipEmptySource,
    /// Nur leere Zielzellen werden befüllt (Prüfung beim Schreiben)
    FillEmptyOnly,
}

impl PlacementPolicy {
    /// Darf ein Gewinner mit diesem Inhalt in den Batch?
    pub fn accepts_source(self, source: &BlockState) -> bool {
        !(self == PlacementPolicy::SkipEmptySource && source.is_air())
    }

    /// Darf der aktuelle Inhalt der Zielzelle überschrieben werden?
    pub fn allows_overwrite(self, existing: &BlockState) -> bool {
        self != PlacementPolicy::FillEmptyOnly || existing.is_air()
    }
}

/// Geplante Schreibzugriffe eines Batches, nach Chunk gruppiert.
#[derive(Debug, Clone)]
pub struct PlacementBatch {
    tile: i32,
    chunks: IndexMap<ChunkKey, Vec<(IVec3, BlockState)>>,
    len: usize,
}

impl PlacementBatch {
    pub fn new(tile: i32) -> Self {
        Self {
            tile: tile.max(1),
            chunks: IndexMap::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, pos: IVec3, block: BlockState) {
        self.chunks
            .entry(ChunkKey::containing(pos, self.tile))
            .or_default()
            .push((pos, block));
        self.len += 1;
    }

    /// Anzahl geplanter Schreibzugriffe.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn tile(&self) -> i32 {
        self.tile
    }

    /// Chunks in Einfüge-Reihenfolge.
    pub fn into_chunks(self) -> impl Iterator<Item = (ChunkKey, Vec<(IVec3, BlockState)>)> {
        self.chunks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_grouped_by_chunk() {
        let stone = BlockState::new("minecraft:stone");
        let mut batch = PlacementBatch::new(16);
        batch.push(IVec3::new(1, 64, 1), stone.clone());
        batch.push(IVec3::new(20, 64, 1), stone.clone());
        batch.push(IVec3::new(15, 70, 15), stone);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.chunk_count(), 2);
        let chunks: Vec<_> = batch.into_chunks().collect();
        assert_eq!(chunks[0].0, ChunkKey { cx: 0, cz: 0 });
        assert_eq!(chunks[0].1.len(), 2);
        assert_eq!(chunks[1].0, ChunkKey { cx: 1, cz: 0 });
    }

    #[test]
    fn policies() {
        let air = BlockState::air();
        let stone = BlockState::new("minecraft:stone");
        assert!(PlacementPolicy::OverwriteAll.accepts_source(&air));
        assert!(!PlacementPolicy::SkipEmptySource.accepts_source(&air));
        assert!(PlacementPolicy::SkipEmptySource.accepts_source(&stone));
        assert!(PlacementPolicy::FillEmptyOnly.allows_overwrite(&air));
        assert!(!PlacementPolicy::FillEmptyOnly.allows_overwrite(&stone));
        assert!(PlacementPolicy::OverwriteAll.allows_overwrite(&stone));
    }
}
