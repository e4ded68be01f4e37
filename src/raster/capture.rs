//! Kopiert eine Quell-Region aus dem Gitter in eine Vorlage (in Zeitscheiben).

use std::time::{Duration, Instant};

use super::CellAccess;
use crate::core::{BlockState, SourceRegion, SourceTemplate, TemplateError, VoxelWorld};

/// Fortschreitende Kopie einer `SourceRegion`.
#[derive(Debug, Clone)]
pub struct RegionCapture {
    region: SourceRegion,
    height: usize,
    width: usize,
    length: usize,
    /// Gelesene Zellen in der Reihenfolge Layer → Breite → Länge
    cells: Vec<BlockState>,
}

impl RegionCapture {
    pub fn new(region: SourceRegion) -> Self {
        let (height, width, length) = region.dimensions();
        Self {
            region,
            height,
            width,
            length,
            cells: Vec::with_capacity(height * width * length),
        }
    }

    pub fn total_cells(&self) -> usize {
        self.height * self.width * self.length
    }

    pub fn is_complete(&self) -> bool {
        self.cells.len() >= self.total_cells()
    }

    /// Anteil gelesener Zellen in [0, 1].
    pub fn progress(&self) -> f64 {
        match self.total_cells() {
            0 => 1.0,
            total => self.cells.len() as f64 / total as f64,
        }
    }

    /// Liest Zellen, bis alles kopiert oder das Zeitbudget verbraucht ist.
    ///
    /// Pro Aufruf wird mindestens eine Zelle gelesen.
    pub fn step<W: VoxelWorld>(
        &mut self,
        world: &mut W,
        access: &mut CellAccess,
        started: Instant,
        budget: Duration,
    ) -> bool {
        while !self.is_complete() {
            let index = self.cells.len();
            let l = index % self.length;
            let w = (index / self.length) % self.width;
            let y = index / (self.length * self.width);
            let pos = self.region.world_position(y, w, l);
            self.cells.push(access.read_strict(world, pos));
            if started.elapsed() >= budget {
                break;
            }
        }
        self.is_complete()
    }

    /// Baut die Vorlage aus den gelesenen Zellen.
    pub fn finish(self) -> Result<SourceTemplate, TemplateError> {
        let (width, length) = (self.width, self.length);
        let cells = self.cells;
        SourceTemplate::from_fn(
            self.height,
            width,
            length,
            Some(self.region.pivot()),
            |y, w, l| {
                cells
                    .get((y * width + w) * length + l)
                    .cloned()
                    .unwrap_or_default()
            },
        )
    }
}
