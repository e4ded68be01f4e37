//! Zellzugriff mit begrenzten Wiederholungen und Lade-Anforderungen.
//!
//! Nicht geladene Regionen liefern transiente Fehler. Zwischen den Versuchen
//! wird die Region um die Zelle neu angefordert. Nach dem Limit gilt die Zelle
//! als leer bzw. der Schreibzugriff als No-op; gemeldet wird das einmal pro Task.

use glam::IVec3;

use super::RasterSettings;
use crate::core::{BlockState, VoxelWorld, WorldAccessError};

#[derive(Debug, Clone)]
pub struct CellAccess {
    retry_limit: usize,
    reload_interval: usize,
    loader_radius: i32,
    reload_distance: f64,
    loader_center: Option<IVec3>,
    failures: usize,
    exhausted_pending: bool,
    exhausted_reported: bool,
}

impl CellAccess {
    pub fn new(settings: &RasterSettings) -> Self {
        Self {
            retry_limit: settings.access_retry_limit,
            reload_interval: settings.reload_interval.max(1),
            loader_radius: settings.loader_radius,
            reload_distance: settings.reload_distance,
            loader_center: None,
            failures: 0,
            exhausted_pending: false,
            exhausted_reported: false,
        }
    }

    /// Fordert die Region um `center` an und merkt sich das Lade-Zentrum.
    pub fn ensure_loaded<W: VoxelWorld>(&mut self, world: &mut W, center: IVec3) {
        world.ensure_region_loaded(center, self.loader_radius);
        self.loader_center = Some(center);
    }

    pub fn loader_center(&self) -> Option<IVec3> {
        self.loader_center
    }

    /// Liest eine Zelle; nach erschöpften Wiederholungen Luft.
    pub fn read<W: VoxelWorld>(&mut self, world: &mut W, pos: IVec3) -> BlockState {
        self.with_retries(world, pos, |w| w.read_cell(pos))
            .unwrap_or_default()
    }

    /// Liest eine Zelle und lädt vorher neu, wenn sie zu weit vom Lade-Zentrum entfernt ist.
    pub fn read_strict<W: VoxelWorld>(&mut self, world: &mut W, pos: IVec3) -> BlockState {
        let far = match self.loader_center {
            Some(center) => {
                let d = (pos - center).as_dvec3();
                (d.x * d.x + d.z * d.z).sqrt() > self.reload_distance
            }
            None => true,
        };
        if far {
            log::trace!("Lade-Zentrum verschoben nach {pos}");
            self.ensure_loaded(world, pos);
        }
        self.read(world, pos)
    }

    /// Schreibt eine Zelle; `false`, wenn sie nach allen Versuchen unerreichbar blieb.
    pub fn write<W: VoxelWorld>(&mut self, world: &mut W, pos: IVec3, block: &BlockState) -> bool {
        self.with_retries(world, pos, |w| w.write_cell(pos, block))
            .is_some()
    }

    /// Anzahl endgültig fehlgeschlagener Zugriffe.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// `true` genau einmal, nachdem das Wiederholungs-Limit erstmals erreicht wurde.
    pub fn take_exhaustion_notice(&mut self) -> bool {
        std::mem::take(&mut self.exhausted_pending)
    }

    fn with_retries<W: VoxelWorld, T>(
        &mut self,
        world: &mut W,
        pos: IVec3,
        mut op: impl FnMut(&mut W) -> Result<T, WorldAccessError>,
    ) -> Option<T> {
        for attempt in 0..=self.retry_limit {
            match op(&mut *world) {
                Ok(value) => return Some(value),
                Err(e) => {
                    if attempt % self.reload_interval == 0 {
                        log::trace!("{e}, Versuch {}", attempt + 1);
                        self.ensure_loaded(world, pos);
                    }
                }
            }
        }
        self.failures += 1;
        if !self.exhausted_reported {
            log::warn!(
                "Zelle {pos} nach {} Versuchen nicht erreichbar, wird übersprungen",
                self.retry_limit + 1
            );
            self.exhausted_reported = true;
            self.exhausted_pending = true;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChunkKey, VoxelGrid, CHUNK_SIZE};

    #[test]
    fn unloaded_cell_is_loaded_on_retry() {
        let mut grid = VoxelGrid::new();
        let pos = IVec3::new(100, 64, 100);
        grid.set(pos, BlockState::new("minecraft:stone"));
        grid.mark_unloaded(ChunkKey::containing(pos, CHUNK_SIZE));

        let mut access = CellAccess::new(&RasterSettings::default());
        assert_eq!(access.read(&mut grid, pos).id, "minecraft:stone");
        assert_eq!(access.failures(), 0);
        assert!(!access.take_exhaustion_notice());
    }

    #[test]
    fn unreachable_cell_reads_as_air_and_reports_once() {
        let mut grid = VoxelGrid::new();
        let pos = IVec3::new(0, 64, 0);
        grid.set(pos, BlockState::new("minecraft:stone"));
        grid.mark_unreachable(ChunkKey::containing(pos, CHUNK_SIZE));

        let settings = RasterSettings {
            access_retry_limit: 10,
            ..RasterSettings::default()
        };
        let mut access = CellAccess::new(&settings);
        assert!(access.read(&mut grid, pos).is_air());
        assert!(!access.write(&mut grid, pos, &BlockState::air()));
        assert_eq!(access.failures(), 2);
        assert!(access.take_exhaustion_notice());
        assert!(!access.take_exhaustion_notice());
        // Versuche 0, 5, 10 fordern neu an
        assert_eq!(grid.load_request_count(), 6);
    }

    #[test]
    fn strict_read_reloads_when_far_from_center() {
        let mut grid = VoxelGrid::new();
        let mut access = CellAccess::new(&RasterSettings::default());
        access.read_strict(&mut grid, IVec3::ZERO);
        access.read_strict(&mut grid, IVec3::new(10, 0, 10));
        assert_eq!(grid.load_request_count(), 1);
        access.read_strict(&mut grid, IVec3::new(40, 0, 0));
        assert_eq!(grid.load_request_count(), 2);
        assert_eq!(access.loader_center(), Some(IVec3::new(40, 0, 0)));
    }
}
