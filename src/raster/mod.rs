//! Volumen-Rasterung: überträgt eine Querschnitts-Vorlage entlang eines Pfads ins Voxel-Gitter.
//!
//! Ablauf pro Batch: Pfad abtasten → Stimmen sammeln (`votes`) → Gewinner
//! chunkweise schreiben (`batch`) → vorherige Inhalte protokollieren (`undo`).
//! Die Arbeit läuft kooperativ in Zeitscheiben (`task::RasterTask::advance`).

pub mod access;
pub mod batch;
pub mod capture;
pub mod task;
pub mod undo;
pub mod votes;

pub use access::CellAccess;
pub use batch::{PlacementBatch, PlacementPolicy};
pub use capture::RegionCapture;
pub use task::{Advisory, RasterPath, RasterSummary, RasterTask, TaskProgress, TemplateSource};
pub use undo::{UndoEntry, UndoLog};
pub use votes::{TemplateCell, VoteMap};

use crate::core::CHUNK_SIZE;

/// Laufzeit-Parameter einer Rasterung.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSettings {
    /// Pfadlänge pro Batch
    pub batch_distance: f64,
    /// Abtast-Schrittweite entlang des Pfads
    pub step_size: f64,
    /// Maximale Anzahl Undo-Einträge
    pub undo_capacity: usize,
    /// Kachelgröße für die Schreib-Gruppierung
    pub chunk_size: i32,
    /// Maximale Wiederholungen pro Zellzugriff
    pub access_retry_limit: usize,
    /// Jede n-te Wiederholung fordert die Region erneut an
    pub reload_interval: usize,
    /// Radius der Lade-Anforderungen
    pub loader_radius: i32,
    /// Horizontaler Abstand zum letzten Lade-Zentrum, ab dem beim Kopieren neu geladen wird
    pub reload_distance: f64,
    /// Bereich an Anfang und Ende, in dem geclippt wird
    pub clip_margin: f64,
    pub clip_tolerance: f64,
    /// Fortschrittsmeldung alle n Prozent
    pub progress_step_percent: u32,
    pub policy: PlacementPolicy,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            batch_distance: 32.0,
            step_size: 0.1,
            undo_capacity: 10_000,
            chunk_size: CHUNK_SIZE,
            access_retry_limit: 100,
            reload_interval: 5,
            loader_radius: 32,
            reload_distance: 32.0,
            clip_margin: 2.0,
            clip_tolerance: 0.01,
            progress_step_percent: 10,
            policy: PlacementPolicy::default(),
        }
    }
}

impl RasterSettings {
    /// Anzahl Abtastungen pro Batch (mindestens 1).
    pub fn samples_per_batch(&self) -> usize {
        ((self.batch_distance / self.step_size).round() as usize).max(1)
    }
}
