//! Kooperative Rasterungs-Aufgabe: Vorlage kopieren, Pfad batchweise abfahren, schreiben.

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::time::{Duration, Instant};

use super::{
    CellAccess, PlacementBatch, RasterSettings, RegionCapture, UndoEntry, UndoLog, VoteMap,
};
use crate::core::{
    BlockState, ChunkKey, HorizontalExt, SourceRegion, SourceTemplate, TangentedPoint, VoxelWorld,
};
use crate::geometry::{CurveResult, CurveStats, PathSampler};

/// Herkunft der Querschnitts-Vorlage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateSource {
    /// Fertige Vorlage
    Template { template: SourceTemplate },
    /// Wird vor der Platzierung aus dem Gitter kopiert
    Region { region: SourceRegion },
}

/// Abzufahrender Pfad mit Distanz-Tabelle.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPath {
    pub points: Vec<TangentedPoint>,
    pub distances: Vec<f64>,
    /// Anfang und Ende an den End-Tangenten abschneiden
    pub clipping: bool,
}

impl RasterPath {
    pub fn new(points: Vec<TangentedPoint>, distances: Vec<f64>, clipping: bool) -> Self {
        Self {
            points,
            distances,
            clipping,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }
}

impl From<&CurveResult> for RasterPath {
    /// Geschlossene Kreise werden nicht geclippt.
    fn from(result: &CurveResult) -> Self {
        Self::new(
            result.points.clone(),
            result.distances.clone(),
            !matches!(result.stats, CurveStats::FullCircle(_)),
        )
    }
}

/// Ergebnis eines `advance`-Aufrufs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProgress {
    Continue,
    Done,
}

/// Abschluss-Kennzahlen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RasterSummary {
    /// Tatsächlich geänderte Voxel
    pub placed: usize,
    /// Zielzellen mit bereits gleichem Inhalt
    pub unchanged: usize,
    /// Durch `FillEmptyOnly` geschützte Zellen
    pub protected: usize,
    pub undo_entries: usize,
    /// Endgültig fehlgeschlagene Zugriffe
    pub failed_accesses: usize,
    pub batches: usize,
}

/// Hinweise an den Aufrufer (in der Reihenfolge ihres Auftretens).
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    CaptureStarted { cells: usize },
    CaptureFinished { height: usize, width: usize, length: usize },
    /// Kopierte Region ergab keine gültige Vorlage
    CaptureFailed { reason: String },
    PlacementStarted { length: f64 },
    Progress { percent: u32 },
    UndoLimitReached { capacity: usize },
    RetryBudgetExhausted,
    Finished(RasterSummary),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::CaptureStarted { cells } => write!(f, "Kopiere Vorlage ({cells} Zellen)..."),
            Advisory::CaptureFinished {
                height,
                width,
                length,
            } => write!(f, "Vorlage kopiert: {height}x{width}x{length}"),
            Advisory::CaptureFailed { reason } => write!(f, "Vorlage ungültig: {reason}"),
            Advisory::PlacementStarted { length } => {
                write!(f, "Platziere entlang {length:.1} Blöcken...")
            }
            Advisory::Progress { percent } => write!(f, "Fortschritt: {percent}%"),
            Advisory::UndoLimitReached { capacity } => write!(
                f,
                "Undo-Limit ({capacity}) erreicht, weitere Änderungen sind nicht rückgängig machbar"
            ),
            Advisory::RetryBudgetExhausted => {
                write!(f, "Einige Zellen waren nicht erreichbar und wurden übersprungen")
            }
            Advisory::Finished(s) => write!(
                f,
                "Fertig: {} Voxel gesetzt, {} unverändert, {} Undo-Einträge",
                s.placed, s.unchanged, s.undo_entries
            ),
        }
    }
}

#[derive(Debug)]
enum Phase {
    Capture(RegionCapture),
    Place {
        template: SourceTemplate,
        cursor: BatchCursor,
    },
    Done,
}

/// Position innerhalb der Batch-Folge.
#[derive(Debug)]
struct BatchCursor {
    index: usize,
    stage: BatchStage,
}

impl BatchCursor {
    fn start(index: usize, first_sample: usize) -> Self {
        Self {
            index,
            stage: BatchStage::Collect {
                votes: VoteMap::new(),
                next_sample: first_sample,
            },
        }
    }
}

/// Ein Batch sammelt erst alle Stimmen und schreibt dann Chunk für Chunk.
#[derive(Debug)]
enum BatchStage {
    Collect {
        votes: VoteMap,
        next_sample: usize,
    },
    Write {
        chunks: VecDeque<(ChunkKey, Vec<(IVec3, BlockState)>)>,
        tile: i32,
    },
}

/// Genau eine laufende Rasterung pro Sitzung; Abbruch = Drop.
#[derive(Debug)]
pub struct RasterTask {
    path: RasterPath,
    settings: RasterSettings,
    phase: Phase,
    access: CellAccess,
    undo: UndoLog,
    summary: RasterSummary,
    advisories: VecDeque<Advisory>,
    next_progress: u32,
}

impl RasterTask {
    pub fn new(path: RasterPath, source: TemplateSource, settings: RasterSettings) -> Self {
        let mut advisories = VecDeque::new();
        let phase = match source {
            TemplateSource::Template { template } => {
                advisories.push_back(Advisory::PlacementStarted {
                    length: path.total_length(),
                });
                Phase::Place {
                    template,
                    cursor: BatchCursor::start(0, 0),
                }
            }
            TemplateSource::Region { region } => {
                let capture = RegionCapture::new(region);
                advisories.push_back(Advisory::CaptureStarted {
                    cells: capture.total_cells(),
                });
                Phase::Capture(capture)
            }
        };
        Self {
            access: CellAccess::new(&settings),
            undo: UndoLog::new(settings.undo_capacity),
            next_progress: settings.progress_step_percent.max(1),
            path,
            settings,
            phase,
            summary: RasterSummary::default(),
            advisories,
        }
    }

    /// Arbeitet, bis das Zeitbudget verbraucht oder die Aufgabe fertig ist.
    ///
    /// Ein Schritt ist eine Abtastung (Querschnitt) beim Sammeln oder ein Chunk
    /// beim Schreiben; pro Aufruf läuft mindestens ein Schritt.
    pub fn advance<W: VoxelWorld>(&mut self, world: &mut W, budget: Duration) -> TaskProgress {
        let started = Instant::now();
        loop {
            match mem::replace(&mut self.phase, Phase::Done) {
                Phase::Capture(mut capture) => {
                    let complete = capture.step(world, &mut self.access, started, budget);
                    self.flush_access_notice();
                    if complete {
                        self.phase = self.finish_capture(capture);
                    } else {
                        self.phase = Phase::Capture(capture);
                    }
                }
                Phase::Place {
                    template,
                    mut cursor,
                } => {
                    if self.place_step(world, &template, &mut cursor) {
                        self.finish();
                    } else {
                        self.phase = Phase::Place { template, cursor };
                    }
                }
                Phase::Done => return TaskProgress::Done,
            }
            if matches!(self.phase, Phase::Done) {
                return TaskProgress::Done;
            }
            if started.elapsed() >= budget {
                return TaskProgress::Continue;
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Entnimmt alle bisher angefallenen Hinweise.
    pub fn drain_advisories(&mut self) -> impl Iterator<Item = Advisory> + '_ {
        self.advisories.drain(..)
    }

    pub fn summary(&self) -> RasterSummary {
        self.summary
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    pub fn into_undo_log(self) -> UndoLog {
        self.undo
    }

    fn push(&mut self, advisory: Advisory) {
        log::info!("{advisory}");
        self.advisories.push_back(advisory);
    }

    fn flush_access_notice(&mut self) {
        if self.access.take_exhaustion_notice() {
            self.advisories.push_back(Advisory::RetryBudgetExhausted);
        }
    }

    fn finish_capture(&mut self, capture: RegionCapture) -> Phase {
        match capture.finish() {
            Ok(template) => {
                self.push(Advisory::CaptureFinished {
                    height: template.height(),
                    width: template.width(),
                    length: template.length(),
                });
                self.push(Advisory::PlacementStarted {
                    length: self.path.total_length(),
                });
                Phase::Place {
                    template,
                    cursor: BatchCursor::start(0, 0),
                }
            }
            Err(e) => {
                log::warn!("Kopie der Vorlage fehlgeschlagen: {e}");
                self.push(Advisory::CaptureFailed {
                    reason: e.to_string(),
                });
                Phase::Done
            }
        }
    }

    fn finish(&mut self) {
        self.summary.undo_entries = self.undo.len();
        self.summary.failed_accesses = self.access.failures();
        let summary = self.summary;
        self.push(Advisory::Finished(summary));
    }

    fn sample_distance(&self, k: usize) -> f64 {
        -0.5 + k as f64 * self.settings.step_size
    }

    /// Ein Schritt der Platzierung; `true`, wenn der Pfad vollständig abgefahren ist.
    fn place_step<W: VoxelWorld>(
        &mut self,
        world: &mut W,
        template: &SourceTemplate,
        cursor: &mut BatchCursor,
    ) -> bool {
        let end = self.path.total_length() + 0.5;
        let per_batch = self.settings.samples_per_batch();
        let first_sample = cursor.index * per_batch;
        let batch_end = first_sample + per_batch;

        match &mut cursor.stage {
            BatchStage::Collect { votes, next_sample } => {
                if *next_sample == first_sample
                    && (self.path.points.is_empty() || self.sample_distance(first_sample) >= end)
                {
                    return true;
                }
                self.collect_votes(template, *next_sample, votes);
                *next_sample += 1;
                if *next_sample < batch_end && self.sample_distance(*next_sample) < end {
                    return false;
                }

                let batch = self.resolve_votes(template, mem::take(votes));
                log::debug!(
                    "Batch {}: {} Schreibzugriffe in {} Chunks",
                    cursor.index,
                    batch.len(),
                    batch.chunk_count()
                );
                cursor.stage = BatchStage::Write {
                    tile: batch.tile(),
                    chunks: batch.into_chunks().collect(),
                };
                false
            }
            BatchStage::Write { chunks, tile } => {
                if let Some((chunk, writes)) = chunks.pop_front() {
                    self.write_chunk(world, chunk, *tile, writes);
                    self.flush_access_notice();
                    return false;
                }
                self.summary.batches += 1;
                let next = self.sample_distance(batch_end);
                let total = self.path.total_length();
                self.report_progress(((next + 0.5) / (total + 1.0)).clamp(0.0, 1.0));
                if next >= end {
                    return true;
                }
                *cursor = BatchCursor::start(cursor.index + 1, batch_end);
                false
            }
        }
    }

    /// Stimmen eines Querschnitts an Abtastung `k`.
    fn collect_votes(&self, template: &SourceTemplate, k: usize, votes: &mut VoteMap) {
        let (Some(first), Some(last)) = (self.path.points.first(), self.path.points.last()) else {
            return;
        };
        let sampler = PathSampler::new(&self.path.points, &self.path.distances);
        let total = sampler.total_length();
        let d = self.sample_distance(k);
        if d >= total + 0.5 {
            return;
        }
        let clamped = d.clamp(0.0, total);
        let Some(state) = sampler.sample_at(clamped) else {
            return;
        };
        let pivot = template.pivot();
        let margin = self.settings.clip_margin;
        let tolerance = self.settings.clip_tolerance;
        let normal = state.tangent.perp_horizontal().normalize_or_zero();
        let l = (clamped.floor() as usize) % template.length();
        // Kopf-Ebene nur am Anfang, End-Ebene nur am Ende prüfen
        let clip_head = self.path.clipping && d < margin;
        let clip_tail = self.path.clipping && d > total - margin;

        for y in 0..template.height() {
            for w in 0..template.width() {
                let target = state.position
                    + normal * (w as f64 - pivot.center_w)
                    + DVec3::Y * (y as f64 - pivot.axis_y);
                if clip_head && (target - first.position).dot_horizontal(first.tangent) < -tolerance
                {
                    continue;
                }
                if clip_tail && (target - last.position).dot_horizontal(last.tangent) > tolerance {
                    continue;
                }
                votes.cast(target.floor().as_ivec3(), (y, w, l));
            }
        }
    }

    /// Gewinner auflösen und nach Platzierungs-Regel filtern.
    fn resolve_votes(&self, template: &SourceTemplate, votes: VoteMap) -> PlacementBatch {
        let mut batch = PlacementBatch::new(self.settings.chunk_size);
        for (pos, (y, w, l)) in votes.winners() {
            let block = template.cell(y, w, l);
            if self.settings.policy.accepts_source(block) {
                batch.push(pos, block.clone());
            }
        }
        batch
    }

    fn write_chunk<W: VoxelWorld>(
        &mut self,
        world: &mut W,
        chunk: ChunkKey,
        tile: i32,
        writes: Vec<(IVec3, BlockState)>,
    ) {
        let Some(first_y) = writes.first().map(|(pos, _)| pos.y) else {
            return;
        };
        self.access.ensure_loaded(world, chunk.center(tile, first_y));

        for (pos, block) in writes {
            let existing = self.access.read(world, pos);
            if existing == block {
                self.summary.unchanged += 1;
                continue;
            }
            if !self.settings.policy.allows_overwrite(&existing) {
                self.summary.protected += 1;
                continue;
            }
            if !self.access.write(world, pos, &block) {
                continue;
            }
            self.summary.placed += 1;
            let was_limited = self.undo.limit_reached();
            self.undo.record(UndoEntry {
                pos,
                previous: existing,
                placed: block,
            });
            if !was_limited && self.undo.limit_reached() {
                let capacity = self.undo.capacity();
                log::warn!("Undo-Limit ({capacity}) erreicht");
                self.advisories
                    .push_back(Advisory::UndoLimitReached { capacity });
            }
        }
    }

    fn report_progress(&mut self, fraction: f64) {
        let percent = (fraction * 100.0).floor() as u32;
        if percent < self.next_progress {
            return;
        }
        let step = self.settings.progress_step_percent.max(1);
        let reached = percent / step * step;
        self.next_progress = reached + step;
        if reached < 100 {
            self.push(Advisory::Progress { percent: reached });
        }
    }
}
