//! Zentrale Konfiguration für den Curve Road Builder.
//!
//! `BuilderOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use crate::raster::RasterSettings;

// ── Zeitscheiben ────────────────────────────────────────────────────

/// Zeitbudget pro `advance`-Aufruf in Millisekunden.
pub const TIME_BUDGET_MS: u64 = 30;

// ── Abtastung ───────────────────────────────────────────────────────

/// Pfadlänge pro Batch (Blöcke).
pub const BATCH_DISTANCE: f64 = 32.0;
/// Abtast-Schrittweite entlang des Pfads.
pub const STEP_SIZE: f64 = 0.1;
/// Clip-Bereich an Anfang und Ende.
pub const CLIP_MARGIN: f64 = 2.0;
/// Toleranz der Tangenten-Ebenen beim Clipping.
pub const CLIP_TOLERANCE: f64 = 0.01;

// ── Gitter-Zugriff ──────────────────────────────────────────────────

/// Kantenlänge der Schreib-Gruppen.
pub const CHUNK_TILE: i32 = 16;
/// Maximale Wiederholungen pro Zellzugriff.
pub const ACCESS_RETRY_LIMIT: usize = 100;
/// Jede n-te Wiederholung fordert die Region neu an.
pub const RELOAD_INTERVAL: usize = 5;
/// Radius der Lade-Anforderungen.
pub const LOADER_RADIUS: i32 = 32;
/// Abstand zum Lade-Zentrum, ab dem beim Kopieren neu geladen wird.
pub const RELOAD_DISTANCE: f64 = 32.0;

// ── Undo / Rückmeldung ──────────────────────────────────────────────

/// Maximale Undo-Einträge pro Rasterung.
pub const UNDO_CAPACITY: usize = 10_000;
/// Fortschrittsmeldung alle n Prozent.
pub const PROGRESS_STEP_PERCENT: u32 = 10;

/// Laufzeit-Optionen (TOML-Datei neben der Binary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderOptions {
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,
    #[serde(default = "default_batch_distance")]
    pub batch_distance: f64,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    #[serde(default = "default_clip_margin")]
    pub clip_margin: f64,
    #[serde(default = "default_clip_tolerance")]
    pub clip_tolerance: f64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_access_retry_limit")]
    pub access_retry_limit: usize,
    #[serde(default = "default_reload_interval")]
    pub reload_interval: usize,
    #[serde(default = "default_loader_radius")]
    pub loader_radius: i32,
    #[serde(default = "default_reload_distance")]
    pub reload_distance: f64,
    #[serde(default = "default_undo_capacity")]
    pub undo_capacity: usize,
    #[serde(default = "default_progress_step_percent")]
    pub progress_step_percent: u32,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            time_budget_ms: TIME_BUDGET_MS,
            batch_distance: BATCH_DISTANCE,
            step_size: STEP_SIZE,
            clip_margin: CLIP_MARGIN,
            clip_tolerance: CLIP_TOLERANCE,
            chunk_size: CHUNK_TILE,
            access_retry_limit: ACCESS_RETRY_LIMIT,
            reload_interval: RELOAD_INTERVAL,
            loader_radius: LOADER_RADIUS,
            reload_distance: RELOAD_DISTANCE,
            undo_capacity: UNDO_CAPACITY,
            progress_step_percent: PROGRESS_STEP_PERCENT,
        }
    }
}

fn default_time_budget_ms() -> u64 {
    TIME_BUDGET_MS
}
fn default_batch_distance() -> f64 {
    BATCH_DISTANCE
}
fn default_step_size() -> f64 {
    STEP_SIZE
}
fn default_clip_margin() -> f64 {
    CLIP_MARGIN
}
fn default_clip_tolerance() -> f64 {
    CLIP_TOLERANCE
}
fn default_chunk_size() -> i32 {
    CHUNK_TILE
}
fn default_access_retry_limit() -> usize {
    ACCESS_RETRY_LIMIT
}
fn default_reload_interval() -> usize {
    RELOAD_INTERVAL
}
fn default_loader_radius() -> i32 {
    LOADER_RADIUS
}
fn default_reload_distance() -> f64 {
    RELOAD_DISTANCE
}
fn default_undo_capacity() -> usize {
    UNDO_CAPACITY
}
fn default_progress_step_percent() -> u32 {
    PROGRESS_STEP_PERCENT
}

impl BuilderOptions {
    /// Lädt Optionen aus einer TOML-Datei, Fallback auf Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("curve_road_builder"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("curve_road_builder.toml")
    }

    /// Zeitbudget pro Zeitscheibe.
    pub fn time_budget(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.time_budget_ms)
    }

    /// Raster-Parameter mit der Standard-Platzierungsregel.
    ///
    /// Ungültige Werte (Schrittweite ≤ 0, Kachel ≤ 0) werden auf die Defaults gesetzt.
    pub fn raster_settings(&self) -> RasterSettings {
        let step_size = if self.step_size > 0.0 {
            self.step_size
        } else {
            STEP_SIZE
        };
        RasterSettings {
            batch_distance: self.batch_distance.max(step_size),
            step_size,
            undo_capacity: self.undo_capacity,
            chunk_size: if self.chunk_size > 0 {
                self.chunk_size
            } else {
                CHUNK_TILE
            },
            access_retry_limit: self.access_retry_limit,
            reload_interval: self.reload_interval.max(1),
            loader_radius: self.loader_radius,
            reload_distance: self.reload_distance,
            clip_margin: self.clip_margin,
            clip_tolerance: self.clip_tolerance,
            progress_step_percent: self.progress_step_percent.max(1),
            policy: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_raster_defaults() {
        assert_eq!(BuilderOptions::default().raster_settings(), RasterSettings::default());
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let opts: BuilderOptions = toml::from_str("undo_capacity = 50\nstep_size = 0.25").unwrap();
        assert_eq!(opts.undo_capacity, 50);
        assert_eq!(opts.step_size, 0.25);
        assert_eq!(opts.batch_distance, BATCH_DISTANCE);
        assert_eq!(opts.time_budget().as_millis(), 30);
    }

    #[test]
    fn invalid_step_size_uses_default() {
        let opts = BuilderOptions {
            step_size: 0.0,
            chunk_size: 0,
            ..BuilderOptions::default()
        };
        let settings = opts.raster_settings();
        assert_eq!(settings.step_size, STEP_SIZE);
        assert_eq!(settings.chunk_size, CHUNK_TILE);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("curve_road_builder_missing_options.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(BuilderOptions::load_from_file(&path), BuilderOptions::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "curve_road_builder_options_{}.toml",
            std::process::id()
        ));
        let opts = BuilderOptions {
            undo_capacity: 123,
            ..BuilderOptions::default()
        };
        opts.save_to_file(&path).unwrap();
        assert_eq!(BuilderOptions::load_from_file(&path), opts);
        let _ = std::fs::remove_file(&path);
    }
}
