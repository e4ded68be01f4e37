//! Job-Datei der Kommandozeile: Kurven-Anfrage, Vorlage und Platzierungs-Regel.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::CurveRequest;
use crate::raster::{PlacementPolicy, TemplateSource};

/// Inhalt einer `job.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    pub request: CurveRequest,
    pub template: TemplateSource,
    #[serde(default)]
    pub policy: PlacementPolicy,
}

impl JobFile {
    /// Lädt eine Job-Datei (TOML, bei Endung `.json` JSON).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Job-Datei nicht lesbar: {}", path.display()))?;
        let job = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Job-Datei fehlerhaft (JSON): {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Job-Datei fehlerhaft (TOML): {}", path.display()))?
        };
        log::info!("Job geladen aus: {}", path.display());
        Ok(job)
    }
}
