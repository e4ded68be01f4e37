//! Trassierungs-Geometrie: Grundriss-Solver, Höhenprofile, Komposition und Abtastung.
//!
//! Alle Funktionen sind reine Funktionen über expliziten Parametern; es gibt
//! keinen geteilten Zustand.

pub mod composer;
pub mod horizontal;
pub mod sampler;
pub mod stats;
pub mod unit_curves;
pub mod vertical;

pub use composer::{
    compose, BoundaryVector, CurveRequest, CurveResult, CurveWarning, ProfileMode,
};
pub use horizontal::{
    compound_taper, full_circle, reverse_radius, simple_arc, spiral, tangent_intersection,
};
pub use sampler::PathSampler;
pub use stats::{ArcStats, CircleStats, CurveStats, IntermediateSlopes};
pub use vertical::{
    five_segment_apex, ramp_two_parabola, single_parabola, solve_apex_slopes, ApexProfile,
    ApexSegments, RampProfile, SingleParabola,
};

use crate::core::{CurveFamily, TangentedPoint};
use glam::DVec3;

/// Fehler einer Kurven-Berechnung (segmentweise, ohne Teil-Ergebnis).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// Sehne oder Tangente hat (horizontal) die Länge 0
    #[error("Geometrie degeneriert: {reason}")]
    GeometryDegenerate { reason: String },
    /// Anfrage enthält keine berechenbaren Segmente
    #[error("Anfrage ohne Segmente")]
    EmptyRequest,
}

impl CurveError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        CurveError::GeometryDegenerate {
            reason: reason.into(),
        }
    }
}

/// Ergebnis eines Grundriss-Solvers (alle Punkte auf Starthöhe).
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalCurve {
    /// Stützpunkte mit Sehnen-Tangenten, Endpunkte analytisch
    pub points: Vec<TangentedPoint>,
    /// Analytische Tangente am Ende
    pub end_tangent: DVec3,
    /// Bogenlänge laut Konstruktion
    pub arc_length: f64,
    /// Tatsächlich verwendete Konstruktion (nach Fallbacks)
    pub family: CurveFamily,
}

impl HorizontalCurve {
    /// Letzte Position (Kurven-Ende).
    pub fn end_position(&self) -> Option<DVec3> {
        self.points.last().map(|p| p.position)
    }
}
