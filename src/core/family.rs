//! Kurvenfamilien und Drehrichtung.

use serde::{Deserialize, Serialize};

/// Konstruktionsart eines Trassierungs-Segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveFamily {
    /// Einfacher Kreisbogen (Tangente halbiert den Bogen)
    #[default]
    Simple,
    /// Klothoide – Kreisbogen – Klothoide (symmetrisch)
    Spiral,
    /// Korbbogen mit geraden Anlaufkeilen (CWT)
    CompoundTaper,
    /// Dreiteiliger Korbbogen mit festen Radienverhältnissen (RRR)
    ReverseRadius,
    /// Vollkreis (Kreisverkehr) aus Mittelpunkt und Radius-Punkt
    FullCircle,
}

impl CurveFamily {
    /// Kurzkürzel für Feedback-Ausgaben.
    pub fn tag(self) -> &'static str {
        match self {
            CurveFamily::Simple => "Simple",
            CurveFamily::Spiral => "Spi",
            CurveFamily::CompoundTaper => "Cwt",
            CurveFamily::ReverseRadius => "Rrr",
            CurveFamily::FullCircle => "Cir",
        }
    }

    /// Zulässiger Drehwinkel-Bereich in Grad, `None` = unbeschränkt.
    ///
    /// Außerhalb fällt die Konstruktion auf `Simple` zurück.
    pub fn angle_window_deg(self) -> Option<(f64, f64)> {
        match self {
            CurveFamily::Spiral => Some((0.0, 315.0)),
            CurveFamily::CompoundTaper => Some((14.9, 180.1)),
            CurveFamily::ReverseRadius => Some((0.0, 180.1)),
            CurveFamily::Simple | CurveFamily::FullCircle => None,
        }
    }

    /// Liegt `turn_angle_deg` im zulässigen Bereich der Familie?
    pub fn accepts_angle(self, turn_angle_deg: f64) -> bool {
        match self.angle_window_deg() {
            Some((min, max)) => turn_angle_deg >= min && turn_angle_deg <= max,
            None => true,
        }
    }

    /// Kann die Familie punkt-zu-punkt (ohne Ziel-Tangente) gelöst werden?
    pub fn is_chainable(self) -> bool {
        matches!(
            self,
            CurveFamily::Simple | CurveFamily::Spiral | CurveFamily::CompoundTaper
        )
    }

    /// Familien, für die die Reflexwinkel-Korrektur gilt.
    pub fn uses_reflex_correction(self) -> bool {
        matches!(
            self,
            CurveFamily::Spiral | CurveFamily::CompoundTaper | CurveFamily::ReverseRadius
        )
    }
}

/// Drehsinn in der Draufsicht (+Z zeigt nach Süden).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Heading nimmt zu
    Clockwise,
    /// Heading nimmt ab
    CounterClockwise,
}

impl TurnDirection {
    /// Drehsinn aus einer gefalteten Winkeldifferenz.
    pub fn from_diff(diff: f64) -> Self {
        if diff > 0.0 {
            TurnDirection::Clockwise
        } else {
            TurnDirection::CounterClockwise
        }
    }

    /// Vorzeichen für die laterale Achse (+1 im Uhrzeigersinn).
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::Clockwise => 1.0,
            TurnDirection::CounterClockwise => -1.0,
        }
    }

    /// Umgekehrter Drehsinn.
    pub fn flipped(self) -> Self {
        match self {
            TurnDirection::Clockwise => TurnDirection::CounterClockwise,
            TurnDirection::CounterClockwise => TurnDirection::Clockwise,
        }
    }
}
