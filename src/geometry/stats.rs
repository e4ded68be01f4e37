//! Statistik einer berechneten Kurve (eine Variante pro Familie).

use serde::{Deserialize, Serialize};

use crate::core::CurveFamily;

/// Zwischen-Steigungen des gewählten Höhenprofils.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntermediateSlopes {
    /// Einzelparabel: keine Zwischen-Steigung
    #[default]
    None,
    /// Rampe: Steigung des Mittelstücks
    Ramp { middle: f64 },
    /// Apex: Steigungen vor und nach dem Scheitel
    Apex { inbound: f64, outbound: f64 },
}

/// Kennwerte eines Bogen-Segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcStats {
    /// Effektiver Radius, `f64::INFINITY` bei θ ≈ 0 (serialisiert als `null`)
    #[serde(with = "unbounded", default = "unbounded::infinite")]
    pub radius: f64,
    /// Drehwinkel in Grad
    pub turn_angle_deg: f64,
    /// Länge
    pub length: f64,
    /// Höhenunterschied (bei Apex-Profilen die Scheitelhöhe)
    pub height_delta: f64,
    pub start_slope: f64,
    pub end_slope: f64,
    pub intermediate: IntermediateSlopes,
}

/// Kennwerte eines Vollkreises.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleStats {
    pub radius: f64,
    /// Umfang
    pub length: f64,
}

/// Statistik je Kurvenfamilie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CurveStats {
    Simple(ArcStats),
    Spiral(ArcStats),
    CompoundTaper(ArcStats),
    ReverseRadius(ArcStats),
    FullCircle(CircleStats),
}

impl CurveStats {
    /// Statistik für eine Bogen-Familie. `FullCircle` wird als `Simple` geführt.
    pub fn arc(family: CurveFamily, stats: ArcStats) -> Self {
        match family {
            CurveFamily::Spiral => CurveStats::Spiral(stats),
            CurveFamily::CompoundTaper => CurveStats::CompoundTaper(stats),
            CurveFamily::ReverseRadius => CurveStats::ReverseRadius(stats),
            CurveFamily::Simple | CurveFamily::FullCircle => CurveStats::Simple(stats),
        }
    }

    /// Familie der Statistik.
    pub fn family(&self) -> CurveFamily {
        match self {
            CurveStats::Simple(_) => CurveFamily::Simple,
            CurveStats::Spiral(_) => CurveFamily::Spiral,
            CurveStats::CompoundTaper(_) => CurveFamily::CompoundTaper,
            CurveStats::ReverseRadius(_) => CurveFamily::ReverseRadius,
            CurveStats::FullCircle(_) => CurveFamily::FullCircle,
        }
    }

    /// Bogen-Kennwerte, falls kein Vollkreis.
    pub fn as_arc(&self) -> Option<&ArcStats> {
        match self {
            CurveStats::Simple(s)
            | CurveStats::Spiral(s)
            | CurveStats::CompoundTaper(s)
            | CurveStats::ReverseRadius(s) => Some(s),
            CurveStats::FullCircle(_) => None,
        }
    }

    /// Radius (Bogen oder Kreis).
    pub fn radius(&self) -> f64 {
        match self {
            CurveStats::FullCircle(c) => c.radius,
            _ => self.as_arc().map_or(f64::INFINITY, |s| s.radius),
        }
    }

    /// Länge (Bogen oder Kreis).
    pub fn length(&self) -> f64 {
        match self {
            CurveStats::FullCircle(c) => c.length,
            _ => self.as_arc().map_or(0.0, |s| s.length),
        }
    }
}

/// Unendliche Werte als `null` bzw. fehlendes Feld.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn infinite() -> f64 {
        f64::INFINITY
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Effektiver Radius aus Sehne und Drehwinkel, ∞ für θ ≤ 0.001.
pub fn effective_radius(chord_length: f64, theta: f64) -> f64 {
    if theta > 0.001 {
        (chord_length / 2.0) / (theta / 2.0).sin()
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_infinite_for_straight() {
        assert!(effective_radius(10.0, 0.0).is_infinite());
        let r = effective_radius(2f64.sqrt() * 10.0, std::f64::consts::FRAC_PI_2);
        assert!((r - 10.0).abs() < 1e-9);
    }

    #[test]
    fn infinite_radius_survives_json() {
        let stats = CurveStats::arc(
            CurveFamily::Simple,
            ArcStats {
                radius: f64::INFINITY,
                turn_angle_deg: 0.0,
                length: 20.0,
                height_delta: 0.0,
                start_slope: 0.0,
                end_slope: 0.0,
                intermediate: IntermediateSlopes::None,
            },
        );
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"radius\":null"), "{json}");
        let back: CurveStats = serde_json::from_str(&json).unwrap();
        assert!(back.radius().is_infinite());

        let finite: CurveStats =
            serde_json::from_str(&json.replace("null", "12.5")).unwrap();
        assert_eq!(finite.radius(), 12.5);
    }

    #[test]
    fn stats_dispatch_by_family() {
        let arc = ArcStats {
            radius: 12.0,
            turn_angle_deg: 45.0,
            length: 9.4,
            height_delta: 1.0,
            start_slope: 0.0,
            end_slope: 0.1,
            intermediate: IntermediateSlopes::None,
        };
        let stats = CurveStats::arc(CurveFamily::CompoundTaper, arc);
        assert_eq!(stats.family(), CurveFamily::CompoundTaper);
        assert_eq!(stats.radius(), 12.0);
        let circle = CurveStats::FullCircle(CircleStats {
            radius: 3.0,
            length: 18.85,
        });
        assert!(circle.as_arc().is_none());
        assert_eq!(circle.length(), 18.85);
    }
}
