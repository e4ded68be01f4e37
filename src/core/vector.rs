//! Vektor-Hilfen für die Trassierung (f64, Y = Höhe, XZ = Grundriss).
//!
//! Erweitert `glam::DVec3` um die Grundriss-Operationen, die alle Solver
//! teilen: horizontale Länge, horizontale Normierung, Querrichtung und Heading.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Grundriss-Operationen auf `DVec3` (die Y-Komponente wird ignoriert).
pub trait HorizontalExt {
    /// Länge der XZ-Projektion.
    fn horizontal_length(self) -> f64;
    /// Normierte XZ-Richtung mit `y = 0`; Nullvektor bleibt Nullvektor.
    fn normalize_horizontal(self) -> DVec3;
    /// Senkrechte im Grundriss: `(-z, 0, x)`.
    fn perp_horizontal(self) -> DVec3;
    /// Richtungswinkel `atan2(z, x)` in Radiant.
    fn heading(self) -> f64;
    /// Skalarprodukt nur über X und Z.
    fn dot_horizontal(self, other: DVec3) -> f64;
}

impl HorizontalExt for DVec3 {
    fn horizontal_length(self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    fn normalize_horizontal(self) -> DVec3 {
        let len = self.horizontal_length();
        if len == 0.0 {
            return DVec3::ZERO;
        }
        DVec3::new(self.x / len, 0.0, self.z / len)
    }

    fn perp_horizontal(self) -> DVec3 {
        DVec3::new(-self.z, 0.0, self.x)
    }

    fn heading(self) -> f64 {
        self.z.atan2(self.x)
    }

    fn dot_horizontal(self, other: DVec3) -> f64 {
        self.x * other.x + self.z * other.z
    }
}

/// Einheits-Richtung im Grundriss zu einem Heading.
pub fn from_heading(angle: f64) -> DVec3 {
    DVec3::new(angle.cos(), 0.0, angle.sin())
}

/// Faltet eine Winkeldifferenz in das Intervall (−π, π].
pub fn wrap_angle(mut diff: f64) -> f64 {
    while diff <= -PI {
        diff += 2.0 * PI;
    }
    while diff > PI {
        diff -= 2.0 * PI;
    }
    diff
}

/// Stützpunkt einer berechneten Kurve: Position plus Grundriss-Tangente.
///
/// Tangenten gehören immer zu Samples, nie zu Ankerpunkten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentedPoint {
    /// Weltposition
    pub position: DVec3,
    /// Normierte Fahrtrichtung im Grundriss (`y = 0`)
    pub tangent: DVec3,
}

impl TangentedPoint {
    /// Erstellt einen Stützpunkt.
    pub fn new(position: DVec3, tangent: DVec3) -> Self {
        Self { position, tangent }
    }
}

/// Setzt Sehnen-Tangenten (Richtung zum Nachfolger) und erzwingt analytische Endtangenten.
///
/// Die letzte Position erhält `end_tangent`, die erste `start_tangent`.
pub fn chord_tangents(
    positions: Vec<DVec3>,
    start_tangent: DVec3,
    end_tangent: DVec3,
) -> Vec<TangentedPoint> {
    let count = positions.len();
    let mut points: Vec<TangentedPoint> = Vec::with_capacity(count);
    for (i, &pos) in positions.iter().enumerate() {
        let tangent = match positions.get(i + 1) {
            Some(&next) => {
                let dir = (next - pos).normalize_or_zero();
                if dir == DVec3::ZERO {
                    // Doppelter Punkt: Richtung des Vorgängers übernehmen
                    points.last().map(|p| p.tangent).unwrap_or(start_tangent)
                } else {
                    dir
                }
            }
            None => end_tangent,
        };
        points.push(TangentedPoint::new(pos, tangent));
    }
    if let Some(first) = points.first_mut() {
        first.tangent = start_tangent;
    }
    if let Some(last) = points.last_mut() {
        last.tangent = end_tangent;
    }
    points
}

/// Summe der 3D-Abstände aufeinanderfolgender Positionen.
pub fn polyline_length(points: &[TangentedPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].position.distance(w[1].position))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn horizontal_length_ignores_height() {
        let v = DVec3::new(3.0, 100.0, 4.0);
        assert_relative_eq!(v.horizontal_length(), 5.0);
        assert_relative_eq!(v.normalize_horizontal().length(), 1.0);
        assert_eq!(v.normalize_horizontal().y, 0.0);
    }

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(DVec3::ZERO.normalize_horizontal(), DVec3::ZERO);
        assert_eq!(DVec3::new(0.0, 5.0, 0.0).normalize_horizontal(), DVec3::ZERO);
    }

    #[test]
    fn perp_is_quarter_turn() {
        let t = DVec3::X;
        let n = t.perp_horizontal();
        assert_eq!(n, DVec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(n.dot_horizontal(t), 0.0);
    }

    #[test]
    fn wrap_angle_keeps_half_open_interval() {
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn chord_tangents_force_endpoints() {
        let positions = vec![DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), DVec3::new(2.0, 0.0, 0.0)];
        let points = chord_tangents(positions, DVec3::X, DVec3::Z);
        assert_eq!(points[0].tangent, DVec3::X);
        assert_eq!(points[2].tangent, DVec3::Z);
        assert_relative_eq!(points[1].tangent.x, 1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(points[1].tangent.z, -1.0 / 2f64.sqrt(), epsilon = 1e-12);
    }
}
