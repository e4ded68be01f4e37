//! Abtastung eines Pfads nach Bogenlänge.

use glam::DVec3;

use crate::core::TangentedPoint;

/// Interpoliert Position und Tangente entlang einer Distanz-Tabelle.
///
/// `distances` ist kumulativ und nicht fallend, gleich lang wie `points`.
#[derive(Debug, Clone, Copy)]
pub struct PathSampler<'a> {
    points: &'a [TangentedPoint],
    distances: &'a [f64],
}

impl<'a> PathSampler<'a> {
    pub fn new(points: &'a [TangentedPoint], distances: &'a [f64]) -> Self {
        let len = points.len().min(distances.len());
        Self {
            points: &points[..len],
            distances: &distances[..len],
        }
    }

    /// Gesamtlänge (letzter Tabelleneintrag).
    pub fn total_length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TangentedPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TangentedPoint> {
        self.points.last()
    }

    /// Position und Tangente bei Bogenlänge `d` (geklemmt auf [0, Gesamtlänge]).
    ///
    /// Die Tangente wird linear gemischt und horizontal normiert; verschwindet
    /// die Mischung, gilt die Tangente des unteren Stützpunkts.
    pub fn sample_at(&self, d: f64) -> Option<TangentedPoint> {
        let (first, last) = (self.points.first()?, self.points.last()?);
        if d <= 0.0 || self.points.len() == 1 {
            return Some(*first);
        }
        if d >= self.total_length() {
            return Some(*last);
        }

        // Erster Index mit distances[i] > d, Segment [i-1, i]
        let upper = self.distances.partition_point(|&x| x <= d);
        let upper = upper.clamp(1, self.points.len() - 1);
        let lower = upper - 1;

        let (a, b) = (self.points[lower], self.points[upper]);
        let span = self.distances[upper] - self.distances[lower];
        let t = if span > 0.0 {
            (d - self.distances[lower]) / span
        } else {
            0.0
        };
        let position = a.position.lerp(b.position, t);
        let blended = a.tangent.lerp(b.tangent, t);
        let blended = DVec3::new(blended.x, 0.0, blended.z);
        let tangent = if blended.length_squared() > 1e-18 {
            blended.normalize()
        } else {
            a.tangent
        };
        Some(TangentedPoint::new(position, tangent))
    }
}
