//! Höhenprofile über einer Bogenlängen-Tabelle.
//!
//! Alle Profile arbeiten auf horizontalen kumulativen Distanzen (erster
//! Eintrag 0) und liefern eine Höhe pro Eintrag. Gesamtlängen unter
//! [`MIN_PROFILE_LENGTH`] ergeben ein flaches Profil auf Starthöhe.

/// Kürzere Profile werden flach ausgegeben.
pub const MIN_PROFILE_LENGTH: f64 = 0.001;
/// Unterhalb dieser Determinante gelten die Apex-Steigungen als unbestimmt.
pub const APEX_SINGULAR_EPSILON: f64 = 1e-9;

/// B(t) = (1-t)²·y0 + 2(1-t)t·cp + t²·y1
fn quadratic(y0: f64, cp: f64, y1: f64, t: f64) -> f64 {
    let inv = 1.0 - t;
    inv * inv * y0 + 2.0 * inv * t * cp + t * t * y1
}

fn total_length(dists: &[f64]) -> f64 {
    dists.last().copied().unwrap_or(0.0)
}

// ── Einzelparabel ───────────────────────────────────────────────

/// Ergebnis von [`single_parabola`].
#[derive(Debug, Clone, PartialEq)]
pub struct SingleParabola {
    pub heights: Vec<f64>,
    /// Steigung am Ende, Start-Steigung des Folgesegments
    pub exit_slope: f64,
    /// Höhe des Bézier-Kontrollpunkts (Mitte der Strecke)
    pub control_elevation: f64,
}

/// Quadratischer Bézier mit Kontrollpunkt `start_y + start_slope·L/2`.
///
/// End-Steigung `2·(Δy/L) − start_slope`; bei L ≈ 0 flach mit unveränderter Steigung.
pub fn single_parabola(start_y: f64, end_y: f64, start_slope: f64, dists: &[f64]) -> SingleParabola {
    let total = total_length(dists);
    if total < MIN_PROFILE_LENGTH {
        return SingleParabola {
            heights: vec![start_y; dists.len()],
            exit_slope: start_slope,
            control_elevation: start_y,
        };
    }
    let control = start_y + start_slope * total / 2.0;
    let heights = dists
        .iter()
        .map(|&d| quadratic(start_y, control, end_y, d / total))
        .collect();
    let chord_slope = (end_y - start_y) / total;
    SingleParabola {
        heights,
        exit_slope: 2.0 * chord_slope - start_slope,
        control_elevation: control,
    }
}

// ── Rampe ───────────────────────────────────────────────────────

/// Ergebnis von [`ramp_two_parabola`].
#[derive(Debug, Clone, PartialEq)]
pub struct RampProfile {
    pub heights: Vec<f64>,
    /// Steigung des geraden Mittelstücks
    pub middle_slope: f64,
}

/// Übergangs- und Geradenlänge sowie Mittel-Steigung der Rampe.
fn ramp_layout(dy: f64, m1: f64, m2: f64, total: f64) -> (f64, f64, f64) {
    let s = dy * dy / total;
    let k = (-s / 2.0).exp();
    let lp = (k + 1.0) * total / 4.0;
    let lt = (2.0 - 2.0 * k) * total / 4.0;
    let mt = (dy - 0.5 * lp * (m1 + m2)) / (lp + lt);
    (lp, lt, mt)
}

/// Parabel – Gerade – Parabel zwischen den Steigungen `m1` und `m2`.
///
/// Die Mittel-Steigung erhält den Gesamt-Höhenunterschied (geschlossene Form).
pub fn ramp_two_parabola(y_start: f64, y_end: f64, m1: f64, m2: f64, dists: &[f64]) -> RampProfile {
    let total = total_length(dists);
    if total < MIN_PROFILE_LENGTH {
        return RampProfile {
            heights: vec![y_start; dists.len()],
            middle_slope: 0.0,
        };
    }
    let (lp, lt, mt) = ramp_layout(y_end - y_start, m1, m2, total);

    let x2 = lp;
    let x3 = x2 + lt;
    let y1 = y_start;
    let y2 = y1 + (m1 + mt) / 2.0 * lp;
    let y3 = y2 + mt * lt;
    let cp1 = y1 + m1 * x2 / 2.0;
    let cp2 = y3 + mt * (total - x3) / 2.0;

    let heights = dists
        .iter()
        .map(|&d| {
            if d <= x2 {
                quadratic(y1, cp1, y2, d / x2)
            } else if d <= x3 {
                y2 + (y3 - y2) * (d - x2) / lt
            } else {
                quadratic(y3, cp2, y_end, (d - x3) / lp)
            }
        })
        .collect();
    RampProfile {
        heights,
        middle_slope: mt,
    }
}

// ── Fünf-Segment-Apex ───────────────────────────────────────────

/// Längen der fünf Apex-Segmente (Parabel, Gerade, Parabel, Gerade, Parabel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApexSegments {
    pub lengths: [f64; 5],
}

impl ApexSegments {
    /// Aufteilung der Gesamtlänge abhängig von |Apex-Höhe|.
    pub fn from_total(total: f64, apex_height: f64) -> Self {
        let h = apex_height.abs();
        let k = (-(2.0 * h * h / total) / 2.0).exp();
        let lead = (14.0 + 16.0 * k) * total / 105.0;
        let tangent = (21.0 - 21.0 * k) * total / 105.0;
        let crest = (35.0 + 10.0 * k) * total / 105.0;
        Self {
            lengths: [lead, tangent, crest, tangent, lead],
        }
    }

    /// Koeffizienten `(KA, KB, KC, KD)` des 2×2-Systems.
    fn coefficients(&self) -> (f64, f64, f64, f64) {
        let [l1, l2, l3, l4, l5] = self.lengths;
        let ka = l1 / 2.0 + l2 + l3 / 2.0;
        let kb = l3 / 2.0 + l4 + l5 / 2.0;
        let kc = l1 / 2.0 + l2 + 3.0 * l3 / 8.0;
        let kd = l3 / 8.0;
        (ka, kb, kc, kd)
    }

    /// Determinante des Steigungs-Systems.
    pub fn determinant(&self) -> f64 {
        let (ka, kb, kc, kd) = self.coefficients();
        ka * kd - kb * kc
    }
}

/// Löst die inneren Steigungen `(inbound, outbound)`.
///
/// Bedingungen: Gesamt-Höhenunterschied `dy` und Höhe `apex_height` in der
/// Scheitelmitte. Bei |det| < 1e-9 beide 0.
pub fn solve_apex_slopes(
    segments: &ApexSegments,
    dy: f64,
    m1: f64,
    m2: f64,
    apex_height: f64,
) -> (f64, f64) {
    let [l1, _, _, _, l5] = segments.lengths;
    let (ka, kb, kc, kd) = segments.coefficients();
    let rhs1 = dy - m1 * l1 / 2.0 - m2 * l5 / 2.0;
    let rhs2 = apex_height - m1 * l1 / 2.0;
    let det = ka * kd - kb * kc;
    if det.abs() < APEX_SINGULAR_EPSILON {
        log::debug!("Apex-System singulär (det={det:e}), Steigungen 0");
        return (0.0, 0.0);
    }
    (
        (rhs1 * kd - rhs2 * kb) / det,
        (ka * rhs2 - kc * rhs1) / det,
    )
}

/// Ergebnis von [`five_segment_apex`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApexProfile {
    pub heights: Vec<f64>,
    pub inbound_slope: f64,
    pub outbound_slope: f64,
}

/// Parabel–Gerade–Parabel–Gerade–Parabel mit vorgegebener Scheitelhöhe.
pub fn five_segment_apex(
    y_start: f64,
    y_end: f64,
    m1: f64,
    m2: f64,
    apex_height: f64,
    dists: &[f64],
) -> ApexProfile {
    let total = total_length(dists);
    if total < MIN_PROFILE_LENGTH {
        return ApexProfile {
            heights: vec![y_start; dists.len()],
            inbound_slope: 0.0,
            outbound_slope: 0.0,
        };
    }
    let segments = ApexSegments::from_total(total, apex_height);
    let (m_in, m_out) = solve_apex_slopes(&segments, y_end - y_start, m1, m2, apex_height);
    let [l1, l2, l3, l4, l5] = segments.lengths;

    let x1 = l1;
    let x2 = x1 + l2;
    let x3 = x2 + l3;
    let x4 = x3 + l4;

    let y0 = y_start;
    let y1 = y0 + (m1 + m_in) / 2.0 * l1;
    let y2 = y1 + m_in * l2;
    let y3 = y2 + (m_in + m_out) / 2.0 * l3;
    let y4 = y3 + m_out * l4;
    let cp1 = y0 + m1 * l1 / 2.0;
    let cp2 = y2 + m_in * l3 / 2.0;
    let cp3 = y4 + m_out * l5 / 2.0;

    let heights = dists
        .iter()
        .map(|&d| {
            if d <= x1 {
                quadratic(y0, cp1, y1, d / l1)
            } else if d <= x2 {
                y1 + (y2 - y1) * (d - x1) / l2
            } else if d <= x3 {
                quadratic(y2, cp2, y3, (d - x2) / l3)
            } else if d <= x4 {
                y3 + (y4 - y3) * (d - x3) / l4
            } else {
                quadratic(y4, cp3, y_end, (d - x4) / l5)
            }
        })
        .collect();
    ApexProfile {
        heights,
        inbound_slope: m_in,
        outbound_slope: m_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(total: f64, n: usize) -> Vec<f64> {
        (0..=n).map(|i| total * i as f64 / n as f64).collect()
    }

    #[test]
    fn single_parabola_hits_boundaries() {
        let dists = table(37.5, 50);
        let profile = single_parabola(12.0, 4.5, 0.3, &dists);
        assert_relative_eq!(profile.heights[0], 12.0, epsilon = 1e-9);
        assert_relative_eq!(profile.heights[50], 4.5, epsilon = 1e-9);
        assert_relative_eq!(profile.exit_slope, 2.0 * (-7.5 / 37.5) - 0.3, epsilon = 1e-12);
    }

    #[test]
    fn single_parabola_climb_example() {
        let dists = table(20.0, 40);
        let profile = single_parabola(0.0, 10.0, 0.0, &dists);
        // Kontrollpunkt = Start + Steigung·L/2, bei Steigung 0 also Starthöhe
        assert_relative_eq!(profile.control_elevation, 0.0);
        assert_relative_eq!(profile.heights[20], 2.5, epsilon = 1e-12);
        assert_relative_eq!(profile.exit_slope, 1.0);
        assert!(profile.heights.windows(2).all(|w| w[1] >= w[0]));
        assert_relative_eq!(profile.heights[0], 0.0);
        assert_relative_eq!(profile.heights[40], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn single_parabola_degenerate_length_is_flat() {
        let profile = single_parabola(3.0, 9.0, 0.25, &[0.0, 0.0005]);
        assert_eq!(profile.heights, vec![3.0, 3.0]);
        assert_eq!(profile.exit_slope, 0.25);
    }

    #[test]
    fn ramp_hits_boundaries_and_is_continuous() {
        let dists = table(60.0, 600);
        let profile = ramp_two_parabola(70.0, 82.0, 0.0, 0.05, &dists);
        assert_relative_eq!(profile.heights[0], 70.0, epsilon = 1e-9);
        assert_relative_eq!(profile.heights[600], 82.0, epsilon = 1e-9);
        // Keine Sprünge zwischen benachbarten Samples
        let max_jump = profile
            .heights
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max);
        assert!(max_jump < 0.1, "Sprung {max_jump}");
    }

    #[test]
    fn ramp_middle_slope_closed_form() {
        let dists = table(40.0, 10);
        let profile = ramp_two_parabola(0.0, 4.0, 0.0, 0.0, &dists);
        let (lp, lt, mt) = ramp_layout(4.0, 0.0, 0.0, 40.0);
        assert_relative_eq!(profile.middle_slope, mt);
        assert_relative_eq!(mt, 4.0 / (lp + lt), epsilon = 1e-12);
    }

    #[test]
    fn apex_segments_cover_total() {
        let seg = ApexSegments::from_total(90.0, 6.0);
        assert_relative_eq!(seg.lengths.iter().sum::<f64>(), 90.0, epsilon = 1e-9);
        assert_eq!(seg.lengths[0], seg.lengths[4]);
        assert_eq!(seg.lengths[1], seg.lengths[3]);
    }

    #[test]
    fn apex_hits_boundaries() {
        let dists = table(80.0, 800);
        let profile = five_segment_apex(10.0, 10.0, 0.0, 0.0, 5.0, &dists);
        assert_relative_eq!(profile.heights[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(profile.heights[800], 10.0, epsilon = 1e-9);
        let peak = profile.heights.iter().copied().fold(f64::MIN, f64::max);
        assert!(peak > 10.0 + 4.0, "Scheitel {peak}");
        assert!(profile.inbound_slope > 0.0);
        assert!(profile.outbound_slope < 0.0);
    }

    #[test]
    fn apex_singular_system_defaults_to_zero() {
        let seg = ApexSegments {
            lengths: [0.0; 5],
        };
        assert!(seg.determinant().abs() < APEX_SINGULAR_EPSILON);
        assert_eq!(solve_apex_slopes(&seg, 5.0, 0.1, -0.1, 3.0), (0.0, 0.0));
    }

    #[test]
    fn apex_degenerate_length_is_flat() {
        let profile = five_segment_apex(2.0, 8.0, 0.1, 0.1, 3.0, &[0.0]);
        assert_eq!(profile.heights, vec![2.0]);
        assert_eq!((profile.inbound_slope, profile.outbound_slope), (0.0, 0.0));
    }
}
