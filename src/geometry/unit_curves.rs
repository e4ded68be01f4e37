//! Konstruktionen im Einheitsraum und ihre Transformation in die Welt.
//!
//! Einheitsraum: Start im Ursprung, Start-Tangente entlang +x, Drehung nach +y.
//! Die Welt-Transformation skaliert, dreht um das Start-Heading und spiegelt
//! die Querachse je nach Drehsinn.

use glam::{DVec2, DVec3};

use super::CurveError;
use crate::core::{chord_tangents, HorizontalExt, TangentedPoint, TurnDirection};

/// Halber Keilwinkel der CWT-Anläufe: atan(1/8).
pub fn taper_angle() -> f64 {
    (1.0f64 / 8.0).atan()
}

/// Verhältnis Klothoide/Bogen abhängig vom Drehwinkel (Grad), `None` = nicht unterstützt.
pub fn spiral_ratio(theta_deg: f64) -> Option<f64> {
    if theta_deg <= 91.0 {
        Some(1.0 / 3.0)
    } else if theta_deg <= 181.0 {
        Some(1.0 / 4.0)
    } else if theta_deg <= 271.0 {
        Some(1.0 / 6.0)
    } else if theta_deg <= 315.0 {
        Some(1.0 / 8.0)
    } else {
        None
    }
}

/// Einheitskreisbogen mit 40 Schritten: `(sin t, 1 − cos t)`.
pub fn unit_arc(theta: f64) -> Vec<DVec2> {
    const STEPS: usize = 40;
    (0..=STEPS)
        .map(|i| {
            let t = i as f64 / STEPS as f64 * theta;
            DVec2::new(t.sin(), 1.0 - t.cos())
        })
        .collect()
}

/// Symmetrische Klothoide–Bogen–Klothoide-Konstruktion (Einheitsradius 1).
///
/// `None`, wenn der Drehwinkel außerhalb der Verhältnis-Tabelle liegt.
pub fn unit_spiral(theta: f64) -> Option<Vec<DVec2>> {
    const SPIRAL_STEPS: usize = 40;
    const ARC_STEPS: usize = 20;

    let ratio = spiral_ratio(theta.to_degrees())?;
    let tau_s = ratio * theta / (2.0 * (1.0 - ratio));
    if tau_s * 2.0 >= theta {
        return None;
    }

    // Klothoide: Mittelpunktregel, τ(t) = t²·τs / Ls²
    let spiral_len = 2.0 * tau_s;
    let dt = spiral_len / SPIRAL_STEPS as f64;
    let mut points = Vec::with_capacity(2 * (SPIRAL_STEPS + ARC_STEPS) + 1);
    let mut cursor = DVec2::ZERO;
    points.push(cursor);
    for i in 1..=SPIRAL_STEPS {
        let t_mid = (i as f64 - 0.5) * dt;
        let tau = t_mid * t_mid * tau_s / (spiral_len * spiral_len);
        cursor += DVec2::new(tau.cos(), tau.sin()) * dt;
        points.push(cursor);
    }

    // Halber Kreisbogen bis zur Kurvenmitte
    let center = cursor + DVec2::new(-tau_s.sin(), tau_s.cos());
    let half_sweep = (theta - 2.0 * tau_s) / 2.0;
    for i in 1..=ARC_STEPS {
        let angle = tau_s + (i as f64 / ARC_STEPS as f64) * half_sweep;
        points.push(center + DVec2::new(angle.sin(), -angle.cos()));
    }

    // Zweite Hälfte: Spiegelung an der Normalen durch die Mitte
    let mid = *points.last()?;
    let axis = tau_s + half_sweep + std::f64::consts::FRAC_PI_2;
    let to_axis = DVec2::from_angle(-axis);
    let from_axis = DVec2::from_angle(axis);
    for i in (0..points.len() - 1).rev() {
        let local = to_axis.rotate(points[i] - mid);
        let mirrored = from_axis.rotate(DVec2::new(local.x, -local.y));
        points.push(mid + mirrored);
    }
    Some(points)
}

/// Korbbogen mit geraden Anläufen (Keilwinkel β, Einheitslänge 1).
///
/// Der Aufrufer prüft das Winkelfenster.
pub fn unit_compound_taper(theta: f64) -> Vec<DVec2> {
    const TAPER_STEPS: usize = 10;
    const ARC_STEPS: usize = 30;

    let beta = taper_angle();
    let sweep = theta - 2.0 * beta;
    let radius = 1.0 / (sweep / 2.0).tan();

    let mut points = Vec::with_capacity(2 * TAPER_STEPS + ARC_STEPS + 1);
    let taper_end = DVec2::new(beta.cos(), beta.sin());
    points.push(DVec2::ZERO);
    for i in 1..=TAPER_STEPS {
        points.push(taper_end * (i as f64 / TAPER_STEPS as f64));
    }

    let center = taper_end + DVec2::new(-beta.sin(), beta.cos()) * radius;
    let start_angle = beta - std::f64::consts::FRAC_PI_2;
    for i in 1..=ARC_STEPS {
        let angle = start_angle + (i as f64 / ARC_STEPS as f64) * sweep;
        points.push(center + DVec2::from_angle(angle) * radius);
    }

    let arc_end = points[points.len() - 1];
    let exit = DVec2::from_angle(theta - beta);
    for i in 1..=TAPER_STEPS {
        points.push(arc_end + exit * (i as f64 / TAPER_STEPS as f64));
    }
    points
}

/// Dreiteiliger Korbbogen mit festen Radienverhältnissen.
///
/// Radien `93−30k`, `38−24k`, `51+54k` mit `k = θ/π`, Teilwinkel θ/6, 2θ/3, θ/6.
pub fn unit_reverse_radius(theta: f64) -> Vec<DVec2> {
    const STEPS: usize = 15;

    let k = theta / std::f64::consts::PI;
    let radii = [93.0 - 30.0 * k, 38.0 - 24.0 * k, 51.0 + 54.0 * k];
    let sweeps = [theta / 6.0, 2.0 * theta / 3.0, theta / 6.0];

    let mut points = Vec::with_capacity(3 * STEPS + 1);
    points.push(DVec2::ZERO);
    let mut heading: f64 = 0.0;
    for (radius, sweep) in radii.into_iter().zip(sweeps) {
        let last = points[points.len() - 1];
        let center = last - DVec2::new(heading.sin(), -heading.cos()) * radius;
        let start_angle = heading - std::f64::consts::FRAC_PI_2;
        for i in 1..=STEPS {
            let angle = start_angle + (i as f64 / STEPS as f64) * sweep;
            points.push(center + DVec2::from_angle(angle) * radius);
        }
        heading += sweep;
    }
    points
}

/// Einheitspunkt → Weltposition (Skalierung, Querachsen-Spiegelung, Drehung, Verschiebung).
fn unit_to_world(p: DVec2, scale: f64, heading: f64, direction: TurnDirection, origin: DVec3) -> DVec3 {
    let local = DVec2::new(p.x * scale, p.y * scale * direction.sign());
    let rotated = DVec2::from_angle(heading).rotate(local);
    DVec3::new(origin.x + rotated.x, origin.y, origin.z + rotated.y)
}

/// Skaliert eine symmetrische Einheitskonstruktion auf die reale Sehne.
///
/// Die Einheits-Sehne muss unter θ/2 zur Start-Tangente liegen; dann landet
/// der letzte Punkt exakt auf dem Sehnen-Endpunkt.
pub fn place_on_chord(
    unit: &[DVec2],
    start: DVec3,
    chord_length: f64,
    start_tangent: DVec3,
    direction: TurnDirection,
) -> Result<Vec<DVec3>, CurveError> {
    let unit_chord = unit.last().map_or(0.0, |p| p.length());
    if unit_chord < 1e-9 {
        return Err(CurveError::degenerate("Einheitskonstruktion ohne Ausdehnung"));
    }
    let scale = chord_length / unit_chord;
    let heading = start_tangent.heading();
    Ok(unit
        .iter()
        .map(|&p| unit_to_world(p, scale, heading, direction, start))
        .collect())
}

/// Gemeinsame Sehnen-Einpassung: skaliert so, dass das Ende auf der Ziel-Tangentenlinie liegt.
///
/// - `target_ref`: ein Punkt der Ziel-Tangentenlinie (Schnittpunkt oder Zielvektor-Start)
/// - `theta`: Drehwinkel der Einheitskonstruktion
///
/// Der Drehsinn folgt der gefalteten Heading-Differenz Ziel − Start.
pub fn fit_unit_curve(
    unit: &[DVec2],
    start: DVec3,
    target_ref: DVec3,
    start_tangent: DVec3,
    target_tangent: DVec3,
    theta: f64,
) -> Result<Vec<TangentedPoint>, CurveError> {
    let offset = start - target_ref;
    let real_offset = offset.dot_horizontal(target_tangent.perp_horizontal()).abs();

    let unit_end = unit.last().copied().unwrap_or(DVec2::ZERO);
    let unit_offset = (theta.sin() * unit_end.x - theta.cos() * unit_end.y).abs();
    if unit_offset < 1e-9 {
        return Err(CurveError::degenerate(
            "Einheitskonstruktion ohne Querversatz zur Ziel-Tangente",
        ));
    }
    let scale = real_offset / unit_offset;

    let start_heading = start_tangent.heading();
    let diff = crate::core::wrap_angle(target_tangent.heading() - start_heading);
    let direction = TurnDirection::from_diff(diff);

    let positions = unit
        .iter()
        .map(|&p| unit_to_world(p, scale, start_heading, direction, start))
        .collect();
    Ok(chord_tangents(positions, start_tangent, target_tangent))
}
