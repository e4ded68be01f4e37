//! Grundriss-Solver: Kreisbogen, Klothoide, CWT, RRR und Vollkreis.
//!
//! Punkt-zu-Punkt-Solver bekommen Start, Ende und Start-Tangente; der
//! Drehwinkel ergibt sich daraus, dass die Tangente den Bogen halbiert
//! (θ = 2·|Sehnenwinkel − Tangentenwinkel|). Außerhalb ihres Winkelfensters
//! fallen Spiral und CWT auf den einfachen Bogen zurück.

use glam::{DVec2, DVec3};
use std::f64::consts::PI;

use super::unit_curves::{
    fit_unit_curve, place_on_chord, unit_arc, unit_compound_taper, unit_reverse_radius,
    unit_spiral,
};
use super::{CurveError, HorizontalCurve};
use crate::core::{
    chord_tangents, from_heading, polyline_length, wrap_angle, CurveFamily, HorizontalExt,
    TangentedPoint, TurnDirection,
};

/// Sehnen unterhalb dieser Länge gelten als degeneriert.
pub const MIN_CHORD: f64 = 0.01;
/// Drehwinkel (rad), unter dem eine Gerade statt eines Bogens entsteht.
pub const STRAIGHT_THETA: f64 = 0.001;
/// Toleranz für parallele Tangentenlinien.
pub const PARALLEL_EPSILON: f64 = 1e-9;

// ── Sehnen-Analyse ──────────────────────────────────────────────

/// Drehung einer Punkt-zu-Punkt-Anfrage.
#[derive(Debug, Clone, Copy)]
struct ChordTurn {
    chord_length: f64,
    tangent_heading: f64,
    theta: f64,
    direction: TurnDirection,
}

impl ChordTurn {
    fn analyze(start: DVec3, end: DVec3, start_tangent: DVec3) -> Result<Self, CurveError> {
        if start_tangent.horizontal_length() < 1e-12 {
            return Err(CurveError::degenerate("Start-Tangente hat keine Grundriss-Richtung"));
        }
        let chord = end - start;
        let chord_length = chord.horizontal_length();
        if chord_length < MIN_CHORD {
            return Err(CurveError::degenerate(format!(
                "Sehne zu kurz ({chord_length:.4})"
            )));
        }
        let tangent_heading = start_tangent.heading();
        let diff = wrap_angle(chord.heading() - tangent_heading);
        Ok(Self {
            chord_length,
            tangent_heading,
            theta: diff.abs() * 2.0,
            direction: TurnDirection::from_diff(diff),
        })
    }

    fn theta_deg(&self) -> f64 {
        self.theta.to_degrees()
    }

    /// Analytische End-Tangente (Start-Heading ± θ).
    fn end_tangent(&self) -> DVec3 {
        from_heading(self.tangent_heading + self.direction.sign() * self.theta)
    }
}

/// Setzt Start und Ende exakt (Grundriss), die Höhe bleibt auf Starthöhe.
fn pin_endpoints(positions: &mut [DVec3], start: DVec3, end: DVec3) {
    if let Some(first) = positions.first_mut() {
        *first = start;
    }
    if let Some(last) = positions.last_mut() {
        *last = DVec3::new(end.x, start.y, end.z);
    }
}

fn finish(points: Vec<TangentedPoint>, end_tangent: DVec3, family: CurveFamily) -> HorizontalCurve {
    let arc_length = polyline_length(&points);
    HorizontalCurve {
        points,
        end_tangent,
        arc_length,
        family,
    }
}

// ── Punkt-zu-Punkt ──────────────────────────────────────────────

/// Einfacher Kreisbogen, dessen Start-Tangente den Bogen halbiert.
///
/// Schrittzahl `max(20, ceil(Bogenlänge·2))`, gleichmäßige Winkelschritte.
/// Für θ < 0.001 entsteht eine Gerade mit konstanter Tangente.
///
/// Liegt das Ziel exakt auf der Start-Tangente hinter dem Start (θ = 360°),
/// berührt kein Kreis beide Punkte: `GeometryDegenerate`. Jede kleine seitliche
/// Abweichung ergibt eine (große) Schleife.
pub fn simple_arc(
    start: DVec3,
    end: DVec3,
    start_tangent: DVec3,
) -> Result<HorizontalCurve, CurveError> {
    let turn = ChordTurn::analyze(start, end, start_tangent)?;

    if turn.theta < STRAIGHT_THETA {
        let steps = 20usize.max((turn.chord_length * 2.0).ceil() as usize);
        let delta = DVec3::new(end.x - start.x, 0.0, end.z - start.z);
        let points = (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                TangentedPoint::new(start + delta * t, start_tangent)
            })
            .collect::<Vec<_>>();
        return Ok(HorizontalCurve {
            points,
            end_tangent: start_tangent,
            arc_length: turn.chord_length,
            family: CurveFamily::Simple,
        });
    }

    let half_sin = (turn.theta / 2.0).sin();
    if half_sin < 1e-9 {
        return Err(CurveError::degenerate("Ziel liegt genau hinter der Start-Tangente"));
    }
    let radius = (turn.chord_length / 2.0) / half_sin;
    let arc_length = radius * turn.theta;
    let steps = 20usize.max((arc_length * 2.0).ceil() as usize);

    let normal = start_tangent.normalize_horizontal().perp_horizontal() * turn.direction.sign();
    let center = start + normal * radius;
    let start_angle = (start.z - center.z).atan2(start.x - center.x);
    let end_angle = (end.z - center.z).atan2(end.x - center.x);
    let mut sweep = end_angle - start_angle;
    match turn.direction {
        TurnDirection::Clockwise if sweep < 0.0 => sweep += 2.0 * PI,
        TurnDirection::CounterClockwise if sweep > 0.0 => sweep -= 2.0 * PI,
        _ => {}
    }

    let mut positions: Vec<DVec3> = (0..=steps)
        .map(|i| {
            let angle = start_angle + sweep * (i as f64 / steps as f64);
            DVec3::new(
                center.x + radius * angle.cos(),
                start.y,
                center.z + radius * angle.sin(),
            )
        })
        .collect();
    pin_endpoints(&mut positions, start, end);

    let end_tangent = turn.end_tangent();
    Ok(HorizontalCurve {
        points: chord_tangents(positions, start_tangent, end_tangent),
        end_tangent,
        arc_length,
        family: CurveFamily::Simple,
    })
}

/// Symmetrische Klothoide–Bogen–Klothoide zwischen zwei Punkten.
///
/// θ < 1° oder außerhalb der Verhältnis-Tabelle → `simple_arc`.
pub fn spiral(
    start: DVec3,
    end: DVec3,
    start_tangent: DVec3,
) -> Result<HorizontalCurve, CurveError> {
    let turn = ChordTurn::analyze(start, end, start_tangent)?;
    if turn.theta_deg() < 1.0 {
        return simple_arc(start, end, start_tangent);
    }
    let Some(unit) = unit_spiral(turn.theta) else {
        log::debug!(
            "Spiral: θ={:.2}° ohne Verhältnis, einfacher Bogen",
            turn.theta_deg()
        );
        return simple_arc(start, end, start_tangent);
    };
    place_symmetric(&unit, start, end, start_tangent, &turn, CurveFamily::Spiral)
}

/// Korbbogen mit geraden Anläufen, gültig für θ ∈ [14.9°, 180.1°].
pub fn compound_taper(
    start: DVec3,
    end: DVec3,
    start_tangent: DVec3,
) -> Result<HorizontalCurve, CurveError> {
    let turn = ChordTurn::analyze(start, end, start_tangent)?;
    if !CurveFamily::CompoundTaper.accepts_angle(turn.theta_deg()) {
        return simple_arc(start, end, start_tangent);
    }
    let unit = unit_compound_taper(turn.theta);
    place_symmetric(
        &unit,
        start,
        end,
        start_tangent,
        &turn,
        CurveFamily::CompoundTaper,
    )
}

fn place_symmetric(
    unit: &[DVec2],
    start: DVec3,
    end: DVec3,
    start_tangent: DVec3,
    turn: &ChordTurn,
    family: CurveFamily,
) -> Result<HorizontalCurve, CurveError> {
    let mut positions = place_on_chord(
        unit,
        start,
        turn.chord_length,
        start_tangent,
        turn.direction,
    )?;
    pin_endpoints(&mut positions, start, end);
    let end_tangent = turn.end_tangent();
    Ok(finish(
        chord_tangents(positions, start_tangent, end_tangent),
        end_tangent,
        family,
    ))
}

// ── Tangenten-Schnitt ───────────────────────────────────────────

/// Schnittpunkt zweier Tangentenlinien im Grundriss, `None` bei Parallelität.
///
/// Die Höhe des Ergebnisses ist die von `p1`.
pub fn tangent_intersection(p1: DVec3, v1: DVec3, p2: DVec3, v2: DVec3) -> Option<DVec3> {
    let det = v1.x * (-v2.z) - v1.z * (-v2.x);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let dx = p2.x - p1.x;
    let dz = p2.z - p1.z;
    let t = (dx * (-v2.z) - dz * (-v2.x)) / det;
    Some(DVec3::new(p1.x + t * v1.x, p1.y, p1.z + t * v1.z))
}

/// Liegt der Start "hinter" dem Schnittpunkt (Reflexwinkel-Fall)?
///
/// Positives Skalarprodukt von (Start − Schnittpunkt) mit der Start-Tangente.
pub fn is_reflex(start: DVec3, intersection: DVec3, start_tangent: DVec3) -> bool {
    (start - intersection).dot_horizontal(start_tangent) > 0.0
}

/// Effektiver Endpunkt auf der Ziel-Tangentenlinie im gleichen Abstand wie der Start.
pub fn intersection_end_point(
    start: DVec3,
    intersection: DVec3,
    start_tangent: DVec3,
    target_tangent: DVec3,
) -> DVec3 {
    let dist = (intersection - start).horizontal_length();
    let dir_factor = if (start - intersection).dot_horizontal(start_tangent) < 0.0 {
        1.0
    } else {
        -1.0
    };
    let end = intersection + target_tangent.normalize_horizontal() * dist * dir_factor;
    DVec3::new(end.x, start.y, end.z)
}

/// RRR-Korbbogen über den Tangenten-Schnittpunkt.
///
/// Der Drehwinkel kommt aus den Tangenten (inkl. Reflex-Korrektur); außerhalb
/// von (0°, 180.1°] entsteht eine gerade Verlängerung um 10 Einheiten.
pub fn reverse_radius(
    start: DVec3,
    intersection: DVec3,
    start_tangent: DVec3,
    target_tangent: DVec3,
) -> Result<HorizontalCurve, CurveError> {
    let mut theta = wrap_angle(target_tangent.heading() - start_tangent.heading()).abs();
    if is_reflex(start, intersection, start_tangent) {
        theta = 2.0 * PI - theta;
    }
    let theta_deg = theta.to_degrees();
    if theta_deg <= 0.0 || !CurveFamily::ReverseRadius.accepts_angle(theta_deg) {
        log::debug!("Rrr: θ={theta_deg:.2}° außerhalb, gerade Verlängerung");
        let extension = start + start_tangent.normalize_horizontal() * 10.0;
        return simple_arc(start, extension, start_tangent);
    }
    let unit = unit_reverse_radius(theta);
    let points = fit_unit_curve(
        &unit,
        start,
        intersection,
        start_tangent,
        target_tangent,
        theta,
    )?;
    Ok(finish(points, target_tangent, CurveFamily::ReverseRadius))
}

/// Schnittpunkt-Konstruktion für eine Familie.
pub fn from_intersection(
    family: CurveFamily,
    start: DVec3,
    intersection: DVec3,
    start_tangent: DVec3,
    target_tangent: DVec3,
) -> Result<HorizontalCurve, CurveError> {
    if family == CurveFamily::ReverseRadius {
        return reverse_radius(start, intersection, start_tangent, target_tangent);
    }
    let end = intersection_end_point(start, intersection, start_tangent, target_tangent);
    match family {
        CurveFamily::Spiral => spiral(start, end, start_tangent),
        CurveFamily::CompoundTaper => compound_taper(start, end, start_tangent),
        _ => simple_arc(start, end, start_tangent),
    }
}

/// Parallel-Sehnen-Konstruktion aus dem rohen Drehwinkel.
///
/// Wird verwendet, wenn die Tangentenlinien keinen Schnittpunkt haben oder
/// der Drehwinkel über 175° liegt. `target_ref` ist der Start des Zielvektors.
pub fn parallel(
    family: CurveFamily,
    start: DVec3,
    target_ref: DVec3,
    start_tangent: DVec3,
    target_tangent: DVec3,
    theta: f64,
) -> Result<HorizontalCurve, CurveError> {
    let (unit, used) = match family {
        CurveFamily::Spiral => match unit_spiral(theta) {
            Some(unit) => (unit, CurveFamily::Spiral),
            None => (unit_arc(theta), CurveFamily::Simple),
        },
        CurveFamily::CompoundTaper if family.accepts_angle(theta.to_degrees()) => {
            (unit_compound_taper(theta), CurveFamily::CompoundTaper)
        }
        CurveFamily::ReverseRadius => (unit_reverse_radius(theta), CurveFamily::ReverseRadius),
        _ => (unit_arc(theta), CurveFamily::Simple),
    };
    let points = fit_unit_curve(
        &unit,
        start,
        target_ref,
        start_tangent,
        target_tangent,
        theta,
    )?;
    Ok(finish(points, target_tangent, used))
}

// ── Vollkreis ───────────────────────────────────────────────────

/// Geschlossener Kreis um `center` durch `radius_point` auf Höhe `center.y`.
///
/// Schrittzahl `max(40, ceil(Umfang·2))`; `arc_length` ist der exakte Umfang.
pub fn full_circle(center: DVec3, radius_point: DVec3) -> Result<HorizontalCurve, CurveError> {
    let offset = radius_point - center;
    let radius = offset.horizontal_length();
    if radius < MIN_CHORD {
        return Err(CurveError::degenerate(format!(
            "Kreisradius zu klein ({radius:.4})"
        )));
    }
    let start_angle = offset.heading();
    let circumference = 2.0 * PI * radius;
    let steps = 40usize.max((circumference * 2.0).ceil() as usize);

    let positions = (0..=steps)
        .map(|i| {
            let angle = start_angle + (i as f64 / steps as f64) * 2.0 * PI;
            DVec3::new(
                center.x + radius * angle.cos(),
                center.y,
                center.z + radius * angle.sin(),
            )
        })
        .collect();
    let tangent = DVec3::new(-start_angle.sin(), 0.0, start_angle.cos());
    Ok(HorizontalCurve {
        points: chord_tangents(positions, tangent, tangent),
        end_tangent: tangent,
        arc_length: circumference,
        family: CurveFamily::FullCircle,
    })
}
