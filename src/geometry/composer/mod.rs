//! Kurven-Komposition: Grundriss + Höhenprofil + Statistik für eine Anfrage.
//!
//! Drei Anfrage-Arten:
//! - `VectorToVector`: Start- und Zielvektor (Position, Tangente, Steigung)
//! - `PointChain`: Ankerpunkte, segmentweise punkt-zu-punkt gelöst
//! - `FullCircle`: Kreisverkehr aus Mittelpunkt und Radius-Punkt
//!
//! Das Ergebnis wird bei jeder Änderung komplett neu berechnet.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use super::horizontal::{self, is_reflex, tangent_intersection};
use super::stats::{effective_radius, ArcStats, CircleStats, CurveStats, IntermediateSlopes};
use super::vertical::{five_segment_apex, ramp_two_parabola, single_parabola};
use super::{CurveError, HorizontalCurve};
use crate::core::{wrap_angle, CurveFamily, HorizontalExt, TangentedPoint};

/// Über diesem Anfangs-Drehwinkel (Grad) wird parallel konstruiert.
pub const PARALLEL_THRESHOLD_DEG: f64 = 175.0;

// ── Anfrage-Typen ───────────────────────────────────────────────

/// Randvektor: Position, Grundriss-Tangente und Längsneigung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryVector {
    pub position: DVec3,
    /// Normierte Grundriss-Richtung
    pub tangent: DVec3,
    /// Steigung Δy / horizontale Länge
    #[serde(default)]
    pub slope: f64,
}

impl BoundaryVector {
    /// Randvektor mit horizontal normierter Tangente.
    pub fn new(position: DVec3, tangent: DVec3, slope: f64) -> Self {
        Self {
            position,
            tangent: tangent.normalize_horizontal(),
            slope,
        }
    }

    /// Randvektor aus zwei Punkten (Richtung und Steigung von `from` nach `to`).
    ///
    /// `None`, wenn die Punkte horizontal zusammenfallen.
    pub fn from_points(from: DVec3, to: DVec3) -> Option<Self> {
        let delta = to - from;
        let len = delta.horizontal_length();
        if len == 0.0 {
            return None;
        }
        Some(Self {
            position: from,
            tangent: delta.normalize_horizontal(),
            slope: delta.y / len,
        })
    }
}

/// Art der Höhen-Überblendung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProfileMode {
    /// Einzelparabel, Steigung wird weitergereicht
    #[default]
    SingleSlope,
    /// Parabel – Gerade – Parabel zwischen Start- und End-Steigung
    Ramp,
    /// Fünf Segmente mit Scheitelhöhe `height` relativ zum Start
    Apex { height: f64 },
}

/// Serialisierbarer Eingabe-Schnappschuss einer Kurven-Berechnung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveRequest {
    VectorToVector {
        start: BoundaryVector,
        target: BoundaryVector,
        #[serde(default)]
        family: CurveFamily,
        #[serde(default)]
        profile: ProfileMode,
    },
    PointChain {
        anchors: Vec<DVec3>,
        start_tangent: DVec3,
        #[serde(default)]
        start_slope: f64,
        /// Familie je Segment; fehlende Einträge wiederholen den letzten
        #[serde(default)]
        families: Vec<CurveFamily>,
        #[serde(default)]
        profile: ProfileMode,
        /// End-Steigung für `Ramp`/`Apex`
        #[serde(default)]
        end_slope: f64,
    },
    FullCircle {
        center: DVec3,
        radius_point: DVec3,
    },
}

// ── Ergebnis ────────────────────────────────────────────────────

/// Nicht-fatale Hinweise einer Berechnung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveWarning {
    /// Drehwinkel außerhalb des Familien-Fensters, Rückfall auf `Simple`
    AngleOutOfRange {
        family: CurveFamily,
        turn_angle_deg: f64,
    },
    /// Segment nicht lösbar, ersetzt durch eine gerade Überbrückung zum Segment-Ende
    DegenerateSegment { segment: usize, reason: String },
    /// Familie nicht punkt-zu-punkt lösbar, `Simple` verwendet
    NotChainable { segment: usize, family: CurveFamily },
    /// End-Höhe liegt jenseits der Scheitelhöhe
    EndBeyondApex { end_delta: f64, apex_height: f64 },
}

impl fmt::Display for CurveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveWarning::AngleOutOfRange {
                family,
                turn_angle_deg,
            } => {
                let (min, max) = family.angle_window_deg().unwrap_or((0.0, 360.0));
                write!(
                    f,
                    "Drehwinkel {turn_angle_deg:.2}° außerhalb ({min}°-{max}°) für {}",
                    family.tag()
                )
            }
            CurveWarning::DegenerateSegment { segment, reason } => {
                write!(
                    f,
                    "Segment {} übersprungen ({reason}), gerade Überbrückung zum nächsten Anker",
                    segment + 1
                )
            }
            CurveWarning::NotChainable { segment, family } => write!(
                f,
                "Segment {}: {} nicht punkt-zu-punkt lösbar, Simple verwendet",
                segment + 1,
                family.tag()
            ),
            CurveWarning::EndBeyondApex {
                end_delta,
                apex_height,
            } => {
                if *apex_height >= 0.0 {
                    write!(
                        f,
                        "End-Höhe ({end_delta:.2}) liegt über dem Scheitel h ({apex_height:.2})"
                    )
                } else {
                    write!(
                        f,
                        "End-Höhe ({end_delta:.2}) liegt unter dem Tiefpunkt h ({apex_height:.2})"
                    )
                }
            }
        }
    }
}

/// Vollständig berechnete 3D-Kurve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveResult {
    pub points: Vec<TangentedPoint>,
    /// Kumulative 3D-Distanzen, `distances[0] == 0`
    pub distances: Vec<f64>,
    pub total_length: f64,
    /// Tangente für eine Folge-Anfrage
    pub end_tangent: DVec3,
    /// Steigung für eine Folge-Anfrage
    pub end_slope: f64,
    pub stats: CurveStats,
    pub warnings: Vec<CurveWarning>,
}

impl CurveResult {
    fn assemble(
        points: Vec<TangentedPoint>,
        end_tangent: DVec3,
        end_slope: f64,
        stats: CurveStats,
        warnings: Vec<CurveWarning>,
    ) -> Self {
        let distances = spatial_table(&points);
        let total_length = distances.last().copied().unwrap_or(0.0);
        Self {
            points,
            distances,
            total_length,
            end_tangent,
            end_slope,
            stats,
            warnings,
        }
    }

    /// Position des letzten Samples.
    pub fn end_position(&self) -> Option<DVec3> {
        self.points.last().map(|p| p.position)
    }
}

// ── Tabellen ────────────────────────────────────────────────────

/// Kumulative horizontale Distanzen.
pub fn horizontal_table(points: &[TangentedPoint]) -> Vec<f64> {
    cumulative(points, |a, b| (b - a).horizontal_length())
}

/// Kumulative 3D-Distanzen.
pub fn spatial_table(points: &[TangentedPoint]) -> Vec<f64> {
    cumulative(points, |a, b| a.distance(b))
}

fn cumulative(points: &[TangentedPoint], metric: impl Fn(DVec3, DVec3) -> f64) -> Vec<f64> {
    let mut table = Vec::with_capacity(points.len());
    let mut total = 0.0;
    table.push(0.0);
    for w in points.windows(2) {
        total += metric(w[0].position, w[1].position);
        table.push(total);
    }
    table
}

fn apply_heights(points: &mut [TangentedPoint], heights: &[f64]) {
    for (p, &y) in points.iter_mut().zip(heights) {
        p.position.y = y;
    }
}

/// Drehwinkel laut Sehne (Tangente halbiert den Bogen).
fn chord_theta(start: DVec3, end: DVec3, tangent: DVec3) -> f64 {
    2.0 * wrap_angle((end - start).heading() - tangent.heading()).abs()
}

fn apex_overshoot(end_delta: f64, apex_height: f64) -> Option<CurveWarning> {
    let beyond = (apex_height > 0.0 && end_delta > apex_height)
        || (apex_height < 0.0 && end_delta < apex_height);
    beyond.then_some(CurveWarning::EndBeyondApex {
        end_delta,
        apex_height,
    })
}

fn push_warning(warnings: &mut Vec<CurveWarning>, warning: CurveWarning) {
    log::warn!("{warning}");
    warnings.push(warning);
}

// ── Einstieg ────────────────────────────────────────────────────

/// Berechnet eine Anfrage vollständig neu.
pub fn compose(request: &CurveRequest) -> Result<CurveResult, CurveError> {
    match request {
        CurveRequest::VectorToVector {
            start,
            target,
            family,
            profile,
        } => compose_vector(start, target, *family, *profile),
        CurveRequest::PointChain {
            anchors,
            start_tangent,
            start_slope,
            families,
            profile,
            end_slope,
        } => compose_chain(
            anchors,
            *start_tangent,
            *start_slope,
            families,
            *profile,
            *end_slope,
        ),
        CurveRequest::FullCircle {
            center,
            radius_point,
        } => compose_circle(*center, *radius_point),
    }
}

// ── Vektor-zu-Vektor ────────────────────────────────────────────

fn compose_vector(
    start: &BoundaryVector,
    target: &BoundaryVector,
    family: CurveFamily,
    profile: ProfileMode,
) -> Result<CurveResult, CurveError> {
    let s = start.position;
    let start_tan = start.tangent.normalize_horizontal();
    let target_tan = target.tangent.normalize_horizontal();
    if start_tan == DVec3::ZERO || target_tan == DVec3::ZERO {
        return Err(CurveError::degenerate("Randvektor ohne Grundriss-Richtung"));
    }
    let mut warnings = Vec::new();

    // 1. Anfangs-Drehwinkel und Tangenten-Schnitt
    let intersection = tangent_intersection(s, start_tan, target.position, target_tan);
    let theta_init = wrap_angle(target_tan.heading() - start_tan.heading()).abs();

    // 2. Reflex-Korrektur
    let mut theta_real = theta_init;
    if let Some(hit) = intersection {
        if family.uses_reflex_correction() && is_reflex(s, hit, start_tan) {
            theta_real = 2.0 * PI - theta_init;
        }
    }
    if !family.accepts_angle(theta_real.to_degrees()) {
        push_warning(
            &mut warnings,
            CurveWarning::AngleOutOfRange {
                family,
                turn_angle_deg: theta_real.to_degrees(),
            },
        );
    }

    // 3. Konstruktions-Methode
    let horizontal = match intersection {
        Some(hit) if theta_init.to_degrees() <= PARALLEL_THRESHOLD_DEG => {
            log::debug!("{}: Schnittpunkt-Konstruktion", family.tag());
            horizontal::from_intersection(family, s, hit, start_tan, target_tan)?
        }
        _ => {
            log::debug!("{}: Parallel-Konstruktion", family.tag());
            horizontal::parallel(family, s, target.position, start_tan, target_tan, theta_init)?
        }
    };
    let HorizontalCurve {
        mut points,
        end_tangent,
        family: used_family,
        ..
    } = horizontal;
    let end_xz = points
        .last()
        .map(|p| p.position)
        .ok_or_else(|| CurveError::degenerate("Kurve ohne Punkte"))?;

    // 4. Ausgangshöhe per Projektion auf die Ziel-Tangentenlinie
    let dist_on_line = (end_xz - target.position).dot_horizontal(target_tan);
    let target_y = target.position.y + dist_on_line * target.slope;

    // 5. Horizontale Bogenlängen
    let dists = horizontal_table(&points);

    let mut true_theta = chord_theta(s, end_xz, start_tan);
    if true_theta < 0.01 && theta_real > 0.1 {
        true_theta = theta_real;
    }
    let radius = effective_radius((end_xz - s).horizontal_length(), true_theta);

    // 6. Höhenprofil
    let dy = target_y - s.y;
    let (heights, end_slope, height_delta, intermediate) = match profile {
        ProfileMode::SingleSlope => {
            let p = single_parabola(s.y, target_y, start.slope, &dists);
            (p.heights, p.exit_slope, dy, IntermediateSlopes::None)
        }
        ProfileMode::Ramp => {
            let p = ramp_two_parabola(s.y, target_y, start.slope, target.slope, &dists);
            let middle = p.middle_slope;
            (p.heights, target.slope, dy, IntermediateSlopes::Ramp { middle })
        }
        ProfileMode::Apex { height } => {
            if let Some(w) = apex_overshoot(dy, height) {
                push_warning(&mut warnings, w);
            }
            let p = five_segment_apex(s.y, target_y, start.slope, target.slope, height, &dists);
            let slopes = IntermediateSlopes::Apex {
                inbound: p.inbound_slope,
                outbound: p.outbound_slope,
            };
            (p.heights, target.slope, height, slopes)
        }
    };
    apply_heights(&mut points, &heights);

    let length = spatial_table(&points).last().copied().unwrap_or(0.0);
    let stats = CurveStats::arc(
        used_family,
        ArcStats {
            radius,
            turn_angle_deg: true_theta.to_degrees(),
            length,
            height_delta,
            start_slope: start.slope,
            end_slope,
            intermediate,
        },
    );
    Ok(CurveResult::assemble(
        points,
        end_tangent,
        end_slope,
        stats,
        warnings,
    ))
}

// ── Punkt-Kette ─────────────────────────────────────────────────

/// Horizontale Kennwerte des zuletzt berechneten Segments.
struct SegmentSummary {
    family: CurveFamily,
    radius: f64,
    turn_angle_deg: f64,
    length: f64,
    height_delta: f64,
    start_slope: f64,
    end_slope: f64,
}

fn compose_chain(
    anchors: &[DVec3],
    start_tangent: DVec3,
    start_slope: f64,
    families: &[CurveFamily],
    profile: ProfileMode,
    end_slope: f64,
) -> Result<CurveResult, CurveError> {
    let (Some(&first), Some(&last)) = (anchors.first(), anchors.last()) else {
        return Err(CurveError::EmptyRequest);
    };
    if anchors.len() < 2 {
        return Err(CurveError::EmptyRequest);
    }

    let mut warnings = Vec::new();
    let mut tangent = start_tangent.normalize_horizontal();
    let mut slope = start_slope;
    let mut points = vec![TangentedPoint::new(first, tangent)];
    let mut summary: Option<SegmentSummary> = None;

    for (i, pair) in anchors.windows(2).enumerate() {
        let (p_start, p_end) = (pair[0], pair[1]);
        let requested = families
            .get(i)
            .or(families.last())
            .copied()
            .unwrap_or_default();
        let family = if requested.is_chainable() {
            requested
        } else {
            push_warning(
                &mut warnings,
                CurveWarning::NotChainable {
                    segment: i,
                    family: requested,
                },
            );
            CurveFamily::Simple
        };

        let solved = match family {
            CurveFamily::Spiral => horizontal::spiral(p_start, p_end, tangent),
            CurveFamily::CompoundTaper => horizontal::compound_taper(p_start, p_end, tangent),
            _ => horizontal::simple_arc(p_start, p_end, tangent),
        };
        let segment = match solved {
            Ok(segment) => segment,
            Err(e) => {
                push_warning(
                    &mut warnings,
                    CurveWarning::DegenerateSegment {
                        segment: i,
                        reason: e.to_string(),
                    },
                );
                // Gerade Überbrückung bis zum nächsten Anker
                if points.last().is_some_and(|p| p.position != p_end) {
                    points.push(TangentedPoint::new(p_end, tangent));
                }
                continue;
            }
        };

        let theta = chord_theta(p_start, p_end, tangent);
        if !family.accepts_angle(theta.to_degrees()) {
            push_warning(
                &mut warnings,
                CurveWarning::AngleOutOfRange {
                    family,
                    turn_angle_deg: theta.to_degrees(),
                },
            );
        }
        log::debug!(
            "Segment {}: {} θ={:.2}° L={:.2}",
            i + 1,
            segment.family.tag(),
            theta.to_degrees(),
            segment.arc_length
        );

        let mut seg_points = segment.points;
        let seg_start_slope = slope;
        if profile == ProfileMode::SingleSlope {
            let local = horizontal_table(&seg_points);
            let p = single_parabola(p_start.y, p_end.y, slope, &local);
            apply_heights(&mut seg_points, &p.heights);
            slope = p.exit_slope;
        }
        points.extend(seg_points.into_iter().skip(1));

        summary = Some(SegmentSummary {
            family: segment.family,
            radius: effective_radius((p_end - p_start).horizontal_length(), theta),
            turn_angle_deg: theta.to_degrees(),
            length: segment.arc_length,
            height_delta: p_end.y - p_start.y,
            start_slope: seg_start_slope,
            end_slope: slope,
        });
        tangent = segment.end_tangent;
    }

    let Some(mut summary) = summary else {
        return Err(CurveError::degenerate("alle Segmente degeneriert"));
    };

    let mut intermediate = IntermediateSlopes::None;
    let result_slope = match profile {
        ProfileMode::SingleSlope => slope,
        ProfileMode::Ramp | ProfileMode::Apex { .. } => {
            let dists = horizontal_table(&points);
            let heights = match profile {
                ProfileMode::Apex { height } => {
                    if let Some(w) = apex_overshoot(last.y - first.y, height) {
                        push_warning(&mut warnings, w);
                    }
                    let p = five_segment_apex(first.y, last.y, start_slope, end_slope, height, &dists);
                    intermediate = IntermediateSlopes::Apex {
                        inbound: p.inbound_slope,
                        outbound: p.outbound_slope,
                    };
                    summary.height_delta = height;
                    p.heights
                }
                _ => {
                    let p = ramp_two_parabola(first.y, last.y, start_slope, end_slope, &dists);
                    intermediate = IntermediateSlopes::Ramp {
                        middle: p.middle_slope,
                    };
                    summary.height_delta = last.y - first.y;
                    p.heights
                }
            };
            apply_heights(&mut points, &heights);
            summary.start_slope = start_slope;
            summary.end_slope = end_slope;
            end_slope
        }
    };

    let stats = CurveStats::arc(
        summary.family,
        ArcStats {
            radius: summary.radius,
            turn_angle_deg: summary.turn_angle_deg,
            length: summary.length,
            height_delta: summary.height_delta,
            start_slope: summary.start_slope,
            end_slope: summary.end_slope,
            intermediate,
        },
    );
    Ok(CurveResult::assemble(
        points,
        tangent,
        result_slope,
        stats,
        warnings,
    ))
}

// ── Vollkreis ───────────────────────────────────────────────────

fn compose_circle(center: DVec3, radius_point: DVec3) -> Result<CurveResult, CurveError> {
    let circle = horizontal::full_circle(center, radius_point)?;
    let stats = CurveStats::FullCircle(CircleStats {
        radius: (radius_point - center).horizontal_length(),
        length: circle.arc_length,
    });
    Ok(CurveResult::assemble(
        circle.points,
        circle.end_tangent,
        0.0,
        stats,
        Vec::new(),
    ))
}
