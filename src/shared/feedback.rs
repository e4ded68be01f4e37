//! Kennwert-Zeile nach jeder Kurven-Berechnung.

use crate::geometry::{CurveStats, IntermediateSlopes};

fn radius_text(radius: f64) -> String {
    if radius.is_finite() {
        format!("{radius:.2}")
    } else {
        "inf".to_string()
    }
}

fn percent(slope: f64) -> String {
    format!("{:.2}%", slope * 100.0)
}

/// Formatiert die Statistik als einzeilige Rückmeldung.
///
/// Beispiel: `Kurve erstellt! Typ: Spi // R=12.50, A=90.00°, L=19.63, h=1.00, g1=0.00%, g2=10.19%`
pub fn curve_summary(stats: &CurveStats) -> String {
    let header = format!("Kurve erstellt! Typ: {}", stats.family().tag());
    let Some(arc) = stats.as_arc() else {
        return format!(
            "{header} // R={}, L={:.2}",
            radius_text(stats.radius()),
            stats.length()
        );
    };

    let mut msg = format!(
        "{header} // R={}, A={:.2}°, L={:.2}, h={:.2}, g1={}",
        radius_text(arc.radius),
        arc.turn_angle_deg,
        arc.length,
        arc.height_delta,
        percent(arc.start_slope)
    );
    match arc.intermediate {
        IntermediateSlopes::None => {}
        IntermediateSlopes::Ramp { middle } => {
            msg.push_str(&format!(", gT={}", percent(middle)));
        }
        IntermediateSlopes::Apex { inbound, outbound } => {
            msg.push_str(&format!(
                ", gT1={}, gT2={}",
                percent(inbound),
                percent(outbound)
            ));
        }
    }
    msg.push_str(&format!(", g2={}", percent(arc.end_slope)));
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CurveFamily;
    use crate::geometry::{ArcStats, CircleStats};

    #[test]
    fn arc_summary_with_ramp() {
        let stats = CurveStats::arc(
            CurveFamily::Spiral,
            ArcStats {
                radius: 12.5,
                turn_angle_deg: 90.0,
                length: 19.634,
                height_delta: 1.0,
                start_slope: 0.0,
                end_slope: 0.05,
                intermediate: IntermediateSlopes::Ramp { middle: 0.0625 },
            },
        );
        assert_eq!(
            curve_summary(&stats),
            "Kurve erstellt! Typ: Spi // R=12.50, A=90.00°, L=19.63, h=1.00, g1=0.00%, gT=6.25%, g2=5.00%"
        );
    }

    #[test]
    fn straight_radius_is_inf() {
        let stats = CurveStats::arc(
            CurveFamily::Simple,
            ArcStats {
                radius: f64::INFINITY,
                turn_angle_deg: 0.0,
                length: 10.0,
                height_delta: 0.0,
                start_slope: 0.0,
                end_slope: 0.0,
                intermediate: IntermediateSlopes::Apex {
                    inbound: 0.1,
                    outbound: -0.1,
                },
            },
        );
        let text = curve_summary(&stats);
        assert!(text.contains("R=inf"));
        assert!(text.contains("gT1=10.00%, gT2=-10.00%"));
    }

    #[test]
    fn circle_summary() {
        let stats = CurveStats::FullCircle(CircleStats {
            radius: 3.0,
            length: 18.849_555,
        });
        assert_eq!(
            curve_summary(&stats),
            "Kurve erstellt! Typ: Cir // R=3.00, L=18.85"
        );
    }
}
