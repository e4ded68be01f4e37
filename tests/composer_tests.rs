//! Integrationstests für die Kurven-Komposition über die öffentliche API:
//! - Alle Bogen-Familien im Vektor-Modus
//! - Serialisierung von Anfrage und Ergebnis
//! - Kennwert-Zeile und Abtastung entlang der Kurve

use approx::assert_relative_eq;
use curve_road_builder::{
    compose, curve_summary, BoundaryVector, CurveError, CurveFamily, CurveRequest, CurveResult,
    PathSampler, ProfileMode,
};
use glam::DVec3;

/// Rechtskurve um 90° auf Höhe 64, Tangenten-Schnitt bei (20, 64, 0).
fn right_angle(family: CurveFamily) -> CurveRequest {
    CurveRequest::VectorToVector {
        start: BoundaryVector::new(DVec3::new(0.0, 64.0, 0.0), DVec3::X, 0.0),
        target: BoundaryVector::new(DVec3::new(20.0, 64.0, 20.0), DVec3::Z, 0.0),
        family,
        profile: ProfileMode::SingleSlope,
    }
}

fn assert_consistent(result: &CurveResult) {
    assert_eq!(result.points.len(), result.distances.len());
    assert_eq!(result.distances[0], 0.0);
    assert!(result.distances.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(
        result.total_length,
        *result.distances.last().unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_alle_bogenfamilien_im_vektor_modus() {
    for family in [
        CurveFamily::Simple,
        CurveFamily::Spiral,
        CurveFamily::CompoundTaper,
        CurveFamily::ReverseRadius,
    ] {
        let result = compose(&right_angle(family)).unwrap();
        assert_consistent(&result);
        assert_eq!(result.stats.family(), family, "Familie {}", family.tag());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let first = result.points[0].position;
        assert_relative_eq!(first.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(first.z, 0.0, epsilon = 1e-9);
        for p in &result.points {
            assert_relative_eq!(p.position.y, 64.0, epsilon = 1e-9);
        }
        assert_relative_eq!(result.end_slope, 0.0, epsilon = 1e-12);
        assert!(result.end_tangent.z > 0.99, "{}", family.tag());
    }
}

#[test]
fn test_einfacher_bogen_endet_im_ziel() {
    let result = compose(&right_angle(CurveFamily::Simple)).unwrap();
    let end = result.end_position().unwrap();
    assert_relative_eq!(end.x, 20.0, epsilon = 1e-6);
    assert_relative_eq!(end.z, 20.0, epsilon = 1e-6);

    let arc = result.stats.as_arc().unwrap();
    assert_relative_eq!(arc.radius, 20.0, epsilon = 1e-6);
    assert_relative_eq!(arc.turn_angle_deg, 90.0, epsilon = 1e-6);
}

#[test]
fn test_ergebnis_als_json() {
    let result = compose(&right_angle(CurveFamily::Spiral)).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["stats"]["family"], "spiral");
    assert_eq!(
        json["points"].as_array().unwrap().len(),
        result.points.len()
    );

    let back: CurveResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.points.len(), result.points.len());
    assert_eq!(back.stats.family(), CurveFamily::Spiral);
}

#[test]
fn test_gerade_mit_unendlichem_radius_als_json() {
    let request = CurveRequest::PointChain {
        anchors: vec![DVec3::ZERO, DVec3::new(20.0, 0.0, 0.0)],
        start_tangent: DVec3::X,
        start_slope: 0.0,
        families: vec![],
        profile: ProfileMode::SingleSlope,
        end_slope: 0.0,
    };
    let result = compose(&request).unwrap();
    assert!(result.stats.radius().is_infinite());

    let json = serde_json::to_string(&result).unwrap();
    let back: CurveResult = serde_json::from_str(&json).unwrap();
    assert!(back.stats.radius().is_infinite());
    assert_eq!(back.stats, result.stats);
}

#[test]
fn test_anfrage_aus_json() {
    let json = r#"{
        "kind": "full_circle",
        "center": [0.0, 70.0, 0.0],
        "radius_point": [5.0, 70.0, 0.0]
    }"#;
    let request: CurveRequest = serde_json::from_str(json).unwrap();
    let result = compose(&request).unwrap();
    assert_eq!(result.stats.family(), CurveFamily::FullCircle);
    assert_relative_eq!(result.stats.radius(), 5.0, epsilon = 1e-9);
    assert!(curve_summary(&result.stats).starts_with("Kurve erstellt! Typ: Cir // R=5.00"));
}

#[test]
fn test_kennwertzeile_fuer_vektor_kurve() {
    let result = compose(&right_angle(CurveFamily::Simple)).unwrap();
    let text = curve_summary(&result.stats);
    assert!(text.starts_with("Kurve erstellt! Typ: Simple // R=20.00, A=90.00°"));
    assert!(text.ends_with("g2=0.00%"));
}

#[test]
fn test_abtastung_entlang_der_kurve() {
    let result = compose(&right_angle(CurveFamily::Simple)).unwrap();
    let sampler = PathSampler::new(&result.points, &result.distances);
    let mid = sampler.sample_at(result.total_length / 2.0).unwrap();
    // Bogenmitte eines Viertelkreises mit Mittelpunkt (0, 20)
    let half = 45f64.to_radians();
    let expected = DVec3::new(20.0 * half.sin(), 64.0, 20.0 - 20.0 * half.cos());
    assert!(mid.position.distance(expected) < 0.1, "{:?}", mid.position);
    let beyond = sampler.sample_at(result.total_length + 1.0).unwrap();
    assert_eq!(beyond.position, result.end_position().unwrap());
}

#[test]
fn test_leere_kette_ist_fehler() {
    let request = CurveRequest::PointChain {
        anchors: vec![DVec3::ZERO],
        start_tangent: DVec3::X,
        start_slope: 0.0,
        families: vec![],
        profile: ProfileMode::SingleSlope,
        end_slope: 0.0,
    };
    assert_eq!(compose(&request).unwrap_err(), CurveError::EmptyRequest);
}
