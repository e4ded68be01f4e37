#![no_main]

use curve_road_builder::{compose, CurveRequest};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = serde_json::from_slice::<CurveRequest>(data) {
        if let Ok(result) = compose(&request) {
            assert_eq!(result.points.len(), result.distances.len());
        }
    }
});
