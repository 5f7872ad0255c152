use codec::{
    decode_full_snapshot, decode_relative_snapshot, encode_full_snapshot,
    encode_relative_snapshot, BodyTransform, CodecSettings, FrameId, Quat, Vec3,
};
use proptest::prelude::*;

fn position_strategy() -> impl Strategy<Value = Vec3> {
    (-9.9f64..9.9, -9.9f64..9.9, -9.9f64..9.9).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn rotation_strategy() -> impl Strategy<Value = Quat> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("near-zero quaternion", |(x, y, z, w)| {
            x * x + y * y + z * z + w * w > 0.01
        })
        .prop_map(|(x, y, z, w)| Quat::new(x, y, z, w).normalized())
}

fn body_strategy() -> impl Strategy<Value = BodyTransform> {
    (position_strategy(), rotation_strategy())
        .prop_map(|(position, rotation)| BodyTransform::new(position, rotation))
}

fn rotation_error(a: Quat, b: Quat) -> f64 {
    let (a, b) = (a.to_array(), b.to_array());
    let same = (0..4).map(|i| (a[i] - b[i]).abs()).fold(0.0, f64::max);
    let flipped = (0..4).map(|i| (a[i] + b[i]).abs()).fold(0.0, f64::max);
    same.min(flipped)
}

fn within_tolerance(expected: &BodyTransform, actual: &BodyTransform, settings: &CodecSettings) -> bool {
    let step = 1.0 / f64::from(settings.units_per_meter);
    (expected.position.x - actual.position.x).abs() <= step
        && (expected.position.y - actual.position.y).abs() <= step
        && (expected.position.z - actual.position.z).abs() <= step
        && rotation_error(expected.rotation, actual.rotation) < 0.1
}

proptest! {
    #[test]
    fn prop_full_snapshot_roundtrip(
        frame in 0u32..=255,
        bodies in prop::collection::vec(body_strategy(), 0..=64),
    ) {
        let settings = CodecSettings::for_testing();
        let bytes = encode_full_snapshot(&settings, FrameId::new(frame), &bodies).unwrap();
        let snapshot = decode_full_snapshot(&settings, &bytes).unwrap();

        prop_assert_eq!(snapshot.frame, FrameId::new(frame));
        prop_assert_eq!(snapshot.bodies.len(), bodies.len());
        for (expected, actual) in bodies.iter().zip(&snapshot.bodies) {
            prop_assert!(within_tolerance(expected, actual, &settings));
        }
    }

    #[test]
    fn prop_relative_snapshot_roundtrip(
        pairs in prop::collection::vec((body_strategy(), body_strategy(), any::<bool>()), 1..=64),
    ) {
        let settings = CodecSettings::for_testing();
        let base: Vec<_> = pairs.iter().map(|(base, _, _)| *base).collect();
        let current: Vec<_> = pairs
            .iter()
            .map(|(base, next, changed)| if *changed { *next } else { *base })
            .collect();

        let bytes = encode_relative_snapshot(&settings, FrameId::new(9), &current, &base).unwrap();
        let snapshot = decode_relative_snapshot(&settings, &bytes, &base).unwrap();

        prop_assert_eq!(snapshot.bodies.len(), current.len());
        for ((expected, actual), (_, _, changed)) in current.iter().zip(&snapshot.bodies).zip(&pairs) {
            if *changed {
                prop_assert!(within_tolerance(expected, actual, &settings));
            } else {
                prop_assert_eq!(expected, actual);
            }
        }
    }
}
