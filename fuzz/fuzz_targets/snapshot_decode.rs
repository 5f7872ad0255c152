#![no_main]

use codec::{
    decode_full_snapshot, decode_relative_snapshot, peek_relative_encoding, BodyTransform,
    CodecSettings, Quat, Vec3,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let settings = CodecSettings::for_testing();

    if let Ok(snapshot) = decode_full_snapshot(&settings, data) {
        assert!(snapshot.bodies.len() <= settings.max_physics_objects as usize);
    }

    let count = data.first().map_or(0, |b| usize::from(*b % 65));
    let base: Vec<BodyTransform> = (0..count)
        .map(|i| BodyTransform::new(Vec3::new(i as f64 * 0.1, 0.0, -1.0), Quat::IDENTITY))
        .collect();
    let _ = peek_relative_encoding(&settings, data);
    if let Ok(snapshot) = decode_relative_snapshot(&settings, data, &base) {
        assert_eq!(snapshot.bodies.len(), base.len());
    }
});
