//! Inspection and conversion tools for bodysync snapshots.
//!
//! This crate provides the building blocks behind the `bodysync-tools`
//! binary:
//!
//! - Load codec settings and frames from JSON
//! - Summarize an encoded snapshot (frame, size, relative encoding)
//! - Decode snapshots to JSON or a readable table
//! - Encode full or relative snapshots from JSON frames
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use codec::{CodecSettings, RelativeEncoding, Snapshot};
use serde::Serialize;

/// Summary of one encoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub frame: u32,
    pub byte_len: usize,
    /// Present when the buffer was read as a relative snapshot.
    pub encoding: Option<&'static str>,
}

/// Parses settings JSON; omitted fields take their defaults.
pub fn parse_settings(json: &str) -> Result<CodecSettings> {
    let settings: CodecSettings = serde_json::from_str(json).context("parse settings json")?;
    settings
        .validate()
        .map_err(|err| anyhow::anyhow!("settings validation failed: {err}"))?;
    Ok(settings)
}

/// Loads settings from `path`, or the defaults when no path is given.
pub fn load_settings(path: Option<&Path>) -> Result<CodecSettings> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read settings {}", path.display()))?;
            parse_settings(&contents)
        }
        None => Ok(CodecSettings::default()),
    }
}

/// Loads a `{ "frame": N, "bodies": [...] }` document.
pub fn load_frame(path: &Path) -> Result<Snapshot> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read frame {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse frame {}", path.display()))
}

pub fn inspect_snapshot(
    bytes: &[u8],
    settings: &CodecSettings,
    relative: bool,
) -> Result<InspectReport> {
    let (frame, encoding) = if relative {
        let (frame, encoding) =
            codec::peek_relative_encoding(settings, bytes).context("read relative header")?;
        let label = match encoding {
            RelativeEncoding::Sparse => "sparse",
            RelativeEncoding::Dense => "dense",
        };
        (frame, Some(label))
    } else {
        (
            codec::peek_frame(settings, bytes).context("read header")?,
            None,
        )
    };
    Ok(InspectReport {
        frame: frame.raw(),
        byte_len: bytes.len(),
        encoding,
    })
}

/// Decodes a full snapshot, or a relative one when `base` is given.
pub fn decode_snapshot(
    bytes: &[u8],
    settings: &CodecSettings,
    base: Option<&Snapshot>,
) -> Result<Snapshot> {
    match base {
        Some(base) => codec::decode_relative_snapshot(settings, bytes, &base.bodies)
            .with_context(|| format!("decode relative to frame {}", base.frame.raw())),
        None => codec::decode_full_snapshot(settings, bytes).context("decode full snapshot"),
    }
}

/// Encodes `frame` in full, or relative to `base` when given.
pub fn encode_snapshot(
    frame: &Snapshot,
    settings: &CodecSettings,
    base: Option<&Snapshot>,
) -> Result<Vec<u8>> {
    match base {
        Some(base) => {
            codec::encode_relative_snapshot(settings, frame.frame, &frame.bodies, &base.bodies)
                .with_context(|| {
                    format!(
                        "encode frame {} relative to frame {}",
                        frame.frame.raw(),
                        base.frame.raw()
                    )
                })
        }
        None => codec::encode_full_snapshot(settings, frame.frame, &frame.bodies)
            .with_context(|| format!("encode frame {}", frame.frame.raw())),
    }
}

pub fn format_snapshot_pretty(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "frame {} ({} bodies)",
        snapshot.frame.raw(),
        snapshot.bodies.len()
    );
    for (index, body) in snapshot.bodies.iter().enumerate() {
        let p = body.position;
        let q = body.rotation;
        let _ = writeln!(
            out,
            "  [{index:>4}] pos ({:>9.3}, {:>9.3}, {:>9.3})  rot ({:>6.3}, {:>6.3}, {:>6.3}, {:>6.3})",
            p.x, p.y, p.z, q.x, q.y, q.z, q.w
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{BodyTransform, FrameId, Quat, Vec3};

    fn frame(frame: u32, offset: f64) -> Snapshot {
        Snapshot {
            frame: FrameId::new(frame),
            bodies: (0..16)
                .map(|i| {
                    BodyTransform::new(
                        Vec3::new(f64::from(i) * 0.5 + offset, 1.0, -2.0),
                        Quat::IDENTITY,
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn parse_settings_fills_defaults() {
        let settings = parse_settings(r#"{ "units_per_meter": 100 }"#).unwrap();
        assert_eq!(settings.units_per_meter, 100);
        assert_eq!(
            settings.max_physics_objects,
            CodecSettings::default().max_physics_objects
        );
    }

    #[test]
    fn parse_settings_rejects_invalid() {
        assert!(parse_settings(r#"{ "orientation_bits": 12 }"#).is_err());
        assert!(parse_settings("not json").is_err());
    }

    #[test]
    fn inspect_full_snapshot() {
        let settings = CodecSettings::for_testing();
        let bytes = encode_snapshot(&frame(7, 0.0), &settings, None).unwrap();
        let report = inspect_snapshot(&bytes, &settings, false).unwrap();
        assert_eq!(report.frame, 7);
        assert_eq!(report.byte_len, bytes.len());
        assert_eq!(report.encoding, None);
    }

    #[test]
    fn inspect_relative_snapshot_reports_encoding() {
        let settings = CodecSettings::for_testing();
        let base = frame(1, 0.0);
        let mut next = base.clone();
        next.frame = FrameId::new(2);
        next.bodies[1].position.x += 0.5;

        let bytes = encode_snapshot(&next, &settings, Some(&base)).unwrap();
        let report = inspect_snapshot(&bytes, &settings, true).unwrap();
        assert_eq!(report.frame, 2);
        assert_eq!(report.encoding, Some("sparse"));

        let everything = encode_snapshot(&frame(3, 0.25), &settings, Some(&base)).unwrap();
        let report = inspect_snapshot(&everything, &settings, true).unwrap();
        assert_eq!(report.encoding, Some("dense"));
    }

    #[test]
    fn decode_relative_snapshot_against_base() {
        let settings = CodecSettings::for_testing();
        let base = frame(1, 0.0);
        let next = frame(2, 0.25);

        let bytes = encode_snapshot(&next, &settings, Some(&base)).unwrap();
        let decoded = decode_snapshot(&bytes, &settings, Some(&base)).unwrap();
        assert_eq!(decoded.frame, FrameId::new(2));
        for (expected, actual) in next.bodies.iter().zip(&decoded.bodies) {
            assert!((expected.position.x - actual.position.x).abs() <= 0.01);
        }
    }

    #[test]
    fn frame_json_roundtrip() {
        let snapshot = frame(3, 0.5);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn pretty_output_lists_bodies() {
        let text = format_snapshot_pretty(&frame(9, 0.0));
        assert!(text.starts_with("frame 9 (16 bodies)"));
        assert_eq!(text.lines().count(), 17);
    }
}
