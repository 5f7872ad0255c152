//! Snapshot cache tying the history to the encoders.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::delta::{decode_relative_snapshot, encode_relative_snapshot};
use crate::error::{CodecError, CodecResult};
use crate::history::FrameHistory;
use crate::settings::CodecSettings;
use crate::snapshot::{decode_full_snapshot, encode_full_snapshot};
use crate::types::{BodyTransform, FrameId, Snapshot};

/// Memoizes encoded snapshots for one session.
///
/// Holds the frame history, a single full-snapshot slot, and relative
/// snapshots keyed by `(frame, base_frame)`. Encoded buffers are shared, so
/// a repeated request returns the same allocation.
///
/// The cache is not synchronized; callers that encode from several threads
/// must serialize access to it.
#[derive(Debug)]
pub struct SnapshotCache {
    settings: CodecSettings,
    history: FrameHistory,
    full: Option<(FrameId, Arc<[u8]>)>,
    relative: HashMap<(FrameId, FrameId), Arc<[u8]>>,
}

impl SnapshotCache {
    /// Creates an empty cache after validating `settings`.
    pub fn new(settings: CodecSettings) -> CodecResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            history: FrameHistory::new(),
            full: None,
            relative: HashMap::new(),
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    #[must_use]
    pub const fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Number of relative snapshots currently memoized.
    #[must_use]
    pub fn cached_relative_count(&self) -> usize {
        self.relative.len()
    }

    /// Records the bodies of `frame`.
    ///
    /// Replacing a recorded frame drops every cached buffer built from it.
    pub fn record_frame(&mut self, frame: FrameId, bodies: Vec<BodyTransform>) {
        trace!(frame = frame.raw(), bodies = bodies.len(), "recording frame");
        if self.history.insert(frame, bodies).is_some() {
            self.invalidate(frame);
        }
    }

    /// Drops `frame` and every cached buffer that references it.
    pub fn evict_frame(&mut self, frame: FrameId) -> Option<Vec<BodyTransform>> {
        self.invalidate(frame);
        self.history.remove(frame)
    }

    /// Returns the full snapshot of `frame`, encoding it on first request.
    pub fn collect_full_snapshot(&mut self, frame: FrameId) -> CodecResult<Arc<[u8]>> {
        if let Some((cached_frame, bytes)) = &self.full {
            if *cached_frame == frame {
                debug!(frame = frame.raw(), "full snapshot cache hit");
                return Ok(Arc::clone(bytes));
            }
        }

        let bodies = self
            .history
            .get(frame)
            .ok_or(CodecError::MissingFrame { frame })?;
        let bytes: Arc<[u8]> = encode_full_snapshot(&self.settings, frame, bodies)?.into();
        self.full = Some((frame, Arc::clone(&bytes)));
        Ok(bytes)
    }

    /// Returns the snapshot of `frame` relative to `base_frame`, encoding it
    /// on first request.
    pub fn collect_relative_snapshot(
        &mut self,
        frame: FrameId,
        base_frame: FrameId,
    ) -> CodecResult<Arc<[u8]>> {
        if let Some(bytes) = self.relative.get(&(frame, base_frame)) {
            debug!(
                frame = frame.raw(),
                base_frame = base_frame.raw(),
                "relative snapshot cache hit"
            );
            return Ok(Arc::clone(bytes));
        }

        let bodies = self
            .history
            .get(frame)
            .ok_or(CodecError::MissingFrame { frame })?;
        let base_bodies = self
            .history
            .get(base_frame)
            .ok_or(CodecError::MissingFrame { frame: base_frame })?;
        let bytes: Arc<[u8]> =
            encode_relative_snapshot(&self.settings, frame, bodies, base_bodies)?.into();
        self.relative
            .insert((frame, base_frame), Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Decodes a full snapshot without touching the history.
    pub fn decode_full_snapshot(&self, bytes: &[u8]) -> CodecResult<Snapshot> {
        decode_full_snapshot(&self.settings, bytes)
    }

    /// Decodes a full snapshot and records it under its frame number.
    pub fn apply_full_snapshot(&mut self, bytes: &[u8]) -> CodecResult<Snapshot> {
        let snapshot = decode_full_snapshot(&self.settings, bytes)?;
        self.record_frame(snapshot.frame, snapshot.bodies.clone());
        Ok(snapshot)
    }

    /// Decodes a relative snapshot against `base_frame` and records the
    /// result under the frame number carried in the buffer.
    pub fn decode_relative_snapshot(
        &mut self,
        bytes: &[u8],
        base_frame: FrameId,
    ) -> CodecResult<Snapshot> {
        let base_bodies = self
            .history
            .get(base_frame)
            .ok_or(CodecError::MissingFrame { frame: base_frame })?;
        let snapshot = decode_relative_snapshot(&self.settings, bytes, base_bodies)?;
        self.record_frame(snapshot.frame, snapshot.bodies.clone());
        Ok(snapshot)
    }

    fn invalidate(&mut self, frame: FrameId) {
        if matches!(&self.full, Some((cached, _)) if *cached == frame) {
            self.full = None;
        }
        self.relative
            .retain(|(f, base), _| *f != frame && *base != frame);
    }
}
