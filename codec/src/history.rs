//! Per-frame history of body transforms.

use std::collections::BTreeMap;

use crate::types::{BodyTransform, FrameId};

/// Body transforms recorded per frame.
///
/// The codec only reads frames while encoding; decoding a relative snapshot
/// inserts the reconstructed frame. Nothing is evicted implicitly.
#[derive(Debug, Clone, Default)]
pub struct FrameHistory {
    frames: BTreeMap<FrameId, Vec<BodyTransform>>,
}

impl FrameHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recorded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Records `bodies` for `frame`, returning the bodies it replaced.
    pub fn insert(
        &mut self,
        frame: FrameId,
        bodies: Vec<BodyTransform>,
    ) -> Option<Vec<BodyTransform>> {
        self.frames.insert(frame, bodies)
    }

    #[must_use]
    pub fn get(&self, frame: FrameId) -> Option<&[BodyTransform]> {
        self.frames.get(&frame).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, frame: FrameId) -> bool {
        self.frames.contains_key(&frame)
    }

    pub fn remove(&mut self, frame: FrameId) -> Option<Vec<BodyTransform>> {
        self.frames.remove(&frame)
    }

    /// Returns the latest frame at or before `frame`.
    ///
    /// Callers use this to pick a baseline the peer is known to have.
    #[must_use]
    pub fn latest_at_or_before(&self, frame: FrameId) -> Option<(FrameId, &[BodyTransform])> {
        self.frames
            .range(..=frame)
            .next_back()
            .map(|(frame, bodies)| (*frame, bodies.as_slice()))
    }

    /// Iterates recorded frame numbers in ascending order.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = FrameId> + '_ {
        self.frames.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(n: usize) -> Vec<BodyTransform> {
        vec![BodyTransform::default(); n]
    }

    #[test]
    fn insert_and_get() {
        let mut history = FrameHistory::new();
        assert!(history.insert(FrameId::new(1), bodies(1)).is_none());
        history.insert(FrameId::new(2), bodies(2));

        assert_eq!(history.get(FrameId::new(1)).map(<[_]>::len), Some(1));
        assert_eq!(history.get(FrameId::new(2)).map(<[_]>::len), Some(2));
        assert!(history.get(FrameId::new(3)).is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn insert_replaces_existing() {
        let mut history = FrameHistory::new();
        history.insert(FrameId::new(4), bodies(1));
        let old = history.insert(FrameId::new(4), bodies(3)).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(history.get(FrameId::new(4)).unwrap().len(), 3);
    }

    #[test]
    fn latest_at_or_before() {
        let mut history = FrameHistory::new();
        for frame in [10, 20, 30] {
            history.insert(FrameId::new(frame), bodies(0));
        }

        let pick = |f| history.latest_at_or_before(FrameId::new(f)).map(|(f, _)| f);
        assert_eq!(pick(25), Some(FrameId::new(20)));
        assert_eq!(pick(30), Some(FrameId::new(30)));
        assert_eq!(pick(5), None);
    }

    #[test]
    fn remove_and_iterate() {
        let mut history = FrameHistory::new();
        for frame in [3, 1, 2] {
            history.insert(FrameId::new(frame), bodies(0));
        }
        assert!(history.remove(FrameId::new(2)).is_some());
        assert!(!history.contains(FrameId::new(2)));
        let frames: Vec<_> = history.frames().collect();
        assert_eq!(frames, vec![FrameId::new(1), FrameId::new(3)]);
    }
}
