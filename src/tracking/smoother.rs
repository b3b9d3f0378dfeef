//! Pointer smoothing
//!
//! Raw fingertips jitter by several pixels frame to frame. Each hand's point
//! goes through a short moving average and is then blended with the
//! previously emitted pointer.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::SmoothingProfile;

/// Moving average + exponential blend for one hand
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSmoother {
    history: VecDeque<Vec2>,
    window: usize,
    previous_weight: f32,
    last: Option<Vec2>,
}

impl PointerSmoother {
    pub fn new(profile: SmoothingProfile) -> Self {
        let window = profile.window.max(1);
        Self {
            history: VecDeque::with_capacity(window + 1),
            window,
            previous_weight: profile.previous_weight.clamp(0.0, 1.0),
            last: None,
        }
    }

    /// Feed one raw point, returns the new emitted pointer
    pub fn update(&mut self, raw: Vec2) -> Vec2 {
        self.history.push_back(raw);
        while self.history.len() > self.window {
            self.history.pop_front();
        }

        let mean = self.history.iter().copied().sum::<Vec2>() / self.history.len() as f32;
        // lerp leaves the point untouched once previous == mean
        let emitted = match self.last {
            Some(prev) => prev.lerp(mean, 1.0 - self.previous_weight),
            None => mean,
        };
        self.last = Some(emitted);
        emitted
    }

    /// Last emitted pointer
    pub fn last(&self) -> Option<Vec2> {
        self.last
    }

    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last = None;
    }
}

/// A pointer position stamped with the frame clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub at_ms: u64,
}

/// Recent pointer positions for the blade trail.
///
/// Bounded two ways: at most `capacity` points, none older than `max_age_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerTrail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
    max_age_ms: u64,
}

impl PointerTrail {
    pub fn new(capacity: usize, max_age_ms: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            max_age_ms,
        }
    }

    pub fn record(&mut self, pos: Vec2, now_ms: u64) {
        self.points.push_back(TrailPoint { pos, at_ms: now_ms });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        self.prune(now_ms);
    }

    /// Drop points that are `max_age_ms` old or older
    pub fn prune(&mut self, now_ms: u64) {
        while self
            .points
            .front()
            .is_some_and(|p| now_ms.saturating_sub(p.at_ms) >= self.max_age_ms)
        {
            self.points.pop_front();
        }
    }

    /// Oldest first
    pub fn points(&self) -> Vec<TrailPoint> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solo() -> SmoothingProfile {
        SmoothingProfile {
            window: 4,
            previous_weight: 0.5,
        }
    }

    fn duel() -> SmoothingProfile {
        SmoothingProfile {
            window: 5,
            previous_weight: 0.45,
        }
    }

    #[test]
    fn test_first_point_passes_through() {
        let mut s = PointerSmoother::new(solo());
        assert_eq!(s.update(Vec2::new(10.0, 20.0)), Vec2::new(10.0, 20.0));
        assert_eq!(s.last(), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_mean_then_blend() {
        let mut s = PointerSmoother::new(solo());
        s.update(Vec2::new(0.0, 0.0));
        // mean of (0,0),(100,0) = (50,0); blended with (0,0) at 0.5 -> (25,0)
        let p = s.update(Vec2::new(100.0, 0.0));
        assert!((p - Vec2::new(25.0, 0.0)).length() < 1e-4);

        let mut d = PointerSmoother::new(duel());
        d.update(Vec2::ZERO);
        // mean (50,0); 0.45 * 0 + 0.55 * 50 = 27.5
        let p = d.update(Vec2::new(100.0, 0.0));
        assert!((p.x - 27.5).abs() < 1e-4);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut s = PointerSmoother::new(duel());
        for i in 0..20 {
            s.update(Vec2::splat(i as f32));
        }
        assert_eq!(s.buffered(), 5);
        s.reset();
        assert_eq!(s.buffered(), 0);
        assert_eq!(s.last(), None);
    }

    #[test]
    fn test_constant_input_is_exact_from_fresh() {
        for profile in [solo(), duel()] {
            let mut s = PointerSmoother::new(profile);
            let p = Vec2::new(333.0, 124.0);
            for _ in 0..10 {
                assert_eq!(s.update(p), p);
            }
        }
    }

    #[test]
    fn test_trail_prunes_by_age_and_capacity() {
        let mut t = PointerTrail::new(3, 250);
        t.record(Vec2::ZERO, 0);
        t.record(Vec2::ONE, 100);
        assert_eq!(t.len(), 2);
        t.record(Vec2::splat(2.0), 260);
        // the point at t=0 is 260ms old
        assert_eq!(t.len(), 2);
        t.record(Vec2::splat(3.0), 270);
        t.record(Vec2::splat(4.0), 280);
        assert_eq!(t.len(), 3);
        assert_eq!(t.points()[0].pos, Vec2::splat(2.0));
        t.prune(1000);
        assert!(t.is_empty());
    }

    proptest! {
        #[test]
        fn prop_constant_stream_converges(
            sx in 0.0f32..1280.0, sy in 0.0f32..720.0,
            px in 0.0f32..1280.0, py in 0.0f32..720.0,
            duel_mode in any::<bool>(),
        ) {
            let mut s = PointerSmoother::new(if duel_mode { duel() } else { solo() });
            for _ in 0..8 {
                s.update(Vec2::new(sx, sy));
            }
            let target = Vec2::new(px, py);
            let mut out = Vec2::ZERO;
            for _ in 0..80 {
                out = s.update(target);
            }
            prop_assert!((out - target).length() < 0.01);
        }
    }
}
