//! A fake hand detector, for exercising the control loop without a camera.
//!
//! The fake hand wanders around the frame in a random walk, now and then
//! switching class or disappearing for a frame, and frames are paced to a
//! steady rate like a real capture would be.

use crate::detection::{BoundingBox, Detection, Frame};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Produces synthetic [`Frame`]s. Built with [`DummyDetector::builder`].
pub struct DummyDetector {
    rng: StdRng,
    position: (f32, f32),
    frame_size: (f32, f32),
    classes: Vec<u32>,
    step: f32,
    hand_size: f32,
    dropout: f64,
    switch: f64,
    class_index: usize,
    frame_period: Option<Duration>,
    last_frame: Option<Instant>,
    frames_left: Option<usize>,
}

/// Configures a [`DummyDetector`].
pub struct DummyDetectorBuilder {
    seed: Option<u64>,
    frame_size: (f32, f32),
    classes: Vec<u32>,
    step: f32,
    hand_size: f32,
    dropout: f64,
    switch: f64,
    fps: Option<f64>,
    frames: Option<usize>,
}

impl Default for DummyDetectorBuilder {
    fn default() -> Self {
        Self {
            seed: None,
            frame_size: (640.0, 480.0),
            classes: vec![0, 1],
            step: 12.0,
            hand_size: 80.0,
            dropout: 0.05,
            switch: 0.02,
            fps: Some(30.0),
            frames: None,
        }
    }
}

impl DummyDetectorBuilder {
    /// Seeds the random walk so runs are repeatable.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Size of the fake capture, in pixels.
    pub fn frame_size(mut self, width: f32, height: f32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Classes the fake hand cycles through.
    pub fn classes(mut self, classes: &[u32]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    /// Largest move per frame on each axis, in pixels.
    pub fn step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Chance, per frame, that the hand is not detected at all.
    pub fn dropout(mut self, probability: f64) -> Self {
        self.dropout = probability.clamp(0.0, 1.0);
        self
    }

    /// Chance, per frame, that the hand switches to the next class.
    pub fn switch_class(mut self, probability: f64) -> Self {
        self.switch = probability.clamp(0.0, 1.0);
        self
    }

    /// Frames per second to pace output at; `None` produces frames as fast
    /// as they are asked for.
    pub fn fps(mut self, fps: Option<f64>) -> Self {
        self.fps = fps.filter(|f| *f > 0.0);
        self
    }

    /// Stops after this many frames; unlimited by default.
    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Builds the detector with the hand in the middle of the frame.
    pub fn build(self) -> DummyDetector {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let classes = if self.classes.is_empty() {
            vec![0]
        } else {
            self.classes
        };
        DummyDetector {
            rng,
            position: (self.frame_size.0 / 2.0, self.frame_size.1 / 2.0),
            frame_size: self.frame_size,
            classes,
            step: self.step,
            hand_size: self.hand_size,
            dropout: self.dropout,
            switch: self.switch,
            class_index: 0,
            frame_period: self.fps.map(|fps| Duration::from_secs_f64(1.0 / fps)),
            last_frame: None,
            frames_left: self.frames,
        }
    }
}

impl DummyDetector {
    /// Starts configuring a detector.
    pub fn builder() -> DummyDetectorBuilder {
        DummyDetectorBuilder::default()
    }

    fn pace(&mut self) {
        if let (Some(period), Some(last)) = (self.frame_period, self.last_frame) {
            if let Some(remaining) = period.checked_sub(last.elapsed()) {
                spin_sleep::sleep(remaining);
            }
        }
        self.last_frame = Some(Instant::now());
    }

    fn wander(&mut self) {
        let dx = self.rng.gen_range(-self.step..=self.step);
        let dy = self.rng.gen_range(-self.step..=self.step);
        let half = self.hand_size / 2.0;
        self.position.0 = (self.position.0 + dx).clamp(half, self.frame_size.0 - half);
        self.position.1 = (self.position.1 + dy).clamp(half, self.frame_size.1 - half);
        if self.rng.gen_bool(self.switch) {
            self.class_index = (self.class_index + 1) % self.classes.len();
        }
    }
}

impl Iterator for DummyDetector {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }

        self.pace();
        let started = Instant::now();
        self.wander();

        let detections = if self.rng.gen_bool(self.dropout) {
            vec![]
        } else {
            let (x, y) = self.position;
            let half = self.hand_size / 2.0;
            vec![Detection::new(
                self.classes[self.class_index],
                self.rng.gen_range(0.85..1.0),
                BoundingBox::new(x - half, y - half, x + half, y + half),
            )]
        };
        let inference_ms = (started.elapsed().as_secs_f64() * 1000.0 * 10.0).round() / 10.0;
        Some(Frame::new(detections, inference_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> DummyDetectorBuilder {
        DummyDetector::builder().seed(7).fps(None)
    }

    #[test]
    fn stops_after_the_requested_frames() {
        assert_eq!(quick().frames(25).build().count(), 25);
    }

    #[test]
    fn hand_stays_inside_the_frame() {
        for frame in quick().step(200.0).frames(200).build() {
            for detection in frame.detections {
                let (x, y) = detection.center();
                assert!((0..=640).contains(&x) && (0..=480).contains(&y));
                assert!((0.85..1.0).contains(&detection.confidence));
            }
        }
    }

    #[test]
    fn uses_only_the_given_classes() {
        let classes: Vec<u32> = quick()
            .classes(&[2, 3])
            .switch_class(0.5)
            .dropout(0.0)
            .frames(100)
            .build()
            .flat_map(|f| f.detections)
            .map(|d| d.class)
            .collect();
        assert_eq!(classes.len(), 100);
        assert!(classes.iter().all(|c| *c == 2 || *c == 3));
        assert!(classes.contains(&3));
    }

    #[test]
    fn full_dropout_detects_nothing() {
        assert!(quick()
            .dropout(1.0)
            .frames(20)
            .build()
            .all(|f| f.detections.is_empty()));
    }

    #[test]
    fn same_seed_same_walk() {
        let a: Vec<_> = quick().frames(10).build().flat_map(|f| f.detections).collect();
        let b: Vec<_> = quick().frames(10).build().flat_map(|f| f.detections).collect();
        assert_eq!(a, b);
    }
}
