//! Per-frame detections from the hand model, and the scoring used to pick
//! the one hand the arm should follow.

use serde::{Deserialize, Serialize};

/// An integer pixel coordinate.
pub type Pixel = (i32, i32);

/// An axis-aligned box in pixel coordinates, `(x1, y1)` top left and
/// `(x2, y2)` bottom right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BoundingBox {
    /// Builds a box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area of the box. Inverted boxes have an area of zero.
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Center of the box, truncated to whole pixels.
    pub fn center(&self) -> Pixel {
        (
            ((self.x1 + self.x2) / 2.0) as i32,
            ((self.y1 + self.y2) / 2.0) as i32,
        )
    }
}

/// One candidate object found by the detection model in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Model specific class id.
    pub class: u32,
    /// Model confidence, `0.0..=1.0`.
    pub confidence: f32,
    /// Where the object is.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Builds a detection.
    pub fn new(class: u32, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class,
            confidence,
            bbox,
        }
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Pixel {
        self.bbox.center()
    }

    /// Ranking score; grows with both box area and confidence, so the
    /// closest, most certain hand wins.
    pub fn score(&self) -> f32 {
        self.bbox.area() * self.confidence.max(0.0)
    }
}

/// Everything the detection model reported for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Detections in model output order.
    pub detections: Vec<Detection>,
    /// Time the model spent on this frame, in milliseconds.
    pub inference_ms: f64,
}

impl Frame {
    /// Builds a frame.
    pub fn new(detections: Vec<Detection>, inference_ms: f64) -> Self {
        Self {
            detections,
            inference_ms,
        }
    }
}

/// The pixel rectangle a hand has to be inside for the arm to move.
/// Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingEnvelope {
    /// Smallest `x` and `y` inside the envelope.
    pub top_left: Pixel,
    /// Largest `x` and `y` inside the envelope.
    pub bottom_right: Pixel,
}

/// The envelope used on a 640x480 capture.
pub const WORKING_ENVELOPE: WorkingEnvelope = WorkingEnvelope {
    top_left: (160, 90),
    bottom_right: (480, 390),
};

impl Default for WorkingEnvelope {
    fn default() -> Self {
        WORKING_ENVELOPE
    }
}

impl WorkingEnvelope {
    /// Whether a point is inside the envelope, edges included.
    pub fn contains(&self, (x, y): Pixel) -> bool {
        (self.top_left.0..=self.bottom_right.0).contains(&x)
            && (self.top_left.1..=self.bottom_right.1).contains(&y)
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.bottom_right.0 - self.top_left.0
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.bottom_right.1 - self.top_left.1
    }
}

/// Picks the highest scoring detection whose class is in `classes`.
///
/// Only a strictly higher score replaces the current pick, so ties go to the
/// detection that came first. Returns `None` if nothing qualifies.
pub fn select_best<'a>(detections: &'a [Detection], classes: &[u32]) -> Option<&'a Detection> {
    let mut best: Option<&Detection> = None;
    for detection in detections.iter().filter(|d| classes.contains(&d.class)) {
        match best {
            Some(current) if detection.score() <= current.score() => {}
            _ => best = Some(detection),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class: u32, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(class, confidence, BoundingBox::new(x1, y1, x2, y2))
    }

    #[test]
    fn area_and_center() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(b.area(), 800.0);
        assert_eq!(b.center(), (20, 40));
    }

    #[test]
    fn inverted_box_has_no_area() {
        assert_eq!(BoundingBox::new(30.0, 0.0, 10.0, 10.0).area(), 0.0);
    }

    #[test]
    fn envelope_edges_are_inclusive() {
        let env = WORKING_ENVELOPE;
        assert!(env.contains(env.top_left));
        assert!(env.contains(env.bottom_right));
        assert!(env.contains((320, 240)));
        assert!(!env.contains((env.top_left.0 - 1, 240)));
        assert!(!env.contains((320, env.bottom_right.1 + 1)));
    }

    #[test]
    fn every_pixel_agrees_with_the_rectangle() {
        let env = WORKING_ENVELOPE;
        for x in (0..640).step_by(7) {
            for y in (0..480).step_by(7) {
                let inside = x >= 160 && x <= 480 && y >= 90 && y <= 390;
                assert_eq!(env.contains((x, y)), inside, "({x}, {y})");
            }
        }
    }

    #[test]
    fn bigger_box_wins_at_equal_confidence() {
        let dets = [
            det(0, 0.9, 0.0, 0.0, 10.0, 10.0),
            det(1, 0.9, 0.0, 0.0, 20.0, 20.0),
        ];
        assert_eq!(select_best(&dets, &[0, 1]), Some(&dets[1]));
    }

    #[test]
    fn more_confident_wins_at_equal_area() {
        let dets = [
            det(0, 0.95, 0.0, 0.0, 10.0, 10.0),
            det(1, 0.86, 0.0, 0.0, 10.0, 10.0),
        ];
        assert_eq!(select_best(&dets, &[0, 1]), Some(&dets[0]));
    }

    #[test]
    fn ties_keep_the_first() {
        let dets = [
            det(1, 0.9, 0.0, 0.0, 10.0, 10.0),
            det(0, 0.9, 50.0, 50.0, 60.0, 60.0),
        ];
        assert_eq!(select_best(&dets, &[0, 1]).map(|d| d.class), Some(1));
    }

    #[test]
    fn filtered_classes_are_ignored() {
        let dets = [
            det(7, 1.0, 0.0, 0.0, 100.0, 100.0),
            det(0, 0.5, 0.0, 0.0, 5.0, 5.0),
        ];
        assert_eq!(select_best(&dets, &[0, 1]).map(|d| d.class), Some(0));
        assert_eq!(select_best(&dets, &[3]), None);
    }

    #[test]
    fn empty_frame_has_no_best() {
        assert_eq!(select_best(&[], &[0, 1]), None);
    }
}
