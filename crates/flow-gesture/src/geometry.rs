//! Landmark geometry.
//!
//! Pure ratio math over normalized face-mesh coordinates. The landmark
//! indices follow MediaPipe face-mesh numbering; any producer of 468-point
//! meshes in that layout works.

/// A normalized landmark coordinate in `[0, 1] x [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Face-mesh landmark indices used by the detectors.
pub mod landmarks {
    /// Left eye outline: outer corner, two upper lid points, inner corner,
    /// two lower lid points.
    pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
    pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
    /// Mouth outline: corners plus paired upper/lower lip points.
    pub const MOUTH: [usize; 12] = [61, 84, 17, 314, 405, 320, 307, 375, 321, 308, 324, 318];
    /// Nose tip.
    pub const NOSE: usize = 1;
}

/// Eye aspect ratio over the 6-point eye outline.
///
/// Near 0.3 for an open eye, dropping toward 0.1 when it closes.
#[must_use]
pub fn eye_aspect_ratio(p: &[Point; 6]) -> f32 {
    let horizontal = p[0].distance(p[3]);
    if horizontal <= f32::EPSILON {
        return 0.0;
    }
    (p[1].distance(p[5]) + p[2].distance(p[4])) / (2.0 * horizontal)
}

/// Mouth aspect ratio over the 12-point mouth outline.
#[must_use]
pub fn mouth_aspect_ratio(p: &[Point; 12]) -> f32 {
    let horizontal = p[0].distance(p[6]);
    if horizontal <= f32::EPSILON {
        return 0.0;
    }
    (p[3].distance(p[9]) + p[2].distance(p[10]) + p[4].distance(p[8])) / (3.0 * horizontal)
}

/// One frame's worth of face-mesh landmarks.
#[derive(Debug, Clone)]
pub struct FrameLandmarks {
    points: Vec<Point>,
}

impl FrameLandmarks {
    /// Wrap a mesh; detectors expect at least the indices in [`landmarks`].
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    fn gather<const N: usize>(&self, indices: &[usize; N]) -> Option<[Point; N]> {
        let mut out = [Point::default(); N];
        for (slot, &index) in out.iter_mut().zip(indices) {
            *slot = *self.points.get(index)?;
        }
        Some(out)
    }

    #[must_use]
    pub fn left_eye(&self) -> Option<[Point; 6]> {
        self.gather(&landmarks::LEFT_EYE)
    }

    #[must_use]
    pub fn right_eye(&self) -> Option<[Point; 6]> {
        self.gather(&landmarks::RIGHT_EYE)
    }

    #[must_use]
    pub fn mouth(&self) -> Option<[Point; 12]> {
        self.gather(&landmarks::MOUTH)
    }

    #[must_use]
    pub fn nose(&self) -> Option<Point> {
        self.points.get(landmarks::NOSE).copied()
    }

    /// Midpoint of the two inner eye corners, a stable rotation reference.
    #[must_use]
    pub fn eye_center(&self) -> Option<Point> {
        let left = *self.points.get(landmarks::LEFT_EYE[3])?;
        let right = *self.points.get(landmarks::RIGHT_EYE[3])?;
        Some(Point::new(
            (left.x + right.x) / 2.0,
            (left.y + right.y) / 2.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(openness: f32) -> [Point; 6] {
        [
            Point::new(0.0, 0.5),
            Point::new(0.3, 0.5 - openness / 2.0),
            Point::new(0.7, 0.5 - openness / 2.0),
            Point::new(1.0, 0.5),
            Point::new(0.7, 0.5 + openness / 2.0),
            Point::new(0.3, 0.5 + openness / 2.0),
        ]
    }

    #[test]
    fn open_eye_has_higher_ratio_than_closed() {
        let open = eye_aspect_ratio(&eye(0.3));
        let closed = eye_aspect_ratio(&eye(0.05));
        assert!(open > closed);
        assert!((open - 0.3).abs() < 1e-6);
    }

    #[test]
    fn degenerate_eye_yields_zero() {
        let collapsed = [Point::new(0.5, 0.5); 6];
        assert_eq!(eye_aspect_ratio(&collapsed), 0.0);
    }

    #[test]
    fn mouth_ratio_tracks_vertical_gap() {
        let mut closed = [Point::default(); 12];
        for (i, p) in closed.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 / 12.0;
            *p = Point::new(x, 0.5);
        }
        closed[0] = Point::new(0.0, 0.5);
        closed[6] = Point::new(1.0, 0.5);

        let mut open = closed;
        for i in [2, 3, 4] {
            open[i].y = 0.3;
        }
        for i in [8, 9, 10] {
            open[i].y = 0.7;
        }

        assert!(mouth_aspect_ratio(&open) > mouth_aspect_ratio(&closed));
    }

    #[test]
    fn frame_with_too_few_points_yields_none() {
        let frame = FrameLandmarks::new(vec![Point::default(); 10]);
        assert!(frame.left_eye().is_none());
        assert!(frame.nose().is_none());
    }

    #[test]
    fn frame_gathers_by_mesh_index() {
        let mut points = vec![Point::default(); 468];
        points[landmarks::NOSE] = Point::new(0.5, 0.6);
        points[landmarks::LEFT_EYE[0]] = Point::new(0.3, 0.4);
        let frame = FrameLandmarks::new(points);
        assert_eq!(frame.nose(), Some(Point::new(0.5, 0.6)));
        assert_eq!(frame.left_eye().unwrap()[0], Point::new(0.3, 0.4));
    }
}
