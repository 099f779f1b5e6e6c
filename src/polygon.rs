use crate::mapper::Point;

pub const DEFAULT_GRAVITY_THRESHOLD: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolygonState {
    /// Accepting points, drawn as a polyline.
    Open,
    /// Last vertex snapped onto the first. The point list is frozen.
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Appended,
    /// The new point fell within the gravity threshold of the first one
    /// and was replaced by an exact copy of it.
    Closed,
    Rejected,
}

/// Ordered click points in original image space plus the open/closed state.
#[derive(Clone, Debug)]
pub struct PolygonBuilder {
    points: Vec<Point>,
    state: PolygonState,
    gravity_threshold: f32,
}

impl PolygonBuilder {
    pub fn new(gravity_threshold: f32) -> Self {
        Self {
            points: Vec::new(),
            state: PolygonState::Open,
            gravity_threshold,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn state(&self) -> PolygonState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == PolygonState::Closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn gravity_threshold(&self) -> f32 {
        self.gravity_threshold
    }

    /// Consecutive vertex pairs, first to last. Empty below two points.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn push(&mut self, point: Point) -> PushOutcome {
        if self.state == PolygonState::Closed || !point.is_finite() {
            return PushOutcome::Rejected;
        }
        self.points.push(point);
        if self.try_close() {
            PushOutcome::Closed
        } else {
            PushOutcome::Appended
        }
    }

    fn try_close(&mut self) -> bool {
        let n = self.points.len();
        if n < 2 {
            return false;
        }
        let first = self.points[0];
        if self.points[n - 1].distance_to(&first) < self.gravity_threshold {
            self.points[n - 1] = first;
            self.state = PolygonState::Closed;
            return true;
        }
        false
    }
}

impl Default for PolygonBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY_THRESHOLD)
    }
}
