//! Online motion simplifier
//!
//! Consumes the dense stream of simulated waypoints and commits only the
//! points where the path stops being straight. While a segment is pending,
//! the displacement from the last committed point is extended one step at a
//! time by `(n + 1) / n`, so the pending vector always reaches the latest
//! accepted waypoint without storing the points in between. A waypoint is
//! absorbed when it lies within `max_error` of that extrapolation.

use heightmill_core::Point3;

/// Pending segment state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pending {
    /// Nothing pending; the next waypoint starts a segment
    Idle,
    /// A straight run of `steps` waypoints spanning `delta`
    Accumulating {
        /// Displacement from the last committed point
        delta: Point3,
        /// Waypoints folded into `delta`
        steps: u64,
    },
    /// Flushed or repositioned; the next waypoint is committed as is
    JustFlushed,
}

/// Merges near-collinear waypoints into single motion commands
#[derive(Debug, Clone)]
pub struct MotionSimplifier {
    position: Point3,
    pending: Pending,
    max_error: f64,
}

impl MotionSimplifier {
    /// Create a simplifier parked at `origin`
    ///
    /// It starts flushed, so the first waypoint is committed directly.
    pub fn new(origin: Point3, max_error: f64) -> Self {
        Self {
            position: origin,
            pending: Pending::JustFlushed,
            max_error,
        }
    }

    /// Last committed position
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Current pending state
    pub fn pending(&self) -> Pending {
        self.pending
    }

    /// Feed the next waypoint, returning the point committed by this call
    pub fn accept(&mut self, target: Point3) -> Option<Point3> {
        match self.pending {
            Pending::JustFlushed => {
                self.position = target;
                self.pending = Pending::Idle;
                Some(target)
            }
            Pending::Idle => {
                self.pending = Pending::Accumulating {
                    delta: target.sub(&self.position),
                    steps: 1,
                };
                None
            }
            Pending::Accumulating { delta, steps } => {
                let n = steps as f64;
                let extended = delta.scale((n + 1.0) / n);
                let projected = self.position.add(&extended);

                if projected.distance(&target) < self.max_error {
                    self.pending = Pending::Accumulating {
                        delta: extended,
                        steps: steps.saturating_add(1),
                    };
                    return None;
                }

                let end = self.position.add(&delta);
                self.position = end;
                self.pending = Pending::Accumulating {
                    delta: target.sub(&end),
                    steps: 1,
                };
                Some(end)
            }
        }
    }

    /// Flush the pending segment, if any
    ///
    /// Safe to call repeatedly; only the first call after a run of waypoints
    /// can commit anything.
    pub fn finish(&mut self) -> Option<Point3> {
        let flushed = match self.pending {
            Pending::Accumulating { delta, .. } if !delta.is_zero() => {
                let end = self.position.add(&delta);
                self.position = end;
                Some(end)
            }
            _ => None,
        };
        self.pending = Pending::JustFlushed;
        flushed
    }

    /// Flush, then jump to `to` without merging
    ///
    /// Returns the flushed commit, which must be emitted before the rapid
    /// move to `to`.
    pub fn reposition(&mut self, to: Point3) -> Option<Point3> {
        let flushed = self.finish();
        self.position = to;
        flushed
    }
}
