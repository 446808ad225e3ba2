//! Scripted location backend for tests and the demo binary.

use crate::geo::Coordinate;
use crate::position::source::LocationBackend;
use crate::position::types::{PositionError, PositionFix};
use std::collections::VecDeque;
use std::time::Duration;

/// A backend that replays a scripted trace of coordinates, or fails with a
/// fixed error. Once the trace is exhausted it keeps reporting the last
/// coordinate, as a stationary device would.
pub struct MockLocationBackend {
    trace: VecDeque<Coordinate>,
    last: Option<Coordinate>,
    failure: Option<PositionError>,
    /// Simulated acquisition latency per fix
    delay: Duration,
    /// Reported accuracy radius in meters
    accuracy: f64,
    /// Reported ground speed in m/s
    speed: Option<f64>,
}

impl MockLocationBackend {
    /// Backend that replays the given coordinates in order.
    pub fn with_trace(trace: Vec<Coordinate>) -> Self {
        Self {
            trace: trace.into(),
            last: None,
            failure: None,
            delay: Duration::ZERO,
            accuracy: 5.0,
            speed: Some(1.4),
        }
    }

    /// Backend that always fails with the given error.
    pub fn failing(error: PositionError) -> Self {
        Self {
            trace: VecDeque::new(),
            last: None,
            failure: Some(error),
            delay: Duration::ZERO,
            accuracy: 5.0,
            speed: None,
        }
    }

    /// Simulate acquisition latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Override the reported accuracy radius.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Override the reported speed.
    pub fn with_speed(mut self, speed: Option<f64>) -> Self {
        self.speed = speed;
        self
    }
}

impl LocationBackend for MockLocationBackend {
    async fn acquire_fix(&mut self) -> Result<PositionFix, PositionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let coordinate = match self.trace.pop_front() {
            Some(next) => {
                self.last = Some(next);
                next
            }
            None => self.last.ok_or(PositionError::PositionUnavailable)?,
        };

        Ok(PositionFix::new(coordinate, self.speed, self.accuracy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_then_holds_last() {
        let mut backend = MockLocationBackend::with_trace(vec![
            Coordinate::new(19.80, -97.40),
            Coordinate::new(19.81, -97.39),
        ]);

        assert_eq!(backend.acquire_fix().await.unwrap().coordinate.lat, 19.80);
        assert_eq!(backend.acquire_fix().await.unwrap().coordinate.lat, 19.81);
        // Trace exhausted: stays at the last point
        assert_eq!(backend.acquire_fix().await.unwrap().coordinate.lat, 19.81);
    }

    #[tokio::test]
    async fn test_empty_trace_is_unavailable() {
        let mut backend = MockLocationBackend::with_trace(vec![]);
        assert_eq!(
            backend.acquire_fix().await.unwrap_err(),
            PositionError::PositionUnavailable
        );
    }
}
