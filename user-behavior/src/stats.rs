use crate::error::TaskError;
use hyper::{Method, StatusCode};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one request issued by a [`crate::UserClient`].
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    pub name: String,
    pub status: Option<StatusCode>,
    pub elapsed: Duration,
    pub content_length: usize,
    pub error: Option<String>,
}

impl RequestRecord {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sink the harness provides for per-request and per-task outcomes.
pub trait Recorder: Send + Sync {
    fn record_request(&self, record: &RequestRecord);

    fn record_task_error(&self, definition: &str, task: &str, error: &TaskError);
}

#[derive(Debug, Copy, Clone)]
pub struct EndpointStats {
    pub num_requests: usize,
    pub num_failures: usize,
    pub min_rtt: Duration,
    pub max_rtt: Duration,
    pub total_rtt: Duration,
    pub total_content_length: usize,
}

impl EndpointStats {
    fn new() -> Self {
        Self {
            num_requests: 0,
            num_failures: 0,
            min_rtt: Duration::MAX,
            max_rtt: Duration::ZERO,
            total_rtt: Duration::ZERO,
            total_content_length: 0,
        }
    }

    fn update(&mut self, record: &RequestRecord) {
        self.num_requests += 1;
        if !record.is_success() {
            self.num_failures += 1;
        }
        if record.elapsed < self.min_rtt {
            self.min_rtt = record.elapsed;
        }
        if record.elapsed > self.max_rtt {
            self.max_rtt = record.elapsed;
        }
        self.total_rtt += record.elapsed;
        self.total_content_length += record.content_length;
    }

    #[inline]
    #[must_use]
    pub fn num_successes(&self) -> usize {
        self.num_requests - self.num_failures
    }

    #[must_use]
    pub fn mean_rtt(&self) -> Duration {
        if self.num_requests == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_rtt.as_secs_f64() / self.num_requests as f64)
    }
}

#[derive(Default)]
struct Inner {
    endpoints: BTreeMap<(String, String), EndpointStats>,
    task_errors: BTreeMap<(String, String), usize>,
}

/// In-memory [`Recorder`], cloned into every user of a run.
#[derive(Clone, Default)]
pub struct RequestStats {
    inner: Arc<Mutex<Inner>>,
}

impl RequestStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn endpoint(&self, method: &Method, name: &str) -> Option<EndpointStats> {
        self.inner
            .lock()
            .endpoints
            .get(&(method.to_string(), name.to_string()))
            .copied()
    }

    #[must_use]
    pub fn total(&self) -> EndpointStats {
        let inner = self.inner.lock();
        let mut total = EndpointStats::new();
        for stats in inner.endpoints.values() {
            total.num_requests += stats.num_requests;
            total.num_failures += stats.num_failures;
            total.min_rtt = total.min_rtt.min(stats.min_rtt);
            total.max_rtt = total.max_rtt.max(stats.max_rtt);
            total.total_rtt += stats.total_rtt;
            total.total_content_length += stats.total_content_length;
        }
        total
    }

    #[must_use]
    pub fn task_errors(&self, definition: &str, task: &str) -> usize {
        self.inner
            .lock()
            .task_errors
            .get(&(definition.to_string(), task.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl Recorder for RequestStats {
    fn record_request(&self, record: &RequestRecord) {
        self.inner
            .lock()
            .endpoints
            .entry((record.method.to_string(), record.name.clone()))
            .or_insert_with(EndpointStats::new)
            .update(record);
    }

    fn record_task_error(&self, definition: &str, task: &str, _error: &TaskError) {
        *self
            .inner
            .lock()
            .task_errors
            .entry((definition.to_string(), task.to_string()))
            .or_default() += 1;
    }
}

impl fmt::Display for RequestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        writeln!(f, "Results:")?;
        for ((method, name), stats) in &inner.endpoints {
            writeln!(
                f,
                "    {method:<6} {name:<24} reqs={:<8} fails={:<8} rtt my s [min, mean, max] = [{}, {}, {}]",
                stats.num_requests,
                stats.num_failures,
                stats.min_rtt.as_micros(),
                stats.mean_rtt().as_micros(),
                stats.max_rtt.as_micros(),
            )?;
        }
        for ((definition, task), count) in &inner.task_errors {
            writeln!(f, "    task error {definition}::{task} x{count}")?;
        }
        Ok(())
    }
}
