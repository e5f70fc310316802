use crate::client::UserClient;
use crate::definition::BehaviorDefinition;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone)]
pub enum StopCondition {
    Iterations(usize),
    Deadline(Instant),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UserSummary {
    pub iterations: usize,
    pub task_failures: usize,
}

/// One simulated user replaying a shared [`BehaviorDefinition`].
pub struct SimulatedUser {
    definition: Arc<BehaviorDefinition>,
    client: UserClient,
    rng: StdRng,
    summary: UserSummary,
}

impl SimulatedUser {
    #[must_use]
    pub fn new(definition: Arc<BehaviorDefinition>, client: UserClient) -> Self {
        Self::with_rng(definition, client, StdRng::from_entropy())
    }

    #[must_use]
    pub fn with_rng(definition: Arc<BehaviorDefinition>, client: UserClient, rng: StdRng) -> Self {
        Self {
            definition,
            client,
            rng,
            summary: UserSummary::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn definition(&self) -> &BehaviorDefinition {
        &self.definition
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        self.summary
    }

    /// Executes one task and sleeps for a sampled wait. A failed task is
    /// handed to the recorder and never ends the loop.
    pub async fn step(&mut self) -> Duration {
        self.step_until(None).await
    }

    /// Like [`Self::step`], but never sleeps past `deadline`.
    async fn step_until(&mut self, deadline: Option<Instant>) -> Duration {
        self.execute_next().await;
        let mut wait = self.definition.wait_time().sample(&mut self.rng);
        if let Some(deadline) = deadline {
            wait = wait.min(deadline.saturating_duration_since(Instant::now()));
        }
        tokio::time::sleep(wait).await;
        wait
    }

    async fn execute_next(&mut self) {
        let definition = Arc::clone(&self.definition);
        let task = definition.choose_task(&mut self.rng);
        if let Err(e) = task.execute(&mut self.client).await {
            tracing::warn!(
                definition = definition.name(),
                task = task.name(),
                error = %e,
                "task failed"
            );
            self.client
                .recorder()
                .record_task_error(definition.name(), task.name(), &e);
            self.summary.task_failures += 1;
        }
        self.summary.iterations += 1;
    }

    pub async fn run(mut self, stop: StopCondition) -> UserSummary {
        match stop {
            StopCondition::Iterations(n) => {
                for _ in 0..n {
                    self.step().await;
                }
            }
            StopCondition::Deadline(deadline) => {
                while Instant::now() < deadline {
                    self.step_until(Some(deadline)).await;
                }
            }
        }
        tracing::debug!(
            definition = self.definition.name(),
            iterations = self.summary.iterations,
            task_failures = self.summary.task_failures,
            "user stopped"
        );
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpClient, DEFAULT_REQUEST_TIMEOUT};
    use crate::stats::RequestStats;
    use crate::task::{Task, TaskFuture};
    use crate::wait::WaitTime;

    fn noop(_client: &mut UserClient) -> TaskFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn user(wait: WaitTime) -> SimulatedUser {
        let definition = BehaviorDefinition::builder("idle")
            .wait_time(wait)
            .task(Task::new("noop", noop))
            .build()
            .unwrap();
        let client = UserClient::new(
            HttpClient::new(),
            "http://127.0.0.1:1",
            Arc::new(RequestStats::new()),
            DEFAULT_REQUEST_TIMEOUT,
        )
        .unwrap();
        SimulatedUser::with_rng(Arc::new(definition), client, StdRng::seed_from_u64(0))
    }

    #[tokio::test]
    async fn deadline_cuts_long_waits_short() {
        let user = user(WaitTime::constant(5.0).unwrap());
        let started = Instant::now();
        let summary = user
            .run(StopCondition::Deadline(started + Duration::from_millis(100)))
            .await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.task_failures, 0);
    }

    #[tokio::test]
    async fn step_sleeps_the_sampled_wait() {
        let mut user = user(WaitTime::constant(0.05).unwrap());
        let started = Instant::now();
        let wait = user.step().await;
        assert_eq!(wait, Duration::from_millis(50));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(user.summary().iterations, 1);
    }

    #[tokio::test]
    async fn past_deadline_runs_nothing() {
        let user = user(WaitTime::default());
        let summary = user
            .run(StopCondition::Deadline(Instant::now() - Duration::from_millis(1)))
            .await;
        assert_eq!(summary, UserSummary::default());
    }
}
