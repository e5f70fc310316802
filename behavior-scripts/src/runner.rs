use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use user_behavior::{HttpClient, Registry, RequestStats, SimulatedUser, StopCondition, UserClient};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub users: usize,
    pub stop: StopCondition,
    /// Overrides the host declared by the definitions.
    pub host: Option<String>,
    pub request_timeout: Duration,
}

/// Spawns `users` simulated users, each running a definition picked from the
/// registry by weight, and waits for all of them to stop.
pub async fn run(registry: &Registry, config: RunConfig) -> anyhow::Result<RequestStats> {
    if registry.is_empty() {
        bail!("No behavior definitions registered");
    }
    let stats = RequestStats::new();
    let http = HttpClient::new();
    let mut rng = StdRng::from_entropy();
    let mut users = Vec::with_capacity(config.users);
    for id in 0..config.users {
        let definition = registry
            .choose(&mut rng)
            .context("Failed to pick a behavior definition")?;
        let Some(host) = config.host.as_deref().or(definition.host()) else {
            bail!(
                "No host for definition `{}`, pass --host or declare one",
                definition.name()
            );
        };
        let client = UserClient::new(http.clone(), host, Arc::new(stats.clone()), config.request_timeout)
            .context("Failed to create user client")?;
        tracing::debug!(user = id, definition = definition.name(), host, "spawning user");
        let user = SimulatedUser::new(Arc::clone(definition), client);
        users.push(tokio::spawn(user.run(config.stop)));
    }
    tracing::info!(users = users.len(), "all users spawned");

    let mut iterations = 0;
    let mut task_failures = 0;
    for user in users {
        let summary = user.await.context("Failed to join user task")?;
        iterations += summary.iterations;
        task_failures += summary.task_failures;
    }
    tracing::info!(iterations, task_failures, "all users stopped");
    Ok(stats)
}
