//! Behavior definitions: what one kind of simulated user does and how long it
//! pauses between tasks.
//!
//! A definition is validated once when it is built and is immutable after
//! that, so a harness can wrap it in an `Arc` and share it between every user
//! instance it schedules.

use crate::client::normalize_host;
use crate::error::DefinitionError;
use crate::task::Task;
use crate::wait::WaitTime;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct BehaviorDefinition {
    name: String,
    host: Option<String>,
    weight: u32,
    wait_time: WaitTime,
    tasks: Vec<Task>,
    chooser: WeightedIndex<u32>,
}

impl BehaviorDefinition {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BehaviorDefinitionBuilder {
        BehaviorDefinitionBuilder {
            name: name.into(),
            host: None,
            weight: 1,
            wait_time: WaitTime::default(),
            tasks: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default target used when the harness is not given one.
    #[inline]
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[inline]
    #[must_use]
    pub fn wait_time(&self) -> WaitTime {
        self.wait_time
    }

    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    /// Picks a task with probability proportional to its weight.
    pub fn choose_task<R: Rng + ?Sized>(&self, rng: &mut R) -> &Task {
        &self.tasks[self.chooser.sample(rng)]
    }
}

pub struct BehaviorDefinitionBuilder {
    name: String,
    host: Option<String>,
    weight: u32,
    wait_time: WaitTime,
    tasks: Vec<Task>,
}

impl BehaviorDefinitionBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn wait_time(mut self, wait_time: WaitTime) -> Self {
        self.wait_time = wait_time;
        self
    }

    #[must_use]
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Result<BehaviorDefinition, DefinitionError> {
        if self.tasks.is_empty() {
            return Err(DefinitionError::NoTasks(self.name));
        }
        if self.weight == 0 {
            return Err(DefinitionError::ZeroWeight(format!("definition {}", self.name)));
        }
        for task in &self.tasks {
            task.validate()?;
        }
        let host = self.host.as_deref().map(normalize_host).transpose()?;
        // Weights are all non-zero here, so this only fails on u32 overflow.
        let chooser = WeightedIndex::new(self.tasks.iter().map(Task::weight))
            .map_err(|_| DefinitionError::ZeroWeight(format!("definition {} tasks", self.name)))?;
        tracing::debug!(
            definition = %self.name,
            tasks = self.tasks.len(),
            wait_min = self.wait_time.min_secs(),
            wait_max = self.wait_time.max_secs(),
            "behavior definition loaded"
        );
        Ok(BehaviorDefinition {
            name: self.name,
            host,
            weight: self.weight,
            wait_time: self.wait_time,
            tasks: self.tasks,
            chooser,
        })
    }
}
