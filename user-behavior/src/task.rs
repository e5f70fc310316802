use crate::client::UserClient;
use crate::error::{DefinitionError, TaskError};
use bytes::Bytes;
use futures::future::BoxFuture;
use hyper::Method;
use std::fmt;
use std::sync::Arc;

pub type TaskFuture<'a> = BoxFuture<'a, Result<(), TaskError>>;

type TaskFn = dyn for<'a> Fn(&'a mut UserClient) -> TaskFuture<'a> + Send + Sync;

/// One request of a declared request sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<Bytes>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }
}

/// A named, weighted unit of work executed by a simulated user.
#[derive(Clone)]
pub struct Task {
    name: String,
    weight: u32,
    func: Arc<TaskFn>,
}

impl Task {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut UserClient) -> TaskFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            weight: 1,
            func: Arc::new(func),
        }
    }

    /// Issues `requests` in order, stopping at the first one that gets no
    /// response. Error statuses are recorded by the client and do not stop
    /// the sequence.
    pub fn requests(name: impl Into<String>, requests: Vec<RequestSpec>) -> Self {
        let requests: Arc<[RequestSpec]> = requests.into();
        Self::new(name, move |client| run_requests(client, Arc::clone(&requests)))
    }

    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub async fn execute(&self, client: &mut UserClient) -> Result<(), TaskError> {
        (self.func)(client).await
    }

    pub(crate) fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyTaskName);
        }
        if self.weight == 0 {
            return Err(DefinitionError::ZeroWeight(format!("task {}", self.name)));
        }
        Ok(())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

fn run_requests(client: &mut UserClient, requests: Arc<[RequestSpec]>) -> TaskFuture<'_> {
    Box::pin(async move {
        for spec in requests.iter() {
            client
                .request(spec.method.clone(), &spec.path, spec.body.clone())
                .await?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_client: &mut UserClient) -> TaskFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn defaults_to_weight_one() {
        let task = Task::new("noop", noop);
        assert_eq!(task.weight(), 1);
        assert_eq!(task.name(), "noop");
        assert!(task.validate().is_ok());
    }

    #[test]
    fn rejects_zero_weight_and_empty_name() {
        assert!(matches!(
            Task::new("noop", noop).with_weight(0).validate(),
            Err(DefinitionError::ZeroWeight(_))
        ));
        assert!(matches!(
            Task::new("", noop).validate(),
            Err(DefinitionError::EmptyTaskName)
        ));
    }

    #[test]
    fn debug_omits_function() {
        let task = Task::requests("index", vec![RequestSpec::get("/")]).with_weight(3);
        assert_eq!(format!("{task:?}"), "Task { name: \"index\", weight: 3, .. }");
    }
}
