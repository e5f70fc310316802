//! JSON behavior definitions, for targets that only need declared request
//! sequences rather than Rust task functions.
//!
//! ```json
//! {
//!   "name": "test",
//!   "host": "http://127.0.0.1:8080",
//!   "wait_time": { "min": 1, "max": 3 },
//!   "tasks": [
//!     { "name": "initial_request", "requests": [{ "method": "GET", "path": "/" }] }
//!   ]
//! }
//! ```

use crate::definition::BehaviorDefinition;
use crate::error::DefinitionError;
use crate::task::{RequestSpec, Task};
use crate::wait::WaitTime;
use bytes::Bytes;
use hyper::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionConfig {
    pub name: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub wait_time: WaitTimeConfig,
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitTimeConfig {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub requests: Vec<RequestConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_weight() -> u32 {
    1
}

fn default_method() -> String {
    "GET".to_string()
}

impl RequestConfig {
    fn into_spec(self) -> Result<RequestSpec, DefinitionError> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| DefinitionError::InvalidMethod(self.method.clone()))?;
        if !is_standard(&method) {
            return Err(DefinitionError::InvalidMethod(self.method));
        }
        Ok(RequestSpec {
            method,
            path: self.path,
            body: self.body.map(Bytes::from),
        })
    }
}

fn is_standard(method: &Method) -> bool {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
        Method::PATCH,
    ]
    .contains(method)
}

impl DefinitionConfig {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(self) -> Result<BehaviorDefinition, DefinitionError> {
        let wait_time = WaitTime::between(self.wait_time.min, self.wait_time.max)?;
        let mut builder = BehaviorDefinition::builder(self.name)
            .weight(self.weight)
            .wait_time(wait_time);
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        for task in self.tasks {
            if task.requests.is_empty() {
                return Err(DefinitionError::NoRequests(task.name));
            }
            let requests = task
                .requests
                .into_iter()
                .map(RequestConfig::into_spec)
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.task(Task::requests(task.name, requests).with_weight(task.weight));
        }
        builder.build()
    }
}

impl BehaviorDefinition {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        DefinitionConfig::from_json(json)?.build()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL_REQUEST: &str = r#"{
        "name": "test",
        "wait_time": { "min": 1, "max": 3 },
        "tasks": [
            { "name": "initial_request", "requests": [{ "method": "GET", "path": "/" }] }
        ]
    }"#;

    #[test]
    fn loads_declared_definition() {
        let def = BehaviorDefinition::from_json(INITIAL_REQUEST).unwrap();
        assert_eq!(def.name(), "test");
        assert_eq!(def.host(), None);
        assert_eq!(def.wait_time(), WaitTime::between(1.0, 3.0).unwrap());
        assert_eq!(def.tasks().len(), 1);
        assert_eq!(def.tasks()[0].name(), "initial_request");
        assert_eq!(def.tasks()[0].weight(), 1);
    }

    #[test]
    fn method_defaults_to_get_and_is_case_insensitive() {
        let cfg = RequestConfig {
            method: "post".to_string(),
            path: "/login".to_string(),
            body: Some("user=test".to_string()),
        };
        let spec = cfg.into_spec().unwrap();
        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.body.as_deref(), Some(&b"user=test"[..]));

        let def = BehaviorDefinition::from_json(
            r#"{"name":"t","tasks":[{"name":"i","requests":[{"path":"/"}]}]}"#,
        )
        .unwrap();
        assert_eq!(def.wait_time(), WaitTime::default());
    }

    #[test]
    fn rejects_unknown_method() {
        let res = BehaviorDefinition::from_json(
            r#"{"name":"t","tasks":[{"name":"i","requests":[{"method":"FETCH","path":"/"}]}]}"#,
        );
        assert!(matches!(res, Err(DefinitionError::InvalidMethod(m)) if m == "FETCH"));
    }

    #[test]
    fn rejects_empty_task_list() {
        let res = BehaviorDefinition::from_json(r#"{"name":"t","tasks":[]}"#);
        assert!(matches!(res, Err(DefinitionError::NoTasks(_))));
    }

    #[test]
    fn rejects_task_without_requests() {
        let res = BehaviorDefinition::from_json(
            r#"{"name":"t","wait_time":{"min":1,"max":3},"tasks":[{"name":"idle","requests":[]}]}"#,
        );
        assert!(matches!(res, Err(DefinitionError::NoRequests(name)) if name == "idle"));
    }

    #[test]
    fn rejects_inverted_wait_bounds() {
        let res = BehaviorDefinition::from_json(
            r#"{"name":"t","wait_time":{"min":4,"max":2},"tasks":[{"name":"i","requests":[{"path":"/"}]}]}"#,
        );
        assert!(matches!(res, Err(DefinitionError::InvalidWaitBounds { .. })));
    }

    #[test]
    fn rejects_malformed_json_and_unknown_fields() {
        assert!(matches!(
            BehaviorDefinition::from_json("{"),
            Err(DefinitionError::Parse(_))
        ));
        assert!(matches!(
            BehaviorDefinition::from_json(r#"{"name":"t","tasks":[],"wait":1}"#),
            Err(DefinitionError::Parse(_))
        ));
    }
}
