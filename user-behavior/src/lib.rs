pub mod body;
pub mod client;
pub mod config;
pub mod definition;
pub mod error;
pub mod registry;
pub mod stats;
pub mod task;
pub mod user;
pub mod wait;

pub use client::{HttpClient, Response, UserClient, DEFAULT_REQUEST_TIMEOUT};
pub use definition::{BehaviorDefinition, BehaviorDefinitionBuilder};
pub use error::{DefinitionError, RequestError, TaskError};
pub use registry::Registry;
pub use stats::{EndpointStats, Recorder, RequestRecord, RequestStats};
pub use task::{RequestSpec, Task, TaskFuture};
pub use user::{SimulatedUser, StopCondition, UserSummary};
pub use wait::WaitTime;
