//! The two `GET /` behaviors. They differ only in how long a user waits
//! between requests.

use user_behavior::{BehaviorDefinition, DefinitionError, Task, TaskFuture, UserClient, WaitTime};

pub const VARIANT_A: &str = "variant_a";
pub const VARIANT_B: &str = "variant_b";

pub fn initial_request(client: &mut UserClient) -> TaskFuture<'_> {
    Box::pin(async move {
        client.get("/").await?;
        Ok(())
    })
}

/// Waits 1 to 3 seconds between requests.
pub fn variant_a() -> Result<BehaviorDefinition, DefinitionError> {
    BehaviorDefinition::builder(VARIANT_A)
        .wait_time(WaitTime::between(1.0, 3.0)?)
        .task(Task::new("initial_request", initial_request))
        .build()
}

/// Waits 2 to 4 seconds between requests.
pub fn variant_b() -> Result<BehaviorDefinition, DefinitionError> {
    BehaviorDefinition::builder(VARIANT_B)
        .wait_time(WaitTime::between(2.0, 4.0)?)
        .task(Task::new("initial_request", initial_request))
        .build()
}
