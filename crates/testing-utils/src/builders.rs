//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use courier_domain::Task;
use serde_json::{json, Value};

/// Builder for creating test Task entities
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: Task::new("T1", "user-1", "+15550001111", "hi"),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.task.id = id.to_string();
        self
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.task.identity = identity.to_string();
        self
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        self.task.destination = destination.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.task.body = body.to_string();
        self
    }

    /// Task as the claim RPC returns it
    pub fn to_wire_json(&self) -> Value {
        json!({
            "id": self.task.id,
            "destination": self.task.destination,
            "body": self.task.body,
        })
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder_defaults_and_overrides() {
        let task = TaskBuilder::new().build();
        assert_eq!(task.id, "T1");
        assert_eq!(task.destination, "+15550001111");

        let builder = TaskBuilder::new().with_id("T9").with_body("otp 1234");
        assert_eq!(builder.to_wire_json()["id"], "T9");
        let task = builder.with_identity("user-9").build();
        assert_eq!(task.body, "otp 1234");
        assert_eq!(task.identity, "user-9");
    }
}
