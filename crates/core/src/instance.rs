//! The task instance: one node of the job graph, and the queue payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// A single schedulable unit of work.
///
/// Instances are serialized as-is into the ready queue and the waiting hash;
/// the wire field names are stable. `dependents` lists the UUIDs of instances
/// that must not run before this one completes; `dependency_count` is the
/// number of parents of this instance that have not yet finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInstance {
    pub task_id: String,
    pub args: Vec<Value>,
    pub uuid: String,
    pub dependents: Vec<String>,
    pub dependency_count: u32,
}

impl TaskInstance {
    /// Create a fresh instance of a registered task, with a new UUID and no
    /// arguments or dependencies. The instance is not enqueued.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            args: Vec::new(),
            uuid: Uuid::new_v4().to_string(),
            dependents: Vec::new(),
            dependency_count: 0,
        }
    }

    /// Assign the argument vector the handler will receive.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Declare that this instance must not run before `parent` completes.
    ///
    /// Appends this instance's UUID to the parent's dependents and bumps this
    /// instance's outstanding-dependency counter. Dependency wiring is
    /// write-once: it must happen before either instance is enqueued.
    pub fn depends_on(mut self, parent: &mut TaskInstance) -> Self {
        parent.dependents.push(self.uuid.clone());
        self.dependency_count += 1;
        self
    }

    /// Whether every dependency of this instance has completed.
    pub fn is_ready(&self) -> bool {
        self.dependency_count == 0
    }

    /// Serialize into the queue payload.
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a queue payload. Unknown fields are ignored.
    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_instance_has_no_dependencies() {
        let instance = TaskInstance::new("echo");

        assert_eq!(instance.task_id, "echo");
        assert!(instance.args.is_empty());
        assert!(instance.dependents.is_empty());
        assert_eq!(instance.dependency_count, 0);
        assert!(instance.is_ready());
    }

    #[test]
    fn uuids_are_unique_per_instance() {
        let a = TaskInstance::new("t");
        let b = TaskInstance::new("t");

        assert_ne!(a.uuid, b.uuid);
    }

    #[test]
    fn depends_on_wires_both_sides() {
        let mut parent = TaskInstance::new("parent");
        let child = TaskInstance::new("child").depends_on(&mut parent);

        assert_eq!(parent.dependents, vec![child.uuid.clone()]);
        assert_eq!(child.dependency_count, 1);
        assert!(!child.is_ready());
        assert!(parent.is_ready());
    }

    #[test]
    fn depends_on_preserves_declaration_order() {
        let mut a = TaskInstance::new("a");
        let mut b = TaskInstance::new("b");
        let d = TaskInstance::new("d").depends_on(&mut a).depends_on(&mut b);

        assert_eq!(d.dependency_count, 2);
        assert_eq!(a.dependents, vec![d.uuid.clone()]);
        assert_eq!(b.dependents, vec![d.uuid.clone()]);
    }

    #[test]
    fn payload_round_trip_is_lossless() {
        let mut parent = TaskInstance::new("parent");
        let instance = TaskInstance::new("child")
            .with_args(vec![json!(1), json!("x"), json!(null)])
            .depends_on(&mut parent);

        let payload = instance.to_payload().unwrap();
        let decoded = TaskInstance::from_payload(&payload).unwrap();
        assert_eq!(decoded, instance);

        // A second serialization of the decoded value is byte-equal.
        assert_eq!(decoded.to_payload().unwrap(), payload);
    }

    #[test]
    fn payload_uses_stable_field_names() {
        let instance = TaskInstance::new("echo").with_args(vec![json!(42)]);
        let value: Value = serde_json::from_str(&instance.to_payload().unwrap()).unwrap();

        assert_eq!(value["task_id"], json!("echo"));
        assert_eq!(value["args"], json!([42]));
        assert_eq!(value["uuid"], json!(instance.uuid));
        assert_eq!(value["dependents"], json!([]));
        assert_eq!(value["dependency_count"], json!(0));
    }

    #[test]
    fn unknown_fields_are_ignored_on_read() {
        let payload = r#"{
            "task_id": "echo",
            "args": [],
            "uuid": "u-1",
            "dependents": [],
            "dependency_count": 0,
            "retries": 7
        }"#;

        let decoded = TaskInstance::from_payload(payload).unwrap();
        assert_eq!(decoded.task_id, "echo");
        assert_eq!(decoded.uuid, "u-1");
    }
}
