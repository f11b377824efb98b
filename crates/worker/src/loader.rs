//! Topological construction of task groups from external declarations.

use std::collections::HashMap;
use std::sync::Arc;

use taskgrid_core::{Error, GroupDeclaration, Result, SubtaskDeclaration, TaskInstance};

use crate::group::TaskGroup;
use crate::registry::TaskRegistry;
use crate::scheduler::Scheduler;

/// Build a task group from a parsed declaration.
///
/// Construction is a fixed point: each pass builds every subtask whose
/// dependencies are all built, so parents always exist before their children
/// wire into them. A full pass with no progress means the remaining subtasks
/// can never be satisfied (a cycle, or a dependency on an undeclared name).
pub(crate) fn build_group(
    registry: &TaskRegistry,
    scheduler: Arc<Scheduler>,
    declaration: GroupDeclaration,
) -> Result<TaskGroup> {
    let mut built: HashMap<String, TaskInstance> = HashMap::new();
    let mut metadata: HashMap<String, SubtaskDeclaration> = HashMap::new();

    while built.len() < declaration.subtasks.len() {
        let progress = built.len();

        for subtask in &declaration.subtasks {
            if built.contains_key(&subtask.subtask_id) {
                continue;
            }
            if !subtask
                .dependencies
                .iter()
                .all(|dep| built.contains_key(dep))
            {
                continue;
            }

            // Resolving the handler here surfaces unknown task ids before
            // anything is created for this subtask.
            registry.lookup(&subtask.task_id)?;

            let mut instance = TaskInstance::new(&subtask.task_id);
            for dep in &subtask.dependencies {
                if let Some(parent) = built.get_mut(dep) {
                    instance = instance.depends_on(parent);
                }
            }

            built.insert(subtask.subtask_id.clone(), instance);
            metadata.insert(subtask.subtask_id.clone(), subtask.clone());
        }

        if built.len() == progress {
            return Err(Error::cyclic_dependency(&declaration.task_group_name));
        }
    }

    tracing::debug!(
        group = %declaration.task_group_name,
        subtasks = built.len(),
        "Constructed task group"
    );

    Ok(TaskGroup::new(
        declaration.task_group_name,
        built,
        metadata,
        declaration.parameter_count,
        scheduler,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgrid_core::{FnHandler, TaskHandler, TaskerConfig};
    use taskgrid_store::InMemoryKvStore;

    fn noop() -> Arc<dyn TaskHandler> {
        Arc::new(FnHandler::new(|_: &[serde_json::Value]| Ok(())))
    }

    fn scheduler() -> Arc<Scheduler> {
        Arc::new(Scheduler::new(
            Arc::new(TaskerConfig::default()),
            Arc::new(InMemoryKvStore::new()),
        ))
    }

    fn parse(json: &str) -> GroupDeclaration {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn builds_chain_with_counts_and_dependents() {
        let registry = TaskRegistry::new();
        registry.register("a", noop()).unwrap();
        registry.register("b", noop()).unwrap();

        let declaration = parse(
            r#"{
                "task_group_name": "chain",
                "parameter_count": 0,
                "substasks": [
                    { "task_id": "b", "subtask_id": "second", "args": [], "dependencies": ["first"] },
                    { "task_id": "a", "subtask_id": "first", "args": [], "dependencies": [] }
                ]
            }"#,
        );

        let group = build_group(&registry, scheduler(), declaration).unwrap();

        let first = group
            .instances()
            .find(|i| i.task_id == "a")
            .unwrap()
            .clone();
        let second = group
            .instances()
            .find(|i| i.task_id == "b")
            .unwrap()
            .clone();

        assert_eq!(first.dependency_count, 0);
        assert_eq!(second.dependency_count, 1);
        assert_eq!(first.dependents, vec![second.uuid]);
    }

    #[test]
    fn builds_diamond_with_fan_in() {
        let registry = TaskRegistry::new();
        for id in ["a", "b", "c", "d"] {
            registry.register(id, noop()).unwrap();
        }

        let declaration = parse(
            r#"{
                "task_group_name": "diamond",
                "parameter_count": 0,
                "substasks": [
                    { "task_id": "a", "subtask_id": "a1", "args": [], "dependencies": [] },
                    { "task_id": "b", "subtask_id": "b1", "args": [], "dependencies": ["a1"] },
                    { "task_id": "c", "subtask_id": "c1", "args": [], "dependencies": ["a1"] },
                    { "task_id": "d", "subtask_id": "d1", "args": [], "dependencies": ["b1", "c1"] }
                ]
            }"#,
        );

        let group = build_group(&registry, scheduler(), declaration).unwrap();

        let root = group
            .instances()
            .find(|i| i.task_id == "a")
            .unwrap()
            .clone();
        let sink = group
            .instances()
            .find(|i| i.task_id == "d")
            .unwrap()
            .clone();

        assert_eq!(root.dependents.len(), 2);
        assert_eq!(sink.dependency_count, 2);
    }

    #[test]
    fn cycle_is_detected() {
        let registry = TaskRegistry::new();
        registry.register("a", noop()).unwrap();
        registry.register("b", noop()).unwrap();

        let declaration = parse(
            r#"{
                "task_group_name": "looped",
                "parameter_count": 0,
                "substasks": [
                    { "task_id": "a", "subtask_id": "a1", "args": [], "dependencies": ["b1"] },
                    { "task_id": "b", "subtask_id": "b1", "args": [], "dependencies": ["a1"] }
                ]
            }"#,
        );

        let err = build_group(&registry, scheduler(), declaration).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency(name) if name == "looped"));
    }

    #[test]
    fn dependency_on_undeclared_subtask_is_cyclic() {
        let registry = TaskRegistry::new();
        registry.register("a", noop()).unwrap();

        let declaration = parse(
            r#"{
                "task_group_name": "dangling",
                "parameter_count": 0,
                "substasks": [
                    { "task_id": "a", "subtask_id": "a1", "args": [], "dependencies": ["ghost"] }
                ]
            }"#,
        );

        let err = build_group(&registry, scheduler(), declaration).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency(_)));
    }

    #[test]
    fn unknown_handler_fails_the_load() {
        let registry = TaskRegistry::new();

        let declaration = parse(
            r#"{
                "task_group_name": "unknown",
                "parameter_count": 0,
                "substasks": [
                    { "task_id": "nope", "subtask_id": "n1", "args": [], "dependencies": [] }
                ]
            }"#,
        );

        let err = build_group(&registry, scheduler(), declaration).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(id) if id == "nope"));
    }

    #[test]
    fn empty_declaration_builds_an_empty_group() {
        let registry = TaskRegistry::new();

        let declaration = parse(
            r#"{ "task_group_name": "empty", "parameter_count": 0, "substasks": [] }"#,
        );

        let group = build_group(&registry, scheduler(), declaration).unwrap();
        assert_eq!(group.instances().count(), 0);
    }
}
