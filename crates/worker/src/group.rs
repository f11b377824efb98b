//! Producer-side task groups: a loaded DAG waiting to be parameterized and
//! enqueued.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use taskgrid_core::{ArgSpec, Error, Result, SubtaskDeclaration, TaskInstance};

use crate::scheduler::Scheduler;

/// A group of task instances with inter-dependencies.
///
/// Groups exist only on the producer between load and enqueue: once `run`
/// has pushed every instance into the KV backend, the group can be dropped.
pub struct TaskGroup {
    name: String,
    instances: HashMap<String, TaskInstance>,
    metadata: HashMap<String, SubtaskDeclaration>,
    parameter_count: usize,
    scheduler: Arc<Scheduler>,
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("name", &self.name)
            .field("instances", &self.instances)
            .field("metadata", &self.metadata)
            .field("parameter_count", &self.parameter_count)
            .finish()
    }
}

impl TaskGroup {
    pub(crate) fn new(
        name: String,
        instances: HashMap<String, TaskInstance>,
        metadata: HashMap<String, SubtaskDeclaration>,
        parameter_count: usize,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            name,
            instances,
            metadata,
            parameter_count,
            scheduler,
        }
    }

    /// The declared task-group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of run-time parameters the declaration expects.
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Iterate over the instances in the group.
    pub fn instances(&self) -> impl Iterator<Item = &TaskInstance> {
        self.instances.values()
    }

    /// Bind run-time parameters into every instance's argument vector.
    ///
    /// Each declared arg contributes either its literal value (`static`) or
    /// the parameter at its declared index (`parameter`). The index must be a
    /// whole-valued JSON number within range.
    pub fn set_parameters(&mut self, params: Vec<Value>) -> Result<()> {
        if params.len() != self.parameter_count {
            return Err(Error::ParameterMismatch {
                expected: self.parameter_count,
                actual: params.len(),
            });
        }

        for (subtask_id, instance) in &mut self.instances {
            let Some(declaration) = self.metadata.get(subtask_id) else {
                continue;
            };

            let mut args = Vec::with_capacity(declaration.args.len());
            for spec in &declaration.args {
                match spec.kind.as_str() {
                    ArgSpec::STATIC => args.push(spec.value.clone()),
                    ArgSpec::PARAMETER => {
                        let index = parameter_index(&spec.value)?;
                        let param = params.get(index).ok_or_else(|| {
                            Error::invalid_param(format!(
                                "parameter index {} out of range for {} parameters",
                                index,
                                params.len()
                            ))
                        })?;
                        args.push(param.clone());
                    }
                    other => {
                        return Err(Error::invalid_param(format!(
                            "unknown argument kind '{}'",
                            other
                        )))
                    }
                }
            }

            instance.args = args;
        }

        Ok(())
    }

    /// Enqueue every instance in the group.
    ///
    /// Waiting instances go first: by the time any zero-dependency root is
    /// visible to a worker, all of its dependents are already present in the
    /// waiting hash.
    pub async fn run(&self) -> Result<()> {
        for instance in self.instances.values().filter(|i| !i.is_ready()) {
            self.scheduler.schedule(instance).await?;
        }
        for instance in self.instances.values().filter(|i| i.is_ready()) {
            self.scheduler.schedule(instance).await?;
        }

        tracing::info!(
            group = %self.name,
            instances = self.instances.len(),
            "Enqueued task group"
        );
        Ok(())
    }
}

/// Decode a declared parameter index: a whole-valued, non-negative JSON
/// number.
fn parameter_index(value: &Value) -> Result<usize> {
    if let Some(index) = value.as_u64() {
        return Ok(index as usize);
    }
    if let Some(float) = value.as_f64() {
        if float >= 0.0 && float.fract() == 0.0 {
            return Ok(float as usize);
        }
    }
    Err(Error::invalid_param(format!(
        "parameter index must be a whole number, got {}",
        value
    )))
}
