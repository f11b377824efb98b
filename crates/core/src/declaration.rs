//! External DAG description: the JSON document producers load task groups
//! from.

use serde::Deserialize;
use serde_json::Value;

/// Top-level task-group declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDeclaration {
    pub task_group_name: String,
    pub parameter_count: usize,
    /// The wire field keeps its historical spelling.
    #[serde(rename = "substasks")]
    pub subtasks: Vec<SubtaskDeclaration>,
}

/// One node of the declared graph.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtaskDeclaration {
    pub task_id: String,
    pub subtask_id: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One declared argument: either a literal value or a reference to the N-th
/// run-time parameter.
///
/// `kind` is kept as a free string; validation happens when parameters are
/// bound, so an unknown kind surfaces as `InvalidParam` rather than a parse
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl ArgSpec {
    pub const STATIC: &'static str = "static";
    pub const PARAMETER: &'static str = "parameter";
}
