//! Declarative graph definitions (YAML or JSON) compiled into tool-backed graphs

use crate::core::{Node, NodeError, Predicate, Routes, RunState, WorkflowGraph};
use crate::tools::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading or compiling a definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("Node '{node}' references unknown tool '{tool}'")]
    UnknownTool { node: String, tool: String },
}

/// A graph described as data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Graph name
    #[serde(default = "default_graph_name")]
    pub name: String,

    /// Nodes, each backed by a registry tool
    pub nodes: Vec<NodeDefinition>,

    /// Unconditional edges: `from -> to`, as one map or a list of maps
    #[serde(default, deserialize_with = "deserialize_edges")]
    pub edges: BTreeMap<String, String>,

    /// Branches evaluated on a state field
    #[serde(default)]
    pub conditional_edges: Vec<ConditionalEdgeDefinition>,

    /// Entry point
    pub start_node: String,
}

/// A node that feeds one state field to a tool and stores the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub name: String,

    /// Registry name of the tool to invoke
    pub tool_name: String,

    /// State field passed to the tool
    #[serde(default = "default_input")]
    pub input: String,

    /// State field receiving the result (defaults to the node name)
    #[serde(default)]
    pub output: Option<String>,
}

/// A branch on a state field compared to a fixed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEdgeDefinition {
    pub from: String,

    pub field: String,

    #[serde(default)]
    pub op: Comparison,

    #[serde(default)]
    pub value: Value,

    #[serde(default)]
    pub on_true: Option<String>,

    #[serde(default)]
    pub on_false: Option<String>,
}

/// Comparison applied by a conditional edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,
    /// Field present and not null, false, zero or empty
    #[default]
    Truthy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeSet {
    Map(BTreeMap<String, String>),
    List(Vec<BTreeMap<String, String>>),
}

/// Later entries win when a list names the same source twice
fn deserialize_edges<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match EdgeSet::deserialize(deserializer)? {
        EdgeSet::Map(edges) => edges,
        EdgeSet::List(maps) => maps.into_iter().flatten().collect(),
    })
}

fn default_graph_name() -> String {
    "custom".to_string()
}

fn default_input() -> String {
    "code".to_string()
}

impl GraphDefinition {
    /// Load a definition from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check node names are unique and every tool exists
    ///
    /// Graph shape (dangling edges, cycles) is not checked.
    pub fn validate(&self, tools: &ToolRegistry) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(DefinitionError::DuplicateNode(node.name.clone()));
            }
            if !tools.contains(&node.tool_name) {
                return Err(DefinitionError::UnknownTool {
                    node: node.name.clone(),
                    tool: node.tool_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Compile into an executable graph bound to `tools`
    pub fn build(&self, tools: &ToolRegistry) -> Result<WorkflowGraph, DefinitionError> {
        self.validate(tools)?;

        let mut graph = WorkflowGraph::new(self.name.clone());
        for node in &self.nodes {
            let tool = tools.require(&node.tool_name).map_err(|_| DefinitionError::UnknownTool {
                node: node.name.clone(),
                tool: node.tool_name.clone(),
            })?;
            graph.add_node(
                node.name.clone(),
                ToolNode {
                    tool,
                    input: node.input.clone(),
                    output: node.output.clone().unwrap_or_else(|| node.name.clone()),
                },
            );
        }

        for (from, to) in &self.edges {
            graph.add_edge(from.clone(), to.clone());
        }

        for branch in &self.conditional_edges {
            let routes = Routes {
                on_true: branch.on_true.clone(),
                on_false: branch.on_false.clone(),
            };
            graph.add_conditional_edge(
                branch.from.clone(),
                FieldCondition {
                    field: branch.field.clone(),
                    op: branch.op,
                    value: branch.value.clone(),
                },
                routes,
            );
        }

        graph.set_entry_point(self.start_node.clone());
        Ok(graph)
    }
}

/// Node that reads `input`, calls the tool and writes `output`
struct ToolNode {
    tool: Arc<dyn Tool>,
    input: String,
    output: String,
}

#[async_trait]
impl Node for ToolNode {
    async fn apply(&self, mut state: RunState) -> Result<RunState, NodeError> {
        let input = state.get(&self.input).cloned().unwrap_or(Value::Null);
        let result = self.tool.call(&input)?;
        state.insert(self.output.clone(), result);
        Ok(state)
    }
}

struct FieldCondition {
    field: String,
    op: Comparison,
    value: Value,
}

impl Predicate for FieldCondition {
    fn evaluate(&self, state: &RunState) -> bool {
        let actual = state.get(&self.field);
        match self.op {
            Comparison::Truthy => actual.is_some_and(is_truthy),
            Comparison::Eq => actual == Some(&self.value),
            Comparison::Ne => actual != Some(&self.value),
            Comparison::Lt => compare(actual, &self.value, |a, b| a < b),
            Comparison::Lte => compare(actual, &self.value, |a, b| a <= b),
            Comparison::Gt => compare(actual, &self.value, |a, b| a > b),
            Comparison::Gte => compare(actual, &self.value, |a, b| a >= b),
        }
    }
}

fn compare(actual: Option<&Value>, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(Value::as_f64), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
