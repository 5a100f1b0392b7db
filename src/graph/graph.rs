use std::collections::HashSet;

use serde::{Serialize, Deserialize};

use crate::error::{Result, XorError};
use crate::graph::node::{NodeDef, Op};

/// An append-only list of named nodes.
///
/// A node may only reference nodes added before it, so the node list is
/// always in topological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
    pub nodes: Vec<NodeDef>,
}

impl GraphDef {
    pub fn new() -> GraphDef {
        GraphDef::default()
    }

    /// Appends a node and returns its name.
    pub fn add_node(&mut self, node: NodeDef) -> Result<String> {
        if self.node(&node.name).is_some() {
            return Err(XorError::DuplicateNode(node.name));
        }
        if let Some(missing) = node.inputs.iter().find(|input| self.node(input).is_none()) {
            return Err(XorError::NodeNotFound(missing.clone()));
        }
        let name = node.name.clone();
        self.nodes.push(node);
        Ok(name)
    }

    pub fn add(&mut self, name: impl Into<String>, op: Op, inputs: &[&str]) -> Result<String> {
        let inputs = inputs.iter().map(|s| s.to_string()).collect();
        self.add_node(NodeDef::new(name, op, inputs))
    }

    pub fn node(&self, name: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&NodeDef> {
        self.node(name).ok_or_else(|| XorError::NodeNotFound(name.to_string()))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn op_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn variables(&self) -> impl Iterator<Item = &NodeDef> {
        self.nodes.iter().filter(|n| n.op.is_variable())
    }

    /// Nodes whose output no other node consumes.
    pub fn sinks(&self) -> Vec<&str> {
        let consumed: HashSet<&str> = self.nodes.iter()
            .flat_map(|n| n.inputs.iter().map(String::as_str))
            .collect();
        self.nodes.iter()
            .map(|n| n.name.as_str())
            .filter(|name| !consumed.contains(name))
            .collect()
    }

    /// Keeps only the nodes needed to compute `dest_nodes`, in original order.
    pub fn extract_sub_graph(&self, dest_nodes: &[&str]) -> Result<GraphDef> {
        let mut keep: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = Vec::new();
        for dest in dest_nodes {
            pending.push(self.require(dest)?.name.as_str());
        }
        while let Some(name) = pending.pop() {
            if !keep.insert(name) {
                continue;
            }
            let node = self.require(name)?;
            pending.extend(node.inputs.iter().map(String::as_str));
        }
        let nodes = self.nodes.iter()
            .filter(|n| keep.contains(n.name.as_str()))
            .cloned()
            .collect();
        Ok(GraphDef { nodes })
    }
}
