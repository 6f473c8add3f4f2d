// SPDX-License-Identifier: Apache-2.0

// Copyright 2024 src_resources
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Branching dialogue: the script graph and the session cursor walking it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use crate::error::{GameError, ScriptFormatError, UnknownNodeError};

pub mod script;
pub mod session;

pub use script::parse_script;
pub use session::{DialogueInput, DialogueSession, InputOutcome, NodeState, Region};

/// Script-assigned node identifier. Ids need not be contiguous.
pub type NodeId = u32;

/// One unit of displayable text plus the nodes it can continue to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueNode {
    pub id: NodeId,
    pub text: String,
    /// One entry per choice; never empty.
    pub successors: Vec<NodeId>,
    /// Routes the text to the secondary region and, for single-choice
    /// nodes, continues without waiting for input.
    pub auto_advance: bool,
}

impl DialogueNode {
    pub fn choice_count(&self) -> usize {
        self.successors.len()
    }

    /// Whether the session leaves this node on the next tick by itself.
    pub fn advances_automatically(&self) -> bool {
        self.auto_advance && self.successors.len() == 1
    }
}

/// The immutable node graph. Successors are plain ids resolved on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    nodes: HashMap<NodeId, DialogueNode>,
}

impl Script {
    pub fn from_nodes(nodes: HashMap<NodeId, DialogueNode>) -> Self {
        Self { nodes }
    }

    /// Reads, parses and validates a script file.
    pub fn load(path: &Path, start: NodeId) -> Result<Self, GameError> {
        let source = fs::read_to_string(path).map_err(|source| ScriptFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let script = parse_script(&source)?;
        script.validate(start)?;
        log::info!("Loaded dialogue script {:?} with {} nodes", path, script.len());
        Ok(script)
    }

    pub fn node(&self, id: NodeId) -> Result<&DialogueNode, UnknownNodeError> {
        self.nodes.get(&id).ok_or(UnknownNodeError { node: id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks the start id, that every node has a choice whose id resolves,
    /// and that no cycle is made only of auto-advancing nodes.
    pub fn validate(&self, start: NodeId) -> Result<(), GameError> {
        self.node(start)?;
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        for id in &ids {
            let node = &self.nodes[id];
            if node.successors.is_empty() {
                return Err(ScriptFormatError::NoChoices { node: *id }.into());
            }
            for &successor in &node.successors {
                self.node(successor)?;
            }
        }
        self.check_auto_advance_cycles(&ids)?;
        Ok(())
    }

    fn check_auto_advance_cycles(&self, ids: &[NodeId]) -> Result<(), ScriptFormatError> {
        // auto-advancing nodes have exactly one outgoing edge, so each walk is a simple chain
        let mut settled = HashSet::new();
        for &start in ids {
            let mut chain = Vec::new();
            let mut current = start;
            loop {
                if settled.contains(&current) {
                    break;
                }
                let node = &self.nodes[&current];
                if !node.advances_automatically() {
                    break;
                }
                if chain.contains(&current) {
                    return Err(ScriptFormatError::AutoAdvanceCycle { node: current });
                }
                chain.push(current);
                current = node.successors[0];
            }
            settled.extend(chain);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_dangling_successor() {
        let script = parse_script("1 2 2 9 0\nPick.\n2 1 1 0\nBack.\n").unwrap();
        match script.validate(1) {
            Err(GameError::UnknownNode(UnknownNodeError { node })) => assert_eq!(node, 9),
            other => panic!("expected unknown node 9, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_node_without_choices() {
        let node = DialogueNode { id: 4, text: "Dead end.".to_string(), successors: Vec::new(), auto_advance: false };
        let script = Script::from_nodes([(4, node)].into_iter().collect());
        assert!(matches!(
            script.validate(4),
            Err(GameError::Script(ScriptFormatError::NoChoices { node: 4 }))
        ));
    }

    #[test]
    fn validate_rejects_unknown_start() {
        let script = parse_script("1 1 1 0\nLoop.\n").unwrap();
        assert!(matches!(script.validate(5), Err(GameError::UnknownNode(UnknownNodeError { node: 5 }))));
    }

    #[test]
    fn validate_rejects_auto_advance_cycle() {
        let script = parse_script("1 1 2 1\nA\n2 1 3 1\nB\n3 1 1 1\nC\n").unwrap();
        assert!(matches!(
            script.validate(1),
            Err(GameError::Script(ScriptFormatError::AutoAdvanceCycle { .. }))
        ));
    }

    #[test]
    fn validate_accepts_cycle_broken_by_interactive_node() {
        let script = parse_script("1 1 2 1\nA\n2 1 3 1\nB\n3 1 1 0\nC\n").unwrap();
        assert!(script.validate(1).is_ok());
    }

    #[test]
    fn shipped_story_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/scripts/story.txt");
        let script = Script::load(&path, 1).unwrap();
        assert!(script.nodes.values().any(|node| node.advances_automatically()));
        assert!(script.nodes.values().any(|node| node.choice_count() == 3));
    }

    #[test]
    fn missing_script_file_is_a_format_error() {
        let result = Script::load(Path::new("resources/scripts/missing.txt"), 1);
        assert!(matches!(result, Err(GameError::Script(ScriptFormatError::Io { .. }))));
    }

    #[test]
    fn auto_flag_on_branching_node_does_not_advance() {
        let node = DialogueNode { id: 1, text: String::new(), successors: vec![1, 1], auto_advance: true };
        assert!(!node.advances_automatically());
        assert_eq!(node.choice_count(), 2);
    }
}
