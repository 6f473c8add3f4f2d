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

use crate::dialogue::{DialogueNode, NodeId, Script};
use crate::error::UnknownNodeError;

/// Player input the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueInput {
    /// Continue past a single-choice node (pointer press, Enter, Space).
    Advance,
    /// Pick a branch, numbered from 1.
    Choice(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Handled,
    Unhandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// More than one successor; blocks until a numbered choice in range.
    AwaitingChoice,
    /// Single successor and flagged; leaves on the next tick.
    AutoAdvancing,
    /// Single successor; stays displayed until an advance input.
    Idle,
}

/// Where a node's text is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Interactive text, waiting on the player.
    Primary,
    /// Ambient text from auto-advancing nodes.
    Secondary,
}

/// Cursor over a script's node graph.
#[derive(Debug)]
pub struct DialogueSession {
    script: Script,
    current: DialogueNode,
    primary_text: String,
    secondary_text: String,
    max_auto_chain: usize,
}

impl DialogueSession {
    /// Starts at `start`. `max_auto_chain` bounds how many auto-advancing
    /// nodes a single tick may pass through.
    pub fn new(script: Script, start: NodeId, max_auto_chain: usize) -> Result<Self, UnknownNodeError> {
        let current = script.node(start)?.clone();
        let mut session = Self {
            script,
            current,
            primary_text: String::new(),
            secondary_text: String::new(),
            max_auto_chain: max_auto_chain.max(1),
        };
        session.enter(start)?;
        Ok(session)
    }

    pub fn enter(&mut self, id: NodeId) -> Result<(), UnknownNodeError> {
        let node = self.script.node(id)?;
        log::debug!("Entering dialogue node {} ({} choices)", id, node.choice_count());
        match region_for(node) {
            Region::Primary => self.primary_text.clone_from(&node.text),
            Region::Secondary => self.secondary_text.clone_from(&node.text),
        }
        self.current = node.clone();
        Ok(())
    }

    pub fn handle_input(&mut self, input: DialogueInput) -> Result<InputOutcome, UnknownNodeError> {
        let next = match (self.state(), input) {
            (NodeState::Idle, DialogueInput::Advance) => match self.current.successors.first() {
                Some(&next) => next,
                None => return Ok(InputOutcome::Unhandled),
            },
            (NodeState::AwaitingChoice, DialogueInput::Choice(choice)) => {
                match self.successor_for_choice(choice) {
                    Some(next) => next,
                    None => return Ok(InputOutcome::Unhandled),
                }
            }
            _ => return Ok(InputOutcome::Unhandled),
        };
        self.enter(next)?;
        Ok(InputOutcome::Handled)
    }

    /// Follows auto-advancing nodes, at most `max_auto_chain` of them.
    /// Returns how many transitions were taken.
    pub fn tick(&mut self) -> Result<usize, UnknownNodeError> {
        let mut steps = 0;
        while self.state() == NodeState::AutoAdvancing {
            if steps == self.max_auto_chain {
                log::warn!("Auto-advance budget of {} exhausted at node {}", self.max_auto_chain, self.current.id);
                break;
            }
            let Some(&next) = self.current.successors.first() else { break };
            self.enter(next)?;
            steps += 1;
        }
        Ok(steps)
    }

    pub fn state(&self) -> NodeState {
        if self.current.choice_count() > 1 {
            NodeState::AwaitingChoice
        } else if self.current.advances_automatically() {
            NodeState::AutoAdvancing
        } else {
            NodeState::Idle
        }
    }

    pub fn awaiting_input(&self) -> bool {
        self.state() != NodeState::AutoAdvancing
    }

    pub fn current(&self) -> &DialogueNode {
        &self.current
    }

    pub fn text(&self, region: Region) -> &str {
        match region {
            Region::Primary => &self.primary_text,
            Region::Secondary => &self.secondary_text,
        }
    }

    fn successor_for_choice(&self, choice: u32) -> Option<NodeId> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        self.current.successors.get(index).copied()
    }
}

fn region_for(node: &DialogueNode) -> Region {
    if node.auto_advance {
        Region::Secondary
    } else {
        Region::Primary
    }
}
