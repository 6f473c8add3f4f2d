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

//! Line-pair script format.
//!
//! ```text
//! <node_id> <choice_count> <successor_id>... [auto_advance]
//! <display text>
//! ```
//!
//! A later definition of the same id replaces the earlier one.

use std::collections::HashMap;
use std::str::SplitWhitespace;
use crate::dialogue::{DialogueNode, NodeId, Script};
use crate::error::ScriptFormatError;

#[derive(Debug, PartialEq, Eq)]
struct ControlLine {
    id: NodeId,
    successors: Vec<NodeId>,
    auto_advance: bool,
}

pub fn parse_script(source: &str) -> Result<Script, ScriptFormatError> {
    let mut nodes = HashMap::new();
    let mut lines = source.lines().enumerate();

    while let Some((index, control)) = lines.next() {
        let line = index + 1;
        if control.trim().is_empty() && lines.clone().all(|(_, rest)| rest.trim().is_empty()) {
            break;
        }
        let control = parse_control_line(line, control)?;
        let Some((_, text)) = lines.next() else {
            return Err(ScriptFormatError::UnmatchedControlLine { line });
        };
        if nodes.contains_key(&control.id) {
            log::debug!("Node {} redefined at line {}", control.id, line);
        }
        nodes.insert(control.id, DialogueNode {
            id: control.id,
            text: text.to_string(),
            successors: control.successors,
            auto_advance: control.auto_advance,
        });
    }

    Ok(Script::from_nodes(nodes))
}

fn parse_control_line(line: usize, source: &str) -> Result<ControlLine, ScriptFormatError> {
    let malformed = |reason: String| ScriptFormatError::MalformedControlLine { line, reason };
    let mut tokens = source.split_whitespace();

    let id = next_number::<NodeId>(&mut tokens, "node id").map_err(malformed)?;
    let choice_count = next_number::<usize>(&mut tokens, "choice count").map_err(malformed)?;
    if choice_count == 0 {
        return Err(malformed("choice count must be at least 1".to_string()));
    }
    let successors = (0..choice_count)
        .map(|_| next_number::<NodeId>(&mut tokens, "successor id"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;
    let auto_advance = tokens.next().map(parse_flag).unwrap_or(false);
    if let Some(extra) = tokens.next() {
        return Err(malformed(format!("unexpected token {:?}", extra)));
    }

    Ok(ControlLine { id, successors, auto_advance })
}

fn next_number<T: std::str::FromStr>(tokens: &mut SplitWhitespace, what: &str) -> Result<T, String> {
    let token = tokens.next().ok_or_else(|| format!("missing {}", what))?;
    token.parse().map_err(|_| format!("{} {:?} is not a number", what, token))
}

fn parse_flag(token: &str) -> bool {
    match token.parse::<i64>() {
        Ok(value) => value != 0,
        Err(_) => token.eq_ignore_ascii_case("true"),
    }
}
