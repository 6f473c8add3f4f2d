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

//! Greedy paragraph wrapping by character count.
//!
//! Widths are counted in `char`s, not measured glyph advances.

/// One display line of a wrapped paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    /// Zero-based row within the paragraph, used for the vertical offset.
    pub row: usize,
    /// Whether a single whitespace separator was consumed after this line.
    pub broke_at_whitespace: bool,
}

/// Lazy iterator over the lines of `text`. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct WrappedLines<'a> {
    rest: &'a str,
    max_chars: usize,
    row: usize,
}

pub fn wrap(text: &str, max_chars: usize) -> WrappedLines<'_> {
    WrappedLines { rest: text, max_chars: max_chars.max(1), row: 0 }
}

impl<'a> Iterator for WrappedLines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        // byte offset of each char boundary up to and including the one after the window
        let bounds: Vec<(usize, char)> = self.rest.char_indices().take(self.max_chars.saturating_add(1)).collect();
        let (text, consumed, broke_at_whitespace) = if bounds.len() <= self.max_chars {
            (self.rest, self.rest.len(), false)
        } else {
            match (1..=self.max_chars).rev().find(|&i| bounds[i].1.is_whitespace()) {
                Some(i) => {
                    let (offset, separator) = bounds[i];
                    (&self.rest[..offset], offset + separator.len_utf8(), true)
                }
                None => {
                    let offset = bounds[self.max_chars].0;
                    (&self.rest[..offset], offset, false)
                }
            }
        };

        let line = Line { text, row: self.row, broke_at_whitespace };
        self.rest = &self.rest[consumed..];
        self.row += 1;
        Some(line)
    }
}
