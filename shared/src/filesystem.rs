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

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the directory asset paths are resolved against.
pub const ASSET_ROOT_VAR: &str = "STORY_ASSET_ROOT";

/// Resolves a `/`-separated asset path against the asset root.
///
/// Absolute paths are returned untouched. The root is `STORY_ASSET_ROOT` when set,
/// otherwise the current working directory.
pub fn get_path(path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        return PathBuf::from(path);
    }
    let root = match env::var_os(ASSET_ROOT_VAR) {
        Some(root) => PathBuf::from(root),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    join_parts(root, path)
}

fn join_parts(mut root: PathBuf, path: &str) -> PathBuf {
    for part in path.split('/').filter(|part| !part.is_empty()) {
        root.push(part);
    }
    root
}
