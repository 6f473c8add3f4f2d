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

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use crate::error::SoundError;

/// Audio output for the session. Looping samples play until it is dropped.
pub struct SoundEngine {
    // the stream must outlive every sink playing on it
    _stream: OutputStream,
    handle: OutputStreamHandle,
    loops: Vec<Sink>,
}

impl SoundEngine {
    pub fn new() -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self { _stream: stream, handle, loops: Vec::new() })
    }

    pub fn play_loop(&mut self, path: &Path, volume: f32) -> Result<(), SoundError> {
        let file = File::open(path).map_err(|source| SoundError::Io { path: path.to_path_buf(), source })?;
        let source = Decoder::new(BufReader::new(file))?;
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(volume);
        sink.append(source.repeat_infinite());
        self.loops.push(sink);
        log::info!("Looping {:?} at volume {}", path, volume);
        Ok(())
    }
}
