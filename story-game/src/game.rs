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

use glfw::{Action, Key, MouseButton, WindowEvent};
use glm::{Mat4, Vec3};
use rust_i18n::t;
use story_shared::camera::Camera;
use story_shared::filesystem::get_path;
use crate::config::GameConfig;
use crate::dialogue::{DialogueInput, DialogueSession, InputOutcome, NodeState, Region, Script};
use crate::error::{GameError, UnknownNodeError};
use crate::sound_engine::SoundEngine;
use crate::text_renderer::{FontData, ITextRenderer, TextRenderer};

// World units per font pixel for text drawn in the 3-D scene
const WORLD_TEXT_SCALE: f32 = 0.02;
// Primary region baseline, as a fraction of the window height
const PRIMARY_REGION_TOP: f32 = 0.4;

pub struct Game<'f> {
    pub keys: [bool; 1024],
    pub width: u32,
    pub height: u32,
    config: GameConfig,
    session: DialogueSession,
    text: TextRenderer<'f>,
    camera: Camera,
    screen_projection: Mat4,
    _sound: Option<SoundEngine>,
}

impl<'f> Game<'f> {
    pub fn new(config: GameConfig, font: &'f FontData, width: u32, height: u32) -> Result<Self, GameError> {
        let dialogue = &config.dialogue;
        let script = Script::load(&get_path(&dialogue.script), dialogue.start_node)?;
        let session = DialogueSession::new(script, dialogue.start_node, dialogue.max_auto_chain)?;
        let text = TextRenderer::new(font, config.glyph_cache.capacity)?;

        let mut camera = Camera::new(glm::vec3(0.0, 0.0, 10.0), 1.0);
        camera.set_viewport(width, height);

        let sound = start_audio(&config);

        log::info!("Dialogue session started at node {}", dialogue.start_node);
        Ok(Self {
            keys: [false; 1024],
            width,
            height,
            session,
            text,
            camera,
            screen_projection: screen_projection(width, height),
            _sound: sound,
            config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!("Framebuffer resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.camera.set_viewport(width, height);
        self.screen_projection = screen_projection(width, height);
    }

    /// Records held keys and feeds dialogue input to the session.
    pub fn process_event(&mut self, event: &WindowEvent) -> Result<InputOutcome, UnknownNodeError> {
        if let WindowEvent::Key(key, _, action, _) = event {
            if (0..1024).contains(&(*key as i32)) {
                match action {
                    Action::Press => self.keys[*key as usize] = true,
                    Action::Release => self.keys[*key as usize] = false,
                    Action::Repeat => {}
                }
            }
        }
        match dialogue_input(event) {
            Some(input) => {
                let outcome = self.session.handle_input(input)?;
                if outcome == InputOutcome::Unhandled {
                    log::debug!("Ignored {:?} at node {}", input, self.session.current().id);
                }
                Ok(outcome)
            }
            None => Ok(InputOutcome::Unhandled),
        }
    }

    pub fn update(&mut self, delta_time: f32) -> Result<(), UnknownNodeError> {
        self.session.tick()?;

        let held = |key: Key| self.keys[key as usize];
        let mut direction = glm::vec2(0.0, 0.0);
        if held(Key::A) != held(Key::D) {
            direction.x = if held(Key::A) { -1.0 } else { 1.0 };
        }
        if held(Key::S) != held(Key::W) {
            direction.y = if held(Key::S) { -1.0 } else { 1.0 };
        }
        self.camera.translate(direction, delta_time);
        Ok(())
    }

    pub fn render(&mut self) {
        let style = &self.config.text;
        let pixel_size = self.text.pixel_size() as f32;
        let line_height = pixel_size * style.line_spacing;

        unsafe {
            gl::Disable(gl::DEPTH_TEST);
        }

        if !style.banner.is_empty() {
            let width = self.text.measure(&style.banner).x * WORLD_TEXT_SCALE;
            self.text.set_transform(&self.camera.world_to_clip());
            self.text.render_text_ex(&style.banner, -width / 2.0, 0.0, WORLD_TEXT_SCALE, &color(style.banner_color));
        }

        self.text.set_transform(&self.screen_projection);
        let top = self.height as f32 - style.margin - pixel_size;
        self.text.draw_paragraph(
            self.session.text(Region::Secondary),
            glm::vec2(style.margin, top),
            style.max_line_chars,
            line_height,
            &color(style.secondary_color)
        );
        self.text.draw_paragraph(
            self.session.text(Region::Primary),
            glm::vec2(style.margin, self.height as f32 * PRIMARY_REGION_TOP),
            style.max_line_chars,
            line_height,
            &color(style.primary_color)
        );

        if !self.session.awaiting_input() {
            return;
        }
        let hint = if self.session.state() == NodeState::AwaitingChoice {
            t!("hint.choose", count = self.session.current().choice_count())
        } else {
            t!("hint.advance")
        };
        self.text.render_text_ex(&hint, style.margin, style.margin, 0.6, &color(style.secondary_color));
    }
}

/// Maps a window event to dialogue input: left click, Enter or Space
/// advance; number keys 1-9 pick a choice.
pub fn dialogue_input(event: &WindowEvent) -> Option<DialogueInput> {
    match event {
        WindowEvent::MouseButton(MouseButton::Button1, Action::Press, _) => Some(DialogueInput::Advance),
        WindowEvent::Key(key, _, Action::Press, _) => match key {
            Key::Enter | Key::KpEnter | Key::Space => Some(DialogueInput::Advance),
            _ => choice_number(*key).map(DialogueInput::Choice),
        },
        _ => None,
    }
}

fn choice_number(key: Key) -> Option<u32> {
    let number = match key {
        Key::Num1 | Key::Kp1 => 1,
        Key::Num2 | Key::Kp2 => 2,
        Key::Num3 | Key::Kp3 => 3,
        Key::Num4 | Key::Kp4 => 4,
        Key::Num5 | Key::Kp5 => 5,
        Key::Num6 | Key::Kp6 => 6,
        Key::Num7 | Key::Kp7 => 7,
        Key::Num8 | Key::Kp8 => 8,
        Key::Num9 | Key::Kp9 => 9,
        _ => return None,
    };
    Some(number)
}

/// Pixel-space orthographic projection, origin at the bottom-left.
pub fn screen_projection(width: u32, height: u32) -> Mat4 {
    glm::ortho(0.0, width as f32, 0.0, height as f32, -1.0, 1.0)
}

/// Starts the configured background loop. Audio problems never stop the game.
fn start_audio(config: &GameConfig) -> Option<SoundEngine> {
    let path = get_path(config.audio.loop_path.as_deref()?);
    let mut sound = match SoundEngine::new() {
        Ok(sound) => sound,
        Err(e) => {
            log::warn!("Audio disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = sound.play_loop(&path, config.audio.volume) {
        log::warn!("Background loop not started: {}", e);
    }
    Some(sound)
}

fn color(rgb: [f32; 3]) -> Vec3 {
    glm::vec3(rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glfw::Modifiers;

    fn key(key: Key, action: Action) -> WindowEvent {
        WindowEvent::Key(key, 0, action, Modifiers::empty())
    }

    #[test]
    fn number_keys_map_to_choices() {
        assert_eq!(dialogue_input(&key(Key::Num1, Action::Press)), Some(DialogueInput::Choice(1)));
        assert_eq!(dialogue_input(&key(Key::Kp3, Action::Press)), Some(DialogueInput::Choice(3)));
        assert_eq!(dialogue_input(&key(Key::Num9, Action::Press)), Some(DialogueInput::Choice(9)));
        assert_eq!(dialogue_input(&key(Key::Num0, Action::Press)), None);
    }

    #[test]
    fn click_and_enter_advance() {
        let click = WindowEvent::MouseButton(MouseButton::Button1, Action::Press, Modifiers::empty());
        assert_eq!(dialogue_input(&click), Some(DialogueInput::Advance));
        assert_eq!(dialogue_input(&key(Key::Enter, Action::Press)), Some(DialogueInput::Advance));
        assert_eq!(dialogue_input(&key(Key::Space, Action::Press)), Some(DialogueInput::Advance));
    }

    #[test]
    fn releases_repeats_and_other_buttons_are_not_input() {
        assert_eq!(dialogue_input(&key(Key::Num1, Action::Release)), None);
        assert_eq!(dialogue_input(&key(Key::Enter, Action::Repeat)), None);
        let right_click = WindowEvent::MouseButton(MouseButton::Button2, Action::Press, Modifiers::empty());
        assert_eq!(dialogue_input(&right_click), None);
        assert_eq!(dialogue_input(&key(Key::W, Action::Press)), None);
    }

    #[test]
    fn screen_projection_maps_corners_to_clip_space() {
        let projection = screen_projection(800, 600);
        let bottom_left = projection * glm::vec4(0.0, 0.0, 0.0, 1.0);
        let top_right = projection * glm::vec4(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(bottom_left.x, -1.0);
        assert_relative_eq!(bottom_left.y, -1.0);
        assert_relative_eq!(top_right.x, 1.0);
        assert_relative_eq!(top_right.y, 1.0);
    }
}
