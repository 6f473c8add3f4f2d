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

use glm::{Mat4, Vec2, Vec3};

/// Units per second the camera moves at while a direction key is held.
pub const CAMERA_SPEED: f32 = 30.0;

/// First-person camera producing the world-to-clip transform for 3-D content.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation around the world up axis, in radians. Zero looks down -Z.
    pub yaw: f32,
    /// Rotation above the horizon, in radians.
    pub pitch: f32,
    /// Vertical field of view, in radians.
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fovy: 60.0f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        glm::normalize(&glm::vec3(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            -self.pitch.cos() * self.yaw.cos(),
        ))
    }

    pub fn right(&self) -> Vec3 {
        glm::normalize(&glm::cross(&self.forward(), &Vec3::y()))
    }

    pub fn view(&self) -> Mat4 {
        glm::look_at(&self.position, &(self.position + self.forward()), &Vec3::y())
    }

    pub fn projection(&self) -> Mat4 {
        glm::perspective(self.aspect, self.fovy, self.near, self.far)
    }

    pub fn world_to_clip(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Moves along the camera's right (x) and forward (y) axes.
    ///
    /// `direction` is normalised first so diagonal movement is not faster.
    pub fn translate(&mut self, direction: Vec2, elapsed: f32) {
        if direction == Vec2::zeros() {
            return;
        }
        let step = glm::normalize(&direction) * CAMERA_SPEED * elapsed;
        self.position += self.right() * step.x + self.forward() * step.y;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::zeros(), 1.0);
        let forward = camera.forward();
        assert_relative_eq!(forward.z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn diagonal_movement_is_normalised() {
        let mut camera = Camera::new(Vec3::zeros(), 1.0);
        camera.translate(glm::vec2(1.0, 1.0), 1.0);
        assert_relative_eq!(glm::length(&camera.position), CAMERA_SPEED, epsilon = 1e-3);
    }

    #[test]
    fn point_ahead_lands_inside_clip_volume() {
        let camera = Camera::new(glm::vec3(0.0, 0.0, 10.0), 4.0 / 3.0);
        let clip = camera.world_to_clip() * glm::vec4(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && ndc.z.abs() <= 1.0);
    }

    #[test]
    fn zero_height_viewport_keeps_aspect() {
        let mut camera = Camera::new(Vec3::zeros(), 2.0);
        camera.set_viewport(800, 0);
        assert_relative_eq!(camera.aspect, 2.0);
        camera.set_viewport(800, 400);
        assert_relative_eq!(camera.aspect, 2.0);
        camera.set_viewport(300, 600);
        assert_relative_eq!(camera.aspect, 0.5);
    }
}
