//! Per-frame animation: authored clip playback plus procedural motion.
//!
//! Procedural speeds are given per reference frame (60 Hz) so presets keep
//! the feel they were tuned with; the actual step scales with the clamped
//! frame delta. The bounce is a function of absolute time instead, so it lands
//! on the same value at the same instant however coarse the frames are.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::clip::ClipPlayer;
use super::clock::FrameTime;
use crate::scene::{LightRig, NodeId, SceneGraph};

/// Longest frame delta that is simulated; anything longer (a backgrounded tab) is cut to this
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Frame length the per-frame speeds are expressed against
pub const REFERENCE_FRAME: f32 = 1.0 / 60.0;

/// Sanitize a raw clock delta: non-finite or negative becomes zero, long stalls are capped
pub fn clamp_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta.min(MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

/// Bounded back-and-forth rotation about the vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sway {
    /// Largest offset from the resting angle, radians
    pub max_rotation: f32,
    /// Radians per reference frame; the sign is ignored, `direction` alone steers
    pub speed: f32,
}

impl Sway {
    /// Advance `offset` by one step. Reaching a bound clamps onto it and reverses direction.
    pub fn step(&self, offset: f32, direction: f32, delta: f32) -> (f32, f32) {
        let bound = self.max_rotation.abs();
        let next = offset + self.speed.abs() * direction * (delta / REFERENCE_FRAME);
        if next >= bound {
            (bound, -1.0)
        } else if next <= -bound {
            (-bound, 1.0)
        } else {
            (next, direction)
        }
    }
}

/// `baseline + amplitude * sin(t * angular_speed)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    pub baseline: f32,
    pub amplitude: f32,
    /// Radians per second
    pub angular_speed: f32,
}

impl Oscillator {
    pub fn value_at(&self, elapsed: f64) -> f32 {
        let phase = (elapsed * self.angular_speed as f64).sin();
        self.baseline + self.amplitude * phase as f32
    }
}

/// Mutable per-instance animation record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Absolute seconds on the frame timeline, never decreasing
    pub elapsed: f64,
    pub sway_offset: f32,
    /// +1 or -1
    pub sway_direction: f32,
    /// Accent spin angle in [0, 2π)
    pub spin_angle: f32,
    pub frames: u64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            sway_offset: 0.0,
            sway_direction: 1.0,
            spin_angle: 0.0,
            frames: 0,
        }
    }
}

/// Sway bound to a node, preserving the node's other Euler angles
#[derive(Debug, Clone, Copy)]
pub struct SwayBinding {
    pub node: NodeId,
    pub sway: Sway,
    /// Framing rotation (XYZ Euler); sway offsets its Y component
    pub rest: Vec3,
}

/// Floating accent: bounce a node, spin its group, and keep the point light on it
#[derive(Debug, Clone, Copy)]
pub struct AccentBinding {
    pub group: NodeId,
    pub bob: NodeId,
    pub bounce: Oscillator,
    /// Radians per reference frame
    pub spin_speed: f32,
    /// Point light position relative to the bobbing node
    pub light_offset: Vec3,
}

#[derive(Debug, Default)]
pub struct AnimationScheduler {
    state: AnimationState,
    clip: Option<ClipPlayer>,
    sway: Option<SwayBinding>,
    accent: Option<AccentBinding>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, clip: ClipPlayer) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_sway(mut self, binding: SwayBinding) -> Self {
        self.sway = Some(binding);
        self
    }

    pub fn with_accent(mut self, binding: AccentBinding) -> Self {
        self.accent = Some(binding);
        self
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn clip(&self) -> Option<&ClipPlayer> {
        self.clip.as_ref()
    }

    /// Advance one rendered frame. Stepped motion uses the clamped delta,
    /// the bounce reads `time.elapsed` directly.
    pub fn tick(&mut self, time: FrameTime, graph: &mut SceneGraph, lights: &mut LightRig) {
        let delta = clamp_delta(time.delta);
        if time.elapsed.is_finite() && time.elapsed > self.state.elapsed {
            self.state.elapsed = time.elapsed;
        }
        self.state.frames += 1;

        if let Some(clip) = &mut self.clip {
            clip.advance(delta, graph);
        }

        if let Some(binding) = self.sway {
            let (offset, direction) =
                binding
                    .sway
                    .step(self.state.sway_offset, self.state.sway_direction, delta);
            self.state.sway_offset = offset;
            self.state.sway_direction = direction;

            let yaw = binding.rest.y + offset;
            graph.transform_mut(binding.node).rotation =
                Quat::from_euler(EulerRot::XYZ, binding.rest.x, yaw, binding.rest.z);
        }

        if let Some(accent) = self.accent {
            self.state.spin_angle = (self.state.spin_angle
                + accent.spin_speed * (delta / REFERENCE_FRAME))
                .rem_euclid(TAU);
            graph.transform_mut(accent.group).rotation = Quat::from_rotation_y(self.state.spin_angle);

            let bob = graph.transform_mut(accent.bob);
            bob.translation.y = accent.bounce.value_at(self.state.elapsed);
            let light_position = bob.translation + accent.light_offset;

            if let Some(point) = &mut lights.point {
                if point.anchor == accent.group {
                    point.offset = light_position;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(0.016), 0.016);
        assert_eq!(clamp_delta(30.0), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(-1.0), 0.0);
        assert_eq!(clamp_delta(f32::NAN), 0.0);
        assert_eq!(clamp_delta(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_sway_step_at_reference_rate() {
        let sway = Sway {
            max_rotation: FRAC_PI_2,
            speed: 0.007,
        };
        let (offset, direction) = sway.step(0.0, 1.0, REFERENCE_FRAME);
        assert!((offset - 0.007).abs() < 1e-6);
        assert_eq!(direction, 1.0);
    }

    #[test]
    fn test_sway_flips_on_reaching_bound() {
        let sway = Sway {
            max_rotation: 0.1,
            speed: 0.05,
        };
        let (offset, direction) = sway.step(0.05, 1.0, REFERENCE_FRAME);
        assert_eq!(offset, 0.1);
        assert_eq!(direction, -1.0);

        let (offset, direction) = sway.step(-0.05, -1.0, REFERENCE_FRAME);
        assert_eq!(offset, -0.1);
        assert_eq!(direction, 1.0);
    }

    #[test]
    fn test_oscillator_value() {
        let bounce = Oscillator {
            baseline: 2.09,
            amplitude: 0.05,
            angular_speed: 3.0,
        };
        assert_eq!(bounce.value_at(0.0), 2.09);
        let t = std::f64::consts::PI / 6.0;
        assert!((bounce.value_at(t) - 2.14).abs() < 1e-6);
    }

    #[test]
    fn test_negative_speed_still_sweeps_both_ways() {
        let sway = Sway {
            max_rotation: 0.1,
            speed: -0.05,
        };
        let (offset, direction) = sway.step(0.0, 1.0, REFERENCE_FRAME);
        assert!((offset - 0.05).abs() < 1e-6);
        assert_eq!(direction, 1.0);

        let (offset, direction) = sway.step(-0.08, -1.0, REFERENCE_FRAME);
        assert_eq!(offset, -0.1);
        assert_eq!(direction, 1.0);
        let (offset, _) = sway.step(offset, direction, REFERENCE_FRAME);
        assert!((offset + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_elapsed_never_goes_backwards() {
        let mut scheduler = AnimationScheduler::new();
        let mut graph = SceneGraph::new();
        let mut lights = LightRig::default();
        scheduler.tick(FrameTime { delta: 0.05, elapsed: 0.05 }, &mut graph, &mut lights);
        scheduler.tick(FrameTime { delta: -0.05, elapsed: 0.0 }, &mut graph, &mut lights);
        scheduler.tick(FrameTime { delta: 0.0, elapsed: f64::NAN }, &mut graph, &mut lights);
        assert!((scheduler.state().elapsed - 0.05).abs() < 1e-9);
        assert_eq!(scheduler.state().frames, 3);
    }
}
