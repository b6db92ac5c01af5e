use glam::{Quat, Vec4};
use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneGraph};

/// Which part of a node's transform a channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Values are stored as (in-tangent, value, out-tangent) triplets
    CubicSpline,
}

/// Keyframed values for one property of one node.
///
/// Vectors are stored as `Vec4` (translation/scale leave `w` at zero,
/// rotations are `xyzw` quaternions).
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Node index inside the source asset
    pub target: usize,
    pub property: Property,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: Vec<Vec4>,
}

impl Channel {
    fn keyframe_count(&self) -> usize {
        let per_key = match self.interpolation {
            Interpolation::CubicSpline => 3,
            _ => 1,
        };
        self.times.len().min(self.values.len() / per_key)
    }

    fn value(&self, key: usize) -> Vec4 {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[key * 3 + 1],
            _ => self.values[key],
        }
    }

    /// Value at clip time `t`, held constant outside the keyed range
    pub fn sample(&self, t: f32) -> Option<Vec4> {
        let count = self.keyframe_count();
        if count == 0 {
            return None;
        }
        if count == 1 || t <= self.times[0] {
            return Some(self.value(0));
        }
        if t >= self.times[count - 1] {
            return Some(self.value(count - 1));
        }

        let next = self.times[..count].partition_point(|&k| k <= t);
        let prev = next - 1;
        let (t0, t1) = (self.times[prev], self.times[next]);
        let span = t1 - t0;
        let s = if span > 0.0 { (t - t0) / span } else { 0.0 };

        let sampled = match self.interpolation {
            Interpolation::Step => self.value(prev),
            Interpolation::Linear => {
                let (a, b) = (self.value(prev), self.value(next));
                if self.property == Property::Rotation {
                    let qa = Quat::from_vec4(a).normalize();
                    let qb = Quat::from_vec4(b).normalize();
                    Vec4::from(qa.slerp(qb, s))
                } else {
                    a.lerp(b, s)
                }
            }
            Interpolation::CubicSpline => {
                let p0 = self.values[prev * 3 + 1];
                let m0 = self.values[prev * 3 + 2] * span;
                let p1 = self.values[next * 3 + 1];
                let m1 = self.values[next * 3] * span;
                let s2 = s * s;
                let s3 = s2 * s;
                p0 * (2.0 * s3 - 3.0 * s2 + 1.0)
                    + m0 * (s3 - 2.0 * s2 + s)
                    + p1 * (-2.0 * s3 + 3.0 * s2)
                    + m1 * (s3 - s2)
            }
        };

        if self.property == Property::Rotation {
            Some(Vec4::from(Quat::from_vec4(sampled).normalize()))
        } else {
            Some(sampled)
        }
    }
}

/// Authored animation baked into a model
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Last keyframe time across all channels, in seconds
    pub duration: f32,
    pub channels: Vec<Channel>,
}

/// What happens when playback reaches the end of the clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    Repeat,
    Once,
}

/// A clip bound to scene nodes, advanced by frame deltas
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clip: AnimationClip,
    targets: Vec<Option<NodeId>>,
    time: f32,
    loop_mode: LoopMode,
}

impl ClipPlayer {
    /// Bind channels through `resolve`; channels whose node is unknown stay inert
    pub fn new(
        clip: AnimationClip,
        loop_mode: LoopMode,
        resolve: impl Fn(usize) -> Option<NodeId>,
    ) -> Self {
        let targets = clip.channels.iter().map(|c| resolve(c.target)).collect();
        Self {
            clip,
            targets,
            time: 0.0,
            loop_mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    /// Current playhead in clip time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Move the playhead by `delta` seconds and pose the bound nodes
    pub fn advance(&mut self, delta: f32, graph: &mut SceneGraph) {
        let duration = self.clip.duration;
        self.time = if duration <= 0.0 {
            0.0
        } else {
            match self.loop_mode {
                LoopMode::Repeat => (self.time + delta).rem_euclid(duration),
                LoopMode::Once => (self.time + delta).min(duration),
            }
        };
        self.apply(graph);
    }

    fn apply(&self, graph: &mut SceneGraph) {
        for (channel, target) in self.clip.channels.iter().zip(&self.targets) {
            let (Some(node), Some(value)) = (target, channel.sample(self.time)) else {
                continue;
            };
            let transform = graph.transform_mut(*node);
            match channel.property {
                Property::Translation => transform.translation = value.truncate(),
                Property::Rotation => transform.rotation = Quat::from_vec4(value),
                Property::Scale => transform.scale = value.truncate(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::types::Transform;
    use glam::Vec3;

    fn translation_channel(interpolation: Interpolation) -> Channel {
        Channel {
            target: 0,
            property: Property::Translation,
            interpolation,
            times: vec![0.0, 1.0, 2.0],
            values: vec![
                Vec4::new(0.0, 0.0, 0.0, 0.0),
                Vec4::new(2.0, 0.0, 0.0, 0.0),
                Vec4::new(2.0, 4.0, 0.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_linear_sampling() {
        let channel = translation_channel(Interpolation::Linear);
        assert_eq!(channel.sample(0.5), Some(Vec4::new(1.0, 0.0, 0.0, 0.0)));
        assert_eq!(channel.sample(1.5), Some(Vec4::new(2.0, 2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_step_holds_previous_key() {
        let channel = translation_channel(Interpolation::Step);
        assert_eq!(channel.sample(0.99), Some(Vec4::ZERO));
        assert_eq!(channel.sample(1.0), Some(Vec4::new(2.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_sampling_clamps_outside_range() {
        let channel = translation_channel(Interpolation::Linear);
        assert_eq!(channel.sample(-1.0), Some(Vec4::ZERO));
        assert_eq!(channel.sample(9.0), Some(Vec4::new(2.0, 4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_cubic_spline_hits_keys_and_uses_values() {
        let channel = Channel {
            target: 0,
            property: Property::Translation,
            interpolation: Interpolation::CubicSpline,
            times: vec![0.0, 1.0],
            values: vec![
                Vec4::ZERO,
                Vec4::new(0.0, 0.0, 0.0, 0.0),
                Vec4::ZERO,
                Vec4::ZERO,
                Vec4::new(1.0, 0.0, 0.0, 0.0),
                Vec4::ZERO,
            ],
        };
        // zero tangents reduce to smoothstep
        let mid = channel.sample(0.5).unwrap();
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert_eq!(channel.sample(1.0), Some(Vec4::new(1.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotation_slerp_stays_unit() {
        let channel = Channel {
            target: 0,
            property: Property::Rotation,
            interpolation: Interpolation::Linear,
            times: vec![0.0, 1.0],
            values: vec![
                Vec4::from(Quat::IDENTITY),
                Vec4::from(Quat::from_rotation_y(std::f32::consts::PI * 0.5)),
            ],
        };
        let mid = Quat::from_vec4(channel.sample(0.5).unwrap());
        assert!((mid.length() - 1.0).abs() < 1e-5);
        let expected = Quat::from_rotation_y(std::f32::consts::PI * 0.25);
        assert!(mid.angle_between(expected) < 1e-4);
    }

    fn player(loop_mode: LoopMode) -> (ClipPlayer, SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let node = graph.add(graph.root(), Node::group("bone", Transform::IDENTITY));
        let clip = AnimationClip {
            name: "wave".into(),
            duration: 2.0,
            channels: vec![translation_channel(Interpolation::Linear)],
        };
        (ClipPlayer::new(clip, loop_mode, |_| Some(node)), graph, node)
    }

    #[test]
    fn test_repeat_wraps_playhead() {
        let (mut player, mut graph, node) = player(LoopMode::Repeat);
        player.advance(2.5, &mut graph);
        assert!((player.time() - 0.5).abs() < 1e-6);
        assert_eq!(graph.node(node).transform.translation, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_once_holds_last_pose() {
        let (mut player, mut graph, node) = player(LoopMode::Once);
        player.advance(5.0, &mut graph);
        assert_eq!(player.time(), 2.0);
        assert_eq!(graph.node(node).transform.translation, Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn test_unresolved_targets_are_skipped() {
        let mut graph = SceneGraph::new();
        let clip = AnimationClip {
            name: "orphan".into(),
            duration: 2.0,
            channels: vec![translation_channel(Interpolation::Linear)],
        };
        let mut player = ClipPlayer::new(clip, LoopMode::Repeat, |_| None);
        player.advance(0.5, &mut graph);
        assert_eq!(player.time(), 0.5);
    }
}
