use glam::{Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::animation::action::TrackValue;
use crate::animation::clip::TargetPath;

/// Blended local transform of one skeleton joint.
///
/// Components no contributing track animates stay `None`, so the caller keeps
/// the joint's rest value for them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointPose {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

/// Result of [`AnimationMixer::evaluate`](crate::animation::AnimationMixer::evaluate).
#[derive(Debug, Clone, Default)]
pub struct Pose {
    joints: FxHashMap<String, JointPose>,
}

impl Pose {
    #[must_use]
    pub fn joint(&self, name: &str) -> Option<&JointPose> {
        self.joints.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JointPose)> {
        self.joints.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

#[derive(Default)]
struct JointAccumulator {
    translation: Vec3,
    translation_weight: f32,
    rotation: Vec4,
    rotation_weight: f32,
    scale: Vec3,
    scale_weight: f32,
}

impl JointAccumulator {
    fn finish(&self) -> JointPose {
        let translation =
            (self.translation_weight > 0.0).then(|| self.translation / self.translation_weight);
        let scale = (self.scale_weight > 0.0).then(|| self.scale / self.scale_weight);
        let rotation = (self.rotation_weight > 0.0 && self.rotation.length_squared() > 0.0)
            .then(|| Quat::from_vec4(self.rotation).normalize());
        JointPose {
            translation,
            rotation,
            scale,
        }
    }
}

/// Weighted blend of per-action samples.
#[derive(Default)]
pub(crate) struct PoseBlender {
    joints: FxHashMap<String, JointAccumulator>,
}

impl PoseBlender {
    pub(crate) fn accumulate(&mut self, node_name: &str, target: TargetPath, value: TrackValue, weight: f32) {
        let acc = match self.joints.get_mut(node_name) {
            Some(acc) => acc,
            None => self.joints.entry(node_name.to_string()).or_default(),
        };

        match (target, value) {
            (TargetPath::Translation, TrackValue::Vector3(v)) => {
                acc.translation += v * weight;
                acc.translation_weight += weight;
            }
            (TargetPath::Scale, TrackValue::Vector3(v)) => {
                acc.scale += v * weight;
                acc.scale_weight += weight;
            }
            (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                // Keep every contribution in the same hemisphere before the nlerp sum
                let mut v = Vec4::from(q);
                if acc.rotation_weight > 0.0 && acc.rotation.dot(v) < 0.0 {
                    v = -v;
                }
                acc.rotation += v * weight;
                acc.rotation_weight += weight;
            }
            _ => {
                log::trace!("Ignoring mismatched track value for '{node_name}' ({target:?})");
            }
        }
    }

    pub(crate) fn finish(self) -> Pose {
        Pose {
            joints: self
                .joints
                .into_iter()
                .map(|(name, acc)| {
                    let pose = acc.finish();
                    (name, pose)
                })
                .collect(),
        }
    }
}
