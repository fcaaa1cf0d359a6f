use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{skeleton::Skeleton, ArmatureError, ArmatureResult, WEIGHT_SUM_TOLERANCE};

/// Guards the falloff weights against division by zero when a vertex lies
/// exactly on a bone segment.
const FALLOFF_EPSILON: f32 = 1e-4;

/// How deformed vertex positions are computed from the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinningMode {
    /// Every vertex moves exactly with its highest-weight joint. No blending
    /// artifacts, but visible tearing where neighboring vertices follow
    /// different joints.
    Rigid,
    /// Each vertex is a weighted sum of its rest position re-posed through
    /// every influencing joint. Smooth across joint boundaries; loses volume
    /// at large bend angles (the well-known candy-wrapper artifact of linear
    /// blend skinning).
    LinearBlend,
}

impl FromStr for SkinningMode {
    type Err = ArmatureError;

    /// Accepts the classic `"rigid"` / `"linear"` spellings.
    fn from_str(s: &str) -> ArmatureResult<Self> {
        match s {
            "rigid" => Ok(SkinningMode::Rigid),
            "linear" => Ok(SkinningMode::LinearBlend),
            other => Err(ArmatureError::UnknownSkinningMode(other.to_string())),
        }
    }
}

/// One joint's pull on one vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Influence {
    /// Index of the joint in the bound skeleton
    pub joint: usize,
    /// Non-negative blend weight
    pub weight: f32,
}

/// Per-vertex joint influences for a rest-pose mesh.
///
/// For every vertex: at least one influence, non-negative weights summing to
/// one, all joint indices valid in the bound skeleton. [`SkinBinding::validate`]
/// checks all of this; [`crate::SkinMesh::set_skeleton`] runs it at bind time
/// so a bad binding fails fast instead of deforming silently wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    influences: Vec<Vec<Influence>>,
}

impl SkinBinding {
    /// Wrap authored influence data. Call [`SkinBinding::validate`] (or bind
    /// it) before trusting it.
    pub fn from_influences(influences: Vec<Vec<Influence>>) -> Self {
        Self { influences }
    }

    /// Bind every vertex rigidly (weight 1.0) to the joint whose bone
    /// segment lies nearest in the rest pose.
    pub fn rigid_nearest(positions: &[Vec3], skeleton: &Skeleton) -> Self {
        let influences = positions
            .iter()
            .map(|&p| {
                let mut nearest = 0;
                let mut nearest_distance = f32::INFINITY;
                for (index, (head, tail)) in rest_segments(skeleton).enumerate() {
                    let distance = point_segment_distance(p, head, tail);
                    if distance < nearest_distance {
                        nearest_distance = distance;
                        nearest = index;
                    }
                }
                vec![Influence {
                    joint: nearest,
                    weight: 1.0,
                }]
            })
            .collect();
        Self { influences }
    }

    /// Blend every vertex between its nearest bones, with weights falling
    /// off as `1 / (d^power + eps)` of the rest-pose distance to each bone
    /// segment. Only the `max_influences` strongest joints are kept, and the
    /// surviving weights are renormalized to sum to one.
    ///
    /// Larger `power` tightens the transition band around each joint
    /// boundary; `4.0` gives a ramp a few tenths of a bone-length wide on
    /// the bundled rigs.
    pub fn segment_falloff(
        positions: &[Vec3],
        skeleton: &Skeleton,
        max_influences: usize,
        power: f32,
    ) -> Self {
        let influences = positions
            .iter()
            .map(|&p| {
                let mut candidates: Vec<Influence> = rest_segments(skeleton)
                    .enumerate()
                    .map(|(joint, (head, tail))| {
                        let distance = point_segment_distance(p, head, tail);
                        Influence {
                            joint,
                            weight: 1.0 / (distance.powf(power) + FALLOFF_EPSILON),
                        }
                    })
                    .collect();

                candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
                candidates.truncate(max_influences.max(1));

                let total: f32 = candidates.iter().map(|i| i.weight).sum();
                for influence in &mut candidates {
                    influence.weight /= total;
                }
                candidates
            })
            .collect();
        Self { influences }
    }

    /// Number of vertices this binding describes
    pub fn vertex_count(&self) -> usize {
        self.influences.len()
    }

    /// The influences on one vertex
    pub fn influences(&self, vertex: usize) -> &[Influence] {
        &self.influences[vertex]
    }

    /// The weight of `joint` on `vertex`, zero if the joint does not
    /// influence it. This is what the weight-inspection view visualizes.
    pub fn weight_toward(&self, vertex: usize, joint: usize) -> f32 {
        self.influences[vertex]
            .iter()
            .find(|influence| influence.joint == joint)
            .map_or(0.0, |influence| influence.weight)
    }

    /// The highest-weight joint on `vertex` - the one rigid mode follows.
    pub fn dominant_joint(&self, vertex: usize) -> usize {
        let mut dominant = 0;
        let mut dominant_weight = f32::NEG_INFINITY;
        for influence in &self.influences[vertex] {
            if influence.weight > dominant_weight {
                dominant_weight = influence.weight;
                dominant = influence.joint;
            }
        }
        dominant
    }

    /// Check every invariant against a skeleton with `joint_count` joints.
    pub fn validate(&self, joint_count: usize) -> ArmatureResult<()> {
        for (vertex, influences) in self.influences.iter().enumerate() {
            if influences.is_empty() {
                return Err(ArmatureError::InvalidBinding {
                    vertex,
                    reason: "vertex has no joint influences".to_string(),
                });
            }

            let mut sum = 0.0;
            for influence in influences {
                if influence.joint >= joint_count {
                    return Err(ArmatureError::InvalidBinding {
                        vertex,
                        reason: format!(
                            "influence references joint {}, but the skeleton has {} joints",
                            influence.joint, joint_count
                        ),
                    });
                }
                if influence.weight < 0.0 {
                    return Err(ArmatureError::InvalidBinding {
                        vertex,
                        reason: format!("negative weight {}", influence.weight),
                    });
                }
                sum += influence.weight;
            }

            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ArmatureError::InvalidBinding {
                    vertex,
                    reason: format!("weights sum to {sum}, expected 1"),
                });
            }
        }
        Ok(())
    }
}

/// Rest-pose head/tail segment of every bone, in joint order.
fn rest_segments(skeleton: &Skeleton) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
    skeleton
        .joints()
        .iter()
        .map(|joint| (joint.head_rest(), joint.tail_rest()))
}

/// Distance from `p` to the closest point on segment `ab`.
fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Joint;
    use approx::assert_relative_eq;
    use glam::vec3;

    fn two_bone_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new();
        let root = skeleton
            .add_joint(
                Joint::new(
                    "Upper Arm",
                    None,
                    vec3(-2.0, 0.0, 0.0),
                    vec3(-0.2, 0.0, 0.0),
                    vec3(0.0, 0.0, 1.0),
                )
                .unwrap(),
            )
            .unwrap();
        skeleton
            .add_joint(
                Joint::new(
                    "Forearm",
                    Some(root),
                    vec3(2.0, 0.0, 0.0),
                    vec3(3.8, 0.0, 0.0),
                    vec3(0.0, 0.0, -1.0),
                )
                .unwrap(),
            )
            .unwrap();
        skeleton
    }

    #[test]
    pub fn test_mode_from_str() {
        assert_eq!("rigid".parse::<SkinningMode>().unwrap(), SkinningMode::Rigid);
        assert_eq!(
            "linear".parse::<SkinningMode>().unwrap(),
            SkinningMode::LinearBlend
        );
        assert!(matches!(
            "dual-quaternion".parse::<SkinningMode>(),
            Err(ArmatureError::UnknownSkinningMode(_))
        ));
    }

    #[test]
    pub fn test_point_segment_distance() {
        let a = vec3(0.0, 0.0, 0.0);
        let b = vec3(2.0, 0.0, 0.0);
        assert_relative_eq!(point_segment_distance(vec3(1.0, 3.0, 0.0), a, b), 3.0);
        // Beyond the ends, distance is to the endpoint.
        assert_relative_eq!(point_segment_distance(vec3(-1.0, 0.0, 0.0), a, b), 1.0);
        assert_relative_eq!(point_segment_distance(vec3(3.0, 4.0, 0.0), a, b), 1.0_f32.hypot(4.0));
        // Degenerate segment.
        assert_relative_eq!(point_segment_distance(vec3(0.0, 1.0, 0.0), a, a), 1.0);
    }

    #[test]
    pub fn test_rigid_nearest_picks_the_closer_bone() {
        let skeleton = two_bone_skeleton();
        let binding = SkinBinding::rigid_nearest(
            &[vec3(-1.5, 0.3, 0.0), vec3(3.0, -0.2, 0.0)],
            &skeleton,
        );

        assert_eq!(binding.influences(0), &[Influence { joint: 0, weight: 1.0 }]);
        assert_eq!(binding.influences(1), &[Influence { joint: 1, weight: 1.0 }]);
        binding.validate(skeleton.joint_count()).unwrap();
    }

    #[test]
    pub fn test_segment_falloff_is_normalized_and_smooth() {
        let skeleton = two_bone_skeleton();
        // Sample across the gap between the two bones.
        let positions: Vec<Vec3> = (0..20)
            .map(|i| vec3(-2.0 + i as f32 * 0.3, 0.5, 0.0))
            .collect();
        let binding = SkinBinding::segment_falloff(&positions, &skeleton, 2, 4.0);
        binding.validate(skeleton.joint_count()).unwrap();

        // Near the upper arm the upper arm dominates; near the forearm it
        // yields.
        assert!(binding.weight_toward(0, 0) > 0.9);
        assert!(binding.weight_toward(19, 1) > 0.9);
        for vertex in 0..positions.len() {
            let sum: f32 = binding
                .influences(vertex)
                .iter()
                .map(|influence| influence.weight)
                .sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    pub fn test_validate_rejects_bad_bindings() {
        let no_influences = SkinBinding::from_influences(vec![vec![]]);
        assert!(matches!(
            no_influences.validate(2),
            Err(ArmatureError::InvalidBinding { vertex: 0, .. })
        ));

        let bad_joint = SkinBinding::from_influences(vec![vec![Influence {
            joint: 5,
            weight: 1.0,
        }]]);
        assert!(bad_joint.validate(2).is_err());

        let negative = SkinBinding::from_influences(vec![vec![
            Influence { joint: 0, weight: -0.5 },
            Influence { joint: 1, weight: 1.5 },
        ]]);
        assert!(negative.validate(2).is_err());

        let bad_sum = SkinBinding::from_influences(vec![vec![
            Influence { joint: 0, weight: 0.6 },
            Influence { joint: 1, weight: 0.6 },
        ]]);
        assert!(matches!(
            bad_sum.validate(2),
            Err(ArmatureError::InvalidBinding { vertex: 0, .. })
        ));

        let good = SkinBinding::from_influences(vec![vec![
            Influence { joint: 0, weight: 0.25 },
            Influence { joint: 1, weight: 0.75 },
        ]]);
        good.validate(2).unwrap();
    }

    #[test]
    pub fn test_dominant_joint_and_weight_toward() {
        let binding = SkinBinding::from_influences(vec![vec![
            Influence { joint: 0, weight: 0.3 },
            Influence { joint: 1, weight: 0.7 },
        ]]);
        assert_eq!(binding.dominant_joint(0), 1);
        assert_relative_eq!(binding.weight_toward(0, 0), 0.3);
        assert_relative_eq!(binding.weight_toward(0, 1), 0.7);
        assert_relative_eq!(binding.weight_toward(0, 9), 0.0);
    }
}
