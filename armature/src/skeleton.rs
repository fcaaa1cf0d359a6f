use glam::{Affine3A, Mat4, Vec3, Vec4};

use crate::{joint::Joint, rendering::RenderContext, ArmatureError, ArmatureResult};

/// Color used for the bone gizmo overlay
const BONE_COLOR: Vec4 = Vec4::new(1.0, 0.8, 0.1, 1.0);

/// Line width used for the bone gizmo overlay
const BONE_LINE_WIDTH: f32 = 3.0;

/// An ordered collection of [`Joint`]s forming a tree.
///
/// Insertion order is joint index: a joint's parent must already be in the
/// skeleton when the joint is added, which makes cycles unrepresentable and
/// lets forward kinematics run as a single parents-first pass.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Create an empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint and return its index.
    ///
    /// Fails if the joint references a parent that has not been added yet.
    pub fn add_joint(&mut self, joint: Joint) -> ArmatureResult<usize> {
        if let Some(parent) = joint.parent() {
            if parent >= self.joints.len() {
                return Err(ArmatureError::InvalidParent {
                    joint: joint.name().to_string(),
                    parent,
                });
            }
        }
        self.joints.push(joint);
        Ok(self.joints.len() - 1)
    }

    /// Number of joints in the skeleton
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// All joints, in index order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Bounds-checked joint accessor
    pub fn joint(&self, index: usize) -> ArmatureResult<&Joint> {
        self.joints
            .get(index)
            .ok_or(ArmatureError::JointIndexOutOfRange {
                index,
                count: self.joints.len(),
            })
    }

    /// Bounds-checked mutable joint accessor
    pub fn joint_mut(&mut self, index: usize) -> ArmatureResult<&mut Joint> {
        let count = self.joints.len();
        self.joints
            .get_mut(index)
            .ok_or(ArmatureError::JointIndexOutOfRange { index, count })
    }

    /// Set the angle of joint `index`, in degrees.
    ///
    /// The new pose becomes visible on the next
    /// [`crate::SkinMesh::update_skin`]; mutating the angle alone does not
    /// re-skin anything.
    pub fn set_joint_angle(&mut self, index: usize, degrees: f32) -> ArmatureResult<()> {
        self.joint_mut(index)?.set_angle(degrees);
        Ok(())
    }

    /// Forward kinematics: the world transform of every joint, in joint
    /// order.
    ///
    /// `world[i] = world[parent(i)] * local[i]`, with an identity parent for
    /// roots. The result is identical to evaluating each joint independently
    /// with [`Skeleton::joint_world_transform`].
    pub fn world_transforms(&self) -> Vec<Affine3A> {
        self.transforms_with(Joint::local_transform)
    }

    /// The same kinematic chain evaluated with every angle at zero. Inverting
    /// these gives the inverse bind matrices used at skin bind time.
    pub fn rest_world_transforms(&self) -> Vec<Affine3A> {
        self.transforms_with(Joint::rest_transform)
    }

    fn transforms_with(&self, local: impl Fn(&Joint) -> Affine3A) -> Vec<Affine3A> {
        let mut world: Vec<Affine3A> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let local = local(joint);
            // Parents precede children, so world[parent] is already final.
            world.push(match joint.parent() {
                Some(parent) => world[parent] * local,
                None => local,
            });
        }
        world
    }

    /// World transform of a single joint, evaluated recursively through its
    /// ancestor chain.
    pub fn joint_world_transform(&self, index: usize) -> ArmatureResult<Affine3A> {
        let joint = self.joint(index)?;
        let local = joint.local_transform();
        Ok(match joint.parent() {
            Some(parent) => self.joint_world_transform(parent)? * local,
            None => local,
        })
    }

    /// Current world-space head and tail position of every bone, for gizmo
    /// rendering or debugging.
    pub fn bone_segments(&self) -> Vec<(Vec3, Vec3)> {
        let world = self.world_transforms();
        self.joints
            .iter()
            .zip(world)
            .map(|(joint, transform)| {
                (
                    transform.transform_point3(joint.head_rest()),
                    transform.transform_point3(joint.tail_rest()),
                )
            })
            .collect()
    }

    /// Draw a line segment from head to tail of every bone, in world space.
    ///
    /// This is a debug visualization of the rig itself and is independent of
    /// any skin deformation.
    pub fn render(&self, ctx: &mut dyn RenderContext, view: Mat4, projection: Mat4) {
        let segments = self.bone_segments();
        let mut positions = Vec::with_capacity(segments.len() * 2);
        let mut indices = Vec::with_capacity(segments.len() * 2);
        for (head, tail) in segments {
            indices.push(positions.len() as u32);
            positions.push(head);
            indices.push(positions.len() as u32);
            positions.push(tail);
        }

        ctx.draw_lines(
            &positions,
            None,
            &indices,
            projection * view,
            BONE_COLOR,
            BONE_LINE_WIDTH,
        );
    }
}
