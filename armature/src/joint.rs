use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{ArmatureError, ArmatureResult};

/// A single rotational degree of freedom: a hinge at a fixed rest position,
/// rotating about a fixed axis.
///
/// Joints are owned by a [`crate::Skeleton`] and refer to their parent by
/// index into it, never by pointer. Rest geometry (`head_rest`, `tail_rest`)
/// is expressed in the skeleton's rest space and never changes after
/// construction; the only mutable pose state is `angle`, so a joint's world
/// transform is always recomputable from its ancestors' angles alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    name: String,
    parent: Option<usize>,
    head_rest: Vec3,
    tail_rest: Vec3,
    rotation_axis: Vec3,
    angle: f32,
}

impl Joint {
    /// Create a joint at rest (angle 0).
    ///
    /// `parent` is the index of an already-added joint, or `None` for a root.
    /// `rotation_axis` does not need to be unit length, but it must not be
    /// zero; the stored axis is normalized.
    pub fn new(
        name: impl Into<String>,
        parent: Option<usize>,
        head_rest: Vec3,
        tail_rest: Vec3,
        rotation_axis: Vec3,
    ) -> ArmatureResult<Self> {
        let name = name.into();
        let rotation_axis = rotation_axis
            .try_normalize()
            .ok_or_else(|| ArmatureError::DegenerateAxis { name: name.clone() })?;

        Ok(Self {
            name,
            parent,
            head_rest,
            tail_rest,
            rotation_axis,
            angle: 0.0,
        })
    }

    /// The joint's name, eg. "Forearm"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the parent joint in the owning skeleton, `None` for roots
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Rest-space position of the bone's head (the pivot)
    pub fn head_rest(&self) -> Vec3 {
        self.head_rest
    }

    /// Rest-space position of the bone's tail
    pub fn tail_rest(&self) -> Vec3 {
        self.tail_rest
    }

    /// The hinge axis, unit length
    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    /// Current hinge angle in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Set the hinge angle in degrees.
    ///
    /// Storing the angle does not re-skin any mesh bound to the skeleton;
    /// callers follow up with [`crate::SkinMesh::update_skin`].
    /// The angle is unclamped.
    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = degrees;
    }

    /// The joint's transform relative to its parent: rotation by `angle`
    /// about `rotation_axis`, pivoted at `head_rest`.
    ///
    /// Rotating only reorients the bone - the head stays fixed. A pure
    /// function of `angle`, `rotation_axis` and `head_rest`.
    pub fn local_transform(&self) -> Affine3A {
        self.transform_at(self.angle)
    }

    /// [`Joint::local_transform`] evaluated at angle 0, ie. the joint's
    /// contribution to the rest pose.
    pub fn rest_transform(&self) -> Affine3A {
        self.transform_at(0.0)
    }

    fn transform_at(&self, degrees: f32) -> Affine3A {
        let rotation = Quat::from_axis_angle(self.rotation_axis, degrees.to_radians());
        Affine3A::from_translation(self.head_rest)
            * Affine3A::from_quat(rotation)
            * Affine3A::from_translation(-self.head_rest)
    }
}
