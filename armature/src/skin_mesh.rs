use std::{cell::RefCell, rc::Rc};

use glam::{Affine3A, Mat4, Vec3};
use log::{debug, trace};

use crate::{
    binding::{SkinBinding, SkinningMode},
    mesh::{TriangleMesh, WeightShadedTriangleMesh},
    rendering::RenderContext,
    skeleton::Skeleton,
    ArmatureError, ArmatureResult,
};

/// Shared handle to a skeleton. The scene driver and any number of skin
/// meshes hold one of these within a single thread.
pub type SharedSkeleton = Rc<RefCell<Skeleton>>;

/// Everything fixed at bind time by [`SkinMesh::set_skeleton`].
#[derive(Debug, Clone)]
struct Binding {
    skeleton: SharedSkeleton,
    binding: SkinBinding,
    mode: SkinningMode,
    inverse_bind: Vec<Affine3A>,
}

/// A skinned mesh: an immutable rest pose plus a bound skeleton, producing
/// deformed vertex positions on demand.
///
/// The update contract mirrors the classic two-step driver:
/// [`Skeleton::set_joint_angle`] stores the new pose, and nothing moves until
/// the caller invokes [`SkinMesh::update_skin`]. Forgetting the second step
/// is a caller error, not a failure the core detects.
#[derive(Debug, Clone)]
pub struct SkinMesh {
    rest_positions: Vec<Vec3>,
    mesh: WeightShadedTriangleMesh,
    bound: Option<Binding>,
    inspected_joint: usize,
}

impl SkinMesh {
    /// Create a skin mesh from a rest pose. Positions and index topology are
    /// immutable from here on; only the deformed copies change.
    pub fn new(rest_positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mesh = WeightShadedTriangleMesh::new(TriangleMesh::new(rest_positions.clone(), indices));
        Self {
            rest_positions,
            mesh,
            bound: None,
            inspected_joint: 0,
        }
    }

    /// The rest-pose vertex positions
    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest_positions
    }

    /// The current deformed vertex positions (equal to the rest pose until a
    /// skeleton is bound)
    pub fn deformed_positions(&self) -> &[Vec3] {
        self.mesh.mesh().positions()
    }

    /// The per-vertex scalar currently feeding the weight-inspection view
    pub fn weight_scalars(&self) -> &[f32] {
        self.mesh.weights()
    }

    /// The renderable mesh, for tweaking colors and draw flags
    pub fn mesh_mut(&mut self) -> &mut WeightShadedTriangleMesh {
        &mut self.mesh
    }

    /// The skinning mode selected at bind time, if bound
    pub fn mode(&self) -> Option<SkinningMode> {
        self.bound.as_ref().map(|bound| bound.mode)
    }

    /// The joint currently shown by the weight-inspection view
    pub fn inspected_joint(&self) -> usize {
        self.inspected_joint
    }

    /// Bind a skeleton and a weight assignment, selecting the skinning mode
    /// once for the lifetime of the binding.
    ///
    /// Fails fast on a binding that references missing joints, covers the
    /// wrong number of vertices, or violates the weight invariants - a bad
    /// binding must never deform silently wrong. On success the inverse bind
    /// matrices are computed from the skeleton's rest pose and an initial
    /// deform runs.
    pub fn set_skeleton(
        &mut self,
        skeleton: SharedSkeleton,
        binding: SkinBinding,
        mode: SkinningMode,
    ) -> ArmatureResult<()> {
        let (joint_count, inverse_bind) = {
            let skeleton = skeleton.borrow();
            if binding.vertex_count() != self.rest_positions.len() {
                return Err(ArmatureError::CountMismatch {
                    what: "binding vertices",
                    expected: self.rest_positions.len(),
                    actual: binding.vertex_count(),
                });
            }
            binding.validate(skeleton.joint_count())?;
            let inverse_bind = skeleton
                .rest_world_transforms()
                .iter()
                .map(Affine3A::inverse)
                .collect();
            (skeleton.joint_count(), inverse_bind)
        };

        debug!(
            "binding skeleton: {} joints, {} vertices, {:?} skinning",
            joint_count,
            self.rest_positions.len(),
            mode
        );

        self.bound = Some(Binding {
            skeleton,
            binding,
            mode,
            inverse_bind,
        });
        if joint_count > 0 {
            self.show_joint_weights(0)?;
        }
        self.update_skin()
    }

    /// Recompute every deformed vertex position from the skeleton's current
    /// pose and write them into the renderable mesh.
    pub fn update_skin(&mut self) -> ArmatureResult<()> {
        let bound = self.bound.as_ref().ok_or(ArmatureError::SkeletonNotBound)?;

        let world = bound.skeleton.borrow().world_transforms();
        if world.len() != bound.inverse_bind.len() {
            return Err(ArmatureError::CountMismatch {
                what: "joint transforms",
                expected: bound.inverse_bind.len(),
                actual: world.len(),
            });
        }

        // One skinning matrix per joint: un-pose into the joint's bind frame,
        // re-pose with the current world transform.
        let skin_matrices: Vec<Affine3A> = world
            .iter()
            .zip(&bound.inverse_bind)
            .map(|(world, inverse_bind)| *world * *inverse_bind)
            .collect();

        let deformed: Vec<Vec3> = match bound.mode {
            SkinningMode::Rigid => self
                .rest_positions
                .iter()
                .enumerate()
                .map(|(vertex, &p)| {
                    skin_matrices[bound.binding.dominant_joint(vertex)].transform_point3(p)
                })
                .collect(),
            SkinningMode::LinearBlend => self
                .rest_positions
                .iter()
                .enumerate()
                .map(|(vertex, &p)| {
                    bound
                        .binding
                        .influences(vertex)
                        .iter()
                        .fold(Vec3::ZERO, |acc, influence| {
                            acc + influence.weight
                                * skin_matrices[influence.joint].transform_point3(p)
                        })
                })
                .collect(),
        };

        trace!("re-skinned {} vertices", deformed.len());
        self.mesh.mesh_mut().update_positions(&deformed)
    }

    /// Point the weight-inspection view at `joint`: the per-vertex scalar
    /// becomes each vertex's weight toward that joint.
    ///
    /// Only the diagnostic color stream changes; deformed positions are
    /// untouched.
    pub fn show_joint_weights(&mut self, joint: usize) -> ArmatureResult<()> {
        let bound = self.bound.as_ref().ok_or(ArmatureError::SkeletonNotBound)?;

        let count = bound.skeleton.borrow().joint_count();
        if joint >= count {
            return Err(ArmatureError::JointIndexOutOfRange {
                index: joint,
                count,
            });
        }

        self.inspected_joint = joint;
        let weights: Vec<f32> = (0..self.rest_positions.len())
            .map(|vertex| bound.binding.weight_toward(vertex, joint))
            .collect();
        self.mesh.update_weights(&weights)
    }

    /// Draw the deformed mesh. `shade_weights` routes the inspection weights
    /// to the weight-shaded shader path.
    pub fn render(
        &self,
        ctx: &mut dyn RenderContext,
        view: Mat4,
        projection: Mat4,
        shade_weights: bool,
    ) {
        self.mesh
            .render(ctx, Mat4::IDENTITY, view, projection, shade_weights);
    }
}
