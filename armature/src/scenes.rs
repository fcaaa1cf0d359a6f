use std::{cell::RefCell, rc::Rc};

use glam::vec3;

use crate::{
    binding::{SkinBinding, SkinningMode},
    camera::OrbitCamera,
    geometry,
    joint::Joint,
    rendering::RenderContext,
    skeleton::Skeleton,
    skin_mesh::{SharedSkeleton, SkinMesh},
    ArmatureResult,
};

/// Number of joints kept per vertex by the linear-blend builders
const LINEAR_MAX_INFLUENCES: usize = 2;

/// Falloff exponent for the linear-blend builders
const LINEAR_FALLOFF_POWER: f32 = 4.0;

/// A ready-made skinning scene: a skinned mesh, the rig driving it, and an
/// orbit camera, wired the way the classic exercises wire them.
///
/// The scene is the caller-facing driver: joint-angle changes re-skin
/// immediately, and out-of-range joint ids on [`Scene::set_joint_angle`] are
/// ignored after the guard, matching the reference driver's defensive check.
#[derive(Debug)]
pub struct Scene {
    skin: SkinMesh,
    skeleton: SharedSkeleton,
    /// The orbit camera, fed by [`Scene::drag`] and [`Scene::wheel`]
    pub camera: OrbitCamera,
    show_joints: bool,
    shade_weights: bool,
}

impl Scene {
    /// The two-bone cylinder, rigidly skinned: every vertex follows exactly
    /// one joint, so bending tears the mesh at the joint boundary.
    pub fn rigid_cylinder() -> ArmatureResult<Self> {
        Self::cylinder(SkinningMode::Rigid)
    }

    /// The two-bone cylinder with linear blend skinning: weights ramp across
    /// the elbow, so the bend is smooth.
    pub fn linear_cylinder() -> ArmatureResult<Self> {
        Self::cylinder(SkinningMode::LinearBlend)
    }

    fn cylinder(mode: SkinningMode) -> ArmatureResult<Self> {
        let data = geometry::cylinder_skin_x(0.5);
        let mut skin = SkinMesh::new(data.positions, data.indices);

        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint(Joint::new(
            "Upper Arm",
            None,
            vec3(-2.0, 0.0, 0.0),
            vec3(-0.2, 0.0, 0.0),
            vec3(0.0, 0.0, 1.0),
        )?)?;
        skeleton.add_joint(Joint::new(
            "Forearm",
            Some(root),
            vec3(2.0, 0.0, 0.0),
            vec3(3.8, 0.0, 0.0),
            vec3(0.0, 0.0, -1.0),
        )?)?;

        let binding = Self::binding_for(&skin, &skeleton, mode);
        let skeleton: SharedSkeleton = Rc::new(RefCell::new(skeleton));
        skin.set_skeleton(skeleton.clone(), binding, mode)?;

        Ok(Self {
            skin,
            skeleton,
            camera: OrbitCamera::new(0.0, 0.0, 5.0),
            show_joints: true,
            shade_weights: true,
        })
    }

    /// The custom arm mesh with linear blend skinning, at the larger task-3
    /// scale.
    pub fn linear_arm() -> ArmatureResult<Self> {
        let data = geometry::arm_skin();
        let mut skin = SkinMesh::new(data.positions, data.indices);

        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint(Joint::new(
            "Upper Arm",
            None,
            vec3(-15.0, 0.0, 0.0),
            vec3(-8.5, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        )?)?;
        skeleton.add_joint(Joint::new(
            "Forearm",
            Some(root),
            vec3(7.0, 0.0, 0.0),
            vec3(12.5, 0.0, 0.0),
            vec3(0.0, -1.0, 0.0),
        )?)?;

        let mode = SkinningMode::LinearBlend;
        let binding = Self::binding_for(&skin, &skeleton, mode);
        let skeleton: SharedSkeleton = Rc::new(RefCell::new(skeleton));
        skin.set_skeleton(skeleton.clone(), binding, mode)?;

        Ok(Self {
            skin,
            skeleton,
            camera: OrbitCamera::new(30.0, 0.0, 10.0).with_look_at(vec3(5.0, 0.0, 0.0)),
            show_joints: true,
            shade_weights: false,
        })
    }

    fn binding_for(skin: &SkinMesh, skeleton: &Skeleton, mode: SkinningMode) -> SkinBinding {
        match mode {
            SkinningMode::Rigid => SkinBinding::rigid_nearest(skin.rest_positions(), skeleton),
            SkinningMode::LinearBlend => SkinBinding::segment_falloff(
                skin.rest_positions(),
                skeleton,
                LINEAR_MAX_INFLUENCES,
                LINEAR_FALLOFF_POWER,
            ),
        }
    }

    /// The skinned mesh
    pub fn skin(&self) -> &SkinMesh {
        &self.skin
    }

    /// The skinned mesh, mutably
    pub fn skin_mut(&mut self) -> &mut SkinMesh {
        &mut self.skin
    }

    /// The rig driving the skin
    pub fn skeleton(&self) -> &SharedSkeleton {
        &self.skeleton
    }

    /// Set joint `id`'s angle in degrees and re-skin the mesh.
    ///
    /// Ids outside the rig are ignored, matching the reference driver's
    /// guard; errors from the skinning pipeline itself still propagate.
    pub fn set_joint_angle(&mut self, id: usize, degrees: f32) -> ArmatureResult<()> {
        if id >= self.skeleton.borrow().joint_count() {
            return Ok(());
        }
        self.skeleton.borrow_mut().set_joint_angle(id, degrees)?;
        self.skin.update_skin()
    }

    /// Point the weight-inspection view at joint `idx` and refresh the skin.
    pub fn show_joint_weights(&mut self, idx: usize) -> ArmatureResult<()> {
        self.skin.show_joint_weights(idx)?;
        self.skin.update_skin()
    }

    /// Toggle the skeleton gizmo overlay
    pub fn set_show_joints(&mut self, show_joints: bool) {
        self.show_joints = show_joints;
    }

    /// Forward a mouse drag to the orbit camera
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.camera.drag(dx, dy);
    }

    /// Forward a wheel event to the orbit camera
    pub fn wheel(&mut self, delta: f32) {
        self.camera.wheel(delta);
    }

    /// Draw one frame: the skinned mesh, then (over a cleared depth buffer)
    /// the skeleton gizmos when enabled.
    pub fn render(&self, ctx: &mut dyn RenderContext, width: f32, height: f32) {
        let projection = self.camera.projection(width / height);
        let view = self.camera.view_matrix();

        self.skin.render(ctx, view, projection, self.shade_weights);

        if self.show_joints {
            ctx.clear_depth();
            self.skeleton.borrow().render(ctx, view, projection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::RecordingContext;
    use approx::assert_relative_eq;

    #[test]
    pub fn test_cylinder_scenes_bind_both_modes() {
        let rigid = Scene::rigid_cylinder().unwrap();
        let linear = Scene::linear_cylinder().unwrap();
        assert_eq!(rigid.skin().mode(), Some(SkinningMode::Rigid));
        assert_eq!(linear.skin().mode(), Some(SkinningMode::LinearBlend));
        assert_eq!(rigid.skeleton().borrow().joint_count(), 2);
    }

    #[test]
    pub fn test_identity_pose_leaves_the_cylinder_at_rest() {
        let scene = Scene::linear_cylinder().unwrap();
        for (deformed, rest) in scene
            .skin()
            .deformed_positions()
            .iter()
            .zip(scene.skin().rest_positions())
        {
            assert_relative_eq!(*deformed, *rest, epsilon = 1e-5);
        }
    }

    #[test]
    pub fn test_bending_the_elbow_moves_the_forearm_half() {
        let mut scene = Scene::linear_cylinder().unwrap();
        let rest = scene.skin().rest_positions().to_vec();
        scene.set_joint_angle(1, 60.0).unwrap();

        let deformed = scene.skin().deformed_positions();
        let moved = deformed
            .iter()
            .zip(&rest)
            .filter(|(d, r)| d.distance(**r) > 1e-2)
            .count();
        // The forearm half of the cylinder moved, the shoulder half did not.
        assert!(moved > 0);
        assert!(moved < rest.len());
    }

    #[test]
    pub fn test_out_of_range_joint_id_is_ignored() {
        let mut scene = Scene::rigid_cylinder().unwrap();
        let before = scene.skin().deformed_positions().to_vec();
        scene.set_joint_angle(99, 45.0).unwrap();
        assert_eq!(scene.skin().deformed_positions(), before.as_slice());
    }

    #[test]
    pub fn test_render_draws_skin_then_gizmos() {
        let scene = Scene::linear_cylinder().unwrap();
        let mut ctx = RecordingContext::default();
        scene.render(&mut ctx, 1280.0, 720.0);

        // Faces + mesh edges + bone gizmo lines, with a depth clear before
        // the overlay.
        assert_eq!(ctx.triangles.len(), 1);
        assert_eq!(ctx.lines.len(), 2);
        assert_eq!(ctx.depth_clears, 1);
        assert!(ctx.triangles[0].weights.is_some());
    }

    #[test]
    pub fn test_arm_scene_skips_weight_shading() {
        let mut scene = Scene::linear_arm().unwrap();
        let mut ctx = RecordingContext::default();
        scene.set_show_joints(false);
        scene.render(&mut ctx, 1280.0, 720.0);

        assert_eq!(ctx.triangles.len(), 1);
        assert_eq!(ctx.lines.len(), 1); // mesh edges only, no gizmos
        assert_eq!(ctx.depth_clears, 0);
        assert!(ctx.triangles[0].weights.is_none());
    }

    #[test]
    pub fn test_show_joint_weights_switches_the_inspected_joint() {
        let mut scene = Scene::linear_cylinder().unwrap();
        scene.show_joint_weights(1).unwrap();
        assert_eq!(scene.skin().inspected_joint(), 1);
        // Forearm-end vertices are fully owned by the forearm.
        let weights = scene.skin().weight_scalars();
        assert!(weights.iter().any(|&w| w > 0.99));
    }
}
