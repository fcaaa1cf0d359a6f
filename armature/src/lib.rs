#![deny(missing_docs)]

//! Interactive skeletal skinning on the CPU.
//!
//! `armature` deforms a triangle mesh with a hierarchical chain of rigid joints.
//! The caller sets joint angles, the library runs forward kinematics over the
//! skeleton and recomputes every vertex position by either rigid or linear
//! blend skinning, then hands the deformed buffers to a [`rendering::RenderContext`]
//! implemented by the host application.
//!
//! A typical frame looks like this:
//!
//! ```no_run
//! # use armature::{scenes::Scene, rendering::RecordingContext};
//! # fn main() -> armature::ArmatureResult<()> {
//! let mut scene = Scene::linear_cylinder()?;
//! let mut ctx = RecordingContext::default();
//!
//! scene.set_joint_angle(1, 45.0)?; // bend the elbow; re-skins the mesh
//! scene.render(&mut ctx, 1280.0, 720.0);
//! # Ok(())
//! # }
//! ```
//!
//! Window creation, input capture, shader compilation and buffer upload are
//! the host's responsibility; the library only produces vertex data and draw
//! submissions.

pub use glam;

mod armature_error;
/// Per-vertex joint influences and the weight-assignment builders
pub mod binding;
/// Orbit camera used by the bundled scenes
pub mod camera;
/// Procedural rest-pose meshes for the bundled scenes
pub mod geometry;
/// A single rotational degree of freedom in the skeleton
pub mod joint;
/// Renderable triangle mesh wrappers
pub mod mesh;
/// The boundary between the library and the host's rendering layer
pub mod rendering;
/// Ready-made skinning scenes mirroring the classic two-bone exercises
pub mod scenes;
/// An ordered, indexable joint hierarchy
pub mod skeleton;
/// The skin deformation pipeline
pub mod skin_mesh;

pub use armature_error::ArmatureError;
pub use binding::{Influence, SkinBinding, SkinningMode};
pub use camera::OrbitCamera;
pub use joint::Joint;
pub use mesh::{TriangleMesh, WeightShadedTriangleMesh};
pub use rendering::RenderContext;
pub use skeleton::Skeleton;
pub use skin_mesh::{SharedSkeleton, SkinMesh};

/// Armature result type
pub type ArmatureResult<T> = std::result::Result<T, ArmatureError>;

/// Tolerance used when checking that a vertex's weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-5;
