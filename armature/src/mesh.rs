use glam::{Mat4, Vec3};
use itertools::Itertools;

use crate::{rendering::RenderContext, ArmatureError, ArmatureResult};

/// Depth offset applied to the wireframe pass so edges win the z-fight
/// against the filled pass.
const EDGE_DEPTH_OFFSET: f32 = -1e-4;

/// Line width used for wireframe edges
const EDGE_LINE_WIDTH: f32 = 2.0;

/// A renderable triangle mesh: CPU-side vertex and index buffers plus draw
/// settings. Draws filled triangles and, optionally, a wireframe overlay
/// offset slightly toward the camera.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    edge_indices: Vec<u32>,
    /// Whether to draw the filled pass
    pub draw_faces: bool,
    /// Whether to draw the wireframe pass
    pub draw_edges: bool,
    /// Fill color
    pub face_color: Vec3,
    /// Wireframe color
    pub edge_color: Vec3,
}

impl TriangleMesh {
    /// Create a mesh from vertex positions and a triangle index list.
    ///
    /// The wireframe index list is derived up front: every triangle
    /// contributes its three edges.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let edge_indices = indices
            .iter()
            .tuples()
            .flat_map(|(&a, &b, &c)| [a, b, b, c, c, a])
            .collect();

        Self {
            positions,
            indices,
            edge_indices,
            draw_faces: true,
            draw_edges: true,
            face_color: Vec3::ONE,
            edge_color: Vec3::splat(0.5),
        }
    }

    /// Current vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Wireframe line-list indices, two per edge
    pub fn edge_indices(&self) -> &[u32] {
        &self.edge_indices
    }

    /// Replace the vertex positions, eg. with freshly skinned ones. The
    /// index topology is fixed, so the count must match.
    pub fn update_positions(&mut self, positions: &[Vec3]) -> ArmatureResult<()> {
        if positions.len() != self.positions.len() {
            return Err(ArmatureError::CountMismatch {
                what: "vertex positions",
                expected: self.positions.len(),
                actual: positions.len(),
            });
        }
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    /// Draw the mesh: filled pass, then the offset wireframe pass.
    pub fn render(&self, ctx: &mut dyn RenderContext, model: Mat4, view: Mat4, projection: Mat4) {
        self.render_with_weights(ctx, None, model, view, projection);
    }

    pub(crate) fn render_with_weights(
        &self,
        ctx: &mut dyn RenderContext,
        weights: Option<&[f32]>,
        model: Mat4,
        view: Mat4,
        projection: Mat4,
    ) {
        let mvp = projection * view * model;

        if self.draw_faces {
            ctx.draw_triangles(
                &self.positions,
                weights,
                &self.indices,
                mvp,
                self.face_color.extend(1.0),
                0.0,
            );
        }

        if self.draw_edges {
            let edge_mvp = Mat4::from_translation(Vec3::new(0.0, 0.0, EDGE_DEPTH_OFFSET)) * mvp;
            ctx.draw_lines(
                &self.positions,
                weights,
                &self.edge_indices,
                edge_mvp,
                self.edge_color.extend(1.0),
                EDGE_LINE_WIDTH,
            );
        }
    }
}

/// A [`TriangleMesh`] with a per-vertex scalar used to visualize skin
/// weights: the shader path mixes red (0) to white (1) by the scalar.
#[derive(Debug, Clone)]
pub struct WeightShadedTriangleMesh {
    mesh: TriangleMesh,
    weights: Vec<f32>,
}

impl WeightShadedTriangleMesh {
    /// Wrap a mesh, starting with every inspection weight at zero.
    pub fn new(mesh: TriangleMesh) -> Self {
        let weights = vec![0.0; mesh.positions().len()];
        Self { mesh, weights }
    }

    /// The wrapped mesh
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// The wrapped mesh, mutably
    pub fn mesh_mut(&mut self) -> &mut TriangleMesh {
        &mut self.mesh
    }

    /// The current per-vertex inspection weights
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Replace the per-vertex inspection weights, length-checked.
    pub fn update_weights(&mut self, weights: &[f32]) -> ArmatureResult<()> {
        if weights.len() != self.weights.len() {
            return Err(ArmatureError::CountMismatch {
                what: "vertex weights",
                expected: self.weights.len(),
                actual: weights.len(),
            });
        }
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    /// Draw the mesh. When `shade_weights` is set, the inspection weights
    /// ride along and the weight-shaded shader path is used.
    pub fn render(
        &self,
        ctx: &mut dyn RenderContext,
        model: Mat4,
        view: Mat4,
        projection: Mat4,
        shade_weights: bool,
    ) {
        let weights = shade_weights.then(|| self.weights.as_slice());
        self.mesh
            .render_with_weights(ctx, weights, model, view, projection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::RecordingContext;
    use approx::assert_relative_eq;
    use glam::vec3;

    fn quad() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(1.0, 1.0, 0.0),
                vec3(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    pub fn test_every_triangle_contributes_three_edges() {
        let mesh = quad();
        assert_eq!(
            mesh.edge_indices(),
            &[0, 1, 1, 2, 2, 0, 0, 2, 2, 3, 3, 0]
        );
    }

    #[test]
    pub fn test_update_positions_rejects_wrong_count() {
        let mut mesh = quad();
        let result = mesh.update_positions(&[Vec3::ZERO]);
        assert!(matches!(
            result,
            Err(ArmatureError::CountMismatch {
                expected: 4,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    pub fn test_render_submits_faces_then_offset_edges() {
        let mesh = quad();
        let mut ctx = RecordingContext::default();
        mesh.render(&mut ctx, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);

        assert_eq!(ctx.triangles.len(), 1);
        assert_eq!(ctx.lines.len(), 1);
        assert_relative_eq!(ctx.triangles[0].mvp, Mat4::IDENTITY);

        // The edge pass is nudged toward the camera.
        let expected =
            Mat4::from_translation(vec3(0.0, 0.0, EDGE_DEPTH_OFFSET)) * Mat4::IDENTITY;
        assert_relative_eq!(ctx.lines[0].mvp, expected);
    }

    #[test]
    pub fn test_draw_flags_suppress_passes() {
        let mut mesh = quad();
        mesh.draw_edges = false;
        let mut ctx = RecordingContext::default();
        mesh.render(&mut ctx, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(ctx.triangles.len(), 1);
        assert!(ctx.lines.is_empty());
    }

    #[test]
    pub fn test_weight_shading_is_opt_in() {
        let shaded = WeightShadedTriangleMesh::new(quad());
        let mut ctx = RecordingContext::default();
        shaded.render(
            &mut ctx,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            false,
        );
        assert!(ctx.triangles[0].weights.is_none());

        ctx.clear();
        shaded.render(
            &mut ctx,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            true,
        );
        assert_eq!(ctx.triangles[0].weights.as_deref(), Some(&[0.0; 4][..]));
    }

    #[test]
    pub fn test_update_weights_rejects_wrong_count() {
        let mut shaded = WeightShadedTriangleMesh::new(quad());
        assert!(shaded.update_weights(&[1.0, 0.0, 0.0, 0.0]).is_ok());
        assert!(matches!(
            shaded.update_weights(&[1.0]),
            Err(ArmatureError::CountMismatch { .. })
        ));
    }
}
