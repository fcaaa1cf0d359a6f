use glam::{Mat4, Vec3, Vec4};

/// The boundary between the skinning core and the host's rendering layer.
///
/// The core never talks to a GPU: it produces vertex data and submits it
/// through this trait. A host backend typically uploads the positions (and
/// weights, when present) to vertex buffers and issues indexed draws; the
/// `mvp`, `color` and `edge_weight` parameters map one-to-one onto the
/// uniforms of the reference shaders.
///
/// `weights` is `Some` only on the weight-inspection path, where the
/// fragment shader mixes red (weight 0) to white (weight 1) before applying
/// `color`.
pub trait RenderContext {
    /// Draw filled, indexed triangles.
    fn draw_triangles(
        &mut self,
        positions: &[Vec3],
        weights: Option<&[f32]>,
        indices: &[u32],
        mvp: Mat4,
        color: Vec4,
        edge_weight: f32,
    );

    /// Draw an indexed line list.
    fn draw_lines(
        &mut self,
        positions: &[Vec3],
        weights: Option<&[f32]>,
        indices: &[u32],
        mvp: Mat4,
        color: Vec4,
        line_width: f32,
    );

    /// Clear the depth buffer. Called between the skin pass and the skeleton
    /// overlay so bone gizmos draw on top of the mesh.
    fn clear_depth(&mut self) {}
}

/// A recorded [`RenderContext::draw_triangles`] call
#[derive(Debug, Clone)]
pub struct TriangleDraw {
    /// Vertex positions as submitted
    pub positions: Vec<Vec3>,
    /// Per-vertex inspection weights, when the weight-shaded path was used
    pub weights: Option<Vec<f32>>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Model-view-projection matrix
    pub mvp: Mat4,
    /// Fill color
    pub color: Vec4,
    /// Mix factor between weight shading and `color`
    pub edge_weight: f32,
}

/// A recorded [`RenderContext::draw_lines`] call
#[derive(Debug, Clone)]
pub struct LineDraw {
    /// Vertex positions as submitted
    pub positions: Vec<Vec3>,
    /// Per-vertex inspection weights, when the weight-shaded path was used
    pub weights: Option<Vec<f32>>,
    /// Line-list indices (two per segment)
    pub indices: Vec<u32>,
    /// Model-view-projection matrix
    pub mvp: Mat4,
    /// Line color
    pub color: Vec4,
    /// Line width in pixels
    pub line_width: f32,
}

/// A [`RenderContext`] that records submissions instead of drawing them.
///
/// Used by the test suite and the headless demo; handy for asserting what
/// the core would have put on screen.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    /// Recorded triangle draws, in submission order
    pub triangles: Vec<TriangleDraw>,
    /// Recorded line draws, in submission order
    pub lines: Vec<LineDraw>,
    /// Number of depth clears requested
    pub depth_clears: usize,
}

impl RecordingContext {
    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.lines.clear();
        self.depth_clears = 0;
    }
}

impl RenderContext for RecordingContext {
    fn draw_triangles(
        &mut self,
        positions: &[Vec3],
        weights: Option<&[f32]>,
        indices: &[u32],
        mvp: Mat4,
        color: Vec4,
        edge_weight: f32,
    ) {
        self.triangles.push(TriangleDraw {
            positions: positions.to_vec(),
            weights: weights.map(<[f32]>::to_vec),
            indices: indices.to_vec(),
            mvp,
            color,
            edge_weight,
        });
    }

    fn draw_lines(
        &mut self,
        positions: &[Vec3],
        weights: Option<&[f32]>,
        indices: &[u32],
        mvp: Mat4,
        color: Vec4,
        line_width: f32,
    ) {
        self.lines.push(LineDraw {
            positions: positions.to_vec(),
            weights: weights.map(<[f32]>::to_vec),
            indices: indices.to_vec(),
            mvp,
            color,
            line_width,
        });
    }

    fn clear_depth(&mut self) {
        self.depth_clears += 1;
    }
}
