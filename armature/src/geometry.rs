use glam::{vec3, Vec3};
use itertools::Itertools;

/// Rest-pose geometry produced by the procedural builders: positions plus a
/// triangle index list, ready to hand to [`crate::SkinMesh::new`].
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

/// An open tube along the X axis: `rings` circles of `radial` vertices each,
/// with the radius at each ring given by `radius_at(x)`.
pub fn tube_x(
    x_start: f32,
    x_end: f32,
    rings: usize,
    radial: usize,
    radius_at: impl Fn(f32) -> f32,
) -> MeshData {
    assert!(rings >= 2 && radial >= 3, "tube needs at least 2 rings of 3 vertices");

    let mut positions = Vec::with_capacity(rings * radial);
    for ring in 0..rings {
        let t = ring as f32 / (rings - 1) as f32;
        let x = x_start + (x_end - x_start) * t;
        let radius = radius_at(x);
        for segment in 0..radial {
            let theta = segment as f32 / radial as f32 * std::f32::consts::TAU;
            positions.push(vec3(x, radius * theta.cos(), radius * theta.sin()));
        }
    }

    let indices = (0..rings - 1)
        .cartesian_product(0..radial)
        .flat_map(|(ring, segment)| {
            let a = (ring * radial + segment) as u32;
            let b = (ring * radial + (segment + 1) % radial) as u32;
            let c = a + radial as u32;
            let d = b + radial as u32;
            [a, c, d, a, d, b]
        })
        .collect();

    MeshData { positions, indices }
}

/// The cylinder skin for the two-bone arm exercises: a constant-radius tube
/// spanning both bones of the rig ("Upper Arm" head at x = -2, "Forearm"
/// tail at x = 3.8) with half a unit of margin at each end.
pub fn cylinder_skin_x(radius: f32) -> MeshData {
    tube_x(-2.5, 4.3, 40, 16, |_| radius)
}

/// The arm skin for the custom-mesh exercise: a tapered tube at the task-3
/// rig's scale (shoulder at x = -15, elbow at x = 7), thick at the shoulder
/// and narrowing toward the wrist.
pub fn arm_skin() -> MeshData {
    tube_x(-16.0, 16.0, 48, 20, arm_radius)
}

/// Piecewise-linear radius profile for [`arm_skin`].
fn arm_radius(x: f32) -> f32 {
    // (x, radius) control points: shoulder, mid upper arm, elbow, wrist, hand.
    const PROFILE: [(f32, f32); 5] = [
        (-16.0, 2.4),
        (-4.0, 2.0),
        (7.0, 1.7),
        (13.0, 1.2),
        (16.0, 1.4),
    ];

    for window in PROFILE.windows(2) {
        let (x0, r0) = window[0];
        let (x1, r1) = window[1];
        if x <= x1 {
            let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
            return r0 + (r1 - r0) * t;
        }
    }
    PROFILE[PROFILE.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_indices_valid(data: &MeshData) {
        assert_eq!(data.indices.len() % 3, 0);
        for &index in &data.indices {
            assert!((index as usize) < data.positions.len());
        }
    }

    #[test]
    pub fn test_tube_counts() {
        let data = tube_x(0.0, 1.0, 4, 8, |_| 1.0);
        assert_eq!(data.positions.len(), 32);
        // 3 bands of 8 quads, two triangles each.
        assert_eq!(data.indices.len(), 3 * 8 * 2 * 3);
        assert_indices_valid(&data);
    }

    #[test]
    pub fn test_tube_rings_sit_on_the_requested_radius() {
        let data = tube_x(-1.0, 1.0, 3, 12, |x| if x < 0.0 { 2.0 } else { 1.0 });
        for position in &data.positions {
            let radius = (position.y * position.y + position.z * position.z).sqrt();
            let expected = if position.x < 0.0 { 2.0 } else { 1.0 };
            assert_relative_eq!(radius, expected, epsilon = 1e-5);
        }
    }

    #[test]
    pub fn test_cylinder_skin_spans_the_two_bone_rig() {
        let data = cylinder_skin_x(0.5);
        assert_indices_valid(&data);
        let min_x = data.positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = data.positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        assert_relative_eq!(min_x, -2.5);
        assert_relative_eq!(max_x, 4.3);
    }

    #[test]
    pub fn test_arm_skin_tapers() {
        let data = arm_skin();
        assert_indices_valid(&data);
        // Shoulder girth beats wrist girth.
        assert!(arm_radius(-16.0) > arm_radius(13.0));
    }

    #[test]
    pub fn test_no_degenerate_triangles() {
        let data = cylinder_skin_x(0.5);
        for (&a, &b, &c) in data.indices.iter().tuples() {
            let (a, b, c) = (
                data.positions[a as usize],
                data.positions[b as usize],
                data.positions[c as usize],
            );
            assert!((b - a).cross(c - a).length() > 1e-6);
        }
    }
}
