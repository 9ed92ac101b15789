use glam::Vec3;
use std::f32::consts::TAU;

/// Indexed triangle mesh.
///
/// Vertices are shared between adjacent faces; flat shading derives the
/// face normal at raster time, so no per-face duplication is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    revision: u64,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < positions.len()));
        Self {
            positions,
            indices,
            revision: 0,
        }
    }

    /// Axis-aligned box centred on the origin.
    ///
    /// Corner order is `+x+y+z, +x+y-z, +x-y+z, +x-y-z, -x+y-z, -x+y+z,
    /// -x-y-z, -x-y+z`, so callers can reshape a box by corner index.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let positions = vec![
            Vec3::new(x, y, z),
            Vec3::new(x, y, -z),
            Vec3::new(x, -y, z),
            Vec3::new(x, -y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(-x, y, z),
            Vec3::new(-x, -y, -z),
            Vec3::new(-x, -y, z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            2, 3, 1,  2, 1, 0, // +X
            6, 7, 5,  6, 5, 4, // -X
            5, 0, 1,  5, 1, 4, // +Y
            6, 3, 2,  6, 2, 7, // -Y
            7, 2, 0,  7, 0, 5, // +Z
            3, 6, 4,  3, 4, 1, // -Z
        ];
        Self::new(positions, indices)
    }

    /// Capped cylinder with its axis along Z, centred on the origin.
    ///
    /// Rings run from `z = -height/2` (top radius) to `z = +height/2`
    /// (bottom radius). The seam is shared, so every ring has exactly
    /// `radial_segments` vertices. Each cap adds one centre vertex.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
    ) -> Self {
        let radial = radial_segments.max(3);
        let rows = height_segments.max(1);
        let mut positions = Vec::with_capacity((radial * (rows + 1) + 2) as usize);

        for j in 0..=rows {
            let v = j as f32 / rows as f32;
            let radius = radius_top + v * (radius_bottom - radius_top);
            let z = v * height - height / 2.0;
            for i in 0..radial {
                let theta = i as f32 / radial as f32 * TAU;
                positions.push(Vec3::new(radius * theta.sin(), radius * theta.cos(), z));
            }
        }

        let ring = |j: u32, i: u32| j * radial + (i % radial);
        let mut indices = Vec::with_capacity((radial * rows * 6 + radial * 6) as usize);
        for j in 0..rows {
            for i in 0..radial {
                let a = ring(j, i);
                let b = ring(j + 1, i);
                let c = ring(j + 1, i + 1);
                let d = ring(j, i + 1);
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let near_cap = positions.len() as u32;
        positions.push(Vec3::new(0.0, 0.0, -height / 2.0));
        let far_cap = positions.len() as u32;
        positions.push(Vec3::new(0.0, 0.0, height / 2.0));
        for i in 0..radial {
            indices.extend_from_slice(&[near_cap, ring(0, i), ring(0, i + 1)]);
            indices.extend_from_slice(&[far_cap, ring(rows, i + 1), ring(rows, i)]);
        }

        Self::new(positions, indices)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Incremented on every position write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Shift every vertex, e.g. to move a box's pivot to one of its faces.
    pub fn translate(mut self, offset: Vec3) -> Self {
        for p in &mut self.positions {
            *p += offset;
        }
        self.revision += 1;
        self
    }

    /// Move one vertex by `delta`. Out-of-range indices are ignored.
    pub fn displace(mut self, vertex: usize, delta: Vec3) -> Self {
        if let Some(p) = self.positions.get_mut(vertex) {
            *p += delta;
            self.revision += 1;
        }
        self
    }

    /// Rewrite positions in place.
    pub fn update_positions(&mut self, f: impl FnOnce(&mut [Vec3])) {
        f(&mut self.positions);
        self.revision += 1;
    }

    /// Smallest box containing every vertex.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &Mesh) {
        let p = mesh.positions();
        for tri in mesh.indices().chunks(3) {
            let (a, b, c) = (p[tri[0] as usize], p[tri[1] as usize], p[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn cuboid_counts() {
        let m = Mesh::cuboid(60.0, 50.0, 50.0);
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(m.triangle_count(), 12);
        let (lo, hi) = m.bounds();
        assert_eq!(lo, Vec3::new(-30.0, -25.0, -25.0));
        assert_eq!(hi, Vec3::new(30.0, 25.0, 25.0));
    }

    #[test]
    fn cuboid_faces_point_outward() {
        assert_outward(&Mesh::cuboid(2.0, 3.0, 4.0));
    }

    #[test]
    fn cuboid_corner_order() {
        let m = Mesh::cuboid(2.0, 2.0, 2.0);
        assert_eq!(m.positions()[4], Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(m.positions()[7], Vec3::new(-1.0, -1.0, 1.0));
    }

    #[test]
    fn cylinder_counts_and_range() {
        let m = Mesh::cylinder(600.0, 600.0, 800.0, 40, 10);
        assert_eq!(m.vertex_count(), 40 * 11 + 2);
        assert_eq!(m.triangle_count(), 40 * 10 * 2 + 40 * 2);
        assert!(m.indices().iter().all(|&i| (i as usize) < m.vertex_count()));
        let (lo, hi) = m.bounds();
        assert!((lo.z + 400.0).abs() < 1e-3);
        assert!((hi.z - 400.0).abs() < 1e-3);
        assert!((hi.y - 600.0).abs() < 1e-3);
    }

    #[test]
    fn cylinder_faces_point_outward() {
        assert_outward(&Mesh::cylinder(5.0, 5.0, 4.0, 12, 3));
    }

    #[test]
    fn position_writes_bump_revision() {
        let mut m = Mesh::cuboid(1.0, 1.0, 1.0);
        let r0 = m.revision();
        m.update_positions(|p| p[0].y += 1.0);
        assert_eq!(m.revision(), r0 + 1);
        assert_eq!(m.positions()[0].y, 1.5);
    }

    #[test]
    fn translate_and_displace() {
        let m = Mesh::cuboid(4.0, 4.0, 4.0)
            .translate(Vec3::new(0.0, 2.0, 0.0))
            .displace(6, Vec3::new(0.0, 1.0, 0.0))
            .displace(99, Vec3::ONE);
        let (lo, hi) = m.bounds();
        assert_eq!(lo.y, 0.0);
        assert_eq!(hi.y, 4.0);
        assert_eq!(m.positions()[6].y, 1.0);
    }
}
