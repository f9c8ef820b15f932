//! 碰撞盒网格
//!
//! 以 head→tail 为长轴、姿态 X/Z 为横截面边向的八顶点六面体。
//! 顶点与面索引表顺序固定：头端四角在前、尾端四角在后，绕 ±x±z 排列。

use glam::Vec3;

/// 盒面索引表（四边形）
const BOX_FACES: [[u32; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 3, 7, 4],
    [0, 4, 5, 1],
    [1, 5, 6, 2],
    [3, 2, 6, 7],
    [4, 7, 6, 5],
];

/// 盒网格（8 顶点 + 6 四边形面）
#[derive(Clone, Debug, PartialEq)]
pub struct BoxMesh {
    /// 顶点（盒局部空间）
    pub vertices: Vec<Vec3>,
    /// 四边形面索引
    pub faces: Vec<[u32; 4]>,
}

impl BoxMesh {
    /// 构建跨 head→tail 的盒网格
    ///
    /// x/z 为横截面边方向（应已归一化），radius 为半边长。
    pub fn new(head: Vec3, tail: Vec3, x: Vec3, z: Vec3, radius: f32) -> Self {
        let x = x * radius;
        let z = z * radius;
        let vertices = vec![
            head + x + z,
            head - x + z,
            head - x - z,
            head + x - z,
            tail + x + z,
            tail - x + z,
            tail - x - z,
            tail + x - z,
        ];
        Self {
            vertices,
            faces: BOX_FACES.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_eight_vertices_and_six_quads() {
        let mesh = BoxMesh::new(Vec3::ZERO, Vec3::Y * 0.3, Vec3::X, Vec3::Z, 0.05);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 6);
    }

    #[test]
    fn face_indices_are_in_range() {
        let mesh = BoxMesh::new(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Z, 0.1);
        for face in &mesh.faces {
            for &index in face {
                assert!((index as usize) < mesh.vertices.len());
            }
        }
        // 每个顶点都被至少一个面引用
        for vertex in 0..mesh.vertices.len() as u32 {
            assert!(mesh.faces.iter().any(|face| face.contains(&vertex)));
        }
    }

    #[test]
    fn corners_sit_at_radius_sqrt_two_from_the_axis() {
        let radius = 0.05;
        let mesh = BoxMesh::new(Vec3::ZERO, Vec3::Y * 0.4, Vec3::X, Vec3::Z, radius);
        let expected = radius * 2.0_f32.sqrt();
        for vertex in &mesh.vertices {
            // 长轴为 Y，横截面距离只看 XZ 分量
            let distance = (vertex.x * vertex.x + vertex.z * vertex.z).sqrt();
            assert!((distance - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn head_and_tail_planes_hold_four_vertices_each() {
        let tail = Vec3::Y * 0.4;
        let mesh = BoxMesh::new(Vec3::ZERO, tail, Vec3::X, Vec3::Z, 0.05);
        assert!(mesh.vertices[..4].iter().all(|v| v.y == 0.0));
        assert!(mesh.vertices[4..].iter().all(|v| v.y == tail.y));
    }
}
