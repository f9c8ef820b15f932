//! 姿态骨骼快照
//!
//! 宿主姿态骨骼的只读镜像：头尾位置加一组正交姿态轴，
//! 全部在骨架空间。装配算法不回写骨骼。

use glam::Vec3;

/// 姿态骨骼快照
///
/// axis_* 为单位向量，axis_y 沿 head→tail 方向，
/// 三轴构成右手系（axis_x × axis_y = axis_z）。
#[derive(Clone, Debug)]
pub struct PoseBone {
    /// 骨骼名称
    pub name: String,
    /// 头部位置（骨架空间）
    pub head: Vec3,
    /// 尾部位置（骨架空间）
    pub tail: Vec3,
    /// 姿态 X 轴
    pub axis_x: Vec3,
    /// 姿态 Y 轴（沿骨骼方向）
    pub axis_y: Vec3,
    /// 姿态 Z 轴
    pub axis_z: Vec3,
    /// 父骨骼索引
    pub parent: Option<usize>,
}

impl PoseBone {
    /// 从头尾位置创建，姿态轴由 head→tail 推导
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3, parent: Option<usize>) -> Self {
        let axis_y = (tail - head).try_normalize().unwrap_or(Vec3::Y);
        // 骨骼方向近乎竖直时换用 X 做参考轴
        let reference = if axis_y.dot(Vec3::Z).abs() < 0.999 {
            Vec3::Z
        } else {
            Vec3::X
        };
        let axis_x = axis_y.cross(reference).normalize();
        let axis_z = axis_x.cross(axis_y);
        Self {
            name: name.into(),
            head,
            tail,
            axis_x,
            axis_y,
            axis_z,
            parent,
        }
    }

    /// 以宿主给出的完整姿态轴创建（轴应正交归一）
    pub fn with_axes(
        name: impl Into<String>,
        head: Vec3,
        tail: Vec3,
        axis_x: Vec3,
        axis_y: Vec3,
        axis_z: Vec3,
        parent: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            axis_x,
            axis_y,
            axis_z,
            parent,
        }
    }

    /// 骨骼长度
    #[inline]
    pub fn length(&self) -> f32 {
        (self.tail - self.head).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_bone_gets_identity_axes() {
        let bone = PoseBone::new("b", Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0), None);
        assert!((bone.axis_x - Vec3::X).length() < 1e-6);
        assert!((bone.axis_y - Vec3::Y).length() < 1e-6);
        assert!((bone.axis_z - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn derived_frame_is_orthonormal_and_right_handed() {
        let bone = PoseBone::new("b", Vec3::new(0.3, 0.1, -0.2), Vec3::new(-0.4, 0.8, 0.5), None);
        assert!(bone.axis_x.dot(bone.axis_y).abs() < 1e-6);
        assert!(bone.axis_y.dot(bone.axis_z).abs() < 1e-6);
        assert!((bone.axis_x.length() - 1.0).abs() < 1e-6);
        assert!((bone.axis_z.length() - 1.0).abs() < 1e-6);
        assert!((bone.axis_x.cross(bone.axis_y) - bone.axis_z).length() < 1e-6);
    }

    #[test]
    fn vertical_bone_uses_fallback_reference() {
        let bone = PoseBone::new("b", Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), None);
        assert!(bone.axis_x.is_finite());
        assert!((bone.axis_x.length() - 1.0).abs() < 1e-6);
        assert!(bone.axis_x.dot(bone.axis_y).abs() < 1e-6);
    }

    #[test]
    fn zero_length_bone_falls_back_to_y() {
        let bone = PoseBone::new("b", Vec3::ONE, Vec3::ONE, None);
        assert_eq!(bone.axis_y, Vec3::Y);
        assert!(bone.axis_x.is_finite());
        assert_eq!(bone.length(), 0.0);
    }
}
