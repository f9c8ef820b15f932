//! 骨架容器
//!
//! 姿态骨骼的插入顺序存储 + 名称索引 + 骨架到世界的变换。
//! 父索引在插入时校验，必须指向已插入的骨骼，
//! 因此父链下标严格递减，向上行走必然终止。

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::error::SetupError;

use super::PoseBone;

/// 姿态骨架快照
#[derive(Clone, Debug, Default)]
pub struct Armature {
    /// 骨骼（插入顺序）
    bones: Vec<PoseBone>,
    /// 名称 → 索引（重名保留第一个绑定）
    name_to_index: HashMap<String, usize>,
    /// 骨架对象 → 世界变换
    pub matrix_world: Mat4,
}

impl Armature {
    /// 创建空骨架
    pub fn new(matrix_world: Mat4) -> Self {
        Self {
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            matrix_world,
        }
    }

    /// 插入骨骼，返回其索引
    pub fn add_bone(&mut self, bone: PoseBone) -> Result<usize, SetupError> {
        if let Some(parent) = bone.parent {
            if parent >= self.bones.len() {
                return Err(SetupError::UnknownBone { index: parent });
            }
        }
        let index = self.bones.len();
        self.name_to_index.entry(bone.name.clone()).or_insert(index);
        self.bones.push(bone);
        Ok(index)
    }

    /// 骨骼数量
    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// 按索引取骨骼
    #[inline]
    pub fn bone(&self, index: usize) -> Option<&PoseBone> {
        self.bones.get(index)
    }

    /// 骨骼切片
    #[inline]
    pub fn bones(&self) -> &[PoseBone] {
        &self.bones
    }

    /// 按名称查索引
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    // ========================================
    // 世界空间换算（index 必须有效，调用方先经选择校验）
    // ========================================

    /// 骨骼头部的世界位置
    #[inline]
    pub fn world_head(&self, index: usize) -> Vec3 {
        self.matrix_world.transform_point3(self.bones[index].head)
    }

    /// 骨骼尾部的世界位置
    #[inline]
    pub fn world_tail(&self, index: usize) -> Vec3 {
        self.matrix_world.transform_point3(self.bones[index].tail)
    }

    /// 姿态 X 轴的世界方向（未归一化，含骨架缩放）
    #[inline]
    pub fn world_axis_x(&self, index: usize) -> Vec3 {
        self.matrix_world.transform_vector3(self.bones[index].axis_x)
    }

    /// 姿态 Y 轴的世界方向（未归一化，含骨架缩放）
    #[inline]
    pub fn world_axis_y(&self, index: usize) -> Vec3 {
        self.matrix_world.transform_vector3(self.bones[index].axis_y)
    }

    /// 姿态 Z 轴的世界方向（未归一化，含骨架缩放）
    #[inline]
    pub fn world_axis_z(&self, index: usize) -> Vec3 {
        self.matrix_world.transform_vector3(self.bones[index].axis_z)
    }
}
