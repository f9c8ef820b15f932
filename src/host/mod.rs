//! 主机场景能力接口
//!
//! 工具对宿主 3D 场景的全部要求收敛在 HostScene 一个 trait 上：
//! 网格对象的建删、场景层、骨骼父接、刚体与约束的参数写入、
//! 姿态骨骼上的 IK 约束管理，以及生成物的所有权标记。
//! 所有调用按句柄寻址，没有"当前活动/选中对象"之类的隐式状态。

mod descriptor;
mod memory;

pub use descriptor::{
    CollisionShape, ConstraintKind, ConstraintParams, IkTarget, LimitAxes, RigidBodyParams,
    SpringAxis,
};
pub use memory::{ConstraintState, MemoryScene, RigidBodyState};

use glam::Vec3;
use thiserror::Error;

use crate::rig::BoxMesh;

// ============================================================================
// 句柄与枚举
// ============================================================================

/// 场景对象句柄（不透明，可拷贝）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub(crate) usize);

/// 网格数据句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// 场景对象类别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    Armature,
    Other,
}

/// 对象交互模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Object,
    Pose,
}

/// 场景层掩码（20 层）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMask(u32);

impl LayerMask {
    /// 场景层数
    pub const LAYER_COUNT: u8 = 20;

    /// 不在任何层（未入场景）
    pub const EMPTY: LayerMask = LayerMask(0);

    /// 仅含第 layer 层（1 起）的掩码
    #[inline]
    pub fn single(layer: u8) -> Self {
        debug_assert!((1..=Self::LAYER_COUNT).contains(&layer));
        LayerMask(1 << (layer.clamp(1, Self::LAYER_COUNT) as u32 - 1))
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// 是否包含第 layer 层（1 起）
    #[inline]
    pub fn contains(self, layer: u8) -> bool {
        (1..=Self::LAYER_COUNT).contains(&layer) && self.0 & (1 << (layer as u32 - 1)) != 0
    }
}

// ============================================================================
// 主机错误
// ============================================================================

/// 主机调用错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Unknown object handle")]
    UnknownObject,
    #[error("Unknown mesh handle")]
    UnknownMesh,
    #[error("Object is not an armature")]
    NotAnArmature,
    #[error("Armature has no bone named '{0}'")]
    UnknownBone(String),
    #[error("Object has no rigid body")]
    NoRigidBody,
    #[error("Constraint not found")]
    NoConstraint,
    #[error("No vertices to define Convex Hull collision shape")]
    EmptyMesh,
    #[error("Host operation failed: {0}")]
    OperationFailed(String),
}

// ============================================================================
// 能力接口
// ============================================================================

/// 主机场景能力接口
///
/// 实现方是宿主应用的适配层；MemoryScene 提供测试与干跑用的内存实现。
/// 主机是急验证的：顺序错误的调用（先写参数后建刚体、
/// 对无顶点网格设凸包形状）当场返回错误。
pub trait HostScene {
    // ---- 对象生命周期 ----

    /// 以 mesh 为网格数据新建网格对象。重名时主机自行唯一化
    fn create_mesh_object(&mut self, name: &str, mesh: BoxMesh) -> Result<ObjectHandle, HostError>;
    /// 把对象放入场景的指定层
    fn link_to_scene(&mut self, object: ObjectHandle, layers: LayerMask) -> Result<(), HostError>;
    /// 把对象移出场景（对象与网格数据仍存在）
    fn unlink_from_scene(&mut self, object: ObjectHandle) -> Result<(), HostError>;
    /// 删除对象。对象必须已出场景
    fn remove_object(&mut self, object: ObjectHandle) -> Result<(), HostError>;
    /// 删除网格数据
    fn remove_mesh_data(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    // ---- 对象查询 ----

    /// 当前存活对象
    fn objects(&self) -> Vec<ObjectHandle>;
    fn object_kind(&self, object: ObjectHandle) -> Result<ObjectKind, HostError>;
    fn object_name(&self, object: ObjectHandle) -> Result<String, HostError>;
    fn object_mesh(&self, object: ObjectHandle) -> Result<Option<MeshHandle>, HostError>;

    // ---- 变换、父接与模式 ----

    fn set_location(&mut self, object: ObjectHandle, location: Vec3) -> Result<(), HostError>;
    /// 把 child 父接到骨架对象的指定骨骼上
    fn parent_to_bone(
        &mut self,
        child: ObjectHandle,
        armature: ObjectHandle,
        bone: &str,
    ) -> Result<(), HostError>;
    fn set_mode(&mut self, object: ObjectHandle, mode: Mode) -> Result<(), HostError>;

    // ---- 刚体 ----

    fn add_rigid_body(&mut self, object: ObjectHandle) -> Result<(), HostError>;
    fn set_rigid_body_params(
        &mut self,
        object: ObjectHandle,
        params: RigidBodyParams,
    ) -> Result<(), HostError>;
    /// 设置碰撞形状。凸包要求网格顶点已就位
    fn set_collision_shape(
        &mut self,
        object: ObjectHandle,
        shape: CollisionShape,
    ) -> Result<(), HostError>;

    // ---- 刚体约束 ----

    fn add_rigid_body_constraint(&mut self, object: ObjectHandle) -> Result<(), HostError>;
    fn set_constraint_params(
        &mut self,
        object: ObjectHandle,
        params: ConstraintParams,
    ) -> Result<(), HostError>;

    // ---- 姿态骨骼约束 ----

    /// 给骨骼追加一条 IK 约束。重名时主机自行唯一化
    fn add_ik_constraint(
        &mut self,
        armature: ObjectHandle,
        bone: &str,
        target: IkTarget,
    ) -> Result<(), HostError>;
    fn bone_constraint_names(
        &self,
        armature: ObjectHandle,
        bone: &str,
    ) -> Result<Vec<String>, HostError>;
    fn remove_bone_constraint(
        &mut self,
        armature: ObjectHandle,
        bone: &str,
        constraint: &str,
    ) -> Result<(), HostError>;
    fn pose_bone_names(&self, armature: ObjectHandle) -> Result<Vec<String>, HostError>;

    // ---- 所有权标记 ----

    fn tag_object(&mut self, object: ObjectHandle, tag: &str) -> Result<(), HostError>;
    fn object_has_tag(&self, object: ObjectHandle, tag: &str) -> Result<bool, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_mask_is_a_single_bit() {
        let mask = LayerMask::single(20);
        assert_eq!(mask.bits(), 1 << 19);
        assert!(mask.contains(20));
        assert!(!mask.contains(1));
        assert_eq!(mask.bits().count_ones(), 1);
    }

    #[test]
    fn layer_mask_first_layer() {
        assert_eq!(LayerMask::single(1).bits(), 1);
        assert!(LayerMask::EMPTY.bits() == 0);
        assert!(!LayerMask::EMPTY.contains(1));
    }
}
