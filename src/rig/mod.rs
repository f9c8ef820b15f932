//! 装配层
//!
//! 碰撞盒链的合成与回收：RigConfig 定参数，setup_rigidbody 把选中的
//! 骨骼链变成弹簧串联的碰撞盒并挂回 IK，cleanup 把这一切摘干净。

mod box_mesh;
mod cleanup;
mod config;
mod segment;
mod setup;

pub use box_mesh::BoxMesh;
pub use cleanup::{cleanup, CleanupReport};
pub use config::{ConfigError, RigConfig};
pub use segment::{
    anchor_bone, build_segment, ik_attachment, ChainContext, SegmentFrame, SegmentSlot,
};
pub use setup::{setup_rigidbody, ChainAbort, Selection, SetupReport};

// ========================================
// 产物命名
// ========================================

/// 盒网格与盒对象共用的名字（主机端可能追加编号后缀）
pub const BOX_NAME: &str = "rigidbody_bone";

/// 写到姿态骨骼上的 IK 约束名
pub const IK_CONSTRAINT_NAME: &str = "RigidBody_Bone_IK";

/// 生成对象的识别标记
pub const GENERATED_TAG: &str = "rigidbody_bone.generated";
