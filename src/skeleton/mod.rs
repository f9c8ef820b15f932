//! 骨架快照
//!
//! 核心类型：
//! - PoseBone: 单根姿态骨骼（头尾 + 姿态轴 + 父索引）
//! - Armature: 骨骼容器 + 名称索引 + 世界变换
//! - extract_chains: 从选择提取父先序骨骼链
//!
//! 整个模块只读宿主姿态，所有回写都走主机接口。

mod armature;
mod chain;
mod pose_bone;

pub use armature::Armature;
pub use chain::{extract_chains, BoneChain};
pub use pose_bone::PoseBone;
