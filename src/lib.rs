//! 刚体骨骼装配工具
//!
//! 把姿态模式下选中的骨骼链变成一串刚体碰撞盒：链首挂一个运动学
//! 锚盒跟随骨架，每根骨骼一段动力学盒，链尾再补一个梢盒，相邻盒
//! 之间用六自由度弹簧约束串联，盒又通过单级 IK 约束把模拟结果写
//! 回骨骼。cleanup 负责把这些产物从场景里摘干净。
//!
//! 对场景的所有读写都走 [`HostScene`] 特征，宿主软件各自实现；
//! [`MemoryScene`] 是自带的内存实现，供测试和离线演算使用。

pub mod error;
pub mod host;
pub mod rig;
pub mod skeleton;

pub use error::SetupError;
pub use host::{HostScene, MemoryScene};
pub use rig::{cleanup, setup_rigidbody, CleanupReport, RigConfig, Selection, SetupReport};
pub use skeleton::{extract_chains, Armature, BoneChain, PoseBone};
