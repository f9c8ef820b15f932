//! 装配错误
//!
//! 前置条件、选择拓扑与主机失败的统一口径。
//! 前两类在任何场景变更之前返回；建段期间的主机失败按链收容，
//! 记入 SetupReport 而不是中断整批。

use thiserror::Error;

use crate::host::HostError;
use crate::rig::ConfigError;

/// 装配错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    /// 配置字段越界
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// 选中骨骼不足两根
    #[error("Need at least two selected bones, found {found}")]
    TooFewBonesSelected { found: usize },

    /// 活动骨骼不在选择中
    #[error("The active bone must be part of the selection")]
    ActiveBoneNotSelected,

    /// 活动骨骼混入了链提取的工作集（编排器应先移除）
    #[error("The active bone must be removed from the working set before chain extraction")]
    ActiveBoneInWorkingSet,

    /// 骨骼索引越界
    #[error("Bone index {index} does not exist in the armature")]
    UnknownBone { index: usize },

    /// 分叉选择：同一根骨骼落进两条链
    #[error("Selection branches at bone '{bone}'; only single paths are supported")]
    BranchingSelection { bone: String },

    /// 场景变更前后的主机失败
    #[error("Host scene call failed: {0}")]
    Host(#[from] HostError),
}
