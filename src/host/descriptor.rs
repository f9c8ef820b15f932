//! 主机参数块
//!
//! 刚体、约束与 IK 的描述符类型。工具一侧先组装完整参数，
//! 再经 HostScene 一次写入主机，主机侧不留逐字段的中间状态。

use bitflags::bitflags;
use glam::Vec3;

use super::ObjectHandle;

// ============================================================================
// 刚体参数
// ============================================================================

/// 刚体参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyParams {
    /// 运动学刚体（跟随骨骼放置，不参与动力学）
    pub kinematic: bool,
    /// 质量
    pub mass: f32,
    /// 平移阻尼
    pub linear_damping: f32,
    /// 旋转阻尼
    pub angular_damping: f32,
}

impl RigidBodyParams {
    /// 锚点刚体：运动学模式，质量与阻尼对主机无意义
    pub fn kinematic_anchor() -> Self {
        Self {
            kinematic: true,
            mass: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// 动力学刚体
    pub fn dynamic(mass: f32, linear_damping: f32, angular_damping: f32) -> Self {
        Self {
            kinematic: false,
            mass,
            linear_damping,
            angular_damping,
        }
    }
}

// ============================================================================
// 碰撞形状
// ============================================================================

/// 碰撞形状
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionShape {
    Sphere,
    Box,
    Capsule,
    /// 网格顶点的凸包。只有网格顶点就位后主机才接受该形状
    ConvexHull,
}

// ============================================================================
// 刚体约束
// ============================================================================

/// 约束类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// 完全固定
    Fixed,
    /// 六自由度弹簧
    GenericSpring,
}

bitflags! {
    /// 约束限制启用轴
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LimitAxes: u32 {
        /// 平移 X
        const LIN_X = 1 << 0;
        /// 平移 Y
        const LIN_Y = 1 << 1;
        /// 平移 Z
        const LIN_Z = 1 << 2;
        /// 旋转 X
        const ANG_X = 1 << 3;
        /// 旋转 Y
        const ANG_Y = 1 << 4;
        /// 旋转 Z
        const ANG_Z = 1 << 5;
    }
}

/// 单轴角弹簧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringAxis {
    /// 是否启用
    pub enabled: bool,
    /// 弹簧刚度
    pub stiffness: f32,
    /// 弹簧阻尼
    pub damping: f32,
}

impl Default for SpringAxis {
    fn default() -> Self {
        Self {
            enabled: false,
            stiffness: 10.0,
            damping: 0.9,
        }
    }
}

/// 刚体约束参数
///
/// 角度限制只启用不给界，沿用主机默认界。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstraintParams {
    /// 约束类型
    pub kind: ConstraintKind,
    /// 第一刚体（携带约束的盒自身）
    pub object1: ObjectHandle,
    /// 第二刚体（链上前一个盒）
    pub object2: Option<ObjectHandle>,
    /// 启用限制的轴
    pub limits: LimitAxes,
    /// 平移下限
    pub linear_lower: Vec3,
    /// 平移上限
    pub linear_upper: Vec3,
    /// X/Y/Z 角弹簧
    pub springs: [SpringAxis; 3],
}

impl ConstraintParams {
    /// 固定约束（锚盒用）
    pub fn fixed(object1: ObjectHandle) -> Self {
        Self {
            kind: ConstraintKind::Fixed,
            object1,
            object2: None,
            limits: LimitAxes::empty(),
            linear_lower: Vec3::ZERO,
            linear_upper: Vec3::ZERO,
            springs: [SpringAxis::default(); 3],
        }
    }

    /// 链段弹簧约束：六轴全部受限，平移锁死在 0
    pub fn spring_chain(
        object1: ObjectHandle,
        object2: Option<ObjectHandle>,
        springs: [SpringAxis; 3],
    ) -> Self {
        Self {
            kind: ConstraintKind::GenericSpring,
            object1,
            object2,
            limits: LimitAxes::all(),
            linear_lower: Vec3::ZERO,
            linear_upper: Vec3::ZERO,
            springs,
        }
    }
}

// ============================================================================
// IK 目标
// ============================================================================

/// 骨骼 IK 约束描述
#[derive(Clone, Debug, PartialEq)]
pub struct IkTarget {
    /// 约束名
    pub name: String,
    /// 目标对象
    pub target: ObjectHandle,
    /// IK 链长（骨骼数）
    pub chain_count: u32,
}
