//! 装配配置
//!
//! 所有参数扁平化。配置是显式值对象，由调用方传给装配入口，
//! 不经过任何全局状态或场景属性。

use thiserror::Error;

use crate::host::{LayerMask, SpringAxis};

// ============================================================================
// 配置错误
// ============================================================================

/// 配置字段越界
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("Rigid body layer {0} out of range 1..=20")]
    LayerOutOfRange(u8),
    #[error("Box radius {0} below minimum 0.001")]
    BoxRadiusTooSmall(f32),
    #[error("Box mass {0} below minimum 0.001")]
    MassTooSmall(f32),
    #[error("Linear damping {0} out of range 0.001..=1.0")]
    LinearDampingOutOfRange(f32),
    #[error("Angular damping {0} out of range 0.001..=1.0")]
    AngularDampingOutOfRange(f32),
    #[error("{axis} angular spring stiffness {value} below minimum 0.001")]
    SpringStiffnessTooSmall { axis: char, value: f32 },
    #[error("{axis} angular spring damping {value} out of range 0.001..=1.0")]
    SpringDampingOutOfRange { axis: char, value: f32 },
}

// ============================================================================
// 装配配置
// ============================================================================

/// 装配配置（扁平化，不嵌套）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigConfig {
    // ========== 场景 ==========
    /// 碰撞盒放置的场景层（1 起），默认 20
    pub layer: u8,

    // ========== 碰撞盒 ==========
    /// 盒横截面半边长，默认 0.05
    pub box_radius: f32,

    // ========== 刚体动力学 ==========
    /// 质量，默认 1.0
    pub mass: f32,
    /// 平移阻尼，默认 0.9
    pub linear_damping: f32,
    /// 旋转阻尼，默认 0.9
    pub angular_damping: f32,

    // ========== 角弹簧（每轴独立） ==========
    /// X 轴角弹簧
    pub spring_x: SpringAxis,
    /// Y 轴角弹簧
    pub spring_y: SpringAxis,
    /// Z 轴角弹簧
    pub spring_z: SpringAxis,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            // ====== 场景 ======
            // 碰撞盒集中放在最后一层，不挡住建模视图
            layer: 20,

            // ====== 碰撞盒 ======
            // 半边长（场景单位），盒横截面为 2r × 2r
            box_radius: 0.05,

            // ====== 刚体动力学 ======
            // 接近 1.0 的阻尼让链条摆动快速收敛，适合头发/飘带
            mass: 1.0,
            linear_damping: 0.9,
            angular_damping: 0.9,

            // ====== 角弹簧 ======
            // 默认全部关闭；开启后刚度 10.0 / 阻尼 0.9 起步
            spring_x: SpringAxis::default(),
            spring_y: SpringAxis::default(),
            spring_z: SpringAxis::default(),
        }
    }
}

impl RigConfig {
    /// 校验所有字段范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=LayerMask::LAYER_COUNT).contains(&self.layer) {
            return Err(ConfigError::LayerOutOfRange(self.layer));
        }
        // 取反写法连 NaN 一起拒绝
        if !(self.box_radius >= 0.001) {
            return Err(ConfigError::BoxRadiusTooSmall(self.box_radius));
        }
        if !(self.mass >= 0.001) {
            return Err(ConfigError::MassTooSmall(self.mass));
        }
        if !(self.linear_damping >= 0.001 && self.linear_damping <= 1.0) {
            return Err(ConfigError::LinearDampingOutOfRange(self.linear_damping));
        }
        if !(self.angular_damping >= 0.001 && self.angular_damping <= 1.0) {
            return Err(ConfigError::AngularDampingOutOfRange(self.angular_damping));
        }
        for (axis, spring) in [('X', self.spring_x), ('Y', self.spring_y), ('Z', self.spring_z)] {
            if !(spring.stiffness >= 0.001) {
                return Err(ConfigError::SpringStiffnessTooSmall {
                    axis,
                    value: spring.stiffness,
                });
            }
            if !(spring.damping >= 0.001 && spring.damping <= 1.0) {
                return Err(ConfigError::SpringDampingOutOfRange {
                    axis,
                    value: spring.damping,
                });
            }
        }
        Ok(())
    }

    /// 碰撞盒所在层的掩码
    #[inline]
    pub fn layer_mask(&self) -> LayerMask {
        LayerMask::single(self.layer)
    }

    /// 三轴角弹簧，按 X/Y/Z 顺序
    #[inline]
    pub fn springs(&self) -> [SpringAxis; 3] {
        [self.spring_x, self.spring_y, self.spring_z]
    }
}
