//! 链段合成
//!
//! 一条长 n 的骨骼链展开成 n + 2 个槽位：头端锚盒、每骨一段、尾端梢盒。
//! 逐槽推导世界空间下的盒框架，再按固定顺序驱动主机：
//! 建网格对象 → 入场景 → 打标记 → 放位 → 刚体 → 约束 → 参数 → 凸包形状。

use glam::{Mat3, Vec3};

use crate::host::{
    CollisionShape, ConstraintParams, HostError, HostScene, IkTarget, ObjectHandle,
    RigidBodyParams,
};
use crate::skeleton::{Armature, BoneChain};

use super::box_mesh::BoxMesh;
use super::config::RigConfig;
use super::{BOX_NAME, GENERATED_TAG, IK_CONSTRAINT_NAME};

// ============================================================================
// 槽位
// ============================================================================

/// 链段槽位
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentSlot {
    /// 头端锚盒（运动学，父接锚骨骼）
    HeadCap,
    /// 第 i 根骨骼的链段
    Link(usize),
    /// 尾端梢盒
    TailCap,
}

impl SegmentSlot {
    /// 链的完整槽位序列（长 chain_len + 2）
    pub fn sequence(chain_len: usize) -> Vec<SegmentSlot> {
        let mut slots = Vec::with_capacity(chain_len + 2);
        slots.push(SegmentSlot::HeadCap);
        slots.extend((0..chain_len).map(SegmentSlot::Link));
        slots.push(SegmentSlot::TailCap);
        slots
    }
}

// ============================================================================
// 盒框架
// ============================================================================

/// 单段盒框架
///
/// origin 是盒对象的世界位置（盒局部原点），local_tail 是盒局部空间
/// 中的尾端点，axis_x/axis_z 是横截面边方向。
#[derive(Clone, Copy, Debug)]
pub struct SegmentFrame {
    pub origin: Vec3,
    pub local_tail: Vec3,
    pub axis_x: Vec3,
    pub axis_z: Vec3,
}

impl SegmentFrame {
    /// 推导一个槽位的盒框架
    ///
    /// 端盒从参考骨骼的端点沿其 Y 轴伸出 radius；链段盒跨满整根骨骼。
    /// 方向经 transform_vector3 变换（不含平移），位置经 transform_point3。
    pub fn derive(
        armature: &Armature,
        chain: &BoneChain,
        slot: SegmentSlot,
        box_radius: f32,
    ) -> Self {
        let (bone, origin, local_tail) = match slot {
            SegmentSlot::HeadCap => {
                let bone = chain.bones[0];
                let origin = armature.world_head(bone);
                (bone, origin, box_radius * armature.world_axis_y(bone))
            }
            SegmentSlot::TailCap => {
                let bone = chain.bones[chain.len() - 1];
                let origin = armature.world_tail(bone);
                (bone, origin, box_radius * armature.world_axis_y(bone))
            }
            SegmentSlot::Link(i) => {
                let bone = chain.bones[i];
                let origin = armature.world_head(bone);
                (bone, origin, armature.world_tail(bone) - origin)
            }
        };
        Self {
            origin,
            local_tail,
            axis_x: armature.world_axis_x(bone).normalize(),
            axis_z: armature.world_axis_z(bone).normalize(),
        }
    }
}

// ============================================================================
// 槽位关系
// ============================================================================

/// 槽位的 IK 挂载骨骼
///
/// 链段 i（i > 0）挂在前一根骨骼上，梢盒挂在最后一根骨骼上；
/// 锚盒和第一段不挂。
pub fn ik_attachment(chain: &BoneChain, slot: SegmentSlot) -> Option<usize> {
    match slot {
        SegmentSlot::Link(i) if i > 0 => Some(chain.bones[i - 1]),
        SegmentSlot::TailCap => Some(chain.bones[chain.len() - 1]),
        _ => None,
    }
}

/// 锚盒的父接骨骼：链首的父级，链首就是根时退回活动骨骼
pub fn anchor_bone(armature: &Armature, chain: &BoneChain, active: usize) -> usize {
    armature.bones()[chain.bones[0]].parent.unwrap_or(active)
}

// ============================================================================
// 建段
// ============================================================================

/// 单链建段上下文
pub struct ChainContext<'a> {
    /// 骨架对象句柄
    pub armature_object: ObjectHandle,
    /// 骨架快照
    pub armature: &'a Armature,
    /// 待装配的链
    pub chain: &'a BoneChain,
    /// 锚盒父接骨骼索引
    pub anchor: usize,
    /// 装配配置
    pub config: &'a RigConfig,
}

/// 建一段盒：建网格对象、入场景、放位、配刚体与约束、挂 IK
///
/// previous 是链上前一个盒，作约束的第二刚体；锚盒没有。
pub fn build_segment<H: HostScene>(
    host: &mut H,
    ctx: &ChainContext<'_>,
    slot: SegmentSlot,
    previous: Option<ObjectHandle>,
) -> Result<ObjectHandle, HostError> {
    let frame = SegmentFrame::derive(ctx.armature, ctx.chain, slot, ctx.config.box_radius);
    let mesh = BoxMesh::new(
        Vec3::ZERO,
        frame.local_tail,
        frame.axis_x,
        frame.axis_z,
        ctx.config.box_radius,
    );

    let object = host.create_mesh_object(BOX_NAME, mesh)?;
    host.link_to_scene(object, ctx.config.layer_mask())?;
    host.tag_object(object, GENERATED_TAG)?;
    host.set_location(object, frame.origin)?;
    host.add_rigid_body(object)?;
    host.add_rigid_body_constraint(object)?;

    match slot {
        SegmentSlot::HeadCap => {
            // 锚盒改挂骨骼：位置重表为锚骨坐标系下相对其尾部的偏移
            let anchor_tail = ctx.armature.world_tail(ctx.anchor);
            let basis = Mat3::from_cols(
                ctx.armature.world_axis_x(ctx.anchor).normalize(),
                ctx.armature.world_axis_y(ctx.anchor).normalize(),
                ctx.armature.world_axis_z(ctx.anchor).normalize(),
            );
            let local = basis.transpose() * (frame.origin - anchor_tail);
            host.set_location(object, local)?;
            host.parent_to_bone(
                object,
                ctx.armature_object,
                &ctx.armature.bones()[ctx.anchor].name,
            )?;
            host.set_rigid_body_params(object, RigidBodyParams::kinematic_anchor())?;
            host.set_constraint_params(object, ConstraintParams::fixed(object))?;
        }
        _ => {
            host.set_rigid_body_params(
                object,
                RigidBodyParams::dynamic(
                    ctx.config.mass,
                    ctx.config.linear_damping,
                    ctx.config.angular_damping,
                ),
            )?;
            host.set_constraint_params(
                object,
                ConstraintParams::spring_chain(object, previous, ctx.config.springs()),
            )?;

            if let Some(ik_bone) = ik_attachment(ctx.chain, slot) {
                host.add_ik_constraint(
                    ctx.armature_object,
                    &ctx.armature.bones()[ik_bone].name,
                    IkTarget {
                        name: IK_CONSTRAINT_NAME.to_owned(),
                        target: object,
                        chain_count: 1,
                    },
                )?;
            }
        }
    }

    // 网格顶点就位后才能设置凸包碰撞形状，必须放在最后
    host.set_collision_shape(object, CollisionShape::ConvexHull)?;

    log::debug!("[RigidbodyBone] 建段 {:?} -> {:?}", slot, object);

    Ok(object)
}
