//! 装配入口
//!
//! 校验配置、选择集与骨架对象、提取骨骼链，然后逐链逐槽建盒。
//! 单链的主机失败只中止该链，已建的盒留在场景里等清理流程回收，
//! 其余链继续装配。

use std::collections::HashSet;

use crate::error::SetupError;
use crate::host::{HostError, HostScene, Mode, ObjectHandle, ObjectKind};
use crate::skeleton::{extract_chains, Armature};

use super::config::RigConfig;
use super::segment::{anchor_bone, build_segment, ChainContext, SegmentSlot};

// ============================================================================
// 输入与产出
// ============================================================================

/// 装配的骨骼选择集
///
/// bones 是工作集（要建盒的骨骼），active 是活动骨骼（锚端参照，
/// 不许出现在工作集里）。
#[derive(Clone, Debug)]
pub struct Selection {
    pub bones: Vec<usize>,
    pub active: usize,
}

/// 单链中止记录
#[derive(Debug, PartialEq)]
pub struct ChainAbort {
    /// 中止的链序号（按提取顺序）
    pub chain: usize,
    /// 失败的槽位
    pub slot: SegmentSlot,
    /// 主机报的错
    pub error: HostError,
}

/// 装配结果汇总
#[derive(Debug, Default, PartialEq)]
pub struct SetupReport {
    pub chains_total: usize,
    pub chains_completed: usize,
    pub boxes_created: usize,
    pub aborted: Vec<ChainAbort>,
}

// ============================================================================
// 装配
// ============================================================================

/// 为选中骨骼链装配碰撞盒链
///
/// 流程：配置校验 → 选择集校验 → 骨架对象校验 → 链提取 →
/// 切对象模式 → 逐链建段 → 切回姿态模式。返回 Err 的只有前置校验
/// 和模式切换；链内的主机失败记进 report.aborted。
pub fn setup_rigidbody<H: HostScene>(
    host: &mut H,
    armature_object: ObjectHandle,
    armature: &Armature,
    selection: &Selection,
    config: &RigConfig,
) -> Result<SetupReport, SetupError> {
    config.validate()?;

    if selection.bones.len() < 2 {
        return Err(SetupError::TooFewBonesSelected {
            found: selection.bones.len(),
        });
    }
    for &index in &selection.bones {
        if armature.bone(index).is_none() {
            return Err(SetupError::UnknownBone { index });
        }
    }
    if armature.bone(selection.active).is_none() {
        return Err(SetupError::UnknownBone {
            index: selection.active,
        });
    }
    if !selection.bones.contains(&selection.active) {
        return Err(SetupError::ActiveBoneNotSelected);
    }
    // 句柄必须指向骨架对象，拒绝发生在任何场景变更之前
    if host.object_kind(armature_object)? != ObjectKind::Armature {
        return Err(SetupError::Host(HostError::NotAnArmature));
    }

    // 工作集去掉活动骨骼并去重，重复条目不该算成分叉
    let mut seen = HashSet::new();
    let working_set: Vec<usize> = selection
        .bones
        .iter()
        .copied()
        .filter(|&index| index != selection.active && seen.insert(index))
        .collect();

    let chains = extract_chains(armature, &working_set, selection.active)?;

    host.set_mode(armature_object, Mode::Object)?;

    let mut report = SetupReport {
        chains_total: chains.len(),
        ..SetupReport::default()
    };

    for (chain_index, chain) in chains.iter().enumerate() {
        let ctx = ChainContext {
            armature_object,
            armature,
            chain,
            anchor: anchor_bone(armature, chain, selection.active),
            config,
        };

        let mut previous = None;
        let mut aborted = false;
        for slot in SegmentSlot::sequence(chain.len()) {
            match build_segment(host, &ctx, slot, previous) {
                Ok(object) => {
                    previous = Some(object);
                    report.boxes_created += 1;
                }
                Err(error) => {
                    log::error!(
                        "[RigidbodyBone] 链 {} 在槽位 {:?} 建段失败，中止该链: {}",
                        chain_index,
                        slot,
                        error
                    );
                    report.aborted.push(ChainAbort {
                        chain: chain_index,
                        slot,
                        error,
                    });
                    aborted = true;
                    break;
                }
            }
        }
        if !aborted {
            report.chains_completed += 1;
        }
    }

    log::info!(
        "[RigidbodyBone] 装配完成: {} 条链 ({} 完整), {} 个碰撞盒, {} 条中止",
        report.chains_total,
        report.chains_completed,
        report.boxes_created,
        report.aborted.len()
    );

    host.set_mode(armature_object, Mode::Pose)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use crate::host::{ConstraintKind, LimitAxes, MemoryScene};
    use crate::rig::BoxMesh;
    use crate::skeleton::PoseBone;

    use super::*;

    /// root -> b0 -> b1 直链骨架与对应的内存场景
    fn straight_scene() -> (MemoryScene, ObjectHandle, Armature, Selection) {
        let mut armature = Armature::new(Mat4::IDENTITY);
        let root = armature
            .add_bone(PoseBone::new("root", Vec3::ZERO, Vec3::Y * 0.2, None))
            .unwrap();
        let b0 = armature
            .add_bone(PoseBone::new("b0", Vec3::Y * 0.2, Vec3::Y * 0.5, Some(root)))
            .unwrap();
        let b1 = armature
            .add_bone(PoseBone::new("b1", Vec3::Y * 0.5, Vec3::Y * 0.9, Some(b0)))
            .unwrap();

        let mut scene = MemoryScene::new();
        let object = scene.add_armature_object("Armature", &["root", "b0", "b1"]);
        let selection = Selection {
            bones: vec![root, b0, b1],
            active: root,
        };
        (scene, object, armature, selection)
    }

    #[test]
    fn straight_chain_builds_four_boxes() {
        let (mut scene, object, armature, selection) = straight_scene();
        let config = RigConfig::default();

        let report =
            setup_rigidbody(&mut scene, object, &armature, &selection, &config).unwrap();

        assert_eq!(report.chains_total, 1);
        assert_eq!(report.chains_completed, 1);
        assert_eq!(report.boxes_created, 4);
        assert!(report.aborted.is_empty());

        // 骨架 + 4 个盒
        assert_eq!(scene.live_object_count(), 5);
        assert_eq!(scene.live_mesh_count(), 4);
        assert_eq!(scene.mode(object).unwrap(), Mode::Pose);
    }

    #[test]
    fn head_cap_is_kinematic_and_parented_to_the_anchor() {
        let (mut scene, object, armature, selection) = straight_scene();
        let config = RigConfig::default();
        setup_rigidbody(&mut scene, object, &armature, &selection, &config).unwrap();

        let head_cap = scene
            .objects()
            .into_iter()
            .find(|&o| scene.object_name(o).unwrap() == "rigidbody_bone")
            .unwrap();

        // 锚骨是活动骨骼 root，锚盒位置重表为其尾部相对偏移
        assert_eq!(
            scene.bone_parent(head_cap),
            Some((object, "root".to_owned()))
        );
        assert!(scene.location(head_cap).unwrap().length() < 1e-6);

        let body = scene.rigid_body(head_cap).unwrap();
        let params = body.params.unwrap();
        assert!(params.kinematic);

        let constraint = scene.constraint(head_cap).unwrap().params.unwrap();
        assert_eq!(constraint.kind, ConstraintKind::Fixed);
        assert_eq!(constraint.object1, head_cap);
        assert_eq!(constraint.object2, None);
    }

    #[test]
    fn links_are_spring_chained_to_their_predecessor() {
        let (mut scene, object, armature, selection) = straight_scene();
        let config = RigConfig::default();
        setup_rigidbody(&mut scene, object, &armature, &selection, &config).unwrap();

        let by_name = |name: &str| {
            scene
                .objects()
                .into_iter()
                .find(|&o| scene.object_name(o).unwrap() == name)
                .unwrap()
        };
        let head_cap = by_name("rigidbody_bone");
        let link0 = by_name("rigidbody_bone.001");
        let link1 = by_name("rigidbody_bone.002");
        let tail_cap = by_name("rigidbody_bone.003");

        assert!((scene.location(link0).unwrap() - Vec3::Y * 0.2).length() < 1e-6);
        assert!((scene.location(link1).unwrap() - Vec3::Y * 0.5).length() < 1e-6);
        assert!((scene.location(tail_cap).unwrap() - Vec3::Y * 0.9).length() < 1e-6);

        let constraint = scene.constraint(link1).unwrap().params.unwrap();
        assert_eq!(constraint.kind, ConstraintKind::GenericSpring);
        assert_eq!(constraint.object1, link1);
        assert_eq!(constraint.object2, Some(link0));
        assert_eq!(constraint.limits, LimitAxes::all());
        assert_eq!(scene.constraint(link0).unwrap().params.unwrap().object2, Some(head_cap));
        assert_eq!(scene.constraint(tail_cap).unwrap().params.unwrap().object2, Some(link1));
    }

    #[test]
    fn ik_lands_on_the_bone_behind_each_box() {
        let (mut scene, object, armature, selection) = straight_scene();
        let config = RigConfig::default();
        setup_rigidbody(&mut scene, object, &armature, &selection, &config).unwrap();

        // link1 的盒驱动 b0，梢盒驱动 b1，前两个槽位不挂
        assert!(scene.bone_constraints(object, "root").is_empty());
        let on_b0 = scene.bone_constraints(object, "b0");
        assert_eq!(on_b0.len(), 1);
        assert_eq!(on_b0[0].name, "RigidBody_Bone_IK");
        assert_eq!(on_b0[0].chain_count, 1);
        assert_eq!(scene.bone_constraints(object, "b1").len(), 1);
    }

    #[test]
    fn rejects_single_bone_selections() {
        let (mut scene, object, armature, _) = straight_scene();
        let selection = Selection {
            bones: vec![0],
            active: 0,
        };
        let err = setup_rigidbody(
            &mut scene,
            object,
            &armature,
            &selection,
            &RigConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, SetupError::TooFewBonesSelected { found: 1 });
    }

    #[test]
    fn rejects_an_active_bone_outside_the_selection() {
        let (mut scene, object, armature, _) = straight_scene();
        let selection = Selection {
            bones: vec![1, 2],
            active: 0,
        };
        let err = setup_rigidbody(
            &mut scene,
            object,
            &armature,
            &selection,
            &RigConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, SetupError::ActiveBoneNotSelected);
    }

    #[test]
    fn rejects_invalid_config_before_touching_the_scene() {
        let (mut scene, object, armature, selection) = straight_scene();
        let config = RigConfig {
            box_radius: 0.0,
            ..RigConfig::default()
        };
        let err =
            setup_rigidbody(&mut scene, object, &armature, &selection, &config).unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
        assert_eq!(scene.live_object_count(), 1);
    }

    #[test]
    fn rejects_a_non_armature_object_before_touching_the_scene() {
        let (mut scene, _, armature, selection) = straight_scene();
        let prop = scene
            .create_mesh_object(
                "prop",
                BoxMesh::new(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Z, 0.1),
            )
            .unwrap();

        let err = setup_rigidbody(
            &mut scene,
            prop,
            &armature,
            &selection,
            &RigConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err, SetupError::Host(HostError::NotAnArmature));
        // 没建出任何盒：场景里仍只有骨架和道具
        assert_eq!(scene.live_object_count(), 2);
        assert_eq!(scene.live_mesh_count(), 1);
    }

    #[test]
    fn duplicate_selection_entries_are_not_a_branch() {
        let (mut scene, object, armature, _) = straight_scene();
        let selection = Selection {
            bones: vec![0, 1, 2, 1],
            active: 0,
        };
        let report = setup_rigidbody(
            &mut scene,
            object,
            &armature,
            &selection,
            &RigConfig::default(),
        )
        .unwrap();
        assert_eq!(report.boxes_created, 4);
    }

    #[test]
    fn host_failure_aborts_only_the_failing_chain() {
        // root 下两条链：a0 -> a1 与 c0
        let mut armature = Armature::new(Mat4::IDENTITY);
        let root = armature
            .add_bone(PoseBone::new("root", Vec3::ZERO, Vec3::Y * 0.2, None))
            .unwrap();
        let a0 = armature
            .add_bone(PoseBone::new("a0", Vec3::Y * 0.2, Vec3::Y * 0.5, Some(root)))
            .unwrap();
        let a1 = armature
            .add_bone(PoseBone::new("a1", Vec3::Y * 0.5, Vec3::Y * 0.9, Some(a0)))
            .unwrap();
        let c0 = armature
            .add_bone(PoseBone::new(
                "c0",
                Vec3::new(0.3, 0.2, 0.0),
                Vec3::new(0.3, 0.5, 0.0),
                Some(root),
            ))
            .unwrap();

        let mut scene = MemoryScene::new();
        let object = scene.add_armature_object("Armature", &["root", "a0", "a1", "c0"]);
        // 第一条链要 4 个网格，第二条链建到第一段（第 6 个）时预算耗尽
        scene.limit_mesh_objects(5);

        let selection = Selection {
            bones: vec![root, a0, a1, c0],
            active: root,
        };
        let report = setup_rigidbody(
            &mut scene,
            object,
            &armature,
            &selection,
            &RigConfig::default(),
        )
        .unwrap();

        assert_eq!(report.chains_total, 2);
        assert_eq!(report.chains_completed, 1);
        assert_eq!(report.boxes_created, 5);
        assert_eq!(report.aborted.len(), 1);
        assert_eq!(report.aborted[0].chain, 1);
        assert_eq!(report.aborted[0].slot, SegmentSlot::Link(0));
        assert!(matches!(report.aborted[0].error, HostError::OperationFailed(_)));

        // 半拉链的盒留在场景里，骨架仍切回姿态模式
        assert_eq!(scene.live_object_count(), 6);
        assert_eq!(scene.mode(object).unwrap(), Mode::Pose);
    }
}
