//! 清理流程
//!
//! 两遍扫描：先摘掉所有骨架上名字含 IK 标记的约束，再回收生成的
//! 碰撞盒对象及其网格数据。按对象标记识别自家产物，同时兼容
//! 只剩名字前缀的旧场景。整个流程可重复执行。

use crate::host::{HostError, HostScene, MeshHandle, ObjectHandle, ObjectKind};

use super::{BOX_NAME, GENERATED_TAG, IK_CONSTRAINT_NAME};

/// 清理结果汇总
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub ik_constraints_removed: usize,
    pub boxes_removed: usize,
}

/// 摘除装配流程写入场景的所有 IK 约束和碰撞盒
///
/// 同名约束可能堆叠多个（多次装配未清理），全部摘除。盒对象先
/// 离场再删除，网格数据随后回收。
pub fn cleanup<H: HostScene>(host: &mut H) -> Result<CleanupReport, HostError> {
    let mut report = CleanupReport::default();

    // 第一遍：骨架上的 IK 约束
    for object in host.objects() {
        if host.object_kind(object)? != ObjectKind::Armature {
            continue;
        }
        for bone in host.pose_bone_names(object)? {
            let doomed: Vec<String> = host
                .bone_constraint_names(object, &bone)?
                .into_iter()
                .filter(|name| name.contains(IK_CONSTRAINT_NAME))
                .collect();
            for name in doomed {
                host.remove_bone_constraint(object, &bone, &name)?;
                report.ik_constraints_removed += 1;
            }
        }
    }

    // 第二遍：生成的碰撞盒
    for object in host.objects() {
        if host.object_kind(object)? != ObjectKind::Mesh || !is_generated_box(host, object)? {
            continue;
        }
        let mesh = host.object_mesh(object)?;
        remove_box(host, object, mesh)?;
        report.boxes_removed += 1;
    }

    log::info!(
        "[RigidbodyBone] 清理完成: 摘除 {} 个 IK 约束, 删除 {} 个碰撞盒",
        report.ik_constraints_removed,
        report.boxes_removed
    );

    Ok(report)
}

/// 对象标记优先，名字含盒前缀的旧产物也认
fn is_generated_box<H: HostScene>(host: &H, object: ObjectHandle) -> Result<bool, HostError> {
    if host.object_has_tag(object, GENERATED_TAG)? {
        return Ok(true);
    }
    Ok(host.object_name(object)?.contains(BOX_NAME))
}

/// 网格句柄必须在对象删除前取到
fn remove_box<H: HostScene>(
    host: &mut H,
    object: ObjectHandle,
    mesh: Option<MeshHandle>,
) -> Result<(), HostError> {
    host.unlink_from_scene(object)?;
    host.remove_object(object)?;
    if let Some(mesh) = mesh {
        host.remove_mesh_data(mesh)?;
    }
    Ok(())
}
