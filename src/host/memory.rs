//! 内存参考主机
//!
//! HostScene 的纯内存实现，用于单元/集成测试与干跑。
//! 按急验证主机的方式把关调用顺序：刚体/约束参数必须在 add 之后写入，
//! 无顶点网格拒绝凸包形状，已入场景的对象拒绝直接删除。
//! 对象与骨骼约束的重名都按 .NNN 后缀唯一化。

use std::collections::HashSet;

use glam::Vec3;

use crate::rig::BoxMesh;

use super::{
    CollisionShape, ConstraintParams, HostError, IkTarget, LayerMask, MeshHandle, Mode,
    ObjectHandle, ObjectKind, RigidBodyParams,
};

// ============================================================================
// 场景记录
// ============================================================================

/// 刚体状态（检查用）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidBodyState {
    /// 最近写入的参数
    pub params: Option<RigidBodyParams>,
    /// 最近设置的碰撞形状
    pub shape: Option<CollisionShape>,
}

/// 刚体约束状态（检查用）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstraintState {
    /// 最近写入的参数
    pub params: Option<ConstraintParams>,
}

/// 姿态骨骼记录
#[derive(Clone, Debug)]
struct PoseBoneSlot {
    name: String,
    constraints: Vec<IkTarget>,
}

/// 对象记录
///
/// 句柄是槽位下标；删除只置 alive，不回收槽位，句柄保持稳定。
#[derive(Clone, Debug)]
struct ObjectSlot {
    name: String,
    kind: ObjectKind,
    mesh: Option<MeshHandle>,
    location: Vec3,
    linked: bool,
    layers: LayerMask,
    parent: Option<(ObjectHandle, String)>,
    mode: Mode,
    rigid_body: Option<RigidBodyState>,
    constraint: Option<ConstraintState>,
    tags: HashSet<String>,
    pose_bones: Vec<PoseBoneSlot>,
    alive: bool,
}

impl ObjectSlot {
    fn new(name: String, kind: ObjectKind, mesh: Option<MeshHandle>) -> Self {
        Self {
            name,
            kind,
            mesh,
            location: Vec3::ZERO,
            linked: false,
            layers: LayerMask::EMPTY,
            parent: None,
            mode: Mode::Object,
            rigid_body: None,
            constraint: None,
            tags: HashSet::new(),
            pose_bones: Vec::new(),
            alive: true,
        }
    }
}

/// 在 taken 之外取一个带 .NNN 后缀的名字
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_owned();
    }
    let mut index = 1usize;
    loop {
        let candidate = format!("{}.{:03}", base, index);
        if !taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

// ============================================================================
// 内存场景
// ============================================================================

/// 内存场景
#[derive(Default)]
pub struct MemoryScene {
    objects: Vec<ObjectSlot>,
    meshes: Vec<Option<BoxMesh>>,
    /// 剩余可建网格对象数（测试用故障注入）
    mesh_budget: Option<usize>,
}

impl MemoryScene {
    /// 创建空场景
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个骨架对象，骨骼名即姿态骨骼列表
    ///
    /// 新对象入场景第 1 层，处于 Object 模式。
    pub fn add_armature_object(&mut self, name: &str, bones: &[&str]) -> ObjectHandle {
        let name = unique_name(name, |n| self.object_name_taken(n));
        let mut slot = ObjectSlot::new(name, ObjectKind::Armature, None);
        slot.linked = true;
        slot.layers = LayerMask::single(1);
        slot.pose_bones = bones
            .iter()
            .map(|&bone| PoseBoneSlot {
                name: bone.to_owned(),
                constraints: Vec::new(),
            })
            .collect();
        self.objects.push(slot);
        ObjectHandle(self.objects.len() - 1)
    }

    /// 限制后续可建的网格对象数，超出后 create_mesh_object 报错（故障注入）
    pub fn limit_mesh_objects(&mut self, budget: usize) {
        self.mesh_budget = Some(budget);
    }

    // ========================================
    // 检查访问器（测试断言用）
    // ========================================

    pub fn rigid_body(&self, object: ObjectHandle) -> Option<&RigidBodyState> {
        self.live(object)?.rigid_body.as_ref()
    }

    pub fn constraint(&self, object: ObjectHandle) -> Option<&ConstraintState> {
        self.live(object)?.constraint.as_ref()
    }

    pub fn location(&self, object: ObjectHandle) -> Option<Vec3> {
        Some(self.live(object)?.location)
    }

    /// 对象的骨骼父接（骨架对象句柄 + 骨骼名）
    pub fn bone_parent(&self, object: ObjectHandle) -> Option<(ObjectHandle, String)> {
        self.live(object)?.parent.clone()
    }

    pub fn mode(&self, object: ObjectHandle) -> Option<Mode> {
        Some(self.live(object)?.mode)
    }

    pub fn is_linked(&self, object: ObjectHandle) -> bool {
        self.live(object).map(|slot| slot.linked).unwrap_or(false)
    }

    pub fn layers(&self, object: ObjectHandle) -> Option<LayerMask> {
        Some(self.live(object)?.layers)
    }

    /// 一根骨骼上的全部约束（拷贝）
    pub fn bone_constraints(&self, armature: ObjectHandle, bone: &str) -> Vec<IkTarget> {
        self.live(armature)
            .and_then(|slot| slot.pose_bones.iter().find(|b| b.name == bone))
            .map(|b| b.constraints.clone())
            .unwrap_or_default()
    }

    pub fn mesh_data(&self, mesh: MeshHandle) -> Option<&BoxMesh> {
        self.meshes.get(mesh.0)?.as_ref()
    }

    /// 存活对象数
    pub fn live_object_count(&self) -> usize {
        self.objects.iter().filter(|slot| slot.alive).count()
    }

    /// 存活网格数据数
    pub fn live_mesh_count(&self) -> usize {
        self.meshes.iter().filter(|mesh| mesh.is_some()).count()
    }

    // ========================================
    // 内部查找
    // ========================================

    fn live(&self, object: ObjectHandle) -> Option<&ObjectSlot> {
        self.objects.get(object.0).filter(|slot| slot.alive)
    }

    fn slot(&self, object: ObjectHandle) -> Result<&ObjectSlot, HostError> {
        self.live(object).ok_or(HostError::UnknownObject)
    }

    fn slot_mut(&mut self, object: ObjectHandle) -> Result<&mut ObjectSlot, HostError> {
        self.objects
            .get_mut(object.0)
            .filter(|slot| slot.alive)
            .ok_or(HostError::UnknownObject)
    }

    fn armature_slot_mut(&mut self, object: ObjectHandle) -> Result<&mut ObjectSlot, HostError> {
        let slot = self.slot_mut(object)?;
        if slot.kind != ObjectKind::Armature {
            return Err(HostError::NotAnArmature);
        }
        Ok(slot)
    }

    fn pose_bone(&self, armature: ObjectHandle, bone: &str) -> Result<&PoseBoneSlot, HostError> {
        let slot = self.slot(armature)?;
        if slot.kind != ObjectKind::Armature {
            return Err(HostError::NotAnArmature);
        }
        slot.pose_bones
            .iter()
            .find(|b| b.name == bone)
            .ok_or_else(|| HostError::UnknownBone(bone.to_owned()))
    }

    fn pose_bone_mut(
        &mut self,
        armature: ObjectHandle,
        bone: &str,
    ) -> Result<&mut PoseBoneSlot, HostError> {
        let slot = self.armature_slot_mut(armature)?;
        slot.pose_bones
            .iter_mut()
            .find(|b| b.name == bone)
            .ok_or_else(|| HostError::UnknownBone(bone.to_owned()))
    }

    fn object_name_taken(&self, name: &str) -> bool {
        self.objects.iter().any(|slot| slot.alive && slot.name == name)
    }
}

impl super::HostScene for MemoryScene {
    fn create_mesh_object(&mut self, name: &str, mesh: BoxMesh) -> Result<ObjectHandle, HostError> {
        if let Some(ref mut budget) = self.mesh_budget {
            if *budget == 0 {
                return Err(HostError::OperationFailed(
                    "mesh object budget exhausted".to_owned(),
                ));
            }
            *budget -= 1;
        }

        let mesh_handle = MeshHandle(self.meshes.len());
        self.meshes.push(Some(mesh));

        let name = unique_name(name, |n| self.object_name_taken(n));
        self.objects
            .push(ObjectSlot::new(name, ObjectKind::Mesh, Some(mesh_handle)));
        Ok(ObjectHandle(self.objects.len() - 1))
    }

    fn link_to_scene(&mut self, object: ObjectHandle, layers: LayerMask) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        slot.linked = true;
        slot.layers = layers;
        Ok(())
    }

    // 对未入场景的对象也成功，清理流程可重复执行
    fn unlink_from_scene(&mut self, object: ObjectHandle) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        slot.linked = false;
        slot.layers = LayerMask::EMPTY;
        Ok(())
    }

    fn remove_object(&mut self, object: ObjectHandle) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        if slot.linked {
            return Err(HostError::OperationFailed(
                "object is still linked to the scene".to_owned(),
            ));
        }
        slot.alive = false;
        Ok(())
    }

    fn remove_mesh_data(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        let slot = self.meshes.get_mut(mesh.0).ok_or(HostError::UnknownMesh)?;
        if slot.is_none() {
            return Err(HostError::UnknownMesh);
        }
        *slot = None;
        Ok(())
    }

    fn objects(&self) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, _)| ObjectHandle(index))
            .collect()
    }

    fn object_kind(&self, object: ObjectHandle) -> Result<ObjectKind, HostError> {
        Ok(self.slot(object)?.kind)
    }

    fn object_name(&self, object: ObjectHandle) -> Result<String, HostError> {
        Ok(self.slot(object)?.name.clone())
    }

    fn object_mesh(&self, object: ObjectHandle) -> Result<Option<MeshHandle>, HostError> {
        Ok(self.slot(object)?.mesh)
    }

    fn set_location(&mut self, object: ObjectHandle, location: Vec3) -> Result<(), HostError> {
        self.slot_mut(object)?.location = location;
        Ok(())
    }

    fn parent_to_bone(
        &mut self,
        child: ObjectHandle,
        armature: ObjectHandle,
        bone: &str,
    ) -> Result<(), HostError> {
        self.pose_bone(armature, bone)?;
        self.slot_mut(child)?.parent = Some((armature, bone.to_owned()));
        Ok(())
    }

    fn set_mode(&mut self, object: ObjectHandle, mode: Mode) -> Result<(), HostError> {
        self.slot_mut(object)?.mode = mode;
        Ok(())
    }

    fn add_rigid_body(&mut self, object: ObjectHandle) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        if slot.rigid_body.is_some() {
            return Err(HostError::OperationFailed(
                "object already has a rigid body".to_owned(),
            ));
        }
        slot.rigid_body = Some(RigidBodyState::default());
        Ok(())
    }

    fn set_rigid_body_params(
        &mut self,
        object: ObjectHandle,
        params: RigidBodyParams,
    ) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        let body = slot.rigid_body.as_mut().ok_or(HostError::NoRigidBody)?;
        body.params = Some(params);
        Ok(())
    }

    fn set_collision_shape(
        &mut self,
        object: ObjectHandle,
        shape: CollisionShape,
    ) -> Result<(), HostError> {
        let mesh = self.slot(object)?.mesh;
        if shape == CollisionShape::ConvexHull {
            let vertex_count = mesh
                .and_then(|handle| self.meshes.get(handle.0))
                .and_then(|data| data.as_ref())
                .map(|data| data.vertices.len())
                .unwrap_or(0);
            if vertex_count == 0 {
                return Err(HostError::EmptyMesh);
            }
        }
        let slot = self.slot_mut(object)?;
        let body = slot.rigid_body.as_mut().ok_or(HostError::NoRigidBody)?;
        body.shape = Some(shape);
        Ok(())
    }

    fn add_rigid_body_constraint(&mut self, object: ObjectHandle) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        if slot.constraint.is_some() {
            return Err(HostError::OperationFailed(
                "object already has a rigid body constraint".to_owned(),
            ));
        }
        slot.constraint = Some(ConstraintState::default());
        Ok(())
    }

    fn set_constraint_params(
        &mut self,
        object: ObjectHandle,
        params: ConstraintParams,
    ) -> Result<(), HostError> {
        let slot = self.slot_mut(object)?;
        let constraint = slot.constraint.as_mut().ok_or(HostError::NoConstraint)?;
        constraint.params = Some(params);
        Ok(())
    }

    fn add_ik_constraint(
        &mut self,
        armature: ObjectHandle,
        bone: &str,
        mut target: IkTarget,
    ) -> Result<(), HostError> {
        let slot = self.pose_bone_mut(armature, bone)?;
        target.name = unique_name(&target.name, |n| {
            slot.constraints.iter().any(|c| c.name == n)
        });
        slot.constraints.push(target);
        Ok(())
    }

    fn bone_constraint_names(
        &self,
        armature: ObjectHandle,
        bone: &str,
    ) -> Result<Vec<String>, HostError> {
        Ok(self
            .pose_bone(armature, bone)?
            .constraints
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    fn remove_bone_constraint(
        &mut self,
        armature: ObjectHandle,
        bone: &str,
        constraint: &str,
    ) -> Result<(), HostError> {
        let slot = self.pose_bone_mut(armature, bone)?;
        let position = slot
            .constraints
            .iter()
            .position(|c| c.name == constraint)
            .ok_or(HostError::NoConstraint)?;
        slot.constraints.remove(position);
        Ok(())
    }

    fn pose_bone_names(&self, armature: ObjectHandle) -> Result<Vec<String>, HostError> {
        let slot = self.slot(armature)?;
        if slot.kind != ObjectKind::Armature {
            return Err(HostError::NotAnArmature);
        }
        Ok(slot.pose_bones.iter().map(|b| b.name.clone()).collect())
    }

    fn tag_object(&mut self, object: ObjectHandle, tag: &str) -> Result<(), HostError> {
        self.slot_mut(object)?.tags.insert(tag.to_owned());
        Ok(())
    }

    fn object_has_tag(&self, object: ObjectHandle, tag: &str) -> Result<bool, HostError> {
        Ok(self.slot(object)?.tags.contains(tag))
    }
}
