//! 骨骼链提取
//!
//! 在选中骨骼集合里找叶骨骼，沿父链向上行走，产出父先序的骨骼链。
//! 不支持分叉选择：任何骨骼落进两条链（或一条链两次）整体拒绝。

use std::collections::HashSet;

use crate::error::SetupError;

use super::Armature;

/// 骨骼链（父先序，非空）
///
/// bones[0] 是最靠近活动骨骼/根的一端，其后每个元素都是前一个的子骨骼。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneChain {
    /// 链上骨骼索引
    pub bones: Vec<usize>,
}

impl BoneChain {
    /// 链长
    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// 从选择中提取骨骼链
///
/// selected 中不是其他选中骨骼父级的骨骼为叶，每个叶产出一条链。
/// 叶沿父链向上行走，途中骨骼选中与否都纳入链，
/// 遇到活动骨骼或根为止。链的顺序跟随叶在 selected 中的顺序。
///
/// 约定：active 不在 selected 中（编排器先行移除），selected 无重复。
pub fn extract_chains(
    armature: &Armature,
    selected: &[usize],
    active: usize,
) -> Result<Vec<BoneChain>, SetupError> {
    if armature.bone(active).is_none() {
        return Err(SetupError::UnknownBone { index: active });
    }
    for &index in selected {
        if armature.bone(index).is_none() {
            return Err(SetupError::UnknownBone { index });
        }
    }
    if selected.contains(&active) {
        return Err(SetupError::ActiveBoneInWorkingSet);
    }

    // 叶骨骼：不是任何选中骨骼的父级
    let parents: HashSet<usize> = selected
        .iter()
        .filter_map(|&index| armature.bones()[index].parent)
        .collect();
    let leaves = selected.iter().copied().filter(|index| !parents.contains(index));

    // seen 跨链查重，出现两次即分叉
    let mut seen: HashSet<usize> = HashSet::new();
    let mut chains = Vec::new();
    for leaf in leaves {
        let mut walked = vec![leaf];
        let mut current = leaf;
        while let Some(parent) = armature.bones()[current].parent {
            if parent == active {
                break;
            }
            walked.push(parent);
            current = parent;
        }
        walked.reverse();
        // 向上行走的终点就是链首，不存在待补插的前导元素
        debug_assert_eq!(walked[0], current);

        for &bone in &walked {
            if !seen.insert(bone) {
                return Err(SetupError::BranchingSelection {
                    bone: armature.bones()[bone].name.clone(),
                });
            }
        }
        chains.push(BoneChain { bones: walked });
    }

    log::debug!(
        "[RigidbodyBone] 链提取完成: {} 根选中骨骼 -> {} 条链",
        selected.len(),
        chains.len()
    );

    Ok(chains)
}
