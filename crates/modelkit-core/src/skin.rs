use glam::Mat4;

use crate::error::{ModelError, Result};
use crate::humanoid::HumanoidTag;
use crate::scene::NodeId;

/// Joint list of a skinned mesh.
///
/// The position of a joint in `joints` is the bone index vertex joint attributes refer to.
/// `inverse_bind_matrices`, when present, and `joint_humanoid_tags` run parallel to it.
#[derive(Debug, Clone)]
pub struct Skin {
    pub name: Option<String>,
    joints: Vec<NodeId>,
    skeleton: Option<NodeId>,
    inverse_bind_matrices: Option<Vec<Mat4>>,
    joint_humanoid_tags: Vec<Option<HumanoidTag>>,
}

impl Skin {
    pub fn new(
        name: Option<String>,
        joints: Vec<NodeId>,
        skeleton: Option<NodeId>,
        inverse_bind_matrices: Option<Vec<Mat4>>,
        joint_humanoid_tags: Vec<Option<HumanoidTag>>,
    ) -> Result<Self> {
        if let Some(matrices) = &inverse_bind_matrices {
            if matrices.len() != joints.len() {
                return Err(ModelError::SkinValidation(format!(
                    "{} inverse bind matrices for {} joints",
                    matrices.len(),
                    joints.len()
                )));
            }
        }
        if joint_humanoid_tags.len() != joints.len() {
            return Err(ModelError::SkinValidation(format!(
                "{} humanoid tags for {} joints",
                joint_humanoid_tags.len(),
                joints.len()
            )));
        }
        Ok(Self {
            name,
            joints,
            skeleton,
            inverse_bind_matrices,
            joint_humanoid_tags,
        })
    }

    pub fn joints(&self) -> &[NodeId] {
        &self.joints
    }

    pub fn skeleton(&self) -> Option<NodeId> {
        self.skeleton
    }

    pub fn inverse_bind_matrices(&self) -> Option<&[Mat4]> {
        self.inverse_bind_matrices.as_deref()
    }

    /// Inverse bind matrix of joint `index`, identity when the skin declares none.
    pub fn inverse_bind_matrix(&self, index: usize) -> Mat4 {
        self.inverse_bind_matrices
            .as_ref()
            .and_then(|m| m.get(index).copied())
            .unwrap_or(Mat4::IDENTITY)
    }

    pub fn joint_humanoid_tags(&self) -> &[Option<HumanoidTag>] {
        &self.joint_humanoid_tags
    }

    /// The joint mapped to `tag`, if any.
    pub fn joint_for(&self, tag: HumanoidTag) -> Option<NodeId> {
        self.joint_humanoid_tags
            .iter()
            .position(|t| *t == Some(tag))
            .map(|i| self.joints[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SessionId;
    use glam::Vec3;

    #[test]
    fn parallel_lists_must_agree() {
        let session = SessionId::new();
        let joints = vec![NodeId::new(session, 0), NodeId::new(session, 1)];
        let err = Skin::new(None, joints.clone(), None, Some(vec![Mat4::IDENTITY]), vec![None; 2])
            .unwrap_err();
        assert!(matches!(err, ModelError::SkinValidation(_)));
        assert!(Skin::new(None, joints.clone(), None, None, vec![None]).is_err());

        let skin = Skin::new(None, joints, None, None, vec![Some(HumanoidTag::Hips), None]).unwrap();
        assert_eq!(skin.inverse_bind_matrix(1), Mat4::IDENTITY);
        assert_eq!(skin.joint_for(HumanoidTag::Hips), Some(NodeId::new(session, 0)));
        assert_eq!(skin.joint_for(HumanoidTag::Head), None);
    }

    #[test]
    fn declared_matrices_are_returned() {
        let session = SessionId::new();
        let ibm = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let skin = Skin::new(
            Some("body".into()),
            vec![NodeId::new(session, 3)],
            Some(NodeId::new(session, 3)),
            Some(vec![ibm]),
            vec![None],
        )
        .unwrap();
        assert_eq!(skin.inverse_bind_matrix(0), ibm);
        assert_eq!(skin.inverse_bind_matrices().map(<[Mat4]>::len), Some(1));
    }
}
