//! Canonical humanoid bone taxonomy
//!
//! The canonical names are the VRM 1.0 humanoid bone names. Lookups exist for the three
//! naming conventions the decoders meet: VRM 0.x and VRM 1.0 extension keys, and the
//! conventional Japanese and English bone names used by PMX models and VMD motions.

use std::fmt;

macro_rules! humanoid_tags {
    ($($variant:ident => $name:literal,)*) => {
        /// A canonical skeleton joint.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum HumanoidTag {
            $($variant,)*
        }

        impl HumanoidTag {
            pub const ALL: &'static [HumanoidTag] = &[$(HumanoidTag::$variant,)*];

            /// The VRM 1.0 name of this bone.
            pub const fn name(self) -> &'static str {
                match self {
                    $(HumanoidTag::$variant => $name,)*
                }
            }
        }
    };
}

humanoid_tags! {
    Hips => "hips",
    Spine => "spine",
    Chest => "chest",
    UpperChest => "upperChest",
    Neck => "neck",
    Head => "head",
    LeftEye => "leftEye",
    RightEye => "rightEye",
    Jaw => "jaw",
    LeftUpperLeg => "leftUpperLeg",
    LeftLowerLeg => "leftLowerLeg",
    LeftFoot => "leftFoot",
    LeftToes => "leftToes",
    RightUpperLeg => "rightUpperLeg",
    RightLowerLeg => "rightLowerLeg",
    RightFoot => "rightFoot",
    RightToes => "rightToes",
    LeftShoulder => "leftShoulder",
    LeftUpperArm => "leftUpperArm",
    LeftLowerArm => "leftLowerArm",
    LeftHand => "leftHand",
    RightShoulder => "rightShoulder",
    RightUpperArm => "rightUpperArm",
    RightLowerArm => "rightLowerArm",
    RightHand => "rightHand",
    LeftThumbMetacarpal => "leftThumbMetacarpal",
    LeftThumbProximal => "leftThumbProximal",
    LeftThumbDistal => "leftThumbDistal",
    LeftIndexProximal => "leftIndexProximal",
    LeftIndexIntermediate => "leftIndexIntermediate",
    LeftIndexDistal => "leftIndexDistal",
    LeftMiddleProximal => "leftMiddleProximal",
    LeftMiddleIntermediate => "leftMiddleIntermediate",
    LeftMiddleDistal => "leftMiddleDistal",
    LeftRingProximal => "leftRingProximal",
    LeftRingIntermediate => "leftRingIntermediate",
    LeftRingDistal => "leftRingDistal",
    LeftLittleProximal => "leftLittleProximal",
    LeftLittleIntermediate => "leftLittleIntermediate",
    LeftLittleDistal => "leftLittleDistal",
    RightThumbMetacarpal => "rightThumbMetacarpal",
    RightThumbProximal => "rightThumbProximal",
    RightThumbDistal => "rightThumbDistal",
    RightIndexProximal => "rightIndexProximal",
    RightIndexIntermediate => "rightIndexIntermediate",
    RightIndexDistal => "rightIndexDistal",
    RightMiddleProximal => "rightMiddleProximal",
    RightMiddleIntermediate => "rightMiddleIntermediate",
    RightMiddleDistal => "rightMiddleDistal",
    RightRingProximal => "rightRingProximal",
    RightRingIntermediate => "rightRingIntermediate",
    RightRingDistal => "rightRingDistal",
    RightLittleProximal => "rightLittleProximal",
    RightLittleIntermediate => "rightLittleIntermediate",
    RightLittleDistal => "rightLittleDistal",
}

impl HumanoidTag {
    /// Looks up a VRM 1.0 `humanBones` key.
    pub fn from_vrm1_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.name() == name)
    }

    /// Looks up a VRM 0.x `humanBones[].bone` value.
    ///
    /// VRM 0.x counts thumb joints from the proximal phalanx, so its three thumb names shift
    /// by one against VRM 1.0.
    pub fn from_vrm0_name(name: &str) -> Option<Self> {
        match name {
            "leftThumbProximal" => Some(HumanoidTag::LeftThumbMetacarpal),
            "leftThumbIntermediate" => Some(HumanoidTag::LeftThumbProximal),
            "rightThumbProximal" => Some(HumanoidTag::RightThumbMetacarpal),
            "rightThumbIntermediate" => Some(HumanoidTag::RightThumbProximal),
            other => Self::from_vrm1_name(other),
        }
    }

    /// Looks up a conventional Japanese PMX/VMD bone name.
    pub fn from_pmx_local_name(name: &str) -> Option<Self> {
        use HumanoidTag::*;
        let tag = match name {
            "下半身" => Hips,
            "上半身" => Spine,
            "上半身2" | "上半身２" => Chest,
            "首" => Neck,
            "頭" => Head,
            "左目" => LeftEye,
            "右目" => RightEye,
            "左足" => LeftUpperLeg,
            "左ひざ" => LeftLowerLeg,
            "左足首" => LeftFoot,
            "左つま先" => LeftToes,
            "右足" => RightUpperLeg,
            "右ひざ" => RightLowerLeg,
            "右足首" => RightFoot,
            "右つま先" => RightToes,
            "左肩" => LeftShoulder,
            "左腕" => LeftUpperArm,
            "左ひじ" => LeftLowerArm,
            "左手首" => LeftHand,
            "右肩" => RightShoulder,
            "右腕" => RightUpperArm,
            "右ひじ" => RightLowerArm,
            "右手首" => RightHand,
            "左親指０" => LeftThumbMetacarpal,
            "左親指１" => LeftThumbProximal,
            "左親指２" => LeftThumbDistal,
            "左人指１" => LeftIndexProximal,
            "左人指２" => LeftIndexIntermediate,
            "左人指３" => LeftIndexDistal,
            "左中指１" => LeftMiddleProximal,
            "左中指２" => LeftMiddleIntermediate,
            "左中指３" => LeftMiddleDistal,
            "左薬指１" => LeftRingProximal,
            "左薬指２" => LeftRingIntermediate,
            "左薬指３" => LeftRingDistal,
            "左小指１" => LeftLittleProximal,
            "左小指２" => LeftLittleIntermediate,
            "左小指３" => LeftLittleDistal,
            "右親指０" => RightThumbMetacarpal,
            "右親指１" => RightThumbProximal,
            "右親指２" => RightThumbDistal,
            "右人指１" => RightIndexProximal,
            "右人指２" => RightIndexIntermediate,
            "右人指３" => RightIndexDistal,
            "右中指１" => RightMiddleProximal,
            "右中指２" => RightMiddleIntermediate,
            "右中指３" => RightMiddleDistal,
            "右薬指１" => RightRingProximal,
            "右薬指２" => RightRingIntermediate,
            "右薬指３" => RightRingDistal,
            "右小指１" => RightLittleProximal,
            "右小指２" => RightLittleIntermediate,
            "右小指３" => RightLittleDistal,
            _ => return None,
        };
        Some(tag)
    }

    /// Looks up a conventional English PMX bone name.
    pub fn from_pmx_universal_name(name: &str) -> Option<Self> {
        use HumanoidTag::*;
        let tag = match name {
            "lower body" => Hips,
            "upper body" => Spine,
            "upper body2" => Chest,
            "neck" => Neck,
            "head" => Head,
            "eye_L" => LeftEye,
            "eye_R" => RightEye,
            "leg_L" => LeftUpperLeg,
            "knee_L" => LeftLowerLeg,
            "ankle_L" => LeftFoot,
            "toe_L" => LeftToes,
            "leg_R" => RightUpperLeg,
            "knee_R" => RightLowerLeg,
            "ankle_R" => RightFoot,
            "toe_R" => RightToes,
            "shoulder_L" => LeftShoulder,
            "arm_L" => LeftUpperArm,
            "elbow_L" => LeftLowerArm,
            "wrist_L" => LeftHand,
            "shoulder_R" => RightShoulder,
            "arm_R" => RightUpperArm,
            "elbow_R" => RightLowerArm,
            "wrist_R" => RightHand,
            "thumb0_L" => LeftThumbMetacarpal,
            "thumb1_L" => LeftThumbProximal,
            "thumb2_L" => LeftThumbDistal,
            "fore1_L" => LeftIndexProximal,
            "fore2_L" => LeftIndexIntermediate,
            "fore3_L" => LeftIndexDistal,
            "middle1_L" => LeftMiddleProximal,
            "middle2_L" => LeftMiddleIntermediate,
            "middle3_L" => LeftMiddleDistal,
            "third1_L" => LeftRingProximal,
            "third2_L" => LeftRingIntermediate,
            "third3_L" => LeftRingDistal,
            "little1_L" => LeftLittleProximal,
            "little2_L" => LeftLittleIntermediate,
            "little3_L" => LeftLittleDistal,
            "thumb0_R" => RightThumbMetacarpal,
            "thumb1_R" => RightThumbProximal,
            "thumb2_R" => RightThumbDistal,
            "fore1_R" => RightIndexProximal,
            "fore2_R" => RightIndexIntermediate,
            "fore3_R" => RightIndexDistal,
            "middle1_R" => RightMiddleProximal,
            "middle2_R" => RightMiddleIntermediate,
            "middle3_R" => RightMiddleDistal,
            "third1_R" => RightRingProximal,
            "third2_R" => RightRingIntermediate,
            "third3_R" => RightRingDistal,
            "little1_R" => RightLittleProximal,
            "little2_R" => RightLittleIntermediate,
            "little3_R" => RightLittleDistal,
            _ => return None,
        };
        Some(tag)
    }

    /// Looks up a PMX bone by its local name, falling back to its universal name.
    pub fn from_pmx_names(local: &str, universal: &str) -> Option<Self> {
        Self::from_pmx_local_name(local).or_else(|| Self::from_pmx_universal_name(universal))
    }
}

impl fmt::Display for HumanoidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vrm1_names_round_trip() {
        for tag in HumanoidTag::ALL {
            assert_eq!(HumanoidTag::from_vrm1_name(tag.name()), Some(*tag));
        }
        assert_eq!(HumanoidTag::ALL.len(), 55);
        assert_eq!(HumanoidTag::from_vrm1_name("tail"), None);
    }

    #[test]
    fn vrm0_thumbs_shift() {
        assert_eq!(
            HumanoidTag::from_vrm0_name("leftThumbProximal"),
            Some(HumanoidTag::LeftThumbMetacarpal)
        );
        assert_eq!(
            HumanoidTag::from_vrm0_name("rightThumbIntermediate"),
            Some(HumanoidTag::RightThumbProximal)
        );
        assert_eq!(
            HumanoidTag::from_vrm0_name("leftThumbDistal"),
            Some(HumanoidTag::LeftThumbDistal)
        );
        assert_eq!(HumanoidTag::from_vrm0_name("hips"), Some(HumanoidTag::Hips));
    }

    #[test]
    fn pmx_local_name_wins() {
        assert_eq!(
            HumanoidTag::from_pmx_names("左腕", "elbow_L"),
            Some(HumanoidTag::LeftUpperArm)
        );
        assert_eq!(
            HumanoidTag::from_pmx_names("ひだり腕", "arm_L"),
            Some(HumanoidTag::LeftUpperArm)
        );
        assert_eq!(HumanoidTag::from_pmx_names("センター", "center"), None);
    }

    #[test]
    fn pmx_fingers_use_fullwidth_digits() {
        assert_eq!(
            HumanoidTag::from_pmx_local_name("右人指２"),
            Some(HumanoidTag::RightIndexIntermediate)
        );
        assert_eq!(HumanoidTag::from_pmx_local_name("右人指2"), None);
    }
}
