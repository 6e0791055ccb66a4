use std::sync::Arc;

use crate::accessor::Accessor;
use crate::error::{ModelError, Result};
use crate::humanoid::HumanoidTag;
use crate::scene::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "LINEAR" => Ok(Interpolation::Linear),
            "STEP" => Ok(Interpolation::Step),
            "CUBICSPLINE" => Ok(Interpolation::CubicSpline),
            other => Err(ModelError::InvalidDocument(format!(
                "unknown interpolation {:?}",
                other
            ))),
        }
    }
}

/// Animated node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "translation" => Ok(TargetPath::Translation),
            "rotation" => Ok(TargetPath::Rotation),
            "scale" => Ok(TargetPath::Scale),
            "weights" => Ok(TargetPath::Weights),
            other => Err(ModelError::InvalidDocument(format!(
                "unknown animation target path {:?}",
                other
            ))),
        }
    }
}

/// Keyframe times (`input`, seconds) paired with keyframe values (`output`).
#[derive(Debug, Clone)]
pub struct AnimationSampler {
    pub input: Arc<Accessor>,
    pub output: Arc<Accessor>,
    pub interpolation: Interpolation,
}

/// Binds a sampler to one property of one node.
///
/// The target name and humanoid tag are resolved once at load time. Channels decoded from
/// standalone motion files have no `target_node` and are matched by name.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub sampler: Arc<AnimationSampler>,
    pub target_node: Option<NodeId>,
    pub target_node_name: Option<String>,
    pub target_humanoid: Option<HumanoidTag>,
    pub path: TargetPath,
}

#[derive(Debug, Clone)]
pub struct Animation {
    pub name: Option<String>,
    pub channels: Vec<AnimationChannel>,
}

impl Animation {
    /// Largest keyframe time over all channels, from the declared `max` of each input.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .filter_map(|c| c.sampler.input.max().and_then(|m| m.first().copied()))
            .fold(0.0, f32::max)
    }
}
