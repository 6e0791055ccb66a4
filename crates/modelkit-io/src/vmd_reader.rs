//! VMD keyframe-animation decoder.
//!
//! Only the bone keyframe section is decoded. Each bone becomes a translation channel and a
//! rotation channel that target the bone by name, so one motion can drive any model with
//! matching bone names.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec3};
use modelkit_core::{
    Accessor, AccessorType, Animation, AnimationChannel, AnimationSampler, Buffer, BufferView,
    ComponentType, DecodeOptions, DecoderBuffer, HumanoidTag, Interpolation, Metadata,
    ModelError, Result, TargetPath,
};
use tracing::{debug, trace};

use crate::text::decode_shift_jis_field;
use crate::traits::{Ability, LoadResult, ModelDecoder};

const VMD_SIGNATURE_LEN: usize = 30;
const VMD_SIGNATURE_V1: &[u8] = b"Vocaloid Motion Data file";
const VMD_SIGNATURE_V2: &[u8] = b"Vocaloid Motion Data 0002";
const MODEL_NAME_LEN_V1: usize = 10;
const MODEL_NAME_LEN_V2: usize = 20;

const BONE_NAME_LEN: usize = 15;
const INTERPOLATION_LEN: usize = 64;
/// name + frame + position + rotation + interpolation
const BONE_RECORD_LEN: usize = BONE_NAME_LEN + 4 + 12 + 16 + INTERPOLATION_LEN;

/// Decoder for VMD motion files.
#[derive(Debug, Clone, Default)]
pub struct VmdDecoder {
    options: DecodeOptions,
}

impl VmdDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }
}

/// Width of the model-name field selected by the signature, or `None` if it is not a VMD
/// signature.
fn model_name_length(signature: &[u8]) -> Option<usize> {
    let end = signature.iter().position(|&b| b == 0).unwrap_or(signature.len());
    match &signature[..end] {
        VMD_SIGNATURE_V1 => Some(MODEL_NAME_LEN_V1),
        VMD_SIGNATURE_V2 => Some(MODEL_NAME_LEN_V2),
        _ => None,
    }
}

impl ModelDecoder for VmdDecoder {
    fn name(&self) -> &'static str {
        "vmd"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["vmd"]
    }

    fn abilities(&self) -> &'static [Ability] {
        &[Ability::Animation]
    }

    fn probe_length(&self) -> usize {
        VMD_SIGNATURE_LEN
    }

    fn probe(&self, bytes: &[u8]) -> bool {
        bytes.len() >= VMD_SIGNATURE_LEN
            && model_name_length(&bytes[..VMD_SIGNATURE_LEN]).is_some()
    }

    fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn load_bytes(&self, bytes: &[u8], _base_path: &Path) -> Result<LoadResult> {
        let mut buffer = DecoderBuffer::new(bytes, "vmd");
        let name_length = model_name_length(buffer.decode_slice(VMD_SIGNATURE_LEN)?)
            .ok_or(ModelError::SignatureMismatch { format: "vmd" })?;
        let model_name = decode_shift_jis_field(buffer.decode_slice(name_length)?);

        let tracks = read_bone_keyframes(&mut buffer)?;
        if buffer.remaining_size() > 0 {
            debug!(
                remaining = buffer.remaining_size(),
                "ignoring sections after bone keyframes"
            );
        }

        let fps = self.options.vmd_frames_per_second();
        let channels: Vec<AnimationChannel> = tracks
            .into_iter()
            .flat_map(|track| track.into_channels(fps))
            .collect();
        debug!(model = %model_name, channels = channels.len(), "decoded vmd motion");

        let animations = if channels.is_empty() {
            Vec::new()
        } else {
            vec![Animation {
                name: Some(model_name.clone()),
                channels,
            }]
        };
        let metadata = Metadata {
            title: (!model_name.is_empty()).then_some(model_name),
            ..Metadata::default()
        };

        Ok(LoadResult {
            metadata: (!metadata.is_empty()).then_some(metadata),
            scene: None,
            animations,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Keyframe {
    frame: u32,
    translation: Vec3,
    rotation: Quat,
}

/// All keyframes of one bone.
#[derive(Debug)]
struct BoneTrack {
    name: String,
    keyframes: Vec<Keyframe>,
}

/// Reads the bone keyframe section, grouping records by bone in first-appearance order.
fn read_bone_keyframes(buffer: &mut DecoderBuffer<'_>) -> Result<Vec<BoneTrack>> {
    let count = buffer.decode_u32()? as usize;
    match count.checked_mul(BONE_RECORD_LEN) {
        Some(needed) if needed <= buffer.remaining_size() => {}
        _ => {
            return Err(ModelError::bounds(
                "vmd bone keyframes",
                buffer.position(),
                count.saturating_mul(BONE_RECORD_LEN),
                buffer.remaining_size(),
            ))
        }
    }

    let mut tracks: Vec<BoneTrack> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for _ in 0..count {
        let name = decode_shift_jis_field(buffer.decode_slice(BONE_NAME_LEN)?);
        let keyframe = Keyframe {
            frame: buffer.decode_u32()?,
            translation: buffer.decode_vec3()?,
            rotation: buffer.decode_quat()?,
        };
        // TODO: carry the bezier control points into a cubic sampler instead of skipping them.
        buffer.skip(INTERPOLATION_LEN)?;

        let index = *by_name.entry(name.clone()).or_insert_with(|| {
            tracks.push(BoneTrack {
                name,
                keyframes: Vec::new(),
            });
            tracks.len() - 1
        });
        tracks[index].keyframes.push(keyframe);
    }

    trace!(records = count, bones = tracks.len(), "read vmd bone keyframes");
    Ok(tracks)
}

impl BoneTrack {
    /// Packs the track into one buffer (times, then translations, then rotations) and returns
    /// its translation and rotation channels.
    fn into_channels(mut self, fps: f32) -> [AnimationChannel; 2] {
        self.keyframes.sort_by_key(|k| k.frame);
        let count = self.keyframes.len();

        let mut values = Vec::with_capacity(count * 8);
        values.extend(self.keyframes.iter().map(|k| k.frame as f32 / fps));
        values.extend(self.keyframes.iter().flat_map(|k| k.translation.to_array()));
        values.extend(self.keyframes.iter().flat_map(|k| k.rotation.to_array()));
        let mut data = vec![0u8; values.len() * 4];
        LittleEndian::write_f32_into(&values, &mut data);

        let first = values.first().copied().unwrap_or(0.0);
        let last = values.get(count.saturating_sub(1)).copied().unwrap_or(0.0);
        let view = Arc::new(BufferView::whole(Arc::new(Buffer::new(
            Some(self.name.clone()),
            data,
        ))));
        let accessor = |offset: usize, accessor_type| {
            Arc::new(Accessor::new(
                Some(view.clone()),
                offset,
                ComponentType::Float32,
                accessor_type,
                count,
            ))
        };

        let input = Arc::new(
            Accessor::new(
                Some(view.clone()),
                0,
                ComponentType::Float32,
                AccessorType::Scalar,
                count,
            )
            .with_bounds(Some(vec![first]), Some(vec![last])),
        );
        let translations = accessor(count * 4, AccessorType::Vec3);
        let rotations = accessor(count * 16, AccessorType::Vec4);

        let humanoid = HumanoidTag::from_pmx_local_name(&self.name);
        let channel = |output, path| AnimationChannel {
            sampler: Arc::new(AnimationSampler {
                input: input.clone(),
                output,
                interpolation: Interpolation::Linear,
            }),
            target_node: None,
            target_node_name: Some(self.name.clone()),
            target_humanoid: humanoid,
            path,
        };
        [
            channel(translations, TargetPath::Translation),
            channel(rotations, TargetPath::Rotation),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(text: &[u8]) -> [u8; VMD_SIGNATURE_LEN] {
        let mut field = [0u8; VMD_SIGNATURE_LEN];
        field[..text.len()].copy_from_slice(text);
        field
    }

    #[test]
    fn signature_selects_name_width() {
        assert_eq!(model_name_length(&signature(VMD_SIGNATURE_V1)), Some(10));
        assert_eq!(model_name_length(&signature(VMD_SIGNATURE_V2)), Some(20));
        assert_eq!(model_name_length(&signature(b"Vocaloid Motion Data 0003")), None);
    }

    #[test]
    fn probe_requires_full_signature_field() {
        let decoder = VmdDecoder::new();
        assert!(decoder.probe(&signature(VMD_SIGNATURE_V2)));
        assert!(!decoder.probe(VMD_SIGNATURE_V2));
    }

    #[test]
    fn record_length_matches_layout() {
        assert_eq!(BONE_RECORD_LEN, 111);
    }

    #[test]
    fn track_sorts_keyframes() {
        let key = |frame, x| Keyframe {
            frame,
            translation: Vec3::new(x, 0.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let track = BoneTrack {
            name: "センター".into(),
            keyframes: vec![key(30, 2.0), key(0, 1.0)],
        };
        let [translation, rotation] = track.into_channels(30.0);
        let times: Vec<f32> = translation.sampler.input.read_vec().unwrap();
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(translation.sampler.input.max(), Some(&[1.0][..]));
        let values: Vec<Vec3> = translation.sampler.output.read_vec().unwrap();
        assert_eq!(values[0].x, 1.0);
        assert_eq!(values[1].x, 2.0);
        assert_eq!(rotation.path, TargetPath::Rotation);
        assert!(Arc::ptr_eq(&translation.sampler.input, &rotation.sampler.input));
    }
}
