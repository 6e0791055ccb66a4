/// Default cap on a model or motion file.
pub const DEFAULT_MAX_MODEL_BYTES: u64 = 32 * 1024 * 1024;

/// Default cap on one texture file.
pub const DEFAULT_MAX_TEXTURE_BYTES: u64 = 256 * 1024 * 1024;

/// Limits and unit conventions shared by all decoders.
///
/// ```ignore
/// let options = DecodeOptions::new()
///     .with_max_model_bytes(8 * 1024 * 1024)
///     .with_pmx_unit_scale(0.08);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    max_model_bytes: u64,
    max_texture_bytes: u64,
    pmx_unit_scale: f32,
    vmd_frames_per_second: f32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_model_bytes: DEFAULT_MAX_MODEL_BYTES,
            max_texture_bytes: DEFAULT_MAX_TEXTURE_BYTES,
            pmx_unit_scale: 0.1,
            vmd_frames_per_second: 30.0,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_model_bytes(mut self, bytes: u64) -> Self {
        self.max_model_bytes = bytes;
        self
    }

    pub fn with_max_texture_bytes(mut self, bytes: u64) -> Self {
        self.max_texture_bytes = bytes;
        self
    }

    /// Uniform scale applied as the initial transform of skinned-mesh scenes.
    pub fn with_pmx_unit_scale(mut self, scale: f32) -> Self {
        self.pmx_unit_scale = scale;
        self
    }

    /// Frame rate used to convert motion frame numbers to seconds.
    pub fn with_vmd_frames_per_second(mut self, fps: f32) -> Self {
        self.vmd_frames_per_second = fps;
        self
    }

    pub fn max_model_bytes(&self) -> u64 {
        self.max_model_bytes
    }

    pub fn max_texture_bytes(&self) -> u64 {
        self.max_texture_bytes
    }

    pub fn pmx_unit_scale(&self) -> f32 {
        self.pmx_unit_scale
    }

    pub fn vmd_frames_per_second(&self) -> f32 {
        self.vmd_frames_per_second
    }
}
