//! PMX 2.0/2.1 skinned-mesh decoder.
//!
//! The file is read front to back: header, vertices, surfaces, texture paths, materials and
//! bones. Later sections (morphs, display frames, rigid bodies, joints) are not decoded.
//!
//! The produced scene holds one node per bone (a depth-first bone forest with parent-relative
//! translations), one node per material drawing that material's slice of the shared index
//! buffer, and one skin covering every bone. Triangle winding is flipped from the file's
//! clockwise order to counter-clockwise.

use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Vec3};
use modelkit_core::{
    Accessor, AccessorType, AlphaMode, Attributes, Buffer, BufferView, ComponentType,
    DecodeOptions, DecoderBuffer, HumanoidTag, Material, MaterialKind, Mesh, Metadata,
    ModelError, Node, NodeId, NodeTransform, Primitive, PrimitiveMode, ReferenceKind, Result,
    Sampler, Scene, SessionId, Skin, Texture, TextureInfo, TextureType,
};
use tracing::{debug, trace};

use crate::resource::{read_texture_file, resolve_relative};
use crate::text::TextEncoding;
use crate::traits::{Ability, LoadResult, ModelDecoder};

const PMX_SIGNATURE: &[u8] = b"PMX ";
const PMX_MIN_VERSION: f32 = 2.0;
const PMX_MIN_GLOBALS: usize = 8;
const PMX_MAX_ADDITIONAL_VEC4: u8 = 4;

/// Repacked vertex layout: position, normal, uv, 4 joints, 4 weights.
pub const VERTEX_STRIDE: usize = 64;
const NORMAL_OFFSET: usize = 12;
const TEXCOORD_OFFSET: usize = 24;
const JOINTS_OFFSET: usize = 32;
const WEIGHTS_OFFSET: usize = 48;

// Material drawing flags.
const MATERIAL_NO_CULL: u8 = 0x01;

// Bone flags.
const BONE_TAIL_IS_BONE: u16 = 0x0001;
const BONE_IK: u16 = 0x0020;
const BONE_INHERIT_ROTATION: u16 = 0x0100;
const BONE_INHERIT_TRANSLATION: u16 = 0x0200;
const BONE_FIXED_AXIS: u16 = 0x0400;
const BONE_LOCAL_AXIS: u16 = 0x0800;
const BONE_EXTERNAL_PARENT: u16 = 0x2000;

/// Decoder for PMX models.
#[derive(Debug, Clone, Default)]
pub struct PmxDecoder {
    options: DecodeOptions,
}

impl PmxDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }
}

impl ModelDecoder for PmxDecoder {
    fn name(&self) -> &'static str {
        "pmx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pmx"]
    }

    fn abilities(&self) -> &'static [Ability] {
        &[Ability::Model]
    }

    fn probe_length(&self) -> usize {
        PMX_SIGNATURE.len()
    }

    fn probe(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(PMX_SIGNATURE)
    }

    fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn load_bytes(&self, bytes: &[u8], base_path: &Path) -> Result<LoadResult> {
        let mut buffer = DecoderBuffer::new(bytes, "pmx");
        let header = PmxHeader::read(&mut buffer)?;
        debug!(
            version = header.version,
            encoding = ?header.encoding,
            vertex_index = header.vertex_index_size,
            material_index = header.material_index_size,
            bone_index = header.bone_index_size,
            "decoded pmx header"
        );

        let metadata = Metadata {
            title: Some(header.encoding.read(&mut buffer)?),
            title_universal: Some(header.encoding.read(&mut buffer)?),
            comment: Some(header.encoding.read(&mut buffer)?),
            comment_universal: Some(header.encoding.read(&mut buffer)?),
            ..Metadata::default()
        };

        let vertices = read_vertices(&mut buffer, &header)?;
        let indices = read_indices(&mut buffer, &header, vertices.count)?;
        let textures = read_textures(&mut buffer, &header, base_path, &self.options)?;
        let materials = read_materials(&mut buffer, &header, &textures)?;
        let bones = read_bones(&mut buffer, &header)?;
        vertices.check_joints(bones.len())?;
        if buffer.remaining_size() > 0 {
            trace!(remaining = buffer.remaining_size(), "skipping sections after bones");
        }

        let scene = SceneBuilder::new(&metadata)
            .build(vertices, indices, &materials, &bones)?
            .with_initial_transform(Mat4::from_scale(Vec3::splat(self.options.pmx_unit_scale())));

        Ok(LoadResult {
            metadata: Some(metadata),
            scene: Some(scene),
            animations: Vec::new(),
        })
    }
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone)]
struct PmxHeader {
    version: f32,
    encoding: TextEncoding,
    additional_vec4: usize,
    vertex_index_size: usize,
    texture_index_size: usize,
    material_index_size: usize,
    bone_index_size: usize,
}

impl PmxHeader {
    fn read(buffer: &mut DecoderBuffer<'_>) -> Result<Self> {
        if buffer.decode_slice(PMX_SIGNATURE.len())? != PMX_SIGNATURE {
            return Err(ModelError::SignatureMismatch { format: "pmx" });
        }
        let version = buffer.decode_f32()?;
        if version.is_nan() || version < PMX_MIN_VERSION {
            return Err(ModelError::UnsupportedVersion {
                format: "pmx",
                version,
                minimum: PMX_MIN_VERSION,
            });
        }

        let globals_count = buffer.decode_u8()? as usize;
        if globals_count < PMX_MIN_GLOBALS {
            return Err(ModelError::InvalidHeader {
                field: "globals count",
                value: globals_count as i64,
                allowed: ">= 8",
            });
        }
        let globals = buffer.decode_slice(globals_count)?;
        if globals[1] > PMX_MAX_ADDITIONAL_VEC4 {
            return Err(ModelError::InvalidHeader {
                field: "additional vec4 count",
                value: globals[1] as i64,
                allowed: "0..=4",
            });
        }

        let header = Self {
            version,
            encoding: TextEncoding::from_pmx(globals[0])?,
            additional_vec4: globals[1] as usize,
            vertex_index_size: index_width(globals[2], "vertex index size")?,
            texture_index_size: index_width(globals[3], "texture index size")?,
            material_index_size: index_width(globals[4], "material index size")?,
            bone_index_size: index_width(globals[5], "bone index size")?,
        };
        // Morph and rigid body widths are validated but unused.
        index_width(globals[6], "morph index size")?;
        index_width(globals[7], "rigid body index size")?;
        Ok(header)
    }
}

fn index_width(value: u8, field: &'static str) -> Result<usize> {
    match value {
        1 | 2 | 4 => Ok(value as usize),
        _ => Err(ModelError::InvalidHeader {
            field,
            value: value as i64,
            allowed: "1, 2, 4",
        }),
    }
}

/// Resolves a signed reference where -1 means "none".
fn optional_index(index: i32, kind: ReferenceKind, len: usize) -> Result<Option<usize>> {
    match index {
        -1 => Ok(None),
        i if i >= 0 && (i as usize) < len => Ok(Some(i as usize)),
        i => Err(ModelError::dangling(kind, i, len)),
    }
}

// ============================================================================
// Vertices
// ============================================================================

struct Vertices {
    count: usize,
    data: Vec<u8>,
    min_joint: i32,
    max_joint: i32,
}

impl Vertices {
    fn check_joints(&self, bone_count: usize) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }
        if self.min_joint < -1 {
            return Err(ModelError::dangling(ReferenceKind::Bone, self.min_joint, bone_count));
        }
        if self.max_joint >= 0 && self.max_joint as usize >= bone_count {
            return Err(ModelError::dangling(ReferenceKind::Bone, self.max_joint, bone_count));
        }
        Ok(())
    }
}

fn read_vertices(buffer: &mut DecoderBuffer<'_>, header: &PmxHeader) -> Result<Vertices> {
    let count = buffer.decode_count("vertex")?;
    // Smallest record: position, normal, uv, extra vec4s, deform tag, one bone, edge scale.
    let min_record = 32 + 16 * header.additional_vec4 + 1 + header.bone_index_size + 4;
    match count.checked_mul(min_record) {
        Some(needed) if needed <= buffer.remaining_size() => {}
        _ => {
            return Err(ModelError::bounds(
                "pmx vertices",
                buffer.position(),
                count.saturating_mul(min_record),
                buffer.remaining_size(),
            ))
        }
    }

    let mut data = vec![0u8; count * VERTEX_STRIDE];
    let mut min_joint = i32::MAX;
    let mut max_joint = i32::MIN;

    for record in data.chunks_exact_mut(VERTEX_STRIDE) {
        record[..TEXCOORD_OFFSET].copy_from_slice(buffer.decode_slice(24)?);
        record[TEXCOORD_OFFSET..JOINTS_OFFSET].copy_from_slice(buffer.decode_slice(8)?);
        buffer.skip(16 * header.additional_vec4)?;

        let deform = buffer.decode_u8()?;
        let (joints, weights) = read_deform(buffer, deform, header.bone_index_size)?;
        for (slot, (&joint, &weight)) in joints.iter().zip(weights.iter()).enumerate() {
            min_joint = min_joint.min(joint);
            max_joint = max_joint.max(joint);
            let joint_at = JOINTS_OFFSET + slot * 4;
            let weight_at = WEIGHTS_OFFSET + slot * 4;
            LittleEndian::write_u32(&mut record[joint_at..joint_at + 4], joint.max(0) as u32);
            LittleEndian::write_f32(&mut record[weight_at..weight_at + 4], weight);
        }

        buffer.skip(4)?; // edge scale
    }

    debug!(count, "decoded pmx vertices");
    Ok(Vertices {
        count,
        data,
        min_joint,
        max_joint,
    })
}

/// Reads one deform block and normalizes it to four joint/weight slots. A joint of -1 marks an
/// empty slot and always carries weight 0.
pub fn read_deform(
    buffer: &mut DecoderBuffer<'_>,
    deform: u8,
    bone_index_size: usize,
) -> Result<([i32; 4], [f32; 4])> {
    let mut joints = [-1i32; 4];
    let mut weights = [0f32; 4];

    match deform {
        // BDEF1
        0 => {
            joints[0] = buffer.decode_sized_i32(bone_index_size)?;
            weights[0] = 1.0;
        }
        // BDEF2, SDEF
        1 | 3 => {
            joints[0] = buffer.decode_sized_i32(bone_index_size)?;
            joints[1] = buffer.decode_sized_i32(bone_index_size)?;
            let weight = buffer.decode_f32()?;
            weights[0] = weight;
            weights[1] = 1.0 - weight;
            if deform == 3 {
                buffer.skip(36)?; // C, R0, R1
            }
        }
        // BDEF4, QDEF
        2 | 4 => {
            for joint in joints.iter_mut() {
                *joint = buffer.decode_sized_i32(bone_index_size)?;
            }
            for weight in weights.iter_mut() {
                *weight = buffer.decode_f32()?;
            }
        }
        other => {
            return Err(ModelError::InvalidEnum {
                field: "vertex deform type",
                value: other as i64,
                allowed: "0..=4",
            })
        }
    }

    for (joint, weight) in joints.iter().zip(weights.iter_mut()) {
        if *joint == -1 {
            *weight = 0.0;
        }
    }
    Ok((joints, weights))
}

// ============================================================================
// Surfaces
// ============================================================================

struct Indices {
    count: usize,
    width: usize,
    data: Vec<u8>,
}

/// Reads the surface list, flipping each triangle `(a, b, c)` to `(a, c, b)`.
fn read_indices(
    buffer: &mut DecoderBuffer<'_>,
    header: &PmxHeader,
    vertex_count: usize,
) -> Result<Indices> {
    let count = buffer.decode_count("index")?;
    if count % 3 != 0 {
        return Err(ModelError::Structural(format!(
            "index count {} is not a multiple of 3",
            count
        )));
    }
    let width = header.vertex_index_size;
    let length = count.checked_mul(width).ok_or_else(|| {
        ModelError::bounds("pmx indices", buffer.position(), usize::MAX, buffer.remaining_size())
    })?;
    let source = buffer.decode_slice(length)?;

    let mut data = vec![0u8; length];
    for (src, dst) in source
        .chunks_exact(width * 3)
        .zip(data.chunks_exact_mut(width * 3))
    {
        let a = read_vertex_index(&src[..width], vertex_count)?;
        let b = read_vertex_index(&src[width..2 * width], vertex_count)?;
        let c = read_vertex_index(&src[2 * width..], vertex_count)?;
        for (slot, index) in [a, c, b].into_iter().enumerate() {
            write_index(&mut dst[slot * width..(slot + 1) * width], index);
        }
    }

    debug!(count, width, "decoded pmx surfaces");
    Ok(Indices { count, width, data })
}

fn read_vertex_index(bytes: &[u8], vertex_count: usize) -> Result<u32> {
    let index: i64 = match bytes.len() {
        1 => bytes[0] as i64,
        2 => LittleEndian::read_u16(bytes) as i64,
        _ => LittleEndian::read_i32(bytes) as i64,
    };
    if index < 0 || index as usize >= vertex_count {
        return Err(ModelError::dangling(ReferenceKind::Vertex, index, vertex_count));
    }
    Ok(index as u32)
}

fn write_index(out: &mut [u8], index: u32) {
    match out.len() {
        1 => out[0] = index as u8,
        2 => LittleEndian::write_u16(out, index as u16),
        _ => LittleEndian::write_u32(out, index),
    }
}

// ============================================================================
// Textures and materials
// ============================================================================

fn read_textures(
    buffer: &mut DecoderBuffer<'_>,
    header: &PmxHeader,
    base_path: &Path,
    options: &DecodeOptions,
) -> Result<Vec<Arc<Texture>>> {
    let count = buffer.decode_count("texture")?;
    let mut textures = Vec::new();
    for _ in 0..count {
        let reference = header.encoding.read(buffer)?;
        let path = resolve_relative(base_path, &reference);
        let texture_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(TextureType::Unknown, TextureType::from_extension);
        let data = read_texture_file(&path, options.max_texture_bytes())?;
        trace!(path = %path.display(), ?texture_type, "loaded texture");
        textures.push(Arc::new(Texture {
            name: Some(reference),
            data: Arc::new(BufferView::whole(Arc::new(data))),
            sampler: Sampler::default(),
            texture_type,
        }));
    }
    debug!(count, "decoded pmx textures");
    Ok(textures)
}

struct PmxMaterial {
    material: Arc<Material>,
    surface_count: usize,
}

fn read_materials(
    buffer: &mut DecoderBuffer<'_>,
    header: &PmxHeader,
    textures: &[Arc<Texture>],
) -> Result<Vec<PmxMaterial>> {
    let count = buffer.decode_count("material")?;
    let texture_width = header.texture_index_size;
    let mut materials = Vec::new();

    for _ in 0..count {
        let name = header.encoding.read(buffer)?;
        let _name_universal = header.encoding.read(buffer)?;
        let diffuse = buffer.decode_vec4()?;
        buffer.skip(12 + 4 + 12)?; // specular, specular strength, ambient
        let flags = buffer.decode_u8()?;
        buffer.skip(16 + 4)?; // edge colour, edge size

        let texture = optional_index(
            buffer.decode_sized_i32(texture_width)?,
            ReferenceKind::Texture,
            textures.len(),
        )?;
        optional_index(
            buffer.decode_sized_i32(texture_width)?,
            ReferenceKind::Texture,
            textures.len(),
        )?;
        buffer.skip(1)?; // environment blend mode
        match buffer.decode_u8()? {
            0 => {
                optional_index(
                    buffer.decode_sized_i32(texture_width)?,
                    ReferenceKind::Texture,
                    textures.len(),
                )?;
            }
            1 => buffer.skip(1)?,
            other => {
                return Err(ModelError::InvalidEnum {
                    field: "toon reference",
                    value: other as i64,
                    allowed: "0 (texture), 1 (shared)",
                })
            }
        }
        let _memo = header.encoding.read(buffer)?;
        let surface_count = buffer.decode_count("material surface")?;

        materials.push(PmxMaterial {
            material: Arc::new(Material {
                name: Some(name),
                base_color_factor: diffuse.to_array(),
                base_color_texture: texture.map(|t| TextureInfo {
                    texture: textures[t].clone(),
                    texcoord: 0,
                }),
                alpha_mode: if diffuse.w < 1.0 {
                    AlphaMode::Blend
                } else {
                    AlphaMode::Opaque
                },
                alpha_cutoff: 0.5,
                double_sided: flags & MATERIAL_NO_CULL != 0,
                kind: MaterialKind::Unlit,
            }),
            surface_count,
        });
    }

    debug!(count, "decoded pmx materials");
    Ok(materials)
}

// ============================================================================
// Bones
// ============================================================================

#[derive(Debug, Clone)]
struct PmxBone {
    name: String,
    name_universal: String,
    position: Vec3,
    parent: Option<usize>,
}

fn read_bones(buffer: &mut DecoderBuffer<'_>, header: &PmxHeader) -> Result<Vec<PmxBone>> {
    let count = buffer.decode_count("bone")?;
    let width = header.bone_index_size;
    let mut raw = Vec::new();

    for _ in 0..count {
        let name = header.encoding.read(buffer)?;
        let name_universal = header.encoding.read(buffer)?;
        let position = buffer.decode_vec3()?;
        let parent = buffer.decode_sized_i32(width)?;
        buffer.skip(4)?; // deform layer
        let flags = buffer.decode_u16()?;

        if flags & BONE_TAIL_IS_BONE != 0 {
            buffer.skip(width)?;
        } else {
            buffer.skip(12)?;
        }
        if flags & (BONE_INHERIT_ROTATION | BONE_INHERIT_TRANSLATION) != 0 {
            buffer.skip(width + 4)?;
        }
        if flags & BONE_FIXED_AXIS != 0 {
            buffer.skip(12)?;
        }
        if flags & BONE_LOCAL_AXIS != 0 {
            buffer.skip(24)?;
        }
        if flags & BONE_EXTERNAL_PARENT != 0 {
            buffer.skip(4)?;
        }
        if flags & BONE_IK != 0 {
            buffer.skip(width + 4 + 4)?; // target, loop count, limit angle
            let links = buffer.decode_count("ik link")?;
            for _ in 0..links {
                buffer.skip(width)?;
                if buffer.decode_u8()? != 0 {
                    buffer.skip(24)?; // lower and upper angle limits
                }
            }
        }

        raw.push((name, name_universal, position, parent));
    }

    let bones = raw
        .into_iter()
        .enumerate()
        .map(|(index, (name, name_universal, position, parent))| {
            let parent = optional_index(parent, ReferenceKind::Bone, count)?;
            if parent == Some(index) {
                return Err(ModelError::CyclicGraph {
                    kind: ReferenceKind::Bone,
                    index,
                });
            }
            Ok(PmxBone {
                name,
                name_universal,
                position,
                parent,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(count, "decoded pmx bones");
    Ok(bones)
}

/// Orders bones depth-first from the roots. Bones not reachable from any root sit on a parent
/// cycle.
fn bone_forest(bones: &[PmxBone]) -> Result<(Vec<usize>, Vec<Vec<usize>>, Vec<usize>)> {
    let mut children = vec![Vec::new(); bones.len()];
    let mut roots = Vec::new();
    for (index, bone) in bones.iter().enumerate() {
        match bone.parent {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut order = Vec::with_capacity(bones.len());
    let mut visited = vec![false; bones.len()];
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        visited[index] = true;
        order.push(index);
        stack.extend(children[index].iter().rev().copied());
    }

    if let Some(index) = visited.iter().position(|v| !v) {
        return Err(ModelError::CyclicGraph {
            kind: ReferenceKind::Bone,
            index,
        });
    }
    Ok((roots, children, order))
}

// ============================================================================
// Scene assembly
// ============================================================================

struct SceneBuilder {
    name: Option<String>,
    session: SessionId,
}

impl SceneBuilder {
    fn new(metadata: &Metadata) -> Self {
        Self {
            name: metadata.title.clone(),
            session: SessionId::new(),
        }
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId::new(self.session, index as u32)
    }

    fn build(
        self,
        vertices: Vertices,
        indices: Indices,
        materials: &[PmxMaterial],
        bones: &[PmxBone],
    ) -> Result<Scene> {
        let (root_bones, children, order) = bone_forest(bones)?;
        let skin = Arc::new(self.build_skin(bones)?);

        let mut nodes = Vec::with_capacity(bones.len() + materials.len());
        for &index in &order {
            let bone = &bones[index];
            let translation = match bone.parent {
                Some(parent) => bone.position - bones[parent].position,
                None => bone.position,
            };
            let mut node = Node::new(self.node_id(index), Some(bone.name.clone()));
            node.transform = Some(NodeTransform::from_translation(translation));
            node.children = children[index].iter().map(|&c| self.node_id(c)).collect();
            nodes.push(node);
        }

        let attributes = self.vertex_attributes(vertices)?;
        let index_count = indices.count;
        let index_width = indices.width;
        let index_view = Arc::new(BufferView::whole(Arc::new(Buffer::new(
            Some("indices".into()),
            indices.data,
        ))));
        let index_type = ComponentType::unsigned_of_width(index_width).ok_or(
            ModelError::InvalidHeader {
                field: "vertex index size",
                value: index_width as i64,
                allowed: "1, 2, 4",
            },
        )?;

        let mut roots = Vec::with_capacity(materials.len() + root_bones.len());
        let mut start = 0usize;
        for (m, material) in materials.iter().enumerate() {
            let end = start + material.surface_count;
            if end > index_count {
                return Err(ModelError::Structural(format!(
                    "material {} draws indices {}..{} but only {} exist",
                    m, start, end, index_count
                )));
            }
            let slice = Accessor::new(
                Some(index_view.clone()),
                start * index_width,
                index_type,
                AccessorType::Scalar,
                material.surface_count,
            );
            slice.validate()?;
            let mesh = Mesh {
                name: material.material.name.clone(),
                primitives: vec![Primitive {
                    mode: PrimitiveMode::Triangles,
                    material: material.material.clone(),
                    attributes: attributes.clone(),
                    indices: Some(Arc::new(slice)),
                }],
            };
            let id = self.node_id(bones.len() + m);
            let mut node = Node::new(id, material.material.name.clone());
            node.mesh = Some(Arc::new(mesh));
            node.skin = Some(skin.clone());
            nodes.push(node);
            roots.push(id);
            start = end;
        }
        if start != index_count {
            return Err(ModelError::Structural(format!(
                "materials draw {} indices but the model has {}",
                start, index_count
            )));
        }

        roots.extend(root_bones.iter().map(|&b| self.node_id(b)));
        debug!(
            bones = bones.len(),
            materials = materials.len(),
            roots = roots.len(),
            "built pmx scene"
        );
        Ok(Scene::new(self.name.clone(), nodes, roots, vec![skin]))
    }

    fn build_skin(&self, bones: &[PmxBone]) -> Result<Skin> {
        let joints = (0..bones.len()).map(|i| self.node_id(i)).collect();
        let inverse_bind_matrices = bones
            .iter()
            .map(|b| Mat4::from_translation(-b.position))
            .collect();
        let tags = bones
            .iter()
            .map(|b| HumanoidTag::from_pmx_names(&b.name, &b.name_universal))
            .collect();
        Skin::new(self.name.clone(), joints, None, Some(inverse_bind_matrices), tags)
    }

    fn vertex_attributes(&self, vertices: Vertices) -> Result<Attributes> {
        let count = vertices.count;
        let buffer = Arc::new(Buffer::new(Some("vertices".into()), vertices.data));
        let length = buffer.len();
        let view = Arc::new(BufferView::new(buffer, 0, length, VERTEX_STRIDE)?);
        let accessor = |offset, component_type, accessor_type| {
            Arc::new(Accessor::new(
                Some(view.clone()),
                offset,
                component_type,
                accessor_type,
                count,
            ))
        };

        let mut attributes =
            Attributes::new(accessor(0, ComponentType::Float32, AccessorType::Vec3));
        attributes.normal = Some(accessor(
            NORMAL_OFFSET,
            ComponentType::Float32,
            AccessorType::Vec3,
        ));
        attributes.texcoords = vec![accessor(
            TEXCOORD_OFFSET,
            ComponentType::Float32,
            AccessorType::Vec2,
        )];
        attributes.joints = vec![accessor(
            JOINTS_OFFSET,
            ComponentType::Uint32,
            AccessorType::Vec4,
        )];
        attributes.weights = vec![accessor(
            WEIGHTS_OFFSET,
            ComponentType::Float32,
            AccessorType::Vec4,
        )];
        trace!(count, "built vertex attributes");
        Ok(attributes)
    }
}
