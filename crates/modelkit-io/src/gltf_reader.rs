//! glTF 2.0 decoder for `.gltf` JSON documents and `.glb` binary containers.
//!
//! The document is resolved in dependency order: buffers, buffer views, accessors, samplers,
//! images, textures, materials, meshes, skins, nodes, scenes and animations. Each stage only
//! looks up entries built by earlier stages and fails on the first out-of-range index.
//!
//! Supported:
//! - GLB containers with a JSON chunk and an optional BIN chunk backing buffer 0
//! - base64 `data:` URIs for buffers and images
//! - `KHR_materials_unlit`
//! - VRM 0.x (`VRM`) and VRM 1.0 (`VRMC_vrm`) humanoid bone maps and metadata
//!
//! Any other external URI fails with [`ModelError::UnsupportedReference`].
//!
//! # Example
//!
//! ```ignore
//! use modelkit_io::{GltfDecoder, ModelDecoder};
//!
//! let result = GltfDecoder::new().load(Path::new("avatar.vrm"), Path::new("."))?;
//! let scene = result.scene.unwrap();
//! for (depth, node) in scene.depth_first() {
//!     println!("{:indent$}{:?}", "", node.name, indent = depth * 2);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Quat, Vec3};
use modelkit_core::error::lookup;
use modelkit_core::{
    Accessor, AccessorType, AlphaMode, Animation, AnimationChannel, AnimationSampler, Attributes,
    Buffer, BufferView, ComponentType, DecodeOptions, DecoderBuffer, Filter, HumanoidTag,
    Interpolation, Material, MaterialKind, Mesh, Metadata, ModelError, Node, NodeId,
    NodeTransform, Primitive, PrimitiveMode, ReferenceKind, Result, Sampler, Scene, SessionId,
    Skin, TargetPath, Texture, TextureInfo, TextureType, Wrap,
};
use tracing::{debug, trace, warn};

use crate::gltf_json as json;
use crate::traits::{Ability, LoadResult, ModelDecoder};

// ============================================================================
// GLB Binary Format Constants
// ============================================================================

const GLB_MAGIC: u32 = 0x46546C67; // "glTF" in little-endian
const GLB_VERSION: u32 = 2;
const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"
const GLB_HEADER_LEN: usize = 12;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ============================================================================
// GltfDecoder
// ============================================================================

/// Decoder for glTF 2.0 documents, including VRM avatars.
#[derive(Debug, Clone, Default)]
pub struct GltfDecoder {
    options: DecodeOptions,
}

impl GltfDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decodes a parsed document. `bin` backs buffer 0 when that buffer has no URI.
    pub fn decode_document(&self, doc: &json::GltfRoot, bin: Option<&[u8]>) -> Result<LoadResult> {
        check_asset_version(&doc.asset)?;

        let mut cx = BuildContext::new(doc);
        cx.build_buffers(bin)?;
        cx.build_buffer_views()?;
        cx.build_accessors()?;
        cx.build_samplers()?;
        cx.build_images()?;
        cx.build_textures()?;
        cx.build_materials()?;
        cx.build_meshes()?;
        cx.build_humanoid_map()?;
        cx.build_skins()?;
        cx.build_nodes()?;
        let animations = cx.build_animations()?;
        let metadata = cx.build_metadata()?;
        let scene = cx.build_scene()?;

        Ok(LoadResult {
            metadata: (!metadata.is_empty()).then_some(metadata),
            scene: Some(scene),
            animations,
        })
    }
}

impl ModelDecoder for GltfDecoder {
    fn name(&self) -> &'static str {
        "gltf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb", "vrm"]
    }

    fn abilities(&self) -> &'static [Ability] {
        &[Ability::Model, Ability::Animation]
    }

    fn probe_length(&self) -> usize {
        4
    }

    fn probe(&self, bytes: &[u8]) -> bool {
        if is_glb(bytes) {
            return true;
        }
        let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        text.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{')
    }

    fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn load_bytes(&self, bytes: &[u8], _base_path: &Path) -> Result<LoadResult> {
        let (json_bytes, bin) = if is_glb(bytes) {
            split_glb(bytes)?
        } else {
            (bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes), None)
        };
        let doc: json::GltfRoot = serde_json::from_slice(json_bytes)
            .map_err(|e| ModelError::InvalidDocument(e.to_string()))?;
        self.decode_document(&doc, bin)
    }
}

fn is_glb(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && LittleEndian::read_u32(&bytes[..4]) == GLB_MAGIC
}

/// Splits a GLB container into its JSON chunk and optional BIN chunk.
pub fn split_glb(data: &[u8]) -> Result<(&[u8], Option<&[u8]>)> {
    let mut header = DecoderBuffer::new(data, "glb header");
    if header.decode_u32()? != GLB_MAGIC {
        return Err(ModelError::SignatureMismatch { format: "glb" });
    }
    let version = header.decode_u32()?;
    if version != GLB_VERSION {
        return Err(ModelError::InvalidHeader {
            field: "glb version",
            value: version as i64,
            allowed: "2",
        });
    }
    let length = header.decode_u32()? as usize;
    if length > data.len() || length < GLB_HEADER_LEN {
        return Err(ModelError::bounds("glb container", 0, length, data.len()));
    }

    let mut chunks = DecoderBuffer::new(&data[..length], "glb chunk");
    chunks.set_position(GLB_HEADER_LEN)?;
    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;

    while chunks.remaining_size() >= 8 {
        let chunk_length = chunks.decode_u32()? as usize;
        let chunk_type = chunks.decode_u32()?;
        let chunk = chunks.decode_slice(chunk_length)?;
        match chunk_type {
            GLB_CHUNK_JSON if json_chunk.is_none() => json_chunk = Some(chunk),
            GLB_CHUNK_BIN if bin_chunk.is_none() => bin_chunk = Some(chunk),
            other => warn!(chunk_type = other, len = chunk_length, "skipping glb chunk"),
        }
    }

    let json_chunk =
        json_chunk.ok_or_else(|| ModelError::Structural("glb has no JSON chunk".into()))?;
    debug!(
        json = json_chunk.len(),
        bin = bin_chunk.map_or(0, <[u8]>::len),
        "split glb container"
    );
    Ok((json_chunk, bin_chunk))
}

fn check_asset_version(asset: &json::Asset) -> Result<()> {
    let Some(version) = asset.version.as_deref() else {
        return Ok(());
    };
    let parsed: f32 = version
        .parse()
        .map_err(|_| ModelError::InvalidDocument(format!("bad asset version {:?}", version)))?;
    if parsed < 2.0 {
        return Err(ModelError::UnsupportedVersion {
            format: "gltf",
            version: parsed,
            minimum: 2.0,
        });
    }
    Ok(())
}

// ============================================================================
// Build context
// ============================================================================

enum NodeSlot {
    Pending,
    Building,
    Built(Node),
}

struct ImageData {
    name: Option<String>,
    data: Arc<BufferView>,
    texture_type: TextureType,
}

/// Everything resolved so far during one decode.
struct BuildContext<'a> {
    doc: &'a json::GltfRoot,
    session: SessionId,
    buffers: Vec<Arc<Buffer>>,
    views: Vec<Arc<BufferView>>,
    accessors: Vec<Arc<Accessor>>,
    samplers: Vec<Sampler>,
    images: Vec<ImageData>,
    textures: Vec<Arc<Texture>>,
    materials: Vec<Arc<Material>>,
    default_material: Arc<Material>,
    meshes: Vec<Arc<Mesh>>,
    humanoid: HashMap<usize, HumanoidTag>,
    skins: Vec<Arc<Skin>>,
    nodes: Vec<NodeSlot>,
    parents: Vec<Option<usize>>,
}

impl<'a> BuildContext<'a> {
    fn new(doc: &'a json::GltfRoot) -> Self {
        let node_count = doc.nodes.len();
        Self {
            doc,
            session: SessionId::new(),
            buffers: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
            samplers: Vec::new(),
            images: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            default_material: Arc::new(Material::default()),
            meshes: Vec::new(),
            humanoid: HashMap::new(),
            skins: Vec::new(),
            nodes: (0..node_count).map(|_| NodeSlot::Pending).collect(),
            parents: vec![None; node_count],
        }
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId::new(self.session, index as u32)
    }

    fn check_node(&self, index: usize) -> Result<()> {
        lookup(&self.doc.nodes, ReferenceKind::Node, index).map(|_| ())
    }

    fn build_buffers(&mut self, bin: Option<&[u8]>) -> Result<()> {
        for (i, buffer) in self.doc.buffers.iter().enumerate() {
            let data = match (&buffer.uri, bin) {
                (None, Some(bin)) if i == 0 => bin.to_vec(),
                (None, None) if i == 0 => {
                    return Err(ModelError::Structural(
                        "buffer 0 has no URI and there is no BIN chunk".into(),
                    ))
                }
                (None, _) => {
                    return Err(ModelError::InvalidDocument(format!(
                        "buffer {} has no URI and is not buffer 0",
                        i
                    )))
                }
                (Some(uri), _) if uri.starts_with("data:") => decode_data_uri(uri)?.1,
                (Some(uri), _) => {
                    return Err(ModelError::UnsupportedReference(format!(
                        "external buffer {:?}",
                        uri
                    )))
                }
            };
            if data.len() < buffer.byte_length {
                return Err(ModelError::bounds(
                    format!("buffer {}", i),
                    0,
                    buffer.byte_length,
                    data.len(),
                ));
            }
            self.buffers.push(Arc::new(Buffer::new(buffer.name.clone(), data)));
        }
        debug!(count = self.buffers.len(), "decoded buffers");
        Ok(())
    }

    fn build_buffer_views(&mut self) -> Result<()> {
        for view in &self.doc.buffer_views {
            let buffer = lookup(&self.buffers, ReferenceKind::Buffer, view.buffer)?;
            self.views.push(Arc::new(BufferView::new(
                buffer.clone(),
                view.byte_offset,
                view.byte_length,
                view.byte_stride.unwrap_or(0),
            )?));
        }
        debug!(count = self.views.len(), "decoded buffer views");
        Ok(())
    }

    fn build_accessors(&mut self) -> Result<()> {
        for accessor in &self.doc.accessors {
            let view = accessor
                .buffer_view
                .map(|v| lookup(&self.views, ReferenceKind::BufferView, v).cloned())
                .transpose()?;
            let built = Accessor::new(
                view,
                accessor.byte_offset,
                ComponentType::from_gl(accessor.component_type)?,
                AccessorType::parse(&accessor.accessor_type)?,
                accessor.count,
            )
            .with_name(accessor.name.clone())
            .with_normalized(accessor.normalized)
            .with_bounds(accessor.min.clone(), accessor.max.clone());
            built.validate()?;
            self.accessors.push(Arc::new(built));
        }
        debug!(count = self.accessors.len(), "decoded accessors");
        Ok(())
    }

    fn build_samplers(&mut self) -> Result<()> {
        let defaults = Sampler::default();
        for sampler in &self.doc.samplers {
            self.samplers.push(Sampler {
                mag_filter: gl_enum(sampler.mag_filter, Filter::from_gl, defaults.mag_filter, "magFilter")?,
                min_filter: gl_enum(sampler.min_filter, Filter::from_gl, defaults.min_filter, "minFilter")?,
                wrap_s: gl_enum(sampler.wrap_s, Wrap::from_gl, defaults.wrap_s, "wrapS")?,
                wrap_t: gl_enum(sampler.wrap_t, Wrap::from_gl, defaults.wrap_t, "wrapT")?,
            });
        }
        Ok(())
    }

    fn build_images(&mut self) -> Result<()> {
        for (i, image) in self.doc.images.iter().enumerate() {
            let declared = image.mime_type.as_deref().map(TextureType::from_mime);
            let (data, texture_type) = match (image.buffer_view, &image.uri) {
                (Some(view), _) => (
                    lookup(&self.views, ReferenceKind::BufferView, view)?.clone(),
                    declared.unwrap_or(TextureType::Unknown),
                ),
                (None, Some(uri)) if uri.starts_with("data:") => {
                    let (mime, bytes) = decode_data_uri(uri)?;
                    let buffer = Arc::new(Buffer::new(image.name.clone(), bytes));
                    let texture_type = declared
                        .or_else(|| mime.as_deref().map(TextureType::from_mime))
                        .unwrap_or(TextureType::Unknown);
                    (Arc::new(BufferView::whole(buffer)), texture_type)
                }
                (None, Some(uri)) => {
                    return Err(ModelError::UnsupportedReference(format!(
                        "external image {:?}",
                        uri
                    )))
                }
                (None, None) => {
                    return Err(ModelError::InvalidDocument(format!(
                        "image {} has neither uri nor bufferView",
                        i
                    )))
                }
            };
            self.images.push(ImageData {
                name: image.name.clone(),
                data,
                texture_type,
            });
        }
        Ok(())
    }

    fn build_textures(&mut self) -> Result<()> {
        for (i, texture) in self.doc.textures.iter().enumerate() {
            let source = texture.source.ok_or_else(|| {
                ModelError::InvalidDocument(format!("texture {} has no source image", i))
            })?;
            let image = lookup(&self.images, ReferenceKind::Image, source)?;
            let sampler = match texture.sampler {
                Some(s) => lookup(&self.samplers, ReferenceKind::Sampler, s)?.clone(),
                None => Sampler::default(),
            };
            self.textures.push(Arc::new(Texture {
                name: texture.name.clone().or_else(|| image.name.clone()),
                data: image.data.clone(),
                sampler,
                texture_type: image.texture_type,
            }));
        }
        debug!(images = self.images.len(), textures = self.textures.len(), "decoded textures");
        Ok(())
    }

    fn texture_info(&self, reference: &json::TextureRef) -> Result<TextureInfo> {
        Ok(TextureInfo {
            texture: lookup(&self.textures, ReferenceKind::Texture, reference.index)?.clone(),
            texcoord: reference.tex_coord,
        })
    }

    fn build_materials(&mut self) -> Result<()> {
        let mut materials = Vec::with_capacity(self.doc.materials.len());
        for material in &self.doc.materials {
            let pbr = material.pbr_metallic_roughness.as_ref();
            let base_color_texture = pbr
                .and_then(|p| p.base_color_texture.as_ref())
                .map(|r| self.texture_info(r))
                .transpose()?;
            let kind = if material.extensions.unlit.is_some() {
                MaterialKind::Unlit
            } else {
                MaterialKind::Pbr {
                    metallic_factor: pbr.and_then(|p| p.metallic_factor).unwrap_or(1.0),
                    roughness_factor: pbr.and_then(|p| p.roughness_factor).unwrap_or(1.0),
                    metallic_roughness_texture: pbr
                        .and_then(|p| p.metallic_roughness_texture.as_ref())
                        .map(|r| self.texture_info(r))
                        .transpose()?,
                }
            };
            materials.push(Arc::new(Material {
                name: material.name.clone(),
                base_color_factor: pbr.and_then(|p| p.base_color_factor).unwrap_or([1.0; 4]),
                base_color_texture,
                alpha_mode: parse_alpha_mode(material.alpha_mode.as_deref())?,
                alpha_cutoff: material.alpha_cutoff.unwrap_or(0.5),
                double_sided: material.double_sided,
                kind,
            }));
        }
        self.materials = materials;
        debug!(count = self.materials.len(), "decoded materials");
        Ok(())
    }

    fn build_meshes(&mut self) -> Result<()> {
        let mut meshes = Vec::with_capacity(self.doc.meshes.len());
        for (mesh_index, mesh) in self.doc.meshes.iter().enumerate() {
            let primitives = mesh
                .primitives
                .iter()
                .enumerate()
                .map(|(i, p)| self.build_primitive(mesh_index, i, p))
                .collect::<Result<Vec<_>>>()?;
            meshes.push(Arc::new(Mesh {
                name: mesh.name.clone(),
                primitives,
            }));
        }
        self.meshes = meshes;
        debug!(count = self.meshes.len(), "decoded meshes");
        Ok(())
    }

    fn build_primitive(
        &self,
        mesh_index: usize,
        primitive_index: usize,
        primitive: &json::Primitive,
    ) -> Result<Primitive> {
        let mut position = None;
        let mut normal = None;
        let mut tangent = None;
        let mut sets: [BTreeMap<u32, Arc<Accessor>>; 4] = Default::default();

        for (semantic, &index) in &primitive.attributes {
            let accessor = lookup(&self.accessors, ReferenceKind::Accessor, index)?.clone();
            match semantic.as_str() {
                "POSITION" => position = Some(accessor),
                "NORMAL" => normal = Some(accessor),
                "TANGENT" => tangent = Some(accessor),
                other => match split_indexed_semantic(other) {
                    Some((bucket, set)) => {
                        sets[bucket].insert(set, accessor);
                    }
                    None => warn!(
                        semantic = other,
                        mesh = mesh_index,
                        primitive = primitive_index,
                        "ignoring attribute"
                    ),
                },
            }
        }

        let position = position.ok_or_else(|| {
            ModelError::MissingAttribute(format!(
                "mesh {} primitive {} has no POSITION",
                mesh_index, primitive_index
            ))
        })?;
        let [texcoords, colors, joints, weights] = sets;
        let mut attributes = Attributes::new(position);
        attributes.normal = normal;
        attributes.tangent = tangent;
        attributes.texcoords = dense_set(INDEXED_SEMANTICS[0], texcoords)?;
        attributes.colors = dense_set(INDEXED_SEMANTICS[1], colors)?;
        attributes.joints = dense_set(INDEXED_SEMANTICS[2], joints)?;
        attributes.weights = dense_set(INDEXED_SEMANTICS[3], weights)?;

        let material = match primitive.material {
            Some(m) => lookup(&self.materials, ReferenceKind::Material, m)?.clone(),
            None => self.default_material.clone(),
        };
        let indices = primitive
            .indices
            .map(|i| lookup(&self.accessors, ReferenceKind::Accessor, i).cloned())
            .transpose()?;

        Ok(Primitive {
            mode: PrimitiveMode::from_gl(primitive.mode.unwrap_or(4))?,
            material,
            attributes,
            indices,
        })
    }

    /// Collects the VRM humanoid map, preferring the VRM 0.x schema when both are present.
    fn build_humanoid_map(&mut self) -> Result<()> {
        let extensions = &self.doc.extensions;
        let vrm0 = extensions.vrm0.as_ref().and_then(|v| v.humanoid.as_ref());
        let vrm1 = extensions.vrm1.as_ref().and_then(|v| v.humanoid.as_ref());

        let mut map = HashMap::new();
        if let Some(humanoid) = vrm0 {
            for bone in &humanoid.human_bones {
                let Some(node) = bone.node else { continue };
                self.check_node(node)?;
                match HumanoidTag::from_vrm0_name(&bone.bone) {
                    Some(tag) => {
                        map.insert(node, tag);
                    }
                    None => warn!(bone = %bone.bone, "unknown VRM 0.x humanoid bone"),
                }
            }
        } else if let Some(humanoid) = vrm1 {
            for (name, bone) in &humanoid.human_bones {
                self.check_node(bone.node)?;
                match HumanoidTag::from_vrm1_name(name) {
                    Some(tag) => {
                        map.insert(bone.node, tag);
                    }
                    None => warn!(bone = %name, "unknown VRM 1.0 humanoid bone"),
                }
            }
        }
        if !map.is_empty() {
            debug!(bones = map.len(), "decoded humanoid map");
        }
        self.humanoid = map;
        Ok(())
    }

    fn build_skins(&mut self) -> Result<()> {
        let mut skins = Vec::with_capacity(self.doc.skins.len());
        for (i, skin) in self.doc.skins.iter().enumerate() {
            if skin.joints.is_empty() {
                return Err(ModelError::SkinValidation(format!("skin {} has no joints", i)));
            }
            let mut joints = Vec::with_capacity(skin.joints.len());
            for &joint in &skin.joints {
                self.check_node(joint)?;
                joints.push(self.node_id(joint));
            }
            let skeleton = skin
                .skeleton
                .map(|s| self.check_node(s).map(|_| self.node_id(s)))
                .transpose()?;
            let inverse_bind_matrices = skin
                .inverse_bind_matrices
                .map(|a| self.inverse_bind_matrices(i, a, joints.len()))
                .transpose()?;
            let tags = skin
                .joints
                .iter()
                .map(|j| self.humanoid.get(j).copied())
                .collect();
            skins.push(Arc::new(Skin::new(
                skin.name.clone(),
                joints,
                skeleton,
                inverse_bind_matrices,
                tags,
            )?));
        }
        self.skins = skins;
        debug!(count = self.skins.len(), "decoded skins");
        Ok(())
    }

    fn inverse_bind_matrices(&self, skin: usize, index: usize, joints: usize) -> Result<Vec<Mat4>> {
        let accessor = lookup(&self.accessors, ReferenceKind::Accessor, index)?;
        if accessor.component_type() != ComponentType::Float32
            || accessor.accessor_type() != AccessorType::Mat4
        {
            return Err(ModelError::SkinValidation(format!(
                "skin {} inverse bind matrices must be float MAT4, found {:?} {:?}",
                skin,
                accessor.component_type(),
                accessor.accessor_type()
            )));
        }
        if accessor.count() != joints {
            return Err(ModelError::SkinValidation(format!(
                "skin {} has {} joints but {} inverse bind matrices",
                skin,
                joints,
                accessor.count()
            )));
        }
        accessor.read_vec::<Mat4>()
    }

    fn build_nodes(&mut self) -> Result<()> {
        for index in 0..self.nodes.len() {
            self.build_node(index)?;
        }
        debug!(count = self.nodes.len(), "decoded nodes");
        Ok(())
    }

    /// Builds node `root` and its subtree once, walking children with an explicit stack so deep
    /// hierarchies do not exhaust the call stack. Reaching a node that is still being built
    /// means the hierarchy has a cycle.
    fn build_node(&mut self, root: usize) -> Result<()> {
        if !matches!(self.nodes[root], NodeSlot::Pending) {
            return Ok(());
        }
        self.nodes[root] = NodeSlot::Building;

        let doc = self.doc;
        // (node index, position of the next child to visit)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(&(index, next)) = stack.last() {
            let Some(&child) = doc.nodes[index].children.get(next) else {
                stack.pop();
                self.finish_node(index)?;
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            self.check_node(child)?;
            if let NodeSlot::Building = self.nodes[child] {
                return Err(ModelError::CyclicGraph {
                    kind: ReferenceKind::Node,
                    index: child,
                });
            }
            if let Some(parent) = self.parents[child] {
                return Err(ModelError::Structural(format!(
                    "node {} is a child of both node {} and node {}",
                    child, parent, index
                )));
            }
            self.parents[child] = Some(index);
            if let NodeSlot::Pending = self.nodes[child] {
                self.nodes[child] = NodeSlot::Building;
                stack.push((child, 0));
            }
        }
        Ok(())
    }

    /// Assembles node `index` once all of its children are built.
    fn finish_node(&mut self, index: usize) -> Result<()> {
        let source = &self.doc.nodes[index];
        let mut node = Node::new(self.node_id(index), source.name.clone());
        node.transform = node_transform(source);
        node.mesh = source
            .mesh
            .map(|m| lookup(&self.meshes, ReferenceKind::Mesh, m).cloned())
            .transpose()?;
        node.skin = source
            .skin
            .map(|s| lookup(&self.skins, ReferenceKind::Skin, s).cloned())
            .transpose()?;
        node.children = source.children.iter().map(|&c| self.node_id(c)).collect();

        trace!(index, name = ?node.name, children = node.children.len(), "built node");
        self.nodes[index] = NodeSlot::Built(node);
        Ok(())
    }

    /// Builds the default scene, after checking the root lists of every scene.
    fn build_scene(&mut self) -> Result<Scene> {
        let doc = self.doc;
        let (name, roots) = if doc.scenes.is_empty() {
            if let Some(index) = doc.scene {
                return Err(ModelError::dangling(ReferenceKind::Scene, index as i64, 0));
            }
            let roots: Vec<usize> = (0..doc.nodes.len())
                .filter(|&i| self.parents[i].is_none())
                .collect();
            (None, roots)
        } else {
            for (i, scene) in doc.scenes.iter().enumerate() {
                for &root in &scene.nodes {
                    self.check_node(root)?;
                    if let Some(parent) = self.parents[root] {
                        return Err(ModelError::Structural(format!(
                            "scene {} lists node {} as a root but it is a child of node {}",
                            i, root, parent
                        )));
                    }
                }
            }
            let scene = lookup(&doc.scenes, ReferenceKind::Scene, doc.scene.unwrap_or(0))?;
            (scene.name.clone(), scene.nodes.clone())
        };

        // Every built node stays in the arena; the roots alone define the forest.
        let arena: Vec<Node> = std::mem::take(&mut self.nodes)
            .into_iter()
            .filter_map(|slot| match slot {
                NodeSlot::Built(node) => Some(node),
                _ => None,
            })
            .collect();

        let root_ids = roots.iter().map(|&i| self.node_id(i)).collect();
        debug!(roots = roots.len(), nodes = arena.len(), "built scene");
        Ok(Scene::new(name, arena, root_ids, self.skins.clone()))
    }

    fn build_animations(&self) -> Result<Vec<Animation>> {
        let mut animations = Vec::with_capacity(self.doc.animations.len());
        for (animation_index, animation) in self.doc.animations.iter().enumerate() {
            let samplers = animation
                .samplers
                .iter()
                .map(|s| {
                    Ok(Arc::new(AnimationSampler {
                        input: lookup(&self.accessors, ReferenceKind::Accessor, s.input)?.clone(),
                        output: lookup(&self.accessors, ReferenceKind::Accessor, s.output)?.clone(),
                        interpolation: s
                            .interpolation
                            .as_deref()
                            .map(Interpolation::parse)
                            .transpose()?
                            .unwrap_or_default(),
                    }))
                })
                .collect::<Result<Vec<_>>>()?;

            let mut channels = Vec::with_capacity(animation.channels.len());
            for channel in &animation.channels {
                let sampler =
                    lookup(&samplers, ReferenceKind::AnimationSampler, channel.sampler)?.clone();
                let Some(node) = channel.target.node else {
                    trace!(animation = animation_index, "dropping channel without target node");
                    continue;
                };
                let source = lookup(&self.doc.nodes, ReferenceKind::Node, node)?;
                let target_humanoid = self.humanoid.get(&node).copied().or_else(|| {
                    source
                        .name
                        .as_deref()
                        .and_then(HumanoidTag::from_vrm1_name)
                });
                channels.push(AnimationChannel {
                    sampler,
                    target_node: Some(self.node_id(node)),
                    target_node_name: source.name.clone(),
                    target_humanoid,
                    path: TargetPath::parse(&channel.target.path)?,
                });
            }
            animations.push(Animation {
                name: animation.name.clone(),
                channels,
            });
        }
        debug!(count = animations.len(), "decoded animations");
        Ok(animations)
    }

    fn build_metadata(&self) -> Result<Metadata> {
        let asset = &self.doc.asset;
        let mut metadata = Metadata {
            generator: asset.generator.clone(),
            copyright: asset.copyright.clone(),
            ..Metadata::default()
        };
        let extensions = &self.doc.extensions;
        if let Some(meta) = extensions.vrm0.as_ref().and_then(|v| v.meta.as_ref()) {
            metadata.title = meta.title.clone();
            metadata.author = meta.author.clone();
            metadata.thumbnail = meta
                .texture
                .map(|t| lookup(&self.textures, ReferenceKind::Texture, t).cloned())
                .transpose()?;
        } else if let Some(meta) = extensions.vrm1.as_ref().and_then(|v| v.meta.as_ref()) {
            metadata.title = meta.name.clone();
            metadata.author = (!meta.authors.is_empty()).then(|| meta.authors.join(", "));
            if meta.copyright_information.is_some() {
                metadata.copyright = meta.copyright_information.clone();
            }
            metadata.thumbnail = meta
                .thumbnail_image
                .map(|i| {
                    lookup(&self.images, ReferenceKind::Image, i).map(|image| {
                        Arc::new(Texture {
                            name: image.name.clone(),
                            data: image.data.clone(),
                            sampler: Sampler::default(),
                            texture_type: image.texture_type,
                        })
                    })
                })
                .transpose()?;
        }
        Ok(metadata)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const INDEXED_SEMANTICS: [&str; 4] = ["TEXCOORD", "COLOR", "JOINTS", "WEIGHTS"];

/// Splits `TEXCOORD_1` into (bucket of `TEXCOORD`, 1).
fn split_indexed_semantic(semantic: &str) -> Option<(usize, u32)> {
    let (prefix, set) = semantic.rsplit_once('_')?;
    let bucket = INDEXED_SEMANTICS.iter().position(|s| *s == prefix)?;
    Some((bucket, set.parse().ok()?))
}

/// Orders an indexed attribute set, requiring set numbers `0..n` without gaps.
fn dense_set(semantic: &str, sets: BTreeMap<u32, Arc<Accessor>>) -> Result<Vec<Arc<Accessor>>> {
    for (expected, &actual) in sets.keys().enumerate() {
        if actual as usize != expected {
            return Err(ModelError::MissingAttribute(format!(
                "{}_{} missing, present sets are {:?}",
                semantic,
                expected,
                sets.keys().collect::<Vec<_>>()
            )));
        }
    }
    Ok(sets.into_values().collect())
}

fn node_transform(node: &json::Node) -> Option<NodeTransform> {
    if node.translation.is_some() || node.rotation.is_some() || node.scale.is_some() {
        Some(NodeTransform::Decomposed {
            translation: node.translation.map_or(Vec3::ZERO, Vec3::from_array),
            rotation: node.rotation.map_or(Quat::IDENTITY, Quat::from_array),
            scale: node.scale.map_or(Vec3::ONE, Vec3::from_array),
        })
    } else {
        node.matrix
            .map(|m| NodeTransform::Matrix(Mat4::from_cols_array(&m)))
    }
}

fn parse_alpha_mode(mode: Option<&str>) -> Result<AlphaMode> {
    match mode {
        None | Some("OPAQUE") => Ok(AlphaMode::Opaque),
        Some("MASK") => Ok(AlphaMode::Mask),
        Some("BLEND") => Ok(AlphaMode::Blend),
        Some(other) => Err(ModelError::InvalidDocument(format!(
            "unknown alpha mode {:?}",
            other
        ))),
    }
}

fn gl_enum<T>(
    code: Option<u32>,
    parse: fn(u32) -> Option<T>,
    default: T,
    field: &'static str,
) -> Result<T> {
    match code {
        None => Ok(default),
        Some(code) => parse(code).ok_or(ModelError::InvalidEnum {
            field,
            value: code as i64,
            allowed: "a GL sampler constant",
        }),
    }
}

/// Decodes a `data:` URI, returning its media type and payload.
fn decode_data_uri(uri: &str) -> Result<(Option<String>, Vec<u8>)> {
    // Format: data:[<mediatype>][;base64],<data>
    let comma_pos = uri
        .find(',')
        .ok_or_else(|| ModelError::InvalidDocument("invalid data URI: no comma".into()))?;

    let header = &uri["data:".len()..comma_pos];
    let data = &uri[comma_pos + 1..];
    let mime = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    if header.split(';').any(|part| part == "base64") {
        Ok((mime, decode_base64(data)?))
    } else {
        Ok((mime, percent_decode(data)))
    }
}

fn decode_base64(input: &str) -> Result<Vec<u8>> {
    fn sextet(byte: u8) -> Option<u8> {
        match byte {
            b'A'..=b'Z' => Some(byte - b'A'),
            b'a'..=b'z' => Some(byte - b'a' + 26),
            b'0'..=b'9' => Some(byte - b'0' + 52),
            b'+' | b'-' => Some(62),
            b'/' | b'_' => Some(63),
            _ => None,
        }
    }

    let input: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let mut output = Vec::with_capacity(input.len() * 3 / 4);

    for chunk in input.chunks(4) {
        let mut buf = [0u8; 4];
        let mut valid_count = 0;
        for (i, &byte) in chunk.iter().enumerate() {
            if byte == b'=' {
                break;
            }
            buf[i] = sextet(byte)
                .ok_or_else(|| ModelError::InvalidDocument("invalid base64 character".into()))?;
            valid_count = i + 1;
        }
        if valid_count == 1 {
            return Err(ModelError::InvalidDocument(
                "base64 payload ends with a lone character".into(),
            ));
        }

        let n = ((buf[0] as u32) << 18)
            | ((buf[1] as u32) << 12)
            | ((buf[2] as u32) << 6)
            | (buf[3] as u32);

        if valid_count > 1 {
            output.push((n >> 16) as u8);
        }
        if valid_count > 2 {
            output.push((n >> 8) as u8);
        }
        if valid_count > 3 {
            output.push(n as u8);
        }
    }

    Ok(output)
}

fn percent_decode(input: &str) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                output.push((h << 4) | l);
                i += 3;
                continue;
            }
        }
        output.push(bytes[i]);
        i += 1;
    }

    output
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
