//! Synthetic PMX, VMD and glTF inputs shared by the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber so decoder logs show up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

// ============================================================================
// PMX
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Deform {
    Bdef1(i32),
    Bdef2(i32, i32, f32),
    Bdef4([i32; 4], [f32; 4]),
    Sdef(i32, i32, f32),
    Qdef([i32; 4], [f32; 4]),
}

#[derive(Debug, Clone)]
pub struct PmxVertex {
    pub position: [f32; 3],
    pub deform: Deform,
}

#[derive(Debug, Clone)]
pub struct PmxMaterialDef {
    pub name: String,
    pub diffuse: [f32; 4],
    pub flags: u8,
    pub texture: i32,
    pub surface_count: i32,
}

#[derive(Debug, Clone)]
pub struct PmxBoneDef {
    pub name: String,
    pub name_universal: String,
    pub position: [f32; 3],
    pub parent: i32,
    pub ik: bool,
}

/// Writes PMX files with configurable index widths.
#[derive(Debug, Clone)]
pub struct PmxBuilder {
    pub version: f32,
    pub encoding: u8,
    pub additional_vec4: u8,
    pub vertex_width: u8,
    pub texture_width: u8,
    pub material_width: u8,
    pub bone_width: u8,
    pub name: String,
    pub comment: String,
    pub vertices: Vec<PmxVertex>,
    pub triangles: Vec<[u32; 3]>,
    /// Indices appended after the triangles, for malformed surface lists.
    pub loose_indices: Vec<u32>,
    pub textures: Vec<String>,
    pub materials: Vec<PmxMaterialDef>,
    pub bones: Vec<PmxBoneDef>,
}

pub fn bone(name: &str, name_universal: &str, position: [f32; 3], parent: i32) -> PmxBoneDef {
    PmxBoneDef {
        name: name.into(),
        name_universal: name_universal.into(),
        position,
        parent,
        ik: false,
    }
}

pub fn material(name: &str, surface_count: i32) -> PmxMaterialDef {
    PmxMaterialDef {
        name: name.into(),
        diffuse: [1.0, 1.0, 1.0, 1.0],
        flags: 0,
        texture: -1,
        surface_count,
    }
}

impl PmxBuilder {
    /// Two triangles over four vertices, two materials and a three-bone chain.
    pub fn sample() -> Self {
        let vertex = |x: f32, y: f32, deform| PmxVertex {
            position: [x, y, 0.0],
            deform,
        };
        Self {
            version: 2.0,
            encoding: 0,
            additional_vec4: 0,
            vertex_width: 2,
            texture_width: 1,
            material_width: 1,
            bone_width: 2,
            name: "テスト".into(),
            comment: "コメント".into(),
            vertices: vec![
                vertex(0.0, 0.0, Deform::Bdef1(0)),
                vertex(1.0, 0.0, Deform::Bdef2(0, 1, 0.25)),
                vertex(1.0, 1.0, Deform::Bdef4([0, 1, 2, -1], [0.5, 0.25, 0.25, 0.0])),
                vertex(0.0, 1.0, Deform::Sdef(1, 2, 0.5)),
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            loose_indices: Vec::new(),
            textures: Vec::new(),
            materials: vec![material("body", 3), material("face", 3)],
            bones: vec![
                bone("センター", "center", [0.0, 1.0, 0.0], -1),
                bone("上半身", "upper body", [0.0, 10.0, 0.0], 0),
                bone("頭", "head", [0.0, 15.0, 1.0], 1),
            ],
        }
    }

    pub fn with_widths(mut self, width: u8) -> Self {
        self.vertex_width = width;
        self.texture_width = width;
        self.material_width = width;
        self.bone_width = width;
        self
    }

    fn text(&self, out: &mut Vec<u8>, text: &str) {
        let bytes: Vec<u8> = if self.encoding == 0 {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else {
            text.as_bytes().to_vec()
        };
        out.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
        out.extend_from_slice(&bytes);
    }

    fn floats(out: &mut Vec<u8>, values: &[f32]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn signed(out: &mut Vec<u8>, width: u8, value: i32) {
        match width {
            1 => out.push(value as i8 as u8),
            2 => out.extend_from_slice(&(value as i16).to_le_bytes()),
            _ => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn vertex_index(out: &mut Vec<u8>, width: u8, value: u32) {
        match width {
            1 => out.push(value as u8),
            2 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            _ => out.extend_from_slice(&(value as i32).to_le_bytes()),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"PMX ");
        Self::floats(&mut out, &[self.version]);
        out.push(8);
        out.extend_from_slice(&[
            self.encoding,
            self.additional_vec4,
            self.vertex_width,
            self.texture_width,
            self.material_width,
            self.bone_width,
            1,
            1,
        ]);
        self.text(&mut out, &self.name);
        self.text(&mut out, "test");
        self.text(&mut out, &self.comment);
        self.text(&mut out, "comment");

        out.extend_from_slice(&(self.vertices.len() as i32).to_le_bytes());
        let bw = self.bone_width;
        for vertex in &self.vertices {
            Self::floats(&mut out, &vertex.position);
            Self::floats(&mut out, &[0.0, 0.0, 1.0]);
            Self::floats(&mut out, &[vertex.position[0], vertex.position[1]]);
            for _ in 0..self.additional_vec4 {
                Self::floats(&mut out, &[9.0; 4]);
            }
            match vertex.deform {
                Deform::Bdef1(j) => {
                    out.push(0);
                    Self::signed(&mut out, bw, j);
                }
                Deform::Bdef2(a, b, w) => {
                    out.push(1);
                    Self::signed(&mut out, bw, a);
                    Self::signed(&mut out, bw, b);
                    Self::floats(&mut out, &[w]);
                }
                Deform::Bdef4(joints, weights) | Deform::Qdef(joints, weights) => {
                    out.push(if matches!(vertex.deform, Deform::Bdef4(..)) { 2 } else { 4 });
                    for j in joints {
                        Self::signed(&mut out, bw, j);
                    }
                    Self::floats(&mut out, &weights);
                }
                Deform::Sdef(a, b, w) => {
                    out.push(3);
                    Self::signed(&mut out, bw, a);
                    Self::signed(&mut out, bw, b);
                    Self::floats(&mut out, &[w]);
                    Self::floats(&mut out, &[7.0; 9]);
                }
            }
            Self::floats(&mut out, &[1.0]); // edge scale
        }

        let index_count = self.triangles.len() * 3 + self.loose_indices.len();
        out.extend_from_slice(&(index_count as i32).to_le_bytes());
        for &index in self.triangles.iter().flatten().chain(&self.loose_indices) {
            Self::vertex_index(&mut out, self.vertex_width, index);
        }

        out.extend_from_slice(&(self.textures.len() as i32).to_le_bytes());
        for path in &self.textures {
            self.text(&mut out, path);
        }

        out.extend_from_slice(&(self.materials.len() as i32).to_le_bytes());
        for material in &self.materials {
            self.text(&mut out, &material.name);
            self.text(&mut out, "");
            Self::floats(&mut out, &material.diffuse);
            Self::floats(&mut out, &[0.5; 3]);
            Self::floats(&mut out, &[5.0]);
            Self::floats(&mut out, &[0.2; 3]);
            out.push(material.flags);
            Self::floats(&mut out, &[0.0, 0.0, 0.0, 1.0]);
            Self::floats(&mut out, &[1.0]);
            Self::signed(&mut out, self.texture_width, material.texture);
            Self::signed(&mut out, self.texture_width, -1);
            out.push(0);
            out.push(1);
            out.push(3);
            self.text(&mut out, "memo");
            out.extend_from_slice(&material.surface_count.to_le_bytes());
        }

        out.extend_from_slice(&(self.bones.len() as i32).to_le_bytes());
        for bone in &self.bones {
            self.text(&mut out, &bone.name);
            self.text(&mut out, &bone.name_universal);
            Self::floats(&mut out, &bone.position);
            Self::signed(&mut out, bw, bone.parent);
            out.extend_from_slice(&0i32.to_le_bytes());
            let flags: u16 = if bone.ik { 0x0020 } else { 0 };
            out.extend_from_slice(&flags.to_le_bytes());
            Self::floats(&mut out, &[0.0, 1.0, 0.0]); // tail offset
            if bone.ik {
                Self::signed(&mut out, bw, 0);
                out.extend_from_slice(&40i32.to_le_bytes());
                Self::floats(&mut out, &[0.5]);
                out.extend_from_slice(&1i32.to_le_bytes());
                Self::signed(&mut out, bw, 0);
                out.push(1);
                Self::floats(&mut out, &[-1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
            }
        }

        // Morph count; later sections are not decoded.
        out.extend_from_slice(&0i32.to_le_bytes());
        out
    }
}

// ============================================================================
// VMD
// ============================================================================

pub struct VmdKey<'a> {
    pub bone: &'a str,
    pub frame: u32,
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

/// Writes a VMD file in the 0002 layout (20-byte model name).
pub fn vmd(model: &str, keys: &[VmdKey<'_>]) -> Vec<u8> {
    let mut out = fixed(b"Vocaloid Motion Data 0002", 30);
    out.extend(fixed(&shift_jis(model), 20));
    out.extend_from_slice(&(keys.len() as u32).to_le_bytes());
    for key in keys {
        out.extend(fixed(&shift_jis(key.bone), 15));
        out.extend_from_slice(&key.frame.to_le_bytes());
        for v in key.translation.iter().chain(key.rotation.iter()) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&[20u8; 64]);
    }
    // Morph keyframe count; ignored by the decoder.
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

pub fn shift_jis(text: &str) -> Vec<u8> {
    encoding_rs::SHIFT_JIS.encode(text).0.into_owned()
}

fn fixed(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut field = vec![0u8; width];
    let len = bytes.len().min(width);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

// ============================================================================
// glTF
// ============================================================================

pub fn base64(data: &[u8]) -> String {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for chunk in data.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
        for i in 0..4 {
            if i <= chunk.len() {
                out.push(TABLE[(n >> (18 - 6 * i) & 63) as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

pub fn data_uri(data: &[u8]) -> String {
    format!("data:application/octet-stream;base64,{}", base64(data))
}

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Wraps a JSON document and a binary chunk into a GLB container.
pub fn glb(doc: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json_bytes = serde_json::to_vec(doc).unwrap();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json_bytes);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

/// Binary payload of [`triangle_doc`]: three positions, then three u16 indices.
pub fn triangle_bin() -> Vec<u8> {
    let mut bin = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin
}

/// One triangle mesh under a root node with a child, with the buffer embedded as a data URI.
pub fn triangle_doc() -> Value {
    let bin = triangle_bin();
    json!({
        "asset": { "version": "2.0", "generator": "modelkit tests" },
        "buffers": [{ "byteLength": bin.len(), "uri": data_uri(&bin) }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "materials": [{ "name": "red", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } }],
        "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
        "nodes": [
            { "name": "root", "children": [1], "translation": [1.0, 2.0, 3.0] },
            { "name": "child", "mesh": 0 }
        ],
        "scenes": [{ "name": "main", "nodes": [0] }]
    })
}
