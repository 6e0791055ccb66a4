//! PMX decoding against synthetic models.

mod common;

use std::fs;
use std::path::Path;

use common::*;
use glam::{Mat4, Vec3};
use modelkit_core::{
    AlphaMode, DecodeOptions, ErrorKind, HumanoidTag, ModelError, NodeTransform, ReferenceKind,
    Result, Scene, TextureType,
};
use modelkit_io::{LoadResult, ModelDecoder, PmxDecoder};

fn decode(builder: &PmxBuilder) -> Result<LoadResult> {
    init_tracing();
    PmxDecoder::new().load_bytes(&builder.build(), Path::new("."))
}

fn decode_scene(builder: &PmxBuilder) -> Scene {
    decode(builder).unwrap().scene.unwrap()
}

/// Index slices per material, in decode order.
fn material_indices(scene: &Scene) -> Vec<Vec<u32>> {
    scene
        .roots()
        .filter_map(|n| n.mesh.as_ref())
        .map(|mesh| {
            mesh.primitives[0]
                .indices
                .as_ref()
                .unwrap()
                .read_vec::<u32>()
                .unwrap()
        })
        .collect()
}

#[test]
fn test_sample_model_structure() {
    let result = decode(&PmxBuilder::sample()).unwrap();
    let metadata = result.metadata.unwrap();
    assert_eq!(metadata.title.as_deref(), Some("テスト"));
    assert_eq!(metadata.title_universal.as_deref(), Some("test"));
    assert_eq!(metadata.comment.as_deref(), Some("コメント"));
    assert!(result.animations.is_empty());

    let scene = result.scene.unwrap();
    assert_eq!(scene.name.as_deref(), Some("テスト"));
    assert_eq!(scene.nodes().len(), 5);
    let roots: Vec<_> = scene.roots().map(|n| n.name.clone().unwrap()).collect();
    assert_eq!(roots, vec!["body", "face", "センター"]);
    assert_eq!(
        scene.initial_transform(),
        Some(Mat4::from_scale(Vec3::splat(0.1)))
    );
}

#[test]
fn test_bone_translations_are_parent_relative() {
    let scene = decode_scene(&PmxBuilder::sample());
    let center = scene.find_by_name("センター").unwrap();
    let spine = scene.find_by_name("上半身").unwrap();
    let head = scene.find_by_name("頭").unwrap();

    assert_eq!(
        center.transform,
        Some(NodeTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
    );
    assert_eq!(
        spine.transform,
        Some(NodeTransform::from_translation(Vec3::new(0.0, 9.0, 0.0)))
    );
    assert_eq!(
        head.transform,
        Some(NodeTransform::from_translation(Vec3::new(0.0, 5.0, 1.0)))
    );
    assert_eq!(center.children, vec![spine.id]);
    assert_eq!(spine.children, vec![head.id]);
}

#[test]
fn test_skin_covers_all_bones() {
    let scene = decode_scene(&PmxBuilder::sample());
    assert_eq!(scene.skins().len(), 1);
    let skin = &scene.skins()[0];
    assert_eq!(skin.joints().len(), 3);
    assert_eq!(skin.joints()[2], scene.find_by_name("頭").unwrap().id);
    assert_eq!(
        skin.inverse_bind_matrix(1),
        Mat4::from_translation(Vec3::new(0.0, -10.0, 0.0))
    );
    assert_eq!(
        skin.joint_humanoid_tags(),
        &[None, Some(HumanoidTag::Spine), Some(HumanoidTag::Head)]
    );
    for node in scene.roots().filter(|n| n.mesh.is_some()) {
        assert!(std::sync::Arc::ptr_eq(node.skin.as_ref().unwrap(), skin));
    }
}

#[test]
fn test_winding_is_reversed() {
    let scene = decode_scene(&PmxBuilder::sample());
    assert_eq!(material_indices(&scene), vec![vec![0, 2, 1], vec![0, 3, 2]]);
}

#[test]
fn test_vertex_attributes_are_repacked() {
    let scene = decode_scene(&PmxBuilder::sample());
    let mesh = scene.roots().next().unwrap().mesh.as_ref().unwrap();
    let attributes = &mesh.primitives[0].attributes;
    assert_eq!(attributes.vertex_count(), 4);

    let positions: Vec<Vec3> = attributes.position.read_vec().unwrap();
    assert_eq!(positions[2], Vec3::new(1.0, 1.0, 0.0));
    let normals: Vec<Vec3> = attributes.normal.as_ref().unwrap().read_vec().unwrap();
    assert!(normals.iter().all(|n| *n == Vec3::Z));
    let uvs: Vec<[f32; 2]> = attributes.texcoords[0].read_vec().unwrap();
    assert_eq!(uvs[3], [0.0, 1.0]);

    let joints: Vec<[u32; 4]> = attributes.joints[0].read_vec().unwrap();
    let weights: Vec<[f32; 4]> = attributes.weights[0].read_vec().unwrap();
    assert_eq!(joints[0][0], 0);
    assert_eq!(weights[0], [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(&joints[1][..2], &[0, 1]);
    assert_eq!(weights[1], [0.25, 0.75, 0.0, 0.0]);
    assert_eq!(&joints[2][..3], &[0, 1, 2]);
    assert_eq!(weights[2], [0.5, 0.25, 0.25, 0.0]);
    assert_eq!(&joints[3][..2], &[1, 2]);
    assert_eq!(weights[3], [0.5, 0.5, 0.0, 0.0]);
}

#[test]
fn test_qdef_and_additional_vec4() {
    let mut builder = PmxBuilder::sample();
    builder.version = 2.1;
    builder.additional_vec4 = 2;
    builder.vertices[2].deform = Deform::Qdef([2, -1, -1, -1], [1.0, 0.0, 0.0, 0.0]);
    let scene = decode_scene(&builder);
    let mesh = scene.roots().next().unwrap().mesh.as_ref().unwrap();
    let weights: Vec<[f32; 4]> = mesh.primitives[0].attributes.weights[0].read_vec().unwrap();
    assert_eq!(weights[2], [1.0, 0.0, 0.0, 0.0]);
    let positions: Vec<Vec3> = mesh.primitives[0].attributes.position.read_vec().unwrap();
    assert_eq!(positions[3], Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn test_index_widths_give_identical_structure() {
    let reference = decode_scene(&PmxBuilder::sample().with_widths(1));
    for width in [2, 4] {
        let scene = decode_scene(&PmxBuilder::sample().with_widths(width));
        assert_eq!(material_indices(&scene), material_indices(&reference));
        let names = |s: &Scene| -> Vec<Option<String>> {
            s.depth_first().iter().map(|(_, n)| n.name.clone()).collect()
        };
        assert_eq!(names(&scene), names(&reference));
        assert_eq!(
            scene.skins()[0].inverse_bind_matrices(),
            reference.skins()[0].inverse_bind_matrices()
        );
    }
}

#[test]
fn test_utf8_text_and_ik_bones() {
    let mut builder = PmxBuilder::sample();
    builder.encoding = 1;
    builder.bones[2].ik = true;
    builder.bones.push(bone("左足", "leg_L", [1.0, 0.0, 0.0], 0));
    let scene = decode_scene(&builder);
    assert_eq!(scene.skins()[0].joint_humanoid_tags()[3], Some(HumanoidTag::LeftUpperLeg));
    let center = scene.find_by_name("センター").unwrap();
    assert_eq!(center.children.len(), 2);
}

#[test]
fn test_universal_name_fallback() {
    let mut builder = PmxBuilder::sample();
    builder.bones[1].name = "ボーン".into();
    let scene = decode_scene(&builder);
    assert_eq!(scene.skins()[0].joint_humanoid_tags()[1], Some(HumanoidTag::Spine));
}

#[test]
fn test_materials_become_unlit() {
    let mut builder = PmxBuilder::sample();
    builder.materials[0].diffuse = [1.0, 0.5, 0.5, 0.5];
    builder.materials[0].flags = 0x01;
    let scene = decode_scene(&builder);
    let materials: Vec<_> = scene
        .roots()
        .filter_map(|n| n.mesh.as_ref())
        .map(|m| m.primitives[0].material.clone())
        .collect();
    assert!(materials.iter().all(|m| m.is_unlit()));
    assert_eq!(materials[0].base_color_factor, [1.0, 0.5, 0.5, 0.5]);
    assert_eq!(materials[0].alpha_mode, AlphaMode::Blend);
    assert!(materials[0].double_sided);
    assert_eq!(materials[1].alpha_mode, AlphaMode::Opaque);
    assert!(!materials[1].double_sided);
}

#[test]
fn test_textures_resolve_against_base_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("tex")).unwrap();
    fs::write(dir.path().join("tex").join("skin.png"), b"\x89PNG").unwrap();

    let mut builder = PmxBuilder::sample();
    builder.textures = vec!["tex\\skin.png".into()];
    builder.materials[1].texture = 0;
    let result = PmxDecoder::new()
        .load_bytes(&builder.build(), dir.path())
        .unwrap();
    let scene = result.scene.unwrap();
    let face = scene.find_by_name("face").unwrap();
    let material = &face.mesh.as_ref().unwrap().primitives[0].material;
    let texture = &material.base_color_texture.as_ref().unwrap().texture;
    assert_eq!(texture.texture_type, TextureType::Png);
    assert_eq!(texture.data.bytes(), b"\x89PNG");
    assert_eq!(texture.name.as_deref(), Some("tex\\skin.png"));
}

#[test]
fn test_texture_size_cap() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("big.png"), [0u8; 16]).unwrap();
    let mut builder = PmxBuilder::sample();
    builder.textures = vec!["big.png".into()];

    let decoder = PmxDecoder::with_options(DecodeOptions::new().with_max_texture_bytes(8));
    let err = decoder.load_bytes(&builder.build(), dir.path()).unwrap_err();
    assert!(matches!(err, ModelError::TextureTooLarge { size: 16, limit: 8, .. }));
    assert_eq!(err.kind(), ErrorKind::Resource);

    builder.textures = vec!["missing.png".into()];
    let err = decoder.load_bytes(&builder.build(), dir.path()).unwrap_err();
    assert!(matches!(err, ModelError::ResourceUnreadable { .. }));
}

#[test]
fn test_zero_bones_is_valid() {
    let mut builder = PmxBuilder::sample();
    builder.bones.clear();
    for vertex in &mut builder.vertices {
        vertex.deform = Deform::Bdef1(-1);
    }
    let scene = decode_scene(&builder);
    assert_eq!(scene.skins().len(), 1);
    assert!(scene.skins()[0].joints().is_empty());
    assert_eq!(scene.nodes().len(), 2);
    assert!(scene.roots().all(|n| n.skin.is_some()));
}

#[test]
fn test_surface_count_mismatch() {
    let mut builder = PmxBuilder::sample();
    builder.materials[1].surface_count = 0;
    assert!(matches!(decode(&builder), Err(ModelError::Structural(_))));

    builder.materials[1].surface_count = 6;
    assert!(matches!(decode(&builder), Err(ModelError::Structural(_))));
}

#[test]
fn test_header_validation() {
    let mut builder = PmxBuilder::sample();
    builder.version = 1.0;
    assert!(matches!(
        decode(&builder),
        Err(ModelError::UnsupportedVersion { format: "pmx", .. })
    ));

    let mut builder = PmxBuilder::sample();
    builder.bone_width = 3;
    assert!(matches!(
        decode(&builder),
        Err(ModelError::InvalidHeader { field: "bone index size", value: 3, .. })
    ));

    let mut builder = PmxBuilder::sample();
    builder.encoding = 2;
    assert!(matches!(
        decode(&builder),
        Err(ModelError::InvalidHeader { field: "text encoding", .. })
    ));

    let mut builder = PmxBuilder::sample();
    builder.additional_vec4 = 5;
    assert_eq!(decode(&builder).unwrap_err().kind(), ErrorKind::Structural);
}

#[test]
fn test_signature_mismatch() {
    let mut data = PmxBuilder::sample().build();
    data[..4].copy_from_slice(b"PMD ");
    let err = PmxDecoder::new().load_bytes(&data, Path::new(".")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
}

#[test]
fn test_dangling_vertex_and_joint() {
    let mut builder = PmxBuilder::sample();
    builder.triangles[1] = [0, 2, 4];
    assert!(matches!(
        decode(&builder),
        Err(ModelError::DanglingReference { kind: ReferenceKind::Vertex, index: 4, len: 4 })
    ));

    let mut builder = PmxBuilder::sample();
    builder.vertices[0].deform = Deform::Bdef1(3);
    assert!(matches!(
        decode(&builder),
        Err(ModelError::DanglingReference { kind: ReferenceKind::Bone, index: 3, len: 3 })
    ));
}

#[test]
fn test_bone_hierarchy_errors() {
    let mut builder = PmxBuilder::sample();
    builder.bones[1].parent = 7;
    assert!(matches!(
        decode(&builder),
        Err(ModelError::DanglingReference { kind: ReferenceKind::Bone, index: 7, .. })
    ));

    let mut builder = PmxBuilder::sample();
    builder.bones[1].parent = 1;
    assert!(matches!(
        decode(&builder),
        Err(ModelError::CyclicGraph { kind: ReferenceKind::Bone, index: 1 })
    ));

    let mut builder = PmxBuilder::sample();
    builder.bones[1].parent = 2;
    assert_eq!(decode(&builder).unwrap_err().kind(), ErrorKind::CyclicGraph);
}

#[test]
fn test_truncated_file() {
    let data = PmxBuilder::sample().build();
    for cut in [3, 20, 60, data.len() - 10] {
        let err = PmxDecoder::new()
            .load_bytes(&data[..cut], Path::new("."))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds, "cut at {}", cut);
    }
}

#[test]
fn test_triangle_count_must_be_whole() {
    let mut builder = PmxBuilder::sample();
    builder.loose_indices = vec![0];
    assert!(matches!(decode(&builder), Err(ModelError::Structural(_))));
}
