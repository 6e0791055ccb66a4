//! Property tests for PMX surface and weight decoding.

mod common;

use std::path::Path;

use common::*;
use modelkit_core::DecoderBuffer;
use modelkit_io::pmx_reader::read_deform;
use modelkit_io::{ModelDecoder, PmxDecoder};
use proptest::prelude::*;

fn model(vertex_count: usize, triangles: Vec<[u32; 3]>, width: u8) -> PmxBuilder {
    let mut builder = PmxBuilder::sample().with_widths(width);
    builder.vertices = (0..vertex_count)
        .map(|i| PmxVertex {
            position: [i as f32, 0.0, 0.0],
            deform: Deform::Bdef1(0),
        })
        .collect();
    builder.materials = vec![material("all", triangles.len() as i32 * 3)];
    builder.triangles = triangles;
    builder
}

fn decoded_indices(builder: &PmxBuilder) -> Vec<u32> {
    let result = PmxDecoder::new()
        .load_bytes(&builder.build(), Path::new("."))
        .unwrap();
    let scene = result.scene.unwrap();
    let mesh = scene.roots().find_map(|n| n.mesh.clone()).unwrap();
    mesh.primitives[0]
        .indices
        .as_ref()
        .unwrap()
        .read_vec::<u32>()
        .unwrap()
}

fn triangles() -> impl Strategy<Value = (usize, Vec<[u32; 3]>)> {
    // Vertex counts stay below 256 so one-byte indices can address every vertex.
    (3usize..200).prop_flat_map(|n| {
        let index = 0..n as u32;
        (
            Just(n),
            prop::collection::vec([index.clone(), index.clone(), index], 1..40),
        )
    })
}

proptest! {
    #[test]
    fn winding_is_flipped((n, tris) in triangles(), width in prop::sample::select(vec![1u8, 2, 4])) {
        let indices = decoded_indices(&model(n, tris.clone(), width));
        let expected: Vec<u32> = tris.iter().flat_map(|&[a, b, c]| [a, c, b]).collect();
        prop_assert_eq!(indices, expected);
    }

    #[test]
    fn index_width_does_not_change_result((n, tris) in triangles()) {
        let narrow = decoded_indices(&model(n, tris.clone(), 1));
        prop_assert_eq!(&narrow, &decoded_indices(&model(n, tris.clone(), 2)));
        prop_assert_eq!(&narrow, &decoded_indices(&model(n, tris, 4)));
    }

    #[test]
    fn bdef2_weights_sum_to_one(a in 0i16..500, b in 0i16..500, w in 0.0f32..=1.0) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&a.to_le_bytes());
        bytes.extend_from_slice(&b.to_le_bytes());
        bytes.extend_from_slice(&w.to_le_bytes());
        let mut buffer = DecoderBuffer::new(&bytes, "deform");
        let (joints, weights) = read_deform(&mut buffer, 1, 2).unwrap();
        prop_assert_eq!(joints, [a as i32, b as i32, -1, -1]);
        prop_assert!((weights.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        prop_assert_eq!(&weights[2..], &[0.0, 0.0]);
    }

    #[test]
    fn empty_slots_carry_no_weight(
        joints in prop::array::uniform4(-1i32..100),
        weights in prop::array::uniform4(0.0f32..1.0),
    ) {
        let mut bytes = Vec::new();
        for j in joints {
            bytes.extend_from_slice(&j.to_le_bytes());
        }
        for w in weights {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        let mut buffer = DecoderBuffer::new(&bytes, "deform");
        let (read_joints, read_weights) = read_deform(&mut buffer, 2, 4).unwrap();
        prop_assert_eq!(read_joints, joints);
        for i in 0..4 {
            if joints[i] == -1 {
                prop_assert_eq!(read_weights[i], 0.0);
            } else {
                prop_assert_eq!(read_weights[i], weights[i]);
            }
        }
        prop_assert_eq!(buffer.remaining_size(), 0);
    }
}
