//! Decode any supported file and print its scene tree and animations
//!
//! Run with: cargo run --example inspect -- model.pmx
//! Set RUST_LOG=modelkit_io=debug to see decoder logs.

use std::env;
use std::path::Path;

use modelkit_io::DecoderRegistry;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let path = match args.get(1) {
        Some(path) => Path::new(path),
        None => {
            eprintln!("usage: inspect <file>");
            std::process::exit(2);
        }
    };

    let result = DecoderRegistry::default().load_path(path)?;

    if let Some(meta) = &result.metadata {
        println!("Title: {}", meta.title.as_deref().unwrap_or("-"));
        if let Some(author) = &meta.author {
            println!("Author: {}", author);
        }
        if let Some(generator) = &meta.generator {
            println!("Generator: {}", generator);
        }
    }

    if let Some(scene) = &result.scene {
        println!(
            "Scene {:?}: {} nodes, {} skins",
            scene.name.as_deref().unwrap_or(""),
            scene.nodes().len(),
            scene.skins().len()
        );
        for (depth, node) in scene.depth_first() {
            let pad = "  ".repeat(depth);
            let mut line = format!("{}{}", pad, node.name.as_deref().unwrap_or("<unnamed>"));
            if let Some(mesh) = &node.mesh {
                let elements: usize = mesh.primitives.iter().map(|p| p.element_count()).sum();
                line.push_str(&format!(" [mesh, {} elements]", elements));
            }
            if node.skin.is_some() {
                line.push_str(" [skinned]");
            }
            println!("{}", line);
        }
    }

    for animation in &result.animations {
        println!(
            "Animation {:?}: {} channels, {:.2}s",
            animation.name.as_deref().unwrap_or(""),
            animation.channels.len(),
            animation.duration()
        );
    }
    Ok(())
}
