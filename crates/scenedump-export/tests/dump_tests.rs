//! End-to-end tests for the scene dump
//!
//! These tests cover:
//! - Whole-document layout for small scenes
//! - UV channel contiguity in vertex lines
//! - Per-texture isolation of image export failures
//! - Node visitor identities over generated trees

use std::fs;
use std::path::Path;

use scenedump_core::{Animation, Mesh, Node, Scene, Texture, UvChannel};
use scenedump_export::dump::{count_nodes, print_nodes};
use scenedump_export::{DumpOptions, ExportOutcome, SceneDumper, SkipReason};

/// Dump into memory; texture files land next to `output`
fn dump_to_string(dumper: &SceneDumper, scene: &Scene, output: &Path) -> String {
    let mut out = Vec::new();
    dumper.dump(scene, &mut out, output).unwrap();
    String::from_utf8(out).unwrap()
}

fn triangle() -> Mesh {
    Mesh::new(3)
        .with_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .with_faces(vec![[0, 1, 2]])
}

fn red_pixel() -> Texture {
    Texture::texels(1, 1, vec![255, 0, 0, 255])
}

#[test]
fn test_single_mesh_root_only() {
    let mut scene = Scene::new(Node::new("Root"));
    scene.meshes.push(triangle());

    let out = dump_to_string(&SceneDumper::default(), &scene, Path::new("out.txt"));

    let expected = "Mesh\n\
        \tNum Vertices: 3\n\
        \tNum Faces: 1\n\
        \tNum Bones: 0\n\
        \n\
        \tVertex: pos(0.0|0.0|0.0)\n\
        \tVertex: pos(1.0|0.0|0.0)\n\
        \tVertex: pos(0.0|1.0|0.0)\n\
        \n\
        \tFace (0|1|2)\n\
        \n\
        \n\
        Nodegraph\n\
        \tNodes: 1\n\
        \n\
        \tRoot\n\
        \n";
    assert_eq!(out, expected);
}

#[test]
fn test_node_graph_only() {
    let scene = Scene::new(Node::new("Root").with_child(Node::new("Child")));

    let out = dump_to_string(&SceneDumper::default(), &scene, Path::new("out.txt"));

    assert_eq!(out, "Nodegraph\n\tNodes: 2\n\n\tRoot\n\t\tChild\n\n");
    assert!(!out.contains("Mesh"));
    assert!(!out.contains("Animation"));
    assert!(!out.contains("Emb. Texture"));
}

#[test]
fn test_uv_channel_gap() {
    let mut scene = Scene::new(Node::new("Root").with_meshes([0]));
    scene.meshes.push(
        triangle()
            .with_uv_channel(0, UvChannel::new(2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]))
            .with_uv_channel(2, UvChannel::new(2, vec![0.5; 6])),
    );

    let out = dump_to_string(&SceneDumper::default(), &scene, Path::new("out.txt"));

    let vertex_lines: Vec<&str> = out.lines().filter(|l| l.starts_with("\tVertex:")).collect();
    assert_eq!(vertex_lines.len(), 3);
    for line in &vertex_lines {
        assert_eq!(line.matches("\tuv0(").count(), 1);
        assert!(!line.contains("uv1("));
        assert!(!line.contains("uv2("));
    }
    assert!(out.contains("\tRoot\n\t\tMeshes: 0\n"));
}

#[test]
fn test_sections_in_order() {
    let mut scene = Scene::new(Node::new("Root"));
    scene.meshes.push(triangle());
    scene.animations.push(Animation {
        name: "Idle".into(),
        duration: 1.0,
        ticks_per_second: 30.0,
        channels: Vec::new(),
    });
    scene.textures.push(red_pixel());

    let options = DumpOptions {
        export_textures: false,
        ..DumpOptions::default()
    };
    let out = dump_to_string(&SceneDumper::new(options), &scene, Path::new("scene.txt"));

    let mesh = out.find("Mesh\n").unwrap();
    let anim = out.find("Animation\n").unwrap();
    let graph = out.find("Nodegraph\n").unwrap();
    let texture = out.find("Emb. Texture\n").unwrap();
    assert!(mesh < anim && anim < graph && graph < texture);
    assert!(out.ends_with("Emb. Texture\n\tExportPath: scene_tex0.tga\n\n"));
}

#[test]
fn test_textures_written_next_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scene.txt");

    let mut scene = Scene::new(Node::new("Root"));
    scene.textures.push(red_pixel());
    scene.textures.push(Texture::texels(2, 1, vec![0, 255, 0, 255, 0, 0, 255, 255]));

    let report = SceneDumper::default().dump_to_path(&scene, &output).unwrap();

    assert_eq!(report.nodes, 1);
    assert_eq!(report.textures_written(), 2);
    for i in 0..2 {
        let path = dir.path().join(format!("scene_tex{i}.tga"));
        assert!(path.is_file(), "missing {}", path.display());
        assert_eq!(report.textures[i].path(), path.as_path());
    }

    let written = image::open(dir.path().join("scene_tex1.tga")).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (2, 1));
    assert_eq!(written.get_pixel(1, 0).0, [0, 0, 255, 255]);

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.matches("Emb. Texture\n").count(), 2);
}

#[test]
fn test_default_texture_export_is_uncompressed_tga() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scene.txt");

    let mut scene = Scene::new(Node::new("Root"));
    scene.textures.push(Texture::texels(8, 8, [0u8, 0, 0, 255].repeat(64)));

    let report = SceneDumper::default().dump_to_path(&scene, &output).unwrap();
    assert_eq!(report.textures_written(), 1);

    let bytes = fs::read(dir.path().join("scene_tex0.tga")).unwrap();
    assert_eq!(bytes[2], 2);
    assert!(bytes.len() >= 18 + 8 * 8 * 4);
}

#[test]
fn test_texture_failures_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scene.txt");

    // A directory squatting on the third texture's file name.
    fs::create_dir(dir.path().join("scene_tex2.tga")).unwrap();

    let mut scene = Scene::new(Node::new("Root"));
    scene.textures.push(Texture::texels(4, 4, vec![0; 3]));
    scene.textures.push(red_pixel());
    scene.textures.push(red_pixel());

    let report = SceneDumper::default().dump_to_path(&scene, &output).unwrap();

    assert_eq!(report.textures.len(), 3);
    assert!(matches!(
        report.textures[0].skip_reason(),
        Some(SkipReason::Conversion(_))
    ));
    assert!(report.textures[1].is_written());
    assert!(matches!(
        report.textures[2].skip_reason(),
        Some(SkipReason::Write(_))
    ));
    assert!(!dir.path().join("scene_tex0.tga").exists());
    assert!(dir.path().join("scene_tex1.tga").is_file());

    let text = fs::read_to_string(&output).unwrap();
    for i in 0..3 {
        let line = format!(
            "\tExportPath: {}\n",
            dir.path().join(format!("scene_tex{i}.tga")).display()
        );
        assert!(text.contains(&line), "missing descriptor for texture {i}");
    }
}

#[test]
fn test_disabled_textures_touch_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scene.txt");

    let mut scene = Scene::new(Node::new("Root"));
    scene.textures.push(red_pixel());

    let options = DumpOptions {
        export_textures: false,
        ..DumpOptions::default()
    };
    let report = SceneDumper::new(options).dump_to_path(&scene, &output).unwrap();

    assert!(matches!(
        &report.textures[..],
        [ExportOutcome::Skipped {
            reason: SkipReason::Disabled,
            ..
        }]
    ));
    assert!(!dir.path().join("scene_tex0.tga").exists());
    assert!(fs::read_to_string(&output).unwrap().contains("Emb. Texture\n"));
}

#[test]
fn test_dump_is_deterministic() {
    let mut scene = Scene::new(
        Node::new("Root")
            .with_child(Node::new("A").with_meshes([0]))
            .with_child(Node::new("B")),
    );
    scene.meshes.push(triangle());

    let dumper = SceneDumper::default();
    let first = dump_to_string(&dumper, &scene, Path::new("x.txt"));
    let second = dump_to_string(&dumper, &scene, Path::new("x.txt"));
    assert_eq!(first, second);
}

// Property-based tests using proptest
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_node() -> impl Strategy<Value = Node> {
        let leaf = ("[a-z]{0,6}", prop::collection::vec(0u32..8, 0..3))
            .prop_map(|(name, meshes)| Node::new(name).with_meshes(meshes));

        leaf.prop_recursive(5, 64, 4, |inner| {
            (
                "[a-z]{0,6}",
                prop::collection::vec(0u32..8, 0..3),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(name, meshes, children)| {
                    let mut node = Node::new(name).with_meshes(meshes);
                    node.children = children;
                    node
                })
        })
    }

    proptest! {
        #[test]
        fn test_count_is_one_plus_children(root in arb_node()) {
            let from_children: usize = root.children.iter().map(count_nodes).sum();
            prop_assert_eq!(count_nodes(&root), 1 + from_children);
        }

        #[test]
        fn test_print_emits_a_line_per_node(root in arb_node()) {
            let mut out = Vec::new();
            print_nodes(&root, &mut out, "\t").unwrap();
            let text = String::from_utf8(out).unwrap();

            let with_meshes = root.walk().filter(|(_, n)| !n.meshes.is_empty()).count();
            prop_assert_eq!(text.lines().count(), count_nodes(&root) + with_meshes);
        }

        #[test]
        fn test_children_indented_one_deeper(root in arb_node()) {
            let mut out = Vec::new();
            print_nodes(&root, &mut out, "").unwrap();
            let text = String::from_utf8(out).unwrap();

            let depths: Vec<usize> = text
                .lines()
                .filter(|l| !l.trim_start_matches('\t').starts_with("Meshes:"))
                .map(|l| l.len() - l.trim_start_matches('\t').len())
                .collect();
            let expected: Vec<usize> = root.walk().map(|(depth, _)| depth).collect();
            prop_assert_eq!(depths, expected);
        }
    }
}
