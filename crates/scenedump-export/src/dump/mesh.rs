//! Mesh block serializer

use std::io::{self, Write};

use scenedump_core::Mesh;

use super::format::Components;

/// Write one `Mesh` block: header, vertex lines, face lines, bones.
pub fn write_mesh<W: Write>(w: &mut W, mesh: &Mesh) -> io::Result<()> {
    writeln!(w, "Mesh")?;
    writeln!(w, "\tNum Vertices: {}", mesh.num_vertices)?;
    writeln!(w, "\tNum Faces: {}", mesh.num_faces())?;
    writeln!(w, "\tNum Bones: {}", mesh.num_bones())?;
    writeln!(w)?;

    for vertex in 0..mesh.num_vertices {
        write_vertex(w, mesh, vertex)?;
    }
    writeln!(w)?;

    for face in &mesh.faces {
        writeln!(w, "\tFace ({})", Components(face))?;
    }
    writeln!(w)?;

    for bone in &mesh.bones {
        writeln!(w, "\tBone {}", bone.name)?;
        for weight in &bone.weights {
            writeln!(w, "\t\tWeight ({}|{:?})", weight.vertex, weight.weight)?;
        }
    }
    writeln!(w)
}

/// Absent attributes leave no trace on the line; the newline is always written.
fn write_vertex<W: Write>(w: &mut W, mesh: &Mesh, vertex: usize) -> io::Result<()> {
    if let Some(pos) = mesh.position(vertex) {
        write!(w, "\tVertex: pos({})", Components(&pos))?;
    }
    if let Some(nor) = mesh.normal(vertex) {
        write!(w, "\tnor({})", Components(&nor))?;
    }
    if let (Some(tan), Some(bit)) = (mesh.tangent(vertex), mesh.bitangent(vertex)) {
        write!(w, "\ttan({})", Components(&tan))?;
        write!(w, "\tbit({})", Components(&bit))?;
    }
    for (channel, uvs) in mesh.uv_channels() {
        if let Some(uv) = uvs.get(vertex) {
            write!(w, "\tuv{channel}({})", Components(uv))?;
        }
    }
    for (set, colors) in mesh.color_sets() {
        if let Some(rgba) = colors.chunks_exact(4).nth(vertex) {
            write!(w, "\tcol{set}({})", Components(rgba))?;
        }
    }
    writeln!(w)
}
