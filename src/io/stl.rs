//! Binary STL serialization
//!
//! Layout: 80-byte header, little-endian `u32` facet count, then 50 bytes per
//! facet (normal, three vertices, zero attribute word).

use crate::render::mesh::HeightfieldMesh;

/// Size of the fixed header
pub const HEADER_LEN: usize = 80;
/// Bytes per facet record
pub const FACET_LEN: usize = 50;

const HEADER_TEXT: &[u8] = b"halftone-forge heightfield";

/// Serialize a mesh as binary STL
pub fn encode_stl(mesh: &HeightfieldMesh) -> Vec<u8> {
    let triangles = mesh.triangles();
    let mut bytes = Vec::with_capacity(HEADER_LEN + 4 + triangles.len() * FACET_LEN);

    let mut header = [0u8; HEADER_LEN];
    for (slot, byte) in header.iter_mut().zip(HEADER_TEXT) {
        *slot = *byte;
    }
    bytes.extend_from_slice(&header);

    let count = u32::try_from(triangles.len()).unwrap_or(u32::MAX);
    bytes.extend_from_slice(&count.to_le_bytes());

    for triangle in triangles.iter().take(count as usize) {
        let floats = triangle.normal.iter().chain(triangle.vertices.iter().flatten());
        for value in floats {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    bytes
}
