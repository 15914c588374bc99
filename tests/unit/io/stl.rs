//! Tests for binary STL serialization

#[cfg(test)]
mod tests {
    use halftone_forge::io::stl::{FACET_LEN, HEADER_LEN, encode_stl};
    use halftone_forge::render::mesh::{LithophaneParams, MeshBuilder};
    use halftone_forge::sampling::mask::{FrameGeometry, FrameShape};
    use image::{Rgba, RgbaImage};

    fn mesh(size: u32, color: [u8; 4]) -> halftone_forge::render::mesh::HeightfieldMesh {
        let params = LithophaneParams {
            resolution: 1.0,
            ..LithophaneParams::default()
        };
        let mask = FrameGeometry::new(FrameShape::Square).mask(size, size);
        MeshBuilder::new(params)
            .build(&RgbaImage::from_pixel(size, size, Rgba(color)), &mask)
            .expect("sizes match")
    }

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[offset..offset + 4]);
        f32::from_le_bytes(word)
    }

    // Tests the byte layout: header, count, then fixed-size facets
    // Verified by writing the count big-endian
    #[test]
    fn test_layout() {
        let mesh = mesh(4, [0, 0, 0, 255]);
        let bytes = encode_stl(&mesh);
        let count = mesh.triangle_count();
        assert_eq!(count, 32);
        assert_eq!(bytes.len(), HEADER_LEN + 4 + count * FACET_LEN);
        assert!(bytes.starts_with(b"halftone-forge heightfield"));
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + 4]);
        assert_eq!(u32::from_le_bytes(word) as usize, count);
    }

    // Tests facet records carry the normal, vertices and a zero attribute
    // Verified by omitting the normal
    #[test]
    fn test_facet_contents() {
        let mesh = mesh(2, [255, 255, 255, 255]);
        let bytes = encode_stl(&mesh);
        let first = mesh.triangles()[0];
        let base = HEADER_LEN + 4;
        assert!((f32_at(&bytes, base + 8) - first.normal[2]).abs() < f32::EPSILON);
        assert!((f32_at(&bytes, base + 12) - first.vertices[0][0]).abs() < f32::EPSILON);
        assert!((f32_at(&bytes, base + 20) - 0.8).abs() < 1e-6);
        assert_eq!(&bytes[base + 48..base + 50], &[0, 0]);
    }

    // Tests an empty mesh still has a valid header
    // Verified by skipping the header when there are no facets
    #[test]
    fn test_empty_mesh() {
        let params = LithophaneParams::default();
        let mask = FrameGeometry::new(FrameShape::Circle)
            .with_hole(0.8)
            .mask(3, 3);
        let mesh = MeshBuilder::new(params)
            .build(&RgbaImage::new(3, 3), &mask)
            .expect("sizes match");
        let bytes = encode_stl(&mesh);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(bytes.len(), HEADER_LEN + 4);
    }
}
