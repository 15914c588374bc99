//! Tests for source import, PNG encoding and artifact writing

#[cfg(test)]
mod tests {
    use halftone_forge::EngineError;
    use halftone_forge::io::image::{
        decode_source, downscale_to_cap, encode_png, load_source, write_artifact,
    };
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::path::Path;

    // Tests large sources shrink to the cap with their aspect ratio kept
    // Verified by capping the shorter side instead
    #[test]
    fn test_downscale_to_cap() {
        let image = RgbaImage::from_pixel(100, 50, Rgba([10, 20, 30, 255]));
        assert_eq!(downscale_to_cap(image.clone(), 40).dimensions(), (40, 20));
        assert_eq!(downscale_to_cap(image.clone(), 100).dimensions(), (100, 50));
        assert_eq!(downscale_to_cap(image, 0).dimensions(), (100, 50));

        let thin = RgbaImage::new(1000, 2);
        assert_eq!(downscale_to_cap(thin, 10).dimensions(), (10, 1));
    }

    // Tests downscaling is deterministic
    // Verified by switching to a randomized filter
    #[test]
    fn test_downscale_deterministic() {
        let image = RgbaImage::from_fn(64, 48, |x, y| Rgba([(x * 4) as u8, (y * 5) as u8, 7, 255]));
        assert_eq!(
            downscale_to_cap(image.clone(), 20),
            downscale_to_cap(image, 20)
        );
    }

    // Tests encoded PNG bytes decode back to the same raster
    // Verified by dropping the alpha channel on encode
    #[test]
    fn test_encode_then_decode() {
        let image = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 9, 128]));
        let bytes = encode_png(&image).expect("encodes");
        let source = decode_source(&bytes).expect("decodes");
        assert_eq!((source.width(), source.height()), (5, 3));
        assert_eq!(source.image(), &image);
    }

    // Tests unreadable input reports the right failure
    // Verified by mapping decode errors to load errors
    #[test]
    fn test_bad_input() {
        assert!(matches!(
            decode_source(b"definitely not an image"),
            Err(EngineError::ImageDecode { .. })
        ));
        assert!(matches!(
            load_source(Path::new("/nonexistent/source.png")),
            Err(EngineError::ImageLoad { .. })
        ));
    }

    // Tests writing creates missing parent directories
    // Verified by removing the directory creation
    #[test]
    fn test_write_artifact() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/deeper/out.svg");
        write_artifact(&path, b"<svg/>").expect("writes");
        assert_eq!(fs::read(&path).expect("reads back"), b"<svg/>");

        let blocked = dir.path().join("nested/deeper/out.svg/child.png");
        assert!(matches!(
            write_artifact(&blocked, b"x"),
            Err(EngineError::FileSystem { .. })
        ));
    }
}
