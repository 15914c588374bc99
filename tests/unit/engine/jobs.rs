//! Tests for off-thread exports and last-wins supersession

#[cfg(test)]
mod tests {
    use halftone_forge::EngineError;
    use halftone_forge::engine::jobs::{ArtifactKind, ExportQueue, ExportRequest, run_export};
    use halftone_forge::engine::snapshot::{RenderSettings, Snapshot};
    use halftone_forge::pattern::config::PatternConfig;
    use halftone_forge::sampling::frame::SourceRaster;
    use image::{Rgba, RgbaImage};
    use std::time::{Duration, Instant};

    fn snapshot(pattern: PatternConfig) -> Snapshot {
        let pixels = RgbaImage::from_fn(48, 48, |x, y| {
            let v = ((x + y) * 2) as u8;
            Rgba([v, v, v, 255])
        });
        let settings = RenderSettings {
            pattern,
            ..RenderSettings::default()
        };
        Snapshot::new(SourceRaster::new(pixels).expect("non-empty"), settings).expect("valid")
    }

    // Tests each request produces its own encoding
    // Verified by returning PNG bytes for every request
    #[test]
    fn test_run_export_kinds() {
        let snapshot = snapshot(PatternConfig::default());
        let png = run_export(&snapshot, ExportRequest::Raster).expect("raster");
        assert_eq!(png.kind, ArtifactKind::Png);
        assert!(png.bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let svg = run_export(&snapshot, ExportRequest::Vector).expect("vector");
        assert_eq!(svg.kind.extension(), "svg");
        assert!(String::from_utf8_lossy(&svg.bytes).contains("<svg"));

        let stl = run_export(&snapshot, ExportRequest::Mesh).expect("mesh");
        assert_eq!(stl.kind, ArtifactKind::Stl);
        assert!(stl.bytes.len() >= 84);

        let preview = run_export(&snapshot, ExportRequest::LithophanePreview).expect("preview");
        assert_eq!(preview.kind, ArtifactKind::Png);
    }

    // Tests passthrough vector export fails without affecting other requests
    // Verified by returning an empty SVG for passthrough
    #[test]
    fn test_passthrough_vector_unsupported() {
        let snapshot = snapshot(PatternConfig::PhotoPassthrough);
        assert!(matches!(
            run_export(&snapshot, ExportRequest::Vector),
            Err(EngineError::Unsupported { .. })
        ));
        assert!(run_export(&snapshot, ExportRequest::Raster).is_ok());
    }

    // Tests only the newest submission delivers its artifact
    // Verified by accepting stale results
    #[test]
    fn test_last_wins() {
        let queue = ExportQueue::new();
        assert_eq!(queue.latest_ticket(), 0);
        let first = queue
            .submit(snapshot(PatternConfig::default()), ExportRequest::Raster)
            .expect("spawns");
        let second = queue
            .submit(snapshot(PatternConfig::default()), ExportRequest::Vector)
            .expect("spawns");
        assert_eq!(first.ticket(), 1);
        assert_eq!(second.ticket(), 2);
        assert!(!first.is_current());
        assert!(second.is_current());

        assert!(matches!(
            first.wait(),
            Err(EngineError::JobSuperseded { ticket: 1 })
        ));
        let artifact = second.wait().expect("latest export succeeds");
        assert_eq!(artifact.kind, ArtifactKind::Svg);
    }

    // Tests polling eventually yields the result without blocking
    // Verified by blocking inside the poll
    #[test]
    fn test_try_result() {
        let queue = ExportQueue::new();
        let handle = queue
            .submit(snapshot(PatternConfig::default()), ExportRequest::Raster)
            .expect("spawns");
        let deadline = Instant::now() + Duration::from_secs(60);
        let result = loop {
            if let Some(result) = handle.try_result() {
                break result;
            }
            assert!(Instant::now() < deadline, "export did not finish");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result.expect("export succeeds").kind, ArtifactKind::Png);
    }

    // Tests clones of a queue share one ticket counter
    // Verified by giving each clone its own counter
    #[test]
    fn test_shared_counter() {
        let queue = ExportQueue::new();
        let other = queue.clone();
        let handle = queue
            .submit(snapshot(PatternConfig::default()), ExportRequest::Mesh)
            .expect("spawns");
        let newer = other
            .submit(snapshot(PatternConfig::default()), ExportRequest::Mesh)
            .expect("spawns");
        assert_eq!(queue.latest_ticket(), 2);
        assert!(!handle.is_current());
        assert!(newer.wait().is_ok());
    }
}
