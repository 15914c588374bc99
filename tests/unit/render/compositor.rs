//! Tests for layer rasterization and subtractive compositing

#[cfg(test)]
mod tests {
    use halftone_forge::pattern::config::PatternConfig;
    use halftone_forge::pattern::constraint::FeatureFloor;
    use halftone_forge::render::compositor::{Background, LayerCompositor};
    use halftone_forge::render::ink::{CmykPlates, ColorMode, Rgb};
    use halftone_forge::sampling::frame::FrameRaster;
    use halftone_forge::sampling::mask::{FrameGeometry, FrameMask, FrameShape};
    use halftone_forge::sampling::tone::ToneAdjustment;
    use image::{Rgba, RgbaImage};

    fn solid(size: u32, color: [u8; 4]) -> FrameRaster {
        FrameRaster::from_image(RgbaImage::from_pixel(size, size, Rgba(color)))
    }

    fn compositor(pattern: PatternConfig, color: ColorMode) -> LayerCompositor {
        LayerCompositor {
            pattern,
            adjustment: ToneAdjustment::default(),
            color,
            floor: FeatureFloor::none(),
            border_width: 0.0,
            background: Background::Transparent,
        }
    }

    fn heavy_spiral() -> PatternConfig {
        PatternConfig::Spiral {
            density: 20.0,
            thickness: 2.0,
            rotation: 0.0,
        }
    }

    fn circle(size: u32) -> FrameMask {
        FrameGeometry::new(FrameShape::Circle).mask(size, size)
    }

    // Tests a heavy spiral on black inks exactly the frame interior
    // Verified by skipping the mask test
    #[test]
    fn test_black_fills_frame() {
        let mask = circle(64);
        let result = compositor(heavy_spiral(), ColorMode::default())
            .render(&solid(64, [0, 0, 0, 255]), &mask)
            .expect("sizes match");
        let inside = mask.bitmap().count_ones();
        let plane = result.planes.first().expect("one plane");
        assert_eq!(plane.ink_pixels(), inside);
        assert_eq!(result.image.get_pixel(32, 32).0, [0, 0, 0, 255]);
        assert_eq!(result.image.get_pixel(0, 0).0[3], 0);
    }

    // Tests white input leaves no ink on either background
    // Verified by painting zero coverage
    #[test]
    fn test_white_leaves_paper() {
        let mask = circle(48);
        let mut renderer = compositor(heavy_spiral(), ColorMode::default());
        let transparent = renderer
            .render(&solid(48, [255, 255, 255, 255]), &mask)
            .expect("sizes match");
        assert!(transparent.image.pixels().all(|p| p.0[3] == 0));

        renderer.background = Background::White;
        let paper = renderer
            .render(&solid(48, [255, 255, 255, 255]), &mask)
            .expect("sizes match");
        assert!(paper.image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    // Tests transparent source pixels receive no ink
    // Verified by treating transparent pixels as black
    #[test]
    fn test_transparent_source() {
        let mask = circle(32);
        let result = compositor(heavy_spiral(), ColorMode::default())
            .render(&solid(32, [0, 0, 0, 0]), &mask)
            .expect("sizes match");
        assert!(result.planes.iter().all(|plane| plane.ink_pixels() == 0));
    }

    // Tests passthrough coverage follows tone and later plates multiply
    // Verified by painting the magenta plate over cyan instead of multiplying
    #[test]
    fn test_cmyk_passthrough_multiplies() {
        let mask = FrameGeometry::new(FrameShape::Square).mask(16, 16);
        let plates = CmykPlates {
            cyan: true,
            magenta: true,
            yellow: false,
            key: false,
        };
        let result = compositor(PatternConfig::PhotoPassthrough, ColorMode::Cmyk { plates })
            .render(&solid(16, [0, 0, 255, 255]), &mask)
            .expect("sizes match");
        assert_eq!(result.planes.len(), 2);
        assert_eq!(result.image.get_pixel(8, 8).0, [0, 0, 255, 255]);

        let gray = compositor(PatternConfig::PhotoPassthrough, ColorMode::default())
            .render(&solid(16, [128, 128, 128, 255]), &mask)
            .expect("sizes match");
        let coverage = gray.image.get_pixel(8, 8).0[3];
        assert!((126..=128).contains(&coverage), "coverage {coverage}");
    }

    // Tests the ring is drawn over everything inside the frame edge
    // Verified by drawing the ring outside the frame
    #[test]
    fn test_border_ring() {
        let mask = FrameGeometry::new(FrameShape::Square).mask(40, 40);
        let mut renderer = compositor(
            heavy_spiral(),
            ColorMode::Mono {
                color: Rgb::new(255, 0, 0),
            },
        );
        renderer.border_width = 3.0;
        let result = renderer
            .render(&solid(40, [255, 255, 255, 255]), &mask)
            .expect("sizes match");
        assert_eq!(result.image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(result.image.get_pixel(2, 20).0, [255, 0, 0, 255]);
        assert_eq!(result.image.get_pixel(20, 20).0[3], 0);
    }

    // Tests mismatched frame and mask are rejected
    // Verified by rendering against the mask size only
    #[test]
    fn test_size_mismatch() {
        let result = compositor(heavy_spiral(), ColorMode::default())
            .render(&solid(32, [0, 0, 0, 255]), &circle(33));
        assert!(result.is_err());
    }

    // Tests flow and stipple only ink inside the frame
    // Verified by stamping without the visibility test
    #[test]
    fn test_marks_clipped() {
        let mask = FrameGeometry::new(FrameShape::Circle)
            .with_hole(0.3)
            .mask(64, 64);
        let frame = FrameRaster::from_image(RgbaImage::from_fn(64, 64, |x, _| {
            let v = (x * 3) as u8;
            Rgba([v, v, v, 255])
        }));
        for pattern in [
            PatternConfig::Flow {
                density: 12.0,
                thickness: 1.0,
            },
            PatternConfig::Stipple {
                density: 12.0,
                thickness: 1.0,
            },
        ] {
            let result = compositor(pattern, ColorMode::default())
                .render(&frame, &mask)
                .expect("sizes match");
            let plane = result.planes.first().expect("one plane");
            assert!(plane.ink_pixels() > 0, "{pattern:?}");
            for y in 0..64 {
                for x in 0..64 {
                    if plane.alpha_at(x, y) > 0 {
                        assert!(mask.contains_pixel(x, y), "{pattern:?} at {x},{y}");
                    }
                }
            }
        }
    }
}
