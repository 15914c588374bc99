//! Tests for hashed stipple placement

#[cfg(test)]
mod tests {
    use halftone_forge::pattern::constraint::FeatureFloor;
    use halftone_forge::pattern::stipple::{dot_radius, sample_count, stipple_dots};
    use halftone_forge::sampling::mask::{FrameGeometry, FrameMask, FrameShape};
    use halftone_forge::sampling::tone::ToneField;
    use ndarray::Array2;

    fn uniform(size: usize, tone: f64) -> ToneField {
        ToneField::new(
            Array2::from_elem((size, size), tone),
            Array2::from_elem((size, size), false),
        )
    }

    fn circle(size: u32) -> FrameMask {
        FrameGeometry::new(FrameShape::Circle).mask(size, size)
    }

    // Tests the candidate count scales with density squared and is capped
    // Verified by removing the cap
    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(10.0), 800);
        assert_eq!(sample_count(400.0), 400_000);
        assert_eq!(sample_count(f64::NAN), 0);
    }

    // Tests the mark radius minimum and floor
    // Verified by flooring the radius instead of the diameter
    #[test]
    fn test_dot_radius() {
        assert!((dot_radius(100.0, 10.0, 1.0, &FeatureFloor::none()) - 2.5).abs() < 1e-12);
        assert!((dot_radius(100.0, 100.0, 0.1, &FeatureFloor::none()) - 0.5).abs() < 1e-12);
        assert!((dot_radius(100.0, 10.0, 1.0, &FeatureFloor::pixels(8.0)) - 4.0).abs() < 1e-12);
    }

    // Tests identical inputs place identical marks and seeds decorrelate layers
    // Verified by seeding from the system clock
    #[test]
    fn test_deterministic() {
        let field = uniform(128, 0.5);
        let mask = circle(128);
        let first = stipple_dots(&field, &mask, 12.0, 1.0, 7, &FeatureFloor::none());
        let second = stipple_dots(&field, &mask, 12.0, 1.0, 7, &FeatureFloor::none());
        assert_eq!(first, second);
        let other = stipple_dots(&field, &mask, 12.0, 1.0, 8, &FeatureFloor::none());
        assert_ne!(first, other);
    }

    // Tests darker tone keeps more marks and white keeps none
    // Verified by comparing the threshold the wrong way round
    #[test]
    fn test_tone_controls_count() {
        let mask = circle(128);
        let count = |tone| {
            stipple_dots(&uniform(128, tone), &mask, 12.0, 1.0, 3, &FeatureFloor::none()).len()
        };
        assert_eq!(count(1.0), 0);
        assert!(count(0.25) > count(0.75));
        assert!(count(0.0) > 500);
    }

    // Tests every kept mark lies inside the frame
    // Verified by skipping the mask test
    #[test]
    fn test_marks_inside_frame() {
        let mask = FrameGeometry::new(FrameShape::Circle)
            .with_hole(0.4)
            .mask(96, 96);
        for dot in stipple_dots(&uniform(96, 0.0), &mask, 10.0, 1.0, 0, &FeatureFloor::none()) {
            assert!(mask.contains_point(dot.center.x, dot.center.y));
        }
    }
}
