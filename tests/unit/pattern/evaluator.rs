//! Tests for spiral, line and dot screen modulation

#[cfg(test)]
mod tests {
    use halftone_forge::pattern::config::{DotShape, PatternConfig};
    use halftone_forge::pattern::constraint::FeatureFloor;
    use halftone_forge::pattern::evaluator::{
        Screen, ScreenKind, dot_distance, narrowest_width, triangle_vertices,
    };
    use std::f64::consts::FRAC_1_SQRT_2;

    fn lines(thickness: f64, floor: FeatureFloor) -> Screen {
        let config = PatternConfig::Lines {
            density: 100.0,
            thickness,
            rotation: 0.0,
        };
        Screen::new(&config, 400.0, 0.0, floor).expect("lines is a screen")
    }

    fn spiral(thickness: f64) -> Screen {
        let config = PatternConfig::Spiral {
            density: 60.0,
            thickness,
            rotation: 0.0,
        };
        Screen::new(&config, 256.0, 0.0, FeatureFloor::none()).expect("spiral is a screen")
    }

    fn dots(shape: DotShape, floor: FeatureFloor) -> Screen {
        let config = PatternConfig::Dots {
            density: 100.0,
            thickness: 1.0,
            rotation: 0.0,
            shape,
        };
        Screen::new(&config, 400.0, 0.0, floor).expect("dots is a screen")
    }

    // Tests only the periodic modes resolve to screens
    // Verified by treating flow as a line screen
    #[test]
    fn test_screen_kinds() {
        assert_eq!(spiral(1.0).kind(), ScreenKind::Spiral);
        assert_eq!(
            dots(DotShape::Square, FeatureFloor::none()).kind(),
            ScreenKind::Dots(DotShape::Square)
        );
        let flow = PatternConfig::Flow {
            density: 10.0,
            thickness: 1.0,
        };
        assert!(Screen::new(&flow, 100.0, 0.0, FeatureFloor::none()).is_none());
        assert!(
            Screen::new(&PatternConfig::PhotoPassthrough, 100.0, 0.0, FeatureFloor::none())
                .is_none()
        );
    }

    // Tests the period length of each screen family
    // Verified by using the full extent for the spiral pitch
    #[test]
    fn test_spacing() {
        assert!((spiral(1.0).spacing() - 256.0 / 60.0).abs() < 1e-12);
        assert!((lines(1.0, FeatureFloor::none()).spacing() - 8.0).abs() < 1e-12);
        assert!((dots(DotShape::Circle, FeatureFloor::none()).spacing() - 8.0).abs() < 1e-12);
    }

    // Tests duty at the tone extremes and the spiral connectivity floor
    // Verified by applying the connectivity floor to line screens
    #[test]
    fn test_duty() {
        let screen = lines(0.5, FeatureFloor::none());
        assert!(screen.duty(1.0).abs() < f64::EPSILON);
        assert!((screen.duty(0.0) - 1.0).abs() < 1e-12);
        assert!((screen.duty(0.99) - 0.01).abs() < 1e-9);

        assert!((spiral(0.5).duty(0.99) - 0.05).abs() < 1e-12);
        assert!(spiral(0.5).duty(1.0).abs() < f64::EPSILON);
        assert!((spiral(0.05).duty(0.99) - 0.001).abs() < 1e-9);
    }

    // Tests feature width never shrinks as thickness grows or tone darkens
    // Verified by inverting the thickness factor
    #[test]
    fn test_monotonic_in_thickness_and_tone() {
        for tone in [0.0, 0.2, 0.5, 0.8, 0.97] {
            let mut previous = 0.0;
            for step in 1..=20 {
                let width = lines(f64::from(step) * 0.1, FeatureFloor::none()).feature_width(tone);
                assert!(width >= previous, "tone {tone} step {step}");
                previous = width;
            }
        }
        let screen = dots(DotShape::Circle, FeatureFloor::none());
        let mut previous = 0.0;
        for step in (0..=10).rev() {
            let width = screen.feature_width(f64::from(step) / 10.0);
            assert!(width >= previous);
            previous = width;
        }
    }

    // Tests the floor raises thin but visible features and leaves empty ones empty
    // Verified by flooring zero duty
    #[test]
    fn test_constrained_features() {
        let floor = FeatureFloor::pixels(2.56);
        let screen = lines(0.5, floor);
        for tone in [0.5, 0.9, 0.99, 0.999] {
            assert!(screen.feature_width(tone) >= 2.56 - 1e-9, "tone {tone}");
        }
        assert!(screen.feature_width(1.0).abs() < f64::EPSILON);

        let screen = dots(DotShape::Circle, FeatureFloor::pixels(4.0));
        assert!((screen.cutoff(0.9) - 0.5).abs() < 1e-12);
        assert!((screen.feature_width(0.9) - 4.0).abs() < 1e-9);
        assert!(screen.dot_extent(1.0).abs() < f64::EPSILON);
    }

    // Lengths of foreground runs along a ray, ignoring runs cut by either end
    fn painted_runs(screen: &Screen, tone: f64, direction: (f64, f64)) -> Vec<f64> {
        let step = 1e-3;
        let mut runs = Vec::new();
        let mut start = None;
        let mut previous = true;
        for index in 0..60_000 {
            let distance = 2.0 + f64::from(index) * step;
            let inside =
                screen.is_foreground(direction.0 * distance, direction.1 * distance, tone);
            match (inside, start) {
                (true, None) if !previous => start = Some(distance),
                (false, Some(begin)) => {
                    runs.push(distance - begin);
                    start = None;
                }
                _ => {}
            }
            previous = inside;
        }
        runs
    }

    // Tests the painted band along a ray is as wide as the reported feature width
    // Verified by flooring the duty fraction instead of the painted width
    #[test]
    fn test_painted_band_width_meets_floor() {
        let floor = FeatureFloor::pixels(2.56);
        let config = PatternConfig::Spiral {
            density: 16.0,
            thickness: 0.5,
            rotation: 0.0,
        };
        let spiral = Screen::new(&config, 64.0, 0.0, floor).expect("spiral is a screen");
        assert!((spiral.spacing() - 4.0).abs() < 1e-12);
        let config = PatternConfig::Lines {
            density: 16.0,
            thickness: 0.5,
            rotation: 0.0,
        };
        let lines = Screen::new(&config, 32.0, 0.0, floor).expect("lines is a screen");

        for (screen, direction) in [(spiral, (1.0, 0.0)), (lines, (0.0, 1.0))] {
            for tone in [0.5, 0.8, 0.9, 0.99] {
                let expected = screen.feature_width(tone);
                assert!(expected >= 2.56 - 1e-9, "tone {tone} width {expected}");
                let runs = painted_runs(&screen, tone, direction);
                assert!(runs.len() >= 5, "tone {tone}");
                for run in runs {
                    assert!((run - expected).abs() < 5e-3, "tone {tone} run {run} vs {expected}");
                }
            }
        }
    }

    // Tests constrained dots keep their narrowest side at the floor
    // Verified by capping the cutoff with the full cell fraction for every shape
    #[test]
    fn test_constrained_dot_shapes() {
        for shape in [
            DotShape::Circle,
            DotShape::Square,
            DotShape::Diamond,
            DotShape::Triangle,
        ] {
            let screen = dots(shape, FeatureFloor::pixels(4.0));
            let width = screen.feature_width(0.9);
            assert!((width - 4.0).abs() < 1e-9, "{shape:?} width {width}");
            assert!(screen.feature_width(1.0).abs() < f64::EPSILON);
        }
        assert!((narrowest_width(DotShape::Diamond) - FRAC_1_SQRT_2).abs() < 1e-12);
        let [apex, left, _] = triangle_vertices(1.0);
        assert!(((left.1 - apex.1) / 2.0 - narrowest_width(DotShape::Triangle)).abs() < 1e-12);
    }

    // Tests a heavy stroke on black covers every offset
    // Verified by comparing against the raw duty instead of the normalised wave
    #[test]
    fn test_black_spiral_is_solid() {
        let screen = spiral(2.0);
        for step in 0..200 {
            let angle = f64::from(step) * 0.37;
            let radius = f64::from(step) * 1.21;
            assert!(screen.is_foreground(radius * angle.cos(), radius * angle.sin(), 0.0));
        }
        assert!(!screen.is_foreground(10.0, 10.0, 1.0));
    }

    // Tests the dome peaks at the cell center and vanishes at its corner
    // Verified by offsetting the cell center by half a cell
    #[test]
    fn test_dot_dome() {
        let screen = dots(DotShape::Circle, FeatureFloor::none());
        let grid = screen.spacing();
        assert!((screen.dome(grid / 2.0, grid / 2.0) - 1.0).abs() < 1e-12);
        assert!(screen.dome(0.0, 0.0).abs() < f64::EPSILON);
        assert!(screen.is_foreground(grid / 2.0, grid / 2.0, 0.5));
        assert!(!screen.is_foreground(0.0, 0.0, 0.5));
    }

    // Tests each footprint reaches one on its own outline
    // Verified by swapping the square and diamond metrics
    #[test]
    fn test_dot_distance() {
        assert!((dot_distance(DotShape::Circle, 0.6, 0.8) - 1.0).abs() < 1e-12);
        assert!((dot_distance(DotShape::Square, 0.3, -1.0) - 1.0).abs() < 1e-12);
        assert!((dot_distance(DotShape::Diamond, 0.5, -0.5) - 1.0).abs() < 1e-12);
        for (x, y) in triangle_vertices(1.0) {
            assert!((dot_distance(DotShape::Triangle, x, y) - 1.0).abs() < 1e-9);
        }
        assert!(dot_distance(DotShape::Triangle, 0.0, 0.0).abs() < 1e-12);
    }
}
