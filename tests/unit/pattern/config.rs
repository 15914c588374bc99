//! Tests for pattern configuration, validation and per-mode settings

#[cfg(test)]
mod tests {
    use halftone_forge::pattern::config::{
        DotShape, ModeSettings, PatternConfig, PatternMode, PatternSettings,
    };

    // Tests each mode resolves to a variant carrying only its own fields
    // Verified by resolving lines into the spiral variant
    #[test]
    fn test_resolve_modes() {
        let values = ModeSettings {
            density: 30.0,
            thickness: 1.2,
            rotation: 15.0,
            dot_shape: DotShape::Diamond,
        };
        assert_eq!(
            values.resolve(PatternMode::Dots),
            PatternConfig::Dots {
                density: 30.0,
                thickness: 1.2,
                rotation: 15.0,
                shape: DotShape::Diamond,
            }
        );
        assert_eq!(
            values.resolve(PatternMode::Flow),
            PatternConfig::Flow {
                density: 30.0,
                thickness: 1.2,
            }
        );
        assert_eq!(values.resolve(PatternMode::Photo), PatternConfig::PhotoPassthrough);
        for mode in [
            PatternMode::Spiral,
            PatternMode::Lines,
            PatternMode::Dots,
            PatternMode::Flow,
            PatternMode::Stipple,
            PatternMode::Photo,
        ] {
            assert_eq!(values.resolve(mode).mode(), mode);
        }
    }

    // Tests density is floored at one and rotation defaults to zero for unrotated modes
    // Verified by removing the density floor
    #[test]
    fn test_accessors() {
        let spiral = PatternConfig::Spiral {
            density: 0.25,
            thickness: 0.5,
            rotation: 10.0,
        };
        assert!((spiral.density() - 1.0).abs() < f64::EPSILON);
        let stipple = PatternConfig::Stipple {
            density: 40.0,
            thickness: 0.7,
        };
        assert!(stipple.rotation().abs() < f64::EPSILON);
        assert!(PatternConfig::PhotoPassthrough.thickness().abs() < f64::EPSILON);
    }

    // Tests validation rejects thickness outside (0, 2] and non-finite values
    // Verified by accepting zero thickness
    #[test]
    fn test_validation() {
        assert!(PatternConfig::default().validate().is_ok());
        assert!(PatternConfig::PhotoPassthrough.validate().is_ok());
        let invalid = [
            PatternConfig::Lines { density: 60.0, thickness: 0.0, rotation: 0.0 },
            PatternConfig::Lines { density: 60.0, thickness: 2.5, rotation: 0.0 },
            PatternConfig::Lines { density: f64::NAN, thickness: 1.0, rotation: 0.0 },
            PatternConfig::Lines { density: 1e6, thickness: 1.0, rotation: 0.0 },
            PatternConfig::Lines { density: 60.0, thickness: 1.0, rotation: f64::INFINITY },
        ];
        for config in invalid {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    // Tests switching modes keeps each mode's own values and reset only touches the active one
    // Verified by sharing one settings slot across modes
    #[test]
    fn test_per_mode_memory() {
        let mut settings = PatternSettings::default();
        settings.settings_mut(PatternMode::Lines).density = 120.0;
        settings.active = PatternMode::Dots;
        settings.settings_mut(PatternMode::Dots).thickness = 1.5;

        settings.active = PatternMode::Lines;
        assert!((settings.resolve().density() - 120.0).abs() < f64::EPSILON);

        settings.active = PatternMode::Dots;
        settings.reset_active();
        assert_eq!(*settings.settings(PatternMode::Dots), ModeSettings::default());
        assert!((settings.settings(PatternMode::Lines).density - 120.0).abs() < f64::EPSILON);
    }

    // Tests the tagged JSON form round-trips
    // Verified by renaming the tag field
    #[test]
    fn test_serde_tagging() {
        let config = PatternConfig::Dots {
            density: 25.0,
            thickness: 0.8,
            rotation: 45.0,
            shape: DotShape::Triangle,
        };
        let json = serde_json::to_string(&config).expect("serializes");
        assert!(json.contains(r#""mode":"dots""#));
        assert!(json.contains(r#""shape":"triangle""#));
        let back: PatternConfig = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, config);
    }
}
