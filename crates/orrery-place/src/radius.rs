//! Physical radius substitution.
//!
//! Catalog radii are hand-entered and sometimes missing. Anything not finite
//! or at most 1 km is replaced by a fixed per-name estimate so relative sizes
//! stay plausible.

use orrery_catalog::CelestialBody;

/// Radius used for names the table does not know.
pub const DEFAULT_ESTIMATE_KM: f64 = 1000.0;

/// Mean radii in kilometers, keyed by lower-cased English or Uzbek name.
const ESTIMATES_KM: &[(&str, f64)] = &[
    ("sun", 696_340.0),
    ("quyosh", 696_340.0),
    ("mercury", 2439.0),
    ("merkuriy", 2439.0),
    ("venus", 6051.0),
    ("venera", 6051.0),
    ("earth", 6371.0),
    ("yer", 6371.0),
    ("moon", 1737.0),
    ("oy", 1737.0),
    ("mars", 3389.0),
    ("jupiter", 69_911.0),
    ("yupiter", 69_911.0),
    ("saturn", 58_232.0),
    ("uranus", 25_362.0),
    ("uran", 25_362.0),
    ("neptune", 24_622.0),
    ("neptun", 24_622.0),
    ("pluto", 1188.0),
    ("pluton", 1188.0),
];

/// Estimated radius for a body name, ignoring case and surrounding whitespace.
#[must_use]
pub fn estimate_radius(name: &str) -> f64 {
    let key = name.trim().to_lowercase();
    ESTIMATES_KM
        .iter()
        .find(|(known, _)| *known == key)
        .map_or(DEFAULT_ESTIMATE_KM, |(_, radius)| *radius)
}

/// Whether a catalog radius can be used as-is.
#[must_use]
pub fn is_usable_radius(radius: f64) -> bool {
    radius.is_finite() && radius > 1.0
}

/// The body's radius, substituted from the estimate table when unusable.
#[must_use]
pub fn normalized_radius(body: &CelestialBody) -> f64 {
    if is_usable_radius(body.radius) {
        body.radius
    } else {
        let estimate = estimate_radius(&body.name);
        tracing::debug!(
            name = %body.name,
            radius = body.radius,
            estimate,
            "substituting radius estimate"
        );
        estimate
    }
}

/// Size of `radius` relative to `max_radius`, in `[0, 1]`.
///
/// Returns 1 when either value is unusable so a degenerate set still lays
/// out at full size instead of collapsing.
#[must_use]
pub fn radius_ratio(radius: f64, max_radius: f64) -> f32 {
    if !radius.is_finite() || !max_radius.is_finite() || max_radius <= 0.0 {
        return 1.0;
    }
    (radius / max_radius).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_estimate_is_case_insensitive() {
        assert_eq!(estimate_radius("Earth"), estimate_radius("earth"));
        assert_eq!(estimate_radius("earth"), estimate_radius(" EARTH "));
        assert!((estimate_radius("Earth") - 6371.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_localized_names() {
        assert!((estimate_radius("Quyosh") - 696_340.0).abs() < f64::EPSILON);
        assert!((estimate_radius("Yupiter") - 69_911.0).abs() < f64::EPSILON);
        assert!((estimate_radius("Mercury") - 2439.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_name_uses_default() {
        assert!((estimate_radius("Ceres") - DEFAULT_ESTIMATE_KM).abs() < f64::EPSILON);
        assert!((estimate_radius("") - DEFAULT_ESTIMATE_KM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_radius_substitution() {
        let mars = CelestialBody::new("mars", "Mars", f64::NAN);
        assert!((normalized_radius(&mars) - 3389.0).abs() < f64::EPSILON);

        let tiny = CelestialBody::new("moon", "Moon", 1.0);
        assert!((normalized_radius(&tiny) - 1737.0).abs() < f64::EPSILON);

        let real = CelestialBody::new("earth", "Earth", 6378.1);
        assert!((normalized_radius(&real) - 6378.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_radius_ratio_degenerate_max() {
        assert!((radius_ratio(10.0, 0.0) - 1.0).abs() < f32::EPSILON);
        assert!((radius_ratio(10.0, f64::NAN) - 1.0).abs() < f32::EPSILON);
        assert!((radius_ratio(f64::INFINITY, 10.0) - 1.0).abs() < f32::EPSILON);
        assert!((radius_ratio(20.0, 10.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sun_earth_mars_ratios() {
        let bodies = [
            CelestialBody::new("sun", "Sun", 696_340.0),
            CelestialBody::new("earth", "Earth", 6371.0),
            CelestialBody::new("mars", "Mars", f64::NAN),
        ];
        let radii: Vec<f64> = bodies.iter().map(normalized_radius).collect();
        assert!((radii[2] - 3389.0).abs() < f64::EPSILON);

        let max = radii.iter().copied().fold(0.0, f64::max);
        assert!((max - 696_340.0).abs() < f64::EPSILON);
        assert!((radius_ratio(radii[0], max) - 1.0).abs() < f32::EPSILON);
        assert!((radius_ratio(radii[1], max) - 0.009_15).abs() < 1e-5);
        assert!((radius_ratio(radii[2], max) - 0.004_87).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_estimate_ignores_case_and_padding(name in "[a-zA-Z]{1,10}", pad in " {0,3}") {
            let padded = format!("{pad}{}{pad}", name.to_uppercase());
            prop_assert_eq!(estimate_radius(&name), estimate_radius(&padded));
            prop_assert_eq!(estimate_radius(&name), estimate_radius(&name.to_lowercase()));
        }
    }
}
