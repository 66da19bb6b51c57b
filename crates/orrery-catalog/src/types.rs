//! Catalog record types.
//!
//! These types mirror the JSON documents served by the catalog. Decoding is
//! lenient: the catalog is edited by hand, so numeric fields may arrive as
//! strings, as `null` or not at all. Nothing here rejects a record for a
//! malformed value; consumers decide how to substitute.

use serde::{Deserialize, Deserializer, Serialize};

/// Category of planets.
pub const TYPE_PLANET: &str = "planet";
/// Category of stars.
pub const TYPE_STAR: &str = "star";
/// Category of moons.
pub const TYPE_MOON: &str = "moon";
/// Anything else (dwarf planets, comets, ...).
pub const TYPE_OTHER: &str = "other";

/// A celestial body as stored in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CelestialBody {
    /// Catalog document id.
    pub id: String,
    /// Display name (English or localized).
    pub name: String,
    /// Category id the body belongs to (e.g. "planets").
    pub category: String,
    pub description: String,

    pub mass: Option<String>,
    pub temperature: Option<String>,
    pub atmosphere: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub orbital_period: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub moons: i64,

    /// Physical radius in kilometers.
    ///
    /// May be zero or NaN when the catalog entry is missing or malformed. The
    /// legacy documents spell the key `raduis`.
    #[serde(alias = "raduis", deserialize_with = "lenient_f64")]
    pub radius: f64,

    pub discovery_date: Option<String>,
    pub named_after: Option<String>,
    pub facts: Vec<String>,

    pub parent_planet: Option<String>,
    pub spectral_type: Option<String>,
    pub luminosity: Option<String>,
    pub age: Option<String>,

    /// Image URLs, first one is the thumbnail.
    pub images: Vec<String>,
    /// Reference to the 3D model (URL or storage path).
    pub model_url: Option<String>,
}

impl CelestialBody {
    /// Create a body with only the fields the placement engine reads.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, radius: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            radius,
            ..Self::default()
        }
    }

    /// Builder-style setter for the model reference.
    #[must_use]
    pub fn with_model(mut self, model_url: impl Into<String>) -> Self {
        self.model_url = Some(model_url.into());
        self
    }

    /// The model reference, if the body has a non-blank one.
    #[must_use]
    pub fn model_reference(&self) -> Option<&str> {
        self.model_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The thumbnail image, if any.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A catalog category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Some documents use `Description` instead.
    #[serde(alias = "Description")]
    pub description: String,
    /// Sort key; stored as either a number or a numeric string.
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
}

/// Map a singular body type to the plural category id used by the catalog.
///
/// Unknown types get an `s` appended.
#[must_use]
pub fn category_for_type(body_type: &str) -> String {
    match body_type.to_lowercase().as_str() {
        TYPE_PLANET => "planets".to_string(),
        TYPE_STAR => "stars".to_string(),
        TYPE_MOON => "moons".to_string(),
        TYPE_OTHER => "others".to_string(),
        _ => format!("{body_type}s"),
    }
}

/// Accept a number, a numeric string or null. Anything unparsable becomes NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        serde_json::Value::Null => 0.0,
        _ => f64::NAN,
    })
}

/// Accept an integer, a float, a numeric string or null. Anything unparsable becomes 0.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_decodes_legacy_radius_key() {
        let body: CelestialBody = serde_json::from_str(
            r#"{"id":"earth","name":"Earth","category":"planets","raduis":6371.0,"modelUrl":"models/earth.glb"}"#,
        )
        .unwrap();
        assert_eq!(body.id, "earth");
        assert!((body.radius - 6371.0).abs() < f64::EPSILON);
        assert_eq!(body.model_reference(), Some("models/earth.glb"));
    }

    #[test]
    fn test_body_decodes_missing_fields() {
        let body: CelestialBody = serde_json::from_str(r#"{"name":"Mars"}"#).unwrap();
        assert_eq!(body.name, "Mars");
        assert!(body.radius.abs() < f64::EPSILON);
        assert!(body.facts.is_empty());
        assert_eq!(body.model_reference(), None);
    }

    #[test]
    fn test_body_decodes_malformed_radius_as_nan() {
        let body: CelestialBody =
            serde_json::from_str(r#"{"name":"Mars","radius":"unknown"}"#).unwrap();
        assert!(body.radius.is_nan());

        let body: CelestialBody =
            serde_json::from_str(r#"{"name":"Mars","radius":"3389.5"}"#).unwrap();
        assert!((body.radius - 3389.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_model_reference_is_none() {
        let body = CelestialBody::new("x", "X", 1.0).with_model("   ");
        assert_eq!(body.model_reference(), None);
    }

    #[test]
    fn test_category_order_from_string() {
        let category: Category =
            serde_json::from_str(r#"{"id":"planets","name":"Planets","order":"2"}"#).unwrap();
        assert_eq!(category.order, 2);

        let category: Category =
            serde_json::from_str(r#"{"id":"stars","order":"first"}"#).unwrap();
        assert_eq!(category.order, 0);
    }

    #[test]
    fn test_category_capitalized_description() {
        let category: Category =
            serde_json::from_str(r#"{"id":"moons","Description":"Natural satellites"}"#).unwrap();
        assert_eq!(category.description, "Natural satellites");
    }

    #[test]
    fn test_category_for_type() {
        assert_eq!(category_for_type("planet"), "planets");
        assert_eq!(category_for_type("Star"), "stars");
        assert_eq!(category_for_type("moon"), "moons");
        assert_eq!(category_for_type("other"), "others");
        assert_eq!(category_for_type("comet"), "comets");
    }
}
