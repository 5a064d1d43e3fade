//! Body geometry descriptors.

/// Geometry name and model data sent alongside a skin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyGeometry {
    name: String,
    geometry_json: String,
    is_default: bool,
}

impl BodyGeometry {
    /// Creates geometry from a name and model descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, geometry_json: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            geometry_json: geometry_json.into(),
            is_default,
        }
    }

    /// Built-in humanoid geometry without ears. Carries no model data.
    #[must_use]
    pub fn legacy(slim: bool) -> Self {
        Self::new(resource_patch("geometry.humanoid.custom", slim), "", true)
    }

    /// Humanoid geometry with ears, using the model loaded at start-up.
    #[must_use]
    pub fn ears(slim: bool, geometry_json: impl Into<String>) -> Self {
        Self::new(resource_patch("geometry.humanoid.ears", slim), geometry_json, false)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn geometry_json(&self) -> &str {
        &self.geometry_json
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }
}

impl Default for BodyGeometry {
    fn default() -> Self {
        Self::legacy(false)
    }
}

fn resource_patch(base: &str, slim: bool) -> String {
    let suffix = if slim { "Slim" } else { "" };
    format!("{{\"geometry\" :{{\"default\" :\"{base}{suffix}\"}}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_names() {
        assert_eq!(
            BodyGeometry::legacy(false).name(),
            r#"{"geometry" :{"default" :"geometry.humanoid.custom"}}"#
        );
        assert_eq!(
            BodyGeometry::legacy(true).name(),
            r#"{"geometry" :{"default" :"geometry.humanoid.customSlim"}}"#
        );
        assert!(BodyGeometry::legacy(true).geometry_json().is_empty());
        assert!(BodyGeometry::default().is_default());
    }

    #[test]
    fn test_ears_name_is_valid_json() {
        let geometry = BodyGeometry::ears(true, "{}");
        let parsed: serde_json::Value = serde_json::from_str(geometry.name()).unwrap();
        assert_eq!(parsed["geometry"]["default"], "geometry.humanoid.earsSlim");
        assert!(!geometry.is_default());
    }
}
