use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Category assigned to layers that carry no `org.wildfly.category` property.
pub const INTERNAL_CATEGORY: &str = "Internal";

/// Maven-style `groupId:artifactId:version` coordinates of a feature pack.
///
/// Stored on every catalog layer (`feature-pack`) so readers can trace a
/// layer back to the package that contributed it.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// Name of a functional category (`org.wildfly.category`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(pub String);

/// Layer name, unique within one feature pack.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerName(pub String);

impl Coordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    /// Parse `groupId:artifactId:version`. Extra segments (classifier,
    /// extension) are ignored; missing or empty ones are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        if parts.len() < 3 || parts[..3].iter().any(|p| p.trim().is_empty()) {
            bail!("invalid feature-pack coordinates '{raw}', expected groupId:artifactId:version");
        }
        Ok(Self::new(parts[0].trim(), parts[1].trim(), parts[2].trim()))
    }

    /// Directory the package's documentation is materialized under.
    pub fn directory_name(&self) -> String {
        format!("{}_{}", self.group_id, self.artifact_id)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl Serialize for Coordinates {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

impl CategoryName {
    pub fn internal() -> Self {
        CategoryName(INTERNAL_CATEGORY.to_string())
    }

    pub fn is_internal(&self) -> bool {
        self.0 == INTERNAL_CATEGORY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LayerName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_and_display() {
        let coords = Coordinates::parse("org.wildfly:wildfly-ee-galleon-pack:32.0.0.Final").unwrap();
        assert_eq!(coords.group_id, "org.wildfly");
        assert_eq!(coords.artifact_id, "wildfly-ee-galleon-pack");
        assert_eq!(coords.version, "32.0.0.Final");
        assert_eq!(
            coords.to_string(),
            "org.wildfly:wildfly-ee-galleon-pack:32.0.0.Final"
        );
        assert_eq!(coords.directory_name(), "org.wildfly_wildfly-ee-galleon-pack");
    }

    #[test]
    fn coordinates_reject_missing_parts() {
        for raw in ["org.wildfly:pack", "org.wildfly::1.0", "", ":a:b"] {
            let err = Coordinates::parse(raw).expect_err("should reject");
            assert!(err.to_string().contains("invalid feature-pack coordinates"));
        }
    }

    #[test]
    fn coordinates_serde_as_string() {
        let coords = Coordinates::new("g", "a", "1");
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, "\"g:a:1\"");
        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coords);
        assert!(serde_json::from_str::<Coordinates>("\"g:a\"").is_err());
    }

    #[test]
    fn internal_category_detection() {
        assert!(CategoryName::internal().is_internal());
        assert!(!CategoryName("Web".into()).is_internal());
        let json = serde_json::to_string(&LayerName("jaxrs".into())).unwrap();
        assert_eq!(json, "\"jaxrs\"");
    }
}
