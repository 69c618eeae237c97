//! Trimming `package.json` down to what a published build needs

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Copied in this order; a build fails if any of them is absent.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "name",
    "version",
    "description",
    "author",
    "license",
    "main",
    "exports",
    "dependencies",
];

/// Copied after the required fields, only when present.
pub const OPTIONAL_FIELDS: [&str; 5] = [
    "types",
    "packageManager",
    "repository",
    "publishConfig",
    "keywords",
];

/// Replace every `from` with `to` in the serialized manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRewrite<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

/// The manifest written next to the compiled output.
#[derive(Debug, Clone, PartialEq)]
pub struct DistManifest {
    fields: Map<String, Value>,
}

impl DistManifest {
    /// Select the distributable fields of `source`, keeping the order of
    /// `REQUIRED_FIELDS` then `OPTIONAL_FIELDS`.
    pub fn from_source(source: &Map<String, Value>) -> Result<Self> {
        let mut fields = Map::new();

        for key in REQUIRED_FIELDS {
            let value = source
                .get(key)
                .ok_or_else(|| Error::ManifestFieldMissing(key.to_string()))?;
            fields.insert(key.to_string(), value.clone());
        }

        for key in OPTIONAL_FIELDS {
            if let Some(value) = source.get(key) {
                fields.insert(key.to_string(), value.clone());
            }
        }

        debug!("Kept {} of {} manifest fields", fields.len(), source.len());
        Ok(Self { fields })
    }

    pub fn read_source(path: &Path) -> Result<Map<String, Value>> {
        let contents = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::ManifestNotObject(path.to_path_buf())),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_source(&Self::read_source(path)?)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Two-space indented JSON without a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.fields)?)
    }

    pub fn render(&self, rewrite: Option<PathRewrite<'_>>) -> Result<String> {
        let text = self.to_json_string()?;
        Ok(match rewrite {
            Some(PathRewrite { from, to }) if !from.is_empty() => text.replace(from, to),
            _ => text,
        })
    }

    pub fn write_to(&self, path: &Path, rewrite: Option<PathRewrite<'_>>) -> Result<()> {
        let text = self.render(rewrite)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn source(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn minimal() -> Value {
        json!({
            "name": "x",
            "version": "1.0.0",
            "description": "d",
            "author": "a",
            "license": "MIT",
            "main": "index.js",
            "exports": {},
            "dependencies": {}
        })
    }

    #[test]
    fn test_required_fields_copied_unchanged() {
        let manifest = DistManifest::from_source(&source(minimal())).unwrap();
        assert_eq!(Value::Object(manifest.fields().clone()), minimal());
    }

    #[test]
    fn test_extra_fields_dropped_and_optional_kept() {
        let mut value = minimal();
        value["scripts"] = json!({ "build": "python3 .scripts/build.py" });
        value["devDependencies"] = json!({ "typescript": "^5.0.0" });
        value["keywords"] = json!(["boids"]);
        value["types"] = json!("src/index.d.ts");

        let manifest = DistManifest::from_source(&source(value)).unwrap();
        let keys: Vec<&str> = manifest.fields().keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            [
                "name",
                "version",
                "description",
                "author",
                "license",
                "main",
                "exports",
                "dependencies",
                "types",
                "keywords"
            ]
        );
    }

    #[test]
    fn test_missing_required_field() {
        let mut map = source(minimal());
        map.remove("license");

        let err = DistManifest::from_source(&map).unwrap_err();
        assert!(matches!(err, Error::ManifestFieldMissing(ref field) if field == "license"));
    }

    #[test]
    fn test_rendered_order_follows_field_lists() {
        let value = json!({
            "keywords": ["a"],
            "dependencies": { "left-pad": "1.3.0" },
            "exports": { ".": "./src/index.js" },
            "main": "src/index.js",
            "license": "MIT",
            "author": "a",
            "description": "d",
            "version": "1.0.0",
            "name": "x"
        });
        let manifest = DistManifest::from_source(&source(value)).unwrap();

        insta::assert_snapshot!(manifest.to_json_string().unwrap(), @r#"
        {
          "name": "x",
          "version": "1.0.0",
          "description": "d",
          "author": "a",
          "license": "MIT",
          "main": "src/index.js",
          "exports": {
            ".": "./src/index.js"
          },
          "dependencies": {
            "left-pad": "1.3.0"
          },
          "keywords": [
            "a"
          ]
        }
        "#);
    }

    #[test]
    fn test_render_without_rewrite_leaves_paths() {
        let mut value = minimal();
        value["main"] = json!("src/index.js");
        let manifest = DistManifest::from_source(&source(value)).unwrap();

        let text = manifest.render(None).unwrap();
        assert!(text.contains(r#""main": "src/index.js""#));
    }

    #[test]
    fn test_render_with_rewrite_replaces_prefix() {
        let mut value = minimal();
        value["main"] = json!("src/index.js");
        value["types"] = json!("src/index.d.ts");
        let manifest = DistManifest::from_source(&source(value)).unwrap();

        let text = manifest
            .render(Some(PathRewrite {
                from: "src/",
                to: "dist/",
            }))
            .unwrap();
        assert!(text.contains(r#""main": "dist/index.js""#));
        assert!(text.contains(r#""types": "dist/index.d.ts""#));
        assert!(!text.contains("src/"));
    }

    #[test]
    fn test_read_source_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = DistManifest::read_source(&path).unwrap_err();
        assert!(matches!(err, Error::ManifestNotObject(_)));
    }

    #[test]
    fn test_write_to_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("target").join("package.json");
        let manifest = DistManifest::from_source(&source(minimal())).unwrap();

        manifest.write_to(&path, None).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, minimal());
    }
}
