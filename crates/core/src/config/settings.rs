use crate::{
    error::{Error, Result},
    process::{DEFAULT_SHELL, quote_arg},
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAMES: [&str; 2] = [".tsdist.json", "tsdist.json"];

/// Placeholder in `compile_command` replaced with the quoted dist directory
pub const OUT_DIR_PLACEHOLDER: &str = "{out_dir}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Build output location, wiped at the start of every build
    pub output_dir: PathBuf,
    /// Compiler output, relative to `output_dir`
    pub dist_dir: PathBuf,
    pub compile_command: String,
    pub shell: String,
    /// Source manifest, relative to the project root
    pub manifest: PathBuf,
    pub quiet: bool,

    // Path rewriting inside the written manifest (off by default)
    pub rewrite_paths: bool,
    pub source_prefix: String,
    pub dist_prefix: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("target"),
            dist_dir: PathBuf::from("dist"),
            compile_command: format!("pnpm tsc --outDir {OUT_DIR_PLACEHOLDER}"),
            shell: DEFAULT_SHELL.to_string(),
            manifest: PathBuf::from("package.json"),
            quiet: false,
            rewrite_paths: false,
            source_prefix: "src/".to_string(),
            dist_prefix: "dist/".to_string(),
        }
    }
}

impl BuildConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// The config file found in `root`, or defaults when there is none.
    pub fn load_for_root(root: &Path) -> Result<Self> {
        match Self::find_config_file(root) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                debug!("No config file in {}, using defaults", root.display());
                Ok(Self::default())
            }
        }
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    /// Refuse an `output_dir` whose removal would take the project root, one
    /// of its ancestors, or the source manifest with it.
    pub fn validate_output_dir(&self, root: &Path) -> Result<()> {
        let output_dir = &self.output_dir;
        if output_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError("`output_dir` must not be empty".to_string()));
        }

        if output_dir
            .components()
            .any(|c| matches!(c, Component::CurDir | Component::ParentDir))
        {
            return Err(Error::ConfigError(format!(
                "`output_dir` must not contain `.` or `..`: {}",
                output_dir.display()
            )));
        }

        let resolve = |path: PathBuf| path.canonicalize().unwrap_or(path);
        let root = resolve(root.to_path_buf());
        let output = resolve(self.output_path(&root));
        let manifest = resolve(self.manifest_path(&root));

        if root.starts_with(&output) || manifest.starts_with(&output) {
            return Err(Error::ConfigError(format!(
                "`output_dir` {} would remove the project at {}",
                output.display(),
                root.display()
            )));
        }

        Ok(())
    }

    pub fn dist_path(&self, root: &Path) -> PathBuf {
        self.output_path(root).join(&self.dist_dir)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    /// Where the trimmed manifest is written: beside `dist`, named like the source.
    pub fn output_manifest_path(&self, root: &Path) -> PathBuf {
        let file_name = self
            .manifest
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("package.json"));
        self.output_path(root).join(file_name)
    }

    pub fn compile_command_for(&self, dist_path: &Path) -> String {
        self.compile_command
            .replace(OUT_DIR_PLACEHOLDER, &quote_arg(&dist_path.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_legacy_build() {
        let config = BuildConfig::default();
        let root = Path::new("/work/app");

        assert_eq!(config.output_path(root), PathBuf::from("/work/app/target"));
        assert_eq!(config.dist_path(root), PathBuf::from("/work/app/target/dist"));
        assert_eq!(
            config.output_manifest_path(root),
            PathBuf::from("/work/app/target/package.json")
        );
        assert_eq!(
            config.compile_command_for(&config.dist_path(root)),
            "pnpm tsc --outDir /work/app/target/dist"
        );
        assert!(!config.rewrite_paths);
    }

    #[test]
    fn test_compile_command_quotes_out_dir() {
        let config = BuildConfig::default();
        assert_eq!(
            config.compile_command_for(Path::new("/my app/target/dist")),
            "pnpm tsc --outDir '/my app/target/dist'"
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: BuildConfig =
            serde_json::from_str(r#"{ "output_dir": "build", "quiet": true }"#).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert!(config.quiet);
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".tsdist.json");
        std::fs::write(&path, r#"{ "outdir": "build" }"#).unwrap();

        let err = BuildConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_load_for_root_finds_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        assert_eq!(BuildConfig::load_for_root(root).unwrap(), BuildConfig::default());

        let config = BuildConfig {
            compile_command: "tsc -p . --outDir {out_dir}".to_string(),
            rewrite_paths: true,
            ..Default::default()
        };
        config.save_to_file(&root.join("tsdist.json")).unwrap();

        assert_eq!(BuildConfig::find_config_file(root), Some(root.join("tsdist.json")));
        assert_eq!(BuildConfig::load_for_root(root).unwrap(), config);
    }

    fn config_with_output(output_dir: impl Into<PathBuf>) -> BuildConfig {
        BuildConfig {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_output_dir_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        BuildConfig::default().validate_output_dir(temp_dir.path()).unwrap();
        config_with_output("build/out").validate_output_dir(temp_dir.path()).unwrap();
    }

    #[test]
    fn test_output_dir_resolving_to_root_or_above_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        std::fs::create_dir(&root).unwrap();

        for output_dir in [
            PathBuf::from(""),
            PathBuf::from("."),
            PathBuf::from(".."),
            PathBuf::from("./target"),
            PathBuf::from("target/../.."),
            root.clone(),
            temp_dir.path().to_path_buf(),
            PathBuf::from("/"),
        ] {
            let err = config_with_output(&output_dir)
                .validate_output_dir(&root)
                .unwrap_err();
            assert!(
                matches!(err, Error::ConfigError(_)),
                "{} should be rejected",
                output_dir.display()
            );
        }
    }

    #[test]
    fn test_output_dir_holding_manifest_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = BuildConfig {
            manifest: PathBuf::from("pkg/package.json"),
            ..config_with_output("pkg")
        };

        let err = config.validate_output_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
