//! Loading-focused tests for configuration
//!
//! File parsing, source precedence and environment overrides.

#[cfg(test)]
mod loading_tests {
    use std::path::{Path, PathBuf};

    use crate::config::{load_toml_file, ConfigSources, CONFIG_ENV, UNPERMITTED_ENV};
    use crate::{ConfigurationError, Error, Result, UnpermittedPolicy};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .map_err(|e| Error::io_error(format!("Failed to write test file: {e}")))?;
        Ok(path)
    }

    fn tempdir() -> Result<tempfile::TempDir> {
        tempfile::tempdir().map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))
    }

    fn sources(global: Option<PathBuf>, project: PathBuf, required: bool) -> ConfigSources {
        ConfigSources {
            global,
            project,
            project_required: required,
        }
    }

    const GLOBAL: &str = r#"
unpermitted = "log"

[[schemas]]
name = "shared"

[[schemas.fields]]
name = "q"
kind = "string"

[[schemas]]
name = "author_lookup"

[[schemas.fields]]
name = "surname"
kind = "string"
"#;

    const PROJECT: &str = r#"
[[schemas]]
name = "author_lookup"
unpermitted = "reject"

[[schemas.fields]]
name = "surname"
kind = "string"
required = true

[[schemas.fields]]
name = "initials"
kind = "string"
blank_is_absent = true
"#;

    #[test]
    fn test_missing_files_yield_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = sources(None, dir.path().join("absent.toml"), false).load(no_env)?;
        assert!(config.schemas.is_empty());
        assert_eq!(config.default_policy(), UnpermittedPolicy::Ignore);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() -> Result<()> {
        let dir = tempdir()?;
        let result = sources(None, dir.path().join("absent.toml"), true).load(no_env);
        assert!(matches!(result, Err(Error::Io(msg)) if msg.contains("not found")));
        Ok(())
    }

    #[test]
    fn test_project_overrides_global() -> Result<()> {
        let dir = tempdir()?;
        let global = write(dir.path(), "global.toml", GLOBAL)?;
        let project = write(dir.path(), "project.toml", PROJECT)?;

        let config = sources(Some(global), project, false).load(no_env)?;
        let names: Vec<_> = config.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["shared", "author_lookup"]);
        assert_eq!(config.default_policy(), UnpermittedPolicy::Log);

        let registry = config.registry()?;
        let lookup = registry.get("author_lookup")?;
        assert_eq!(lookup.fields().len(), 2);
        assert_eq!(lookup.unpermitted(), UnpermittedPolicy::Reject);
        assert_eq!(
            registry.get("shared")?.unpermitted(),
            UnpermittedPolicy::Log
        );
        Ok(())
    }

    #[test]
    fn test_env_overrides_default_policy() -> Result<()> {
        let dir = tempdir()?;
        let global = write(dir.path(), "global.toml", GLOBAL)?;
        let env = |key: &str| (key == UNPERMITTED_ENV).then(|| "Reject".to_string());

        let config = sources(Some(global), dir.path().join("absent.toml"), false).load(env)?;
        assert_eq!(config.default_policy(), UnpermittedPolicy::Reject);
        Ok(())
    }

    #[test]
    fn test_invalid_env_value_rejected() -> Result<()> {
        let dir = tempdir()?;
        let env = |key: &str| (key == UNPERMITTED_ENV).then(|| "sometimes".to_string());
        let result = sources(None, dir.path().join("absent.toml"), false).load(env);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::InvalidSetting { key, .. }))
                if key == UNPERMITTED_ENV
        ));
        Ok(())
    }

    #[test]
    fn test_env_config_path_is_explicit() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("custom.toml");
        let expected = path.display().to_string();
        let env = move |key: &str| (key == CONFIG_ENV).then(|| expected.clone());

        let discovered = ConfigSources::discover(None, env)?;
        assert_eq!(discovered.project, path);
        assert!(discovered.project_required);

        let flag = dir.path().join("flag.toml");
        let discovered = ConfigSources::discover(Some(&flag), no_env)?;
        assert_eq!(discovered.project, flag);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let dir = tempdir()?;
        let path = write(dir.path(), "bad.toml", "unpermitted = \n invalid toml [[[")?;
        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::Parse(msg)) if msg.contains("bad.toml")));
        Ok(())
    }

    #[test]
    fn test_unknown_keys_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = write(dir.path(), "typo.toml", "unpermited = \"log\"")?;
        assert!(matches!(load_toml_file(&path), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_is_io_error() -> Result<()> {
        let dir = tempdir()?;
        assert!(matches!(load_toml_file(dir.path()), Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    fn test_invalid_schema_aborts_loading() -> Result<()> {
        let dir = tempdir()?;
        let project = write(
            dir.path(),
            "project.toml",
            r#"
[[schemas]]
name = "search"

[[schemas.fields]]
name = "format"
kind = { enum = ["paper"] }
default = "pdf"
"#,
        )?;
        let result = sources(None, project, true).load(no_env);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::DefaultNotInEnum { .. }))
        ));
        Ok(())
    }
}
