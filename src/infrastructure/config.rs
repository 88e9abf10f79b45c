use serde::Deserialize;
use std::path::PathBuf;

const SETTINGS_FILE: &str = "config/dashgen";
const ENV_PREFIX: &str = "DASHGEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub pretty: bool,
}

/// Defaults, then `config/dashgen.*` if present, then `DASHGEN__OUTPUT__DIR` style variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(SETTINGS_FILE, None)
}

/// `env: None` reads the process environment.
pub fn load_settings_from(file: &str, env: Option<config::Map<String, String>>) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .set_default("output.dir", "dist")?
        .set_default("output.pretty", true)?
        .add_source(config::File::with_name(file).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .source(env),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn settings_file(dir: &tempfile::TempDir, contents: &str) -> String {
        let file = dir.path().join("dashgen.toml");
        std::fs::write(&file, contents).unwrap();
        file.to_str().unwrap().to_string()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = load_settings_from("config/does-not-exist", env(&[])).unwrap();
        assert_eq!(settings.output.dir, PathBuf::from("dist"));
        assert!(settings.output.pretty);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = settings_file(&dir, "[output]\ndir = \"provisioning\"\npretty = false\n");

        let settings = load_settings_from(&file, env(&[])).unwrap();
        assert_eq!(settings.output.dir, PathBuf::from("provisioning"));
        assert!(!settings.output.pretty);
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = settings_file(&dir, "[output]\ndir = \"provisioning\"\n");

        let settings = load_settings_from(
            &file,
            env(&[("DASHGEN__OUTPUT__DIR", "from-env"), ("DASHGEN__OUTPUT__PRETTY", "false")]),
        )
        .unwrap();
        assert_eq!(settings.output.dir, PathBuf::from("from-env"));
        assert!(!settings.output.pretty);

        // other prefixes are ignored
        let settings = load_settings_from(&file, env(&[("OTHER__OUTPUT__DIR", "elsewhere")])).unwrap();
        assert_eq!(settings.output.dir, PathBuf::from("provisioning"));
        assert!(settings.output.pretty);
    }
}
