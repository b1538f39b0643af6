//! Configuration management for specdev.
//!
//! Parses `specdev.toml` configuration files with serde. Without a config
//! file the defaults describe the common Redocly workflow: watch `api.yaml`,
//! rebuild `index.html` with `npx @redocly/cli build-docs`, serve on port
//! 3004 with the reload socket on 3005.
//!
//! CLI settings can be applied during load via [`CliSettings`]. They are
//! merged before path resolution so derived build arguments pick up
//! overridden file names.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override reload socket port.
    pub reload_port: Option<u16>,
    /// Override the watched spec file (relative to the project root).
    pub spec_file: Option<String>,
    /// Override the generated output file (relative to the project root).
    pub output_file: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "specdev.toml";

/// Default spec file name when `[docs] spec_file` is unset.
const DEFAULT_SPEC_FILE: &str = "api.yaml";

/// Default output file name when `[docs] output_file` is unset.
const DEFAULT_OUTPUT_FILE: &str = "index.html";

/// Default build command when `[build]` is unset.
const DEFAULT_BUILD_COMMAND: &str = "npx";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    #[serde(default)]
    docs: DocsConfigRaw,
    /// Build tool configuration.
    #[serde(default)]
    build: BuildConfigRaw,
    /// File watching configuration.
    pub watch: WatchConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Port serving the generated documentation.
    pub port: u16,
    /// Port carrying the live-reload WebSocket.
    pub reload_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3004,
            reload_port: 3005,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    spec_file: Option<String>,
    output_file: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory served over HTTP; files outside it are refused.
    pub root: PathBuf,
    /// Spec file watched for changes.
    pub spec_file: PathBuf,
    /// Generated HTML file, overwritten on every successful build.
    pub output_file: PathBuf,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    command: Option<String>,
    args: Option<Vec<String>>,
}

/// Resolved build tool invocation.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Executable to run for each rebuild.
    pub command: String,
    /// Arguments passed verbatim, no shell involved.
    pub args: Vec<String>,
}

/// File watching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Change detection mechanism.
    pub mode: WatchMode,
    /// Poll interval in milliseconds (poll mode only).
    pub poll_interval_ms: u64,
    /// Trailing debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl WatchConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            mode: WatchMode::Poll,
            poll_interval_ms: 100,
            debounce_ms: 200,
        }
    }
}

/// Change detection mechanism for the watched spec file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Poll the file's modification time on a fixed interval.
    #[default]
    Poll,
    /// Use the operating system's change notification facility.
    Native,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise looks
    /// for `specdev.toml` in the current directory; without one the defaults
    /// apply. Paths resolve against the config file's directory, or against
    /// the current directory when no file is involved.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the merged configuration fails validation.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let (mut config, source) = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            (Self::parse_file(path)?, Some(path.to_path_buf()))
        } else if let Some(discovered) = Self::discover_config() {
            (Self::parse_file(&discovered)?, Some(discovered))
        } else {
            (Self::default(), None)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        let base = std::path::absolute(Self::base_dir(source.as_deref()))?;
        config.resolve_paths(&base);
        config.config_path = source;
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the raw configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(reload_port) = settings.reload_port {
            self.server.reload_port = reload_port;
        }
        if let Some(spec_file) = &settings.spec_file {
            self.docs.spec_file = Some(spec_file.clone());
        }
        if let Some(output_file) = &settings.output_file {
            self.docs.output_file = Some(output_file.clone());
        }
    }

    /// Directory that relative paths resolve against.
    fn base_dir(source: Option<&Path>) -> &Path {
        let parent = source.and_then(Path::parent).unwrap_or(Path::new("."));
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    }

    /// Look for a config file in the current directory.
    fn discover_config() -> Option<PathBuf> {
        let candidate = std::env::current_dir().ok()?.join(CONFIG_FILENAME);
        candidate.exists().then_some(candidate)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            build: BuildConfigRaw::default(),
            watch: WatchConfig::default(),
            docs_resolved: DocsConfig::default(),
            build_resolved: BuildConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Parse a config file without resolving paths.
    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve relative paths against the base directory and derive the
    /// build invocation.
    ///
    /// When neither `build.command` nor `build.args` is set, the arguments
    /// default to a Redocly invocation of the configured file names. A
    /// custom command without explicit args gets an empty argument list.
    fn resolve_paths(&mut self, base: &Path) {
        let spec_name = self.docs.spec_file.as_deref().unwrap_or(DEFAULT_SPEC_FILE);
        let output_name = self
            .docs
            .output_file
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FILE);

        let args = match (&self.build.command, &self.build.args) {
            (_, Some(args)) => args.clone(),
            (Some(_), None) => Vec::new(),
            (None, None) => vec![
                "@redocly/cli".to_owned(),
                "build-docs".to_owned(),
                spec_name.to_owned(),
                "--output".to_owned(),
                output_name.to_owned(),
            ],
        };

        self.docs_resolved = DocsConfig {
            root: base.to_path_buf(),
            spec_file: base.join(spec_name),
            output_file: base.join(output_name),
        };
        self.build_resolved = BuildConfig {
            command: self
                .build
                .command
                .clone()
                .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_owned()),
            args,
        };
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_docs()?;
        self.validate_build()?;
        self.validate_watch()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but the
        // injected reload script needs a predictable port to dial
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        if self.server.reload_port == 0 {
            return Err(ConfigError::Validation(
                "server.reload_port cannot be 0".to_owned(),
            ));
        }
        if self.server.port == self.server.reload_port {
            return Err(ConfigError::Validation(format!(
                "server.port and server.reload_port must differ (both are {})",
                self.server.port
            )));
        }

        Ok(())
    }

    /// Validate docs configuration.
    fn validate_docs(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.docs.spec_file {
            require_non_empty(name, "docs.spec_file")?;
        }
        if let Some(name) = &self.docs.output_file {
            require_non_empty(name, "docs.output_file")?;
        }
        Ok(())
    }

    /// Validate build configuration.
    fn validate_build(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build_resolved.command, "build.command")
    }

    /// Validate watch configuration.
    fn validate_watch(&self) -> Result<(), ConfigError> {
        if self.watch.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.poll_interval_ms must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3004);
        assert_eq!(config.server.reload_port, 3005);
        assert_eq!(config.docs_resolved.root, PathBuf::from("/test"));
        assert_eq!(
            config.docs_resolved.spec_file,
            PathBuf::from("/test/api.yaml")
        );
        assert_eq!(
            config.docs_resolved.output_file,
            PathBuf::from("/test/index.html")
        );
        assert_eq!(config.build_resolved.command, "npx");
        assert_eq!(
            config.build_resolved.args,
            vec![
                "@redocly/cli",
                "build-docs",
                "api.yaml",
                "--output",
                "index.html"
            ]
        );
        assert_eq!(config.watch.mode, WatchMode::Poll);
        assert_eq!(config.watch.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.watch.debounce_window(), Duration::from_millis(200));
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3004);
        assert_eq!(config.server.reload_port, 3005);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
reload_port = 9001
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.reload_port, 9001);
    }

    #[test]
    fn test_parse_watch_config() {
        let toml = r#"
[watch]
mode = "native"
poll_interval_ms = 50
debounce_ms = 500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.watch.mode, WatchMode::Native);
        assert_eq!(config.watch.poll_interval_ms, 50);
        assert_eq!(config.watch.debounce_ms, 500);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
spec_file = "openapi.yaml"
output_file = "docs.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.docs_resolved.root, PathBuf::from("/project"));
        assert_eq!(
            config.docs_resolved.spec_file,
            PathBuf::from("/project/openapi.yaml")
        );
        assert_eq!(
            config.docs_resolved.output_file,
            PathBuf::from("/project/docs.html")
        );
    }

    #[test]
    fn test_derived_args_follow_file_names() {
        let toml = r#"
[docs]
spec_file = "openapi.yaml"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.build_resolved.command, "npx");
        assert_eq!(
            config.build_resolved.args,
            vec![
                "@redocly/cli",
                "build-docs",
                "openapi.yaml",
                "--output",
                "index.html"
            ]
        );
    }

    #[test]
    fn test_explicit_build_invocation() {
        let toml = r#"
[build]
command = "redocly"
args = ["build-docs", "api.yaml"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.build_resolved.command, "redocly");
        assert_eq!(config.build_resolved.args, vec!["build-docs", "api.yaml"]);
    }

    #[test]
    fn test_custom_command_without_args() {
        let toml = r#"
[build]
command = "make"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.build_resolved.command, "make");
        assert!(config.build_resolved.args.is_empty());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_colliding_ports() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 3005;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_validate_rejects_empty_spec_file() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.docs.spec_file = Some(String::new());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.spec_file"));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.watch.poll_interval_ms = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Config::load(Some(Path::new("/nonexistent/specdev.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("specdev.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 4000

[docs]
spec_file = "openapi.yaml"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.docs_resolved.root, dir.path());
        assert_eq!(
            config.docs_resolved.spec_file,
            dir.path().join("openapi.yaml")
        );
        assert_eq!(config.config_path, Some(config_path));
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("specdev.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 4000
"#,
        )
        .unwrap();

        let settings = CliSettings {
            port: Some(5000),
            spec_file: Some("petstore.yaml".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&config_path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(
            config.docs_resolved.spec_file,
            dir.path().join("petstore.yaml")
        );
        // Derived build args see the override
        assert!(
            config
                .build_resolved
                .args
                .contains(&"petstore.yaml".to_owned())
        );
    }

    #[test]
    fn test_cli_settings_rejected_by_validation() {
        let settings = CliSettings {
            port: Some(3005),
            ..CliSettings::default()
        };
        let result = Config::load(Some(Path::new("/nonexistent")), Some(&settings));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("specdev.toml");
        std::fs::write(&config_path, "").unwrap();
        let result = Config::load(Some(&config_path), Some(&settings));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
