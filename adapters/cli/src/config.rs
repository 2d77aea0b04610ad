use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrobry_simulation::SimulationConfig;

/// Errors raised while loading a session configuration file.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file {}", .path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The TOML file is not a valid configuration.
    #[error("could not parse config file {}", .path.display())]
    Toml {
        /// Location of the file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// The JSON file is not a valid configuration.
    #[error("could not parse config file {}", .path.display())]
    Json {
        /// Location of the file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a configuration file; `.toml` files are TOML, anything else JSON.
/// Absent fields keep their defaults.
pub(crate) fn load(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })
    } else {
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn written(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("chrobry-config-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("config written");
        path
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let path = written(
            "partial.toml",
            "master_seed = 5\n\n[population]\nroamer_cap = 4\n",
        );

        let config = load(&path).expect("loads");

        assert_eq!(config.master_seed, 5);
        assert_eq!(config.population.roamer_cap, 4);
        assert_eq!(
            config.population.initial_roamers,
            SimulationConfig::default().population.initial_roamers
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn json_is_accepted_for_other_extensions() {
        let path = written("size.json", r#"{ "width": 800, "height": 600 }"#);

        let config = load(&path).expect("loads");

        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 600.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_toml_names_the_file() {
        let path = written("broken.toml", "master_seed = [");

        let error = load(&path).expect_err("malformed");

        assert!(matches!(error, ConfigError::Toml { .. }));
        assert!(error.to_string().contains("broken.toml"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load(Path::new("/definitely/not/here.json")).expect_err("missing file");

        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }
}
