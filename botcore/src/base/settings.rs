use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

use crate::{
    magic::{ENV_SETTINGS_PATH, MAX_PERMUTATIONS},
    utils::error::{BotError, BotResult},
};

/// How the Hilbert dimension of the hypotheses is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIs)]
pub enum DimensionStrategy {
    /// Grow independent variable sets through repeated elimination.
    IndependentSets,
    /// Search independent sets against the Groebner initials.
    Initials,
    /// Independent sets for small problems, initials otherwise.
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealGeomSettings {
    pub url: String,
    /// Seconds.
    pub timeout: u32,
    pub cas: String,
    pub use_web_service: bool,
    /// Try the direct elimination script before the explore service in comparisons.
    pub use_giac_elimination: bool,
    pub test_connection: bool,
}

impl Default for RealGeomSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8765".to_string(),
            timeout: 5,
            cas: "tarski".to_string(),
            use_web_service: false,
            use_giac_elimination: true,
            test_connection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverSettings {
    /// Coordinates fixed when only a yes/no answer is requested.
    pub fix_coordinates_prove: usize,
    /// Coordinates fixed when NDG conditions are requested.
    pub fix_coordinates_prove_details: usize,
    pub max_permutations: usize,
    pub free_points_never_collinear: bool,
    /// Report the NDG candidates recorded while building the statement.
    pub return_extra_ndgs: bool,
    pub transcendental_extension: bool,
    pub dimension_strategy: DimensionStrategy,
    /// Largest number of unsubstituted variables for which [`DimensionStrategy::Auto`]
    /// uses independent sets.
    pub auto_independent_sets_limit: usize,
    /// When the dimension check is inconclusive, eliminate once more over the
    /// maximal independent set found by the initials search.
    pub investigate_maximal_independent_set: bool,
    pub realgeom: RealGeomSettings,
}

impl Default for ProverSettings {
    fn default() -> Self {
        Self {
            fix_coordinates_prove: 4,
            fix_coordinates_prove_details: 4,
            max_permutations: MAX_PERMUTATIONS,
            free_points_never_collinear: false,
            return_extra_ndgs: false,
            transcendental_extension: true,
            dimension_strategy: DimensionStrategy::Auto,
            auto_independent_sets_limit: 6,
            investigate_maximal_independent_set: false,
            realgeom: RealGeomSettings::default(),
        }
    }
}

impl ProverSettings {
    /// Get the default path to the settings file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_SETTINGS_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
            path.push("botcore");
            path.push("settings.toml");
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
            path.push("botcore");
            path.push("settings.toml");
        }

        path
    }

    /// Settings from the default path, or the defaults if no file exists there.
    pub fn load_or_default() -> BotResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from_toml(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_toml(path: &Path) -> BotResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str).map_err(|e| match e {
            BotError::SettingsParseError { source, .. } => BotError::SettingsParseError {
                source,
                file: path.display().to_string(),
            },
            other => other,
        })
    }

    pub fn from_toml_str(toml_str: &str) -> BotResult<Self> {
        toml::from_str(toml_str).map_err(|e| BotError::SettingsParseError {
            source: e,
            file: "<string>".to_string(),
        })
    }

    pub fn save_to_toml(&self, path: &Path) -> BotResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| {
            BotError::Unknown(format!(
                "Failed during serialization of TOML to path `{}`: {}",
                path.display(),
                e
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Coordinates to fix for a proof in the given mode.
    pub fn fix_coordinates(&self, details: bool) -> usize {
        if details {
            self.fix_coordinates_prove_details
        } else {
            self.fix_coordinates_prove
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let settings = ProverSettings::from_toml_str(
            r#"
            max_permutations = 2
            dimension_strategy = "Initials"

            [realgeom]
            use_web_service = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.max_permutations, 2);
        assert!(settings.dimension_strategy.is_initials());
        assert!(settings.realgeom.use_web_service);
        assert_eq!(settings.realgeom.url, "http://localhost:8765");
        assert_eq!(settings.fix_coordinates_prove, 4);
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join(format!("botcore-settings-{}", std::process::id()));
        let path = dir.join("settings.toml");
        let mut settings = ProverSettings::default();
        settings.return_extra_ndgs = true;
        settings.realgeom.timeout = 9;
        settings.save_to_toml(&path).unwrap();
        assert_eq!(ProverSettings::load_from_toml(&path).unwrap(), settings);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_files_are_reported() {
        let err = ProverSettings::from_toml_str("max_permutations = \"many\"").unwrap_err();
        assert!(err.is_settings_parse_error());
    }
}
