//! # tsbench Configuration System
//!
//! Layered configuration for benchmark trials.
//!
//! ## Features
//! - **Layering**: defaults, YAML file, `TSBENCH_*` environment, command line
//! - **Validation**: counts, names and topology are checked before any thread
//!   is spawned; a config that fails here never produces a trial

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod telemetry;
mod topology;
mod trial;
mod validation;

pub use error::ConfigError;
pub use telemetry::TelemetryConfig;
pub use topology::TopologyConfig;
pub use trial::TrialSettings;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/tsbench.yaml";

/// Prefix of environment overrides, e.g. `TSBENCH_TRIAL__THREAD_COUNT=8`.
pub const ENV_PREFIX: &str = "TSBENCH_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct BenchConfig {
    /// The measured run.
    #[validate(nested)]
    #[serde(default)]
    pub trial: TrialSettings,

    /// Host layout and thread placement.
    #[validate(nested)]
    #[serde(default)]
    pub topology: TopologyConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Command-line values layered on top of every other source.
///
/// Names stay as text so unknown selectors are rejected by the same
/// extraction step as file and environment values.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    pub trial: TrialOverrides,
    pub topology: TopologyOverrides,
    pub telemetry: TelemetryOverrides,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TrialOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_mode: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TopologyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TelemetryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_metrics: Option<bool>,
}

impl BenchConfig {
    /// Load configuration from the default file and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/tsbench.yaml`, if present
    /// 3. `TSBENCH_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None, &Overrides::default())
    }

    /// Load configuration with an optional explicit file and command-line
    /// overrides on top.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load_with(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::extract(Self::layered(path, overrides)?)
    }

    /// Load only the topology section, through the same layers.
    ///
    /// Used when no trial is run, so trial fields may be absent.
    pub fn load_topology(
        path: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<TopologyConfig, ConfigError> {
        let topology: TopologyConfig = Self::layered(path, overrides)?.extract_inner("topology")?;
        topology.validate()?;
        topology.topology()?;
        Ok(topology)
    }

    fn layered(path: Option<&Path>, overrides: &Overrides) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(BenchConfig::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(PathBuf::from(path)));
                }
                figment = figment.merge(Yaml::file(path));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
                }
            }
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides)))
    }

    /// Load configuration from a specific path, without the environment layer.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(BenchConfig::default())).merge(Yaml::file(path)),
        )
    }

    /// Field validation plus the cross-field topology check.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.topology.topology()?;
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.ensure_valid()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use tsbench_core::timestamp::SourceVariant;
    use tsbench_core::topology::PlacementPolicy;
    use tsbench_core::work::CountMode;

    fn overrides(ops: u64, threads: usize, source: &str) -> Overrides {
        Overrides {
            trial: TrialOverrides {
                operation_count: Some(ops),
                thread_count: Some(threads),
                source: Some(source.into()),
                count_mode: None,
            },
            ..Overrides::default()
        }
    }

    #[test]
    fn default_config_is_incomplete() {
        assert!(BenchConfig::default().validate().is_err());
    }

    #[test]
    fn overrides_complete_the_defaults() {
        Jail::expect_with(|_| {
            let config = BenchConfig::load_with(None, &overrides(7, 3, "epoch_counter"))
                .expect("overrides should produce a valid config");
            assert_eq!(config.trial.operation_count, Some(7));
            assert_eq!(config.trial.thread_count, Some(3));
            assert_eq!(config.trial.source, Some(SourceVariant::EpochCounter));
            assert_eq!(config.trial.count_mode, CountMode::Total);
            assert_eq!(config.topology.placement, PlacementPolicy::Unpinned);
            Ok(())
        });
    }

    #[test]
    fn file_then_environment_then_overrides() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                DEFAULT_CONFIG_PATH,
                r#"
trial:
  operation_count: 1000
  thread_count: 2
  source: hardware_cycle
  count_mode: per_thread
topology:
  placement: zone_saturate_first
"#,
            )?;
            jail.set_env("TSBENCH_TRIAL__THREAD_COUNT", "8");

            let config = BenchConfig::load().expect("file and env should load");
            assert_eq!(config.trial.operation_count, Some(1000));
            assert_eq!(config.trial.thread_count, Some(8));
            assert_eq!(config.trial.count_mode, CountMode::PerThread);
            assert_eq!(config.topology.placement, PlacementPolicy::ZoneSaturateFirst);

            let mut cli = Overrides::default();
            cli.topology.placement = Some("pair_saturate_first".into());
            cli.trial.source = Some("adaptive_clock_read_after_bump".into());
            let config = BenchConfig::load_with(None, &cli).expect("overrides should apply");
            assert_eq!(config.topology.placement, PlacementPolicy::PairSaturateFirst);
            assert_eq!(
                config.trial.source,
                Some(SourceVariant::AdaptiveClockReadAfterBump)
            );
            assert_eq!(config.trial.thread_count, Some(8));
            Ok(())
        });
    }

    #[test]
    fn unknown_source_is_a_parsing_error() {
        Jail::expect_with(|_| {
            let err = BenchConfig::load_with(None, &overrides(10, 1, "sundial")).unwrap_err();
            assert!(matches!(err, ConfigError::Parsing(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_threads_is_a_validation_error() {
        Jail::expect_with(|_| {
            let err = BenchConfig::load_with(None, &overrides(10, 0, "hardware_cycle")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            assert!(err.to_string().contains("thread_count"));
            Ok(())
        });
    }

    #[test]
    fn inconsistent_topology_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TSBENCH_TOPOLOGY__SIBLING_DISTANCE", "10");
            let err = BenchConfig::load_with(None, &overrides(10, 1, "hardware_cycle")).unwrap_err();
            assert!(matches!(err, ConfigError::Topology(_)));
            Ok(())
        });
    }

    #[test]
    fn topology_loads_without_trial_settings() {
        Jail::expect_with(|jail| {
            jail.set_env("TSBENCH_TOPOLOGY__ZONE_COUNT", "2");
            jail.set_env("TSBENCH_TOPOLOGY__ZONE_SLOTS", "8");
            jail.set_env("TSBENCH_TOPOLOGY__SIBLING_DISTANCE", "8");
            let mut cli = Overrides::default();
            cli.topology.placement = Some("zone_saturate_first".into());
            let topology = BenchConfig::load_topology(None, &cli).expect("topology should load");
            assert_eq!(topology.zone_count, 2);
            assert_eq!(topology.zone_slots, 8);
            assert_eq!(topology.placement, PlacementPolicy::ZoneSaturateFirst);
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_reported() {
        let err = BenchConfig::load_with(
            Some(Path::new("does/not/exist.yaml")),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_from_path_reads_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "trial.yaml",
                "trial:\n  operation_count: 5\n  thread_count: 1\n  source: atomic_increment\n",
            )?;
            let config = BenchConfig::load_from_path("trial.yaml").expect("file should load");
            assert_eq!(config.trial.source, Some(SourceVariant::AtomicIncrement));
            assert_eq!(config.telemetry.log_level, "info");
            Ok(())
        });
    }
}
