use std::any::Any;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ahash::HashMap;
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(long, short)]
    pub config: String,
    #[arg(long = "set", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

impl CommandLineArgs {
    pub fn new_with_path(path: impl ToString) -> Self {
        CommandLineArgs {
            config: path.to_string(),
            overrides: Vec::new(),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=');
    match pos {
        Some(pos) => Ok((s[..pos].to_string(), s[pos + 1..].to_string())),
        None => Err(format!("invalid KEY=VALUE: no `=` found in `{s}`")),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file at {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value '{value}' for config key '{key}'")]
    Override { key: String, value: String },
}

/// Config modules keyed by name. Modules are plain values; missing modules fall back to their
/// defaults when queried.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    modules: HashMap<String, Box<dyn ConfigModule>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl Config {
    pub fn from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(config_path).map_err(|source| ConfigError::Open {
            path: config_path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?;
        config.context = Some(config_path.to_path_buf());
        info!("Loaded config from {config_path:?}");
        Ok(config)
    }

    pub fn from_args(args: &CommandLineArgs) -> Result<Self, ConfigError> {
        let mut config = Config::from_file(Path::new(&args.config))?;
        config.apply_overrides(&args.overrides)?;
        Ok(config)
    }

    /// The path of the config file. Relative paths in the config are resolved against it.
    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    /// Apply key-value overrides to the config, e.g. simulation.flow_capacity_factor=0.1
    fn apply_overrides(&mut self, overrides: &[(String, String)]) -> Result<(), ConfigError> {
        if !overrides.is_empty() {
            info!("Applying overrides: {:?}", overrides);
        }

        for (key, value) in overrides {
            let invalid = || ConfigError::Override {
                key: key.clone(),
                value: value.clone(),
            };
            match key.as_str() {
                "simulation.flow_capacity_factor" => {
                    let mut simulation = self.simulation();
                    simulation.flow_capacity_factor = value.parse().map_err(|_| invalid())?;
                    self.set_simulation(simulation);
                }
                "simulation.storage_capacity_factor" => {
                    let mut simulation = self.simulation();
                    simulation.storage_capacity_factor = value.parse().map_err(|_| invalid())?;
                    self.set_simulation(simulation);
                }
                "lanes.use_lanes" => {
                    let mut lanes = self.lanes();
                    lanes.use_lanes = value.parse().map_err(|_| invalid())?;
                    self.set_lanes(lanes);
                }
                "lanes.validation" => {
                    let mut lanes = self.lanes();
                    lanes.validation = match value.as_str() {
                        "None" => LaneValidation::None,
                        "Warn" => LaneValidation::Warn,
                        "Strict" => LaneValidation::Strict,
                        _ => return Err(invalid()),
                    };
                    self.set_lanes(lanes);
                }
                "output.output_dir" => {
                    let mut output = self.output();
                    output.output_dir = value.clone();
                    self.set_output(output);
                }
                _ => warn!("No override handler found for key: {}", key),
            }
        }
        Ok(())
    }

    pub fn scenario(&self) -> Option<Scenario> {
        self.module::<Scenario>("scenario")
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.modules
            .insert("scenario".to_string(), Box::new(scenario));
    }

    pub fn simulation(&self) -> Simulation {
        self.module::<Simulation>("simulation").unwrap_or_default()
    }

    pub fn set_simulation(&mut self, simulation: Simulation) {
        self.modules
            .insert("simulation".to_string(), Box::new(simulation));
    }

    pub fn lanes(&self) -> Lanes {
        self.module::<Lanes>("lanes").unwrap_or_default()
    }

    pub fn set_lanes(&mut self, lanes: Lanes) {
        self.modules.insert("lanes".to_string(), Box::new(lanes));
    }

    pub fn output(&self) -> Output {
        self.module::<Output>("output").unwrap_or_default()
    }

    pub fn set_output(&mut self, output: Output) {
        self.modules.insert("output".to_string(), Box::new(output));
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.modules
            .get(key)
            .and_then(|boxed| boxed.as_ref().as_any().downcast_ref::<T>())
            .cloned()
    }
}

/// Input files of a scenario.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scenario {
    pub network: String,
    #[serde(default)]
    pub lanes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Simulation {
    #[serde(default = "f64_value_1")]
    pub flow_capacity_factor: f64,
    #[serde(default = "f64_value_1")]
    pub storage_capacity_factor: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            flow_capacity_factor: 1.0,
            storage_capacity_factor: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Lanes {
    #[serde(default = "bool_value_true")]
    pub use_lanes: bool,
    #[serde(default)]
    pub validation: LaneValidation,
}

impl Default for Lanes {
    fn default() -> Self {
        Self {
            use_lanes: true,
            validation: LaneValidation::None,
        }
    }
}

/// How inconsistent lane definitions are treated when capacities are computed.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum LaneValidation {
    /// Compute capacities as declared without looking at the lanes.
    #[default]
    None,
    /// Log every inconsistency, but compute capacities anyway.
    Warn,
    /// Refuse to compute capacities for inconsistent lanes.
    Strict,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Output {
    pub output_dir: String,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            output_dir: "./".to_string(),
            logging: Logging::None,
        }
    }
}

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default. At least it can't be parsed
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule: Debug {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for Scenario {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Simulation {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Lanes {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn f64_value_1() -> f64 {
    1.0
}

fn bool_value_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::simulation::config::{
        CommandLineArgs, Config, ConfigError, LaneValidation, Lanes, Logging, Output, Scenario,
        Simulation,
    };

    #[test]
    fn read_from_yaml() {
        let mut config = Config::default();
        config.set_scenario(Scenario {
            network: "network.yml".to_string(),
            lanes: Some("lanes.yml".to_string()),
        });
        config.set_simulation(Simulation {
            flow_capacity_factor: 0.1,
            storage_capacity_factor: 0.2,
        });
        config.set_lanes(Lanes {
            use_lanes: false,
            validation: LaneValidation::Strict,
        });

        let yaml = serde_yaml::to_string(&config).expect("Failed to serialize yaml");
        let parsed_config: Config = serde_yaml::from_str(&yaml).expect("failed to parse config");

        assert_eq!(
            Some("lanes.yml".to_string()),
            parsed_config.scenario().unwrap().lanes
        );
        assert_eq!(0.1, parsed_config.simulation().flow_capacity_factor);
        assert_eq!(0.2, parsed_config.simulation().storage_capacity_factor);
        assert!(!parsed_config.lanes().use_lanes);
        assert_eq!(LaneValidation::Strict, parsed_config.lanes().validation);
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.scenario().is_none());
        assert_eq!(Simulation::default(), config.simulation());
        assert!(config.lanes().use_lanes);
        assert_eq!(LaneValidation::None, config.lanes().validation);
        assert_eq!(Output::default(), config.output());
    }

    #[test]
    fn read_partial_modules() {
        let yaml = r#"
        modules:
          simulation:
            type: Simulation
            flow_capacity_factor: 0.5
          lanes:
            type: Lanes
            validation: Warn
          output:
            type: Output
            output_dir: ./test_output
            logging: Info
        "#;
        let parsed_config: Config = serde_yaml::from_str(yaml).expect("failed to parse config");
        assert_eq!(0.5, parsed_config.simulation().flow_capacity_factor);
        assert_eq!(1.0, parsed_config.simulation().storage_capacity_factor);
        assert!(parsed_config.lanes().use_lanes);
        assert_eq!(LaneValidation::Warn, parsed_config.lanes().validation);
        assert_eq!(Logging::Info, parsed_config.output().logging);
        assert_eq!("./test_output", parsed_config.output().output_dir);
    }

    #[test]
    fn from_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
modules:
  scenario:
    type: Scenario
    network: network.yml
"#
        )
        .unwrap();

        let args = CommandLineArgs {
            config: file.path().to_string_lossy().to_string(),
            overrides: vec![
                (
                    "simulation.flow_capacity_factor".to_string(),
                    "0.25".to_string(),
                ),
                ("lanes.validation".to_string(), "Strict".to_string()),
                ("unknown.key".to_string(), "ignored".to_string()),
            ],
        };
        let config = Config::from_args(&args).unwrap();

        assert_eq!(Some(file.path()), config.context());
        assert_eq!("network.yml", config.scenario().unwrap().network);
        assert_eq!(0.25, config.simulation().flow_capacity_factor);
        assert_eq!(LaneValidation::Strict, config.lanes().validation);
    }

    #[test]
    fn invalid_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(&[(
            "simulation.flow_capacity_factor".to_string(),
            "fast".to_string(),
        )]);
        assert!(matches!(result, Err(ConfigError::Override { .. })));
    }

    #[test]
    fn missing_file() {
        let result = Config::from_file(std::path::Path::new("./does/not/exist.yml"));
        assert!(matches!(result, Err(ConfigError::Open { .. })));
    }

    #[test]
    fn parse_key_val() {
        let parsed = super::parse_key_val("output.output_dir=./out").unwrap();
        assert_eq!(("output.output_dir".to_string(), "./out".to_string()), parsed);
        assert!(super::parse_key_val("no-separator").is_err());
    }
}
