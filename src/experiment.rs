//! Supports reading the experiment description from YAML and running the complete
//! sample, filter and evaluate sequence on the paper handover cell.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;
use nalgebra::{Matrix2, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use yaml_rust2::{Yaml, YamlLoader};
use crate::clearance::ClearanceEvaluator;
use crate::error::{ConfigError, SamplingError};
use crate::frame::MarkerFrame;
use crate::generator::{ConfigurationGenerator, GenerationStats, DEFAULT_MAX_ATTEMPTS};
use crate::kinematic_traits::Configuration;
use crate::region::{RegionPolygon, TABLE_HEIGHT};
use crate::rrt::RrtPlanner;
use crate::sampler::{Band, WeightedBands, WeightedSampler};
use crate::workcell::Workcell;

/// Start of the active arm: shoulder lifted, elbow bent, tool pointing down.
pub const ACTIVE_HOME: Configuration = [0.0, -FRAC_PI_2, FRAC_PI_2, -FRAC_PI_2, -FRAC_PI_2, 0.0, 0.0];

/// Companion arm folded over its own table.
pub const COMPANION_HOME: Configuration =
    [-1.7504954, -1.9503007, -1.3402034, -1.4011503, 1.6977167, 0.2199115, 0.0];

/// Complete description of one experiment run.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Number of configurations to generate.
    pub samples: usize,
    pub max_attempts: usize,

    /// Seed for sampling and planning. If None, each run differs.
    pub seed: Option<u64>,

    /// Arm mounting of the physical cell rather than the simulated one.
    pub mirrored: bool,
    pub marker: MarkerFrame,
    pub active_start: Configuration,
    pub companion_trajectory: Vec<Configuration>,
    pub sampler: WeightedSampler,
    pub planner: RrtPlanner,

    /// Exclude grasps under the companion gripper at its start pose.
    pub exclusion: bool,

    /// Score the accepted configurations with the clearance evaluator.
    pub evaluate: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            samples: 5,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            mirrored: false,
            marker: MarkerFrame::from_yaw(Vector3::new(0.0, 0.0, TABLE_HEIGHT), 0.0),
            active_start: ACTIVE_HOME,
            companion_trajectory: vec![COMPANION_HOME],
            sampler: WeightedSampler::default(),
            planner: RrtPlanner::default(),
            exclusion: false,
            evaluate: true,
        }
    }
}

/// Accepted configurations in acceptance order, with their scores if evaluated.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    pub configurations: Vec<Configuration>,
    pub stats: GenerationStats,
    pub scores: Option<Vec<f64>>,
}

impl ExperimentConfig {
    /// Read the experiment from YAML file. All fields are optional, defaults are used for
    /// the missing ones:
    /// ```yaml
    /// samples: 5
    /// max_attempts: 10000
    /// seed: 42
    /// mirrored: false
    /// marker:
    ///   position: [0.02, -0.01, 0.71]
    ///   yaw_deg: 3.5              # or rotation: [[1.0, 0.0], [0.0, 1.0]]
    /// active_start: [0.0, -1.5708, 1.5708, -1.5708, -1.5708, 0.0, 0.0]
    /// companion_trajectory:
    ///   - [-1.7505, -1.9503, -1.3402, -1.4012, 1.6977, 0.2199, 0.0]
    /// sampler:
    ///   x_bands: [[-0.105, 0.0], [0.0, 0.105]]
    ///   x_weights: [0.5, 0.75]
    ///   y_bands: [[0.1, 0.145], [0.02, 0.1], [-0.05, 0.02]]
    ///   y_weights: [0.85, 0.15, 0.05]
    /// planner:
    ///   step_deg: 3.0
    ///   max_try: 2000
    /// exclusion: false
    /// evaluate: true
    /// ```
    /// Joint angles are in radians. Configurations may list six joints, the tip joint is
    /// then zero.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}", e)))?;
        let mut config = ExperimentConfig::default();
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(config),
        };

        if let Some(samples) = opt_count(doc, "samples")? {
            config.samples = samples;
        }
        if let Some(max_attempts) = opt_count(doc, "max_attempts")? {
            config.max_attempts = max_attempts;
        }
        if let Some(seed) = opt_count(doc, "seed")? {
            config.seed = Some(seed as u64);
        }
        if let Some(mirrored) = opt_bool(doc, "mirrored")? {
            config.mirrored = mirrored;
        }
        if let Some(exclusion) = opt_bool(doc, "exclusion")? {
            config.exclusion = exclusion;
        }
        if let Some(evaluate) = opt_bool(doc, "evaluate")? {
            config.evaluate = evaluate;
        }

        let marker = &doc["marker"];
        if !marker.is_badvalue() {
            config.marker = read_marker(marker)?;
        }
        if !doc["active_start"].is_badvalue() {
            config.active_start = read_configuration(&doc["active_start"], "active_start")?;
        }
        if let Some(poses) = doc["companion_trajectory"].as_vec() {
            config.companion_trajectory = poses.iter()
                .enumerate()
                .map(|(i, pose)| read_configuration(pose, &format!("companion_trajectory[{}]", i)))
                .collect::<Result<_, _>>()?;
        }

        let sampler = &doc["sampler"];
        if !sampler.is_badvalue() {
            config.sampler = read_sampler(sampler, config.sampler)?;
        }

        let planner = &doc["planner"];
        if !planner.is_badvalue() {
            if let Some(step) = opt_number(planner, "step_deg")? {
                if !(step > 0.0) {
                    return Err(ConfigError::InvalidValue(format!("planner.step_deg = {}", step)));
                }
                config.planner.step_size_joint_space = step.to_radians();
            }
            if let Some(max_try) = opt_count(planner, "max_try")? {
                config.planner.max_try = max_try;
            }
        }
        config.planner.seed = config.seed;
        Ok(config)
    }

    /// Generate configurations on the paper handover cell and, if requested, score them.
    pub fn run(&self) -> Result<ExperimentResult, SamplingError> {
        let cell = Workcell::paper_handover(self.mirrored);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut generator = ConfigurationGenerator::new(
            cell.active.kinematics.as_ref(), &cell, self.marker,
            &self.companion_trajectory, self.active_start)
            .with_sampler(self.sampler.clone())
            .with_max_attempts(self.max_attempts);

        if self.exclusion {
            let footprint = self.companion_trajectory.first()
                .and_then(|start| RegionPolygon::gripper_footprint(&cell.companion.tip_pose(start)));
            if let Some(footprint) = footprint {
                generator = generator.with_exclusion(footprint);
            }
        }

        let (configurations, stats) = generator.generate_with_stats(self.samples, &mut rng)?;
        info!("Accepted {} configurations in {} attempts", stats.accepted, stats.attempts);

        let scores = if self.evaluate {
            let evaluator = ClearanceEvaluator::new(&self.planner, &cell);
            Some(evaluator.evaluate(&configurations, &self.active_start, &self.companion_trajectory)?)
        } else {
            None
        };
        Ok(ExperimentResult { configurations, stats, scores })
    }
}

fn as_number(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn opt_number(node: &Yaml, field: &str) -> Result<Option<f64>, ConfigError> {
    let value = &node[field];
    if value.is_badvalue() {
        return Ok(None);
    }
    as_number(value)
        .map(Some)
        .ok_or_else(|| ConfigError::WrongType { field: field.to_string(), expected: "a number" })
}

fn opt_count(node: &Yaml, field: &str) -> Result<Option<usize>, ConfigError> {
    let value = &node[field];
    if value.is_badvalue() {
        return Ok(None);
    }
    match value.as_i64() {
        Some(count) if count >= 0 => Ok(Some(count as usize)),
        _ => Err(ConfigError::WrongType { field: field.to_string(), expected: "a non-negative integer" }),
    }
}

fn opt_bool(node: &Yaml, field: &str) -> Result<Option<bool>, ConfigError> {
    let value = &node[field];
    if value.is_badvalue() {
        return Ok(None);
    }
    value.as_bool()
        .map(Some)
        .ok_or_else(|| ConfigError::WrongType { field: field.to_string(), expected: "true or false" })
}

fn numbers(value: &Yaml, field: &str) -> Result<Vec<f64>, ConfigError> {
    let items = value.as_vec()
        .ok_or_else(|| ConfigError::WrongType { field: field.to_string(), expected: "a list" })?;
    items.iter()
        .map(|item| as_number(item)
            .ok_or_else(|| ConfigError::WrongType { field: field.to_string(), expected: "a list of numbers" }))
        .collect()
}

fn fixed<const N: usize>(value: &Yaml, field: &str) -> Result<[f64; N], ConfigError> {
    let values = numbers(value, field)?;
    <[f64; N]>::try_from(values.as_slice()).map_err(|_| ConfigError::InvalidLength {
        field: field.to_string(),
        expected: N,
        found: values.len(),
    })
}

fn read_configuration(value: &Yaml, field: &str) -> Result<Configuration, ConfigError> {
    let values = numbers(value, field)?;
    match values.len() {
        6 | 7 => {
            let mut configuration = [0.0; 7];
            configuration[..values.len()].copy_from_slice(&values);
            Ok(configuration)
        }
        found => Err(ConfigError::InvalidLength { field: field.to_string(), expected: 7, found }),
    }
}

fn read_marker(marker: &Yaml) -> Result<MarkerFrame, ConfigError> {
    let position = &marker["position"];
    if position.is_badvalue() {
        return Err(ConfigError::MissingField("marker.position".to_string()));
    }
    let [x, y, z] = fixed::<3>(position, "marker.position")?;
    let position = Vector3::new(x, y, z);

    let rotation = &marker["rotation"];
    if !rotation.is_badvalue() {
        let rows = rotation.as_vec()
            .ok_or_else(|| ConfigError::WrongType { field: "marker.rotation".to_string(), expected: "a 2x2 matrix" })?;
        if rows.len() != 2 {
            return Err(ConfigError::InvalidLength {
                field: "marker.rotation".to_string(), expected: 2, found: rows.len() });
        }
        let [a, b] = fixed::<2>(&rows[0], "marker.rotation")?;
        let [c, d] = fixed::<2>(&rows[1], "marker.rotation")?;
        return MarkerFrame::from_matrix(position, Matrix2::new(a, b, c, d))
            .map_err(|e| ConfigError::InvalidValue(e.to_string()));
    }
    let yaw = opt_number(marker, "yaw_deg")?.unwrap_or(0.0);
    Ok(MarkerFrame::from_yaw(position, yaw.to_radians()))
}

fn read_bands(sampler: &Yaml, bands_field: &str, weights_field: &str,
              default: WeightedBands) -> Result<WeightedBands, ConfigError> {
    let bands = &sampler[bands_field];
    let weights = &sampler[weights_field];
    match (bands.is_badvalue(), weights.is_badvalue()) {
        (true, true) => Ok(default),
        (false, false) => {
            let bands = bands.as_vec()
                .ok_or_else(|| ConfigError::WrongType { field: bands_field.to_string(), expected: "a list of [from, to]" })?
                .iter()
                .map(|band| fixed::<2>(band, bands_field).map(|[from, to]| Band::new(from, to)))
                .collect::<Result<Vec<_>, _>>()?;
            let weights = numbers(weights, weights_field)?;
            Ok(WeightedBands::new(bands, weights)?)
        }
        (true, false) => Err(ConfigError::MissingField(bands_field.to_string())),
        (false, true) => Err(ConfigError::MissingField(weights_field.to_string())),
    }
}

fn read_sampler(sampler: &Yaml, default: WeightedSampler) -> Result<WeightedSampler, ConfigError> {
    let x = read_bands(sampler, "x_bands", "x_weights", default.x)?;
    let y = read_bands(sampler, "y_bands", "y_weights", default.y)?;
    Ok(WeightedSampler { x, y, orientation: default.orientation })
}
