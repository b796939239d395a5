//! Processing configuration.
//!
//! Every section and field has a default, so a configuration document only needs to name
//! what it changes.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;

use crate::{
    derive::speed::SpeedOptions,
    foundation::error::ForgeResult,
    motion::{
        MotionAlgorithm, MotionOptions, RadiusPolicy,
        axes::{AxisSettings, MotionAxis},
        phase::PhaseShiftOptions,
        prostate::{ProstateAlgorithm, ProstateOptions},
    },
    transform::combine::CombineOptions,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub general: GeneralConfig,
    pub speed: SpeedOptions,
    pub alpha_beta_generation: AlphaBetaConfig,
    pub prostate_generation: ProstateConfig,
    pub frequency: FrequencyConfig,
    pub volume: VolumeConfig,
    pub pulse: PulseConfig,
    pub advanced: AdvancedConfig,
    pub options: OutputOptions,
    pub positional_axes: PositionalAxesConfig,
}

impl ProcessorConfig {
    pub fn from_json_str(s: &str) -> ForgeResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn to_json_string(&self) -> ForgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub rest_level: f64,
    /// Seconds.
    pub ramp_up_duration_after_rest: f64,
    /// Seconds.
    pub speed_window_size: f64,
    /// Seconds.
    pub accel_window_size: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            rest_level: 0.4,
            ramp_up_duration_after_rest: 1.0,
            speed_window_size: 5.0,
            accel_window_size: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AlphaBetaConfig {
    pub auto_generate: bool,
    pub points_per_second: f64,
    pub algorithm: MotionAlgorithm,
    pub min_distance_from_center: f64,
    pub speed_threshold_percent: f64,
    pub speed_at_edge_hz: f64,
    pub direction_change_probability: f64,
    pub seed: u64,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        let motion = MotionOptions::default();
        Self {
            auto_generate: true,
            points_per_second: motion.points_per_second,
            algorithm: motion.algorithm,
            min_distance_from_center: motion.radius.min_distance_from_center,
            speed_threshold_percent: motion.radius.speed_threshold_percent,
            speed_at_edge_hz: 2.0,
            direction_change_probability: motion.direction_change_probability,
            seed: motion.seed,
        }
    }
}

impl AlphaBetaConfig {
    pub fn motion_options(&self) -> MotionOptions {
        MotionOptions {
            algorithm: self.algorithm,
            points_per_second: self.points_per_second,
            radius: RadiusPolicy {
                min_distance_from_center: self.min_distance_from_center,
                speed_threshold_percent: self.speed_threshold_percent,
            },
            direction_change_probability: self.direction_change_probability,
            seed: self.seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProstateConfig {
    pub generate_prostate_files: bool,
    pub generate_from_inverted: bool,
    pub algorithm: ProstateAlgorithm,
    pub points_per_second: f64,
    pub min_distance_from_center: f64,
}

impl Default for ProstateConfig {
    fn default() -> Self {
        let opts = ProstateOptions::default();
        Self {
            generate_prostate_files: true,
            generate_from_inverted: opts.generate_from_inverted,
            algorithm: opts.algorithm,
            points_per_second: opts.points_per_second,
            min_distance_from_center: opts.min_distance_from_center,
        }
    }
}

impl ProstateConfig {
    pub fn prostate_options(&self) -> ProstateOptions {
        ProstateOptions {
            algorithm: self.algorithm,
            points_per_second: self.points_per_second,
            min_distance_from_center: self.min_distance_from_center,
            generate_from_inverted: self.generate_from_inverted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrequencyConfig {
    pub pulse_freq_min: f64,
    pub pulse_freq_max: f64,
    pub frequency_ramp_combine_ratio: f64,
    pub pulse_frequency_combine_ratio: f64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            pulse_freq_min: 0.40,
            pulse_freq_max: 0.95,
            frequency_ramp_combine_ratio: 2.0,
            pulse_frequency_combine_ratio: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub volume_ramp_combine_ratio: f64,
    pub prostate_volume_multiplier: f64,
    pub prostate_rest_level: f64,
    pub ramp_percent_per_hour: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            volume_ramp_combine_ratio: 20.0,
            prostate_volume_multiplier: 1.5,
            prostate_rest_level: 0.7,
            ramp_percent_per_hour: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub pulse_width_min: f64,
    pub pulse_width_max: f64,
    pub pulse_width_combine_ratio: f64,
    pub beta_mirror_threshold: f64,
    pub pulse_rise_min: f64,
    pub pulse_rise_max: f64,
    pub pulse_rise_combine_ratio: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            pulse_width_min: 0.1,
            pulse_width_max: 0.45,
            pulse_width_combine_ratio: 3.0,
            beta_mirror_threshold: 0.5,
            pulse_rise_min: 0.0,
            pulse_rise_max: 0.8,
            pulse_rise_combine_ratio: 2.0,
        }
    }
}

/// Extra inverted outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub enable_pulse_frequency_inversion: bool,
    pub enable_volume_inversion: bool,
    pub enable_frequency_inversion: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub normalize_volume: bool,
    pub delete_intermediary_files: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            normalize_volume: true,
            delete_intermediary_files: true,
        }
    }
}

/// Which positional outputs the pipeline produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionalMode {
    /// Curve-driven E1-E4 axes.
    #[default]
    MotionAxis,
    /// Generated alpha/beta pair.
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhaseShiftConfig {
    pub enabled: bool,
    pub delay_percentage: f64,
    pub min_segment_duration: f64,
}

impl Default for PhaseShiftConfig {
    fn default() -> Self {
        let opts = PhaseShiftOptions::default();
        Self {
            enabled: false,
            delay_percentage: opts.delay_percentage,
            min_segment_duration: opts.min_segment_duration,
        }
    }
}

impl PhaseShiftConfig {
    pub fn options(&self) -> PhaseShiftOptions {
        PhaseShiftOptions {
            delay_percentage: self.delay_percentage,
            min_segment_duration: self.min_segment_duration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PositionalAxesConfig {
    pub mode: PositionalMode,
    pub phase_shift: PhaseShiftConfig,
    pub e1: AxisSettings,
    pub e2: AxisSettings,
    pub e3: AxisSettings,
    pub e4: AxisSettings,
}

impl Default for PositionalAxesConfig {
    fn default() -> Self {
        Self {
            mode: PositionalMode::default(),
            phase_shift: PhaseShiftConfig::default(),
            e1: AxisSettings::for_axis(MotionAxis::E1),
            e2: AxisSettings::for_axis(MotionAxis::E2),
            e3: AxisSettings::for_axis(MotionAxis::E3),
            e4: AxisSettings::for_axis(MotionAxis::E4),
        }
    }
}

impl PositionalAxesConfig {
    pub fn axis_settings(&self) -> BTreeMap<MotionAxis, AxisSettings> {
        BTreeMap::from([
            (MotionAxis::E1, self.e1.clone()),
            (MotionAxis::E2, self.e2.clone()),
            (MotionAxis::E3, self.e3.clone()),
            (MotionAxis::E4, self.e4.clone()),
        ])
    }
}

impl GeneralConfig {
    pub fn volume_combine(&self, ratio: f64) -> CombineOptions {
        CombineOptions::new(ratio).with_rest(self.rest_level, self.ramp_up_duration_after_rest)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
