//! Fixed-stage derivation pipeline over one input file.
//!
//! Outputs land beside the input as `<base>.<channel>.funscript`; intermediate artifacts go
//! to `funscript-temp/` in the same directory, which is removed on success when
//! configured.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context as _;

use crate::{
    derive::speed::{convert_to_acceleration, convert_to_speed},
    foundation::error::{ForgeError, ForgeResult},
    motion::{
        MotionAlgorithm, MotionPair, SpeedSource,
        axes::generate_motion_axes,
        generate,
        phase::phase_shift_all,
        prostate::{ProstateAlgorithm, ProstateOptions, generate_prostate},
    },
    pipeline::{
        config::{AlphaBetaConfig, PositionalMode, ProcessorConfig},
        progress::ProgressSink,
    },
    timeline::{
        funscript::{FUNSCRIPT_EXT, Funscript, axis_file_path, load_timeline, save_timeline},
        model::Timeline,
    },
    transform::{
        basic::{invert, limit, map_range, mirror_up, normalize},
        combine::{CombineOptions, combine},
        ramp::make_volume_ramp,
    },
};

pub const INTERMEDIATE_DIR: &str = "funscript-temp";

/// Auxiliary inputs picked up from beside the input file when present.
const AUXILIARY: [&str; 4] = ["ramp", "speed", "alpha", "beta"];

/// What a successful run produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessReport {
    /// Channel name → written file.
    pub outputs: BTreeMap<String, PathBuf>,
    /// Every channel computed or reused during the run, final and intermediate.
    pub channels: BTreeMap<String, Timeline>,
    /// Auxiliary inputs that were reused rather than derived.
    pub reused: Vec<String>,
    pub intermediates_removed: bool,
}

/// Runs the derivation pipeline with one configuration.
#[derive(Clone, Debug, Default)]
pub struct Processor {
    config: ProcessorConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Share a flag that stops the run at the next stage boundary once set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process `input`, reporting progress to `sink`.
    ///
    /// A failure is reported once as `(-1, "Error: ...")` and returned. Files written before
    /// the failure are left in place.
    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    pub fn process(
        &self,
        input: &Path,
        sink: &mut dyn ProgressSink,
    ) -> ForgeResult<ProcessReport> {
        match self.run(input, sink) {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!(error = %err, "processing failed");
                sink.report(-1, &format!("Error: {err}"));
                Err(err)
            }
        }
    }

    fn run(&self, input: &Path, sink: &mut dyn ProgressSink) -> ForgeResult<ProcessReport> {
        let mut run = Run::new(&self.config, self.cancel.as_deref(), input, sink)?;
        run.stage(0, "Initializing...")?;
        std::fs::create_dir_all(&run.temp_dir)
            .with_context(|| format!("create '{}'", run.temp_dir.display()))?;

        run.stage(5, "Loading input file...")?;
        let main = load_timeline(input)?;
        if main.len() < 2 {
            return Err(ForgeError::insufficient_data(format!(
                "'{}' has fewer than two actions",
                input.display()
            )));
        }

        run.execute(&main)?;

        if self.config.options.delete_intermediary_files {
            run.stage(95, "Cleaning up intermediary files...")?;
            std::fs::remove_dir_all(&run.temp_dir)
                .with_context(|| format!("remove '{}'", run.temp_dir.display()))?;
            run.report.intermediates_removed = true;
        }
        run.stage(100, "Processing complete!")?;
        Ok(run.report)
    }
}

/// State of one pipeline run.
struct Run<'a> {
    cfg: &'a ProcessorConfig,
    cancel: Option<&'a AtomicBool>,
    sink: &'a mut dyn ProgressSink,
    dir: PathBuf,
    base: String,
    temp_dir: PathBuf,
    /// Generator descriptions written with the matching outputs.
    metadata: BTreeMap<String, serde_json::Value>,
    report: ProcessReport,
}

impl<'a> Run<'a> {
    fn new(
        cfg: &'a ProcessorConfig,
        cancel: Option<&'a AtomicBool>,
        input: &Path,
        sink: &'a mut dyn ProgressSink,
    ) -> ForgeResult<Self> {
        let base = input
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| {
                n.strip_suffix(FUNSCRIPT_EXT)
                    .and_then(|s| s.strip_suffix('.'))
                    .unwrap_or(n)
                    .to_string()
            })
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ForgeError::invalid_parameter(format!("bad input path '{}'", input.display()))
            })?;
        let dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let temp_dir = dir.join(INTERMEDIATE_DIR);
        Ok(Self {
            cfg,
            cancel,
            sink,
            dir,
            base,
            temp_dir,
            metadata: BTreeMap::new(),
            report: ProcessReport::default(),
        })
    }

    fn stage(&mut self, percent: i32, message: &str) -> ForgeResult<()> {
        if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(ForgeError::cancelled(format!("stopped before: {message}")));
        }
        tracing::debug!(percent, "{message}");
        self.sink.report(percent, message);
        Ok(())
    }

    fn temp_path(&self, suffix: &str) -> PathBuf {
        axis_file_path(&self.temp_dir, &self.base, suffix)
    }

    fn keep(&mut self, suffix: &str, timeline: &Timeline) {
        self.report
            .channels
            .insert(suffix.to_string(), timeline.clone());
    }

    fn save_temp(&mut self, suffix: &str, timeline: &Timeline) -> ForgeResult<()> {
        save_timeline(timeline, &self.temp_path(suffix))?;
        self.keep(suffix, timeline);
        Ok(())
    }

    fn save_output(&mut self, suffix: &str, timeline: &Timeline) -> ForgeResult<()> {
        let path = axis_file_path(&self.dir, &self.base, suffix);
        match self.metadata.get(suffix) {
            Some(metadata) => Funscript::new(timeline.clone())
                .with_metadata(metadata.clone())
                .save_to_path(&path)?,
            None => save_timeline(timeline, &path)?,
        }
        self.keep(suffix, timeline);
        self.report.outputs.insert(suffix.to_string(), path);
        Ok(())
    }

    /// Copy `<base>.<suffix>.funscript` into the intermediate area and load it, if present.
    fn reuse_auxiliary(&mut self, suffix: &str) -> ForgeResult<Option<Timeline>> {
        let source = axis_file_path(&self.dir, &self.base, suffix);
        if !source.is_file() {
            return Ok(None);
        }
        let dest = self.temp_path(suffix);
        std::fs::copy(&source, &dest)
            .with_context(|| format!("copy '{}'", source.display()))?;
        tracing::info!(channel = suffix, "reusing existing file");
        self.report.reused.push(suffix.to_string());
        let timeline = load_timeline(&dest)?;
        self.keep(suffix, &timeline);
        Ok(Some(timeline))
    }

    fn combine(&self, left: &Timeline, right: &Timeline, ratio: f64) -> ForgeResult<Timeline> {
        combine(left, right, CombineOptions::new(ratio))
    }

    fn execute(&mut self, main: &Timeline) -> ForgeResult<()> {
        let cfg = self.cfg;

        self.stage(10, "Copying auxiliary files...")?;
        let mut found = BTreeMap::new();
        for suffix in AUXILIARY {
            if let Some(tl) = self.reuse_auxiliary(suffix)? {
                found.insert(suffix, tl);
            }
        }
        let mut alpha = found.remove("alpha");
        let mut beta = found.remove("beta");

        let legacy = cfg.positional_axes.mode == PositionalMode::Legacy;
        if legacy && (alpha.is_none() || beta.is_none()) && cfg.alpha_beta_generation.auto_generate
        {
            self.stage(15, "Generating alpha and beta files from main funscript...")?;
            let pair = generate_alpha_beta(main, &cfg.alpha_beta_generation)?;
            if alpha.is_none() {
                self.save_temp("alpha", &pair.alpha)?;
                self.metadata.insert("alpha".into(), pair.metadata.clone());
                alpha = Some(pair.alpha);
            }
            if beta.is_none() {
                self.save_temp("beta", &pair.beta)?;
                self.metadata.insert("beta".into(), pair.metadata.clone());
                beta = Some(pair.beta);
            }
        }

        self.stage(20, "Generating speed file...")?;
        let speed = match found.remove("speed") {
            Some(speed) => speed,
            None => {
                let speed = convert_to_speed(main, cfg.general.speed_window_size, cfg.speed)?;
                self.save_temp("speed", &speed)?;
                speed
            }
        };
        let speed_inverted = invert(&speed);
        self.save_temp("speed_inverted", &speed_inverted)?;

        self.stage(25, "Generating acceleration file...")?;
        let accel = convert_to_acceleration(&speed, cfg.general.accel_window_size, cfg.speed)?;
        self.save_temp("accel", &accel)?;

        self.stage(30, "Generating volume ramp...")?;
        let ramp = match found.remove("ramp") {
            Some(ramp) => ramp,
            None => {
                let ramp = make_volume_ramp(main, cfg.volume.ramp_percent_per_hour)?;
                self.save_temp("ramp", &ramp)?;
                ramp
            }
        };
        let ramp_inverted = invert(&ramp);
        self.save_temp("ramp_inverted", &ramp_inverted)?;

        self.stage(40, "Processing frequency data...")?;
        let alpha_inverted = alpha.as_ref().map(invert);
        let pulse_frequency = match &alpha {
            Some(alpha) => {
                let f = &cfg.frequency;
                let alpha_freq = map_range(alpha, f.pulse_freq_min, f.pulse_freq_max)?;
                self.save_temp("pulse_frequency-alphabased", &alpha_freq)?;
                let pulse_frequency =
                    self.combine(&speed, &alpha_freq, f.pulse_frequency_combine_ratio)?;
                self.save_output("pulse_frequency", &pulse_frequency)?;
                Some(pulse_frequency)
            }
            None => None,
        };
        let frequency =
            self.combine(&ramp, &speed, cfg.frequency.frequency_ramp_combine_ratio)?;
        self.save_output("frequency", &frequency)?;

        self.stage(50, "Processing volume data...")?;
        let ratio = cfg.volume.volume_ramp_combine_ratio;
        let mut volume = combine(&ramp, &speed, cfg.general.volume_combine(ratio))?;
        if cfg.options.normalize_volume {
            self.save_temp("volume_not_normalized", &volume)?;
            volume = normalize(&volume);
        }
        self.save_output("volume", &volume)?;
        let prostate_volume = combine(
            &ramp,
            &speed,
            CombineOptions::new(ratio * cfg.volume.prostate_volume_multiplier)
                .with_rest(cfg.volume.prostate_rest_level, 0.0),
        )?;
        self.save_output("volume-prostate", &prostate_volume)?;

        if cfg.prostate_generation.generate_prostate_files {
            self.stage(60, "Generating prostate files...")?;
            let pair = generate_prostate(main, &cfg.prostate_generation.prostate_options())?;
            for suffix in ["alpha-prostate", "beta-prostate"] {
                self.metadata.insert(suffix.into(), pair.metadata.clone());
            }
            self.save_output("alpha-prostate", &pair.alpha)?;
            self.save_output("beta-prostate", &pair.beta)?;
        } else if let Some(alpha_inverted) = &alpha_inverted {
            self.save_temp("alpha_inverted", alpha_inverted)?;
            self.save_output("alpha-prostate", alpha_inverted)?;
        }

        let mut motion_axes = BTreeMap::new();
        if !legacy {
            self.stage(65, "Generating motion axes...")?;
            let settings = cfg.positional_axes.axis_settings();
            for (axis, timeline) in generate_motion_axes(main, &settings)? {
                self.save_output(axis.as_str(), &timeline)?;
                motion_axes.insert(axis.as_str().to_string(), timeline);
            }
        }

        self.stage(70, "Processing pulse parameters...")?;
        if let Some(beta) = &beta {
            let p = &cfg.pulse;
            let mirrored = mirror_up(beta, p.beta_mirror_threshold);
            self.save_temp("beta-mirror-up", &mirrored)?;
            let rise = self.combine(&mirrored, &speed_inverted, p.pulse_rise_combine_ratio)?;
            let rise = self.combine(&ramp_inverted, &rise, p.pulse_rise_combine_ratio)?;
            let rise = map_range(&rise, p.pulse_rise_min, p.pulse_rise_max)?;
            self.save_output("pulse_rise_time", &rise)?;
        }
        if let Some(alpha_inverted) = &alpha_inverted {
            let p = &cfg.pulse;
            let width_alpha = limit(alpha_inverted, p.pulse_width_min, p.pulse_width_max)?;
            self.save_temp("pulse_width-alpha", &width_alpha)?;
            let width = self.combine(&speed, &width_alpha, p.pulse_width_combine_ratio)?;
            self.save_output("pulse_width", &width)?;
        }

        let phase = cfg.positional_axes.phase_shift;
        if phase.enabled {
            self.stage(80, "Generating phase-shifted axes...")?;
            let mut targets = motion_axes;
            if let Some(alpha) = &alpha {
                targets.insert("alpha".to_string(), alpha.clone());
            }
            if let Some(beta) = &beta {
                targets.insert("beta".to_string(), beta.clone());
            }
            for (name, shifted) in phase_shift_all(&targets, main, phase.options())? {
                self.save_output(&name, &shifted)?;
            }
        }

        self.stage(90, "Finalizing outputs...")?;
        if let Some(alpha) = &alpha {
            self.save_output("alpha", alpha)?;
        }
        if let Some(beta) = &beta {
            self.save_output("beta", beta)?;
        }
        let adv = cfg.advanced;
        if let Some(pulse_frequency) = pulse_frequency
            .as_ref()
            .filter(|_| adv.enable_pulse_frequency_inversion)
        {
            self.save_output("pulse_frequency_inverted", &invert(pulse_frequency))?;
        }
        if adv.enable_volume_inversion {
            self.save_output("volume_inverted", &invert(&volume))?;
        }
        if adv.enable_frequency_inversion {
            self.save_output("frequency_inverted", &invert(&frequency))?;
        }
        Ok(())
    }
}

/// The alpha/beta pair for `main` under `cfg`.
///
/// `tear-shaped` is served by the prostate tear generator without inversion.
pub fn generate_alpha_beta(main: &Timeline, cfg: &AlphaBetaConfig) -> ForgeResult<MotionPair> {
    if cfg.algorithm == MotionAlgorithm::TearShaped {
        let opts = ProstateOptions {
            algorithm: ProstateAlgorithm::TearShaped,
            points_per_second: cfg.points_per_second,
            min_distance_from_center: cfg.min_distance_from_center,
            generate_from_inverted: false,
        };
        return generate_prostate(main, &opts);
    }
    let speed = SpeedSource::Inline {
        speed_at_edge_hz: cfg.speed_at_edge_hz,
    };
    generate(main, &cfg.motion_options(), speed)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/processor.rs"]
mod tests;
