//! axisforge derives a coordinated set of stimulation channels from a single motion track.
//!
//! # Pipeline overview
//!
//! 1. **Load**: a funscript document becomes a [`Timeline`] (seconds, positions in `[0, 1]`)
//! 2. **Derive**: windowed speed and acceleration, a slow volume ramp
//! 3. **Combine**: weighted blends of ramp, speed and positional tracks into frequency,
//!    volume and pulse-shape channels
//! 4. **Position**: curve-driven E1-E4 axes or generated alpha/beta pairs, plus prostate
//!    variants and optional phase-shifted copies
//! 5. **Edit** (optional): authored events graft ramps and oscillations onto finished
//!    channels through the [`EffectsEngine`]
//!
//! Everything except [`Processor`] and [`run_events`] is pure: inputs are borrowed and new
//! timelines are returned. Only the pipeline module touches the filesystem.
#![forbid(unsafe_code)]

mod derive;
mod effects;
mod foundation;
mod motion;
mod pipeline;
mod timeline;
mod transform;

pub use derive::speed::{
    SpeedOptions, convert_to_acceleration, convert_to_speed, resample_uniform, windowed_speed,
};
pub use effects::engine::{
    AxisReport, Diagnostic, DiagnosticKind, EffectMode, EffectsEngine, LinkTable,
    NormalizationTable, Waveform,
};
pub use effects::params::{
    DefinitionsDoc, EventDefinition, EventFile, EventRecord, EventStep, LinearChange,
    Modulation, NormalizationEntry, Operation, ParamValue, Ramp, ResolvedEvent, StepParam,
    resolve_event, resolve_events,
};
pub use foundation::error::{ForgeError, ForgeResult};
pub use motion::axes::{AxisSettings, MotionAxis, effective_curve, generate_motion_axes};
pub use motion::phase::{
    PhaseShiftOptions, TimedExtremum, detect_extremes, phase_shift, phase_shift_all,
};
pub use motion::prostate::{ProstateAlgorithm, ProstateOptions, generate_prostate};
pub use motion::tear::{tear_radius, tear_shape};
pub use motion::{
    Extremum, ExtremumKind, MotionAlgorithm, MotionOptions, MotionPair, RadiusPolicy, Segment,
    SpeedSource, generate, local_extrema, segments,
};
pub use pipeline::config::{
    AdvancedConfig, AlphaBetaConfig, FrequencyConfig, GeneralConfig, OutputOptions,
    PhaseShiftConfig, PositionalAxesConfig, PositionalMode, ProcessorConfig, ProstateConfig,
    PulseConfig, VolumeConfig,
};
pub use pipeline::events::{
    EVENTS_FILE_SUFFIX, EventRunOptions, EventRunReport, discover_axis_files, event_base_name,
    run_events,
};
pub use pipeline::processor::{INTERMEDIATE_DIR, ProcessReport, Processor, generate_alpha_beta};
pub use pipeline::progress::{LogProgress, NoProgress, ProgressSink};
pub use pipeline::snapshot::{DirectorySnapshot, Snapshot};
pub use timeline::funscript::{
    Action, FUNSCRIPT_EXT, Funscript, axis_file_path, axis_from_file_name, load_timeline,
    save_timeline,
};
pub use timeline::model::{Timeline, union_times};
pub use transform::basic::{invert, limit, map_range, mirror_up, normalize};
pub use transform::combine::{CombineOptions, combine, multiply};
pub use transform::curve::{PRESET_NAMES, ResponseCurve, preset};
pub use transform::ramp::make_volume_ramp;
