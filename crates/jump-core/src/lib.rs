//! Skydive jump planning from vertical wind profiles.
//!
//! Every calculator takes its wind profile, location and settings as
//! arguments and returns a `Result`; nothing reads global state.

pub mod atmosphere;
pub mod builder;
pub mod circles;
pub mod cut_away;
pub mod ensemble;
pub mod error;
pub mod freefall;
pub mod interpolation;
pub mod jump_run;
pub mod landing_pattern;
pub mod mean_wind;
pub mod planner;
pub mod profile;
pub mod settings;
pub mod spatial;
pub mod wind;

pub use builder::{build_profile, PressureLevel, RawTimeSlice, SurfaceObservation};
pub use circles::{calculate_canopy_circles, calculate_exit_circles, CanopyCircles, CircleResult, ExitCircles};
pub use cut_away::{calculate_cut_away, CutAwayResult};
pub use ensemble::{combine_ensemble, EnsembleScenario};
pub use error::{BuildError, FreefallError, InterpolationError, MeanWindError, PlanError, ProfileError};
pub use freefall::{simulate, FreefallParams, FreefallResult, TrajectoryPoint};
pub use jump_run::{calculate_jump_run, separation_from_tas, JumpRunTrack};
pub use landing_pattern::{calculate_landing_pattern, LandingPattern};
pub use mean_wind::{calculate_mean_wind, MeanWind};
pub use planner::{freefall_params, plan_jump, JumpPlan, JumpSite};
pub use profile::{WindProfile, WindProfileSample};
pub use settings::{CutAwayState, JumpSettings, PatternSide};
pub use spatial::{destination_point, GeoPoint};
pub use wind::WindVector;
