//! Error types shared by the planning calculators.

use thiserror::Error;

/// Failure of a one-dimensional interpolation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("interpolation input is empty")]
    Empty,
    #[error("interpolation input length mismatch: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },
}

/// A wind profile that cannot be used for any calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("wind profile is empty")]
    Empty,
    #[error("wind profile needs at least 2 samples, got {0}")]
    TooFewSamples(usize),
    #[error("wind profile heights are not strictly monotonic at sample {index}")]
    NonMonotonicHeights { index: usize },
    #[error("wind profile sample {index} contains a non-finite value")]
    NonFiniteValue { index: usize },
}

/// Failure of a layer mean wind calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeanWindError {
    #[error("mean wind needs at least 2 height samples, got {0}")]
    TooFewSamples(usize),
    #[error("mean wind input length mismatch")]
    LengthMismatch,
    #[error("mean wind layer limits must be finite: lower {lower}, upper {upper}")]
    InvalidLimits { lower: f64, upper: f64 },
    #[error("mean wind layer has zero thickness at {0} m")]
    ZeroSpan(f64),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Failure of the freefall simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FreefallError {
    #[error("freefall needs a usable wind profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("exit altitude {exit} m must be above opening altitude {opening} m")]
    InvalidAltitudes { exit: f64, opening: f64 },
    #[error("invalid origin coordinates: {lat}, {lng}")]
    InvalidOrigin { lat: f64, lng: f64 },
    #[error("invalid ground elevation: {0}")]
    InvalidElevation(f64),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
    #[error("freefall did not reach opening height within {0} steps")]
    IterationLimit(usize),
}

/// Failure while building a resampled profile from raw model levels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("need at least 2 complete pressure levels, got {0}")]
    InsufficientLevels(usize),
    #[error("surface pressure is missing")]
    MissingSurfacePressure,
    #[error("surface observation is missing {0}")]
    MissingSurfaceValue(&'static str),
    #[error("top of profile is not above the surface: {0} m")]
    InvalidMaxHeight(f64),
    #[error("invalid resampling step: {0} m")]
    InvalidStep(f64),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Failure of a composed planning calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("mean wind failed: {0}")]
    MeanWind(#[from] MeanWindError),
    #[error("freefall failed: {0}")]
    Freefall(#[from] FreefallError),
    #[error("leg heights must increase: final {final_m} m, base {base_m} m, downwind {downwind_m} m")]
    InvalidLegHeights {
        final_m: f64,
        base_m: f64,
        downwind_m: f64,
    },
    #[error("canopy opens at {open_height_m} m, not above safety plus downwind leg at {pattern_top_m} m")]
    OpeningBelowPattern { open_height_m: f64, pattern_top_m: f64 },
    #[error("no landing direction available")]
    NoLandingDirection,
    #[error("invalid location: {lat}, {lng}")]
    InvalidLocation { lat: f64, lng: f64 },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}
