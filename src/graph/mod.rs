//! The unit graph: arena storage, parameter tables and the five unit kinds.
//!
//! A [`arena::UnitGraph`] owns every unit; callers hold [`arena::UnitId`]
//! handles and wire units together through bounded source lists. Processing
//! pulls sources depth-first into one interleaved stereo `i16` buffer, then
//! applies the unit's own transform in place.

/// Arena owner of all units, and the recursive block traversal.
pub mod arena;
/// Biquad filter unit (two cascaded cookbook sections per channel).
pub mod biquad;
/// Dry/wet/feedback delay unit.
pub mod delay;
/// Volume and pan unit.
pub mod gainer;
/// Additive oscillator unit.
pub mod osc;
/// Parameter descriptors.
pub mod params;
/// State-variable filter unit.
pub mod svfilter;
/// The capability trait and the closed set of unit kinds.
pub mod unit;

pub use biquad::BiquadFilter;
pub use delay::Delay;
pub use gainer::Gainer;
pub use osc::Osc;
pub use params::ParamSpec;
pub use svfilter::SvFilter;
pub use unit::{Processor, UnitKind};
