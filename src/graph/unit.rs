use crate::context::AudioContext;
use crate::graph::arena::UnitId;
use crate::graph::params::ParamSpec;
use crate::graph::{BiquadFilter, Delay, Gainer, Osc, SvFilter};

/// Capability interface every unit kind implements.
///
/// `get`/`set` address controls by table index; out-of-range ids read as 0
/// and write as a no-op, and in-range values are clamped per kind — misuse
/// is a neutral outcome, never a failure, so the per-sample path stays free
/// of error plumbing. Kind-owned resources are released by `Drop`.
pub trait Processor {
    /// Diagnostic kind name.
    fn name(&self) -> &'static str;

    /// The kind's fixed, ordered parameter table.
    fn params(&self) -> &'static [ParamSpec];

    fn get(&self, param_id: usize) -> i32;

    fn set(&mut self, context: &AudioContext, param_id: usize, value: i32);

    /// Transform one interleaved stereo block in place.
    fn process(&mut self, context: &AudioContext, buffer: &mut [i16]);
}

/// The closed set of unit kinds.
///
/// Dispatch is an exhaustive match, so adding a kind is a compile-checked
/// change everywhere the engine branches on it.
pub enum UnitKind {
    Gainer(Gainer),
    Filter(BiquadFilter),
    SvFilter(SvFilter),
    Delay(Delay),
    Osc(Osc),
}

macro_rules! each_kind {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            UnitKind::Gainer($inner) => $body,
            UnitKind::Filter($inner) => $body,
            UnitKind::SvFilter($inner) => $body,
            UnitKind::Delay($inner) => $body,
            UnitKind::Osc($inner) => $body,
        }
    };
}

impl Processor for UnitKind {
    fn name(&self) -> &'static str {
        each_kind!(self, kind => kind.name())
    }

    fn params(&self) -> &'static [ParamSpec] {
        each_kind!(self, kind => kind.params())
    }

    fn get(&self, param_id: usize) -> i32 {
        each_kind!(self, kind => kind.get(param_id))
    }

    fn set(&mut self, context: &AudioContext, param_id: usize, value: i32) {
        each_kind!(self, kind => kind.set(context, param_id, value))
    }

    fn process(&mut self, context: &AudioContext, buffer: &mut [i16]) {
        each_kind!(self, kind => kind.process(context, buffer))
    }
}

/// One node in the graph: its kind-specific state plus the ordered list of
/// upstream sources it pulls from.
pub struct Unit {
    pub(crate) kind: UnitKind,
    pub(crate) sources: Vec<UnitId>,
}

impl Unit {
    pub(crate) fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            sources: Vec::new(),
        }
    }
}
