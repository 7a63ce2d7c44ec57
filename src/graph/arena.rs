use crate::context::AudioContext;
use crate::graph::params::ParamSpec;
use crate::graph::unit::{Processor, Unit, UnitKind};
use crate::graph::{BiquadFilter, Delay, Gainer, Osc, SvFilter};
use crate::MAX_SOURCES;

/// Stable handle to a unit owned by a [`UnitGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub(crate) u32);

/// Arena owner of every unit in one graph.
///
/// All unit storage lives here; callers hold [`UnitId`] handles. Removing a
/// source edge never deallocates, and removing a unit strips its id from
/// every remaining source list, so there is no destruction order to get
/// wrong.
///
/// Everything is single-threaded and synchronous. Graph mutation and block
/// processing must be serialized by the embedder; processing itself never
/// allocates or locks.
///
/// The only cycle guard is the self-edge rejection in
/// [`Self::add_source`]: wiring a deeper cycle (a -> b -> a) is a caller
/// contract violation and recurses without bound.
pub struct UnitGraph {
    context: AudioContext,
    slots: Vec<Option<Unit>>,
    free: Vec<u32>,
}

impl UnitGraph {
    pub fn new(context: AudioContext) -> Self {
        Self {
            context,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn context(&self) -> AudioContext {
        self.context
    }

    /// Add a unit, returning its handle.
    pub fn add(&mut self, kind: UnitKind) -> UnitId {
        let name = kind.name();
        let unit = Unit::new(kind);
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(unit);
                UnitId(index)
            }
            None => {
                self.slots.push(Some(unit));
                UnitId(self.slots.len() as u32 - 1)
            }
        };
        tracing::debug!(id = id.0, name, "unit added");
        id
    }

    pub fn add_gainer(&mut self) -> UnitId {
        self.add(UnitKind::Gainer(Gainer::new()))
    }

    pub fn add_filter(&mut self) -> UnitId {
        let context = self.context;
        self.add(UnitKind::Filter(BiquadFilter::new(&context)))
    }

    pub fn add_svfilter(&mut self) -> UnitId {
        let context = self.context;
        self.add(UnitKind::SvFilter(SvFilter::new(&context)))
    }

    pub fn add_delay(&mut self) -> UnitId {
        let context = self.context;
        self.add(UnitKind::Delay(Delay::new(&context)))
    }

    pub fn add_osc(&mut self) -> UnitId {
        self.add(UnitKind::Osc(Osc::new()))
    }

    /// Remove a unit and strip it from every remaining source list.
    /// No-op on a stale id.
    pub fn remove(&mut self, id: UnitId) {
        let index = id.0 as usize;
        if index >= self.slots.len() || self.slots[index].is_none() {
            return;
        }
        self.slots[index] = None;
        self.free.push(id.0);
        for slot in self.slots.iter_mut().flatten() {
            slot.sources.retain(|&source| source != id);
        }
        tracing::debug!(id = id.0, "unit removed");
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.slot(id).is_some()
    }

    /// Diagnostic kind name, or `None` for a stale id.
    pub fn name(&self, id: UnitId) -> Option<&'static str> {
        self.slot(id).map(|unit| unit.kind.name())
    }

    /// Append `source` to `unit`'s ordered source list.
    ///
    /// No-op if the edge would be a self-edge, is already present, the
    /// fan-in bound is reached, or either id is stale.
    pub fn add_source(&mut self, unit: UnitId, source: UnitId) {
        if unit == source || !self.contains(source) {
            return;
        }
        let Some(node) = self.slot_mut(unit) else {
            return;
        };
        if node.sources.len() >= MAX_SOURCES || node.sources.contains(&source) {
            tracing::debug!(unit = unit.0, source = source.0, "source edge rejected");
            return;
        }
        node.sources.push(source);
    }

    /// Remove the first matching source edge, keeping the list ordered.
    /// No-op if absent.
    pub fn remove_source(&mut self, unit: UnitId, source: UnitId) {
        if let Some(node) = self.slot_mut(unit) {
            if let Some(position) = node.sources.iter().position(|&s| s == source) {
                node.sources.remove(position);
            }
        }
    }

    pub fn has_source(&self, unit: UnitId, source: UnitId) -> bool {
        self.sources(unit).contains(&source)
    }

    /// The unit's ordered source list (empty for a stale id).
    pub fn sources(&self, unit: UnitId) -> &[UnitId] {
        self.slot(unit).map(|node| node.sources.as_slice()).unwrap_or(&[])
    }

    /// Read a parameter; 0 for an out-of-range id or stale unit.
    pub fn get(&self, unit: UnitId, param_id: usize) -> i32 {
        match self.slot(unit) {
            Some(node) if param_id < node.kind.params().len() => node.kind.get(param_id),
            _ => 0,
        }
    }

    /// Write a parameter; values are clamped per kind, out-of-range ids and
    /// stale units are a no-op.
    pub fn set(&mut self, unit: UnitId, param_id: usize, value: i32) {
        let context = self.context;
        if let Some(node) = self.slot_mut(unit) {
            node.kind.set(&context, param_id, value);
        }
    }

    /// Descriptor for one parameter, or `None` when out of range.
    pub fn param(&self, unit: UnitId, param_id: usize) -> Option<&'static ParamSpec> {
        self.slot(unit)?.kind.params().get(param_id)
    }

    /// Process one interleaved stereo block through `unit` and everything
    /// upstream of it.
    ///
    /// Sources are processed depth-first in list order into the same buffer,
    /// then the unit's own transform runs over the accumulated samples. The
    /// buffer length is a sample count; it must be even (interleaved L,R
    /// pairs).
    pub fn process(&mut self, unit: UnitId, buffer: &mut [i16]) {
        debug_assert!(buffer.len() % 2 == 0, "stereo buffers hold whole frames");
        let Some(node) = self.slot(unit) else {
            return;
        };
        let count = node.sources.len();
        let mut sources = [UnitId(0); MAX_SOURCES];
        sources[..count].copy_from_slice(&node.sources);

        for &source in &sources[..count] {
            self.process(source, buffer);
        }

        let context = self.context;
        if let Some(node) = self.slot_mut(unit) {
            node.kind.process(&context, buffer);
        }
    }

    fn slot(&self, id: UnitId) -> Option<&Unit> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    fn slot_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }
}
