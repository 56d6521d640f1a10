//! Traffic signal phases and their timing
//!
//! Every signal alternates Green and Red. Signals are split into groups; with
//! `G` groups and a phase length `P`, group `g` is green during the `g`-th
//! slot of a `G * P` cycle, so adjacent groups never share a green window.

use std::collections::BTreeMap;

use super::grid_map::GridMap;
use super::types::{Cell, SignalPhase, SignalState};

/// Default length of one green slot in seconds
pub const DEFAULT_PHASE_SECS: f32 = 5.0;

/// A single signal-bearing cell
#[derive(Debug, Clone)]
pub struct SimSignal {
    pub cell: Cell,
    pub group: u8,
    pub phase: SignalPhase,
    /// Seconds left in the current phase
    pub remaining: f32,
    /// Number of phase changes since the map was loaded
    pub changes: u64,
}

impl SimSignal {
    pub fn is_green(&self) -> bool {
        self.phase.is_green()
    }

    fn state(&self) -> SignalState {
        SignalState {
            x: self.cell.x,
            y: self.cell.y,
            is_green: self.is_green(),
        }
    }
}

/// Green/red durations shared by every signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalTiming {
    pub green_secs: f32,
    pub red_secs: f32,
}

impl SignalTiming {
    pub fn for_groups(phase_secs: f32, groups: u8) -> Self {
        let phase_secs = phase_secs.max(f32::EPSILON);
        let red_slots = groups.saturating_sub(1).max(1);
        Self {
            green_secs: phase_secs,
            red_secs: phase_secs * red_slots as f32,
        }
    }

    fn duration(&self, phase: SignalPhase) -> f32 {
        match phase {
            SignalPhase::Green => self.green_secs,
            SignalPhase::Red => self.red_secs,
        }
    }
}

/// Owns every signal's phase and advances them on the simulation clock
#[derive(Debug, Clone)]
pub struct SignalScheduler {
    signals: BTreeMap<Cell, SimSignal>,
    timing: SignalTiming,
}

impl SignalScheduler {
    /// Create one signal per signal-bearing cell of `map`
    pub fn new(map: &GridMap, phase_secs: f32) -> Self {
        let groups = map.signal_cells().map(|(_, group)| group).max().unwrap_or(1);
        let timing = SignalTiming::for_groups(phase_secs, groups);

        let signals = map
            .signal_cells()
            .map(|(cell, group)| {
                // Group 1 opens the cycle, later groups wait for their slot
                let (phase, remaining) = if group == 1 {
                    (SignalPhase::Green, timing.green_secs)
                } else {
                    (SignalPhase::Red, timing.green_secs * (group - 1) as f32)
                };
                let signal = SimSignal {
                    cell,
                    group,
                    phase,
                    remaining,
                    changes: 0,
                };
                (cell, signal)
            })
            .collect();

        Self { signals, timing }
    }

    pub fn timing(&self) -> SignalTiming {
        self.timing
    }

    /// Advance every signal by `elapsed` seconds
    pub fn tick(&mut self, elapsed: f32) {
        if elapsed <= 0.0 {
            return;
        }
        for signal in self.signals.values_mut() {
            signal.remaining -= elapsed;
            while signal.remaining <= 0.0 {
                signal.phase = signal.phase.toggled();
                signal.remaining += self.timing.duration(signal.phase);
                signal.changes += 1;
            }
        }
    }

    /// Flip every signal immediately and restart its phase timer
    pub fn force_change(&mut self) {
        for signal in self.signals.values_mut() {
            signal.phase = signal.phase.toggled();
            signal.remaining = self.timing.duration(signal.phase);
            signal.changes += 1;
        }
    }

    /// Phase at `cell`, or `None` if the cell has no signal
    pub fn current_phase(&self, cell: Cell) -> Option<SignalPhase> {
        self.signals.get(&cell).map(|signal| signal.phase)
    }

    /// True unless `cell` carries a red signal
    pub fn is_green(&self, cell: Cell) -> bool {
        self.current_phase(cell).map_or(true, SignalPhase::is_green)
    }

    /// Seconds until the signal at `cell` changes phase
    pub fn time_until_change(&self, cell: Cell) -> Option<f32> {
        self.signals.get(&cell).map(|signal| signal.remaining)
    }

    pub fn get(&self, cell: Cell) -> Option<&SimSignal> {
        self.signals.get(&cell)
    }

    pub fn all_signals(&self) -> Vec<SignalState> {
        self.signals.values().map(SimSignal::state).collect()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
