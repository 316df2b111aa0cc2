//! Deterministic replay harness.
//!
//! A replay builds a fresh state twice, steps both copies the same number of
//! ticks and compares canonical snapshots frame by frame. The first divergent
//! frame fails the run with a JSON pointer into the snapshot. Optionally the
//! whole report is checked against a golden file.

use crate::snapshot::{assert_json_snapshot, canonical_json, first_difference};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use wildgrove_core::SimTick;

/// Configuration for a replay run.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Name written into the report.
    pub name: String,
    /// Ticks to step (the report holds `ticks + 1` frames).
    pub ticks: u64,
    /// Take a snapshot every this many ticks (tick 0 and the last tick are
    /// always captured).
    pub snapshot_every: u64,
    /// Golden file to compare the report against.
    pub snapshot_path: Option<PathBuf>,
}

impl ReplayConfig {
    /// Snapshot every tick, no golden file.
    pub fn new(name: impl Into<String>, ticks: u64) -> Self {
        Self {
            name: name.into(),
            ticks,
            snapshot_every: 1,
            snapshot_path: None,
        }
    }
}

/// Snapshot captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Frames of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport<S> {
    /// Replay name.
    pub name: String,
    /// Captured frames in tick order.
    pub frames: Vec<ReplayFrame<S>>,
}

impl<S> ReplayReport<S> {
    /// The last captured frame.
    pub fn last(&self) -> Option<&ReplayFrame<S>> {
        self.frames.last()
    }
}

fn record<State, Snapshot, StepFn, SnapFn>(
    config: &ReplayConfig,
    mut state: State,
    step: &mut StepFn,
    snapshot: &mut SnapFn,
) -> ReplayReport<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let every = config.snapshot_every.max(1);
    let mut frames = Vec::new();
    let mut tick = SimTick::ZERO;
    frames.push(ReplayFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        if tick.0 % every == 0 || tick.0 == config.ticks {
            frames.push(ReplayFrame {
                tick: tick.0,
                snapshot: snapshot(tick, &state),
            });
        }
    }

    ReplayReport {
        name: config.name.clone(),
        frames,
    }
}

/// Run the simulation twice from `init` and require identical snapshots.
///
/// Returns the report of the first run.
pub fn run_replay<State, Snapshot, InitFn, StepFn, SnapFn>(
    config: ReplayConfig,
    mut init: InitFn,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<ReplayReport<Snapshot>>
where
    Snapshot: Serialize,
    InitFn: FnMut() -> State,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let first = record(&config, init(), &mut step, &mut snapshot);
    let second = record(&config, init(), &mut step, &mut snapshot);

    for (a, b) in first.frames.iter().zip(&second.frames) {
        if canonical_json(&a.snapshot)? != canonical_json(&b.snapshot)? {
            let pointer = first_difference(&a.snapshot, &b.snapshot)?.unwrap_or_default();
            debug!(replay = %config.name, tick = a.tick, %pointer, "replay diverged");
            anyhow::bail!(
                "Replay '{}' diverged at tick {} ({})",
                config.name,
                a.tick,
                pointer
            );
        }
    }

    if let Some(path) = &config.snapshot_path {
        assert_json_snapshot(path, &first)?;
    }
    Ok(first)
}
