use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::foundation::core::{Euler, Vec3};
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::{Rng64, clamp01, shuffle};

/// Frames per second the explosion spin rate is expressed in.
const SPIN_FPS: f64 = 60.0;
const SPIN_PER_FRAME: f64 = 0.02;
const GRAVITY: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssemblyState {
    Falling,
    Waiting,
    Complete,
    Exploding,
}

/// Hold durations of the assembly cycle, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssemblyTimings {
    pub fall_ms: f64,
    pub wait_ms: f64,
    pub hold_ms: f64,
    pub explode_ms: f64,
}

impl Default for AssemblyTimings {
    fn default() -> Self {
        Self {
            fall_ms: 600.0,
            wait_ms: 120.0,
            hold_ms: 3000.0,
            explode_ms: 1200.0,
        }
    }
}

impl AssemblyTimings {
    pub fn validate(&self) -> LoopResult<()> {
        for (name, v) in [
            ("fall_ms", self.fall_ms),
            ("wait_ms", self.wait_ms),
            ("hold_ms", self.hold_ms),
            ("explode_ms", self.explode_ms),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(LoopError::validation(format!(
                    "assembly {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Length of one full cycle for `pieces` pieces: every fall, the waits between them, the
    /// hold and the explosion.
    pub fn cycle_ms(&self, pieces: usize) -> f64 {
        let n = pieces as f64;
        n * self.fall_ms + (n - 1.0).max(0.0) * self.wait_ms + self.hold_ms + self.explode_ms
    }
}

/// Placement order for one assembly cycle: a fresh random permutation of `0..slot_count`, with
/// `pinned_last` (if any) moved to the end.
pub fn next_assignment(
    slot_count: usize,
    pinned_last: Option<usize>,
    rng: &mut Rng64,
) -> Vec<usize> {
    let pinned = pinned_last.filter(|&p| p < slot_count);
    let mut order: Vec<usize> = (0..slot_count).filter(|&s| Some(s) != pinned).collect();
    shuffle(&mut order, rng);
    order.extend(pinned);
    order
}

/// Randomized start of one falling piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    pub start: Vec3,
    pub spin: Euler,
}

impl Launch {
    fn random(rng: &mut Rng64) -> Self {
        Self {
            start: Vec3::new(rng.centered(3.0), rng.range(10.0, 14.0), rng.centered(3.0)),
            spin: Euler::new(rng.range(0.0, TAU), rng.range(0.0, TAU), rng.range(0.0, TAU)),
        }
    }
}

/// Randomized outward motion of one piece during the explosion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    pub velocity: Vec3,
    pub spin: Vec3,
}

impl Burst {
    /// Outward along `target` (or straight up for a piece at the origin), with an upward kick.
    pub fn toward(target: Vec3, rng: &mut Rng64) -> Self {
        let dir = target.try_normalize().unwrap_or(Vec3::UP);
        let mut velocity = dir * rng.range(8.0, 12.0);
        velocity.y += rng.range(3.0, 5.0);
        Self {
            velocity,
            spin: Vec3::new(rng.centered(3.0), rng.centered(3.0), rng.centered(3.0)),
        }
    }
}

/// Where one placed or moving piece is at a given instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceState {
    pub slot: usize,
    pub position: Vec3,
    pub rotation: Euler,
    pub opacity: f64,
    /// The piece is the one currently falling.
    pub falling: bool,
}

/// Falling → waiting → complete → exploding → reset, driven purely by elapsed time.
///
/// The machine owns the slot assignment for the current cycle. A reset computes a complete new
/// assignment with [`next_assignment`] and installs it in one move; at no point is the assignment
/// partially defined.
#[derive(Clone, Debug)]
pub struct AssemblyMachine {
    targets: Vec<Vec3>,
    pinned_last: Option<usize>,
    timings: AssemblyTimings,
    rng: Rng64,
    order: Vec<usize>,
    placed: usize,
    state: AssemblyState,
    since_ms: f64,
    launch: Launch,
    bursts: Vec<Burst>,
    cycles: u64,
}

impl AssemblyMachine {
    /// `targets[slot]` is the resting position of each slot.
    pub fn new(
        targets: Vec<Vec3>,
        pinned_last: Option<usize>,
        timings: AssemblyTimings,
        seed: u64,
        start_ms: f64,
    ) -> LoopResult<Self> {
        if targets.is_empty() {
            return Err(LoopError::validation("assembly needs at least one slot"));
        }
        if let Some(p) = pinned_last
            && p >= targets.len()
        {
            return Err(LoopError::validation(format!(
                "pinned slot {p} out of range for {} slots",
                targets.len()
            )));
        }
        timings.validate()?;

        let mut rng = Rng64::new(seed);
        let order = next_assignment(targets.len(), pinned_last, &mut rng);
        let launch = Launch::random(&mut rng);
        Ok(Self {
            targets,
            pinned_last,
            timings,
            rng,
            order,
            placed: 0,
            state: AssemblyState::Falling,
            since_ms: if start_ms.is_finite() { start_ms } else { 0.0 },
            launch,
            bursts: Vec::new(),
            cycles: 0,
        })
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Slots in placement order for the current cycle.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Completed explode-and-reset cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn state_since_ms(&self) -> f64 {
        self.since_ms
    }

    /// Slot of the piece currently in flight, if any.
    pub fn falling_slot(&self) -> Option<usize> {
        match self.state {
            AssemblyState::Falling => self.order.get(self.placed).copied(),
            _ => None,
        }
    }

    /// Apply every transition whose threshold is at or before `now_ms`.
    ///
    /// Each transition happens at its threshold instant rather than at `now_ms`, so a late call
    /// never stretches the following phase.
    pub fn advance(&mut self, now_ms: f64) {
        if !now_ms.is_finite() {
            return;
        }
        // At most one partial cycle before and one after a skip. All-zero timings would
        // otherwise cycle forever within one call.
        let max_steps = 4 * self.targets.len() + 4;
        self.skip_whole_cycles(now_ms);
        for _ in 0..max_steps {
            if !self.step(now_ms) {
                break;
            }
            self.skip_whole_cycles(now_ms);
        }
    }

    /// At the start of a cycle, jump over every full cycle that ended before `now_ms` with a
    /// single reshuffle, so a long stall does not replay them.
    fn skip_whole_cycles(&mut self, now_ms: f64) {
        let cycle_ms = self.timings.cycle_ms(self.targets.len());
        if cycle_ms <= 0.0 || self.state != AssemblyState::Falling || self.placed != 0 {
            return;
        }
        let behind = now_ms - self.since_ms;
        if behind < cycle_ms {
            return;
        }
        let skipped = (behind / cycle_ms).floor();
        tracing::debug!(skipped, behind_ms = behind, "assembly skipping stalled cycles");
        self.cycles += skipped as u64 - 1;
        self.reset(self.since_ms + skipped * cycle_ms);
    }

    fn step(&mut self, now_ms: f64) -> bool {
        let t = self.timings;
        let elapsed = now_ms - self.since_ms;
        match self.state {
            AssemblyState::Falling if elapsed >= t.fall_ms => {
                let at = self.since_ms + t.fall_ms;
                self.placed += 1;
                if self.placed < self.order.len() {
                    self.enter(AssemblyState::Waiting, at);
                } else {
                    self.enter(AssemblyState::Complete, at);
                }
                true
            }
            AssemblyState::Waiting if elapsed >= t.wait_ms => {
                let at = self.since_ms + t.wait_ms;
                self.launch = Launch::random(&mut self.rng);
                self.enter(AssemblyState::Falling, at);
                true
            }
            AssemblyState::Complete if elapsed >= t.hold_ms => {
                let at = self.since_ms + t.hold_ms;
                let rng = &mut self.rng;
                self.bursts = self
                    .order
                    .iter()
                    .map(|&slot| Burst::toward(self.targets[slot], rng))
                    .collect();
                self.enter(AssemblyState::Exploding, at);
                true
            }
            AssemblyState::Exploding if elapsed >= t.explode_ms => {
                let at = self.since_ms + t.explode_ms;
                self.reset(at);
                true
            }
            _ => false,
        }
    }

    fn enter(&mut self, state: AssemblyState, at_ms: f64) {
        tracing::debug!(
            from = ?self.state,
            to = ?state,
            at_ms,
            placed = self.placed,
            "assembly transition"
        );
        self.state = state;
        self.since_ms = at_ms;
    }

    /// Start a new cycle at `at_ms` with a fresh placement order.
    #[tracing::instrument(level = "debug", skip(self), fields(cycle = self.cycles))]
    pub fn reset(&mut self, at_ms: f64) {
        let order = next_assignment(self.targets.len(), self.pinned_last, &mut self.rng);
        let launch = Launch::random(&mut self.rng);
        self.order = order;
        self.launch = launch;
        self.bursts.clear();
        self.placed = 0;
        self.cycles += 1;
        self.enter(AssemblyState::Falling, at_ms);
    }

    /// Every visible piece at `now_ms`. Pure: does not advance the machine.
    pub fn pieces(&self, now_ms: f64) -> Vec<PieceState> {
        let elapsed = (now_ms - self.since_ms).max(0.0);
        let fraction = |d: f64| if d > 0.0 { clamp01(elapsed / d) } else { 1.0 };

        let settled = |slot: usize| PieceState {
            slot,
            position: self.targets[slot],
            rotation: Euler::default(),
            opacity: 1.0,
            falling: false,
        };

        match self.state {
            AssemblyState::Falling => {
                let mut out: Vec<PieceState> =
                    self.order[..self.placed].iter().map(|&s| settled(s)).collect();
                if let Some(&slot) = self.order.get(self.placed) {
                    let t = fraction(self.timings.fall_ms);
                    let settle = 1.0 - Ease::OutQuad.apply(t);
                    out.push(PieceState {
                        slot,
                        position: self
                            .launch
                            .start
                            .lerp(self.targets[slot], Ease::OutBack.apply(t)),
                        rotation: self.launch.spin.scaled(settle),
                        opacity: 1.0,
                        falling: true,
                    });
                }
                out
            }
            AssemblyState::Waiting | AssemblyState::Complete => {
                self.order[..self.placed].iter().map(|&s| settled(s)).collect()
            }
            AssemblyState::Exploding => {
                let e = Ease::InCubic.apply(fraction(self.timings.explode_ms));
                let frames = elapsed.min(self.timings.explode_ms) / 1000.0 * SPIN_FPS;
                self.order
                    .iter()
                    .zip(&self.bursts)
                    .map(|(&slot, burst)| {
                        let mut position = self.targets[slot] + burst.velocity * e;
                        position.y -= GRAVITY * e * e;
                        let spin = burst.spin * (SPIN_PER_FRAME * frames);
                        PieceState {
                            slot,
                            position,
                            rotation: Euler::new(spin.x, spin.y, spin.z),
                            opacity: 1.0 - e,
                            falling: false,
                        }
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/reshuffle.rs"]
mod tests;
