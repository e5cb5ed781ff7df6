use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::clamp01;

/// One named sub-interval of a looping cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase<P> {
    pub id: P,
    pub duration_ms: f64,
}

/// Result of locating a timestamp within a [`PhaseSchedule`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSample<P> {
    /// Phase identifier.
    pub phase: P,
    /// Position of the phase in the schedule.
    pub index: usize,
    /// Fraction of the phase elapsed, in [0,1].
    pub progress: f64,
}

/// Fixed-duration phases repeating with period `cycle_ms`, optionally staggered per entity.
///
/// The schedule holds no clock. Every query recomputes the phase from
/// `(now - index * stagger) mod cycle`, so sampling never drifts and sampling the same instant
/// twice yields the same answer.
///
/// When a cycle longer than the sum of the phases is configured, the trailing time reports the
/// last phase held at progress 1.0.
#[derive(Clone, Debug)]
pub struct PhaseSchedule<P> {
    phases: Vec<Phase<P>>,
    cycle_ms: f64,
    stagger_ms: f64,
}

fn check_duration(what: &str, ms: f64) -> LoopResult<()> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(LoopError::validation(format!(
            "{what} must be finite and >= 0, got {ms}"
        )));
    }
    Ok(())
}

impl<P: Copy> PhaseSchedule<P> {
    /// Build a schedule whose cycle is the sum of `phases`.
    pub fn new(phases: impl IntoIterator<Item = (P, f64)>) -> LoopResult<Self> {
        let phases: Vec<Phase<P>> = phases
            .into_iter()
            .map(|(id, duration_ms)| Phase { id, duration_ms })
            .collect();
        if phases.is_empty() {
            return Err(LoopError::validation("phase schedule needs at least one phase"));
        }
        for p in &phases {
            check_duration("phase duration", p.duration_ms)?;
        }
        let cycle_ms = phases.iter().map(|p| p.duration_ms).sum();
        Ok(Self {
            phases,
            cycle_ms,
            stagger_ms: 0.0,
        })
    }

    /// Per-entity start delay; entity `i` lags by `i * stagger_ms`.
    pub fn with_stagger_ms(mut self, stagger_ms: f64) -> LoopResult<Self> {
        check_duration("stagger", stagger_ms)?;
        self.stagger_ms = stagger_ms;
        Ok(self)
    }

    /// Pad the cycle past the end of the last phase.
    pub fn with_cycle_ms(mut self, cycle_ms: f64) -> LoopResult<Self> {
        check_duration("cycle", cycle_ms)?;
        let sum = self.phases_total_ms();
        if cycle_ms < sum {
            return Err(LoopError::validation(format!(
                "cycle {cycle_ms}ms is shorter than its phases ({sum}ms)"
            )));
        }
        self.cycle_ms = cycle_ms;
        Ok(self)
    }

    pub fn phases(&self) -> &[Phase<P>] {
        &self.phases
    }

    pub fn cycle_ms(&self) -> f64 {
        self.cycle_ms
    }

    pub fn stagger_ms(&self) -> f64 {
        self.stagger_ms
    }

    fn phases_total_ms(&self) -> f64 {
        self.phases.iter().map(|p| p.duration_ms).sum()
    }

    /// Start offset of phase `index` within the cycle.
    pub fn phase_start_ms(&self, index: usize) -> f64 {
        self.phases
            .iter()
            .take(index)
            .map(|p| p.duration_ms)
            .sum()
    }

    fn first(&self, progress: f64) -> PhaseSample<P> {
        PhaseSample {
            phase: self.phases[0].id,
            index: 0,
            progress,
        }
    }

    fn last_complete(&self) -> PhaseSample<P> {
        let index = self.phases.len() - 1;
        PhaseSample {
            phase: self.phases[index].id,
            index,
            progress: 1.0,
        }
    }

    /// Locate `now_ms` for entity `entity_index`.
    pub fn sample(&self, now_ms: f64, entity_index: usize) -> PhaseSample<P> {
        let shifted = now_ms - entity_index as f64 * self.stagger_ms;
        self.sample_shifted(shifted)
    }

    fn sample_shifted(&self, shifted_ms: f64) -> PhaseSample<P> {
        if !shifted_ms.is_finite() {
            return self.first(0.0);
        }
        if self.cycle_ms <= 0.0 {
            // Degenerate cycle: everything is already complete.
            return self.last_complete();
        }

        let adjusted = shifted_ms % self.cycle_ms;
        if adjusted < 0.0 {
            // Entity has not started yet.
            return self.first(0.0);
        }

        let mut remainder = adjusted;
        for (index, p) in self.phases.iter().enumerate() {
            if remainder < p.duration_ms {
                return PhaseSample {
                    phase: p.id,
                    index,
                    progress: clamp01(remainder / p.duration_ms),
                };
            }
            remainder -= p.duration_ms;
        }
        self.last_complete()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/phase.rs"]
mod tests;
