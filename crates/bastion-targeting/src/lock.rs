//! Target lock state machine.
//!
//! Idle -> Acquiring -> Locked, with a Degrading sub-state reachable only
//! from Locked. A lock holds its target by `ContactId` and re-resolves it
//! against the host's contact list every tick; a contact that is missing,
//! inactive, or cloaked breaks the lock immediately.

use glam::DVec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use bastion_core::config::LockTuning;
use bastion_core::enums::{LockBreakReason, LockPhase};
use bastion_core::state::LockView;
use bastion_core::types::{Contact, ContactId};

use crate::aim::{adaptive_lock_time, AimTracker};

/// Slack on the acquisition comparison so a sum of tick lengths that
/// should equal the threshold is not lost to rounding.
const LOCK_TIME_EPSILON: f64 = 1e-9;

/// Input to the lock FSM for one tick.
pub struct LockInput<'a> {
    pub dt: f64,
    pub aim: DVec2,
    pub contacts: &'a [Contact],
}

/// A transition worth telling subscribers about. At most one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockSignal {
    Acquiring(ContactId),
    Acquired(ContactId),
    Degrading(ContactId),
    Recovered(ContactId),
    Broken {
        target: ContactId,
        reason: LockBreakReason,
    },
}

/// Lock state for one targeting agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLock {
    current_target: Option<ContactId>,
    /// Seconds of stable aim accumulated on `current_target`.
    lock_progress: f64,
    /// Adaptive acquisition threshold, recomputed every tick.
    current_lock_time: f64,
    is_locked: bool,
    is_losing_lock: bool,
    lock_loss_progress: f64,
    aim: AimTracker,
}

impl TargetLock {
    pub fn new(tuning: &LockTuning) -> Self {
        Self {
            current_target: None,
            lock_progress: 0.0,
            current_lock_time: tuning.min_lock_secs,
            is_locked: false,
            is_losing_lock: false,
            lock_loss_progress: 0.0,
            aim: AimTracker::default(),
        }
    }

    pub fn phase(&self) -> LockPhase {
        match (self.current_target, self.is_locked) {
            (_, true) => LockPhase::Locked,
            (Some(_), false) => LockPhase::Acquiring,
            (None, false) => LockPhase::Idle,
        }
    }

    /// Target held by a completed lock (degrading locks still count).
    pub fn locked_target(&self) -> Option<ContactId> {
        if self.is_locked {
            self.current_target
        } else {
            None
        }
    }

    pub fn current_target(&self) -> Option<ContactId> {
        self.current_target
    }

    pub fn lock_progress(&self) -> f64 {
        self.lock_progress
    }

    pub fn current_lock_time(&self) -> f64 {
        self.current_lock_time
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn is_losing_lock(&self) -> bool {
        self.is_losing_lock
    }

    pub fn lock_loss_progress(&self) -> f64 {
        self.lock_loss_progress
    }

    pub fn view(&self) -> LockView {
        LockView {
            phase: self.phase(),
            target: self.current_target,
            lock_progress: self.lock_progress,
            current_lock_time: self.current_lock_time,
            losing_lock: self.is_losing_lock,
            lock_loss_progress: self.lock_loss_progress,
        }
    }

    /// Drop any target without signalling. The aim history is kept.
    pub fn reset(&mut self) {
        self.current_target = None;
        self.lock_progress = 0.0;
        self.is_locked = false;
        self.is_losing_lock = false;
        self.lock_loss_progress = 0.0;
    }

    /// Advance the FSM by one tick.
    pub fn update(&mut self, input: &LockInput<'_>, tuning: &LockTuning) -> Option<LockSignal> {
        if !input.aim.is_finite() {
            warn!("lock update with non-finite aim point {:?}", input.aim);
            return self.break_lock(LockBreakReason::OutOfTolerance);
        }

        let speed = self.aim.sample(input.aim, input.dt, tuning);
        self.current_lock_time = adaptive_lock_time(speed, tuning);

        if self.is_locked {
            self.update_locked(input, tuning)
        } else {
            self.update_acquiring(input, tuning)
        }
    }

    fn update_acquiring(&mut self, input: &LockInput<'_>, tuning: &LockTuning) -> Option<LockSignal> {
        let Some(candidate) = contact_under_aim(input.aim, input.contacts, tuning) else {
            if let Some(target) = self.current_target {
                debug!("acquisition of {target:?} abandoned, aim left detection radius");
            }
            self.reset();
            return None;
        };

        if self.current_target != Some(candidate) {
            // Progress never transfers between targets. The entry tick counts.
            self.reset();
            self.current_target = Some(candidate);
            self.lock_progress = input.dt;
            debug!("acquiring {candidate:?}");
            return Some(LockSignal::Acquiring(candidate));
        }

        self.lock_progress += input.dt;
        if self.lock_progress + LOCK_TIME_EPSILON >= self.current_lock_time {
            self.is_locked = true;
            debug!(
                "locked {candidate:?} after {:.2}s (threshold {:.2}s)",
                self.lock_progress, self.current_lock_time
            );
            return Some(LockSignal::Acquired(candidate));
        }
        None
    }

    fn update_locked(&mut self, input: &LockInput<'_>, tuning: &LockTuning) -> Option<LockSignal> {
        let target_id = self.current_target?;
        let Some(target) = input
            .contacts
            .iter()
            .find(|c| c.id == target_id)
            .filter(|c| c.is_lockable())
        else {
            return self.break_lock(LockBreakReason::TargetLost);
        };

        let distance = input.aim.distance(target.position);
        let detection = detection_radius(target, tuning);
        let tolerance = detection * tuning.drift_tolerance_multiplier;

        if distance <= detection {
            if self.is_losing_lock {
                self.is_losing_lock = false;
                self.lock_loss_progress = 0.0;
                debug!("lock on {target_id:?} recovered");
                return Some(LockSignal::Recovered(target_id));
            }
            return None;
        }

        if distance > tolerance {
            return self.break_lock(LockBreakReason::OutOfTolerance);
        }

        // Inside the band: 1.0 at the detection edge rising to
        // `loss_rate_at_edge` at the tolerance edge.
        let depth = (distance - detection) / (tolerance - detection);
        let rate = 1.0 + (tuning.loss_rate_at_edge - 1.0) * depth;
        self.lock_loss_progress += input.dt * rate;

        if self.lock_loss_progress >= tuning.loss_timeout_secs {
            return self.break_lock(LockBreakReason::Degraded);
        }

        if !self.is_losing_lock {
            self.is_losing_lock = true;
            debug!("lock on {target_id:?} degrading");
            return Some(LockSignal::Degrading(target_id));
        }
        None
    }

    /// Return to Idle. Only a completed lock produces a `Broken` signal.
    pub fn break_lock(&mut self, reason: LockBreakReason) -> Option<LockSignal> {
        let signal = match (self.current_target, self.is_locked) {
            (Some(target), true) => {
                debug!("lock on {target:?} broken: {reason:?}");
                Some(LockSignal::Broken { target, reason })
            }
            _ => None,
        };
        self.reset();
        signal
    }
}

/// Radius around a contact inside which the aim point counts as on target.
pub fn detection_radius(contact: &Contact, tuning: &LockTuning) -> f64 {
    contact.radius * tuning.detection_radius_multiplier
}

/// Nearest lockable contact whose detection radius contains the aim point.
pub fn contact_under_aim(aim: DVec2, contacts: &[Contact], tuning: &LockTuning) -> Option<ContactId> {
    contacts
        .iter()
        .filter(|c| c.is_lockable())
        .map(|c| (c.id, aim.distance(c.position), detection_radius(c, tuning)))
        .filter(|(_, distance, radius)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _, _)| id)
}
