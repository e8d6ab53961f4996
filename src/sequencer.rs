//! Staggered, cancellable sequencing of visual effects.
//!
//! The sequencer owns the page's effect state: which target currently carries
//! which effect, when each pending effect is due, and when each active effect
//! expires. It knows nothing about the document — presentation goes through a
//! [`Presenter`], and time only moves when the driver calls
//! [`Sequencer::advance_to`], so the whole module runs under plain `cargo test`
//! with simulated clocks.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;

use thiserror::Error;

/// Milliseconds on the page-local monotonic clock.
pub type TimeMs = u64;

/// Identity of an addressable screen element. Assigned once, by the registry
/// for long-lived targets and by the presenter for ephemeral ones.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TargetId(pub u64);

/// Identity of one scheduled effect instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EffectId(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EffectError {
    #[error("no element is registered for the requested role")]
    TargetNotFound,
    #[error("effect was already reverted")]
    AlreadyReverted,
    #[error("preference storage is unavailable")]
    StorageUnavailable,
}

/// A paired enter/exit presentation change.
///
/// `duration_ms` of `Some(d)` is a soft deadline after which the effect reverts
/// on its own; `None` holds the enter state until an external signal (blur,
/// intersection leave, animation end) reverts it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectSpec {
    pub enter_class: Option<String>,
    pub exit_class: Option<String>,
    pub style_delta: Vec<(String, String)>,
    pub duration_ms: Option<TimeMs>,
}

impl EffectSpec {
    pub fn class(enter_class: &str) -> Self {
        Self {
            enter_class: Some(enter_class.to_string()),
            exit_class: None,
            style_delta: Vec::new(),
            duration_ms: None,
        }
    }

    pub fn styles(style_delta: Vec<(String, String)>) -> Self {
        Self {
            enter_class: None,
            exit_class: None,
            style_delta,
            duration_ms: None,
        }
    }

    pub fn with_exit_class(mut self, exit_class: &str) -> Self {
        self.exit_class = Some(exit_class.to_string());
        self
    }

    pub fn lasting(mut self, duration_ms: TimeMs) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Effect lifecycle. `Cancelled` and `Completed` are terminal: a timer that
/// fires for a finished effect finds the terminal phase and drops out without
/// side effects, which is what makes cancellation purely cooperative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectPhase {
    Pending,
    Active,
    Cancelled,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PhaseEvent {
    Start,
    Expire,
    Cancel,
}

impl EffectPhase {
    pub(crate) fn step(self, event: PhaseEvent) -> Self {
        match (self, event) {
            (Self::Pending, PhaseEvent::Start) => Self::Active,
            (Self::Active, PhaseEvent::Expire) => Self::Completed,
            (Self::Pending | Self::Active, PhaseEvent::Cancel) => Self::Cancelled,
            (terminal, _) => terminal,
        }
    }

    fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

/// Non-owning handle to a screen element. The document owns the element; the
/// sequencer only holds the handle while an effect is pending or active.
pub trait EffectTarget: Clone {
    fn id(&self) -> TargetId;
}

/// Seam between scheduling and the document. The wasm presenter mutates class
/// lists and inline styles; tests record calls against the simulated clock.
pub trait Presenter {
    type Target: EffectTarget;

    fn enter(&mut self, now_ms: TimeMs, target: &Self::Target, spec: &EffectSpec);
    fn revert(&mut self, now_ms: TimeMs, target: &Self::Target, spec: &EffectSpec);
}

struct ScheduledEffect<T> {
    id: EffectId,
    target: T,
    spec: Rc<EffectSpec>,
    started_at: Option<TimeMs>,
    expires_at: Option<TimeMs>,
    phase: EffectPhase,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum TimerKind {
    Start,
    Expire,
}

// Ordered by deadline, then by insertion, so same-instant timers fire in the
// order they were scheduled.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct TimerEntry {
    at: TimeMs,
    seq: u64,
    effect: EffectId,
    kind: TimerKind,
}

/// One instance per page load. Single-threaded by construction: every mutation
/// happens inside one deferred-callback invocation.
pub struct Sequencer<P: Presenter> {
    presenter: P,
    now: TimeMs,
    enabled: bool,
    duration_floor: Option<TimeMs>,
    effects: HashMap<EffectId, ScheduledEffect<P::Target>>,
    live_by_target: HashMap<TargetId, EffectId>,
    timers: BinaryHeap<Reverse<TimerEntry>>,
    next_effect: u64,
    next_timer: u64,
}

impl<P: Presenter> Sequencer<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            now: 0,
            enabled: true,
            duration_floor: None,
            effects: HashMap::new(),
            live_by_target: HashMap::new(),
            timers: BinaryHeap::new(),
            next_effect: 0,
            next_timer: 0,
        }
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Schedule `spec` for every target, the i-th (1-based) at delay
    /// `i * stagger_ms`. A target that already carries a live effect is
    /// cancel-and-replaced: the old effect's revert is suppressed and the new
    /// enter state overwrites it. Returns the scheduled ids in target order;
    /// empty once the sequencer is disabled.
    pub fn apply(
        &mut self,
        targets: &[P::Target],
        spec: EffectSpec,
        stagger_ms: TimeMs,
    ) -> Vec<EffectId> {
        if !self.enabled {
            return Vec::new();
        }

        let spec = Rc::new(spec);
        let mut scheduled = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            let delay = (index as TimeMs + 1) * stagger_ms;

            if let Some(&live) = self.live_by_target.get(&target.id()) {
                self.cancel_quietly(live);
            }

            let id = EffectId(self.next_effect);
            self.next_effect += 1;
            let due_at = self.now + delay;

            self.effects.insert(
                id,
                ScheduledEffect {
                    id,
                    target: target.clone(),
                    spec: Rc::clone(&spec),
                    started_at: None,
                    expires_at: None,
                    phase: EffectPhase::Pending,
                },
            );
            self.live_by_target.insert(target.id(), id);
            self.push_timer(due_at, id, TimerKind::Start);
            scheduled.push(id);
        }

        scheduled
    }

    /// Revert one effect now. Idempotent: reverting an effect that already
    /// completed, was cancelled, or never existed is a no-op — the
    /// `AlreadyReverted` case is absorbed here so a timer and an external
    /// signal can race without a double-removal.
    pub fn revert(&mut self, id: EffectId) {
        let _ = self.try_revert(id);
    }

    /// Like [`Sequencer::revert`], but reports whether the signal landed.
    pub fn try_revert(&mut self, id: EffectId) -> Result<(), EffectError> {
        let Some(effect) = self.effects.get(&id) else {
            return Err(EffectError::AlreadyReverted);
        };
        match effect.phase {
            EffectPhase::Active => {
                self.revert_active(id);
                Ok(())
            }
            EffectPhase::Pending => {
                self.cancel_quietly(id);
                Ok(())
            }
            EffectPhase::Cancelled | EffectPhase::Completed => Err(EffectError::AlreadyReverted),
        }
    }

    /// Revert whatever is live on `target`, if anything. Adapters reach for
    /// this on external signals (blur, animation end, pointer leave) where no
    /// effect id is at hand.
    pub fn revert_target(&mut self, target: TargetId) {
        if let Some(&id) = self.live_by_target.get(&target) {
            self.revert(id);
        }
    }

    /// Immediately revert every active effect whose target matches and
    /// suppress every matching pending one. Non-matching effects are left
    /// untouched.
    pub fn cancel_all<F>(&mut self, predicate: F)
    where
        F: Fn(&P::Target) -> bool,
    {
        // Collect first: the sweep must not mutate the map it is iterating.
        let mut matching: Vec<(EffectId, EffectPhase)> = self
            .effects
            .values()
            .filter(|effect| effect.phase.is_live() && predicate(&effect.target))
            .map(|effect| (effect.id, effect.phase))
            .collect();
        matching.sort_by_key(|(id, _)| *id);

        for (id, phase) in matching {
            match phase {
                EffectPhase::Active => self.revert_active(id),
                EffectPhase::Pending => self.cancel_quietly(id),
                EffectPhase::Cancelled | EffectPhase::Completed => {}
            }
        }
    }

    /// Global kill switch for the reduced-motion policy: sweep everything and
    /// refuse all future scheduling.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.cancel_all(|_| true);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Degradation policy under sustained low frame rate: every active bounded
    /// duration is shortened to at most `floor_ms` past its start (never
    /// lengthened), and future starts are capped the same way. Held effects
    /// (`duration_ms: None`) are untouched.
    pub fn clamp_active_durations(&mut self, floor_ms: TimeMs) {
        self.duration_floor = Some(self.duration_floor.map_or(floor_ms, |floor| floor.min(floor_ms)));

        let now = self.now;
        let mut rescheduled = Vec::new();
        for effect in self.effects.values_mut() {
            if effect.phase != EffectPhase::Active {
                continue;
            }
            let (Some(started_at), Some(expires_at)) = (effect.started_at, effect.expires_at)
            else {
                continue;
            };
            let capped = (started_at + floor_ms).max(now);
            if capped < expires_at {
                effect.expires_at = Some(capped);
                rescheduled.push((capped, effect.id));
            }
        }
        for (at, id) in rescheduled {
            self.push_timer(at, id, TimerKind::Expire);
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.duration_floor.is_some()
    }

    /// Drain every timer due at or before `now_ms`, in (deadline, insertion)
    /// order. The presenter observes the scheduled timestamps, not the drain
    /// time, so a coarse wakeup replays the timeline exactly.
    pub fn advance_to(&mut self, now_ms: TimeMs) {
        let now_ms = now_ms.max(self.now);

        loop {
            let due = match self.timers.peek() {
                Some(Reverse(entry)) if entry.at <= now_ms => *entry,
                _ => break,
            };
            self.timers.pop();
            self.now = due.at;
            match due.kind {
                TimerKind::Start => self.fire_start(due.effect),
                TimerKind::Expire => self.fire_expire(due.effect, due.at),
            }
        }

        self.now = now_ms;
    }

    /// Earliest outstanding deadline, if any. Stale entries for finished
    /// effects are fine to report — draining them is side-effect free.
    pub fn next_deadline(&self) -> Option<TimeMs> {
        self.timers.peek().map(|Reverse(entry)| entry.at)
    }

    pub fn active_count(&self) -> usize {
        self.effects
            .values()
            .filter(|effect| effect.phase == EffectPhase::Active)
            .count()
    }

    pub fn is_active(&self, target: TargetId) -> bool {
        self.live_by_target
            .get(&target)
            .and_then(|id| self.effects.get(id))
            .is_some_and(|effect| effect.phase == EffectPhase::Active)
    }

    fn fire_start(&mut self, id: EffectId) {
        let (target, spec, phase) = {
            let Some(effect) = self.effects.get(&id) else {
                return;
            };
            (effect.target.clone(), Rc::clone(&effect.spec), effect.phase)
        };

        if phase != EffectPhase::Pending {
            // Cancelled before start: the timer still fires, the flag wins.
            self.effects.remove(&id);
            return;
        }

        let started_at = self.now;
        let expires_at = spec
            .duration_ms
            .map(|duration| started_at + self.effective_duration(duration));

        if let Some(effect) = self.effects.get_mut(&id) {
            effect.phase = effect.phase.step(PhaseEvent::Start);
            effect.started_at = Some(started_at);
            effect.expires_at = expires_at;
        }
        if let Some(at) = expires_at {
            self.push_timer(at, id, TimerKind::Expire);
        }
        self.presenter.enter(started_at, &target, &spec);
    }

    fn fire_expire(&mut self, id: EffectId, at: TimeMs) {
        let Some(effect) = self.effects.get(&id) else {
            return;
        };
        match effect.phase {
            EffectPhase::Active => {
                // A clamped deadline leaves the original entry in the heap;
                // only the entry matching the current deadline reverts.
                if effect.expires_at.is_some_and(|expires| at >= expires) {
                    self.revert_active(id);
                }
            }
            EffectPhase::Pending => {}
            EffectPhase::Cancelled | EffectPhase::Completed => {
                self.effects.remove(&id);
            }
        }
    }

    fn revert_active(&mut self, id: EffectId) {
        let Some(mut effect) = self.effects.remove(&id) else {
            return;
        };
        effect.phase = effect.phase.step(PhaseEvent::Expire);
        if self.live_by_target.get(&effect.target.id()) == Some(&id) {
            self.live_by_target.remove(&effect.target.id());
        }
        self.presenter.revert(self.now, &effect.target, &effect.spec);
    }

    /// Cancel-and-replace path: suppress the effect without touching the
    /// document. Its record stays behind until the neutralized timer drains.
    fn cancel_quietly(&mut self, id: EffectId) {
        let Some(effect) = self.effects.get_mut(&id) else {
            return;
        };
        effect.phase = effect.phase.step(PhaseEvent::Cancel);
        let target = effect.target.id();
        if self.live_by_target.get(&target) == Some(&id) {
            self.live_by_target.remove(&target);
        }
    }

    fn effective_duration(&self, duration_ms: TimeMs) -> TimeMs {
        self.duration_floor
            .map_or(duration_ms, |floor| duration_ms.min(floor))
    }

    fn push_timer(&mut self, at: TimeMs, effect: EffectId, kind: TimerKind) {
        let entry = TimerEntry {
            at,
            seq: self.next_timer,
            effect,
            kind,
        };
        self.next_timer += 1;
        self.timers.push(Reverse(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    struct Probe {
        id: TargetId,
        name: &'static str,
    }

    impl EffectTarget for Probe {
        fn id(&self) -> TargetId {
            self.id
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<(TimeMs, &'static str, &'static str)>>>,
    }

    impl Presenter for Recorder {
        type Target = Probe;

        fn enter(&mut self, now_ms: TimeMs, target: &Probe, _spec: &EffectSpec) {
            self.events.borrow_mut().push((now_ms, target.name, "enter"));
        }

        fn revert(&mut self, now_ms: TimeMs, target: &Probe, _spec: &EffectSpec) {
            self.events.borrow_mut().push((now_ms, target.name, "revert"));
        }
    }

    fn probe(id: u64, name: &'static str) -> Probe {
        Probe {
            id: TargetId(id),
            name,
        }
    }

    fn recording_sequencer() -> (
        Sequencer<Recorder>,
        Rc<RefCell<Vec<(TimeMs, &'static str, &'static str)>>>,
    ) {
        let recorder = Recorder::default();
        let events = Rc::clone(&recorder.events);
        (Sequencer::new(recorder), events)
    }

    fn fading(duration_ms: TimeMs) -> EffectSpec {
        EffectSpec::class("animate").lasting(duration_ms)
    }

    #[test]
    fn phase_transitions_follow_the_table() {
        use EffectPhase::*;
        use PhaseEvent::*;

        assert_eq!(Pending.step(Start), Active);
        assert_eq!(Pending.step(Cancel), Cancelled);
        assert_eq!(Active.step(Expire), Completed);
        assert_eq!(Active.step(Cancel), Cancelled);

        // Terminal states absorb everything, including a late Start.
        for event in [Start, Expire, Cancel] {
            assert_eq!(Cancelled.step(event), Cancelled);
            assert_eq!(Completed.step(event), Completed);
        }
        // A pending effect cannot expire before it starts.
        assert_eq!(Pending.step(Expire), Pending);
    }

    #[test]
    fn stagger_timeline_matches_reference() {
        let (mut sequencer, events) = recording_sequencer();
        let targets = [probe(1, "a"), probe(2, "b"), probe(3, "c")];

        sequencer.apply(&targets, fading(500), 100);
        assert_eq!(sequencer.active_count(), 0, "nothing active at t=0");

        sequencer.advance_to(100);
        assert!(sequencer.is_active(TargetId(1)));
        assert!(!sequencer.is_active(TargetId(2)));

        sequencer.advance_to(300);
        assert_eq!(sequencer.active_count(), 3);

        sequencer.advance_to(800);
        assert_eq!(sequencer.active_count(), 0);

        assert_eq!(
            *events.borrow(),
            vec![
                (100, "a", "enter"),
                (200, "b", "enter"),
                (300, "c", "enter"),
                (600, "a", "revert"),
                (700, "b", "revert"),
                (800, "c", "revert"),
            ]
        );
    }

    #[test]
    fn coarse_wakeup_replays_the_timeline_in_order() {
        let (mut sequencer, events) = recording_sequencer();
        let targets = [probe(1, "a"), probe(2, "b"), probe(3, "c")];

        sequencer.apply(&targets, fading(500), 100);
        sequencer.advance_to(10_000);

        assert_eq!(
            *events.borrow(),
            vec![
                (100, "a", "enter"),
                (200, "b", "enter"),
                (300, "c", "enter"),
                (600, "a", "revert"),
                (700, "b", "revert"),
                (800, "c", "revert"),
            ]
        );
    }

    #[test]
    fn independent_applies_interleave_by_deadline() {
        let (mut sequencer, events) = recording_sequencer();

        sequencer.apply(&[probe(1, "a"), probe(2, "b")], EffectSpec::class("slide"), 300);
        sequencer.apply(&[probe(3, "c")], EffectSpec::class("fade"), 100);
        sequencer.advance_to(600);

        assert_eq!(
            *events.borrow(),
            vec![(100, "c", "enter"), (300, "a", "enter"), (600, "b", "enter")]
        );
    }

    #[test]
    fn new_trigger_replaces_pending_effect() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(7, "hero");

        sequencer.apply(&[target], fading(500), 100);
        sequencer.apply(&[target], EffectSpec::class("pulse").lasting(50), 10);
        sequencer.advance_to(1_000);

        // The first enter never fires; the replacement runs its full cycle.
        assert_eq!(
            *events.borrow(),
            vec![(10, "hero", "enter"), (60, "hero", "revert")]
        );
    }

    #[test]
    fn replacing_an_active_effect_suppresses_its_revert() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(7, "hero");

        sequencer.apply(&[target], fading(500), 0);
        sequencer.advance_to(0);
        assert!(sequencer.is_active(target.id()));

        sequencer.apply(&[target], fading(200), 0);
        sequencer.advance_to(2_000);

        assert_eq!(
            *events.borrow(),
            vec![
                (0, "hero", "enter"),
                (0, "hero", "enter"),
                (200, "hero", "revert"),
            ]
        );
    }

    #[test]
    fn at_most_one_live_effect_per_target() {
        let (mut sequencer, _events) = recording_sequencer();
        let target = probe(4, "card");

        for _ in 0..5 {
            sequencer.apply(&[target], fading(400), 0);
        }
        sequencer.advance_to(100);
        assert_eq!(sequencer.active_count(), 1);

        sequencer.advance_to(2_000);
        assert_eq!(sequencer.active_count(), 0);
    }

    #[test]
    fn revert_is_idempotent() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(9, "field");

        let ids = sequencer.apply(&[target], EffectSpec::class("focused"), 0);
        sequencer.advance_to(0);

        sequencer.revert(ids[0]);
        sequencer.revert(ids[0]);
        sequencer.advance_to(5_000);

        assert_eq!(
            *events.borrow(),
            vec![(0, "field", "enter"), (0, "field", "revert")]
        );
    }

    #[test]
    fn second_revert_reports_already_reverted() {
        let (mut sequencer, _events) = recording_sequencer();
        let ids = sequencer.apply(&[probe(9, "field")], fading(300), 0);
        sequencer.advance_to(0);

        assert_eq!(sequencer.try_revert(ids[0]), Ok(()));
        assert_eq!(
            sequencer.try_revert(ids[0]),
            Err(EffectError::AlreadyReverted)
        );
    }

    #[test]
    fn timer_and_external_revert_race_is_single_revert() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(9, "field");

        let ids = sequencer.apply(&[target], fading(300), 0);
        sequencer.advance_to(400);
        sequencer.revert(ids[0]);

        assert_eq!(
            *events.borrow(),
            vec![(0, "field", "enter"), (300, "field", "revert")]
        );
    }

    #[test]
    fn revert_presents_the_original_spec() {
        struct SpecCheck {
            exits: Rc<RefCell<Vec<Option<String>>>>,
        }

        impl Presenter for SpecCheck {
            type Target = Probe;

            fn enter(&mut self, _now_ms: TimeMs, _target: &Probe, _spec: &EffectSpec) {}

            fn revert(&mut self, _now_ms: TimeMs, _target: &Probe, spec: &EffectSpec) {
                self.exits.borrow_mut().push(spec.exit_class.clone());
            }
        }

        let exits = Rc::new(RefCell::new(Vec::new()));
        let mut sequencer = Sequencer::new(SpecCheck {
            exits: Rc::clone(&exits),
        });

        sequencer.apply(
            &[probe(1, "field")],
            EffectSpec::class("shake").with_exit_class("typed").lasting(100),
            0,
        );
        sequencer.advance_to(500);

        assert_eq!(*exits.borrow(), vec![Some("typed".to_string())]);
    }

    #[test]
    fn revert_target_without_live_effect_is_noop() {
        let (mut sequencer, events) = recording_sequencer();
        sequencer.revert_target(TargetId(42));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn revert_of_pending_effect_suppresses_it() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(3, "link");

        let ids = sequencer.apply(&[target], fading(500), 250);
        sequencer.revert(ids[0]);
        sequencer.advance_to(5_000);

        assert!(events.borrow().is_empty());
        assert_eq!(sequencer.active_count(), 0);
    }

    #[test]
    fn cancel_all_reverts_matching_and_spares_the_rest() {
        let (mut sequencer, events) = recording_sequencer();
        let decorative = [probe(1, "particle-1"), probe(2, "particle-2")];
        let structural = probe(10, "navbar");

        sequencer.apply(&decorative, fading(10_000), 0);
        sequencer.apply(&[structural], fading(10_000), 0);
        sequencer.advance_to(50);
        assert_eq!(sequencer.active_count(), 3);

        sequencer.cancel_all(|target| target.name.starts_with("particle"));

        assert!(!sequencer.is_active(TargetId(1)));
        assert!(!sequencer.is_active(TargetId(2)));
        assert!(sequencer.is_active(structural.id()));

        let reverts: Vec<_> = events
            .borrow()
            .iter()
            .filter(|(_, _, action)| *action == "revert")
            .map(|(_, name, _)| *name)
            .collect();
        assert_eq!(reverts, vec!["particle-1", "particle-2"]);
    }

    #[test]
    fn cancel_all_suppresses_matching_pending_effects() {
        let (mut sequencer, events) = recording_sequencer();
        let pending = probe(1, "particle-1");
        let unrelated = probe(10, "navbar");

        sequencer.apply(&[pending], fading(500), 400);
        sequencer.apply(&[unrelated], fading(500), 100);
        sequencer.cancel_all(|target| target.name.starts_with("particle"));
        sequencer.advance_to(5_000);

        let names: Vec<_> = events.borrow().iter().map(|(_, name, _)| *name).collect();
        assert_eq!(names, vec!["navbar", "navbar"]);
    }

    #[test]
    fn disabled_sequencer_schedules_nothing() {
        let (mut sequencer, events) = recording_sequencer();
        sequencer.disable();

        let ids = sequencer.apply(&[probe(1, "a")], fading(100), 0);
        sequencer.advance_to(5_000);

        assert!(ids.is_empty());
        assert!(events.borrow().is_empty());
        assert_eq!(sequencer.active_count(), 0);
    }

    #[test]
    fn reduced_motion_at_startup_means_zero_effects_ever() {
        let (mut sequencer, events) = recording_sequencer();

        // Startup policy: one sweep, then nothing is ever scheduled again.
        sequencer.disable();
        assert!(!sequencer.is_enabled());

        sequencer.apply(&[probe(1, "hero")], fading(800), 200);
        sequencer.advance_to(10_000);
        sequencer.apply(&[probe(2, "card")], EffectSpec::class("lift"), 0);
        sequencer.advance_to(20_000);

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn duration_clamp_shortens_but_never_lengthens() {
        let (mut sequencer, events) = recording_sequencer();
        let slow = probe(1, "slow");
        let quick = probe(2, "quick");

        sequencer.apply(&[slow], fading(5_000), 100);
        sequencer.apply(&[quick], fading(50), 100);
        sequencer.advance_to(100);

        sequencer.clamp_active_durations(100);
        sequencer.advance_to(10_000);

        assert_eq!(
            *events.borrow(),
            vec![
                (100, "slow", "enter"),
                (100, "quick", "enter"),
                (150, "quick", "revert"),
                (200, "slow", "revert"),
            ]
        );
    }

    #[test]
    fn duration_clamp_expires_overdue_effects_at_the_sweep_time() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(1, "glow");

        sequencer.apply(&[target], fading(5_000), 0);
        sequencer.advance_to(700);
        sequencer.clamp_active_durations(100);
        sequencer.advance_to(701);

        assert_eq!(
            *events.borrow(),
            vec![(0, "glow", "enter"), (700, "glow", "revert")]
        );
    }

    #[test]
    fn duration_clamp_leaves_held_effects_alone() {
        let (mut sequencer, _events) = recording_sequencer();
        let held = probe(1, "section");

        sequencer.apply(&[held], EffectSpec::class("animate"), 0);
        sequencer.advance_to(10);
        sequencer.clamp_active_durations(100);
        sequencer.advance_to(60_000);

        assert!(sequencer.is_active(held.id()));
    }

    #[test]
    fn duration_clamp_caps_future_starts() {
        let (mut sequencer, events) = recording_sequencer();
        sequencer.clamp_active_durations(100);
        assert!(sequencer.is_degraded());

        sequencer.apply(&[probe(1, "late")], fading(5_000), 0);
        sequencer.advance_to(1_000);

        assert_eq!(
            *events.borrow(),
            vec![(0, "late", "enter"), (100, "late", "revert")]
        );
    }

    #[test]
    fn zero_duration_effect_enters_then_reverts_in_one_drain() {
        let (mut sequencer, events) = recording_sequencer();
        let target = probe(1, "blip");

        sequencer.apply(&[target], fading(0), 0);
        sequencer.advance_to(0);

        assert_eq!(
            *events.borrow(),
            vec![(0, "blip", "enter"), (0, "blip", "revert")]
        );
        assert_eq!(sequencer.active_count(), 0);
    }

    #[test]
    fn next_deadline_tracks_the_earliest_timer() {
        let (mut sequencer, _events) = recording_sequencer();
        assert_eq!(sequencer.next_deadline(), None);

        sequencer.apply(&[probe(1, "a")], fading(500), 300);
        assert_eq!(sequencer.next_deadline(), Some(300));

        sequencer.advance_to(300);
        assert_eq!(sequencer.next_deadline(), Some(800));
    }
}
