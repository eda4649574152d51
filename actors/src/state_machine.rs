//! Priority state machine shared by every actor family.
//!
//! A family is an ordered enum (`Ord` ranks priority) with a distinguished
//! `NONE` minimum. Each tick the pending event request, the input candidate
//! and the environment candidate are folded with `max`; a different result
//! fires exactly one transition.

use std::fmt::Debug;

pub trait ActorState: Copy + Ord + Debug {
    /// "No opinion" candidate; also the parked state of an inactive form.
    const NONE: Self;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub to: S,
}

#[derive(Clone, Debug)]
pub struct StateMachine<S: ActorState> {
    state: S,
    pending: S,
    state_end_time: f32,
}

impl<S: ActorState> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            pending: S::NONE,
            state_end_time: 0.0,
        }
    }

    pub fn state(&self) -> S {
        self.state
    }

    pub fn pending(&self) -> S {
        self.pending
    }

    /// Raise the pending candidate. Lower-priority requests are absorbed.
    pub fn request(&mut self, candidate: S) {
        self.pending = self.pending.max(candidate);
    }

    pub fn start_timer(&mut self, now: f32, duration: f32) {
        self.state_end_time = now + duration;
    }

    pub fn set_deadline(&mut self, deadline: f32) {
        self.state_end_time = deadline;
    }

    pub fn deadline(&self) -> f32 {
        self.state_end_time
    }

    pub fn timer_running(&self, now: f32) -> bool {
        self.state_end_time > now
    }

    /// Drop to `NONE` without running any transition rules.
    pub(crate) fn park(&mut self) {
        self.state = S::NONE;
        self.pending = S::NONE;
    }

    fn commit(&mut self, next: S) {
        self.state = next;
    }

    fn clear_pending(&mut self) {
        self.pending = S::NONE;
    }
}

/// Per-family behavior plugged into [`update_state`].
///
/// `C` is whatever the family needs to read its environment (collision info,
/// clock, detectors) and to perform side effects.
pub trait StateRules<C: ?Sized> {
    type State: ActorState;

    fn machine(&self) -> &StateMachine<Self::State>;
    fn machine_mut(&mut self) -> &mut StateMachine<Self::State>;

    fn next_state_from_input(&self, _state: Self::State, _ctx: &C) -> Self::State {
        Self::State::NONE
    }

    /// Must cover every state the family can be in; unlisted states panic.
    fn next_state_from_environment(&self, state: Self::State, ctx: &C) -> Self::State;

    fn on_transition(&mut self, from: Self::State, to: Self::State, ctx: &mut C);

    fn update_animation_state(&mut self, _state: Self::State, _ctx: &mut C) {}
}

/// Resolve at most one transition. The pending request is consumed either way.
pub fn update_state<C, R>(rules: &mut R, ctx: &mut C) -> Option<Transition<R::State>>
where
    C: ?Sized,
    R: StateRules<C> + ?Sized,
{
    let current = rules.machine().state();
    let mut next = rules.machine().pending();

    if current != R::State::NONE {
        next = next.max(rules.next_state_from_input(current, ctx));
        next = next.max(rules.next_state_from_environment(current, ctx));
    }

    let transition = if next != current && next != R::State::NONE {
        log::debug!("state {current:?} -> {next:?}");
        rules.on_transition(current, next, ctx);
        rules.machine_mut().commit(next);
        rules.update_animation_state(next, ctx);
        Some(Transition {
            from: current,
            to: next,
        })
    } else {
        None
    };

    rules.machine_mut().clear_pending();
    transition
}

/// Fatal branch for a state a rule table does not list.
#[track_caller]
pub fn undefined_state<S: Debug>(family: &str, state: S) -> ! {
    log::error!("{family}: undefined state {state:?}");
    panic!("{family}: undefined state {state:?}")
}
