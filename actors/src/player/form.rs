use motion::{CollisionWorld, Controller, FrameTime};

use crate::{
    combat::HitVolume,
    kinematics::{Acceleration, Kinematics},
    policy::{JumpPhysics, horizontal_target},
    signal::Signal,
    state_machine::{ActorState, StateMachine, StateRules, undefined_state, update_state},
    tuning::PlayerTuning,
};

/// Horizontal speed below which a walking player counts as standing.
const WALKING_EPSILON: f32 = 0.1;

/// Player states in ascending priority. Some only exist for one form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayerState {
    None,
    Idle,
    SpecialActionReady,
    CancelableSpecialActionReady,
    Walking,
    Attack1,
    Attack2,
    Attack3,
    Attack4,
    JumpingDown,
    /// Falling right after a transformation; landing opens the special action window.
    SpecialJumpingDown,
    Uppercut,
    WallStick,
    Rolling,
    SuperJump,
    JumpingUp,
    PostTransformationDelay,
    Hit,
    GameOver,
}

impl ActorState for PlayerState {
    const NONE: Self = PlayerState::None;
}

impl PlayerState {
    pub const ATTACKS: [PlayerState; 4] = [
        PlayerState::Attack1,
        PlayerState::Attack2,
        PlayerState::Attack3,
        PlayerState::Attack4,
    ];

    /// Combo index of an attack state, 0 for `Attack1`.
    pub fn attack_index(self) -> Option<usize> {
        Self::ATTACKS.iter().position(|s| *s == self)
    }
}

/// Per-frame view of everything a form reads or changes.
pub struct FormContext<'a> {
    pub world: &'a mut CollisionWorld,
    pub controller: &'a mut Controller,
    pub tuning: &'a PlayerTuning,
    pub horizontal_input: f32,
    pub clock: FrameTime,
    pub signals: &'a mut Vec<Signal>,
}

/// State, flags and physics every form carries.
#[derive(Clone, Debug)]
pub struct FormBase {
    pub(crate) machine: StateMachine<PlayerState>,
    pub(crate) kinematics: Kinematics,
    pub(crate) jump: JumpPhysics,
    pub(crate) gravity: f32,
    move_speed: f32,
    /// When off the form does not move at all, regardless of the horizontal flag.
    pub(crate) movement_enabled: bool,
    pub(crate) horizontal_movement_enabled: bool,
    pub(crate) transformation_enabled: bool,
    pub(crate) ignore_damage: bool,
    pub(crate) damage_ignored_until: Option<f32>,
}

impl FormBase {
    pub fn new(tuning: &PlayerTuning, move_speed: f32, initial: PlayerState) -> Self {
        let jump = JumpPhysics::from_heights(tuning.max_jump_height, tuning.min_jump_height, tuning.floating_time);
        Self {
            machine: StateMachine::new(initial),
            kinematics: Kinematics::default(),
            jump,
            gravity: jump.gravity,
            move_speed,
            movement_enabled: true,
            horizontal_movement_enabled: true,
            transformation_enabled: true,
            ignore_damage: false,
            damage_ignored_until: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.machine.state()
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn jump(&self) -> &JumpPhysics {
        &self.jump
    }

    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    pub fn horizontal_movement_enabled(&self) -> bool {
        self.horizontal_movement_enabled
    }

    pub fn transformation_enabled(&self) -> bool {
        self.transformation_enabled
    }

    /// False while immune, and while a hit or death from this tick is still pending.
    pub fn accepts_damage(&self) -> bool {
        !self.ignore_damage && self.damage_ignored_until.is_none() && self.machine.pending() < PlayerState::Hit
    }

    /// Turn around, unless horizontal movement is locked.
    pub(crate) fn set_heading_right(&mut self, ctx: &mut FormContext<'_>, heading_right: bool) {
        if self.horizontal_movement_enabled {
            self.kinematics.face(ctx.controller, ctx.world, heading_right);
        }
    }

    pub(crate) fn update_direction(&mut self, ctx: &mut FormContext<'_>) {
        if ctx.horizontal_input != 0.0 {
            let heading_right = ctx.horizontal_input > 0.0;
            self.set_heading_right(ctx, heading_right);
        }
    }

    fn calculate_velocity(&mut self, ctx: &FormContext<'_>) {
        let target = horizontal_target(
            ctx.horizontal_input,
            self.move_speed,
            ctx.controller.heading_right(),
            self.horizontal_movement_enabled,
        );
        let acceleration = Acceleration {
            grounded: ctx.tuning.acceleration_time_grounded,
            airborne: ctx.tuning.acceleration_time_airborne,
        };
        let grounded = ctx.controller.collisions().below.any();
        self.kinematics
            .steer(target, grounded, acceleration, self.gravity, ctx.clock.dt);
    }

    fn expire_damage_ignore(&mut self, ctx: &mut FormContext<'_>) {
        if let Some(until) = self.damage_ignored_until {
            if ctx.clock.now >= until {
                self.damage_ignored_until = None;
                self.transformation_enabled = true;
                ctx.signals.push(Signal::DamageBlink(false));
            }
        }
    }
}

/// Behavior a concrete form adds on top of [`FormBase`].
pub trait PlayerForm {
    const NAME: &'static str;

    /// Request produced by the action button in `state`.
    fn on_action_button(&mut self, state: PlayerState) -> PlayerState;

    /// Form-specific environment rule; `None` falls back to the shared table.
    fn next_state_from_environment(
        &self,
        base: &FormBase,
        state: PlayerState,
        ctx: &FormContext<'_>,
    ) -> Option<PlayerState>;

    fn exit_state(&mut self, base: &mut FormBase, from: PlayerState, to: PlayerState, ctx: &mut FormContext<'_>);

    fn enter_state(&mut self, base: &mut FormBase, from: PlayerState, to: PlayerState, ctx: &mut FormContext<'_>);

    /// `None` marks a state the form must never be in.
    fn animation_clip(state: PlayerState) -> Option<&'static str>;

    /// Damage and knockback dealt to a target touched by the active volume.
    fn on_attack(&mut self, base: &mut FormBase, tuning: &PlayerTuning) -> Option<(i32, motion::Vec2)>;

    fn active_volume(&self) -> Option<&HitVolume>;

    fn active_volume_mut(&mut self) -> Option<&mut HitVolume>;

    /// Extra room check before this form may be swapped in or out.
    fn has_room(&self, _world: &CollisionWorld, _controller: &Controller, _tuning: &PlayerTuning) -> bool {
        true
    }
}

/// A form together with its base state.
#[derive(Clone, Debug)]
pub struct FormSlot<F> {
    pub(crate) base: FormBase,
    pub(crate) form: F,
}

impl<F: PlayerForm> FormSlot<F> {
    pub fn new(base: FormBase, form: F) -> Self {
        Self { base, form }
    }

    pub fn base(&self) -> &FormBase {
        &self.base
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn can_transform(&self, world: &CollisionWorld, controller: &Controller, tuning: &PlayerTuning) -> bool {
        self.base.transformation_enabled && self.form.has_room(world, controller, tuning)
    }

    pub(crate) fn tick(&mut self, ctx: &mut FormContext<'_>) {
        self.base.expire_damage_ignore(ctx);

        if self.base.movement_enabled {
            self.base.calculate_velocity(ctx);
            self.base.kinematics.step(ctx.controller, ctx.world, ctx.clock.dt);
            self.base.update_direction(ctx);
        }

        update_state(self, ctx);
    }

    /// Become the active form after `prior` was active.
    pub(crate) fn take_over<P: PlayerForm>(&mut self, prior: &mut FormSlot<P>, ctx: &mut FormContext<'_>) {
        self.base.horizontal_movement_enabled = true;

        let prior_state = prior.base.machine.state();
        prior.on_transition(prior_state, PlayerState::None, ctx);
        prior.base.machine.park();

        self.base.horizontal_movement_enabled = prior.base.horizontal_movement_enabled;
        self.base.ignore_damage = prior.base.ignore_damage;
        self.base.damage_ignored_until = prior.base.damage_ignored_until;
        self.base.kinematics = prior.base.kinematics;

        self.base.machine.park();
        self.base.machine.request(PlayerState::PostTransformationDelay);
        self.base.update_direction(ctx);
        update_state(self, ctx);
    }
}

fn shared_environment(base: &FormBase, state: PlayerState, ctx: &FormContext<'_>) -> PlayerState {
    use PlayerState::*;

    let below = ctx.controller.collisions().below.any();
    let timer_running = base.machine.timer_running(ctx.clock.now);
    match state {
        Idle if !below => JumpingDown,
        Idle => Idle,
        Walking if !below => JumpingDown,
        Walking if base.kinematics.velocity.x.abs() > WALKING_EPSILON => Walking,
        Walking => Idle,
        JumpingDown if !below => JumpingDown,
        JumpingDown => Idle,
        SpecialJumpingDown if !below => SpecialJumpingDown,
        SpecialJumpingDown => SpecialActionReady,
        SpecialActionReady if timer_running => SpecialActionReady,
        SpecialActionReady => CancelableSpecialActionReady,
        CancelableSpecialActionReady if timer_running => CancelableSpecialActionReady,
        CancelableSpecialActionReady => Idle,
        PostTransformationDelay if timer_running => PostTransformationDelay,
        PostTransformationDelay if below => SpecialActionReady,
        PostTransformationDelay => SpecialJumpingDown,
        Hit if timer_running => Hit,
        Hit => Idle,
        GameOver => GameOver,
        other => undefined_state("player", other),
    }
}

fn shared_exit(base: &mut FormBase, from: PlayerState, to: PlayerState, ctx: &mut FormContext<'_>) {
    match from {
        PlayerState::SpecialActionReady => {
            base.horizontal_movement_enabled = true;
            if to != PlayerState::CancelableSpecialActionReady {
                ctx.signals.push(Signal::SpecialActionAvailable(false));
            }
        }
        PlayerState::CancelableSpecialActionReady => {
            ctx.signals.push(Signal::SpecialActionAvailable(false));
        }
        PlayerState::PostTransformationDelay => {
            base.movement_enabled = true;
            base.transformation_enabled = true;
        }
        PlayerState::Hit => base.horizontal_movement_enabled = true,
        _ => {}
    }
}

fn shared_enter(base: &mut FormBase, to: PlayerState, ctx: &mut FormContext<'_>) {
    let now = ctx.clock.now;
    let tuning = ctx.tuning;
    match to {
        PlayerState::SpecialActionReady => {
            base.machine.start_timer(
                now,
                tuning.total_special_action_available_time - tuning.cancelable_special_action_available_time,
            );
            base.horizontal_movement_enabled = false;
        }
        PlayerState::CancelableSpecialActionReady => {
            base.machine
                .start_timer(now, tuning.total_special_action_available_time);
        }
        PlayerState::PostTransformationDelay => {
            base.machine.start_timer(now, tuning.transformation_delay_time);
            base.transformation_enabled = false;
            base.movement_enabled = false;
        }
        PlayerState::Hit => {
            base.damage_ignored_until = Some(now + tuning.damage_ignore_duration_after_hit);
            ctx.signals.push(Signal::DamageBlink(true));
            base.horizontal_movement_enabled = false;
            base.transformation_enabled = false;
            base.machine.start_timer(now, tuning.knockback_time);
        }
        PlayerState::GameOver => {
            base.ignore_damage = true;
            base.horizontal_movement_enabled = false;
            base.transformation_enabled = false;
        }
        _ => {}
    }
}

impl<'a, F: PlayerForm> StateRules<FormContext<'a>> for FormSlot<F> {
    type State = PlayerState;

    fn machine(&self) -> &StateMachine<PlayerState> {
        &self.base.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<PlayerState> {
        &mut self.base.machine
    }

    fn next_state_from_input(&self, state: PlayerState, ctx: &FormContext<'a>) -> PlayerState {
        match state {
            PlayerState::Idle | PlayerState::CancelableSpecialActionReady if ctx.horizontal_input != 0.0 => {
                PlayerState::Walking
            }
            _ => PlayerState::None,
        }
    }

    fn next_state_from_environment(&self, state: PlayerState, ctx: &FormContext<'a>) -> PlayerState {
        self.form
            .next_state_from_environment(&self.base, state, ctx)
            .unwrap_or_else(|| shared_environment(&self.base, state, ctx))
    }

    fn on_transition(&mut self, from: PlayerState, to: PlayerState, ctx: &mut FormContext<'a>) {
        self.form.exit_state(&mut self.base, from, to, ctx);
        shared_exit(&mut self.base, from, to, ctx);
        shared_enter(&mut self.base, to, ctx);
        self.form.enter_state(&mut self.base, from, to, ctx);
    }

    fn update_animation_state(&mut self, state: PlayerState, ctx: &mut FormContext<'a>) {
        let Some(clip) = F::animation_clip(state) else {
            log::error!("forbidden state for {}: {state:?}", F::NAME);
            panic!("forbidden state for {}: {state:?}", F::NAME);
        };
        ctx.signals.push(Signal::Animation {
            body: ctx.controller.body(),
            clip,
        });
    }
}
