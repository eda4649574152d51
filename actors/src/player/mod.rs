//! The player: one body, two forms.
//!
//! Julia (small form) and Juliett (large form) share the controller, health
//! and input. Exactly one form is active; the other is parked in
//! [`PlayerState::None`] until the next transformation.

mod form;
mod julia;
mod juliett;

use motion::{Aabb, BodyId, CollisionWorld, Controller, ControllerSettings, FrameTime, Layer, Vec2, collidable_mask};

pub use form::{FormBase, FormContext, FormSlot, PlayerForm, PlayerState};
pub use julia::Julia;
pub use juliett::Juliett;

use crate::{
    combat::{AttackSource, Hit},
    signal::Signal,
    tuning::{PlayerTuning, TuningError},
};

#[derive(Clone, Debug)]
pub struct Player {
    controller: Controller,
    tuning: PlayerTuning,
    health: i32,
    horizontal_input: f32,
    small_form: bool,
    julia: FormSlot<Julia>,
    juliett: FormSlot<Juliett>,
}

impl Player {
    /// Spawn in the small form, facing right.
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        tuning: PlayerTuning,
        settings: ControllerSettings,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let controller = Controller::new(
            world,
            Layer::Player,
            position,
            tuning.julia_bounds,
            collidable_mask(),
            settings,
        )?;

        let julia = FormSlot::new(
            FormBase::new(&tuning, tuning.julia_move_speed, PlayerState::Idle),
            Julia::new(&tuning),
        );
        let juliett = FormSlot::new(
            FormBase::new(&tuning, tuning.juliett_move_speed, PlayerState::None),
            Juliett::new(&tuning),
        );

        Ok(Self {
            controller,
            health: tuning.max_health,
            tuning,
            horizontal_input: 0.0,
            small_form: true,
            julia,
            juliett,
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub(crate) fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn body(&self) -> BodyId {
        self.controller.body()
    }

    pub fn position(&self) -> Vec2 {
        self.controller.position()
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_small_form(&self) -> bool {
        self.small_form
    }

    pub fn julia(&self) -> &FormSlot<Julia> {
        &self.julia
    }

    pub fn juliett(&self) -> &FormSlot<Juliett> {
        &self.juliett
    }

    pub fn active_base(&self) -> &FormBase {
        if self.small_form {
            &self.julia.base
        } else {
            &self.juliett.base
        }
    }

    fn active_base_mut(&mut self) -> &mut FormBase {
        if self.small_form {
            &mut self.julia.base
        } else {
            &mut self.juliett.base
        }
    }

    pub fn state(&self) -> PlayerState {
        self.active_base().state()
    }

    /// World-space velocity of the active form.
    pub fn velocity(&self) -> Vec2 {
        self.controller.to_local(self.active_base().kinematics.velocity)
    }

    pub fn accepts_damage(&self) -> bool {
        self.active_base().accepts_damage()
    }

    /// Joystick value in `[-1, 1]`, negative to the left.
    pub fn set_horizontal_input(&mut self, input: f32) {
        self.horizontal_input = input.clamp(-1.0, 1.0);
    }

    pub fn tick(&mut self, world: &mut CollisionWorld, clock: FrameTime, signals: &mut Vec<Signal>) {
        let mut ctx = FormContext {
            world,
            controller: &mut self.controller,
            tuning: &self.tuning,
            horizontal_input: self.horizontal_input,
            clock,
            signals,
        };
        if self.small_form {
            self.julia.tick(&mut ctx);
        } else {
            self.juliett.tick(&mut ctx);
        }
    }

    pub fn on_action_button_clicked(&mut self) {
        let request = if self.small_form {
            let state = self.julia.base.state();
            self.julia.form.on_action_button(state)
        } else {
            let state = self.juliett.base.state();
            self.juliett.form.on_action_button(state)
        };
        self.active_base_mut().machine.request(request);
    }

    /// Swap forms if both allow it. Returns whether the swap happened.
    pub fn on_transformation_button_clicked(
        &mut self,
        world: &mut CollisionWorld,
        clock: FrameTime,
        signals: &mut Vec<Signal>,
    ) -> bool {
        let allowed = self
            .julia
            .can_transform(world, &self.controller, &self.tuning)
            && self
                .juliett
                .can_transform(world, &self.controller, &self.tuning);
        if !allowed {
            log::debug!("transformation refused in {:?}", self.state());
            return false;
        }

        self.small_form = !self.small_form;
        let bounds = if self.small_form {
            self.tuning.julia_bounds
        } else {
            self.tuning.juliett_bounds
        };
        if let Err(err) = self.controller.resize(world, bounds) {
            log::warn!("form bounds rejected on transformation: {err}");
        }

        let mut ctx = FormContext {
            world,
            controller: &mut self.controller,
            tuning: &self.tuning,
            horizontal_input: self.horizontal_input,
            clock,
            signals: &mut *signals,
        };
        if self.small_form {
            self.julia.take_over(&mut self.juliett, &mut ctx);
        } else {
            self.juliett.take_over(&mut self.julia, &mut ctx);
        }

        signals.push(Signal::PlayerTransformed {
            small_form: self.small_form,
        });
        signals.push(Signal::SpecialActionAvailable(true));
        true
    }

    /// Take a hit. Returns false when damage is currently ignored.
    ///
    /// The resulting state change is resolved on the next [`Player::tick`].
    pub fn on_damaged(&mut self, world: &mut CollisionWorld, hit: &Hit, signals: &mut Vec<Signal>) -> bool {
        if !self.accepts_damage() {
            return false;
        }

        self.health -= hit.damage;
        if self.health <= 0 {
            self.die(signals);
            return true;
        }
        signals.push(Signal::HealthChanged(self.health));

        let attacker_on_right = hit.attacker_on_right_of(self.position().x);
        let knockback = hit.knockback.unwrap_or(self.tuning.knockback);
        let base = if self.small_form {
            &mut self.julia.base
        } else {
            &mut self.juliett.base
        };
        if base.horizontal_movement_enabled {
            base.kinematics
                .face(&mut self.controller, world, attacker_on_right);
        }
        base.kinematics.knock_back(knockback);
        base.machine.request(PlayerState::Hit);
        true
    }

    fn die(&mut self, signals: &mut Vec<Signal>) {
        self.health = 0;
        signals.push(Signal::HealthChanged(0));
        signals.push(Signal::PlayerDead);
        self.active_base_mut()
            .machine
            .request(PlayerState::GameOver);
    }

    /// Area of the active attack volume, if any.
    pub fn attack_area(&self) -> Option<Aabb> {
        let position = self.controller.position();
        let facing = self.controller.facing();
        let volume = if self.small_form {
            self.julia.form.active_volume()
        } else {
            self.juliett.form.active_volume()
        };
        volume.and_then(|v| v.area(position, facing))
    }

    /// Record a strike on `target`; false if the active volume already struck it.
    pub fn try_strike(&mut self, target: BodyId) -> bool {
        let volume = if self.small_form {
            self.julia.form.active_volume_mut()
        } else {
            self.juliett.form.active_volume_mut()
        };
        volume.is_some_and(|v| v.try_strike(target))
    }

    /// Build the hit the active form deals to a touched target.
    pub fn on_attack(&mut self) -> Option<Hit> {
        let attacker_x = self.controller.position().x;
        let (source, dealt) = if self.small_form {
            (
                AttackSource::Julia,
                self.julia.form.on_attack(&mut self.julia.base, &self.tuning),
            )
        } else {
            (
                AttackSource::Juliett,
                self.juliett
                    .form
                    .on_attack(&mut self.juliett.base, &self.tuning),
            )
        };
        dealt.map(|(damage, knockback)| Hit {
            source,
            attacker_x,
            damage,
            knockback: Some(knockback),
        })
    }
}
