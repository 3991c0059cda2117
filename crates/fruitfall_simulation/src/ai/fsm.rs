//! BehaviorStateMachine: Patrol / Roam / Chase / Search / Reroute / Idle.
//!
//! Чистая логика без ECS и без мира: на вход `Observation` (что увидела
//! Perception, stuck flag от Steering), на выход `Decision` (состояние +
//! намерение движения). Ровно одно состояние активно, переходы только через
//! `enter`.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;
use std::fmt;

use super::perception::Sighting;
use crate::components::direction_from_yaw;
use crate::config::{AgentTemplate, MoveSpeeds, WanderMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BehaviorState {
    /// Возврат к anchor
    Patrol,
    /// Случайное блуждание
    Roam,
    Chase,
    /// Идём к последней известной позиции цели
    Search,
    /// Recovery после stuck во время Chase
    Reroute,
    /// Стоим на месте
    Idle,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 6] = [
        BehaviorState::Patrol,
        BehaviorState::Roam,
        BehaviorState::Chase,
        BehaviorState::Search,
        BehaviorState::Reroute,
        BehaviorState::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorState::Patrol => "Patrol",
            BehaviorState::Roam => "Roam",
            BehaviorState::Chase => "Chase",
            BehaviorState::Search => "Search",
            BehaviorState::Reroute => "Reroute",
            BehaviorState::Idle => "Idle",
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Параметры FSM (выжимка из AgentTemplate)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorParams {
    pub chase_range: f32,
    pub chase_exit_range: f32,
    pub stop_distance: f32,
    pub arrive_distance: f32,
    pub require_line_of_sight: bool,
    pub wander: WanderMode,
    pub roam_time: f32,
    pub idle_time: f32,
    pub search_timeout: f32,
    pub reroute_timeout: f32,
    pub max_failed_path_attempts: u32,
    pub speeds: MoveSpeeds,
}

impl From<&AgentTemplate> for BehaviorParams {
    fn from(template: &AgentTemplate) -> Self {
        Self {
            chase_range: template.chase_range,
            chase_exit_range: template.chase_exit_range(),
            stop_distance: template.stop_distance,
            arrive_distance: template.arrive_distance,
            require_line_of_sight: template.require_line_of_sight_for_aggro,
            wander: template.wander,
            roam_time: template.roam_time,
            idle_time: template.idle_time,
            search_timeout: template.search_timeout,
            reroute_timeout: template.reroute_timeout,
            max_failed_path_attempts: template.max_failed_path_attempts,
            speeds: template.speeds,
        }
    }
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self::from(&AgentTemplate::default())
    }
}

/// Вход FSM за один тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub position: Vec3,
    /// `None` → цели нет (не видна, бесконечно далеко)
    pub sighting: Option<Sighting>,
    pub is_stuck: bool,
    pub delta: f32,
}

/// Куда FSM хочет двигаться (Steering превращает это в направление)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveIntent {
    /// Стоять; опционально повернуться к точке
    Hold { face: Option<Vec3> },
    MoveTo(Vec3),
    Heading(Vec3),
    /// Обходной heading к точке (считает Steering по clearance)
    Reroute { toward: Option<Vec3> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BehaviorState,
    pub to: BehaviorState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: BehaviorState,
    pub intent: MoveIntent,
    pub speed: f32,
    /// В Chase и в пределах stop_distance
    pub attack_ready: bool,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone)]
pub struct BehaviorStateMachine {
    params: BehaviorParams,
    state: BehaviorState,
    anchor: Vec3,
    last_known_target: Option<Vec3>,
    roam_direction: Vec3,
    roam_timer: f32,
    /// Время в текущем состоянии (для Idle/Search/Reroute таймаутов)
    state_time: f32,
    failed_path_attempts: u32,
}

impl BehaviorStateMachine {
    pub fn new(params: BehaviorParams, anchor: Vec3) -> Self {
        let state = wander_state(params.wander);
        Self {
            params,
            state,
            anchor,
            last_known_target: None,
            roam_direction: Vec3::ZERO,
            roam_timer: 0.0,
            state_time: 0.0,
            failed_path_attempts: 0,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn params(&self) -> &BehaviorParams {
        &self.params
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn last_known_target_position(&self) -> Option<Vec3> {
        self.last_known_target
    }

    pub fn failed_path_attempts(&self) -> u32 {
        self.failed_path_attempts
    }

    pub fn roam_direction(&self) -> Vec3 {
        self.roam_direction
    }

    pub fn time_in_state(&self) -> f32 {
        self.state_time
    }

    /// Один тик: переход (не больше одного) + намерение движения для нового состояния
    pub fn evaluate(&mut self, obs: &Observation, rng: &mut impl Rng) -> Decision {
        self.state_time += obs.delta;

        let transition = self
            .next_state(obs)
            .filter(|&next| next != self.state)
            .map(|next| self.enter(next, obs.sighting.map(|s| s.target)));

        if self.state == BehaviorState::Chase {
            if let Some(sighting) = obs.sighting {
                if sighting.line_of_sight {
                    self.failed_path_attempts = 0;
                }
                if sighting.line_of_sight || !self.params.require_line_of_sight {
                    self.last_known_target = Some(sighting.target);
                }
            }
        }

        let (intent, speed, attack_ready) = self.movement(obs, rng);
        Decision {
            state: self.state,
            intent,
            speed,
            attack_ready,
            transition,
        }
    }

    /// Aggro-on-hit: урон всегда переводит в Chase
    pub fn force_chase(&mut self, target: Option<Vec3>) -> Option<Transition> {
        if self.state == BehaviorState::Chase {
            if target.is_some() {
                self.last_known_target = target;
            }
            return None;
        }
        Some(self.enter(BehaviorState::Chase, target))
    }

    fn aggro(&self, sighting: Option<Sighting>) -> bool {
        sighting.is_some_and(|s| {
            s.distance <= self.params.chase_range
                && (s.line_of_sight || !self.params.require_line_of_sight)
        })
    }

    fn arrived(&self, position: Vec3, point: Vec3) -> bool {
        let offset = point - position;
        Vec2::new(offset.x, offset.z).length() <= self.params.arrive_distance
    }

    fn next_state(&mut self, obs: &Observation) -> Option<BehaviorState> {
        use BehaviorState::*;

        let distance = obs.sighting.map_or(f32::INFINITY, |s| s.distance);
        let line_of_sight = obs.sighting.is_some_and(|s| s.line_of_sight);

        match self.state {
            Roam | Patrol | Idle | Search if self.aggro(obs.sighting) => Some(Chase),

            Roam => None,

            Patrol => self.arrived(obs.position, self.anchor).then_some(Idle),

            Idle => {
                if self.state_time < self.params.idle_time {
                    return None;
                }
                match self.params.wander {
                    WanderMode::Roam => Some(Roam),
                    WanderMode::Patrol if !self.arrived(obs.position, self.anchor) => Some(Patrol),
                    WanderMode::Patrol => {
                        // Уже на anchor: продолжаем стоять
                        self.state_time = 0.0;
                        None
                    }
                }
            }

            Search => {
                let done = match self.last_known_target {
                    None => true,
                    Some(point) => {
                        self.arrived(obs.position, point)
                            || self.state_time >= self.params.search_timeout
                            || obs.is_stuck
                    }
                };
                done.then_some(wander_state(self.params.wander))
            }

            Chase => {
                if distance > self.params.chase_exit_range {
                    Some(Search)
                } else if self.params.require_line_of_sight && !line_of_sight {
                    Some(Search)
                } else if obs.is_stuck && distance > self.params.stop_distance {
                    // В stop_distance стоим намеренно, обходить нечего
                    Some(Reroute)
                } else {
                    None
                }
            }

            Reroute => {
                (!obs.is_stuck || self.state_time >= self.params.reroute_timeout).then_some(Chase)
            }
        }
    }

    fn enter(&mut self, next: BehaviorState, target: Option<Vec3>) -> Transition {
        let from = self.state;
        let mut to = next;

        if to == BehaviorState::Reroute {
            self.failed_path_attempts += 1;
            if self.failed_path_attempts > self.params.max_failed_path_attempts {
                // Слишком много попыток обхода — сдаёмся
                to = BehaviorState::Patrol;
                self.failed_path_attempts = 0;
            }
        }

        match to {
            BehaviorState::Chase => {
                if from != BehaviorState::Reroute {
                    self.failed_path_attempts = 0;
                }
                if target.is_some() {
                    self.last_known_target = target;
                }
            }
            BehaviorState::Roam => self.roam_timer = 0.0,
            _ => {}
        }

        self.state = to;
        self.state_time = 0.0;
        Transition { from, to }
    }

    fn movement(&mut self, obs: &Observation, rng: &mut impl Rng) -> (MoveIntent, f32, bool) {
        let speeds = self.params.speeds;

        match self.state {
            BehaviorState::Roam => {
                self.roam_timer -= obs.delta;
                if self.roam_timer <= 0.0 || self.roam_direction == Vec3::ZERO {
                    self.roam_direction = direction_from_yaw(rng.gen_range(0.0..TAU));
                    self.roam_timer = self.params.roam_time;
                }
                (MoveIntent::Heading(self.roam_direction), speeds.roam, false)
            }
            BehaviorState::Patrol => (MoveIntent::MoveTo(self.anchor), speeds.patrol, false),
            BehaviorState::Idle => (MoveIntent::Hold { face: None }, 0.0, false),
            BehaviorState::Search => match self.last_known_target {
                Some(point) => (MoveIntent::MoveTo(point), speeds.chase, false),
                None => (MoveIntent::Hold { face: None }, 0.0, false),
            },
            BehaviorState::Chase => match obs.sighting {
                Some(s) if s.distance <= self.params.stop_distance => {
                    (MoveIntent::Hold { face: Some(s.target) }, 0.0, true)
                }
                Some(s) => (MoveIntent::MoveTo(s.target), speeds.chase, false),
                None => (MoveIntent::Hold { face: None }, 0.0, false),
            },
            BehaviorState::Reroute => (
                MoveIntent::Reroute {
                    toward: self.last_known_target,
                },
                speeds.reroute_speed(),
                false,
            ),
        }
    }
}

fn wander_state(mode: WanderMode) -> BehaviorState {
    match mode {
        WanderMode::Roam => BehaviorState::Roam,
        WanderMode::Patrol => BehaviorState::Patrol,
    }
}
