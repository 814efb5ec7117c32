use crate::animation::ease::Ease;
use crate::foundation::core::Vec2;
use crate::foundation::error::{PromoError, PromoResult};

/// How a layer enters the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntranceMode {
    /// Opacity follows eased progress.
    #[default]
    FadeIn,
    /// Position starts `(dx, dy)` away from the target and eases onto it.
    SlideIn {
        /// Horizontal start offset.
        #[serde(default)]
        dx: f64,
        /// Vertical start offset.
        #[serde(default)]
        dy: f64,
    },
    /// Scale eases from 0 to 1 about the layer center.
    ScaleIn,
    /// Characters appear one by one (text layers).
    Reveal,
    /// Scale oscillates as `1 + amplitude * sin(t * angular_speed)` once started.
    Pulsate {
        /// Relative scale amplitude.
        amplitude: f64,
        /// Angular speed in radians per second.
        angular_speed: f64,
    },
}

/// Disappearance schedule, symmetric to the entrance.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExitSchedule {
    /// Seconds at which the exit begins.
    pub start: f64,
    /// Exit length in seconds; `0` is a hard cut.
    #[serde(default)]
    pub duration: f64,
    /// Easing applied to exit progress.
    #[serde(default)]
    pub ease: Ease,
}

/// Maps elapsed time to a layer's visibility and transform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSchedule {
    /// Seconds at which the layer starts to appear.
    #[serde(default)]
    pub start: f64,
    /// Entrance length in seconds; `0` is an instantaneous cut.
    #[serde(default)]
    pub duration: f64,
    /// Easing applied to entrance progress.
    #[serde(default)]
    pub ease: Ease,
    /// Entrance style.
    #[serde(default)]
    pub mode: EntranceMode,
    /// Optional disappearance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<ExitSchedule>,
}

/// Sinusoidal motion `amplitude * sin(t * angular_speed)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Oscillation {
    /// Peak displacement (pixels for offsets, a ratio for scales).
    pub amplitude: f64,
    /// Angular speed in radians per second.
    pub angular_speed: f64,
}

impl Oscillation {
    /// Displacement at time `t`.
    pub fn value_at(self, t: f64) -> f64 {
        self.amplitude * (t * self.angular_speed).sin()
    }

    pub(crate) fn validate(self, what: &str) -> PromoResult<()> {
        if !self.amplitude.is_finite() || !self.angular_speed.is_finite() {
            return Err(PromoError::validation(format!(
                "{what} oscillation must have finite amplitude and angular_speed"
            )));
        }
        Ok(())
    }
}

/// Per-layer lifecycle derived from `t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerPhase {
    /// `t < start`: nothing is drawn.
    Pending,
    /// Entrance in progress; carries the linear fraction in `[0, 1)`.
    Entering(f64),
    /// Fully shown.
    Settled,
    /// Exit in progress; carries the linear fraction in `[0, 1)`.
    Exiting(f64),
    /// Exit finished: nothing is drawn.
    Gone,
}

impl LayerPhase {
    /// `true` when the layer may contribute pixels.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Pending | Self::Gone)
    }
}

/// Resolved animation state for one layer at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f64,
    /// Translation applied on top of the layer's target position.
    pub offset: Vec2,
    /// Uniform scale about the layer center.
    pub scale: f64,
    /// Fraction of characters revealed, `None` when the mode is not `Reveal`.
    pub reveal: Option<f64>,
}

impl VisualState {
    /// The settled state: fully opaque, untransformed, fully revealed.
    pub const SETTLED: Self = Self {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
        reveal: None,
    };
}

impl AnimationSchedule {
    /// Seconds at which the entrance completes.
    pub fn entrance_end(&self) -> f64 {
        self.start + self.duration
    }

    /// Reject schedules that cannot render consistently within `total_duration` seconds.
    pub fn validate(&self, total_duration: f64) -> PromoResult<()> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(PromoError::invalid_schedule(format!(
                "start must be finite and >= 0 (got {})",
                self.start
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(PromoError::invalid_schedule(format!(
                "duration must be finite and >= 0 (got {})",
                self.duration
            )));
        }
        if self.start > total_duration {
            return Err(PromoError::invalid_schedule(format!(
                "start {}s is beyond the render duration {}s",
                self.start, total_duration
            )));
        }
        match self.mode {
            EntranceMode::Reveal if !self.ease.is_monotonic() => {
                return Err(PromoError::invalid_schedule(format!(
                    "reveal requires a monotonic ease, {:?} overshoots",
                    self.ease
                )));
            }
            EntranceMode::SlideIn { dx, dy } if !dx.is_finite() || !dy.is_finite() => {
                return Err(PromoError::invalid_schedule("slide offsets must be finite"));
            }
            EntranceMode::Pulsate {
                amplitude,
                angular_speed,
            } if !amplitude.is_finite() || !angular_speed.is_finite() => {
                return Err(PromoError::invalid_schedule(
                    "pulsate amplitude/angular_speed must be finite",
                ));
            }
            _ => {}
        }

        if let Some(exit) = &self.exit {
            if !exit.start.is_finite() || !exit.duration.is_finite() || exit.duration < 0.0 {
                return Err(PromoError::invalid_schedule(
                    "exit start/duration must be finite and duration >= 0",
                ));
            }
            if exit.start < self.entrance_end() {
                return Err(PromoError::invalid_schedule(format!(
                    "exit starts at {}s before the entrance ends at {}s",
                    exit.start,
                    self.entrance_end()
                )));
            }
            if exit.start > total_duration {
                return Err(PromoError::invalid_schedule(format!(
                    "exit start {}s is beyond the render duration {}s",
                    exit.start, total_duration
                )));
            }
        }
        Ok(())
    }

    /// Lifecycle phase at `t`.
    pub fn phase(&self, t: f64) -> LayerPhase {
        if t < self.start {
            return LayerPhase::Pending;
        }
        if let Some(exit) = &self.exit
            && t >= exit.start
        {
            if t >= exit.start + exit.duration {
                return LayerPhase::Gone;
            }
            return LayerPhase::Exiting((t - exit.start) / exit.duration);
        }
        if t >= self.entrance_end() {
            return LayerPhase::Settled;
        }
        LayerPhase::Entering((t - self.start) / self.duration)
    }

    /// Eased visual progress at `t`: rises `0 -> 1` on entry and falls `1 -> 0` on exit.
    ///
    /// `None` when the layer contributes nothing.
    pub fn progress(&self, t: f64) -> Option<f64> {
        match self.phase(t) {
            LayerPhase::Pending | LayerPhase::Gone => None,
            LayerPhase::Entering(frac) => Some(self.ease.apply(frac)),
            LayerPhase::Settled => Some(1.0),
            LayerPhase::Exiting(frac) => {
                let ease = self.exit.map(|e| e.ease).unwrap_or_default();
                Some(1.0 - ease.apply(frac))
            }
        }
    }

    /// Visual state at `t`, `None` when nothing is drawn.
    pub fn visual_state(&self, t: f64) -> Option<VisualState> {
        let p = self.progress(t)?;
        let mut state = VisualState::SETTLED;
        match self.mode {
            EntranceMode::FadeIn => state.opacity = p.clamp(0.0, 1.0),
            EntranceMode::SlideIn { dx, dy } => state.offset = Vec2::new(dx, dy) * (1.0 - p),
            EntranceMode::ScaleIn => state.scale = p.max(0.0),
            EntranceMode::Reveal => state.reveal = Some(p.clamp(0.0, 1.0)),
            EntranceMode::Pulsate {
                amplitude,
                angular_speed,
            } => {
                state.scale = 1.0 + amplitude * (t * angular_speed).sin();
            }
        }
        Some(state)
    }
}

/// Visual state for an optional schedule; layers without one are always settled.
pub fn visual_state_at(schedule: Option<&AnimationSchedule>, t: f64) -> Option<VisualState> {
    match schedule {
        Some(s) => s.visual_state(t),
        None => Some(VisualState::SETTLED),
    }
}

/// Phase for an optional schedule.
pub fn phase_at(schedule: Option<&AnimationSchedule>, t: f64) -> LayerPhase {
    schedule.map_or(LayerPhase::Settled, |s| s.phase(t))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/schedule.rs"]
mod tests;
