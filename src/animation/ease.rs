use std::f64::consts::PI;

/// Easing functions used to map normalized animation progress.
///
/// Every variant satisfies `apply(0) == 0` and `apply(1) == 1`. The overshooting variants
/// (`OutBack`, `OutElastic`, `OutBounce`) leave `[0, 1]` or move backwards in between; see
/// [`Ease::is_monotonic`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Ease-out that overshoots the target once before settling.
    OutBack,
    /// Damped spring ease-out.
    OutElastic,
    /// Ease-out that bounces against the target.
    OutBounce,
}

impl Ease {
    /// Apply this easing function to normalized progress `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutBack => {
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let c4 = (2.0 * PI) / 3.0;
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Self::OutBounce => out_bounce(t),
        }
    }

    /// `true` when `apply` never decreases and stays within `[0, 1]`.
    pub fn is_monotonic(self) -> bool {
        !matches!(self, Self::OutBack | Self::OutElastic | Self::OutBounce)
    }

    /// All variants, in declaration order.
    pub fn all() -> [Ease; 10] {
        [
            Self::Linear,
            Self::InQuad,
            Self::OutQuad,
            Self::InOutQuad,
            Self::InCubic,
            Self::OutCubic,
            Self::InOutCubic,
            Self::OutBack,
            Self::OutElastic,
            Self::OutBounce,
        ]
    }
}

fn out_bounce(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
