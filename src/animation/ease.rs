/// Overshoot constant for [`Ease::OutBack`].
pub const BACK_OVERSHOOT: f64 = 1.70158;

/// Easing curves mapping normalized progress to eased progress.
///
/// Inputs are clamped to [0,1]. Outputs stay in [0,1] except for [`Ease::OutBack`], which
/// overshoots past 1.0 before settling exactly on 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    OutBack,
}

impl Ease {
    pub const ALL: [Ease; 8] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::OutBack,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = crate::foundation::math::clamp01(t);
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
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
        }
    }

    /// Whether the curve may leave [0,1] between the endpoints.
    pub fn overshoots(self) -> bool {
        matches!(self, Self::OutBack)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
