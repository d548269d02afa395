//! Color palette and preset styles for the assessment screens.
//!
//! Uses a crimson palette on the terminal's own background.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{RiskTier, SvmSign};

/// Probability at or above which the gauge is drawn as danger.
pub const DISPLAY_DANGER_BAND: f64 = 0.6;

/// Probability at or above which the gauge is drawn as warning.
pub const DISPLAY_WARNING_BAND: f64 = 0.3;

/// Cardiology palette with crimson accents.
pub struct CardioTheme;

impl CardioTheme {
    /// Crimson, the accent color
    pub const PRIMARY: Color = Color::Rgb(190, 18, 60); // #BE123C

    pub const PRIMARY_LIGHT: Color = Color::Rgb(251, 113, 133); // #FB7185

    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24

    pub const DANGER: Color = Color::Rgb(239, 68, 68); // #EF4444

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Recommendation color for a tier.
    #[must_use]
    pub fn risk_tier(tier: RiskTier) -> Style {
        match tier {
            RiskTier::Low => Self::success(),
            RiskTier::Moderate => Self::warning(),
            RiskTier::High => Self::danger(),
        }
    }

    /// Gauge color for a logistic probability.
    ///
    /// Display bands only; they are independent of the tier thresholds.
    #[must_use]
    pub fn probability(prob: f64) -> Style {
        if prob >= DISPLAY_DANGER_BAND {
            Self::danger()
        } else if prob >= DISPLAY_WARNING_BAND {
            Self::warning()
        } else {
            Self::success()
        }
    }

    #[must_use]
    pub fn svm_sign(sign: SvmSign) -> Style {
        match sign {
            SvmSign::Positive => Self::danger(),
            SvmSign::Zero | SvmSign::Negative => Self::success(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bands() {
        assert_eq!(CardioTheme::probability(0.29), CardioTheme::success());
        assert_eq!(CardioTheme::probability(0.3), CardioTheme::warning());
        assert_eq!(CardioTheme::probability(0.59), CardioTheme::warning());
        assert_eq!(CardioTheme::probability(0.6), CardioTheme::danger());
    }

    #[test]
    fn test_svm_sign_style() {
        assert_eq!(CardioTheme::svm_sign(SvmSign::Positive), CardioTheme::danger());
        assert_eq!(CardioTheme::svm_sign(SvmSign::Zero), CardioTheme::success());
    }
}
