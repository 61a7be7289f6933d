//! Mapping from a confidence score and label to what the gauge shows.

use crate::config::Theme;

/// Half-dial sweep of the confidence gauge.
pub const GAUGE_SWEEP_DEGREES: f64 = 180.0;

/// Colour tier of the gauge. Backend labels outside the known set land in `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("high") {
            ConfidenceTier::High
        } else if label.eq_ignore_ascii_case("moderate") {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }

    /// Same thresholds the backend uses to produce its label.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            ConfidenceTier::High
        } else if score >= 60.0 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Moderate => "moderate",
            ConfidenceTier::Low => "low",
        }
    }

    /// Hex colour for the tier, tuned per theme background.
    pub fn color(&self, theme: Theme) -> &'static str {
        match (self, theme) {
            (ConfidenceTier::High, Theme::Light) => "#2E7D32",
            (ConfidenceTier::High, Theme::Dark) => "#66BB6A",
            (ConfidenceTier::Moderate, Theme::Light) => "#EF6C00",
            (ConfidenceTier::Moderate, Theme::Dark) => "#FFA726",
            (ConfidenceTier::Low, Theme::Light) => "#C62828",
            (ConfidenceTier::Low, Theme::Dark) => "#EF5350",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Needle position of the gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    /// Fill fraction in `[0, 1]`.
    pub fraction: f64,
    pub angle_degrees: f64,
}

impl Gauge {
    /// Scores are percentages; anything outside `[0, 100]` (or NaN) is clamped here.
    pub fn from_score(score: f64) -> Self {
        let fraction = if score.is_nan() {
            0.0
        } else {
            (score / 100.0).clamp(0.0, 1.0)
        };

        Self {
            fraction,
            angle_degrees: fraction * GAUGE_SWEEP_DEGREES,
        }
    }

    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_case_insensitively() {
        assert_eq!(ConfidenceTier::from_label("High"), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_label(" HIGH "), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_label("moderate"), ConfidenceTier::Moderate);
    }

    #[test]
    fn unknown_labels_default_to_low() {
        for label in ["Low", "", "uncertain", "very high", "Hi"] {
            assert_eq!(ConfidenceTier::from_label(label), ConfidenceTier::Low, "{label}");
        }
    }

    #[test]
    fn score_thresholds_match_backend() {
        assert_eq!(ConfidenceTier::from_score(85.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(84.9), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_score(60.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_score(59.9), ConfidenceTier::Low);
    }

    #[test]
    fn gauge_fraction_from_score() {
        let gauge = Gauge::from_score(82.0);
        assert!((gauge.fraction - 0.82).abs() < 1e-9);
        assert!((gauge.angle_degrees - 147.6).abs() < 1e-9);
        assert_eq!(gauge.percent(), 82);
    }

    #[test]
    fn gauge_clamps_out_of_range_scores() {
        assert_eq!(Gauge::from_score(140.0).fraction, 1.0);
        assert_eq!(Gauge::from_score(-3.0).fraction, 0.0);
        assert_eq!(Gauge::from_score(f64::NAN).fraction, 0.0);
        assert_eq!(Gauge::from_score(140.0).angle_degrees, GAUGE_SWEEP_DEGREES);
    }

    #[test]
    fn colors_differ_per_theme() {
        let high = ConfidenceTier::High;
        assert_ne!(high.color(Theme::Light), high.color(Theme::Dark));
        assert_ne!(high.color(Theme::Dark), ConfidenceTier::Low.color(Theme::Dark));
    }
}
