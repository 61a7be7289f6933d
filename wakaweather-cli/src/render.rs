//! Plain-text rendering of view-model state.

use chrono::Local;
use crossterm::{
    style::{Color, Stylize},
    tty::IsTty,
};
use wakaweather_core::{
    ChatMessage, ConfidencePayload, ConfidenceTier, Gauge, MessageStatus, RangePair, Theme,
};

const GAUGE_WIDTH: usize = 20;

pub fn gauge_bar(gauge: Gauge, width: usize) -> String {
    let filled = ((gauge.fraction * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        gauge.percent()
    )
}

/// How tier colours are drawn, decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub theme: Theme,
    pub color: bool,
}

impl Palette {
    /// Colour only when stdout is a terminal, so redirected output stays plain.
    pub fn for_stdout(theme: Theme) -> Self {
        Self {
            theme,
            color: std::io::stdout().is_tty(),
        }
    }

    pub fn paint(&self, tier: ConfidenceTier, text: &str) -> String {
        match rgb(tier.color(self.theme)) {
            Some(color) if self.color => text.with(color).to_string(),
            _ => text.to_string(),
        }
    }
}

/// Parses a `#RRGGBB` string.
fn rgb(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some(Color::Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

fn range(range: RangePair, unit: &str) -> String {
    let range = range.ordered();
    format!("{:.1}–{:.1} {unit}", range.min, range.max)
}

pub fn dashboard(payload: &ConfidencePayload, palette: Palette) -> String {
    let tier = payload.tier();
    let gauge = payload.gauge();
    let mut lines = vec![format!("{}, {}", payload.city, payload.country)];

    let mut headline = format!(
        "Confidence {} {} ({})",
        palette.paint(tier, &gauge_bar(gauge, GAUGE_WIDTH)),
        payload.label,
        tier
    );
    let score_tier = payload.score_tier();
    if score_tier != tier {
        headline.push_str(&format!(", score reads {score_tier}"));
    }
    lines.push(headline);

    if let Some(banner) = payload.severe_banner() {
        lines.push(format!("SEVERE WEATHER: {banner}"));
    }

    lines.push(format!("Temperature: {}", range(payload.temperature_range, "°C")));
    lines.push(format!("Rain:        {}", range(payload.rain_range, "mm")));
    lines.push(format!("Wind max:    {:.1} m/s", payload.wind_max));
    if !payload.conditions.is_empty() {
        lines.push(format!("Conditions:  {}", payload.conditions.join(", ")));
    }
    lines.push(format!("Recommendation: {}", payload.recommendation));
    if let Some(url) = payload.satellite_url() {
        lines.push(format!("Satellite view: {url}"));
    }

    if !payload.sources.is_empty() {
        lines.push("Sources:".to_string());
        lines.extend(payload.sources.iter().map(|source| {
            format!(
                "  - {}: {:.1}°C, {:.1} mm, {:.1} m/s, {}",
                source.name, source.temp, source.rain, source.wind, source.condition
            )
        }));
    }

    lines.push(format!("Generated at {}", payload.generated_at));
    lines.join("\n")
}

pub fn error_panel(message: &str) -> String {
    format!("Could not load the forecast.\n  {message}")
}

pub fn error_banner(message: &str) -> String {
    format!("! {message} (type /retry to send again)")
}

fn chat_line(message: &ChatMessage, user_number: Option<usize>) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let who = match user_number {
        Some(n) => format!("You #{n}"),
        None => "Assistant".to_string(),
    };
    let marker = match message.status {
        MessageStatus::Pending => " …",
        MessageStatus::Delivered => "",
        MessageStatus::Failed => " ✗",
    };
    format!("[{time}] {who}{marker}: {}", message.text)
}

/// Lines for `messages[from..]`, numbering user messages across the whole log.
pub fn transcript(messages: &[ChatMessage], from: usize) -> Vec<String> {
    let mut user_count = 0;
    let mut lines = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        let number = message.is_user.then(|| {
            user_count += 1;
            user_count
        });
        if idx >= from {
            lines.push(chat_line(message, number));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ConfidencePayload {
        serde_json::from_value(serde_json::json!({
            "city": "Suva",
            "country": "Fiji",
            "confidence": 82.0,
            "label": "High",
            "temp_range": { "min": 26.0, "max": 20.0 },
            "rain_range": { "min": 0.0, "max": 3.5 },
            "conditions": [],
            "wind_max": 12.4,
            "severe": true,
            "alert": "Strong winds expected (12.4 m/s)",
            "recommendation": "Relax at a resort with covered lounges",
            "satellite_url": "https://zoom.earth/#view=-18.1248,178.4501,7z/date=now",
            "sources": [
                { "name": "WeatherAPI", "temp": 24.0, "rain": 3.5, "wind": 12.4, "condition": "Patchy rain" }
            ],
            "generated_at": "2025-11-02T03:14:07"
        }))
        .unwrap()
    }

    #[test]
    fn gauge_bar_fills_proportionally() {
        assert_eq!(gauge_bar(Gauge::from_score(50.0), 10), "[#####-----]  50%");
        assert_eq!(gauge_bar(Gauge::from_score(250.0), 4), "[####] 100%");
        assert_eq!(gauge_bar(Gauge::from_score(0.0), 4), "[----]   0%");
    }

    const PLAIN: Palette = Palette {
        theme: Theme::Light,
        color: false,
    };

    #[test]
    fn hex_colours_parse_into_rgb() {
        assert_eq!(rgb("#FF8000"), Some(Color::Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(rgb("FF8000"), None);
        assert_eq!(rgb("#nope00"), None);
        assert_eq!(rgb("#FFF"), None);
    }

    #[test]
    fn plain_palette_leaves_text_alone() {
        assert_eq!(PLAIN.paint(ConfidenceTier::High, "[##]"), "[##]");
    }

    #[test]
    fn colour_palette_styles_with_tier_colour() {
        let palette = Palette {
            theme: Theme::Dark,
            color: true,
        };
        let expected = "[##]"
            .with(Color::Rgb {
                r: 0x66,
                g: 0xBB,
                b: 0x6A,
            })
            .to_string();

        assert_eq!(palette.paint(ConfidenceTier::High, "[##]"), expected);
    }

    #[test]
    fn dashboard_shows_banner_and_sources() {
        let text = dashboard(&payload(), PLAIN);

        assert!(text.starts_with("Suva, Fiji"));
        assert!(text.contains("82%"));
        assert!(text.contains("(high)"));
        assert!(text.contains("SEVERE WEATHER: Strong winds expected (12.4 m/s)"));
        assert!(text.contains("Temperature: 20.0–26.0 °C"));
        assert!(text.contains("  - WeatherAPI: 24.0°C"));
        assert!(!text.contains("Conditions:"));
        assert!(text.ends_with("Generated at 2025-11-02T03:14:07"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn dashboard_flags_label_that_disagrees_with_score() {
        let text = dashboard(&payload(), PLAIN);
        assert!(text.contains("High (high), score reads moderate"));

        let mut agreeing = payload();
        agreeing.confidence = 91.0;
        assert!(!dashboard(&agreeing, PLAIN).contains("score reads"));
    }

    #[test]
    fn dashboard_hides_banner_when_not_severe() {
        let mut payload = payload();
        payload.severe = false;

        assert!(!dashboard(&payload, PLAIN).contains("SEVERE"));
    }

    #[test]
    fn transcript_numbers_user_messages() {
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
            ChatMessage::failure("Could not reach server. Tap Retry."),
        ];

        let lines = transcript(&messages, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("You #2 …: second"));
        assert!(lines[1].ends_with("Assistant ✗: Could not reach server. Tap Retry."));
    }
}
