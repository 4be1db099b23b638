// Presentation helpers shared by the engine's sinks and any downstream UI.

// Where a reading sits relative to the alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

impl RsiZone {
    pub fn classify(rsi: f64, upper: f64, lower: f64) -> Self {
        if rsi >= upper {
            RsiZone::Overbought
        } else if rsi <= lower {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RsiZone::Overbought => "overbought",
            RsiZone::Neutral => "neutral",
            RsiZone::Oversold => "oversold",
        }
    }
}

// One decimal, as shown on the RSI gauge.
pub fn format_rsi(rsi: f64) -> String {
    format!("{:.1}", rsi)
}

// Price with thousands separators, e.g. `64,210.5`.
pub fn format_price(price: f64) -> String {
    let raw = format!("{}", price);
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
