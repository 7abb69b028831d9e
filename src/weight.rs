use regex::Regex;
use std::sync::LazyLock;

/// Denominator for the weighted-choice form `a*N%`: "pick the best of two",
/// so N is stated out of 50 rather than 100.
const WEIGHTED_CHOICE_SCALE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightParse {
    Ungraded,
    Percent,
    WeightedChoice,
    Decimal,
    /// Non-empty text that did not yield a number; weight falls back to 0.
    Degraded,
}

impl WeightParse {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ungraded => "ungraded",
            Self::Percent => "percent",
            Self::WeightedChoice => "weightedChoice",
            Self::Decimal => "decimal",
            Self::Degraded => "degraded",
        }
    }
}

/// Parse a free-form weight ("25%", "Quiz [50%]", "a*3%", "Ungraded") into a
/// fraction in [0, 1]. Never fails: anything unreadable becomes 0.
pub fn parse_weight(text: &str) -> f64 {
    parse_weight_detailed(text).0
}

pub fn parse_weight_detailed(text: &str) -> (f64, WeightParse) {
    let lowered = text.trim().to_lowercase();
    if lowered == "ungraded" {
        return (0.0, WeightParse::Ungraded);
    }

    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '%'))
        .collect();

    let (value, rule) = if cleaned.ends_with('%') {
        let percents = percent_numbers(&lowered);
        let Some(max_percent) = percents.into_iter().reduce(f64::max) else {
            return degraded(text);
        };
        if lowered.starts_with("a*") {
            match weighted_choice_payload(&lowered) {
                Some(n) => (n / WEIGHTED_CHOICE_SCALE, WeightParse::WeightedChoice),
                None => return degraded(text),
            }
        } else {
            (max_percent / 100.0, WeightParse::Percent)
        }
    } else {
        match cleaned.parse::<f64>() {
            // Bare numbers above 1 are percentages written without the sign.
            Ok(v) if v > 1.0 => (v / 100.0, WeightParse::Decimal),
            Ok(v) => (v, WeightParse::Decimal),
            Err(_) => {
                if lowered.is_empty() {
                    return (0.0, WeightParse::Degraded);
                }
                return degraded(text);
            }
        }
    };

    if !value.is_finite() {
        return degraded(text);
    }
    (value.clamp(0.0, 1.0), rule)
}

fn degraded(text: &str) -> (f64, WeightParse) {
    tracing::warn!(weight = text, "unreadable weight expression, using 0");
    (0.0, WeightParse::Degraded)
}

static PERCENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").ok());

/// Every number written immediately before a `%` sign, e.g. `"10% to 12.5%"`
/// gives `[10.0, 12.5]`.
pub fn percent_numbers(text: &str) -> Vec<f64> {
    let Some(re) = PERCENT.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

fn weighted_choice_payload(lowered: &str) -> Option<f64> {
    let rest = lowered.strip_prefix("a*")?;
    let (payload, _) = rest.split_once('%')?;
    payload.trim().parse::<f64>().ok()
}
