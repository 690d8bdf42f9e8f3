//! Duration and number converters used by command arguments and responses.

const DAY_UNITS: &[&str] = &["days", "day", "d"];
const HOUR_UNITS: &[&str] = &["hours", "hour", "hrs", "hr", "h"];
const MINUTE_UNITS: &[&str] = &["minutes", "minute", "mins", "min", "m"];

/// Parse a free-form duration such as `"1d 2h 3m"` or `"2 Hours 30min"`
/// into seconds.
///
/// Case and whitespace are ignored. Units are searched days, hours, minutes
/// in that order, each trying its longest spelling first; a unit only
/// matches when something precedes it. Anything that doesn't parse yields 0.
pub fn parse_duration(text: &str) -> i64 {
    let mut rest: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut parts = [0i64; 3];
    for (slot, units) in [DAY_UNITS, HOUR_UNITS, MINUTE_UNITS].iter().enumerate() {
        for unit in units.iter() {
            match rest.find(unit) {
                Some(idx) if idx > 0 => {
                    let Ok(value) = rest[..idx].parse::<i64>() else {
                        return 0;
                    };
                    parts[slot] = value;
                    rest = rest[idx + unit.len()..].to_string();
                    break;
                }
                _ => {}
            }
        }
    }

    let [days, hours, minutes] = parts;
    total_seconds(days, hours, minutes).unwrap_or(0)
}

/// `None` when the total doesn't fit in an `i64`.
fn total_seconds(days: i64, hours: i64, minutes: i64) -> Option<i64> {
    days.checked_mul(24)?
        .checked_add(hours)?
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)
}

/// Format seconds as `"1d 2h 3m"`, truncating anything below a minute.
///
/// Hours are shown whenever days are; minutes are dropped only when
/// `ignore_minutes` is set and a larger unit is already present.
pub fn format_duration(seconds: i64, ignore_minutes: bool) -> String {
    let days = seconds.div_euclid(86_400);
    let rem = seconds.rem_euclid(86_400);
    let hours = rem / 3_600;
    let minutes = (rem % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days + hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if !ignore_minutes || parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    parts.join(" ")
}

/// Format a count with 3 significant figures and k/m suffixes.
///
/// Ten-digit and larger values switch to whole millions with thousands
/// separators, e.g. `1,230m`.
pub fn format_abbreviated_number(n: u64) -> String {
    let n = round_sig3(n);
    let digits = n.to_string().len();

    if digits < 4 {
        n.to_string()
    } else if digits < 7 {
        format!("{}k", trim_sig3(n as f64 / 1_000.0))
    } else if digits < 10 {
        format!("{}m", trim_sig3(n as f64 / 1_000_000.0))
    } else {
        format!("{}m", group_thousands(n / 1_000_000))
    }
}

/// Round to 3 significant figures, ties to even.
fn round_sig3(n: u64) -> u64 {
    let digits = n.to_string().len() as u32;
    if digits <= 3 {
        return n;
    }
    let scale = 10u64.pow(digits - 3);
    let (quot, rem) = (n / scale, n % scale);
    let round_up = match (rem * 2).cmp(&scale) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => quot % 2 == 1,
        std::cmp::Ordering::Less => false,
    };
    (quot + round_up as u64).saturating_mul(scale)
}

/// Render a value below 1000 with 3 significant figures, no trailing zeros.
fn trim_sig3(value: f64) -> String {
    let int_digits = if value < 10.0 {
        1
    } else if value < 100.0 {
        2
    } else {
        3
    };
    let rendered = format!("{:.*}", 3 - int_digits, value);
    if rendered.contains('.') {
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rendered
    }
}

fn group_thousands(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
