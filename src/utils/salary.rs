/// Formats a raw salary value into the human-readable string shown in chat
/// context blobs: "₹1.5L per annum", "₹5K per month", "₹500 fixed".
///
/// Values the poster already formatted (e.g. "negotiable") pass through
/// unchanged. Empty or zero amounts collapse to a fixed sentinel.
pub fn format_salary(amount: Option<&str>, employment_type: Option<&str>) -> String {
    let raw = match amount {
        Some(a) if !a.trim().is_empty() && a.trim() != "0" => a.trim(),
        _ => return "Not specified".to_string(),
    };

    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let value: f64 = match cleaned.parse() {
        Ok(v) => v,
        // Escape hatch for already-formatted strings.
        Err(_) => return raw.to_string(),
    };

    let formatted = if value >= 100_000.0 {
        format!("₹{:.1}L", value / 100_000.0)
    } else if value >= 1_000.0 {
        format!("₹{:.0}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("₹{}", value as i64)
    } else {
        format!("₹{}", value)
    };

    let suffix = match employment_type.map(|t| t.to_lowercase()).as_deref() {
        Some("full-time") | Some("part-time") => " per annum",
        Some("internship") => " per month",
        Some("contract") => " fixed",
        _ => "",
    };

    format!("{}{}", formatted, suffix).trim().to_string()
}
