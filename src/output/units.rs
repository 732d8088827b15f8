//! Capacity formatting
//!
//! Kubernetes quantities (`4Gi`, `500M`, `1073741824`) are shown in the
//! tables as binary sizes (`4.0GiB`, `477MiB`, `1.0GiB`).

use byte_unit::{Byte, Unit, UnitType};

/// Parse a Kubernetes quantity string to bytes
pub fn parse_quantity(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Find where the number ends and the suffix begins
    let num_end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    let num: f64 = s[..num_end].parse().ok()?;

    let multiplier: f64 = match &s[num_end..] {
        "" => 1.0,
        "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        _ => return None,
    };

    Some((num * multiplier) as u64)
}

/// Format a byte count with binary units, one decimal below ten units
pub fn format_ibytes(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    let unit = adjusted.get_unit();
    if unit == Unit::B {
        return format!("{}B", bytes);
    }

    let rounded = (adjusted.get_value() * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1}{}", rounded, unit)
    } else {
        format!("{:.0}{}", rounded, unit)
    }
}

/// Convert a quantity to a binary size, returning the input unchanged if
/// it cannot be parsed
pub fn convert_to_ibytes(quantity: &str) -> String {
    match parse_quantity(quantity) {
        Some(bytes) => format_ibytes(bytes),
        None => quantity.to_string(),
    }
}
