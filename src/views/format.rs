// src/views/format.rs
//! Display helpers shared by the trip and dispatch screens.

const PLACEHOLDER: &str = "--";

/// First three and last three characters around `****`. Short numbers are
/// shown as is.
pub fn mask_phone(phone: Option<&str>) -> String {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return "N/A".to_string();
    };
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 10 {
        return phone.to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}****{tail}")
}

pub fn coordinates(lat: Option<f64>, lng: Option<f64>) -> String {
    match (lat, lng) {
        (Some(lat), Some(lng)) => format!("{lat:.4}, {lng:.4}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Whole rupees.
pub fn fare(amount: Option<f64>) -> String {
    match amount {
        Some(amount) => format!("₹{amount:.0}"),
        None => format!("₹{PLACEHOLDER}"),
    }
}

pub fn distance_km(distance: Option<f64>) -> String {
    match distance {
        Some(distance) => format!("{distance:.1} km"),
        None => format!("{PLACEHOLDER} km"),
    }
}
