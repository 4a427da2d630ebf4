//! Parcel-label field extraction.
//!
//! Heuristic classification of OCR'd label lines into the fields the
//! intake form cares about. First match wins per field; everything
//! unmatched stays empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static CLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s,+\-.]").unwrap());
static AWB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{10,15}\b").unwrap());
static PHONE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\+?91|0)?\s?\d{10}\b").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{10}\b").unwrap());
static ROLL_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{2}[A-Z0-9]{8}\b").unwrap());
static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z\s.]{2,40}$").unwrap());

/// Courier keywords used to spot the carrier line.
const COURIERS: &[&str] = &[
    "flipkart",
    "ekart",
    "delhivery",
    "amazon",
    "bluedart",
    "xpressbees",
    "ecom",
    "shadowfax",
];

/// Fields extracted from a parcel label.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LabelFields {
    pub name: String,
    pub company: String,
    pub phone: String,
    pub awb: String,
    pub roll_no: String,
}

/// Classify OCR'd lines into label fields.
pub fn classify_lines(lines: &[String]) -> LabelFields {
    let mut fields = LabelFields::default();

    let cleaned: Vec<String> = lines
        .iter()
        .map(|l| CLEAN.replace_all(l, "").trim().to_string())
        .filter(|l| l.len() > 2)
        .collect();

    for line in &cleaned {
        // AWB numbers are long digit runs, checked before phone so a
        // 10-digit run is not misread as a phone number
        if fields.awb.is_empty() {
            if let Some(m) = AWB.find(line) {
                fields.awb = m.as_str().to_string();
                continue;
            }
        }
        if fields.phone.is_empty() && PHONE_HINT.is_match(line) {
            if let Some(m) = PHONE.find(line) {
                fields.phone = m.as_str().to_string();
                continue;
            }
        }
        if fields.roll_no.is_empty() {
            if let Some(m) = ROLL_NO.find(line) {
                fields.roll_no = m.as_str().to_string();
                continue;
            }
        }
        if fields.company.is_empty() {
            let lower = line.to_lowercase();
            if COURIERS.iter().any(|c| lower.contains(c)) {
                fields.company = line.clone();
                continue;
            }
        }
        if fields.name.is_empty() && NAME.is_match(line) {
            fields.name = line.clone();
        }
    }

    fields
}
