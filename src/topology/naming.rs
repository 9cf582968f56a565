//! Naming convention linking lineups, PDUs, and subfeeds.
//!
//! PDU ids are `PDU-<lineup>-<n>`, where `<lineup>` is the lineup name with
//! any leading `UPS-` (case-insensitive) removed and `<n>` is the 1-based
//! position of the PDU within its lineup. Subfeeds are `<pdu>-S<i>` with a
//! 0-based slot index.

const UPS_PREFIX: &str = "UPS-";

/// Removes a leading `UPS-` prefix, ignoring case.
///
/// # Examples
///
/// ```
/// use loadplan::topology::naming::strip_ups_prefix;
///
/// assert_eq!(strip_ups_prefix("UPS-A01"), "A01");
/// assert_eq!(strip_ups_prefix("ups-b02"), "b02");
/// assert_eq!(strip_ups_prefix("C01"), "C01");
/// ```
pub fn strip_ups_prefix(lineup: &str) -> &str {
    match lineup.get(..UPS_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(UPS_PREFIX) => &lineup[UPS_PREFIX.len()..],
        _ => lineup,
    }
}

/// Builds the id of the PDU at `position` (1-based) in `lineup`.
pub fn pdu_id(lineup: &str, position: usize) -> String {
    format!("PDU-{}-{position}", strip_ups_prefix(lineup))
}

/// Builds the key of subfeed slot `index` (0-based) on `pdu`.
pub fn subfeed_key(pdu: &str, index: usize) -> String {
    format!("{pdu}-S{index}")
}

/// Expands lineup prefixes into numbered lineup names.
///
/// Prefixes are upper-cased and trimmed; empty entries are skipped. Each
/// prefix yields `per_prefix` names with a two-digit, 1-based suffix.
///
/// # Examples
///
/// ```
/// use loadplan::topology::naming::generate_lineup_names;
///
/// let names = generate_lineup_names("a, b", 2);
/// assert_eq!(names, vec!["A01", "A02", "B01", "B02"]);
/// ```
pub fn generate_lineup_names(prefixes: &str, per_prefix: usize) -> Vec<String> {
    prefixes
        .split(',')
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .flat_map(|prefix| (1..=per_prefix).map(move |i| format!("{prefix}{i:02}")))
        .collect()
}

/// Recovers the distinct prefixes of a list of lineup names, in first-seen order.
///
/// Digits are removed from each name, so `"A01"` and `"A02"` share prefix `"A"`.
pub fn lineup_prefixes<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    for name in names {
        let prefix: String = name
            .as_ref()
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .collect();
        if !prefixes.contains(&prefix) {
            prefixes.push(prefix);
        }
    }
    prefixes
}
