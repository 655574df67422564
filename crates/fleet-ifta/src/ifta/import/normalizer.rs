/// Canonical form of a jurisdiction code typed into a spreadsheet.
pub(crate) fn normalize_jurisdiction(raw: &str) -> String {
    let cleaned = raw.trim_start_matches('\u{feff}');
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_uppercase()
}
