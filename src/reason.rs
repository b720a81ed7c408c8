//! Reason/audit string handling.
//!
//! Reason strings are append-only: merging concatenates parts with
//! `" | "`, skipping empties and parts already present (so re-running an
//! evaluation with unchanged inputs leaves the trail untouched).
//!
//! A fixed set of internal markers (auto-generation note, conflict-buffer
//! note) can be stripped for external-facing display; the full trail
//! stays in storage.

/// Audit note stamped on template-generated tasks.
pub const AUTO_GENERATED_REASON: &str = "Auto-generated from task template";

/// Audit note stamped on conflict-buffer adjustments.
pub const CONFLICT_BUFFER_REASON: &str =
    "Avoid fertiliser application near hormone application (buffer 7 days).";

/// Audit note appended when a manager approves a proposal.
pub const APPROVED_REASON: &str = "Approved by manager";

/// Audit note appended when a manager rejects a proposal.
pub const REJECTED_REASON: &str = "Rejected by manager";

/// Markers treated as internal (lowercase substring match).
const INTERNAL_REASON_MARKERS: [&str; 2] = [
    "auto-generated from task template",
    "avoid fertiliser application near hormone application",
];

/// Appends `addition` to `existing`, joining with `" | "`.
///
/// Empty parts are skipped; an addition already present in the trail is
/// not duplicated.
pub fn merge_reasons(existing: Option<&str>, addition: &str) -> Option<String> {
    let addition = addition.trim();
    let base = existing.map(str::trim).unwrap_or("");
    if addition.is_empty() {
        return (!base.is_empty()).then(|| base.to_string());
    }
    if base.is_empty() {
        return Some(addition.to_string());
    }
    if base.split('|').any(|part| part.trim() == addition) {
        return Some(base.to_string());
    }
    Some(format!("{base} | {addition}"))
}

/// Removes internal markers from a reason for display.
///
/// Returns `None` when nothing user-facing remains.
pub fn strip_internal_reason(reason: Option<&str>) -> Option<String> {
    let reason = reason?;
    let cleaned: Vec<&str> = reason
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| {
            let lower = part.to_lowercase();
            !INTERNAL_REASON_MARKERS
                .iter()
                .any(|marker| lower.contains(marker))
        })
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_into_empty() {
        assert_eq!(
            merge_reasons(None, "Soil too wet"),
            Some("Soil too wet".to_string())
        );
        assert_eq!(
            merge_reasons(Some("  "), "Soil too wet"),
            Some("Soil too wet".to_string())
        );
    }

    #[test]
    fn test_merge_appends_with_pipe() {
        assert_eq!(
            merge_reasons(Some("Soil too wet"), "AI predicts Stop"),
            Some("Soil too wet | AI predicts Stop".to_string())
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let merged = merge_reasons(Some("Soil too wet | AI predicts Stop"), "AI predicts Stop");
        assert_eq!(merged, Some("Soil too wet | AI predicts Stop".to_string()));
    }

    #[test]
    fn test_merge_empty_addition_keeps_existing() {
        assert_eq!(
            merge_reasons(Some("Soil too wet"), ""),
            Some("Soil too wet".to_string())
        );
        assert_eq!(merge_reasons(None, ""), None);
    }

    #[test]
    fn test_strip_internal_markers() {
        let reason = format!("{AUTO_GENERATED_REASON} | Soil too wet");
        assert_eq!(
            strip_internal_reason(Some(&reason)),
            Some("Soil too wet".to_string())
        );

        let reason = format!("{CONFLICT_BUFFER_REASON} | {AUTO_GENERATED_REASON}");
        assert_eq!(strip_internal_reason(Some(&reason)), None);
        assert_eq!(strip_internal_reason(None), None);
    }
}
