use std::collections::HashSet;

use crate::domain::evidence::EvidenceItem;

/// Keep only the items the member may see
///
/// Items that do not require enrollment always pass. Items that do pass only
/// when their `course_id` is present and in `enrolled`.
pub fn filter_by_enrollment(
    items: Vec<EvidenceItem>,
    enrolled: &HashSet<String>,
) -> Vec<EvidenceItem> {
    items
        .into_iter()
        .filter(|item| {
            !item.requires_enrollment()
                || item
                    .course_id()
                    .is_some_and(|course_id| enrolled.contains(&course_id))
        })
        .collect()
}
