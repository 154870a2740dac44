use super::item::{keys, EvidenceItem};

/// Separator placed between evidence chunks in prompts
pub const CONTEXT_SEPARATOR: &str = "\n\n-----\n\n";

/// Separator between the course/chapter/lesson parts of a chunk header
pub const HEADER_SEPARATOR: &str = " • ";

fn header(item: &EvidenceItem) -> String {
    [
        ("Course", keys::COURSE_TITLE),
        ("Chapter", keys::CHAPTER_TITLE),
        ("Lesson", keys::LESSON_TITLE),
    ]
    .iter()
    .filter_map(|(label, key)| item.get_str(key).map(|title| format!("{}: {}", label, title)))
    .collect::<Vec<_>>()
    .join(HEADER_SEPARATOR)
}

/// Render evidence as the generation context, in evidence order
pub fn build_context(items: &[EvidenceItem]) -> String {
    items
        .iter()
        .map(|item| {
            let header = header(item);
            [header.as_str(), item.content.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n\n")
                .trim()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Raw evidence text, as shown to the hallucination grader
pub fn join_contents(items: &[EvidenceItem]) -> String {
    items
        .iter()
        .map(|item| item.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
