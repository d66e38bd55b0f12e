use scout_core::{RetrievalResult, SourceType};
use std::fmt::Write as _;

const HEADER: &str = "Here's what I found from multiple sources:";

/// Renders aggregated results into a prompt-ready text block.
///
/// Results are grouped by source, groups appear in first-seen order, and each
/// group gets its own `## <Label> Results` section with results numbered from 1.
/// An empty input renders as an empty string so callers can omit the section.
pub fn build_context(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut groups: Vec<(SourceType, Vec<&RetrievalResult>)> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|(source, _)| *source == result.source) {
            Some((_, members)) => members.push(result),
            None => groups.push((result.source, vec![result])),
        }
    }

    let mut context = String::new();
    let _ = write!(context, "{HEADER}\n\n");

    for (source, members) in groups {
        let _ = write!(context, "## {} Results\n\n", source.label());
        for (idx, result) in members.iter().enumerate() {
            let _ = writeln!(context, "[{}] {}", idx + 1, result.title);
            let _ = writeln!(context, "{}", result.body());
            let _ = write!(context, "Source: {}\n\n", result.url);
        }
    }

    context
}
