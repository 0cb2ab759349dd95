//! Rolling continuity context threaded through sequential part generation
//!
//! Compression policy: the last `window_segments` parts are quoted by their
//! closing `verbatim_chars` characters, so the next part can pick up mid-scene.
//! Every older part is condensed to a one-line synopsis (its first sentence,
//! cut at `synopsis_chars`). If the result still exceeds `max_summary_chars`,
//! the oldest synopsis lines are dropped first and, as a last resort, only the
//! tail of the summary is kept. All limits count characters, not bytes.

use crate::config::ContinuityLimits;

const ELLIPSIS: &str = "...";

/// Sentence breaks closer to the start than this are taken for
/// abbreviations ("Mr.", "Dr.", "St.") and skipped
const MIN_SENTENCE_CHARS: usize = 12;

/// Accumulated story state carried from one part to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityContext {
    limits: ContinuityLimits,
    rolling_summary: String,
    generated_so_far: Vec<String>,
}

impl ContinuityContext {
    /// Empty context with default limits
    pub fn initial() -> Self {
        Self::with_limits(ContinuityLimits::default())
    }

    pub fn with_limits(limits: ContinuityLimits) -> Self {
        Self {
            limits,
            rolling_summary: String::new(),
            generated_so_far: Vec::new(),
        }
    }

    /// Record a newly generated segment and recompute the bounded summary
    pub fn augment(mut self, new_segment_text: &str) -> Self {
        self.generated_so_far.push(new_segment_text.trim().to_string());
        self.rolling_summary = summarize(&self.generated_so_far, &self.limits);
        self
    }

    /// Text embedded in the next prompt; empty before the first segment
    pub fn summary_for_prompt(&self) -> String {
        self.rolling_summary.clone()
    }

    pub fn rolling_summary(&self) -> &str {
        &self.rolling_summary
    }

    pub fn generated_so_far(&self) -> &[String] {
        &self.generated_so_far
    }

    pub fn is_empty(&self) -> bool {
        self.generated_so_far.is_empty()
    }
}

impl Default for ContinuityContext {
    fn default() -> Self {
        Self::initial()
    }
}

fn summarize(segments: &[String], limits: &ContinuityLimits) -> String {
    let split = segments.len().saturating_sub(limits.window_segments);
    let (earlier, recent) = segments.split_at(split);

    let mut synopsis: Vec<String> = earlier
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let line = head_chars(&first_sentence(&collapse_whitespace(segment)), limits.synopsis_chars);
            format!("- Part {}: {}", i + 1, line)
        })
        .collect();

    let passages: Vec<String> = recent
        .iter()
        .enumerate()
        .map(|(offset, segment)| {
            format!(
                "[End of part {}]\n{}",
                split + offset + 1,
                tail_chars(segment, limits.verbatim_chars)
            )
        })
        .collect();

    let mut dropped = 0;
    loop {
        let summary = compose(&synopsis, dropped, &passages);
        if summary.chars().count() <= limits.max_summary_chars {
            return summary;
        }
        if synopsis.is_empty() {
            return tail_chars(&summary, limits.max_summary_chars);
        }
        synopsis.remove(0);
        dropped += 1;
    }
}

fn compose(synopsis: &[String], dropped: usize, passages: &[String]) -> String {
    let mut sections = Vec::new();

    if !synopsis.is_empty() || dropped > 0 {
        let mut lines = vec!["Earlier in the story:".to_string()];
        if dropped > 0 {
            lines.push(format!("- ({dropped} earlier part(s) omitted)"));
        }
        lines.extend(synopsis.iter().cloned());
        sections.push(lines.join("\n"));
    }

    if !passages.is_empty() {
        sections.push(format!("Most recent passages:\n{}", passages.join("\n\n")));
    }

    sections.join("\n\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_sentence(text: &str) -> String {
    let mut chars = text.char_indices().enumerate().peekable();
    while let Some((position, (i, c))) = chars.next() {
        if matches!(c, '.' | '!' | '?') && position + 1 >= MIN_SENTENCE_CHARS {
            let at_boundary = chars.peek().map_or(true, |(_, (_, next))| next.is_whitespace());
            if at_boundary {
                return text[..i + c.len_utf8()].to_string();
            }
        }
    }
    text.to_string()
}

/// First `max` characters, ending in an ellipsis when cut
fn head_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(&ELLIPSIS[..max.min(ELLIPSIS.len())]);
    cut
}

/// Last `max` characters, starting with an ellipsis when cut
fn tail_chars(text: &str, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let tail: String = text.chars().skip(total - keep).collect();
    format!("{}{}", &ELLIPSIS[..max.min(ELLIPSIS.len())], tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(window: usize, verbatim: usize, synopsis: usize, max: usize) -> ContinuityLimits {
        ContinuityLimits {
            window_segments: window,
            verbatim_chars: verbatim,
            synopsis_chars: synopsis,
            max_summary_chars: max,
        }
    }

    #[test]
    fn test_initial_context_is_empty() {
        let context = ContinuityContext::initial();
        assert!(context.is_empty());
        assert_eq!(context.summary_for_prompt(), "");
    }

    #[test]
    fn test_recent_segments_are_quoted() {
        let context = ContinuityContext::initial()
            .augment("Mara arrived at the house at dusk.")
            .augment("The cellar door was open.");

        let summary = context.summary_for_prompt();
        assert!(summary.contains("[End of part 1]\nMara arrived at the house at dusk."));
        assert!(summary.contains("[End of part 2]\nThe cellar door was open."));
        assert!(!summary.contains("Earlier in the story"));
        assert_eq!(context.generated_so_far().len(), 2);
    }

    #[test]
    fn test_older_segments_are_condensed() {
        let context = ContinuityContext::with_limits(limits(1, 100, 200, 2000))
            .augment("Mara arrived at dusk. She unpacked slowly.\nThe clocks were all stopped.")
            .augment("Night fell. Something knocked.")
            .augment("Morning never came.");

        let summary = context.summary_for_prompt();
        assert!(summary.contains("- Part 1: Mara arrived at dusk."));
        assert!(!summary.contains("She unpacked slowly"));
        assert!(summary.contains("- Part 2: Night fell."));
        assert!(summary.contains("[End of part 3]\nMorning never came."));
    }

    #[test]
    fn test_verbatim_window_keeps_segment_endings() {
        let long = format!("{}THE END OF PART", "a".repeat(500));
        let context = ContinuityContext::with_limits(limits(2, 20, 50, 3000)).augment(&long);

        let summary = context.summary_for_prompt();
        assert!(summary.ends_with("THE END OF PART"));
        assert!(summary.contains("[End of part 1]\n...aaTHE END OF PART"));
    }

    #[test]
    fn test_summary_is_bounded_for_long_stories() {
        let limits = ContinuityLimits::default();
        let mut context = ContinuityContext::with_limits(limits.clone());
        for part in 0..10 {
            let segment = format!("Part {part} begins here. {}", "The walls whispered. ".repeat(400));
            context = context.augment(&segment);
            assert!(
                context.rolling_summary().chars().count() <= limits.max_summary_chars,
                "summary grew past the cap after part {part}"
            );
        }
        assert_eq!(context.generated_so_far().len(), 10);
    }

    #[test]
    fn test_tight_cap_drops_oldest_synopsis_first() {
        let mut context = ContinuityContext::with_limits(limits(1, 40, 40, 140));
        for i in 1..=6 {
            context = context.augment(&format!("Event number {i} happened."));
        }

        let summary = context.summary_for_prompt();
        assert!(summary.chars().count() <= 140);
        assert!(summary.contains("omitted"));
        assert!(summary.contains("Event number 6 happened."));
        assert!(!summary.contains("Part 1:"));
    }

    #[test]
    fn test_summary_is_deterministic() {
        let build = || {
            ContinuityContext::initial()
                .augment("One. Two.")
                .augment("Three.")
                .augment("Four.")
        };
        assert_eq!(build().summary_for_prompt(), build().summary_for_prompt());
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "ééééééééééé";
        assert_eq!(head_chars(text, 6).chars().count(), 6);
        assert_eq!(tail_chars(text, 6).chars().count(), 6);
        assert_eq!(first_sentence("Hantu itu datang! Lalu pergi."), "Hantu itu datang!");
        assert_eq!(first_sentence("v1.5 is odd"), "v1.5 is odd");
    }

    #[test]
    fn test_synopsis_survives_abbreviations() {
        assert_eq!(
            first_sentence("Mr. Hale locked the door. Then he waited."),
            "Mr. Hale locked the door."
        );
        assert_eq!(
            first_sentence("Dr. Ruiz arrived late! Nobody spoke."),
            "Dr. Ruiz arrived late!"
        );

        let context = ContinuityContext::with_limits(limits(1, 100, 200, 2000))
            .augment("Mrs. Pell kept the keys. She never slept.")
            .augment("The lamps went out.");
        assert!(context.summary_for_prompt().contains("- Part 1: Mrs. Pell kept the keys."));
    }
}
