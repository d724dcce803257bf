//! Code fence tracking for line-based directive recognition.
//!
//! Directive syntax inside fenced code blocks is literal text.

use super::indent_columns;

/// Tracks code fence state during line-by-line scanning.
///
/// Fences use backticks or tildes (three or more). The closing fence must use
/// the same character and be at least as long as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed the next line. Returns `true` if the line opened or closed a fence.
    ///
    /// Fence markers may be indented by at most three columns; deeper lines
    /// are indented code or fenced content.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        if indent_columns(line) > 3 {
            return false;
        }
        let trimmed = line.trim_start_matches([' ', '\t']);

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }

    /// True if `line` is literal because of fencing (a fence marker or fenced content).
    pub(crate) fn is_literal(&mut self, line: &str) -> bool {
        self.update(line) || self.in_fence()
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("```md"));
        assert!(tracker.in_fence());
        assert!(!tracker.update("::include{file=a.md}"));
        assert!(tracker.in_fence());
        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("~~~"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_shorter_fence_not_closing() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("````"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("`````"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_mixed_fence_chars() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("```"));
        assert!(!tracker.update("~~~"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_is_literal_covers_markers_and_content() {
        let mut tracker = FenceTracker::new();

        assert!(!tracker.is_literal("::include"));
        assert!(tracker.is_literal("```"));
        assert!(tracker.is_literal("::include"));
        assert!(tracker.is_literal("```"));
        assert!(!tracker.is_literal("::include"));
    }

    #[test]
    fn test_indented_fence_marker_is_code() {
        let mut tracker = FenceTracker::new();

        assert!(!tracker.update("    ```"));
        assert!(!tracker.update("\t```"));
        assert!(!tracker.in_fence());
        assert!(tracker.update("   ```"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_indented_closing_marker_is_content() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("```"));
        assert!(!tracker.update("    ```"));
        assert!(tracker.in_fence());
        assert!(tracker.is_literal("  :::note"));
        assert!(tracker.update(" ```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_two_backticks_not_fence() {
        let mut tracker = FenceTracker::new();
        assert!(!tracker.update("``code``"));
        assert!(!tracker.in_fence());
    }
}
