//! Text-driven node sizing.
//!
//! A topic card's geometry derives entirely from its display name: the name
//! is word-wrapped at a fixed character budget, then the card is sized by the
//! longest resulting line and the line count. Keeping this a pure function of
//! the name is what lets layouts be recomputed deterministically and lets the
//! rest of the engine treat dimensions as immutable per node.

use serde::{Deserialize, Serialize};

/// Character budget per wrapped line.
pub const MAX_LINE_CHARS: usize = 18;
/// Approximate advance width of one character in the rendering font.
pub const CHAR_WIDTH: f32 = 7.5;
/// Vertical pitch of one wrapped line.
pub const LINE_HEIGHT: f32 = 18.0;
/// Horizontal padding on each side of the text block.
pub const H_PADDING: f32 = 10.0;
/// Vertical padding above and below the text block.
pub const V_PADDING: f32 = 8.0;
/// Cards never shrink below this width, however short the name.
pub const MIN_WIDTH: f32 = 60.0;

/// Rendered extent of a topic card plus the wrapped lines that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub lines: Vec<String>,
}

impl Dimensions {
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }
}

/// Measures a display name into card dimensions.
///
/// Greedy word wrap: words are packed onto a line while they fit within
/// [`MAX_LINE_CHARS`]; a single word longer than the budget gets a line of
/// its own rather than being split mid-word. Width follows the longest line,
/// height follows the line count.
pub fn measure(name: &str) -> Dimensions {
    let lines = wrap_name(name);
    let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);

    let width = (longest as f32 * CHAR_WIDTH + 2.0 * H_PADDING).max(MIN_WIDTH);
    let height = lines.len() as f32 * LINE_HEIGHT + 2.0 * V_PADDING;

    Dimensions {
        width,
        height,
        lines,
    }
}

fn wrap_name(name: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in name.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        // +1 for the joining space
        if current.chars().count() + 1 + word.chars().count() <= MAX_LINE_CHARS {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        // Blank names still render as an empty one-line card.
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_single_line_min_width() {
        let dims = measure("Rust");
        assert_eq!(dims.lines, vec!["Rust".to_string()]);
        assert_eq!(dims.width, MIN_WIDTH);
        assert_eq!(dims.height, LINE_HEIGHT + 2.0 * V_PADDING);
    }

    #[test]
    fn long_name_wraps_at_character_budget() {
        let dims = measure("Advanced Generic Trait Bounds");
        for line in &dims.lines {
            // Only an unbreakable single word may exceed the budget.
            assert!(
                line.chars().count() <= MAX_LINE_CHARS || !line.contains(' '),
                "overlong wrapped line: {line:?}"
            );
        }
        assert!(dims.lines.len() >= 2);
        assert_eq!(
            dims.height,
            dims.lines.len() as f32 * LINE_HEIGHT + 2.0 * V_PADDING
        );
    }

    #[test]
    fn unbreakable_word_gets_own_line() {
        let dims = measure("Internationalization basics");
        assert_eq!(dims.lines[0], "Internationalization");
        assert_eq!(dims.lines[1], "basics");
        // Width tracks the overlong word, not the budget.
        assert_eq!(
            dims.width,
            "Internationalization".chars().count() as f32 * CHAR_WIDTH + 2.0 * H_PADDING
        );
    }

    #[test]
    fn width_follows_longest_line() {
        let dims = measure("Databases and Query Planning");
        let longest = dims
            .lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .expect("at least one line");
        assert_eq!(
            dims.width,
            (longest as f32 * CHAR_WIDTH + 2.0 * H_PADDING).max(MIN_WIDTH)
        );
    }

    #[test]
    fn empty_name_measures_to_minimal_card() {
        let dims = measure("");
        assert_eq!(dims.lines, vec![String::new()]);
        assert_eq!(dims.width, MIN_WIDTH);
        assert_eq!(dims.height, LINE_HEIGHT + 2.0 * V_PADDING);

        let blank = measure("   \t ");
        assert_eq!(blank, dims);
    }

    #[test]
    fn measurement_is_deterministic() {
        let first = measure("Linear Algebra for Graphics");
        let second = measure("Linear Algebra for Graphics");
        assert_eq!(first, second);
    }

    #[test]
    fn whitespace_runs_collapse() {
        let spaced = measure("Linear    Algebra");
        let plain = measure("Linear Algebra");
        assert_eq!(spaced, plain);
    }
}
