//! Candidate cut positions inside a text region.
//!
//! Positions are character offsets (Unicode scalar values). A position `b`
//! means "a chunk may end right before character `b`".

use unicode_segmentation::UnicodeSegmentation;

/// Boundary levels in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLevel {
    Paragraph,
    Sentence,
    Word,
}

impl BoundaryLevel {
    pub const ALL: [BoundaryLevel; 3] = [
        BoundaryLevel::Paragraph,
        BoundaryLevel::Sentence,
        BoundaryLevel::Word,
    ];
}

/// Sorted cut positions for every level of one region.
#[derive(Debug, Default)]
pub struct Boundaries {
    paragraph: Vec<usize>,
    sentence: Vec<usize>,
    word: Vec<usize>,
}

impl Boundaries {
    pub fn analyze(text: &str, chars: &[char]) -> Self {
        let paragraph = (2..=chars.len())
            .filter(|&i| chars[i - 2] == '\n' && chars[i - 1] == '\n')
            .collect();

        let word = (1..=chars.len())
            .filter(|&i| chars[i - 1].is_whitespace())
            .collect();

        // Sentence segments carry their trailing whitespace, so each segment
        // start is a cut point. Byte offsets are converted to char offsets.
        let mut sentence = Vec::new();
        let mut char_pos = 0;
        let mut byte_pos = 0;
        for (start, _) in text.split_sentence_bound_indices() {
            char_pos += text[byte_pos..start].chars().count();
            byte_pos = start;
            if char_pos > 0 {
                sentence.push(char_pos);
            }
        }

        Self {
            paragraph,
            sentence,
            word,
        }
    }

    fn positions(&self, level: BoundaryLevel) -> &[usize] {
        match level {
            BoundaryLevel::Paragraph => &self.paragraph,
            BoundaryLevel::Sentence => &self.sentence,
            BoundaryLevel::Word => &self.word,
        }
    }

    /// Best cut strictly after `floor` and at most `limit`.
    ///
    /// Coarser levels win; within a level the latest position wins. Falls
    /// back to a hard cut at `limit`.
    pub fn cut_point(&self, floor: usize, limit: usize) -> usize {
        BoundaryLevel::ALL
            .iter()
            .find_map(|&level| last_in_range(self.positions(level), floor, limit))
            .unwrap_or(limit)
    }
}

fn last_in_range(positions: &[usize], floor: usize, limit: usize) -> Option<usize> {
    let end = positions.partition_point(|&b| b <= limit);
    positions[..end].last().copied().filter(|&b| b > floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Boundaries {
        let chars: Vec<char> = text.chars().collect();
        Boundaries::analyze(text, &chars)
    }

    #[test]
    fn test_paragraph_positions() {
        let b = analyze("ab\n\ncd\n\nef");
        assert_eq!(b.paragraph, vec![4, 8]);
    }

    #[test]
    fn test_sentence_positions_are_char_offsets() {
        // "é" is two bytes, offsets must still count characters
        let b = analyze("Café ouvert. Très bien.");
        assert_eq!(b.sentence, vec![13]);
    }

    #[test]
    fn test_paragraph_preferred_over_sentence() {
        let b = analyze("One. Two.\n\nThree. Four. Five.");
        assert_eq!(b.cut_point(0, 20), 11);
    }

    #[test]
    fn test_latest_boundary_in_level_wins() {
        let b = analyze("One. Two. Three. Four.");
        assert_eq!(b.cut_point(0, 18), 17);
    }

    #[test]
    fn test_boundary_at_floor_is_ignored() {
        let b = analyze("aaaa bbbbbbbbbbbb");
        assert_eq!(b.cut_point(5, 12), 12);
    }
}
