//! Reading-time estimate for a post body

use crate::cms::model::ContentGroup;

/// Estimated minutes to read a post; shown through the `post.reading_time` translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    /// Estimate from every body block of every section.
    ///
    /// Headings are not counted. An empty body reads in 0 minutes.
    pub fn estimate(sections: &[ContentGroup], words_per_minute: usize) -> Self {
        let text = sections
            .iter()
            .map(|section| {
                section
                    .body
                    .iter()
                    .map(|block| block.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" ");

        let words = text.split_whitespace().count();
        Self::from_words(words, words_per_minute)
    }

    pub fn from_words(words: usize, words_per_minute: usize) -> Self {
        let minutes = if words_per_minute == 0 {
            0
        } else {
            words.div_ceil(words_per_minute)
        };
        Self { words, minutes }
    }
}
