use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

const TRAIL: &str = "…";

pub trait PrettyTruncator {
    /// Truncates to at most `new_len` graphemes, trailing with an ellipsis
    /// when anything was cut.
    fn pretty_truncate(&self, new_len: usize) -> Cow<str>;
}

impl PrettyTruncator for str {
    fn pretty_truncate(&self, new_len: usize) -> Cow<str> {
        if self.graphemes(true).count() <= new_len {
            return Cow::Borrowed(self);
        }

        let kept = new_len.saturating_sub(1);
        let mut truncated = self
            .graphemes(true)
            .take(kept)
            .collect::<String>();
        truncated.push_str(TRAIL);
        Cow::Owned(truncated)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::PrettyTruncator;

    #[rstest]
    #[case("", "")]
    #[case("1", "1")]
    #[case("234", "234")]
    #[case("5678", "56…")]
    #[case("竪琴を弾く", "竪琴…")]
    fn string_pretty_truncate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.pretty_truncate(3), expected);
    }
}
