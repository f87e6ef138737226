//! Transcript cleanup.
//!
//! Whisper output for casual Japanese speech is full of filler words; strip
//! the common ones and normalize punctuation before the transcript is stored
//! or replied.

use once_cell::sync::Lazy;
use regex::Regex;

static FILLERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"あー+",
        r"えー+と?",
        r"うー+ん",
        r"そのー+",
        r"あのー+",
        r"えっ+と",
        r"なんていうか",
        r"なんか",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static REPEATED_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[、。]{2,}").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove filler words and tidy punctuation. Ensures a sentence-final mark.
pub fn clean_transcript(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = text.to_string();
    for pattern in FILLERS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    cleaned = REPEATED_PUNCT
        .replace_all(&cleaned, |caps: &regex::Captures<'_>| {
            caps[0].chars().next().unwrap().to_string()
        })
        .into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    let mut cleaned = cleaned.trim().to_string();

    if !cleaned.is_empty() && !cleaned.ends_with(['。', '！', '？', '.', '!', '?']) {
        cleaned.push('。');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fillers() {
        assert_eq!(clean_transcript("えーと今日は晴れです。"), "今日は晴れです。");
        assert_eq!(clean_transcript("あのー、なんか良い感じ"), "、良い感じ。");
    }

    #[test]
    fn collapses_repeated_punctuation() {
        assert_eq!(clean_transcript("はい。。。そうです"), "はい。そうです。");
    }

    #[test]
    fn appends_final_period() {
        assert_eq!(clean_transcript("了解です"), "了解です。");
        assert_eq!(clean_transcript("了解です！"), "了解です！");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_transcript(""), "");
    }
}
