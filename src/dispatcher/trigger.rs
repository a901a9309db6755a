//! Hebrew trigger phrase recognition.

use regex::Regex;
use std::sync::LazyLock;

/// Strict form: "תחפש [לי] את ה<keyword>", with the definite article.
static ARTICLE_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^תחפש(?:\s+לי)?\s+את\s+ה(.+)").expect("article trigger pattern is valid")
});

/// Loose form: "תחפש [לי] <keyword>", no article required.
static BARE_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^תחפש(?:\s+לי)?\s+(.+)").expect("bare trigger pattern is valid")
});

/// A recognized search trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TriggerMatch {
    pub keyword: String,
}

/// Match the Hebrew search trigger against a trimmed message body.
///
/// The stricter article form is tried first, then the looser form
/// without it. A keyword that is empty after trimming counts as no
/// match at all, so the message is discarded silently.
pub(super) fn match_trigger(text: &str) -> Option<TriggerMatch> {
    let captures = ARTICLE_TRIGGER
        .captures(text)
        .or_else(|| BARE_TRIGGER.captures(text))?;

    let keyword = captures.get(1)?.as_str().trim();
    if keyword.is_empty() {
        return None;
    }

    Some(TriggerMatch {
        keyword: keyword.to_string(),
    })
}
