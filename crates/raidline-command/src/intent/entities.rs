//! Entity extraction: item types, item ids, target states, titles,
//! priorities and statuses.

use regex::Regex;
use std::sync::LazyLock;

use raidline_core::types::{ItemStatus, ItemType, Priority};

// Synonyms are matched against whole words of the normalized text.
static TYPE_SYNONYMS: &[(&str, ItemType)] = &[
    ("risk", ItemType::Risk),
    ("risks", ItemType::Risk),
    ("threat", ItemType::Risk),
    ("threats", ItemType::Risk),
    ("assumption", ItemType::Assumption),
    ("assumptions", ItemType::Assumption),
    ("issue", ItemType::Issue),
    ("issues", ItemType::Issue),
    ("problem", ItemType::Issue),
    ("problems", ItemType::Issue),
    ("dependency", ItemType::Dependency),
    ("dependencies", ItemType::Dependency),
    ("dependancy", ItemType::Dependency),
    ("dependancies", ItemType::Dependency),
    ("dep", ItemType::Dependency),
    ("deps", ItemType::Dependency),
];

static ITEM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(RAID|[RAID])-(\d+)\b").unwrap());

static ITEM_ID_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(RAID|[RAID])-(\d+)$").unwrap());

// Applied to the whitespace-collapsed original so the token keeps its case.
static TARGET_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:transition(?:\s+(?:the\s+)?\w+)?|move(?:\s+it|\s+the\s+project|\s+project)?|(?:change|set)\s+(?:the\s+)?(?:workflow\s+|project\s+)?(?:state|status))\s+to\s+(\S+)",
    )
    .unwrap()
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“]([^"”]+)["”]"#).unwrap());

static PRIORITY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bpriority\s*(?::|=)?\s*(?:to\s+|of\s+)?(low|medium|high|critical)\b",
        r"\b(low|medium|high|critical)[\s-]priority\b",
        r"\bpriority\b[^.]*?\bto\s+(low|medium|high|critical)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static STATUS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bstatus\s*(?::|=)?\s*(?:to\s+)?(open|in[\s_-]?progress|resolved|closed)\b",
        r"\bas\s+(open|in[\s_-]?progress|resolved|closed)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case and collapse whitespace.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Look up a single word in the type synonym table.
pub fn lookup_item_type(word: &str) -> Option<ItemType> {
    let word = word.trim().to_lowercase();
    TYPE_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == word)
        .map(|(_, item_type)| *item_type)
}

/// First word of the normalized text that names an item type.
pub fn extract_item_type(normalized: &str) -> Option<ItemType> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .find_map(lookup_item_type)
}

/// First `PREFIX-NUMBER` id in the text, upper-cased.
pub fn extract_item_id(text: &str) -> Option<String> {
    ITEM_ID_RE
        .captures(text)
        .map(|caps| format!("{}-{}", caps[1].to_uppercase(), &caps[2]))
}

/// Normalize a full id reply, or `None` if it is not an id.
pub fn parse_item_id(raw: &str) -> Option<String> {
    ITEM_ID_EXACT_RE
        .captures(raw.trim())
        .map(|caps| format!("{}-{}", caps[1].to_uppercase(), &caps[2]))
}

/// Target workflow state bound by "transition to X" and similar phrases.
///
/// The token is returned as written; only trailing sentence punctuation and
/// quotes are dropped.
pub fn extract_target_state(collapsed: &str) -> Option<String> {
    let caps = TARGET_STATE_RE.captures(collapsed)?;
    let token = caps[1]
        .trim_end_matches(['.', ',', '!', '?', ';', ':'])
        .trim_matches(['"', '\'', '“', '”']);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// First double-quoted span, used as an item title.
pub fn extract_title(text: &str) -> Option<String> {
    TITLE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn extract_priority(normalized: &str) -> Option<Priority> {
    PRIORITY_RES
        .iter()
        .find_map(|re| re.captures(normalized))
        .and_then(|caps| caps[1].parse().ok())
}

pub fn extract_status(normalized: &str) -> Option<ItemStatus> {
    STATUS_RES
        .iter()
        .find_map(|re| re.captures(normalized))
        .and_then(|caps| caps[1].parse().ok())
}
