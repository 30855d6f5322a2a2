//! Phrase patterns for command classification.
//!
//! One group of compiled regexes per command kind. Groups are checked in a
//! fixed priority order so that, for example, "create a risk" is never read
//! as an edit.

use regex::Regex;

use crate::types::CommandKind;

// Optional article and priority between a create verb and the item noun.
const ITEM_QUALIFIERS: &str = r"(?:(?:a|an|the|new|this|that|another|one)\s+)?(?:(?:low|medium|high|critical)(?:[\s-]priority)?\s+)?(?:new\s+)?";

const ITEM_NOUNS: &str = r"(?:risks?|threats?|assumptions?|issues?|problems?|dependenc(?:y|ies)|dependanc(?:y|ies)|deps?|items?|raid)\b";

/// A command kind and the phrases that signal it.
pub struct PhraseGroup {
    pub kind: CommandKind,
    pub patterns: Vec<Regex>,
}

/// All phrase groups in priority order, compiled once and reused.
///
/// Patterns run against normalized text (lower case, single spaces).
pub struct PhraseSet {
    groups: Vec<PhraseGroup>,
}

impl Default for PhraseSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseSet {
    /// Create a new PhraseSet with all compiled patterns.
    pub fn new() -> Self {
        let mk = |pats: &[&str]| -> Vec<Regex> {
            pats.iter()
                .map(|p| Regex::new(p).expect("Invalid command regex"))
                .collect()
        };

        let verb_then_item = format!(
            r"\b(?:add|raise|log|record|register|open)\s+{}{}",
            ITEM_QUALIFIERS, ITEM_NOUNS
        );

        let groups = vec![
            // =================================================================
            // Create (checked first)
            // =================================================================
            PhraseGroup {
                kind: CommandKind::CreateItem,
                patterns: mk(&[
                    r"\bcreate\b",
                    // Any position, as long as an item noun follows the verb
                    verb_then_item.as_str(),
                    // Bare "log"/"record" only as an imperative, so "the risk log" stays a noun
                    r"(?:^|\b(?:please|to|you|let's|lets)\s+)(?:log|record|register)\b",
                    r"^new\b",
                    r"\b(?:a|an)\s+new\b",
                ]),
            },
            // =================================================================
            // Edit
            // =================================================================
            PhraseGroup {
                kind: CommandKind::EditItem,
                patterns: mk(&[
                    r"\b(?:edit|update|modify|amend|rename)\b",
                    r"\bchange\s+(?:the\s+)?(?:risk|assumption|issue|dependency|item|raid\s+item)\b",
                    r"\bchange\s+(?:raid|[raid])-\d+\b",
                    r"\bmark\s+(?:raid|[raid])-\d+\s+as\b",
                    r"\b(?:raise|lower|bump|increase|decrease)\s+(?:the\s+|its\s+)?priority\b",
                ]),
            },
            // =================================================================
            // List
            // =================================================================
            PhraseGroup {
                kind: CommandKind::ListItems,
                patterns: mk(&[
                    r"\b(?:list|show|display|view|find)\b",
                    r"\bwhat\s+are\s+(?:the|our|my|all)\b",
                    r"\bwhich\s+(?:risks|assumptions|issues|dependencies|items)\b",
                    r"\bhow\s+many\b",
                ]),
            },
            // =================================================================
            // Workflow transition
            // =================================================================
            PhraseGroup {
                kind: CommandKind::TransitionWorkflow,
                patterns: mk(&[
                    r"\btransition\b",
                    r"\bmove\s+(?:it\s+|the\s+project\s+|project\s+)?to\b",
                    r"\b(?:change|set)\s+(?:the\s+)?(?:workflow\s+|project\s+)?(?:state|status)\b",
                    r"\badvance\s+(?:the\s+)?workflow\b",
                ]),
            },
        ];

        Self { groups }
    }

    /// Return the first kind, in priority order, with a matching phrase.
    pub fn match_kind(&self, normalized: &str) -> Option<CommandKind> {
        self.groups
            .iter()
            .find(|group| group.patterns.iter().any(|re| re.is_match(normalized)))
            .map(|group| group.kind)
    }

    /// Kinds in the order they are checked.
    pub fn priority_order(&self) -> Vec<CommandKind> {
        self.groups.iter().map(|g| g.kind).collect()
    }
}
