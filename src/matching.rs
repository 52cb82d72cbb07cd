use crate::mapping::PromptMapping;

/// Result of looking a sample prompt up in the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'m> {
    Matched(&'m str),
    Unmatched,
    /// Every key that matched, in mapping order.
    Ambiguous(Vec<&'m str>),
}

pub trait PromptMatcher {
    fn name(&self) -> &'static str;
    fn matches(&self, key: &str, prompt: &str) -> bool;

    fn resolve<'m>(&self, mapping: &'m PromptMapping, prompt: &str) -> Resolution<'m> {
        scan(self, mapping, prompt)
    }
}

/// Tests every key against the prompt.
fn scan<'m, M: PromptMatcher + ?Sized>(
    matcher: &M,
    mapping: &'m PromptMapping,
    prompt: &str,
) -> Resolution<'m> {
    let mut hits: Vec<(&'m str, &'m str)> = mapping
        .iter()
        .filter(|(key, _)| matcher.matches(key, prompt))
        .collect();

    match hits.len() {
        0 => Resolution::Unmatched,
        1 => Resolution::Matched(hits.remove(0).1),
        _ => Resolution::Ambiguous(hits.into_iter().map(|(key, _)| key).collect()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MatchMode {
    /// A key matches when it occurs anywhere in the prompt
    Contains,
    /// A key matches only when it equals the prompt
    Exact,
}

/// Substring containment: key must appear somewhere inside the prompt. An empty key
/// never matches.
pub struct ContainmentMatcher {
    pub ignore_case: bool,
}

impl PromptMatcher for ContainmentMatcher {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn matches(&self, key: &str, prompt: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        if self.ignore_case {
            prompt.to_lowercase().contains(&key.to_lowercase())
        } else {
            prompt.contains(key)
        }
    }
}

pub struct ExactMatcher {
    pub ignore_case: bool,
}

impl PromptMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn matches(&self, key: &str, prompt: &str) -> bool {
        if self.ignore_case {
            key.to_lowercase() == prompt.to_lowercase()
        } else {
            key == prompt
        }
    }

    // Case-sensitive exact lookup can use the map directly; keys are unique.
    fn resolve<'m>(&self, mapping: &'m PromptMapping, prompt: &str) -> Resolution<'m> {
        if self.ignore_case {
            return scan(self, mapping, prompt);
        }
        match mapping.get(prompt) {
            Some(stem) => Resolution::Matched(stem),
            None => Resolution::Unmatched,
        }
    }
}

pub fn matcher_for(mode: MatchMode, ignore_case: bool) -> Box<dyn PromptMatcher> {
    match mode {
        MatchMode::Contains => Box::new(ContainmentMatcher { ignore_case }),
        MatchMode::Exact => Box::new(ExactMatcher { ignore_case }),
    }
}
