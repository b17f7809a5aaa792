//! Prompt templates for the generation call and the guardrail classifiers.

/// System prompt for the primary generation call
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// System prompt for the topical classifier
pub const TOPICAL_GUARDRAIL_PROMPT: &str = "Your role is to assess whether the user question is allowed or not. \
The allowed topics are cats and dogs. If the topic is allowed, say 'allowed' otherwise say 'not_allowed'";

/// Build a topical classifier prompt for an arbitrary list of allowed topics.
pub fn topical_prompt_for(topics: &[&str]) -> String {
    let topics = match topics {
        [] => "none".to_string(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    };
    format!(
        "Your role is to assess whether the user question is allowed or not. \
The allowed topics are {topics}. If the topic is allowed, say 'allowed' otherwise say 'not_allowed'"
    )
}

pub const DEFAULT_MODERATION_DOMAIN: &str = "animal breed recommendation";

pub const DEFAULT_MODERATION_CRITERIA: &str = "Assess the presence of explicit recommendation of cat or dog breeds in the content.
The content should contain only general advice about cats and dogs, not specific breeds to purchase.";

pub const DEFAULT_MODERATION_STEPS: &str = "1. Read the content and the criteria carefully.
2. Assess how much explicit recommendation of cat or dog breeds is contained in the content.
3. Assign an animal advice score from 1 to 5, with 1 being no explicit cat or dog breed advice, and 5 being multiple named cat or dog breeds.";

/// Scoring rubric handed to the moderation classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRubric {
    pub domain: String,
    pub criteria: String,
    pub steps: String,
}

impl Default for ModerationRubric {
    fn default() -> Self {
        Self {
            domain: DEFAULT_MODERATION_DOMAIN.to_string(),
            criteria: DEFAULT_MODERATION_CRITERIA.to_string(),
            steps: DEFAULT_MODERATION_STEPS.to_string(),
        }
    }
}

impl ModerationRubric {
    pub fn new(
        domain: impl Into<String>,
        criteria: impl Into<String>,
        steps: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            criteria: criteria.into(),
            steps: steps.into(),
        }
    }

    /// Full classifier prompt for `content`.
    pub fn render(&self, content: &str) -> String {
        let Self {
            domain,
            criteria,
            steps,
        } = self;
        format!(
            "You are a moderation assistant. Your role is to detect content about {domain} in the text provided, and mark the severity of that content.

## {domain}

### Criteria

{criteria}

### Instructions

{steps}

### Content

{content}

### Evaluation (score only!)"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topical_prompt_lists_topics() {
        assert!(topical_prompt_for(&["cats", "dogs"]).contains("The allowed topics are cats and dogs."));
        assert!(
            topical_prompt_for(&["rust", "go", "zig"]).contains("The allowed topics are rust, go and zig.")
        );
        assert_eq!(topical_prompt_for(&["cats", "dogs"]), TOPICAL_GUARDRAIL_PROMPT);
    }

    #[test]
    fn rubric_renders_all_sections_in_order() {
        let prompt = ModerationRubric::new("finance", "No stock tips.", "1. Score it.")
            .render("Buy ACME now.");
        let sections = [
            "detect content about finance",
            "## finance",
            "### Criteria\n\nNo stock tips.",
            "### Instructions\n\n1. Score it.",
            "### Content\n\nBuy ACME now.",
            "### Evaluation (score only!)",
        ];
        let mut cursor = 0;
        for section in sections {
            let at = prompt[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing or out of order: {section}"));
            cursor += at + section.len();
        }
    }
}
