// ABOUTME: Prompt renderers for the drafting, review, revision and formatting steps of the workflow
// ABOUTME: Also maps a review verdict onto the accept-or-revise decision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use serde::{Deserialize, Serialize};

use crate::meal::{ComposedInstructions, MealContext, ReviewVerdict};

/// Feedback used when the reviewer rejects a draft without saying why
pub const GENERIC_REVISION_FEEDBACK: &str = "The sous chef did not accept this recipe but gave no details. \
Check it again against every rule of the brief (restrictions, cook level, duration, servings, language and units) \
and fix whatever does not comply.";

/// Outcome of the review step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RevisionDecision {
    /// Draft goes to the formatter unchanged
    Accepted,
    /// Draft goes back to the chef once with this feedback
    NeedsRevision {
        /// What must change
        feedback: String,
    },
}

impl RevisionDecision {
    /// True when a revision call will be made
    #[must_use]
    pub const fn needs_revision(&self) -> bool {
        matches!(self, Self::NeedsRevision { .. })
    }
}

impl From<ReviewVerdict> for RevisionDecision {
    fn from(verdict: ReviewVerdict) -> Self {
        if verdict.accepted {
            return Self::Accepted;
        }
        let feedback = verdict
            .feedback
            .map(|f| f.trim().to_owned())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| GENERIC_REVISION_FEEDBACK.to_owned());
        Self::NeedsRevision { feedback }
    }
}

/// Prompt for the chef's first draft
#[must_use]
pub fn draft_prompt(instructions: &ComposedInstructions, context: &MealContext) -> String {
    format!(
        "{instructions}
# Instructions
Now that you know the family and the people who will be eating, create a meal for them that matches the cook level.

# Recipe
The recipe must contain:
- Name
- Description
- Number of people: {servings}
- Meal type: {meal_type}
- Complexity: {complexity}
- Total time, within {duration}
- Special utensils, if any (do not list basic utensils)
- Ingredients grouped by recipe part, each with a quantity and a unit
- Instructions grouped by recipe part
- Notes for the cook (optional)

# Rules
- Write the recipe in {language}, with the units used in {country}.
- Cook for exactly the number of people eating.
- Do not mention the family members: the recipe must be usable by anyone.
",
        servings = context.eaters().len(),
        meal_type = context.time_of_day(),
        complexity = context.complexity(),
        duration = context.duration().description(),
        language = context.language(),
        country = context.country(),
    )
}

/// Prompt for the sous chef's review
#[must_use]
pub fn review_prompt(instructions: &ComposedInstructions, draft: &str) -> String {
    format!(
        "{instructions}
# Recipe created by the chef
{draft}

# Your responsibilities
- Check that the cooking steps flow logically and consistently.
- Check that every ingredient and technique respects the restrictions and preferences above.
- Check that times, temperatures and measurements are accurate and realistic.
- Check that the recipe matches the meal planner's requests and the context.
- Point out mistakes or unclear instructions.
- If the recipe is good, accept it without looking for changes.

# Instructions
Give your verdict on the recipe. Only when it is not accepted, explain what must change.
"
    )
}

/// Prompt for the chef's single revision
#[must_use]
pub fn revision_prompt(instructions: &ComposedInstructions, draft: &str, feedback: &str) -> String {
    format!(
        "{instructions}
# Recipe you created
{draft}

# Review of the recipe by the sous chef
{feedback}

# Instructions
Correct the recipe based on the review of your sous chef. Give the complete corrected recipe.
"
    )
}

/// Prompt for the formatter
#[must_use]
pub fn format_prompt(draft: &str) -> String {
    format!(
        "# Recipe
{draft}

# Instructions
Convert the recipe to a JSON object. Keep its content exactly as written.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_verdict() {
        let decision = RevisionDecision::from(ReviewVerdict {
            accepted: true,
            feedback: Some("Looks great".to_owned()),
        });
        assert_eq!(decision, RevisionDecision::Accepted);
        assert!(!decision.needs_revision());
    }

    #[test]
    fn test_rejected_verdict_keeps_feedback() {
        let decision = RevisionDecision::from(ReviewVerdict {
            accepted: false,
            feedback: Some("  Remove the pepper.  ".to_owned()),
        });
        assert_eq!(
            decision,
            RevisionDecision::NeedsRevision {
                feedback: "Remove the pepper.".to_owned()
            }
        );
    }

    #[test]
    fn test_rejected_verdict_without_feedback() {
        for feedback in [None, Some("   ".to_owned())] {
            let decision = RevisionDecision::from(ReviewVerdict {
                accepted: false,
                feedback,
            });
            assert_eq!(
                decision,
                RevisionDecision::NeedsRevision {
                    feedback: GENERIC_REVISION_FEEDBACK.to_owned()
                }
            );
        }
    }

    #[test]
    fn test_revision_prompt_carries_feedback() {
        let household = crate::meal::Household::embedded().unwrap();
        let input = crate::meal::MealContextInput {
            time_of_day: Some("lunch".to_owned()),
            eaters: Some(vec!["Marie".to_owned()]),
            complexity: Some("easy".to_owned()),
            duration: Some("short".to_owned()),
            ..Default::default()
        };
        let context = crate::meal::ContextValidator::new(&household, false)
            .validate(&input)
            .unwrap();
        let instructions =
            crate::meal::InstructionComposer::new(&household, false).compose(&context);

        let prompt = revision_prompt(&instructions, "DRAFT", "Use less salt");
        assert!(prompt.starts_with(instructions.as_str()));
        assert!(prompt.contains("DRAFT"));
        assert!(prompt.contains("Use less salt"));

        let draft = draft_prompt(&instructions, &context);
        assert!(draft.contains("Number of people: 1"));
        assert!(draft.contains("Meal type: lunch"));
        assert!(draft.contains("in French"));
    }
}
