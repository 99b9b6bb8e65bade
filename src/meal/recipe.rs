// ABOUTME: Structured recipe and review verdict schemas produced by schema-constrained generation
// ABOUTME: Defines StructuredRecipe, IngredientGroup, InstructionGroup, ReviewVerdict and their checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::context::{Complexity, TimeOfDay};
use crate::llm::StructuredOutput;

/// One ingredient line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ingredient {
    /// The name of the ingredient only, without preparation details (no "diced", "minced", ...)
    pub name: String,
    /// The quantity of the ingredient
    pub quantity: String,
    /// The unit of the quantity, in the units of the family's country
    pub unit: String,
}

/// Ingredients used by one part of the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IngredientGroup {
    /// What part of the recipe these ingredients are used for
    pub label: String,
    /// The ingredients of this part, in order
    pub ingredients: Vec<Ingredient>,
}

/// Steps for one part of the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstructionGroup {
    /// Title of this part of the instructions
    pub title: String,
    /// The steps, in order, without step numbers
    pub steps: Vec<String>,
}

/// Final, schema-validated recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StructuredRecipe {
    /// The name of the recipe
    pub name: String,
    /// A short description of the recipe
    pub description: String,
    /// The number of people the recipe is for
    pub servings: u32,
    /// The type of meal
    pub meal_type: TimeOfDay,
    /// The complexity of the recipe
    pub complexity: Complexity,
    /// Total time to prepare the recipe, in minutes
    pub duration_minutes: u32,
    /// Special utensils required (basic utensils are not listed)
    pub utensils: Vec<String>,
    /// Ingredients grouped by recipe part
    pub ingredient_groups: Vec<IngredientGroup>,
    /// Instructions grouped by recipe part
    pub instruction_groups: Vec<InstructionGroup>,
    /// Additional notes for the cook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl StructuredRecipe {
    /// Total number of ingredient lines across groups
    #[must_use]
    pub fn ingredient_count(&self) -> usize {
        self.ingredient_groups.iter().map(|g| g.ingredients.len()).sum()
    }

    /// Total number of steps across groups
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.instruction_groups.iter().map(|g| g.steps.len()).sum()
    }
}

impl StructuredOutput for StructuredRecipe {
    const SCHEMA_NAME: &'static str = "StructuredRecipe";

    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be blank".to_owned());
        }
        if self.servings == 0 {
            return Err("servings must be at least 1".to_owned());
        }
        if self.duration_minutes == 0 {
            return Err("durationMinutes must be at least 1".to_owned());
        }
        if self.ingredient_count() == 0 {
            return Err("at least one ingredient is required".to_owned());
        }
        if self.step_count() == 0 {
            return Err("at least one instruction step is required".to_owned());
        }
        if let Some(group) = self
            .ingredient_groups
            .iter()
            .find(|g| g.ingredients.iter().any(|i| i.name.trim().is_empty()))
        {
            return Err(format!(
                "ingredient group '{}' has an ingredient without a name",
                group.label
            ));
        }
        if let Some(group) = self
            .instruction_groups
            .iter()
            .find(|g| g.steps.iter().any(|s| s.trim().is_empty()))
        {
            return Err(format!(
                "instruction group '{}' has a blank step",
                group.title
            ));
        }
        Ok(())
    }
}

/// Sous-chef verdict on a drafted recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewVerdict {
    /// True if the recipe is good as it is, false if it needs changes
    pub accepted: bool,
    /// Only when the recipe is not good: what must change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl StructuredOutput for ReviewVerdict {
    const SCHEMA_NAME: &'static str = "ReviewVerdict";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe_json() -> serde_json::Value {
        json!({
            "name": "Poulet effiloché aux carottes",
            "description": "Pulled chicken with glazed carrots",
            "servings": 2,
            "mealType": "dinner",
            "complexity": "easy",
            "durationMinutes": 30,
            "utensils": ["cocotte"],
            "ingredientGroups": [{
                "label": "Chicken",
                "ingredients": [{ "name": "chicken breast", "quantity": "300", "unit": "g" }]
            }],
            "instructionGroups": [{
                "title": "Cooking",
                "steps": ["Poach the chicken", "Shred and serve"]
            }]
        })
    }

    #[test]
    fn test_recipe_deserializes_and_checks() {
        let recipe: StructuredRecipe = serde_json::from_value(recipe_json()).unwrap();
        assert_eq!(recipe.meal_type, TimeOfDay::Dinner);
        assert_eq!(recipe.ingredient_count(), 1);
        assert_eq!(recipe.step_count(), 2);
        assert!(recipe.notes.is_none());
        assert!(recipe.check().is_ok());
    }

    #[test]
    fn test_recipe_rejects_unknown_fields() {
        let mut value = recipe_json();
        value["calories"] = json!(500);
        assert!(serde_json::from_value::<StructuredRecipe>(value).is_err());
    }

    #[test]
    fn test_recipe_semantic_checks() {
        let mut recipe: StructuredRecipe = serde_json::from_value(recipe_json()).unwrap();
        recipe.servings = 0;
        assert!(recipe.check().unwrap_err().contains("servings"));

        let mut recipe: StructuredRecipe = serde_json::from_value(recipe_json()).unwrap();
        recipe.instruction_groups[0].steps.push("  ".to_owned());
        assert!(recipe.check().unwrap_err().contains("blank step"));

        let mut recipe: StructuredRecipe = serde_json::from_value(recipe_json()).unwrap();
        recipe.ingredient_groups.clear();
        assert!(recipe.check().is_err());
    }

    #[test]
    fn test_verdict_feedback_optional() {
        let verdict: ReviewVerdict = serde_json::from_value(json!({ "accepted": true })).unwrap();
        assert!(verdict.accepted);
        assert!(verdict.feedback.is_none());
    }
}
