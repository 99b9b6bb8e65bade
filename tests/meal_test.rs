// ABOUTME: Integration tests for meal context validation, household files and brief composition
// ABOUTME: Uses temporary household files to exercise loading and strict eater checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::io::Write;

use jarvis_core::config::{PipelineConfig, PipelineVariant};
use jarvis_core::errors::{ErrorCategory, ErrorCode};
use jarvis_core::llm::parse_structured;
use jarvis_core::meal::{
    Complexity, ContextValidator, CookingDuration, Household, InstructionComposer,
    MealContextInput, Season, StructuredRecipe, TimeOfDay,
};
use jarvis_core::test_utils::{dinner_for, sample_recipe_json};
use jarvis_core::workflow::compose_brief;
use serde_json::json;
use tempfile::NamedTempFile;

const SMALL_HOUSEHOLD: &str = r"
familyName: Martin
country: Canada
language: English
globalAsk: Quick weeknight food.
cookLevel: Beginner.
members:
  - name: Alex
    notes: Vegetarian.
    exclusions: [meat, fish]
  - name: Sam
    notes: Allergic to nuts.
    exclusions: [peanuts, walnuts]
";

fn household_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// =============================================================================
// Context Validation
// =============================================================================

#[test]
fn test_input_accepts_camel_case_and_legacy_names() {
    let input: MealContextInput = serde_json::from_value(json!({
        "timeOfDay": "Lunch",
        "membersEating": ["Marie", "Guillaume"],
        "complexity": "medium",
        "cookingDuration": "long",
        "season": "winter",
        "mealPlannerInstructions": "Use the leftover squash"
    }))
    .unwrap();

    let household = Household::embedded().unwrap();
    let context = ContextValidator::new(&household, true)
        .validate(&input)
        .unwrap();

    assert_eq!(context.time_of_day(), TimeOfDay::Lunch);
    assert_eq!(context.complexity(), Complexity::Medium);
    assert_eq!(context.duration(), CookingDuration::Long);
    assert_eq!(context.season(), Some(Season::Winter));
    assert_eq!(context.planner_instructions(), Some("Use the leftover squash"));
    // Unset country and language come from the household
    assert_eq!(context.country(), "France");
    assert_eq!(context.language(), "French");
}

#[test]
fn test_out_of_set_value_is_invalid_input() {
    let household = Household::embedded().unwrap();
    let input = MealContextInput {
        time_of_day: Some("brunch".to_owned()),
        ..dinner_for(&["Marie"])
    };

    let err = ContextValidator::new(&household, false)
        .validate(&input)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.category(), ErrorCategory::InputValidation);
    assert!(err.message.contains("breakfast, lunch, dinner"));
}

#[test]
fn test_duplicate_eaters_are_collapsed() {
    let household = Household::embedded().unwrap();
    let context = ContextValidator::new(&household, false)
        .validate(&dinner_for(&["Marie", "marie", "Zoe"]))
        .unwrap();

    assert_eq!(context.eaters(), ["Marie".to_owned(), "Zoe".to_owned()]);
    assert!(context.is_eating("MARIE"));
}

#[test]
fn test_blank_eater_is_rejected() {
    let household = Household::embedded().unwrap();
    let err = ContextValidator::new(&household, false)
        .validate(&dinner_for(&["Marie", "  "]))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_missing_duration_names_the_field() {
    let household = Household::embedded().unwrap();
    let input = MealContextInput {
        duration: None,
        ..dinner_for(&["Marie"])
    };

    let err = ContextValidator::new(&household, false)
        .validate(&input)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    assert!(err.message.contains("duration"));
}

// =============================================================================
// Household Files
// =============================================================================

#[tokio::test]
async fn test_household_file_is_loaded_from_config() {
    let file = household_file(SMALL_HOUSEHOLD);
    let config = PipelineConfig {
        household_file: Some(file.path().to_path_buf()),
        ..PipelineConfig::default()
    };

    let household = Household::from_config(&config).await.unwrap();

    assert_eq!(household.family_name, "Martin");
    assert_eq!(household.member_names(), vec!["Alex", "Sam"]);
    assert!(household.ingredient_mandate.is_none());
}

#[tokio::test]
async fn test_missing_household_file_is_config_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Household::load(&dir.path().join("nope.yaml"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn test_household_with_duplicate_members_is_invalid() {
    let file = household_file(
        "familyName: X\ncountry: France\nlanguage: French\nglobalAsk: a\ncookLevel: b\n\
         members:\n  - name: Ana\n    notes: ''\n    exclusions: []\n  - name: ana\n    notes: ''\n    exclusions: []\n",
    );

    let err = Household::load(file.path()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[tokio::test]
async fn test_malformed_household_is_invalid() {
    let file = household_file("familyName: [unterminated");
    let err = Household::load(file.path()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn test_brief_for_custom_household() {
    let household = Household::from_yaml_str(SMALL_HOUSEHOLD).unwrap();
    let input = MealContextInput {
        country: None,
        language: None,
        ..dinner_for(&["Sam"])
    };

    let brief = compose_brief(&household, PipelineVariant::Reviewed, &input).unwrap();
    let text = brief.as_str();

    assert!(text.contains("<Sam>"));
    assert!(!text.contains("<Alex>"));
    assert!(text.contains("peanuts, walnuts"));
    assert!(!text.contains("fish"));
    assert!(text.contains("written in English, using the units of Canada"));
}

#[test]
fn test_direct_brief_rejects_outsider() {
    let household = Household::from_yaml_str(SMALL_HOUSEHOLD).unwrap();
    let err = compose_brief(&household, PipelineVariant::Direct, &dinner_for(&["Marie"]))
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.context.details["accepted"], json!(["Alex", "Sam"]));
}

#[test]
fn test_restrictions_cover_every_eater() {
    let household = Household::from_yaml_str(SMALL_HOUSEHOLD).unwrap();
    let context = ContextValidator::new(&household, true)
        .validate(&dinner_for(&["Alex", "Sam"]))
        .unwrap();

    let composer = InstructionComposer::new(&household, false);
    assert_eq!(
        composer.restriction_terms(&context),
        vec!["meat", "fish", "peanuts", "walnuts"]
    );
    assert_eq!(composer.eating_profiles(&context).len(), 2);
}

#[test]
fn test_no_restrictions_section_without_terms() {
    let household = Household::embedded().unwrap();
    let brief = compose_brief(
        &household,
        PipelineVariant::Reviewed,
        &dinner_for(&["Guillaume"]),
    )
    .unwrap();

    assert!(!brief.as_str().contains("# Restrictions"));
    assert!(!brief.as_str().contains("# Ingredient mandate"));
}

// =============================================================================
// Recipe Schema
// =============================================================================

#[test]
fn test_sample_recipe_parses() {
    let recipe: StructuredRecipe = parse_structured(sample_recipe_json()).unwrap();

    assert_eq!(recipe.servings, 1);
    assert_eq!(recipe.meal_type, TimeOfDay::Dinner);
    assert_eq!(recipe.ingredient_count(), 2);
    assert_eq!(recipe.step_count(), 2);
}

#[test]
fn test_recipe_with_blank_step_is_rejected() {
    let mut value = sample_recipe_json();
    value["instructionGroups"][0]["steps"] = json!(["Chop", " "]);

    let err = parse_structured::<StructuredRecipe>(value).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}

#[test]
fn test_recipe_with_unknown_meal_type_is_rejected() {
    let mut value = sample_recipe_json();
    value["mealType"] = json!("supper");

    let err = parse_structured::<StructuredRecipe>(value).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}
