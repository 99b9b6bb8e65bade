// ABOUTME: Meal domain: context validation, household data, instruction composition and recipe schemas
// ABOUTME: Everything here is pure data or pure functions; no model calls happen in this module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

mod context;
mod household;
mod instructions;
mod recipe;

pub use context::{
    Complexity, ContextValidator, CookingDuration, EnumeratedField, MealContext,
    MealContextInput, Season, TimeOfDay,
};
pub use household::{EaterProfile, Household};
pub use instructions::{ComposedInstructions, InstructionComposer};
pub use recipe::{Ingredient, IngredientGroup, InstructionGroup, ReviewVerdict, StructuredRecipe};
