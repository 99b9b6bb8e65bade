// ABOUTME: Instruction composer rendering the chef briefing from a meal context and household data
// ABOUTME: Pure and deterministic; merges eater profiles and exclusion terms into one prompt text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use std::fmt::{self, Display, Formatter, Write};

use serde::Serialize;

use super::context::MealContext;
use super::household::{EaterProfile, Household};

/// Briefing text handed to the chef (and re-read by the reviewer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComposedInstructions(String);

impl ComposedInstructions {
    /// Borrow the rendered text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ComposedInstructions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders [`ComposedInstructions`] from a [`MealContext`]
#[derive(Debug, Clone, Copy)]
pub struct InstructionComposer<'a> {
    household: &'a Household,
    render_mandate: bool,
}

impl<'a> InstructionComposer<'a> {
    /// Create a composer; `render_mandate` adds the household ingredient mandate
    #[must_use]
    pub const fn new(household: &'a Household, render_mandate: bool) -> Self {
        Self {
            household,
            render_mandate,
        }
    }

    /// Profiles of eaters present in both the context and the household, in context order
    #[must_use]
    pub fn eating_profiles(&self, context: &MealContext) -> Vec<&'a EaterProfile> {
        context
            .eaters()
            .iter()
            .filter_map(|name| self.household.member(name))
            .collect()
    }

    /// Union of the exclusion terms of every eating profile
    ///
    /// Duplicates are kept: two eaters refusing the same ingredient both
    /// contribute the term.
    #[must_use]
    pub fn restriction_terms(&self, context: &MealContext) -> Vec<&'a str> {
        self.eating_profiles(context)
            .into_iter()
            .flat_map(|p| p.exclusions.iter().map(String::as_str))
            .collect()
    }

    /// Render the briefing
    #[must_use]
    pub fn compose(&self, context: &MealContext) -> ComposedInstructions {
        let household = self.household;
        let profiles = self.eating_profiles(context);
        let guests: Vec<&str> = context
            .eaters()
            .iter()
            .map(String::as_str)
            .filter(|name| household.member(name).is_none())
            .collect();

        let mut out = String::new();

        let _ = writeln!(out, "# Family info");
        let _ = writeln!(
            out,
            "You are creating a meal for the {} family from {}.",
            household.family_name, household.country
        );
        let _ = writeln!(out, "Here are some instructions given by the family:");
        let _ = writeln!(out, "{}", household.global_ask.trim());
        out.push('\n');

        let _ = writeln!(out, "# Cook level");
        let _ = writeln!(out, "{}", household.cook_level.trim());
        out.push('\n');

        let _ = writeln!(out, "# Family members eating");
        let _ = writeln!(
            out,
            "There are {} people who will be eating the meal, here is some info about them:",
            context.eaters().len()
        );
        for profile in &profiles {
            let _ = writeln!(
                out,
                "<{name}>\n{notes}\n</{name}>",
                name = profile.name,
                notes = profile.notes.trim_end()
            );
        }
        if !guests.is_empty() {
            let _ = writeln!(
                out,
                "Also eating, with no known preferences: {}",
                guests.join(", ")
            );
        }
        out.push('\n');

        let terms = self.restriction_terms(context);
        if !terms.is_empty() {
            let _ = writeln!(out, "# Restrictions");
            let _ = writeln!(
                out,
                "The meal must not contain any of the following ingredients: {}.",
                terms.join(", ")
            );
            out.push('\n');
        }

        if self.render_mandate {
            if let Some(mandate) = household.ingredient_mandate.as_deref() {
                let _ = writeln!(out, "# Ingredient mandate");
                let _ = writeln!(out, "{}", mandate.trim());
                out.push('\n');
            }
        }

        if let Some(planner) = context.planner_instructions() {
            let _ = writeln!(out, "# Meal planner instructions");
            let _ = writeln!(out, "{planner}");
            out.push('\n');
        }

        let _ = writeln!(out, "# Context");
        if let Some(season) = context.season() {
            let _ = writeln!(out, "The season is {season}.");
        }
        let _ = writeln!(out, "The meal is for {}.", context.time_of_day());
        let _ = writeln!(out, "The complexity should be {}.", context.complexity());
        let _ = writeln!(
            out,
            "The cooking duration should be {}.",
            context.duration().description()
        );
        let _ = writeln!(
            out,
            "The recipe must be written in {}, using the units of {}.",
            context.language(),
            context.country()
        );

        ComposedInstructions(out)
    }
}
