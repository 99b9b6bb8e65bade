// ABOUTME: Meal context schema and validator for incoming meal creation requests
// ABOUTME: Turns raw caller input into an immutable MealContext or an input-validation error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::household::Household;
use crate::errors::{AppError, AppResult};

/// A closed set of values accepted for one context field
pub trait EnumeratedField: Sized + Copy + 'static {
    /// Field name as exposed to callers
    const FIELD: &'static str;
    /// Every accepted value, in wire form
    const VALUES: &'static [Self];

    /// Wire form of this value
    fn as_str(&self) -> &'static str;

    /// Parse a wire value, ignoring case and surrounding whitespace
    #[must_use]
    fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::VALUES
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(needle))
    }

    /// Comma separated list of accepted values, for error messages
    #[must_use]
    fn accepted() -> String {
        Self::VALUES
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Meal of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
}

impl EnumeratedField for TimeOfDay {
    const FIELD: &'static str = "timeOfDay";
    const VALUES: &'static [Self] = &[Self::Breakfast, Self::Lunch, Self::Dinner];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

/// Season the meal is cooked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// March to May (northern hemisphere)
    Spring,
    /// June to August
    Summer,
    /// September to November
    Autumn,
    /// December to February
    Winter,
}

impl EnumeratedField for Season {
    const FIELD: &'static str = "season";
    const VALUES: &'static [Self] = &[Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

/// How demanding the recipe may be for the cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Few steps, common techniques
    Easy,
    /// Some technique required
    Medium,
    /// Advanced techniques or many components
    Hard,
}

impl EnumeratedField for Complexity {
    const FIELD: &'static str = "complexity";
    const VALUES: &'static [Self] = &[Self::Easy, Self::Medium, Self::Hard];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Cooking-duration class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CookingDuration {
    /// Up to roughly 30 minutes
    Short,
    /// Roughly 30 to 60 minutes
    Medium,
    /// More than an hour
    Long,
}

impl CookingDuration {
    /// Prompt-friendly description of the class
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Short => "short (30 minutes or less)",
            Self::Medium => "medium (between 30 and 60 minutes)",
            Self::Long => "long (more than an hour)",
        }
    }
}

impl EnumeratedField for CookingDuration {
    const FIELD: &'static str = "duration";
    const VALUES: &'static [Self] = &[Self::Short, Self::Medium, Self::Long];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(TimeOfDay, Season, Complexity, CookingDuration);

/// Raw meal creation request as supplied by a caller
///
/// Every field is optional here; [`ContextValidator`] decides what is
/// required. Aliases accept the field names used by older planner clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealContextInput {
    /// breakfast | lunch | dinner
    pub time_of_day: Option<String>,
    /// Names of the people eating
    #[serde(alias = "membersEating")]
    pub eaters: Option<Vec<String>>,
    /// easy | medium | hard
    pub complexity: Option<String>,
    /// short | medium | long
    #[serde(alias = "cookingDuration")]
    pub duration: Option<String>,
    /// Country whose units and habits apply
    pub country: Option<String>,
    /// Language the recipe is written in
    pub language: Option<String>,
    /// spring | summer | autumn | winter
    pub season: Option<String>,
    /// Free text from the meal planner
    #[serde(alias = "mealPlannerInstructions")]
    pub planner_instructions: Option<String>,
}

/// Validated, immutable meal context for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealContext {
    time_of_day: TimeOfDay,
    eaters: Vec<String>,
    complexity: Complexity,
    duration: CookingDuration,
    country: String,
    language: String,
    season: Option<Season>,
    planner_instructions: Option<String>,
}

impl MealContext {
    /// Meal of the day
    #[must_use]
    pub const fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    /// Eater identifiers, in request order, without duplicates
    #[must_use]
    pub fn eaters(&self) -> &[String] {
        &self.eaters
    }

    /// Requested complexity
    #[must_use]
    pub const fn complexity(&self) -> Complexity {
        self.complexity
    }

    /// Requested cooking-duration class
    #[must_use]
    pub const fn duration(&self) -> CookingDuration {
        self.duration
    }

    /// Country whose units apply
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Language of the recipe
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Season, when given
    #[must_use]
    pub const fn season(&self) -> Option<Season> {
        self.season
    }

    /// Planner instructions, when given
    #[must_use]
    pub fn planner_instructions(&self) -> Option<&str> {
        self.planner_instructions.as_deref()
    }

    /// Whether `name` is one of the eaters (case-insensitive)
    #[must_use]
    pub fn is_eating(&self, name: &str) -> bool {
        self.eaters.iter().any(|e| e.eq_ignore_ascii_case(name))
    }
}

/// Validates raw input against the meal context schema
///
/// Validation is pure: it only reads the household table and never performs
/// I/O, so a rejected context never reaches the generative model.
#[derive(Debug, Clone, Copy)]
pub struct ContextValidator<'a> {
    household: &'a Household,
    strict_eaters: bool,
}

impl<'a> ContextValidator<'a> {
    /// Create a validator; `strict_eaters` rejects eaters unknown to the household
    #[must_use]
    pub const fn new(household: &'a Household, strict_eaters: bool) -> Self {
        Self {
            household,
            strict_eaters,
        }
    }

    /// Validate `input` into a [`MealContext`]
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if `timeOfDay`, `eaters`, `complexity` or
    ///   `duration` is absent
    /// - `InvalidInput` if an enumerated value is outside its set, the eaters
    ///   list is empty or holds a blank name, or (strict mode) an eater is not
    ///   part of the household
    pub fn validate(&self, input: &MealContextInput) -> AppResult<MealContext> {
        let time_of_day = required::<TimeOfDay>(input.time_of_day.as_deref())?;
        let complexity = required::<Complexity>(input.complexity.as_deref())?;
        let duration = required::<CookingDuration>(input.duration.as_deref())?;
        let season = optional::<Season>(input.season.as_deref())?;
        let eaters = self.validate_eaters(input.eaters.as_deref())?;

        let country = non_blank(input.country.as_deref())
            .unwrap_or(&self.household.country)
            .to_owned();
        let language = non_blank(input.language.as_deref())
            .unwrap_or(&self.household.language)
            .to_owned();

        Ok(MealContext {
            time_of_day,
            eaters,
            complexity,
            duration,
            country,
            language,
            season,
            planner_instructions: non_blank(input.planner_instructions.as_deref())
                .map(ToOwned::to_owned),
        })
    }

    fn validate_eaters(&self, raw: Option<&[String]>) -> AppResult<Vec<String>> {
        let raw = raw.ok_or_else(|| AppError::missing_field("eaters"))?;
        if raw.is_empty() {
            return Err(AppError::invalid_input("eaters must list at least one person")
                .with_details(json!({ "field": "eaters" })));
        }

        let mut eaters: Vec<String> = Vec::with_capacity(raw.len());
        for name in raw {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::invalid_input("eater names must not be blank")
                    .with_details(json!({ "field": "eaters" })));
            }
            if self.strict_eaters && self.household.member(name).is_none() {
                return Err(AppError::invalid_input(format!(
                    "'{name}' is not a member of the {} household",
                    self.household.family_name
                ))
                .with_details(json!({
                    "field": "eaters",
                    "accepted": self.household.member_names(),
                })));
            }
            if !eaters.iter().any(|e| e.eq_ignore_ascii_case(name)) {
                eaters.push(name.to_owned());
            }
        }
        Ok(eaters)
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn required<T: EnumeratedField>(raw: Option<&str>) -> AppResult<T> {
    let raw = non_blank(raw).ok_or_else(|| AppError::missing_field(T::FIELD))?;
    parse_enumerated(raw)
}

fn optional<T: EnumeratedField>(raw: Option<&str>) -> AppResult<Option<T>> {
    non_blank(raw).map(parse_enumerated::<T>).transpose()
}

fn parse_enumerated<T: EnumeratedField>(raw: &str) -> AppResult<T> {
    T::parse(raw).ok_or_else(|| {
        AppError::invalid_input(format!(
            "'{raw}' is not a valid {} (expected one of: {})",
            T::FIELD,
            T::accepted()
        ))
        .with_details(json!({ "field": T::FIELD, "value": raw }))
    })
}
