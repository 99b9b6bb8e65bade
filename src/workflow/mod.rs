// ABOUTME: Meal-creation workflow driver chaining validation, composition and the agent calls
// ABOUTME: Runs the reviewed or direct variant, tagging every step with a run id and timing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # Meal Creation Workflow
//!
//! A fixed, linear pipeline:
//!
//! ```text
//! validate-context -> compose-instructions -> create-meal
//!     -> review-recipe -> correct-recipe (at most once)   [reviewed variant]
//!     -> recipe-to-json
//! ```
//!
//! Any failing step aborts the run; no partial recipe is ever returned.
//!
//! ```rust,no_run
//! use jarvis_core::config::PipelineConfig;
//! use jarvis_core::meal::MealContextInput;
//! use jarvis_core::workflow::MealCreationWorkflow;
//!
//! # async fn example() -> jarvis_core::errors::AppResult<()> {
//! let config = PipelineConfig::from_env()?;
//! let workflow = MealCreationWorkflow::from_config(&config).await?;
//! let input = MealContextInput {
//!     time_of_day: Some("dinner".into()),
//!     eaters: Some(vec!["Marie".into()]),
//!     complexity: Some("easy".into()),
//!     duration: Some("short".into()),
//!     ..Default::default()
//! };
//! let recipe = workflow.run(&input).await?;
//! println!("{}", recipe.name);
//! # Ok(())
//! # }
//! ```

mod prompts;

pub use prompts::{
    draft_prompt, format_prompt, review_prompt, revision_prompt, RevisionDecision,
    GENERIC_REVISION_FEEDBACK,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::agents::KitchenBrigade;
use crate::config::{PipelineConfig, PipelineVariant};
use crate::constants::{logging::MAX_PROMPT_LOG_CHARS, steps};
use crate::errors::AppResult;
use crate::llm::{ChatProvider, LlmProvider};
use crate::logging::PipelineLogger;
use crate::meal::{
    ComposedInstructions, ContextValidator, Household, InstructionComposer, MealContext,
    MealContextInput, ReviewVerdict, StructuredRecipe,
};

/// Result of one complete run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRun {
    /// Identifier shared by every log record of the run
    pub run_id: Uuid,
    /// Variant that produced the recipe
    pub variant: PipelineVariant,
    /// Whether the chef was asked for a revision
    pub revised: bool,
    /// The validated recipe
    pub recipe: StructuredRecipe,
}

/// The meal-creation pipeline
///
/// Holds only shared, read-only state, so one workflow can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct MealCreationWorkflow {
    household: Arc<Household>,
    brigade: KitchenBrigade,
    variant: PipelineVariant,
}

impl MealCreationWorkflow {
    /// Create a workflow over an explicit provider and household
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        household: Arc<Household>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            household,
            brigade: KitchenBrigade::new(&config.agents, &provider),
            variant: config.variant,
        }
    }

    /// Build provider and household from configuration
    ///
    /// # Errors
    ///
    /// Returns configuration errors from the provider or the household file.
    pub async fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        let household = Household::from_config(config).await?;
        let provider: Arc<dyn LlmProvider> = Arc::new(ChatProvider::for_type(config.provider)?);
        Ok(Self::new(provider, Arc::new(household), config))
    }

    /// Variant this workflow runs
    #[must_use]
    pub const fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// Household used for composition
    #[must_use]
    pub fn household(&self) -> &Household {
        &self.household
    }

    /// Validate the input into a [`MealContext`]
    ///
    /// # Errors
    ///
    /// Returns an input-validation error; see [`ContextValidator::validate`].
    pub fn validate(&self, input: &MealContextInput) -> AppResult<MealContext> {
        ContextValidator::new(&self.household, self.variant.restricts_eaters()).validate(input)
    }

    /// Dry run: validate and compose without calling any model
    ///
    /// # Errors
    ///
    /// Returns an input-validation error for a bad input.
    pub fn compose(&self, input: &MealContextInput) -> AppResult<ComposedInstructions> {
        compose_brief(&self.household, self.variant, input)
    }

    /// Run the pipeline and return the recipe
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step, tagged with run id and step.
    pub async fn run(&self, input: &MealContextInput) -> AppResult<StructuredRecipe> {
        Ok(self.run_with_report(input).await?.recipe)
    }

    /// Run the pipeline and return the recipe with run metadata
    ///
    /// # Errors
    ///
    /// Same as [`MealCreationWorkflow::run`].
    pub async fn run_with_report(&self, input: &MealContextInput) -> AppResult<MealRun> {
        let run_id = Uuid::new_v4();
        let span = info_span!("meal_creation", run.id = %run_id, pipeline.variant = %self.variant);
        self.execute(run_id, input).instrument(span).await
    }

    fn composer(&self) -> InstructionComposer<'_> {
        InstructionComposer::new(&self.household, self.variant.renders_mandate())
    }

    async fn execute(&self, run_id: Uuid, input: &MealContextInput) -> AppResult<MealRun> {
        let started = Instant::now();
        let run = run_id.to_string();

        let context = traced_step(&run, steps::VALIDATE_CONTEXT, async {
            self.validate(input)
        })
        .await?;

        let instructions = traced_step(&run, steps::COMPOSE_INSTRUCTIONS, async {
            Ok(self.composer().compose(&context))
        })
        .await?;
        debug!(
            preview = %instructions.as_str().chars().take(MAX_PROMPT_LOG_CHARS).collect::<String>(),
            "Instructions composed"
        );

        let draft = traced_step(
            &run,
            steps::CREATE_MEAL,
            self.brigade
                .chef
                .generate(&draft_prompt(&instructions, &context)),
        )
        .await?;

        let (draft, revised) = if self.variant.has_review() {
            self.review_and_correct(&run, &instructions, draft).await?
        } else {
            (draft, false)
        };

        let recipe: StructuredRecipe = traced_step(
            &run,
            steps::RECIPE_TO_JSON,
            self.brigade.formatter.generate_object(&format_prompt(&draft)),
        )
        .await?;

        if recipe.meal_type != context.time_of_day() {
            warn!(
                requested = %context.time_of_day(),
                produced = %recipe.meal_type,
                "Recipe meal type differs from the requested time of day"
            );
        }

        PipelineLogger::log_run_completed(
            &run,
            &self.variant.to_string(),
            revised,
            elapsed_ms(started),
        );

        Ok(MealRun {
            run_id,
            variant: self.variant,
            revised,
            recipe,
        })
    }

    /// Review the draft and correct it at most once
    async fn review_and_correct(
        &self,
        run: &str,
        instructions: &ComposedInstructions,
        draft: String,
    ) -> AppResult<(String, bool)> {
        let verdict: ReviewVerdict = traced_step(
            run,
            steps::REVIEW_RECIPE,
            self.brigade
                .sous_chef
                .generate_object(&review_prompt(instructions, &draft)),
        )
        .await?;

        match RevisionDecision::from(verdict) {
            RevisionDecision::Accepted => {
                debug!("Sous chef accepted the draft");
                Ok((draft, false))
            }
            RevisionDecision::NeedsRevision { feedback } => {
                debug!(feedback = %feedback, "Sous chef asked for a revision");
                let corrected = traced_step(
                    run,
                    steps::CORRECT_RECIPE,
                    self.brigade
                        .chef
                        .generate(&revision_prompt(instructions, &draft, &feedback)),
                )
                .await?;
                Ok((corrected, true))
            }
        }
    }
}

/// Validate `input` and compose the chef brief for `variant`
///
/// Needs no provider, so callers that only want the brief can skip building one.
///
/// # Errors
///
/// Returns an input-validation error for a bad input.
pub fn compose_brief(
    household: &Household,
    variant: PipelineVariant,
    input: &MealContextInput,
) -> AppResult<ComposedInstructions> {
    let context = ContextValidator::new(household, variant.restricts_eaters()).validate(input)?;
    Ok(InstructionComposer::new(household, variant.renders_mandate()).compose(&context))
}

/// Run one step with start/finish records; tag a failure with run id and step
async fn traced_step<T, F>(run_id: &str, step: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    PipelineLogger::log_step_started(run_id, step);
    let started = Instant::now();

    match fut.await {
        Ok(value) => {
            PipelineLogger::log_step_completed(run_id, step, elapsed_ms(started));
            Ok(value)
        }
        Err(e) => {
            PipelineLogger::log_step_failed(run_id, step, elapsed_ms(started), &e.to_string());
            Err(e.with_run_id(run_id).with_step(step))
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
