//! `mealmate suggest`: ask for meal ideas and optionally plan one.

use anyhow::{Result, bail};

use mealmate_api::models::DayOfWeek;
use mealmate_core::AppContext;

use crate::auth_cmds::require_login;
use crate::output::{Reported, render_suggestions};

/// `pick` is a 1-based suggestion number and the day to plan it on.
pub async fn run_suggest(
    ctx: &AppContext,
    prompt: &str,
    count: u32,
    pick: Option<(usize, DayOfWeek)>,
) -> Result<()> {
    require_login(ctx)?;
    if prompt.trim().is_empty() {
        bail!("describe what kind of meals you want");
    }

    let ideas = ctx
        .store
        .suggest_meals(prompt, count)
        .await
        .map_err(|_| Reported)?;
    if ideas.is_empty() {
        println!("No suggestions came back.");
        return Ok(());
    }
    print!("{}", render_suggestions(&ideas));

    let Some((number, day)) = pick else {
        return Ok(());
    };
    let Some(idea) = number.checked_sub(1).and_then(|i| ideas.get(i)) else {
        bail!(
            "no suggestion #{number}; pick a number from 1 to {}",
            ideas.len()
        );
    };
    ctx.store
        .add_meal_from_suggestion(idea, day)
        .await
        .map_err(|_| Reported)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use mealmate_test_utils::{MockBackend, routes};

    use super::*;
    use crate::test_util::{messages, signed_in};

    #[tokio::test]
    async fn listing_ideas_is_silent() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        run_suggest(&ctx, "quick vegetarian", 3, None).await.unwrap();
        assert!(messages(&ctx).is_empty());
        assert!(backend.meals().is_empty());
    }

    #[tokio::test]
    async fn picked_idea_lands_on_the_day() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        run_suggest(&ctx, "rice bowls", 3, Some((2, DayOfWeek::Thursday)))
            .await
            .unwrap();

        let meals = backend.meals();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].1, "Thursday");
        assert_eq!(meals[0].2, "Idea 2");
        assert_eq!(messages(&ctx), ["\"Idea 2\" added to Thursday!"]);
    }

    #[tokio::test]
    async fn pick_out_of_range() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        for pick in [0, 3] {
            let msg = run_suggest(&ctx, "soup", 2, Some((pick, DayOfWeek::Monday)))
                .await
                .unwrap_err()
                .to_string();
            assert_eq!(msg, format!("no suggestion #{pick}; pick a number from 1 to 2"));
        }
        assert_eq!(backend.request_count(routes::ADD_MEAL), 0);
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_locally() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        assert!(run_suggest(&ctx, "   ", 3, None).await.is_err());
        assert_eq!(backend.request_count(routes::GENERATE_IDEAS), 0);
    }

    #[tokio::test]
    async fn service_failure_is_reported() {
        let backend = MockBackend::with_user().await;
        backend.set_suggestions_response(503, r#"{"error":"AI service not configured"}"#);
        let ctx = signed_in(&backend).await;

        let err = run_suggest(&ctx, "tacos", 3, None).await.unwrap_err();
        assert!(err.is::<Reported>());
        assert_eq!(
            messages(&ctx),
            ["Failed to generate meal ideas: AI service not configured"]
        );
    }
}
