//! `mealmate plan` and `mealmate meal add | edit | delete`.

use anyhow::{Context, Result, bail};

use mealmate_api::models::{DayOfWeek, MealId};
use mealmate_core::AppContext;
use mealmate_core::ingredients::{self, validate_meal_form};

use crate::MealCommands;
use crate::auth_cmds::require_login;
use crate::output::{Reported, render_plan};

pub async fn run_plan(ctx: &AppContext) -> Result<()> {
    require_login(ctx)?;
    ctx.store.reload_plan().await.map_err(|_| Reported)?;
    print!("{}", render_plan(&ctx.store.weekly_plan()));
    Ok(())
}

pub async fn run_meal_command(command: MealCommands, ctx: &AppContext) -> Result<()> {
    require_login(ctx)?;
    match command {
        MealCommands::Add {
            day,
            name,
            notes,
            ingredients,
        } => add(ctx, day, &name, &notes, &ingredients).await,
        MealCommands::Edit {
            id,
            day,
            name,
            notes,
            ingredients,
        } => edit(ctx, id, day, name, notes, ingredients).await,
        MealCommands::Delete { id, day } => {
            ctx.store
                .delete_meal(id, day)
                .await
                .map_err(|_| Reported)?;
            Ok(())
        }
    }
}

async fn add(
    ctx: &AppContext,
    day: DayOfWeek,
    name: &str,
    notes: &str,
    ingredients_text: &str,
) -> Result<()> {
    let draft = validate_meal_form(name, notes, ingredients_text).context("invalid meal")?;
    let meal = ctx
        .store
        .add_meal(&draft, day)
        .await
        .map_err(|_| Reported)?;
    println!("{} is meal #{} on {day}.", meal.name, meal.id.0);
    Ok(())
}

/// Fields left out keep the values the meal has on the server.
async fn edit(
    ctx: &AppContext,
    id: MealId,
    day: Option<DayOfWeek>,
    name: Option<String>,
    notes: Option<String>,
    ingredients_text: Option<String>,
) -> Result<()> {
    ctx.store.reload_plan().await.map_err(|_| Reported)?;
    let plan = ctx.store.weekly_plan();
    let Some(current) = plan.find(id) else {
        bail!("no meal #{}", id.0);
    };

    let existing = current.to_draft();
    let name = name.unwrap_or(existing.name);
    let notes = notes.unwrap_or(existing.notes);
    let ingredients_text =
        ingredients_text.unwrap_or_else(|| ingredients::serialize(&existing.ingredients));
    let day = day.unwrap_or(current.day);

    let draft = validate_meal_form(&name, &notes, &ingredients_text).context("invalid meal")?;
    ctx.store
        .update_meal(id, &draft, day)
        .await
        .map_err(|_| Reported)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use mealmate_test_utils::{MockBackend, routes};
    use serde_json::json;

    use super::*;
    use crate::test_util::{anonymous, messages, signed_in};

    fn add_command(day: DayOfWeek, name: &str, ingredients: &str) -> MealCommands {
        MealCommands::Add {
            day,
            name: name.to_string(),
            notes: String::new(),
            ingredients: ingredients.to_string(),
        }
    }

    #[tokio::test]
    async fn plan_requires_login() {
        let backend = MockBackend::with_user().await;
        let ctx = anonymous(&backend).await;

        let msg = run_plan(&ctx).await.unwrap_err().to_string();
        assert!(msg.contains("not logged in"), "unexpected error: {msg}");
        assert_eq!(backend.request_count(routes::PLAN), 0);
    }

    #[tokio::test]
    async fn add_meal_then_plan_shows_it() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        run_meal_command(
            add_command(DayOfWeek::Monday, "Pasta", "200g, Spaghetti\n2, Tomatoes"),
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(messages(&ctx), ["Meal added!"]);

        run_plan(&ctx).await.unwrap();
        let monday = ctx.store.weekly_plan().meals_for(DayOfWeek::Monday).to_vec();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].ingredients.len(), 2);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_server() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        let err = run_meal_command(add_command(DayOfWeek::Monday, "Pasta", "\n  \n"), &ctx)
            .await
            .unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "invalid meal: at least one ingredient is required"
        );
        assert_eq!(backend.request_count(routes::ADD_MEAL), 0);
    }

    #[tokio::test]
    async fn server_rejection_is_reported() {
        let backend = MockBackend::with_user().await;
        backend.seed_meal("Monday", "Soup", &[("1", "Stock")]);
        let ctx = signed_in(&backend).await;

        let err = run_meal_command(add_command(DayOfWeek::Monday, "Pasta", "1, Pasta"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is::<Reported>());
        assert_eq!(
            messages(&ctx),
            ["Failed to save meal: Meal already exists for this day"]
        );
    }

    #[tokio::test]
    async fn edit_keeps_omitted_fields() {
        let backend = MockBackend::with_user().await;
        let id = backend.seed_meal("Tuesday", "Tacos", &[("8", "Tortillas"), ("1 lb", "Beef")]);
        let ctx = signed_in(&backend).await;

        run_meal_command(
            MealCommands::Edit {
                id: MealId(id),
                day: Some(DayOfWeek::Friday),
                name: None,
                notes: Some("Extra salsa".into()),
                ingredients: None,
            },
            &ctx,
        )
        .await
        .unwrap();

        let plan = ctx.store.weekly_plan();
        let meal = plan.find(MealId(id)).unwrap();
        assert_eq!(meal.day, DayOfWeek::Friday);
        assert_eq!(meal.name, "Tacos");
        assert_eq!(meal.notes, "Extra salsa");
        assert_eq!(meal.ingredients.len(), 2);
        assert_eq!(messages(&ctx), ["Meal updated!"]);
    }

    #[tokio::test]
    async fn edit_of_unknown_meal_fails_locally() {
        let backend = MockBackend::with_user().await;
        let ctx = signed_in(&backend).await;

        let msg = run_meal_command(
            MealCommands::Edit {
                id: MealId(404),
                day: None,
                name: Some("Nothing".into()),
                notes: None,
                ingredients: None,
            },
            &ctx,
        )
        .await
        .unwrap_err()
        .to_string();
        assert_eq!(msg, "no meal #404");
        assert_eq!(backend.request_count(routes::UPDATE_MEAL), 0);
    }

    #[tokio::test]
    async fn delete_failure_uses_fallback_message() {
        let backend = MockBackend::with_user().await;
        let id = backend.seed_meal("Sunday", "Roast", &[("1", "Chicken")]);
        let ctx = signed_in(&backend).await;
        backend.fail_next(routes::DELETE_MEAL, 500, json!({}));

        let err = run_meal_command(
            MealCommands::Delete {
                id: MealId(id),
                day: DayOfWeek::Sunday,
            },
            &ctx,
        )
        .await
        .unwrap_err();
        assert!(err.is::<Reported>());
        assert_eq!(messages(&ctx), ["Failed to delete meal: Failed to delete meal"]);
        assert_eq!(backend.meals().len(), 1);
    }
}
