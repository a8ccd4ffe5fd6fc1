//! The weekly plan and grocery list, kept in step with the remote service.
//!
//! Every mutation goes to the remote service first. On success a
//! notification is posted and the affected collection is reloaded in full;
//! on failure an error notification carries the reason and local state is
//! left alone. Nothing is patched optimistically.
//!
//! Reloads of each collection pass through a [`SingleFlight`] gate, so at
//! most one is in flight per collection and results apply in start order.

mod single_flight;

pub use single_flight::SingleFlight;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use mealmate_api::gateway::{GroceryItemUpdate, NewGroceryItem, NewMeal};
use mealmate_api::models::{
    DayOfWeek, GroceryItem, GroceryItemId, Meal, MealDraft, MealId, WeeklyPlan,
};
use mealmate_api::{GatewayError, RemoteService};

use crate::ingredients::DEFAULT_QUANTITY;
use crate::notify::NotificationCenter;
use crate::session::SessionManager;

/// Snapshot of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanState {
    pub weekly_plan: WeeklyPlan,
    pub grocery_list: Vec<GroceryItem>,
}

/// Shared handle to the plan and grocery list. Clones share state.
#[derive(Clone)]
pub struct PlanStore {
    inner: Arc<Inner>,
}

struct Inner {
    remote: Arc<dyn RemoteService>,
    session: SessionManager,
    notifications: NotificationCenter,
    state: watch::Sender<PlanState>,
    plan_gate: SingleFlight,
    grocery_gate: SingleFlight,
    /// Bumped by [`PlanStore::clear`]; reloads begun before a clear are
    /// discarded when they finish.
    generation: AtomicU64,
    /// Sign-in whose expiry has already been notified.
    expiry_reported: AtomicU64,
}

impl PlanStore {
    pub fn new(
        remote: Arc<dyn RemoteService>,
        session: SessionManager,
        notifications: NotificationCenter,
    ) -> Self {
        let (state, _) = watch::channel(PlanState::default());
        Self {
            inner: Arc::new(Inner {
                remote,
                session,
                notifications,
                state,
                plan_gate: SingleFlight::new(),
                grocery_gate: SingleFlight::new(),
                generation: AtomicU64::new(0),
                expiry_reported: AtomicU64::new(u64::MAX),
            }),
        }
    }

    // -- Reading ----------------------------------------------------------

    pub fn snapshot(&self) -> PlanState {
        self.inner.state.borrow().clone()
    }

    pub fn weekly_plan(&self) -> WeeklyPlan {
        self.inner.state.borrow().weekly_plan.clone()
    }

    pub fn grocery_list(&self) -> Vec<GroceryItem> {
        self.inner.state.borrow().grocery_list.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlanState> {
        self.inner.state.subscribe()
    }

    // -- Reloading --------------------------------------------------------

    /// Replace the weekly plan with the server's copy.
    pub async fn reload_plan(&self) -> Result<(), GatewayError> {
        let inner = &self.inner;
        inner
            .plan_gate
            .run(|| async {
                let generation = inner.generation.load(Ordering::SeqCst);
                let plan = inner.remote.get_weekly_plan().await?;
                self.apply(generation, |state| state.weekly_plan = plan);
                Ok::<(), GatewayError>(())
            })
            .await
            .map(|ran| debug!(ran, "plan reload finished"))
            .map_err(|e| self.failed("Failed to load meal plan", e))
    }

    /// Replace the grocery list with the server's copy.
    pub async fn reload_groceries(&self) -> Result<(), GatewayError> {
        let inner = &self.inner;
        inner
            .grocery_gate
            .run(|| async {
                let generation = inner.generation.load(Ordering::SeqCst);
                let list = inner.remote.get_grocery_list().await?;
                self.apply(generation, |state| state.grocery_list = list);
                Ok::<(), GatewayError>(())
            })
            .await
            .map(|ran| debug!(ran, "grocery reload finished"))
            .map_err(|e| self.failed("Failed to load grocery list", e))
    }

    /// Reload both collections concurrently.
    pub async fn reload_all(&self) -> Result<(), GatewayError> {
        let (plan, groceries) = futures::join!(self.reload_plan(), self.reload_groceries());
        plan.and(groceries)
    }

    /// Forget everything, e.g. after logout.
    pub fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(PlanState::default());
        debug!("plan store cleared");
    }

    // -- Meals ------------------------------------------------------------

    pub async fn add_meal(&self, draft: &MealDraft, day: DayOfWeek) -> Result<Meal, GatewayError> {
        let meal = self
            .inner
            .remote
            .add_meal(&NewMeal::from_draft(draft, day))
            .await
            .map_err(|e| self.failed("Failed to save meal", e))?;

        info!(meal_id = %meal.id, %day, "meal added");
        self.inner.notifications.success("Meal added!");
        self.refresh_plan().await;
        Ok(meal)
    }

    pub async fn update_meal(
        &self,
        id: MealId,
        draft: &MealDraft,
        day: DayOfWeek,
    ) -> Result<Meal, GatewayError> {
        let meal = self
            .inner
            .remote
            .update_meal(id, &NewMeal::from_draft(draft, day))
            .await
            .map_err(|e| self.failed("Failed to save meal", e))?;

        info!(meal_id = %meal.id, %day, "meal updated");
        self.inner.notifications.success("Meal updated!");
        self.refresh_plan().await;
        Ok(meal)
    }

    /// Add a suggested meal; the notification names the meal and day.
    pub async fn add_meal_from_suggestion(
        &self,
        draft: &MealDraft,
        day: DayOfWeek,
    ) -> Result<Meal, GatewayError> {
        let meal = self
            .inner
            .remote
            .add_meal(&NewMeal::from_draft(draft, day))
            .await
            .map_err(|e| self.failed("Failed to add meal", e))?;

        info!(meal_id = %meal.id, %day, "suggested meal added");
        self.inner
            .notifications
            .success(format!("\"{}\" added to {day}!", draft.name));
        self.refresh_plan().await;
        Ok(meal)
    }

    /// Delete a meal. `day` is the day it was planned on, for logging.
    pub async fn delete_meal(&self, id: MealId, day: DayOfWeek) -> Result<(), GatewayError> {
        self.inner
            .remote
            .delete_meal(id)
            .await
            .map_err(|e| self.failed("Failed to delete meal", e))?;

        info!(meal_id = %id, %day, "meal deleted");
        self.inner.notifications.success("Meal deleted");
        self.refresh_plan().await;
        Ok(())
    }

    // -- Groceries --------------------------------------------------------

    /// Flip the purchased flag of a known item.
    ///
    /// Returns `Ok(None)` without contacting the server when the id is not
    /// in the local list, otherwise the new flag.
    pub async fn toggle_grocery_item(
        &self,
        id: GroceryItemId,
    ) -> Result<Option<bool>, GatewayError> {
        let Some(item) = self.find_item(id) else {
            debug!(item_id = %id, "toggle of unknown grocery item ignored");
            return Ok(None);
        };

        let purchased = !item.purchased;
        self.inner
            .remote
            .update_grocery_item(id, &GroceryItemUpdate::purchased(purchased))
            .await
            .map_err(|e| self.failed("Failed to update item", e))?;

        let message = if purchased {
            format!("{} marked as purchased", item.name)
        } else {
            format!("{} marked as not purchased", item.name)
        };
        self.inner.notifications.success(message);
        self.refresh_groceries().await;
        Ok(Some(purchased))
    }

    /// Add an item by hand. A blank quantity becomes `"1"`.
    pub async fn add_grocery_item_manually(
        &self,
        name: &str,
        quantity: &str,
    ) -> Result<GroceryItem, GatewayError> {
        let quantity = match quantity.trim() {
            "" => DEFAULT_QUANTITY,
            q => q,
        };
        let request = NewGroceryItem {
            name: name.trim().to_owned(),
            quantity: quantity.to_owned(),
        };
        let item = self
            .inner
            .remote
            .add_grocery_item(&request)
            .await
            .map_err(|e| self.failed("Failed to add item", e))?;

        self.inner
            .notifications
            .success(format!("{} added to grocery list", request.name));
        self.refresh_groceries().await;
        Ok(item)
    }

    pub async fn delete_grocery_item(&self, id: GroceryItemId) -> Result<(), GatewayError> {
        let name = self.find_item(id).map(|item| item.name);

        self.inner
            .remote
            .delete_grocery_item(id)
            .await
            .map_err(|e| self.failed("Failed to remove item", e))?;

        let message = match name {
            Some(name) => format!("{name} removed from grocery list"),
            None => "Item removed from grocery list".to_owned(),
        };
        self.inner.notifications.success(message);
        self.refresh_groceries().await;
        Ok(())
    }

    /// Delete every purchased item. Returns how many the server removed.
    pub async fn clear_purchased_items(&self) -> Result<u64, GatewayError> {
        let deleted = self
            .inner
            .remote
            .clear_purchased_items()
            .await
            .map_err(|e| self.failed("Failed to clear purchased items", e))?;

        let message = match deleted {
            1 => "Cleared 1 purchased item".to_owned(),
            n => format!("Cleared {n} purchased items"),
        };
        self.inner.notifications.success(message);
        self.refresh_groceries().await;
        Ok(deleted)
    }

    // -- Suggestions ------------------------------------------------------

    /// Ask for meal ideas. Does not touch local state.
    pub async fn suggest_meals(
        &self,
        prompt: &str,
        count: u32,
    ) -> Result<Vec<MealDraft>, GatewayError> {
        self.inner
            .remote
            .generate_meal_ideas(prompt, count)
            .await
            .map_err(|e| self.failed("Failed to generate meal ideas", e))
    }

    // -- Internals --------------------------------------------------------

    fn find_item(&self, id: GroceryItemId) -> Option<GroceryItem> {
        let state = self.inner.state.borrow();
        state.grocery_list.iter().find(|item| item.id == id).cloned()
    }

    fn apply(&self, generation: u64, update: impl FnOnce(&mut PlanState)) {
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding reload that finished after a clear");
            return;
        }
        self.inner.state.send_modify(update);
    }

    /// Post-mutation reload. Failures are already notified.
    async fn refresh_plan(&self) {
        let _ = self.reload_plan().await;
    }

    async fn refresh_groceries(&self) {
        let _ = self.reload_groceries().await;
    }

    /// Notify a failure, forward expiry to the session, hand the error back.
    /// Log, notify and route a failure. An expiry is notified once per
    /// sign-in, however many calls were in flight when it happened.
    fn failed(&self, context: &str, error: GatewayError) -> GatewayError {
        warn!(error = %error, "{context}");
        let repeat_expiry = error == GatewayError::SessionExpired && {
            let sign_in = self.inner.session.sign_ins();
            self.inner.expiry_reported.swap(sign_in, Ordering::SeqCst) == sign_in
        };
        if repeat_expiry {
            debug!("{context}: session expiry already reported");
        } else {
            self.inner
                .notifications
                .error(format!("{context}: {error}"));
        }
        self.inner.session.observe(&error);
        error
    }
}

impl std::fmt::Debug for PlanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("PlanStore")
            .field("meals", &state.weekly_plan.meal_count())
            .field("grocery_items", &state.grocery_list.len())
            .finish_non_exhaustive()
    }
}
