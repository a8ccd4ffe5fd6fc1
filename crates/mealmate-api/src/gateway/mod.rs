//! Remote service gateway: typed contracts for authentication, meals,
//! groceries and AI suggestions.
//!
//! # Architecture
//!
//! ```text
//! SessionManager --register/login/get_profile--+
//!                                              v
//! PlanStore ----meals/groceries/ideas---> dyn RemoteService
//!                                              |
//!                                         HttpGateway --reqwest--> backend
//!                                              |
//!                                          TokenStore (bearer token)
//! ```
//!
//! Every call is bounded by a timeout and fails with a [`GatewayError`]. The
//! gateway never retries.

pub mod http;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{GroceryItem, GroceryItemId, Meal, MealDraft, MealId, User, WeeklyPlan};

pub use http::HttpGateway;
pub use wire::{GroceryItemUpdate, HealthStatus, NewGroceryItem, NewMeal};

/// Failure of a gateway call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// A token is required but none is held. No request was sent.
    #[error("not signed in")]
    Unauthenticated,

    /// The remote service rejected the token. The token has been discarded.
    #[error("authentication expired, please log in again")]
    SessionExpired,

    /// Any other non-success response, carrying the server's message.
    #[error("{0}")]
    Remote(String),

    /// A success response whose body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call did not complete within its time bound.
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("could not reach the server: {0}")]
    Transport(String),
}

impl GatewayError {
    /// `true` when the caller should send the user back to log in.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired)
    }
}

/// The remote meal-planning service as seen by the client.
///
/// [`HttpGateway`] is the production implementation. The trait is object
/// safe so components hold it as `Arc<dyn RemoteService>`.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Create an account. Does not sign in.
    async fn register(&self, email: &str, password: &str) -> Result<User, GatewayError>;

    /// Exchange credentials for a bearer token. The token is stored before
    /// this returns.
    async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError>;

    /// Identity belonging to the held token.
    async fn get_profile(&self) -> Result<User, GatewayError>;

    /// The complete weekly plan.
    async fn get_weekly_plan(&self) -> Result<WeeklyPlan, GatewayError>;

    async fn add_meal(&self, meal: &NewMeal) -> Result<Meal, GatewayError>;

    async fn update_meal(&self, id: MealId, meal: &NewMeal) -> Result<Meal, GatewayError>;

    async fn delete_meal(&self, id: MealId) -> Result<(), GatewayError>;

    /// The complete grocery list.
    async fn get_grocery_list(&self) -> Result<Vec<GroceryItem>, GatewayError>;

    async fn add_grocery_item(&self, item: &NewGroceryItem) -> Result<GroceryItem, GatewayError>;

    async fn update_grocery_item(
        &self,
        id: GroceryItemId,
        update: &GroceryItemUpdate,
    ) -> Result<GroceryItem, GatewayError>;

    async fn delete_grocery_item(&self, id: GroceryItemId) -> Result<(), GatewayError>;

    /// Delete every purchased item. Returns how many were deleted.
    async fn clear_purchased_items(&self) -> Result<u64, GatewayError>;

    /// Ask the AI backend for `count` meal ideas. All or nothing.
    async fn generate_meal_ideas(
        &self,
        prompt: &str,
        count: u32,
    ) -> Result<Vec<MealDraft>, GatewayError>;

    /// Unauthenticated liveness probe.
    async fn health(&self) -> Result<HealthStatus, GatewayError>;
}

// Compile-time assertion: RemoteService must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn RemoteService) {}
};
