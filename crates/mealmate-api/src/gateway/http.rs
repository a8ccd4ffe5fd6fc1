//! reqwest implementation of [`RemoteService`].

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::models::{GroceryItem, GroceryItemId, Meal, MealDraft, MealId, User, WeeklyPlan};
use crate::token::TokenStore;

use super::wire::{
    AuthResponse, ClearPurchasedResponse, Credentials, ErrorBody, GroceriesResponse,
    GroceryItemResponse, GroceryItemUpdate, HealthStatus, IdeaRequest, IdeasResponse,
    MealResponse, MealsResponse, NewGroceryItem, NewMeal, ProfileResponse,
};
use super::{GatewayError, RemoteService};

/// The remote actions, used for logging and for the fallback error message
/// when a failure response carries no readable `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Register,
    Login,
    GetProfile,
    GetWeeklyPlan,
    AddMeal,
    UpdateMeal,
    DeleteMeal,
    GetGroceryList,
    AddGroceryItem,
    UpdateGroceryItem,
    DeleteGroceryItem,
    ClearPurchasedItems,
    GenerateMealIdeas,
    Health,
}

impl Operation {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Register => "Registration failed",
            Self::Login => "Login failed",
            Self::GetProfile => "Failed to get profile",
            Self::GetWeeklyPlan => "Failed to fetch meal plan",
            Self::AddMeal => "Failed to add meal",
            Self::UpdateMeal => "Failed to update meal",
            Self::DeleteMeal => "Failed to delete meal",
            Self::GetGroceryList => "Failed to fetch grocery list",
            Self::AddGroceryItem => "Failed to add grocery item",
            Self::UpdateGroceryItem => "Failed to update grocery item",
            Self::DeleteGroceryItem => "Failed to delete grocery item",
            Self::ClearPurchasedItems => "Failed to clear purchased items",
            Self::GenerateMealIdeas => "Failed to generate meal ideas",
            Self::Health => "Backend health check failed",
        }
    }

    /// Register, login and the health probe are the only calls that go out
    /// without a bearer token.
    fn requires_token(self) -> bool {
        !matches!(self, Self::Register | Self::Login | Self::Health)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::GetProfile => "get_profile",
            Self::GetWeeklyPlan => "get_weekly_plan",
            Self::AddMeal => "add_meal",
            Self::UpdateMeal => "update_meal",
            Self::DeleteMeal => "delete_meal",
            Self::GetGroceryList => "get_grocery_list",
            Self::AddGroceryItem => "add_grocery_item",
            Self::UpdateGroceryItem => "update_grocery_item",
            Self::DeleteGroceryItem => "delete_grocery_item",
            Self::ClearPurchasedItems => "clear_purchased_items",
            Self::GenerateMealIdeas => "generate_meal_ideas",
            Self::Health => "health",
        };
        f.write_str(s)
    }
}

/// HTTP client for the remote service.
///
/// Attaches the bearer token from the shared [`TokenStore`], discards it on
/// a 401, and bounds every call with the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
    tokens: TokenStore,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig, tokens: TokenStore) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mealmate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.config.endpoint(path))
    }

    /// Send a request and decode a success body as `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        op: Operation,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let body = self.send(op, request, self.config.request_timeout).await?;
        decode(op, &body)
    }

    /// Send a request and return the raw success body.
    ///
    /// Handles token attachment, the time bound, 401 handling and error
    /// bodies. Never retries.
    async fn send(
        &self,
        op: Operation,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Vec<u8>, GatewayError> {
        let sent_token = if op.requires_token() {
            Some(self.tokens.get().ok_or(GatewayError::Unauthenticated)?)
        } else {
            None
        };
        let request = match &sent_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) if e.is_timeout() => return Err(GatewayError::Timeout(timeout)),
            Ok(Err(e)) => {
                warn!(operation = %op, error = %e, "request failed before a response");
                return Err(GatewayError::Transport(e.to_string()));
            }
            Err(_) => {
                warn!(operation = %op, timeout_ms = timeout.as_millis() as u64, "request timed out");
                return Err(GatewayError::Timeout(timeout));
            }
        };

        debug!(operation = %op, status = status.as_u16(), "remote call completed");

        if status == StatusCode::UNAUTHORIZED {
            if let Some(sent) = &sent_token {
                if self.tokens.discard_rejected(sent) {
                    warn!(operation = %op, "token rejected by remote service, discarded");
                    return Err(GatewayError::SessionExpired);
                }
                // A newer token arrived while this call was in flight.
                debug!(operation = %op, "rejected token already replaced, keeping the current one");
            }
        }

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| op.fallback_message().to_owned());
            return Err(GatewayError::Remote(message));
        }

        Ok(body.to_vec())
    }
}

fn decode<T: DeserializeOwned>(op: Operation, body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::MalformedResponse(format!("{op}: {e}")))
}

fn meal_from_response(op: Operation, response: MealResponse) -> Result<Meal, GatewayError> {
    response
        .meal
        .into_meal()
        .map_err(|e| GatewayError::MalformedResponse(format!("{op}: {e}")))
}

#[async_trait]
impl RemoteService for HttpGateway {
    async fn register(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let op = Operation::Register;
        let request = self
            .request(Method::POST, "/auth/register")
            .json(&Credentials { email, password });
        let response: AuthResponse = self.call(op, request).await?;
        Ok(response.user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let op = Operation::Login;
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&Credentials { email, password });
        let response: AuthResponse = self.call(op, request).await?;
        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::MalformedResponse(format!("{op}: missing access_token")))?;
        self.tokens.set(token);
        Ok(response.user)
    }

    async fn get_profile(&self) -> Result<User, GatewayError> {
        let request = self.request(Method::GET, "/auth/profile");
        let response: ProfileResponse = self.call(Operation::GetProfile, request).await?;
        Ok(response.user)
    }

    async fn get_weekly_plan(&self) -> Result<WeeklyPlan, GatewayError> {
        let request = self.request(Method::GET, "/plan");
        let response: MealsResponse = self.call(Operation::GetWeeklyPlan, request).await?;

        let meals = response.meals.into_iter().filter_map(|record| {
            let id = record.id;
            match record.into_meal() {
                Ok(meal) => Some(meal),
                Err(e) => {
                    warn!(meal_id = %id, error = %e, "dropping meal with unknown day");
                    None
                }
            }
        });
        Ok(WeeklyPlan::from_meals(meals))
    }

    async fn add_meal(&self, meal: &NewMeal) -> Result<Meal, GatewayError> {
        let op = Operation::AddMeal;
        let request = self.request(Method::POST, "/meals").json(meal);
        let response: MealResponse = self.call(op, request).await?;
        meal_from_response(op, response)
    }

    async fn update_meal(&self, id: MealId, meal: &NewMeal) -> Result<Meal, GatewayError> {
        let op = Operation::UpdateMeal;
        let request = self.request(Method::PUT, &format!("/meals/{id}")).json(meal);
        let response: MealResponse = self.call(op, request).await?;
        meal_from_response(op, response)
    }

    async fn delete_meal(&self, id: MealId) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, &format!("/meals/{id}"));
        self.send(Operation::DeleteMeal, request, self.config.request_timeout)
            .await?;
        Ok(())
    }

    async fn get_grocery_list(&self) -> Result<Vec<GroceryItem>, GatewayError> {
        let request = self.request(Method::GET, "/groceries");
        let response: GroceriesResponse = self.call(Operation::GetGroceryList, request).await?;
        Ok(response.grocery_items)
    }

    async fn add_grocery_item(&self, item: &NewGroceryItem) -> Result<GroceryItem, GatewayError> {
        let request = self.request(Method::POST, "/groceries").json(item);
        let response: GroceryItemResponse = self.call(Operation::AddGroceryItem, request).await?;
        Ok(response.item)
    }

    async fn update_grocery_item(
        &self,
        id: GroceryItemId,
        update: &GroceryItemUpdate,
    ) -> Result<GroceryItem, GatewayError> {
        let request = self
            .request(Method::PUT, &format!("/groceries/{id}"))
            .json(update);
        let response: GroceryItemResponse =
            self.call(Operation::UpdateGroceryItem, request).await?;
        Ok(response.item)
    }

    async fn delete_grocery_item(&self, id: GroceryItemId) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, &format!("/groceries/{id}"));
        self.send(
            Operation::DeleteGroceryItem,
            request,
            self.config.request_timeout,
        )
        .await?;
        Ok(())
    }

    async fn clear_purchased_items(&self) -> Result<u64, GatewayError> {
        let request = self.request(Method::DELETE, "/groceries/clear-purchased");
        let response: ClearPurchasedResponse =
            self.call(Operation::ClearPurchasedItems, request).await?;
        Ok(response.deleted_count)
    }

    async fn generate_meal_ideas(
        &self,
        prompt: &str,
        count: u32,
    ) -> Result<Vec<MealDraft>, GatewayError> {
        let op = Operation::GenerateMealIdeas;
        let request = self
            .request(Method::POST, "/generate-ideas")
            .json(&IdeaRequest { prompt, count });
        let body = self.send(op, request, self.config.suggestion_timeout).await?;
        let response: IdeasResponse = decode(op, &body)?;

        if let Some(pos) = response
            .meals
            .iter()
            .position(|meal| meal.name.trim().is_empty())
        {
            return Err(GatewayError::MalformedResponse(format!(
                "{op}: suggestion {} has no name",
                pos + 1
            )));
        }
        Ok(response.meals)
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let url = format!("{}/health", self.config.service_root());
        let request = self.client.get(url);
        self.call(Operation::Health, request).await
    }
}
