//! JSON request and response bodies exchanged with the remote service.

use serde::{Deserialize, Serialize};

use crate::models::{
    DayOfWeek, DayOfWeekParseError, GroceryItem, Ingredient, Meal, MealDraft, MealId, User,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of a meal create or update: a draft pinned to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeal {
    pub day_of_week: DayOfWeek,
    pub name: String,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
}

impl NewMeal {
    pub fn from_draft(draft: &MealDraft, day: DayOfWeek) -> Self {
        Self {
            day_of_week: day,
            name: draft.name.clone(),
            notes: draft.notes.clone(),
            ingredients: draft.ingredients.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroceryItem {
    pub name: String,
    pub quantity: String,
}

/// Partial update of a grocery item; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl GroceryItemUpdate {
    pub fn purchased(purchased: bool) -> Self {
        Self {
            purchased: Some(purchased),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IdeaRequest<'a> {
    pub prompt: &'a str,
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub user: User,
}

/// A meal as the server sends it. The day is kept as text so a single
/// unexpected label does not invalidate a whole plan.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MealRecord {
    pub id: MealId,
    pub day_of_week: String,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl MealRecord {
    pub fn into_meal(self) -> Result<Meal, DayOfWeekParseError> {
        Ok(Meal {
            id: self.id,
            day: self.day_of_week.parse()?,
            name: self.name,
            notes: self.notes.unwrap_or_default(),
            ingredients: self.ingredients,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MealsResponse {
    pub meals: Vec<MealRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MealResponse {
    pub meal: MealRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroceriesResponse {
    pub grocery_items: Vec<GroceryItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroceryItemResponse {
    pub item: GroceryItem,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClearPurchasedResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdeasResponse {
    pub meals: Vec<MealDraft>,
}

/// Answer of the health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the AI backend has credentials configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured: Option<bool>,
}
