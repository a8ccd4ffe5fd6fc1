use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// One of the seven fixed day labels a meal can be planned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Position of the day within [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = DayOfWeekParseError;

    /// Accepts the canonical label in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DayOfWeekParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`DayOfWeek`] string.
#[derive(Debug, Clone)]
pub struct DayOfWeekParseError(pub String);

impl fmt::Display for DayOfWeekParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day of week: {:?}", self.0)
    }
}

impl std::error::Error for DayOfWeekParseError {}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

remote_id!(
    /// Server-assigned identity of a meal.
    MealId
);
remote_id!(
    /// Server-assigned identity of a grocery item.
    GroceryItemId
);

// ---------------------------------------------------------------------------
// Meals
// ---------------------------------------------------------------------------

/// A single ingredient line. Identity is its position within the meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

impl Ingredient {
    pub fn new(quantity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// A meal without identity or day: what a form or an AI suggestion produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDraft {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// A meal as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    #[serde(rename = "day_of_week")]
    pub day: DayOfWeek,
    pub name: String,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
}

impl Meal {
    /// The draft this meal was built from, e.g. to pre-fill an edit form.
    pub fn to_draft(&self) -> MealDraft {
        MealDraft {
            name: self.name.clone(),
            notes: self.notes.clone(),
            ingredients: self.ingredients.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Weekly plan
// ---------------------------------------------------------------------------

/// Meals grouped by day. Every one of the seven days is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyPlan {
    days: [Vec<Meal>; 7],
}

impl WeeklyPlan {
    /// An empty plan: seven days, no meals.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group meals by their day, preserving the order they were given in.
    pub fn from_meals(meals: impl IntoIterator<Item = Meal>) -> Self {
        let mut plan = Self::empty();
        for meal in meals {
            plan.days[meal.day.index()].push(meal);
        }
        plan
    }

    pub fn meals_for(&self, day: DayOfWeek) -> &[Meal] {
        &self.days[day.index()]
    }

    /// Iterate over `(day, meals)` for all seven days, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &[Meal])> {
        DayOfWeek::ALL
            .into_iter()
            .map(move |day| (day, self.meals_for(day)))
    }

    /// Find a meal by identity on any day.
    pub fn find(&self, id: MealId) -> Option<&Meal> {
        self.days.iter().flatten().find(|meal| meal.id == id)
    }

    pub fn meal_count(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meal_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Groceries
// ---------------------------------------------------------------------------

/// Provenance label the backend uses for items added by hand.
pub const MANUAL_PROVENANCE: &str = "Manually Added";

/// Where a grocery item came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Generated from the ingredients of the named meal.
    Meal(String),
    /// Added by hand.
    Manual,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meal(name) => f.write_str(name),
            Self::Manual => f.write_str(MANUAL_PROVENANCE),
        }
    }
}

/// A line on the grocery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: GroceryItemId,
    pub name: String,
    pub quantity: String,
    #[serde(default)]
    pub purchased: bool,
    #[serde(
        rename = "mealSource",
        alias = "meal_source",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meal_source: Option<String>,
}

impl GroceryItem {
    /// A missing label and the manual sentinel both mean "added by hand".
    pub fn provenance(&self) -> Provenance {
        match self.meal_source.as_deref() {
            None | Some(MANUAL_PROVENANCE) => Provenance::Manual,
            Some(source) if source.trim().is_empty() => Provenance::Manual,
            Some(source) => Provenance::Meal(source.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// The authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Server time, UTC. The service sends it without an offset.
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
}

/// Accepts both `2024-01-01T00:00:00[.ffffff]` and RFC 3339 with an offset,
/// which is normalized to UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(Some(naive));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.naive_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(id: i64, day: DayOfWeek, name: &str) -> Meal {
        Meal {
            id: MealId(id),
            day,
            name: name.to_string(),
            notes: String::new(),
            ingredients: vec![],
        }
    }

    #[test]
    fn day_display_and_parse() {
        for day in DayOfWeek::ALL {
            let parsed: DayOfWeek = day.to_string().parse().unwrap();
            assert_eq!(parsed, day);
        }
        assert_eq!("friday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert!("Funday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn day_serializes_as_label() {
        let json = serde_json::to_string(&DayOfWeek::Wednesday).unwrap();
        assert_eq!(json, "\"Wednesday\"");
    }

    #[test]
    fn empty_plan_has_seven_empty_days() {
        let plan = WeeklyPlan::empty();
        let days: Vec<_> = plan.iter().collect();
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|(_, meals)| meals.is_empty()));
        assert!(plan.is_empty());
    }

    #[test]
    fn from_meals_groups_by_day_in_order() {
        let plan = WeeklyPlan::from_meals(vec![
            meal(1, DayOfWeek::Monday, "Pasta"),
            meal(2, DayOfWeek::Sunday, "Roast"),
            meal(3, DayOfWeek::Monday, "Salad"),
        ]);

        let monday: Vec<_> = plan
            .meals_for(DayOfWeek::Monday)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(monday, ["Pasta", "Salad"]);
        assert_eq!(plan.meals_for(DayOfWeek::Sunday).len(), 1);
        assert!(plan.meals_for(DayOfWeek::Tuesday).is_empty());
        assert_eq!(plan.meal_count(), 3);
        assert_eq!(plan.find(MealId(2)).unwrap().name, "Roast");
        assert!(plan.find(MealId(9)).is_none());
    }

    #[test]
    fn grocery_item_provenance() {
        let mut item: GroceryItem = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Eggs",
            "quantity": "2",
            "purchased": false,
            "user_id": 1,
        }))
        .unwrap();
        assert_eq!(item.provenance(), Provenance::Manual);

        item.meal_source = Some(MANUAL_PROVENANCE.to_string());
        assert_eq!(item.provenance(), Provenance::Manual);

        item.meal_source = Some("Carbonara".to_string());
        assert_eq!(item.provenance(), Provenance::Meal("Carbonara".to_string()));
    }

    #[test]
    fn grocery_item_accepts_snake_case_source() {
        let item: GroceryItem = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Basil",
            "quantity": "1 bunch",
            "purchased": true,
            "meal_source": "Pesto",
        }))
        .unwrap();
        assert_eq!(item.meal_source.as_deref(), Some("Pesto"));
        assert!(item.purchased);
    }

    #[test]
    fn user_timestamp_without_offset() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "a@b.c",
            "created_at": "2024-01-01T00:00:00",
        }))
        .unwrap();
        let expected = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(user.created_at, Some(expected));

        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "a@b.c",
            "created_at": "2024-03-05T10:20:30.123456",
        }))
        .unwrap();
        assert_eq!(user.created_at.unwrap().format("%Y-%m-%d").to_string(), "2024-03-05");
    }

    #[test]
    fn user_timestamp_with_offset_is_utc() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "a@b.c",
            "created_at": "2024-01-01T02:00:00+02:00",
        }))
        .unwrap();
        assert_eq!(
            user.created_at.unwrap().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-01-01T00:00:00"
        );
    }

    #[test]
    fn user_timestamp_null_or_missing() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "a@b.c",
            "created_at": null,
        }))
        .unwrap();
        assert_eq!(user.created_at, None);

        let user: User =
            serde_json::from_value(serde_json::json!({ "id": 2, "email": "x@y.z" })).unwrap();
        assert_eq!(user.created_at, None);
    }

    #[test]
    fn ids_parse_from_cli_text() {
        assert_eq!(" 42 ".parse::<MealId>().unwrap(), MealId(42));
        assert!("abc".parse::<GroceryItemId>().is_err());
    }
}
