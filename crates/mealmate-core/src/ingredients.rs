//! Free-text ingredient entry.
//!
//! One ingredient per line, written as `quantity, name`. A line without a
//! comma is a bare name with quantity `"1"`. Only the first comma splits, so
//! a name typed without a quantity but containing a comma is read as
//! `quantity, name` (e.g. `"Salt, to taste"` gives quantity `"Salt"`).

use mealmate_api::models::{Ingredient, MealDraft};
use thiserror::Error;

/// Quantity assumed when a line has none.
pub const DEFAULT_QUANTITY: &str = "1";

/// Parse ingredient text. Never fails: blank lines and lines with an empty
/// name are skipped, everything else keeps its input order.
pub fn parse(text: &str) -> Vec<Ingredient> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Ingredient> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (quantity, name) = match line.split_once(',') {
        Some((quantity, name)) => (quantity.trim(), name.trim()),
        None => (DEFAULT_QUANTITY, line),
    };

    if name.is_empty() {
        return None;
    }
    Some(Ingredient::new(quantity, name))
}

/// Inverse of [`parse`]: one `quantity, name` line per ingredient.
pub fn serialize(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(|i| format!("{}, {}", i.quantity, i.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reasons a meal form cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("meal name is required")]
    MissingName,

    #[error("at least one ingredient is required")]
    NoIngredients,
}

/// Check a meal form and build the draft it describes.
pub fn validate_meal_form(
    name: &str,
    notes: &str,
    ingredients_text: &str,
) -> Result<MealDraft, FormError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FormError::MissingName);
    }

    let ingredients = parse(ingredients_text);
    if ingredients.is_empty() {
        return Err(FormError::NoIngredients);
    }

    Ok(MealDraft {
        name: name.to_owned(),
        notes: notes.trim().to_owned(),
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_and_name() {
        assert_eq!(
            parse("200g, Spaghetti"),
            vec![Ingredient::new("200g", "Spaghetti")]
        );
    }

    #[test]
    fn bare_name_defaults_quantity() {
        assert_eq!(parse("Large eggs"), vec![Ingredient::new("1", "Large eggs")]);
    }

    #[test]
    fn later_commas_stay_in_name() {
        assert_eq!(
            parse("2 cans, tomatoes, chopped"),
            vec![Ingredient::new("2 cans", "tomatoes, chopped")]
        );
    }

    #[test]
    fn blank_lines_and_empty_names_are_skipped() {
        let text = "\n  \n200g, Spaghetti\n3,\n  ,  \nPecorino\n\n";
        let parsed = parse(text);
        assert_eq!(
            parsed,
            vec![
                Ingredient::new("200g", "Spaghetti"),
                Ingredient::new("1", "Pecorino"),
            ]
        );
    }

    #[test]
    fn count_matches_lines_with_names() {
        let text = "a\n\n1, b\n2,\nc, d\n   \n";
        let with_names = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter(|l| match l.split_once(',') {
                Some((_, name)) => !name.trim().is_empty(),
                None => true,
            })
            .count();
        assert_eq!(parse(text).len(), with_names);
        assert_eq!(with_names, 3);
    }

    #[test]
    fn whitespace_is_trimmed_and_crlf_accepted() {
        assert_eq!(
            parse("  1 tbsp ,  olive oil  \r\n\tbasil\t"),
            vec![
                Ingredient::new("1 tbsp", "olive oil"),
                Ingredient::new("1", "basil"),
            ]
        );
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let ingredients = vec![
            Ingredient::new("200g", "Spaghetti"),
            Ingredient::new("1", "Large eggs"),
            Ingredient::new("a pinch", "Black pepper"),
        ];
        let text = serialize(&ingredients);
        assert_eq!(text, "200g, Spaghetti\n1, Large eggs\na pinch, Black pepper");
        assert_eq!(parse(&text), ingredients);
    }

    #[test]
    fn comma_in_name_without_quantity_is_misread() {
        // Known limitation: the first comma always separates quantity.
        assert_eq!(
            parse("Salt, to taste"),
            vec![Ingredient::new("Salt", "to taste")]
        );
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn form_requires_name() {
        assert_eq!(
            validate_meal_form("   ", "", "1, egg"),
            Err(FormError::MissingName)
        );
    }

    #[test]
    fn form_requires_an_ingredient() {
        assert_eq!(
            validate_meal_form("Omelette", "", "\n , \n"),
            Err(FormError::NoIngredients)
        );
    }

    #[test]
    fn form_builds_trimmed_draft() {
        let draft = validate_meal_form(" Omelette ", " quick ", "3, eggs\nchives").unwrap();
        assert_eq!(draft.name, "Omelette");
        assert_eq!(draft.notes, "quick");
        assert_eq!(
            draft.ingredients,
            vec![Ingredient::new("3", "eggs"), Ingredient::new("1", "chives")]
        );
    }
}
