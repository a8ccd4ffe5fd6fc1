//! Terminal rendering of the plan, the grocery list and notifications.

use std::fmt::Write as _;

use mealmate_api::models::{GroceryItem, MealDraft, Provenance, WeeklyPlan};
use mealmate_core::{Notification, NotificationCenter, Severity};

/// A failure that has already been shown to the user as a notification.
/// `main` exits non-zero without printing it again.
#[derive(Debug, thiserror::Error)]
#[error("operation failed")]
pub struct Reported;

/// Print and clear everything the last operation posted.
pub fn flush_notifications(center: &NotificationCenter) {
    for notification in center.drain() {
        let line = render_notification(&notification);
        match notification.severity {
            Severity::Error => eprintln!("{line}"),
            Severity::Success | Severity::Info => println!("{line}"),
        }
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let icon = match notification.severity {
        Severity::Success => "+",
        Severity::Error => "!",
        Severity::Info => "-",
    };
    format!("[{icon}] {}", notification.message)
}

pub fn render_plan(plan: &WeeklyPlan) -> String {
    let mut out = String::new();
    for (day, meals) in plan.iter() {
        let _ = writeln!(out, "{day}");
        if meals.is_empty() {
            let _ = writeln!(out, "  (nothing planned)");
        }
        for meal in meals {
            let _ = writeln!(out, "  #{:<5} {}", meal.id.0, meal.name);
            if !meal.notes.is_empty() {
                let _ = writeln!(out, "         {}", meal.notes);
            }
            for ingredient in &meal.ingredients {
                let _ = writeln!(out, "         - {} {}", ingredient.quantity, ingredient.name);
            }
        }
    }
    out
}

/// Items grouped by the meal they came from, in order of first appearance.
pub fn render_grocery_list(items: &[GroceryItem]) -> String {
    if items.is_empty() {
        return "Grocery list is empty.\n".to_string();
    }

    let mut groups: Vec<(Provenance, Vec<&GroceryItem>)> = Vec::new();
    for item in items {
        let provenance = item.provenance();
        match groups.iter_mut().find(|(p, _)| *p == provenance) {
            Some((_, group)) => group.push(item),
            None => groups.push((provenance, vec![item])),
        }
    }

    let mut out = String::new();
    for (provenance, group) in groups {
        let _ = writeln!(out, "{provenance}");
        for item in group {
            let mark = if item.purchased { "x" } else { " " };
            let _ = writeln!(
                out,
                "  [{mark}] #{:<5} {} ({})",
                item.id.0, item.name, item.quantity
            );
        }
    }
    out
}

pub fn render_suggestions(ideas: &[MealDraft]) -> String {
    let mut out = String::new();
    for (n, idea) in ideas.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", n + 1, idea.name);
        if !idea.notes.is_empty() {
            let _ = writeln!(out, "   {}", idea.notes);
        }
        for ingredient in &idea.ingredients {
            let _ = writeln!(out, "   - {} {}", ingredient.quantity, ingredient.name);
        }
    }
    out
}
