//! Client-side state synchronization for mealmate.
//!
//! Owns the weekly plan and grocery list, mediates every mutation through the
//! remote service, reconciles by full reload, and reports each outcome as a
//! transient notification.

pub mod context;
pub mod ingredients;
pub mod notify;
pub mod session;
pub mod store;

pub use context::AppContext;
pub use notify::{Notification, NotificationCenter, Severity};
pub use session::{SessionManager, SessionState};
pub use store::{PlanState, PlanStore};
