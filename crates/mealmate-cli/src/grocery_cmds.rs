//! `mealmate grocery list | add | toggle | remove | clear-purchased`.

use anyhow::{Result, bail};

use mealmate_core::AppContext;

use crate::GroceryCommands;
use crate::auth_cmds::require_login;
use crate::output::{Reported, render_grocery_list};

pub async fn run_grocery_command(command: GroceryCommands, ctx: &AppContext) -> Result<()> {
    require_login(ctx)?;
    match command {
        GroceryCommands::List => {
            ctx.store.reload_groceries().await.map_err(|_| Reported)?;
            print!("{}", render_grocery_list(&ctx.store.grocery_list()));
        }
        GroceryCommands::Add { name, quantity } => {
            if name.trim().is_empty() {
                bail!("item name is required");
            }
            ctx.store
                .add_grocery_item_manually(&name, &quantity)
                .await
                .map_err(|_| Reported)?;
        }
        GroceryCommands::Toggle { id } => {
            // Toggling flips the locally known flag, so the list must be fresh.
            ctx.store.reload_groceries().await.map_err(|_| Reported)?;
            let toggled = ctx
                .store
                .toggle_grocery_item(id)
                .await
                .map_err(|_| Reported)?;
            if toggled.is_none() {
                bail!("no grocery item #{}", id.0);
            }
        }
        GroceryCommands::Remove { id } => {
            ctx.store.reload_groceries().await.map_err(|_| Reported)?;
            ctx.store
                .delete_grocery_item(id)
                .await
                .map_err(|_| Reported)?;
        }
        GroceryCommands::ClearPurchased => {
            ctx.store
                .clear_purchased_items()
                .await
                .map_err(|_| Reported)?;
        }
    }
    Ok(())
}
