//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests active task titles and item names as the user types.

use crate::{
    bot::Context,
    core::{item, task},
};

/// Discord's limit on autocomplete choices
const MAX_CHOICES: usize = 25;

fn matching(names: impl Iterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matches: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect();
    matches.sort();
    matches
}

/// Provides autocomplete suggestions for active task titles.
pub async fn autocomplete_task_title(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Ok(tasks) = task::get_active_tasks(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(tasks.into_iter().map(|t| t.title), partial)
}

/// Provides autocomplete suggestions for active item names.
pub async fn autocomplete_item_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Ok(items) = item::get_active_items(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(items.into_iter().map(|i| i.name), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_and_sorted() {
        let names = ["Mug", "Coffee voucher", "T-shirt"].map(String::from);
        assert_eq!(
            matching(names.into_iter(), "U"),
            vec!["Coffee voucher".to_string(), "Mug".to_string()]
        );
    }
}
