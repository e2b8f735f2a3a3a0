//! Mall Discord commands - browse items, redeem them, list your orders.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, caller_account, handlers::autocomplete, report_failure},
        core::{item, spend},
        errors::Result,
    };
    use poise::serenity_prelude as serenity;

    /// Lists items you can redeem.
    #[poise::command(slash_command)]
    pub async fn mall(ctx: Context<'_>) -> Result<()> {
        let items = item::get_active_items(&ctx.data().database).await?;

        if items.is_empty() {
            ctx.say("🛒 The mall is empty right now.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = items
            .into_iter()
            .map(|i| {
                let stock = if i.stock > 0 {
                    format!("{} left", i.stock)
                } else {
                    "Out of stock".to_string()
                };
                (i.name, format!("**{}** points • {stock}", i.price), false)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title("**Points Mall**")
            .color(0x0058_65F2) // Discord purple
            .fields(fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Spends points on one unit of an item.
    #[poise::command(slash_command)]
    pub async fn redeem(
        ctx: Context<'_>,
        #[description = "Item to redeem"]
        #[autocomplete = "autocomplete::autocomplete_item_name"]
        item_name: String,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let db = &ctx.data().database;

        let Some(found) = item::get_item_by_name(db, &item_name).await? else {
            ctx.say(format!("❌ No item named '{item_name}' in the mall."))
                .await?;
            return Ok(());
        };

        match spend::authorize_spend(db, caller.id, found.id, chrono::Utc::now()).await {
            Ok(order) => {
                ctx.say(format!(
                    "✅ Redeemed **{}** for **{}** points. Order #{} is confirmed.",
                    found.name, order.points_spent, order.id
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Lists your redemption orders, newest first.
    #[poise::command(slash_command)]
    pub async fn orders(ctx: Context<'_>) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let db = &ctx.data().database;

        let orders = spend::get_orders_for_account(db, caller.id).await?;
        if orders.is_empty() {
            ctx.say("You haven't redeemed anything yet. Try `/mall`!")
                .await?;
            return Ok(());
        }

        let mut fields = Vec::new();
        for order in orders.into_iter().take(25) {
            let item_name = match item::get_item_by_id(db, order.item_id).await {
                Ok(Some(i)) => i.name,
                _ => "Unknown item".to_string(),
            };
            fields.push((
                format!("#{} {item_name}", order.id),
                format!(
                    "{} points • {:?} • {}",
                    order.points_spent,
                    order.status,
                    order.created_at.format("%Y-%m-%d")
                ),
                false,
            ));
        }

        let embed = serenity::CreateEmbed::default()
            .title("**Your Orders**")
            .color(0x0058_65F2)
            .fields(fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
