//! Messaging commands.

use tracing::info;

use campus_market_core::{ProductId, ThreadId};
use campus_market_storefront::Marketplace;

use super::CommandResult;

/// List the signed-in user's conversations.
///
/// # Errors
///
/// Returns an error if signed out.
pub fn threads(market: &Marketplace) -> CommandResult {
    let user = market.auth().require_user()?.id.clone();
    let threads = market.my_threads()?;
    if threads.is_empty() {
        info!("No conversations");
    }
    for thread in &threads {
        let with = thread
            .other_participant(&user)
            .map_or_else(String::new, ToString::to_string);
        let last = thread
            .last_message
            .as_ref()
            .map_or("", |m| m.content.as_str());
        info!(
            "{} with {} ({} unread): {}",
            thread.id,
            with,
            market.messaging().unread_count_for(&thread.id, &user),
            last
        );
    }
    Ok(())
}

/// Show a conversation and mark it read.
///
/// # Errors
///
/// Returns an error if the thread is unknown or the user is not in it.
pub fn show(market: &mut Marketplace, thread_id: &str) -> CommandResult {
    let messages = market.open_thread(&ThreadId::new(thread_id))?;
    for message in &messages {
        info!(
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.sender_id,
            message.content
        );
    }
    Ok(())
}

/// Reply in a conversation.
///
/// # Errors
///
/// Returns an error if the thread is unknown, the user is not in it, or the
/// content is empty.
pub fn send(market: &mut Marketplace, thread_id: &str, content: &str) -> CommandResult {
    let message = market.reply(&ThreadId::new(thread_id), content)?;
    info!("Sent {} to {}", message.id, message.receiver_id);
    Ok(())
}

/// Open a conversation with a product's seller.
///
/// # Errors
///
/// Returns an error if the product or its shop is unknown, or the user owns it.
pub fn contact(market: &mut Marketplace, product_id: &str) -> CommandResult {
    let thread = market.contact_seller(&ProductId::new(product_id))?;
    info!("Conversation {} ready", thread.id);
    Ok(())
}
