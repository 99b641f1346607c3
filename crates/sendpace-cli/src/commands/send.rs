use std::sync::Arc;

use clap::Subcommand;
use sendpace_core::{PoolConfig, SchedulingService, SendRequest, SqliteStore};

#[derive(Subcommand)]
pub enum SendAction {
    /// Submit one send request for admission
    Submit {
        /// Recipient address
        recipient: String,
        /// Subject line
        #[arg(long, default_value = "")]
        subject: String,
        /// Plain-text body
        #[arg(long, default_value = "")]
        body: String,
        /// Display name shown next to the assigned mailbox
        #[arg(long, default_value = "")]
        sender_name: String,
    },
}

pub fn run(action: SendAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SendAction::Submit {
            recipient,
            subject,
            body,
            sender_name,
        } => {
            let config = PoolConfig::load()?;
            let pool = config.to_pool()?;
            let store = Arc::new(SqliteStore::open()?);
            let service = SchedulingService::new(store, pool);

            let outcome = service.schedule(&SendRequest {
                recipient,
                subject,
                body_text: body,
                sender_name,
            })?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
