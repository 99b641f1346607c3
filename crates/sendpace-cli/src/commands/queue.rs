use clap::Subcommand;
use sendpace_core::{day_bounds, Clock, ScheduleStore, SqliteStore, SystemClock};

#[derive(Subcommand)]
pub enum QueueAction {
    /// List today's committed sends
    Today,
    /// List sends due around now
    Due {
        /// Window in minutes on each side of the anchor
        #[arg(long, default_value_t = 5)]
        window: i64,
        /// Anchor instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: QueueAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let now = SystemClock.now_utc();
    match action {
        QueueAction::Today => {
            let (start, end) = day_bounds(now);
            let sends = store.query_day(start, end)?;
            println!("{}", serde_json::to_string_pretty(&sends)?);
        }
        QueueAction::Due { window, at } => {
            let anchor = match at {
                Some(raw) => match chrono::DateTime::parse_from_rfc3339(&raw) {
                    Ok(parsed) => parsed.with_timezone(&chrono::Utc),
                    Err(_) => {
                        eprintln!("invalid --at instant: {raw}");
                        std::process::exit(1);
                    }
                },
                None => now,
            };
            let sends = store.query_due(anchor, window)?;
            println!("{}", serde_json::to_string_pretty(&sends)?);
        }
    }
    Ok(())
}
