//! the `sweep` subcommand - runs one expiry sweep pass and exits.
//!
//! useful for operating without the background task (cron-style) and
//! for poking a deployment after downtime so overdue auctions finalize
//! immediately instead of waiting for the next server tick.

use clap::Args;
use color_eyre::eyre::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use gavel_db::GavelDb;
use gavel_types::Config;

use crate::{ExpirySweeper, NotificationDispatcher, RoomGateway};

use super::serve::parse_database_url;

/// run a single auction expiry sweep
#[derive(Args, Debug)]
pub struct SweepCommand {
    /// database url (sqlite:// or postgres://)
    #[arg(long, env = "GAVEL_DATABASE_URL")]
    database_url: Option<String>,
}

impl SweepCommand {
    /// run the sweep command
    pub async fn run(self) -> Result<()> {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        let mut config = Config::default();
        if let Some(db_url) = self.database_url {
            config.database = parse_database_url(&db_url)?;
        }

        let db = GavelDb::new(&config)
            .await
            .context("failed to initialize database")?;

        // a one-shot sweep has no connected watchers; broadcasts land in
        // empty rooms while notifications and settlements still persist
        let rooms = RoomGateway::new(config.auction.room_capacity);
        let notifications = NotificationDispatcher::new(db.clone());
        let sweeper = ExpirySweeper::new(db, rooms, notifications, 1);

        let stats = sweeper.sweep().await;
        info!(
            sold = stats.sold,
            archived = stats.archived,
            skipped = stats.skipped,
            "sweep complete"
        );

        Ok(())
    }
}
