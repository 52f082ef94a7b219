//! Database migration runner for BubbleBank.
//!
//! Usage:
//!   migrator up      - Create the accounts, entries and transfers tables
//!   migrator down    - Drop them again
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Reads `DATABASE_URL` from the environment or `.env`.

use bubblebank_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own subscriber.
    cli::run_cli(Migrator).await;
}
