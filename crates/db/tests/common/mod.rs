//! Per-test database fixture and random data helpers.
//!
//! Uses `DATABASE_URL` when set, otherwise starts a throwaway Postgres
//! container. Tests print a message and return early when neither works.

#![allow(dead_code)]

use std::env;

use rand::Rng;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::Mutex;

use bubblebank_db::migration::Migrator;
use bubblebank_db::{Account, CreateAccountParams, Querier, SqlStore};
use bubblebank_shared::config::StoreConfig;
use bubblebank_shared::types::{Currency, OverdraftPolicy};

/// Serializes migrations when several tests share one `DATABASE_URL`.
static MIGRATION_LOCK: Mutex<()> = Mutex::const_new(());

/// A migrated database, alive until the value is dropped.
pub struct TestDb {
    pub db: DatabaseConnection,
    _container: Option<ContainerAsync<Postgres>>,
}

impl TestDb {
    /// Store rejecting overdrafts.
    pub fn store(&self) -> SqlStore {
        SqlStore::new(self.db.clone())
    }

    /// Store built from an explicit config.
    pub fn store_with(&self, config: &StoreConfig) -> SqlStore {
        SqlStore::with_config(self.db.clone(), config)
    }

    /// Store allowing overdrafts.
    pub fn overdraft_store(&self) -> SqlStore {
        self.store_with(&StoreConfig {
            overdraft: OverdraftPolicy::Allow,
            ..StoreConfig::default()
        })
    }
}

async fn start() -> Result<TestDb, String> {
    let (url, container) = if let Ok(url) = env::var("DATABASE_URL") {
        (url, None)
    } else {
        let container = Postgres::default()
            .start()
            .await
            .map_err(|e| e.to_string())?;
        let host = container.get_host().await.map_err(|e| e.to_string())?;
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| e.to_string())?;
        (
            format!("postgres://postgres:postgres@{host}:{port}/postgres"),
            Some(container),
        )
    };

    let db = Database::connect(&url).await.map_err(|e| e.to_string())?;
    {
        let _guard = MIGRATION_LOCK.lock().await;
        Migrator::up(&db, None).await.map_err(|e| e.to_string())?;
    }

    Ok(TestDb {
        db,
        _container: container,
    })
}

/// Returns a migrated database, or `None` after printing why it is unavailable.
pub async fn setup() -> Option<TestDb> {
    match start().await {
        Ok(test_db) => Some(test_db),
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            None
        }
    }
}

/// Six random lowercase letters.
pub fn random_owner() -> String {
    let mut rng = rand::rng();
    (0..6)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

/// A balance between 0 and 1000.
pub fn random_money() -> i64 {
    rand::rng().random_range(0..=1000)
}

/// One of the supported currencies.
pub fn random_currency() -> Currency {
    Currency::ALL[rand::rng().random_range(0..Currency::ALL.len())]
}

/// Creates an account with random owner, balance and currency.
pub async fn create_random_account<Q: Querier>(store: &Q) -> Account {
    let params = CreateAccountParams {
        owner: random_owner(),
        balance: random_money(),
        currency: random_currency().to_string(),
    };
    let account = store.create_account(params.clone()).await.unwrap();

    assert!(account.id > 0);
    assert_eq!(account.owner, params.owner);
    assert_eq!(account.balance, params.balance);
    assert_eq!(account.currency, params.currency);
    account
}

/// Creates an account with the given balance and currency.
pub async fn create_account<Q: Querier>(store: &Q, balance: i64, currency: Currency) -> Account {
    store
        .create_account(CreateAccountParams {
            owner: random_owner(),
            balance,
            currency: currency.to_string(),
        })
        .await
        .unwrap()
}
