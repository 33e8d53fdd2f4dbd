use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::data::seed;
use crate::error::{BackendError, ConfigurationError};
use crate::security::PasswordHasher;
use crate::store::Store;

pub mod config;
pub mod data;
pub mod error;
pub mod role;
pub mod security;
pub mod store;
pub mod util;

pub use data::activity::db::{ActivityDbExt, ActivityQuery};
pub use data::teacher::db::TeacherDbExt;
pub use store::{Backend, DocumentCollection};

/// Loads configuration, picks a storage backend and seeds empty collections.
pub async fn create(log_level: Option<Level>) -> Result<Store, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    let hasher = PasswordHasher::new(c.password_cost)?;

    let mut store = Store::connect(&c).await;

    tracing::info!("Initializing {} collections...", store.backend());
    seed::init_database(&mut store, &hasher).await?;

    Ok(store)
}
