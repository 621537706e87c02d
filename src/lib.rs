use dotenv::dotenv;

use bson::Document;
use mongodb::sync::{Client, Collection, Database};

use std::env;

pub mod accessibility;
pub mod altitude;
pub mod error;
pub mod geo;
pub mod gpx;
pub mod manager;
pub mod mapper;
pub mod models;
pub mod stats;
pub mod trails;

use crate::error::{Error, Result};

/// Handle to the trail database, built once at startup. The driver keeps the
/// connection pool; this is the only shared state in the process.
pub struct Datasource {
    db: Database,
}

impl Datasource {
    /// Connects using `TRAILS_DB_URI` and `TRAILS_DB_NAME` from the
    /// environment (a `.env` file is honored).
    pub fn connect() -> Result<Self> {
        dotenv().ok();

        let uri = env::var("TRAILS_DB_URI")
            .map_err(|_| Error::Config("TRAILS_DB_URI not set".to_string()))?;
        let name = env::var("TRAILS_DB_NAME").unwrap_or_else(|_| "sentiero".to_string());
        let client = Client::with_uri_str(&uri)?;
        Ok(Datasource {
            db: client.database(&name),
        })
    }

    pub(crate) fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}
