//! Configuration for Terrace
//!
//! CLI arguments and environment variable handling using clap. Embedding
//! services flatten `Args` into their own argument struct or parse it
//! directly.

use clap::Parser;

/// Terrace - hierarchy-scoped content visibility core
#[derive(Parser, Debug, Clone)]
#[command(name = "terrace")]
#[command(about = "Hierarchy targeting and visibility engine")]
pub struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "terrace")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

impl Args {
    /// Validate configuration values that clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        if !self.mongodb_uri.starts_with("mongodb://")
            && !self.mongodb_uri.starts_with("mongodb+srv://")
        {
            return Err(format!(
                "MONGODB_URI must be a mongodb:// or mongodb+srv:// URI, got '{}'",
                self.mongodb_uri
            ));
        }
        if self.mongodb_db.is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }
        Ok(())
    }
}
