//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;
use flowcast_server::ServerConfig;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Flowcast web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse allowed CORS origins from environment (comma-separated)
    let allowed_origins: Vec<String> = std::env::var("FLOWCAST_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let config = ServerConfig { allowed_origins };

    let db = open_db(db_path, no_encrypt)?;
    let static_dir_str = static_dir.and_then(|p| p.to_str());

    flowcast_server::serve_with_config(db, host, port, static_dir_str, config).await
}
