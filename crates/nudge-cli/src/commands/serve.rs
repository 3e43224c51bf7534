//! Server command implementation

use std::path::Path;

use anyhow::Result;
use nudge_core::EngineConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    engine: EngineConfig,
) -> Result<()> {
    println!("🚀 Starting Nudge web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let config = nudge_server::ServerConfig::from_env(engine);
    if config.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!(
            "   🌐 CORS origins: {} ({})",
            config.allowed_origins.join(", "),
            nudge_server::CORS_ORIGINS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    nudge_server::serve(db, host, port, config).await?;

    Ok(())
}
