use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

use chrono::Utc;
use passerelleftpd::core_cli::Cli;
use passerelleftpd::core_registry::{FileEntry, PasswdBackend};
use passerelleftpd::{Config, FtpServer};

const DEFAULT_CONFIG_PATH: &str = "/etc/passerelleftpd.conf";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let config_path = if args.config.is_empty() {
        DEFAULT_CONFIG_PATH
    } else {
        args.config.as_str()
    };
    let config = Config::load_from_file(config_path)?;

    // The bundled backend answers logins from the static credential list in
    // the config file; embedding applications wire their own registry
    // through the library API instead.
    let credential_lines = config
        .auth
        .as_ref()
        .map(|auth| auth.users.clone())
        .unwrap_or_default();
    let started_at = Utc::now();
    let registry = Arc::new(PasswdBackend::new(&credential_lines).with_files(vec![
        FileEntry {
            is_directory: false,
            filename: String::from("welcome.txt"),
            parent_path: String::from("/"),
            length: 64,
            created_at: started_at,
            updated_at: started_at,
        },
    ]));

    FtpServer::new(&config, registry)?.run().await
}
