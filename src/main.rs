use std::sync::Arc;

use clap::Parser;
use tokenauth::cli::{
    Args, build_config, init_logging, load_secret, open_database, run_command, seed_admin,
};
use tokenauth::{AuthService, BcryptHasher, SystemClock};
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(secret) = load_secret(args.secret_key_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(config) = build_config(secret, &args) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let hasher = Arc::new(BcryptHasher::new(args.bcrypt_cost));

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password)
        && seed_admin(&db, hasher.as_ref(), email, password)
            .await
            .is_none()
    {
        std::process::exit(1);
    }

    let service = AuthService::new(
        &config,
        Arc::new(db.clone()),
        hasher.clone(),
        Arc::new(SystemClock),
    )
    .unwrap_or_else(|e| {
        error!(error = %e, "Failed to initialize password hasher");
        std::process::exit(1);
    });

    match run_command(&args.command, &service, &db, hasher.as_ref()).await {
        Ok(output) => println!("{}", output),
        Err(output) => {
            eprintln!("{}", output);
            std::process::exit(1);
        }
    }
}
