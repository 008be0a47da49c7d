use clap::Parser;
use rocketshoes_cli::{Args, render_cart, run};
use rocketshoes_infra::{CartConfig, build_cart_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    rocketshoes_observability::init(&args.log_level);

    // Flags take precedence over the environment.
    let mut config = match args.db.clone() {
        Some(db) => CartConfig::from_env_with_db(db)?,
        None => CartConfig::from_env()?,
    };
    if let Some(api_url) = args.api_url.clone() {
        config.api_url = api_url;
    }

    let store = build_cart_store(&config).await?;
    tracing::debug!(command = ?args.command, "running cart command");

    match run(&store, &args.command).await {
        Ok(_) => {
            print!("{}", render_cart(&store.cart()));
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            print!("{}", render_cart(&store.cart()));
            std::process::exit(1);
        }
    }
}
