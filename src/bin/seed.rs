use clap::Parser;

use gym_admin::{
    backend::RestBackend,
    config::{BackendKind, Settings},
    seed,
};

/// Fill the hosted backend with demo plans, members, payments and check-ins.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Number of members to create
    #[arg(short, long, default_value_t = 25)]
    members: usize,

    /// Project URL; overrides GYM_ADMIN__BACKEND__URL
    #[arg(long)]
    url: Option<String>,

    /// Service key; overrides GYM_ADMIN__BACKEND__SERVICE_KEY
    #[arg(long)]
    service_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gym_admin=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = Settings::new()?.backend;
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(service_key) = args.service_key {
        config.service_key = service_key;
    }
    if config.kind != BackendKind::Rest && config.url.is_empty() {
        anyhow::bail!("The in-memory backend seeds itself at startup; set a backend url to seed a hosted project");
    }

    println!("Seeding {} with {} members...", config.url, args.members);
    let backend = RestBackend::new(&config)?;
    let report = seed::seed_demo_data(&backend, args.members).await?;

    println!(
        "Done: {} plans, {} members, {} payments, {} check-ins",
        report.plans, report.members, report.payments, report.check_ins
    );
    Ok(())
}
