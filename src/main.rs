use aperture::cli::{self, Cli, Command, Context};
use aperture::config::Config;
use aperture::remote;
use aperture::session::Session;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let session = Session::new(cli.identity.as_deref(), &config.admins);
    let sources = remote::registry::build_source_registry(&config)?;
    let ctx = Context {
        config,
        session,
        sources,
        offline: cli.offline,
    };

    match cli.command {
        Command::Endpoints => cli::endpoints::list_endpoints(&ctx)?,
        Command::List {
            screen,
            search,
            page,
            format,
        } => cli::list::list(&ctx, &screen, search.as_deref(), page, &format).await?,
        Command::Show { screen, id } => cli::list::show(&ctx, &screen, &id).await?,
        Command::Create { screen, fields } => cli::mutate::create(&ctx, &screen, fields).await?,
        Command::Update { screen, id, fields } => {
            cli::mutate::update(&ctx, &screen, &id, fields).await?
        }
        Command::Delete { screen, id } => cli::mutate::delete(&ctx, &screen, &id).await?,
        Command::Status { screen, id, status } => {
            cli::mutate::set_status(&ctx, &screen, &id, &status).await?
        }
        Command::Export {
            screen,
            search,
            output,
        } => {
            cli::export::export_csv(&ctx, &screen, search.as_deref(), output.as_deref()).await?
        }
    }

    Ok(())
}
