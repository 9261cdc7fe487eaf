//! Prints the worker listing in the terminal.

use clap::Parser;

use rust_workers_api::catalog::Role;
use rust_workers_api::client::{ClientConfig, WorkersClient};
use rust_workers_api::listing_view::{ListingView, ViewState};

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    about = "Show registered domestic workers from the catalog API",
    version
)]
struct Cli {
    /// Case-insensitive text matched against name or role
    #[arg(long)]
    search: Option<String>,
    /// Only show workers with this role (e.g. "Elder Care")
    #[arg(long)]
    role: Option<Role>,
    /// Open the contact details of the worker with this id
    #[arg(long)]
    contact: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_workers_api=warn".into()),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let client = WorkersClient::new(&config)?;
    let mut view = ListingView::new(config.page_size);
    if let Some(search) = cli.search {
        view.set_search(search);
    }
    view.set_role(cli.role);

    view.mount(&client).await;
    if let Some(id) = cli.contact {
        if !view.open_contact(&id) {
            eprintln!("No listed worker has id {}", id);
        }
    }

    print!("{}", view.render());

    if matches!(view.state(), ViewState::Errored(_)) {
        std::process::exit(1);
    }
    Ok(())
}
