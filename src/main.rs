use anyhow::Context;
use clap::Parser;
use listing_detail::models::ListingId;
use listing_detail::view::{Route, Section, StaticSession, ViewHost};
use listing_detail::{Config, HttpMarketApi, ListingDetail, RouteParams};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load a listing detail screen from the market API and print it
#[derive(Debug, Parser)]
#[command(name = "listing-detail", version)]
struct Cli {
    /// Listing to open
    id: ListingId,

    /// Section to open the screen on (info, reviews, transactions)
    #[arg(long)]
    section: Option<String>,

    /// Override MARKET_API_URL
    #[arg(long)]
    base_url: Option<String>,
}

/// Host without a screen: navigation and scrolling end up in the log
struct LogHost;

impl ViewHost for LogHost {
    fn navigate(&self, route: Route) {
        info!("Navigate to {:?}", route);
    }

    fn scroll_into_view(&self, section: Section) {
        info!("Scroll to {}", section);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    info!("Market API at {}", config.base_url);

    let api = HttpMarketApi::new(&config).context("Failed to create HTTP client")?;
    let session = StaticSession::from_config(&config);
    let mut view = ListingDetail::new(Arc::new(api), Arc::new(session), Arc::new(LogHost), &config);

    let mut params = RouteParams::new(cli.id);
    params.section = cli.section;
    view.activate(params).await;

    if let Some(error) = view.error() {
        eprintln!("Error: {}", error);
    }

    let Some(detail) = view.listing() else {
        anyhow::bail!("Listing {} could not be loaded", cli.id);
    };
    let listing = &detail.listing;

    println!("{} ({:.2})", listing.title, listing.price);
    println!("   Status: {:?}, {:?} / {:?}", listing.status, listing.kind, listing.frequency);
    for group in &detail.category_groups {
        println!("   {}: {}", group.name, group.tags.join(", "));
    }
    if let Some(section) = view.revealed_section() {
        println!("   Showing: {}", section);
    }

    let reviews = view.reviews();
    println!();
    println!("Reviews ({} avg, {} total)", reviews.score, reviews.reviews.len());
    for review in &reviews.reviews {
        let name = review.reviewer_name.as_deref().unwrap_or("anonymous");
        println!("   {} - {}: {}", review.score, name, review.text);
    }

    if view.is_owner() {
        if let Some(rating) = view.seller_rating() {
            println!();
            println!("Seller rating: {:.1}", rating);
        }
        println!();
        println!("Transactions ({})", view.transactions().len());
        for entry in view.transactions() {
            let tx = &entry.transaction;
            let score = entry
                .customer_reviews
                .as_ref()
                .map(|r| format!("{:.1}", r.score))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   #{} customer {} ({}) {:?}, {} bookings",
                tx.transaction_id,
                tx.customer_id,
                score,
                tx.status,
                entry.bookings.len()
            );
        }
    }

    let json = serde_json::to_string_pretty(detail)?;
    info!("Listing view:\n{}", json);

    Ok(())
}
