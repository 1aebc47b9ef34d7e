//! Campus Market CLI - drive the marketplace state from a terminal.
//!
//! State is persisted as JSON files under `CAMPUS_MARKET_DATA_DIR`, so a
//! session started with `login` carries over to later invocations.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as a buyer and browse
//! cm-cli login -e buyer1@campus.edu -p secret
//! cm-cli products --category electronics
//!
//! # Buy something
//! cm-cli cart add 2 --quantity 2
//! cm-cli checkout
//!
//! # Switch to the seller and confirm
//! cm-cli login -e seller1@campus.edu -p secret -r seller
//! cm-cli orders confirm ord_...
//! cm-cli dashboard
//! ```
//!
//! # Commands
//!
//! - `reset` - Remove every persisted key
//! - `login` / `logout` / `whoami` - Session
//! - `products` - Browse the catalog
//! - `cart` / `checkout` - Shopping cart
//! - `orders` - Order lifecycle
//! - `messages` - Buyer/seller conversations
//! - `payouts` / `dashboard` - Seller earnings

#![cfg_attr(not(test), forbid(unsafe_code))]

use campus_market_core::{Naira, UserRole};
use campus_market_storefront::config::MarketConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(author, version, about = "Campus Market CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove every persisted key, restoring the seed data
    Reset,
    /// Sign in
    Login {
        /// Email address; the part before `@` becomes the user id
        #[arg(short, long)]
        email: String,

        /// Password (any non-empty value)
        #[arg(short, long)]
        password: String,

        /// Role (`buyer`, `seller`, `admin`)
        #[arg(short, long, default_value = "buyer")]
        role: UserRole,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the catalog
    Products {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Match name or category
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place one order per shop from the cart
    Checkout,
    /// Order lifecycle
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Conversations
    Messages {
        #[command(subcommand)]
        action: MessageAction,
    },
    /// Seller payouts
    Payouts {
        #[command(subcommand)]
        action: PayoutAction,
    },
    /// Seller dashboard for today
    Dashboard,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove { product_id: String },
    /// Show cart lines and totals
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Orders placed (or, with `--sales`, received)
    List {
        #[arg(long)]
        sales: bool,
    },
    /// Show one order
    Show { order_id: String },
    /// Attach proof of payment (buyer)
    SubmitProof {
        order_id: String,

        /// Screenshot as a data URI
        #[arg(short, long)]
        screenshot: String,
    },
    /// Confirm payment (seller)
    Confirm { order_id: String },
    /// Mark delivered (seller)
    Deliver { order_id: String },
    /// Cancel (buyer or seller)
    Cancel { order_id: String },
}

#[derive(Subcommand)]
enum MessageAction {
    /// List conversations
    Threads,
    /// Show a conversation and mark it read
    Show { thread_id: String },
    /// Reply in a conversation
    Send { thread_id: String, content: String },
    /// Open a conversation with a product's seller
    Contact { product_id: String },
}

#[derive(Subcommand)]
enum PayoutAction {
    /// Withdrawable balance
    Balance,
    /// Request a withdrawal
    Request {
        #[arg(value_parser = parse_amount)]
        amount: Naira,
    },
    /// Payout history
    List,
}

fn parse_amount(s: &str) -> Result<Naira, String> {
    Naira::parse(s).map_err(|e| e.to_string())
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &MarketConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(config: &MarketConfig) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_market_cli=info,campus_market_storefront=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match MarketConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: MarketConfig) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Reset) {
        return commands::session::reset(&config);
    }

    let mut market = commands::open(config)?;

    let outcome = match cli.command {
        Commands::Reset => Ok(()),
        Commands::Login {
            email,
            password,
            role,
        } => commands::session::login(&mut market, &email, password, role),
        Commands::Logout => commands::session::logout(&mut market),
        Commands::Whoami => commands::session::whoami(&market),
        Commands::Products {
            category,
            search,
            page,
        } => commands::products::list(&market, category, search, page).await,
        Commands::Cart { action } => match action {
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&mut market, &product_id, quantity),
            CartAction::Remove { product_id } => commands::cart::remove(&mut market, &product_id),
            CartAction::Show => commands::cart::show(&market),
            CartAction::Clear => commands::cart::clear(&mut market),
        },
        Commands::Checkout => commands::cart::checkout(&mut market),
        Commands::Orders { action } => match action {
            OrderAction::List { sales } => commands::orders::list(&market, sales),
            OrderAction::Show { order_id } => commands::orders::show(&market, &order_id),
            OrderAction::SubmitProof {
                order_id,
                screenshot,
            } => commands::orders::submit_proof(&mut market, &order_id, screenshot),
            OrderAction::Confirm { order_id } => commands::orders::confirm(&mut market, &order_id),
            OrderAction::Deliver { order_id } => commands::orders::deliver(&mut market, &order_id),
            OrderAction::Cancel { order_id } => commands::orders::cancel(&mut market, &order_id),
        },
        Commands::Messages { action } => match action {
            MessageAction::Threads => commands::messages::threads(&market),
            MessageAction::Show { thread_id } => commands::messages::show(&mut market, &thread_id),
            MessageAction::Send { thread_id, content } => {
                commands::messages::send(&mut market, &thread_id, &content)
            }
            MessageAction::Contact { product_id } => {
                commands::messages::contact(&mut market, &product_id)
            }
        },
        Commands::Payouts { action } => match action {
            PayoutAction::Balance => commands::payouts::balance(&market),
            PayoutAction::Request { amount } => commands::payouts::request(&mut market, amount),
            PayoutAction::List => commands::payouts::list(&market),
        },
        Commands::Dashboard => commands::payouts::dashboard(&market),
    };

    // Deliver notifications triggered by this command before exiting
    market.drain_notifications().await;
    market.shutdown();
    outcome
}
