//! Farmers Market storefront - terminal client for the marketplace.
//!
//! # Usage
//!
//! ```bash
//! # Browse products (falls back to sample products when the backend is down)
//! fm products --featured
//! fm products --search tomato --sort price-low
//!
//! # Manage the cart
//! fm cart add demo-1
//! fm cart qty demo-1 3
//! fm cart show
//!
//! # Account and checkout
//! fm account login asha@example.com secret
//! fm order --address "12 Market Road"
//!
//! # Sell a product
//! fm sell "Organic Honey" 300 --unit jar --category honey
//! ```
//!
//! # Commands
//!
//! - `products` - List products
//! - `cart` - Show and edit the cart
//! - `account` - Login, register, logout, whoami
//! - `order` - Place an order for the cart
//! - `sell` - List a product for sale
//! - `subscribe` - Subscribe to the newsletter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use farmers_market_core::Price;
use farmers_market_core::listing::{ListingQuery, ListingSort};
use tokio::sync::broadcast;
use url::Url;

use farmers_market_storefront::api::{ApiClient, ApiResponse, NewProduct, RegisterRequest};
use farmers_market_storefront::render::{self, Notice, PriceFormatter};
use farmers_market_storefront::services::{self, AccountService, OrderService, ProductService};
use farmers_market_storefront::{
    AppError, Catalog, CartEvent, CartStore, FileStorage, ListingOrigin, Result, SessionStore,
    StorefrontConfig,
};

#[derive(Parser)]
#[command(name = "fm")]
#[command(author, version, about = "Farmers Market storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only the featured products
        #[arg(long)]
        featured: bool,

        /// Match product names containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Match category or seller containing this text
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (`price-low`, `price-high`)
        #[arg(long)]
        sort: Option<ListingSort>,
    },
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage your account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Place an order for everything in the cart
    Order {
        /// Shipping address
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List a product for sale
    Sell {
        /// Product name
        name: String,

        /// Price per unit
        price: Price,

        /// Unit the price is for (kg, L, dozen, ...)
        #[arg(short, long)]
        unit: Option<String>,

        /// Product category
        #[arg(short, long)]
        category: Option<String>,

        /// Product description
        #[arg(short, long)]
        description: Option<String>,

        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Subscribe to the newsletter
    Subscribe {
        /// Email address
        email: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product identifier
        id: String,
    },
    /// Remove a product
    Remove {
        /// Product identifier
        id: String,
    },
    /// Set the quantity of a product (minimum 1)
    Qty {
        /// Product identifier
        id: String,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Log in
    Login { email: String, password: String },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Account role (`buyer`, `farmer`)
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
}

/// Everything a command needs.
struct App {
    config: StorefrontConfig,
    api: ApiClient,
    storage: FileStorage,
    prices: PriceFormatter,
}

impl App {
    fn new(config: StorefrontConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let storage = FileStorage::new(config.data_dir.clone());
        let prices = PriceFormatter::new(config.currency_symbol.clone());
        Ok(Self {
            config,
            api,
            storage,
            prices,
        })
    }

    fn asset_base(&self) -> &Url {
        &self.config.asset_base
    }

    fn sessions(&self) -> SessionStore<&FileStorage> {
        SessionStore::new(&self.storage)
    }

    fn cart(&self) -> CartStore<&FileStorage> {
        CartStore::open(&self.storage)
    }
}

#[tokio::main]
async fn main() {
    // Defaults to warnings only for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "farmers_market_storefront=warn".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        println!("{}", Notice::error(e.to_string()));
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::new(StorefrontConfig::from_env()?)?;

    match cli.command {
        Commands::Products {
            featured,
            search,
            category,
            sort,
        } => {
            let query = ListingQuery {
                search,
                category,
                sort: sort.unwrap_or_default(),
            };
            list_products(&app, featured, &query).await;
        }
        Commands::Cart { action } => cart(&app, action).await?,
        Commands::Account { action } => account(&app, action).await?,
        Commands::Order { address } => {
            let mut cart = app.cart();
            let response = OrderService::new(&app.api, &app.sessions())
                .place(&mut cart, address)
                .await?;
            report(&response, services::ORDER_FAILED);
        }
        Commands::Sell {
            name,
            price,
            unit,
            category,
            description,
            image,
        } => {
            let image = match image {
                Some(path) => {
                    let bytes = tokio::fs::read(&path).await?;
                    let file_name = path
                        .file_name()
                        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
                    Some((bytes, file_name))
                }
                None => None,
            };
            let product = NewProduct {
                name,
                price,
                unit,
                category,
                description,
                image,
            };
            let response = ProductService::new(&app.api, &app.sessions())
                .create(product)
                .await?;
            report(&response, services::CREATE_PRODUCT_FAILED);
        }
        Commands::Subscribe { email } => {
            let response = services::subscribe(&app.api, &email).await;
            report(&response, services::SUBSCRIBE_FAILED);
        }
    }

    Ok(())
}

async fn list_products(app: &App, featured: bool, query: &ListingQuery) {
    println!("{}", render::LOADING_MESSAGE);

    let catalog = Catalog::new(app.api.clone());
    let listing = if featured {
        catalog.load_featured().await
    } else {
        catalog.load_all().await
    };

    if listing.origin == ListingOrigin::Fallback {
        println!("{}", Notice::info("Showing sample products"));
    }

    let products = query.apply(&listing.products);
    println!(
        "{}",
        render::product_list(&products, &app.prices, app.asset_base())
    );
}

async fn cart(app: &App, action: CartAction) -> Result<()> {
    let mut store = app.cart();
    let mut events = store.subscribe();

    match action {
        CartAction::Show => {
            println!("{}", render::badge(store.item_count()));
            println!("{}", render::cart_table(&store.snapshot(), &app.prices));
            return Ok(());
        }
        CartAction::Add { id } => {
            let listing = Catalog::new(app.api.clone()).load_all().await;
            let product = listing
                .find(&id)
                .ok_or_else(|| AppError::UnknownProduct(id.clone()))?;
            store.add(product);
        }
        CartAction::Remove { id } => store.remove(&id),
        CartAction::Qty { id, quantity } => {
            if store.snapshot().find(&id).is_none() {
                println!("{}", Notice::info(format!("{id} is not in your cart")));
            }
            store.set_quantity_input(&id, &quantity);
        }
        CartAction::Clear => store.clear(),
    }

    print_cart_events(&mut events);
    Ok(())
}

/// Print notices for the events a cart mutation published.
fn print_cart_events(events: &mut broadcast::Receiver<CartEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            CartEvent::ItemAdded { name } => {
                println!("{}", Notice::success(format!("{name} added to cart!")));
            }
            CartEvent::ItemRemoved => println!("{}", Notice::info("Item removed from cart")),
            CartEvent::CountChanged { count } => println!("{}", render::badge(count)),
            CartEvent::Updated { .. } => {}
        }
    }
}

async fn account(app: &App, action: AccountAction) -> Result<()> {
    let sessions = app.sessions();
    let accounts = AccountService::new(&app.api, &sessions);

    match action {
        AccountAction::Login { email, password } => {
            let response = accounts.login(&email, &password).await;
            report(&response, services::LOGIN_FAILED);
        }
        AccountAction::Register {
            name,
            email,
            password,
            role,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
                role,
            };
            let response = accounts.register(&request).await;
            report(&response, services::REGISTER_FAILED);
        }
        AccountAction::Logout => {
            accounts.logout()?;
            println!("{}", Notice::info("Logged out"));
        }
        AccountAction::Whoami => match accounts.current_user() {
            Some(user) => {
                let role = user.role.as_deref().unwrap_or("buyer");
                println!("{} <{}> ({role})", user.name, user.email);
                if !user.has_token() {
                    println!("{}", Notice::info("Session has no token; login again to order"));
                }
            }
            None => println!("{}", Notice::info("Not logged in")),
        },
    }

    Ok(())
}

/// Print a backend outcome as a notice.
fn report(response: &ApiResponse, fallback: &str) {
    let notice = if response.success {
        Notice::success(response.message_or("Done"))
    } else {
        Notice::error(response.message_or(fallback))
    };
    println!("{notice}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farmers_market_core::ProductRecord;

    fn app_in(dir: &std::path::Path) -> App {
        let data_dir = dir.to_string_lossy().into_owned();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "FM_DATA_DIR" => Some(data_dir.clone()),
            _ => None,
        })
        .unwrap();
        App::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_qty_for_unknown_id_leaves_cart_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        app.cart()
            .add(&ProductRecord::new("demo-1", "Fresh Tomatoes", Price::from_units(60)));
        let before = app.cart().load();

        let action = CartAction::Qty {
            id: "demo-9".to_string(),
            quantity: "4".to_string(),
        };
        assert!(cart(&app, action).await.is_ok());
        assert_eq!(app.cart().load(), before);

        let action = CartAction::Qty {
            id: "demo-1".to_string(),
            quantity: "4".to_string(),
        };
        assert!(cart(&app, action).await.is_ok());
        assert_eq!(app.cart().item_count(), 4);
    }
}
