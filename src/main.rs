use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use storefront::config::{ConfigError, StorefrontConfig};
use storefront::error::ErrorCode;
use storefront::format::format_currency;
use storefront::net::api;
use storefront::net::gateway::{FileUpload, GatewayError, HttpGateway, RequestBody};
use storefront::net::types::{Credentials, ProductDraft, ProductListConfig, RegisterDetails};
use storefront::state::selectors::{
    select_cart_count, select_cart_items, select_cart_total_amount, select_current_user, select_is_logged_in,
};
use storefront::state::{AppStore, RootState, StoreError};
use storefront::storage::FileStorage;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to read upload {path}: {source}")]
    Upload { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not logged in; run `storefront login` first")]
    NotLoggedIn,
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Gateway(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Upload { .. } => "E_UPLOAD_READ",
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::NotLoggedIn => "E_NOT_LOGGED_IN",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Storefront session, cart, and catalog CLI")]
struct Cli {
    /// REST API base URL (overrides `STOREFRONT_API_URL`).
    #[arg(long)]
    api_url: Option<String>,

    /// Session storage file (overrides `STOREFRONT_STORAGE_PATH`).
    #[arg(long)]
    storage_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    Logout,
    Whoami,
    Cart,
    Products(ProductsCommand),
    Categories,
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    Show {
        id: String,
    },
    Add(AddProductArgs),
    Update {
        id: String,
        /// JSON object with the fields to change.
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct AddProductArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value_t = 0)]
    stock: u32,
    #[arg(long, default_value = "")]
    brand: String,
    /// Category slug.
    #[arg(long)]
    category: String,
    #[arg(long)]
    thumbnail: PathBuf,
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }

    let gateway = Arc::new(HttpGateway::new(config.api_url.clone(), config.timeouts)?);
    let storage = Arc::new(FileStorage::new(&config.storage_path));
    let mut store = AppStore::new(gateway, storage);

    match cli.command {
        Command::Login { email, password } => {
            let user = store.login_attempt(&Credentials { email, password }).await?;
            let headline = format!("Logged in as {} ({})", user.name, user.id);
            print!("{}", welcome(&mut store, &headline).await);
            Ok(())
        }
        Command::Register { email, password, name, phone } => {
            let details = RegisterDetails { email, password, name, phone };
            let user = store.register_attempt(&details).await?;
            let headline = format!("Registered and logged in as {} ({})", user.name, user.id);
            print!("{}", welcome(&mut store, &headline).await);
            Ok(())
        }
        Command::Logout => {
            store.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            sync_cart(&mut store).await;
            println!("{}", render_header(store.state()));
            Ok(())
        }
        Command::Cart => {
            if !select_is_logged_in(store.state()) {
                return Err(CliError::NotLoggedIn);
            }
            sync_cart(&mut store).await;
            print!("{}", render_cart(store.state(), &config));
            Ok(())
        }
        Command::Products(products) => run_products(&store, products).await,
        Command::Categories => {
            let categories = api::list_categories(store.gateway().as_ref()).await?;
            print_json(&categories)
        }
    }
}

async fn run_products(store: &AppStore, products: ProductsCommand) -> Result<(), CliError> {
    let gateway = store.gateway().as_ref();
    match products.command {
        ProductsSubcommand::List { page, limit, sort_by, order, category, name } => {
            let config = ProductListConfig { page, limit, sort_by, order, category, name };
            let page = api::list_products(gateway, &config).await?;
            print_json(&page)
        }
        ProductsSubcommand::Show { id } => print_json(&api::product_detail(gateway, &id).await?),
        ProductsSubcommand::Add(args) => {
            let draft = product_draft(args)?;
            let created = api::add_product(gateway, draft).await?;
            tracing::info!(product_id = %created.id, "product created");
            print_json(&created)
        }
        ProductsSubcommand::Update { id, data } => {
            let patch: serde_json::Value = serde_json::from_str(&data)?;
            print_json(&api::update_product(gateway, &id, RequestBody::Json(patch)).await?)
        }
        ProductsSubcommand::Delete { id } => {
            api::delete_product(gateway, &id).await?;
            println!("Deleted product {id}");
            Ok(())
        }
    }
}

fn read_upload(path: PathBuf) -> Result<FileUpload, CliError> {
    FileUpload::from_path(&path).map_err(|source| CliError::Upload { path, source })
}

fn product_draft(args: AddProductArgs) -> Result<ProductDraft, CliError> {
    let thumbnail = read_upload(args.thumbnail)?;
    let images = args.images.into_iter().map(read_upload).collect::<Result<Vec<_>, _>>()?;
    Ok(ProductDraft {
        title: args.title,
        description: args.description,
        price: args.price,
        stock: args.stock,
        brand: args.brand,
        category: args.category,
        thumbnail,
        images,
    })
}

/// Load the cart for the current user; failures are logged and the previous cart kept.
async fn sync_cart(store: &mut AppStore) {
    if let Err(e) = store.sync_cart().await {
        tracing::warn!(error = %e, code = e.error_code(), "failed to load cart");
    }
}

/// Post-auth output: the headline, then the header once the new user's cart is loaded.
async fn welcome(store: &mut AppStore, headline: &str) -> String {
    sync_cart(store).await;
    format!("{headline}\n{}\n", render_header(store.state()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_header(state: &RootState) -> String {
    let count = select_cart_count(state);
    match select_current_user(state) {
        Some(user) => format!("Hello, {} | cart: {count} item(s)", user.name),
        None => format!("Not logged in | cart: {count} item(s)"),
    }
}

fn render_cart(state: &RootState, config: &StorefrontConfig) -> String {
    let items = select_cart_items(state);
    if items.is_empty() {
        return "Cart is empty\n".to_owned();
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&format!(
            "{}\t{}\t{} x {}$ @ {}%\t{}$\t{}\n",
            item.id,
            item.title,
            item.quantity,
            item.unit_price,
            item.discount_percent,
            format_currency(item.line_total()),
            config.thumbnail_url(&item.id, &item.thumbnail),
        ));
    }
    out.push_str(&format!("Total: {}$\n", format_currency(select_cart_total_amount(state))));
    out
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
