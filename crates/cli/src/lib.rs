//! Command-line front end for the cart.
//!
//! Kept as a library so command dispatch and rendering can be tested without
//! spawning the binary.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_cart::{Cart, CartError, CartOutcome, CartStore, UpdateProductAmount};
use rocketshoes_core::ProductId;

/// Manage the RocketShoes cart from the terminal.
#[derive(Parser, Debug)]
#[command(name = "rocketshoes")]
#[command(about = "Add, remove and adjust products in the RocketShoes cart")]
pub struct Args {
    /// Catalog API base URL (overrides ROCKETSHOES_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Cart database file (overrides ROCKETSHOES_CART_DB)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Log verbosity when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current cart
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product from the cart
    Remove { product_id: ProductId },
    /// Set the quantity of a product already in the cart
    Update {
        product_id: ProductId,
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

/// Run one command against the store.
pub async fn run(store: &CartStore, command: &Command) -> Result<CartOutcome, CartError> {
    match command {
        Command::Show => Ok(CartOutcome::Unchanged),
        Command::Add { product_id } => store.add_product(*product_id).await,
        Command::Remove { product_id } => store.remove_product(*product_id).await,
        Command::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount {
                    product_id: *product_id,
                    amount: *amount,
                })
                .await
        }
    }
}

/// Render the cart as a plain-text table with a total line.
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "cart is empty\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>4}  {:<40}  {:>6}  {:>10}", "ID", "PRODUCT", "QTY", "SUBTOTAL");
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:>4}  {:<40}  {:>6}  {:>10.2}",
            item.id,
            truncate(&item.title, 40),
            item.amount,
            item.subtotal()
        );
    }
    let _ = writeln!(
        out,
        "{:>4}  {:<40}  {:>6}  {:>10.2}",
        "",
        "TOTAL",
        cart.item_count(),
        cart.total()
    );
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
