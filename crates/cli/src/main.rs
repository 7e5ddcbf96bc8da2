//! Pocket Cart CLI - cart operations against the file-backed store.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! pocket-cart show
//!
//! # Add a product (repeat adds accumulate quantity)
//! pocket-cart add --id sku-1 --title "Mango" --image-url https://img.example/p.png --price 10.50
//!
//! # Change quantities
//! pocket-cart increment sku-1
//! pocket-cart decrement sku-1
//!
//! # Empty the cart
//! pocket-cart clear
//! ```
//!
//! Storage location and key come from `POCKET_CART_DATA_DIR` and
//! `POCKET_CART_KEY` (see `config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "pocket-cart")]
#[command(author, version, about = "Pocket Cart command-line frontend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product id from the catalog
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        title: String,

        /// Display image URL
        #[arg(long)]
        image_url: String,

        /// Unit price, e.g. 10.50
        #[arg(long)]
        price: Decimal,
    },
    /// Increase the quantity of a line by 1
    Increment {
        /// Product id of the line
        id: String,
    },
    /// Decrease the quantity of a line by 1, removing it at 0
    Decrement {
        /// Product id of the line
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Show => commands::cart::show(&config).await,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&config, id, title, image_url, price).await,
        Commands::Increment { id } => commands::cart::increment(&config, id).await,
        Commands::Decrement { id } => commands::cart::decrement(&config, id).await,
        Commands::Clear => commands::cart::clear(&config).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            std::process::ExitCode::FAILURE
        }
    }
}
