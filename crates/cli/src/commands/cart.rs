//! Cart commands: open the store, apply one operation, flush, print.
//!
//! Every command flushes before returning - the CLI is a one-shot
//! process, so the fire-and-forget persistence tail has to be awaited
//! before exit or the write would race process death.

#![allow(clippy::print_stdout)] // command output goes to stdout

use std::sync::Arc;

use rust_decimal::Decimal;

use pocket_cart_core::{Cart, NewLineItem, ProductId};
use pocket_cart_store::{CartStore, FileStorage, StoreError};

use crate::config::CliConfig;

async fn open_store(config: &CliConfig) -> CartStore {
    let storage = Arc::new(FileStorage::new(&config.data_dir));
    CartStore::open(storage, config.key.clone()).await
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for line in cart.lines() {
        println!(
            "  {id}  x{quantity}  {title}  @ {price}",
            id = line.id,
            quantity = line.quantity,
            title = line.title,
            price = line.price,
        );
    }
    println!(
        "{products} product(s), {units} unit(s), subtotal {subtotal}",
        products = cart.len(),
        units = cart.total_quantity(),
        subtotal = cart.subtotal(),
    );
}

/// Print the current cart.
pub async fn show(config: &CliConfig) -> Result<(), StoreError> {
    let store = open_store(config).await;
    print_cart(&store.cart());
    Ok(())
}

/// Add a product to the cart.
pub async fn add(
    config: &CliConfig,
    id: String,
    title: String,
    image_url: String,
    price: Decimal,
) -> Result<(), StoreError> {
    let store = open_store(config).await;
    store.add_to_cart(NewLineItem {
        id: ProductId::new(id),
        title,
        image_url,
        price,
    });
    store.flush().await?;
    print_cart(&store.cart());
    Ok(())
}

/// Increment the quantity of a line.
pub async fn increment(config: &CliConfig, id: String) -> Result<(), StoreError> {
    let store = open_store(config).await;
    store.increment(&ProductId::new(id));
    store.flush().await?;
    print_cart(&store.cart());
    Ok(())
}

/// Decrement the quantity of a line, removing it at zero.
pub async fn decrement(config: &CliConfig, id: String) -> Result<(), StoreError> {
    let store = open_store(config).await;
    store.decrement(&ProductId::new(id));
    store.flush().await?;
    print_cart(&store.cart());
    Ok(())
}

/// Empty the cart and remove the stored snapshot.
pub async fn clear(config: &CliConfig) -> Result<(), StoreError> {
    let store = open_store(config).await;
    store.clear();
    store.flush().await?;
    print_cart(&store.cart());
    Ok(())
}
