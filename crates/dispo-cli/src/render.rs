//! Terminal output for the CLI. Empty results are printed, never treated as
//! failures.

use dispo_core::{format_price, AggregateResult, SpecialProduct, Store};

pub(crate) fn print_stores(stores: &[Store], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stores)?);
        return Ok(());
    }

    if stores.is_empty() {
        println!("No stores available.");
        return Ok(());
    }

    for store in stores {
        println!(
            "  {:<38} {:<30} {}",
            store.id,
            store.name,
            store.address.as_deref().unwrap_or("-"),
        );
    }
    println!("{} store(s)", stores.len());
    Ok(())
}

pub(crate) fn print_specials(result: &AggregateResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.is_empty() {
        println!("No specials today.");
    }

    for entry in &result.store_specials {
        println!("{} ({} specials)", entry.store.name, entry.count);
        for product in &entry.specials {
            println!("  {}", describe(product));
        }
    }

    for error in &result.errors {
        println!("  \u{2717} {error}");
    }

    println!(
        "{} specials across {} store(s) in {:.2}s ({:.0}% of stores answered)",
        result.total_specials,
        result.store_count,
        result.elapsed_secs,
        result.success_rate(),
    );
    Ok(())
}

fn describe(product: &SpecialProduct) -> String {
    let brand = product.brand.as_deref().unwrap_or("Unbranded");
    let deal = product
        .variants
        .iter()
        .filter(|v| v.is_on_special())
        .filter_map(|v| {
            v.special_price_cents.map(|special| {
                format!(
                    "{} {} \u{2192} {}",
                    v.option,
                    format_price(v.price_cents),
                    format_price(special)
                )
            })
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:<40} {:<20} -{}%  {deal}",
        product.name,
        brand,
        product.best_discount()
    )
}
