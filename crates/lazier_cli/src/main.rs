//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `lazier_core` linkage and logging setup.
//! - Print the demo descriptor table and a few lazy reads.

use anyhow::{Context, Result};
use clap::Parser;
use lazier_core::{
    init_logging, AttrTable, CapabilityLocator, Conversion, LazyAttr, LazySlot, LoggingConfig,
    Produced, Requirement,
};
use log::info;
use std::cell::Cell;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Lazier - inspect lazily computed attributes
#[derive(Parser, Debug)]
#[command(name = "lazier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, default_value = lazier_core::default_log_level(), env = "LAZIER_LOG")]
    log_level: String,

    /// Absolute directory for rotating log files; stderr when omitted
    #[arg(long, env = "LAZIER_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

trait Pricing: Debug + Send + Sync {
    fn tax_rate(&self) -> f64;
}

#[derive(Debug)]
struct FlatTax(f64);

impl Pricing for FlatTax {
    fn tax_rate(&self) -> f64 {
        self.0
    }
}

struct Invoice {
    lines: Vec<(String, String)>,
    recomputations: Cell<u32>,
    subtotal: LazySlot<f64>,
    currency: LazySlot<String>,
    pricing: LazySlot<Arc<dyn Pricing>>,
}

impl Invoice {
    fn pricing_service(&self) -> Option<Arc<dyn Pricing>> {
        Some(Arc::new(FlatTax(0.2)))
    }
}

struct Descriptors {
    subtotal: LazyAttr<Invoice, f64>,
    currency: LazyAttr<Invoice, String>,
    pricing: CapabilityLocator<Invoice, dyn Pricing>,
}

fn descriptors() -> Result<Descriptors> {
    let subtotal = LazyAttr::<Invoice, f64>::named("subtotal")
        .function("sum_lines", |invoice| {
            invoice
                .recomputations
                .set(invoice.recomputations.get() + 1);
            Produced::Cache(
                invoice
                    .lines
                    .iter()
                    .filter_map(|(_, amount)| amount.parse::<f64>().ok())
                    .sum(),
            )
        })
        .doc("Sum of all parsable line amounts.")
        .build()?;
    let currency = LazyAttr::<Invoice, String>::named("currency")
        .function("currency_code", |_| Produced::Cache(" eur ".to_string()))
        .require(Requirement::predicate("is_iso_4217", |code: &String| {
            code.trim().len() == 3
        }))
        .into(Conversion::from_fn("upper_code", |code: String| {
            code.trim().to_ascii_uppercase()
        }))
        .build()?;
    let pricing = CapabilityLocator::<Invoice, dyn Pricing>::from_method(
        "pricing_service",
        Invoice::pricing_service,
    )?
    .bind("pricing")?;

    Ok(Descriptors {
        subtotal,
        currency,
        pricing,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LoggingConfig {
        level: cli.log_level,
        log_dir: cli.log_dir,
    };
    init_logging(&config).context("failed to initialize logging")?;

    println!("lazier_core version={}", lazier_core::core_version());

    let descriptors = descriptors()?;
    let mut table = AttrTable::new("Invoice");
    table.register(&descriptors.subtotal)?;
    table.register(&descriptors.currency)?;
    table.register_info(descriptors.pricing.info())?;
    println!("{}", serde_json::to_string_pretty(&table)?);

    let invoice = Invoice {
        lines: vec![
            ("design".to_string(), "120.50".to_string()),
            ("review".to_string(), "n/a".to_string()),
            ("hosting".to_string(), "30".to_string()),
        ],
        recomputations: Cell::new(0),
        subtotal: LazySlot::new(),
        currency: LazySlot::new(),
        pricing: LazySlot::new(),
    };

    for _ in 0..2 {
        let subtotal = descriptors.subtotal.get(&invoice, &invoice.subtotal)?;
        let currency = descriptors.currency.get(&invoice, &invoice.currency)?;
        let pricing = descriptors.pricing.locate(&invoice, &invoice.pricing)?;
        println!(
            "subtotal={:.2} currency={} total={:.2}",
            *subtotal,
            *currency,
            *subtotal * (1.0 + pricing.tax_rate())
        );
    }
    info!(
        "event=cli_demo module=cli status=ok recomputations={}",
        invoice.recomputations.get()
    );
    println!("recomputations={}", invoice.recomputations.get());

    Ok(())
}
