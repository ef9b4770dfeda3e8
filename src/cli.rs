use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "beiradar")]
#[command(about = "Grocery price comparison and product image reconciliation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.json", global = true)]
    pub config: PathBuf,

    /// Catalog database, overriding the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match every catalog product to an image file and save the result
    Reconcile {
        /// Image folder, overriding the config
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// Write the JSON report here
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Print catalog diagnostics
    Check {
        /// Number of sample rows to show
        #[arg(short, long, default_value = "3")]
        samples: usize,
    },

    /// Search products by name or category
    Search {
        /// Text to look for in product names and categories
        query: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum discount percentage at any store
        #[arg(long)]
        min_discount: Option<f64>,
    },

    /// Autocomplete suggestions: matching product names, then categories
    Suggest {
        /// At least two characters
        query: String,
    },

    /// List departments, or one department's subcategories
    Categories {
        /// Department slug, e.g. "personal-care"
        department: Option<String>,
    },

    /// Products in one subcategory, e.g. "cooking-oil"
    Browse {
        subcategory: String,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum discount percentage at any store
        #[arg(long)]
        min_discount: Option<f64>,
    },

    /// List the biggest price gaps between stores
    Deals {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Compare a saved cart's total across stores
    Cart {
        /// Cart JSON file mapping product name to quantity: {"Omo 1kg": 2}
        #[arg(required = true)]
        file: PathBuf,
    },
}
