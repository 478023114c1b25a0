use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use stockscan_inventory::ItemForm;

#[derive(Debug, Parser)]
#[command(name = "stockscan", version, about = "Barcode inventory tracker")]
pub struct Cli {
    /// Directory holding the inventory database (overrides STOCKSCAN_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an item; an existing barcode is refused unless --merge is given.
    Add {
        #[command(flatten)]
        item: ItemArgs,
        /// Add the quantity to an existing item with the same barcode.
        #[arg(long)]
        merge: bool,
    },
    /// Edit an existing item; unspecified fields keep their current value.
    Edit {
        barcode: String,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete an item.
    Delete { barcode: String },
    /// Delete every item.
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// List items in inventory order.
    List {
        /// Only items at or below their reorder threshold.
        #[arg(long)]
        low_stock: bool,
    },
    /// Find items whose name or barcode contains the query (case-insensitive).
    Search { query: String },
    /// Total value and per-category quantities.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Write the inventory as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a CSV file into the inventory.
    Import { file: PathBuf },
    /// Print barcode labels for the given items.
    Labels {
        #[arg(required = true)]
        barcodes: Vec<String>,
    },
    /// Show or change the UI theme (light, dark, toggle).
    Theme { value: Option<String> },
    /// Read barcodes from a keyboard-wedge scanner (one per line on stdin).
    ///
    /// Known barcodes are restocked; unknown ones are added when --name and
    /// --price are given. Repeats inside the scan cooldown are ignored.
    Scan {
        /// Units added per accepted scan.
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[command(flatten)]
        new_item: ScanTemplate,
    },
}

/// Fields used for barcodes not yet in the inventory.
#[derive(Debug, Args)]
pub struct ScanTemplate {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long, default_value = "5")]
    pub reorder: String,
}

impl ScanTemplate {
    /// Complete a scanned form, or `None` when name or price is missing.
    pub fn fill(&self, mut form: ItemForm, quantity: u32) -> Option<ItemForm> {
        form.name = self.name.clone()?;
        form.price = self.price.clone()?;
        form.category = self.category.clone();
        form.reorder = self.reorder.clone();
        form.quantity = quantity.to_string();
        Some(form)
    }
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub barcode: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long)]
    pub quantity: String,
    #[arg(long)]
    pub price: String,
    #[arg(long, default_value = "5")]
    pub reorder: String,
}

impl From<ItemArgs> for ItemForm {
    fn from(args: ItemArgs) -> Self {
        ItemForm {
            barcode: args.barcode,
            name: args.name,
            category: args.category,
            quantity: args.quantity,
            price: args.price,
            reorder: args.reorder,
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Give the item a new barcode.
    #[arg(long)]
    pub new_barcode: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub reorder: Option<String>,
}

impl EditArgs {
    pub fn apply(self, form: &mut ItemForm) {
        let fields = [
            (self.new_barcode, &mut form.barcode),
            (self.name, &mut form.name),
            (self.category, &mut form.category),
            (self.quantity, &mut form.quantity),
            (self.price, &mut form.price),
            (self.reorder, &mut form.reorder),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                *field = value;
            }
        }
    }
}
