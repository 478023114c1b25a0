//! `stockscan` command-line entry point.

mod cli;

use std::io::BufRead;
use std::process::ExitCode;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;

use stockscan_core::DomainError;
use stockscan_desktop::{
    AppConfig, Committed, InventoryApp, KeyboardWedge, ScanGate, ScanSession, SqliteGateway,
    SubmitMode, SubmitOutcome, TextChart, TextLabelRenderer, Theme,
};
use stockscan_inventory::{Item, ItemForm};
use stockscan_observability::LogFormat;

use crate::cli::{Cli, Command, ScanTemplate};

type App = InventoryApp<SqliteGateway, TextChart>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if cli.log_json {
        config.log_format = LogFormat::Json;
    }

    stockscan_observability::init_with(config.log_format);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    let gateway = SqliteGateway::open(config.database_path())
        .context("failed to open inventory database")?;
    let mut app: App = InventoryApp::open(gateway, TextChart::new(40));

    match command {
        Command::Add { item, merge } => {
            let form: ItemForm = item.into();
            let mode = if merge {
                SubmitMode::Merge
            } else {
                SubmitMode::ConfirmMerge
            };
            match app.submit(&form, mode) {
                Ok(committed) => {
                    warn_unsaved(&committed);
                    let verb = match &committed.value {
                        SubmitOutcome::Created(_) => "added",
                        SubmitOutcome::Merged(_) => "merged",
                        SubmitOutcome::Updated(_) => "updated",
                    };
                    print_items(&[committed.value.item().clone()]);
                    println!("{verb}");
                }
                Err(DomainError::DuplicateBarcode(code)) => {
                    bail!("barcode {code} already exists; rerun with --merge to add to its quantity")
                }
                Err(err) => return Err(err).context("item rejected"),
            }
        }
        Command::Edit { barcode, changes } => {
            let mut form = app.begin_edit(&barcode)?;
            changes.apply(&mut form);
            let committed = app.submit(&form, SubmitMode::Merge).context("edit rejected")?;
            warn_unsaved(&committed);
            print_items(&[committed.value.item().clone()]);
        }
        Command::Delete { barcode } => {
            let committed = app
                .delete(&barcode)
                .with_context(|| format!("cannot delete {barcode}"))?;
            warn_unsaved(&committed);
            println!("deleted {}", committed.value.barcode());
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all items without --yes");
            }
            let committed = app.clear();
            warn_unsaved(&committed);
            println!("removed {} items", committed.value);
        }
        Command::List { low_stock } => {
            let items = if low_stock {
                app.low_stock()
            } else {
                app.items().to_vec()
            };
            print_items(&items);
        }
        Command::Search { query } => print_items(&app.search(&query)),
        Command::Stats { json } => print_stats(&app, json)?,
        Command::Export { output } => {
            let text = app.export_csv();
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported {} items to {}", app.items().len(), path.display());
                }
                None => print!("{text}"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let committed = app.import_csv(&text);
            warn_unsaved(&committed);
            let report = &committed.value;
            for skipped in &report.skipped {
                eprintln!("skipped: {}", skipped.error);
            }
            println!(
                "imported {} lines ({} new, {} merged), skipped {}",
                report.imported,
                report.created,
                report.merged,
                report.skipped_count()
            );
        }
        Command::Labels { barcodes } => {
            for code in &barcodes {
                app.toggle_label(code)
                    .with_context(|| format!("no item with barcode {code}"))?;
            }
            for label in app.label_sheet(&TextLabelRenderer)? {
                println!("{label}\n");
            }
        }
        Command::Theme { value } => {
            let theme = match value.as_deref() {
                None => app.theme(),
                Some("toggle") => app.toggle_theme()?,
                Some(raw) => app.set_theme(raw.parse::<Theme>()?)?,
            };
            println!("{theme}");
        }
        Command::Scan { quantity, new_item } => scan(&mut app, config, quantity, &new_item)?,
    }

    Ok(())
}

fn scan(app: &mut App, config: &AppConfig, quantity: u32, template: &ScanTemplate) -> anyhow::Result<()> {
    let mut session = ScanSession::new(KeyboardWedge::default(), ScanGate::new(config.scan_cooldown()));
    session.start().context("failed to start scanner")?;
    eprintln!("scanning; one barcode per line, end input to stop");

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read scanner input")?;
        let now = Utc::now();
        session.poll(now);
        let Some(form) = session.on_decode(&line, now) else {
            continue;
        };

        if app.store().contains(&form.barcode) {
            match app.restock(&form.barcode, quantity) {
                Ok(committed) => {
                    warn_unsaved(&committed);
                    print_items(&[committed.value]);
                }
                Err(err) => eprintln!("{}: {err}", form.barcode),
            }
            continue;
        }

        let code = form.barcode.clone();
        match template.fill(form, quantity) {
            Some(form) => match app.submit(&form, SubmitMode::Merge) {
                Ok(committed) => {
                    warn_unsaved(&committed);
                    print_items(&[committed.value.item().clone()]);
                }
                Err(err) => eprintln!("{code}: {err}"),
            },
            None => eprintln!("{code}: unknown barcode; pass --name and --price to add it"),
        }
    }

    session.stop();
    Ok(())
}

fn warn_unsaved<T>(committed: &Committed<T>) {
    if let Some(err) = &committed.warning {
        eprintln!("warning: change applied but not saved: {err}");
    }
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }

    println!(
        "{:<1} {:<16} {:<24} {:<14} {:>8} {:>10}",
        "", "BARCODE", "NAME", "CATEGORY", "QTY", "PRICE"
    );
    for item in items {
        let flag = if item.is_low_stock() { "!" } else { " " };
        println!(
            "{flag:<1} {:<16} {:<24} {:<14} {:>8} {:>10}",
            item.barcode().as_str(),
            item.name(),
            item.category(),
            item.quantity(),
            format!("{:.2}", item.price()),
        );
    }
}

fn print_stats(app: &App, json: bool) -> anyhow::Result<()> {
    let summary = app.summary();
    if json {
        let text = serde_json::to_string_pretty(summary).context("failed to encode summary")?;
        println!("{text}");
        return Ok(());
    }

    println!("items:        {}", summary.total_items);
    println!("quantity:     {}", summary.total_quantity);
    println!("total value:  {:.2}", summary.total_value);
    println!("low stock:    {}", summary.low_stock_items);
    println!();
    print!("{}", app.chart().output());
    Ok(())
}
