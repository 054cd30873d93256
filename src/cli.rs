use clap::Subcommand;
use prettytable::{row, Table};

use coinstore_core::{
    parse::{parse_currency, parse_date, parse_decimal},
    CryptoAsset, Quote, RecordId,
};

use crate::{
    config::InputConfig,
    repository::Repositories,
    storage::{RecordSet, StoreError},
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crypto asset quotations
    #[command(subcommand)]
    Quote(QuoteCommand),
    /// Crypto asset catalogue
    #[command(subcommand)]
    Asset(AssetCommand),
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommand {
    Add {
        #[arg(long)]
        date: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        value: String,
        /// Currency code: BRL, USD or EUR
        #[arg(long, default_value = "BRL")]
        currency: String,
    },
    List {
        #[arg(long)]
        code: Option<String>,
        /// Currency code: BRL, USD or EUR
        #[arg(long)]
        currency: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Delete every quote of an asset
    DeleteCode {
        #[arg(long)]
        code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Add an asset, replacing any asset with the same code
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        creation_date: String,
    },
    List {
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        #[arg(long)]
        code: String,
    },
}

/// Executes `command` and returns the text to print.
pub fn run(command: &Command, repos: &Repositories, input: &InputConfig) -> Result<String, StoreError> {
    match command {
        Command::Quote(c) => run_quote(c, repos, input),
        Command::Asset(c) => run_asset(c, repos, input),
    }
}

fn run_quote(command: &QuoteCommand, repos: &Repositories, input: &InputConfig) -> Result<String, StoreError> {
    match command {
        QuoteCommand::Add { date, code, value, currency } => {
            let quote = Quote::new(
                parse_date("date", date, &input.date_format)?,
                code.as_str(),
                parse_decimal("value", value)?,
                parse_currency(currency)?.description(),
            );
            let saved = repos.quotes.save(quote)?;
            tracing::info!(%saved, "Quote saved");
            Ok(format!("Saved {}\n", saved))
        }
        QuoteCommand::List { code, currency } => {
            let currency = match currency {
                Some(c) => Some(parse_currency(c)?.description()),
                None => None,
            };
            let quotes: RecordSet<Quote> = match (code, currency) {
                (Some(code), Some(currency)) => repos
                    .quotes
                    .find_by_code(code)?
                    .into_iter()
                    .filter(|q| q.currency == currency)
                    .collect(),
                (Some(code), None) => repos.quotes.find_by_code(code)?,
                (None, Some(currency)) => repos.quotes.find_by_currency(currency)?,
                (None, None) => repos.quotes.find_all()?,
            };
            Ok(quote_table(&quotes))
        }
        QuoteCommand::Delete { id } => {
            if repos.quotes.delete_by_id(&RecordId::from(id.as_str()))? {
                Ok(format!("Deleted quote {}\n", id))
            } else {
                Ok(format!("No quote with id {}\n", id))
            }
        }
        QuoteCommand::DeleteCode { code } => {
            let deleted = repos.quotes.delete_by_code(code)?;
            Ok(format!("Deleted {} quote(s) for {}\n", deleted, code))
        }
    }
}

fn run_asset(command: &AssetCommand, repos: &Repositories, input: &InputConfig) -> Result<String, StoreError> {
    match command {
        AssetCommand::Add { code, name, description, creation_date } => {
            let asset = CryptoAsset::new(
                code.as_str(),
                name.as_str(),
                description.as_str(),
                parse_date("creation_date", creation_date, &input.date_format)?,
            );
            let saved = repos.assets.save(asset)?;
            tracing::info!(%saved, "Crypto asset saved");
            Ok(format!("Saved {}\n", saved))
        }
        AssetCommand::List { name } => {
            let assets = match name {
                Some(name) => repos.assets.find_by_name(name)?,
                None => repos.assets.find_all()?,
            };
            Ok(asset_table(&assets))
        }
        AssetCommand::Delete { code } => {
            if repos.assets.delete_by_code(code)? {
                Ok(format!("Deleted asset {}\n", code))
            } else {
                Ok(format!("No asset with code {}\n", code))
            }
        }
    }
}

fn quote_table(quotes: &RecordSet<Quote>) -> String {
    let mut table = Table::new();
    table.add_row(row!["Id", "Date", "Code", "Value", "Currency"]);
    table.add_empty_row();

    for quote in quotes {
        let id = quote.id.as_ref().map(RecordId::as_str).unwrap_or("-");
        table.add_row(row![id, quote.date, quote.code, quote.value, quote.currency]);
    }

    format!("{}{} quote(s)\n", table, quotes.len())
}

fn asset_table(assets: &RecordSet<CryptoAsset>) -> String {
    let mut table = Table::new();
    table.add_row(row!["Code", "Name", "Created", "Description"]);
    table.add_empty_row();

    for asset in assets {
        table.add_row(row![asset.code, asset.name, asset.creation_date, asset.description]);
    }

    format!("{}{} asset(s)\n", table, assets.len())
}
