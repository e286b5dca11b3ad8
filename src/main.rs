//! Cleanledger main entry point

use anyhow::{anyhow, bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use cleanledger_client::ApiClient;
use cleanledger_config::Config;
use cleanledger_core::{
    Backends, CoreError, FinanceContext, QueryClient, RetryPolicy, SubmitOutcome,
    TransactionLists, TransactionPage, TransactionType, UpdateWorkflow,
};
use cleanledger_utils::format_number;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "cleanledger")]
#[command(version = "0.1.0")]
#[command(about = "Edit, categorize and sanitize bank transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "cleanledger.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List all transactions of an account
    List {
        #[arg(short, long)]
        account: String,
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// List transactions that still need a description
    Unsanitized {
        #[arg(short, long)]
        account: String,
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Edit a transaction and optionally register a sanitization rule
    Edit(EditArgs),
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
    #[arg(short, long)]
    account: String,
    #[arg(long)]
    id: String,
    /// Page of the all-transactions view holding the transaction
    #[arg(short, long)]
    page: Option<u32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    vendor: Option<String>,
    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    subcategory: Option<String>,
    /// Keyword for the rule; repeatable
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    #[arg(long)]
    register_rule: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::Init { force } = args.command {
        init_logging("info");
        return write_default_config(&args.config, force);
    }

    let config = Config::load(args.config.clone())
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    init_logging(&config.logging.level);
    log::info!("Config loaded: api={}", config.api.base_url);

    let rt = Runtime::new()?;
    rt.block_on(run(config, args.command))
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    let client = Arc::new(ApiClient::from_config(&config)?);
    let retry = RetryPolicy::from_config(&config.retry);
    let cache = Arc::new(QueryClient::new(retry.clone()));
    let lists = TransactionLists::new(client.clone(), cache);
    let default_page = config.pagination.default_page;

    match command {
        Command::Init { .. } => Ok(()),
        Command::List { account, page } => {
            let page = lists.list_all(&account, page.unwrap_or(default_page)).await?;
            print_page(&page);
            Ok(())
        }
        Command::Unsanitized { account, page } => {
            let page = lists
                .list_unsanitized(&account, page.unwrap_or(default_page))
                .await?;
            print_page(&page);
            Ok(())
        }
        Command::Edit(edit) => {
            let page = lists
                .list_all(&edit.account, edit.page.unwrap_or(default_page))
                .await?;
            let transaction = page
                .find(&edit.id)
                .cloned()
                .ok_or_else(|| anyhow!("Transaction {} not found on page {}", edit.id, page.page))?;

            let backends = Backends {
                transactions: client.clone(),
                sanitizations: client,
                invalidator: lists.invalidator(),
                retry,
            };
            let context = FinanceContext::from_config(&config.categories);
            let workflow = UpdateWorkflow::new(&edit.account, transaction, &context, backends)?;
            apply_edits(&workflow, &edit)?;

            match workflow.submit().await {
                Ok(outcome) => report(outcome),
                Err(CoreError::Validation { errors }) => {
                    for (field, message) in errors.iter() {
                        eprintln!("  {}: {}", field, message);
                    }
                    bail!("{} field(s) need attention", errors.len())
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn apply_edits(workflow: &UpdateWorkflow, edit: &EditArgs) -> anyhow::Result<()> {
    workflow.edit(|form| {
        if let Some(description) = &edit.description {
            form.sanitized_description = description.clone();
        }
        if let Some(vendor) = &edit.vendor {
            form.vendor = vendor.clone();
        }
        if let Some(transaction_type) = edit.transaction_type {
            form.transaction_type = transaction_type;
        }
        form.register_rule = edit.register_rule;
    })?;
    if let Some(category) = &edit.category {
        workflow.select_category(category)?;
    }
    if let Some(subcategory) = &edit.subcategory {
        workflow.select_subcategory(subcategory)?;
    }
    for keyword in &edit.keywords {
        workflow.add_keyword(keyword)?;
    }
    Ok(())
}

fn report(outcome: SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::FullSuccess { transaction, rule } => {
            println!("Saved {}", transaction.summary());
            if let Some(rule) = rule {
                println!("Registered rule for: {}", rule.keywords().join(", "));
            }
            Ok(())
        }
        SubmitOutcome::TransactionSavedRuleFailed { transaction, error } => {
            println!("Saved {}", transaction.summary());
            bail!("Sanitization rule was not registered: {}", error)
        }
        SubmitOutcome::TransactionSaveFailed { error } => {
            bail!("Transaction was not saved: {}", error)
        }
    }
}

fn print_page(page: &TransactionPage) {
    for transaction in &page.items {
        println!("{:>12}  {}", transaction.id, transaction.summary());
    }
    println!(
        "-- page {} of {} ({} shown)",
        page.page,
        page.total_pages,
        format_number(page.items.len())
    );
}
