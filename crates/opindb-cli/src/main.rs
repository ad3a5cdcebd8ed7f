use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use opindb_core::{Opinion, OpinionQuery, QueryParams, Recommendation};
use opindb_scraper::ReviewClient;
use opindb_store::{csv_document, jsonl_document, ProductStore};

#[derive(Debug, Parser)]
#[command(name = "opindb-cli")]
#[command(about = "Product review extraction and analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl a product's reviews, analyze and persist them.
    Extract { product_id: String },
    /// Print persisted opinions, optionally filtered and sorted.
    Show {
        product_id: String,
        /// Sort field: stars, usefulness, uselessness, post_date,
        /// purchase_date or author.
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        /// all, recommended, not-recommended or known.
        #[arg(long)]
        recommendation: Option<String>,
        /// all, verified or unverified.
        #[arg(long)]
        verified: Option<String>,
        #[arg(long)]
        stars_gt: Option<String>,
        #[arg(long)]
        stars_lt: Option<String>,
        #[arg(long)]
        useful_gt: Option<String>,
        #[arg(long)]
        useful_lt: Option<String>,
        #[arg(long)]
        useless_gt: Option<String>,
        #[arg(long)]
        useless_lt: Option<String>,
    },
    /// Write a flat export of a persisted product's opinions.
    Export {
        product_id: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output path; defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List persisted products with their aggregates.
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Jsonl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = opindb_core::load_app_config()?;
    let store = ProductStore::new(config.data_dir.clone());

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { product_id } => {
            let client = ReviewClient::new(&config)?;
            if store.exists(&product_id).await? {
                tracing::info!(%product_id, "replacing previously persisted record");
            }
            let product = client.extract_product(&product_id).await?;
            store.save(&product).await?;
            println!(
                "{}: \"{}\" — {} opinions, average {}",
                product.product_id,
                product.product_name,
                product.opinions_count,
                format_average(product.average_score),
            );
        }
        Commands::Show {
            product_id,
            sort,
            desc,
            recommendation,
            verified,
            stars_gt,
            stars_lt,
            useful_gt,
            useful_lt,
            useless_gt,
            useless_lt,
        } => {
            let params = QueryParams {
                sort,
                descending: desc.then(|| "true".to_owned()),
                recommendation,
                verified,
                stars_greater_than: stars_gt,
                stars_lower_than: stars_lt,
                usefulness_greater_than: useful_gt,
                usefulness_lower_than: useful_lt,
                uselessness_greater_than: useless_gt,
                uselessness_lower_than: useless_lt,
            };
            let (query, invalid) = OpinionQuery::parse(&params);
            for rejected in &invalid {
                tracing::warn!(
                    param = rejected.param,
                    value = %rejected.value,
                    "ignoring unusable filter value"
                );
            }

            let product = store.load(&product_id).await?;
            let opinions = query.apply(&product.opinions);
            println!(
                "{}: \"{}\" — {} of {} opinions",
                product.product_id,
                product.product_name,
                opinions.len(),
                product.opinions_count,
            );
            for opinion in &opinions {
                print_opinion(opinion);
            }
        }
        Commands::Export {
            product_id,
            format,
            output,
        } => {
            let product = store.load(&product_id).await?;
            let body = match format {
                ExportFormat::Csv => csv_document(&product),
                ExportFormat::Jsonl => jsonl_document(&product)?,
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, body).await?;
                    println!("wrote {} opinions to {}", product.opinions_count, path.display());
                }
                None => print!("{body}"),
            }
        }
        Commands::List => {
            let summaries = store.list().await?;
            if summaries.is_empty() {
                println!("no persisted products");
            }
            for summary in summaries {
                println!(
                    "{}: \"{}\" — {} opinions ({} pros, {} cons), average {}",
                    summary.product_id,
                    summary.product_name,
                    summary.opinions_count,
                    summary.pros_count,
                    summary.cons_count,
                    format_average(summary.average_score),
                );
            }
        }
    }

    Ok(())
}

fn format_average(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{avg:.2}"),
        None => "-".to_owned(),
    }
}

fn print_opinion(opinion: &Opinion) {
    let recommendation = match opinion.recommendation {
        Recommendation::Recommended => "+",
        Recommendation::NotRecommended => "-",
        Recommendation::Unknown => "?",
    };
    println!(
        "  [{}] {} {} {:.1}/5 ({} useful / {} useless) {}",
        opinion.opinion_id,
        recommendation,
        opinion.author,
        opinion.stars,
        opinion.usefulness,
        opinion.uselessness,
        opinion.post_date.format("%Y-%m-%d"),
    );
}
