//! Postern - a live, queryable index of git-backed blog posts.

mod cli;
mod config;
mod content;
mod index;
mod logger;
mod source;
mod sync;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands, QueryArgs};
use config::PosternConfig;
use content::Document;
use index::{IndexSnapshot, IndexStore, ListQuery};
use source::{Source, git::GitSource};
use std::path::Path;
use std::sync::Arc;
use sync::Synchronizer;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static PosternConfig = Box::leak(Box::new(load_config(cli)?));

    let source: Arc<dyn Source> = Arc::new(GitSource::open(&config.sync.source)?);
    let store = Arc::new(IndexStore::new());
    let mut synchronizer = Synchronizer::new(config, source, Arc::clone(&store));
    synchronizer.bootstrap()?;

    match &cli.command {
        Commands::Run { .. } => synchronizer.run_blocking(),
        Commands::Build => print_summary(config, &store.current()),
        Commands::List {
            query_args,
            category,
            tag,
            month,
            limit,
            offset,
            drafts,
        } => {
            let query = ListQuery {
                published_only: !*drafts,
                category: category.clone(),
                tag: tag.clone(),
                month: month.clone(),
                limit: *limit,
                offset: *offset,
            };
            list_documents(config, &store.current(), query_args, &query)
        }
        Commands::Show {
            slug,
            query_args,
            body,
        } => show_document(config, &store.current(), query_args, slug, *body),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<PosternConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        PosternConfig::from_path(&config_path)?
    } else {
        bail!("Config file not found: {}", config_path.display());
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Resolve the language to query: CLI flag or the first configured one.
fn resolve_language(config: &PosternConfig, query_args: &QueryArgs) -> String {
    query_args
        .lang
        .clone()
        .unwrap_or_else(|| config.content.default_language().to_owned())
}

/// `build` command: per-language document counts.
fn print_summary(config: &'static PosternConfig, snapshot: &IndexSnapshot) -> Result<()> {
    if !config.site.title.is_empty() {
        log!("index"; "{}", config.site.title);
    }
    for (lang, partition) in &snapshot.partitions {
        log!("index"; "{lang}: {} documents ({} published)", partition.len(), partition.published_len());
    }
    Ok(())
}

/// `list` command: one line per document, newest first.
fn list_documents(
    config: &'static PosternConfig,
    snapshot: &IndexSnapshot,
    query_args: &QueryArgs,
    query: &ListQuery,
) -> Result<()> {
    let lang = resolve_language(config, query_args);
    let documents = snapshot.list(&lang, query);

    if query_args.json {
        let plain: Vec<&Document> = documents.iter().map(AsRef::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&plain)?);
        return Ok(());
    }

    for doc in &documents {
        println!("{}", format_listing_line(doc));
    }
    log!("index"; "{} documents in `{lang}`", documents.len());
    Ok(())
}

/// `show` command: one document by identity.
fn show_document(
    config: &'static PosternConfig,
    snapshot: &IndexSnapshot,
    query_args: &QueryArgs,
    slug: &str,
    body: bool,
) -> Result<()> {
    let lang = resolve_language(config, query_args);
    let Some(doc) = snapshot.get(&lang, slug) else {
        bail!("No document `{slug}` in language `{lang}`");
    };

    if query_args.json {
        println!("{}", serde_json::to_string_pretty(doc.as_ref())?);
    } else {
        println!("{}", format_document(&doc));
    }
    if body {
        println!("{}", doc.rendered);
    }
    Ok(())
}

// ============================================================================
// Formatting
// ============================================================================

/// One `list` line: date, identity, title, plus draft/category markers.
fn format_listing_line(doc: &Document) -> String {
    let mut line = format!(
        "{}  {:<24}  {}",
        doc.meta.created_at.format("%Y-%m-%d"),
        doc.slug,
        doc.meta.title
    );
    if let Some(category) = &doc.meta.category {
        line.push_str(&format!("  [{category}]"));
    }
    if !doc.meta.published {
        line.push_str("  (draft)");
    }
    line
}

/// Multi-line `show` output.
fn format_document(doc: &Document) -> String {
    let mut out = format!(
        "{}\n  identity: {}\n  path:     {}\n  created:  {}\n  updated:  {}",
        doc.meta.title,
        doc.slug,
        doc.path.display(),
        doc.meta.created_at.format("%Y-%m-%d %H:%M:%S"),
        doc.meta.updated_at.format("%Y-%m-%d %H:%M:%S"),
    );
    if !doc.meta.author.is_empty() {
        out.push_str(&format!("\n  author:   {}", doc.meta.author));
    }
    if let Some(category) = &doc.meta.category {
        out.push_str(&format!("\n  category: {category}"));
    }
    if !doc.meta.tags.is_empty() {
        let tags: Vec<_> = doc.meta.tags.iter().map(String::as_str).collect();
        out.push_str(&format!("\n  tags:     {}", tags.join(", ")));
    }
    if !doc.meta.published {
        out.push_str("\n  draft:    yes");
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
