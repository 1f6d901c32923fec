use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::{join_all, try_join_all};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingo::catalog::{Dictionary, LoadState};
use lingo::config::Config;
use lingo::loader::{FileLoader, HttpLoader, ProviderDescriptor, TranslationLoader};
use lingo::locale::Locale;
use lingo::resolver::Args;
use lingo::storage::{FileStorage, LocaleStorage, MemoryStorage};
use lingo::LocalizationFacade;

#[derive(Parser)]
#[command(
    name = "lingo",
    version,
    about = "Translation resolution engine with async dictionary loading",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a key for the current or given locale
    Translate {
        /// Translation key, dotted paths allowed
        key: String,

        /// Switch to this locale before resolving
        #[arg(short, long)]
        locale: Option<String>,

        /// Interpolation argument as name=value (repeatable)
        #[arg(short, long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,

        /// Argument that drives plural/category selection
        #[arg(long)]
        select_by: Option<String>,
    },

    /// List the keys of a locale's dictionary
    Keys {
        /// Locale to list; the preferred locale when absent
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Load every configured locale and report missing keys
    Check {
        /// Locale other locales are compared against; the default locale when absent
        #[arg(short, long)]
        reference: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose, &config.logging.level)?;

    config.validate()?;

    tracing::debug!(
        locales = ?config.localization.locales,
        providers = config.loader.providers.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Translate {
            key,
            locale,
            args,
            select_by,
        } => {
            tracing::info!(key = %key, locale = ?locale, "Starting translate command");
            translate(&config, key, locale, args, select_by).await?;
        }

        Commands::Keys { locale } => {
            tracing::info!(locale = ?locale, "Starting keys command");
            keys(&config, locale).await?;
        }

        Commands::Check { reference } => {
            tracing::info!(reference = ?reference, "Starting check command");
            check(&config, reference).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("lingo=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("lingo={level},warn"))
            .context("Invalid log level")?
    };

    // Log to stderr so command output stays clean on stdout
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn build_loader(config: &Config) -> Result<Arc<dyn TranslationLoader>> {
    let loader: Arc<dyn TranslationLoader> = match &config.loader.base_url {
        Some(base_url) => Arc::new(HttpLoader::with_config(
            base_url,
            config.request_timeout(),
            config.loader.retry.clone(),
        )?),
        None => Arc::new(FileLoader::new(&config.loader.asset_dir)),
    };
    Ok(loader)
}

fn build_storage(config: &Config) -> Arc<dyn LocaleStorage> {
    match &config.storage.state_dir {
        Some(dir) => Arc::new(FileStorage::in_dir(dir)),
        None => Arc::new(MemoryStorage::new()),
    }
}

/// Facade with the configured locales, preferred locale and providers,
/// settled on `locale` (or the preferred locale)
async fn prepare_facade(config: &Config, locale: Option<&str>) -> Result<LocalizationFacade> {
    let l10n = LocalizationFacade::builder(build_loader(config)?)
        .storage(build_storage(config))
        .build();

    for code in &config.localization.locales {
        l10n.add_language(code)?;
    }
    l10n.define_preferred_language(
        &config.localization.default_locale,
        config.localization.expiry_days,
    )
    .await?;

    if let Some(code) = locale {
        l10n.set_current_language(code).await?;
    }

    for provider in &config.loader.providers {
        l10n.add_provider(provider.clone())?;
    }
    l10n.reload().await?;

    match l10n.settle().await {
        LoadState::Failed(error) => {
            tracing::warn!(error = %error, "Translations unavailable, keys will be shown");
        }
        state => tracing::debug!(state = %state, "Translations settled"),
    }

    Ok(l10n)
}

async fn translate(
    config: &Config,
    key: String,
    locale: Option<String>,
    raw_args: Vec<String>,
    select_by: Option<String>,
) -> Result<()> {
    let mut args = raw_args
        .iter()
        .map(|pair| {
            Args::parse_pair(pair).with_context(|| format!("Invalid argument (expected name=value): {pair}"))
        })
        .collect::<Result<Args>>()?;
    if let Some(selector) = select_by {
        args = args.select_by(selector);
    }

    let l10n = prepare_facade(config, locale.as_deref()).await?;
    println!("{}", l10n.translate(&key, &args));
    Ok(())
}

async fn keys(config: &Config, locale: Option<String>) -> Result<()> {
    let l10n = prepare_facade(config, locale.as_deref()).await?;
    let current = l10n
        .current_language()
        .context("No current locale established")?;

    let Some(dictionary) = l10n.catalog().dictionary(&current) else {
        anyhow::bail!("No translations available for {current}");
    };

    for key in dictionary.keys() {
        println!("{key}");
    }
    Ok(())
}

/// Fetch and merge every provider for one locale
async fn fetch_locale(
    loader: &dyn TranslationLoader,
    locale: &Locale,
    providers: &[ProviderDescriptor],
) -> lingo::Result<Dictionary> {
    let parts = try_join_all(providers.iter().map(|p| loader.get(locale, p))).await?;
    let mut dictionary = Dictionary::new();
    for part in parts {
        dictionary.merge(part);
    }
    Ok(dictionary)
}

async fn check(config: &Config, reference: Option<String>) -> Result<()> {
    let loader = build_loader(config)?;
    let providers = &config.loader.providers;

    let locales = config
        .localization
        .locales
        .iter()
        .map(|code| Locale::parse(code))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let reference = Locale::parse(
        reference
            .as_deref()
            .unwrap_or(&config.localization.default_locale),
    )?;

    let results = join_all(
        locales
            .iter()
            .map(|locale| fetch_locale(loader.as_ref(), locale, providers)),
    )
    .await;

    let mut failures = 0usize;
    let mut loaded = Vec::new();
    for (locale, result) in locales.iter().zip(results) {
        match result {
            Ok(dictionary) => {
                println!("{locale}: {} keys", dictionary.len());
                loaded.push((locale, dictionary));
            }
            Err(e) => {
                failures += 1;
                println!("{locale}: FAILED ({e})");
            }
        }
    }

    let Some(reference_keys) = loaded
        .iter()
        .find(|(locale, _)| **locale == reference)
        .map(|(_, dictionary)| dictionary.keys().into_iter().collect::<BTreeSet<_>>())
    else {
        anyhow::bail!("Reference locale {reference} could not be loaded");
    };

    for (locale, dictionary) in loaded.iter().filter(|(locale, _)| **locale != reference) {
        let keys: BTreeSet<_> = dictionary.keys().into_iter().collect();
        let missing: Vec<_> = reference_keys.difference(&keys).collect();
        if missing.is_empty() {
            continue;
        }
        failures += 1;
        println!("{locale}: {} keys missing", missing.len());
        for key in missing {
            println!("  {key}");
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} locale(s) failed the check");
    }
    println!("All locales complete");
    Ok(())
}
