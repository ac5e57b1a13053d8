// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Command line front end of the portal session library
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use tokio::signal;
use url::Url;

use portal_session::auth::{AuthFlow, NavigationCommand};
use portal_session::config::{self, Config};
use portal_session::feed::{ListFeed, OPEN_PROCESSES_NAMESPACE, OPEN_PROCESSES_PATH};
use portal_session::pagination::PaginationQuery;
use portal_session::session::{CookieJar, NavigationLocation, SessionOracle, StaticEnvironment};
use portal_session::transport::HttpTransport;

/// Session, login redirect and list refresh tooling for the workflow task portal
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, including the API prefix
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the session facts derived from a Cookie header as JSON
    Whoami {
        /// Cookie header, e.g. "access_token=...; id_token=..."
        #[arg(long, default_value = "")]
        cookies: String,
    },

    /// Print the login URL returning to a page
    LoginUrl {
        /// Full URL of the page to come back to after login
        #[arg(long)]
        location: Option<String>,

        #[arg(long, default_value = "")]
        cookies: String,

        /// Only print a URL when the cookies hold no access token
        #[arg(long)]
        if_needed: bool,
    },

    /// Print the logout URL for a session
    LogoutUrl {
        /// Origin the backend redirects to after logout
        #[arg(long)]
        origin: String,

        #[arg(long, default_value = "")]
        cookies: String,
    },

    /// Poll a paginated list endpoint and print every fresh page
    Watch {
        /// List endpoint, relative to the backend base URL
        #[arg(long, default_value = OPEN_PROCESSES_PATH)]
        path: String,

        /// Query parameter namespace of the list
        #[arg(long, default_value = OPEN_PROCESSES_NAMESPACE)]
        namespace: String,

        /// Query string of the page showing the list
        #[arg(long, default_value = "")]
        query: String,

        /// Page URL used for the login redirect on 401
        #[arg(long)]
        location: Option<String>,

        #[arg(long, default_value = "")]
        cookies: String,

        /// Seconds between refreshes
        #[arg(long)]
        interval: Option<u64>,

        /// Total refresh duration in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Page size when the query carries none, one of the configured options
        #[arg(long)]
        per_page: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }
        Config::from_file(&validate_path)
            .map_err(|err| anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let Some(command) = args.command else {
        return Err(anyhow!("No command given, see --help"));
    };

    match command {
        Command::Whoami { cookies } => {
            config.apply_args(args.backend_url, None, None, None);
            config.validate()?;
            let oracle = oracle_for(&config, &cookies, None);
            println!("{}", serde_json::to_string_pretty(&oracle.facts())?);
        }
        Command::LoginUrl {
            location,
            cookies,
            if_needed,
        } => {
            config.apply_args(args.backend_url, None, None, None);
            config.validate()?;
            let location = location.as_deref().map(parse_location).transpose()?;
            let flow = AuthFlow::from_config(&config.backend);

            if if_needed {
                let oracle = oracle_for(&config, &cookies, location);
                match flow.ensure_logged_in(&oracle) {
                    Some(command) => println!("{}", command.url()),
                    None => info!("Session holds an access token, no login needed"),
                }
            } else {
                println!("{}", flow.build_login_url(location.as_ref()));
            }
        }
        Command::LogoutUrl { origin, cookies } => {
            config.apply_args(args.backend_url, None, None, None);
            config.validate()?;
            let oracle = oracle_for(&config, &cookies, None);
            let flow = AuthFlow::from_config(&config.backend);
            println!(
                "{}",
                flow.build_logout_url(&origin, oracle.id_token().as_deref())
            );
        }
        Command::Watch {
            path,
            namespace,
            query,
            location,
            cookies,
            interval,
            timeout,
            per_page,
        } => {
            let per_page = per_page
                .map(|n| config.pagination.offered_per_page(n))
                .transpose()?;
            config.apply_args(args.backend_url, interval, timeout, per_page);
            config.validate()?;
            let location = location.as_deref().map(parse_location).transpose()?;
            watch(&config, &path, &namespace, &query, location, &cookies).await?;
        }
    }

    Ok(())
}

fn parse_location(raw: &str) -> Result<NavigationLocation> {
    let url = Url::parse(raw).with_context(|| format!("Invalid location URL: {}", raw))?;
    Ok(NavigationLocation::from(&url))
}

fn environment_for(cookies: &str, location: Option<NavigationLocation>) -> StaticEnvironment {
    let jar = CookieJar::parse(cookies);
    debug!("Parsed {} cookie(s)", jar.len());
    let env = StaticEnvironment::new(jar);
    match location {
        Some(location) => env.at(location),
        None => env,
    }
}

fn oracle_for(
    config: &Config,
    cookies: &str,
    location: Option<NavigationLocation>,
) -> SessionOracle<StaticEnvironment> {
    SessionOracle::with_cookie_names(environment_for(cookies, location), config.cookies.clone())
}

/// Refresh a list until its schedule times out, the session is rejected or Ctrl-C
async fn watch(
    config: &Config,
    path: &str,
    namespace: &str,
    query: &str,
    location: Option<NavigationLocation>,
    cookies: &str,
) -> Result<()> {
    let schedule = config.polling.schedule()?;
    let page_query =
        PaginationQuery::decode_query(query, namespace, config.pagination.default_per_page);
    let login = NavigationCommand::Navigate {
        url: AuthFlow::from_config(&config.backend).build_login_url(location.as_ref()),
    };

    let transport = Arc::new(HttpTransport::new(
        &config.backend,
        config.cookies.clone(),
        environment_for(cookies, location),
    )?);

    let feed = ListFeed::start(transport, path, page_query, schedule, login);
    info!(
        "Watching {} every {}s for {}s",
        feed.path(),
        schedule.interval().as_secs(),
        schedule.timeout().as_secs()
    );

    let mut updates = feed.subscribe();
    let mut stop_check = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.snapshot();
                if let Some(command) = snapshot.login_required {
                    println!("{}", command.url());
                    break;
                }
                match (snapshot.page, snapshot.last_error) {
                    (_, Some(error)) => eprintln!("Refresh failed: {}", error),
                    (Some(page), None) => println!("{}", serde_json::to_string_pretty(&page)?),
                    (None, None) => {}
                }
            }
            _ = stop_check.tick() => {
                if feed.is_stopped() {
                    info!("Refresh schedule elapsed");
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal, stopping refresh");
                break;
            }
        }
    }

    feed.stop();
    Ok(())
}
