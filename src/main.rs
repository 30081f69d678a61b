use clap::Parser;

use pr_pick::chooser::ProcessChooser;
use pr_pick::config::{self, RunConfig, Scope};
use pr_pick::credentials;
use pr_pick::error::{EXIT_AUTH, EXIT_CONFIG, EXIT_NETWORK, EXIT_SUCCESS};
use pr_pick::output;
use pr_pick::pipeline::{Outcome, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "pr-pick")]
#[command(about = "Fuzzy-pick one of your pull requests, with a preview of its description", long_about = None)]
#[command(version)]
struct Cli {
    /// List PRs from all repositories (default: only the current repository)
    #[arg(long)]
    all: bool,

    /// Disable ANSI colors in the list
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "warn,pr_pick=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

fn resolve_scope(all: bool) -> Result<Scope, String> {
    if all {
        return Ok(Scope::All);
    }

    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot read current directory: {}", e))?;
    match config::detect_current_repo(&cwd) {
        Ok(Some(slug)) => Ok(Scope::Repository(slug)),
        Ok(None) => Err("Not in a git repository. Use --all to list PRs from every repository.".to_string()),
        Err(e) => Err(format!("{:#}. Use --all to list PRs from every repository.", e)),
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(token) = credentials::get_token_from_env() else {
        eprintln!(
            "Missing {} in environment variables",
            credentials::ENV_TOKEN_VAR
        );
        std::process::exit(EXIT_AUTH);
    };

    let scope = match resolve_scope(cli.all) {
        Ok(scope) => scope,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    log::debug!("Search scope: {:?}", scope);

    let client = match pr_pick::github::create_client(&token) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let mut run_config = RunConfig::new(scope);
    run_config.use_colors =
        output::colors_enabled(cli.no_color, std::env::var("NO_COLOR").ok().as_deref());
    if let Some(chooser) = config::non_empty(std::env::var(config::ENV_CHOOSER).ok()) {
        run_config.chooser = chooser;
    }
    if let Some(previewer) = config::non_empty(std::env::var(config::ENV_PREVIEWER).ok()) {
        run_config.previewer = previewer;
    }

    let chooser = ProcessChooser::fzf(run_config.chooser.clone(), &run_config.previewer);
    let pipeline = Pipeline::new(run_config, client, chooser);

    match pipeline.run().await {
        Ok(Outcome::Selected(pr)) => {
            println!();
            println!("{}", output::format_selection(&pr));
        }
        Ok(Outcome::NoPullRequests) => println!("No pull requests found."),
        Ok(Outcome::NoSelection) => println!("No PR selected."),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
