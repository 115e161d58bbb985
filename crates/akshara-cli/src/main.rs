mod commands;

use akshara_core::{Context, ManagerBuilder};
use akshara_schema::ManagerSettings;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{CliError, EXIT_CANCELED};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "akshara",
    version,
    about = "Run and query a local Aksharamukha transliteration service"
)]
struct Cli {
    /// Compose project name of the service instance.
    #[arg(long, global = true)]
    project: Option<String>,

    /// Host the service API is reached on.
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port the service API is reached on.
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Service backend: compose, docker or mock.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Settings file (default: $XDG_CONFIG_HOME/akshara/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Give up on the whole command after this many seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the service (or attach to a running one) and wait until it is ready.
    Init {
        /// Do not report progress or follow container logs.
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Tear the service down and rebuild it.
    Recreate {
        /// Refresh the compose checkout and pull the newest images first.
        #[arg(long, default_value_t = false)]
        latest: bool,
    },
    /// Download the service images.
    Pull,
    /// Stop the service containers.
    Stop,
    /// Show the state of every service container.
    Status,
    /// Print recent container output.
    Logs {
        /// Number of lines per service; 0 prints everything.
        #[arg(long, default_value_t = 100)]
        tail: usize,
    },
    /// Transliterate text between two scripts. Starts the service if needed.
    Translit {
        /// Text to transliterate.
        text: String,
        /// Target script, e.g. ISO or Devanagari.
        #[arg(long)]
        to: String,
        /// Source script; detected by the service when omitted.
        #[arg(long)]
        from: Option<String>,
        /// Disable adapting the output to target-script conventions.
        #[arg(long, default_value_t = false)]
        no_nativize: bool,
        /// Pre-processing option (repeatable).
        #[arg(long = "pre")]
        pre_options: Vec<String>,
        /// Post-processing option (repeatable).
        #[arg(long = "post")]
        post_options: Vec<String>,
    },
    /// Romanize text written in a language's primary script.
    Roman {
        /// Text to romanize.
        text: String,
        /// ISO 639 language code, e.g. hi, hin or san.
        #[arg(long)]
        lang: String,
    },
    /// List supported scripts, or the scripts of one language.
    Scripts {
        /// ISO 639 language code.
        #[arg(long)]
        lang: Option<String>,
    },
    /// Run diagnostic checks on the host and the service.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("AKSHARA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let ctx = install_signal_handler();
    let ctx = match cli.timeout {
        Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
        None => ctx,
    };
    let json = cli.json;

    let result = run(&cli, &ctx);
    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            if json {
                let payload = serde_json::json!({
                    "error": err.to_string(),
                    "stage": err.stage(),
                });
                println!("{payload}");
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli, ctx: &Context) -> Result<u8, CliError> {
    let json = cli.json;
    match &cli.command {
        Commands::Init { quiet } => {
            commands::init::run(manager_builder(cli)?, ctx, *quiet, json)
        }
        Commands::Recreate { latest } => {
            commands::recreate::run(manager_builder(cli)?, ctx, *latest, json)
        }
        Commands::Pull => commands::pull::run(manager_builder(cli)?, ctx, json),
        Commands::Stop => commands::stop::run(manager_builder(cli)?, ctx, json),
        Commands::Status => commands::status::run(manager_builder(cli)?, ctx, json),
        Commands::Logs { tail } => commands::logs::run(manager_builder(cli)?, ctx, *tail),
        Commands::Translit {
            text,
            to,
            from,
            no_nativize,
            pre_options,
            post_options,
        } => commands::translit::run(
            manager_builder(cli)?,
            ctx,
            &commands::translit::Request {
                text,
                from: from.as_deref(),
                to,
                no_nativize: *no_nativize,
                pre_options,
                post_options,
            },
            json,
        ),
        Commands::Roman { text, lang } => {
            commands::roman::run(manager_builder(cli)?, ctx, text, lang, json)
        }
        Commands::Scripts { lang } => commands::scripts::run(lang.as_deref(), json),
        Commands::Doctor => commands::doctor::run(manager_builder(cli)?, ctx, json),
        Commands::Completions { shell } => commands::completions::run::<Cli>(*shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(dir),
    }
}

/// Settings file, then `AKSHARA_*` environment, then command-line flags.
fn manager_builder(cli: &Cli) -> Result<ManagerBuilder, CliError> {
    let mut settings = match &cli.config {
        Some(path) => ManagerSettings::load(path)?,
        None => ManagerSettings::load_default()?,
    };
    settings.apply_env()?;

    let mut builder = ManagerBuilder::new().settings(settings);
    if let Some(project) = &cli.project {
        builder = builder.project_name(project.clone());
    }
    if let Some(host) = &cli.host {
        builder = builder.host(host.clone());
    }
    if let Some(port) = cli.port {
        builder = builder.port(port);
    }
    if let Some(backend) = &cli.backend {
        builder = builder.backend_name(backend.clone());
    }
    Ok(builder)
}

/// Ctrl-C cancels the returned context; a second Ctrl-C exits immediately.
fn install_signal_handler() -> Context {
    let (ctx, handle) = Context::background().with_cancel();
    let _ = ctrlc::set_handler(move || {
        if handle.is_canceled() {
            std::process::exit(i32::from(EXIT_CANCELED));
        }
        handle.cancel();
        eprintln!("\ncancel requested, stopping current operation...");
    });
    ctx
}
