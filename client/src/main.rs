//! SiteTester CLI - run website audits from the terminal
//!
//! # Audits
//!
//! ```bash
//! sitetester h1 --file urls.txt --name "Homepage"
//! sitetester phone --urls https://a.com https://b.com --target-number "+1 555 0100" --name Contact
//! sitetester static --file urls.txt -b Chrome -b Firefox -r 1920x1080 -r 375x667 --name Launch
//! sitetester dynamic --file urls.txt -b Chrome -r 375x667 --name Scroll
//! sitetester performance --urls https://a.com https://b.com
//! ```
//!
//! # Sessions
//!
//! ```bash
//! sitetester watch h1 <session>      # Follow a running session
//! sitetester results h1 <session>    # Show results of a finished session
//! sitetester stop <session>          # Stop a running session
//! sitetester media static <session> -b Chrome   # Browse screenshots of one browser
//! sitetester media-key <url>...      # Print the asset key of URLs
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use sitetester::audit::{self, SessionReport};
use sitetester::config;
use sitetester::runtime::cancel_on_interrupt;
use sitetester::{
    ClientConfig, CliError, CliResult, HttpApi, TerminalNotifier, TerminalSink,
};
use sitetester_core::render::load_error_message;
use sitetester_core::{
    media_key, AuditKind, AuditProfile, BearerToken, CredentialAccessor, Navigation, Notifier, Phase,
    PollOutcome, ResultSet, SelectionState, SessionId, SessionView, StopControl, StopOutcome,
    UrlSource,
};

#[derive(Parser)]
#[command(name = "sitetester")]
#[command(about = "Run SiteTesterPro website audits from the terminal", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = config::ENV_BASE_URL)]
    base_url: Option<String>,

    /// Cookie header or bare access token
    #[arg(long, global = true, env = config::ENV_COOKIE, hide_env_values = true)]
    cookie: Option<String>,

    /// File holding the cookie header or access token
    #[arg(long, global = true, env = config::ENV_COOKIE_FILE)]
    cookie_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit H1 tags
    H1(AuditArgs),

    /// Scan pages for phone numbers
    Phone(AuditArgs),

    /// Capture screenshots per browser and resolution
    Static(AuditArgs),

    /// Record responsive videos per browser and resolution
    Dynamic(AuditArgs),

    /// Measure performance scores
    Performance(AuditArgs),

    /// Follow an existing session until it ends
    Watch {
        /// Audit type (h1, phone, static, dynamic, performance)
        kind: AuditKind,
        /// Session id
        session: String,
        /// Expected total, used when progress omits it
        #[arg(long)]
        total: Option<u64>,
        /// Write tabular results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show the results of a finished session
    Results {
        /// Audit type (h1, phone, static, dynamic, performance)
        kind: AuditKind,
        /// Session id
        session: String,
        /// Write tabular results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Stop a running session
    Stop {
        /// Session id
        session: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Browse the screenshots or videos of a static/dynamic session
    Media {
        /// Audit type (static, dynamic)
        kind: AuditKind,
        /// Session id
        session: String,
        /// Only this browser
        #[arg(short, long)]
        browser: Option<String>,
        /// Only this URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print the screenshot/video key of URLs
    MediaKey {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Args)]
struct AuditArgs {
    /// URL list, one URL per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// URLs typed directly (phone, dynamic, performance)
    #[arg(short, long, num_args = 1..)]
    urls: Vec<String>,

    /// Browser to audit with (repeatable)
    #[arg(short, long = "browser")]
    browsers: Vec<String>,

    /// Resolution such as 1920x1080 (repeatable)
    #[arg(short, long = "resolution")]
    resolutions: Vec<String>,

    /// Phone scan option (repeatable)
    #[arg(long = "option")]
    options: Vec<String>,

    /// Phone number to look for
    #[arg(long)]
    target_number: Option<String>,

    /// Session name
    #[arg(short, long)]
    name: Option<String>,

    /// Write tabular results as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Ask the backend to stop the session on Ctrl-C
    #[arg(long)]
    stop_on_interrupt: bool,

    /// Override the poll interval and every delay (milliseconds)
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match ClientConfig::resolve(cli.base_url, cli.cookie, cli.cookie_file.as_deref())
    {
        Ok(config) => run(config, cli.command).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        match &e {
            CliError::Submit(err) => TerminalNotifier.notify(err.notice()),
            _ => eprintln!("❌ Error: {}", e),
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(config: ClientConfig, command: Commands) -> CliResult<()> {
    let api = HttpApi::new(config);

    match command {
        Commands::H1(args) => cmd_audit(&api, AuditKind::H1, args).await,
        Commands::Phone(args) => cmd_audit(&api, AuditKind::Phone, args).await,
        Commands::Static(args) => cmd_audit(&api, AuditKind::Static, args).await,
        Commands::Dynamic(args) => cmd_audit(&api, AuditKind::Dynamic, args).await,
        Commands::Performance(args) => cmd_audit(&api, AuditKind::Performance, args).await,
        Commands::Watch {
            kind,
            session,
            total,
            csv,
        } => cmd_watch(&api, kind, session, total, csv.as_deref()).await,
        Commands::Results { kind, session, csv } => {
            cmd_results(&api, kind, session, csv.as_deref()).await
        }
        Commands::Stop { session, yes } => cmd_stop(&api, session, yes).await,
        Commands::Media {
            kind,
            session,
            browser,
            url,
        } => cmd_media(&api, kind, session, browser.as_deref(), url.as_deref()).await,
        Commands::MediaKey { urls } => cmd_media_key(&urls),
    }
}

fn bearer_token(api: &HttpApi) -> Option<BearerToken> {
    CredentialAccessor::new(api.config().clone()).bearer_token()
}

fn profile_for(kind: AuditKind, tick_ms: Option<u64>) -> AuditProfile {
    match tick_ms {
        Some(ms) => kind.profile().with_timing(Duration::from_millis(ms)),
        None => kind.profile(),
    }
}

async fn selection_from(args: &AuditArgs) -> CliResult<SelectionState> {
    let file = match &args.file {
        Some(path) => Some(UrlSource::File {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "urls.txt".to_string()),
            bytes: tokio::fs::read(path).await?,
        }),
        None => None,
    };

    Ok(SelectionState {
        file,
        manual_text: args.urls.join("\n"),
        browsers: args.browsers.clone(),
        resolutions: args.resolutions.clone(),
        options: args.options.clone(),
        session_name: args.name.clone().unwrap_or_default(),
        target_number: args.target_number.clone().unwrap_or_default(),
    })
}

async fn cmd_audit(api: &HttpApi, kind: AuditKind, args: AuditArgs) -> CliResult<()> {
    let profile = profile_for(kind, args.tick_ms);
    let selection = selection_from(&args).await?;
    let token = bearer_token(api);

    eprintln!("📤 {}", profile.uploading_message);
    let mut view = match SessionView::submit(api, profile, selection, token.as_ref()).await {
        Ok(view) => view,
        Err(err) => {
            if let Some(navigation) = err.navigation() {
                eprintln!("➡️  Log in at {}", api.config().navigation_url(navigation));
            }
            return Err(err.into());
        }
    };

    eprintln!("✅ Session {} started", view.session());
    eprintln!("   {}", view.profile().started_message);

    follow_and_show(api, &mut view, token.as_ref(), args.stop_on_interrupt, args.csv.as_deref())
        .await
}

async fn cmd_watch(
    api: &HttpApi,
    kind: AuditKind,
    session: String,
    total: Option<u64>,
    csv: Option<&Path>,
) -> CliResult<()> {
    let token = bearer_token(api);
    let mut view = SessionView::resume(kind.profile(), SessionId::from(session), total, Phase::Polling);

    eprintln!("⏳ Following {} session {}", kind, view.session());
    follow_and_show(api, &mut view, token.as_ref(), false, csv).await
}

async fn follow_and_show(
    api: &HttpApi,
    view: &mut SessionView,
    token: Option<&BearerToken>,
    stop_on_interrupt: bool,
    csv: Option<&Path>,
) -> CliResult<()> {
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let mut sink = TerminalSink::stderr();
    let SessionReport {
        outcome,
        conclusion,
        results,
    } = audit::follow(api, view, token, &mut sink, &cancel).await;
    cancel.cancel();

    if let Some(notice) = conclusion.notice {
        TerminalNotifier.notify(notice);
    }
    match conclusion.redirect {
        Some((Navigation::Login, _)) => {
            eprintln!("➡️  Log in at {}", api.config().navigation_url(Navigation::Login));
        }
        Some((Navigation::Profile, _)) => {
            eprintln!("➡️  Sessions: {}", api.config().navigation_url(Navigation::Profile));
        }
        None => {}
    }

    if let Some(results) = results {
        match results {
            Ok(results) => show_results(api, &results, csv)?,
            Err(err) => {
                eprintln!("❌ {}", load_error_message(&err));
                return Err(err.into());
            }
        }
    }

    match outcome {
        PollOutcome::Completed(_) | PollOutcome::Stopped => Ok(()),
        PollOutcome::Unauthorized => Err(CliError::LoginRequired),
        PollOutcome::Cancelled => {
            if stop_on_interrupt {
                let mut control = StopControl::new();
                let stop = control.request_stop(api, view.session(), token, || true).await;
                report_stop(stop)?;
            }
            Err(CliError::Session("Polling cancelled."))
        }
        other => Err(CliError::Session(other.message().unwrap_or_default())),
    }
}

fn show_results(api: &HttpApi, results: &ResultSet, csv: Option<&Path>) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    audit::render(&mut stdout, results, api.config())?;

    if let Some(path) = csv {
        match audit::export_csv(path, results)? {
            Some(rows) => eprintln!("💾 {} rows written to: {}", rows, path.display()),
            None => eprintln!("ℹ️ Media sessions have no CSV export"),
        }
    }
    Ok(())
}

async fn cmd_results(
    api: &HttpApi,
    kind: AuditKind,
    session: String,
    csv: Option<&Path>,
) -> CliResult<()> {
    let token = bearer_token(api);
    let view = SessionView::resume(kind.profile(), SessionId::from(session), None, Phase::Results);

    match ResultSet::fetch(api, &view, token.as_ref()).await {
        Ok(results) => show_results(api, &results, csv),
        Err(err) => {
            eprintln!("❌ {}", load_error_message(&err));
            Err(err.into())
        }
    }
}

async fn confirm(prompt: &str) -> CliResult<bool> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(format!("{} [y/N] ", prompt).as_bytes()).await?;
    stderr.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn cmd_stop(api: &HttpApi, session: String, yes: bool) -> CliResult<()> {
    let confirmed = yes || confirm(StopControl::CONFIRM_PROMPT).await?;
    let token = bearer_token(api);

    let mut control = StopControl::new();
    let outcome = control
        .request_stop(api, &SessionId::from(session), token.as_ref(), || confirmed)
        .await;
    report_stop(outcome)
}

fn report_stop(outcome: StopOutcome) -> CliResult<()> {
    match outcome {
        StopOutcome::Declined => {
            eprintln!("ℹ️ Session left running");
            Ok(())
        }
        StopOutcome::Stopped => {
            eprintln!("🛑 Stop requested");
            Ok(())
        }
        StopOutcome::NeedsLogin(_) => Err(CliError::LoginRequired),
        StopOutcome::Failed(notice) => Err(CliError::Input(format!(
            "{}: {}",
            notice.title, notice.text
        ))),
    }
}

async fn cmd_media(
    api: &HttpApi,
    kind: AuditKind,
    session: String,
    browser: Option<&str>,
    url: Option<&str>,
) -> CliResult<()> {
    if !matches!(kind, AuditKind::Static | AuditKind::Dynamic) {
        return Err(CliError::Input(format!(
            "{} sessions have no screenshots or videos",
            kind
        )));
    }

    let token = bearer_token(api);
    let view = SessionView::resume(kind.profile(), SessionId::from(session), None, Phase::Results);
    match ResultSet::fetch(api, &view, token.as_ref()).await {
        Ok(ResultSet::Media(media)) => {
            let mut stdout = std::io::stdout().lock();
            sitetester::terminal::render_media(&mut stdout, &media, api.config(), browser, url)?;
            Ok(())
        }
        Ok(other) => show_results(api, &other, None),
        Err(err) => {
            eprintln!("❌ {}", load_error_message(&err));
            Err(err.into())
        }
    }
}

fn cmd_media_key(urls: &[String]) -> CliResult<()> {
    for url in urls {
        println!("{}\t{}", media_key(url), url);
    }
    Ok(())
}
