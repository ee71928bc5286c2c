use std::time::Duration;

use clap::{Parser, Subcommand};
use dowhile_auth::callback::{CallbackError, CallbackListener};
use dowhile_auth::config::ConfigError;
use dowhile_auth::oauth::parse_callback;
use dowhile_auth::{
    ApiError, AuthConfig, AuthSession, FileTokenStore, HttpApiClient, PageLocation, RestoreOutcome, SessionError, User,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Callback(#[from] CallbackError),
    #[error("no OAuth code in {0}")]
    MissingCode(String),
    #[error("not signed in; run `dowhile-auth login`")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "dowhile-auth", about = "Sign in to the dowhile API with GitHub")]
struct Cli {
    /// Backend base URL; overrides `DOWHILE_API_URL`.
    #[arg(long, env = "DOWHILE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the GitHub sign-in URL.
    Url,
    /// Open the sign-in flow and wait for GitHub's redirect.
    Login,
    /// Finish sign-in from a redirect URL containing `?code=`.
    Callback { url: String },
    /// Restore the stored session and print the current user.
    Whoami,
    /// Forget the stored session.
    Logout,
}

type Session = AuthSession<HttpApiClient, FileTokenStore>;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AuthConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_owned();
    }

    let api = HttpApiClient::new(&config.api_url, config.timeouts)?;
    let store = FileTokenStore::new(&config.token_file);
    let mut session = AuthSession::new(api, store, &config.github_client_id);

    match cli.command {
        Command::Url => {
            println!("{}", session.sign_in_url());
            Ok(())
        }
        Command::Login => run_login(&mut session, &config).await,
        Command::Callback { url } => run_callback(&mut session, url).await,
        Command::Whoami => run_whoami(&mut session).await,
        Command::Logout => {
            session.sign_out()?;
            println!("signed out");
            Ok(())
        }
    }
}

async fn run_login(session: &mut Session, config: &AuthConfig) -> Result<(), CliError> {
    let listener = CallbackListener::bind(config.callback_addr).await?;
    println!("Open this URL in your browser to sign in:\n\n  {}\n", session.sign_in_url());

    let href = listener
        .wait(Duration::from_secs(config.callback_timeout_secs))
        .await?;
    run_callback(session, href).await
}

async fn run_callback(session: &mut Session, url: String) -> Result<(), CliError> {
    if parse_callback(&url).is_none() {
        return Err(CliError::MissingCode(url));
    }
    let mut location = PageLocation::new(url.clone());
    match session.restore(&mut location).await? {
        RestoreOutcome::SignedIn(user) => print_user(&user),
        RestoreOutcome::Restored(_) | RestoreOutcome::Anonymous => Err(CliError::MissingCode(url)),
    }
}

async fn run_whoami(session: &mut Session) -> Result<(), CliError> {
    let mut location = PageLocation::default();
    match session.restore(&mut location).await? {
        RestoreOutcome::SignedIn(user) | RestoreOutcome::Restored(user) => print_user(&user),
        RestoreOutcome::Anonymous => Err(CliError::NotSignedIn),
    }
}

fn print_user(user: &User) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}
