use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow, bail};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use elite_client::config::DEFAULT_BASE_URL;
use elite_client::lookups::GENDER_CODE_TYPE;
use elite_client::{
    AuthApi, AuthorizedClient, ClientConfig, LoginRequest, RegistrationRequest, RestClient,
};
use elite_core::UserId;
use elite_forms::{LoadStatus, SubmitOutcome, UserField, UserFormController};
use elite_session::{FileTokenStorage, SessionHandle, SessionStore};

use crate::cli::{Cli, Commands, LoginArgs, RegisterArgs, UsersCommand};

struct Context {
    rest: RestClient,
    session: SessionStore,
}

impl Context {
    fn new(args: &Cli) -> Result<Self> {
        let mut config = ClientConfig::new(args.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));
        if let Some(secs) = args.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;

        let storage = match &args.token_path {
            Some(path) => FileTokenStorage::new(path),
            None => FileTokenStorage::from_env()?,
        };
        tracing::debug!(path = %storage.path().display(), "token storage");

        let rest = RestClient::new(&config)?;
        let session = SessionStore::restore(AuthApi::new(rest.clone()), storage);
        // Drop a stored token that expired since the last run.
        session.validate_and_refresh();
        Ok(Self { rest, session })
    }

    /// Client for protected endpoints, after checking the session is still valid.
    fn authorized(&self) -> Result<AuthorizedClient<SessionHandle>> {
        if !self.session.validate_and_refresh().is_authenticated {
            bail!("not signed in; run `elite-admin login` first");
        }
        Ok(AuthorizedClient::new(self.rest.clone(), self.session.handle()))
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let ctx = Context::new(&args)?;

    match args.command {
        Commands::Login(login) => self::login(&ctx, login).await,
        Commands::Logout => {
            ctx.session.logout();
            println!("signed out");
            Ok(())
        }
        Commands::Whoami => whoami(&ctx),
        Commands::Register(register) => self::register(&ctx, register).await,
        Commands::Countries => {
            let client = ctx.authorized()?;
            let countries = client.get_countries(&cancel_on_ctrl_c()).await?;
            print_json(&countries)
        }
        Commands::Genders => {
            let client = ctx.authorized()?;
            let genders = client
                .get_code_details_by_type_code(GENDER_CODE_TYPE, &cancel_on_ctrl_c())
                .await?;
            print_json(&genders)
        }
        Commands::Users(UsersCommand::List) => {
            let client = ctx.authorized()?;
            let users = client.list_users(&cancel_on_ctrl_c()).await?;
            print_json(&users)
        }
        Commands::Users(UsersCommand::Show { id }) => {
            let id: UserId = id.parse()?;
            let client = ctx.authorized()?;
            let user = client.get_user_detail_by_id(id, &cancel_on_ctrl_c()).await?;
            print_json(&user)
        }
        Commands::Users(UsersCommand::Edit { id, changes }) => edit_user(&ctx, &id, &changes).await,
    }
}

async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
    let password = match (args.password, args.password_stdin) {
        (_, true) => read_stdin_line()?,
        (Some(password), false) => password,
        (None, false) => bail!("a password is required (--password, ELITE_PASSWORD or --password-stdin)"),
    };

    let credentials = LoginRequest::new(args.username, password);
    if !ctx.session.login(&credentials).await? {
        bail!("login rejected for '{}'", credentials.username);
    }

    match ctx.session.user() {
        Some(user) => println!("signed in as {}", user.username),
        None => bail!("the backend returned a token that is not a valid session; signed out again"),
    }
    Ok(())
}

fn whoami(ctx: &Context) -> Result<()> {
    match ctx.session.validate_and_refresh().user {
        Some(user) => print_json(&user),
        None => bail!("not signed in"),
    }
}

async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let payload = RegistrationRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        gender: args.gender,
        address: args.address,
        phone: args.phone,
        country: args.country,
    };
    if !ctx.session.registration(&payload).await? {
        bail!("registration of '{}' was not accepted", payload.username);
    }
    println!("registered {}", payload.username);
    Ok(())
}

async fn edit_user(ctx: &Context, id: &str, changes: &[String]) -> Result<()> {
    let changes = changes
        .iter()
        .map(|raw| parse_change(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut form = UserFormController::from_route(ctx.authorized()?, Some(id))?;
    let deactivate = form.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            deactivate.cancel();
        }
    });

    let report = form.on_init().await;
    match report.user {
        LoadStatus::Loaded => {}
        LoadStatus::Failed(e) => return Err(e).context(format!("loading user {id}")),
        LoadStatus::Cancelled => bail!("interrupted"),
        LoadStatus::Skipped => bail!("user {id} was not loaded"),
    }
    for (what, status) in [("countries", &report.countries), ("genders", &report.genders)] {
        if !status.is_loaded() {
            tracing::warn!(what, "lookup list unavailable; continuing without it");
        }
    }

    for (field, value) in changes {
        form.set_value(field, value);
        form.blur(field);
    }

    match form.submit().await? {
        SubmitOutcome::Saved { notification, .. } => {
            println!("{}", notification.message());
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            bail!("{} field(s) failed validation; nothing was saved", errors.len())
        }
        SubmitOutcome::NotSaved => bail!("the backend did not save user {id}"),
        SubmitOutcome::CreateUnsupported => bail!("creating users is not supported"),
    }
}

fn parse_change(raw: &str) -> Result<(UserField, String)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{raw}'"))?;
    Ok((field.trim().parse()?, value.to_string()))
}

/// Token cancelled by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
