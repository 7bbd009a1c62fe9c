use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "elite-admin", version, about = "Administer users of an Elite backend")]
pub struct Cli {
    /// Backend root URL.
    #[arg(long, global = true, env = "ELITE_BASE_URL")]
    pub base_url: Option<String>,

    /// Where the session token is kept [default: $ELITE_TOKEN_PATH, else the data dir].
    #[arg(long, global = true)]
    pub token_path: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "ELITE_HTTP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and keep the session token.
    Login(LoginArgs),

    /// Forget the session token.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Create an account.
    Register(RegisterArgs),

    /// List countries.
    Countries,

    /// List gender codes.
    Genders,

    /// Manage users.
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, short)]
    pub username: String,

    #[arg(long, env = "ELITE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read the password from the first line of stdin instead.
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "ELITE_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Gender code id.
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub phone: String,
    /// Country id.
    #[arg(long)]
    pub country: String,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users.
    List,

    /// Show one user.
    Show { id: String },

    /// Edit a user: load it, apply `field=value` changes, validate and save.
    Edit {
        id: String,

        /// Change to apply, e.g. `--set phone=5551234567`. Repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        changes: Vec<String>,
    },
}
