use crate::connection::ConnectionArgs;
use clap::Parser;
use std::ffi::OsString;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "pgexec",
    version,
    about = "Run one SQL statement against PostgreSQL and print the result as a table",
    override_usage = "pgexec --url \"postgres://...\" \"SELECT * FROM users;\""
)]
pub struct Cli {
    /// Connection string, e.g. postgres://<user>:<pw>@<host>:<port>/<db>
    #[arg(long)]
    pub url: Option<String>,

    /// Host address
    #[arg(long)]
    pub host: Option<String>,

    /// Port
    #[arg(short = 'p', long)]
    pub port: Option<String>,

    /// User name
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Password (also accepted as -pw)
    #[arg(long)]
    pub password: Option<String>,

    /// Database name
    #[arg(long = "db")]
    pub database: Option<String>,

    /// SQL statement to execute
    pub sql: String,

    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    pub fn into_parts(self) -> (ConnectionArgs, String) {
        if !self.ignored.is_empty() {
            warn!(
                ignored = ?self.ignored,
                "Only the first positional argument is executed"
            );
        }

        let args = ConnectionArgs {
            url: self.url.unwrap_or_default(),
            host: self.host.unwrap_or_default(),
            port: self.port.unwrap_or_default(),
            user: self.user.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            database: self.database.unwrap_or_default(),
        };
        (args, self.sql)
    }
}

/// clap short flags are single characters, so `-pw` becomes `--password`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_terminator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_terminator {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    after_terminator = true;
                    None
                }
                Some("-pw") => Some(OsString::from("--password")),
                Some(s) => s
                    .strip_prefix("-pw=")
                    .map(|value| OsString::from(format!("--password={}", value))),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}
