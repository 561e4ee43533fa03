//! Data Lake Analytics commands

use anyhow::{anyhow, bail, Context, Result};
use armctl_client::models::{CatalogSecret, CatalogSecretRequest};
use armctl_client::CatalogApi;
use clap::{Args, Subcommand};
use dialoguer::Password;
use url::Url;

use super::CommandContext;
use crate::cli::OutputFormat;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum DatalakeCommands {
    /// U-SQL catalog secrets
    #[command(subcommand)]
    CatalogSecret(CatalogSecretCommands),
}

#[derive(Subcommand, Debug)]
pub enum CatalogSecretCommands {
    /// Create a credential secret in a catalog database
    New(CatalogSecretNewArgs),
}

#[derive(Args, Debug)]
pub struct CatalogSecretNewArgs {
    /// Data Lake Analytics account that owns the catalog
    #[arg(short, long, alias = "account-name")]
    pub account: String,

    /// Catalog database to create the secret in
    #[arg(long)]
    pub database_name: String,

    /// Name of the secret
    #[arg(long)]
    pub secret_name: String,

    /// Full URI of the database the secret connects to
    #[arg(long, conflicts_with_all = ["host", "port"], required_unless_present = "host")]
    pub uri: Option<String>,

    /// Database host, e.g. myhost.dns.com
    #[arg(long, requires = "port")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, requires = "host")]
    pub port: Option<u16>,

    /// Resource group of the account
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Secret password (prompted for when omitted on a terminal)
    #[arg(long, env = "ARMCTL_SECRET_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Where the secret points, and whether the user should be warned about it
#[derive(Debug, PartialEq, Eq)]
struct SecretTarget {
    uri: Url,
    missing_port: bool,
}

impl CatalogSecretNewArgs {
    fn target(&self) -> Result<SecretTarget> {
        match (&self.uri, &self.host, self.port) {
            (Some(raw), _, _) => {
                let uri = Url::parse(raw).with_context(|| format!("Invalid URI '{}'", raw))?;
                Ok(SecretTarget {
                    missing_port: !has_explicit_port(raw),
                    uri,
                })
            }
            (None, Some(host), Some(port)) => {
                let raw = format!("https://{}:{}", host, port);
                let uri = Url::parse(&raw).with_context(|| format!("Invalid host '{}'", host))?;
                Ok(SecretTarget {
                    uri,
                    missing_port: false,
                })
            }
            _ => bail!("Either --uri or both --host and --port are required"),
        }
    }

    fn resolve_password(&self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        if !console::user_attended() {
            bail!("No password given; pass --password or set ARMCTL_SECRET_PASSWORD");
        }

        Password::new()
            .with_prompt(format!("Password for secret '{}'", self.secret_name))
            .interact()
            .map_err(|e| anyhow!("Failed to read password: {}", e))
    }
}

/// Whether the authority of `raw` spells out a port
///
/// `Url::port` hides a port equal to the scheme default, so `:443` on an
/// https URI has to be read from the input text.
fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let port = match host_port.rfind(']') {
        Some(end) => host_port[end + 1..].strip_prefix(':'),
        None => host_port.rsplit_once(':').map(|(_, port)| port),
    };
    port.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

pub async fn run(cmd: DatalakeCommands, ctx: &CommandContext) -> Result<()> {
    match cmd {
        DatalakeCommands::CatalogSecret(CatalogSecretCommands::New(args)) => {
            new_catalog_secret(args, ctx).await
        }
    }
}

async fn new_catalog_secret(args: CatalogSecretNewArgs, ctx: &CommandContext) -> Result<()> {
    let target = args.target()?;
    if target.missing_port {
        output::warning(&format!(
            "No port specified in '{}'; the service will use the scheme default",
            target.uri
        ));
    }
    if let Some(resource_group) = &args.resource_group {
        tracing::debug!(resource_group = %resource_group, account = %args.account, "account scope");
    }

    let password = args.resolve_password()?;
    let request = CatalogSecretRequest::new(&args.secret_name, password, target.uri.as_str());
    let client = ctx.client()?;

    let secret = ctx
        .traced(async {
            client
                .create_secret(&args.account, &args.database_name, &request)
                .await
                .with_context(|| {
                    format!(
                        "Failed to create secret '{}' in database '{}'",
                        args.secret_name, args.database_name
                    )
                })
        })
        .await?;

    match ctx.output {
        OutputFormat::Json => output::json(&secret)?,
        OutputFormat::Table => print_secret(&secret),
    }
    Ok(())
}

fn print_secret(secret: &CatalogSecret) {
    output::success("Catalog secret created");
    output::kv("Database", secret.database_name.as_deref().unwrap_or("-"));
    output::kv("Secret", secret.secret_name.as_deref().unwrap_or("-"));
    output::kv("Uri", secret.uri.as_deref().unwrap_or("-"));
    if let Some(created) = secret.creation_time {
        output::kv("Created", &created.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(extra: &[&str]) -> Result<CatalogSecretNewArgs, clap::Error> {
        let mut argv = vec![
            "armctl",
            "datalake",
            "catalog-secret",
            "new",
            "--account",
            "contosoadla",
            "--database-name",
            "master",
            "--secret-name",
            "dbcred",
        ];
        argv.extend_from_slice(extra);

        Cli::try_parse_from(argv).map(|cli| match cli.command {
            Commands::Datalake(DatalakeCommands::CatalogSecret(CatalogSecretCommands::New(
                args,
            ))) => args,
            other => panic!("unexpected command: {:?}", other),
        })
    }

    #[test]
    fn test_host_and_port_build_https_uri() {
        let args = parse(&["--host", "sql.contoso.com", "--port", "1433"]).unwrap();
        let target = args.target().unwrap();

        assert_eq!(target.uri.as_str(), "https://sql.contoso.com:1433/");
        assert!(!target.missing_port);
    }

    #[test]
    fn test_uri_with_port_is_used_verbatim() {
        let args = parse(&["--uri", "https://sql.contoso.com:1433"]).unwrap();
        let target = args.target().unwrap();

        assert_eq!(target.uri.as_str(), "https://sql.contoso.com:1433/");
        assert!(!target.missing_port);
    }

    #[test]
    fn test_uri_without_port_is_flagged() {
        let args = parse(&["--uri", "https://sql.contoso.com"]).unwrap();
        assert!(args.target().unwrap().missing_port);
    }

    #[test]
    fn test_uri_with_default_port_is_not_flagged() {
        let args = parse(&["--uri", "https://sql.contoso.com:443"]).unwrap();
        let target = args.target().unwrap();

        assert!(!target.missing_port);
        assert_eq!(target.uri.port_or_known_default(), Some(443));
    }

    #[test]
    fn test_explicit_port_detection() {
        assert!(has_explicit_port("https://sql.contoso.com:1433/db"));
        assert!(has_explicit_port("https://user:pw@sql.contoso.com:443"));
        assert!(has_explicit_port("https://[::1]:1433"));
        assert!(!has_explicit_port("https://user:pw@sql.contoso.com/db"));
        assert!(!has_explicit_port("https://[::1]/db"));
        assert!(!has_explicit_port("https://sql.contoso.com:/db"));
    }

    #[test]
    fn test_invalid_uri_is_error() {
        let args = parse(&["--uri", "not a uri"]).unwrap();
        assert!(args.target().is_err());
    }

    #[test]
    fn test_uri_conflicts_with_host() {
        assert!(parse(&["--uri", "https://a:1", "--host", "b", "--port", "2"]).is_err());
    }

    #[test]
    fn test_target_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--host", "sql.contoso.com"]).is_err());
    }

    #[test]
    fn test_password_flag_wins() {
        let args = parse(&["--host", "h", "--port", "1", "--password", "s3cret"]).unwrap();
        assert_eq!(args.resolve_password().unwrap(), "s3cret");
    }
}
