//! Virtual machine commands

use anyhow::{bail, Context, Result};
use armctl_client::models::{
    AutoBackupSettings, AutoPatchingSettings, OperationResponse, SqlServerExtension,
    VirtualMachineExtension,
};
use armctl_client::{ComputeApi, ManagementClient};
use armctl_core::retry::{RetryExecutorBuilder, TracingObserver};
use armctl_core::types::EXTENSION_CREATE_POLICY;
use clap::{Args, Subcommand};

use super::CommandContext;
use crate::cli::OutputFormat;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum VmCommands {
    /// SQL Server IaaS agent extension
    #[command(subcommand)]
    SqlExtension(SqlExtensionCommands),
}

#[derive(Subcommand, Debug)]
pub enum SqlExtensionCommands {
    /// Install or update the SQL Server IaaS agent extension on a VM
    #[command(disable_version_flag = true)]
    Set(SqlExtensionSetArgs),
}

#[derive(Args, Debug)]
pub struct SqlExtensionSetArgs {
    /// Resource group of the virtual machine
    #[arg(short = 'g', long)]
    pub resource_group: String,

    /// Virtual machine to install the extension on
    #[arg(long)]
    pub vm_name: String,

    /// Extension resource name [default: Microsoft.SqlServer.Management.SqlIaaSAgent]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Extension handler version (N.N) [default: 1.2]
    #[arg(long, alias = "handler-version")]
    pub version: Option<String>,

    /// Resource location [default: the VM's location]
    #[arg(short, long)]
    pub location: Option<String>,

    #[command(flatten)]
    pub auto_patching: AutoPatchingArgs,

    #[command(flatten)]
    pub auto_backup: AutoBackupArgs,
}

#[derive(Args, Debug, Default)]
pub struct AutoPatchingArgs {
    /// Enable or disable automated patching (omit to leave unconfigured)
    #[arg(long, value_name = "BOOL")]
    pub auto_patching_enable: Option<bool>,

    /// Patching day (Everyday, Monday, ..., Sunday)
    #[arg(long, default_value = "Sunday")]
    pub auto_patching_day: String,

    /// Maintenance window start hour (0-23)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..24))]
    pub auto_patching_start_hour: u32,

    /// Maintenance window duration in minutes
    #[arg(long, default_value_t = 60)]
    pub auto_patching_duration: u32,

    /// Patch category
    #[arg(long, default_value = "Important")]
    pub auto_patching_category: String,
}

#[derive(Args, Debug, Default)]
pub struct AutoBackupArgs {
    /// Enable or disable automated backup (omit to leave unconfigured)
    #[arg(long, value_name = "BOOL")]
    pub auto_backup_enable: Option<bool>,

    /// Encrypt backups (requires --auto-backup-password)
    #[arg(long)]
    pub auto_backup_encryption: bool,

    /// Backup retention in days
    #[arg(long, default_value_t = 30)]
    pub auto_backup_retention_days: u32,

    /// Blob storage URL for backups
    #[arg(long)]
    pub auto_backup_storage_url: Option<String>,

    /// Storage account access key
    #[arg(long, env = "ARMCTL_BACKUP_STORAGE_KEY", hide_env_values = true)]
    pub auto_backup_storage_key: Option<String>,

    /// Backup encryption password
    #[arg(long, env = "ARMCTL_BACKUP_PASSWORD", hide_env_values = true)]
    pub auto_backup_password: Option<String>,
}

impl AutoPatchingArgs {
    fn to_settings(&self) -> Option<AutoPatchingSettings> {
        self.auto_patching_enable.map(|enable| AutoPatchingSettings {
            enable,
            day_of_week: self.auto_patching_day.clone(),
            maintenance_window_starting_hour: self.auto_patching_start_hour,
            maintenance_window_duration: self.auto_patching_duration,
            patch_category: self.auto_patching_category.clone(),
        })
    }
}

impl AutoBackupArgs {
    fn to_settings(&self) -> Result<Option<AutoBackupSettings>> {
        let Some(enable) = self.auto_backup_enable else {
            return Ok(None);
        };

        let storage_url = self.auto_backup_storage_url.clone().unwrap_or_default();
        let storage_access_key = self.auto_backup_storage_key.clone().unwrap_or_default();
        let password = self.auto_backup_password.clone().unwrap_or_default();

        if enable && (storage_url.is_empty() || storage_access_key.is_empty()) {
            bail!("Automated backup needs --auto-backup-storage-url and --auto-backup-storage-key");
        }
        if self.auto_backup_encryption && password.is_empty() {
            bail!("Encrypted backup needs --auto-backup-password");
        }

        Ok(Some(AutoBackupSettings {
            enable,
            enable_encryption: self.auto_backup_encryption,
            retention_period: self.auto_backup_retention_days,
            storage_url,
            storage_access_key,
            password,
        }))
    }
}

pub async fn run(cmd: VmCommands, ctx: &CommandContext) -> Result<()> {
    match cmd {
        VmCommands::SqlExtension(SqlExtensionCommands::Set(args)) => {
            set_sql_extension(args, ctx).await
        }
    }
}

async fn set_sql_extension(args: SqlExtensionSetArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    let response = ctx
        .traced(apply_sql_extension(&client, &args, ctx))
        .await?;

    match ctx.output {
        OutputFormat::Json => output::json(&response)?,
        OutputFormat::Table => print_response(&response),
    }
    Ok(())
}

/// Resolve the location, build the extension and submit it with retry
async fn apply_sql_extension(
    client: &ManagementClient,
    args: &SqlExtensionSetArgs,
    ctx: &CommandContext,
) -> Result<OperationResponse<VirtualMachineExtension>> {
    let location = match args.location.as_deref().filter(|l| !l.is_empty()) {
        Some(location) => location.to_string(),
        None => {
            client
                .get_virtual_machine(&args.resource_group, &args.vm_name)
                .await
                .with_context(|| format!("Failed to look up location of VM '{}'", args.vm_name))?
                .location
        }
    };

    let extension = build_extension(args, location)?;
    let name = args
        .name
        .clone()
        .unwrap_or_else(SqlServerExtension::default_name);
    let resource = extension
        .to_extension()
        .context("Failed to serialize extension settings")?;

    let executor = RetryExecutorBuilder::new()
        .with_policy(ctx.config.retry_policies.policy_for(EXTENSION_CREATE_POLICY))
        .with_observer(TracingObserver::new(EXTENSION_CREATE_POLICY))
        .build();

    let spinner = (!ctx.quiet).then(|| {
        output::spinner(&format!(
            "Setting {} on {} ({} attempts max)",
            name,
            args.vm_name,
            executor.max_attempts()
        ))
    });

    let result = executor
        .execute(|| {
            client.create_or_update_extension(&args.resource_group, &args.vm_name, &name, &resource)
        })
        .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    result.with_context(|| format!("Failed to set SQL Server extension on '{}'", args.vm_name))
}

fn build_extension(args: &SqlExtensionSetArgs, location: String) -> Result<SqlServerExtension> {
    Ok(SqlServerExtension::new(location)
        .with_version(args.version.clone())
        .with_auto_patching(args.auto_patching.to_settings())
        .with_auto_backup(args.auto_backup.to_settings()?))
}

fn print_response(response: &OperationResponse<VirtualMachineExtension>) {
    output::success("SQL Server extension applied");
    output::header("Operation");
    output::kv("Request id", response.request_id.as_deref().unwrap_or("-"));
    output::kv("Status code", &response.status_code.to_string());

    let extension = &response.body;
    output::header("Extension");
    output::kv("Name", extension.name.as_deref().unwrap_or("-"));
    output::kv("Location", &extension.location);
    output::kv("Version", &extension.properties.type_handler_version);
    output::kv(
        "Provisioning state",
        extension
            .properties
            .provisioning_state
            .as_deref()
            .unwrap_or("-"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(extra: &[&str]) -> SqlExtensionSetArgs {
        let mut argv = vec![
            "armctl",
            "vm",
            "sql-extension",
            "set",
            "-g",
            "sql-rg",
            "--vm-name",
            "sqlvm01",
        ];
        argv.extend_from_slice(extra);

        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Vm(VmCommands::SqlExtension(SqlExtensionCommands::Set(args))) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_leave_settings_unconfigured() {
        let args = parse(&[]);
        let extension = build_extension(&args, "westus".to_string()).unwrap();

        assert_eq!(extension.version(), SqlServerExtension::DEFAULT_VERSION);
        let public = extension.public_settings();
        assert!(public.auto_patching_settings.is_none());
        assert!(public.auto_backup_settings.is_none());
        assert_eq!(public.auto_telemetry_settings.region, "westus");
        assert_eq!(extension.private_settings().password, "");
    }

    #[test]
    fn test_auto_patching_from_flags() {
        let args = parse(&[
            "--auto-patching-enable",
            "true",
            "--auto-patching-day",
            "Tuesday",
            "--auto-patching-start-hour",
            "23",
        ]);

        let patching = args.auto_patching.to_settings().unwrap();
        assert!(patching.enable);
        assert_eq!(patching.day_of_week, "Tuesday");
        assert_eq!(patching.maintenance_window_starting_hour, 23);
        assert_eq!(patching.maintenance_window_duration, 60);
        assert_eq!(patching.patch_category, "Important");
    }

    #[test]
    fn test_start_hour_out_of_range_rejected() {
        let argv = [
            "armctl",
            "vm",
            "sql-extension",
            "set",
            "-g",
            "rg",
            "--vm-name",
            "vm",
            "--auto-patching-start-hour",
            "24",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_auto_backup_credentials_go_private() {
        let args = parse(&[
            "--auto-backup-enable",
            "true",
            "--auto-backup-encryption",
            "--auto-backup-storage-url",
            "https://backups.blob.core.windows.net/",
            "--auto-backup-storage-key",
            "key==",
            "--auto-backup-password",
            "hunter2",
        ]);

        let extension = build_extension(&args, "westus".to_string()).unwrap();
        let private = extension.private_settings();
        assert_eq!(private.storage_url, "https://backups.blob.core.windows.net/");
        assert_eq!(private.storage_access_key, "key==");
        assert_eq!(private.password, "hunter2");

        let backup = extension.public_settings().auto_backup_settings.unwrap();
        assert!(backup.enable_encryption);
        assert_eq!(backup.retention_period, 30);
    }

    #[test]
    fn test_enabled_backup_requires_storage() {
        let args = parse(&["--auto-backup-enable", "true"]);
        assert!(build_extension(&args, "westus".to_string()).is_err());
    }

    #[test]
    fn test_encryption_requires_password() {
        let args = parse(&[
            "--auto-backup-enable",
            "true",
            "--auto-backup-encryption",
            "--auto-backup-storage-url",
            "https://backups.blob.core.windows.net/",
            "--auto-backup-storage-key",
            "key==",
        ]);
        assert!(build_extension(&args, "westus".to_string()).is_err());
    }

    #[test]
    fn test_version_alias() {
        let args = parse(&["--handler-version", "1.5"]);
        let extension = build_extension(&args, "westus".to_string()).unwrap();
        assert_eq!(extension.version(), "1.5");
    }
}
