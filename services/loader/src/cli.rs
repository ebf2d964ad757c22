use crate::report::{render_catalog, render_load_summary};
use clap::{Args, Parser, Subcommand};
use school_directory::config::AppConfig;
use school_directory::error::AppError;
use school_directory::loader::{LoadOptions, PhoneFormat, SchoolLoader};
use school_directory::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "school-loader",
    about = "Import a school registry CSV export into generated TypeScript modules",
    version,
    ignore_errors = true,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[command(flatten)]
    load: LoadArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize the CSV and write or merge entity modules (default command)
    Load(LoadArgs),
    /// List the entities already generated for each sector
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct LoadArgs {
    /// CSV export to read, relative to the current directory
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Report what would change without touching the output tree
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Rewrite entities that already exist instead of skipping them
    #[arg(long)]
    pub(crate) overwrite: bool,
    /// Root directory the region folders are generated under
    #[arg(long)]
    pub(crate) output_root: Option<PathBuf>,
    /// Phone number convention (parish or north-american)
    #[arg(long, value_parser = parse_phone_format)]
    pub(crate) phone_format: Option<PhoneFormat>,
    /// Region (parish) name used for paths, barrels and addresses
    #[arg(long)]
    pub(crate) region: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Override the configured output root
    #[arg(long)]
    pub(crate) output_root: Option<PathBuf>,
    /// Override the configured region
    #[arg(long)]
    pub(crate) region: Option<String>,
}

fn parse_phone_format(value: &str) -> Result<PhoneFormat, String> {
    PhoneFormat::parse(value)
        .ok_or_else(|| format!("unknown phone format '{value}' (expected parish or north-american)"))
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(?config.environment, "school loader starting");

    match cli.command {
        Some(Command::Load(args)) => run_load(&config, args),
        Some(Command::Catalog(args)) => run_catalog(&config, args),
        None => run_load(&config, cli.load),
    }
}

fn run_load(config: &AppConfig, args: LoadArgs) -> Result<(), AppError> {
    let options = load_options(config, args);
    let loader = SchoolLoader::new(options);
    let summary = loader.run()?;
    render_load_summary(loader.options(), &summary);
    Ok(())
}

fn run_catalog(config: &AppConfig, args: CatalogArgs) -> Result<(), AppError> {
    let mut options = LoadOptions::from_config(&config.loader);
    if let Some(output_root) = args.output_root {
        options.output_root = output_root;
    }
    if let Some(region) = args.region {
        options.region = region;
    }

    let catalog = SchoolLoader::new(options).catalog()?;
    render_catalog(&catalog);
    Ok(())
}

fn load_options(config: &AppConfig, args: LoadArgs) -> LoadOptions {
    let LoadArgs {
        input,
        dry_run,
        overwrite,
        output_root,
        phone_format,
        region,
    } = args;

    let mut options = LoadOptions::from_config(&config.loader);
    if let Some(input) = input {
        options.input = input;
    }
    if let Some(output_root) = output_root {
        options.output_root = output_root;
    }
    if let Some(phone_format) = phone_format {
        options.phone_format = phone_format;
    }
    if let Some(region) = region {
        options.region = region;
    }
    options.dry_run = dry_run;
    options.overwrite = overwrite;
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_directory::config::{AppEnvironment, LoaderConfig, TelemetryConfig};
    use school_directory::loader::AddressCleanup;

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            loader: LoaderConfig {
                input: PathBuf::from("data/st-elizabeth-schools.csv"),
                output_root: PathBuf::from("src/data/schools"),
                region: "St. Elizabeth".to_string(),
                phone_format: PhoneFormat::Parish,
                area_code: "876".to_string(),
                address_cleanup: AddressCleanup::ParishSuffix,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }

    #[test]
    fn bare_flags_run_the_default_load() {
        let cli = Cli::parse_from(["school-loader", "--dry-run", "--input", "other.csv"]);
        assert!(cli.command.is_none());
        assert!(cli.load.dry_run);
        assert_eq!(cli.load.input, Some(PathBuf::from("other.csv")));
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let cli = Cli::parse_from(["school-loader", "--overwrite", "--verbose"]);
        assert!(cli.command.is_none());
        assert!(cli.load.overwrite);
    }

    #[test]
    fn catalog_subcommand_parses() {
        let cli = Cli::parse_from(["school-loader", "catalog", "--region", "Manchester"]);
        match cli.command {
            Some(Command::Catalog(args)) => assert_eq!(args.region.as_deref(), Some("Manchester")),
            other => panic!("expected catalog, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_configuration() {
        let args = LoadArgs {
            input: Some(PathBuf::from("fresh.csv")),
            dry_run: true,
            overwrite: false,
            output_root: None,
            phone_format: Some(PhoneFormat::NorthAmerican),
            region: Some("Manchester".to_string()),
        };
        let options = load_options(&config(), args);
        assert_eq!(options.input, PathBuf::from("fresh.csv"));
        assert_eq!(options.output_root, PathBuf::from("src/data/schools"));
        assert_eq!(options.phone_format, PhoneFormat::NorthAmerican);
        assert_eq!(options.region, "Manchester");
        assert_eq!(options.area_code, "876");
        assert!(options.dry_run);
    }

    #[test]
    fn phone_format_flag_rejects_unknown_values() {
        assert_eq!(parse_phone_format("north-american"), Ok(PhoneFormat::NorthAmerican));
        assert!(parse_phone_format("e164").is_err());
    }
}
