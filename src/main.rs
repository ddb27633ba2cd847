use attendance_bonus::{
    bonus::{run_period, PeriodInputs},
    cli::{CategoryAction, Cli, Commands, OutputFormat},
    error::{self, BonusError},
    records::loader::load_category_rows_file,
    report,
    storage::{Database, Disposition},
    utils, Config,
};
use clap::Parser;
use colored::*;
use std::fs::File;
use std::io::BufWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("attendance_bonus=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => {
            info!("Initializing...");
            initialize(&config)
        }

        Commands::Process {
            roster,
            absences,
            decisions,
            admission_cutoff,
            output,
            payables,
            template,
            format,
            verbose,
        } => {
            let inputs = PeriodInputs {
                roster,
                absences,
                decisions,
                admission_cutoff,
            };
            let exports = Exports {
                output,
                payables,
                template,
            };
            process(&config, &inputs, &exports, format, verbose)
        }

        Commands::Categories { action } => categories(&config, action),

        Commands::ShowConfig => show_config(&config),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn open_database(config: &Config) -> error::Result<Database> {
    let mut db = Database::new(&config.database.path)?;
    if db.seed_defaults_if_empty()? {
        info!(
            "No leave categories stored in {}; seeded the defaults",
            config.database.path
        );
    }
    Ok(db)
}

struct Exports {
    output: Option<String>,
    payables: Option<String>,
    template: Option<String>,
}

fn process(
    config: &Config,
    inputs: &PeriodInputs,
    exports: &Exports,
    format: OutputFormat,
    verbose: bool,
) -> error::Result<()> {
    let db = open_database(config)?;
    let categories = db.load()?;
    info!("Loaded {} leave categories", categories.len());

    let pb = utils::spinner("Classifying employees...");
    let run = run_period(inputs, &config.bonus, categories);
    pb.finish_and_clear();
    let run = run?;
    let summary = &run.summary;

    if let Some(path) = &exports.output {
        report::write_results_csv(&summary.results, BufWriter::new(File::create(path)?))?;
        info!("Results written to {}", path);
    }

    if let Some(path) = &exports.payables {
        let writer = BufWriter::new(File::create(path)?);
        let written = match &exports.template {
            Some(template) => {
                let headers = report::read_template_headers(File::open(template)?)?;
                report::write_template_csv(&summary.results, &headers, writer)?
            }
            None => report::write_payables_csv(&summary.results, writer)?,
        };
        info!("{} payable employees written to {}", written, path);
    }

    if format == OutputFormat::Json {
        println!("{}", report::render_json(summary, &run.log)?);
        return Ok(());
    }

    report::print_results_table(&summary.results, verbose);
    summary.print_summary();
    if let Some(review) = &run.review {
        println!(
            "Manual decisions:    {} applied, {} rejected",
            review.applied.to_string().green(),
            review.rejected.to_string().red()
        );
    }
    report::print_pending_review(summary);

    if verbose {
        report::print_run_log(&run.log);
    } else if !run.log.is_empty() {
        println!(
            "\n{}",
            format!("{} data warnings (use --verbose to list them)", run.log.len()).yellow()
        );
    }

    Ok(())
}

fn categories(config: &Config, action: CategoryAction) -> error::Result<()> {
    let mut db = open_database(config)?;

    match action {
        CategoryAction::List { format } => {
            let table = db.load()?;
            match format {
                OutputFormat::Json => {
                    let categories: Vec<_> = table.categories().collect();
                    println!("{}", serde_json::to_string_pretty(&categories)?);
                }
                OutputFormat::Table => report::print_categories(&table),
            }
        }

        CategoryAction::Set { name, disposition } => {
            let disposition: Disposition = disposition.parse()?;
            db.set(&name, disposition)?;
            println!("{} {} → {}", "✓".green(), name.trim(), disposition);
        }

        CategoryAction::Remove { name } => {
            db.remove(&name)?;
            println!("{} Removed {}", "✓".green(), name.trim());
        }

        CategoryAction::Import { file, yes } => {
            let rows = load_category_rows_file(&file)?;
            let current = db.count()?;
            if !yes
                && !utils::confirm_action(&format!(
                    "Replace {} stored categories with {} rows from {}?",
                    current,
                    rows.len(),
                    file
                ))?
            {
                println!("Cancelled");
                return Ok(());
            }
            let table = db.replace_from_upload(&rows)?;
            println!("{} Imported {} leave categories", "✓".green(), table.len());
        }

        CategoryAction::Export { file } => {
            let table = db.load()?;
            report::write_categories_csv(&table, BufWriter::new(File::create(&file)?))?;
            println!("{} Exported {} leave categories to {}", "✓".green(), table.len(), file);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> error::Result<()> {
    let text = config.to_toml().map_err(BonusError::Other)?;
    println!("{}", text);
    Ok(())
}

fn initialize(config: &Config) -> error::Result<()> {
    println!("{}", "Initializing attendance bonus processor...".green());
    let db = open_database(config)?;
    println!("{}", "✓ Database initialized".green());
    println!("{}", "✓ Configuration loaded".green());

    let bonus = &config.bonus;
    println!("\n{}", "Configuration:".cyan());
    println!("  Database:         {}", config.database.path);
    println!("  Leave categories: {}", db.count()?);
    println!("  Salary limit:     {}", utils::format_brl(bonus.salary_limit));
    println!(
        "  Full time:        {}h → {}",
        bonus.full_time_hours,
        utils::format_brl(bonus.full_time_amount)
    );
    println!(
        "  Part time:        {:?}h → {}",
        bonus.part_time_hours,
        utils::format_brl(bonus.part_time_amount)
    );
    if !bonus.excluded_roles.is_empty() {
        println!("  Excluded roles:   {}", bonus.excluded_roles.join(", "));
    }

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!(
        "  {} to classify a period",
        "bonus-calc process --roster roster.csv --absences absences.csv".yellow()
    );
    println!("  {} to review leave categories", "bonus-calc categories list".yellow());
    Ok(())
}
