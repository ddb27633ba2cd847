use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bonus-calc")]
#[command(about = "Monthly attendance bonus eligibility from roster and absence exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (layered over config/default)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and seed the default leave categories
    Init,

    /// Classify every employee on the roster for one bonus period
    Process {
        /// Roster export (CSV)
        #[arg(short, long)]
        roster: String,

        /// Absence log export (CSV)
        #[arg(short, long)]
        absences: String,

        /// Operator decisions for employees awaiting evaluation (CSV)
        #[arg(short, long)]
        decisions: Option<String>,

        /// Exclude employees admitted after this date (YYYY-MM-DD)
        #[arg(long)]
        admission_cutoff: Option<NaiveDate>,

        /// Write every result to this CSV file
        #[arg(short, long)]
        output: Option<String>,

        /// Write payable employees to this CSV file
        #[arg(short, long)]
        payables: Option<String>,

        /// Payroll template whose header row lays out the payables export
        #[arg(short, long, requires = "payables")]
        template: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Show reasons and every data warning
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage the leave category table
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List the stored leave categories
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add or update one leave category
    Set {
        /// Leave type as it appears in the absence log
        name: String,

        /// grants_bonus, requires_decision or blocks_bonus
        disposition: String,
    },

    /// Remove one leave category
    Remove {
        name: String,
    },

    /// Replace the whole table from a CSV upload (name,disposition)
    Import {
        file: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the table to a CSV file
    Export {
        file: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_command() {
        let cli = Cli::try_parse_from([
            "bonus-calc",
            "--config",
            "custom.toml",
            "process",
            "--roster",
            "roster.csv",
            "--absences",
            "absences.csv",
            "--admission-cutoff",
            "2024-03-31",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        match cli.command {
            Commands::Process {
                roster,
                admission_cutoff,
                format,
                decisions,
                ..
            } => {
                assert_eq!(roster, "roster.csv");
                assert_eq!(admission_cutoff, NaiveDate::from_ymd_opt(2024, 3, 31));
                assert_eq!(format, OutputFormat::Json);
                assert!(decisions.is_none());
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_template_requires_payables() {
        let result = Cli::try_parse_from([
            "bonus-calc",
            "process",
            "-r",
            "roster.csv",
            "-a",
            "absences.csv",
            "--template",
            "layout.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_category_set() {
        let cli = Cli::try_parse_from(["bonus-calc", "categories", "set", "Licença Prêmio", "grants_bonus"]).unwrap();
        match cli.command {
            Commands::Categories {
                action: CategoryAction::Set { name, disposition },
            } => {
                assert_eq!(name, "Licença Prêmio");
                assert_eq!(disposition, "grants_bonus");
            }
            _ => panic!("expected categories set"),
        }
    }
}
