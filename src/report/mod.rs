pub mod export;
pub mod terminal;

pub use export::{
    read_template_headers, write_categories_csv, write_payables_csv, write_results_csv, write_template_csv, ReportField,
};
pub use terminal::{print_categories, print_pending_review, print_results_table, print_run_log, render_json};
