pub mod aggregate;
pub mod loader;
pub mod models;
pub mod parse;

pub use aggregate::aggregate_absences;
pub use loader::{load_absences, load_absences_file, load_roster, load_roster_file, RosterLoad};
pub use models::{AbsenceRow, AbsenceSummary, EmployeeId, EmployeeRecord};
