pub mod absences;
pub mod conflicts;
pub mod lessons;
pub mod schedules;
pub mod substitutes;
