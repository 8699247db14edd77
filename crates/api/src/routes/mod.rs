pub mod absences;
pub mod conflicts;
pub mod health;
pub mod lessons;
pub mod schedules;
pub mod substitutes;
