mod coverage_test;
mod health_test;
mod lessons_test;
mod middleware_test;
mod schedules_test;
