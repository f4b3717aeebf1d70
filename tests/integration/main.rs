//! Integration tests driving the real router over in-memory collaborators.

mod helpers;

mod admission_test;
mod auth_test;
mod guards_test;
mod users_test;
