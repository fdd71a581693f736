//! Diesel row models for the payments persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{enrollments, users};

/// Row model for the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Row model for the `enrollments` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnrollmentRow {
    pub id: i64,
    pub user_id: String,
    pub course_id: String,
    pub purchased_at: DateTime<Utc>,
}

/// Insert model for new enrollments.
#[derive(Debug, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollmentRow<'a> {
    pub user_id: &'a str,
    pub course_id: &'a str,
    pub purchased_at: DateTime<Utc>,
}
