//! Diesel table definitions for the payments persistence layer.

diesel::table! {
    users (id) {
        #[max_length = 64]
        id -> Varchar,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 120]
        display_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    enrollments (id) {
        id -> Int8,
        #[max_length = 64]
        user_id -> Varchar,
        #[max_length = 64]
        course_id -> Varchar,
        purchased_at -> Timestamptz,
    }
}

diesel::joinable!(enrollments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, enrollments);
