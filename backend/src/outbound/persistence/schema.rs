//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        avatar -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Category tree; `parent_id` is cleared when the parent goes away.
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        slug -> Varchar,
        description -> Nullable<Varchar>,
        icon -> Text,
        parent_id -> Nullable<Uuid>,
        is_visible -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Blog posts with denormalised view and like counters.
    posts (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        excerpt -> Varchar,
        content -> Text,
        cover_image -> Text,
        author_id -> Uuid,
        category_id -> Uuid,
        tags -> Array<Text>,
        status -> Varchar,
        featured -> Bool,
        published_at -> Nullable<Timestamptz>,
        views -> Int8,
        likes -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (post, user) like.
    post_likes (post_id, user_id) {
        post_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Threaded comments; replies cascade with their parent.
    comments (id) {
        id -> Uuid,
        content -> Varchar,
        author_id -> Uuid,
        post_id -> Uuid,
        parent_id -> Nullable<Uuid>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Newsletter subscriptions keyed by unique email.
    subscribers (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Nullable<Varchar>,
        tags -> Array<Text>,
        confirmed_at -> Nullable<Timestamptz>,
        unsubscribed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(posts -> categories (category_id));
diesel::joinable!(post_likes -> posts (post_id));
diesel::joinable!(post_likes -> users (user_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    posts,
    post_likes,
    comments,
    subscribers,
);
