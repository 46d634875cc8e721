//! Query construction for file listings.

use crate::auth::UserDocument;
use crate::backend::Query;

use super::types::FileType;

/// Sort applied when the caller gives none: newest first.
pub const DEFAULT_SORT: &str = "$createdAt-desc";

/// Split a `<field>-<asc|desc>` sort key into its ordering clause.
///
/// Anything other than `asc` orders descending.
pub fn sort_query(sort: &str) -> Query {
    let mut parts = sort.split('-');
    let field = parts.next().unwrap_or_default();
    if parts.next() == Some("asc") {
        Query::order_asc(field)
    } else {
        Query::order_desc(field)
    }
}

/// Listing filters for `current_user`.
///
/// The first clause is always the access rule: files the user owns or
/// that were shared with the user's email. It is the only check that
/// decides which files a user can see.
pub fn create_queries(
    current_user: &UserDocument,
    types: &[FileType],
    search_text: &str,
    sort: &str,
    limit: Option<u64>,
) -> Vec<Query> {
    let mut queries = vec![Query::or(vec![
        Query::equal("owners", [current_user.id.as_str()]),
        Query::contains("users", [current_user.email.as_str()]),
    ])];

    if !types.is_empty() {
        queries.push(Query::equal("type", types.iter().map(FileType::as_str)));
    }

    if !search_text.is_empty() {
        queries.push(Query::contains("name", [search_text]));
    }

    if let Some(limit) = limit.filter(|n| *n > 0) {
        queries.push(Query::limit(limit));
    }

    if !sort.is_empty() {
        queries.push(sort_query(sort));
    }

    queries
}
