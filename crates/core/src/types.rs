/// Internal user identifier, supplied by the upstream auth gateway.
pub type UserId = i64;

/// Locally assigned identifier for rows the store owns (linked accounts).
pub type DbId = i64;
