//! Resolver-side error glue.
//!
//! async-graphql has a blanket `From<T: Display>` into its error type, so the
//! resolvers only need two helpers: one that prefixes a contextual message
//! onto an expected failure, and one that swallows the cause of an unexpected
//! one. Database errors always take the second path so SQL detail never
//! reaches a client.

pub trait ResultExt<T> {
    /// Expected failure: the caller sees `context: cause`.
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;

    /// Unexpected failure: the cause is logged server-side and the caller
    /// sees `context` alone.
    fn db_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| async_graphql::Error::new(format!("{context}: {e}")))
    }

    fn db_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| {
            tracing::error!("{context}: {e}");
            async_graphql::Error::new(context.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gql_err_keeps_the_cause_visible() {
        let result: Result<(), &str> = Err("bad slug");
        let error = result.gql_err("Invalid tournament ID").unwrap_err();
        assert_eq!(error.message, "Invalid tournament ID: bad slug");
    }

    #[test]
    fn db_err_hides_the_cause() {
        let result: Result<(), &str> = Err("connection refused on 10.0.0.3:5432");
        let error = result.db_err("Database operation failed").unwrap_err();
        assert_eq!(error.message, "Database operation failed");
    }
}
