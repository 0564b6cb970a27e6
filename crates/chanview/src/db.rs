use crate::{
    analytic::{self, AnalyticQueries, AnalyticResult},
    error::{Error, ErrorOrigin},
    filter,
    index::{self, IndexDoc},
    obs::{self, MetricsEvent},
    principal::Principal,
    store::{IndexResult, IndexStore, QueryOptions},
};

///
/// Database
///
/// Store handle plus the analytic statement registry. Every operation takes
/// the calling principal explicitly; this is the only place access decisions
/// are made.
///

pub struct Database<S: IndexStore> {
    store: S,
    queries: AnalyticQueries,
}

impl<S: IndexStore> Database<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            queries: AnalyticQueries::new(),
        }
    }

    #[must_use]
    pub const fn with_queries(store: S, queries: AnalyticQueries) -> Self {
        Self { store, queries }
    }

    /// Registry of named analytic statements.
    pub const fn queries_mut(&mut self) -> &mut AnalyticQueries {
        &mut self.queries
    }

    //
    // Access gate
    //

    /// Index management is an administrative operation, for internal and
    /// user-defined indexes alike.
    fn check_management_access(principal: &Principal, name: &str) -> Result<(), Error> {
        if principal.is_admin() {
            return Ok(());
        }

        obs::record(MetricsEvent::AccessDenied);
        Err(Error::forbidden(
            ErrorOrigin::Index,
            format!("index '{name}' may only be managed by an administrator"),
        ))
    }

    /// Querying is broader than management: end users may query any
    /// non-internal index.
    fn check_query_access(principal: &Principal, name: &str) -> Result<(), Error> {
        if principal.is_admin() || !index::is_internal_index(name) {
            return Ok(());
        }

        obs::record(MetricsEvent::AccessDenied);
        Err(Error::forbidden(
            ErrorOrigin::Query,
            format!("index '{name}' is internal"),
        ))
    }

    //
    // Index management
    //

    pub fn get_index(&self, principal: &Principal, name: &str) -> Result<IndexDoc, Error> {
        Self::check_management_access(principal, name)?;

        Ok(self.store.get_index(name)?)
    }

    /// Store an index definition, wrapping its views with the
    /// channel-emission layer unless the definition asks for raw storage.
    pub fn put_index(
        &mut self,
        principal: &Principal,
        name: &str,
        mut doc: IndexDoc,
    ) -> Result<(), Error> {
        Self::check_management_access(principal, name)?;

        index::wrap_views(&mut doc);
        Ok(self.store.put_index(name, doc)?)
    }

    pub fn delete_index(&mut self, principal: &Principal, name: &str) -> Result<(), Error> {
        Self::check_management_access(principal, name)?;

        Ok(self.store.delete_index(name)?)
    }

    //
    // Query execution
    //

    /// Execute one view and reduce the raw rows to the subset the caller may
    /// see. Internal indexes skip channel filtering (only administrators
    /// reach them) but still lose embedded-document metadata when full
    /// documents were requested.
    pub fn query_index(
        &self,
        principal: &Principal,
        name: &str,
        view: &str,
        options: &QueryOptions,
    ) -> Result<IndexResult, Error> {
        Self::check_query_access(principal, name)?;

        let mut result = self.store.query_index(name, view, options)?;

        if index::is_internal_index(name) {
            if options.include_docs {
                for row in &mut result.rows {
                    row.strip_doc_meta();
                }
            }

            Ok(result)
        } else {
            filter::filter_index_result(result, principal, options)
        }
    }

    /// Execute a registered analytic statement, filtered for the caller.
    pub fn query_analytic(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<AnalyticResult, Error> {
        let Some(statement) = self.queries.statement(name) else {
            return Err(Error::not_found(
                ErrorOrigin::Analytic,
                format!("analytic query '{name}' is not registered"),
            ));
        };

        analytic::run_statement(&self.store, statement, principal)
    }
}

///
/// TESTS
///
