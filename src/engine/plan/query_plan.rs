use std::fmt;

use super::client_aggregation::QueryPlanWithoutServerAggregation;
use super::cql::CqlResult;
use super::for_every::QueryPlanForEvery;
use super::no_aggregation::QueryPlanNoAggregation;
use super::server_aggregation::QueryPlanWithServerAggregation;
use crate::engine::errors::QueryPlanError;
use crate::engine::session::Session;

/// Which strategy a plan uses to fulfill its high-level query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    ServerAggregation,
    ClientAggregation,
    NoAggregation,
    ForEvery,
}

impl PlanKind {
    pub fn label(&self) -> &'static str {
        match self {
            PlanKind::ServerAggregation => "qpsa",
            PlanKind::ClientAggregation => "qpca",
            PlanKind::NoAggregation => "qpna",
            PlanKind::ForEvery => "qpfe",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub enum QueryPlan {
    WithServerAggregation(QueryPlanWithServerAggregation),
    WithoutServerAggregation(QueryPlanWithoutServerAggregation),
    NoAggregation(QueryPlanNoAggregation),
    ForEvery(QueryPlanForEvery),
}

impl QueryPlan {
    pub fn kind(&self) -> PlanKind {
        match self {
            QueryPlan::WithServerAggregation(_) => PlanKind::ServerAggregation,
            QueryPlan::WithoutServerAggregation(_) => PlanKind::ClientAggregation,
            QueryPlan::NoAggregation(_) => PlanKind::NoAggregation,
            QueryPlan::ForEvery(_) => PlanKind::ForEvery,
        }
    }

    pub fn query_count(&self) -> usize {
        match self {
            QueryPlan::WithServerAggregation(p) => p.query_count(),
            QueryPlan::WithoutServerAggregation(p) => p.query_count(),
            QueryPlan::NoAggregation(p) => p.query_count(),
            QueryPlan::ForEvery(p) => p.query_count(),
        }
    }

    pub fn debug_queries(&self, level: u8) {
        match self {
            QueryPlan::WithServerAggregation(p) => p.debug_queries(level),
            QueryPlan::WithoutServerAggregation(p) => p.debug_queries(level),
            QueryPlan::NoAggregation(p) => p.debug_queries(level),
            QueryPlan::ForEvery(p) => p.debug_queries(level),
        }
    }

    /// Plans are single-use: executing consumes the plan and its
    /// aggregation state.
    pub async fn execute(self, session: &dyn Session) -> Result<Vec<CqlResult>, QueryPlanError> {
        match self {
            QueryPlan::WithServerAggregation(p) => p.execute(session).await,
            QueryPlan::WithoutServerAggregation(p) => p.execute(session).await,
            QueryPlan::NoAggregation(p) => p.execute(session).await,
            QueryPlan::ForEvery(p) => p.execute(session).await,
        }
    }
}

impl From<QueryPlanWithServerAggregation> for QueryPlan {
    fn from(p: QueryPlanWithServerAggregation) -> Self {
        QueryPlan::WithServerAggregation(p)
    }
}

impl From<QueryPlanWithoutServerAggregation> for QueryPlan {
    fn from(p: QueryPlanWithoutServerAggregation) -> Self {
        QueryPlan::WithoutServerAggregation(p)
    }
}

impl From<QueryPlanNoAggregation> for QueryPlan {
    fn from(p: QueryPlanNoAggregation) -> Self {
        QueryPlan::NoAggregation(p)
    }
}

impl From<QueryPlanForEvery> for QueryPlan {
    fn from(p: QueryPlanForEvery) -> Self {
        QueryPlan::ForEvery(p)
    }
}
