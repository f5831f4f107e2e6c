//! GetMembershipStatusHandler - Query handler answering "is this user entitled right now".

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{unix_now, UserId};
use crate::domain::membership::MembershipError;
use crate::ports::MembershipStore;

/// Query for a user's current entitlement.
#[derive(Debug, Clone)]
pub struct GetMembershipStatusQuery {
    pub user_id: UserId,
}

/// Entitlement answer for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MembershipStatusView {
    /// A record exists; `active` is evaluated against the current time.
    Found {
        active: bool,
        status: String,
        current_period_end: i64,
    },
    /// No record has ever been written for the user.
    NotFound { active: bool, reason: &'static str },
}

impl MembershipStatusView {
    pub fn not_found() -> Self {
        MembershipStatusView::NotFound {
            active: false,
            reason: "not_found",
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            MembershipStatusView::Found { active, .. } => *active,
            MembershipStatusView::NotFound { .. } => false,
        }
    }
}

/// Handler for membership status lookups.
pub struct GetMembershipStatusHandler {
    store: Arc<dyn MembershipStore>,
}

impl GetMembershipStatusHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetMembershipStatusQuery,
    ) -> Result<MembershipStatusView, MembershipError> {
        self.handle_at(query, unix_now()).await
    }

    /// Evaluates entitlement as of `now` (Unix seconds).
    pub async fn handle_at(
        &self,
        query: GetMembershipStatusQuery,
        now: i64,
    ) -> Result<MembershipStatusView, MembershipError> {
        let record = self.store.get(&query.user_id).await?;

        Ok(match record {
            Some(record) => MembershipStatusView::Found {
                active: record.is_active(now),
                status: record.status,
                current_period_end: record.current_period_end,
            },
            None => MembershipStatusView::not_found(),
        })
    }
}
