//! The guardian decision state carried on a submission.
//!
//! Exactly one decision applies per submission per day, so approval is
//! state on the ledger row, not a separate record. Revising a decision
//! (including un-approving) is a transition here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Approval {
  Pending,
  Approved {
    approver_id: Uuid,
    decided_at:  DateTime<Utc>,
  },
  Rejected {
    approver_id: Uuid,
    reason:      String,
    decided_at:  DateTime<Utc>,
  },
}

impl Approval {
  /// Stable status name; also the database column value.
  pub fn status_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved { .. } => "approved",
      Self::Rejected { .. } => "rejected",
    }
  }

  /// Approved submissions are immutable to further upserts.
  pub fn is_approved(&self) -> bool {
    matches!(self, Self::Approved { .. })
  }

  /// pending|rejected → approved. Any prior rejection reason is dropped.
  pub fn approve(
    &self,
    approver_id: Uuid,
    decided_at: DateTime<Utc>,
  ) -> Result<Self> {
    match self {
      Self::Pending | Self::Rejected { .. } => Ok(Self::Approved {
        approver_id,
        decided_at,
      }),
      Self::Approved { .. } => Err(Error::InvalidTransition {
        action: "approve",
        status: self.status_str(),
      }),
    }
  }

  /// pending|approved → rejected. The reason is mandatory; rejecting an
  /// approved submission un-approves it.
  pub fn reject(
    &self,
    approver_id: Uuid,
    reason: &str,
    decided_at: DateTime<Utc>,
  ) -> Result<Self> {
    let reason = reason.trim();
    if reason.is_empty() {
      return Err(Error::RejectionReasonRequired);
    }
    match self {
      Self::Pending | Self::Approved { .. } => Ok(Self::Rejected {
        approver_id,
        reason: reason.to_string(),
        decided_at,
      }),
      Self::Rejected { .. } => Err(Error::InvalidTransition {
        action: "reject",
        status: self.status_str(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn approver() -> Uuid {
    Uuid::new_v4()
  }

  #[test]
  fn approve_from_pending() {
    let parent = approver();
    let approved = Approval::Pending.approve(parent, Utc::now()).unwrap();
    assert!(matches!(
      approved,
      Approval::Approved { approver_id, .. } if approver_id == parent
    ));
  }

  #[test]
  fn approve_after_rejection_drops_reason() {
    let rejected = Approval::Pending
      .reject(approver(), "photo is blurry", Utc::now())
      .unwrap();
    let approved = rejected.approve(approver(), Utc::now()).unwrap();
    assert!(matches!(approved, Approval::Approved { .. }));
  }

  #[test]
  fn approve_twice_is_refused() {
    let approved = Approval::Pending.approve(approver(), Utc::now()).unwrap();
    let err = approved.approve(approver(), Utc::now()).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidTransition { action: "approve", status: "approved" }
    ));
  }

  #[test]
  fn reject_requires_reason() {
    let err = Approval::Pending
      .reject(approver(), "   ", Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::RejectionReasonRequired));
  }

  #[test]
  fn reject_an_approved_submission() {
    let approved = Approval::Pending.approve(approver(), Utc::now()).unwrap();
    let rejected = approved
      .reject(approver(), "wrong day", Utc::now())
      .unwrap();
    assert!(matches!(
      rejected,
      Approval::Rejected { reason, .. } if reason == "wrong day"
    ));
  }

  #[test]
  fn reject_twice_is_refused() {
    let rejected = Approval::Pending
      .reject(approver(), "incomplete", Utc::now())
      .unwrap();
    let err = rejected
      .reject(approver(), "still incomplete", Utc::now())
      .unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidTransition { action: "reject", status: "rejected" }
    ));
  }
}
