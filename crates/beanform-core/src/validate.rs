//! Shallow submit-readiness checks
//!
//! The gate is deliberately narrow: every posting needs an account, and
//! at most one posting may leave its amount blank for the ledger's
//! implicit balancing rule. Date, payee, narration and metadata are
//! never required.

use serde::{Deserialize, Serialize};

use crate::draft::TransactionDraft;
use beanform_utils::is_blank;

/// Codes for the conditions the validator checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A posting has no account chosen
    MissingAccount,
    /// More than one posting has a blank amount
    TooManyBlankAmounts,
}

/// One failed validation condition, serializable for API display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

fn blank_amount_count(draft: &TransactionDraft) -> usize {
    draft
        .postings
        .iter()
        .filter(|p| is_blank(&p.amount))
        .count()
}

/// Whether the draft is ready to submit
pub fn is_valid(draft: &TransactionDraft) -> bool {
    draft.postings.iter().all(|p| p.account.is_some()) && blank_amount_count(draft) <= 1
}

/// List the failed conditions; empty exactly when [`is_valid`] is true
pub fn issues(draft: &TransactionDraft) -> Vec<ValidationIssue> {
    let mut issues = vec![];

    let missing = draft
        .postings
        .iter()
        .filter(|p| p.account.is_none())
        .count();
    if missing > 0 {
        issues.push(ValidationIssue {
            code: IssueCode::MissingAccount,
            message: format!("{} posting(s) have no account chosen", missing),
        });
    }

    let blank = blank_amount_count(draft);
    if blank > 1 {
        issues.push(ValidationIssue {
            code: IssueCode::TooManyBlankAmounts,
            message: format!(
                "{} postings have blank amounts; at most one can be inferred",
                blank
            ),
        });
    }

    issues
}

// ==================== Tests ====================
