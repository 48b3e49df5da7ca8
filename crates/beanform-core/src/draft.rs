//! Transaction draft model and form state holder

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::{preview, validate};
use beanform_utils::is_blank;

/// One account/amount row of the draft
///
/// The account is `None` until the user picks one; the amount stays
/// free text until submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub account: Option<String>,
    pub amount: String,
}

impl Posting {
    /// A fresh, untouched row
    pub fn empty() -> Self {
        Self {
            account: None,
            amount: String::new(),
        }
    }

    pub fn new(account: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            amount: amount.into(),
        }
    }
}

/// One key/value metadata row of the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

impl MetaEntry {
    pub fn empty() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
        }
    }

    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The in-progress transaction being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Entry date; rendered as the Unix epoch when unset
    pub date: Option<NaiveDateTime>,
    /// Counterparty; `None` until entered
    pub payee: Option<String>,
    /// Free-text description
    pub narration: String,
    /// Ordered posting rows (display order, never sorted)
    pub postings: Vec<Posting>,
    /// Ordered metadata rows
    pub metas: Vec<MetaEntry>,
}

impl TransactionDraft {
    /// Fresh draft for a new entry: given timestamp, two empty posting
    /// rows, no metadata
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            date: Some(now),
            payee: None,
            narration: String::new(),
            postings: vec![Posting::empty(), Posting::empty()],
            metas: vec![],
        }
    }
}

/// Editable field of a posting row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingField {
    Account,
    Amount,
}

/// Editable field of a metadata row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaField {
    Key,
    Value,
}

/// Form state holder owning one [`TransactionDraft`]
///
/// All mutations are synchronous and touch nothing but the held draft;
/// preview and validity are derived on read, never stored. Row
/// operations take an index and fail with `InvalidIndex` when it is out
/// of range. The minimum-posting-count rule is deliberately NOT
/// enforced here: it belongs to the presentation layer.
#[derive(Debug, Clone)]
pub struct DraftForm {
    draft: TransactionDraft,
}

impl DraftForm {
    pub fn new(draft: TransactionDraft) -> Self {
        Self { draft }
    }

    /// Read-only view of the held draft
    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    /// Replace the whole draft (used after submit or cancel)
    pub fn reset(&mut self, draft: TransactionDraft) {
        self.draft = draft;
    }

    pub fn set_date(&mut self, date: Option<NaiveDateTime>) {
        self.draft.date = date;
    }

    /// Replace the payee; a blank string clears it back to unset
    pub fn set_payee(&mut self, payee: &str) {
        self.draft.payee = if is_blank(payee) {
            None
        } else {
            Some(payee.to_string())
        };
    }

    pub fn set_narration(&mut self, narration: impl Into<String>) {
        self.draft.narration = narration.into();
    }

    /// Replace one field of the posting at `index`
    ///
    /// Setting the account to a blank value stores the unset state.
    pub fn update_posting(
        &mut self,
        index: usize,
        field: PostingField,
        value: &str,
    ) -> CoreResult<()> {
        let len = self.draft.postings.len();
        let posting = self
            .draft
            .postings
            .get_mut(index)
            .ok_or(CoreError::InvalidIndex { index, len })?;
        match field {
            PostingField::Account => {
                posting.account = if is_blank(value) {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            PostingField::Amount => posting.amount = value.to_string(),
        }
        Ok(())
    }

    /// Append a fresh posting row
    pub fn add_posting(&mut self) {
        self.draft.postings.push(Posting::empty());
    }

    /// Remove the posting at `index`, returning the removed row
    pub fn remove_posting(&mut self, index: usize) -> CoreResult<Posting> {
        let len = self.draft.postings.len();
        if index >= len {
            return Err(CoreError::InvalidIndex { index, len });
        }
        Ok(self.draft.postings.remove(index))
    }

    /// Append a fresh metadata row
    pub fn add_meta(&mut self) {
        self.draft.metas.push(MetaEntry::empty());
    }

    /// Replace one field of the metadata row at `index`
    pub fn update_meta(&mut self, index: usize, field: MetaField, value: &str) -> CoreResult<()> {
        let len = self.draft.metas.len();
        let meta = self
            .draft
            .metas
            .get_mut(index)
            .ok_or(CoreError::InvalidIndex { index, len })?;
        match field {
            MetaField::Key => meta.key = value.to_string(),
            MetaField::Value => meta.value = value.to_string(),
        }
        Ok(())
    }

    /// Remove the metadata row at `index`, returning the removed row
    pub fn remove_meta(&mut self, index: usize) -> CoreResult<MetaEntry> {
        let len = self.draft.metas.len();
        if index >= len {
            return Err(CoreError::InvalidIndex { index, len });
        }
        Ok(self.draft.metas.remove(index))
    }

    /// Serialize the draft to its ledger-entry text
    pub fn preview(&self) -> String {
        preview::preview(&self.draft)
    }

    /// Whether the draft is ready to submit
    pub fn is_valid(&self) -> bool {
        validate::is_valid(&self.draft)
    }
}

// ==================== Tests ====================
