//! Submit pipeline: payloads, mutation sinks and completion strategies
//!
//! The same form core serves both the standalone create dialog and the
//! embedded edit panel. The differences live behind two seams: a
//! [`DraftSource`] supplies the initial draft, and a
//! [`CompletionStrategy`] decides the payload shape and what happens
//! around submit (reset the form, or keep notifying a parent).

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::amount::{self, Unit};
use crate::draft::{DraftForm, MetaEntry, MetaField, PostingField, TransactionDraft};
use crate::error::{CoreError, CoreResult};
use crate::preview;
use beanform_config::PayloadKind;
use beanform_utils::{is_blank, quote};

// ==================== Payloads ====================

/// Raw entry text plus a timestamp, for append-style sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    /// Preview text wrapped in leading/trailing newlines
    pub content: String,
    /// UNIX seconds of the draft date; 0 when the date is unset
    pub created_at: i64,
}

/// One posting of a structured entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingPayload {
    pub account: String,
    pub unit: Option<Unit>,
}

/// Structured transaction object, for record-style sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredEntry {
    /// ISO-8601 datetime string
    pub datetime: String,
    /// Empty string when the payee is unset
    pub payee: String,
    pub narration: String,
    pub postings: Vec<PostingPayload>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub metas: Vec<MetaEntry>,
}

/// Payload handed to the mutation sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryPayload {
    Text(TextEntry),
    Structured(StructuredEntry),
}

/// Build the text payload from a draft
pub fn text_entry(draft: &TransactionDraft) -> TextEntry {
    TextEntry {
        content: format!("\n{}\n", preview::preview(draft)),
        created_at: draft.date.map(|d| d.and_utc().timestamp()).unwrap_or(0),
    }
}

/// Build the structured payload from a draft
///
/// Unlike the text form, amounts must parse here: an amount that is
/// neither blank nor `<number>[ <commodity>]` is an explicit error.
pub fn structured_entry(draft: &TransactionDraft) -> CoreResult<StructuredEntry> {
    let mut postings = Vec::with_capacity(draft.postings.len());
    for p in &draft.postings {
        let unit = amount::parse_unit(&p.amount)?;
        postings.push(PostingPayload {
            account: p.account.clone().unwrap_or_default(),
            unit,
        });
    }

    Ok(StructuredEntry {
        datetime: draft
            .date
            .unwrap_or(NaiveDateTime::UNIX_EPOCH)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        payee: draft.payee.clone().unwrap_or_default(),
        narration: draft.narration.clone(),
        postings,
        tags: vec![],
        links: vec![],
        metas: draft.metas.clone(),
    })
}

// ==================== Mutation sink ====================

/// External collaborator that persists submitted entries
#[async_trait]
pub trait MutationSink: Send + Sync {
    async fn store(&self, payload: EntryPayload) -> CoreResult<()>;
}

/// Sink reference type
pub type SinkRef = Arc<dyn MutationSink>;

/// Appends submitted entries to a ledger file
pub struct LedgerAppendSink {
    path: PathBuf,
}

impl LedgerAppendSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn render_structured(entry: &StructuredEntry) -> String {
    let date = entry
        .datetime
        .split('T')
        .next()
        .unwrap_or(entry.datetime.as_str());
    let narration = if is_blank(&entry.narration) {
        String::new()
    } else {
        format!(" {}", quote(&entry.narration))
    };

    let mut text = format!("\n{} {}{}\n", date, quote(&entry.payee), narration);
    for p in &entry.postings {
        match &p.unit {
            Some(Unit {
                number,
                commodity: Some(commodity),
            }) => text.push_str(&format!("  {} {} {}\n", p.account, number, commodity)),
            Some(Unit {
                number,
                commodity: None,
            }) => text.push_str(&format!("  {} {}\n", p.account, number)),
            None => text.push_str(&format!("  {}\n", p.account)),
        }
    }
    for m in entry
        .metas
        .iter()
        .filter(|m| !is_blank(&m.key) && !is_blank(&m.value))
    {
        text.push_str(&format!("  {}: {}\n", quote(&m.key), quote(&m.value)));
    }
    text
}

#[async_trait]
impl MutationSink for LedgerAppendSink {
    async fn store(&self, payload: EntryPayload) -> CoreResult<()> {
        let text = match payload {
            EntryPayload::Text(entry) => entry.content,
            EntryPayload::Structured(entry) => render_structured(&entry),
        };

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|e| CoreError::StoreError {
                message: format!("cannot open {}: {}", self.path.display(), e),
            })?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| CoreError::StoreError {
                message: format!("cannot write {}: {}", self.path.display(), e),
            })?;

        log::info!(target: "beanform::submit", "entry appended to {}", self.path.display());
        Ok(())
    }
}

// ==================== Strategies ====================

/// Supplies the draft the form starts from (and resets to)
pub trait DraftSource: Send + Sync {
    fn initial_draft(&self) -> TransactionDraft;
}

/// Fresh drafts stamped with the current local time
pub struct NewEntrySource;

impl DraftSource for NewEntrySource {
    fn initial_draft(&self) -> TransactionDraft {
        TransactionDraft::new(chrono::Local::now().naive_local())
    }
}

/// Starts from an existing record, for edit-in-place embedding
pub struct ExistingEntrySource {
    draft: TransactionDraft,
}

impl ExistingEntrySource {
    pub fn new(draft: TransactionDraft) -> Self {
        Self { draft }
    }
}

impl DraftSource for ExistingEntrySource {
    fn initial_draft(&self) -> TransactionDraft {
        self.draft.clone()
    }
}

/// Callback invoked with the assembled draft and current validity
pub type ChangeCallback = Box<dyn Fn(&TransactionDraft, bool) + Send + Sync>;

/// What happens around submit, and how the payload is shaped
pub trait CompletionStrategy: Send + Sync {
    /// Build the payload handed to the mutation sink
    fn payload(&self, draft: &TransactionDraft) -> CoreResult<EntryPayload>;

    /// Invoked after every state change
    fn on_change(&self, _draft: &TransactionDraft, _is_valid: bool) {}

    /// Runs after the payload has been handed off
    fn after_submit(&self, form: &mut DraftForm, source: &dyn DraftSource);
}

/// Standalone dialog behavior: submit, then start over from the source
pub struct ResetOnSubmit {
    payload_kind: PayloadKind,
}

impl ResetOnSubmit {
    pub fn new(payload_kind: PayloadKind) -> Self {
        Self { payload_kind }
    }
}

impl Default for ResetOnSubmit {
    fn default() -> Self {
        Self::new(PayloadKind::Text)
    }
}

impl CompletionStrategy for ResetOnSubmit {
    fn payload(&self, draft: &TransactionDraft) -> CoreResult<EntryPayload> {
        match self.payload_kind {
            PayloadKind::Text => Ok(EntryPayload::Text(text_entry(draft))),
            PayloadKind::Structured => Ok(EntryPayload::Structured(structured_entry(draft)?)),
        }
    }

    fn after_submit(&self, form: &mut DraftForm, source: &dyn DraftSource) {
        form.reset(source.initial_draft());
    }
}

/// Embedded panel behavior: report every change to the parent, keep
/// state across submits
pub struct NotifyParent {
    callback: ChangeCallback,
}

impl NotifyParent {
    pub fn new(callback: ChangeCallback) -> Self {
        Self { callback }
    }
}

impl CompletionStrategy for NotifyParent {
    fn payload(&self, draft: &TransactionDraft) -> CoreResult<EntryPayload> {
        Ok(EntryPayload::Structured(structured_entry(draft)?))
    }

    fn on_change(&self, draft: &TransactionDraft, is_valid: bool) {
        (self.callback)(draft, is_valid);
    }

    fn after_submit(&self, _form: &mut DraftForm, _source: &dyn DraftSource) {}
}

// ==================== Session ====================

/// One live form: state holder wired to its source, strategy and sink
pub struct FormSession {
    form: DraftForm,
    source: Box<dyn DraftSource>,
    strategy: Box<dyn CompletionStrategy>,
    sink: SinkRef,
}

impl FormSession {
    pub fn new(
        source: Box<dyn DraftSource>,
        strategy: Box<dyn CompletionStrategy>,
        sink: SinkRef,
    ) -> Self {
        let form = DraftForm::new(source.initial_draft());
        Self {
            form,
            source,
            strategy,
            sink,
        }
    }

    pub fn draft(&self) -> &TransactionDraft {
        self.form.draft()
    }

    /// Replace the whole draft, e.g. from a posted form
    pub fn load(&mut self, draft: TransactionDraft) {
        self.form.reset(draft);
        self.changed();
    }

    pub fn preview(&self) -> String {
        self.form.preview()
    }

    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    fn changed(&self) {
        self.strategy.on_change(self.form.draft(), self.form.is_valid());
    }

    pub fn set_date(&mut self, date: Option<NaiveDateTime>) {
        self.form.set_date(date);
        self.changed();
    }

    pub fn set_payee(&mut self, payee: &str) {
        self.form.set_payee(payee);
        self.changed();
    }

    pub fn set_narration(&mut self, narration: &str) {
        self.form.set_narration(narration);
        self.changed();
    }

    pub fn update_posting(
        &mut self,
        index: usize,
        field: PostingField,
        value: &str,
    ) -> CoreResult<()> {
        self.form.update_posting(index, field, value)?;
        self.changed();
        Ok(())
    }

    pub fn add_posting(&mut self) {
        self.form.add_posting();
        self.changed();
    }

    pub fn remove_posting(&mut self, index: usize) -> CoreResult<()> {
        self.form.remove_posting(index)?;
        self.changed();
        Ok(())
    }

    pub fn add_meta(&mut self) {
        self.form.add_meta();
        self.changed();
    }

    pub fn update_meta(&mut self, index: usize, field: MetaField, value: &str) -> CoreResult<()> {
        self.form.update_meta(index, field, value)?;
        self.changed();
        Ok(())
    }

    pub fn remove_meta(&mut self, index: usize) -> CoreResult<()> {
        self.form.remove_meta(index)?;
        self.changed();
        Ok(())
    }

    /// Hand the draft to the mutation sink and run the post-submit
    /// lifecycle
    ///
    /// The validity gate is re-checked here even though the UI disables
    /// submission for invalid drafts. A sink failure is logged but does
    /// not stop the lifecycle: there is no rollback once submit runs.
    pub async fn submit(&mut self) -> CoreResult<()> {
        if !self.form.is_valid() {
            return Err(CoreError::ValidationError {
                message: "draft is not ready to submit".to_string(),
            });
        }

        let payload = self.strategy.payload(self.form.draft())?;
        if let Err(e) = self.sink.store(payload).await {
            log::error!(target: "beanform::submit", "mutation sink rejected entry: {}", e);
        }

        self.strategy.after_submit(&mut self.form, self.source.as_ref());
        self.changed();
        Ok(())
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Posting;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn fixed_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn valid_draft() -> TransactionDraft {
        TransactionDraft {
            date: Some(fixed_date()),
            payee: Some("Costco".to_string()),
            narration: String::new(),
            postings: vec![
                Posting::new("Assets:Bank", "-10 USD"),
                Posting::new("Expenses:Food", ""),
            ],
            metas: vec![],
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        stored: Mutex<Vec<EntryPayload>>,
    }

    #[async_trait]
    impl MutationSink for RecordingSink {
        async fn store(&self, payload: EntryPayload) -> CoreResult<()> {
            self.stored.lock().unwrap().push(payload);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl MutationSink for FailingSink {
        async fn store(&self, _payload: EntryPayload) -> CoreResult<()> {
            Err(CoreError::StoreError {
                message: "ledger offline".to_string(),
            })
        }
    }

    #[test]
    fn test_text_entry_wraps_preview_and_stamps_date() {
        let entry = text_entry(&valid_draft());
        assert!(entry.content.starts_with("\n2023-01-05 \"Costco\"\n"));
        assert!(entry.content.ends_with('\n'));
        assert_eq!(entry.created_at, 1672876800);
    }

    #[test]
    fn test_text_entry_unset_date_stamps_epoch() {
        let mut draft = valid_draft();
        draft.date = None;
        assert_eq!(text_entry(&draft).created_at, 0);
    }

    #[test]
    fn test_structured_entry_maps_postings() {
        let entry = structured_entry(&valid_draft()).unwrap();
        assert_eq!(entry.datetime, "2023-01-05T00:00:00");
        assert_eq!(entry.payee, "Costco");
        assert!(entry.tags.is_empty());
        assert!(entry.links.is_empty());
        assert_eq!(entry.postings.len(), 2);
        assert_eq!(
            entry.postings[0].unit,
            Some(Unit {
                number: Decimal::from(-10),
                commodity: Some("USD".to_string()),
            })
        );
        assert_eq!(entry.postings[1].unit, None);
    }

    #[test]
    fn test_structured_entry_rejects_bad_amount() {
        let mut draft = valid_draft();
        draft.postings[0].amount = "ten USD".to_string();
        assert!(matches!(
            structured_entry(&draft),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_render_structured_entry_text() {
        let entry = structured_entry(&valid_draft()).unwrap();
        let text = render_structured(&entry);
        assert_eq!(
            text,
            "\n2023-01-05 \"Costco\"\n  Assets:Bank -10 USD\n  Expenses:Food\n"
        );
    }

    #[tokio::test]
    async fn test_submit_stores_text_payload() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = FormSession::new(
            Box::new(ExistingEntrySource::new(valid_draft())),
            Box::new(ResetOnSubmit::default()),
            sink.clone(),
        );

        session.submit().await.unwrap();

        let stored = sink.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        match &stored[0] {
            EntryPayload::Text(entry) => {
                assert!(entry.content.contains("Assets:Bank -10 USD"))
            }
            other => panic!("expected text payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_resets_to_fresh_draft() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = FormSession::new(
            Box::new(NewEntrySource),
            Box::new(ResetOnSubmit::default()),
            sink,
        );
        session.set_payee("Costco");
        session.set_narration("weekly");
        session
            .update_posting(0, PostingField::Account, "Assets:Bank")
            .unwrap();
        session
            .update_posting(0, PostingField::Amount, "-10 USD")
            .unwrap();
        session
            .update_posting(1, PostingField::Account, "Expenses:Food")
            .unwrap();
        session.add_meta();

        session.submit().await.unwrap();

        let draft = session.draft();
        assert_eq!(draft.payee, None);
        assert_eq!(draft.narration, "");
        assert_eq!(draft.postings, vec![Posting::empty(), Posting::empty()]);
        assert!(draft.metas.is_empty());
        let age = chrono::Local::now().naive_local() - draft.date.unwrap();
        assert!(age.num_seconds().abs() < 5);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_draft() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = FormSession::new(
            Box::new(NewEntrySource),
            Box::new(ResetOnSubmit::default()),
            sink.clone(),
        );

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(sink.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_reset() {
        let mut session = FormSession::new(
            Box::new(ExistingEntrySource::new(valid_draft())),
            Box::new(ResetOnSubmit::default()),
            Arc::new(FailingSink),
        );

        session.submit().await.unwrap();
        // Reset ran regardless of the sink failing.
        assert_eq!(session.draft().payee, None);
    }

    #[tokio::test]
    async fn test_notify_parent_fires_on_every_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_valid = Arc::new(AtomicBool::new(false));
        let calls_in = calls.clone();
        let valid_in = last_valid.clone();

        let sink = Arc::new(RecordingSink::default());
        let mut session = FormSession::new(
            Box::new(ExistingEntrySource::new(valid_draft())),
            Box::new(NotifyParent::new(Box::new(move |_draft, is_valid| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                valid_in.store(is_valid, Ordering::SeqCst);
            }))),
            sink,
        );

        session.set_narration("weekly");
        session.add_posting();
        session
            .update_posting(2, PostingField::Account, "Expenses:Misc")
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Third posting has a blank amount, so two blanks total now.
        assert!(!last_valid.load(Ordering::SeqCst));

        session
            .update_posting(2, PostingField::Amount, "1 USD")
            .unwrap();
        assert!(last_valid.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_notify_parent_keeps_state_after_submit() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = FormSession::new(
            Box::new(ExistingEntrySource::new(valid_draft())),
            Box::new(NotifyParent::new(Box::new(|_, _| {}))),
            sink.clone(),
        );

        session.submit().await.unwrap();
        assert_eq!(session.draft().payee.as_deref(), Some("Costco"));
        match &sink.stored.lock().unwrap()[0] {
            EntryPayload::Structured(entry) => assert_eq!(entry.payee, "Costco"),
            other => panic!("expected structured payload, got {:?}", other),
        };
    }

    #[tokio::test]
    async fn test_ledger_append_sink_appends() {
        let dir = std::env::temp_dir().join("beanform-sink-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("append.bean");
        let _ = tokio::fs::remove_file(&path).await;

        let sink = LedgerAppendSink::new(path.clone());
        sink.store(EntryPayload::Text(text_entry(&valid_draft())))
            .await
            .unwrap();
        sink.store(EntryPayload::Structured(
            structured_entry(&valid_draft()).unwrap(),
        ))
        .await
        .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.matches("2023-01-05 \"Costco\"").count(), 2);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
