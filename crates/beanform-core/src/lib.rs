//! Core draft, preview and validation logic for ledger entry forms
//!
//! One form core serves both the standalone create dialog and the
//! embedded edit panel: the draft model and its row-list editors live
//! in [`draft`], rendering in [`preview`], the submit gate in
//! [`validate`], and the variant-specific behavior behind the
//! [`submit`] seams (draft source, completion strategy, mutation sink).

pub mod amount;
pub mod draft;
pub mod error;
pub mod preview;
pub mod reference;
pub mod submit;
pub mod validate;

pub use amount::{parse_unit, AmountError, Unit};
pub use draft::{DraftForm, MetaEntry, MetaField, Posting, PostingField, TransactionDraft};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use preview::{preview, preview_with_style};
pub use reference::{
    FileReferenceProvider, ProviderRef, ReferenceCell, ReferenceData, ReferenceProvider,
    ReferenceState,
};
pub use submit::{
    structured_entry, text_entry, ChangeCallback, CompletionStrategy, DraftSource, EntryPayload,
    ExistingEntrySource, FormSession, LedgerAppendSink, MutationSink, NewEntrySource, NotifyParent,
    PostingPayload, ResetOnSubmit, SinkRef, StructuredEntry, TextEntry,
};
pub use validate::{is_valid, issues, IssueCode, ValidationIssue};
