//! Ledger-entry text rendering for drafts
//!
//! The output contract is the plain-text ledger entry syntax:
//!
//! ```text
//! <date> "<payee>"[ "<narration>"]
//!   <account> <amount>
//!   "<meta-key>": "<meta-value>"
//! ```
//!
//! Rendering is a pure function of the draft and never fails: an unset
//! date falls back to the Unix epoch and an unset account renders as
//! the empty string.

use chrono::NaiveDateTime;

use crate::draft::TransactionDraft;
use beanform_config::DateStyle;
use beanform_utils::{is_blank, quote};

/// Render a draft with the default date-only header
pub fn preview(draft: &TransactionDraft) -> String {
    preview_with_style(draft, DateStyle::Date)
}

/// Render a draft with an explicit date style
pub fn preview_with_style(draft: &TransactionDraft, style: DateStyle) -> String {
    let date = draft.date.unwrap_or(NaiveDateTime::UNIX_EPOCH);
    let date_str = match style {
        DateStyle::Date => date.format("%Y-%m-%d").to_string(),
        DateStyle::DateTime => date.format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    let payee = quote(draft.payee.as_deref().unwrap_or(""));

    let narration = if is_blank(&draft.narration) {
        String::new()
    } else {
        format!(" {}", quote(&draft.narration))
    };

    let postings = draft
        .postings
        .iter()
        .map(|p| format!("  {} {}", p.account.as_deref().unwrap_or(""), p.amount))
        .collect::<Vec<_>>()
        .join("\n");

    // Rows with a blank key or value stay editable but never render.
    let metas = draft
        .metas
        .iter()
        .filter(|m| !is_blank(&m.key) && !is_blank(&m.value))
        .map(|m| format!("  {}: {}", quote(&m.key), quote(&m.value)))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{} {}{}\n{}\n{}", date_str, payee, narration, postings, metas)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{MetaEntry, Posting};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn costco_draft() -> TransactionDraft {
        TransactionDraft {
            date: Some(date(2023, 1, 5)),
            payee: Some("Costco".to_string()),
            narration: String::new(),
            postings: vec![
                Posting::new("Assets:Bank", "-10 USD"),
                Posting::new("Expenses:Food", ""),
            ],
            metas: vec![],
        }
    }

    #[test]
    fn test_preview_reference_entry() {
        assert_eq!(
            preview(&costco_draft()),
            "2023-01-05 \"Costco\"\n  Assets:Bank -10 USD\n  Expenses:Food \n"
        );
    }

    #[test]
    fn test_preview_is_idempotent() {
        let draft = costco_draft();
        assert_eq!(preview(&draft), preview(&draft));
    }

    #[test]
    fn test_preview_narration_appended_after_payee() {
        let mut draft = costco_draft();
        draft.narration = "weekly shopping".to_string();
        assert!(preview(&draft)
            .starts_with("2023-01-05 \"Costco\" \"weekly shopping\"\n"));
    }

    #[test]
    fn test_preview_blank_narration_leaves_no_trailing_space() {
        let mut draft = costco_draft();
        draft.narration = "   ".to_string();
        assert!(preview(&draft).starts_with("2023-01-05 \"Costco\"\n"));
    }

    #[test]
    fn test_preview_unset_payee_is_empty_literal() {
        let mut draft = costco_draft();
        draft.payee = None;
        assert!(preview(&draft).starts_with("2023-01-05 \"\"\n"));
    }

    #[test]
    fn test_preview_unset_account_renders_empty() {
        // Pinned behavior: never the literal text "null".
        let mut draft = costco_draft();
        draft.postings[0].account = None;
        let text = preview(&draft);
        assert!(text.contains("\n   -10 USD\n"));
        assert!(!text.contains("null"));
    }

    #[test]
    fn test_preview_unset_date_falls_back_to_epoch() {
        let mut draft = costco_draft();
        draft.date = None;
        assert!(preview(&draft).starts_with("1970-01-01 "));
    }

    #[test]
    fn test_preview_no_postings_keeps_joining_newline() {
        let mut draft = costco_draft();
        draft.postings.clear();
        assert_eq!(preview(&draft), "2023-01-05 \"Costco\"\n\n");
    }

    #[test]
    fn test_preview_meta_lines_quoted() {
        let mut draft = costco_draft();
        draft.metas = vec![MetaEntry::new("category", "food")];
        assert_eq!(
            preview(&draft),
            "2023-01-05 \"Costco\"\n  Assets:Bank -10 USD\n  Expenses:Food \n  \"category\": \"food\""
        );
    }

    #[test]
    fn test_preview_blank_meta_rows_skipped() {
        let mut draft = costco_draft();
        draft.metas = vec![
            MetaEntry::new("", "orphan value"),
            MetaEntry::new("category", "food"),
            MetaEntry::new("note", "   "),
        ];
        let text = preview(&draft);
        assert!(text.contains("\"category\": \"food\""));
        assert!(!text.contains("orphan"));
        assert!(!text.contains("note"));
    }

    #[test]
    fn test_preview_escapes_quotes_in_text_fields() {
        let mut draft = costco_draft();
        draft.payee = Some("Bob's \"Shop\"".to_string());
        assert!(preview(&draft).starts_with("2023-01-05 \"Bob's \\\"Shop\\\"\"\n"));
    }

    #[test]
    fn test_preview_datetime_style() {
        let mut draft = costco_draft();
        draft.date = Some(
            NaiveDate::from_ymd_opt(2023, 1, 5)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        );
        let text = preview_with_style(&draft, DateStyle::DateTime);
        assert!(text.starts_with("2023-01-05 09:30:00 \"Costco\"\n"));
        // The default path stays date-only.
        assert!(preview(&draft).starts_with("2023-01-05 \"Costco\"\n"));
    }
}
