//! Form page - Full page rendering
//!
//! Renders the entry form from the current draft: scalar fields,
//! posting and metadata rows, and the preview pane. Row add buttons
//! clone a template client-side; removal stays disabled at the
//! configured minimum posting count.

use crate::{base_html, AppState};
use beanform_core::ReferenceState;
use beanform_utils::escape_html;

fn posting_row(index: usize, account: &str, amount: &str, removable: bool) -> String {
    let disabled = if removable { "" } else { " disabled" };
    format!(
        r#"<div class='flex items-center gap-2 mb-2'>
            <input type='text' name='posting_{}_account' value='{}' list='known-accounts' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Account'>
            <input type='text' name='posting_{}_amount' value='{}' class='w-40 px-3 py-2.5 border rounded-lg' placeholder='Amount'>
            <button type='button' onclick='removeRow(this)' class='px-2 py-1 text-sm text-gray-400 hover:text-red-600 disabled:opacity-30'{}>&times;</button>
        </div>"#,
        index,
        escape_html(account),
        index,
        escape_html(amount),
        disabled
    )
}

fn meta_row(index: usize, key: &str, value: &str) -> String {
    format!(
        r#"<div class='flex items-center gap-2 mb-2'>
            <input type='text' name='meta_{}_key' value='{}' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Key'>
            <input type='text' name='meta_{}_value' value='{}' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Value'>
            <button type='button' onclick='removeRow(this)' class='px-2 py-1 text-sm text-gray-400 hover:text-red-600'>&times;</button>
        </div>"#,
        index,
        escape_html(key),
        index,
        escape_html(value)
    )
}

/// Entry form page
pub async fn page_form(state: axum::extract::State<AppState>) -> axum::response::Html<String> {
    let session = state.session.read().await;
    let draft = session.draft();
    let min_postings = state.config.form.min_postings;

    let date_value = draft
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let payee_value = draft.payee.clone().unwrap_or_default();

    let removable = draft.postings.len() > min_postings;
    let posting_rows = draft
        .postings
        .iter()
        .enumerate()
        .map(|(i, p)| posting_row(i, p.account.as_deref().unwrap_or(""), &p.amount, removable))
        .collect::<Vec<_>>()
        .join("\n");

    let meta_rows = draft
        .metas
        .iter()
        .enumerate()
        .map(|(i, m)| meta_row(i, &m.key, &m.value))
        .collect::<Vec<_>>()
        .join("\n");

    // Known accounts feed a datalist; loading and failure states show
    // an indicator instead.
    let (reference_banner, account_options) = match state.reference.state() {
        ReferenceState::Loading => (
            "<p class='text-sm text-gray-400 mb-4'>Loading reference data…</p>".to_string(),
            String::new(),
        ),
        ReferenceState::Failed { message } => (
            format!(
                "<p class='text-sm text-red-600 mb-4'>Reference data unavailable: {}</p>",
                escape_html(&message)
            ),
            String::new(),
        ),
        ReferenceState::Ready { data } => (
            String::new(),
            data.accounts
                .iter()
                .map(|a| format!("<option value='{}'></option>", escape_html(a)))
                .collect::<Vec<_>>()
                .join(""),
        ),
    };

    let content = format!(
        r#"<div class='max-w-3xl mx-auto py-8 px-4'>
    <h1 class='text-2xl font-bold mb-6'>New Transaction</h1>
    {}
    <datalist id='known-accounts'>{}</datalist>
    <form hx-post='/form' hx-target='#store-result' hx-swap='innerHTML' class='space-y-6 bg-white border rounded-lg p-6'>
        <div class='grid grid-cols-3 gap-4'>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Date</label>
                <input type='date' name='date' value='{}' class='w-full px-3 py-2.5 border rounded-lg'>
            </div>
            <div class='col-span-2'>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Payee</label>
                <input type='text' name='payee' value='{}' class='w-full px-3 py-2.5 border rounded-lg' placeholder='Payee'>
            </div>
        </div>
        <div>
            <label class='block text-sm font-medium text-gray-700 mb-1'>Narration</label>
            <input type='text' name='narration' value='{}' class='w-full px-3 py-2.5 border rounded-lg' placeholder='Description'>
        </div>
        <div>
            <label class='block text-sm font-medium text-gray-700 mb-2'>Postings</label>
            <div class='border rounded-lg p-3 bg-gray-50' id='postings-container'>
{}
            </div>
            <button type='button' onclick='addPosting()' class='mt-2 px-4 py-2 text-sm text-indigo-600 hover:bg-indigo-50 rounded-lg border border-indigo-200'>+ Add posting</button>
        </div>
        <div>
            <label class='block text-sm font-medium text-gray-700 mb-2'>Metadata</label>
            <div class='border rounded-lg p-3 bg-gray-50' id='metas-container'>
{}
            </div>
            <button type='button' onclick='addMeta()' class='mt-2 px-4 py-2 text-sm text-indigo-600 hover:bg-indigo-50 rounded-lg border border-indigo-200'>+ Add metadata</button>
        </div>
        <div class='flex items-center gap-4 border-t pt-4'>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save</button>
        </div>
    </form>
    <div id='store-result' class='mt-4'></div>
    <div id='preview-pane' class='mt-6' hx-get='/form/preview' hx-trigger='load'></div>
    <script>
        var MIN_POSTINGS = {};
        function rowCount(container) {{
            return document.querySelectorAll('#' + container + ' > div').length;
        }}
        function addPosting() {{
            var i = rowCount('postings-container');
            var div = document.createElement('div');
            div.className = 'flex items-center gap-2 mb-2';
            div.innerHTML = "<input type='text' name='posting_" + i + "_account' list='known-accounts' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Account'>" +
                "<input type='text' name='posting_" + i + "_amount' class='w-40 px-3 py-2.5 border rounded-lg' placeholder='Amount'>" +
                "<button type='button' onclick='removeRow(this)' class='px-2 py-1 text-sm text-gray-400 hover:text-red-600'>&times;</button>";
            document.getElementById('postings-container').appendChild(div);
            syncRemoveButtons();
        }}
        function addMeta() {{
            var i = rowCount('metas-container');
            var div = document.createElement('div');
            div.className = 'flex items-center gap-2 mb-2';
            div.innerHTML = "<input type='text' name='meta_" + i + "_key' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Key'>" +
                "<input type='text' name='meta_" + i + "_value' class='flex-1 px-3 py-2.5 border rounded-lg' placeholder='Value'>" +
                "<button type='button' onclick='removeRow(this)' class='px-2 py-1 text-sm text-gray-400 hover:text-red-600'>&times;</button>";
            document.getElementById('metas-container').appendChild(div);
        }}
        function removeRow(btn) {{
            btn.parentElement.remove();
            syncRemoveButtons();
        }}
        function syncRemoveButtons() {{
            var rows = document.querySelectorAll('#postings-container > div');
            rows.forEach(function(row) {{
                row.querySelector('button').disabled = rows.length <= MIN_POSTINGS;
            }});
        }}
    </script>
</div>"#,
        reference_banner,
        account_options,
        escape_html(&date_value),
        escape_html(&payee_value),
        escape_html(&draft.narration),
        posting_rows,
        meta_rows,
        min_postings
    );

    axum::response::Html(base_html("New Transaction", &content))
}
