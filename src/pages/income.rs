//! Income Entry Page
//!
//! Record list plus a create/edit form. Every successful mutation is
//! followed by a fresh fetch of the list; the income figures shown always
//! come from the server.

use crate::api::{ApiClient, ApiError};
use crate::models::{DateRange, IncomeDraft, IncomeRecord};
use crate::state::{Flash, LoadSeq, LoadTicket};

pub const CREATED: &str = "Income record created successfully!";
pub const UPDATED: &str = "Income record updated successfully!";
pub const DELETED: &str = "Income record deleted successfully!";
pub const SAVE_FAILED: &str = "Failed to save income record. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete income record. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load income records.";
pub const RELOAD_FAILED: &str = "But the records could not be reloaded:";

/// Form fields as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeForm {
    pub source: String,
    pub number_of_heads: String,
    pub is_owner: bool,
}

impl IncomeForm {
    pub fn new(source: impl Into<String>, number_of_heads: impl Into<String>, is_owner: bool) -> Self {
        Self {
            source: source.into(),
            number_of_heads: number_of_heads.into(),
            is_owner,
        }
    }

    pub fn from_record(record: &IncomeRecord) -> Self {
        Self {
            source: record.source.clone(),
            number_of_heads: record.number_of_heads.to_string(),
            is_owner: record.owner_flag(),
        }
    }

    /// Validate into a request body
    pub fn draft(&self) -> Result<IncomeDraft, String> {
        let heads = self.number_of_heads.trim();
        let number_of_heads: u32 = heads
            .parse()
            .map_err(|_| "Number of heads must be a whole number, zero or more".to_string())?;

        IncomeDraft::new(&self.source, number_of_heads, self.is_owner).validated()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Default)]
pub struct IncomePage {
    records: Vec<IncomeRecord>,
    pub form: IncomeForm,
    editing: Option<String>,
    /// Outcome of the last save or delete
    flash: Option<Flash>,
    load_error: Option<String>,
    is_submitting: bool,
    loading: bool,
    seq: LoadSeq,
}

impl IncomePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.load_error = None;
        self.seq.issue()
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<IncomeRecord>, ApiError>,
    ) -> bool {
        if !self.seq.is_current(ticket) {
            tracing::debug!("Dropping stale income list response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(records) => self.records = records,
            Err(e) => {
                tracing::error!("Error fetching income records: {}", e);
                self.load_error = Some(e.user_message(LOAD_FAILED));
            }
        }
        true
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let ticket = self.begin_load();
        let result = client.list_income(&DateRange::unbounded()).await;
        self.finish_load(ticket, result);
    }

    /// Create, or update the record being edited.
    ///
    /// On success the form and edit state are cleared and the list is
    /// fetched again. On failure the form keeps what was typed.
    pub async fn submit(&mut self, client: &ApiClient) {
        if self.is_submitting {
            tracing::debug!("Save already in flight, ignoring submit");
            return;
        }

        self.flash = None;
        let draft = match self.form.draft() {
            Ok(draft) => draft,
            Err(message) => {
                self.flash = Some(Flash::error(message));
                return;
            }
        };

        self.is_submitting = true;
        let result = match &self.editing {
            Some(id) => client.update_income(id, &draft).await.map(|_| UPDATED),
            None => client.create_income(&draft).await.map(|_| CREATED),
        };
        self.is_submitting = false;

        match result {
            Ok(message) => {
                tracing::info!(source = %draft.source, heads = draft.number_of_heads, "{}", message);
                self.form = IncomeForm::default();
                self.editing = None;
                self.reload_after(client, message).await;
            }
            Err(e) => {
                tracing::error!("Error saving income record: {}", e);
                self.flash = Some(Flash::error(e.user_message(SAVE_FAILED)));
            }
        }
    }

    /// Fill the form from an existing record. Returns `false` if no loaded
    /// record has that id.
    pub fn edit(&mut self, id: &str) -> bool {
        match self.records.iter().find(|r| r.id == id) {
            Some(record) => {
                self.form = IncomeForm::from_record(record);
                self.editing = Some(record.id.clone());
                self.flash = None;
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.form = IncomeForm::default();
        self.editing = None;
    }

    pub async fn delete(&mut self, client: &ApiClient, id: &str) {
        if self.is_submitting {
            tracing::debug!("Mutation already in flight, ignoring delete");
            return;
        }

        self.flash = None;
        self.is_submitting = true;
        let result = client.delete_income(id).await;
        self.is_submitting = false;

        match result {
            Ok(()) => {
                tracing::info!("Deleted income record {}", id);
                if self.editing.as_deref() == Some(id) {
                    self.cancel_edit();
                }
                self.reload_after(client, DELETED).await;
            }
            Err(e) => {
                tracing::error!("Error deleting income record {}: {}", id, e);
                self.flash = Some(Flash::error(e.user_message(DELETE_FAILED)));
            }
        }
    }

    /// Report `done`, then fetch the list again. If that fetch fails the
    /// report becomes an error, as the list on screen is out of date.
    async fn reload_after(&mut self, client: &ApiClient, done: &str) {
        self.flash = Some(Flash::success(done));
        self.load(client).await;
        if let Some(reason) = self.load_error.take() {
            self.flash = Some(Flash::error(format!("{} {} {}", done, RELOAD_FAILED, reason)));
        }
    }

    /// Hide the current message and load error
    pub fn dismiss(&mut self) {
        self.flash = None;
        self.load_error = None;
    }

    pub fn records(&self) -> &[IncomeRecord] {
        &self.records
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::test_support::{client_for, record_json, StubApi};
    use serde_json::json;
    use std::sync::Arc;

    async fn setup(stub: &StubApi) -> ApiClient {
        let base = stub.serve().await;
        let session = Arc::new(SessionStore::in_memory());
        session.set_token("tok", false).unwrap();
        client_for(&base, session)
    }

    #[tokio::test]
    async fn test_create_then_refetch() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/income", 201, json!(record_json("n1", "Mike", 5, 750.0, "2024-03-04")));
        stub.respond(
            "GET",
            "/api/income",
            200,
            json!({"incomes": [record_json("n1", "Mike", 5, 750.0, "2024-03-04")]}),
        );
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.form = IncomeForm::new("Mike", "5", false);
        page.submit(&client).await;

        let posts = stub.requests_to("POST", "/api/income");
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].body,
            Some(json!({"source": "Mike", "numberOfHeads": 5, "isOwner": false}))
        );
        assert_eq!(posts[0].authorization.as_deref(), Some("Bearer tok"));

        let requests = stub.requests();
        assert_eq!(requests.last().map(|r| r.method.as_str()), Some("GET"));
        assert_eq!(requests.last().map(|r| r.path.as_str()), Some("/api/income"));

        assert!(page.form.is_empty());
        assert_eq!(page.flash(), Some(&Flash::success(CREATED)));
        assert_eq!(page.records().len(), 1);
        assert!(!page.is_submitting());
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_form() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/income", 400, json!({"message": "Invalid"}));
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.form = IncomeForm::new("Mike", "5", false);
        page.submit(&client).await;

        assert_eq!(page.flash(), Some(&Flash::error("Invalid")));
        assert_eq!(page.form, IncomeForm::new("Mike", "5", false));
        assert!(stub.requests_to("GET", "/api/income").is_empty());
    }

    #[tokio::test]
    async fn test_save_without_server_message_uses_fallback() {
        let stub = StubApi::new();
        stub.respond_empty("POST", "/api/income", 500);
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.form = IncomeForm::new("Mike", "2", true);
        page.submit(&client).await;

        assert_eq!(page.flash(), Some(&Flash::error(SAVE_FAILED)));
    }

    #[tokio::test]
    async fn test_edit_updates_by_id() {
        let stub = StubApi::new();
        stub.respond(
            "GET",
            "/api/income",
            200,
            json!({"incomes": [record_json("r 1", "Ana", 3, 300.0, "2024-03-04")]}),
        );
        stub.respond("PUT", "/api/income/r%201", 200, json!({}));
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.load(&client).await;
        assert!(page.edit("r 1"));
        assert_eq!(page.form, IncomeForm::new("Ana", "3", false));

        page.form.number_of_heads = "4".to_string();
        page.submit(&client).await;

        let puts = stub.requests_to("PUT", "/api/income/r%201");
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].body.as_ref().unwrap()["numberOfHeads"], 4);
        assert_eq!(page.flash(), Some(&Flash::success(UPDATED)));
        assert_eq!(page.editing(), None);
        assert!(page.form.is_empty());
    }

    #[tokio::test]
    async fn test_delete_success_and_failure() {
        let stub = StubApi::new();
        stub.respond("DELETE", "/api/income/a", 200, json!({"message": "Deleted"}));
        stub.respond("DELETE", "/api/income/b", 404, json!({"message": "Income record not found"}));
        stub.respond("DELETE", "/api/income/c", 500, json!({}));
        stub.respond("GET", "/api/income", 200, json!({"incomes": []}));
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.delete(&client, "a").await;
        assert_eq!(page.flash(), Some(&Flash::success(DELETED)));
        assert_eq!(stub.requests_to("GET", "/api/income").len(), 1);

        page.delete(&client, "b").await;
        assert_eq!(page.flash(), Some(&Flash::error("Income record not found")));

        page.delete(&client, "c").await;
        assert_eq!(page.flash(), Some(&Flash::error(DELETE_FAILED)));
        assert_eq!(stub.requests_to("GET", "/api/income").len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_and_in_flight_guard_send_nothing() {
        let stub = StubApi::new();
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.form = IncomeForm::new("Mike", "-1", false);
        page.submit(&client).await;
        assert!(page.flash().unwrap().is_error());

        page.form = IncomeForm::new("", "2", false);
        page.submit(&client).await;
        assert!(page.flash().unwrap().is_error());

        page.form = IncomeForm::new("Mike", "2", false);
        page.is_submitting = true;
        page.submit(&client).await;
        page.delete(&client, "x").await;

        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refetch_after_save_is_reported() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/income", 201, json!({}));
        stub.respond("GET", "/api/income", 500, json!({}));
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.form = IncomeForm::new("Mike", "5", false);
        page.submit(&client).await;

        let flash = page.flash().unwrap();
        assert!(flash.is_error());
        assert_eq!(
            flash.message,
            format!("{} {} {}", CREATED, RELOAD_FAILED, LOAD_FAILED)
        );
        // The record was saved, so the form is not restored
        assert!(page.form.is_empty());
        assert!(page.load_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_refetch_after_delete_uses_server_message() {
        let stub = StubApi::new();
        stub.respond("DELETE", "/api/income/a", 200, json!({}));
        stub.respond("GET", "/api/income", 503, json!({"message": "Database offline"}));
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.delete(&client, "a").await;

        assert_eq!(
            page.flash(),
            Some(&Flash::error(format!("{} {} Database offline", DELETED, RELOAD_FAILED)))
        );
    }

    #[tokio::test]
    async fn test_successful_reload_clears_load_error() {
        let stub = StubApi::new();
        stub.respond("GET", "/api/income", 500, json!({}));
        stub.respond(
            "GET",
            "/api/income",
            200,
            json!({"incomes": [record_json("a", "Ana", 1, 100.0, "2024-03-04")]}),
        );
        let client = setup(&stub).await;

        let mut page = IncomePage::new();
        page.load(&client).await;
        assert_eq!(page.load_error(), Some(LOAD_FAILED));
        assert!(page.flash().is_none());

        page.load(&client).await;
        assert!(page.load_error().is_none());
        assert_eq!(page.records().len(), 1);
    }

    #[test]
    fn test_load_keeps_mutation_message_and_dismiss_clears() {
        let mut page = IncomePage::new();
        page.flash = Some(Flash::error("Invalid"));

        let ticket = page.begin_load();
        page.finish_load(ticket, Err(ApiError::Decode("bad".to_string())));
        assert_eq!(page.flash(), Some(&Flash::error("Invalid")));
        assert_eq!(page.load_error(), Some(LOAD_FAILED));

        page.dismiss();
        assert!(page.flash().is_none());
        assert!(page.load_error().is_none());
    }

    #[test]
    fn test_edit_reads_owner_flag() {
        let mut page = IncomePage::new();
        let ticket = page.begin_load();
        let owner: IncomeRecord = serde_json::from_value(json!({
            "_id": "o", "source": "Boss", "numberOfHeads": 2, "income": 400.0,
            "ownerShare": 0, "createdAt": "2024-01-01"
        }))
        .unwrap();
        page.finish_load(ticket, Ok(vec![owner]));

        assert!(page.edit("o"));
        assert!(page.form.is_owner);
        assert!(!page.edit("missing"));

        page.cancel_edit();
        assert!(page.form.is_empty());
        assert_eq!(page.editing(), None);
    }
}
