//! Settings Page
//!
//! Haircut price and owner share percentage used by the API to compute
//! every record's income.

use crate::api::{ApiClient, ApiError};
use crate::models::{IncomeSettings, StoredSettings};
use crate::state::{Flash, LoadSeq, LoadTicket};

pub const LOAD_FAILED: &str = "Failed to load settings. Please try again.";
pub const SAVED: &str = "Settings updated successfully!";
pub const SAVE_FAILED: &str = "Failed to update settings. Please try again.";

#[derive(Debug, Default)]
pub struct SettingsPage {
    /// Text inputs; empty when the server has no value yet
    pub haircut_price: String,
    pub owner_share_percentage: String,
    /// Outcome of the last save
    flash: Option<Flash>,
    load_error: Option<String>,
    loading: bool,
    is_submitting: bool,
    seq: LoadSeq,
}

impl SettingsPage {
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
        result: Result<StoredSettings, ApiError>,
    ) -> bool {
        if !self.seq.is_current(ticket) {
            return false;
        }

        self.loading = false;
        match result {
            Ok(settings) => {
                self.haircut_price = input_text(settings.haircut_price);
                self.owner_share_percentage = input_text(settings.owner_share_percentage);
            }
            Err(e) => {
                tracing::error!("Error fetching income settings: {}", e);
                self.load_error = Some(e.user_message(LOAD_FAILED));
            }
        }
        true
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let ticket = self.begin_load();
        let result = client.get_settings().await;
        self.finish_load(ticket, result);
    }

    /// Parse the inputs into settings the API will accept
    pub fn parsed(&self) -> Result<IncomeSettings, String> {
        let number = |text: &str, name: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|_| format!("{} must be a number", name))
        };

        let settings = IncomeSettings {
            haircut_price: number(&self.haircut_price, "Haircut price")?,
            owner_share_percentage: number(&self.owner_share_percentage, "Owner share percentage")?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub async fn submit(&mut self, client: &ApiClient) {
        if self.is_submitting {
            return;
        }

        self.flash = None;
        let settings = match self.parsed() {
            Ok(settings) => settings,
            Err(message) => {
                self.flash = Some(Flash::error(message));
                return;
            }
        };

        self.is_submitting = true;
        let result = client.save_settings(&settings).await;
        self.is_submitting = false;

        self.flash = Some(match result {
            Ok(()) => {
                tracing::info!(
                    haircut_price = settings.haircut_price,
                    owner_share_percentage = settings.owner_share_percentage,
                    "Income settings updated"
                );
                Flash::success(SAVED)
            }
            Err(e) => {
                tracing::error!("Error updating income settings: {}", e);
                Flash::error(e.user_message(SAVE_FAILED))
            }
        });
    }

    /// Hide the current message and load error
    pub fn dismiss(&mut self) {
        self.flash = None;
        self.load_error = None;
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }
}

fn input_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
