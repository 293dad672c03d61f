use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_MILLIS: u64 = 10_000;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackendConfiguration {
    /// `formResponse` action URL of the vote form.
    pub form_action_url: String,
    /// Web app URL serving reads and config mutations.
    pub script_url: String,
    pub form_fields: FormFields,
    #[serde(default = "default_request_timeout_millis")]
    pub request_timeout_millis: u64,
}

/// Entry keys of the three form fields a vote fills in.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FormFields {
    pub candidate_id: String,
    pub category: String,
    pub score: String,
}

impl BackendConfiguration {
    pub fn new<F: Into<String>, S: Into<String>>(
        form_action_url: F,
        script_url: S,
        form_fields: FormFields,
    ) -> Self {
        Self {
            form_action_url: form_action_url.into(),
            script_url: script_url.into(),
            form_fields,
            request_timeout_millis: REQUEST_TIMEOUT_MILLIS,
        }
    }
}

fn default_request_timeout_millis() -> u64 {
    REQUEST_TIMEOUT_MILLIS
}
