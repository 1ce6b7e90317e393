//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element, either via
//! `hx-target-error` on the triggering form or as part of a normal swap.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 mb-4 rounded-lg border \
    text-green-800 border-green-300 bg-green-50 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ALERT_ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-4 rounded-lg border \
    text-red-800 border-red-300 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

/// A message shown to the user after an action succeeds or fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action completed successfully.
    Success {
        /// Short headline, e.g. "Transaction Added".
        message: String,
        /// Supporting detail text.
        details: String,
    },
    /// The action failed.
    Error {
        /// Short headline, e.g. "Could not delete transaction".
        message: String,
        /// Supporting detail text.
        details: String,
    },
    /// The action failed and there is nothing useful to add.
    ErrorSimple {
        /// Short headline.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (ALERT_SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, details),
            Alert::ErrorSimple { message } => (ALERT_ERROR_STYLE, message, String::new()),
        };

        html! {
            div class=(style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    class="font-bold cursor-pointer"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "✕"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
