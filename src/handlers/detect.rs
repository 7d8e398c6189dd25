//! Detection handlers

use std::collections::HashMap;

use axum::{
    extract::State,
    response::Html,
    Form,
};

use crate::AppState;
use crate::classifier::InferenceError;
use crate::models::{DetectionOutcome, DetectionRecord};
use crate::views::{self, DetectView};

/// Empty detection form
pub async fn form() -> Html<String> {
    Html(views::detect_page(&DetectView::default()))
}

/// Classify one submitted record. Every failure ends up as text on the page.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let outcome = match DetectionRecord::from_form(&form) {
        Ok(record) => {
            let classifier = state.classifier.clone();
            let prediction = tokio::task::spawn_blocking(move || classifier.predict(&record))
                .await
                .unwrap_or_else(|e| Err(InferenceError(format!("Prediction task failed: {}", e))));

            match prediction {
                Ok(label) => {
                    tracing::info!("Detection result: {:?}", label);
                    DetectionOutcome::Label(label)
                }
                Err(e) => {
                    tracing::error!("Prediction failed: {}", e);
                    DetectionOutcome::Error(format!("Detection failed: {}", e))
                }
            }
        }
        Err(e) => {
            tracing::debug!("Rejected detection form: {}", e);
            DetectionOutcome::Error(format!("Detection failed: {}", e))
        }
    };

    Html(views::detect_page(&DetectView {
        form,
        outcome: Some(outcome),
    }))
}
