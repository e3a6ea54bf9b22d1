use shared::PredictionResponse;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlTextAreaElement, SubmitEvent};
use yew::prelude::*;

use crate::api::{ApiClient, ApiError};
use crate::components::utils::render_alert;

const EMPTY_INPUT_ERROR: &str = "Please enter email content";

pub enum Msg {
    EmailInput(String),
    Submit,
    Resolved(u64, Result<PredictionResponse, ApiError>),
    Clear,
}

/// Single-email prediction form: paste text, submit, read the verdict.
pub struct DirectPredict {
    api: ApiClient,
    email_body: String,
    prediction: Option<PredictionResponse>,
    error: Option<String>,
    loading: bool,
    /// Bumped on every submit and clear; a resolution carrying an older
    /// value was superseded and must not touch state.
    generation: u64,
}

impl Component for DirectPredict {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self::with_client(ApiClient::from_env())
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::EmailInput(value) => {
                self.email_body = value;
                true
            }
            Msg::Submit => {
                if let Some(generation) = self.begin_submit() {
                    self.request_prediction(ctx, generation);
                }
                true
            }
            Msg::Resolved(generation, outcome) => self.apply_outcome(generation, outcome),
            Msg::Clear => {
                self.reset();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let on_input = link.callback(|e: InputEvent| {
            let textarea: HtmlTextAreaElement = e.target_unchecked_into();
            Msg::EmailInput(textarea.value())
        });
        let on_submit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="direct-predict">
                <div class="predict-header">
                    <h2><i class="fa-solid fa-envelope"></i> {" Direct Email Prediction"}</h2>
                    <p>{"Paste your email content below to check if it's spam"}</p>
                </div>

                <form class="predict-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="email-body">{"Email Content"}</label>
                        <textarea
                            id="email-body"
                            rows="12"
                            placeholder="Paste your email content here..."
                            value={self.email_body.clone()}
                            oninput={on_input}
                            disabled={self.loading}
                        />
                    </div>

                    <div class="button-group">
                        <button type="submit" class="btn btn-primary" disabled={self.loading}>
                            {
                                if self.loading {
                                    html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
                                } else {
                                    html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Predict"}</> }
                                }
                            }
                        </button>
                        <button
                            type="button"
                            class="btn btn-secondary"
                            onclick={link.callback(|_| Msg::Clear)}
                            disabled={self.loading}
                        >
                            {"Clear"}
                        </button>
                    </div>
                </form>

                { render_alert(&self.error) }
                { self.render_result() }
            </div>
        }
    }
}

impl DirectPredict {
    fn with_client(api: ApiClient) -> Self {
        Self {
            api,
            email_body: String::new(),
            prediction: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }

    /// Validates the input and flips the controller into the submitting
    /// state, returning the generation tag for this attempt. `None` means
    /// validation failed and no request must be issued.
    fn begin_submit(&mut self) -> Option<u64> {
        if self.email_body.trim().is_empty() {
            self.error = Some(EMPTY_INPUT_ERROR.to_owned());
            return None;
        }

        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.prediction = None;
        Some(self.generation)
    }

    fn apply_outcome(
        &mut self,
        generation: u64,
        outcome: Result<PredictionResponse, ApiError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!("dropping stale prediction response (generation {generation})");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(prediction) => self.prediction = Some(prediction),
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }

    fn reset(&mut self) {
        // Invalidates any in-flight request; its response arrives stale.
        self.generation += 1;
        self.email_body.clear();
        self.prediction = None;
        self.error = None;
        self.loading = false;
    }

    fn request_prediction(&self, ctx: &Context<Self>, generation: u64) {
        let api = self.api.clone();
        let email_body = self.email_body.clone();
        let link = ctx.link().clone();

        spawn_local(async move {
            let outcome = api.predict_email(&email_body).await;
            link.send_message(Msg::Resolved(generation, outcome));
        });
    }

    fn render_result(&self) -> Html {
        let Some(prediction) = &self.prediction else {
            return html! {};
        };

        let spam = prediction.is_spam();
        html! {
            <div class="prediction-result">
                <div class={classes!("result-card", if spam { "spam" } else { "not-spam" })}>
                    <div class="result-header">
                        <span class="result-icon">
                            {
                                if spam {
                                    html! { <i class="fa-solid fa-ban"></i> }
                                } else {
                                    html! { <i class="fa-solid fa-circle-check"></i> }
                                }
                            }
                        </span>
                        <h3>{"Prediction Result"}</h3>
                    </div>
                    <div class="result-body">
                        <div class="result-item">
                            <span class="label">{"Classification:"}</span>
                            <span class={classes!("value", if spam { "spam-text" } else { "ham-text" })}>
                                { &prediction.prediction }
                            </span>
                        </div>
                        {
                            if let Some(confidence) = prediction.confidence {
                                html! {
                                    <div class="result-item">
                                        <span class="label">{"Confidence:"}</span>
                                        <span class="value">{ format!("{confidence:.2}%") }</span>
                                    </div>
                                }
                            } else {
                                html! {}
                            }
                        }
                    </div>
                </div>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn controller() -> DirectPredict {
        DirectPredict::with_client(ApiClient::new("http://backend.test/api"))
    }

    fn spam_response() -> PredictionResponse {
        PredictionResponse {
            prediction: "Spam".to_owned(),
            confidence: Some(97.5),
            email_body: None,
        }
    }

    #[test]
    fn blank_input_is_rejected_before_any_request() {
        for input in ["", "   ", " \n\t "] {
            let mut controller = controller();
            controller.email_body = input.to_owned();

            assert_eq!(controller.begin_submit(), None, "input {input:?}");
            assert_eq!(controller.error.as_deref(), Some(EMPTY_INPUT_ERROR));
            assert!(!controller.loading);
            assert_eq!(controller.generation, 0);
        }
    }

    #[test]
    fn submit_clears_previous_outcome_and_sets_loading() {
        let mut controller = controller();
        controller.email_body = "click here to win".to_owned();
        controller.error = Some("old error".to_owned());
        controller.prediction = Some(spam_response());

        let generation = controller.begin_submit().expect("non-empty input");

        assert_eq!(generation, 1);
        assert!(controller.loading);
        assert_eq!(controller.error, None);
        assert_eq!(controller.prediction, None);
    }

    #[test]
    fn successful_outcome_is_applied() {
        let mut controller = controller();
        controller.email_body = "click here to win".to_owned();
        let generation = controller.begin_submit().unwrap();

        assert!(controller.apply_outcome(generation, Ok(spam_response())));

        assert!(!controller.loading);
        let prediction = controller.prediction.as_ref().expect("prediction stored");
        assert_eq!(prediction.prediction, "Spam");
        assert_eq!(prediction.confidence, Some(97.5));
    }

    #[test]
    fn backend_error_message_is_surfaced_verbatim() {
        let mut controller = controller();
        controller.email_body = "hello".to_owned();
        let generation = controller.begin_submit().unwrap();

        let outcome = Err(ApiError::Request("model unavailable".to_owned()));
        assert!(controller.apply_outcome(generation, outcome));

        assert_eq!(controller.error.as_deref(), Some("model unavailable"));
        assert_eq!(controller.prediction, None);
        assert!(!controller.loading);
    }

    #[test]
    fn fallback_error_message_is_surfaced() {
        let mut controller = controller();
        controller.email_body = "hello".to_owned();
        let generation = controller.begin_submit().unwrap();

        let outcome = Err(ApiError::Request("Prediction failed".to_owned()));
        assert!(controller.apply_outcome(generation, outcome));

        assert_eq!(controller.error.as_deref(), Some("Prediction failed"));
    }

    #[test]
    fn superseded_response_is_dropped() {
        let mut controller = controller();
        controller.email_body = "first".to_owned();
        let first = controller.begin_submit().unwrap();
        controller.email_body = "second".to_owned();
        let second = controller.begin_submit().unwrap();

        assert!(!controller.apply_outcome(first, Ok(spam_response())));
        assert!(controller.loading, "still waiting on the second request");
        assert_eq!(controller.prediction, None);

        assert!(controller.apply_outcome(second, Ok(spam_response())));
        assert!(!controller.loading);
    }

    #[test]
    fn response_arriving_after_clear_is_dropped() {
        let mut controller = controller();
        controller.email_body = "hello".to_owned();
        let generation = controller.begin_submit().unwrap();
        controller.reset();

        assert!(!controller.apply_outcome(generation, Ok(spam_response())));
        assert_eq!(controller.prediction, None);
        assert!(!controller.loading);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut controller = controller();
        controller.email_body = "hello".to_owned();
        let generation = controller.begin_submit().unwrap();
        controller.apply_outcome(generation, Err(ApiError::Request("boom".to_owned())));

        for _ in 0..2 {
            controller.reset();
            assert_eq!(controller.email_body, "");
            assert_eq!(controller.prediction, None);
            assert_eq!(controller.error, None);
            assert!(!controller.loading);
        }
    }
}
