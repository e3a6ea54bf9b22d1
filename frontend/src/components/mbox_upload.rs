use gloo_file::File;
use shared::MboxSummary;
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, HtmlInputElement, SubmitEvent};
use yew::prelude::*;

use crate::api::{ApiClient, ApiError};
use crate::components::utils::{debounce, format_file_size, render_alert};

const MISSING_FILE_ERROR: &str = "Please select an MBOX file";
const INVALID_FILE_ERROR: &str = "Please select a valid MBOX file (.mbox extension)";

/// Case-sensitive literal suffix check; the backend applies the same rule.
fn is_mbox_filename(name: &str) -> bool {
    name.ends_with(".mbox")
}

pub enum Msg {
    FileChosen(Option<File>),
    Dropped(DragEvent),
    SetDragActive(bool),
    OpenPicker,
    Submit,
    Resolved(u64, Result<MboxSummary, ApiError>),
    Download,
    Clear,
}

/// MBOX batch classification: pick or drop an archive, submit it, read the
/// per-label counts, download the CSV.
pub struct MboxUpload {
    api: ApiClient,
    file: Option<File>,
    summary: Option<MboxSummary>,
    error: Option<String>,
    loading: bool,
    drag_active: bool,
    /// Same stale-response discipline as the single-prediction form.
    generation: u64,
    file_input_ref: NodeRef,
}

impl Component for MboxUpload {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self::with_client(ApiClient::from_env())
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(Some(file)) => self.select_file(file),
            Msg::FileChosen(None) => false,
            Msg::Dropped(event) => {
                self.drag_active = false;
                if let Some(file) = first_dropped_file(&event) {
                    self.select_file(file);
                }
                true
            }
            Msg::SetDragActive(active) => {
                let changed = self.drag_active != active;
                self.drag_active = active;
                changed
            }
            Msg::OpenPicker => {
                if let Some(input) = self.file_input_ref.cast::<HtmlInputElement>() {
                    input.click();
                }
                false
            }
            Msg::Submit => {
                if let Some(generation) = self.begin_submit() {
                    self.request_summary(ctx, generation);
                }
                true
            }
            Msg::Resolved(generation, outcome) => self.apply_outcome(generation, outcome),
            Msg::Download => {
                if let Some(filename) = self.download_filename() {
                    self.api.open_download(filename);
                }
                false
            }
            Msg::Clear => {
                self.reset();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let on_submit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="mbox-upload">
                <div class="upload-header">
                    <h2><i class="fa-solid fa-folder-open"></i> {" MBOX File Upload"}</h2>
                    <p>{"Upload your MBOX file to analyze multiple emails at once"}</p>
                </div>

                <form class="upload-form" onsubmit={on_submit}>
                    { self.render_drop_zone(ctx) }

                    <div class="button-group">
                        <button
                            type="submit"
                            class="btn btn-primary"
                            disabled={self.loading || self.file.is_none()}
                        >
                            {
                                if self.loading {
                                    html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Processing..."}</> }
                                } else {
                                    html! { <><i class="fa-solid fa-rocket"></i>{" Analyze MBOX"}</> }
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
                { self.render_summary(ctx) }
            </div>
        }
    }
}

impl MboxUpload {
    fn with_client(api: ApiClient) -> Self {
        Self {
            api,
            file: None,
            summary: None,
            error: None,
            loading: false,
            drag_active: false,
            generation: 0,
            file_input_ref: NodeRef::default(),
        }
    }

    /// Stores a picked or dropped file after the suffix check. A rejected
    /// file leaves any previously selected one in place.
    fn select_file(&mut self, file: File) -> bool {
        if !is_mbox_filename(&file.name()) {
            log::warn!("rejecting non-mbox upload: {}", file.name());
            self.error = Some(INVALID_FILE_ERROR.to_owned());
            return true;
        }

        self.file = Some(file);
        self.error = None;
        self.summary = None;
        true
    }

    fn begin_submit(&mut self) -> Option<u64> {
        if self.file.is_none() {
            self.error = Some(MISSING_FILE_ERROR.to_owned());
            return None;
        }

        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.summary = None;
        Some(self.generation)
    }

    fn apply_outcome(&mut self, generation: u64, outcome: Result<MboxSummary, ApiError>) -> bool {
        if generation != self.generation {
            log::debug!("dropping stale mbox response (generation {generation})");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(summary) => self.summary = Some(summary),
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }

    fn download_filename(&self) -> Option<&str> {
        self.summary.as_ref().and_then(MboxSummary::download_filename)
    }

    fn reset(&mut self) {
        // Invalidates any in-flight request; its response arrives stale.
        self.generation += 1;
        self.file = None;
        self.summary = None;
        self.error = None;
        self.loading = false;
        self.drag_active = false;

        // Reset the input element so re-selecting the same filename fires
        // another change event.
        if let Some(input) = self.file_input_ref.cast::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn request_summary(&self, ctx: &Context<Self>, generation: u64) {
        let Some(file) = self.file.clone() else {
            return;
        };
        let api = self.api.clone();
        let link = ctx.link().clone();

        spawn_local(async move {
            let outcome = api.predict_mbox(&file).await;
            link.send_message(Msg::Resolved(generation, outcome));
        });
    }

    fn render_drop_zone(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let on_change = link.callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = input
                .files()
                .and_then(|files| files.item(0))
                .map(File::from);
            Msg::FileChosen(file)
        });
        let on_drag_enter = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragActive(true)
        });
        let on_drag_over = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragActive(true)
        });
        let on_drag_leave = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragActive(false)
        });
        // prevent_default must run while the event is still being
        // dispatched, or the browser navigates to the dropped file.
        let on_drop = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::Dropped(e)
        });
        let open_picker = debounce(300, {
            let link = link.clone();
            move || link.send_message(Msg::OpenPicker)
        });

        html! {
            <>
            // Sibling of the drop zone: a programmatic click on the input
            // must not bubble back into the zone's picker handler.
            <input
                type="file"
                accept=".mbox"
                style="display: none;"
                ref={self.file_input_ref.clone()}
                onchange={on_change}
                disabled={self.loading}
            />
            <div
                class={classes!(
                    "drop-zone",
                    self.drag_active.then_some("active"),
                    self.file.is_some().then_some("has-file"),
                )}
                ondragenter={on_drag_enter}
                ondragover={on_drag_over}
                ondragleave={on_drag_leave}
                ondrop={on_drop}
                onclick={open_picker}
            >
                {
                    if let Some(file) = &self.file {
                        self.render_file_info(ctx, file)
                    } else {
                        html! {
                            <div class="drop-zone-content">
                                <i class="fa-solid fa-cloud-arrow-up"></i>
                                <p class="drop-text">
                                    <strong>{"Click to upload"}</strong>{" or drag and drop"}
                                </p>
                                <p class="drop-hint">{"MBOX files only"}</p>
                            </div>
                        }
                    }
                }
            </div>
            </>
        }
    }

    fn render_file_info(&self, ctx: &Context<Self>, file: &File) -> Html {
        let remove = ctx.link().callback(|e: MouseEvent| {
            // Keep the click from also reopening the file picker.
            e.stop_propagation();
            Msg::Clear
        });

        html! {
            <div class="file-info">
                <span class="file-icon"><i class="fa-solid fa-envelope"></i></span>
                <div class="file-details">
                    <p class="file-name">{ file.name() }</p>
                    <p class="file-size">{ format_file_size(file.size()) }</p>
                </div>
                <button
                    type="button"
                    class="remove-file"
                    onclick={remove}
                    disabled={self.loading}
                >
                    <i class="fa-solid fa-times"></i>
                </button>
            </div>
        }
    }

    fn render_summary(&self, ctx: &Context<Self>) -> Html {
        let Some(summary) = &self.summary else {
            return html! {};
        };

        html! {
            <div class="result-summary">
                <div class="summary-card">
                    <div class="summary-header">
                        <span class="summary-icon"><i class="fa-solid fa-chart-simple"></i></span>
                        <h3>{"Analysis Complete"}</h3>
                    </div>

                    <div class="summary-stats">
                        <div class="stat-item">
                            <span class="stat-label">{"Total Emails"}</span>
                            <span class="stat-value">{ summary.total_emails }</span>
                        </div>
                        {
                            for summary.predictions.iter().map(|(label, count)| {
                                let spam = label.eq_ignore_ascii_case("spam");
                                html! {
                                    <div class="stat-item" key={label.clone()}>
                                        <span class="stat-label">{ label }</span>
                                        <span class={classes!(
                                            "stat-value",
                                            if spam { "spam-count" } else { "safe-count" },
                                        )}>
                                            { *count }
                                        </span>
                                    </div>
                                }
                            })
                        }
                    </div>

                    {
                        if self.download_filename().is_some() {
                            html! {
                                <button
                                    type="button"
                                    class="btn btn-download"
                                    onclick={ctx.link().callback(|_| Msg::Download)}
                                >
                                    <i class="fa-solid fa-download"></i>{" Download Results (CSV)"}
                                </button>
                            }
                        } else {
                            html! {}
                        }
                    }
                </div>
            </div>
        }
    }
}

fn first_dropped_file(event: &DragEvent) -> Option<File> {
    event
        .data_transfer()
        .and_then(|transfer| transfer.files())
        .and_then(|files| files.item(0))
        .map(File::from)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn controller() -> MboxUpload {
        MboxUpload::with_client(ApiClient::new("http://backend.test/api"))
    }

    fn summary_fixture() -> MboxSummary {
        MboxSummary {
            total_emails: 10,
            predictions: BTreeMap::from([("Spam".to_owned(), 3), ("Ham".to_owned(), 7)]),
            download_url: Some("/api/download/results_123.csv".to_owned()),
        }
    }

    #[test]
    fn mbox_suffix_check_is_case_sensitive() {
        assert!(is_mbox_filename("archive.mbox"));
        assert!(is_mbox_filename("2024 backup.mbox"));
        assert!(!is_mbox_filename("archive.MBOX"));
        assert!(!is_mbox_filename("archive.mbox.txt"));
        assert!(!is_mbox_filename("archive.tar.gz"));
        assert!(!is_mbox_filename(""));
    }

    #[test]
    fn submit_without_file_is_rejected() {
        let mut controller = controller();

        assert_eq!(controller.begin_submit(), None);
        assert_eq!(controller.error.as_deref(), Some(MISSING_FILE_ERROR));
        assert!(!controller.loading);
        assert_eq!(controller.generation, 0);
    }

    #[test]
    fn completed_batch_is_applied() {
        let mut controller = controller();
        controller.generation = 1;
        controller.loading = true;

        assert!(controller.apply_outcome(1, Ok(summary_fixture())));

        assert!(!controller.loading);
        let summary = controller.summary.as_ref().expect("summary stored");
        assert_eq!(summary.total_emails, 10);
        assert_eq!(summary.predictions.get("Ham"), Some(&7));
    }

    #[test]
    fn backend_error_message_is_surfaced_verbatim() {
        let mut controller = controller();
        controller.generation = 1;
        controller.loading = true;

        let outcome = Err(ApiError::Request("MBOX processing failed".to_owned()));
        assert!(controller.apply_outcome(1, outcome));

        assert_eq!(controller.error.as_deref(), Some("MBOX processing failed"));
        assert_eq!(controller.summary, None);
    }

    #[test]
    fn download_filename_is_resolved_from_summary() {
        let mut controller = controller();
        controller.summary = Some(summary_fixture());

        assert_eq!(controller.download_filename(), Some("results_123.csv"));
    }

    #[test]
    fn download_is_unavailable_without_url() {
        let mut controller = controller();
        let mut summary = summary_fixture();
        summary.download_url = None;
        controller.summary = Some(summary);

        assert_eq!(controller.download_filename(), None);
    }

    #[test]
    fn stale_response_after_clear_is_dropped() {
        let mut controller = controller();
        controller.generation = 1;
        controller.loading = true;
        controller.reset();

        assert!(!controller.apply_outcome(1, Ok(summary_fixture())));
        assert_eq!(controller.summary, None);
        assert!(!controller.loading);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut controller = controller();
        controller.summary = Some(summary_fixture());
        controller.error = Some("boom".to_owned());
        controller.loading = true;
        controller.drag_active = true;

        for _ in 0..2 {
            controller.reset();
            assert!(controller.file.is_none());
            assert_eq!(controller.summary, None);
            assert_eq!(controller.error, None);
            assert!(!controller.loading);
            assert!(!controller.drag_active);
        }
    }
}
