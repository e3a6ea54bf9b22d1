use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-shield-halved"></i> {" Spam Email Classifier"}</h1>
            <p class="subtitle">{"Check a single email or classify a whole MBOX archive"}</p>
        </header>
    }
}
