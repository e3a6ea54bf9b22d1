mod api;
mod components;

use gloo_storage::{LocalStorage, Storage};
use yew::prelude::*;

use components::direct_predict::DirectPredict;
use components::header::render_header;
use components::mbox_upload::MboxUpload;

const THEME_STORAGE_KEY: &str = "spam-classifier.theme";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Direct,
    Mbox,
}

enum Msg {
    SelectTab(Tab),
    ToggleTheme,
}

/// Application shell: header, theme toggle, and the two prediction modes
/// behind a tab selector. Each mode owns its own state.
struct App {
    active_tab: Tab,
    theme: String,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let theme: String =
            LocalStorage::get(THEME_STORAGE_KEY).unwrap_or_else(|_| "light".to_owned());
        apply_body_theme(&theme);

        Self {
            active_tab: Tab::Direct,
            theme,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SelectTab(tab) => {
                if self.active_tab == tab {
                    false
                } else {
                    self.active_tab = tab;
                    true
                }
            }
            Msg::ToggleTheme => {
                self.theme = if self.theme == "light" {
                    "dark".to_owned()
                } else {
                    "light".to_owned()
                };
                apply_body_theme(&self.theme);
                if let Err(err) = LocalStorage::set(THEME_STORAGE_KEY, &self.theme) {
                    log::warn!("could not persist theme preference: {err}");
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }
                { self.render_theme_toggle(ctx) }

                <main class="main-content">
                    <div class="tab-buttons">
                        { self.render_tab_button(ctx, Tab::Direct, "Direct Prediction") }
                        { self.render_tab_button(ctx, Tab::Mbox, "MBOX Upload") }
                    </div>
                    <div class="tab-content">
                        {
                            match self.active_tab {
                                Tab::Direct => html! { <DirectPredict /> },
                                Tab::Mbox => html! { <MboxUpload /> },
                            }
                        }
                    </div>
                </main>

                <footer class="app-footer">
                    <p>{"Spam Email Classifier | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

impl App {
    fn render_tab_button(&self, ctx: &Context<Self>, tab: Tab, label: &str) -> Html {
        let active = self.active_tab == tab;
        html! {
            <button
                class={classes!("tab-button", active.then_some("active"))}
                onclick={ctx.link().callback(move |_| Msg::SelectTab(tab))}
            >
                { label }
            </button>
        }
    }

    fn render_theme_toggle(&self, ctx: &Context<Self>) -> Html {
        let light = self.theme == "light";
        html! {
            <div class="top-right">
                <button
                    id="theme-toggle"
                    class="theme-toggle"
                    onclick={ctx.link().callback(|_| Msg::ToggleTheme)}
                    title={ if light { "Switch to Dark Mode" } else { "Switch to Light Mode" } }
                >
                    {
                        if light {
                            html! { <i class="fa-solid fa-sun"></i> }
                        } else {
                            html! { <i class="fa-solid fa-moon"></i> }
                        }
                    }
                </button>
            </div>
        }
    }
}

fn apply_body_theme(theme: &str) {
    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        gloo_console::error!("no document body to apply theme to");
        return;
    };

    let result = if theme == "dark" {
        body.class_list().add_1("dark-mode")
    } else {
        body.class_list().remove_1("dark-mode")
    };
    if result.is_err() {
        gloo_console::error!("failed to toggle theme class");
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
