mod api;
mod components;
mod config;
mod controller;
mod dom;
mod models;
mod prefs;
mod utils;

#[cfg(test)]
mod testing;

use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use leptos::*;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use web_sys::Document;

use crate::api::HttpBackend;
use crate::components::FeedShell;
use crate::config::AppConfig;
use crate::controller::{Event, Runtime};
use crate::dom::{DocumentPage, Field, PANEL_ID};
use crate::models::UrlParams;
use crate::prefs::{CookieStore, MemoryStore, PreferenceStore};
use crate::utils::log_trace::{clear_logs, get_logs_json, log_debug, log_error, log_info, log_warn};

type AppRuntime<S> = Runtime<S, DocumentPage, HttpBackend>;

// ============================================
// 起動
// ============================================

fn main() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log_error("startup", "document が取得できません");
        return;
    };

    // DOM構築前なら DOMContentLoaded を待つ
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_| start()).forget();
    } else {
        start();
    }
}

fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let config = AppConfig::from_document(&document);

    // ホストページが骨格を持たない場合は自前で描画
    if document.get_element_by_id(PANEL_ID).is_none() {
        log_info("startup", "ページ骨格を描画します");
        let placeholder = config.placeholder_label.clone();
        mount_to_body(move || view! { <FeedShell placeholder=placeholder /> });
    }

    let url = UrlParams::parse(&window.location().search().unwrap_or_default());
    let page = DocumentPage::new(document.clone());

    match document.clone().dyn_into::<web_sys::HtmlDocument>() {
        Ok(html) => {
            let store = CookieStore::new(html);
            run(Rc::new(Runtime::new(store, page, HttpBackend, config)), &document, url);
        }
        Err(_) => {
            log_warn("prefs", "クッキーが使えないため設定はこのページ内だけ保持します");
            run(Rc::new(Runtime::new(MemoryStore::new(), page, HttpBackend, config)), &document, url);
        }
    }
}

fn run<S: PreferenceStore + 'static>(rt: Rc<AppRuntime<S>>, document: &Document, url: UrlParams) {
    bind_handlers(&rt, document);
    log_info("startup", "イベント登録完了");
    spawn_local(async move {
        rt.load(url).await;
    });
}

// ============================================
// イベント登録
// ============================================

fn bind_handlers<S: PreferenceStore + 'static>(rt: &Rc<AppRuntime<S>>, document: &Document) {
    match document.get_element_by_id(Field::Region.id()) {
        Some(region) => {
            let rt = rt.clone();
            EventListener::new(&region, "change", move |_| {
                let rt = rt.clone();
                spawn_local(async move {
                    rt.region_changed().await;
                });
            })
            .forget();
        }
        None => log_warn("ui-action", "#region が見つかりません"),
    }

    on_click(document, "font-increase", rt, Event::FontIncrease);
    on_click(document, "font-decrease", rt, Event::FontDecrease);
    on_click(document, "theme-toggle", rt, Event::ThemeToggled);

    // 送信はページ遷移させずにその場で再取得
    match document.query_selector("form") {
        Ok(Some(form)) => {
            let rt = rt.clone();
            let options = EventListenerOptions::enable_prevent_default();
            EventListener::new_with_options(&form, "submit", options, move |event| {
                event.prevent_default();
                log_debug("ui-action", "form submit");
                let rt = rt.clone();
                spawn_local(async move {
                    rt.submitted().await;
                });
            })
            .forget();
        }
        _ => log_warn("ui-action", "form が見つかりません"),
    }
}

fn on_click<S: PreferenceStore + 'static>(
    document: &Document,
    id: &'static str,
    rt: &Rc<AppRuntime<S>>,
    event: Event,
) {
    let Some(button) = document.get_element_by_id(id) else {
        log_warn("ui-action", &format!("#{} が見つかりません", id));
        return;
    };
    let rt = rt.clone();
    EventListener::new(&button, "click", move |_| {
        log_debug("ui-action", &format!("#{} click", id));
        let rt = rt.clone();
        let event = event.clone();
        spawn_local(async move {
            rt.dispatch(event).await;
        });
    })
    .forget();
}

// ============================================
// デバッグ用（ブラウザのコンソールから呼ぶ）
// ============================================

#[wasm_bindgen(js_name = feedPanelLogs)]
pub fn feed_panel_logs() -> String {
    get_logs_json()
}

#[wasm_bindgen(js_name = feedPanelClearLogs)]
pub fn feed_panel_clear_logs() {
    clear_logs();
}
