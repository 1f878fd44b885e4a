//! ページ（DOM）操作
//!
//! 前提とする要素: `region` / `prefecture` / `feed_type` (select)、`feed-data`（パネル）、
//! body の `dark-mode` クラスと font-size。

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlOptionElement, HtmlSelectElement};

use crate::models::FontSize;
use crate::utils::log_trace::log_warn;

pub const DARK_MODE_CLASS: &str = "dark-mode";
pub const PANEL_ID: &str = "feed-data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Region,
    Prefecture,
    FeedType,
}

impl Field {
    pub fn id(self) -> &'static str {
        match self {
            Field::Region => "region",
            Field::Prefecture => "prefecture",
            Field::FeedType => "feed_type",
        }
    }
}

/// ページ表面の抽象
pub trait Page {
    fn set_font_size(&self, size: FontSize);
    fn set_dark_mode(&self, on: bool);
    fn select_value(&self, field: Field) -> String;
    fn set_select_value(&self, field: Field, value: &str);
    /// 選択肢をプレースホルダー＋`options` で作り直す
    fn replace_options(&self, field: Field, placeholder: &str, options: &[String]);
    fn set_panel_html(&self, html: &str);
}

/// web-sys の Document に対する実装
pub struct DocumentPage {
    document: Document,
}

impl DocumentPage {
    pub fn new(document: Document) -> Self {
        DocumentPage { document }
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn select(&self, field: Field) -> Option<HtmlSelectElement> {
        let select = self
            .document
            .get_element_by_id(field.id())
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        if select.is_none() {
            log_warn("ui-action", &format!("#{} が見つかりません", field.id()));
        }
        select
    }
}

impl Page for DocumentPage {
    fn set_font_size(&self, size: FontSize) {
        if let Some(body) = self.body() {
            let _ = body.style().set_property("font-size", &size.css());
        }
    }

    fn set_dark_mode(&self, on: bool) {
        if let Some(body) = self.body() {
            let _ = body.class_list().toggle_with_force(DARK_MODE_CLASS, on);
        }
    }

    fn select_value(&self, field: Field) -> String {
        self.select(field).map(|s| s.value()).unwrap_or_default()
    }

    fn set_select_value(&self, field: Field, value: &str) {
        if let Some(select) = self.select(field) {
            select.set_value(value);
        }
    }

    fn replace_options(&self, field: Field, placeholder: &str, options: &[String]) {
        let Some(select) = self.select(field) else {
            return;
        };

        // 先に全要素を作ってから差し替える
        let mut nodes = Vec::with_capacity(options.len() + 1);
        for (label, value) in std::iter::once((placeholder, "")).chain(options.iter().map(|o| (o.as_str(), o.as_str()))) {
            match HtmlOptionElement::new_with_text_and_value(label, value) {
                Ok(node) => nodes.push(node),
                Err(e) => {
                    log_warn("ui-action", &format!("option作成失敗: {:?}", e));
                    return;
                }
            }
        }

        select.set_inner_html("");
        for node in &nodes {
            let _ = select.append_child(node);
        }
    }

    fn set_panel_html(&self, html: &str) {
        match self.document.get_element_by_id(PANEL_ID) {
            Some(panel) => panel.set_inner_html(html),
            None => log_warn("feed", &format!("#{} が見つかりません", PANEL_ID)),
        }
    }
}
