//! テスト用のページとバックエンド

use std::cell::RefCell;
use std::collections::HashMap;

use crate::api::{Backend, FetchError, Fragment};
use crate::config::{FEED_KINDS, REGIONS};
use crate::dom::{Field, Page};
use crate::models::FontSize;
use crate::utils::query_param;

#[derive(Default, Clone)]
struct FakeSelect {
    placeholder: Option<String>,
    options: Vec<String>,
    value: String,
}

/// DOMの代わり。select はブラウザと同じく、存在しない値を設定すると空になる
pub struct FakePage {
    font_size: RefCell<FontSize>,
    dark: RefCell<bool>,
    selects: RefCell<HashMap<Field, FakeSelect>>,
    panel: RefCell<Option<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        let with_placeholder = |values: Vec<String>| FakeSelect {
            placeholder: None,
            options: std::iter::once(String::new()).chain(values).collect(),
            value: String::new(),
        };
        let mut selects = HashMap::new();
        selects.insert(Field::Region, with_placeholder(REGIONS.iter().map(|r| r.to_string()).collect()));
        selects.insert(Field::Prefecture, with_placeholder(Vec::new()));
        selects.insert(
            Field::FeedType,
            FakeSelect {
                placeholder: None,
                options: FEED_KINDS.iter().map(|k| k.id.to_string()).collect(),
                value: FEED_KINDS[0].id.to_string(),
            },
        );
        FakePage {
            font_size: RefCell::new(FontSize::default()),
            dark: RefCell::new(false),
            selects: RefCell::new(selects),
            panel: RefCell::new(None),
        }
    }

    pub fn font_size(&self) -> FontSize {
        *self.font_size.borrow()
    }

    pub fn is_dark(&self) -> bool {
        *self.dark.borrow()
    }

    pub fn value(&self, field: Field) -> String {
        self.select_value(field)
    }

    pub fn options(&self, field: Field) -> Vec<String> {
        self.selects.borrow().get(&field).map(|s| s.options.clone()).unwrap_or_default()
    }

    /// 最後に `replace_options` で設定されたプレースホルダー文言
    pub fn placeholder(&self, field: Field) -> Option<String> {
        self.selects.borrow().get(&field).and_then(|s| s.placeholder.clone())
    }

    /// 一度も書き換えられていなければ None
    pub fn panel(&self) -> Option<String> {
        self.panel.borrow().clone()
    }
}

impl Page for FakePage {
    fn set_font_size(&self, size: FontSize) {
        *self.font_size.borrow_mut() = size;
    }

    fn set_dark_mode(&self, on: bool) {
        *self.dark.borrow_mut() = on;
    }

    fn select_value(&self, field: Field) -> String {
        self.selects.borrow().get(&field).map(|s| s.value.clone()).unwrap_or_default()
    }

    fn set_select_value(&self, field: Field, value: &str) {
        if let Some(select) = self.selects.borrow_mut().get_mut(&field) {
            select.value = if select.options.iter().any(|o| o == value) {
                value.to_string()
            } else {
                String::new()
            };
        }
    }

    fn replace_options(&self, field: Field, placeholder: &str, options: &[String]) {
        let select = FakeSelect {
            placeholder: Some(placeholder.to_string()),
            options: std::iter::once(String::new()).chain(options.iter().cloned()).collect(),
            value: String::new(),
        };
        self.selects.borrow_mut().insert(field, select);
    }

    fn set_panel_html(&self, html: &str) {
        *self.panel.borrow_mut() = Some(html.to_string());
    }
}

/// 応答を事前に決めておくバックエンド。リクエストURLを記録する
pub struct FakeBackend {
    prefectures: HashMap<String, Result<Vec<String>, FetchError>>,
    fragment: Result<Fragment, FetchError>,
    requests: RefCell<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend {
            prefectures: HashMap::new(),
            fragment: Ok(Fragment { status: 200, body: String::new() }),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prefectures(mut self, region: &str, outcome: Result<Vec<String>, FetchError>) -> Self {
        self.prefectures.insert(region.to_string(), outcome);
        self
    }

    pub fn with_fragment(mut self, status: u16, body: &str) -> Self {
        self.fragment = Ok(Fragment { status, body: body.to_string() });
        self
    }

    pub fn with_fragment_error(mut self, error: FetchError) -> Self {
        self.fragment = Err(error);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Backend for FakeBackend {
    async fn fetch_prefectures(&self, url: &str) -> Result<Vec<String>, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let region = url
            .split_once('?')
            .and_then(|(_, query)| query_param(query, "region"))
            .unwrap_or_default();
        self.prefectures
            .get(&region)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    async fn fetch_fragment(&self, url: &str) -> Result<Fragment, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.fragment.clone()
    }
}
