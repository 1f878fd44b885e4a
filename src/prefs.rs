//! 設定の保存（クッキー）
//!
//! 値は encodeURIComponent 相当でエンコードして書き込み、読み出しは生の文字列を返す。
//! デコードは `StoredPreferences::load` で一度だけ行う。

use std::cell::RefCell;
use std::collections::HashMap;

use crate::models::SelectionTriple;
use crate::utils::{decode_component, encode_component};

pub const KEY_FONT_SIZE: &str = "fontSize";
pub const KEY_THEME: &str = "theme";
pub const KEY_REGION: &str = "selected_region";
pub const KEY_PREFECTURE: &str = "selected_prefecture";
pub const KEY_FEED_TYPE: &str = "selected_feed_type";

/// ブラウザ側のキー/値ストア
pub trait PreferenceStore {
    /// 保存されている生の値（無ければ None）
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// `document.cookie` をストアとして使う
pub struct CookieStore {
    document: web_sys::HtmlDocument,
}

impl CookieStore {
    pub fn new(document: web_sys::HtmlDocument) -> Self {
        CookieStore { document }
    }
}

impl PreferenceStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        let cookies = self.document.cookie().ok()?;
        cookie_value(&cookies, key)
    }

    fn set(&self, key: &str, value: &str) {
        let cookie = format!("{}={};path=/", key, encode_component(value));
        let _ = self.document.set_cookie(&cookie);
    }
}

/// `a=1; b=2` 形式から指定キーの値を取り出す
pub fn cookie_value(cookies: &str, key: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim_start().split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.to_string())
}

/// メモリ上のストア（クッキーが使えない環境とテスト用）
///
/// 書き込み時のエンコードはクッキーと同じ。
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), encode_component(value));
    }
}

/// 保存済みの設定（各項目は独立して省略可能）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredPreferences {
    pub font_size: Option<String>,
    pub theme: Option<String>,
    pub region: Option<String>,
    pub prefecture: Option<String>,
    pub feed_type: Option<String>,
}

impl StoredPreferences {
    pub fn load(store: &impl PreferenceStore) -> Self {
        let read = |key: &str| {
            store
                .get(key)
                .filter(|raw| !raw.is_empty())
                .map(|raw| decode_component(&raw))
        };
        StoredPreferences {
            font_size: read(KEY_FONT_SIZE),
            theme: read(KEY_THEME),
            region: read(KEY_REGION),
            prefecture: read(KEY_PREFECTURE),
            feed_type: read(KEY_FEED_TYPE),
        }
    }

    /// 送信されたフォームの組を保存値として扱う
    pub fn from_selection(selection: &SelectionTriple) -> Self {
        let present = |v: &str| Some(v.to_string()).filter(|s| !s.is_empty());
        StoredPreferences {
            region: present(&selection.region),
            prefecture: present(&selection.prefecture),
            feed_type: present(&selection.feed_type),
            ..Default::default()
        }
    }
}
