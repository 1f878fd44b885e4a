//! データ構造体モジュール

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::prefs::StoredPreferences;
use crate::utils::{encode_component, query_param};

// ============================================
// 表示設定
// ============================================

pub const FONT_SIZE_BASE: f64 = 16.0;
pub const FONT_SIZE_MIN: f64 = 10.0;
pub const FONT_SIZE_MAX: f64 = 36.0;
pub const FONT_SIZE_STEP: f64 = 2.0;

/// 本文の文字サイズ（px）
///
/// 復元時はクランプしない。+/- 操作の時だけ [10, 36] に収める。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSize(f64);

impl FontSize {
    /// 保存値から復元。無い・数値でない・0 の場合は 16px
    pub fn restore(stored: Option<&str>) -> Self {
        stored
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|px| px.is_finite() && *px != 0.0)
            .map(FontSize)
            .unwrap_or_default()
    }

    pub fn px(self) -> f64 {
        self.0
    }

    pub fn increased(self) -> Self {
        FontSize((self.0 + FONT_SIZE_STEP).clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))
    }

    pub fn decreased(self) -> Self {
        FontSize((self.0 - FONT_SIZE_STEP).clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))
    }

    /// CSS値 ("18px")
    pub fn css(self) -> String {
        format!("{}px", self.px())
    }

    /// 保存用の文字列 ("18")
    pub fn to_stored(self) -> String {
        self.0.to_string()
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize(FONT_SIZE_BASE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// "dark" 以外はすべてライト
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPrefs {
    pub font_size: FontSize,
    pub theme: Theme,
}

// ============================================
// 選択状態
// ============================================

/// 地域・都道府県・フィード種別の組
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionTriple {
    pub region: String,
    pub prefecture: String,
    pub feed_type: String,
}

// ============================================
// 値の出所と優先順位
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<T> {
    FromUrl(T),
    FromStore(T),
    Default(T),
}

impl<T> Source<T> {
    pub fn value(&self) -> &T {
        match self {
            Source::FromUrl(v) | Source::FromStore(v) | Source::Default(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Source::FromUrl(v) | Source::FromStore(v) | Source::Default(v) => v,
        }
    }

    pub fn origin(&self) -> &'static str {
        match self {
            Source::FromUrl(_) => "url",
            Source::FromStore(_) => "store",
            Source::Default(_) => "default",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Source::Default(_))
    }
}

/// URLパラメータ → 保存値 → 既定値 の順に最初の空でない値を採用
pub fn resolve(url: Option<&str>, stored: Option<&str>, default: Option<&str>) -> Option<Source<String>> {
    let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);
    present(url)
        .map(Source::FromUrl)
        .or_else(|| present(stored).map(Source::FromStore))
        .or_else(|| present(default).map(Source::Default))
}

/// ページURLのクエリから読む初期表示用パラメータ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParams {
    pub region: Option<String>,
    pub prefecture: Option<String>,
}

impl UrlParams {
    pub fn parse(search: &str) -> Self {
        UrlParams {
            region: query_param(search, "region"),
            prefecture: query_param(search, "prefecture"),
        }
    }
}

// ============================================
// フィード取得リクエスト
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub feed_type: Source<String>,
    pub region: Source<String>,
    pub prefecture: Source<String>,
}

impl FeedRequest {
    /// 地域と都道府県が両方決まった場合のみリクエストを組み立てる
    ///
    /// フィード種別はURLを見ず、保存値か既定値から決める。
    pub fn resolve(url: &UrlParams, stored: &StoredPreferences, default_feed_type: &str) -> Option<Self> {
        let region = resolve(url.region.as_deref(), stored.region.as_deref(), None)?;
        let prefecture = resolve(url.prefecture.as_deref(), stored.prefecture.as_deref(), None)?;
        let feed_type = resolve(None, stored.feed_type.as_deref(), Some(default_feed_type))?;
        Some(FeedRequest { feed_type, region, prefecture })
    }

    pub fn path(&self, config: &AppConfig) -> String {
        format!(
            "{}/{}?region={}&prefecture={}",
            config.feed_endpoint.trim_end_matches('/'),
            encode_component(self.feed_type.value()),
            encode_component(self.region.value()),
            encode_component(self.prefecture.value()),
        )
    }

    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "feed_type": { "value": self.feed_type.value(), "from": self.feed_type.origin() },
            "region": { "value": self.region.value(), "from": self.region.origin() },
            "prefecture": { "value": self.prefecture.value(), "from": self.prefecture.origin() },
        })
    }
}

/// 都道府県リスト取得のパス
pub fn prefectures_path(config: &AppConfig, region: &str) -> String {
    format!("{}?region={}", config.prefectures_endpoint, encode_component(region))
}
