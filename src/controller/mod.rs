//! 画面制御（イベント → 状態遷移＋副作用）
//!
//! `update` は純粋関数。DOM・クッキー・通信はすべて `Effect` として返し、
//! `runtime::Runtime` が順に実行する。

pub mod runtime;

use crate::api::{FetchError, Fragment};
use crate::config::AppConfig;
use crate::dom::Field;
use crate::models::{resolve, DisplayPrefs, FeedRequest, FontSize, SelectionTriple, Theme, UrlParams};
use crate::prefs::{
    StoredPreferences, KEY_FEED_TYPE, KEY_FONT_SIZE, KEY_PREFECTURE, KEY_REGION, KEY_THEME,
};
use crate::utils::log_trace::Level;

pub use runtime::Runtime;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub display: DisplayPrefs,
    /// 最後に選択された地域（都道府県リスト応答の鮮度判定に使う）
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PageLoaded {
        stored: StoredPreferences,
        url: UrlParams,
    },
    RegionChanged(String),
    PrefecturesLoaded {
        region: String,
        outcome: Result<Vec<String>, FetchError>,
        /// 応答到着時点の保存値
        stored: StoredPreferences,
    },
    FontIncrease,
    FontDecrease,
    ThemeToggled,
    Submitted(SelectionTriple),
    FeedLoaded {
        request: FeedRequest,
        outcome: Result<Fragment, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ApplyFontSize(FontSize),
    ApplyTheme(Theme),
    Persist { key: &'static str, value: String },
    SetSelect { field: Field, value: String },
    ReplaceOptions { field: Field, options: Vec<String> },
    ReplacePanel(String),
    /// 地域セレクトの現在値で都道府県リストを読み直す
    ReloadPrefectures,
    FetchPrefectures { region: String },
    FetchFeed(FeedRequest),
    Log { level: Level, category: &'static str, message: String },
}

fn log(level: Level, category: &'static str, message: impl Into<String>) -> Effect {
    Effect::Log { level, category, message: message.into() }
}

pub fn update(state: &State, config: &AppConfig, event: Event) -> (State, Vec<Effect>) {
    let mut next = state.clone();
    let effects = match event {
        Event::PageLoaded { stored, url } => restore(&mut next, config, &stored, &url),
        Event::RegionChanged(region) => {
            next.region = region.clone();
            load_prefectures(&region)
        }
        Event::PrefecturesLoaded { region, outcome, stored } => {
            prefectures_loaded(state, region, outcome, &stored)
        }
        Event::FontIncrease => {
            next.display.font_size = state.display.font_size.increased();
            font_effects(next.display.font_size)
        }
        Event::FontDecrease => {
            next.display.font_size = state.display.font_size.decreased();
            font_effects(next.display.font_size)
        }
        Event::ThemeToggled => {
            next.display.theme = state.display.theme.toggled();
            vec![
                Effect::ApplyTheme(next.display.theme),
                Effect::Persist { key: KEY_THEME, value: next.display.theme.as_str().to_string() },
            ]
        }
        Event::Submitted(selection) => {
            next.region = selection.region.clone();
            submit(config, &selection)
        }
        Event::FeedLoaded { request, outcome } => feed_loaded(config, &request, outcome),
    };
    (next, effects)
}

/// ページ読み込み時の復元
fn restore(next: &mut State, config: &AppConfig, stored: &StoredPreferences, url: &UrlParams) -> Vec<Effect> {
    let mut effects = Vec::new();

    next.display = DisplayPrefs {
        font_size: FontSize::restore(stored.font_size.as_deref()),
        theme: Theme::from_stored(stored.theme.as_deref()),
    };
    effects.push(Effect::ApplyFontSize(next.display.font_size));
    effects.push(Effect::ApplyTheme(next.display.theme));

    // 選択肢に無い地域はセレクト側で空になるので、読み込みはセレクトの値から
    if let Some(region) = resolve(None, stored.region.as_deref(), None) {
        effects.push(Effect::SetSelect { field: Field::Region, value: region.into_value() });
        effects.push(Effect::ReloadPrefectures);
    }

    // 既存の保存値は上書きしない
    let mut stored = stored.clone();
    if let Some(feed_type) = resolve(None, stored.feed_type.as_deref(), Some(config.default_feed_type.as_str())) {
        if feed_type.is_default() {
            effects.push(Effect::Persist { key: KEY_FEED_TYPE, value: feed_type.value().clone() });
        }
        let value = feed_type.into_value();
        effects.push(Effect::SetSelect { field: Field::FeedType, value: value.clone() });
        stored.feed_type = Some(value);
    }

    effects.push(load_feed(config, url, &stored));
    effects
}

/// 都道府県リストの読み込み開始
fn load_prefectures(region: &str) -> Vec<Effect> {
    if region.is_empty() {
        return vec![Effect::ReplaceOptions { field: Field::Prefecture, options: Vec::new() }];
    }
    vec![Effect::FetchPrefectures { region: region.to_string() }]
}

fn prefectures_loaded(
    state: &State,
    region: String,
    outcome: Result<Vec<String>, FetchError>,
    stored: &StoredPreferences,
) -> Vec<Effect> {
    if region != state.region {
        return vec![log(
            Level::Debug,
            "prefecture",
            format!("古い応答を破棄: {} (現在: {})", region, state.region),
        )];
    }

    let prefectures = match outcome {
        Ok(list) => list,
        Err(e) => {
            return vec![
                log(Level::Error, "prefecture", format!("{} の都道府県取得失敗: {}", region, e)),
                Effect::ReplaceOptions { field: Field::Prefecture, options: Vec::new() },
            ];
        }
    };

    let mut effects = vec![log(
        Level::Info,
        "prefecture",
        format!("{}: {}件", region, prefectures.len()),
    )];

    // 保存済みの都道府県がリストに無ければプレースホルダーに戻す
    let selected = stored
        .prefecture
        .as_ref()
        .map(|p| if prefectures.contains(p) { p.clone() } else { String::new() });

    effects.push(Effect::ReplaceOptions { field: Field::Prefecture, options: prefectures });
    if let Some(value) = selected {
        effects.push(Effect::SetSelect { field: Field::Prefecture, value });
    }
    if let Some(feed_type) = resolve(None, stored.feed_type.as_deref(), None) {
        effects.push(Effect::SetSelect { field: Field::FeedType, value: feed_type.into_value() });
    }
    effects
}

fn font_effects(size: FontSize) -> Vec<Effect> {
    vec![
        Effect::ApplyFontSize(size),
        Effect::Persist { key: KEY_FONT_SIZE, value: size.to_stored() },
    ]
}

/// フォーム送信: 3項目を保存し、URLパラメータを見ずに再取得
fn submit(config: &AppConfig, selection: &SelectionTriple) -> Vec<Effect> {
    let mut effects = vec![
        Effect::Persist { key: KEY_REGION, value: selection.region.clone() },
        Effect::Persist { key: KEY_PREFECTURE, value: selection.prefecture.clone() },
        Effect::Persist { key: KEY_FEED_TYPE, value: selection.feed_type.clone() },
    ];
    let stored = StoredPreferences::from_selection(selection);
    effects.push(load_feed(config, &UrlParams::default(), &stored));
    effects
}

fn load_feed(config: &AppConfig, url: &UrlParams, stored: &StoredPreferences) -> Effect {
    match FeedRequest::resolve(url, stored, &config.default_feed_type) {
        Some(request) => Effect::FetchFeed(request),
        None => log(Level::Debug, "feed", "地域・都道府県が未選択のため取得しません"),
    }
}

fn feed_loaded(config: &AppConfig, request: &FeedRequest, outcome: Result<Fragment, FetchError>) -> Vec<Effect> {
    match outcome {
        Ok(fragment) if fragment.is_success() => vec![
            log(
                Level::Info,
                "feed",
                format!("{}/{} を表示", request.region.value(), request.prefecture.value()),
            ),
            Effect::ReplacePanel(fragment.body),
        ],
        Ok(fragment) => vec![
            log(Level::Warn, "feed", format!("フィード取得失敗: HTTP {}", fragment.status)),
            Effect::ReplacePanel(config.feed_failed_message.clone()),
        ],
        Err(e) => vec![
            log(Level::Error, "feed", e.to_string()),
            Effect::ReplacePanel(config.feed_error_message.clone()),
        ],
    }
}
