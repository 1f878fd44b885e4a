//! アプリ設定とカタログ
//!
//! 設定はページ内の `<script type="application/json" id="feed-panel-config">` から
//! 任意で読み込む。要素が無い場合は既定値、壊れている場合は既定値＋警告。

use serde::Deserialize;
use thiserror::Error;

use crate::utils::log_trace::log_warn;

/// 設定JSONを埋め込む要素のID
pub const CONFIG_ELEMENT_ID: &str = "feed-panel-config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("設定JSONの解析失敗: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 地域→都道府県リストのエンドポイント
    pub prefectures_endpoint: String,
    /// フィード断片のエンドポイント（末尾にフィード種別が付く）
    pub feed_endpoint: String,
    pub default_feed_type: String,
    pub placeholder_label: String,
    /// 非2xx応答時にパネルへ表示する文言
    pub feed_failed_message: String,
    /// 通信例外時にパネルへ表示する文言
    pub feed_error_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            prefectures_endpoint: "/get_prefectures".to_string(),
            feed_endpoint: "/rss".to_string(),
            default_feed_type: "extra".to_string(),
            placeholder_label: "-- 選択してください --".to_string(),
            feed_failed_message: "フィードの取得に失敗しました。".to_string(),
            feed_error_message: "エラーが発生しました。時間をおいて再度お試しください。".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// ページ埋め込みの設定を読み込む
    pub fn from_document(document: &web_sys::Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return AppConfig::default();
        };
        match AppConfig::from_json(&text) {
            Ok(config) => {
                if find_feed_kind(&config.default_feed_type).is_none() {
                    log_warn(
                        "startup",
                        &format!("未知のフィード種別: {}", config.default_feed_type),
                    );
                }
                config
            }
            Err(e) => {
                log_warn("startup", &format!("{} (既定値を使用)", e));
                AppConfig::default()
            }
        }
    }
}

// ============================================
// フィード種別カタログ
// ============================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedKind {
    pub id: &'static str,
    pub category: &'static str,
    pub frequency: &'static str,
}

impl FeedKind {
    pub fn label(&self) -> String {
        format!("{}（{}）", self.category, self.frequency)
    }
}

pub const FEED_KINDS: &[FeedKind] = &[
    FeedKind { id: "extra", category: "警報・注意報", frequency: "高頻度" },
    FeedKind { id: "eqvol", category: "地震・火山", frequency: "高頻度" },
    FeedKind { id: "other", category: "その他", frequency: "高頻度" },
    FeedKind { id: "extra_l", category: "警報・注意報", frequency: "低頻度" },
    FeedKind { id: "eqvol_l", category: "地震・火山", frequency: "低頻度" },
    FeedKind { id: "other_l", category: "その他", frequency: "低頻度" },
];

pub fn find_feed_kind(id: &str) -> Option<&'static FeedKind> {
    FEED_KINDS.iter().find(|k| k.id == id)
}

/// 気象庁の予報地域
pub const REGIONS: &[&str] = &[
    "北海道", "東北", "関東甲信", "東海", "北陸", "近畿", "中国", "四国", "九州", "沖縄",
];
