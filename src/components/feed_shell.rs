//! 単体表示用のページ骨格
//!
//! ホストページに `#feed-data` が無い場合だけ描画する。要素IDは制御側と共通。

use leptos::*;

use crate::config::{FEED_KINDS, REGIONS};
use crate::dom::{Field, PANEL_ID};

/// 表示設定ボタン（文字サイズ・テーマ）
#[component]
pub fn DisplayControls() -> impl IntoView {
    view! {
        <div class="display-controls">
            <button id="font-decrease" type="button" title="文字を小さく">"A−"</button>
            <button id="font-increase" type="button" title="文字を大きく">"A＋"</button>
            <button id="theme-toggle" type="button">"テーマ切替"</button>
        </div>
    }
}

/// 地域・都道府県・フィード種別の選択フォームとフィード表示パネル
#[component]
pub fn FeedShell(placeholder: String) -> impl IntoView {
    let region_placeholder = placeholder.clone();

    view! {
        <div class="feed-shell">
            <header class="feed-header">
                <h1>"防災情報フィード"</h1>
                <DisplayControls />
            </header>

            <form class="feed-form">
                <label>
                    "地域"
                    <select id=Field::Region.id() name="region">
                        <option value="">{region_placeholder}</option>
                        {REGIONS.iter().map(|r| view! {
                            <option value=*r>{*r}</option>
                        }).collect_view()}
                    </select>
                </label>
                <label>
                    "都道府県"
                    <select id=Field::Prefecture.id() name="prefecture">
                        <option value="">{placeholder}</option>
                    </select>
                </label>
                <label>
                    "情報の種類"
                    <select id=Field::FeedType.id() name="feed_type">
                        {FEED_KINDS.iter().map(|k| view! {
                            <option value=k.id>{k.label()}</option>
                        }).collect_view()}
                    </select>
                </label>
                <button type="submit">"表示"</button>
            </form>

            <div id=PANEL_ID class="feed-data"></div>
        </div>
    }
}
