//! 副作用の実行
//!
//! 通信は `FuturesUnordered` に積み、完了した順にイベントとして `update` に戻す。
//! 状態の借用は await をまたがない。

use std::cell::RefCell;

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};

use super::{update, Effect, Event, State};
use crate::api::Backend;
use crate::config::AppConfig;
use crate::dom::{Field, Page};
use crate::models::{prefectures_path, SelectionTriple, UrlParams};
use crate::prefs::{PreferenceStore, StoredPreferences};
use crate::utils::log_trace::{log, log_info_with_data, Level};

pub struct Runtime<S, P, B> {
    store: S,
    page: P,
    backend: B,
    config: AppConfig,
    state: RefCell<State>,
}

type Pending<'a> = FuturesUnordered<LocalBoxFuture<'a, Event>>;

impl<S: PreferenceStore, P: Page, B: Backend> Runtime<S, P, B> {
    pub fn new(store: S, page: P, backend: B, config: AppConfig) -> Self {
        Runtime {
            store,
            page,
            backend,
            config,
            state: RefCell::new(State::default()),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn page(&self) -> &P {
        &self.page
    }

    /// 初回読み込み: 保存値とURLパラメータから復元する
    pub async fn load(&self, url: UrlParams) {
        let stored = StoredPreferences::load(&self.store);
        self.dispatch(Event::PageLoaded { stored, url }).await;
    }

    /// 地域セレクトの変更
    pub async fn region_changed(&self) {
        let region = self.page.select_value(Field::Region);
        self.dispatch(Event::RegionChanged(region)).await;
    }

    /// フォーム送信
    pub async fn submitted(&self) {
        let selection = SelectionTriple {
            region: self.page.select_value(Field::Region),
            prefecture: self.page.select_value(Field::Prefecture),
            feed_type: self.page.select_value(Field::FeedType),
        };
        self.dispatch(Event::Submitted(selection)).await;
    }

    pub async fn dispatch(&self, event: Event) {
        let mut pending: Pending<'_> = FuturesUnordered::new();
        self.step(event, &mut pending);
        while let Some(done) = pending.next().await {
            self.step(done, &mut pending);
        }
    }

    fn step<'a>(&'a self, event: Event, pending: &mut Pending<'a>) {
        let effects = {
            let mut state = self.state.borrow_mut();
            let (next, effects) = update(&state, &self.config, event);
            *state = next;
            effects
        };
        for effect in effects {
            self.apply(effect, pending);
        }
    }

    fn apply<'a>(&'a self, effect: Effect, pending: &mut Pending<'a>) {
        match effect {
            Effect::ApplyFontSize(size) => self.page.set_font_size(size),
            Effect::ApplyTheme(theme) => self.page.set_dark_mode(theme.is_dark()),
            Effect::Persist { key, value } => self.store.set(key, &value),
            Effect::SetSelect { field, value } => self.page.set_select_value(field, &value),
            Effect::ReplaceOptions { field, options } => {
                self.page.replace_options(field, &self.config.placeholder_label, &options)
            }
            Effect::ReplacePanel(html) => self.page.set_panel_html(&html),
            Effect::Log { level, category, message } => log(level, category, &message),
            Effect::ReloadPrefectures => {
                let region = self.page.select_value(Field::Region);
                self.step(Event::RegionChanged(region), pending);
            }
            Effect::FetchPrefectures { region } => {
                let url = prefectures_path(&self.config, &region);
                log(Level::Debug, "prefecture", &format!("GET {}", url));
                pending.push(
                    async move {
                        let outcome = self.backend.fetch_prefectures(&url).await;
                        // 応答到着時点の保存値で選択を復元する
                        let stored = StoredPreferences::load(&self.store);
                        Event::PrefecturesLoaded { region, outcome, stored }
                    }
                    .boxed_local(),
                );
            }
            Effect::FetchFeed(request) => {
                let url = request.path(&self.config);
                log_info_with_data("feed", &format!("GET {}", url), request.describe());
                pending.push(
                    async move {
                        let outcome = self.backend.fetch_fragment(&url).await;
                        Event::FeedLoaded { request, outcome }
                    }
                    .boxed_local(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::models::Theme;
    use crate::prefs::{MemoryStore, KEY_FEED_TYPE, KEY_FONT_SIZE, KEY_PREFECTURE, KEY_REGION, KEY_THEME};
    use crate::testing::{FakeBackend, FakePage};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    type TestRuntime = Runtime<MemoryStore, FakePage, FakeBackend>;

    fn runtime(store: MemoryStore, backend: FakeBackend) -> TestRuntime {
        Runtime::new(store, FakePage::new(), backend, AppConfig::default())
    }

    #[test]
    fn test_first_visit_end_to_end() {
        let rt = runtime(MemoryStore::new(), FakeBackend::new());
        block_on(rt.load(UrlParams::default()));

        let page = rt.page();
        assert_eq!(page.font_size().px(), 16.0);
        assert!(!page.is_dark());
        assert_eq!(page.value(Field::FeedType), "extra");
        assert_eq!(rt.store().get(KEY_FEED_TYPE).as_deref(), Some("extra"));
        assert_eq!(page.panel(), None);
        assert!(rt.backend.requests().is_empty());
    }

    #[test]
    fn test_url_params_drive_initial_feed() {
        let store = MemoryStore::with_entries([(KEY_FEED_TYPE, "extra")]);
        let backend = FakeBackend::new().with_fragment(200, "<p>ok</p>");
        let rt = runtime(store, backend);
        block_on(rt.load(UrlParams::parse("?region=Kanto&prefecture=Tokyo")));

        assert_eq!(
            rt.backend.requests(),
            vec!["/rss/extra?region=Kanto&prefecture=Tokyo".to_string()]
        );
        assert_eq!(rt.page().panel().as_deref(), Some("<p>ok</p>"));
    }

    #[test]
    fn test_feed_failure_and_error_messages() {
        let config = AppConfig::default();
        let store = MemoryStore::with_entries([(KEY_REGION, "Kanto"), (KEY_PREFECTURE, "Tokyo")]);

        let rt = runtime(store, FakeBackend::new().with_fragment(500, "boom"));
        block_on(rt.load(UrlParams::default()));
        assert_eq!(rt.page().panel(), Some(config.feed_failed_message.clone()));

        let store = MemoryStore::with_entries([(KEY_REGION, "Kanto"), (KEY_PREFECTURE, "Tokyo")]);
        let backend = FakeBackend::new().with_fragment_error(FetchError::Transport("offline".to_string()));
        let rt = runtime(store, backend);
        block_on(rt.load(UrlParams::default()));
        assert_eq!(rt.page().panel(), Some(config.feed_error_message.clone()));
    }

    #[test]
    fn test_restore_loads_prefectures_and_selects_stored() {
        let store = MemoryStore::with_entries([
            (KEY_FONT_SIZE, "20"),
            (KEY_THEME, "dark"),
            (KEY_REGION, "東北"),
            (KEY_PREFECTURE, "岩手県"),
        ]);
        let backend = FakeBackend::new()
            .with_prefectures("東北", Ok(vec!["青森県".into(), "秋田県".into(), "岩手県".into()]))
            .with_fragment(200, "<ul></ul>");
        let rt = runtime(store, backend);
        block_on(rt.load(UrlParams::default()));

        let page = rt.page();
        assert_eq!(page.font_size().px(), 20.0);
        assert!(page.is_dark());
        assert_eq!(page.value(Field::Region), "東北");
        assert_eq!(page.options(Field::Prefecture), vec!["", "青森県", "秋田県", "岩手県"]);
        assert_eq!(page.value(Field::Prefecture), "岩手県");
        let mut requests = rt.backend.requests();
        requests.sort();
        assert_eq!(
            requests,
            vec![
                "/get_prefectures?region=%E6%9D%B1%E5%8C%97".to_string(),
                "/rss/extra?region=%E6%9D%B1%E5%8C%97&prefecture=%E5%B2%A9%E6%89%8B%E7%9C%8C".to_string(),
            ]
        );
    }

    #[test]
    fn test_region_change_with_missing_prefecture_falls_back() {
        let store = MemoryStore::with_entries([(KEY_PREFECTURE, "岩手県")]);
        let backend = FakeBackend::new().with_prefectures("四国", Ok(vec!["徳島県".into(), "香川県".into()]));
        let rt = runtime(store, backend);
        rt.page().set_select_value(Field::Region, "四国");
        block_on(rt.region_changed());

        assert_eq!(rt.page().options(Field::Prefecture), vec!["", "徳島県", "香川県"]);
        assert_eq!(rt.page().value(Field::Prefecture), "");
    }

    #[test]
    fn test_empty_region_makes_no_request() {
        let rt = runtime(MemoryStore::new(), FakeBackend::new());
        rt.page().replace_options(Field::Prefecture, "--", &["青森県".to_string()]);
        rt.page().set_select_value(Field::Region, "");
        block_on(rt.region_changed());

        assert_eq!(rt.page().options(Field::Prefecture), vec![""]);
        assert_eq!(rt.page().placeholder(Field::Prefecture).as_deref(), Some("-- 選択してください --"));
        assert!(rt.backend.requests().is_empty());
    }

    #[test]
    fn test_restore_unknown_region_loads_from_selector_value() {
        let store = MemoryStore::with_entries([(KEY_REGION, "Atlantis"), (KEY_PREFECTURE, "Poseidonis")]);
        let backend = FakeBackend::new().with_prefectures("Atlantis", Ok(vec!["Poseidonis".into()]));
        let rt = runtime(store, backend);
        rt.page().replace_options(Field::Prefecture, "--", &["古い県".to_string()]);
        block_on(rt.load(UrlParams::default()));

        assert_eq!(rt.page().value(Field::Region), "");
        assert_eq!(rt.page().options(Field::Prefecture), vec![""]);
        assert_eq!(rt.state().region, "");
        assert!(!rt.backend.requests().iter().any(|r| r.starts_with("/get_prefectures")));
    }

    #[test]
    fn test_prefecture_error_resets_selector() {
        let store = MemoryStore::new();
        let backend = FakeBackend::new().with_prefectures("東北", Err(FetchError::Decode("not json".into())));
        let rt = runtime(store, backend);
        rt.page().replace_options(Field::Prefecture, "--", &["古い県".to_string()]);
        rt.page().set_select_value(Field::Region, "東北");
        block_on(rt.region_changed());

        assert_eq!(rt.page().options(Field::Prefecture), vec![""]);
    }

    #[test]
    fn test_submit_persists_and_reloads_in_place() {
        let backend = FakeBackend::new()
            .with_prefectures("九州", Ok(vec!["福岡県".into(), "大分県".into()]))
            .with_fragment(200, "<p>九州</p>");
        let rt = runtime(MemoryStore::new(), backend);
        rt.page().set_select_value(Field::Region, "九州");
        block_on(rt.region_changed());
        rt.page().set_select_value(Field::Prefecture, "大分県");
        rt.page().set_select_value(Field::FeedType, "eqvol");
        block_on(rt.submitted());

        let stored = StoredPreferences::load(rt.store());
        assert_eq!(stored.region.as_deref(), Some("九州"));
        assert_eq!(stored.prefecture.as_deref(), Some("大分県"));
        assert_eq!(stored.feed_type.as_deref(), Some("eqvol"));
        assert_eq!(rt.page().panel().as_deref(), Some("<p>九州</p>"));
        assert_eq!(
            rt.backend.requests().last().map(String::as_str),
            Some("/rss/eqvol?region=%E4%B9%9D%E5%B7%9E&prefecture=%E5%A4%A7%E5%88%86%E7%9C%8C")
        );
    }

    #[test]
    fn test_font_and_theme_buttons() {
        let rt = runtime(MemoryStore::new(), FakeBackend::new());
        block_on(rt.load(UrlParams::default()));
        for _ in 0..3 {
            block_on(rt.dispatch(Event::FontIncrease));
        }
        assert_eq!(rt.page().font_size().px(), 22.0);
        assert_eq!(rt.store().get(KEY_FONT_SIZE).as_deref(), Some("22"));

        block_on(rt.dispatch(Event::ThemeToggled));
        assert!(rt.page().is_dark());
        assert_eq!(rt.store().get(KEY_THEME).as_deref(), Some("dark"));
        block_on(rt.dispatch(Event::ThemeToggled));
        assert!(!rt.page().is_dark());
        assert_eq!(rt.store().get(KEY_THEME).as_deref(), Some("light"));
        assert_eq!(rt.state().display.theme, Theme::Light);
    }

    #[test]
    fn test_fragment_body_is_replaced_not_merged() {
        let store = MemoryStore::with_entries([(KEY_REGION, "Kanto"), (KEY_PREFECTURE, "Tokyo")]);
        let rt = runtime(store, FakeBackend::new().with_fragment(200, "<p>second</p>"));
        rt.page().set_panel_html("<p>first</p>");
        block_on(rt.load(UrlParams::default()));
        assert_eq!(rt.page().panel(), Some("<p>second</p>".to_string()));
    }
}
