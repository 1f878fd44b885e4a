//! バックエンド連携（都道府県リスト・フィード断片）

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request作成失敗: {0}")]
    Request(String),
    #[error("fetch失敗: {0}")]
    Transport(String),
    #[error("APIエラー: {0}")]
    Status(u16),
    #[error("レスポンス解析失敗: {0}")]
    Decode(String),
}

/// HTTP応答（ステータスと本文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub status: u16,
    pub body: String,
}

impl Fragment {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// バックエンドの取得処理
///
/// 都道府県リストは非2xxも `Err` にする。フィード断片は応答があれば `Ok` で返し、
/// ステータスの判断は呼び出し側に任せる。
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn fetch_prefectures(&self, url: &str) -> Result<Vec<String>, FetchError>;
    async fn fetch_fragment(&self, url: &str) -> Result<Fragment, FetchError>;
}

/// `window.fetch` による実装（同一オリジンの資格情報付き）
#[derive(Default)]
pub struct HttpBackend;

impl HttpBackend {
    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_credentials(RequestCredentials::SameOrigin);

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| FetchError::Request(format!("{:?}", e)))?;

        let window = web_sys::window().ok_or_else(|| FetchError::Transport("windowがありません".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| FetchError::Transport(format!("{:?}", e)))?;

        resp_value
            .dyn_into::<Response>()
            .map_err(|_| FetchError::Decode("Responseへの変換失敗".to_string()))
    }
}

impl Backend for HttpBackend {
    async fn fetch_prefectures(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let resp = self.get(url).await?;
        if !resp.ok() {
            return Err(FetchError::Status(resp.status()));
        }

        let json = JsFuture::from(resp.json().map_err(|e| FetchError::Decode(format!("json()失敗: {:?}", e)))?)
            .await
            .map_err(|e| FetchError::Decode(format!("JSON取得失敗: {:?}", e)))?;

        serde_wasm_bindgen::from_value(json).map_err(|e| FetchError::Decode(format!("JSONパース失敗: {:?}", e)))
    }

    async fn fetch_fragment(&self, url: &str) -> Result<Fragment, FetchError> {
        let resp = self.get(url).await?;
        let status = resp.status();
        if !resp.ok() {
            return Ok(Fragment { status, body: String::new() });
        }

        let text = JsFuture::from(resp.text().map_err(|e| FetchError::Transport(format!("text()失敗: {:?}", e)))?)
            .await
            .map_err(|e| FetchError::Transport(format!("本文取得失敗: {:?}", e)))?;

        Ok(Fragment { status, body: text.as_string().unwrap_or_default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_success_range() {
        assert!(Fragment { status: 200, body: String::new() }.is_success());
        assert!(Fragment { status: 204, body: String::new() }.is_success());
        assert!(!Fragment { status: 304, body: String::new() }.is_success());
        assert!(!Fragment { status: 500, body: String::new() }.is_success());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status(503).to_string(), "APIエラー: 503");
        assert_eq!(FetchError::Transport("offline".to_string()).to_string(), "fetch失敗: offline");
    }
}
