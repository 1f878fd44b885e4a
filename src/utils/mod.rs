//! ユーティリティモジュール

pub mod log_trace;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// encodeURIComponent がエスケープしない文字を除いた集合
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// 共通ヘルパー

/// URIコンポーネントとしてエンコード（encodeURIComponent 互換）
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// URIコンポーネントをデコード
///
/// 不正なエンコード（UTF-8として解釈できない）の場合は元の文字列をそのまま返す
pub fn decode_component(value: &str) -> String {
    percent_decode_str(value)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// クエリ文字列から指定キーの最初の値を取得 (`?a=1&b=2`)
///
/// URLSearchParams.get と同じく `+` は空白として扱う
pub fn query_param(search: &str, key: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
