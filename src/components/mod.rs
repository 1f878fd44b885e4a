//! UIコンポーネントモジュール

pub mod feed_shell;

pub use feed_shell::FeedShell;
