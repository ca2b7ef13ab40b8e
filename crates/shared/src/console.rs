//! # コンソール進捗出力
//!
//! バッチが 1 件処理するごとに stdout へ出す人間向けの進捗行。
//! cron のメール出力や運用者の目視確認で使われるため、tracing のログとは分けて扱う。

use std::io::Write;

/// 進捗行の出力先
pub trait ConsoleReporter: Send + Sync {
    /// 1 行出力する（末尾の改行は実装側で付与する）
    fn line(&self, line: &str);
}

/// stdout に出力する実装
#[derive(Debug, Clone, Default)]
pub struct StdoutReporter;

impl ConsoleReporter for StdoutReporter {
    fn line(&self, line: &str) {
        // パイプが閉じられていても処理は続行する
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }
}

/// 出力行をメモリに記録するテスト用実装
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    lines: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの行を返す
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ConsoleReporter for RecordingReporter {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
