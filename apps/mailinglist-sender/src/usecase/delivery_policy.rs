//! # 配信ポリシー
//!
//! 送信失敗時の振る舞いとリトライ間隔を決める。
//!
//! - `abort`: 1 回だけ送信し、失敗したらエントリを送信中のまま残して処理を中断する
//! - `mark_failed`: exponential backoff で `max_attempts` 回まで送信し、
//!   すべて失敗したらエントリを失敗にして次へ進む

use std::time::Duration;

/// 送信失敗時の動作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureAction {
    /// 処理を中断する（エントリは送信中のまま）
    #[default]
    Abort,
    /// エントリを失敗にして処理を続ける
    MarkFailed,
}

/// 配信ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub on_failure:      FailureAction,
    /// `mark_failed` 時の最大送信回数
    pub max_attempts:    u32,
    pub initial_backoff: Duration,
    pub max_backoff:     Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            on_failure:      FailureAction::Abort,
            max_attempts:    3,
            initial_backoff: Duration::from_millis(100),
            max_backoff:     Duration::from_millis(5_000),
        }
    }
}

impl DeliveryPolicy {
    /// 1 エントリあたりの送信回数の上限
    pub fn attempts_per_entry(&self) -> u32 {
        match self.on_failure {
            FailureAction::Abort => 1,
            FailureAction::MarkFailed => self.max_attempts.max(1),
        }
    }

    /// `retry` 回目（0 始まり）のリトライ前に待つ時間
    pub fn backoff(&self, retry: u32) -> Duration {
        let backoff = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(retry));
        backoff.min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 100)]
    #[case(1, 200)]
    #[case(4, 1_600)]
    #[case(10, 5_000)]
    #[case(40, 5_000)]
    fn backoffは倍々に増えて上限を超えない(#[case] retry: u32, #[case] expected_ms: u64) {
        let policy = DeliveryPolicy::default();

        assert_eq!(policy.backoff(retry), Duration::from_millis(expected_ms));
    }

    #[test]
    fn abortでは1回しか送信しない() {
        let policy = DeliveryPolicy {
            max_attempts: 5,
            ..DeliveryPolicy::default()
        };

        assert_eq!(policy.attempts_per_entry(), 1);
    }

    #[rstest]
    #[case(3, 3)]
    #[case(0, 1)]
    fn mark_failedでは最大送信回数まで送信する(#[case] max_attempts: u32, #[case] expected: u32) {
        let policy = DeliveryPolicy {
            on_failure: FailureAction::MarkFailed,
            max_attempts,
            ..DeliveryPolicy::default()
        };

        assert_eq!(policy.attempts_per_entry(), expected);
    }

    #[rstest]
    #[case("abort", FailureAction::Abort)]
    #[case("mark_failed", FailureAction::MarkFailed)]
    fn failure_actionの文字列変換(#[case] s: &str, #[case] expected: FailureAction) {
        assert_eq!(s.parse::<FailureAction>().unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }
}
