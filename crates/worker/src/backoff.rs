use std::time::Duration;

use courier_config::MinerConfig;
use tokio::time::Instant;

/// 轮询间隔与冷却参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSettings {
    /// 无连续失败时的轮询间隔
    pub base_interval: Duration,
    /// 存在连续失败时的轮询间隔
    pub failure_interval: Duration,
    /// 领到任务或服务端要求冷却后的暂停时长
    pub cooldown: Duration,
    /// 冷却期间单次等待的上限，保证 stop 能及时生效
    pub max_recheck: Duration,
    /// 连续失败计数的上限
    pub max_consecutive_failures: u32,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(10),
            failure_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
            max_recheck: Duration::from_secs(5),
            max_consecutive_failures: 3,
        }
    }
}

impl From<&MinerConfig> for BackoffSettings {
    fn from(config: &MinerConfig) -> Self {
        Self {
            base_interval: config.base_interval(),
            failure_interval: config.failure_interval(),
            cooldown: config.cooldown(),
            max_recheck: config.max_recheck(),
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

/// 两档固定退避加单槽冷却窗口。
///
/// 失败次数只在两档间隔之间做选择，上限仅用于封顶计数，不参与指数增长。
/// 任务冷却与服务端冷却共用同一个 `cooldown_until`，后登记的覆盖先登记的。
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    settings: BackoffSettings,
    consecutive_failures: u32,
    cooldown_until: Option<Instant>,
}

impl BackoffPolicy {
    pub fn new(settings: BackoffSettings) -> Self {
        Self {
            settings,
            consecutive_failures: 0,
            cooldown_until: None,
        }
    }

    pub fn next_interval(&self, failures: u32) -> Duration {
        if failures == 0 {
            self.settings.base_interval
        } else {
            self.settings.failure_interval
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.next_interval(self.consecutive_failures)
    }

    pub fn register_cooldown(&mut self, now: Instant) {
        self.cooldown_until = Some(now + self.settings.cooldown);
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        matches!(self.cooldown_until, Some(until) if now < until)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.cooldown_until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// 冷却期间下一次检查前的等待时长
    pub fn recheck_delay(&self, now: Instant) -> Duration {
        self.remaining(now).min(self.settings.max_recheck)
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures =
            (self.consecutive_failures + 1).min(self.settings.max_consecutive_failures);
        self.consecutive_failures
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BackoffPolicy {
        BackoffPolicy::new(BackoffSettings::default())
    }

    #[test]
    fn test_next_interval_two_tiers() {
        let policy = policy();
        assert_eq!(policy.next_interval(0), Duration::from_secs(10));
        for failures in [1, 2, 3, 4, 100, u32::MAX] {
            assert_eq!(policy.next_interval(failures), Duration::from_secs(30));
        }
        assert_eq!(policy.next_interval(2), policy.next_interval(2));
    }

    #[test]
    fn test_next_interval_non_decreasing() {
        let policy = policy();
        let mut previous = Duration::ZERO;
        for failures in 0..10 {
            let interval = policy.next_interval(failures);
            assert!(interval >= previous);
            previous = interval;
        }
    }

    #[test]
    fn test_cooldown_window() {
        let mut policy = policy();
        let now = Instant::now();
        assert!(!policy.is_cooling_down(now));
        assert_eq!(policy.remaining(now), Duration::ZERO);

        policy.register_cooldown(now);
        assert!(policy.is_cooling_down(now));
        assert_eq!(policy.remaining(now), Duration::from_secs(60));
        assert!(policy.is_cooling_down(now + Duration::from_secs(59)));
        assert!(!policy.is_cooling_down(now + Duration::from_secs(60)));
        assert_eq!(policy.remaining(now + Duration::from_secs(90)), Duration::ZERO);
    }

    #[test]
    fn test_recheck_delay_is_bounded() {
        let mut policy = policy();
        let now = Instant::now();
        policy.register_cooldown(now);

        assert_eq!(policy.recheck_delay(now), Duration::from_secs(5));
        assert_eq!(
            policy.recheck_delay(now + Duration::from_secs(57)),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_later_cooldown_replaces_earlier() {
        let mut policy = policy();
        let now = Instant::now();
        policy.register_cooldown(now);
        policy.register_cooldown(now + Duration::from_secs(30));

        assert_eq!(policy.remaining(now), Duration::from_secs(90));
    }

    #[test]
    fn test_failure_count_is_capped() {
        let mut policy = policy();
        assert_eq!(policy.record_failure(), 1);
        assert_eq!(policy.current_interval(), Duration::from_secs(30));
        assert_eq!(policy.record_failure(), 2);
        assert_eq!(policy.record_failure(), 3);
        assert_eq!(policy.record_failure(), 3);
        assert_eq!(policy.record_failure(), 3);

        policy.record_success();
        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.current_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_settings_from_miner_config() {
        let config = MinerConfig {
            cooldown_ms: 1_500,
            max_consecutive_failures: 7,
            ..MinerConfig::default()
        };
        let settings = BackoffSettings::from(&config);
        assert_eq!(settings.cooldown, Duration::from_millis(1_500));
        assert_eq!(settings.max_consecutive_failures, 7);
        assert_eq!(settings.base_interval, Duration::from_secs(10));
    }
}
