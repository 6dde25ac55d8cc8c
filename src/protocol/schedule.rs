use rand::Rng;
use std::fmt::Debug;
use std::time::Duration;

/// Source of delays between two periodic advertisements of one router.
pub trait AdvertiseSchedule: Send + Sync + Debug {
    fn next_delay(&self) -> Duration;
}

/// Uniformly random delay in `min..=max`, so that routers do not refresh
/// in lock-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformJitter {
    pub min: Duration,
    pub max: Duration,
}

impl UniformJitter {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl AdvertiseSchedule for UniformJitter {
    fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let mut rng = rand::rng();
        let millis = rng.random_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl AdvertiseSchedule for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}
