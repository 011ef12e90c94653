use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use core::fmt::{Display, Formatter};
use core::str::FromStr;

use tracing::instrument;

use crate::backoff::Backoff;
use crate::err::{Error, ParseStrategyError};
use crate::strategy::atomic::{
    CasOptions, CasSelector, ExchangeSelector, FetchUpdateSelector, LoadOrdering, StoreOrdering,
    UpdatePrimitive,
};
use crate::strategy::unsync::{FirstSelector, UnsynchronizedSelector};
use crate::Selector;

pub(crate) mod atomic;
#[cfg(feature = "std")]
pub(crate) mod locked;
#[cfg(feature = "std")]
pub(crate) mod semaphore;
pub(crate) mod unsync;

/// Every selector implementation, keyed by name so that one can be picked at runtime.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// [FirstSelector]
    First,
    /// [UnsynchronizedSelector]
    Unsynchronized,
    /// [crate::MutexSelector]
    #[cfg(feature = "std")]
    Mutex,
    /// [crate::MutexMethodSelector]
    #[cfg(feature = "std")]
    MutexMethod,
    /// [crate::ParkingLotSelector]
    #[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
    ParkingLot,
    /// [crate::SemaphoreSelector]
    #[cfg(feature = "std")]
    Semaphore,
    /// [CasSelector] with [UpdatePrimitive::CompareAndSet]
    CompareAndSet,
    /// [CasSelector] with [UpdatePrimitive::CompareAndExchange]
    CompareAndExchange,
    /// [CasSelector] with [UpdatePrimitive::WeakCompareAndSet] and relaxed orderings
    WeakCasPlain,
    /// [CasSelector] with [UpdatePrimitive::WeakCompareAndSet], acquire loads and release stores
    WeakCasReleaseAcquire,
    /// [FetchUpdateSelector]
    FetchUpdate,
    /// [ExchangeSelector]
    Exchange,
}

impl Strategy {
    /// Every strategy available in this build.
    #[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
    pub const ALL: &'static [Strategy] = &[
        Strategy::First,
        Strategy::Unsynchronized,
        Strategy::Mutex,
        Strategy::MutexMethod,
        Strategy::ParkingLot,
        Strategy::Semaphore,
        Strategy::CompareAndSet,
        Strategy::CompareAndExchange,
        Strategy::WeakCasPlain,
        Strategy::WeakCasReleaseAcquire,
        Strategy::FetchUpdate,
        Strategy::Exchange,
    ];

    /// Every strategy available in this build.
    #[cfg(all(feature = "std", any(loom, feature = "shuttle")))]
    pub const ALL: &'static [Strategy] = &[
        Strategy::First,
        Strategy::Unsynchronized,
        Strategy::Mutex,
        Strategy::MutexMethod,
        Strategy::Semaphore,
        Strategy::CompareAndSet,
        Strategy::CompareAndExchange,
        Strategy::WeakCasPlain,
        Strategy::WeakCasReleaseAcquire,
        Strategy::FetchUpdate,
        Strategy::Exchange,
    ];

    /// Every strategy available in this build.
    #[cfg(not(feature = "std"))]
    pub const ALL: &'static [Strategy] = &[
        Strategy::First,
        Strategy::Unsynchronized,
        Strategy::CompareAndSet,
        Strategy::CompareAndExchange,
        Strategy::WeakCasPlain,
        Strategy::WeakCasReleaseAcquire,
        Strategy::FetchUpdate,
        Strategy::Exchange,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::First => "first",
            Strategy::Unsynchronized => "unsynchronized",
            #[cfg(feature = "std")]
            Strategy::Mutex => "mutex",
            #[cfg(feature = "std")]
            Strategy::MutexMethod => "mutex-method",
            #[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
            Strategy::ParkingLot => "parking-lot",
            #[cfg(feature = "std")]
            Strategy::Semaphore => "semaphore",
            Strategy::CompareAndSet => "compare-and-set",
            Strategy::CompareAndExchange => "compare-and-exchange",
            Strategy::WeakCasPlain => "weak-cas-plain",
            Strategy::WeakCasReleaseAcquire => "weak-cas-release-acquire",
            Strategy::FetchUpdate => "fetch-update",
            Strategy::Exchange => "exchange",
        }
    }

    /// Whether the strategy guarantees every element is returned equally often under concurrent
    /// use. The two baselines do not.
    pub fn is_fair(&self) -> bool {
        !matches!(self, Strategy::First | Strategy::Unsynchronized)
    }

    /// Construct a selector of this strategy over a copy of `elements`.
    #[instrument(level = "debug", skip(elements), fields(len = elements.len()))]
    pub fn build<T>(self, elements: &[T]) -> Result<Box<dyn Selector<T>>, Error>
    where
        T: Clone + Send + Sync + 'static,
    {
        let selector: Box<dyn Selector<T>> = match self {
            Strategy::First => Box::new(FirstSelector::new(elements)?),
            Strategy::Unsynchronized => Box::new(UnsynchronizedSelector::new(elements)?),
            #[cfg(feature = "std")]
            Strategy::Mutex => Box::new(locked::MutexSelector::new(elements)?),
            #[cfg(feature = "std")]
            Strategy::MutexMethod => Box::new(locked::MutexMethodSelector::new(elements)?),
            #[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
            Strategy::ParkingLot => Box::new(locked::ParkingLotSelector::new(elements)?),
            #[cfg(feature = "std")]
            Strategy::Semaphore => Box::new(semaphore::SemaphoreSelector::new(elements)?),
            Strategy::CompareAndSet => Box::new(CasSelector::with_options(
                elements,
                CasOptions::default().with_update(UpdatePrimitive::CompareAndSet),
            )?),
            Strategy::CompareAndExchange => Box::new(CasSelector::with_options(
                elements,
                CasOptions::default().with_update(UpdatePrimitive::CompareAndExchange),
            )?),
            Strategy::WeakCasPlain => Box::new(CasSelector::with_options(
                elements,
                CasOptions::default()
                    .with_update(UpdatePrimitive::WeakCompareAndSet)
                    .with_orderings(LoadOrdering::Plain, StoreOrdering::Plain),
            )?),
            Strategy::WeakCasReleaseAcquire => Box::new(CasSelector::with_options(
                elements,
                CasOptions::default()
                    .with_update(UpdatePrimitive::WeakCompareAndSet)
                    .with_orderings(LoadOrdering::Acquire, StoreOrdering::Release),
            )?),
            Strategy::FetchUpdate => Box::new(FetchUpdateSelector::new(elements)?),
            Strategy::Exchange => {
                Box::new(ExchangeSelector::with_backoff(elements, Backoff::SpinHint)?)
            }
        };
        Ok(selector)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(name: &str) -> Result<Self, ParseStrategyError> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| ParseStrategyError(name.to_owned()))
    }
}

#[cfg(all(test, feature = "std", not(feature = "shuttle"), not(loom)))]
mod tests {
    use super::Strategy;
    use crate::err::{Error, ParseStrategyError};
    use crate::Selector;
    use test_log::test;

    #[test]
    fn test_every_name_parses_back_to_its_strategy() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>(), Ok(*strategy));
            assert_eq!(strategy.to_string(), strategy.name());
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert_eq!(
            "round-robin".parse::<Strategy>(),
            Err(ParseStrategyError("round-robin".to_owned()))
        );
    }

    #[test]
    fn test_unknown_name_message() {
        let error: ParseStrategyError = "round-robin".parse::<Strategy>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "No selector strategy is registered under the name `round-robin`."
        );
    }

    #[test]
    fn test_only_baselines_are_unfair() {
        let unfair: Vec<Strategy> = Strategy::ALL
            .iter()
            .copied()
            .filter(|strategy| !strategy.is_fair())
            .collect();
        assert_eq!(unfair, [Strategy::First, Strategy::Unsynchronized]);
    }

    #[test]
    fn test_factory_rejects_empty_pool_for_every_strategy() {
        let empty: [String; 0] = [];
        for strategy in Strategy::ALL {
            assert_eq!(strategy.build(&empty).err(), Some(Error::EmptyPool), "{strategy}");
        }
    }

    #[test]
    fn test_two_element_pool_alternates() {
        for strategy in Strategy::ALL.iter().filter(|strategy| strategy.is_fair()) {
            let selector: Box<dyn Selector<&str>> = strategy.build(&["A", "B"]).unwrap();
            let calls: [&str; 4] = core::array::from_fn(|_| *selector.next());
            assert_eq!(calls.iter().filter(|call| **call == "A").count(), 2, "{strategy}");
            assert_eq!(calls.iter().filter(|call| **call == "B").count(), 2, "{strategy}");
            assert!(calls.windows(2).all(|pair| pair[0] != pair[1]), "{strategy}");
        }
    }
}
