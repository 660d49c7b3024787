//! Aggregates whose state only changes through recorded events.

use serde::{Serialize, de::DeserializeOwned};

/// A change already accepted by an aggregate, named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Stable name used in logs and metrics labels.
    fn event_type(&self) -> &'static str;
}

/// A consistency unit such as a service order.
///
/// Commands read the state and return events. `apply` folds one event into
/// the state; it is deterministic, infallible and free of side effects.
pub trait Aggregate: Clone + Send + Sync + Sized {
    type Id: Copy + std::fmt::Display + Send + Sync;

    type Event: DomainEvent;

    /// Rejection returned by commands.
    type Error: std::error::Error + Send + Sync;

    fn aggregate_type() -> &'static str;

    fn id(&self) -> Self::Id;

    fn apply(&mut self, event: Self::Event);

    /// Folds events in order.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum BayEvent {
        Parked { cars: i32 },
        Cleared,
    }

    impl DomainEvent for BayEvent {
        fn event_type(&self) -> &'static str {
            match self {
                BayEvent::Parked { .. } => "BayParked",
                BayEvent::Cleared => "BayCleared",
            }
        }
    }

    #[derive(Debug, Clone)]
    struct Bay {
        number: u32,
        cars: i32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("bay error")]
    struct BayError;

    impl Aggregate for Bay {
        type Id = u32;
        type Event = BayEvent;
        type Error = BayError;

        fn aggregate_type() -> &'static str {
            "Bay"
        }

        fn id(&self) -> u32 {
            self.number
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                BayEvent::Parked { cars } => self.cars += cars,
                BayEvent::Cleared => self.cars = 0,
            }
        }
    }

    #[test]
    fn test_events_fold_in_order() {
        let mut bay = Bay { number: 7, cars: 0 };
        bay.apply_events(vec![
            BayEvent::Parked { cars: 5 },
            BayEvent::Cleared,
            BayEvent::Parked { cars: 2 },
        ]);

        assert_eq!(bay.id(), 7);
        assert_eq!(bay.cars, 2);
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            BayEvent::Parked { cars: 1 }.event_type(),
            "BayParked"
        );
        assert_eq!(BayEvent::Cleared.event_type(), "BayCleared");
    }
}
