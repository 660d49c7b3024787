//! Running commands against aggregates without mutating the input.

use crate::aggregate::Aggregate;

/// Outcome of an accepted command.
#[derive(Debug, Clone)]
pub struct CommandResult<A: Aggregate> {
    /// State after the events were folded in.
    pub aggregate: A,

    pub events: Vec<A::Event>,
}

impl<A: Aggregate> CommandResult<A> {
    /// True when the command was accepted but changed nothing.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// A request addressed to one aggregate instance.
pub trait Command: Send + Sync {
    type Aggregate: Aggregate;

    fn aggregate_id(&self) -> <Self::Aggregate as Aggregate>::Id;
}

/// Runs a command against a copy of `aggregate`.
///
/// The command function sees the current state and returns the events to
/// apply, or an error. The input is never mutated: on success the events are
/// applied to a clone, on failure nothing changes.
pub fn execute<A, F>(aggregate: &A, command_fn: F) -> Result<CommandResult<A>, A::Error>
where
    A: Aggregate,
    F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
{
    let events = command_fn(aggregate)?;

    let mut next = aggregate.clone();
    for event in &events {
        next.apply(event.clone());
    }

    Ok(CommandResult {
        aggregate: next,
        events,
    })
}
