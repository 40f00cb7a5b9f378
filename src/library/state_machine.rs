use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Runs an Elm-style program: every event goes through `transition_fn`, the
/// new state is rendered, then the returned effects are handed to
/// `run_effect_fn`. The thread calling [`StateMachine::run`] owns rendering,
/// so effects that block must move their work to another thread and report
/// back through the sender they receive.
pub struct StateMachine<TState, TEvent, TEffect, T, R, E, D>
where
    T: Fn(TState, TEvent) -> (TState, Vec<TEffect>) + Send + Sync,
    R: Fn(&TState) + Send + Sync,
    E: Fn(TEffect, Sender<TEvent>) + Send + Sync,
    D: Fn(&TState) -> bool + Send + Sync,
{
    pub transition_fn: Arc<T>,
    pub render_fn: Arc<R>,
    pub run_effect_fn: Arc<E>,
    pub is_done_fn: Arc<D>,
    event_sender: Sender<TEvent>,
    event_receiver: Mutex<Receiver<TEvent>>,
    _state: std::marker::PhantomData<fn() -> (TState, TEffect)>,
}

impl<TState, TEvent, TEffect, T, R, E, D> StateMachine<TState, TEvent, TEffect, T, R, E, D>
where
    TEvent: Send + 'static,
    T: Fn(TState, TEvent) -> (TState, Vec<TEffect>) + Send + Sync,
    R: Fn(&TState) + Send + Sync,
    E: Fn(TEffect, Sender<TEvent>) + Send + Sync,
    D: Fn(&TState) -> bool + Send + Sync,
{
    pub fn new(transition_fn: T, render_fn: R, run_effect_fn: E, is_done_fn: D) -> Self {
        let (event_sender, event_receiver) = channel();

        Self {
            transition_fn: Arc::new(transition_fn),
            render_fn: Arc::new(render_fn),
            run_effect_fn: Arc::new(run_effect_fn),
            is_done_fn: Arc::new(is_done_fn),
            event_sender,
            event_receiver: Mutex::new(event_receiver),
            _state: std::marker::PhantomData,
        }
    }

    /// Sender for events coming from outside the loop (user input, devices).
    pub fn event_sender(&self) -> Sender<TEvent> {
        self.event_sender.clone()
    }

    pub fn run(
        &self,
        init: (TState, Vec<TEffect>),
    ) -> Result<TState, Box<dyn std::error::Error + Send + Sync>> {
        let event_receiver = self
            .event_receiver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (mut state, effects) = init;

        (self.render_fn)(&state);
        self.run_effects(effects);

        while !(self.is_done_fn)(&state) {
            let event = event_receiver.recv()?;
            let (new_state, effects) = (self.transition_fn)(state, event);
            state = new_state;

            (self.render_fn)(&state);
            self.run_effects(effects);
        }

        Ok(state)
    }

    fn run_effects(&self, effects: Vec<TEffect>) {
        for effect in effects {
            (self.run_effect_fn)(effect, self.event_sender.clone());
        }
    }
}
