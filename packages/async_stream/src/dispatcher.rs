//! Rendezvous queue between pushing producers and pulling consumers.
//!
//! A [`Dispatcher`] matches every [`dispatch`](Dispatcher::dispatch) against the
//! oldest waiting [`pull`](Dispatcher::pull), or buffers the value until a pull
//! arrives. Both queues are strictly FIFO. The dispatcher ends exactly once, by
//! [`close`](Dispatcher::close) or [`fail`](Dispatcher::fail); every later
//! terminal call and every later dispatch is ignored, which makes producer
//! shutdown idempotent.
//!
//! The first pull also records demand, which the generator bridge waits for
//! before it starts running a producer.

use crate::error::{Result, SeqError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::{oneshot, Notify};

type Delivery<T> = Result<Option<T>>;

/// The permanent end state of a dispatcher, or [`Terminal::Open`] before it.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    /// Still accepting values.
    Open,
    /// Completed normally; every pull yields the completion marker.
    Closed,
    /// Failed; every pull yields this error.
    Failed(SeqError),
}

impl Terminal {
    /// Whether no terminal transition has happened yet.
    pub fn is_open(&self) -> bool {
        matches!(self, Terminal::Open)
    }
}

struct State<T> {
    waiting: VecDeque<oneshot::Sender<Delivery<T>>>,
    buffered: VecDeque<T>,
    terminal: Terminal,
    demanded: bool,
    demand: Arc<Notify>,
}

impl<T> Drop for State<T> {
    // Wakes a producer still waiting for demand so it can observe detachment.
    fn drop(&mut self) {
        self.demand.notify_one();
    }
}

/// Push/pull rendezvous queue with close and fail terminal operations.
///
/// Cloning yields another consumer-side handle onto the same queue. Producers
/// should hold an [`Emitter`] instead, so the queue goes away with its last
/// consumer.
pub struct Dispatcher<T> {
    shared: Arc<Mutex<State<T>>>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Dispatcher")
            .field("waiting", &state.waiting.len())
            .field("buffered", &state.buffered.len())
            .field("terminal", &state.terminal)
            .finish()
    }
}

impl<T> Dispatcher<T> {
    /// A fresh, open dispatcher with empty queues.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(State {
                waiting: VecDeque::new(),
                buffered: VecDeque::new(),
                terminal: Terminal::Open,
                demanded: false,
                demand: Arc::new(Notify::new()),
            })),
        }
    }

    /// Request the next value.
    ///
    /// The request is queued when `pull` is called, not when the returned
    /// future is first polled, so concurrent pulls are served in call order.
    /// Resolves to `Ok(Some(value))`, to `Ok(None)` once the dispatcher is
    /// closed and drained, or to the failure error.
    pub fn pull(&self) -> Pull<T> {
        let mut state = self.shared.lock();
        if !state.demanded {
            state.demanded = true;
            state.demand.notify_one();
        }
        if let Terminal::Failed(error) = &state.terminal {
            return Pull::ready(Err(error.clone()));
        }
        if let Some(value) = state.buffered.pop_front() {
            return Pull::ready(Ok(Some(value)));
        }
        if state.terminal == Terminal::Closed {
            return Pull::ready(Ok(None));
        }
        let (tx, rx) = oneshot::channel();
        state.waiting.push_back(tx);
        Pull::waiting(rx)
    }

    /// Deliver `value` to the oldest waiting pull, or buffer it.
    ///
    /// Ignored once the dispatcher is closed or failed.
    pub fn dispatch(&self, value: T) {
        let mut state = self.shared.lock();
        if !state.terminal.is_open() {
            log::trace!("dispatch ignored: dispatcher already terminal");
            return;
        }
        let mut value = value;
        // Pulls whose futures were dropped are skipped, never handed a value.
        while let Some(waiter) = state.waiting.pop_front() {
            match waiter.send(Ok(Some(value))) {
                Ok(()) => return,
                Err(Ok(Some(returned))) => value = returned,
                Err(_) => return,
            }
        }
        state.buffered.push_back(value);
    }

    /// Complete the dispatcher. Waiting pulls resolve with `Ok(None)` in order.
    ///
    /// Values already buffered stay available to later pulls.
    pub fn close(&self) {
        let mut state = self.shared.lock();
        if !state.terminal.is_open() {
            log::trace!("close ignored: dispatcher already terminal");
            return;
        }
        log::debug!(
            "dispatcher closed with {} buffered value(s)",
            state.buffered.len()
        );
        state.terminal = Terminal::Closed;
        for waiter in state.waiting.drain(..) {
            let _ = waiter.send(Ok(None));
        }
    }

    /// Fail the dispatcher. Buffered values are discarded and waiting pulls
    /// fail with `error` in order.
    pub fn fail(&self, error: SeqError) {
        let mut state = self.shared.lock();
        if !state.terminal.is_open() {
            log::trace!("fail ignored: dispatcher already terminal");
            return;
        }
        log::debug!(
            "dispatcher failed, discarding {} buffered value(s): {error}",
            state.buffered.len()
        );
        state.buffered.clear();
        for waiter in state.waiting.drain(..) {
            let _ = waiter.send(Err(error.clone()));
        }
        state.terminal = Terminal::Failed(error);
    }

    /// Snapshot of the terminal state.
    pub fn terminal(&self) -> Terminal {
        self.shared.lock().terminal.clone()
    }

    /// Whether the dispatcher still accepts values.
    pub fn is_open(&self) -> bool {
        self.shared.lock().terminal.is_open()
    }

    /// Number of values dispatched but not pulled yet.
    pub fn buffered_len(&self) -> usize {
        self.shared.lock().buffered.len()
    }

    /// Whether anything has pulled from this dispatcher yet.
    pub fn is_demanded(&self) -> bool {
        self.shared.lock().demanded
    }

    /// Producer-side handle onto this dispatcher.
    pub fn emitter(&self) -> Emitter<T> {
        let demand = Arc::clone(&self.shared.lock().demand);
        Emitter {
            shared: Arc::downgrade(&self.shared),
            demand,
        }
    }
}

/// Future returned by [`Dispatcher::pull`].
#[must_use = "a pull is queued until its future resolves or is dropped"]
pub struct Pull<T> {
    inner: PullInner<T>,
}

enum PullInner<T> {
    Ready(Option<Delivery<T>>),
    Waiting(oneshot::Receiver<Delivery<T>>),
}

// Values are only ever moved in and out, never pinned.
impl<T> Unpin for Pull<T> {}

impl<T> Pull<T> {
    fn ready(delivery: Delivery<T>) -> Self {
        Self {
            inner: PullInner::Ready(Some(delivery)),
        }
    }

    fn waiting(rx: oneshot::Receiver<Delivery<T>>) -> Self {
        Self {
            inner: PullInner::Waiting(rx),
        }
    }
}

impl<T> Future for Pull<T> {
    type Output = Delivery<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            PullInner::Ready(delivery) => match delivery.take() {
                Some(delivery) => Poll::Ready(delivery),
                None => Poll::Ready(Err(SeqError::Disconnected)),
            },
            PullInner::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|delivery| delivery.unwrap_or(Err(SeqError::Disconnected))),
        }
    }
}

/// Producer-side handle onto a [`Dispatcher`].
///
/// Holds the dispatcher weakly: once every consumer-side handle is dropped,
/// [`emit`](Emitter::emit) reports [`SeqError::Detached`] so the producer can
/// stop instead of buffering values nobody will read.
pub struct Emitter<T> {
    shared: Weak<Mutex<State<T>>>,
    demand: Arc<Notify>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
            demand: Arc::clone(&self.demand),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl<T> Emitter<T> {
    fn dispatcher(&self) -> Option<Dispatcher<T>> {
        self.shared.upgrade().map(|shared| Dispatcher { shared })
    }

    /// Resolve once the dispatcher has been pulled from, or once every
    /// consumer-side handle is gone.
    pub async fn demanded(&self) {
        loop {
            match self.dispatcher() {
                Some(dispatcher) if dispatcher.is_demanded() => return,
                Some(_) => {}
                None => return,
            }
            // A pull racing this check leaves a permit behind, so this
            // cannot miss it.
            self.demand.notified().await;
        }
    }

    /// Dispatch `value`, then give the scheduler a turn.
    ///
    /// The yield is the producer's suspension point: without it a producer over
    /// an always-ready source would never let its consumer run on a
    /// single-threaded runtime.
    pub async fn emit(&self, value: T) -> Result<()> {
        self.try_emit(value)?;
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Dispatch `value` without suspending.
    pub fn try_emit(&self, value: T) -> Result<()> {
        let dispatcher = self.dispatcher().ok_or(SeqError::Detached)?;
        dispatcher.dispatch(value);
        Ok(())
    }

    /// Close the underlying dispatcher, if it still exists.
    pub fn close(&self) {
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.close();
        }
    }

    /// Fail the underlying dispatcher, if it still exists.
    pub fn fail(&self, error: SeqError) {
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.fail(error);
        }
    }

    /// Whether every consumer-side handle is gone.
    pub fn is_detached(&self) -> bool {
        self.shared.strong_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::task::spawn;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_buffered_values_are_pulled_in_order() {
        init();
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(1);
        dispatcher.dispatch(2);
        assert_eq!(dispatcher.buffered_len(), 2);

        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(Some(1)));
        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(Some(2)));
        assert_pending!(spawn(dispatcher.pull()).poll());
    }

    #[test]
    fn test_waiting_pulls_are_served_in_call_order() {
        init();
        let dispatcher = Dispatcher::new();
        let mut first = spawn(dispatcher.pull());
        let mut second = spawn(dispatcher.pull());
        assert_pending!(second.poll());
        assert_pending!(first.poll());

        dispatcher.dispatch("a");
        assert!(first.is_woken());
        assert!(!second.is_woken());
        assert_ready_eq!(first.poll(), Ok(Some("a")));
        assert_pending!(second.poll());

        dispatcher.dispatch("b");
        assert_ready_eq!(second.poll(), Ok(Some("b")));
        assert_eq!(dispatcher.buffered_len(), 0);
    }

    #[test]
    fn test_close_resolves_waiters_and_repeats() {
        init();
        let dispatcher = Dispatcher::<u8>::new();
        let mut waiter = spawn(dispatcher.pull());
        assert_pending!(waiter.poll());

        dispatcher.close();
        assert!(waiter.is_woken());
        assert_ready_eq!(waiter.poll(), Ok(None));
        for _ in 0..3 {
            assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(None));
        }
        assert_eq!(dispatcher.terminal(), Terminal::Closed);
    }

    #[test]
    fn test_close_keeps_buffered_values() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(7);
        dispatcher.close();
        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(Some(7)));
        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(None));
    }

    #[test]
    fn test_fail_discards_buffer_and_sticks() {
        init();
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(1);
        dispatcher.fail(SeqError::msg("boom"));

        for _ in 0..3 {
            assert_ready_eq!(
                spawn(dispatcher.pull()).poll(),
                Err(SeqError::msg("boom"))
            );
        }
        assert_eq!(dispatcher.buffered_len(), 0);
    }

    #[test]
    fn test_fail_rejects_every_waiter() {
        let dispatcher = Dispatcher::<i32>::new();
        let mut a = spawn(dispatcher.pull());
        let mut b = spawn(dispatcher.pull());
        assert_pending!(a.poll());
        assert_pending!(b.poll());

        dispatcher.fail(SeqError::Aborted);
        assert_ready_eq!(a.poll(), Err(SeqError::Aborted));
        assert_ready_eq!(b.poll(), Err(SeqError::Aborted));
    }

    #[test]
    fn test_only_first_terminal_transition_counts() {
        let dispatcher = Dispatcher::new();
        dispatcher.close();
        dispatcher.fail(SeqError::msg("late"));
        dispatcher.close();
        dispatcher.dispatch(9);
        assert_eq!(dispatcher.terminal(), Terminal::Closed);
        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(None));

        let failed = Dispatcher::new();
        failed.fail(SeqError::msg("first"));
        failed.fail(SeqError::msg("second"));
        failed.close();
        failed.dispatch(9);
        assert_eq!(failed.terminal(), Terminal::Failed(SeqError::msg("first")));
        assert_ready_eq!(spawn(failed.pull()).poll(), Err(SeqError::msg("first")));
    }

    #[test]
    fn test_dropped_pull_does_not_lose_value() {
        let dispatcher = Dispatcher::new();
        let mut abandoned = spawn(dispatcher.pull());
        assert_pending!(abandoned.poll());
        let mut kept = spawn(dispatcher.pull());
        assert_pending!(kept.poll());
        drop(abandoned);

        dispatcher.dispatch(5);
        assert_ready_eq!(kept.poll(), Ok(Some(5)));

        let mut gone = spawn(dispatcher.pull());
        assert_pending!(gone.poll());
        drop(gone);
        dispatcher.dispatch(6);
        assert_eq!(dispatcher.buffered_len(), 1);
        assert_ready_eq!(spawn(dispatcher.pull()).poll(), Ok(Some(6)));
    }

    #[test]
    fn test_emitter_detaches_with_last_consumer() {
        let dispatcher = Dispatcher::new();
        let emitter = dispatcher.emitter();
        assert!(emitter.try_emit(1).is_ok());
        assert!(!emitter.is_detached());

        drop(dispatcher);
        assert!(emitter.is_detached());
        assert_eq!(emitter.try_emit(2), Err(SeqError::Detached));
        // Terminal calls on a detached emitter are harmless.
        emitter.close();
        emitter.fail(SeqError::Aborted);
    }

    #[test]
    fn test_demand_is_recorded_by_first_pull() {
        let dispatcher = Dispatcher::<u8>::new();
        let emitter = dispatcher.emitter();
        let mut demanded = spawn(emitter.demanded());
        assert_pending!(demanded.poll());
        assert!(!dispatcher.is_demanded());

        let _pull = dispatcher.pull();
        assert!(dispatcher.is_demanded());
        assert!(demanded.is_woken());
        assert_ready!(demanded.poll());
    }

    #[test]
    fn test_demand_wait_ends_when_consumer_drops() {
        let dispatcher = Dispatcher::<u8>::new();
        let emitter = dispatcher.emitter();
        let mut demanded = spawn(emitter.demanded());
        assert_pending!(demanded.poll());

        drop(dispatcher);
        assert_ready!(demanded.poll());
        assert!(emitter.is_detached());
    }

    #[tokio::test]
    async fn test_emit_wakes_pending_pull() {
        let dispatcher = Dispatcher::new();
        let emitter = dispatcher.emitter();
        let producer = tokio::spawn(async move {
            for i in 0..3 {
                emitter.emit(i).await?;
            }
            emitter.close();
            Ok::<_, SeqError>(())
        });

        let mut seen = Vec::new();
        while let Some(v) = dispatcher.pull().await.expect("no failure") {
            seen.push(v);
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(producer.await.expect("joined").is_ok());
    }

    #[test]
    fn test_ready_pull_reports_outcome_once() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(1u8);
        let mut pull = spawn(dispatcher.pull());
        let first = assert_ready!(pull.poll());
        assert_eq!(first, Ok(Some(1)));
    }
}
