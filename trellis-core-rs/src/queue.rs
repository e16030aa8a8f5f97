//! Single-producer single-consumer event queue.
//!
//! Connects the key producers (the wired scanner running in interrupt
//! context) to the cooperative consumer loop. Slots hold packed 16-bit
//! events (see [`ButtonEvent::to_packed`](crate::ButtonEvent::to_packed)).
//!
//! The ring itself is a [`heapless::spsc::Queue`]. [`EventQueue::split`]
//! hands out exactly one [`EventProducer`] and one [`EventConsumer`], so the
//! single-producer/single-consumer discipline is enforced by ownership:
//!
//! - `push` never blocks and never overwrites: a full queue drops the new
//!   event.
//! - `pop` waits, re-checking every [`POP_POLL_INTERVAL`], until an event is
//!   available.

use embassy_time::{Duration, Timer};
use heapless::spsc::{Consumer, Producer, Queue};

/// Slot count of the instrument's event queue.
pub const EVENT_QUEUE_SLOTS: usize = 32;

/// How often a waiting [`EventConsumer::pop`] re-checks for new events.
pub const POP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fixed-capacity ring of packed 16-bit events.
///
/// The usable capacity is `N - 1`: one slot stays empty to tell "full"
/// from "empty".
pub struct EventQueue<const N: usize = EVENT_QUEUE_SLOTS> {
    ring: Queue<u16, N>,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue. Usable in `static` initialisers.
    pub const fn new() -> Self {
        Self { ring: Queue::new() }
    }

    /// Number of events the queue can hold at once.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Split into the producer end (for the scanner) and the consumer end
    /// (for the consumer loop).
    pub fn split(&mut self) -> (EventProducer<'_, N>, EventConsumer<'_, N>) {
        let (producer, consumer) = self.ring.split();
        (EventProducer { producer }, EventConsumer { consumer })
    }
}

/// Write end of an [`EventQueue`]. Safe to use from interrupt context.
pub struct EventProducer<'a, const N: usize = EVENT_QUEUE_SLOTS> {
    producer: Producer<'a, u16, N>,
}

impl<const N: usize> EventProducer<'_, N> {
    /// Enqueue an event.
    ///
    /// Returns `false` and leaves the queue untouched when it is full.
    pub fn push(&mut self, value: u16) -> bool {
        self.producer.enqueue(value).is_ok()
    }

    /// `true` when the next [`push`](Self::push) would be dropped.
    pub fn is_full(&self) -> bool {
        !self.producer.ready()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.producer.len()
    }
}

/// Read end of an [`EventQueue`].
pub struct EventConsumer<'a, const N: usize = EVENT_QUEUE_SLOTS> {
    consumer: Consumer<'a, u16, N>,
}

impl<const N: usize> EventConsumer<'_, N> {
    /// Dequeue the oldest event without waiting.
    pub fn try_pop(&mut self) -> Option<u16> {
        self.consumer.dequeue()
    }

    /// Dequeue the oldest event, waiting until one is available.
    pub async fn pop(&mut self) -> u16 {
        loop {
            if let Some(value) = self.consumer.dequeue() {
                return value;
            }
            Timer::after(POP_POLL_INTERVAL).await;
        }
    }

    /// `true` when no events are queued.
    pub fn is_empty(&self) -> bool {
        !self.consumer.ready()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.consumer.len()
    }
}
