//! Topic handle shared by both topic kinds

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{debug, trace, warn};

use crate::{
    error::{BusError, Result, TopicKind},
    registry::{Publisher, Subscriber, TopicId},
    slot_ring::{Received, SlotLayout, SlotRing},
};

use super::{config::TopicConfig, stats::TopicStats};

/// Storage shared by every handle of one topic
struct TopicCore<L: SlotLayout> {
    name: String,
    ring: SlotRing<L>,
    stats: Arc<TopicStats>,
    /// Set once the registry releases the topic
    released: AtomicBool,
}

/// Cloneable handle to a topic
///
/// All clones share one ring and observe the same epoch stream. Once the
/// owning registry releases the topic, data operations return `NotFound`;
/// the storage itself is freed when the last handle drops.
pub struct Topic<L: SlotLayout> {
    core: Arc<TopicCore<L>>,
    id: TopicId,
}

impl<L: SlotLayout> Topic<L> {
    pub(crate) fn create(config: &TopicConfig, layout: L, id: TopicId) -> Result<Self> {
        config.validate()?;
        if config.kind != L::KIND {
            return Err(BusError::kind_mismatch(&config.name, L::KIND, config.kind));
        }

        let ring = SlotRing::new(config.capacity, layout)?;
        debug!(
            "Created {} topic '{}' ({} slots of {} bytes)",
            L::KIND,
            config.name,
            config.capacity,
            ring.slot_size()
        );

        Ok(Self {
            core: Arc::new(TopicCore {
                name: config.name.clone(),
                ring,
                stats: Arc::new(TopicStats::default()),
                released: AtomicBool::new(false),
            }),
            id,
        })
    }

    /// Topic name
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Registry id, `TopicId::DETACHED` for standalone topics
    pub fn id(&self) -> TopicId {
        self.id
    }

    /// Engine backing this topic
    pub fn kind(&self) -> TopicKind {
        L::KIND
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.core.ring.capacity()
    }

    /// Payload bound (byte topics) or message size (typed topics)
    pub fn payload_size(&self) -> usize {
        self.core.ring.layout().payload_capacity()
    }

    /// Bytes per slot, header included
    pub fn slot_size(&self) -> usize {
        self.core.ring.slot_size()
    }

    /// Unread entries
    pub fn len(&self) -> usize {
        self.core.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.ring.is_empty()
    }

    /// Whether the next publish overwrites an unread entry
    pub fn is_full(&self) -> bool {
        self.core.ring.is_full()
    }

    /// Latest committed epoch, 0 if never published
    pub fn latest_epoch(&self) -> u64 {
        self.core.ring.latest_epoch()
    }

    /// Shared statistics block
    pub fn stats(&self) -> Arc<TopicStats> {
        self.core.stats.clone()
    }

    /// Whether the registry has released this topic
    pub fn is_released(&self) -> bool {
        self.core.released.load(Ordering::Acquire)
    }

    pub(crate) fn mark_released(&self) {
        self.core.released.store(true, Ordering::Release);
    }

    /// Whether both handles refer to the same storage
    pub fn same_topic(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    pub(crate) fn layout(&self) -> &L {
        self.core.ring.layout()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            return Err(BusError::not_found(&self.core.name));
        }
        Ok(())
    }

    /// Publish a payload and return its epoch
    ///
    /// Never blocks on readers: a full ring drops its oldest unread entry.
    pub fn publish(&self, data: &[u8]) -> Result<u64> {
        self.ensure_live()?;

        match self.core.ring.publish(data) {
            Ok(outcome) => {
                self.core.stats.record_published();
                if outcome.overwritten > 0 {
                    self.core.stats.record_overwritten(outcome.overwritten);
                    trace!(
                        "Topic '{}' overwrote {} unread entries at epoch {}",
                        self.core.name,
                        outcome.overwritten,
                        outcome.epoch
                    );
                }
                Ok(outcome.epoch)
            }
            Err(e) => {
                self.core.stats.record_rejected();
                warn!("Publish to '{}' rejected: {}", self.core.name, e);
                Err(e)
            }
        }
    }

    /// Consume the oldest unread entry into `out`
    ///
    /// `Ok(None)` when nothing is unread. `BufferTooSmall` leaves the entry
    /// in place.
    pub fn try_receive(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.ensure_live()?;

        let received = self.core.ring.try_receive(out)?;
        if received.is_some() {
            self.core.stats.record_consumed();
        }
        Ok(received)
    }

    /// Copy the most recent entry without consuming anything
    pub fn peek_latest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.ensure_live()?;

        let received = self.core.ring.peek_latest(out)?;
        if received.is_some() {
            self.core.stats.record_peeked();
        }
        Ok(received)
    }

    /// Copy the oldest unread entry without consuming it
    pub fn peek_oldest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.ensure_live()?;

        let received = self.core.ring.peek_oldest(out)?;
        if received.is_some() {
            self.core.stats.record_peeked();
        }
        Ok(received)
    }

    /// Raw slot bytes (header and payload) holding `epoch`
    pub fn raw_slot(&self, epoch: u64) -> Result<Option<Vec<u8>>> {
        self.ensure_live()?;
        Ok(self.core.ring.raw_slot(epoch))
    }

    /// Publishing handle over this topic
    pub fn publisher(&self) -> Publisher<L> {
        Publisher::new(self.clone())
    }

    /// Subscribing handle with its own last-seen epoch
    pub fn subscriber(&self) -> Subscriber<L> {
        Subscriber::new(self.clone())
    }
}

impl<L: SlotLayout> Clone for Topic<L> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            id: self.id,
        }
    }
}

impl<L: SlotLayout> std::fmt::Debug for Topic<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.core.name)
            .field("id", &self.id)
            .field("kind", &L::KIND)
            .field("ring", &self.core.ring)
            .field("released", &self.is_released())
            .finish()
    }
}
