//! Name-keyed topic registry

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::{debug, warn};

use crate::{
    error::{BusError, Result, TopicKind},
    slot_ring::{ByteLayout, SlotLayout, TypedLayout},
    topic::{ByteTopic, Topic, TopicConfig, TypedTopic},
};

use super::{config::RegistryConfig, id::TopicId, stats::RegistryStats};

/// A registered topic of either kind
#[derive(Debug, Clone)]
pub enum AnyTopic {
    Byte(ByteTopic),
    Typed(TypedTopic),
}

impl AnyTopic {
    pub fn name(&self) -> &str {
        match self {
            AnyTopic::Byte(t) => t.name(),
            AnyTopic::Typed(t) => t.name(),
        }
    }

    pub fn id(&self) -> TopicId {
        match self {
            AnyTopic::Byte(t) => t.id(),
            AnyTopic::Typed(t) => t.id(),
        }
    }

    pub fn kind(&self) -> TopicKind {
        match self {
            AnyTopic::Byte(_) => TopicKind::Byte,
            AnyTopic::Typed(_) => TopicKind::Typed,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            AnyTopic::Byte(t) => t.capacity(),
            AnyTopic::Typed(t) => t.capacity(),
        }
    }

    /// Payload bound (byte) or message size (typed)
    pub fn payload_size(&self) -> usize {
        match self {
            AnyTopic::Byte(t) => t.payload_size(),
            AnyTopic::Typed(t) => t.payload_size(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyTopic::Byte(t) => t.len(),
            AnyTopic::Typed(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest_epoch(&self) -> u64 {
        match self {
            AnyTopic::Byte(t) => t.latest_epoch(),
            AnyTopic::Typed(t) => t.latest_epoch(),
        }
    }

    pub fn as_byte(&self) -> Option<&ByteTopic> {
        match self {
            AnyTopic::Byte(t) => Some(t),
            AnyTopic::Typed(_) => None,
        }
    }

    pub fn as_typed(&self) -> Option<&TypedTopic> {
        match self {
            AnyTopic::Typed(t) => Some(t),
            AnyTopic::Byte(_) => None,
        }
    }

    /// Summary of this topic's parameters and state
    pub fn info(&self) -> TopicInfo {
        TopicInfo {
            id: self.id(),
            name: self.name().to_string(),
            kind: self.kind(),
            capacity: self.capacity(),
            payload_size: self.payload_size(),
            len: self.len(),
            latest_epoch: self.latest_epoch(),
        }
    }

    fn mark_released(&self) {
        match self {
            AnyTopic::Byte(t) => t.mark_released(),
            AnyTopic::Typed(t) => t.mark_released(),
        }
    }
}

/// Snapshot describing one registered topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    pub id: TopicId,
    pub name: String,
    pub kind: TopicKind,
    pub capacity: usize,
    pub payload_size: usize,
    pub len: usize,
    pub latest_epoch: u64,
}

/// Per-kind glue between the registry tables and typed topic handles
trait RegistryLayout: SlotLayout {
    fn create(config: &TopicConfig, id: TopicId) -> Result<Topic<Self>>;
    fn wrap(topic: Topic<Self>) -> AnyTopic;
    fn unwrap(entry: &AnyTopic) -> Option<&Topic<Self>>;
}

impl RegistryLayout for ByteLayout {
    fn create(config: &TopicConfig, id: TopicId) -> Result<ByteTopic> {
        ByteTopic::from_config(config, id)
    }

    fn wrap(topic: ByteTopic) -> AnyTopic {
        AnyTopic::Byte(topic)
    }

    fn unwrap(entry: &AnyTopic) -> Option<&ByteTopic> {
        entry.as_byte()
    }
}

impl RegistryLayout for TypedLayout {
    fn create(config: &TopicConfig, id: TopicId) -> Result<TypedTopic> {
        TypedTopic::from_config(config, id)
    }

    fn wrap(topic: TypedTopic) -> AnyTopic {
        AnyTopic::Typed(topic)
    }

    fn unwrap(entry: &AnyTopic) -> Option<&TypedTopic> {
        entry.as_typed()
    }
}

#[derive(Debug)]
struct SlabSlot {
    generation: u32,
    entry: Option<AnyTopic>,
}

/// Name table plus slab, guarded together
#[derive(Debug, Default)]
struct Tables {
    names: HashMap<String, TopicId>,
    slots: Vec<SlabSlot>,
    free: Vec<u32>,
}

impl Tables {
    fn entry(&self, id: TopicId) -> Option<&AnyTopic> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    fn by_name(&self, name: &str) -> Option<&AnyTopic> {
        self.names.get(name).and_then(|id| self.entry(*id))
    }

    /// Id the next insert will use
    fn next_id(&self) -> Result<TopicId> {
        if let Some(&index) = self.free.last() {
            return Ok(TopicId::new(index, self.slots[index as usize].generation));
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|index| *index != u32::MAX)
            .ok_or_else(|| BusError::allocation("Topic slab exhausted"))?;
        Ok(TopicId::new(index, 1))
    }

    fn insert(&mut self, id: TopicId, entry: AnyTopic) {
        let index = id.index() as usize;
        if self.free.last() == Some(&id.index()) {
            self.free.pop();
        } else {
            debug_assert_eq!(index, self.slots.len());
            self.slots.push(SlabSlot {
                generation: id.generation(),
                entry: None,
            });
        }

        self.names.insert(entry.name().to_string(), id);
        self.slots[index].entry = Some(entry);
    }

    fn remove(&mut self, id: TopicId) -> Option<AnyTopic> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let entry = slot.entry.take()?;

        // Generation 0 is reserved for detached ids
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(id.index());
        self.names.remove(entry.name());
        Some(entry)
    }

    fn drain(&mut self) -> Vec<AnyTopic> {
        self.names.clear();
        self.free.clear();
        self.slots
            .drain(..)
            .filter_map(|slot| slot.entry)
            .collect()
    }
}

/// Owner and factory of named topics
///
/// Topics are created lazily on first lookup; concurrent callers for the same
/// unseen name all receive the one topic created by the winner. Lookups with
/// parameters that disagree with the existing topic are refused rather than
/// coerced.
#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    tables: RwLock<Tables>,
    stats: RegistryStats,
}

impl Registry {
    /// Create an empty registry with default settings
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
            tables: RwLock::new(Tables::default()),
            stats: RegistryStats::new(),
        }
    }

    /// Create an empty registry with custom settings
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tables: RwLock::new(Tables::default()),
            stats: RegistryStats::new(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create a byte topic with the registry's default payload bound
    ///
    /// An existing byte topic is returned whatever its payload bound.
    pub fn get_or_create_byte_topic(&self, name: &str, capacity: usize) -> Result<ByteTopic> {
        let config = TopicConfig::byte(name, capacity).with_payload_size(self.config.byte_max_payload);
        self.get_or_create::<ByteLayout>(config, false)
    }

    /// Get or create a byte topic with an explicit payload bound
    pub fn get_or_create_byte_topic_with_max_payload(
        &self,
        name: &str,
        capacity: usize,
        max_payload: usize,
    ) -> Result<ByteTopic> {
        let config = TopicConfig::byte(name, capacity).with_payload_size(max_payload);
        self.get_or_create::<ByteLayout>(config, true)
    }

    /// Get or create a typed topic carrying `msg_size`-byte messages
    pub fn get_or_create_typed_topic(
        &self,
        name: &str,
        capacity: usize,
        msg_size: usize,
    ) -> Result<TypedTopic> {
        let config = TopicConfig::typed(name, capacity, msg_size);
        self.get_or_create::<TypedLayout>(config, true)
    }

    fn get_or_create<L: RegistryLayout>(
        &self,
        config: TopicConfig,
        check_payload: bool,
    ) -> Result<Topic<L>> {
        config.validate()?;
        self.stats.record_lookup();

        {
            let tables = self.read_tables();
            if let Some(existing) = tables.by_name(&config.name) {
                return self.check_existing::<L>(existing, &config, check_payload);
            }
        }

        let mut tables = self.write_tables();

        // Another thread may have created it between the two locks
        if let Some(existing) = tables.by_name(&config.name) {
            return self.check_existing::<L>(existing, &config, check_payload);
        }

        if tables.names.len() >= self.config.max_topics {
            warn!(
                "Registry full ({} topics), cannot create '{}'",
                self.config.max_topics, config.name
            );
            return Err(BusError::allocation(format!(
                "Registry limit of {} topics reached",
                self.config.max_topics
            )));
        }

        let id = tables.next_id()?;
        let topic = L::create(&config, id)?;
        tables.insert(id, L::wrap(topic.clone()));
        self.stats.record_created();

        debug!("Registered {} topic '{}' as {}", L::KIND, config.name, id);
        Ok(topic)
    }

    fn check_existing<L: RegistryLayout>(
        &self,
        existing: &AnyTopic,
        config: &TopicConfig,
        check_payload: bool,
    ) -> Result<Topic<L>> {
        let result = match L::unwrap(existing) {
            None => Err(BusError::kind_mismatch(&config.name, existing.kind(), L::KIND)),
            Some(topic) if topic.capacity() != config.capacity => Err(BusError::capacity_mismatch(
                &config.name,
                topic.capacity(),
                config.capacity,
            )),
            Some(topic) if check_payload && topic.payload_size() != config.payload_size => Err(
                BusError::size_mismatch(topic.payload_size(), config.payload_size),
            ),
            Some(topic) => Ok(topic.clone()),
        };

        if let Err(e) = &result {
            self.stats.record_mismatch();
            warn!("Lookup of '{}' refused: {}", config.name, e);
        }
        result
    }

    /// Existing byte topic by name
    pub fn lookup_byte_topic(&self, name: &str) -> Result<ByteTopic> {
        self.lookup::<ByteLayout>(name)
    }

    /// Existing typed topic by name
    pub fn lookup_typed_topic(&self, name: &str) -> Result<TypedTopic> {
        self.lookup::<TypedLayout>(name)
    }

    fn lookup<L: RegistryLayout>(&self, name: &str) -> Result<Topic<L>> {
        self.stats.record_lookup();
        let tables = self.read_tables();
        let existing = tables.by_name(name).ok_or_else(|| BusError::not_found(name))?;
        L::unwrap(existing).cloned().ok_or_else(|| {
            self.stats.record_mismatch();
            BusError::kind_mismatch(name, existing.kind(), L::KIND)
        })
    }

    /// Topic registered under `id`, if the id is still current
    pub fn resolve(&self, id: TopicId) -> Result<AnyTopic> {
        self.read_tables()
            .entry(id)
            .cloned()
            .ok_or_else(|| BusError::not_found(id.to_string()))
    }

    pub fn resolve_byte_topic(&self, id: TopicId) -> Result<ByteTopic> {
        self.resolve_as::<ByteLayout>(id)
    }

    pub fn resolve_typed_topic(&self, id: TopicId) -> Result<TypedTopic> {
        self.resolve_as::<TypedLayout>(id)
    }

    fn resolve_as<L: RegistryLayout>(&self, id: TopicId) -> Result<Topic<L>> {
        let tables = self.read_tables();
        let existing = tables
            .entry(id)
            .ok_or_else(|| BusError::not_found(id.to_string()))?;
        L::unwrap(existing)
            .cloned()
            .ok_or_else(|| BusError::kind_mismatch(existing.name(), existing.kind(), L::KIND))
    }

    /// Remove a topic; outstanding handles fail with `NotFound` afterwards
    pub fn release(&self, id: TopicId) -> Result<()> {
        let entry = self
            .write_tables()
            .remove(id)
            .ok_or_else(|| BusError::not_found(id.to_string()))?;

        entry.mark_released();
        self.stats.record_released();
        debug!("Released {} topic '{}' ({})", entry.kind(), entry.name(), id);
        Ok(())
    }

    /// Remove a topic by name
    pub fn release_by_name(&self, name: &str) -> Result<()> {
        let entry = {
            let mut tables = self.write_tables();
            let id = *tables.names.get(name).ok_or_else(|| BusError::not_found(name))?;
            tables.remove(id).ok_or_else(|| BusError::not_found(name))?
        };

        entry.mark_released();
        self.stats.record_released();
        debug!("Released {} topic '{}' ({})", entry.kind(), entry.name(), entry.id());
        Ok(())
    }

    /// Release every topic and drop the registry
    pub fn destroy(self) {
        drop(self);
    }

    /// Number of live topics
    pub fn topic_count(&self) -> usize {
        self.read_tables().names.len()
    }

    /// Check if a topic exists
    pub fn has_topic(&self, name: &str) -> bool {
        self.read_tables().names.contains_key(name)
    }

    /// All live topics, sorted by name
    pub fn list_topics(&self) -> Vec<TopicInfo> {
        let tables = self.read_tables();
        let mut infos: Vec<TopicInfo> = tables
            .slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .map(AnyTopic::info)
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Get registry statistics
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let entries = self
            .tables
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .drain();

        for entry in &entries {
            entry.mark_released();
            self.stats.record_released();
        }
        if !entries.is_empty() {
            debug!("Registry dropped, released {} topics", entries.len());
        }
    }
}
