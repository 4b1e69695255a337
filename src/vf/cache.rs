use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    error::{VfError, VfResult},
    tfm::MetricIdentity,
};

use super::packet::PacketTable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PacketCacheKey {
    pub font_path: PathBuf,
    pub metric: MetricIdentity,
    /// Byte offset of the first character packet in the VF file
    pub offset: u64,
}

/// Supplies the parsed character packets of a virtual font
pub trait CharPacketSource {
    fn get(&self, key: &PacketCacheKey) -> VfResult<Arc<PacketTable>>;
}

/// Packet tables shared between faces of the same virtual font
///
/// Tables are loaded at most once per key; loading happens while the cache
/// is locked.
#[derive(Debug, Default)]
pub struct PacketCache {
    tables: Mutex<HashMap<PacketCacheKey, Arc<PacketTable>>>,
}

impl PacketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &self,
        key: &PacketCacheKey,
        load: impl FnOnce(&PacketCacheKey) -> VfResult<PacketTable>,
    ) -> VfResult<Arc<PacketTable>> {
        let mut tables = self.tables.lock().map_err(|_| VfError::Unavailable)?;

        if let Some(table) = tables.get(key) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load(key)?);
        tables.insert(key.clone(), Arc::clone(&table));

        Ok(table)
    }

    pub fn insert(&self, key: PacketCacheKey, table: PacketTable) -> VfResult<Arc<PacketTable>> {
        let table = Arc::new(table);
        self.tables
            .lock()
            .map_err(|_| VfError::Unavailable)?
            .insert(key, Arc::clone(&table));

        Ok(table)
    }

    /// Drops the cache's reference; callers still holding the table keep it
    /// alive
    pub fn remove(&self, key: &PacketCacheKey) -> Option<Arc<PacketTable>> {
        self.tables.lock().ok()?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().map(|tables| tables.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads the VF file named by the key and parses the packets starting at the
/// key's offset
pub fn load_packet_table(key: &PacketCacheKey) -> VfResult<PacketTable> {
    let buffer = fs::read(&key.font_path)?;
    let start = usize::try_from(key.offset).map_err(|_| VfError::IllegalFontFile)?;

    PacketTable::parse(buffer.get(start..).ok_or(VfError::IllegalFontFile)?)
}

impl CharPacketSource for PacketCache {
    fn get(&self, key: &PacketCacheKey) -> VfResult<Arc<PacketTable>> {
        self.get_or_load(key, load_packet_table)
    }
}
