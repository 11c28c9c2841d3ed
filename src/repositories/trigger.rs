//! In-memory store for trigger records loaded from the relational backend.
//!
//! Monitors reference triggers by slug or by id interchangeably, so the
//! store keeps one owned record list with two explicit indices rather than
//! a single map keyed by both (which invites id/slug collisions).

use std::collections::HashMap;

use crate::models::{TriggerRecord, TriggerRef};

#[derive(Debug, Clone, Default)]
pub struct TriggerStore {
	records: Vec<TriggerRecord>,
	by_id: HashMap<String, usize>,
	by_slug: HashMap<String, usize>,
}

impl TriggerStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a record, indexing it by both identities.
	pub fn insert(&mut self, record: TriggerRecord) {
		let index = self.records.len();
		self.by_id.insert(record.id.clone(), index);
		self.by_slug.insert(record.slug.clone(), index);
		self.records.push(record);
	}

	pub fn get_by_id(&self, id: &str) -> Option<&TriggerRecord> {
		self.by_id.get(id).map(|&i| &self.records[i])
	}

	pub fn get_by_slug(&self, slug: &str) -> Option<&TriggerRecord> {
		self.by_slug.get(slug).map(|&i| &self.records[i])
	}

	/// Resolve a monitor's trigger reference, whichever identity it carries.
	///
	/// A bare string reference may be either a slug or a stringified id, so
	/// both indices are consulted.
	pub fn resolve(&self, reference: &TriggerRef) -> Option<&TriggerRecord> {
		match reference {
			TriggerRef::Id { id } => self.get_by_id(id).or_else(|| self.get_by_slug(id)),
			TriggerRef::Slug(key) => self.get_by_slug(key).or_else(|| self.get_by_id(key)),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &TriggerRecord> {
		self.records.iter()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
