//! The per-roll pool accumulator.

use ic_core::{DiceArray, ItemId, make_compare_ready};
use serde::Serialize;

/// One optional block of dice offered alongside the selected stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolField {
    /// Stable ID, such as `"guard"` or `"<gift id>-<index>"`.
    pub id: String,
    /// Label used in the pool description.
    pub name: String,
    /// Dice added when checked.
    pub dice: DiceArray,
    /// Whether the field is included.
    pub checked: bool,
    /// The item that contributed the field.
    pub source: Option<ItemId>,
    /// Exhaust `source` if the field is rolled.
    pub exhausts_on_use: bool,
}

impl PoolField {
    /// A checked field with no source item.
    pub fn new(id: impl Into<String>, name: impl Into<String>, dice: DiceArray) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dice,
            checked: true,
            source: None,
            exhausts_on_use: false,
        }
    }

    /// Set the checked state.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set the contributing item.
    pub fn from_source(mut self, source: ItemId, exhausts_on_use: bool) -> Self {
        self.source = Some(source);
        self.exhausts_on_use = exhausts_on_use;
        self
    }
}

/// Everything gathered for one roll before the pool is finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolConstruction {
    /// Stats selected for the roll, compare-ready, in selection order.
    pub prechecked: Vec<String>,
    /// Optional fields in insertion order.
    pub fields: Vec<PoolField>,
    /// Extra label text, such as stat change name additions.
    pub label: String,
}

impl PoolConstruction {
    /// An empty construction.
    pub fn new() -> Self {
        Self::default()
    }

    /// A construction with the given stats selected.
    pub fn with_prechecked<S: AsRef<str>>(stats: &[S]) -> Self {
        let mut construction = Self::new();
        for stat in stats {
            construction.precheck(stat.as_ref());
        }
        construction
    }

    /// Select a stat unless it already is.
    pub fn precheck(&mut self, stat: &str) {
        let key = make_compare_ready(stat);
        if !key.is_empty() && !self.prechecked.contains(&key) {
            self.prechecked.push(key);
        }
    }

    /// Add a field, replacing any existing field with the same ID in place.
    pub fn insert_field(&mut self, field: PoolField) {
        match self.fields.iter_mut().find(|f| f.id == field.id) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Look up a field by ID.
    pub fn field(&self, id: &str) -> Option<&PoolField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Change a field's checkbox. Returns false if no such field exists.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                field.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Fields that will be rolled.
    pub fn checked_fields(&self) -> impl Iterator<Item = &PoolField> {
        self.fields.iter().filter(|f| f.checked)
    }

    /// Append text to the running label.
    pub fn push_label(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.label.is_empty() {
            self.label.push(' ');
        }
        self.label.push_str(text);
    }
}
