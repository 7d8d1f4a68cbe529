use crate::Facets;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

/// An object instance to create when initializing the global block.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    /// Name of the instantiated class.
    pub class_name: String,
    /// Initial values, by attribute name, in slot order.
    pub attributes: IndexMap<String, String>,
    /// Creation priority (lower first).
    pub priority: Option<f64>,
    /// Free-form facets, `priority` excluded.
    pub heading: Facets,
}

impl InstanceRecord {
    /// Key ordering instances by ascending priority,
    /// instances without priority coming last.
    pub fn sort_key(&self) -> OrderedFloat<f64> {
        OrderedFloat(self.priority.unwrap_or(f64::INFINITY))
    }
}

/// Sorts instances by ascending priority.
///
/// The sort is stable, so instances with equal (or no) priority keep their relative order.
///
/// ```
/// # use gamlgen_core::{InstanceRecord, Facets, sort_by_priority};
/// let record = |name: &str, priority| InstanceRecord {
///     class_name: name.to_string(),
///     attributes: Default::default(),
///     priority,
///     heading: Facets::new(),
/// };
/// let mut records = vec![record("a", None), record("b", Some(10.)), record("c", Some(2.))];
/// sort_by_priority(&mut records);
/// let names: Vec<_> = records.iter().map(|r| r.class_name.as_str()).collect();
/// assert_eq!(names, ["c", "b", "a"]);
/// ```
pub fn sort_by_priority(records: &mut [InstanceRecord]) {
    records.sort_by_key(InstanceRecord::sort_key);
}

/// An entry of the global initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum InitEntry {
    /// Creation of an instance.
    Create(InstanceRecord),
    /// Body of the global class's own `init` operation.
    Body(String),
}
