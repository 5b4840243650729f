//! A minimal insertion-order-preserving accumulator, used wherever candidate
//! or member sets need a deterministic "first-seen" iteration order over
//! items keyed by a `String`. Small maps only; a linear scan per lookup is
//! fine at the cardinalities this engine expects per request.

pub struct InsertionOrderedMap<V> {
    order: Vec<String>,
    index: std::collections::HashMap<String, usize>,
    values: Vec<V>,
}

impl<V> Default for InsertionOrderedMap<V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            index: std::collections::HashMap::new(),
            values: Vec::new(),
        }
    }
}

impl<V> InsertionOrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `default` at the end of insertion order on first sight.
    pub fn entry_or(&mut self, key: &str, default: V) -> &mut V {
        if let Some(&idx) = self.index.get(key) {
            &mut self.values[idx]
        } else {
            let idx = self.order.len();
            self.order.push(key.to_string());
            self.index.insert(key.to_string(), idx);
            self.values.push(default);
            &mut self.values[idx]
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.values[idx])
    }

    pub fn keys_in_order(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_pairs(self) -> Vec<(String, V)> {
        self.order.into_iter().zip(self.values).collect()
    }
}
