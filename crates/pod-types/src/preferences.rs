//! Weighted representation preferences.

/// Media ranges (or charsets, languages, encodings) with weights in `[0, 1]`.
///
/// Entries keep the order they were added in; re-inserting a key updates its
/// weight in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightedTypes {
    entries: Vec<(String, f64)>,
}

impl WeightedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single entry with weight 1.
    pub fn single(key: impl Into<String>) -> Self {
        let mut types = Self::new();
        types.insert(key, 1.0);
        types
    }

    pub fn insert(&mut self, key: impl Into<String>, weight: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((key, weight)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for WeightedTypes {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut types = Self::new();
        for (key, weight) in iter {
            types.insert(key, weight);
        }
        types
    }
}

/// What a client is willing to receive. Empty maps accept anything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepresentationPreferences {
    pub media_types: WeightedTypes,
    pub charsets: WeightedTypes,
    pub languages: WeightedTypes,
    pub encodings: WeightedTypes,
}

impl RepresentationPreferences {
    /// Preferences that only accept `media_type`.
    pub fn for_type(media_type: impl Into<String>) -> Self {
        Self {
            media_types: WeightedTypes::single(media_type),
            ..Self::default()
        }
    }

    pub fn with_media_types(media_types: WeightedTypes) -> Self {
        Self {
            media_types,
            ..Self::default()
        }
    }
}
