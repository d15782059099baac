//! Label lookup tables: classifier class id → human-readable name.
//!
//! Class ids are the integers the models were trained with (1-based). The
//! tables are fixed at compile time; a class id outside the table decodes to
//! the domain's sentinel instead of failing.

/// Crop class ids (22 classes).
pub const CROP_LABELS: &[(i64, &str)] = &[
    (1, "Rice"),
    (2, "Maize"),
    (3, "Jute"),
    (4, "Cotton"),
    (5, "Coconut"),
    (6, "Papaya"),
    (7, "Orange"),
    (8, "Apple"),
    (9, "Muskmelon"),
    (10, "Watermelon"),
    (11, "Grapes"),
    (12, "Mango"),
    (13, "Banana"),
    (14, "Pomegranate"),
    (15, "Lentil"),
    (16, "Blackgram"),
    (17, "Mungbean"),
    (18, "Mothbeans"),
    (19, "Pigeonpeas"),
    (20, "Kidneybeans"),
    (21, "Chickpea"),
    (22, "Coffee"),
];

/// Fertilizer class ids (7 classes).
pub const FERTILIZER_LABELS: &[(i64, &str)] = &[
    (1, "Urea"),
    (2, "DAP"),
    (3, "14-35-14"),
    (4, "28-28"),
    (5, "17-17-17"),
    (6, "20-20"),
    (7, "10-26-26"),
];

/// Immutable class-id → label mapping with a sentinel for misses.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    entries: &'static [(i64, &'static str)],
    unknown: &'static str,
}

/// Outcome of decoding a class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The class id is in the table.
    Known(&'static str),
    /// The classifier emitted an id the table does not cover (e.g. a model
    /// retrained with extra classes). Carries the domain sentinel.
    Unknown(&'static str),
}

impl Decoded {
    /// The string shown to the caller: the label or the sentinel.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Known(label) | Self::Unknown(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl LabelTable {
    pub const fn new(entries: &'static [(i64, &'static str)], unknown: &'static str) -> Self {
        Self { entries, unknown }
    }

    pub fn decode(&self, class_id: i64) -> Decoded {
        match self.entries.iter().find(|(id, _)| *id == class_id) {
            Some((_, label)) => Decoded::Known(label),
            None => Decoded::Unknown(self.unknown),
        }
    }

    /// Sentinel returned for class ids outside the table.
    pub fn unknown(&self) -> &'static str {
        self.unknown
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(class_id, label)` pairs in class-id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Whether `label` is one of the table's names (sentinel excluded).
    pub fn contains_label(&self, label: &str) -> bool {
        self.entries.iter().any(|(_, l)| *l == label)
    }
}
