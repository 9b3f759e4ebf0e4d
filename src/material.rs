/// The material library collaborator.
///
/// The engine resolves `WITH MATERIAL CATEGORY.PRESET` against a
/// [`MaterialRegistry`] and attaches the registered id to the construction
/// node. [`StandardMaterials`] is a small built-in preset library for hosts
/// and tests without their own.
use std::collections::HashMap;

/// A resolved material preset: human-readable category and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialHandle {
    pub category: String,
    pub name: String,
}

/// Id of a material registered for use by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

pub trait MaterialRegistry {
    /// Look up a preset by its DSL spelling (`METALS`, `POLISHED_STEEL`).
    /// Lookup is case-insensitive; `None` means unknown category or preset.
    fn resolve(&self, category: &str, preset: &str) -> Option<MaterialHandle>;

    /// Register a resolved handle for use, returning its id. Registering
    /// the same preset twice returns the same id.
    fn create_and_register(&mut self, handle: MaterialHandle) -> MaterialId;

    /// The handle behind a previously registered id.
    fn get(&self, id: MaterialId) -> Option<&MaterialHandle>;
}

// Built-in preset vocabulary: `(DSL key, display category, presets)`.
const PRESETS: &[(&str, &str, &[&str])] = &[
    (
        "METALS",
        "Metal",
        &["POLISHED_STEEL", "BRUSHED_ALUMINUM", "COPPER", "BRASS"],
    ),
    ("WOODS", "Wood", &["OAK", "WALNUT", "PINE"]),
    (
        "PLASTICS",
        "Plastic",
        &["MATTE_WHITE", "MATTE_BLACK", "CLEAR_ACRYLIC"],
    ),
    ("GLASS", "Glass", &["CLEAR", "FROSTED"]),
];

/// An in-memory registry over the built-in preset table.
#[derive(Debug, Default)]
pub struct StandardMaterials {
    registered: Vec<MaterialHandle>,
    by_key: HashMap<(String, String), MaterialId>,
}

impl StandardMaterials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `POLISHED_STEEL` → `Polished Steel`.
    fn display_name(preset: &str) -> String {
        let mut out = String::with_capacity(preset.len());
        for (i, word) in preset.split('_').enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.extend(chars.flat_map(char::to_lowercase));
            }
        }
        out
    }
}

impl MaterialRegistry for StandardMaterials {
    fn resolve(&self, category: &str, preset: &str) -> Option<MaterialHandle> {
        let (_, display, presets) = PRESETS
            .iter()
            .find(|(key, _, _)| key.eq_ignore_ascii_case(category))?;
        let preset_key = presets.iter().find(|p| p.eq_ignore_ascii_case(preset))?;
        Some(MaterialHandle {
            category: (*display).to_string(),
            name: Self::display_name(preset_key),
        })
    }

    fn create_and_register(&mut self, handle: MaterialHandle) -> MaterialId {
        let key = (handle.category.clone(), handle.name.clone());
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }
        let id = MaterialId(self.registered.len() as u64);
        self.registered.push(handle);
        self.by_key.insert(key, id);
        id
    }

    fn get(&self, id: MaterialId) -> Option<&MaterialHandle> {
        self.registered.get(id.0 as usize)
    }
}
