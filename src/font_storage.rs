use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// File extensions that mark a font identifier as a file name.
const FONT_FILE_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

/// A face picked for a font identifier.
#[derive(Clone)]
pub struct ResolvedFont {
    pub id: fontdb::ID,
    pub font: Arc<fontdue::Font>,
    /// The identifier was not found and the default face stands in for it.
    pub fallback: bool,
}

/// Manages font loading and lookup using `fontdb` and `fontdue`.
///
/// `fontdb` knows which faces exist; `fontdue` fonts are parsed lazily the
/// first time a face is used and kept for the life of the storage. Font
/// identifiers (file names or family names) are resolved to faces once and
/// remembered.
pub struct FontStorage {
    font_db: fontdb::Database,
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
    /// identifier -> face, `None` when the identifier fell back.
    resolved: HashMap<String, Option<fontdb::ID>, fxhash::FxBuildHasher>,
    default_face: Option<fontdb::ID>,
    fonts_dir: Option<PathBuf>,
    default_family: Option<String>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    /// Creates an empty storage. No system fonts are loaded.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            resolved: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            default_face: None,
            fonts_dir: None,
            default_family: None,
        }
    }

    /// Sets the directory font file identifiers are looked up in.
    pub fn set_fonts_dir(&mut self, dir: impl Into<PathBuf>) {
        self.fonts_dir = Some(dir.into());
        self.invalidate();
    }

    /// The directory font file identifiers are looked up in, if any.
    pub fn fonts_dir(&self) -> Option<&Path> {
        self.fonts_dir.as_deref()
    }

    /// Sets the family preferred for the fallback face.
    pub fn set_default_family(&mut self, family: impl Into<String>) {
        self.default_family = Some(family.into());
        self.invalidate();
    }

    /// Forgets resolved identifiers so newly loaded faces are considered.
    fn invalidate(&mut self) {
        self.resolved.clear();
        self.default_face = None;
    }
}

/// Loading fonts into fontdb.
impl FontStorage {
    /// Loads every face contained in `data` (a font file or collection).
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
        self.invalidate();
    }

    /// Loads the faces of the font file at `path`.
    ///
    /// Fails when the file cannot be read.
    pub fn load_font_file(&mut self, path: impl Into<PathBuf>) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path.into())?;
        self.invalidate();
        Ok(())
    }

    /// Loads every font file found in `dir`, recursively. Unreadable files
    /// are skipped.
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        self.font_db.load_fonts_dir(dir);
        self.invalidate();
    }

    /// Loads the fonts installed on the system.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
        self.invalidate();
    }

    /// Whether no face is loaded at all.
    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    /// Iterates over the loaded faces.
    pub fn faces(&self) -> impl Iterator<Item = &fontdb::FaceInfo> {
        self.font_db.faces()
    }
}

/// Resolving identifiers to `Font`s.
impl FontStorage {
    /// Resolves a font identifier, falling back to the default face.
    ///
    /// `None` asks for the default face directly. Returns `None` only when
    /// no face at all can be loaded.
    pub fn resolve(&mut self, font: Option<&str>) -> Option<ResolvedFont> {
        let Some(name) = font.map(str::trim).filter(|name| !name.is_empty()) else {
            return self.default_font().map(|(id, font)| ResolvedFont {
                id,
                font,
                fallback: false,
            });
        };

        let cached = match self.resolved.get(name) {
            Some(entry) => *entry,
            None => {
                let found = self.find_face(name);
                if found.is_none() {
                    log::warn!("font `{name}` not found, using the default face");
                }
                self.resolved.insert(name.to_string(), found);
                found
            }
        };

        if let Some(id) = cached
            && let Some(font) = self.font(id)
        {
            return Some(ResolvedFont {
                id,
                font,
                fallback: false,
            });
        }

        self.default_font().map(|(id, font)| ResolvedFont {
            id,
            font,
            fallback: true,
        })
    }

    /// Whether `name` resolves to a face of its own.
    pub fn contains(&mut self, name: &str) -> bool {
        self.resolve(Some(name)).is_some_and(|resolved| !resolved.fallback)
    }

    fn find_face(&mut self, name: &str) -> Option<fontdb::ID> {
        if is_font_file_name(name) {
            if let Some(id) = self.load_from_fonts_dir(name) {
                return Some(id);
            }
            if let Some(id) = self.face_by_file_name(name) {
                return Some(id);
            }
        }

        let families = [fontdb::Family::Name(name)];
        self.font_db
            .query(&fontdb::Query {
                families: &families,
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            })
            .or_else(|| {
                self.font_db
                    .faces()
                    .find(|face| face.post_script_name == name)
                    .map(|face| face.id)
            })
    }

    fn load_from_fonts_dir(&mut self, file_name: &str) -> Option<fontdb::ID> {
        let path = self.fonts_dir.as_ref()?.join(file_name);
        if let Some(id) = self.face_by_path(&path) {
            return Some(id);
        }
        if !path.is_file() {
            return None;
        }
        let ids = self.font_db.load_font_source(fontdb::Source::File(path.clone()));
        let id = ids.first().copied();
        if id.is_none() {
            log::error!("font file {} holds no usable face", path.display());
        }
        id
    }

    fn face_by_path(&self, path: &Path) -> Option<fontdb::ID> {
        self.font_db
            .faces()
            .find(|face| matches!(&face.source, fontdb::Source::File(p) if p == path))
            .map(|face| face.id)
    }

    fn face_by_file_name(&self, file_name: &str) -> Option<fontdb::ID> {
        self.font_db
            .faces()
            .find(|face| match &face.source {
                fontdb::Source::File(path) => path
                    .file_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(file_name)),
                _ => false,
            })
            .map(|face| face.id)
    }

    /// Default face: the configured family, then sans-serif, then any face
    /// that parses.
    fn default_font(&mut self) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        if let Some(id) = self.default_face
            && let Some(font) = self.font(id)
        {
            return Some((id, font));
        }

        let preferred = self.default_family.clone();
        let mut candidates: Vec<fontdb::ID> = Vec::new();
        {
            let mut families = Vec::with_capacity(2);
            if let Some(family) = preferred.as_deref() {
                families.push(fontdb::Family::Name(family));
            }
            families.push(fontdb::Family::SansSerif);
            if let Some(id) = self.font_db.query(&fontdb::Query {
                families: &families,
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            }) {
                candidates.push(id);
            }
        }
        candidates.extend(self.font_db.faces().map(|face| face.id));

        for id in candidates {
            if let Some(font) = self.font(id) {
                self.default_face = Some(id);
                return Some((id, font));
            }
        }
        None
    }

    /// Retrieves a parsed font by ID, parsing it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let r: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(r))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }
}

fn is_font_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FONT_FILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Storage with the system fonts loaded, or `None` when the system has no
/// usable face.
#[cfg(test)]
pub(crate) fn system_storage() -> Option<FontStorage> {
    let mut storage = FontStorage::new();
    storage.load_system_fonts();
    if storage.resolve(None).is_none() {
        log::warn!("no usable system font, skipping");
        return None;
    }
    Some(storage)
}
