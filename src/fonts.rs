//! Font resolution and family fallback.
//!
//! Font names in documents are usually PostScript names (`Arial-BoldMT`,
//! `TimesNewRomanPSMT`). [`FontFamily::from_document_name`] turns one into a
//! CSS family stack with the original name first, then the canonical family,
//! its substitutes and a generic family. A [`FontResolver`] supplies glyph data
//! for the first family in a stack that it knows.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{Error, Result};

/// Raw font file bytes.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Family the data was resolved for
    pub family: String,
    /// Font file bytes (TTF, OTF or TTC)
    pub bytes: Arc<Vec<u8>>,
    /// Face index within a collection
    pub index: u32,
}

impl FontData {
    /// Wrap font bytes, checking that they parse.
    pub fn new(family: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let family = family.into();
        ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::Font(format!("{}: {}", family, e)))?;
        Ok(Self {
            family,
            bytes: Arc::new(bytes),
            index: 0,
        })
    }

    /// Parse the face.
    pub fn face(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.bytes, self.index)
            .map_err(|e| Error::Font(format!("{}: {}", self.family, e)))
    }
}

/// Source of glyph data for font families.
pub trait FontResolver: Send + Sync {
    /// Look up a family. `Ok(None)` means the family is unknown.
    fn resolve(&self, family: &str) -> Result<Option<FontData>>;

    /// Check if a family resolves to usable font data.
    fn is_available(&self, family: &str) -> bool {
        matches!(self.resolve(family), Ok(Some(_)))
    }
}

impl<T: FontResolver + ?Sized> FontResolver for Arc<T> {
    fn resolve(&self, family: &str) -> Result<Option<FontData>> {
        (**self).resolve(family)
    }
}

/// Walk a family stack and return the first family that resolves.
///
/// Resolver errors are logged and the next family is tried.
pub fn resolve_stack(resolver: &dyn FontResolver, stack: &FontFamily) -> Option<FontData> {
    for (i, family) in stack.families().enumerate() {
        match resolver.resolve(family) {
            Ok(Some(font)) => {
                if i > 0 {
                    log::debug!("Font '{}' substituted by '{}'", stack.primary(), family);
                }
                return Some(font);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Font '{}' could not be loaded: {}", family, e),
        }
    }

    log::warn!("No font available for '{}'", stack.to_css());
    None
}

/// Resolver over fonts registered in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryFontResolver {
    fonts: HashMap<String, FontData>,
}

impl MemoryFontResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes under a family name.
    pub fn register(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let font = FontData::new(family, bytes)?;
        self.fonts.insert(family_key(family), font);
        Ok(())
    }

    /// Register already loaded font data under a family name.
    pub fn register_data(&mut self, family: &str, font: FontData) {
        self.fonts.insert(family_key(family), font);
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Check if no family is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl FontResolver for MemoryFontResolver {
    fn resolve(&self, family: &str) -> Result<Option<FontData>> {
        Ok(self.fonts.get(&family_key(family)).cloned())
    }
}

/// Resolver that loads fonts from the platform font directories.
///
/// Directories are indexed once on first use; loaded faces are cached per
/// family for the lifetime of the resolver.
#[derive(Debug, Default)]
pub struct SystemFontResolver {
    extra_dirs: Vec<PathBuf>,
    index: OnceLock<HashMap<String, PathBuf>>,
    cache: Mutex<HashMap<String, Option<FontData>>>,
}

impl SystemFontResolver {
    /// Create a resolver over the platform font directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also search the given directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_dirs.push(dir.into());
        self
    }

    fn file_index(&self) -> &HashMap<String, PathBuf> {
        self.index.get_or_init(|| {
            let mut index = HashMap::new();
            for dir in system_font_dirs().iter().chain(self.extra_dirs.iter()) {
                index_font_dir(dir, 0, &mut index);
            }
            log::debug!("Indexed {} system font files", index.len());
            index
        })
    }

    fn load(&self, family: &str) -> Option<FontData> {
        let index = self.file_index();
        for candidate in font_file_candidates(family) {
            let Some(path) = index.get(&candidate) else {
                continue;
            };
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            if let Ok(font) = FontData::new(family, bytes) {
                return Some(font);
            }
        }
        None
    }
}

impl FontResolver for SystemFontResolver {
    fn resolve(&self, family: &str) -> Result<Option<FontData>> {
        let key = family_key(family);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(entry) = self
            .cache
            .lock()
            .map_err(|_| Error::Font("font cache poisoned".into()))?
            .get(&key)
        {
            return Ok(entry.clone());
        }

        let loaded = self.load(family);
        self.cache
            .lock()
            .map_err(|_| Error::Font("font cache poisoned".into()))?
            .insert(key, loaded.clone());
        Ok(loaded)
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join(".fonts"));
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    if let Ok(extra) = std::env::var("PSDPORT_FONT_DIR") {
        for path in std::env::split_paths(&extra) {
            if !path.as_os_str().is_empty() {
                dirs.push(path);
            }
        }
    }

    dirs
}

const MAX_FONT_DIR_DEPTH: usize = 4;

fn index_font_dir(dir: &Path, depth: usize, index: &mut HashMap<String, PathBuf>) {
    if depth > MAX_FONT_DIR_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            index_font_dir(&path, depth + 1, index);
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".ttf") || lower.ends_with(".otf") || lower.ends_with(".ttc") {
            index.entry(lower).or_insert(path);
        }
    }
}

/// Lowercased file names that may hold a family.
fn font_file_candidates(family: &str) -> Vec<String> {
    let compact: String = family
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
        .collect::<String>()
        .to_ascii_lowercase();

    let known: &[&str] = match compact.as_str() {
        "sans-serif" | "system-ui" => &[
            "dejavusans.ttf",
            "liberationsans-regular.ttf",
            "notosans-regular.ttf",
            "arial.ttf",
            "helvetica.ttc",
        ],
        "serif" => &[
            "dejavuserif.ttf",
            "liberationserif-regular.ttf",
            "notoserif-regular.ttf",
            "times.ttf",
        ],
        "monospace" => &[
            "dejavusansmono.ttf",
            "liberationmono-regular.ttf",
            "cour.ttf",
            "menlo.ttc",
        ],
        "arial" => &["arial.ttf", "liberationsans-regular.ttf"],
        "helvetica" => &["helvetica.ttc", "liberationsans-regular.ttf"],
        "timesnewroman" | "times" => &["times.ttf", "liberationserif-regular.ttf"],
        "couriernew" | "courier" => &["cour.ttf", "liberationmono-regular.ttf"],
        _ => &[],
    };

    let mut out: Vec<String> = known.iter().map(|s| s.to_string()).collect();
    for ext in ["ttf", "otf", "ttc"] {
        out.push(format!("{compact}.{ext}"));
        out.push(format!("{compact}-regular.{ext}"));
    }
    out
}

/// Generic CSS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
}

impl GenericFamily {
    /// CSS keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            GenericFamily::SansSerif => "sans-serif",
            GenericFamily::Serif => "serif",
            GenericFamily::Monospace => "monospace",
            GenericFamily::Cursive => "cursive",
        }
    }

    /// Family appended to unknown fonts of this kind.
    fn default_substitute(self) -> Option<&'static str> {
        match self {
            GenericFamily::SansSerif => Some("Arial"),
            GenericFamily::Serif => Some("Times New Roman"),
            GenericFamily::Monospace => Some("Courier New"),
            GenericFamily::Cursive => None,
        }
    }

    fn guess(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        if ["mono", "code", "courier", "consol"]
            .iter()
            .any(|k| lower.contains(k))
        {
            GenericFamily::Monospace
        } else if ["script", "hand", "brush", "comic"]
            .iter()
            .any(|k| lower.contains(k))
        {
            GenericFamily::Cursive
        } else if !lower.contains("sans")
            && ["serif", "times", "garamond", "georgia", "baskerville", "book"]
                .iter()
                .any(|k| lower.contains(k))
        {
            GenericFamily::Serif
        } else {
            GenericFamily::SansSerif
        }
    }
}

/// Fallback table: (family key, substitutes, generic family).
const FALLBACK_TABLE: &[(&str, &[&str], GenericFamily)] = &[
    ("arial", &["Arial", "Helvetica"], GenericFamily::SansSerif),
    ("helvetica", &["Helvetica", "Arial"], GenericFamily::SansSerif),
    (
        "helveticaneue",
        &["Helvetica Neue", "Helvetica", "Arial"],
        GenericFamily::SansSerif,
    ),
    ("verdana", &["Verdana", "Arial"], GenericFamily::SansSerif),
    ("roboto", &["Roboto", "Arial"], GenericFamily::SansSerif),
    ("opensans", &["Open Sans", "Arial"], GenericFamily::SansSerif),
    ("myriadpro", &["Myriad Pro", "Arial"], GenericFamily::SansSerif),
    (
        "timesnewroman",
        &["Times New Roman", "Times"],
        GenericFamily::Serif,
    ),
    ("times", &["Times", "Times New Roman"], GenericFamily::Serif),
    ("georgia", &["Georgia", "Times New Roman"], GenericFamily::Serif),
    ("minionpro", &["Minion Pro", "Times New Roman"], GenericFamily::Serif),
    (
        "couriernew",
        &["Courier New", "Courier"],
        GenericFamily::Monospace,
    ),
    ("courier", &["Courier", "Courier New"], GenericFamily::Monospace),
    ("consolas", &["Consolas", "Courier New"], GenericFamily::Monospace),
    ("comicsansms", &["Comic Sans MS"], GenericFamily::Cursive),
];

/// A CSS font family stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamily {
    families: Vec<String>,
}

impl FontFamily {
    /// Build the stack for a font name found in a document.
    pub fn from_document_name(name: &str) -> Self {
        let original = name.trim();
        let canonical = canonical_family(original);
        let key = family_key(&canonical);

        let (substitutes, generic) = FALLBACK_TABLE
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, subs, generic)| (subs.to_vec(), *generic))
            .unwrap_or_else(|| {
                let generic = GenericFamily::guess(&canonical);
                (generic.default_substitute().into_iter().collect(), generic)
            });

        let mut stack = Self {
            families: Vec::new(),
        };
        stack.push(original);
        stack.push(&canonical);
        for substitute in substitutes {
            stack.push(substitute);
        }
        stack.push(generic.as_str());
        stack
    }

    /// Parse a CSS `font-family` value.
    pub fn parse_css(value: &str) -> Self {
        let mut stack = Self {
            families: Vec::new(),
        };
        for part in value.split(',') {
            stack.push(part.trim().trim_matches(|c| c == '"' || c == '\''));
        }
        if stack.families.is_empty() {
            stack.push("Arial");
            stack.push(GenericFamily::SansSerif.as_str());
        }
        stack
    }

    fn push(&mut self, family: &str) {
        if family.is_empty() {
            return;
        }
        let key = family_key(family);
        if !self.families.iter().any(|f| family_key(f) == key) {
            self.families.push(family.to_string());
        }
    }

    /// First family of the stack.
    pub fn primary(&self) -> &str {
        self.families.first().map(String::as_str).unwrap_or("Arial")
    }

    /// Families in priority order.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(String::as_str)
    }

    /// Render as a CSS `font-family` value.
    pub fn to_css(&self) -> String {
        self.families
            .iter()
            .map(|f| {
                let generic = matches!(
                    f.as_str(),
                    "sans-serif" | "serif" | "monospace" | "cursive" | "system-ui"
                );
                if generic || !f.contains(|c: char| c.is_whitespace() || c == '-') {
                    f.clone()
                } else {
                    format!("\"{}\"", f)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Family name behind a PostScript or style-qualified font name.
///
/// `Arial-BoldMT` becomes `Arial`, `TimesNewRomanPSMT` becomes
/// `Times New Roman`, `ABCDEF+OpenSans-Regular` becomes `Open Sans`.
pub fn canonical_family(name: &str) -> String {
    let mut name = name.trim();

    // Subset prefix
    if let Some((prefix, rest)) = name.split_once('+') {
        if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) {
            name = rest;
        }
    }

    if let Some((family, _style)) = name.split_once('-') {
        name = family;
    }

    let mut family = name;
    for suffix in ["MT", "PS", "Std"] {
        if family.len() > suffix.len() {
            if let Some(stripped) = family.strip_suffix(suffix) {
                family = stripped;
            }
        }
    }

    if family.contains(' ') {
        return family.to_string();
    }

    // Split CamelCase
    let mut out = String::with_capacity(family.len() + 4);
    let mut prev: Option<char> = None;
    for c in family.chars() {
        if let Some(p) = prev {
            if c.is_uppercase() && p.is_lowercase() {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn family_key(family: &str) -> String {
    family
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
