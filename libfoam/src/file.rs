//! File wrapper: read a dictionary file, change it in memory and write it
//! back, optionally keeping a `.backup` copy of the original.

use crate::dict::{FoamDict, Key};
use crate::error::{FoamError, Result};
use crate::options::ParseOptions;
use crate::value::Value;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FoamError + '_ {
    move |source| FoamError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Builder for [`ParameterFile`].
#[derive(Debug, Clone)]
pub struct ParameterFileBuilder {
    path: PathBuf,
    options: ParseOptions,
    backup: bool,
    dont_read: bool,
}

impl ParameterFileBuilder {
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Keep a copy of the original next to the file before the first write.
    pub fn backup(mut self, on: bool) -> Self {
        self.backup = on;
        self
    }

    /// Start from an empty body instead of reading the file.
    pub fn dont_read(mut self, on: bool) -> Self {
        self.dont_read = on;
        self
    }

    pub fn open(self) -> Result<ParameterFile> {
        let mut file = ParameterFile {
            path: self.path,
            options: self.options,
            header: None,
            body: Value::Dict(FoamDict::new()),
            backup: self.backup,
            owns_backup: false,
        };
        if !self.dont_read {
            file.read_file()?;
        }
        Ok(file)
    }
}

/// A dictionary file held in memory.
#[derive(Debug, Clone)]
pub struct ParameterFile {
    path: PathBuf,
    options: ParseOptions,
    header: Option<FoamDict>,
    body: Value,
    backup: bool,
    owns_backup: bool,
}

impl ParameterFile {
    /// Read and parse `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).open()
    }

    /// Read `path` as a body without header.
    pub fn body_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path)
            .options(ParseOptions::default().with_no_header())
            .open()
    }

    pub fn builder(path: impl AsRef<Path>) -> ParameterFileBuilder {
        ParameterFileBuilder {
            path: path.as_ref().to_path_buf(),
            options: ParseOptions::default(),
            backup: false,
            dont_read: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the backup copy lives: the file name with `.backup` appended.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Re-read the file from disk, replacing the in-memory contents.
    pub fn read_file(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        let name = self.path.display().to_string();
        let parsed = crate::parse_with_filename(&text, Some(name.as_str()), &self.options)?;
        self.header = parsed.header;
        self.body = parsed.body;
        Ok(())
    }

    pub fn header(&self) -> Option<&FoamDict> {
        self.header.as_ref()
    }

    pub fn header_mut(&mut self) -> Option<&mut FoamDict> {
        self.header.as_mut()
    }

    pub fn set_header(&mut self, header: Option<FoamDict>) {
        self.header = header;
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Value {
        &mut self.body
    }

    pub fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Top-level entry; list bodies are addressed by position.
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<&Value> {
        match (&self.body, key.into()) {
            (Value::Dict(dict), key) => dict.get(key),
            (Value::List(items), Key::Index(i)) => items.get(i),
            _ => None,
        }
    }

    pub fn get_mut<K: Into<Key>>(&mut self, key: K) -> Option<&mut Value> {
        match (&mut self.body, key.into()) {
            (Value::Dict(dict), key) => dict.get_mut(key),
            (Value::List(items), Key::Index(i)) => items.get_mut(i),
            _ => None,
        }
    }

    /// Bind a top-level key. On a list body only existing positions can be
    /// replaced.
    pub fn insert<K: Into<Key>>(&mut self, key: K, value: Value) -> Result<Option<Value>> {
        match (&mut self.body, key.into()) {
            (Value::Dict(dict), key) => Ok(dict.insert(key, value)),
            (Value::List(items), Key::Index(i)) if i < items.len() => {
                Ok(Some(std::mem::replace(&mut items[i], value)))
            }
            _ => Err(FoamError::NotADictionary),
        }
    }

    pub fn remove<K: Into<Key>>(&mut self, key: K) -> Result<Option<Value>> {
        match &mut self.body {
            Value::Dict(dict) => Ok(dict.remove(key)),
            _ => Err(FoamError::NotADictionary),
        }
    }

    /// Top-level keys in order.
    pub fn keys(&self) -> Vec<Key> {
        match &self.body {
            Value::Dict(dict) => dict.keys().cloned().collect(),
            Value::List(items) => (0..items.len()).map(Key::Index).collect(),
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.body {
            Value::Dict(dict) => dict.len(),
            Value::List(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Complete file text as it would be written.
    pub fn to_foam_string(&self) -> Result<String> {
        crate::encode_file(self.header.as_ref(), &self.body)
    }

    /// Serialize and write to the file's path.
    pub fn write_file(&mut self) -> Result<()> {
        let text = self.to_foam_string()?;
        self.write_text(&text)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.take_backup()?;
        fs::write(&self.path, text).map_err(io_error(&self.path))
    }

    fn take_backup(&mut self) -> Result<()> {
        if !self.backup || self.owns_backup || !self.path.exists() {
            return Ok(());
        }
        let backup = self.backup_path();
        if backup.exists() {
            tracing::debug!(path = %backup.display(), "backup already held elsewhere");
            return Ok(());
        }
        fs::copy(&self.path, &backup).map_err(io_error(&backup))?;
        tracing::debug!(path = %backup.display(), "backup created");
        self.owns_backup = true;
        Ok(())
    }

    /// Put the original file back from the backup taken by this wrapper.
    /// Returns `false` when this wrapper holds no backup.
    pub fn restore(&mut self) -> Result<bool> {
        if !self.owns_backup {
            return Ok(false);
        }
        let backup = self.backup_path();
        fs::copy(&backup, &self.path).map_err(io_error(&self.path))?;
        fs::remove_file(&backup).map_err(io_error(&backup))?;
        self.owns_backup = false;
        tracing::debug!(path = %self.path.display(), "restored from backup");
        Ok(true)
    }
}

/// A file built from scratch, with the standard header filled in.
#[derive(Debug, Clone)]
pub struct WriteParameterFile {
    inner: ParameterFile,
}

impl WriteParameterFile {
    /// The object name defaults to the file name.
    pub fn new(path: impl AsRef<Path>, class: &str) -> Self {
        let object = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::with_object(path, class, &object)
    }

    pub fn with_object(path: impl AsRef<Path>, class: &str, object: &str) -> Self {
        let header: FoamDict = vec![
            ("version", Value::from(2.0)),
            ("format", Value::from("ascii")),
            ("class", Value::from(class)),
            ("object", Value::from(object)),
        ]
        .into_iter()
        .collect();
        let inner = ParameterFile {
            path: path.as_ref().to_path_buf(),
            options: ParseOptions::default(),
            header: Some(header),
            body: Value::Dict(FoamDict::new()),
            backup: false,
            owns_backup: false,
        };
        Self { inner }
    }
}

impl Deref for WriteParameterFile {
    type Target = ParameterFile;

    fn deref(&self) -> &ParameterFile {
        &self.inner
    }
}

impl DerefMut for WriteParameterFile {
    fn deref_mut(&mut self) -> &mut ParameterFile {
        &mut self.inner
    }
}

/// Header of a file; the body is never parsed.
#[derive(Debug, Clone)]
pub struct HeaderFile {
    header: FoamDict,
}

impl HeaderFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = ParameterFile::builder(path)
            .options(ParseOptions::default().with_no_body())
            .open()?;
        Ok(Self {
            header: file.header.unwrap_or_default(),
        })
    }

    pub fn header(&self) -> &FoamDict {
        &self.header
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.header.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.header.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

/// A mesh boundary file: a list of `name { ... }` patches.
#[derive(Debug, Clone)]
pub struct BoundaryFile {
    inner: ParameterFile,
    patches: FoamDict,
}

impl BoundaryFile {
    pub fn open(path: impl AsRef<Path>, backup: bool) -> Result<Self> {
        let inner = ParameterFile::builder(path)
            .options(ParseOptions::default().with_boundary_dict())
            .backup(backup)
            .open()?;
        let patches = patches_from_list(inner.body())?;
        Ok(Self { inner, patches })
    }

    pub fn header(&self) -> Option<&FoamDict> {
        self.inner.header()
    }

    pub fn patches(&self) -> &FoamDict {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut FoamDict {
        &mut self.patches
    }

    pub fn get(&self, name: &str) -> Option<&FoamDict> {
        self.patches.get(name).and_then(Value::as_dict)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FoamDict> {
        self.patches.get_mut(name).and_then(Value::as_dict_mut)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patches.keys().filter_map(Key::as_name)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patches as a name/dictionary list ordered by `startFace`.
    pub fn to_list(&self) -> Value {
        let mut patches: Vec<(&Key, &Value)> = self.patches.iter().collect();
        patches.sort_by_key(|(_, patch)| {
            patch
                .as_dict()
                .and_then(|d| d.get("startFace"))
                .and_then(Value::as_i64)
                .unwrap_or(i64::MAX)
        });
        let items = patches
            .into_iter()
            .flat_map(|(name, patch)| [Value::Word(name.to_string()), patch.clone()])
            .collect();
        Value::List(items)
    }

    /// File text with the patch count as the list's length prefix.
    pub fn to_foam_string(&self) -> Result<String> {
        let list = self.to_list();
        let items = list.as_list().map(Vec::as_slice).unwrap_or_default();
        let body = crate::encode::encode_counted(self.header(), items, self.patches.len())?;
        Ok(format!("{}{}", crate::FILE_BANNER, body))
    }

    pub fn write_file(&mut self) -> Result<()> {
        let text = self.to_foam_string()?;
        let list = self.to_list();
        self.inner.set_body(list);
        self.inner.write_text(&text)
    }

    pub fn restore(&mut self) -> Result<bool> {
        self.inner.restore()
    }
}

fn patches_from_list(body: &Value) -> Result<FoamDict> {
    let items = body
        .as_list()
        .ok_or_else(|| FoamError::ShapeInvariant(format!("boundary body is a {}", body.kind_name())))?;
    if items.len() % 2 != 0 {
        return Err(FoamError::ShapeInvariant(
            "boundary list has an unpaired entry".to_string(),
        ));
    }
    let mut patches = FoamDict::new();
    for pair in items.chunks(2) {
        let name = match &pair[0] {
            Value::Word(w) => w.clone(),
            Value::String(s) => s.clone(),
            other => {
                return Err(FoamError::ShapeInvariant(format!(
                    "patch name is a {}",
                    other.kind_name()
                )))
            }
        };
        patches.insert(name, pair[1].clone());
    }
    Ok(patches)
}
