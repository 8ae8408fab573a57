use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    adapter::PropertyAdapter,
    comment::CommentResolver,
    error::{Error, Result},
    json::{self, DEFAULT_INDENT, JsonWriter},
    resolver::PropertyResolver,
    schema::{Config, Schema},
};

/// Owns a config object and keeps it in sync with its file.
///
/// The schema is built once in [`ConfigManagerBuilder::build`] and reused for
/// every [`load`](ConfigManager::load) and [`save`](ConfigManager::save).
pub struct ConfigManager<T> {
    path: PathBuf,
    indent: String,
    schema: Schema<T>,
    data: T,
}

impl<T: Config> ConfigManager<T> {
    pub fn builder(path: impl AsRef<Path>) -> ConfigManagerBuilder<T> {
        ConfigManagerBuilder::new(path)
    }

    /// Reads the file into the managed object.
    ///
    /// A missing file is created from the current values first.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            info!("Config file {} does not exist, writing defaults", self.path.display());
            self.save()?;
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!("Unable to load config file from {}!", self.path.display());
            self.io_error(e)
        })?;
        let json = json::parse(&content)?;
        self.schema.read(&mut self.data, &json)
    }

    /// Writes the managed object, creating the file when needed.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_json_string()).map_err(|e| {
            error!("Could not save config file to {}!", self.path.display());
            self.io_error(e)
        })
    }

    /// The file content [`save`](ConfigManager::save) writes.
    pub fn to_json_string(&self) -> String {
        let mut out = JsonWriter::new(&self.indent);
        self.schema.write(&self.data, &mut out);
        let mut text = out.into_string();
        text.push('\n');
        text
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    /// Mutable access to the managed object. Changes are written by the next
    /// [`save`](ConfigManager::save).
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Options of a [`ConfigManager`].
///
/// ```no_run
/// use propconf::{Config, ConfigManager, FieldMeta, Fields, Result};
///
/// #[derive(Default)]
/// struct App {
///     verbose: bool,
/// }
///
/// impl Config for App {
///     fn declare(fields: &mut Fields<'_, Self>) -> Result<()> {
///         fields.value("verbose", |a| &a.verbose, |a| &mut a.verbose, FieldMeta::new())?;
///         Ok(())
///     }
/// }
///
/// let mut config = ConfigManager::builder("app.json")
///     .indent("    ")
///     .build(App::default())?;
/// config.load()?;
/// println!("verbose: {}", config.get().verbose);
/// # Ok::<(), propconf::Error>(())
/// ```
pub struct ConfigManagerBuilder<T> {
    path: PathBuf,
    indent: String,
    resolver: PropertyResolver,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Config> ConfigManagerBuilder<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            indent: DEFAULT_INDENT.to_string(),
            resolver: PropertyResolver::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Indent unit of the written file.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Adds an adapter after the built-in ones.
    pub fn adapter(mut self, adapter: Arc<dyn PropertyAdapter>) -> Self {
        self.resolver.register(adapter);
        self
    }

    /// Adds an adapter that fields can request with
    /// [`FieldMeta::adapter`](crate::FieldMeta::adapter).
    pub fn override_adapter(mut self, adapter: Arc<dyn PropertyAdapter>) -> Self {
        self.resolver.register_override(adapter);
        self
    }

    pub fn comment_resolver(mut self, resolver: impl CommentResolver + 'static) -> Self {
        self.resolver.set_comment_resolver(Box::new(resolver));
        self
    }

    /// Builds the schema of `data` and takes ownership of it.
    ///
    /// # Errors
    ///
    /// Any schema or resolution error of the declared fields.
    pub fn build(self, data: T) -> Result<ConfigManager<T>> {
        let schema = Schema::build(&data, &self.resolver)?;
        Ok(ConfigManager {
            path: self.path,
            indent: self.indent,
            schema,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{meta::FieldMeta, schema::Fields};

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: u32,
    }

    impl Config for Counter {
        fn declare(fields: &mut Fields<'_, Self>) -> Result<()> {
            fields.value("count", |c| &c.count, |c| &mut c.count, FieldMeta::new())?;
            Ok(())
        }
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.json");
        let mut manager = ConfigManager::builder(&path)
            .build(Counter { count: 3 })
            .unwrap();
        manager.load().unwrap();
        assert!(path.exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"count\": {\n    \"//default\": 3,\n    \"value\": 3\n  }\n}\n"
        );
        assert_eq!(manager.get().count, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.json");
        let mut manager = ConfigManager::builder(&path)
            .indent("\t")
            .build(Counter { count: 0 })
            .unwrap();
        manager.get_mut().count = 9;
        manager.save().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\t\"count\""));

        manager.get_mut().count = 1;
        manager.load().unwrap();
        assert_eq!(manager.into_inner(), Counter { count: 9 });
    }

    #[test]
    fn test_io_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("counter.json");
        let manager = ConfigManager::builder(&path)
            .build(Counter { count: 0 })
            .unwrap();
        match manager.save() {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
