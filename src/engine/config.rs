use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest as _, Sha256};

use crate::prelude::*;

lazy_static! {
    static ref OPTION_LINE: Regex = Regex::new(r"^(?<name>[^=]+?)\s*=\s*(?<value>.*?)\s*$").unwrap();
}

/// Whether an option name is the line-count option, which varies per search rather than per session.
pub fn is_multipv(name: &str) -> bool
{
    name.trim().eq_ignore_ascii_case("multipv")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// An engine option set, as `name = value` pairs.
pub struct EngineOptions
{
    values: BTreeMap<String, String>,
}

impl EngineOptions
{
    pub fn new() -> EngineOptions
    {
        EngineOptions::default()
    }

    pub fn get(&self, name: &str) -> Option<&str>
    {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>)
    {
        self.values.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool
    {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)>
    {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize
    {
        self.values.len()
    }

    /// Overrides this set with every option in `other`.
    pub fn merge(&mut self, other: &EngineOptions)
    {
        for (name, value) in other.iter()
        {
            self.insert(name, value);
        }
    }

    /// Reads `name = value` lines, ignoring blank lines and `#` comments.
    pub fn load(path: &Path) -> Result<EngineOptions>
    {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e).chain(Error::new(
                Kind::IoError,
                format!("could not read engine options from {}", path.display()),
            ))
        })?;
        contents.parse()
    }

    /// Writes the options as `name = value` lines, leaving out MultiPV.
    pub fn write(&self, path: &Path) -> Result<()>
    {
        let mut file = std::fs::File::create(path)?;
        for (name, value) in self.iter().filter(|(name, _)| !is_multipv(name))
        {
            writeln!(file, "{name} = {value}")?;
        }
        Ok(())
    }

    /// Works out the option set for a session.
    ///
    /// An explicit file must exist and overrides the engine defaults. Without one, `<engine>.cfg` is used, where
    /// `<engine>` is the first word of the engine's name; if that file does not exist, it is created from the
    /// defaults.
    pub fn resolve(config: Option<&Path>, engine_name: &str, defaults: &EngineOptions) -> Result<EngineOptions>
    {
        let mut options = defaults.clone();

        if let Some(path) = config
        {
            if !path.is_file()
            {
                return Err(Error::new(
                    Kind::InvalidOption,
                    format!("engine config {} does not exist", path.display()),
                ));
            }
            options.merge(&EngineOptions::load(path)?);
            return Ok(options);
        }

        let path = EngineOptions::default_path(engine_name);
        if path.is_file()
        {
            log::info!("Using engine options from {}.", path.display());
            options.merge(&EngineOptions::load(&path)?);
        }
        else
        {
            log::warn!("No config file for {} found, creating {} with default values.", engine_name, path.display());
            options.write(&path)?;
        }

        Ok(options)
    }

    /// The autodiscovered options file for an engine.
    pub fn default_path(engine_name: &str) -> PathBuf
    {
        let stem = engine_name.split_whitespace().next().unwrap_or("engine");
        PathBuf::from(format!("{stem}.cfg"))
    }
}

impl FromStr for EngineOptions
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let mut options = EngineOptions::new();
        for line in s.lines().map(str::trim)
        {
            if line.is_empty() || line.starts_with('#')
            {
                continue;
            }

            let Some(caps) = OPTION_LINE.captures(line)
            else
            {
                return Err(Error::for_parse::<Self>(line.into()));
            };
            options.insert(caps["name"].trim(), &caps["value"]);
        }
        Ok(options)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The identity of the engine a session runs with: its name and a hash of its options.
pub struct EngineConfig
{
    pub name:    String,
    pub options: EngineOptions,
    hash:        String,
}

impl EngineConfig
{
    pub fn new(name: impl Into<String>, options: EngineOptions) -> EngineConfig
    {
        let hash = EngineConfig::hash_options(&options);
        EngineConfig {
            name: name.into(),
            options,
            hash,
        }
    }

    /// The order-independent hash of the option set, ignoring MultiPV.
    pub fn hash(&self) -> &str
    {
        self.hash.as_str()
    }

    fn hash_options(options: &EngineOptions) -> String
    {
        let mut hasher = Sha256::new();
        for (name, value) in options.iter().filter(|(name, _)| !is_multipv(name))
        {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for EngineConfig
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{} [{}]", self.name, &self.hash[.. 12])
    }
}
