use crate::url::{derive_target_name, extract_origin, parse_target_url};
use crate::UrlError;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// One independently fetchable resource in a batch
///
/// Targets are built once when the batch is enumerated and are only read
/// afterwards; every pipeline stage receives a clone or a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Display identifier used in reports (e.g. `Python`)
    pub name: String,

    /// The absolute HTTP(S) URL to fetch
    pub url: Url,

    /// Extra request headers for this target only
    pub headers: BTreeMap<String, String>,

    /// Politeness delay override for this target's origin
    pub delay: Option<Duration>,
}

impl Target {
    /// Creates a target from a URL string, deriving its name from the path
    ///
    /// # Example
    ///
    /// ```
    /// use topic_harvest::model::Target;
    ///
    /// let target = Target::new("https://www.reddit.com/r/Python").unwrap();
    /// assert_eq!(target.name, "Python");
    /// ```
    pub fn new(url: &str) -> Result<Self, UrlError> {
        let url = parse_target_url(url)?;
        let name = derive_target_name(&url);

        Ok(Self {
            name,
            url,
            headers: BTreeMap::new(),
            delay: None,
        })
    }

    /// Replaces the derived display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a request header sent only for this target
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Overrides the politeness delay used before requesting this target
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the origin key used for politeness tracking
    pub fn origin(&self) -> String {
        // parse_target_url guarantees a host, so the fallback is only reachable
        // for targets assembled by hand with a host-less URL
        extract_origin(&self.url).unwrap_or_else(|| self.url.as_str().to_string())
    }
}
