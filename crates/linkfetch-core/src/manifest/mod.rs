//! Manifest reading and grouping by link.
//!
//! A manifest lists `<link> <file name>` pairs. Several names may share a link;
//! the link is fetched once into the first name and copied to the others, so the
//! engine works on [`LinkGroup`]s rather than raw entries.

mod error;
mod parse;

pub use error::{ManifestError, Result};
pub use parse::{parse_line, ManifestEntry};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// All destinations requested for one link, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    link: String,
    destinations: Vec<String>,
}

impl LinkGroup {
    /// A group always has at least its primary destination.
    pub fn new(link: impl Into<String>, primary: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            destinations: vec![primary.into()],
        }
    }

    pub fn push(&mut self, destination: impl Into<String>) {
        self.destinations.push(destination.into());
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Destination that receives the network fetch.
    pub fn primary(&self) -> &str {
        &self.destinations[0]
    }

    /// Destinations filled by copying the primary file.
    pub fn replicas(&self) -> &[String] {
        &self.destinations[1..]
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }
}

/// Group entries by link. Groups come out in order of each link's first
/// appearance, destinations in manifest order.
pub fn group_entries<I>(entries: I) -> Vec<LinkGroup>
where
    I: IntoIterator<Item = ManifestEntry>,
{
    let mut groups: Vec<LinkGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        match index.get(&entry.link) {
            Some(&i) => groups[i].push(entry.destination),
            None => {
                index.insert(entry.link.clone(), groups.len());
                groups.push(LinkGroup::new(entry.link, entry.destination));
            }
        }
    }
    groups
}

/// Read a manifest file line by line and group it.
pub fn load_groups(path: &Path) -> Result<Vec<LinkGroup>> {
    let read_err = |source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    let mut entries = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(read_err)?;
        if let Some(entry) = parse_line(&line, i + 1)? {
            entries.push(entry);
        }
    }
    Ok(group_entries(entries))
}
