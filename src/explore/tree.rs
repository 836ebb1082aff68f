use std::collections::HashMap;

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq)]
/// The lines resolved for every position explored in one run, keyed by digest.
///
/// Positions are only ever added, so a transposition keeps the lines it was first resolved with.
pub struct SessionTree
{
    root: Digest,
    map:  HashMap<Digest, Vec<ResultLine>>,
}

impl SessionTree
{
    pub fn new(root: Digest) -> SessionTree
    {
        SessionTree {
            root,
            map: HashMap::new(),
        }
    }

    pub fn contains(&self, digest: &Digest) -> bool
    {
        self.map.contains_key(digest)
    }

    pub fn get(&self, digest: &Digest) -> Option<&[ResultLine]>
    {
        self.map.get(digest).map(Vec::as_slice)
    }

    /// Stores the lines of a position, returning false if it was already there.
    pub fn insert(&mut self, digest: Digest, lines: Vec<ResultLine>) -> bool
    {
        if self.map.contains_key(&digest)
        {
            return false;
        }
        self.map.insert(digest, lines);
        true
    }

    pub fn is_empty(&self) -> bool
    {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &Vec<ResultLine>)>
    {
        self.map.iter()
    }

    pub fn len(&self) -> usize
    {
        self.map.len()
    }

    pub fn root(&self) -> Digest
    {
        self.root
    }
}
