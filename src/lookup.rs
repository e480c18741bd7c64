use crate::model::{List, Location, Tag, Task};

/// Outcome of resolving one id reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    /// No reference on the task, or no entry with that id.
    NotFound,
    /// The first entry with the id carries no name.
    Unnamed(&'a str),
}

impl<'a> Lookup<'a> {
    pub fn name(self) -> Option<&'a str> {
        match self {
            Self::Found(name) => Some(name),
            _ => None,
        }
    }
}

fn resolve<'a, T>(
    id: Option<&str>,
    entries: &'a [T],
    key: impl Fn(&'a T) -> (Option<&'a str>, Option<&'a str>),
) -> Lookup<'a> {
    let Some(id) = id else {
        return Lookup::NotFound;
    };
    entries
        .iter()
        .map(key)
        .find(|(entry_id, _)| *entry_id == Some(id))
        .map_or(Lookup::NotFound, |(entry_id, name)| match name {
            Some(name) => Lookup::Found(name),
            None => Lookup::Unnamed(entry_id.unwrap_or_default()),
        })
}

pub fn resolve_location<'a>(task: &Task, locations: &'a [Location]) -> Lookup<'a> {
    resolve(task.location_id.as_deref(), locations, |l| {
        (l.id.as_deref(), l.name.as_deref())
    })
}

pub fn resolve_list<'a>(task: &Task, lists: &'a [List]) -> Lookup<'a> {
    resolve(task.list_id.as_deref(), lists, |l| {
        (l.id.as_deref(), l.name.as_deref())
    })
}

/// Tags the task carries, in the order of the tag collection.
pub fn resolve_tags<'a>(task: &Task, tags: &'a [Tag]) -> Vec<&'a Tag> {
    tags.iter()
        .filter(|tag| {
            tag.tag_id
                .as_deref()
                .is_some_and(|id| task.tags.iter().any(|t| t == id))
        })
        .collect()
}
