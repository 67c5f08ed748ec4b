pub mod customer;
pub mod member_number;

use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    error::Error,
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};
use thiserror::Error;

pub trait Id:
    Copy
    + Eq
    + Deref<Target = Self::Inner>
    + From<Self::Inner>
    + Display
    + Debug
    + Serialize
    + for<'de> Deserialize<'de>
{
    type Inner: FromStr;
}

pub trait Event: Clone + Eq + Debug + Serialize + for<'a> Deserialize<'a> {
    type Id;
}

pub trait Entity: IntoIterator<Item = Self::Event> + Debug + Default + Clone {
    type Id: Id;
    type Event: Event<Id = Self::Id>;
    type Error: Error;

    fn id(&self) -> Self::Id;
    fn validate(&self, event: &Self::Event) -> Result<(), Self::Error>;
    fn apply(&mut self, event: Self::Event);
    fn entity_name() -> &'static str;
    fn events(&self) -> &EventQueue<Self::Event>;
    fn events_mut(&mut self) -> &mut EventQueue<Self::Event>;
    fn pop(&mut self) -> Option<Self::Event> {
        self.events_mut().pop()
    }
    fn pop_all(&mut self) -> Vec<Self::Event> {
        let mut events = Vec::new();
        while let Some(e) = self.pop() {
            events.push(e);
        }
        events
    }
    fn clear(&mut self) {
        self.events_mut().clear()
    }
    fn peek(&self) -> Option<&Self::Event> {
        self.events().peek()
    }
}

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Database connection error: {0}")]
    ConnectionError(BoxError),
    #[error("Database query error: {0}")]
    QueryError(BoxError),
    #[error("Data read error: {0}")]
    ReadError(BoxError),
    #[error("Data write error: {0}")]
    WriteError(BoxError),
    #[error("Client side error: {0}")]
    ClientSideError(BoxError),
    /// 一意制約違反
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

impl DataAccessError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventQueue<T> {
    queue: VecDeque<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
    pub fn peek(&self) -> Option<&T> {
        self.queue.front()
    }
    pub fn push(&mut self, value: T) {
        self.queue.push_back(value)
    }
    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }
    pub fn clear(&mut self) {
        self.queue.clear()
    }
}

impl<T> IntoIterator for EventQueue<T> {
    type Item = T;
    type IntoIter = EventQueueIntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.queue.into_iter()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type EventQueueIntoIter<T> = std::collections::vec_deque::IntoIter<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_order() {
        let mut queue = EventQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_duplicate_key_display() {
        let error = DataAccessError::DuplicateKey("member_number 3".to_owned());
        assert!(error.is_duplicate_key());
        assert_eq!(error.to_string(), "Duplicate key: member_number 3");
    }
}
