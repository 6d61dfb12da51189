//! Conversation entity - a direct thread between two users with unread counters

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Unordered pair of distinct users, stored as `(low, high)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: Snowflake,
    high: Snowflake,
}

impl ParticipantPair {
    pub fn new(a: Snowflake, b: Snowflake) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::ValidationError(
                "a conversation needs two distinct participants".to_string(),
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    #[inline]
    pub fn low(&self) -> Snowflake {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Snowflake {
        self.high
    }

    #[inline]
    pub fn includes(&self, user_id: Snowflake) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The participant that is not `user_id`, if `user_id` is part of the pair
    pub fn other(&self, user_id: Snowflake) -> Option<Snowflake> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub participants: ParticipantPair,
    pub message_ids: Vec<Snowflake>,
    pub unread: HashMap<Snowflake, i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(id: Snowflake, participants: ParticipantPair) -> Self {
        let now = Utc::now();
        Self {
            id,
            participants,
            message_ids: Vec::new(),
            unread: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump the receiver's unread counter
    pub fn record_message(
        &mut self,
        message_id: Snowflake,
        receiver_id: Snowflake,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.participants.includes(receiver_id) {
            return Err(DomainError::ValidationError(format!(
                "user {receiver_id} is not part of conversation {}",
                self.id
            )));
        }
        self.message_ids.push(message_id);
        *self.unread.entry(receiver_id).or_insert(0) += 1;
        self.updated_at = at;
        Ok(())
    }

    /// Reset `user_id`'s unread counter
    pub fn mark_read(&mut self, user_id: Snowflake) {
        if self.participants.includes(user_id) {
            self.unread.insert(user_id, 0);
        }
    }

    pub fn unread_for(&self, user_id: Snowflake) -> i32 {
        self.unread.get(&user_id).copied().unwrap_or(0)
    }

    #[inline]
    pub fn last_message_id(&self) -> Option<Snowflake> {
        self.message_ids.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: i64) -> Snowflake {
        Snowflake::new(v)
    }

    #[test]
    fn test_pair_is_unordered() {
        let ab = ParticipantPair::new(id(5), id(2)).unwrap();
        let ba = ParticipantPair::new(id(2), id(5)).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low(), id(2));
        assert_eq!(ab.high(), id(5));
        assert_eq!(ab.other(id(2)), Some(id(5)));
        assert_eq!(ab.other(id(9)), None);
    }

    #[test]
    fn test_pair_rejects_self() {
        assert!(ParticipantPair::new(id(3), id(3)).unwrap_err().is_validation());
    }

    #[test]
    fn test_unread_counters() {
        let pair = ParticipantPair::new(id(1), id(2)).unwrap();
        let mut conv = Conversation::new(id(100), pair);

        conv.record_message(id(10), id(2), Utc::now()).unwrap();
        conv.record_message(id(11), id(2), Utc::now()).unwrap();
        conv.record_message(id(12), id(1), Utc::now()).unwrap();

        assert_eq!(conv.unread_for(id(2)), 2);
        assert_eq!(conv.unread_for(id(1)), 1);
        assert_eq!(conv.last_message_id(), Some(id(12)));

        conv.mark_read(id(2));
        assert_eq!(conv.unread_for(id(2)), 0);
        assert_eq!(conv.unread_for(id(1)), 1);
    }

    #[test]
    fn test_record_message_for_outsider_fails() {
        let pair = ParticipantPair::new(id(1), id(2)).unwrap();
        let mut conv = Conversation::new(id(100), pair);
        assert!(conv.record_message(id(10), id(3), Utc::now()).is_err());
        assert!(conv.message_ids.is_empty());
    }
}
