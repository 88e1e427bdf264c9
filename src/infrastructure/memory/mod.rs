//! In-Memory Store Implementations
//!
//! Process-local implementations of the domain repository traits, backed by
//! `DashMap`. Atomic operations rely on DashMap's per-shard write lock, so an
//! increment or an add-to-set runs entirely under one entry guard. No guard
//! is ever held across an `.await`.
//!
//! Used by the test suite and by `storage.backend = "memory"`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{
    Message, MessageRepository, NewMessage, NewRoom, PageRequest, ReadStatus,
    ReadStatusRepository, Room, RoomRepository, SequenceRepository, ROOM_ID_SEQUENCE,
};
use crate::shared::error::AppError;

fn room_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Room {} not found", id))
}

/// Named counters held in memory.
#[derive(Default)]
pub struct MemorySequenceRepository {
    counters: DashMap<String, i64>,
}

impl MemorySequenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceRepository for MemorySequenceRepository {
    async fn next_value(&self, name: &str) -> Result<i64, AppError> {
        let mut counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

pub struct MemoryRoomRepository {
    rooms: DashMap<i64, Room>,
    sequences: Arc<dyn SequenceRepository>,
}

impl MemoryRoomRepository {
    pub fn new(sequences: Arc<dyn SequenceRepository>) -> Self {
        Self {
            rooms: DashMap::new(),
            sequences,
        }
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn create(&self, room: NewRoom) -> Result<Room, AppError> {
        let id = self.sequences.next_value(ROOM_ID_SEQUENCE).await?;
        let now = Utc::now();
        let room = Room {
            id,
            title: room.title,
            subject: room.subject,
            creator: room.creator,
            creator_nickname: room.creator_nickname,
            meeting_date: room.meeting_date,
            max_participants: room.max_participants,
            notice: String::new(),
            last_message_seq: 0,
            banned_usernames: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.rooms.insert(id, room.clone());
        Ok(room)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        Ok(self.rooms.get(&id).map(|r| r.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<Room>, AppError> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.value().clone()).collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    async fn save(&self, room: &Room) -> Result<(), AppError> {
        let mut stored = self.rooms.get_mut(&room.id).ok_or_else(|| room_not_found(room.id))?;
        stored.title = room.title.clone();
        stored.subject = room.subject.clone();
        stored.notice = room.notice.clone();
        stored.updated_at = room.updated_at;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.rooms.remove(&id);
        Ok(())
    }

    async fn increment_and_fetch_seq(&self, id: i64) -> Result<i64, AppError> {
        let mut room = self.rooms.get_mut(&id).ok_or_else(|| room_not_found(id))?;
        room.last_message_seq += 1;
        Ok(room.last_message_seq)
    }

    async fn add_banned_username(&self, id: i64, username: &str) -> Result<bool, AppError> {
        let mut room = self.rooms.get_mut(&id).ok_or_else(|| room_not_found(id))?;
        if room.is_banned(username) {
            return Ok(false);
        }
        room.banned_usernames.push(username.to_string());
        room.updated_at = Utc::now();
        Ok(true)
    }
}

/// Per-room logs kept sorted by `seq`.
pub struct MemoryMessageRepository {
    logs: DashMap<i64, Arc<RwLock<Vec<Message>>>>,
    rooms: Arc<dyn RoomRepository>,
}

impl MemoryMessageRepository {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self {
            logs: DashMap::new(),
            rooms,
        }
    }

    fn log(&self, room_id: i64) -> Option<Arc<RwLock<Vec<Message>>>> {
        self.logs.get(&room_id).map(|l| Arc::clone(l.value()))
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn append(&self, message: NewMessage) -> Result<Message, AppError> {
        let seq = self.rooms.increment_and_fetch_seq(message.room_id).await?;

        let message = Message {
            room_id: message.room_id,
            seq,
            sender: message.sender,
            sender_nickname: message.sender_nickname,
            body: message.body,
            message_type: message.message_type,
            timestamp: Utc::now(),
        };

        let room_id = message.room_id;
        {
            let log = Arc::clone(self.logs.entry(room_id).or_default().value());
            let mut log = log.write();
            // Concurrent appenders may finish out of seq order
            let position = log.partition_point(|m| m.seq < seq);
            log.insert(position, message.clone());
        }

        // The room may have been deleted after the seq was allocated. Rooms
        // are deleted before their logs, so either the teardown clears this
        // write or this check sees the room gone.
        if self.rooms.find_by_id(room_id).await?.is_none() {
            self.logs.remove(&room_id);
            return Err(room_not_found(room_id));
        }

        Ok(message)
    }

    async fn find_page(&self, room_id: i64, page: PageRequest) -> Result<Vec<Message>, AppError> {
        let Some(log) = self.log(room_id) else {
            return Ok(Vec::new());
        };
        let log = log.read();
        Ok(log
            .iter()
            .rev()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        Ok(self.log(room_id).map(|l| l.read().len() as i64).unwrap_or(0))
    }

    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError> {
        self.logs.remove(&room_id);
        Ok(())
    }
}

/// Read cursors grouped by room, so membership counts touch one entry.
#[derive(Default)]
pub struct MemoryReadStatusRepository {
    rooms: DashMap<i64, HashMap<String, ReadStatus>>,
}

impl MemoryReadStatusRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadStatusRepository for MemoryReadStatusRepository {
    async fn find(&self, room_id: i64, username: &str) -> Result<Option<ReadStatus>, AppError> {
        Ok(self
            .rooms
            .get(&room_id)
            .and_then(|members| members.get(username).cloned()))
    }

    async fn exists(&self, room_id: i64, username: &str) -> Result<bool, AppError> {
        Ok(self
            .rooms
            .get(&room_id)
            .map(|members| members.contains_key(username))
            .unwrap_or(false))
    }

    async fn save(&self, status: &ReadStatus) -> Result<(), AppError> {
        self.rooms
            .entry(status.room_id)
            .or_default()
            .insert(status.username.clone(), status.clone());
        Ok(())
    }

    async fn delete(&self, room_id: i64, username: &str) -> Result<bool, AppError> {
        let removed = self
            .rooms
            .get_mut(&room_id)
            .map(|mut members| members.remove(username).is_some())
            .unwrap_or(false);
        self.rooms.remove_if(&room_id, |_, members| members.is_empty());
        Ok(removed)
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        Ok(self
            .rooms
            .get(&room_id)
            .map(|members| members.len() as i64)
            .unwrap_or(0))
    }

    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ReadStatus>, AppError> {
        let mut statuses: Vec<ReadStatus> = self
            .rooms
            .get(&room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default();
        statuses.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(statuses)
    }

    async fn find_by_user(&self, username: &str) -> Result<Vec<ReadStatus>, AppError> {
        let mut statuses: Vec<ReadStatus> = self
            .rooms
            .iter()
            .filter_map(|members| members.value().get(username).cloned())
            .collect();
        statuses.sort_by_key(|s| s.room_id);
        Ok(statuses)
    }

    async fn upsert_read_cursor(
        &self,
        room_id: i64,
        username: &str,
        seq: i64,
    ) -> Result<(), AppError> {
        let mut members = self.rooms.entry(room_id).or_default();
        let status = members
            .entry(username.to_string())
            .or_insert_with(|| ReadStatus::new(room_id, username, username));
        status.last_read_message_seq = seq;
        status.last_read_at = Utc::now();
        Ok(())
    }

    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError> {
        self.rooms.remove(&room_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn new_room(creator: &str) -> NewRoom {
        NewRoom {
            title: "Standup".into(),
            subject: "daily".into(),
            creator: creator.into(),
            creator_nickname: creator.to_uppercase(),
            meeting_date: Utc::now(),
            max_participants: 4,
        }
    }

    fn talk(room_id: i64, body: &str) -> NewMessage {
        NewMessage {
            room_id,
            sender: "alice".into(),
            sender_nickname: "Alice".into(),
            body: body.into(),
            message_type: crate::domain::MessageType::Talk,
        }
    }

    fn stores() -> (Arc<MemoryRoomRepository>, Arc<MemoryMessageRepository>) {
        let rooms = Arc::new(MemoryRoomRepository::new(Arc::new(
            MemorySequenceRepository::new(),
        )));
        let messages = Arc::new(MemoryMessageRepository::new(rooms.clone()));
        (rooms, messages)
    }

    #[tokio::test]
    async fn test_sequence_starts_at_one_per_name() {
        let sequences = MemorySequenceRepository::new();
        assert_eq!(sequences.next_value("roomId").await.unwrap(), 1);
        assert_eq!(sequences.next_value("roomId").await.unwrap(), 2);
        assert_eq!(sequences.next_value("other").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sequence_is_gapless() {
        let sequences = Arc::new(MemorySequenceRepository::new());
        let handles: Vec<_> = (0..200)
            .map(|_| {
                let sequences = sequences.clone();
                tokio::spawn(async move { sequences.next_value("roomId").await.unwrap() })
            })
            .collect();

        let mut values = HashSet::new();
        for handle in handles {
            assert!(values.insert(handle.await.unwrap()));
        }
        assert_eq!(values, (1..=200).collect::<HashSet<i64>>());
    }

    #[tokio::test]
    async fn test_room_ids_come_from_sequence() {
        let (rooms, _) = stores();
        let first = rooms.create(new_room("alice")).await.unwrap();
        let second = rooms.create(new_room("bob")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.last_message_seq, 0);
        assert!(first.notice.is_empty());
        assert_eq!(rooms.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ban_is_add_to_set() {
        let (rooms, _) = stores();
        let room = rooms.create(new_room("alice")).await.unwrap();

        assert!(rooms.add_banned_username(room.id, "bob").await.unwrap());
        assert!(!rooms.add_banned_username(room.id, "bob").await.unwrap());

        let room = rooms.find_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(room.banned_usernames, vec!["bob".to_string()]);
        assert!(matches!(
            rooms.add_banned_username(99, "bob").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_keeps_watermark_and_bans() {
        let (rooms, messages) = stores();
        let mut room = rooms.create(new_room("alice")).await.unwrap();
        messages.append(talk(room.id, "one")).await.unwrap();
        rooms.add_banned_username(room.id, "eve").await.unwrap();

        room.notice = "be nice".into();
        rooms.save(&room).await.unwrap();

        let stored = rooms.find_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(stored.notice, "be nice");
        assert_eq!(stored.last_message_seq, 1);
        assert_eq!(stored.banned_usernames, vec!["eve".to_string()]);
    }

    #[tokio::test]
    async fn test_append_assigns_seq_and_pages_newest_first() {
        let (rooms, messages) = stores();
        let room = rooms.create(new_room("alice")).await.unwrap();
        for i in 1..=5 {
            let message = messages.append(talk(room.id, &format!("m{i}"))).await.unwrap();
            assert_eq!(message.seq, i);
        }

        let page: Vec<i64> = messages
            .find_page(room.id, PageRequest::new(0, 2))
            .await
            .unwrap()
            .iter()
            .map(|m| m.seq)
            .collect();
        assert_eq!(page, vec![5, 4]);

        let last: Vec<i64> = messages
            .find_page(room.id, PageRequest::new(2, 2))
            .await
            .unwrap()
            .iter()
            .map(|m| m.seq)
            .collect();
        assert_eq!(last, vec![1]);
        assert_eq!(messages.count_by_room(room.id).await.unwrap(), 5);
        assert_eq!(
            rooms.find_by_id(room.id).await.unwrap().unwrap().last_message_seq,
            5
        );
    }

    #[tokio::test]
    async fn test_append_to_missing_room_fails() {
        let (_, messages) = stores();
        assert!(matches!(
            messages.append(talk(42, "hello")).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(messages.count_by_room(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_status_membership() {
        let statuses = MemoryReadStatusRepository::new();
        statuses.save(&ReadStatus::new(1, "alice", "Alice")).await.unwrap();
        statuses.save(&ReadStatus::new(1, "bob", "Bob")).await.unwrap();
        statuses.save(&ReadStatus::new(2, "alice", "Alice")).await.unwrap();

        assert_eq!(statuses.count_by_room(1).await.unwrap(), 2);
        assert!(statuses.exists(1, "bob").await.unwrap());
        assert_eq!(statuses.find_by_user("alice").await.unwrap().len(), 2);

        assert!(statuses.delete(1, "bob").await.unwrap());
        assert!(!statuses.delete(1, "bob").await.unwrap());
        assert_eq!(statuses.count_by_room(1).await.unwrap(), 1);

        statuses.delete_all_by_room(1).await.unwrap();
        assert_eq!(statuses.count_by_room(1).await.unwrap(), 0);
        assert_eq!(statuses.find_by_user("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_read_cursor() {
        let statuses = MemoryReadStatusRepository::new();
        statuses.save(&ReadStatus::new(1, "bob", "Bobby")).await.unwrap();

        statuses.upsert_read_cursor(1, "bob", 7).await.unwrap();
        let status = statuses.find(1, "bob").await.unwrap().unwrap();
        assert_eq!(status.last_read_message_seq, 7);
        assert_eq!(status.nickname, "Bobby");

        // Not monotonic at the store level
        statuses.upsert_read_cursor(1, "bob", 3).await.unwrap();
        assert_eq!(
            statuses.find(1, "bob").await.unwrap().unwrap().last_read_message_seq,
            3
        );

        statuses.upsert_read_cursor(1, "carol", 2).await.unwrap();
        assert_eq!(statuses.count_by_room(1).await.unwrap(), 2);
    }
}
