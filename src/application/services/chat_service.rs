//! Chat Service
//!
//! Room lifecycle, membership, message send and read-state bookkeeping.
//! This is the only component that talks to the event fan-out.
//!
//! Every mutation commits to the stores first and publishes afterwards.
//! Publishing is best effort: a failed publish is logged and counted, and
//! never fails or undoes the mutation that produced it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use crate::config::ChatSettings;
use crate::domain::{
    unread_count, ChatEvent, EventPublisher, EventScope, Message, MessageRepository, MessageType,
    NewMessage, NewRoom, PageRequest, ReadStatus, ReadStatusRepository, Room, RoomRepository,
};
use crate::infrastructure::metrics;
use crate::infrastructure::ChatStores;
use crate::shared::error::AppError;

const MAX_TITLE_LENGTH: usize = 100;
const MAX_SUBJECT_LENGTH: usize = 255;
const MAX_NOTICE_LENGTH: usize = 500;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Create a room; the creator joins it immediately.
    async fn create_room(&self, request: CreateRoomDto) -> Result<Room, ChatError>;

    /// Every room with its member count and the viewer's unread count.
    async fn list_rooms_for_viewer(&self, viewer: &str) -> Result<Vec<RoomSummaryDto>, ChatError>;

    async fn get_room_detail(&self, room_id: i64) -> Result<RoomDetailDto, ChatError>;

    /// Join a room. Returns `false` when the user already was a member.
    async fn join_room(&self, room_id: i64, username: &str, nickname: &str)
        -> Result<bool, ChatError>;

    /// Append a message and notify the room, its members and the lobby.
    async fn send_message(&self, request: SendMessageDto) -> Result<Message, ChatError>;

    /// Move a member's read cursor. Returns the remaining unread count for
    /// the room, or `None` when the user is not a member.
    async fn update_read_cursor(
        &self,
        room_id: i64,
        username: &str,
        seq: i64,
    ) -> Result<Option<i64>, ChatError>;

    /// One page of history in ascending seq order; page 0 is the newest.
    async fn get_previous_messages(
        &self,
        room_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Message>, ChatError>;

    async fn leave_room(&self, room_id: i64, username: &str) -> Result<LeaveOutcome, ChatError>;

    async fn delete_room_by_creator(&self, room_id: i64, username: &str) -> Result<(), ChatError>;

    async fn get_my_room_ids(&self, username: &str) -> Result<Vec<i64>, ChatError>;

    async fn get_total_unread_count(&self, username: &str) -> Result<i64, ChatError>;

    /// Members other than the requester. Creator only.
    async fn get_participants(
        &self,
        room_id: i64,
        requester: &str,
    ) -> Result<Vec<ParticipantDto>, ChatError>;

    async fn kick_and_ban(&self, room_id: i64, creator: &str, target: &str)
        -> Result<(), ChatError>;

    async fn update_notice(&self, room_id: i64, username: &str, notice: String)
        -> Result<Room, ChatError>;

    async fn is_member(&self, room_id: i64, username: &str) -> Result<bool, ChatError>;
}

/// Create room request
#[derive(Debug, Clone)]
pub struct CreateRoomDto {
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub creator_nickname: String,
    pub meeting_date: DateTime<Utc>,
    pub max_participants: i32,
}

/// Send message request
#[derive(Debug, Clone)]
pub struct SendMessageDto {
    pub room_id: i64,
    pub sender: String,
    pub sender_nickname: String,
    pub body: String,
    pub message_type: MessageType,
}

/// A room as seen from the lobby by one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: i64,
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub creator_nickname: String,
    pub meeting_date: DateTime<Utc>,
    pub max_participants: i32,
    pub participant_count: i64,
    pub unread_count: i64,
    pub last_message_seq: i64,
    /// Whether the viewer is a member
    pub joined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    #[serde(flatten)]
    pub room: Room,
    pub participant_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub username: String,
    pub nickname: String,
    pub last_read_message_seq: i64,
}

impl From<ReadStatus> for ParticipantDto {
    fn from(status: ReadStatus) -> Self {
        Self {
            username: status.username,
            nickname: status.nickname,
            last_read_message_seq: status.last_read_message_seq,
        }
    }
}

/// What a leave request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveOutcome {
    NotMember,
    Left,
    /// The user was the last member, so the room was torn down
    RoomDeleted,
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Room {0} does not exist")]
    RoomNotFound(i64),

    #[error("Room is full ({current}/{max})")]
    CapacityExceeded { current: i64, max: i32 },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::RoomNotFound(_) => AppError::NotFound(err.to_string()),
            ChatError::CapacityExceeded { .. } => AppError::Conflict(err.to_string()),
            ChatError::Forbidden(msg) => AppError::Forbidden(msg),
            ChatError::InvalidArgument(msg) => AppError::BadRequest(msg),
            ChatError::Timeout => AppError::Internal(err.to_string()),
            ChatError::Unexpected(msg) => AppError::Internal(msg),
        }
    }
}

/// ChatService implementation
pub struct ChatServiceImpl {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    read_status: Arc<dyn ReadStatusRepository>,
    publisher: Arc<dyn EventPublisher>,
    settings: ChatSettings,
    store_timeout: Duration,
    room_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ChatServiceImpl {
    pub fn new(stores: ChatStores, publisher: Arc<dyn EventPublisher>, settings: ChatSettings) -> Self {
        Self {
            rooms: stores.rooms,
            messages: stores.messages,
            read_status: stores.read_status,
            publisher,
            store_timeout: Duration::from_millis(settings.store_timeout_ms),
            settings,
            room_locks: DashMap::new(),
        }
    }

    /// Run a store call under the store timeout, leaving its own error untouched.
    async fn bounded<T, F>(&self, fut: F) -> Result<Result<T, AppError>, ChatError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| {
                tracing::error!(timeout_ms = self.settings.store_timeout_ms, "Store call timed out");
                ChatError::Timeout
            })
    }

    /// Run a store call under the store timeout; any store error is unexpected.
    async fn guarded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ChatError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        self.bounded(fut).await?.map_err(|e| unexpected(operation, e))
    }

    async fn find_room(&self, room_id: i64) -> Result<Room, ChatError> {
        self.guarded("find room", self.rooms.find_by_id(room_id))
            .await?
            .ok_or(ChatError::RoomNotFound(room_id))
    }

    async fn find_owned_room(&self, room_id: i64, username: &str) -> Result<Room, ChatError> {
        let room = self.find_room(room_id).await?;
        if !room.is_creator(username) {
            return Err(ChatError::Forbidden(
                "Only the room creator can do that".to_string(),
            ));
        }
        Ok(room)
    }

    /// Serialize membership changes of one room within this process.
    async fn membership_lock(&self, room_id: i64) -> Option<OwnedMutexGuard<()>> {
        if !self.settings.serialize_membership {
            return None;
        }
        let lock = self.room_locks.entry(room_id).or_default().clone();
        Some(lock.lock_owned().await)
    }

    /// Delete the room, then its log and every membership row.
    ///
    /// The room goes first: an append that allocated its seq before the
    /// delete either lands before the log is cleared or finds the room gone
    /// and is rejected by the message store.
    async fn teardown(&self, room_id: i64) -> Result<(), ChatError> {
        self.guarded("delete room", self.rooms.delete(room_id)).await?;
        self.guarded("delete messages", self.messages.delete_all_by_room(room_id))
            .await?;
        self.guarded("delete read status", self.read_status.delete_all_by_room(room_id))
            .await?;
        self.room_locks.remove(&room_id);

        metrics::record_room_deleted();
        tracing::info!(room_id, "Room deleted");
        Ok(())
    }

    async fn publish(&self, scope: EventScope, event: ChatEvent) {
        let result = match tokio::time::timeout(self.store_timeout, self.publisher.publish(&scope, &event)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Internal("publish timed out".into())),
        };

        metrics::record_event_published(scope.kind(), result.is_ok());
        if let Err(e) = result {
            tracing::warn!(
                scope = %scope,
                event_type = event.event_name(),
                error = %e,
                "Failed to publish event"
            );
        }
    }

    async fn publish_participant_count(&self, room_id: i64) {
        match self.guarded("count members", self.read_status.count_by_room(room_id)).await {
            Ok(participant_count) => {
                self.publish(
                    EventScope::room(room_id),
                    ChatEvent::ParticipantsUpdated {
                        room_id,
                        participant_count,
                    },
                )
                .await
            }
            Err(e) => tracing::warn!(room_id, error = %e, "Skipping participant count update"),
        }
    }

    /// Push every member's cross-room unread total to their user scope.
    async fn publish_unread_totals(&self, room_id: i64) -> Result<(), ChatError> {
        let members = self
            .guarded("list members", self.read_status.find_by_room(room_id))
            .await?;

        for member in members {
            let total_unread_count = self.total_unread(&member.username).await?;
            self.publish(
                EventScope::user(member.username),
                ChatEvent::TotalUnreadUpdated { total_unread_count },
            )
            .await;
        }
        Ok(())
    }

    async fn total_unread(&self, username: &str) -> Result<i64, ChatError> {
        let statuses = self
            .guarded("list user rooms", self.read_status.find_by_user(username))
            .await?;

        let unread = try_join_all(statuses.iter().map(|status| async move {
            let total = self
                .guarded("count messages", self.messages.count_by_room(status.room_id))
                .await?;
            Ok::<_, ChatError>(status.unread_of(total))
        }))
        .await?;

        Ok(unread.into_iter().sum())
    }

    async fn summarize(&self, room: Room, viewer: &str) -> Result<RoomSummaryDto, ChatError> {
        let (participant_count, total, status) = tokio::try_join!(
            self.guarded("count members", self.read_status.count_by_room(room.id)),
            self.guarded("count messages", self.messages.count_by_room(room.id)),
            self.guarded("find read status", self.read_status.find(room.id, viewer)),
        )?;

        let cursor = status.as_ref().map_or(0, |s| s.last_read_message_seq);

        Ok(RoomSummaryDto {
            room_id: room.id,
            title: room.title,
            subject: room.subject,
            creator: room.creator,
            creator_nickname: room.creator_nickname,
            meeting_date: room.meeting_date,
            max_participants: room.max_participants,
            participant_count,
            unread_count: unread_count(total, cursor),
            last_message_seq: room.last_message_seq,
            joined: status.is_some(),
        })
    }

    fn normalize_page(&self, page: PageRequest) -> PageRequest {
        let size = match page.size {
            0 => self.settings.default_page_size,
            size => size.min(self.settings.max_page_size),
        };
        PageRequest::new(page.page, size)
    }

    fn validate_room(&self, request: &CreateRoomDto) -> Result<(), ChatError> {
        let title_length = request.title.trim().chars().count();
        if title_length == 0 || title_length > MAX_TITLE_LENGTH {
            return Err(ChatError::InvalidArgument(format!(
                "Title must be 1-{MAX_TITLE_LENGTH} characters"
            )));
        }
        if request.subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(ChatError::InvalidArgument(format!(
                "Subject must be at most {MAX_SUBJECT_LENGTH} characters"
            )));
        }
        let limit = self.settings.max_participants_limit;
        if !(1..=limit).contains(&request.max_participants) {
            return Err(ChatError::InvalidArgument(format!(
                "maxParticipants must be between 1 and {limit}"
            )));
        }
        Ok(())
    }

    fn validate_body(&self, body: &str, message_type: MessageType) -> Result<(), ChatError> {
        let max = self.settings.max_message_length;
        if body.chars().count() > max {
            return Err(ChatError::InvalidArgument(format!(
                "Message must be at most {max} characters"
            )));
        }
        match message_type {
            MessageType::Talk | MessageType::Image if body.trim().is_empty() => Err(
                ChatError::InvalidArgument(format!("{message_type} message body cannot be empty")),
            ),
            _ => Ok(()),
        }
    }
}

fn unexpected(operation: &'static str, err: AppError) -> ChatError {
    tracing::error!(operation, error = %err, "Store operation failed");
    ChatError::Unexpected(format!("{operation} failed"))
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    #[instrument(skip(self, request), fields(creator = %request.creator))]
    async fn create_room(&self, request: CreateRoomDto) -> Result<Room, ChatError> {
        self.validate_room(&request)?;

        let room = self
            .guarded(
                "create room",
                self.rooms.create(NewRoom {
                    title: request.title.trim().to_string(),
                    subject: request.subject,
                    creator: request.creator.clone(),
                    creator_nickname: request.creator_nickname.clone(),
                    meeting_date: request.meeting_date,
                    max_participants: request.max_participants,
                }),
            )
            .await?;

        let creator = ReadStatus::new(room.id, request.creator, request.creator_nickname);
        if let Err(e) = self
            .guarded("save read status", self.read_status.save(&creator))
            .await
        {
            // A room without members could never be torn down by a leave
            if let Err(cleanup) = self.guarded("delete room", self.rooms.delete(room.id)).await {
                tracing::error!(
                    room_id = room.id,
                    error = %cleanup,
                    "Room left without members after failed creation"
                );
            }
            return Err(e);
        }

        metrics::record_room_created();
        tracing::info!(room_id = room.id, "Room created");

        self.publish(EventScope::Lobby, ChatEvent::RoomsChanged).await;
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms_for_viewer(&self, viewer: &str) -> Result<Vec<RoomSummaryDto>, ChatError> {
        let rooms = self.guarded("list rooms", self.rooms.find_all()).await?;
        try_join_all(rooms.into_iter().map(|room| self.summarize(room, viewer))).await
    }

    #[instrument(skip(self))]
    async fn get_room_detail(&self, room_id: i64) -> Result<RoomDetailDto, ChatError> {
        let room = self.find_room(room_id).await?;
        let participant_count = self
            .guarded("count members", self.read_status.count_by_room(room_id))
            .await?;

        Ok(RoomDetailDto {
            room,
            participant_count,
        })
    }

    #[instrument(skip(self, nickname))]
    async fn join_room(
        &self,
        room_id: i64,
        username: &str,
        nickname: &str,
    ) -> Result<bool, ChatError> {
        let _guard = self.membership_lock(room_id).await;

        let room = self.find_room(room_id).await?;
        if room.is_banned(username) {
            return Err(ChatError::Forbidden(
                "You have been banned from this room".to_string(),
            ));
        }

        if self
            .guarded("check membership", self.read_status.exists(room_id, username))
            .await?
        {
            tracing::debug!("Already a member");
            return Ok(false);
        }

        let current = self
            .guarded("count members", self.read_status.count_by_room(room_id))
            .await?;
        if !room.has_capacity_for(current) {
            return Err(ChatError::CapacityExceeded {
                current,
                max: room.max_participants,
            });
        }

        self.guarded(
            "save read status",
            self.read_status
                .save(&ReadStatus::new(room_id, username, nickname)),
        )
        .await?;

        tracing::info!("Joined room");
        Ok(true)
    }

    #[instrument(
        skip(self, request),
        fields(room_id = request.room_id, sender = %request.sender, message_type = %request.message_type)
    )]
    async fn send_message(&self, request: SendMessageDto) -> Result<Message, ChatError> {
        self.validate_body(&request.body, request.message_type)?;
        let room_id = request.room_id;
        let sender = request.sender.clone();

        let room = self.find_room(room_id).await?;
        if room.is_banned(&sender) {
            return Err(ChatError::Forbidden(
                "You have been banned from this room".to_string(),
            ));
        }
        if !self
            .guarded("check membership", self.read_status.exists(room_id, &sender))
            .await?
        {
            return Err(ChatError::Forbidden(
                "Only members can send to this room".to_string(),
            ));
        }

        let message = match self
            .bounded(self.messages.append(NewMessage {
                room_id,
                sender: request.sender,
                sender_nickname: request.sender_nickname,
                body: request.body,
                message_type: request.message_type,
            }))
            .await?
        {
            Ok(message) => message,
            Err(AppError::NotFound(_)) => return Err(ChatError::RoomNotFound(room_id)),
            Err(e) => return Err(unexpected("append message", e)),
        };

        metrics::record_message_sent(message.message_type.as_str());
        tracing::debug!(seq = message.seq, "Message appended");

        // The sender has read their own message
        {
            let _guard = self.membership_lock(room_id).await;
            let advanced = async {
                if self.read_status.exists(room_id, &sender).await? {
                    self.read_status
                        .upsert_read_cursor(room_id, &sender, message.seq)
                        .await?;
                }
                Ok::<_, AppError>(())
            };
            if let Err(e) = self.guarded("advance sender cursor", advanced).await {
                tracing::warn!(error = %e, "Could not advance sender read cursor");
            }
        }

        self.publish(EventScope::room(room_id), ChatEvent::Message(message.clone()))
            .await;

        if message.message_type.changes_membership() {
            self.publish_participant_count(room_id).await;
        }

        if let Err(e) = self.publish_unread_totals(room_id).await {
            tracing::warn!(error = %e, "Skipping unread total updates");
        }

        self.publish(EventScope::Lobby, ChatEvent::LobbyRoomUpdated { room_id })
            .await;

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn update_read_cursor(
        &self,
        room_id: i64,
        username: &str,
        seq: i64,
    ) -> Result<Option<i64>, ChatError> {
        if seq < 0 {
            return Err(ChatError::InvalidArgument(
                "Sequence number cannot be negative".to_string(),
            ));
        }

        let Some(status) = self
            .guarded("find read status", self.read_status.find(room_id, username))
            .await?
        else {
            tracing::warn!("Read cursor update from a non-member ignored");
            return Ok(None);
        };

        let cursor = if self.settings.monotonic_read_cursor && seq < status.last_read_message_seq {
            tracing::debug!(current = status.last_read_message_seq, "Stale read cursor ignored");
            status.last_read_message_seq
        } else {
            self.guarded(
                "update read cursor",
                self.read_status.upsert_read_cursor(room_id, username, seq),
            )
            .await?;
            seq
        };

        let total = self
            .guarded("count messages", self.messages.count_by_room(room_id))
            .await?;
        let unread = unread_count(total, cursor);

        self.publish(
            EventScope::user(username),
            ChatEvent::UnreadUpdated {
                room_id,
                unread_count: unread,
            },
        )
        .await;

        Ok(Some(unread))
    }

    #[instrument(skip(self))]
    async fn get_previous_messages(
        &self,
        room_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Message>, ChatError> {
        let page = self.normalize_page(page);
        let mut messages = self
            .guarded("page messages", self.messages.find_page(room_id, page))
            .await?;
        messages.reverse();
        Ok(messages)
    }

    #[instrument(skip(self))]
    async fn leave_room(&self, room_id: i64, username: &str) -> Result<LeaveOutcome, ChatError> {
        let _guard = self.membership_lock(room_id).await;

        if !self
            .guarded("check membership", self.read_status.exists(room_id, username))
            .await?
        {
            tracing::warn!("Leave from a non-member ignored");
            return Ok(LeaveOutcome::NotMember);
        }

        let members = self
            .guarded("count members", self.read_status.count_by_room(room_id))
            .await?;

        let outcome = if members <= 1 {
            self.teardown(room_id).await?;
            LeaveOutcome::RoomDeleted
        } else {
            self.guarded("delete read status", self.read_status.delete(room_id, username))
                .await?;
            tracing::info!("Left room");
            LeaveOutcome::Left
        };

        self.publish(EventScope::Lobby, ChatEvent::RoomsChanged).await;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn delete_room_by_creator(&self, room_id: i64, username: &str) -> Result<(), ChatError> {
        let _guard = self.membership_lock(room_id).await;

        self.find_owned_room(room_id, username).await?;
        self.teardown(room_id).await?;

        self.publish(EventScope::Lobby, ChatEvent::RoomsChanged).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_my_room_ids(&self, username: &str) -> Result<Vec<i64>, ChatError> {
        let statuses = self
            .guarded("list user rooms", self.read_status.find_by_user(username))
            .await?;
        Ok(statuses.into_iter().map(|s| s.room_id).collect())
    }

    #[instrument(skip(self))]
    async fn get_total_unread_count(&self, username: &str) -> Result<i64, ChatError> {
        self.total_unread(username).await
    }

    #[instrument(skip(self))]
    async fn get_participants(
        &self,
        room_id: i64,
        requester: &str,
    ) -> Result<Vec<ParticipantDto>, ChatError> {
        self.find_owned_room(room_id, requester).await?;

        let members = self
            .guarded("list members", self.read_status.find_by_room(room_id))
            .await?;

        Ok(members
            .into_iter()
            .filter(|m| m.username != requester)
            .map(ParticipantDto::from)
            .collect())
    }

    #[instrument(skip(self))]
    async fn kick_and_ban(&self, room_id: i64, creator: &str, target: &str) -> Result<(), ChatError> {
        let _guard = self.membership_lock(room_id).await;

        self.find_owned_room(room_id, creator).await?;
        if creator == target {
            return Err(ChatError::InvalidArgument(
                "You cannot kick yourself".to_string(),
            ));
        }

        match self
            .bounded(self.rooms.add_banned_username(room_id, target))
            .await?
        {
            Ok(added) => tracing::info!(newly_banned = added, "User banned"),
            Err(AppError::NotFound(_)) => return Err(ChatError::RoomNotFound(room_id)),
            Err(e) => return Err(unexpected("ban user", e)),
        }

        let removed = self
            .guarded("delete read status", self.read_status.delete(room_id, target))
            .await?;
        if !removed {
            tracing::warn!(
                target_user = %target,
                "Kick target was not a member; nothing to remove, but the ban was still recorded"
            );
            return Ok(());
        }

        // Removing the last membership row cascades to the room
        let remaining = self
            .guarded("count members", self.read_status.count_by_room(room_id))
            .await?;
        if remaining == 0 {
            self.teardown(room_id).await?;
            self.publish(EventScope::Lobby, ChatEvent::RoomsChanged).await;
            return Ok(());
        }

        self.publish(
            EventScope::room(room_id),
            ChatEvent::Kicked {
                room_id,
                kicked_username: target.to_string(),
            },
        )
        .await;
        self.publish(
            EventScope::room(room_id),
            ChatEvent::ParticipantsUpdated {
                room_id,
                participant_count: remaining,
            },
        )
        .await;

        Ok(())
    }

    #[instrument(skip(self, notice))]
    async fn update_notice(
        &self,
        room_id: i64,
        username: &str,
        notice: String,
    ) -> Result<Room, ChatError> {
        if notice.chars().count() > MAX_NOTICE_LENGTH {
            return Err(ChatError::InvalidArgument(format!(
                "Notice must be at most {MAX_NOTICE_LENGTH} characters"
            )));
        }

        let mut room = self.find_owned_room(room_id, username).await?;
        room.notice = notice;
        room.updated_at = Utc::now();

        match self.bounded(self.rooms.save(&room)).await? {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => return Err(ChatError::RoomNotFound(room_id)),
            Err(e) => return Err(unexpected("save room", e)),
        }
        tracing::info!("Notice updated");

        self.publish(
            EventScope::room(room_id),
            ChatEvent::NoticeUpdated {
                room_id,
                notice: room.notice.clone(),
            },
        )
        .await;

        Ok(room)
    }

    async fn is_member(&self, room_id: i64, username: &str) -> Result<bool, ChatError> {
        self.guarded("check membership", self.read_status.exists(room_id, username))
            .await
    }
}
