pub mod customer;
pub mod memory;

use eventstore::{Client, EventData, ResolvedEvent};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::domain::{
    customer::{Customer, CustomerEvent},
    DataAccessError, Entity, Event, Id,
};

use std::{fmt::Display, str::FromStr};

impl From<eventstore::Error> for DataAccessError {
    fn from(value: eventstore::Error) -> Self {
        match value {
            eventstore::Error::ConnectionClosed
            | eventstore::Error::Grpc { .. }
            | eventstore::Error::GrpcConnectionError(_)
            | eventstore::Error::DeadlineExceeded
            | eventstore::Error::InitializationError(_) => Self::ConnectionError(Box::new(value)),
            eventstore::Error::ResourceNotFound | eventstore::Error::ResourceDeleted => {
                Self::ReadError(Box::new(value))
            }
            eventstore::Error::ResourceAlreadyExists
            | eventstore::Error::WrongExpectedVersion { .. } => Self::WriteError(Box::new(value)),
            eventstore::Error::IllegalStateError(_) => Self::ClientSideError(Box::new(value)),
            _ => Self::QueryError(Box::new(value)),
        }
    }
}

impl From<EventConvertError> for DataAccessError {
    fn from(value: EventConvertError) -> Self {
        DataAccessError::ClientSideError(Box::new(value))
    }
}

#[derive(Debug)]
pub struct EventConvertError;

impl std::error::Error for EventConvertError {}

impl Display for EventConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to convert event")
    }
}

impl From<serde_json::Error> for EventConvertError {
    fn from(_value: serde_json::Error) -> Self {
        EventConvertError
    }
}

/// ストリーム名 `<entity>-<id>` からIDを取り出す
///
/// UUIDはハイフンを含むため、最初のハイフン以降をIDとみなす。
fn entity_id<I, T>(stream_id: &str) -> Option<I>
where
    I: Id<Inner = T>,
    T: FromStr,
{
    stream_id
        .split_once('-')
        .and_then(|(_, id)| id.parse::<T>().ok())
        .map(I::from)
}

fn stream_name<E: Entity>(id: E::Id) -> String {
    E::entity_name().to_owned() + "-" + &id.to_string()
}

fn from_event<E: Event>(event: E) -> Result<EventData, EventConvertError> {
    let root = serde_json::to_value(event)?;
    let (event_type, mut data) = match root {
        Value::Object(map) => map.into_iter().next().ok_or(EventConvertError)?,
        _ => return Err(EventConvertError),
    };
    data.as_object_mut().ok_or(EventConvertError)?.remove("id");
    Ok(EventData::json(event_type, data)?)
}

fn try_from_resolved_event<E, I>(value: &ResolvedEvent) -> Result<E, EventConvertError>
where
    E: DeserializeOwned + Event<Id = I>,
    I: Id,
{
    let event = value.get_original_event();
    let id = entity_id::<I, I::Inner>(&event.stream_id).ok_or(EventConvertError)?;
    let mut data: Value = serde_json::from_slice(event.data.as_ref())?;
    data.as_object_mut()
        .ok_or(EventConvertError)?
        .insert("id".to_owned(), json!(id));
    let mut root = Map::new();
    root.insert(event.event_type.clone(), data);
    Ok(serde_json::from_value(Value::Object(root))?)
}

/// `<category>-<id>` ストリームのイベントであれば変換する
fn decode_event<E, I>(
    value: &ResolvedEvent,
    category: &str,
) -> Option<Result<E, EventConvertError>>
where
    E: DeserializeOwned + Event<Id = I>,
    I: Id,
{
    let prefix = format!("{}-", category);
    match value.get_original_event().stream_id.starts_with(&prefix) {
        true => Some(try_from_resolved_event(value)),
        false => None,
    }
}

/// 顧客ストリームのイベントであれば変換する
///
/// 顧客以外のストリーム（システムイベントや会員番号の予約）は `None`。
pub fn decode_customer_event(
    value: &ResolvedEvent,
) -> Option<Result<CustomerEvent, EventConvertError>> {
    decode_event(value, Customer::entity_name())
}

/// ストリームの全イベントをリビジョン付きで読み込む
///
/// ストリームが存在しないか削除済みの場合は `None`。
async fn read_events<E, I>(
    client: &Client,
    stream_name: String,
) -> Result<Option<Vec<(u64, E)>>, DataAccessError>
where
    E: DeserializeOwned + Event<Id = I>,
    I: Id,
{
    let mut stream = match client.read_stream(stream_name, &Default::default()).await {
        Ok(stream) => stream,
        Err(eventstore::Error::ResourceNotFound) | Err(eventstore::Error::ResourceDeleted) => {
            return Ok(None)
        }
        Err(e) => return Err(e.into()),
    };
    let mut events = Vec::new();
    loop {
        match stream.next().await {
            Ok(Some(e)) => {
                let revision = e.get_original_event().revision;
                events.push((revision, try_from_resolved_event(&e)?));
            }
            Ok(_) => break,
            Err(eventstore::Error::ResourceDeleted) => return Ok(None),
            Err(eventstore::Error::ResourceNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
    match events.is_empty() {
        true => Ok(None),
        false => Ok(Some(events)),
    }
}
