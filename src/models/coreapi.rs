//! Core kinds: secrets, config maps and events

use std::collections::BTreeMap;

use async_graphql::{Enum, ID, Json, SimpleObject};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1 as corev1;
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use super::meta::ObjectMeta;
use super::reference::ObjectReference;
use super::resource::{Envelope, FromObject, ModelingError};

/// A Secret. Values are exposed decoded.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Secret {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[graphql(name = "type")]
    pub secret_type: Option<String>,
    #[graphql(skip)]
    pub data: BTreeMap<String, String>,
    pub unstructured: Json<Value>,
}

impl FromObject for Secret {
    const VARIANT: &'static str = "Secret";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let typed: corev1::Secret = env.decode()?;
        let data = typed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, String::from_utf8_lossy(&v.0).into_owned()))
            .collect();
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            raw,
            ..
        } = env;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            secret_type: typed.type_,
            data,
            unstructured: Json(raw),
        })
    }
}

/// A ConfigMap
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ConfigMap {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[graphql(skip)]
    pub data: BTreeMap<String, String>,
    pub unstructured: Json<Value>,
}

impl FromObject for ConfigMap {
    const VARIANT: &'static str = "ConfigMap";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let typed: corev1::ConfigMap = env.decode()?;
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            raw,
            ..
        } = env;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            data: typed.data.unwrap_or_default(),
            unstructured: Json(raw),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum EventType {
    Normal,
    Warning,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(default)]
pub struct EventSource {
    pub component: Option<String>,
    pub host: Option<String>,
}

/// Event fields as stored; timestamps are kept as sent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EventBody {
    involved_object: ObjectReference,
    #[serde(rename = "type")]
    event_type: Option<String>,
    reason: Option<String>,
    message: Option<String>,
    source: Option<EventSource>,
    count: Option<i32>,
    first_timestamp: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
    event_time: Option<DateTime<Utc>>,
}

/// A core Event
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Event {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[graphql(skip)]
    pub involved: ObjectReference,
    #[graphql(name = "type")]
    pub event_type: Option<EventType>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub source: Option<EventSource>,
    pub count: Option<i32>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub event_time: Option<DateTime<Utc>>,
}

impl Event {
    /// Time the event is ordered by: last seen, else the event time, else
    /// first seen, else when the object was created.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
            .or(self.event_time)
            .or(self.first_timestamp)
            .or(self.metadata.creation_time)
    }

    pub fn is_warning(&self) -> bool {
        self.event_type == Some(EventType::Warning)
    }
}

impl FromObject for Event {
    const VARIANT: &'static str = "Event";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let body: EventBody = env.decode()?;
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            ..
        } = env;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            involved: body.involved_object,
            event_type: match body.event_type.as_deref() {
                Some("Normal") => Some(EventType::Normal),
                Some("Warning") => Some(EventType::Warning),
                _ => None,
            },
            reason: body.reason,
            message: body.message,
            source: body.source,
            count: body.count,
            first_timestamp: body.first_timestamp,
            last_timestamp: body.last_timestamp,
            event_time: body.event_time,
        })
    }
}
