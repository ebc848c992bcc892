//! Wire format of the remote top-100 snapshots consumed by the populate route.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::dao::models::GameFields;

/// Scalar that snapshots encode as a JSON string, number or boolean. Stored as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RemoteScalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for RemoteScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteScalar::Text(text) => f.write_str(text),
            RemoteScalar::Number(number) => write!(f, "{number}"),
            RemoteScalar::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

/// Single app listing as published in a snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteGame {
    #[serde(default)]
    pub publisher_id: Option<RemoteScalar>,
    #[serde(default)]
    pub name: Option<RemoteScalar>,
    #[serde(default)]
    pub os: Option<RemoteScalar>,
    #[serde(default)]
    pub app_id: Option<RemoteScalar>,
    #[serde(default)]
    pub bundle_id: Option<RemoteScalar>,
    #[serde(default)]
    pub version: Option<RemoteScalar>,
}

impl From<RemoteGame> for GameFields {
    fn from(remote: RemoteGame) -> Self {
        let text = |value: Option<RemoteScalar>| value.map(|value| value.to_string());
        let is_published = remote.publisher_id.is_some();
        Self {
            publisher_id: text(remote.publisher_id),
            name: text(remote.name),
            platform: text(remote.os),
            store_id: text(remote.app_id),
            bundle_id: text(remote.bundle_id),
            app_version: text(remote.version),
            is_published,
        }
    }
}

/// Listings read from one snapshot.
#[derive(Debug, Default)]
pub struct DecodedSnapshot {
    /// Records that decoded as listings, in snapshot order.
    pub games: Vec<RemoteGame>,
    /// Why each remaining record was rejected.
    pub rejected: Vec<serde_json::Error>,
}

/// Flatten one level of grouping, then decode every record on its own so a malformed
/// record only costs itself.
pub fn decode_snapshot(entries: Vec<Value>) -> DecodedSnapshot {
    let records = entries.into_iter().flat_map(|entry| match entry {
        Value::Array(group) => group,
        record => vec![record],
    });

    let mut snapshot = DecodedSnapshot::default();
    for record in records {
        match serde_json::from_value::<RemoteGame>(record) {
            Ok(game) => snapshot.games.push(game),
            Err(err) => snapshot.rejected.push(err),
        }
    }
    snapshot
}
