//! # Store
//!
//! Redis-backed document store for the roster and the system configuration.
//!
//! ## Schema
//!
//! - `participantes` hash: field is the participant id, value is the JSON
//!   document. One `HSET`/`HDEL` per mutation, so a failed round-trip never
//!   leaves a partial record.
//! - `participantes:next_id` counter: `INCR` hands out ids. Ids are unique,
//!   never reused, and monotone, which makes numeric id order equal to
//!   registration order.
//! - `config:system` key: JSON `{ "limiteParticipantes": N }`. Created with
//!   the default limit the first time anything reads it.
//!
//! The roster is small (tens to low hundreds of records), so every admin
//! action re-reads the full hash instead of caching it; filtering happens in
//! [`crate::roster`].

use std::{collections::HashMap, time::Duration};

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, roster::Participant};

pub const PARTICIPANTS_KEY: &str = "participantes";
pub const PARTICIPANT_SEQ_KEY: &str = "participantes:next_id";
pub const CONFIG_KEY: &str = "config:system";

pub const DEFAULT_CAPACITY: u32 = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(rename = "limiteParticipantes")]
    pub capacity: u32,
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();

    client
        .get_connection_manager_with_config(config)
        .await
        .unwrap()
}

/// Assigns the next id and appends the document. Returns the stored record
/// with its id filled in.
pub async fn create_participant(
    conn: &mut ConnectionManager,
    mut participant: Participant,
) -> Result<Participant, AppError> {
    let id: u64 = conn.incr(PARTICIPANT_SEQ_KEY, 1).await?;
    participant.id = id.to_string();

    let document = serde_json::to_string(&participant)?;
    let _: () = conn.hset(PARTICIPANTS_KEY, &participant.id, document).await?;

    Ok(participant)
}

/// Full roster in registration order.
pub async fn read_roster(conn: &mut ConnectionManager) -> Result<Vec<Participant>, AppError> {
    let documents: HashMap<String, String> = conn.hgetall(PARTICIPANTS_KEY).await?;

    let mut roster = Vec::with_capacity(documents.len());
    for (id, document) in documents {
        let mut participant: Participant = serde_json::from_str(&document)?;
        participant.id = id;
        roster.push(participant);
    }

    // hash iteration order is arbitrary; ids are monotone
    roster.sort_by_key(|p| p.id.parse::<u64>().unwrap_or(u64::MAX));

    Ok(roster)
}

pub async fn read_participant(
    conn: &mut ConnectionManager,
    id: &str,
) -> Result<Participant, AppError> {
    let document: Option<String> = conn.hget(PARTICIPANTS_KEY, id).await?;

    match document {
        Some(document) => {
            let mut participant: Participant = serde_json::from_str(&document)?;
            participant.id = id.to_string();
            Ok(participant)
        }
        None => Err(AppError::NotFound),
    }
}

pub async fn write_participant(
    conn: &mut ConnectionManager,
    participant: &Participant,
) -> Result<(), AppError> {
    let document = serde_json::to_string(participant)?;
    let _: () = conn.hset(PARTICIPANTS_KEY, &participant.id, document).await?;

    Ok(())
}

/// Permanent removal, no soft delete.
pub async fn delete_participant(conn: &mut ConnectionManager, id: &str) -> Result<(), AppError> {
    let removed: i64 = conn.hdel(PARTICIPANTS_KEY, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Configured participant limit, writing the default on first read.
pub async fn read_capacity(conn: &mut ConnectionManager) -> Result<u32, AppError> {
    let document: Option<String> = conn.get(CONFIG_KEY).await?;

    match document {
        Some(document) => {
            let config: SystemConfig = serde_json::from_str(&document)?;
            Ok(config.capacity)
        }
        None => {
            write_capacity(conn, DEFAULT_CAPACITY).await?;
            Ok(DEFAULT_CAPACITY)
        }
    }
}

pub async fn write_capacity(conn: &mut ConnectionManager, capacity: u32) -> Result<(), AppError> {
    let document = serde_json::to_string(&SystemConfig { capacity })?;
    let _: () = conn.set(CONFIG_KEY, document).await?;

    Ok(())
}
