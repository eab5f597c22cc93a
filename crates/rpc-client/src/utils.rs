use chrono::{Duration, NaiveDateTime};
use faster_hex::hex_decode;
use serde::Deserialize;
use sr_types::ChainInfo;

use crate::error::{ChainError, Result};

pub(crate) const CHAIN_API_PREFIX: &str = "v1/chain";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Error body returned by the node on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    what: String,
    #[serde(default)]
    details: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    message: String,
}

/// Extract `(code, reason)` from an error response. The most specific
/// message wins; an unparsable body is used as is.
pub(crate) fn rejection(status: u16, body: &str) -> (i64, String) {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return (status as i64, body.trim().to_string()),
    };
    let code = if parsed.code != 0 {
        parsed.code
    } else {
        status as i64
    };

    let detail = parsed.error.and_then(|err| {
        err.details
            .into_iter()
            .map(|d| d.message)
            .find(|m| !m.is_empty())
            .or_else(|| Some(err.what).filter(|w| !w.is_empty()))
    });
    (code, detail.unwrap_or(parsed.message))
}

pub(crate) fn classify(url: &str, method: &str, err: reqwest::Error) -> ChainError {
    if err.is_timeout() {
        ChainError::Timeout {
            url: url.to_string(),
            method: method.to_string(),
        }
    } else if err.is_decode() || err.is_body() {
        ChainError::malformed(method, err)
    } else {
        ChainError::NetworkUnreachable {
            url: url.to_string(),
            method: method.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Transaction-as-proof-of-stake fields.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Tapos {
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

/// Reference the head block and expire `expire_in_seconds` after its time.
pub(crate) fn tapos(info: &ChainInfo, expire_in_seconds: u32) -> Result<Tapos> {
    let ref_block_num = (info.head_block_num & 0xffff) as u16;

    let id = info.head_block_id.trim_start_matches("0x");
    if !id.is_ascii() || id.len() < 24 || id.len() % 2 != 0 {
        return Err(ChainError::malformed(
            "get_chain_info",
            format!("invalid head block id {}", info.head_block_id),
        ));
    }
    let mut prefix = [0u8; 4];
    hex_decode(id[16..24].as_bytes(), &mut prefix)
        .map_err(|err| ChainError::malformed("get_chain_info", err))?;
    let ref_block_prefix = u32::from_le_bytes(prefix);

    let head_time = NaiveDateTime::parse_from_str(&info.head_block_time, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|err| {
            ChainError::malformed(
                "get_chain_info",
                format!("invalid head block time {}: {}", info.head_block_time, err),
            )
        })?;
    let expiration = (head_time + Duration::seconds(expire_in_seconds as i64))
        .format(TIME_FORMAT)
        .to_string();

    Ok(Tapos {
        expiration,
        ref_block_num,
        ref_block_prefix,
    })
}
