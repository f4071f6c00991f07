use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Base URL of the public chess.com REST API. Read-only, no auth.
pub const API_BASE: &str = "https://api.chess.com/pub";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const UA: &str = "chesscast/0.1";

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "chesscast";
const CACHE_FILE: &str = "http_cache.json";

static CLIENT: OnceCell<Client> = OnceCell::new();
static CACHE: Mutex<Option<HttpCacheFile>> = Mutex::new(None);

fn client() -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| {
        let timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| FetchError::ClientInit(e.to_string()))
    })
}

/// GET the URL and return the body, bypassing the revalidation cache.
/// Used for current-games lookups, which must always reflect the live state.
pub fn get_json(url: &str) -> Result<String, FetchError> {
    let resp = client()?
        .get(url)
        .header(USER_AGENT, UA)
        .send()
        .map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    let status = resp.status();
    let body = resp.text().map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(body)
}

/// GET the URL with ETag/Last-Modified revalidation against an on-disk
/// cache. Monthly archives are immutable once the month is over, and the
/// chess.com API serves validators on every endpoint, so a 304 saves the
/// whole body transfer.
pub fn get_json_cached(url: &str) -> Result<String, FetchError> {
    let cached_entry = {
        let mut guard = CACHE.lock().expect("http cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(url).cloned()
    };

    let mut req = client()?.get(url).header(USER_AGENT, UA);
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let status = resp.status();
    let headers = resp.headers().clone();

    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            return Ok(entry.body);
        }
        return Err(FetchError::Transport {
            url: url.to_string(),
            reason: "received 304 without cache body".to_string(),
        });
    }

    let body = resp.text().map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let entry = CacheEntry {
        body: body.clone(),
        etag: header_string(&headers, ETAG),
        last_modified: header_string(&headers, LAST_MODIFIED),
        fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
    };
    store_cache_entry(url, entry);
    Ok(body)
}

fn header_string(headers: &reqwest::header::HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

fn store_cache_entry(key: &str, entry: CacheEntry) {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> HttpCacheFile {
    let Some(path) = cache_path() else {
        return HttpCacheFile::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &HttpCacheFile) -> std::io::Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).unwrap_or_default();
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
