//! Line command handler

use std::fmt;
use std::sync::Arc;
use tracing::warn;
use valuecache::TieredCache;

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Pong,
    Value(String),
    Nil,
    Integer(i64),
    Keys(Vec<String>),
    Info(String),
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Pong => write!(f, "PONG"),
            Reply::Value(value) => write!(f, "{}", value),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Keys(keys) if keys.is_empty() => write!(f, "(empty)"),
            Reply::Keys(keys) => write!(f, "{}", keys.join(" ")),
            Reply::Info(info) => write!(f, "{}", info),
            Reply::Error(msg) => write!(f, "ERR {}", msg),
        }
    }
}

pub struct CommandHandler {
    cache: Arc<TieredCache>,
}

impl CommandHandler {
    pub fn new(cache: Arc<TieredCache>) -> Self {
        Self { cache }
    }

    /// Execute one line. Blank lines and `#` comments produce no reply.
    pub fn handle_line(&self, line: &str) -> Option<Reply> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim_start()),
            None => (line, ""),
        };
        let command = command.to_uppercase();

        let reply = match command.as_str() {
            "PING" => self.handle_ping(rest),
            "GET" => self.handle_get(rest),
            "SET" => self.handle_set(rest),
            "DEL" => self.handle_del(rest),
            "EXISTS" => self.handle_exists(rest),
            "KEYS" => self.handle_keys(),
            "STATS" => self.handle_stats(),
            "FLUSHCACHE" => self.handle_flushcache(),
            _ => Reply::Error(format!("unknown command '{}'", command)),
        };
        Some(reply)
    }

    fn handle_ping(&self, rest: &str) -> Reply {
        if rest.is_empty() {
            Reply::Pong
        } else {
            Reply::Value(rest.to_string())
        }
    }

    fn handle_get(&self, rest: &str) -> Reply {
        let key = match single_arg(rest) {
            Some(key) => key,
            None => return wrong_args("get"),
        };

        match self.cache.read(key) {
            Ok(Some(value)) => Reply::Value(value),
            Ok(None) => Reply::Nil,
            Err(e) => store_error("get", key, e),
        }
    }

    /// `SET key value`; the value is the rest of the line, spaces included
    fn handle_set(&self, rest: &str) -> Reply {
        let (key, value) = match rest.split_once(char::is_whitespace) {
            Some((key, value)) => (key, value.trim_start()),
            None => return wrong_args("set"),
        };

        match self.cache.put(key, value) {
            Ok(()) => Reply::Ok,
            Err(e) => store_error("set", key, e),
        }
    }

    fn handle_del(&self, rest: &str) -> Reply {
        let keys: Vec<&str> = rest.split_whitespace().collect();
        if keys.is_empty() {
            return wrong_args("del");
        }

        for key in keys {
            if let Err(e) = self.cache.delete(key) {
                return store_error("del", key, e);
            }
        }
        Reply::Ok
    }

    /// Counts keys currently held by the cache, without promoting them
    fn handle_exists(&self, rest: &str) -> Reply {
        let keys: Vec<&str> = rest.split_whitespace().collect();
        if keys.is_empty() {
            return wrong_args("exists");
        }

        let count = keys.iter().filter(|key| self.cache.is_cached(key)).count();
        Reply::Integer(count as i64)
    }

    fn handle_keys(&self) -> Reply {
        Reply::Keys(self.cache.cached_keys())
    }

    fn handle_stats(&self) -> Reply {
        Reply::Info(format!(
            "cache_size:{} cache_capacity:{} stores:{} {}",
            self.cache.cache_len(),
            self.cache.capacity(),
            self.cache.chain().len(),
            self.cache.stats().snapshot(),
        ))
    }

    fn handle_flushcache(&self) -> Reply {
        self.cache.clear_cache();
        Reply::Ok
    }
}

fn single_arg(rest: &str) -> Option<&str> {
    let mut args = rest.split_whitespace();
    match (args.next(), args.next()) {
        (Some(arg), None) => Some(arg),
        _ => None,
    }
}

fn wrong_args(command: &str) -> Reply {
    Reply::Error(format!(
        "wrong number of arguments for '{}' command",
        command
    ))
}

fn store_error(command: &str, key: &str, e: valuestore::Error) -> Reply {
    warn!("{} {} failed: {}", command, key, e);
    Reply::Error(e.to_string())
}
