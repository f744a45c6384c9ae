//! Response logic for the built-in demo services.

use crate::protocol::ServiceCategory;

use std::time::{SystemTime, UNIX_EPOCH};

/// What a worker does with a request body.
pub trait ServiceHandler: Send + Sync {
    fn category(&self) -> ServiceCategory;

    fn respond(&self, body: &[u8]) -> Vec<u8>;
}

/// REPLY: echoes the request back in upper-case leet speak.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeetReply;

impl ServiceHandler for LeetReply {
    fn category(&self) -> ServiceCategory {
        ServiceCategory::Reply
    }

    fn respond(&self, body: &[u8]) -> Vec<u8> {
        String::from_utf8_lossy(body)
            .to_uppercase()
            .chars()
            .map(|c| match c {
                'O' => '0',
                'A' => '4',
                'I' => '1',
                'S' => '5',
                'E' => '3',
                other => other,
            })
            .collect::<String>()
            .into_bytes()
    }
}

/// TIME: current Unix time in milliseconds, as ASCII digits. The body is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeReply;

impl ServiceHandler for TimeReply {
    fn category(&self) -> ServiceCategory {
        ServiceCategory::Time
    }

    fn respond(&self, _body: &[u8]) -> Vec<u8> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        now_ms.to_string().into_bytes()
    }
}

pub fn handler_for(category: ServiceCategory) -> Box<dyn ServiceHandler> {
    match category {
        ServiceCategory::Reply => Box::new(LeetReply),
        ServiceCategory::Time => Box::new(TimeReply),
    }
}
