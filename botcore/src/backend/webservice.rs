//! Client of a remote real geometry web service.
//!
//! The HTTP layer is abstracted by [`Transport`]. Requests are sent with GET
//! while the full URL stays within [`REALGEOM_MAX_GET_LENGTH`] characters,
//! with POST otherwise. The service must pass a connection test before it is
//! reported available.
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use log::{debug, info, warn};

use crate::{
    backend::RealGeomService,
    base::settings::RealGeomSettings,
    magic::{REALGEOM_COMMAND, REALGEOM_MAX_GET_LENGTH, REALGEOM_TEST_ANSWERS},
    utils::error::BotResult,
};

/// Command used to test the connection.
pub const TEST_COMMAND: &str = REALGEOM_COMMAND;

/// Parameters of the connection test, without the trailing CAS name.
pub const TEST_PARAMETERS: &str = concat!(
    "lhs=w1&rhs=v11&polys=2*v7-v5-v3,2*v8-v6-v4,2*v9-v5-v1,2*v10-v6-v2,",
    "-v12^2+v10^2+v9^2-2*v10*v4+v4^2-2*v9*v3+v3^2,",
    "-v11^2+v4^2+v3^2-2*v4*v2+v2^2-2*v3*v1+v1^2,",
    "-v13^2+v8^2+v7^2-2*v8*v2+v2^2-2*v7*v1+v1^2,",
    "-1-v14*v5*v4+v14*v6*v3+v14*v5*v2-v14*v3*v2-v14*v6*v1+v14*v4*v1,",
    "-w1+(v13+v12)^1",
    "&vars=v1,v2,v3,v4,v5,v6,v7,v8,v9,v10,v11,v12,v13,v14,w1",
    "&posvariables=v12,v13,v11&mode=explore&cas=",
);

/// HTTP round-trips.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> BotResult<String>;

    fn post(&self, url: &str, body: &str, timeout: Duration) -> BotResult<String>;
}

/// Form encoding of a query string: alphanumerics and `.-*_` are kept,
/// spaces become `+`, every other byte is percent encoded.
pub fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' | b'*' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub struct RealGeomWebService {
    settings: RealGeomSettings,
    transport: Arc<dyn Transport>,
    available: AtomicBool,
}

impl RealGeomWebService {
    /// A disabled client; call [`RealGeomWebService::enable`] to use it.
    pub fn new(settings: RealGeomSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
            available: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &RealGeomSettings {
        &self.settings
    }

    /// Make the service available if it is enabled in the settings and
    /// passes the connection test.
    pub fn enable(&self) -> bool {
        if !self.settings.use_web_service {
            debug!("RealGeom web service disabled by settings");
            self.available.store(false, Ordering::Release);
            return false;
        }
        let available = self.test_connection();
        info!(
            "RealGeom web service at {} is {}",
            self.settings.url,
            if available { "available" } else { "unavailable" }
        );
        self.available.store(available, Ordering::Release);
        available
    }

    pub fn disable(&self) {
        self.available.store(false, Ordering::Release);
    }

    pub fn test_connection(&self) -> bool {
        if !self.settings.test_connection {
            debug!("Not testing RealGeom connection, assuming that it works");
            return true;
        }
        let parameters = format!("{}{}", TEST_PARAMETERS, self.settings.cas);
        match self.request(TEST_COMMAND, &parameters) {
            Ok(answer) => REALGEOM_TEST_ANSWERS.contains(&answer.as_str()),
            Err(e) => {
                warn!("RealGeom connection test failed: {}", e);
                false
            }
        }
    }

    fn request(&self, command: &str, parameters: &str) -> BotResult<String> {
        let parameters = format!("{}&timelimit={}", parameters, self.settings.timeout);
        let encoded = url_encode(&parameters);
        let url = &self.settings.url;
        let timeout = Duration::from_secs(u64::from(self.settings.timeout));

        if encoded.len() + url.len() + command.len() + 6 <= REALGEOM_MAX_GET_LENGTH {
            let full = format!("{}/{}?{}", url, command, encoded);
            debug!("GET {}", full);
            self.transport.get(&full, timeout)
        } else {
            debug!("POST {} ({} bytes)", url, encoded.len());
            self.transport
                .post(url, &format!("/{}?{}", command, encoded), timeout)
        }
    }
}

impl RealGeomService for RealGeomWebService {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn cas(&self) -> String {
        self.settings.cas.clone()
    }

    fn direct_command(&self, command: &str, parameters: &str) -> BotResult<String> {
        self.request(command, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encoding() {
        assert_eq!(url_encode("a=b&c d"), "a%3Db%26c+d");
        assert_eq!(url_encode("v1*v2-3.5_x"), "v1*v2-3.5_x");
        assert_eq!(url_encode("≥"), "%E2%89%A5");
    }
}
