//! Connection configuration.

use super::error::Error;
use serde::{Deserialize, Serialize};

/// Keep-alive used when none is configured, in seconds.
pub const DEFAULT_KEEP_ALIVE_SECONDS: u16 = 10;

/// A will message. Carried so callers get a typed refusal instead of a
/// silently dropped will: CONNECT always goes out with the will flag clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastWill<'a> {
    /// Topic the will would be published to.
    pub topic: &'a str,
    /// Will message text.
    pub message: &'a str,
}

/// Configuration options for the MQTT CONNECT packet.
///
/// Options can be written as a struct literal or loaded from JSON with
/// [`ConnectOptions::from_json`]; missing fields take their defaults.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::ConnectOptions;
///
/// let options = ConnectOptions {
///     username: Some("ranma1988"),
///     password: Some("secret"),
///     ..ConnectOptions::new("cupz")
/// };
/// assert!(options.clean_session);
/// assert_eq!(options.keep_alive_seconds, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions<'a> {
    /// The client identifier. Always sent, even when empty.
    pub client_id: &'a str,

    /// User name. `None` or an empty string leaves the user-name flag clear.
    #[serde(borrow)]
    pub username: Option<&'a str>,

    /// Password. `None` or an empty string leaves the password flag clear.
    #[serde(borrow)]
    pub password: Option<&'a str>,

    /// Keep-alive interval in seconds.
    pub keep_alive_seconds: u16,

    /// Ask the broker to discard previous session state.
    pub clean_session: bool,

    /// Will-retain bit of the connect flags.
    pub will_retain: bool,

    /// Will QoS bits of the connect flags, 0-3.
    pub will_qos: u8,

    /// Will message; only `None` is accepted.
    #[serde(borrow)]
    pub will: Option<LastWill<'a>>,
}

impl<'a> ConnectOptions<'a> {
    /// Defaults for `client_id`: clean session, 10 s keep-alive, no credentials.
    pub fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            ..Self::default()
        }
    }

    /// Parse options from a JSON object, e.g.
    /// `{"client_id":"cupz","username":"ranma1988","password":"secret"}`.
    ///
    /// Strings are borrowed from `json`, so they must not contain escapes.
    pub fn from_json(json: &'a str) -> Result<Self, Error> {
        serde_json_core::from_str(json)
            .map(|(options, _)| options)
            .map_err(|_| Error::InvalidOptions)
    }

    pub(crate) fn username(&self) -> Option<&'a str> {
        self.username.filter(|u| !u.is_empty())
    }

    pub(crate) fn password(&self) -> Option<&'a str> {
        self.password.filter(|p| !p.is_empty())
    }
}

impl Default for ConnectOptions<'_> {
    fn default() -> Self {
        Self {
            client_id: "",
            username: None,
            password: None,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
            clean_session: true,
            will_retain: false,
            will_qos: 0,
            will: None,
        }
    }
}
