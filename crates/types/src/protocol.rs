//! Fixed protocol constants
//!
//! These values must match the live service exactly; the server rejects
//! requests that deviate from them.

/// Session key used until the server rotates it
pub const DEFAULT_ENCRYPTION_KEY: &str = "TpzWfhPBWtcNbUScHM2hM6bpw58Tm3Ji";

/// Bootstrap API base address, replaced after the handshake
pub const DEFAULT_API_BASE: &str = "https://g-api.touhoulostword.com/app/";

/// Client build number sent with every request
pub const APP_VERSION: i32 = 43;

/// Resource version sent with every request
pub const RESOURCE_VERSION: i32 = 0;

/// Platform identifier carried by init and version requests
pub const PLATFORM_TYPE: i32 = 1;

/// Unity engine version advertised in request headers
pub const UNITY_VERSION: &str = "2021.3.11f1";

/// User agent of the Unity player HTTP stack
pub const USER_AGENT: &str = "UnityPlayer/2021.3.11f1 (UnityWebRequest/1.0, libcurl/7.80.0-DEV)";

/// Header carrying the Unity version
pub const UNITY_VERSION_HEADER: &str = "X-Unity-Version";

/// Resource identifier of a category manifest, appended to the category path
pub const MANIFEST_RESOURCE: &str = "7f5cb74af5d7f4b82200738fdbdc5a45";

/// Route of the handshake request
pub const ROUTE_GAME_INIT: &str = "game_init";

/// Route of the version request
pub const ROUTE_VERSION_GET: &str = "version_get";
