//! System-wide constants and reserved parameter names.

/// Default manifest file looked up when none is given.
pub const DEFAULT_MANIFEST: &str = "manifest.yaml";

/// Prefix of every external id generated for settings objects and segments.
pub const EXTERNAL_ID_PREFIX: &str = "stratum:";

/// Parameter holding the display name of a configuration.
pub const NAME_PARAMETER: &str = "name";

/// Parameter holding the scope of a settings object.
pub const SCOPE_PARAMETER: &str = "scope";

/// Property under which the remote id of a deployed configuration is published.
pub const ID_PROPERTY: &str = "id";

/// Property under which the legacy numeric id of a deployed settings object
/// is published, when its object id carries one.
pub const LEGACY_ID_PROPERTY: &str = "legacyId";

/// Parameter names the loader refuses as user-defined parameters.
pub const RESERVED_PARAMETERS: [&str; 2] = [ID_PROPERTY, LEGACY_ID_PROPERTY];

/// Default timeout for a single remote request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
