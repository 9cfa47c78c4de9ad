use once_cell::sync::Lazy;

/// Shared async HTTP client for solver calls.
///
/// Per-request timeouts are applied at the call site; the solver's time
/// budget differs per request, so no global timeout is baked in here.
pub static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);
