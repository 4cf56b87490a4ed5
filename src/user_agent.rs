//! User-Agent string shared by asset requests.
//!
//! Many image hosts and CDNs refuse requests that do not look like a browser
//! following a link from the article page, so asset requests present a
//! desktop Chrome identity.

/// Desktop Chrome User-Agent sent with every asset request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
