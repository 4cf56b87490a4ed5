//! Constants for the download module (request headers, content-type tables).

/// `Accept` header sent with every asset request.
pub const ACCEPT_HEADER: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// `Accept-Language` header sent with every asset request.
pub const ACCEPT_LANGUAGE_HEADER: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Image MIME types and the extension appended when a name has none.
pub const IMAGE_EXTENSIONS_BY_MIME: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
];

/// Document MIME types and the extension appended when a name has none.
pub const FILE_EXTENSIONS_BY_MIME: &[(&str, &str)] = &[
    ("application/pdf", ".pdf"),
    ("application/zip", ".zip"),
    ("application/x-zip-compressed", ".zip"),
    ("application/x-rar-compressed", ".rar"),
    ("application/vnd.ms-powerpoint", ".ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/vnd.ms-excel", ".xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    ("text/plain", ".txt"),
    ("text/markdown", ".md"),
    ("text/csv", ".csv"),
    ("application/json", ".json"),
];

/// URL path suffixes recognized as images regardless of the served type.
pub const IMAGE_URL_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

/// Substrings marking lazy-load placeholders and tracking pixels.
pub const PLACEHOLDER_IMAGE_PATTERNS: &[&str] = &[
    "lazy_placeholder",
    "placeholder.gif",
    "pixel.gif",
    "1x1.gif",
    "blank.gif",
    "data:image/gif",
];
