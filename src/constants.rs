/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GDRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 180; // local models can be slow on first load

// Default Model Configuration
pub const DEFAULT_MODEL_ID: &str = "ollama/gemma3:1b";
pub const DEFAULT_GEMINI_API_KEY_ENV: &str = "GOOGLE_API_KEY";

// Jira
pub const DEFAULT_JIRA_TOKEN_ENV: &str = "JIRA_TOKEN";
pub const DEFAULT_JIRA_PROJECT_KEY: &str = "SCRUM";
pub const JIRA_PAGE_SIZE: usize = 100;
pub const JIRA_DEFAULT_ISSUE_TYPE: &str = "Task";

// Google Drive
pub const DEFAULT_GDRIVE_TOKEN_ENV: &str = "GDRIVE_ACCESS_TOKEN";
pub const DEFAULT_GDRIVE_FOLDER: &str = "Deprecation Notes";
pub const GDRIVE_FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const GDRIVE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const GDRIVE_TEXT_MIME: &str = "text/plain";

// Catalog
pub const PYTHON_DEPRECATIONS_URL: &str = "https://docs.python.org/3/deprecations/index.html";

// Retrieval
pub const MAX_FEATURE_HITS: usize = 10;
pub const TICKET_KEY_PREFIX: &str = "SCRUM";

/// Words that say "this is about deprecations" but carry no feature signal
pub const SEARCH_STOP_WORDS: &[&str] = &["deprecation", "deprecated", "remove", "removal", "eol"];

/// Question keywords that always route to deprecation lookups
pub const DEPRECATION_KEYWORDS: &[&str] = &[
    "deprecation",
    "deprecated",
    "pending removal",
    "removal",
    "eol",
];

/// Keyword -> workflow status, checked in order
pub const STATUS_KEYWORDS: &[(&str, &str)] = &[
    ("testing", "Testing"),
    ("done", "Done"),
    ("progress", "In Progress"),
    ("todo", "To Do"),
    ("to do", "To Do"),
];

// Interactive loop
pub const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];
