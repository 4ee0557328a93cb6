//! Shared constants for end-to-end tests

// ============================================================================
// WebDAV Share
// ============================================================================

/// Basic auth user accepted by the test share
pub const DAV_USER: &str = "admin";

/// Basic auth password accepted by the test share
pub const DAV_PASS: &str = "raspberry";

/// Path of the catalog file on the test share
pub const CATALOG_PATH: &str = "/webdav/kitaplar.csv";

/// Catalog file with a header and two books
pub const SEED_CATALOG: &str = "Kitap Adı;Yazar;Konum\nDune;Frank Herbert;Salon\n1984;George Orwell;Yatak odası\n";

// ============================================================================
// LLM Endpoint
// ============================================================================

/// API key the mock LLM endpoint expects as bearer token
pub const LLM_API_KEY: &str = "sk-test-key";

/// Model name sent by the tests
pub const LLM_MODEL: &str = "vision-test";

// ============================================================================
// Fixtures
// ============================================================================

/// Smallest byte sequence recognised as a PNG
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
