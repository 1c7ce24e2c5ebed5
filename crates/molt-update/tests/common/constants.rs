//! Shared constants for test infrastructure

pub const OWNER: &str = "acme";
pub const REPO: &str = "tool";
pub const TOKEN: &str = "ghp_testtoken";

pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V2_0_0: &str = "v2.0.0";

pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_2_0_0: &str = "2.0.0";
pub const VERSION_3_0_0: &str = "3.0.0";

pub const ASSET_LINUX: &str = "tool-linux-amd64";
pub const ASSET_DARWIN: &str = "tool-darwin-arm64";

pub const BINARY_V1: &[u8] = b"v1";
pub const BINARY_V2: &[u8] = b"v2";

/// "Hello, World!" and its digests
pub const HELLO: &[u8] = b"Hello, World!";
pub const HELLO_SHA256: &str = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
pub const HELLO_SHA1: &str = "0a0a9f2a6772942557ab5355d76af442f8f65e01";
pub const HELLO_MD5: &str = "65a8e27d8879283831b664bd8b7f0ad4";

pub const WRONG_SHA256: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub const TRAVERSAL_ENTRY: &str = "../../../etc/passwd";
