//! HTTP authentication for CalDAV requests.
//!
//! Basic (RFC 7617) and Digest (RFC 7616: MD5, SHA-256 and their `-sess`
//! variants, with or without `qop=auth`). The client answers whichever
//! challenge the server sends with its 401.

use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// An authentication challenge taken from `WWW-Authenticate`.
#[derive(Debug, Clone)]
pub enum Challenge {
    /// `Digest realm=..., nonce=...`
    Digest(DigestAuth),
    /// `Basic realm=...`, or any scheme we do not implement.
    Basic,
}

impl Challenge {
    /// Picks the challenge to answer from all `WWW-Authenticate` values.
    ///
    /// A Digest challenge we can answer wins over Basic when a server offers
    /// both. Digest challenges with an unsupported algorithm are skipped.
    pub fn select<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut offered = false;
        for value in values {
            offered = true;
            if let Some(digest) = DigestAuth::parse(value) {
                return Some(Self::Digest(digest));
            }
        }
        offered.then_some(Self::Basic)
    }
}

/// Hash algorithm of a Digest challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Md5Sess,
    Sha256,
    Sha256Sess,
}

impl DigestAlgorithm {
    /// Parses the `algorithm` parameter. `None` for algorithms we cannot compute.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MD5" => Some(Self::Md5),
            "MD5-SESS" => Some(Self::Md5Sess),
            "SHA-256" => Some(Self::Sha256),
            "SHA-256-SESS" => Some(Self::Sha256Sess),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
        }
    }

    fn is_session(&self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess)
    }

    fn hash(&self, input: &str) -> String {
        match self {
            Self::Md5 | Self::Md5Sess => md5_hex(input),
            Self::Sha256 | Self::Sha256Sess => sha256_hex(input),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP Digest authentication state for one realm/nonce.
#[derive(Debug, Clone)]
pub struct DigestAuth {
    /// The realm from the server challenge.
    pub realm: String,
    /// The nonce from the server challenge.
    pub nonce: String,
    /// The opaque value from the server challenge.
    pub opaque: Option<String>,
    /// Whether the server offered `qop=auth`.
    pub qop_auth: bool,
    /// The algorithm (defaults to MD5).
    pub algorithm: DigestAlgorithm,
    /// Nonce count, incremented per request.
    nc: u32,
}

impl DigestAuth {
    /// Parses a `Digest` challenge. Returns `None` for other schemes, for
    /// unsupported algorithms, or when `realm`/`nonce` are missing.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let scheme_len = "Digest".len();
        let scheme = header.get(..scheme_len)?;
        let rest = header.get(scheme_len..)?;
        if !scheme.eq_ignore_ascii_case("Digest") || !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let params = parse_auth_params(rest);
        let algorithm = match params.get("algorithm") {
            Some(value) => DigestAlgorithm::parse(value)?,
            None => DigestAlgorithm::Md5,
        };
        let qop_auth = params
            .get("qop")
            .is_some_and(|qop| qop.split(',').any(|q| q.trim() == "auth"));

        Some(Self {
            realm: params.get("realm")?.clone(),
            nonce: params.get("nonce")?.clone(),
            opaque: params.get("opaque").cloned(),
            qop_auth,
            algorithm,
            nc: 0,
        })
    }

    /// Builds the `Authorization` header value for one request.
    pub fn authorize(&mut self, method: &str, uri: &str, username: &str, password: &str) -> String {
        self.nc += 1;
        let nc = format!("{:08x}", self.nc);
        let cnonce = generate_cnonce();

        let algorithm = self.algorithm;
        let send_cnonce = self.qop_auth || algorithm.is_session();

        let mut ha1 = algorithm.hash(&format!("{}:{}:{}", username, self.realm, password));
        if algorithm.is_session() {
            ha1 = algorithm.hash(&format!("{}:{}:{}", ha1, self.nonce, cnonce));
        }
        let ha2 = algorithm.hash(&format!("{}:{}", method, uri));

        let response = if self.qop_auth {
            algorithm.hash(&format!(
                "{}:{}:{}:{}:auth:{}",
                ha1, self.nonce, nc, cnonce, ha2
            ))
        } else {
            // RFC 2069 form
            algorithm.hash(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        };

        let mut parts = vec![
            format!("username=\"{}\"", username),
            format!("realm=\"{}\"", self.realm),
            format!("nonce=\"{}\"", self.nonce),
            format!("uri=\"{}\"", uri),
            format!("response=\"{}\"", response),
            format!("algorithm={}", algorithm),
        ];

        if self.qop_auth {
            parts.push("qop=auth".to_string());
            parts.push(format!("nc={}", nc));
        }
        if send_cnonce {
            parts.push(format!("cnonce=\"{}\"", cnonce));
        }

        if let Some(ref opaque) = self.opaque {
            parts.push(format!("opaque=\"{}\"", opaque));
        }

        format!("Digest {}", parts.join(", "))
    }
}

/// Generates a Basic authentication header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {}", encoded)
}

/// Parses `key=value, key="quoted value"` pairs. Keys are lowercased.
fn parse_auth_params(content: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut chars = content.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }

        let key: String = chars
            .by_ref()
            .take_while(|c| *c != '=')
            .collect::<String>()
            .trim()
            .to_lowercase();
        if key.is_empty() {
            break;
        }

        let value = if chars.peek() == Some(&'"') {
            chars.next();
            let mut value = String::new();
            let mut escaped = false;
            for c in chars.by_ref() {
                match (escaped, c) {
                    (true, c) => {
                        value.push(c);
                        escaped = false;
                    }
                    (false, '\\') => escaped = true,
                    (false, '"') => break,
                    (false, c) => value.push(c),
                }
            }
            value
        } else {
            chars
                .by_ref()
                .take_while(|c| *c != ',' && !c.is_whitespace())
                .collect()
        };

        params.insert(key, value);
    }

    params
}

fn generate_cnonce() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

fn sha256_hex(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
