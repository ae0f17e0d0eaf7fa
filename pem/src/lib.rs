//! PEM framing (RFC 7468).
//!
//! [`parse_all`] splits a text buffer into its PEM blocks and requires the
//! whole buffer to be made of them. [`render`] goes the other way and joins
//! blocks into a single newline-terminated document.

pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::LazyLock,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use error::Error;
use kagi::decoder::{DecodableFrom, Decoder};
use regex::Regex;
use tracing::trace;

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

const BEGIN_PREFIX: &str = "-----BEGIN ";
const END_PREFIX: &str = "-----END ";

static BOUNDARY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^-----(?:BEGIN|END) ([A-Z0-9 ]+)-----\s*$"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// PKCS#8 private key (non-encrypted)
    PrivateKey,
    /// PKCS#8 encrypted private key
    EncryptedPrivateKey,
    /// PKCS#1 RSA private key
    RSAPrivateKey,
    /// SEC1 EC private key
    ECPrivateKey,
    /// X.509 SubjectPublicKeyInfo
    PublicKey,
    /// PKCS#1 RSA public key
    RSAPublicKey,
    /// X.509 Certificate
    Certificate,
    Unknown,
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::PrivateKey => write!(f, "{}", PRIVATE_KEY_LABEL),
            Label::EncryptedPrivateKey => write!(f, "{}", ENCRYPTED_PRIVATE_KEY_LABEL),
            Label::RSAPrivateKey => write!(f, "{}", RSA_PRIVATE_KEY_LABEL),
            Label::ECPrivateKey => write!(f, "{}", EC_PRIVATE_KEY_LABEL),
            Label::PublicKey => write!(f, "{}", PUBLIC_KEY_LABEL),
            Label::RSAPublicKey => write!(f, "{}", RSA_PUBLIC_KEY_LABEL),
            Label::Certificate => write!(f, "{}", CERTIFICATE_LABEL),
            Label::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PRIVATE_KEY_LABEL => Ok(Label::PrivateKey),
            ENCRYPTED_PRIVATE_KEY_LABEL => Ok(Label::EncryptedPrivateKey),
            RSA_PRIVATE_KEY_LABEL => Ok(Label::RSAPrivateKey),
            EC_PRIVATE_KEY_LABEL => Ok(Label::ECPrivateKey),
            PUBLIC_KEY_LABEL => Ok(Label::PublicKey),
            RSA_PUBLIC_KEY_LABEL => Ok(Label::RSAPublicKey),
            CERTIFICATE_LABEL => Ok(Label::Certificate),
            _ => Err(Error::InvalidLabel),
        }
    }
}

impl Label {
    fn get_label(line: &str) -> Result<Label, Error> {
        let re = BOUNDARY
            .as_ref()
            .map_err(|_| Error::InvalidEncapsulationBoundary)?;
        let captured = re
            .captures(line)
            .ok_or(Error::InvalidEncapsulationBoundary)?;
        captured
            .get(1)
            .ok_or(Error::InvalidEncapsulationBoundary)
            .and_then(|c| Label::from_str(c.as_str()))
    }
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    base64_data: String, // base64 encoded data
}

impl Pem {
    pub fn from_bytes(label: Label, data: &[u8]) -> Self {
        let base64_data = STANDARD.encode(data);
        Pem { label, base64_data }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----BEGIN {}-----", self.label)?;
        for chunk in self.base64_data.as_bytes().chunks(64) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        write!(f, "-----END {}-----", self.label)
    }
}

/// Trait for types that can be converted to PEM format
pub trait ToPem {
    /// The error type returned by to_pem
    type Error;

    /// Get the PEM label for this type
    fn pem_label(&self) -> Label;

    /// Convert to PEM format
    fn to_pem(&self) -> Result<Pem, Self::Error>;
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        // The label is dropped here; callers sniff the DER contents instead.
        STANDARD.decode(self.data()).map_err(Error::Base64Decode)
    }
}

/// Parse every PEM block in `s`.
///
/// Only whitespace may appear before, between and after the blocks. Anything
/// else is reported as [`Error::UnexpectedData`] with its byte offset, so a
/// truncated or concatenated-with-garbage file never silently loses data.
/// An input without any block is an error.
///
/// # Example
/// ```
/// use pem::parse_all;
///
/// let pem_data = "-----BEGIN PUBLIC KEY-----\nAAA=\n-----END PUBLIC KEY-----\n-----BEGIN PUBLIC KEY-----\nBBB=\n-----END PUBLIC KEY-----\n";
/// let pems = parse_all(pem_data).unwrap();
/// assert_eq!(pems.len(), 2);
/// ```
pub fn parse_all(s: &str) -> Result<Vec<Pem>, Error> {
    let mut pems = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let offset = s.len() - rest.len();
        if !rest.starts_with(BEGIN_PREFIX) {
            return Err(Error::UnexpectedData(offset));
        }
        let first_line = rest.lines().next().unwrap_or_default();
        Label::get_label(first_line)?;

        let end = rest
            .find(END_PREFIX)
            .ok_or(Error::MissingPostEncapsulationBoundary)?;
        let block_len = match rest[end..].find('\n') {
            Some(nl) => end + nl + 1,
            None => rest.len(),
        };

        let pem = Pem::from_str(&rest[..block_len])?;
        trace!(label = %pem.label(), offset, "parsed PEM block");
        pems.push(pem);

        rest = rest[block_len..].trim_start();
    }

    if pems.is_empty() {
        return Err(Error::MissingPreEncapsulationBoundary);
    }

    Ok(pems)
}

/// Render blocks as one PEM document, each block terminated by a newline.
pub fn render(pems: &[Pem]) -> String {
    pems.iter().map(|pem| format!("{pem}\n")).collect()
}

impl FromStr for Pem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = PemParsingState::default();
        let mut label = Label::Unknown;
        let mut base64_lines = vec![];
        let mut base64_finl_lines = vec![];
        let mut lines = s.lines();
        loop {
            match state {
                PemParsingState::Init => match lines.next() {
                    Some(line) => {
                        if line.is_empty() {
                            return Err(Error::MissingPreEncapsulationBoundary);
                        }
                        // Explanatory text before the boundary is skipped.
                        if let Ok(l) = Label::get_label(line) {
                            label = l;
                            state = PemParsingState::PreEncapsulationBoundary;
                        }
                    }
                    None => return Err(Error::MissingPreEncapsulationBoundary),
                },
                PemParsingState::PreEncapsulationBoundary => match lines.next() {
                    Some(line) => {
                        if line.is_empty() || Label::get_label(line).is_ok() {
                            return Err(Error::MissingData);
                        }
                        if is_base64_finl(line) {
                            base64_finl_lines.push(line);
                            state = PemParsingState::Base64Finl;
                        } else {
                            base64_lines.push(line.trim_end());
                            state = PemParsingState::Base64Lines;
                        }
                    }
                    None => return Err(Error::MissingData),
                },
                PemParsingState::Base64Lines => match lines.next() {
                    Some(line) => {
                        if line.is_empty() {
                            return Err(Error::InvalidBase64Line);
                        }
                        if line.starts_with(BEGIN_PREFIX) {
                            return Err(Error::InvalidEncapsulationBoundary);
                        }
                        if let Ok(l) = Label::get_label(line) {
                            if l.ne(&label) {
                                return Err(Error::LabelMissMatch);
                            }
                            state = PemParsingState::PostEncapsulationBoundary;
                        } else if line.starts_with(END_PREFIX) {
                            return Err(Error::InvalidEncapsulationBoundary);
                        } else if is_base64_finl(line) {
                            base64_finl_lines.push(line);
                            state = PemParsingState::Base64Finl;
                        } else {
                            base64_lines.push(line.trim_end());
                        }
                    }
                    None => return Err(Error::MissingPostEncapsulationBoundary),
                },
                PemParsingState::Base64Finl => match lines.next() {
                    Some(line) => {
                        if line.is_empty() {
                            return Err(Error::InvalidBase64Finl);
                        }
                        if line.starts_with(BEGIN_PREFIX) {
                            return Err(Error::InvalidEncapsulationBoundary);
                        }
                        if let Ok(l) = Label::get_label(line) {
                            if l.ne(&label) {
                                return Err(Error::LabelMissMatch);
                            }
                            state = PemParsingState::PostEncapsulationBoundary;
                        } else {
                            if !is_base64_finl(line) {
                                return Err(Error::InvalidBase64Finl);
                            }
                            base64_finl_lines.push(line);
                        }
                    }
                    None => return Err(Error::MissingPostEncapsulationBoundary),
                },
                PemParsingState::PostEncapsulationBoundary => break,
            }
        }
        let finl = base64_finl(&base64_finl_lines)?;
        base64_lines.push(&finl);

        Ok(Pem {
            label,
            base64_data: base64_lines.join(""),
        })
    }
}

/*
* pre-eb ->          base64finl -> post-eb
*        -> base64lines-|---------->
*            |_|
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum PemParsingState {
    #[default]
    Init,
    PreEncapsulationBoundary,
    Base64Lines,
    Base64Finl,
    PostEncapsulationBoundary,
}

fn base64_finl(lines: &[&str]) -> Result<String, Error> {
    // base64finl = *base64char (base64pad *WSP eol base64pad / *2base64pad) *WSP eol
    // exp-1)
    // ..AB=\s\s\s\n
    // =\s\s\n
    // exp-2)
    // ..AB==\s\s\n
    if lines.iter().any(|l| l.is_empty()) {
        return Err(Error::InvalidBase64Finl);
    }
    let lines = lines.iter().map(|l| l.trim()).collect::<Vec<&str>>();
    Ok(lines.join(""))
}

fn is_base64_finl(line: &str) -> bool {
    line.contains('=')
}
